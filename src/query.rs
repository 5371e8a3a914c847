// Library query builder
// One item query = a fixed select list + an ordered list of named conditions, all ANDed.
// Every value goes in as a bound parameter; the SQL text only ever comes from the templates below.

use crate::error::StoreResult;
use crate::playlist::PlaylistCodec;
use crate::store::{escape_like, starts_with_pattern, StoreSession};
use rusqlite::params_from_iter;
use serde::{Deserialize, Serialize};
use tracing::debug;

const PDF_FORMAT: &str = "PDF";

const HAS_TAG: &str = "EXISTS (SELECT 1 FROM books_tags_link bl \
     INNER JOIN tags t ON t.id = bl.tag \
     WHERE bl.book = b.id AND t.name = ?)";

const HAS_PLAYLIST_TAG: &str = "EXISTS (SELECT 1 FROM books_tags_link bl \
     INNER JOIN tags t ON t.id = bl.tag \
     WHERE bl.book = b.id AND (t.name = ? OR t.name LIKE ? ESCAPE '\\'))";

/// Lowest matching playlist tag of the item - its position in the playlist.
const PLAYLIST_TAG_COLUMN: &str = "(SELECT min(t.name) FROM books_tags_link bl \
     INNER JOIN tags t ON t.id = bl.tag \
     WHERE bl.book = b.id AND (t.name = ? OR t.name LIKE ? ESCAPE '\\'))";

/// A score as listed in the library table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub title: String,
    pub collection: String,
    pub author: String,
    /// Relative to the library directory.
    pub path: String,
    /// Comma-joined tags other than the music marker and playlist tags.
    pub tags: String,
    /// Ordinal of the item within the active playlist, if one is active.
    pub playlist_ordinal: Option<u32>,
}

/// A named, parameterized condition on the item (`b`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub name: String,
    clause: &'static str,
    params: Vec<String>,
}

impl Condition {
    pub fn has_tag(name: impl Into<String>, tag: &str) -> Self {
        Self {
            name: name.into(),
            clause: HAS_TAG,
            params: vec![tag.to_string()],
        }
    }

    /// Carries `<prefix><label>` or any `<prefix><label>|...` tag.
    pub fn in_playlist(codec: &PlaylistCodec, label: &str) -> Self {
        Self {
            name: format!("playlist '{}'", label),
            clause: HAS_PLAYLIST_TAG,
            params: playlist_params(codec, label),
        }
    }

    pub fn clause(&self) -> &str {
        self.clause
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }
}

fn playlist_params(codec: &PlaylistCodec, label: &str) -> Vec<String> {
    vec![
        codec.bare_name(label),
        format!("{}%", escape_like(&codec.ordinal_stem(label))),
    ]
}

#[derive(Debug, Clone)]
pub struct ItemQuery<'a> {
    codec: &'a PlaylistCodec,
    music_tag: String,
    playlist: Option<String>,
    conditions: Vec<Condition>,
}

impl<'a> ItemQuery<'a> {
    /// Every music-tagged item with a PDF.
    pub fn new(codec: &'a PlaylistCodec, music_tag: &str) -> Self {
        Self {
            codec,
            music_tag: music_tag.to_string(),
            playlist: None,
            conditions: vec![Condition::has_tag("music marker", music_tag)],
        }
    }

    pub fn in_playlist(mut self, label: &str) -> Self {
        self.conditions.push(Condition::in_playlist(self.codec, label));
        self.playlist = Some(label.to_string());
        self
    }

    pub fn require_tag(mut self, tag: &str) -> Self {
        self.conditions
            .push(Condition::has_tag(format!("tag '{}'", tag), tag));
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// SQL text plus its parameters in placeholder order.
    pub fn to_sql(&self) -> (String, Vec<String>) {
        let mut params = vec![
            self.music_tag.clone(),
            starts_with_pattern(self.codec.prefix()),
        ];

        let playlist_column = match &self.playlist {
            Some(label) => {
                params.extend(playlist_params(self.codec, label));
                PLAYLIST_TAG_COLUMN
            }
            None => "NULL",
        };
        params.push(PDF_FORMAT.to_string());

        let mut clauses = Vec::with_capacity(self.conditions.len());
        for condition in &self.conditions {
            clauses.push(condition.clause);
            params.extend(condition.params.iter().cloned());
        }

        let sql = format!(
            "SELECT b.id, b.sort, \
               coalesce((SELECT max(s.name) FROM books_series_link bsl \
                         INNER JOIN series s ON s.id = bsl.series \
                         WHERE bsl.book = b.id), '') AS collection, \
               b.author_sort, \
               b.path || '/' || d.name || '.' || lower(d.format) AS path, \
               (SELECT group_concat(name, ',') FROM \
                  (SELECT t2.name AS name FROM books_tags_link btl2 \
                   INNER JOIN tags t2 ON t2.id = btl2.tag \
                   WHERE btl2.book = b.id AND t2.name <> ? AND t2.name NOT LIKE ? ESCAPE '\\' \
                   ORDER BY t2.name)) AS tags, \
               {} AS playlist_tag \
             FROM books b \
             INNER JOIN data d ON d.book = b.id AND d.format = ? \
             WHERE {} \
             GROUP BY b.id \
             ORDER BY b.sort, b.id",
            playlist_column,
            clauses.join(" AND ")
        );
        (sql, params)
    }

    pub fn run(&self, session: &StoreSession) -> StoreResult<Vec<Item>> {
        let names: Vec<&str> = self.conditions.iter().map(|c| c.name.as_str()).collect();
        debug!("Item query with conditions {:?}", names);

        let (sql, params) = self.to_sql();
        let rows: Vec<(Item, Option<String>)> =
            session.query(&sql, params_from_iter(params.iter()), |row| {
                let item = Item {
                    id: row.get(0)?,
                    title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    collection: row.get(2)?,
                    author: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    path: row.get(4)?,
                    tags: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                    playlist_ordinal: None,
                };
                Ok((item, row.get(6)?))
            })?;

        let mut items: Vec<Item> = rows
            .into_iter()
            .map(|(mut item, playlist_tag)| {
                item.playlist_ordinal = playlist_tag
                    .and_then(|name| self.codec.decode(&name))
                    .and_then(|tag| tag.ordinal);
                item
            })
            .collect();

        // Playlist order is the ordinal of each item's tag; title order breaks ties.
        if self.playlist.is_some() {
            items.sort_by_key(|item| item.playlist_ordinal);
        }

        debug!("Item query returned {} rows", items.len());
        Ok(items)
    }
}

/// Build and run the item query for an active playlist (None = all items) and the enabled predicates.
pub fn build_and_run(
    session: &StoreSession,
    codec: &PlaylistCodec,
    music_tag: &str,
    active_label: Option<&str>,
    enabled_predicates: &[&str],
) -> StoreResult<Vec<Item>> {
    let mut query = ItemQuery::new(codec, music_tag);
    if let Some(label) = active_label {
        query = query.in_playlist(label);
    }
    for tag in enabled_predicates {
        query = query.require_tag(tag);
    }
    query.run(session)
}
