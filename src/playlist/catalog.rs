// Playlist catalog - the selectable playlists derived from prefixed tags
// Index 0 is always the "All items" sentinel.

use super::codec::PlaylistCodec;
use crate::error::StoreResult;
use crate::store::{starts_with_pattern, StoreSession};
use rusqlite::params;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const ALL_ITEMS: &str = "All items";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub label: String,
    /// The tag row that represents this label in the list (last one seen in name order).
    pub tag_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistCatalog {
    entries: Vec<PlaylistEntry>,
}

impl PlaylistCatalog {
    /// Read all linked playlist tags and coalesce them into one entry per label.
    pub fn load(session: &StoreSession, codec: &PlaylistCodec) -> StoreResult<Self> {
        let rows: Vec<(i64, String)> = session.query(
            "SELECT t.id, t.name FROM tags t
             INNER JOIN books_tags_link btl ON btl.tag = t.id
             WHERE t.name LIKE ?1 ESCAPE '\\'
             ORDER BY t.name",
            params![starts_with_pattern(codec.prefix())],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let catalog = Self::from_rows(codec, rows);
        debug!("Loaded {} playlists", catalog.entries.len());
        Ok(catalog)
    }

    /// Rows must already be in tag-name order. A label seen again replaces its earlier entry.
    pub fn from_rows<I>(codec: &PlaylistCodec, rows: I) -> Self
    where
        I: IntoIterator<Item = (i64, String)>,
    {
        let mut entries: Vec<PlaylistEntry> = Vec::new();
        for (tag_id, name) in rows {
            let Some(tag) = codec.decode(&name) else {
                continue;
            };
            if let Some(pos) = entries.iter().position(|e| e.label == tag.label) {
                entries.remove(pos);
            }
            entries.push(PlaylistEntry {
                label: tag.label,
                tag_id,
            });
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[PlaylistEntry] {
        &self.entries
    }

    /// Display labels including the sentinel at index 0.
    pub fn labels(&self) -> Vec<&str> {
        std::iter::once(ALL_ITEMS)
            .chain(self.entries.iter().map(|e| e.label.as_str()))
            .collect()
    }

    /// Entry at a combined index (0 is the sentinel and has no entry).
    pub fn get(&self, index: usize) -> Option<&PlaylistEntry> {
        index.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.iter().any(|e| e.label == label)
    }

    /// Find `previous` among the freshly loaded labels; anything gone (or no previous) is 0.
    pub fn resolve_active(&self, previous: Option<&str>) -> usize {
        previous
            .and_then(|label| self.entries.iter().position(|e| e.label == label))
            .map_or(0, |i| i + 1)
    }
}
