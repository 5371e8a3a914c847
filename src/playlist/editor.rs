// Playlist membership editor - the only code that writes to the tag store
// Each call is one unit of work with no transaction around it: create-tag and link-tag
// commit separately, so an interrupted add can leave a tag with zero links (see sweep_orphans).

use super::codec::{validate_label, PlaylistCodec};
use crate::error::{MutationResult, StoreResult};
use crate::store::{starts_with_pattern, Tag, TagStore};
use rusqlite::params;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// What a remove actually did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Removal {
    pub tag: Tag,
    /// The tag had no links left and was deleted too.
    pub tag_deleted: bool,
}

#[derive(Debug, Clone)]
pub struct PlaylistEditor {
    store: TagStore,
    codec: PlaylistCodec,
}

impl PlaylistEditor {
    pub fn new(store: TagStore, codec: PlaylistCodec) -> Self {
        Self { store, codec }
    }

    /// Mint the next ordinal of `label` and link it to `item`.
    /// Does nothing (Ok(None)) when the label has no ordinal yet - use `create_playlist` for that.
    pub fn add_to_playlist(&self, item: i64, label: &str) -> MutationResult<Option<Tag>> {
        validate_label(label)?;
        info!("Request to add item {} to playlist '{}'", item, label);

        self.store.with_session(|s| {
            // The stem match ignores case; mint under the spelling already stored
            let latest = s
                .tags_starting_with(&self.codec.ordinal_stem(label))?
                .iter()
                .filter_map(|t| {
                    let tag = self.codec.decode(&t.name)?;
                    Some((tag.ordinal?, tag.label))
                })
                .max_by_key(|(ordinal, _)| *ordinal);

            let Some((latest, stored_label)) = latest else {
                info!("Playlist '{}' has no ordinal yet, nothing added", label);
                return Ok(None);
            };

            let ordinal = self.codec.next_ordinal(label, latest)?;
            let tag = s.insert_tag(&self.codec.encode(&stored_label, ordinal))?;
            s.link_tag(tag.id, item)?;
            info!("Linked item {} to new tag '{}'", item, tag.name);
            Ok(Some(tag))
        })
    }

    /// Unlink the most recent ordinal of `label` from `item`; drop the tag if nothing else uses it.
    /// At most one link goes per call.
    pub fn remove_from_playlist(&self, item: i64, label: &str) -> MutationResult<Option<Removal>> {
        validate_label(label)?;
        info!("Request to remove item {} from playlist '{}'", item, label);

        self.store.with_session(|s| {
            let found = s
                .book_tags_starting_with(item, &self.codec.bare_name(label))?
                .into_iter()
                .find(|t| self.codec.belongs_to(&t.name, label));

            let Some(tag) = found else {
                debug!("Item {} is not in playlist '{}'", item, label);
                return Ok(None);
            };

            s.unlink_tag(tag.id, item)?;
            let tag_deleted = s.tag_link_count(tag.id)? == 0;
            if tag_deleted {
                s.delete_tag(tag.id)?;
                info!("Tag '{}' deleted", tag.name);
            }
            Ok(Some(Removal { tag, tag_deleted }))
        })
    }

    /// Start a playlist at ordinal 01 holding `item`.
    /// A label that already has any tag is left alone and reported as Ok(None).
    pub fn create_playlist(&self, item: i64, label: &str) -> MutationResult<Option<Tag>> {
        validate_label(label)?;
        info!("Request to create playlist '{}'", label);

        self.store.with_session(|s| {
            let existing = s
                .tags_starting_with(&self.codec.bare_name(label))?
                .into_iter()
                .find(|t| self.codec.belongs_to(&t.name, label));

            if let Some(existing) = existing {
                info!("Playlist '{}' already exists as '{}'", label, existing.name);
                return Ok(None);
            }

            let tag = s.insert_tag(&self.codec.encode(label, 1))?;
            s.link_tag(tag.id, item)?;
            info!("Created playlist tag '{}' with item {}", tag.name, item);
            Ok(Some(tag))
        })
    }

    pub fn item_in_tag(&self, item: i64, tag: i64) -> StoreResult<bool> {
        let present = self.store.with_session(|s| s.book_has_tag(item, tag))?;
        debug!("Checked tag id {} for item {}: {}", tag, item, present);
        Ok(present)
    }

    /// Delete playlist tags nobody links to any more. Only runs when asked.
    pub fn sweep_orphans(&self) -> MutationResult<Vec<Tag>> {
        self.store.with_session(|s| {
            let orphans = s.query(
                "SELECT t.id, t.name FROM tags t
                 WHERE t.name LIKE ?1 ESCAPE '\\'
                   AND NOT EXISTS (SELECT 1 FROM books_tags_link btl WHERE btl.tag = t.id)
                 ORDER BY t.name",
                params![starts_with_pattern(self.codec.prefix())],
                |row| {
                    Ok(Tag {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )?;
            for tag in &orphans {
                s.delete_tag(tag.id)?;
            }
            info!("Swept {} orphaned playlist tags", orphans.len());
            Ok(orphans)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MutationError;
    use crate::playlist::PlaylistCatalog;
    use crate::query::build_and_run;
    use crate::test_support::{Fixture, MUSIC, PREFIX};

    fn editor(fx: &Fixture) -> PlaylistEditor {
        PlaylistEditor::new(fx.store.clone(), PlaylistCodec::new(PREFIX))
    }

    #[test]
    fn test_add_mints_next_ordinal() {
        let fx = Fixture::new();
        fx.add_score(1, "Kesh", "Trad");
        fx.add_score(2, "Swallowtail", "Trad");
        fx.tag_book(1, "musicListBarnDance|01");

        let tag = editor(&fx).add_to_playlist(2, "BarnDance").unwrap().unwrap();
        assert_eq!(tag.name, "musicListBarnDance|02");
        assert_eq!(fx.book_tag_names(2), ["music", "musicListBarnDance|02"]);
    }

    #[test]
    fn test_add_can_mint_a_deleted_maximum_again() {
        let fx = Fixture::new();
        fx.add_score(1, "Kesh", "Trad");
        fx.tag_book(1, "musicListBarnDance|01");
        fx.tag_book(1, "musicListBarnDance|02");
        let ed = editor(&fx);

        // No ordinal memory: the next ordinal is read from the tags that exist,
        // so a deleted maximum can be minted again.
        // |02 goes away with its last link, |01 stays
        let removed = ed.remove_from_playlist(1, "BarnDance").unwrap().unwrap();
        assert_eq!(removed.tag.name, "musicListBarnDance|02");

        let tag = ed.add_to_playlist(1, "BarnDance").unwrap().unwrap();
        assert_eq!(tag.name, "musicListBarnDance|02");

        let tag = ed.add_to_playlist(1, "BarnDance").unwrap().unwrap();
        assert_eq!(tag.name, "musicListBarnDance|03");
    }

    #[test]
    fn test_add_to_unknown_label_is_noop() {
        let fx = Fixture::new();
        fx.add_score(1, "Kesh", "Trad");

        assert_eq!(editor(&fx).add_to_playlist(1, "Reel").unwrap(), None);
        assert_eq!(fx.tag_names(), ["music"]);
    }

    #[test]
    fn test_add_past_99_is_refused() {
        let fx = Fixture::new();
        fx.add_score(1, "Kesh", "Trad");
        fx.tag_book(1, "musicListLong|99");

        let err = editor(&fx).add_to_playlist(1, "Long").unwrap_err();
        assert!(matches!(err, MutationError::OrdinalsExhausted { .. }));
    }

    #[test]
    fn test_add_then_catalog_shows_higher_ordinal() {
        let fx = Fixture::new();
        fx.add_score(1, "Kesh", "Trad");
        fx.add_score(2, "Swallowtail", "Trad");
        let ed = editor(&fx);
        ed.create_playlist(1, "BarnDance").unwrap().unwrap();

        let added = ed.add_to_playlist(2, "BarnDance").unwrap().unwrap();
        let catalog = fx
            .store
            .with_session(|s| PlaylistCatalog::load(s, &PlaylistCodec::new(PREFIX)))
            .unwrap();
        assert_eq!(catalog.entries().len(), 1);
        assert_eq!(catalog.entries()[0].tag_id, added.id);
    }

    #[test]
    fn test_remove_last_link_deletes_tag() {
        let fx = Fixture::new();
        fx.add_score(1, "Kesh", "Trad");
        fx.tag_book(1, "musicListJigs|01");

        let removal = editor(&fx).remove_from_playlist(1, "Jigs").unwrap().unwrap();
        assert!(removal.tag_deleted);
        assert_eq!(fx.tag_names(), ["music"]);

        let catalog = fx
            .store
            .with_session(|s| PlaylistCatalog::load(s, &PlaylistCodec::new(PREFIX)))
            .unwrap();
        assert!(!catalog.contains("Jigs"));
    }

    #[test]
    fn test_remove_keeps_tag_still_linked_elsewhere() {
        let fx = Fixture::new();
        fx.add_score(1, "Kesh", "Trad");
        fx.add_score(2, "Swallowtail", "Trad");
        fx.tag_book(1, "musicListJigs|01");
        fx.tag_book(2, "musicListJigs|01");

        let removal = editor(&fx).remove_from_playlist(1, "Jigs").unwrap().unwrap();
        assert!(!removal.tag_deleted);
        assert_eq!(fx.book_tag_names(2), ["music", "musicListJigs|01"]);
        assert_eq!(fx.book_tag_names(1), ["music"]);
    }

    #[test]
    fn test_remove_takes_one_link_per_call() {
        let fx = Fixture::new();
        fx.add_score(1, "Kesh", "Trad");
        fx.tag_book(1, "musicListJigs|01");
        fx.tag_book(1, "musicListJigs|03");
        fx.tag_book(1, "musicListJigsFast|05");

        let removal = editor(&fx).remove_from_playlist(1, "Jigs").unwrap().unwrap();
        assert_eq!(removal.tag.name, "musicListJigs|03");
        assert_eq!(
            fx.book_tag_names(1),
            ["music", "musicListJigsFast|05", "musicListJigs|01"]
        );
    }

    #[test]
    fn test_remove_when_not_member_is_noop() {
        let fx = Fixture::new();
        fx.add_score(1, "Kesh", "Trad");
        fx.tag_book(2, "musicListJigs|01");

        assert_eq!(editor(&fx).remove_from_playlist(1, "Jigs").unwrap(), None);
        assert!(fx.tag_names().contains(&"musicListJigs|01".to_string()));
    }

    #[test]
    fn test_create_links_current_item() {
        let fx = Fixture::new();
        fx.add_score(3, "Drowsy Maggie", "Trad");

        let tag = editor(&fx).create_playlist(3, "Reel").unwrap().unwrap();
        assert_eq!(tag.name, "musicListReel|01");
        assert_eq!(fx.book_tag_names(3), ["music", "musicListReel|01"]);
    }

    #[test]
    fn test_create_existing_label_is_silent_noop() {
        let fx = Fixture::new();
        fx.add_score(3, "Drowsy Maggie", "Trad");
        fx.add_score(4, "Toss the Feathers", "Trad");
        let ed = editor(&fx);
        ed.create_playlist(3, "Reel").unwrap();

        assert_eq!(ed.create_playlist(4, "Reel").unwrap(), None);
        assert_eq!(fx.book_tag_names(4), ["music"]);
        assert_eq!(fx.tag_names(), ["music", "musicListReel|01"]);
    }

    #[test]
    fn test_create_matches_existing_label_in_other_case() {
        let fx = Fixture::new();
        fx.add_score(1, "Drowsy Maggie", "Trad");
        fx.add_score(2, "Toss the Feathers", "Trad");
        fx.tag_book(1, "musicListreel|01");

        assert_eq!(editor(&fx).create_playlist(2, "Reel").unwrap(), None);
        assert_eq!(fx.book_tag_names(2), ["music"]);
        assert_eq!(fx.tag_names(), ["music", "musicListreel|01"]);
    }

    #[test]
    fn test_remove_matches_label_in_other_case() {
        let fx = Fixture::new();
        fx.add_score(1, "Drowsy Maggie", "Trad");
        fx.tag_book(1, "musicListreel|01");
        let codec = PlaylistCodec::new(PREFIX);

        let listed = fx
            .store
            .with_session(|s| build_and_run(s, &codec, MUSIC, Some("Reel"), &[]))
            .unwrap();
        assert_eq!(listed.len(), 1);

        let removal = editor(&fx).remove_from_playlist(1, "Reel").unwrap().unwrap();
        assert_eq!(removal.tag.name, "musicListreel|01");
        assert!(removal.tag_deleted);
        assert_eq!(fx.book_tag_names(1), ["music"]);
    }

    #[test]
    fn test_add_keeps_stored_label_spelling() {
        let fx = Fixture::new();
        fx.add_score(1, "Drowsy Maggie", "Trad");
        fx.add_score(2, "Toss the Feathers", "Trad");
        fx.tag_book(1, "musicListreel|01");

        let tag = editor(&fx).add_to_playlist(2, "Reel").unwrap().unwrap();
        assert_eq!(tag.name, "musicListreel|02");
    }

    #[test]
    fn test_store_failure_comes_back_as_error() {
        let fx = Fixture::new();
        fx.add_score(1, "Kesh", "Trad");
        fx.conn().execute_batch("DROP TABLE tags").unwrap();

        let err = editor(&fx).add_to_playlist(1, "Jigs").unwrap_err();
        assert!(matches!(err, MutationError::Store(_)));
        let err = editor(&fx).create_playlist(1, "Jigs").unwrap_err();
        assert!(matches!(err, MutationError::Store(_)));
    }

    #[test]
    fn test_create_rejects_delimiter_in_label() {
        let fx = Fixture::new();
        let err = editor(&fx).create_playlist(1, "Reel|02").unwrap_err();
        assert_eq!(err, MutationError::InvalidLabel("Reel|02".to_string()));
    }

    #[test]
    fn test_item_in_tag() {
        let fx = Fixture::new();
        let tag = fx.tag_book(1, "musicListJigs|01");
        let ed = editor(&fx);

        assert!(ed.item_in_tag(1, tag).unwrap());
        assert!(!ed.item_in_tag(2, tag).unwrap());
    }

    #[test]
    fn test_sweep_removes_only_unlinked_playlist_tags() {
        let fx = Fixture::new();
        fx.add_score(1, "Kesh", "Trad");
        fx.tag_book(1, "musicListJigs|01");
        fx.ensure_tag("musicListJigs|02");
        fx.ensure_tag("unused");

        let swept = editor(&fx).sweep_orphans().unwrap();
        assert_eq!(swept.len(), 1);
        assert_eq!(swept[0].name, "musicListJigs|02");
        assert_eq!(fx.tag_names(), ["music", "musicListJigs|01", "unused"]);
    }
}
