// Library browser core - wires catalog, filters, query and editor together
// The host owns the BrowserState and passes it into every call; this type only holds
// configuration and where the store lives.

pub mod activation; // duplicate activation guard
pub mod selection;  // active selection + loaded flag
pub mod table;      // result rows + live search

pub use activation::ActivationGuard;
pub use selection::{ActiveSelection, BrowserState};
pub use table::{Column, ResultTable, COLUMNS};

use crate::config::Config;
use crate::error::{MutationError, MutationResult, StoreResult};
use crate::filters::FilterPredicateSet;
use crate::keyboard::{KeyboardBus, KeyboardCommand, SearchFocus};
use crate::playlist::{PlaylistCatalog, PlaylistCodec, PlaylistEditor, Removal};
use crate::query;
use crate::store::{Tag, TagStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// Emitted when the user picks an item; the host renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongSelected {
    pub path: PathBuf,
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct MusicLibrary {
    config: Config,
    store: TagStore,
    codec: PlaylistCodec,
    editor: PlaylistEditor,
    search_focus: SearchFocus,
}

impl MusicLibrary {
    pub fn new(config: Config) -> Self {
        let store = TagStore::new(config.database_path());
        let codec = PlaylistCodec::new(config.list_prefix.clone());
        let editor = PlaylistEditor::new(store.clone(), codec.clone());
        let search_focus = SearchFocus::new(config.force_onboard_keyboard);
        info!("Library at {}", store.path().display());
        Self {
            config,
            store,
            codec,
            editor,
            search_focus,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn codec(&self) -> &PlaylistCodec {
        &self.codec
    }

    pub fn editor(&self) -> &PlaylistEditor {
        &self.editor
    }

    /// Discover the filter predicates and start with nothing loaded and "None" checked.
    pub fn open(&self) -> StoreResult<BrowserState> {
        let filters = self.store.with_session(|s| {
            FilterPredicateSet::discover(
                s,
                &self.config.music_tag,
                &self.config.list_prefix,
                self.config.filter_capacity,
            )
        })?;
        info!("Discovered {} filter predicates", filters.predicates().len());
        Ok(BrowserState::new(ActiveSelection::new(filters)))
    }

    /// The widget became visible. Reloads catalog and items unless already loaded; returns whether it did.
    pub fn on_show(&self, state: &mut BrowserState) -> StoreResult<bool> {
        let reloaded = if state.loaded {
            debug!("Already loaded, skipping reload");
            false
        } else {
            self.store.with_session(|s| {
                self.load_catalog(s, state)?;
                self.load_items(s, state)
            })?;
            state.loaded = true;
            true
        };
        state.table.apply_filter("");
        Ok(reloaded)
    }

    /// The widget was hidden. Contents and choices stay as they are for the next show.
    pub fn on_hide(&self, state: &mut BrowserState) {
        debug!("Hidden with {} rows loaded", state.table.len());
    }

    /// Force the next `on_show` to reload.
    pub fn invalidate(&self, state: &mut BrowserState) {
        state.loaded = false;
    }

    pub fn reload_playlists(&self, state: &mut BrowserState) -> StoreResult<()> {
        self.store.with_session(|s| self.load_catalog(s, state))
    }

    /// Re-run the item query for the current selection.
    pub fn refresh(&self, state: &mut BrowserState) -> StoreResult<()> {
        self.store.with_session(|s| self.load_items(s, state))
    }

    /// Pick a playlist by its index in `catalog.labels()` (0 = all items) and reload items.
    pub fn change_list(&self, state: &mut BrowserState, index: usize) -> StoreResult<()> {
        let label = state.catalog.get(index).map(|e| e.label.clone());
        state.active_index = if label.is_some() { index } else { 0 };
        info!(
            "Active list now {}",
            label.as_deref().unwrap_or(crate::playlist::ALL_ITEMS)
        );
        state.selection.active_label = label;
        self.refresh(state)
    }

    pub fn toggle_filter(
        &self,
        state: &mut BrowserState,
        index: usize,
        on: bool,
    ) -> StoreResult<()> {
        state.selection.filters.toggle(index, on);
        self.refresh(state)
    }

    pub fn set_all_filters(&self, state: &mut BrowserState, on: bool) -> StoreResult<()> {
        state.selection.filters.set_all(on);
        self.refresh(state)
    }

    pub fn set_no_filters(&self, state: &mut BrowserState, on: bool) -> StoreResult<()> {
        state.selection.filters.set_none(on);
        self.refresh(state)
    }

    /// Live search over the loaded rows.
    pub fn search(&self, state: &mut BrowserState, text: &str) {
        debug!("Filtering for string '{}'", text);
        state.table.apply_filter(text);
    }

    /// A row was tapped. Returns the selection event unless it repeats the same row within the window.
    pub fn activate(
        &self,
        state: &mut BrowserState,
        row: usize,
        now: DateTime<Utc>,
    ) -> Option<SongSelected> {
        let item = state.table.row(row)?.clone();
        if !state.activation.accept(row, now) {
            debug!("Row {} activated again within the window, ignoring", row);
            return None;
        }
        state.selected_item = Some(item.id);
        let event = SongSelected {
            path: self.config.library_path.join(&item.path),
            title: item.title,
        };
        info!("Selected {}", event.path.display());
        Some(event)
    }

    pub fn search_focus_changed(
        &self,
        focused: bool,
        bus: &mut dyn KeyboardBus,
    ) -> Option<KeyboardCommand> {
        self.search_focus.focus_changed(focused, bus)
    }

    pub fn add_selected_to(
        &self,
        state: &mut BrowserState,
        label: &str,
    ) -> MutationResult<Option<Tag>> {
        let item = state.selected_item.ok_or(MutationError::NoItemSelected)?;
        let added = self.editor.add_to_playlist(item, label)?;
        self.reload_after_mutation(state)?;
        Ok(added)
    }

    pub fn remove_selected_from(
        &self,
        state: &mut BrowserState,
        label: &str,
    ) -> MutationResult<Option<Removal>> {
        let item = state.selected_item.ok_or(MutationError::NoItemSelected)?;
        let removed = self.editor.remove_from_playlist(item, label)?;
        self.reload_after_mutation(state)?;
        Ok(removed)
    }

    /// New playlist holding the selected item. The active list does not change.
    pub fn create_playlist(
        &self,
        state: &mut BrowserState,
        label: &str,
    ) -> MutationResult<Option<Tag>> {
        let item = state.selected_item.ok_or(MutationError::NoItemSelected)?;
        let created = self.editor.create_playlist(item, label)?;
        if created.is_some() {
            self.reload_playlists(state)?;
        }
        Ok(created)
    }

    fn reload_after_mutation(&self, state: &mut BrowserState) -> StoreResult<()> {
        self.store.with_session(|s| {
            self.load_catalog(s, state)?;
            self.load_items(s, state)
        })
    }

    fn load_catalog(
        &self,
        session: &crate::store::StoreSession,
        state: &mut BrowserState,
    ) -> StoreResult<()> {
        state.catalog = PlaylistCatalog::load(session, &self.codec)?;
        state.resolve_active();
        Ok(())
    }

    fn load_items(
        &self,
        session: &crate::store::StoreSession,
        state: &mut BrowserState,
    ) -> StoreResult<()> {
        let enabled = state.selection.filters.enabled_names();
        let items = query::build_and_run(
            session,
            &self.codec,
            &self.config.music_tag,
            state.selection.active_label(),
            &enabled,
        )?;
        debug!("Completed item retrieval, {} rows", items.len());
        state.table = ResultTable::new(items);
        state.activation.reset();
        Ok(())
    }
}
