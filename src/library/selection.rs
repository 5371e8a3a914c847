// Browser state owned by the host and handed to every MusicLibrary call
// Nothing here touches the store, so it can be driven in tests without one.

use super::activation::ActivationGuard;
use super::table::ResultTable;
use crate::filters::FilterPredicateSet;
use crate::playlist::PlaylistCatalog;

/// Which playlist and which filter predicates are applied.
/// The playlist is kept by label - tag ids and ordinals move around as items are added and removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveSelection {
    pub active_label: Option<String>,
    pub filters: FilterPredicateSet,
}

impl ActiveSelection {
    pub fn new(filters: FilterPredicateSet) -> Self {
        Self {
            active_label: None,
            filters,
        }
    }

    pub fn active_label(&self) -> Option<&str> {
        self.active_label.as_deref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct BrowserState {
    pub selection: ActiveSelection,
    pub catalog: PlaylistCatalog,
    /// Index into `catalog.labels()`; 0 is "All items".
    pub active_index: usize,
    pub table: ResultTable,
    /// Item of the last accepted activation.
    pub selected_item: Option<i64>,
    /// Set once the catalog and table were loaded; a later show skips the reload.
    pub loaded: bool,
    pub(crate) activation: ActivationGuard,
}

impl BrowserState {
    pub fn new(selection: ActiveSelection) -> Self {
        Self {
            selection,
            ..Self::default()
        }
    }

    /// Point the active index at the current label in a freshly loaded catalog.
    /// A label that disappeared falls back to "All items".
    pub fn resolve_active(&mut self) {
        self.active_index = self.catalog.resolve_active(self.selection.active_label());
        if self.active_index == 0 {
            self.selection.active_label = None;
        }
    }
}
