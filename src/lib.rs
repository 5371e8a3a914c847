// tagshelf Library - playlist and filter core of the score library browser
// Playlists live as prefixed tags inside calibre's own tag table

pub mod config;   // settings and preferences
pub mod error;    // store / mutation errors
pub mod filters;  // most-used tags as toggleable predicates
pub mod keyboard; // on-screen keyboard show/hide for the search box
pub mod library;  // browser state + the MusicLibrary facade
pub mod playlist; // playlist codec, catalog, membership editor
pub mod query;    // item query builder
pub mod store;    // calibre metadata.db adapter

#[cfg(test)]
pub(crate) mod test_support;

// Export the stuff other modules actually use
pub use config::Config;
pub use error::{MutationError, StoreError};
pub use library::{BrowserState, MusicLibrary, SongSelected};
pub use playlist::{PlaylistCatalog, PlaylistCodec, PlaylistEditor};
pub use query::Item;
