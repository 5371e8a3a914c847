// Playlists layered on calibre tags
// A playlist is not stored anywhere - it is every tag named <prefix><label>|<NN>.

pub mod catalog; // selectable playlists + active resolution
pub mod codec;   // tag name <-> (label, ordinal)
pub mod editor;  // add / remove / create membership

pub use catalog::{PlaylistCatalog, PlaylistEntry, ALL_ITEMS};
pub use codec::{PlaylistCodec, PlaylistTag};
pub use editor::{PlaylistEditor, Removal};
