//! Track library: catalog access, library views and playlists.
//!
//! The catalog and playlist store are external collaborators reached through
//! the [`TrackCatalog`] and [`PlaylistStore`] traits. Everything here treats
//! tracks as immutable values identified by [`TrackId`].

/// Track catalog contract and in-memory implementation
pub mod catalog;
/// Playlist persistence errors
pub mod error;
/// Playlist manager with persist-after-mutation
pub mod playlists;
/// Playlist store contract and JSON file store
pub mod store;
/// Track, album and playlist types
pub mod types;
/// Search, sort and grouping over track lists
pub mod view;

#[cfg(test)]
mod tests;

pub use catalog::{MemoryCatalog, TrackCatalog};
pub use error::StoreError;
pub use playlists::{FavoritesChange, PlaylistManager};
pub use store::{JsonPlaylistStore, PlaylistStore};
pub use types::{Album, MediaKind, Playlist, PlaylistId, Track, TrackId};
pub use view::SortOption;
