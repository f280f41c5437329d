/// Shared building blocks for services
pub mod common;
/// Track library, catalog and playlists
pub mod library;
/// Playback orchestration
pub mod playback;

pub use library::{PlaylistManager, Track, TrackCatalog};
pub use playback::{PlaybackSession, SimulatedEngine};
