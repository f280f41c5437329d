/// Configuration inspection
pub mod config;
/// Interactive playback
pub mod play;
/// Playlist management
pub mod playlists;
