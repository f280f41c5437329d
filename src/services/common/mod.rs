//! Common utilities shared by the library and playback services

/// Reactive property system for UI-facing state
pub mod property;

pub use property::Property;
