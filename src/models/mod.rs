//! Built-in view models
//!
//! Models for media picked off content nodes, together with the default
//! custom mappings that populate them.

pub mod media;
pub mod picked_media;

pub use media::MediaFile;
