//! Media file view model

use macros::Mappable;
use serde::{Deserialize, Serialize};

/// A media item picked on a content node
///
/// Populated by the default picked-media mappings from the media node's
/// standard properties; callers can also map it conventionally like any
/// other nested model.
#[derive(Mappable, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaFile {
    /// Identifier of the media node
    pub id: i64,
    /// Display name of the media node
    pub name: String,
    /// Site-relative URL of the file
    pub url: String,
    /// Absolute URL, built from the configured assets root
    pub domain_with_url: String,
    /// Media type name, e.g. `Image`
    pub media_type: String,
    /// Pixel width, zero when not an image
    pub width: i64,
    /// Pixel height, zero when not an image
    pub height: i64,
    /// File size in bytes
    pub size: i64,
    /// File extension without the dot
    pub file_extension: String,
    /// Alternative text for accessibility
    pub alt_text: String,
}
