//! Default custom mappings for picked media
//!
//! Installed automatically for `MediaFile` and `Vec<MediaFile>` fields.
//! Media properties are read from the media node under conventional
//! aliases: `url`, `mediaType`, `width`, `height`, `size`, `extension` and
//! `altText`.

use std::any::Any;

use crate::mapper::{ContentMapper, MappingContext};
use crate::models::media::MediaFile;
use crate::source::{ContentNode, FallbackChain, NodeRef, Value};

/// Node-based mapping for a single `MediaFile` field
///
/// With an alias, the picked media node is read off that property; with an
/// empty alias the node itself is treated as the media node, which is how
/// collection items arrive.
pub fn map_media_file(
    mapper: &ContentMapper,
    ctx: &MappingContext,
    node: &dyn ContentNode,
    alias: &str,
    fallback: &FallbackChain,
) -> Option<Box<dyn Any>> {
    let root = mapper.config().assets_root_url.as_deref();
    if alias.is_empty() {
        return Some(Box::new(media_file_from(node, root)));
    }
    let value = mapper
        .value_getter()
        .property_value(node, alias, ctx.culture, fallback)?;
    let media = first_node(&value)?;
    Some(Box::new(media_file_from(media.as_ref(), root)))
}

/// Node-based mapping for a `Vec<MediaFile>` field
pub fn map_media_file_collection(
    mapper: &ContentMapper,
    ctx: &MappingContext,
    node: &dyn ContentNode,
    alias: &str,
    fallback: &FallbackChain,
) -> Option<Box<dyn Any>> {
    let value = mapper
        .value_getter()
        .property_value(node, alias, ctx.culture, fallback)?;
    map_media_file_collection_object(mapper, ctx, &value)
}

/// Value-based mapping for a single `MediaFile` field
pub fn map_media_file_object(
    mapper: &ContentMapper,
    _ctx: &MappingContext,
    value: &Value,
) -> Option<Box<dyn Any>> {
    let media = first_node(value)?;
    Some(Box::new(media_file_from(
        media.as_ref(),
        mapper.config().assets_root_url.as_deref(),
    )))
}

/// Value-based mapping for a `Vec<MediaFile>` field
pub fn map_media_file_collection_object(
    mapper: &ContentMapper,
    _ctx: &MappingContext,
    value: &Value,
) -> Option<Box<dyn Any>> {
    let root = mapper.config().assets_root_url.as_deref();
    let files: Vec<MediaFile> = match value {
        Value::Node(node) => vec![media_file_from(node.as_ref(), root)],
        Value::Nodes(nodes) => nodes
            .iter()
            .map(|node| media_file_from(node.as_ref(), root))
            .collect(),
        _ => return None,
    };
    Some(Box::new(files))
}

/// Build a `MediaFile` from a media node's conventional properties
#[must_use]
pub fn media_file_from(node: &dyn ContentNode, assets_root_url: Option<&str>) -> MediaFile {
    let url = text_value(node, "url");
    let domain_with_url = match assets_root_url {
        Some(root) => format!("{root}{url}"),
        None => url.clone(),
    };
    MediaFile {
        id: node.id(),
        name: node.name().to_string(),
        url,
        domain_with_url,
        media_type: text_value(node, "mediaType"),
        width: int_value(node, "width"),
        height: int_value(node, "height"),
        size: int_value(node, "size"),
        file_extension: text_value(node, "extension"),
        alt_text: text_value(node, "altText"),
    }
}

fn first_node(value: &Value) -> Option<NodeRef> {
    match value {
        Value::Node(node) => Some(node.clone()),
        Value::Nodes(nodes) => nodes.first().cloned(),
        _ => None,
    }
}

fn text_value(node: &dyn ContentNode, alias: &str) -> String {
    node.raw_value(alias, "")
        .map(|value| value.render())
        .unwrap_or_default()
}

fn int_value(node: &dyn ContentNode, alias: &str) -> i64 {
    match node.raw_value(alias, "") {
        Some(Value::Int(value)) => value,
        Some(other) => other.render().trim().parse().unwrap_or_default(),
        None => 0,
    }
}
