//! Tests for node collection mapping and the built-in picked-media
//! mappings

use std::any::Any;
use std::sync::Arc;

use view_mapper::{
    ContentMapper, ContentNode, FallbackChain, Mappable, MapperConfig, MappingContext, MediaFile,
    MemoryNode, NodeRef, PropertyValueGetter, RuleMap, Value,
};

#[derive(Mappable, Debug, Default, Clone)]
struct Comment {
    id: i64,
    name: String,
    text: String,
}

fn comment_node(id: i64, name: &str, text: &str) -> NodeRef {
    MemoryNode::new(id, name).with_value("text", text).into_node()
}

#[test]
fn test_node_collection_maps_each_node_to_an_item() {
    let mapper = ContentMapper::new();
    let nodes = vec![
        comment_node(1, "Fred", "Nice article"),
        comment_node(2, "Sally", "Agreed"),
    ];
    let mut comments: Vec<Comment> = Vec::new();

    mapper
        .map_node_collection(&nodes, &mut comments, "", &RuleMap::default(), false)
        .unwrap();

    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].id, 1);
    assert_eq!(comments[0].name, "Fred");
    assert_eq!(comments[0].text, "Nice article");
    assert_eq!(comments[1].name, "Sally");
}

#[test]
fn test_node_collection_clear_first_replaces_existing_items() {
    let mapper = ContentMapper::new();
    let mut comments = vec![Comment {
        id: 99,
        name: "Stale".to_string(),
        text: String::new(),
    }];
    let nodes = vec![comment_node(1, "Fred", "Nice article")];

    mapper
        .map_node_collection(&nodes, &mut comments, "", &RuleMap::default(), true)
        .unwrap();

    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].id, 1);
}

#[test]
fn test_node_collection_without_clear_appends() {
    let mapper = ContentMapper::new();
    let mut comments = vec![Comment {
        id: 99,
        name: "Kept".to_string(),
        text: String::new(),
    }];
    let nodes = vec![comment_node(1, "Fred", "Nice article")];

    mapper
        .map_node_collection(&nodes, &mut comments, "", &RuleMap::default(), false)
        .unwrap();

    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].name, "Kept");
    assert_eq!(comments[1].name, "Fred");
}

#[test]
fn test_type_level_custom_mapping_builds_collection_items() {
    let mut mapper = ContentMapper::new();
    mapper.add_custom_mapping(
        "Comment",
        None,
        Arc::new(
            |_: &ContentMapper,
             _: &MappingContext,
             node: &dyn ContentNode,
             _: &str,
             _: &FallbackChain|
             -> Option<Box<dyn Any>> {
                if node.id() < 0 {
                    return None;
                }
                Some(Box::new(Comment {
                    id: node.id(),
                    name: node.name().to_uppercase(),
                    text: String::new(),
                }))
            },
        ),
    );

    // The node that maps to nothing is skipped rather than aborting the run.
    let nodes = vec![comment_node(1, "Fred", ""), comment_node(-1, "Bad", "")];
    let mut comments: Vec<Comment> = Vec::new();
    mapper
        .map_node_collection(&nodes, &mut comments, "", &RuleMap::default(), false)
        .unwrap();

    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].name, "FRED");
}

fn media_node(id: i64, name: &str, url: &str) -> NodeRef {
    MemoryNode::new(id, name)
        .with_value("url", url)
        .with_value("mediaType", "Image")
        .with_value("width", 800_i64)
        .with_value("height", 600_i64)
        .with_value("size", 51200_i64)
        .with_value("extension", "jpg")
        .with_value("altText", name)
        .into_node()
}

#[derive(Mappable, Debug, Default, Clone)]
struct GalleryPage {
    hero: MediaFile,
    gallery: Vec<MediaFile>,
}

#[test]
fn test_media_file_field_maps_from_a_picked_node() {
    let config = MapperConfig {
        assets_root_url: Some("https://cdn.example.com".to_string()),
        ..MapperConfig::default()
    };
    let mapper = ContentMapper::with_config(config);
    let node = MemoryNode::new(1, "page")
        .with_value("hero", Value::Node(media_node(10, "Cat", "/media/cat.jpg")))
        .into_node();
    let mut model = GalleryPage::default();

    mapper.map_node(&node, &mut model, "", &RuleMap::default()).unwrap();

    assert_eq!(model.hero.id, 10);
    assert_eq!(model.hero.name, "Cat");
    assert_eq!(model.hero.url, "/media/cat.jpg");
    assert_eq!(model.hero.domain_with_url, "https://cdn.example.com/media/cat.jpg");
    assert_eq!(model.hero.media_type, "Image");
    assert_eq!(model.hero.width, 800);
    assert_eq!(model.hero.height, 600);
    assert_eq!(model.hero.size, 51200);
    assert_eq!(model.hero.file_extension, "jpg");
    assert_eq!(model.hero.alt_text, "Cat");
}

#[test]
fn test_media_file_url_is_bare_without_an_assets_root() {
    let mapper = ContentMapper::new();
    let node = MemoryNode::new(1, "page")
        .with_value("hero", Value::Node(media_node(10, "Cat", "/media/cat.jpg")))
        .into_node();
    let mut model = GalleryPage::default();

    mapper.map_node(&node, &mut model, "", &RuleMap::default()).unwrap();

    assert_eq!(model.hero.domain_with_url, "/media/cat.jpg");
}

#[test]
fn test_media_file_collection_maps_every_picked_node() {
    let mapper = ContentMapper::new();
    let picked = vec![
        media_node(10, "Cat", "/media/cat.jpg"),
        media_node(11, "Dog", "/media/dog.jpg"),
    ];
    let node = MemoryNode::new(1, "page")
        .with_value("gallery", Value::Nodes(picked))
        .into_node();
    let mut model = GalleryPage::default();

    mapper.map_node(&node, &mut model, "", &RuleMap::default()).unwrap();

    assert_eq!(model.gallery.len(), 2);
    assert_eq!(model.gallery[0].name, "Cat");
    assert_eq!(model.gallery[1].url, "/media/dog.jpg");
}

#[test]
fn test_caller_registration_replaces_the_default_media_mapping() {
    let mut mapper = ContentMapper::new();
    mapper.add_custom_mapping(
        "MediaFile",
        None,
        Arc::new(
            |mapper: &ContentMapper,
             ctx: &MappingContext,
             node: &dyn ContentNode,
             alias: &str,
             fallback: &FallbackChain|
             -> Option<Box<dyn Any>> {
                let picked = mapper
                    .value_getter()
                    .property_value(node, alias, ctx.culture, fallback)?;
                let Value::Node(media) = picked else {
                    return None;
                };
                Some(Box::new(MediaFile {
                    id: media.id(),
                    name: format!("override:{}", media.name()),
                    ..MediaFile::default()
                }))
            },
        ),
    );

    let node = MemoryNode::new(1, "page")
        .with_value("hero", Value::Node(media_node(10, "Cat", "/media/cat.jpg")))
        .into_node();
    let mut model = GalleryPage::default();

    mapper.map_node(&node, &mut model, "", &RuleMap::default()).unwrap();

    // The re-registered mapping wins over the built-in one.
    assert_eq!(model.hero.id, 10);
    assert_eq!(model.hero.name, "override:Cat");
    assert_eq!(model.hero.url, "");
}

#[test]
fn test_media_file_collection_maps_directly_from_nodes() {
    let mapper = ContentMapper::new();
    let nodes = vec![media_node(10, "Cat", "/media/cat.jpg")];
    let mut files: Vec<MediaFile> = Vec::new();

    mapper
        .map_node_collection(&nodes, &mut files, "", &RuleMap::default(), false)
        .unwrap();

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].id, 10);
    assert_eq!(files[0].url, "/media/cat.jpg");
}
