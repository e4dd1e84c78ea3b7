//! Tests for convention-driven mapping from content node trees
//!
//! Covers the default conventions (field name and camel-cased aliases, the
//! built-in id/name accessors), per-field rules and the scalar coercions.

use std::sync::Arc;

use chrono::NaiveDateTime;
use rustc_hash::FxHashMap;
use view_mapper::{
    ContentMapper, Mappable, MappingRule, MemoryNode, NodeRef, RuleMap, ScalarValue,
};

#[derive(Mappable, Debug, Default, Clone, PartialEq)]
struct ArticlePage {
    id: i64,
    name: String,
    heading: String,
    #[map(source = "bodyText")]
    body_copy: String,
    sub_heading: String,
    is_featured: bool,
    page_views: i32,
    rating: f64,
    published_on: Option<NaiveDateTime>,
    starts_on: NaiveDateTime,
}

fn article_node() -> NodeRef {
    MemoryNode::new(1001, "Article")
        .with_value("heading", "Welcome")
        .with_value("bodyText", "Body copy")
        .with_value("subHeading", "Sub heading")
        .with_value("isFeatured", "1")
        .with_value("pageViews", "2576")
        .with_value("rating", "4.5")
        .with_value("publishedOn", "2023-06-15T10:30:00")
        .with_value("startsOn", "2023-06-15 10:30:00")
        .into_node()
}

fn no_rules() -> RuleMap {
    RuleMap::default()
}

fn rules_for(field: &str, rule: MappingRule) -> RuleMap {
    let mut rules = RuleMap::default();
    rules.insert(field.to_string(), rule);
    rules
}

#[test]
fn test_maps_by_convention() {
    let mapper = ContentMapper::new();
    let node = article_node();
    let mut model = ArticlePage::default();

    mapper.map_node(&node, &mut model, "", &no_rules()).unwrap();

    assert_eq!(model.id, 1001);
    assert_eq!(model.name, "Article");
    assert_eq!(model.heading, "Welcome");
    // snake_case field names find camel-cased aliases
    assert_eq!(model.sub_heading, "Sub heading");
    // the #[map(source = ...)] attribute redirects the read
    assert_eq!(model.body_copy, "Body copy");
}

#[test]
fn test_scalar_coercions() {
    let mapper = ContentMapper::new();
    let node = article_node();
    let mut model = ArticlePage::default();

    mapper.map_node(&node, &mut model, "", &no_rules()).unwrap();

    assert!(model.is_featured);
    assert_eq!(model.page_views, 2576);
    assert!((model.rating - 4.5).abs() < f64::EPSILON);
    assert_eq!(
        model.published_on,
        Some(
            NaiveDateTime::parse_from_str("2023-06-15T10:30:00", "%Y-%m-%dT%H:%M:%S").unwrap()
        )
    );
    assert_eq!(
        model.starts_on,
        NaiveDateTime::parse_from_str("2023-06-15 10:30:00", "%Y-%m-%d %H:%M:%S").unwrap()
    );
}

#[test]
fn test_mapping_the_same_node_twice_gives_identical_models() {
    let mapper = ContentMapper::new();
    let node = article_node();

    let mut first = ArticlePage::default();
    mapper.map_node(&node, &mut first, "", &no_rules()).unwrap();
    let mut second = ArticlePage::default();
    mapper.map_node(&node, &mut second, "", &no_rules()).unwrap();

    assert_eq!(first.heading, "Welcome");
    assert_eq!(first, second);
}

#[test]
fn test_boolean_parses_text_case_insensitively() {
    let mapper = ContentMapper::new();
    let node = MemoryNode::new(1, "n").with_value("isFeatured", "True").into_node();
    let mut model = ArticlePage::default();

    mapper.map_node(&node, &mut model, "", &no_rules()).unwrap();

    assert!(model.is_featured);
}

#[test]
fn test_unparseable_values_are_silent_noops() {
    let mapper = ContentMapper::new();
    let node = MemoryNode::new(1, "n")
        .with_value("pageViews", "not a number")
        .with_value("rating", "also not")
        .with_value("publishedOn", "15/06/2023")
        .into_node();
    let mut model = ArticlePage::default();

    mapper.map_node(&node, &mut model, "", &no_rules()).unwrap();

    assert_eq!(model.page_views, 0);
    assert!((model.rating - 0.0).abs() < f64::EPSILON);
    assert_eq!(model.published_on, None);
}

#[test]
fn test_integer_narrowing_overflow_is_a_noop() {
    let mapper = ContentMapper::new();
    // Too large for the i32 target field
    let node = MemoryNode::new(1, "n").with_value("pageViews", 5_000_000_000_i64).into_node();
    let mut model = ArticlePage::default();

    mapper.map_node(&node, &mut model, "", &no_rules()).unwrap();

    assert_eq!(model.page_views, 0);
}

#[test]
fn test_zero_date_is_suppressed_for_nullable_fields_only() {
    let mapper = ContentMapper::new();
    let node = MemoryNode::new(1, "n")
        .with_value("publishedOn", "0001-01-01T00:00:00")
        .with_value("startsOn", "0001-01-01T00:00:00")
        .into_node();
    let mut model = ArticlePage::default();

    mapper.map_node(&node, &mut model, "", &no_rules()).unwrap();

    assert_eq!(model.published_on, None);
    // the non-nullable field takes the placeholder as-is
    assert_eq!(
        model.starts_on,
        NaiveDateTime::parse_from_str("0001-01-01T00:00:00", "%Y-%m-%dT%H:%M:%S").unwrap()
    );
}

#[test]
fn test_empty_string_does_not_overwrite() {
    let mapper = ContentMapper::new();
    let node = MemoryNode::new(1, "n").with_value("heading", "").into_node();
    let mut model = ArticlePage {
        heading: "existing".to_string(),
        ..ArticlePage::default()
    };

    mapper.map_node(&node, &mut model, "", &no_rules()).unwrap();

    assert_eq!(model.heading, "existing");
}

#[test]
fn test_caller_rule_overrides_source_alias() {
    let mapper = ContentMapper::new();
    let node = MemoryNode::new(1, "n").with_value("title", "From title").into_node();
    let mut model = ArticlePage::default();
    let rules = rules_for("heading", MappingRule::new().with_source("title"));

    mapper.map_node(&node, &mut model, "", &rules).unwrap();

    assert_eq!(model.heading, "From title");
}

#[test]
fn test_levels_above_reads_from_ancestor() {
    let mapper = ContentMapper::new();
    let parent = MemoryNode::new(10, "Section")
        .with_value("heading", "Section heading")
        .into_node();
    let child = MemoryNode::new(11, "Page").with_parent(&parent).into_node();
    let mut model = ArticlePage::default();
    let rules = rules_for("heading", MappingRule::new().with_levels_above(1));

    mapper.map_node(&child, &mut model, "", &rules).unwrap();

    assert_eq!(model.heading, "Section heading");
}

#[test]
fn test_levels_above_saturates_at_the_root() {
    let mapper = ContentMapper::new();
    let root = MemoryNode::new(10, "Root")
        .with_value("heading", "Root heading")
        .into_node();
    let child = MemoryNode::new(11, "Page").with_parent(&root).into_node();
    let mut model = ArticlePage::default();
    // Asking for more levels than exist stops at the root instead of failing
    let rules = rules_for("heading", MappingRule::new().with_levels_above(5));

    mapper.map_node(&child, &mut model, "", &rules).unwrap();

    assert_eq!(model.heading, "Root heading");
}

#[test]
fn test_recursive_walks_ancestors_until_found() {
    let mapper = ContentMapper::new();
    let grandparent = MemoryNode::new(1, "Site")
        .with_value("heading", "Site-wide heading")
        .into_node();
    let parent = MemoryNode::new(2, "Section").with_parent(&grandparent).into_node();
    let child = MemoryNode::new(3, "Page").with_parent(&parent).into_node();
    let mut model = ArticlePage::default();
    let rules = rules_for("heading", MappingRule::new().recursive());

    mapper.map_node(&child, &mut model, "", &rules).unwrap();

    assert_eq!(model.heading, "Site-wide heading");
}

#[test]
fn test_default_value_applies_only_when_source_is_missing() {
    let mapper = ContentMapper::new();
    let mut model = ArticlePage::default();
    let rules = rules_for(
        "heading",
        MappingRule::new().with_default(ScalarValue::Str("Default heading".to_string())),
    );

    let empty = MemoryNode::new(1, "n").into_node();
    mapper.map_node(&empty, &mut model, "", &rules).unwrap();
    assert_eq!(model.heading, "Default heading");

    let populated = MemoryNode::new(1, "n").with_value("heading", "Real heading").into_node();
    mapper.map_node(&populated, &mut model, "", &rules).unwrap();
    assert_eq!(model.heading, "Real heading");
}

#[test]
fn test_ignore_skips_the_field() {
    let mapper = ContentMapper::new();
    let node = article_node();
    let mut model = ArticlePage::default();
    let rules = rules_for("heading", MappingRule::new().ignored());

    mapper.map_node(&node, &mut model, "", &rules).unwrap();

    assert_eq!(model.heading, "");
    assert_eq!(model.body_copy, "Body copy");
}

#[test]
fn test_conditional_mapping_compares_case_insensitively() {
    let mapper = ContentMapper::new();
    let node = MemoryNode::new(1, "n")
        .with_value("heading", "Shown")
        .with_value("showHeading", "True")
        .into_node();
    let mut model = ArticlePage::default();
    let rules = rules_for(
        "heading",
        MappingRule::new().with_condition("showHeading", "true"),
    );

    mapper.map_node(&node, &mut model, "", &rules).unwrap();
    assert_eq!(model.heading, "Shown");

    let hidden = MemoryNode::new(1, "n")
        .with_value("heading", "Hidden")
        .with_value("showHeading", "false")
        .into_node();
    let mut model = ArticlePage::default();
    mapper.map_node(&hidden, &mut model, "", &rules).unwrap();
    assert_eq!(model.heading, "");
}

#[test]
fn test_formatter_applies_to_resolved_string() {
    let mapper = ContentMapper::new();
    let node = article_node();
    let mut model = ArticlePage::default();
    let rules = rules_for(
        "heading",
        MappingRule::new().with_formatter(Arc::new(|raw: &str| raw.to_uppercase())),
    );

    mapper.map_node(&node, &mut model, "", &rules).unwrap();

    assert_eq!(model.heading, "WELCOME");
}

#[test]
fn test_dictionary_key_reads_from_lookup_table() {
    let mut lookup = FxHashMap::default();
    lookup.insert("banner.heading".to_string(), "From lookup".to_string());
    let mapper = ContentMapper::new().with_lookup(Arc::new(lookup));

    let node = article_node();
    let mut model = ArticlePage::default();
    let rules = rules_for(
        "heading",
        MappingRule::new().with_dictionary_key("banner.heading"),
    );

    mapper.map_node(&node, &mut model, "", &rules).unwrap();

    // the lookup wins; the node's own heading is never consulted
    assert_eq!(model.heading, "From lookup");
}

#[test]
fn test_localized_value_with_default_language_fallback() {
    use view_mapper::{FallbackChain, FallbackMethod};

    let mapper = ContentMapper::new();
    let node = MemoryNode::new(1, "n")
        .with_value("heading", "Neutral")
        .with_localized_value("da", "heading", "Dansk")
        .into_node();

    let mut model = ArticlePage::default();
    mapper.map_node(&node, &mut model, "da", &no_rules()).unwrap();
    assert_eq!(model.heading, "Dansk");

    // "sv" has no localized value; fall back to the neutral culture
    let rules = rules_for(
        "heading",
        MappingRule::new().with_fallback(FallbackChain::from_slice(&[
            FallbackMethod::DefaultLanguage,
        ])),
    );
    let mut model = ArticlePage::default();
    mapper.map_node(&node, &mut model, "sv", &rules).unwrap();
    assert_eq!(model.heading, "Neutral");
}

#[test]
fn test_annotation_rules_merge_under_caller_rules() {
    #[derive(Mappable, Debug, Default, Clone)]
    struct Annotated {
        #[map(source = "annotationAlias", default = "fallback text")]
        text: String,
    }

    let mapper = ContentMapper::new();
    let node = MemoryNode::new(1, "n")
        .with_value("annotationAlias", "via annotation")
        .with_value("callerAlias", "via caller")
        .into_node();

    let mut model = Annotated::default();
    mapper.map_node(&node, &mut model, "", &RuleMap::default()).unwrap();
    assert_eq!(model.text, "via annotation");

    // the caller's source wins while the annotation's default still applies
    let mut model = Annotated::default();
    let rules = rules_for("text", MappingRule::new().with_source("callerAlias"));
    mapper.map_node(&node, &mut model, "", &rules).unwrap();
    assert_eq!(model.text, "via caller");

    let empty = MemoryNode::new(1, "n").into_node();
    let mut model = Annotated::default();
    mapper.map_node(&empty, &mut model, "", &RuleMap::default()).unwrap();
    assert_eq!(model.text, "fallback text");
}
