//! Tests for the `Mappable` derive: field catalogs, annotation rules and
//! the generated trait surface

use chrono::NaiveDateTime;
use view_mapper::{
    FallbackMethod, FieldKind, Mappable, MappableCollection, MappableTrait, ScalarValue,
};

#[derive(Mappable, Debug, Default, Clone, PartialEq)]
struct Landing {
    #[map(source = "pageTitle")]
    title: String,
    #[map(levels_above = 1)]
    section: String,
    #[map(concat = "street, city", separator = ", ")]
    address: String,
    #[map(coalesce = "summary, body")]
    teaser: String,
    #[map(map_if = "visible=true")]
    promoted: bool,
    #[map(default = "10")]
    page_size: i64,
    #[map(ignore)]
    internal: String,
    #[map(recursive)]
    theme: String,
    #[map(fallback = "default_language")]
    greeting: String,
    published_at: Option<NaiveDateTime>,
    score: Option<i32>,
}

#[test]
fn test_field_catalog_covers_every_field() {
    let model = Landing::default();
    let fields = model.fields();

    assert_eq!(fields.len(), 11);
    assert_eq!(model.type_name(), "Landing");

    let title = fields.iter().find(|f| f.name == "title").unwrap();
    assert_eq!(title.kind, FieldKind::Str);
    assert!(!title.nullable);
    assert_eq!(title.type_name, "String");

    let published = fields.iter().find(|f| f.name == "published_at").unwrap();
    assert_eq!(published.kind, FieldKind::Date);
    assert!(published.nullable);

    let score = fields.iter().find(|f| f.name == "score").unwrap();
    assert_eq!(score.kind, FieldKind::Int);
    assert!(score.nullable);
}

#[test]
fn test_annotations_become_rules() {
    let rules = Landing::default().annotated_rules();

    assert_eq!(
        rules["title"].source_property.as_deref(),
        Some("pageTitle")
    );
    assert_eq!(rules["section"].levels_above, 1);
    assert_eq!(
        rules["address"].concatenation_properties.as_deref(),
        Some(&["street".to_string(), "city".to_string()][..])
    );
    assert_eq!(rules["address"].concatenation_separator, ", ");
    assert_eq!(
        rules["teaser"].coalescing_properties.as_deref(),
        Some(&["summary".to_string(), "body".to_string()][..])
    );
    assert_eq!(
        rules["promoted"].map_if_property_matches,
        Some(("visible".to_string(), "true".to_string()))
    );
    assert_eq!(rules["page_size"].default_value, Some(ScalarValue::Int(10)));
    assert!(rules["internal"].ignore);
    assert!(rules["theme"].map_recursively);
    assert_eq!(
        rules["greeting"].fallback.as_ref().map(|f| f.as_slice()),
        Some(&[FallbackMethod::DefaultLanguage][..])
    );
    assert!(!rules.contains_key("published_at"));
}

#[test]
fn test_set_and_get_scalar_round_trip() {
    let mut model = Landing::default();

    assert!(model.set_scalar("title", ScalarValue::Str("Hello".to_string())));
    assert!(model.set_scalar("page_size", ScalarValue::Int(25)));
    assert!(model.set_scalar("score", ScalarValue::Int(4)));
    assert!(!model.set_scalar("missing", ScalarValue::Int(1)));

    assert_eq!(model.title, "Hello");
    assert_eq!(model.page_size, 25);
    assert_eq!(model.score, Some(4));
    assert_eq!(
        model.get_scalar("title"),
        Some(ScalarValue::Str("Hello".to_string()))
    );
    assert_eq!(model.get_scalar("score"), Some(ScalarValue::Int(4)));
    assert_eq!(model.get_scalar("missing"), None);
}

#[test]
fn test_unset_nullable_fields_read_as_none() {
    let model = Landing::default();
    assert_eq!(model.get_scalar("published_at"), None);
    assert_eq!(model.get_scalar("score"), None);
}

#[test]
fn test_set_boxed_accepts_the_inner_type_of_an_option() {
    let mut model = Landing::default();

    assert!(model.set_boxed("score", Box::new(7_i32)).unwrap());
    assert_eq!(model.score, Some(7));

    assert!(model.set_boxed("score", Box::new(Some(9_i32))).unwrap());
    assert_eq!(model.score, Some(9));

    assert!(!model.set_boxed("missing", Box::new(7_i32)).unwrap());
}

#[test]
fn test_set_boxed_with_the_wrong_type_is_an_error() {
    let mut model = Landing::default();
    let err = model.set_boxed("title", Box::new(7_i32)).unwrap_err();

    assert_eq!(
        err.to_string(),
        "Could not map to property 'title' from value 'value of unexpected runtime type'"
    );
}

#[derive(Mappable, Debug, Default, Clone)]
struct Counters {
    hits: u64,
    peak: Option<u64>,
}

#[test]
fn test_unsigned_values_beyond_i64_read_as_none() {
    let mut model = Counters {
        hits: u64::MAX,
        peak: Some(u64::MAX),
    };

    // An unrepresentable value reads as absent rather than wrapping.
    assert_eq!(model.get_scalar("hits"), None);
    assert_eq!(model.get_scalar("peak"), None);

    model.hits = 7;
    model.peak = Some(9);
    assert_eq!(model.get_scalar("hits"), Some(ScalarValue::Int(7)));
    assert_eq!(model.get_scalar("peak"), Some(ScalarValue::Int(9)));
}

// No scalar fields at all; the generated setters must still compile
// cleanly and answer negatively.
#[derive(Mappable, Debug, Default, Clone)]
struct Wrapper {
    entry: Entry,
    entries: Vec<Entry>,
}

#[test]
fn test_scalar_accessors_on_a_struct_without_scalar_fields() {
    let mut model = Wrapper::default();

    assert!(!model.set_scalar("entry", ScalarValue::Int(1)));
    assert_eq!(model.get_scalar("entry"), None);
    assert!(model.complex_mut("entry").is_some());
    assert!(model.collection_mut("entries").is_some());
}

#[derive(Mappable, Debug, Default, Clone)]
struct Entry {
    id: i64,
    label: String,
}

#[test]
fn test_vec_of_mappables_is_a_mappable_collection() {
    let mut entries: Vec<Entry> = Vec::new();
    let collection: &mut dyn MappableCollection = &mut entries;

    assert!(collection.is_empty());
    assert_eq!(collection.element_type_name(), "Entry");
    assert!(collection.has_field("id"));
    assert!(!collection.has_field("missing"));

    let item = collection.push_new();
    item.set_scalar("id", ScalarValue::Int(3));
    item.set_scalar("label", ScalarValue::Str("first".to_string()));
    assert_eq!(collection.len(), 1);

    // Identifier matching renders values and compares case-insensitively.
    assert_eq!(collection.find_by("id", "3"), Some(0));
    assert_eq!(collection.find_by("label", "FIRST"), Some(0));
    assert_eq!(collection.find_by("id", "4"), None);

    assert!(collection.push_boxed(Box::new(Entry {
        id: 4,
        label: "second".to_string(),
    })));
    assert!(!collection.push_boxed(Box::new("not an entry".to_string())));
    assert_eq!(collection.len(), 2);

    collection.clear();
    assert!(entries.is_empty());
}
