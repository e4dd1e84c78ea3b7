//! Mapping from JSON documents
//!
//! Property names are tried verbatim, then lowercased, then camel-cased.
//! Only string, number and boolean tokens produce values; objects and
//! arrays are addressed through `child` rules and collection mapping.

use serde_json::Value as JsonValue;

use crate::coerce::{self, Combine};
use crate::error::{MappingError, Result};
use crate::mapper::collections::reconcile_item;
use crate::mapper::ContentMapper;
use crate::model::Mappable;
use crate::rules::{self, MappingRule, RuleMap};
use crate::utils::strings::camel_case;

/// Options for mapping a JSON array onto a collection
#[derive(Debug, Clone)]
pub struct JsonCollectionOptions {
    /// Property holding the array of items
    pub root_element: String,
    /// Property holding the item's identifier in the source
    pub source_identifier: String,
    /// Field the identifier is matched against on existing items
    pub dest_identifier: String,
    /// Create a new item when no existing one matches
    pub create_if_missing: bool,
}

impl Default for JsonCollectionOptions {
    fn default() -> Self {
        Self {
            root_element: "items".to_string(),
            source_identifier: "id".to_string(),
            dest_identifier: "id".to_string(),
            create_if_missing: true,
        }
    }
}

impl ContentMapper {
    /// Map a JSON document onto a view model
    ///
    /// The document must parse to an object.
    pub fn map_json(&self, json: &str, model: &mut dyn Mappable, rules: &RuleMap) -> Result<&Self> {
        let document: JsonValue = serde_json::from_str(json)?;
        let merged = rules::resolve(model, rules);
        self.map_json_value_with_rules(&document, model, &merged)?;
        Ok(self)
    }

    fn map_json_value_with_rules(
        &self,
        document: &JsonValue,
        model: &mut dyn Mappable,
        merged: &RuleMap,
    ) -> Result<()> {
        let Some(object) = document.as_object() else {
            return Err(MappingError::Document(
                "JSON source must be an object".to_string(),
            ));
        };
        let convention = MappingRule::default();
        for field in model.fields() {
            let rule = merged.get(field.name).unwrap_or(&convention);
            if rule.ignore {
                continue;
            }
            if let Some(default) = &rule.default_value {
                coerce::assign_default(model, field, default);
            }
            let alias = rule.source_property.as_deref().unwrap_or(field.name);
            let Some(token) = json_property(object, alias) else {
                continue;
            };
            let target = match &rule.source_child_property {
                Some(child) => token.as_object().and_then(|inner| json_property(inner, child)),
                None => Some(token),
            };
            if let Some(text) = target.and_then(render_json) {
                coerce::assign_string(
                    model,
                    field,
                    &text,
                    &Combine::Plain {
                        formatter: rule.formatter.as_ref(),
                    },
                );
            }
        }
        Ok(())
    }

    /// Map a JSON array onto a collection, reconciling by identifier
    pub fn map_json_collection<T>(
        &self,
        json: &str,
        collection: &mut Vec<T>,
        rules: &RuleMap,
        options: &JsonCollectionOptions,
    ) -> Result<&Self>
    where
        T: Mappable + Default + 'static,
    {
        let document: JsonValue = serde_json::from_str(json)?;
        let root = document
            .as_object()
            .and_then(|object| json_property(object, &options.root_element))
            .ok_or_else(|| {
                MappingError::Document(format!(
                    "root element '{}' not found in JSON source",
                    options.root_element
                ))
            })?;
        let Some(items) = root.as_array() else {
            return Err(MappingError::Document(format!(
                "root element '{}' is not an array",
                options.root_element
            )));
        };

        let probe = T::default();
        let merged = rules::resolve(&probe, rules);
        for entry in items {
            let key = entry
                .as_object()
                .and_then(|object| json_property(object, &options.source_identifier))
                .and_then(render_json);
            let Some(target) = reconcile_item(
                collection,
                &options.dest_identifier,
                key.as_deref(),
                options.create_if_missing,
            ) else {
                continue;
            };
            self.map_json_value_with_rules(entry, target, &merged)?;
        }
        Ok(self)
    }
}

fn json_property<'v>(
    object: &'v serde_json::Map<String, JsonValue>,
    alias: &str,
) -> Option<&'v JsonValue> {
    object
        .get(alias)
        .or_else(|| object.get(&alias.to_lowercase()))
        .or_else(|| object.get(&camel_case(alias)))
}

fn render_json(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(text) => Some(text.clone()),
        JsonValue::Number(number) => Some(number.to_string()),
        JsonValue::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
