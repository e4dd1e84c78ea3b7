//! Mapping from dictionaries
//!
//! A dictionary is a flat map of property values keyed by name. Keys match
//! exactly; values can be scalars, nodes (which recurse into nested models)
//! or pre-built objects. Hooks and value-based custom mappings run here.

use crate::coerce::{self, Combine};
use crate::error::{MappingError, Result};
use crate::mapper::collections::reconcile_item;
use crate::mapper::{ContentMapper, Dictionary, MappingContext};
use crate::model::{FieldKind, Mappable};
use crate::rules::{self, MappingRule, RuleMap};
use crate::source::Value;

/// Options for mapping a list of dictionaries onto a collection
#[derive(Debug, Clone)]
pub struct DictionaryCollectionOptions {
    /// Key holding the item's identifier in each entry
    pub source_identifier: String,
    /// Field the identifier is matched against on existing items
    pub dest_identifier: String,
    /// Create a new item when no existing one matches
    pub create_if_missing: bool,
}

impl Default for DictionaryCollectionOptions {
    fn default() -> Self {
        Self {
            source_identifier: "id".to_string(),
            dest_identifier: "id".to_string(),
            create_if_missing: true,
        }
    }
}

impl ContentMapper {
    /// Map a dictionary onto a view model
    pub fn map_dictionary(
        &self,
        dictionary: &Dictionary,
        model: &mut dyn Mappable,
        culture: &str,
        rules: &RuleMap,
    ) -> Result<&Self> {
        let merged = rules::resolve(model, rules);
        self.map_dictionary_with_rules(dictionary, model, culture, &merged, rules)?;
        Ok(self)
    }

    /// `caller_rules` are passed down unmerged so node values nested in the
    /// dictionary see the same rules the caller supplied.
    fn map_dictionary_with_rules(
        &self,
        dictionary: &Dictionary,
        model: &mut dyn Mappable,
        culture: &str,
        merged: &RuleMap,
        caller_rules: &RuleMap,
    ) -> Result<()> {
        let ctx = MappingContext::new(culture);
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
            let Some(value) = dictionary.get(alias) else {
                continue;
            };

            if let Some(hook) = field.hook {
                hook(&ctx, Some(value), model, field.name)?;
                continue;
            }

            if let Some(custom) =
                self.find_custom_object_mapping(field.type_name, Some(field.name))
            {
                if let Some(mapped) = custom(self, &ctx, value) {
                    if !model.set_boxed(field.name, mapped)? {
                        return Err(MappingError::Configuration(format!(
                            "custom mapping produced a value for unknown field '{}'",
                            field.name
                        )));
                    }
                }
                continue;
            }

            match (field.kind, value) {
                (FieldKind::Complex, Value::Node(node)) => {
                    if let Some(nested) = model.complex_mut(field.name) {
                        let nested_rules = rules::resolve(nested, caller_rules);
                        self.map_node_with_rules(node, nested, culture, &nested_rules)?;
                    }
                }
                (FieldKind::Collection, Value::Nodes(nodes)) => {
                    if let Some(collection) = model.collection_mut(field.name) {
                        self.map_nodes_into(nodes, collection, culture, caller_rules, true)?;
                    }
                }
                (FieldKind::Complex | FieldKind::Collection, Value::Object(object)) => {
                    model.set_cloned(field.name, object.as_ref());
                }
                (FieldKind::Complex | FieldKind::Collection, _) => {}
                _ => {
                    coerce::assign_string(
                        model,
                        field,
                        &value.render(),
                        &Combine::Plain {
                            formatter: rule.formatter.as_ref(),
                        },
                    );
                }
            }
        }
        Ok(())
    }

    /// Map a list of dictionaries onto a collection, reconciling by
    /// identifier
    pub fn map_dictionary_collection<T>(
        &self,
        entries: &[Dictionary],
        collection: &mut Vec<T>,
        culture: &str,
        rules: &RuleMap,
        options: &DictionaryCollectionOptions,
    ) -> Result<&Self>
    where
        T: Mappable + Default + 'static,
    {
        let probe = T::default();
        let merged = rules::resolve(&probe, rules);
        for entry in entries {
            let key = entry
                .get(&options.source_identifier)
                .map(|value| value.render());
            let Some(target) = reconcile_item(
                collection,
                &options.dest_identifier,
                key.as_deref(),
                options.create_if_missing,
            ) else {
                continue;
            };
            self.map_dictionary_with_rules(entry, target, culture, &merged, rules)?;
        }
        Ok(self)
    }
}
