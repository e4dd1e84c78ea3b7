//! Mapping from content node trees
//!
//! The richest of the four source shapes: node mapping honors every rule
//! the engine knows about, including ancestor walking, related-node
//! indirection, conditional mapping, hooks and custom mappings.

use crate::coerce::{self, Combine};
use crate::error::{MappingError, Result};
use crate::mapper::{ancestor_or_self, ContentMapper, MappingContext};
use crate::model::{FieldKind, FieldSpec, Mappable};
use crate::rules::{self, CustomMappingFn, MappingRule, MultiMapping, RuleMap};
use crate::source::{ContentNode, FallbackChain, NodeRef, PropertyValueGetter, Value};

impl ContentMapper {
    /// Map a content node onto a view model
    ///
    /// Every cataloged field is processed: the merged rule for the field is
    /// honored if there is one, otherwise the field name doubles as the
    /// source alias. Returns `&self` so calls can be chained.
    pub fn map_node(
        &self,
        node: &NodeRef,
        model: &mut dyn Mappable,
        culture: &str,
        rules: &RuleMap,
    ) -> Result<&Self> {
        let merged = rules::resolve(model, rules);
        self.map_node_with_rules(node, model, culture, &merged)?;
        Ok(self)
    }

    pub(crate) fn map_node_with_rules(
        &self,
        node: &NodeRef,
        model: &mut dyn Mappable,
        culture: &str,
        merged: &RuleMap,
    ) -> Result<()> {
        let convention = MappingRule::default();
        for field in model.fields() {
            let rule = merged.get(field.name).unwrap_or(&convention);
            if rule.ignore {
                continue;
            }

            if let Some(key) = &rule.dictionary_key {
                if let Some(text) = self.lookup().entry(key) {
                    coerce::assign_string(
                        model,
                        field,
                        &text,
                        &Combine::Plain {
                            formatter: rule.formatter.as_ref(),
                        },
                    );
                }
                continue;
            }

            let source_node = ancestor_or_self(node, rule.levels_above);

            if field.kind == FieldKind::Complex && rule.levels_above > 0 {
                // The rule names an ancestor explicitly, so the nested
                // model maps from that node rather than a picked property.
                if let Some(nested) = model.complex_mut(field.name) {
                    let nested_rules = rules::resolve(nested, &RuleMap::default());
                    self.map_node_with_rules(&source_node, nested, culture, &nested_rules)?;
                }
                continue;
            }

            if let Some(default) = &rule.default_value {
                coerce::assign_default(model, field, default);
            }

            match rule.multi_mapping() {
                MultiMapping::Concatenate(properties, separator) => {
                    // `first` tracks the first property that actually
                    // produced a value, so an absent leading property
                    // leaves no dangling separator.
                    let mut first = true;
                    for alias in properties {
                        let wrote = self.map_node_field(
                            model,
                            field,
                            &source_node,
                            culture,
                            rule,
                            alias,
                            &Combine::Concat { separator, first },
                        )?;
                        if wrote {
                            first = false;
                        }
                    }
                }
                MultiMapping::Coalesce(properties) => {
                    for alias in properties {
                        self.map_node_field(
                            model,
                            field,
                            &source_node,
                            culture,
                            rule,
                            alias,
                            &Combine::Coalesce,
                        )?;
                    }
                }
                MultiMapping::None => {
                    let alias = rule.source_property.as_deref().unwrap_or(field.name);
                    self.map_node_field(
                        model,
                        field,
                        &source_node,
                        culture,
                        rule,
                        alias,
                        &Combine::Plain {
                            formatter: rule.formatter.as_ref(),
                        },
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Map one field from one source alias; returns whether a value was
    /// written
    #[allow(clippy::too_many_arguments)]
    fn map_node_field(
        &self,
        model: &mut dyn Mappable,
        field: &FieldSpec,
        node: &NodeRef,
        culture: &str,
        rule: &MappingRule,
        alias: &str,
        combine: &Combine,
    ) -> Result<bool> {
        let ctx = MappingContext::new(culture);
        let getter = rule.value_getter.as_deref().unwrap_or(self.value_getter());
        let fallback = rule.effective_fallback();

        // A condition paired with a related property is checked on the
        // related node instead, further down.
        if let Some((property, expected)) = &rule.map_if_property_matches {
            if rule.source_related_property.is_none()
                && !condition_met(getter, node.as_ref(), property, expected, culture)
            {
                return Ok(false);
            }
        }

        if let Some(hook) = field.hook {
            let raw = getter.property_value(node.as_ref(), alias, culture, &fallback);
            let combining = !matches!(combine, Combine::Plain { .. });
            let before = (field.kind == FieldKind::Str && combining)
                .then(|| current_text(model, field));
            hook(&ctx, raw.as_ref(), model, field.name)?;
            if let Some(before) = before {
                return Ok(coerce::reapply_combine(model, field, &before, combine));
            }
            return Ok(true);
        }

        let custom = rule
            .custom
            .clone()
            .or_else(|| self.find_custom_mapping(field));
        if let Some(custom) = custom {
            return self.apply_custom(model, field, &custom, node.as_ref(), alias, &fallback, &ctx);
        }

        let Some(value) = getter.property_value(node.as_ref(), alias, culture, &fallback) else {
            return Ok(false);
        };

        if let Some(related_property) = &rule.source_related_property {
            let Some(related) = self.related_node(&value) else {
                return Ok(false);
            };
            if let Some((property, expected)) = &rule.map_if_property_matches {
                if !condition_met(getter, related.as_ref(), property, expected, culture) {
                    return Ok(false);
                }
            }
            let Some(related_value) = getter.property_value(
                related.as_ref(),
                related_property,
                culture,
                &FallbackChain::new(),
            ) else {
                return Ok(false);
            };
            return self.assign_value(model, field, &related_value, culture, combine);
        }

        self.assign_value(model, field, &value, culture, combine)
    }

    /// Dispatch a resolved value onto the field by shape
    pub(crate) fn assign_value(
        &self,
        model: &mut dyn Mappable,
        field: &FieldSpec,
        value: &Value,
        culture: &str,
        combine: &Combine,
    ) -> Result<bool> {
        match (field.kind, value) {
            (FieldKind::Complex, Value::Node(child)) => {
                self.map_into_complex(model, field, child, culture)
            }
            (FieldKind::Complex, Value::Nodes(nodes)) => match nodes.first() {
                Some(first) => self.map_into_complex(model, field, first, culture),
                None => Ok(false),
            },
            (FieldKind::Collection, Value::Nodes(nodes)) => {
                match model.collection_mut(field.name) {
                    Some(collection) => {
                        self.map_nodes_into(nodes, collection, culture, &RuleMap::default(), true)?;
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }
            (FieldKind::Collection, Value::Node(child)) => match model.collection_mut(field.name) {
                Some(collection) => {
                    self.map_nodes_into(
                        std::slice::from_ref(child),
                        collection,
                        culture,
                        &RuleMap::default(),
                        true,
                    )?;
                    Ok(true)
                }
                None => Ok(false),
            },
            (FieldKind::Complex | FieldKind::Collection, Value::Object(object)) => {
                Ok(model.set_cloned(field.name, object.as_ref()))
            }
            (FieldKind::Complex | FieldKind::Collection, _) => Ok(false),
            _ => {
                let wrote = coerce::assign_string(model, field, &value.render(), combine);
                if wrote && self.config().log_field_mapping {
                    log::debug!("mapped field '{}' from {:?}", field.name, value);
                }
                Ok(wrote)
            }
        }
    }

    fn map_into_complex(
        &self,
        model: &mut dyn Mappable,
        field: &FieldSpec,
        child: &NodeRef,
        culture: &str,
    ) -> Result<bool> {
        match model.complex_mut(field.name) {
            Some(nested) => {
                let nested_rules = rules::resolve(nested, &RuleMap::default());
                self.map_node_with_rules(child, nested, culture, &nested_rules)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Run a custom mapping and write its result
    #[allow(clippy::too_many_arguments)]
    fn apply_custom(
        &self,
        model: &mut dyn Mappable,
        field: &FieldSpec,
        custom: &CustomMappingFn,
        node: &dyn ContentNode,
        alias: &str,
        fallback: &FallbackChain,
        ctx: &MappingContext,
    ) -> Result<bool> {
        let Some(value) = custom(self, ctx, node, alias, fallback) else {
            return Ok(false);
        };
        if model.set_boxed(field.name, value)? {
            Ok(true)
        } else {
            Err(MappingError::Configuration(format!(
                "custom mapping produced a value for unknown field '{}'",
                field.name
            )))
        }
    }
}

fn condition_met(
    getter: &dyn PropertyValueGetter,
    node: &dyn ContentNode,
    property: &str,
    expected: &str,
    culture: &str,
) -> bool {
    getter
        .property_value(node, property, culture, &FallbackChain::new())
        .is_some_and(|value| value.render().eq_ignore_ascii_case(expected))
}

fn current_text(model: &dyn Mappable, field: &FieldSpec) -> String {
    match model.get_scalar(field.name) {
        Some(crate::model::ScalarValue::Str(value)) => value,
        _ => String::new(),
    }
}
