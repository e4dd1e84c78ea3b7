//! Mapping from XML elements
//!
//! Element names are matched case-insensitively, with attributes as the
//! fallback when no element matches. A `child` rule descends one level into
//! the matched element before reading its text.

use crate::coerce::{self, Combine};
use crate::error::Result;
use crate::mapper::collections::reconcile_item;
use crate::mapper::ContentMapper;
use crate::model::Mappable;
use crate::rules::{self, MappingRule, RuleMap};
use crate::utils::strings::camel_case;

/// Options for mapping an XML element's children onto a collection
#[derive(Debug, Clone)]
pub struct XmlCollectionOptions {
    /// Element name each collection item lives under
    pub group_element: String,
    /// Child element holding the item's identifier in the source
    pub source_identifier: String,
    /// Field the identifier is matched against on existing items
    pub dest_identifier: String,
    /// Create a new item when no existing one matches
    pub create_if_missing: bool,
}

impl Default for XmlCollectionOptions {
    fn default() -> Self {
        Self {
            group_element: "item".to_string(),
            source_identifier: "id".to_string(),
            dest_identifier: "id".to_string(),
            create_if_missing: true,
        }
    }
}

impl ContentMapper {
    /// Map an XML element onto a view model
    pub fn map_xml(
        &self,
        element: roxmltree::Node<'_, '_>,
        model: &mut dyn Mappable,
        rules: &RuleMap,
    ) -> Result<&Self> {
        let merged = rules::resolve(model, rules);
        self.map_xml_with_rules(element, model, &merged)?;
        Ok(self)
    }

    fn map_xml_with_rules(
        &self,
        element: roxmltree::Node<'_, '_>,
        model: &mut dyn Mappable,
        merged: &RuleMap,
    ) -> Result<()> {
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
            let combine = Combine::Plain {
                formatter: rule.formatter.as_ref(),
            };

            if let Some(child) = xml_element(element, alias) {
                let target = match &rule.source_child_property {
                    Some(grandchild) => xml_element(child, grandchild),
                    None => Some(child),
                };
                if let Some(target) = target {
                    coerce::assign_string(model, field, target.text().unwrap_or(""), &combine);
                }
            } else if let Some(attribute) = attribute_ci(element, alias) {
                coerce::assign_string(model, field, attribute, &combine);
            }
        }
        Ok(())
    }

    /// Map repeated child elements onto a collection, reconciling by
    /// identifier
    pub fn map_xml_collection<T>(
        &self,
        element: roxmltree::Node<'_, '_>,
        collection: &mut Vec<T>,
        rules: &RuleMap,
        options: &XmlCollectionOptions,
    ) -> Result<&Self>
    where
        T: Mappable + Default + 'static,
    {
        let probe = T::default();
        let merged = rules::resolve(&probe, rules);
        for item_element in element
            .children()
            .filter(|n| n.is_element() && n.tag_name().name().eq_ignore_ascii_case(&options.group_element))
        {
            let key = xml_element(item_element, &options.source_identifier)
                .and_then(|el| el.text())
                .map(str::trim)
                .map(str::to_string);
            let Some(target) = reconcile_item(
                collection,
                &options.dest_identifier,
                key.as_deref(),
                options.create_if_missing,
            ) else {
                continue;
            };
            self.map_xml_with_rules(item_element, target, &merged)?;
        }
        Ok(self)
    }
}

/// Find a child element by name, case-insensitively, trying the camel-cased
/// alias as well so snake_case fields find camelCase elements
fn xml_element<'a, 'input>(
    parent: roxmltree::Node<'a, 'input>,
    name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    child_element_ci(parent, name).or_else(|| child_element_ci(parent, &camel_case(name)))
}

fn child_element_ci<'a, 'input>(
    parent: roxmltree::Node<'a, 'input>,
    name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    parent
        .children()
        .find(|n| n.is_element() && n.tag_name().name().eq_ignore_ascii_case(name))
}

fn attribute_ci<'a>(element: roxmltree::Node<'a, '_>, name: &str) -> Option<&'a str> {
    element
        .attributes()
        .find(|a| a.name().eq_ignore_ascii_case(name))
        .map(|a| a.value())
}
