//! String helpers for alias conventions

/// Convert a field name to its camel-cased source alias
///
/// `body_text` becomes `bodyText` and `BodyText` becomes `bodyText`, which
/// is the spelling content sources conventionally use for property aliases.
#[must_use]
pub fn camel_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    for (i, part) in name.split('_').filter(|p| !p.is_empty()).enumerate() {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            if i == 0 {
                result.extend(first.to_lowercase());
            } else {
                result.extend(first.to_uppercase());
            }
            result.push_str(chars.as_str());
        }
    }
    result
}
