//! String-to-field coercion
//!
//! Source values arrive as strings more often than not; this module parses
//! them into the shape a field stores and applies the string combination
//! semantics (plain assignment, concatenation, coalescing, formatting).
//! Unparseable values are silent no-ops so one bad property never aborts a
//! mapping run.

use chrono::{NaiveDate, NaiveDateTime};

use crate::model::{FieldKind, FieldSpec, Mappable, ScalarValue};
use crate::rules::StringFormatter;

/// Date-time formats tried in order when parsing a date string
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z", // RFC 3339: 2023-01-15T10:30:00+00:00
    "%Y-%m-%dT%H:%M:%S%.f",    // ISO without offset: 2023-01-15T10:30:00
    "%Y-%m-%d %H:%M:%S",       // Space-separated: 2023-01-15 10:30:00
];

/// How a string assignment combines with the field's current value
pub enum Combine<'a> {
    /// Overwrite, optionally through a formatter
    Plain {
        /// Formatter applied to the value before assignment
        formatter: Option<&'a StringFormatter>,
    },
    /// Append behind the current value with a separator
    Concat {
        /// Separator placed between the current value and the new one
        separator: &'a str,
        /// Whether no earlier concatenation step has written yet
        first: bool,
    },
    /// Write only while the current value is blank
    Coalesce,
}

/// Parse `raw` for the field's kind and assign it
///
/// Returns whether a value was written. Combination semantics only apply
/// to string fields; other kinds overwrite on every successful parse.
pub fn assign_string(
    model: &mut dyn Mappable,
    field: &FieldSpec,
    raw: &str,
    combine: &Combine,
) -> bool {
    match field.kind {
        FieldKind::Str => assign_text(model, field, raw, combine),
        FieldKind::Bool => match parse_bool(raw) {
            Some(value) => model.set_scalar(field.name, ScalarValue::Bool(value)),
            None => false,
        },
        FieldKind::Int => match raw.trim().parse::<i64>() {
            Ok(value) => model.set_scalar(field.name, ScalarValue::Int(value)),
            Err(_) => false,
        },
        FieldKind::Float => match raw.trim().parse::<f64>() {
            Ok(value) => model.set_scalar(field.name, ScalarValue::Float(value)),
            Err(_) => false,
        },
        FieldKind::Date => match parse_date(raw) {
            // The zero date is a placeholder for "not set"; a nullable
            // field keeps its None instead.
            Some(value) if is_zero_date(value) && field.nullable => false,
            Some(value) => model.set_scalar(field.name, ScalarValue::Date(value)),
            None => false,
        },
        FieldKind::Complex | FieldKind::Collection => false,
    }
}

/// Apply a default value before mapping runs
///
/// A default matching the field's kind is written directly; a string
/// default on a non-string field goes through ordinary parsing.
pub fn assign_default(model: &mut dyn Mappable, field: &FieldSpec, default: &ScalarValue) {
    let kind_matches = matches!(
        (field.kind, default),
        (FieldKind::Bool, ScalarValue::Bool(_))
            | (FieldKind::Int, ScalarValue::Int(_))
            | (FieldKind::Float, ScalarValue::Float(_))
            | (FieldKind::Str, ScalarValue::Str(_))
            | (FieldKind::Date, ScalarValue::Date(_))
    );
    if kind_matches {
        model.set_scalar(field.name, default.clone());
    } else if let ScalarValue::Str(raw) = default {
        assign_string(model, field, raw, &Combine::Plain { formatter: None });
    }
}

/// Re-apply combination semantics after a hook has written a string field
///
/// The hook overwrites the field; `before` is the value captured before it
/// ran. Concatenation splices the two back together, coalescing restores
/// the earlier value when it was already non-blank.
pub fn reapply_combine(
    model: &mut dyn Mappable,
    field: &FieldSpec,
    before: &str,
    combine: &Combine,
) -> bool {
    match combine {
        Combine::Plain { .. } => true,
        Combine::Concat { separator, first } => {
            if !first {
                let hooked = current_text(model, field);
                model.set_scalar(
                    field.name,
                    ScalarValue::Str(format!("{before}{separator}{hooked}")),
                );
            }
            true
        }
        Combine::Coalesce => {
            if before.trim().is_empty() {
                true
            } else {
                model.set_scalar(field.name, ScalarValue::Str(before.to_string()));
                false
            }
        }
    }
}

fn assign_text(model: &mut dyn Mappable, field: &FieldSpec, raw: &str, combine: &Combine) -> bool {
    match combine {
        Combine::Plain { formatter } => {
            if let Some(format) = formatter {
                model.set_scalar(field.name, ScalarValue::Str(format(raw)))
            } else if raw.is_empty() {
                false
            } else {
                model.set_scalar(field.name, ScalarValue::Str(raw.to_string()))
            }
        }
        Combine::Concat { separator, first } => {
            if *first {
                if raw.is_empty() {
                    false
                } else {
                    model.set_scalar(field.name, ScalarValue::Str(raw.to_string()))
                }
            } else {
                let current = current_text(model, field);
                model.set_scalar(
                    field.name,
                    ScalarValue::Str(format!("{current}{separator}{raw}")),
                )
            }
        }
        Combine::Coalesce => {
            let current = current_text(model, field);
            if current.trim().is_empty() {
                model.set_scalar(field.name, ScalarValue::Str(raw.to_string())) && !raw.is_empty()
            } else {
                false
            }
        }
    }
}

fn current_text(model: &dyn Mappable, field: &FieldSpec) -> String {
    match model.get_scalar(field.name) {
        Some(ScalarValue::Str(value)) => value,
        _ => String::new(),
    }
}

/// Parse a boolean the way content sources store them
///
/// `"1"` and `"0"` come first, then a case-insensitive `true`/`false`.
#[must_use]
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "1" => Some(true),
        "0" => Some(false),
        other => other.to_ascii_lowercase().parse::<bool>().ok(),
    }
}

/// Parse a date-time string, trying date-time formats then a bare date
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    for format in DATE_FORMATS {
        if let Ok(value) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(value);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(chrono::NaiveTime::MIN))
}

/// Whether a date-time is the `0001-01-01 00:00:00` placeholder
#[must_use]
pub fn is_zero_date(value: NaiveDateTime) -> bool {
    value.date() == NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or_default()
        && value.time() == chrono::NaiveTime::MIN
}
