//! Filter Translator: turns a flat query-parameter map into a typed
//! predicate over a collection's fields.
//!
//! Only the fixed operator whitelist in [`FilterOp`] ever becomes a live
//! operator; every other key is a literal field name. Values are coerced to
//! the field's declared type so numeric fields are never compared as text.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::collection::{Collection, Field, FieldType};
use super::error::QueryError;
use super::types::{Condition, FilterOp, FilterValue, Predicate};

/// Keys consumed by the query shaper rather than the predicate.
pub const RESERVED_KEYS: [&str; 4] = ["select", "sort", "page", "limit"];

pub fn translate(
    params: &BTreeMap<String, String>,
    collection: &Collection,
) -> Result<Predicate, QueryError> {
    let mut conditions = Vec::new();

    for (key, raw) in params {
        if RESERVED_KEYS.contains(&key.as_str()) {
            continue;
        }

        let (field_name, op) = split_operator(key);
        let Some(field) = collection.field(field_name) else {
            // Unknown fields are not rejected; they match nothing.
            conditions.push(Condition::Unmatched {
                field: field_name.to_string(),
            });
            continue;
        };

        let value = match op {
            FilterOp::In => FilterValue::List(
                raw.split(',')
                    .filter(|part| !part.is_empty())
                    .map(|part| coerce(field, part))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            _ => coerce(field, raw)?,
        };

        conditions.push(Condition::Compare {
            field: field.name.to_string(),
            op,
            value,
        });
    }

    Ok(Predicate { conditions })
}

/// Split `field[op]` into the field name and a whitelisted operator.
///
/// A bracket suffix outside the whitelist is not an operator: the whole key
/// falls through as a literal field name, which the unknown-field path then
/// turns into a match-nothing condition.
fn split_operator(key: &str) -> (&str, FilterOp) {
    if let Some((field, rest)) = key.split_once('[') {
        if let Some(suffix) = rest.strip_suffix(']') {
            if let Some(op) = FilterOp::from_suffix(suffix) {
                return (field, op);
            }
        }
    }
    (key, FilterOp::Eq)
}

fn coerce(field: &Field, raw: &str) -> Result<FilterValue, QueryError> {
    let invalid = || QueryError::InvalidValue {
        field: field.name.to_string(),
        value: raw.to_string(),
    };

    Ok(match field.kind {
        FieldType::Text | FieldType::TextArray => FilterValue::Text(raw.to_string()),
        FieldType::Number => FilterValue::Number(raw.parse::<f64>().map_err(|_| invalid())?),
        FieldType::Bool => FilterValue::Bool(raw.parse::<bool>().map_err(|_| invalid())?),
        FieldType::Uuid => FilterValue::Uuid(Uuid::parse_str(raw).map_err(|_| invalid())?),
        FieldType::Timestamp => FilterValue::Timestamp(
            raw.parse::<DateTime<Utc>>().map_err(|_| invalid())?,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::collection::COURSES;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn reserved_keys_are_excluded() {
        let p = params(&[
            ("select", "title"),
            ("sort", "-tuition"),
            ("page", "2"),
            ("limit", "5"),
        ]);
        let predicate = translate(&p, &COURSES).unwrap();
        assert!(predicate.is_empty());
    }

    #[test]
    fn gte_suffix_becomes_numeric_comparison() {
        let p = params(&[("tuition[gte]", "200")]);
        let predicate = translate(&p, &COURSES).unwrap();
        assert_eq!(
            predicate.conditions,
            vec![Condition::Compare {
                field: "tuition".to_string(),
                op: FilterOp::Gte,
                value: FilterValue::Number(200.0),
            }]
        );
    }

    #[test]
    fn in_suffix_splits_comma_separated_values() {
        let p = params(&[("minimum_skill[in]", "beginner,advanced")]);
        let predicate = translate(&p, &COURSES).unwrap();
        assert_eq!(
            predicate.conditions,
            vec![Condition::Compare {
                field: "minimum_skill".to_string(),
                op: FilterOp::In,
                value: FilterValue::List(vec![
                    FilterValue::Text("beginner".to_string()),
                    FilterValue::Text("advanced".to_string()),
                ]),
            }]
        );
    }

    #[test]
    fn plain_key_is_equality() {
        let p = params(&[("scholarships_available", "true")]);
        let predicate = translate(&p, &COURSES).unwrap();
        assert_eq!(
            predicate.conditions,
            vec![Condition::Compare {
                field: "scholarships_available".to_string(),
                op: FilterOp::Eq,
                value: FilterValue::Bool(true),
            }]
        );
    }

    #[test]
    fn unknown_field_matches_nothing_instead_of_erroring() {
        let p = params(&[("no_such_field", "x")]);
        let predicate = translate(&p, &COURSES).unwrap();
        assert_eq!(
            predicate.conditions,
            vec![Condition::Unmatched {
                field: "no_such_field".to_string()
            }]
        );
    }

    #[test]
    fn non_whitelisted_suffix_is_a_literal_field_name() {
        // "tuition[regex]" is not an operator; the raw key is not a known
        // field, so it must fall into the match-nothing path.
        let p = params(&[("tuition[regex]", "^2")]);
        let predicate = translate(&p, &COURSES).unwrap();
        assert_eq!(
            predicate.conditions,
            vec![Condition::Unmatched {
                field: "tuition[regex]".to_string()
            }]
        );
    }

    #[test]
    fn unparseable_number_is_rejected() {
        let p = params(&[("tuition[lt]", "cheap")]);
        let err = translate(&p, &COURSES).unwrap_err();
        assert!(matches!(err, QueryError::InvalidValue { .. }));
    }
}
