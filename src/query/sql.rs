//! Renders a [`QueryPlan`] to a parameterized SQL statement.
//!
//! User input is only ever emitted as a bind parameter; identifiers come
//! from the collection descriptor, never from the request.

use super::collection::{Collection, FieldType};
use super::plan::QueryPlan;
use super::types::{Condition, FilterOp, FilterValue, Projection, SqlQuery};

pub fn render(plan: &QueryPlan) -> SqlQuery {
    let mut params: Vec<FilterValue> = Vec::new();

    let select_clause = render_projection(plan);
    let where_clause = render_predicate(plan, &mut params);
    let order_clause = render_order(plan);
    let limit_clause = render_limit(plan);

    let text = [
        format!("SELECT {}", select_clause),
        format!("FROM \"{}\"", plan.collection.table),
        where_clause,
        order_clause,
        limit_clause,
    ]
    .into_iter()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" ");

    SqlQuery { text, params }
}

pub fn count_all(collection: &Collection) -> SqlQuery {
    SqlQuery {
        text: format!("SELECT COUNT(*) AS count FROM \"{}\"", collection.table),
        params: vec![],
    }
}

/// The field names the rendered statement selects, in column order.
pub fn projected_fields(plan: &QueryPlan) -> Vec<&'static str> {
    match &plan.projection {
        Projection::Default => plan.collection.default_projection(),
        Projection::Fields(requested) => {
            let mut fields = vec!["id"];
            for name in requested {
                if name == "id" || plan.collection.is_hidden(name) {
                    continue;
                }
                if let Some(field) = plan.collection.field(name) {
                    if !fields.contains(&field.name) {
                        fields.push(field.name);
                    }
                }
            }
            fields
        }
    }
}

fn render_projection(plan: &QueryPlan) -> String {
    projected_fields(plan)
        .iter()
        .map(|name| format!("\"{}\"", name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_predicate(plan: &QueryPlan, params: &mut Vec<FilterValue>) -> String {
    if plan.predicate.is_empty() {
        return String::new();
    }

    let parts: Vec<String> = plan
        .predicate
        .conditions
        .iter()
        .map(|condition| render_condition(plan.collection, condition, params))
        .collect();

    format!("WHERE {}", parts.join(" AND "))
}

fn render_condition(
    collection: &Collection,
    condition: &Condition,
    params: &mut Vec<FilterValue>,
) -> String {
    let Condition::Compare { field, op, value } = condition else {
        return "FALSE".to_string();
    };

    let column = format!("\"{}\"", field);
    let is_array_field = collection
        .field(field)
        .map(|f| f.kind == FieldType::TextArray)
        .unwrap_or(false);

    match (op, value) {
        (FilterOp::In, FilterValue::List(values)) => {
            if values.is_empty() {
                return "FALSE".to_string();
            }
            let placeholders: Vec<String> =
                values.iter().map(|v| param(params, v.clone())).collect();
            if is_array_field {
                // Membership against an array field is an overlap test.
                format!("{} && ARRAY[{}]", column, placeholders.join(", "))
            } else {
                format!("{} IN ({})", column, placeholders.join(", "))
            }
        }
        (FilterOp::Eq, value) if is_array_field => {
            // Equality against an array field matches any element,
            // mirroring document-store array semantics.
            format!("{} = ANY({})", param(params, value.clone()), column)
        }
        (op, value) => {
            format!("{} {} {}", column, op.to_sql(), param(params, value.clone()))
        }
    }
}

fn render_order(plan: &QueryPlan) -> String {
    // Unknown sort fields are ignored rather than rejected.
    let parts: Vec<String> = plan
        .sort
        .iter()
        .filter(|key| plan.collection.field(&key.field).is_some())
        .map(|key| format!("\"{}\" {}", key.field, key.direction.to_sql()))
        .collect();

    if parts.is_empty() {
        String::new()
    } else {
        format!("ORDER BY {}", parts.join(", "))
    }
}

fn render_limit(plan: &QueryPlan) -> String {
    format!("LIMIT {} OFFSET {}", plan.page.limit, plan.page.skip())
}

fn param(params: &mut Vec<FilterValue>, value: FilterValue) -> String {
    params.push(value);
    format!("${}", params.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::collection::{BOOTCAMPS, COURSES, USERS};
    use crate::query::plan::QueryPlan;
    use std::collections::BTreeMap;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn renders_numeric_comparison_as_bind_parameter() {
        let p = params(&[("tuition[gte]", "200")]);
        let (plan, _) = QueryPlan::shape(&COURSES, &p, 0).unwrap();
        let sql = render(&plan);

        assert!(sql.text.contains("WHERE \"tuition\" >= $1"), "{}", sql.text);
        assert_eq!(sql.params, vec![FilterValue::Number(200.0)]);
    }

    #[test]
    fn unknown_field_renders_false() {
        let p = params(&[("bogus", "1")]);
        let (plan, _) = QueryPlan::shape(&COURSES, &p, 0).unwrap();
        let sql = render(&plan);
        assert!(sql.text.contains("WHERE FALSE"), "{}", sql.text);
        assert!(sql.params.is_empty());
    }

    #[test]
    fn no_raw_operator_tokens_survive_translation() {
        let p = params(&[
            ("tuition[gte]", "1"),
            ("title[in]", "a,b"),
            ("weeks[regex]", "x"),
        ]);
        let (plan, _) = QueryPlan::shape(&COURSES, &p, 0).unwrap();
        let sql = render(&plan);
        // Raw user tokens never appear in the statement text.
        assert!(!sql.text.contains("gte"));
        assert!(!sql.text.contains("regex"));
        assert!(!sql.text.contains("a,b"));
    }

    #[test]
    fn default_projection_excludes_revision_marker() {
        let p = params(&[]);
        let (plan, _) = QueryPlan::shape(&BOOTCAMPS, &p, 0).unwrap();
        let sql = render(&plan);
        assert!(!sql.text.contains("\"revision\""), "{}", sql.text);
        assert!(sql.text.contains("\"name\""));
    }

    #[test]
    fn explicit_select_projects_named_fields_plus_id() {
        let p = params(&[("select", "name,description")]);
        let (plan, _) = QueryPlan::shape(&BOOTCAMPS, &p, 0).unwrap();
        let sql = render(&plan);
        assert!(
            sql.text
                .starts_with("SELECT \"id\", \"name\", \"description\" FROM"),
            "{}",
            sql.text
        );
    }

    #[test]
    fn password_hash_is_never_projected() {
        let p = params(&[("select", "email,password_hash")]);
        let (plan, _) = QueryPlan::shape(&USERS, &p, 0).unwrap();
        let sql = render(&plan);
        assert!(!sql.text.contains("password_hash"), "{}", sql.text);
    }

    #[test]
    fn careers_equality_uses_array_membership() {
        let p = params(&[("careers", "Business")]);
        let (plan, _) = QueryPlan::shape(&BOOTCAMPS, &p, 0).unwrap();
        let sql = render(&plan);
        assert!(sql.text.contains("$1 = ANY(\"careers\")"), "{}", sql.text);
    }

    #[test]
    fn careers_in_uses_array_overlap() {
        let p = params(&[("careers[in]", "Business,UI/UX")]);
        let (plan, _) = QueryPlan::shape(&BOOTCAMPS, &p, 0).unwrap();
        let sql = render(&plan);
        assert!(
            sql.text.contains("\"careers\" && ARRAY[$1, $2]"),
            "{}",
            sql.text
        );
    }

    #[test]
    fn empty_in_list_matches_nothing() {
        let p = params(&[("title[in]", "")]);
        let (plan, _) = QueryPlan::shape(&COURSES, &p, 0).unwrap();
        let sql = render(&plan);
        assert!(sql.text.contains("FALSE"), "{}", sql.text);
    }

    #[test]
    fn pagination_renders_limit_and_offset() {
        let p = params(&[("limit", "2"), ("page", "2")]);
        let (plan, _) = QueryPlan::shape(&BOOTCAMPS, &p, 5).unwrap();
        let sql = render(&plan);
        assert!(sql.text.ends_with("LIMIT 2 OFFSET 2"), "{}", sql.text);
    }

    #[test]
    fn count_is_unfiltered() {
        let sql = count_all(&BOOTCAMPS);
        assert_eq!(sql.text, "SELECT COUNT(*) AS count FROM \"bootcamps\"");
    }
}
