//! End-to-end query shaping: raw query parameters through translation,
//! planning and SQL rendering, without touching a database.

use std::collections::BTreeMap;

use bootcamp_api::db::collection::{BOOTCAMPS, COURSES};
use bootcamp_api::query::plan::QueryPlan;
use bootcamp_api::query::sql;
use bootcamp_api::query::types::{FilterValue, PageRef};

fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn combined_filter_select_sort_page() {
    let p = params(&[
        ("tuition[gte]", "8000"),
        ("minimum_skill[in]", "beginner,intermediate"),
        ("select", "title,tuition"),
        ("sort", "-tuition"),
        ("page", "2"),
        ("limit", "3"),
    ]);

    let (plan, pagination) = QueryPlan::shape(&COURSES, &p, 10).unwrap();
    let rendered = sql::render(&plan);

    assert_eq!(
        rendered.text,
        "SELECT \"id\", \"title\", \"tuition\" FROM \"courses\" \
         WHERE \"minimum_skill\" IN ($1, $2) AND \"tuition\" >= $3 \
         ORDER BY \"tuition\" DESC, \"id\" ASC \
         LIMIT 3 OFFSET 3"
    );
    assert_eq!(
        rendered.params,
        vec![
            FilterValue::Text("beginner".to_string()),
            FilterValue::Text("intermediate".to_string()),
            FilterValue::Number(8000.0),
        ]
    );
    assert_eq!(pagination.prev, Some(PageRef { page: 1, limit: 3 }));
    assert_eq!(pagination.next, Some(PageRef { page: 3, limit: 3 }));
}

#[test]
fn defaults_render_newest_first_with_page_size_two() {
    let (plan, pagination) = QueryPlan::shape(&COURSES, &params(&[]), 5).unwrap();
    let rendered = sql::render(&plan);

    assert!(rendered.text.contains("ORDER BY \"created_at\" DESC, \"id\" ASC"));
    assert!(rendered.text.ends_with("LIMIT 2 OFFSET 0"));
    assert!(pagination.prev.is_none());
    assert_eq!(pagination.next, Some(PageRef { page: 2, limit: 2 }));
}

#[test]
fn pagination_uses_the_unfiltered_total() {
    // The navigation metadata comes from the collection-wide count even
    // when a filter narrows the result set.
    let p = params(&[("housing", "true"), ("limit", "2"), ("page", "2")]);
    let (_, pagination) = QueryPlan::shape(&BOOTCAMPS, &p, 5).unwrap();

    assert_eq!(pagination.prev, Some(PageRef { page: 1, limit: 2 }));
    assert_eq!(pagination.next, Some(PageRef { page: 3, limit: 2 }));
}

#[test]
fn hostile_keys_never_reach_the_statement() {
    let p = params(&[
        ("password_hash[gt]", "zzz-probe"),
        ("name; DROP TABLE users", "x"),
        ("role[regex]", ".*"),
    ]);

    let (plan, _) = QueryPlan::shape(&bootcamp_api::db::collection::USERS, &p, 0).unwrap();
    let rendered = sql::render(&plan);

    // Unknown keys collapse to FALSE; known-but-filterable fields bind.
    assert!(!rendered.text.contains("DROP TABLE"));
    assert!(!rendered.text.contains("regex"));
    for value in &rendered.params {
        if let FilterValue::Text(text) = value {
            assert!(!rendered.text.contains(text.as_str()));
        }
    }
}

#[test]
fn shaping_rejects_bad_values_but_not_bad_fields() {
    let bad_value = params(&[("tuition[gte]", "lots")]);
    assert!(QueryPlan::shape(&COURSES, &bad_value, 0).is_err());

    let bad_field = params(&[("tuitionn", "9000")]);
    let (plan, _) = QueryPlan::shape(&COURSES, &bad_field, 0).unwrap();
    assert!(sql::render(&plan).text.contains("FALSE"));
}
