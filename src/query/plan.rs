//! Query Shaper: composes filtering, projection, sort order and pagination
//! into one immutable fetch plan plus the page's navigation metadata.

use std::collections::BTreeMap;

use super::collection::Collection;
use super::error::QueryError;
use super::translate::translate;
use super::types::{
    PageRef, PageSpec, Pagination, Predicate, Projection, SortDirection, SortKey,
};

/// A bounded, deterministic fetch plan against one collection.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    pub collection: &'static Collection,
    pub predicate: Predicate,
    pub projection: Projection,
    pub sort: Vec<SortKey>,
    pub page: PageSpec,
}

impl QueryPlan {
    /// Shape a raw query-parameter map into a plan and pagination metadata.
    ///
    /// `total_count` is the UNFILTERED collection size: the upstream
    /// contract computes next/prev from a count that ignores the filter,
    /// and that behavior is preserved bit-for-bit (see DESIGN.md).
    pub fn shape(
        collection: &'static Collection,
        params: &BTreeMap<String, String>,
        total_count: i64,
    ) -> Result<(QueryPlan, Pagination), QueryError> {
        let predicate = translate(params, collection)?;
        let projection = parse_projection(params);
        let sort = parse_sort(params);
        let page = parse_page(params);

        let pagination = paginate(page, total_count);

        Ok((
            QueryPlan {
                collection,
                predicate,
                projection,
                sort,
                page,
            },
            pagination,
        ))
    }

}

fn parse_projection(params: &BTreeMap<String, String>) -> Projection {
    match params.get("select") {
        Some(raw) => Projection::Fields(
            raw.split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        None => Projection::Default,
    }
}

fn parse_sort(params: &BTreeMap<String, String>) -> Vec<SortKey> {
    let Some(raw) = params.get("sort") else {
        return default_sort();
    };

    let mut keys: Vec<SortKey> = raw
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(|part| match part.strip_prefix('-') {
            Some(field) => SortKey {
                field: field.to_string(),
                direction: SortDirection::Desc,
            },
            None => SortKey {
                field: part.to_string(),
                direction: SortDirection::Asc,
            },
        })
        .collect();

    if keys.is_empty() {
        return default_sort();
    }

    // Stable tie-break: insertion order via the primary key.
    if !keys.iter().any(|k| k.field == "id") {
        keys.push(SortKey {
            field: "id".to_string(),
            direction: SortDirection::Asc,
        });
    }
    keys
}

fn default_sort() -> Vec<SortKey> {
    vec![
        SortKey {
            field: "created_at".to_string(),
            direction: SortDirection::Desc,
        },
        SortKey {
            field: "id".to_string(),
            direction: SortDirection::Asc,
        },
    ]
}

fn parse_page(params: &BTreeMap<String, String>) -> PageSpec {
    let default_limit = crate::config::config().pagination.default_limit;

    // Unparseable values fall back to the defaults, as the source did.
    let page = params
        .get("page")
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(1)
        .max(1);
    let limit = params
        .get("limit")
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(default_limit)
        .max(1);

    PageSpec { page, limit }
}

fn paginate(page: PageSpec, total_count: i64) -> Pagination {
    let skip = page.skip();
    let mut pagination = Pagination::default();

    if skip + page.limit < total_count {
        pagination.next = Some(PageRef {
            page: page.page + 1,
            limit: page.limit,
        });
    }
    if skip > 0 {
        pagination.prev = Some(PageRef {
            page: page.page - 1,
            limit: page.limit,
        });
    }
    pagination
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::collection::BOOTCAMPS;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn middle_page_has_both_neighbors() {
        // 5 documents, limit=2, page=2: one page before, one after.
        let p = params(&[("limit", "2"), ("page", "2")]);
        let (plan, pagination) = QueryPlan::shape(&BOOTCAMPS, &p, 5).unwrap();

        assert_eq!(plan.page, PageSpec { page: 2, limit: 2 });
        assert_eq!(pagination.prev, Some(PageRef { page: 1, limit: 2 }));
        assert_eq!(pagination.next, Some(PageRef { page: 3, limit: 2 }));
    }

    #[test]
    fn first_page_has_no_prev() {
        let p = params(&[("limit", "2")]);
        let (_, pagination) = QueryPlan::shape(&BOOTCAMPS, &p, 5).unwrap();
        assert!(pagination.prev.is_none());
        assert_eq!(pagination.next, Some(PageRef { page: 2, limit: 2 }));
    }

    #[test]
    fn last_page_has_no_next() {
        let p = params(&[("limit", "2"), ("page", "3")]);
        let (_, pagination) = QueryPlan::shape(&BOOTCAMPS, &p, 5).unwrap();
        assert_eq!(pagination.prev, Some(PageRef { page: 2, limit: 2 }));
        assert!(pagination.next.is_none());
    }

    #[test]
    fn exact_boundary_has_no_next() {
        // skip + limit == total: no further page.
        let p = params(&[("limit", "5")]);
        let (_, pagination) = QueryPlan::shape(&BOOTCAMPS, &p, 5).unwrap();
        assert!(pagination.next.is_none());
        assert!(pagination.prev.is_none());
    }

    #[test]
    fn defaults_apply_without_parameters() {
        let p = params(&[]);
        let (plan, _) = QueryPlan::shape(&BOOTCAMPS, &p, 10).unwrap();
        assert_eq!(plan.page.page, 1);
        assert_eq!(plan.page.limit, 2);
        assert_eq!(plan.sort[0].field, "created_at");
        assert_eq!(plan.sort[0].direction, SortDirection::Desc);
        assert_eq!(plan.projection, Projection::Default);
    }

    #[test]
    fn sort_keeps_field_order_and_appends_tiebreak() {
        let p = params(&[("sort", "-average_cost,name")]);
        let (plan, _) = QueryPlan::shape(&BOOTCAMPS, &p, 0).unwrap();
        let fields: Vec<_> = plan.sort.iter().map(|k| k.field.as_str()).collect();
        assert_eq!(fields, vec!["average_cost", "name", "id"]);
        assert_eq!(plan.sort[0].direction, SortDirection::Desc);
        assert_eq!(plan.sort[1].direction, SortDirection::Asc);
    }

    #[test]
    fn unparseable_page_falls_back_to_defaults() {
        let p = params(&[("page", "abc"), ("limit", "-3")]);
        let (plan, _) = QueryPlan::shape(&BOOTCAMPS, &p, 10).unwrap();
        assert_eq!(plan.page.page, 1);
        assert_eq!(plan.page.limit, 1);
    }

    #[test]
    fn shaping_is_deterministic() {
        let p = params(&[("sort", "name"), ("limit", "3"), ("housing", "true")]);
        let (a, pa) = QueryPlan::shape(&BOOTCAMPS, &p, 9).unwrap();
        let (b, pb) = QueryPlan::shape(&BOOTCAMPS, &p, 9).unwrap();
        assert_eq!(crate::query::sql::render(&a).text, crate::query::sql::render(&b).text);
        assert_eq!(pa, pb);
    }
}
