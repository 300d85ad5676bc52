//! Collection-level list reads driven by a [`QueryPlan`].
//!
//! Rows are decoded dynamically into JSON objects so a projection can
//! return any subset of a collection's fields without a struct per shape.

use chrono::{DateTime, Utc};
use serde_json::{Map, Number, Value};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};
use uuid::Uuid;

use super::pool::DbError;
use crate::query::collection::{Collection, FieldType};
use crate::query::plan::QueryPlan;
use crate::query::sql;
use crate::query::types::FilterValue;

pub struct Repository {
    collection: &'static Collection,
    pool: PgPool,
}

impl Repository {
    pub fn new(collection: &'static Collection, pool: PgPool) -> Self {
        Self { collection, pool }
    }

    /// Total number of records in the collection, ignoring any filter.
    pub async fn count_all(&self) -> Result<i64, DbError> {
        let statement = sql::count_all(self.collection);
        let row = sqlx::query(&statement.text).fetch_one(&self.pool).await?;
        Ok(row.try_get("count")?)
    }

    /// Execute a plan and decode each row per the plan's projection.
    pub async fn fetch_page(&self, plan: &QueryPlan) -> Result<Vec<Value>, DbError> {
        let statement = sql::render(plan);
        let mut query = sqlx::query(&statement.text);
        for value in &statement.params {
            query = bind_value(query, value);
        }

        let rows = query.fetch_all(&self.pool).await?;
        let fields = sql::projected_fields(plan);

        rows.iter()
            .map(|row| row_to_json(row, self.collection, &fields))
            .collect()
    }
}

fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &FilterValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        FilterValue::Text(v) => query.bind(v.clone()),
        FilterValue::Number(v) => query.bind(*v),
        FilterValue::Bool(v) => query.bind(*v),
        FilterValue::Uuid(v) => query.bind(*v),
        FilterValue::Timestamp(v) => query.bind(*v),
        // Lists are flattened into scalar placeholders by the renderer.
        FilterValue::List(_) => query,
    }
}

fn row_to_json(
    row: &PgRow,
    collection: &Collection,
    fields: &[&'static str],
) -> Result<Value, DbError> {
    let mut object = Map::new();

    for name in fields {
        let Some(field) = collection.field(name) else {
            continue;
        };

        let value = match field.kind {
            FieldType::Text => row
                .try_get::<Option<String>, _>(*name)
                .map_err(decode_err(name))?
                .map(Value::String),
            FieldType::Number => decode_number(row, name)?,
            FieldType::Bool => row
                .try_get::<Option<bool>, _>(*name)
                .map_err(decode_err(name))?
                .map(Value::Bool),
            FieldType::Uuid => row
                .try_get::<Option<Uuid>, _>(*name)
                .map_err(decode_err(name))?
                .map(|v| Value::String(v.to_string())),
            FieldType::Timestamp => row
                .try_get::<Option<DateTime<Utc>>, _>(*name)
                .map_err(decode_err(name))?
                .map(|v| Value::String(v.to_rfc3339())),
            FieldType::TextArray => row
                .try_get::<Option<Vec<String>>, _>(*name)
                .map_err(decode_err(name))?
                .map(|v| Value::Array(v.into_iter().map(Value::String).collect())),
        };

        object.insert(name.to_string(), value.unwrap_or(Value::Null));
    }

    Ok(Value::Object(object))
}

/// Numeric columns are float8 except counters stored as integers, so try
/// the float decode first and fall back to the integer one.
fn decode_number(row: &PgRow, name: &str) -> Result<Option<Value>, DbError> {
    if let Ok(value) = row.try_get::<Option<f64>, _>(name) {
        return Ok(value.and_then(Number::from_f64).map(Value::Number));
    }
    let value = row
        .try_get::<Option<i64>, _>(name)
        .or_else(|_| row.try_get::<Option<i32>, _>(name).map(|v| v.map(i64::from)))
        .map_err(decode_err(name))?;
    Ok(value.map(|v| Value::Number(Number::from(v))))
}

fn decode_err(name: &str) -> impl FnOnce(sqlx::Error) -> DbError + '_ {
    move |err| DbError::Decode(format!("column {}: {}", name, err))
}
