//! Derived-aggregate maintenance for bootcamps.
//!
//! Every course or review write is followed by a recomputation of the
//! parent's average from the full child set, so concurrent writers
//! converge on the correct value regardless of order. An empty child set
//! clears the stored field instead of dividing by zero.
//!
//! Persistence failures are logged and swallowed: the triggering write has
//! already succeeded and is not rolled back for a stale aggregate.

use sqlx::PgPool;
use uuid::Uuid;

pub async fn recalculate_average_cost(pool: &PgPool, bootcamp_id: Uuid) {
    if let Err(err) = update_average_cost(pool, bootcamp_id).await {
        tracing::error!(%bootcamp_id, "failed to recalculate average cost: {}", err);
    }
}

pub async fn recalculate_average_rating(pool: &PgPool, bootcamp_id: Uuid) {
    if let Err(err) = update_average_rating(pool, bootcamp_id).await {
        tracing::error!(%bootcamp_id, "failed to recalculate average rating: {}", err);
    }
}

async fn update_average_cost(pool: &PgPool, bootcamp_id: Uuid) -> Result<(), sqlx::Error> {
    let tuitions: Vec<f64> =
        sqlx::query_scalar("SELECT tuition FROM courses WHERE bootcamp_id = $1")
            .bind(bootcamp_id)
            .fetch_all(pool)
            .await?;

    sqlx::query("UPDATE bootcamps SET average_cost = $2 WHERE id = $1")
        .bind(bootcamp_id)
        .bind(mean(&tuitions))
        .execute(pool)
        .await?;
    Ok(())
}

async fn update_average_rating(pool: &PgPool, bootcamp_id: Uuid) -> Result<(), sqlx::Error> {
    let ratings: Vec<f64> = sqlx::query_scalar("SELECT rating FROM reviews WHERE bootcamp_id = $1")
        .bind(bootcamp_id)
        .fetch_all(pool)
        .await?;

    sqlx::query("UPDATE bootcamps SET average_rating = $2 WHERE id = $1")
        .bind(bootcamp_id)
        .bind(mean(&ratings))
        .execute(pool)
        .await?;
    Ok(())
}

/// Mean over the full child set; None clears the stored aggregate.
fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_child_sets_the_average() {
        assert_eq!(mean(&[100.0]), Some(100.0));
    }

    #[test]
    fn second_child_moves_the_average_to_the_full_set_mean() {
        // 100 then 300: the recompute reads both, not a running delta.
        assert_eq!(mean(&[100.0, 300.0]), Some(200.0));
    }

    #[test]
    fn deleting_the_last_child_clears_the_average() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn recompute_is_order_independent() {
        assert_eq!(mean(&[300.0, 100.0]), mean(&[100.0, 300.0]));
    }
}
