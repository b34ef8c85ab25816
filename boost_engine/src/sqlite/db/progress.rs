use chrono::Utc;
use log::trace;
use sqlx::SqliteConnection;

use super::single_row;
use crate::db_types::{NewProgressEntry, OrderProgress};

/// Appends an entry to an order's timeline.
pub async fn insert_progress(
    entry: NewProgressEntry,
    conn: &mut SqliteConnection,
) -> Result<OrderProgress, sqlx::Error> {
    let progress: OrderProgress = sqlx::query_as(
        r#"
        INSERT INTO order_progress (order_id, status, message, screenshot_url, progress_percentage, created_by, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(entry.order_id)
    .bind(entry.status)
    .bind(entry.message)
    .bind(entry.screenshot_url)
    .bind(entry.progress_percentage)
    .bind(entry.created_by)
    .bind(Utc::now())
    .fetch_all(conn)
    .await
    .and_then(single_row)?;
    trace!("📈️ Progress entry #{} added to order #{}", progress.id, progress.order_id);
    Ok(progress)
}

/// The order's timeline, oldest entry first.
pub async fn fetch_progress_for_order(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderProgress>, sqlx::Error> {
    let entries = sqlx::query_as("SELECT * FROM order_progress WHERE order_id = $1 ORDER BY created_at ASC, id ASC")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(entries)
}
