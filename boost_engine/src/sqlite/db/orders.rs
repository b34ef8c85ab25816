use chrono::Utc;
use log::{debug, trace};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use super::{first_row, push_in_list, single_row, WhereClause};
use crate::{
    db_types::{NewOrder, NewReview, Order, OrderStatusType, Payment, Review, UserId},
    market_api::{
        order_objects::{OrderQueryFilter, OrderScope, OrderStats},
        pagination::PageWindow,
    },
    pricing::PriceCalculation,
};

/// Inserts a new pending order. This is not atomic on its own; embed it in a transaction if other writes depend on
/// it.
pub async fn insert_order(
    user_id: &UserId,
    order: NewOrder,
    price: PriceCalculation,
    conn: &mut SqliteConnection,
) -> Result<Order, sqlx::Error> {
    let now = Utc::now();
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                user_id,
                game_id,
                service_type_id,
                current_rank_id,
                target_rank_id,
                server_region,
                additional_info,
                base_price,
                platform_fee,
                total_price,
                priority,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING *;
        "#,
    )
    .bind(user_id)
    .bind(order.game_id)
    .bind(order.service_type_id)
    .bind(order.current_rank_id)
    .bind(order.target_rank_id)
    .bind(order.server_region)
    .bind(order.additional_info)
    .bind(price.base_price)
    .bind(price.platform_fee)
    .bind(price.total_price)
    .bind(order.priority)
    .bind(now)
    .fetch_all(conn)
    .await
    .and_then(single_row)?;
    debug!("📝️ Order #{} placed by {user_id} for {}", order.id, order.total_price);
    Ok(order)
}

pub async fn fetch_order(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

fn push_order_filter(builder: &mut QueryBuilder<'_, Sqlite>, scope: &OrderScope, filter: &OrderQueryFilter) {
    let mut clause = WhereClause::default();
    match scope {
        OrderScope::All => {},
        OrderScope::Requester(user_id) => {
            clause.next(builder);
            builder.push("user_id = ");
            builder.push_bind(user_id.clone());
        },
        OrderScope::BoosterUser(user_id) => {
            clause.next(builder);
            builder.push("booster_id IN (SELECT id FROM boosters WHERE user_id = ");
            builder.push_bind(user_id.clone());
            builder.push(")");
        },
    }
    if !filter.statuses().is_empty() {
        clause.next(builder);
        push_in_list(builder, "status", filter.statuses());
    }
    if let Some(game_id) = filter.game_id {
        clause.next(builder);
        builder.push("game_id = ");
        builder.push_bind(game_id);
    }
    if let Some(since) = filter.date_from {
        clause.next(builder);
        builder.push("created_at >= ");
        builder.push_bind(since);
    }
    if let Some(until) = filter.date_to {
        clause.next(builder);
        builder.push("created_at <= ");
        builder.push_bind(until);
    }
    if !filter.priorities().is_empty() {
        clause.next(builder);
        push_in_list(builder, "priority", filter.priorities());
    }
}

/// Fetches orders in scope matching the filter, newest first.
pub async fn search_orders(
    scope: &OrderScope,
    filter: &OrderQueryFilter,
    window: Option<PageWindow>,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM orders");
    push_order_filter(&mut builder, scope, filter);
    builder.push(" ORDER BY created_at DESC, id DESC");
    if let Some(w) = window {
        let (limit, offset) = w.sql_bounds();
        builder.push(" LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);
    }
    trace!("📝️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    trace!("📝️ Result of search_orders: {}", orders.len());
    Ok(orders)
}

pub async fn count_orders(
    scope: &OrderScope,
    filter: &OrderQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM orders");
    push_order_filter(&mut builder, scope, filter);
    let count = builder.build_query_scalar::<i64>().fetch_one(conn).await?;
    Ok(count)
}

/// Assigns the booster if the order is still pending. Returns `None` if another booster got there first (or the order
/// does not exist).
pub async fn assign_booster(
    order_id: i64,
    booster_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let now = Utc::now();
    let order = sqlx::query_as(
        r#"
        UPDATE orders SET booster_id = $1, status = 'accepted', accepted_at = $2, updated_at = $2
        WHERE id = $3 AND status = 'pending'
        RETURNING *
        "#,
    )
    .bind(booster_id)
    .bind(now)
    .bind(order_id)
    .fetch_all(conn)
    .await
    .map(first_row)?;
    Ok(order)
}

/// Moves the order from `from` to `to`, if it is still in `from`.
///
/// Entering `in_progress` stamps `started_at` the first time only. Entering `completed` stamps `completed_at` and
/// records how many whole days the job took (at least one).
pub async fn update_status(
    order_id: i64,
    from: OrderStatusType,
    to: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let now = Utc::now();
    let mut builder = QueryBuilder::new("UPDATE orders SET status = ");
    builder.push_bind(to.to_string());
    builder.push(", updated_at = ");
    builder.push_bind(now);
    match to {
        OrderStatusType::InProgress => {
            builder.push(", started_at = COALESCE(started_at, ");
            builder.push_bind(now);
            builder.push(")");
        },
        OrderStatusType::Completed => {
            builder.push(", completed_at = ");
            builder.push_bind(now);
        },
        _ => {},
    }
    builder.push(" WHERE id = ");
    builder.push_bind(order_id);
    builder.push(" AND status = ");
    builder.push_bind(from.to_string());
    builder.push(" RETURNING *");
    trace!("📝️ Executing query: {}", builder.sql());
    let order = builder.build_query_as::<Order>().fetch_all(&mut *conn).await.map(first_row)?;
    match order {
        Some(order) if to == OrderStatusType::Completed => {
            let started = order.started_at.or(order.accepted_at).unwrap_or(order.created_at);
            let days = (now - started).num_days().max(1);
            let order = sqlx::query_as("UPDATE orders SET actual_days = $1 WHERE id = $2 RETURNING *")
                .bind(days)
                .bind(order_id)
                .fetch_all(conn)
                .await
                .and_then(single_row)?;
            Ok(Some(order))
        },
        other => Ok(other),
    }
}

/// Cancels the order if `user_id` placed it and it is still pending or accepted.
pub async fn cancel_order(
    order_id: i64,
    user_id: &UserId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
        UPDATE orders SET status = 'cancelled', updated_at = $1
        WHERE id = $2 AND user_id = $3 AND status IN ('pending', 'accepted')
        RETURNING *
        "#,
    )
    .bind(Utc::now())
    .bind(order_id)
    .bind(user_id)
    .fetch_all(conn)
    .await
    .map(first_row)?;
    Ok(order)
}

pub async fn fetch_payments_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Payment>, sqlx::Error> {
    let payments = sqlx::query_as("SELECT * FROM payments WHERE order_id = $1 ORDER BY created_at ASC, id ASC")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(payments)
}

pub async fn fetch_reviews_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Review>, sqlx::Error> {
    let reviews = sqlx::query_as("SELECT * FROM reviews WHERE order_id = $1 ORDER BY created_at ASC, id ASC")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(reviews)
}

pub async fn insert_review(
    order_id: i64,
    user_id: &UserId,
    booster_id: i64,
    review: NewReview,
    conn: &mut SqliteConnection,
) -> Result<Review, sqlx::Error> {
    let review: Review = sqlx::query_as(
        r#"
        INSERT INTO reviews (order_id, user_id, booster_id, rating, comment, is_public, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(order_id)
    .bind(user_id)
    .bind(booster_id)
    .bind(review.rating)
    .bind(review.comment)
    .bind(review.is_public)
    .bind(Utc::now())
    .fetch_all(conn)
    .await
    .and_then(single_row)?;
    debug!("📝️ Order #{order_id} reviewed with a rating of {}", review.rating);
    Ok(review)
}

pub async fn fetch_order_stats(conn: &mut SqliteConnection) -> Result<OrderStats, sqlx::Error> {
    let stats = sqlx::query_as(
        r#"
        SELECT
            COUNT(*) AS total_orders,
            COALESCE(SUM(status = 'pending'), 0) AS pending_orders,
            COALESCE(SUM(status = 'accepted'), 0) AS accepted_orders,
            COALESCE(SUM(status = 'in_progress'), 0) AS in_progress_orders,
            COALESCE(SUM(status = 'completed'), 0) AS completed_orders,
            COALESCE(SUM(status = 'cancelled'), 0) AS cancelled_orders,
            COALESCE(SUM(status = 'disputed'), 0) AS disputed_orders,
            COALESCE(SUM(CASE WHEN status = 'completed' THEN total_price ELSE 0 END), 0) AS total_revenue
        FROM orders
        "#,
    )
    .fetch_one(conn)
    .await?;
    Ok(stats)
}
