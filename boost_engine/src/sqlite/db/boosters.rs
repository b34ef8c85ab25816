use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::{types::Json, FromRow, QueryBuilder, Sqlite, SqliteConnection};

use super::{first_row, games::like_pattern, push_json_overlap, single_row, WhereClause};
use crate::{
    db_types::{Booster, BoosterUpdate, Money, NewBoosterProfile, UserId},
    market_api::{booster_objects::BoosterQueryFilter, pagination::PageWindow},
};

pub async fn insert_booster(
    user_id: &UserId,
    profile: NewBoosterProfile,
    conn: &mut SqliteConnection,
) -> Result<Booster, sqlx::Error> {
    let now = Utc::now();
    let booster: Booster = sqlx::query_as(
        r#"
        INSERT INTO boosters (
            user_id,
            game_id,
            current_rank_id,
            peak_rank_id,
            server_regions,
            hourly_rate,
            bio,
            experience_years,
            languages,
            created_at,
            updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(profile.game_id)
    .bind(profile.current_rank_id)
    .bind(profile.peak_rank_id)
    .bind(Json(profile.server_regions))
    .bind(profile.hourly_rate)
    .bind(profile.bio)
    .bind(profile.experience_years)
    .bind(Json(profile.languages))
    .bind(now)
    .fetch_all(conn)
    .await
    .and_then(single_row)?;
    debug!("🧑‍🚀️ Booster profile #{} created for {user_id} on game {}", booster.id, booster.game_id);
    Ok(booster)
}

pub async fn fetch_booster_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Booster>, sqlx::Error> {
    let booster = sqlx::query_as("SELECT * FROM boosters WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(booster)
}

pub async fn fetch_booster_for_user_and_game(
    user_id: &UserId,
    game_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Booster>, sqlx::Error> {
    let booster = sqlx::query_as("SELECT * FROM boosters WHERE user_id = $1 AND game_id = $2")
        .bind(user_id)
        .bind(game_id)
        .fetch_optional(conn)
        .await?;
    Ok(booster)
}

pub async fn fetch_boosters_for_user(user_id: &UserId, conn: &mut SqliteConnection) -> Result<Vec<Booster>, sqlx::Error> {
    let boosters = sqlx::query_as("SELECT * FROM boosters WHERE user_id = $1 ORDER BY created_at ASC, id ASC")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(boosters)
}

fn push_booster_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &BoosterQueryFilter) {
    let mut clause = WhereClause::default();
    if let Some(game_id) = filter.game_id {
        clause.next(builder);
        builder.push("game_id = ");
        builder.push_bind(game_id);
    }
    if !filter.regions().is_empty() {
        clause.next(builder);
        push_json_overlap(builder, "server_regions", filter.regions());
    }
    if let Some(rating) = filter.min_rating {
        clause.next(builder);
        builder.push("rating >= ");
        builder.push_bind(rating);
    }
    if let Some(available) = filter.is_available {
        clause.next(builder);
        builder.push("is_available = ");
        builder.push_bind(available);
    }
    if !filter.language_list().is_empty() {
        clause.next(builder);
        push_json_overlap(builder, "languages", filter.language_list());
    }
    if let Some(verified) = filter.is_verified {
        clause.next(builder);
        builder.push("is_verified = ");
        builder.push_bind(verified);
    }
    if let Some(username) = &filter.username {
        clause.next(builder);
        builder.push("user_id IN (SELECT id FROM user_profiles WHERE LOWER(username) LIKE ");
        builder.push_bind(like_pattern(username));
        builder.push(" ESCAPE '\\')");
    }
}

/// Fetches boosters matching the filter, best rated first. `window` selects a page; `limit` caps the result when no
/// window is given.
pub async fn search_boosters(
    filter: &BoosterQueryFilter,
    window: Option<PageWindow>,
    limit: Option<u32>,
    conn: &mut SqliteConnection,
) -> Result<Vec<Booster>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM boosters");
    push_booster_filter(&mut builder, filter);
    builder.push(" ORDER BY rating DESC, total_orders DESC, id ASC");
    match (window, limit) {
        (Some(w), _) => {
            let (limit, offset) = w.sql_bounds();
            builder.push(" LIMIT ");
            builder.push_bind(limit);
            builder.push(" OFFSET ");
            builder.push_bind(offset);
        },
        (None, Some(limit)) => {
            builder.push(" LIMIT ");
            builder.push_bind(i64::from(limit));
        },
        (None, None) => {},
    }
    trace!("🧑‍🚀️ Executing query: {}", builder.sql());
    let boosters = builder.build_query_as::<Booster>().fetch_all(conn).await?;
    trace!("🧑‍🚀️ {} boosters fetched", boosters.len());
    Ok(boosters)
}

pub async fn count_boosters(filter: &BoosterQueryFilter, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM boosters");
    push_booster_filter(&mut builder, filter);
    let count = builder.build_query_scalar::<i64>().fetch_one(conn).await?;
    Ok(count)
}

/// Applies the fields present in `update`. The caller must make sure the update is not empty.
pub async fn update_booster(
    id: i64,
    update: BoosterUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Booster>, sqlx::Error> {
    let mut builder = QueryBuilder::new("UPDATE boosters SET updated_at = ");
    builder.push_bind(Utc::now());
    if let Some(rank) = update.current_rank_id {
        builder.push(", current_rank_id = ");
        builder.push_bind(rank);
    }
    if let Some(rank) = update.peak_rank_id {
        builder.push(", peak_rank_id = ");
        builder.push_bind(rank);
    }
    if let Some(regions) = update.server_regions {
        builder.push(", server_regions = ");
        builder.push_bind(Json(regions));
    }
    if let Some(rate) = update.hourly_rate {
        builder.push(", hourly_rate = ");
        builder.push_bind(rate);
    }
    if let Some(bio) = update.bio {
        builder.push(", bio = ");
        builder.push_bind(bio);
    }
    if let Some(years) = update.experience_years {
        builder.push(", experience_years = ");
        builder.push_bind(years);
    }
    if let Some(languages) = update.languages {
        builder.push(", languages = ");
        builder.push_bind(Json(languages));
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" RETURNING *");
    trace!("🧑‍🚀️ Executing query: {}", builder.sql());
    let booster = builder.build_query_as::<Booster>().fetch_all(conn).await.map(first_row)?;
    Ok(booster)
}

pub async fn set_availability(
    id: i64,
    available: bool,
    conn: &mut SqliteConnection,
) -> Result<Option<Booster>, sqlx::Error> {
    let booster = sqlx::query_as("UPDATE boosters SET is_available = $1, updated_at = $2 WHERE id = $3 RETURNING *")
        .bind(available)
        .bind(Utc::now())
        .bind(id)
        .fetch_all(conn)
        .await
        .map(first_row)?;
    Ok(booster)
}

pub async fn set_verified(id: i64, verified: bool, conn: &mut SqliteConnection) -> Result<Option<Booster>, sqlx::Error> {
    let booster = sqlx::query_as("UPDATE boosters SET is_verified = $1, updated_at = $2 WHERE id = $3 RETURNING *")
        .bind(verified)
        .bind(Utc::now())
        .bind(id)
        .fetch_all(conn)
        .await
        .map(first_row)?;
    Ok(booster)
}

pub async fn count_orders_for_booster(id: i64, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE booster_id = $1").bind(id).fetch_one(conn).await?;
    Ok(count)
}

pub async fn delete_booster(id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM boosters WHERE id = $1").bind(id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

pub async fn incr_total_orders(id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE boosters SET total_orders = total_orders + 1, updated_at = $1 WHERE id = $2")
        .bind(Utc::now())
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn incr_completed_orders(id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE boosters SET completed_orders = completed_orders + 1, updated_at = $1 WHERE id = $2")
        .bind(Utc::now())
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Recomputes the booster's rating as the mean of its review scores.
pub async fn refresh_rating(id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE boosters
        SET rating = COALESCE((SELECT ROUND(AVG(rating), 2) FROM reviews WHERE booster_id = $1), 0),
            updated_at = $2
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(Utc::now())
    .execute(conn)
    .await?;
    Ok(())
}

#[derive(Debug, Clone, Default, FromRow)]
pub struct AssignedOrderTotals {
    pub total_orders: i64,
    pub completed_orders: i64,
    pub pending_orders: i64,
    pub active_orders: i64,
    pub total_earnings: Money,
}

/// Order counts across every booster profile the user owns.
pub async fn assigned_order_totals(
    user_id: &UserId,
    conn: &mut SqliteConnection,
) -> Result<AssignedOrderTotals, sqlx::Error> {
    let totals = sqlx::query_as(
        r#"
        SELECT
            COUNT(*) AS total_orders,
            COALESCE(SUM(status = 'completed'), 0) AS completed_orders,
            COALESCE(SUM(status = 'pending'), 0) AS pending_orders,
            COALESCE(SUM(status IN ('accepted', 'in_progress')), 0) AS active_orders,
            COALESCE(SUM(CASE WHEN status = 'completed' THEN total_price ELSE 0 END), 0) AS total_earnings
        FROM orders
        WHERE booster_id IN (SELECT id FROM boosters WHERE user_id = $1)
        "#,
    )
    .bind(user_id)
    .fetch_one(conn)
    .await?;
    Ok(totals)
}

/// `(created_at, accepted_at)` for every accepted order assigned to the user's booster profiles.
pub async fn acceptance_times(
    user_id: &UserId,
    conn: &mut SqliteConnection,
) -> Result<Vec<(DateTime<Utc>, DateTime<Utc>)>, sqlx::Error> {
    let times = sqlx::query_as(
        r#"
        SELECT created_at, accepted_at
        FROM orders
        WHERE accepted_at IS NOT NULL AND booster_id IN (SELECT id FROM boosters WHERE user_id = $1)
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    Ok(times)
}

pub async fn average_review_rating(user_id: &UserId, conn: &mut SqliteConnection) -> Result<Option<f64>, sqlx::Error> {
    let avg = sqlx::query_scalar(
        "SELECT AVG(rating) FROM reviews WHERE booster_id IN (SELECT id FROM boosters WHERE user_id = $1)",
    )
    .bind(user_id)
    .fetch_one(conn)
    .await?;
    Ok(avg)
}
