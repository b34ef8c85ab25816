use chrono::Utc;
use log::debug;
use sqlx::SqliteConnection;

use super::single_row;
use crate::{
    db_types::{Money, Role, UpdateUserProfile, UserId, UserProfile},
    market_api::order_objects::PlayerDashboardStats,
};

pub async fn fetch_profile(user_id: &UserId, conn: &mut SqliteConnection) -> Result<Option<UserProfile>, sqlx::Error> {
    let profile = sqlx::query_as("SELECT * FROM user_profiles WHERE id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(profile)
}

/// Creates a default profile for the user unless one already exists.
pub async fn ensure_profile(user_id: &UserId, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO user_profiles (id, created_at, updated_at) VALUES ($1, $2, $2) ON CONFLICT (id) DO NOTHING",
    )
    .bind(user_id)
    .bind(Utc::now())
    .execute(conn)
    .await?;
    if result.rows_affected() > 0 {
        debug!("👤️ Created profile for {user_id}");
    }
    Ok(())
}

/// Upserts the profile, only overwriting the fields present in `update`.
pub async fn upsert_profile(
    user_id: &UserId,
    update: UpdateUserProfile,
    conn: &mut SqliteConnection,
) -> Result<UserProfile, sqlx::Error> {
    let profile = sqlx::query_as(
        r#"
        INSERT INTO user_profiles (id, username, full_name, avatar_url, country, timezone, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'UTC'), $7, $7)
        ON CONFLICT (id) DO UPDATE SET
            username = COALESCE($2, username),
            full_name = COALESCE($3, full_name),
            avatar_url = COALESCE($4, avatar_url),
            country = COALESCE($5, country),
            timezone = COALESCE($6, timezone),
            updated_at = $7
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(update.username)
    .bind(update.full_name)
    .bind(update.avatar_url)
    .bind(update.country)
    .bind(update.timezone)
    .bind(Utc::now())
    .fetch_all(conn)
    .await
    .and_then(single_row)?;
    Ok(profile)
}

/// Promotes a player to the booster role. Admins keep their role.
pub async fn promote_to_booster(user_id: &UserId, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    ensure_profile(user_id, conn).await?;
    sqlx::query("UPDATE user_profiles SET role = $1, updated_at = $2 WHERE id = $3 AND role = $4")
        .bind(Role::Booster)
        .bind(Utc::now())
        .bind(user_id)
        .bind(Role::Player)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn incr_total_orders(user_id: &UserId, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    ensure_profile(user_id, conn).await?;
    sqlx::query("UPDATE user_profiles SET total_orders = total_orders + 1, updated_at = $1 WHERE id = $2")
        .bind(Utc::now())
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn add_to_total_spent(user_id: &UserId, amount: Money, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    ensure_profile(user_id, conn).await?;
    sqlx::query("UPDATE user_profiles SET total_spent = total_spent + $1, updated_at = $2 WHERE id = $3")
        .bind(amount)
        .bind(Utc::now())
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn player_dashboard(
    user_id: &UserId,
    conn: &mut SqliteConnection,
) -> Result<PlayerDashboardStats, sqlx::Error> {
    let stats = sqlx::query_as(
        r#"
        SELECT
            COUNT(*) AS total_orders,
            COALESCE(SUM(status = 'pending'), 0) AS pending_orders,
            COALESCE(SUM(status IN ('accepted', 'in_progress', 'disputed')), 0) AS active_orders,
            COALESCE(SUM(status = 'completed'), 0) AS completed_orders,
            COALESCE(SUM(status = 'cancelled'), 0) AS cancelled_orders,
            COALESCE(SUM(CASE WHEN status = 'completed' THEN total_price ELSE 0 END), 0) AS total_spent
        FROM orders
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(conn)
    .await?;
    Ok(stats)
}
