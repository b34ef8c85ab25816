use chrono::Utc;
use log::{debug, trace};
use sqlx::{types::Json, QueryBuilder, Sqlite, SqliteConnection};

use super::{push_json_overlap, single_row, WhereClause};
use crate::{
    db_types::{Game, GameRank, NewGame, NewGameRank, NewServiceType, ServiceType},
    market_api::{
        catalog_objects::{GameQueryFilter, PopularGame},
        pagination::PageWindow,
    },
};

/// Escapes the `LIKE` wildcards in user input so that a search term is matched literally.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term.to_lowercase().replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{escaped}%")
}

fn push_game_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &GameQueryFilter) {
    let mut clause = WhereClause::default();
    clause.next(builder);
    builder.push("is_active = 1");
    if !filter.platform_list().is_empty() {
        clause.next(builder);
        push_json_overlap(builder, "platforms", filter.platform_list());
    }
    if let Some(term) = filter.search_term() {
        clause.next(builder);
        builder.push("LOWER(name) LIKE ");
        builder.push_bind(like_pattern(term));
        builder.push(" ESCAPE '\\'");
    }
}

/// Fetches active games matching the filter, ordered by name. If `window` is given, only that page is returned.
pub async fn fetch_games(
    filter: &GameQueryFilter,
    window: Option<PageWindow>,
    conn: &mut SqliteConnection,
) -> Result<Vec<Game>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM games");
    push_game_filter(&mut builder, filter);
    builder.push(" ORDER BY name ASC, id ASC");
    if let Some(w) = window {
        let (limit, offset) = w.sql_bounds();
        builder.push(" LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);
    }
    trace!("🎮️ Executing query: {}", builder.sql());
    let games = builder.build_query_as::<Game>().fetch_all(conn).await?;
    trace!("🎮️ {} games fetched", games.len());
    Ok(games)
}

pub async fn count_games(filter: &GameQueryFilter, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM games");
    push_game_filter(&mut builder, filter);
    let count = builder.build_query_scalar::<i64>().fetch_one(conn).await?;
    Ok(count)
}

pub async fn fetch_game_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Game>, sqlx::Error> {
    let game = sqlx::query_as("SELECT * FROM games WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(game)
}

pub async fn fetch_game_by_slug(slug: &str, conn: &mut SqliteConnection) -> Result<Option<Game>, sqlx::Error> {
    let game = sqlx::query_as("SELECT * FROM games WHERE slug = $1 AND is_active = 1")
        .bind(slug)
        .fetch_optional(conn)
        .await?;
    Ok(game)
}

/// The active ranks of the game, lowest first.
pub async fn fetch_ranks_for_game(game_id: i64, conn: &mut SqliteConnection) -> Result<Vec<GameRank>, sqlx::Error> {
    let ranks = sqlx::query_as(
        "SELECT * FROM game_ranks WHERE game_id = $1 AND is_active = 1 ORDER BY tier ASC, min_mmr ASC, id ASC",
    )
    .bind(game_id)
    .fetch_all(conn)
    .await?;
    Ok(ranks)
}

pub async fn fetch_rank_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<GameRank>, sqlx::Error> {
    let rank = sqlx::query_as("SELECT * FROM game_ranks WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(rank)
}

pub async fn fetch_popular_games(limit: u32, conn: &mut SqliteConnection) -> Result<Vec<PopularGame>, sqlx::Error> {
    let games = sqlx::query_as(
        r#"
        SELECT games.*, COALESCE(counts.order_count, 0) AS order_count
        FROM games
        LEFT JOIN (SELECT game_id, COUNT(*) AS order_count FROM orders GROUP BY game_id) AS counts
            ON counts.game_id = games.id
        WHERE games.is_active = 1
        ORDER BY order_count DESC, games.name ASC, games.id ASC
        LIMIT $1
        "#,
    )
    .bind(i64::from(limit))
    .fetch_all(conn)
    .await?;
    Ok(games)
}

pub async fn fetch_platforms(conn: &mut SqliteConnection) -> Result<Vec<String>, sqlx::Error> {
    let platforms = sqlx::query_scalar(
        r#"
        SELECT DISTINCT platform.value
        FROM games, json_each(games.platforms) AS platform
        WHERE games.is_active = 1
        ORDER BY platform.value ASC
        "#,
    )
    .fetch_all(conn)
    .await?;
    Ok(platforms)
}

pub async fn fetch_service_types(conn: &mut SqliteConnection) -> Result<Vec<ServiceType>, sqlx::Error> {
    let services =
        sqlx::query_as("SELECT * FROM service_types WHERE is_active = 1 ORDER BY name ASC, id ASC").fetch_all(conn).await?;
    Ok(services)
}

pub async fn fetch_service_type_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<ServiceType>, sqlx::Error> {
    let service = sqlx::query_as("SELECT * FROM service_types WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(service)
}

pub async fn insert_game(game: NewGame, conn: &mut SqliteConnection) -> Result<Game, sqlx::Error> {
    let now = Utc::now();
    let game: Game = sqlx::query_as(
        r#"
        INSERT INTO games (name, slug, description, icon_url, banner_url, platforms, is_active, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
        RETURNING *
        "#,
    )
    .bind(game.name)
    .bind(game.slug)
    .bind(game.description)
    .bind(game.icon_url)
    .bind(game.banner_url)
    .bind(Json(game.platforms))
    .bind(game.is_active)
    .bind(now)
    .fetch_all(conn)
    .await
    .and_then(single_row)?;
    debug!("🎮️ Game '{}' added with id {}", game.slug, game.id);
    Ok(game)
}

pub async fn insert_rank(rank: NewGameRank, conn: &mut SqliteConnection) -> Result<GameRank, sqlx::Error> {
    let rank: GameRank = sqlx::query_as(
        r#"
        INSERT INTO game_ranks (
            game_id,
            name,
            tier,
            division,
            division_name,
            min_mmr,
            max_mmr,
            icon_url,
            color_hex,
            created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(rank.game_id)
    .bind(rank.name)
    .bind(rank.tier)
    .bind(rank.division)
    .bind(rank.division_name)
    .bind(rank.min_mmr)
    .bind(rank.max_mmr)
    .bind(rank.icon_url)
    .bind(rank.color_hex)
    .bind(Utc::now())
    .fetch_all(conn)
    .await
    .and_then(single_row)?;
    debug!("🎮️ Rank '{}' added to game {} with id {}", rank.name, rank.game_id, rank.id);
    Ok(rank)
}

pub async fn insert_service_type(
    service: NewServiceType,
    conn: &mut SqliteConnection,
) -> Result<ServiceType, sqlx::Error> {
    let service: ServiceType = sqlx::query_as(
        r#"
        INSERT INTO service_types (name, slug, description, icon, created_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(service.name)
    .bind(service.slug)
    .bind(service.description)
    .bind(service.icon)
    .bind(Utc::now())
    .fetch_all(conn)
    .await
    .and_then(single_row)?;
    debug!("🎮️ Service type '{}' added with id {}", service.slug, service.id);
    Ok(service)
}
