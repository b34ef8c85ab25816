//! `SqliteDatabase` is a concrete implementation of a marketplace engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{boosters, db_url, games, new_pool, orders, profiles, progress};
use crate::{
    db_types::{
        Booster,
        BoosterUpdate,
        Game,
        GameRank,
        NewBoosterProfile,
        NewGame,
        NewGameRank,
        NewOrder,
        NewProgressEntry,
        NewReview,
        NewServiceType,
        Order,
        OrderDetails,
        OrderStatusType,
        Review,
        ServiceType,
        UpdateUserProfile,
        UserId,
        UserProfile,
    },
    market_api::{
        booster_objects::{round_2dp, BoosterDashboardStats, BoosterQueryFilter},
        catalog_objects::{GameQueryFilter, PopularGame},
        order_objects::{OrderQueryFilter, OrderScope, OrderStats, PlayerDashboardStats},
        pagination::PageWindow,
    },
    pricing::PriceCalculation,
    traits::{
        AccountError,
        AccountManagement,
        BoosterError,
        BoosterManagement,
        CatalogError,
        CatalogManagement,
        MarketplaceDatabase,
        OrderFlowError,
        OrderManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error().map(|d| d.is_unique_violation()).unwrap_or(false)
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL in `BM_DATABASE_URL`, or the default location.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        trace!("🗃️ Created new SQLite pool for {url}");
        Ok(Self { url: url.to_string(), pool })
    }

    /// Brings the schema up to date.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl MarketplaceDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn close(&mut self) -> Result<(), sqlx::Error> {
        self.pool.close().await;
        Ok(())
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_games(&self, filter: &GameQueryFilter) -> Result<Vec<Game>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let result = games::fetch_games(filter, None, &mut conn).await?;
        Ok(result)
    }

    async fn fetch_games_page(
        &self,
        filter: &GameQueryFilter,
        window: PageWindow,
    ) -> Result<(Vec<Game>, i64), CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let total = games::count_games(filter, &mut conn).await?;
        let page = games::fetch_games(filter, Some(window), &mut conn).await?;
        Ok((page, total))
    }

    async fn fetch_game_by_id(&self, id: i64) -> Result<Option<Game>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let game = games::fetch_game_by_id(id, &mut conn).await?;
        Ok(game)
    }

    async fn fetch_game_by_slug(&self, slug: &str) -> Result<Option<Game>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let game = games::fetch_game_by_slug(slug, &mut conn).await?;
        Ok(game)
    }

    async fn fetch_ranks_for_game(&self, game_id: i64) -> Result<Vec<GameRank>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let ranks = games::fetch_ranks_for_game(game_id, &mut conn).await?;
        Ok(ranks)
    }

    async fn fetch_rank_by_id(&self, id: i64) -> Result<Option<GameRank>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let rank = games::fetch_rank_by_id(id, &mut conn).await?;
        Ok(rank)
    }

    async fn fetch_popular_games(&self, limit: u32) -> Result<Vec<PopularGame>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let popular = games::fetch_popular_games(limit, &mut conn).await?;
        Ok(popular)
    }

    async fn fetch_platforms(&self) -> Result<Vec<String>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let platforms = games::fetch_platforms(&mut conn).await?;
        Ok(platforms)
    }

    async fn fetch_service_types(&self) -> Result<Vec<ServiceType>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let services = games::fetch_service_types(&mut conn).await?;
        Ok(services)
    }

    async fn fetch_service_type_by_id(&self, id: i64) -> Result<Option<ServiceType>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let service = games::fetch_service_type_by_id(id, &mut conn).await?;
        Ok(service)
    }

    async fn insert_game(&self, game: NewGame) -> Result<Game, CatalogError> {
        let mut tx = self.pool.begin().await?;
        let slug = game.slug.clone();
        let game = games::insert_game(game, &mut tx).await.map_err(|e| {
            if is_unique_violation(&e) {
                CatalogError::SlugAlreadyExists(slug)
            } else {
                e.into()
            }
        })?;
        tx.commit().await?;
        Ok(game)
    }

    async fn insert_rank(&self, rank: NewGameRank) -> Result<GameRank, CatalogError> {
        let mut tx = self.pool.begin().await?;
        if games::fetch_game_by_id(rank.game_id, &mut tx).await?.is_none() {
            return Err(CatalogError::GameNotFound(rank.game_id));
        }
        let rank = games::insert_rank(rank, &mut tx).await?;
        tx.commit().await?;
        Ok(rank)
    }

    async fn insert_service_type(&self, service: NewServiceType) -> Result<ServiceType, CatalogError> {
        let mut tx = self.pool.begin().await?;
        let slug = service.slug.clone();
        let service = games::insert_service_type(service, &mut tx).await.map_err(|e| {
            if is_unique_violation(&e) {
                CatalogError::SlugAlreadyExists(slug)
            } else {
                e.into()
            }
        })?;
        tx.commit().await?;
        Ok(service)
    }
}

impl BoosterManagement for SqliteDatabase {
    async fn insert_booster(&self, user_id: &UserId, profile: NewBoosterProfile) -> Result<Booster, BoosterError> {
        let game_id = profile.game_id;
        let mut tx = self.pool.begin().await?;
        if boosters::fetch_booster_for_user_and_game(user_id, game_id, &mut tx).await?.is_some() {
            debug!("🗃️ {user_id} already has a booster profile for game {game_id}");
            return Err(BoosterError::ProfileAlreadyExists { user_id: user_id.clone(), game_id });
        }
        // The unique index catches a concurrent registration that slipped past the check above
        let booster = boosters::insert_booster(user_id, profile, &mut tx).await.map_err(|e| {
            if is_unique_violation(&e) {
                BoosterError::ProfileAlreadyExists { user_id: user_id.clone(), game_id }
            } else {
                e.into()
            }
        })?;
        profiles::promote_to_booster(user_id, &mut tx).await?;
        tx.commit().await?;
        Ok(booster)
    }

    async fn fetch_booster_by_id(&self, id: i64) -> Result<Option<Booster>, BoosterError> {
        let mut conn = self.pool.acquire().await?;
        let booster = boosters::fetch_booster_by_id(id, &mut conn).await?;
        Ok(booster)
    }

    async fn fetch_booster_for_user_and_game(
        &self,
        user_id: &UserId,
        game_id: i64,
    ) -> Result<Option<Booster>, BoosterError> {
        let mut conn = self.pool.acquire().await?;
        let booster = boosters::fetch_booster_for_user_and_game(user_id, game_id, &mut conn).await?;
        Ok(booster)
    }

    async fn fetch_boosters_for_user(&self, user_id: &UserId) -> Result<Vec<Booster>, BoosterError> {
        let mut conn = self.pool.acquire().await?;
        let result = boosters::fetch_boosters_for_user(user_id, &mut conn).await?;
        Ok(result)
    }

    async fn search_boosters(
        &self,
        filter: &BoosterQueryFilter,
        limit: Option<u32>,
    ) -> Result<Vec<Booster>, BoosterError> {
        let mut conn = self.pool.acquire().await?;
        let result = boosters::search_boosters(filter, None, limit, &mut conn).await?;
        Ok(result)
    }

    async fn fetch_boosters_page(
        &self,
        filter: &BoosterQueryFilter,
        window: PageWindow,
    ) -> Result<(Vec<Booster>, i64), BoosterError> {
        let mut conn = self.pool.acquire().await?;
        let total = boosters::count_boosters(filter, &mut conn).await?;
        let page = boosters::search_boosters(filter, Some(window), None, &mut conn).await?;
        Ok((page, total))
    }

    async fn update_booster(&self, id: i64, update: BoosterUpdate) -> Result<Option<Booster>, BoosterError> {
        if update.is_empty() {
            return Err(BoosterError::EmptyUpdate);
        }
        let mut tx = self.pool.begin().await?;
        let booster = boosters::update_booster(id, update, &mut tx).await?;
        tx.commit().await?;
        Ok(booster)
    }

    async fn set_booster_availability(&self, id: i64, available: bool) -> Result<Option<Booster>, BoosterError> {
        let mut tx = self.pool.begin().await?;
        let booster = boosters::set_availability(id, available, &mut tx).await?;
        tx.commit().await?;
        Ok(booster)
    }

    async fn set_booster_verified(&self, id: i64, verified: bool) -> Result<Option<Booster>, BoosterError> {
        let mut tx = self.pool.begin().await?;
        let booster = boosters::set_verified(id, verified, &mut tx).await?;
        tx.commit().await?;
        Ok(booster)
    }

    async fn delete_booster(&self, id: i64) -> Result<bool, BoosterError> {
        let mut tx = self.pool.begin().await?;
        if boosters::count_orders_for_booster(id, &mut tx).await? > 0 {
            return Err(BoosterError::BoosterInUse(id));
        }
        let deleted = boosters::delete_booster(id, &mut tx).await?;
        tx.commit().await?;
        Ok(deleted)
    }

    async fn fetch_booster_dashboard(&self, user_id: &UserId) -> Result<BoosterDashboardStats, BoosterError> {
        let mut conn = self.pool.acquire().await?;
        let totals = boosters::assigned_order_totals(user_id, &mut conn).await?;
        let average_rating = boosters::average_review_rating(user_id, &mut conn).await?.unwrap_or_default();
        let times = boosters::acceptance_times(user_id, &mut conn).await?;
        #[allow(clippy::cast_precision_loss)]
        let response_time = if times.is_empty() {
            0.0
        } else {
            let total_seconds: i64 = times.iter().map(|(created, accepted)| (*accepted - *created).num_seconds()).sum();
            total_seconds as f64 / 60.0 / times.len() as f64
        };
        #[allow(clippy::cast_precision_loss)]
        let completion_rate = if totals.total_orders > 0 {
            totals.completed_orders as f64 * 100.0 / totals.total_orders as f64
        } else {
            0.0
        };
        Ok(BoosterDashboardStats {
            total_orders: totals.total_orders,
            completed_orders: totals.completed_orders,
            pending_orders: totals.pending_orders,
            active_orders: totals.active_orders,
            total_earnings: totals.total_earnings,
            average_rating: round_2dp(average_rating),
            completion_rate: round_2dp(completion_rate),
            response_time: round_2dp(response_time),
        })
    }
}

impl OrderManagement for SqliteDatabase {
    async fn insert_order(
        &self,
        user_id: &UserId,
        order: NewOrder,
        price: PriceCalculation,
    ) -> Result<Order, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::insert_order(user_id, order, price, &mut tx).await?;
        profiles::incr_total_orders(user_id, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn fetch_order(&self, id: i64) -> Result<Option<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_details(&self, id: i64) -> Result<Option<OrderDetails>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let order = match orders::fetch_order(id, &mut conn).await? {
            Some(o) => o,
            None => return Ok(None),
        };
        let progress = progress::fetch_progress_for_order(id, &mut conn).await?;
        let payments = orders::fetch_payments_for_order(id, &mut conn).await?;
        let reviews = orders::fetch_reviews_for_order(id, &mut conn).await?;
        Ok(Some(OrderDetails { order, progress, payments, reviews }))
    }

    async fn fetch_orders(&self, scope: &OrderScope, filter: &OrderQueryFilter) -> Result<Vec<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let result = orders::search_orders(scope, filter, None, &mut conn).await?;
        Ok(result)
    }

    async fn fetch_orders_page(
        &self,
        scope: &OrderScope,
        filter: &OrderQueryFilter,
        window: PageWindow,
    ) -> Result<(Vec<Order>, i64), OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let total = orders::count_orders(scope, filter, &mut conn).await?;
        let page = orders::search_orders(scope, filter, Some(window), &mut conn).await?;
        Ok((page, total))
    }

    async fn assign_booster(&self, order_id: i64, booster_id: i64) -> Result<Option<Order>, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::assign_booster(order_id, booster_id, &mut tx).await?;
        if order.is_some() {
            boosters::incr_total_orders(booster_id, &mut tx).await?;
            tx.commit().await?;
            debug!("🗃️ Order #{order_id} assigned to booster #{booster_id}");
        } else {
            tx.rollback().await?;
        }
        Ok(order)
    }

    async fn transition_order(
        &self,
        order_id: i64,
        from: OrderStatusType,
        to: OrderStatusType,
        entry: Option<NewProgressEntry>,
    ) -> Result<Option<Order>, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let order = match orders::update_status(order_id, from, to, &mut tx).await? {
            Some(o) => o,
            None => {
                tx.rollback().await?;
                return Ok(None);
            },
        };
        if to == OrderStatusType::Completed {
            if let Some(booster_id) = order.booster_id {
                boosters::incr_completed_orders(booster_id, &mut tx).await?;
            }
            profiles::add_to_total_spent(&order.user_id, order.total_price, &mut tx).await?;
        }
        if let Some(entry) = entry {
            progress::insert_progress(entry, &mut tx).await?;
        }
        tx.commit().await?;
        debug!("🗃️ Order #{order_id} moved from {from} to {to}");
        Ok(Some(order))
    }

    async fn cancel_order(
        &self,
        order_id: i64,
        user_id: &UserId,
        entry: Option<NewProgressEntry>,
    ) -> Result<Option<Order>, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let order = match orders::cancel_order(order_id, user_id, &mut tx).await? {
            Some(o) => o,
            None => {
                tx.rollback().await?;
                return Ok(None);
            },
        };
        if let Some(entry) = entry {
            progress::insert_progress(entry, &mut tx).await?;
        }
        tx.commit().await?;
        debug!("🗃️ Order #{order_id} cancelled by {user_id}");
        Ok(Some(order))
    }

    async fn insert_review(&self, order: &Order, review: NewReview) -> Result<Review, OrderFlowError> {
        let booster_id = order.booster_id.ok_or_else(|| {
            OrderFlowError::InvalidReview(format!("Order #{} was never assigned to a booster", order.id))
        })?;
        let mut tx = self.pool.begin().await?;
        let review = orders::insert_review(order.id, &order.user_id, booster_id, review, &mut tx).await.map_err(|e| {
            if is_unique_violation(&e) {
                OrderFlowError::AlreadyReviewed(order.id)
            } else {
                e.into()
            }
        })?;
        boosters::refresh_rating(booster_id, &mut tx).await?;
        tx.commit().await?;
        Ok(review)
    }

    async fn fetch_order_stats(&self) -> Result<OrderStats, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let stats = orders::fetch_order_stats(&mut conn).await?;
        Ok(stats)
    }
}

impl AccountManagement for SqliteDatabase {
    async fn fetch_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, AccountError> {
        let mut conn = self.pool.acquire().await?;
        let profile = profiles::fetch_profile(user_id, &mut conn).await?;
        Ok(profile)
    }

    async fn fetch_or_create_profile(&self, user_id: &UserId) -> Result<UserProfile, AccountError> {
        let mut tx = self.pool.begin().await?;
        profiles::ensure_profile(user_id, &mut tx).await?;
        let profile = profiles::fetch_profile(user_id, &mut tx).await?;
        tx.commit().await?;
        profile.ok_or_else(|| AccountError::DatabaseError(format!("Profile for {user_id} vanished after creation")))
    }

    async fn update_profile(&self, user_id: &UserId, update: UpdateUserProfile) -> Result<UserProfile, AccountError> {
        let mut tx = self.pool.begin().await?;
        let username = update.username.clone();
        let profile = profiles::upsert_profile(user_id, update, &mut tx).await.map_err(|e| {
            if is_unique_violation(&e) {
                AccountError::UsernameTaken(username.unwrap_or_default())
            } else {
                e.into()
            }
        })?;
        tx.commit().await?;
        Ok(profile)
    }

    async fn fetch_player_dashboard(&self, user_id: &UserId) -> Result<PlayerDashboardStats, AccountError> {
        let mut conn = self.pool.acquire().await?;
        let stats = profiles::player_dashboard(user_id, &mut conn).await?;
        Ok(stats)
    }
}
