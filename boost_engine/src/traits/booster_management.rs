use thiserror::Error;

use crate::{
    db_types::{Booster, BoosterUpdate, NewBoosterProfile, UserId},
    market_api::{
        booster_objects::{BoosterDashboardStats, BoosterQueryFilter},
        pagination::{PageWindow, PaginationError},
    },
    traits::CatalogError,
};

#[derive(Debug, Clone, Error)]
pub enum BoosterError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Booster {0} does not exist")]
    BoosterNotFound(i64),
    #[error("User {user_id} already has a booster profile for game {game_id}")]
    ProfileAlreadyExists { user_id: UserId, game_id: i64 },
    #[error("Booster {0} does not belong to the current user")]
    NotOwner(i64),
    #[error("Only administrators may {0}")]
    AdminOnly(String),
    #[error("Booster {0} still has orders assigned to it and cannot be deleted")]
    BoosterInUse(i64),
    #[error("Invalid booster profile: {0}")]
    InvalidProfile(String),
    #[error("Nothing to update")]
    EmptyUpdate,
    #[error("{0}")]
    InvalidPagination(#[from] PaginationError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl From<sqlx::Error> for BoosterError {
    fn from(e: sqlx::Error) -> Self {
        BoosterError::DatabaseError(e.to_string())
    }
}

/// The `BoosterManagement` trait defines behaviour for managing per-game booster profiles.
///
/// A user may hold at most one profile per game. Backends must enforce this atomically, so that two concurrent
/// registrations for the same (user, game) pair cannot both succeed.
#[allow(async_fn_in_trait)]
pub trait BoosterManagement {
    /// Creates a booster profile for `user_id`. If the user already has a profile for the game,
    /// [`BoosterError::ProfileAlreadyExists`] is returned and nothing is changed.
    async fn insert_booster(&self, user_id: &UserId, profile: NewBoosterProfile) -> Result<Booster, BoosterError>;

    async fn fetch_booster_by_id(&self, id: i64) -> Result<Option<Booster>, BoosterError>;

    async fn fetch_booster_for_user_and_game(
        &self,
        user_id: &UserId,
        game_id: i64,
    ) -> Result<Option<Booster>, BoosterError>;

    async fn fetch_boosters_for_user(&self, user_id: &UserId) -> Result<Vec<Booster>, BoosterError>;

    /// Boosters matching the filter, best rated first. Ties are broken by order count, then by id.
    async fn search_boosters(
        &self,
        filter: &BoosterQueryFilter,
        limit: Option<u32>,
    ) -> Result<Vec<Booster>, BoosterError>;

    async fn fetch_boosters_page(
        &self,
        filter: &BoosterQueryFilter,
        window: PageWindow,
    ) -> Result<(Vec<Booster>, i64), BoosterError>;

    /// Applies a partial update. Returns `None` if the booster does not exist.
    async fn update_booster(&self, id: i64, update: BoosterUpdate) -> Result<Option<Booster>, BoosterError>;

    async fn set_booster_availability(&self, id: i64, available: bool) -> Result<Option<Booster>, BoosterError>;

    async fn set_booster_verified(&self, id: i64, verified: bool) -> Result<Option<Booster>, BoosterError>;

    /// Deletes a booster profile. Returns `false` if it did not exist. Profiles that orders refer to cannot be deleted.
    async fn delete_booster(&self, id: i64) -> Result<bool, BoosterError>;

    /// Aggregated statistics over every order assigned to any of the user's booster profiles.
    async fn fetch_booster_dashboard(&self, user_id: &UserId) -> Result<BoosterDashboardStats, BoosterError>;
}
