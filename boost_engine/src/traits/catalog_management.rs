use thiserror::Error;

use crate::{
    db_types::{Game, GameRank, NewGame, NewGameRank, NewServiceType, ServiceType},
    market_api::{
        catalog_objects::{GameQueryFilter, PopularGame},
        pagination::{PageWindow, PaginationError},
    },
};

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Game {0} does not exist")]
    GameNotFound(i64),
    #[error("Game {0} is not currently available")]
    GameInactive(i64),
    #[error("Rank {0} does not exist")]
    RankNotFound(i64),
    #[error("Rank {rank_id} does not belong to game {game_id}")]
    RankGameMismatch { rank_id: i64, game_id: i64 },
    #[error("Service type {0} does not exist")]
    ServiceTypeNotFound(i64),
    #[error("The slug '{0}' is already in use")]
    SlugAlreadyExists(String),
    #[error("{0}")]
    InvalidPagination(#[from] PaginationError),
}

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        CatalogError::DatabaseError(e.to_string())
    }
}

/// The `CatalogManagement` trait defines read access to the games, rank ladders and service types on offer, plus the
/// operations used to seed them.
///
/// Listings only ever include active games. Games are ordered by name, ranks by tier and then by `min_mmr`.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    async fn fetch_games(&self, filter: &GameQueryFilter) -> Result<Vec<Game>, CatalogError>;

    /// Returns one page of the filtered game listing, along with the total number of matching games.
    async fn fetch_games_page(
        &self,
        filter: &GameQueryFilter,
        window: PageWindow,
    ) -> Result<(Vec<Game>, i64), CatalogError>;

    /// Fetches a game by id, whether or not it is active.
    async fn fetch_game_by_id(&self, id: i64) -> Result<Option<Game>, CatalogError>;

    /// Fetches an active game by its slug.
    async fn fetch_game_by_slug(&self, slug: &str) -> Result<Option<Game>, CatalogError>;

    /// The active ranks of a game, lowest first.
    async fn fetch_ranks_for_game(&self, game_id: i64) -> Result<Vec<GameRank>, CatalogError>;

    async fn fetch_rank_by_id(&self, id: i64) -> Result<Option<GameRank>, CatalogError>;

    /// Active games ordered by how many orders have been placed for them, most popular first.
    async fn fetch_popular_games(&self, limit: u32) -> Result<Vec<PopularGame>, CatalogError>;

    /// Every platform any active game is offered on, sorted and without duplicates.
    async fn fetch_platforms(&self) -> Result<Vec<String>, CatalogError>;

    async fn fetch_service_types(&self) -> Result<Vec<ServiceType>, CatalogError>;

    async fn fetch_service_type_by_id(&self, id: i64) -> Result<Option<ServiceType>, CatalogError>;

    async fn insert_game(&self, game: NewGame) -> Result<Game, CatalogError>;

    async fn insert_rank(&self, rank: NewGameRank) -> Result<GameRank, CatalogError>;

    async fn insert_service_type(&self, service: NewServiceType) -> Result<ServiceType, CatalogError>;
}
