use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Game, GameRank, ServiceType},
    market_api::{
        catalog_objects::{
            GameQueryFilter,
            GameWithRanks,
            PopularGame,
            RankDifference,
            DEFAULT_GAME_PAGE_SIZE,
            DEFAULT_POPULAR_GAMES,
        },
        pagination::{Paginated, Pagination, MAX_PAGE_SIZE},
    },
    traits::{CatalogError, CatalogManagement},
};

pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// `CatalogApi` provides read access to the games, rank ladders and service types on offer.
pub struct CatalogApi<B> {
    db: B,
}

impl<B> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi")
    }
}

impl<B> CatalogApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub async fn games(&self, filter: &GameQueryFilter) -> Result<Vec<Game>, CatalogError> {
        self.db.fetch_games(filter).await
    }

    pub async fn games_page(
        &self,
        filter: &GameQueryFilter,
        pagination: Pagination,
    ) -> Result<Paginated<Game>, CatalogError> {
        let window = pagination.resolve(DEFAULT_GAME_PAGE_SIZE)?;
        let (games, total) = self.db.fetch_games_page(filter, window).await?;
        trace!("🎮️ Page {} of games: {} of {total}", window.page, games.len());
        Ok(window.with_total(games, total))
    }

    pub async fn game_by_id(&self, id: i64) -> Result<Option<Game>, CatalogError> {
        self.db.fetch_game_by_id(id).await
    }

    pub async fn game_by_slug(&self, slug: &str) -> Result<Option<Game>, CatalogError> {
        self.db.fetch_game_by_slug(slug).await
    }

    /// The game's ranks from lowest to highest. Fails if the game does not exist.
    pub async fn rank_hierarchy(&self, game_id: i64) -> Result<Vec<GameRank>, CatalogError> {
        if self.db.fetch_game_by_id(game_id).await?.is_none() {
            return Err(CatalogError::GameNotFound(game_id));
        }
        self.db.fetch_ranks_for_game(game_id).await
    }

    pub async fn rank_by_id(&self, id: i64) -> Result<Option<GameRank>, CatalogError> {
        self.db.fetch_rank_by_id(id).await
    }

    pub async fn game_with_ranks(&self, slug: &str) -> Result<Option<GameWithRanks>, CatalogError> {
        let game = match self.db.fetch_game_by_slug(slug).await? {
            Some(g) => g,
            None => return Ok(None),
        };
        let ranks = self.db.fetch_ranks_for_game(game.id).await?;
        Ok(Some(GameWithRanks { game, ranks }))
    }

    pub async fn popular_games(&self, limit: Option<u32>) -> Result<Vec<PopularGame>, CatalogError> {
        let limit = limit.unwrap_or(DEFAULT_POPULAR_GAMES).clamp(1, MAX_PAGE_SIZE);
        self.db.fetch_popular_games(limit).await
    }

    /// Active games whose name contains `term`, ignoring case. A blank term matches nothing.
    pub async fn search_games(&self, term: &str, limit: Option<u32>) -> Result<Vec<Game>, CatalogError> {
        let filter = GameQueryFilter::default().matching(term);
        if filter.search_term().is_none() {
            return Ok(Vec::new());
        }
        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT).clamp(1, MAX_PAGE_SIZE) as usize;
        let mut games = self.db.fetch_games(&filter).await?;
        games.truncate(limit);
        Ok(games)
    }

    pub async fn available_platforms(&self) -> Result<Vec<String>, CatalogError> {
        self.db.fetch_platforms().await
    }

    pub async fn games_by_platform(&self, platform: &str) -> Result<Vec<Game>, CatalogError> {
        let filter = GameQueryFilter::default().on_platforms([platform]);
        self.db.fetch_games(&filter).await
    }

    pub async fn service_types(&self) -> Result<Vec<ServiceType>, CatalogError> {
        self.db.fetch_service_types().await
    }

    /// How many ladder steps (and tiers) separate two ranks of the same game.
    pub async fn rank_difference(
        &self,
        game_id: i64,
        from_rank_id: i64,
        to_rank_id: i64,
    ) -> Result<RankDifference, CatalogError> {
        let ladder = self.rank_hierarchy(game_id).await?;
        let position = |rank_id: i64| ladder.iter().enumerate().find(|(_, r)| r.id == rank_id);
        let ((from_pos, from), (to_pos, to)) = match (position(from_rank_id), position(to_rank_id)) {
            (Some(a), Some(b)) => (a, b),
            (None, _) => return Err(self.missing_rank_error(from_rank_id, game_id).await),
            (_, None) => return Err(self.missing_rank_error(to_rank_id, game_id).await),
        };
        #[allow(clippy::cast_possible_wrap)]
        let steps = to_pos as i64 - from_pos as i64;
        Ok(RankDifference { from_rank_id, to_rank_id, steps, tier_difference: to.tier - from.tier })
    }

    async fn missing_rank_error(&self, rank_id: i64, game_id: i64) -> CatalogError {
        match self.check_rank_in_game(rank_id, game_id).await {
            Err(e) => e,
            // the rank belongs to the game but has been retired from the ladder
            Ok(_) => CatalogError::RankNotFound(rank_id),
        }
    }

    pub async fn check_rank_in_game(&self, rank_id: i64, game_id: i64) -> Result<GameRank, CatalogError> {
        rank_in_game(&self.db, rank_id, game_id).await
    }
}

/// Checks that the rank exists and belongs to the game.
pub(crate) async fn rank_in_game<B: CatalogManagement>(
    db: &B,
    rank_id: i64,
    game_id: i64,
) -> Result<GameRank, CatalogError> {
    let rank = db.fetch_rank_by_id(rank_id).await?.ok_or(CatalogError::RankNotFound(rank_id))?;
    if rank.game_id != game_id {
        return Err(CatalogError::RankGameMismatch { rank_id, game_id });
    }
    Ok(rank)
}

/// Fetches the game, failing unless it exists and is open for business.
pub(crate) async fn active_game<B: CatalogManagement>(db: &B, game_id: i64) -> Result<Game, CatalogError> {
    let game = db.fetch_game_by_id(game_id).await?.ok_or(CatalogError::GameNotFound(game_id))?;
    if !game.is_active {
        return Err(CatalogError::GameInactive(game_id));
    }
    Ok(game)
}
