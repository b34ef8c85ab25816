use bm_common::helpers::comma_separated;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db_types::{Game, GameRank};

pub const DEFAULT_GAME_PAGE_SIZE: u32 = 12;
pub const DEFAULT_POPULAR_GAMES: u32 = 6;

/// Optional narrowing of a game listing. Only active games are ever listed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameQueryFilter {
    /// Games available on at least one of these platforms
    #[serde(default, deserialize_with = "comma_separated")]
    pub platforms: Option<Vec<String>>,
    /// Case-insensitive substring match on the game name
    pub search: Option<String>,
}

impl GameQueryFilter {
    pub fn on_platforms<S: Into<String>>(mut self, platforms: impl IntoIterator<Item = S>) -> Self {
        self.platforms = Some(platforms.into_iter().map(Into::into).collect());
        self
    }

    pub fn matching<S: Into<String>>(mut self, search: S) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn platform_list(&self) -> &[String] {
        self.platforms.as_deref().unwrap_or_default()
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.platform_list().is_empty() && self.search_term().is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameWithRanks {
    #[serde(flatten)]
    pub game: Game,
    pub ranks: Vec<GameRank>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct PopularGame {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub game: Game,
    pub order_count: i64,
}

/// How far apart two ranks of the same game are on the ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankDifference {
    pub from_rank_id: i64,
    pub to_rank_id: i64,
    /// Number of ladder steps from one rank to the other. Negative when `to` is below `from`.
    pub steps: i64,
    pub tier_difference: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankPair {
    pub from: i64,
    pub to: i64,
}
