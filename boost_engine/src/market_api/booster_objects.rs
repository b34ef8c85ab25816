use bm_common::{helpers::comma_separated, Money};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BOOSTER_PAGE_SIZE: u32 = 12;
pub const DEFAULT_TOP_BOOSTERS: u32 = 10;

/// Optional narrowing of a booster listing. Region and language lists match on overlap: a booster qualifies when it
/// serves at least one of the requested regions (or speaks one of the requested languages).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoosterQueryFilter {
    pub game_id: Option<i64>,
    #[serde(default, deserialize_with = "comma_separated")]
    pub server_regions: Option<Vec<String>>,
    pub min_rating: Option<f64>,
    pub is_available: Option<bool>,
    #[serde(default, deserialize_with = "comma_separated")]
    pub languages: Option<Vec<String>>,
    /// Set internally by listings that only show verified boosters
    #[serde(skip)]
    pub is_verified: Option<bool>,
    /// Set internally by the username search
    #[serde(skip)]
    pub username: Option<String>,
}

impl BoosterQueryFilter {
    pub fn for_game(mut self, game_id: i64) -> Self {
        self.game_id = Some(game_id);
        self
    }

    pub fn in_regions<S: Into<String>>(mut self, regions: impl IntoIterator<Item = S>) -> Self {
        self.server_regions = Some(regions.into_iter().map(Into::into).collect());
        self
    }

    pub fn speaking<S: Into<String>>(mut self, languages: impl IntoIterator<Item = S>) -> Self {
        self.languages = Some(languages.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_min_rating(mut self, rating: f64) -> Self {
        self.min_rating = Some(rating);
        self
    }

    pub fn available(mut self, available: bool) -> Self {
        self.is_available = Some(available);
        self
    }

    pub fn verified(mut self, verified: bool) -> Self {
        self.is_verified = Some(verified);
        self
    }

    pub fn regions(&self) -> &[String] {
        self.server_regions.as_deref().unwrap_or_default()
    }

    pub fn language_list(&self) -> &[String] {
        self.languages.as_deref().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.game_id.is_none() &&
            self.regions().is_empty() &&
            self.min_rating.is_none() &&
            self.is_available.is_none() &&
            self.language_list().is_empty() &&
            self.is_verified.is_none() &&
            self.username.is_none()
    }
}

/// Performance summary across all of a user's booster profiles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoosterDashboardStats {
    pub total_orders: i64,
    pub completed_orders: i64,
    pub pending_orders: i64,
    pub active_orders: i64,
    /// Sum of `total_price` over completed orders
    pub total_earnings: Money,
    /// Mean review score, to 2 decimal places
    pub average_rating: f64,
    /// Completed orders as a percentage of all assigned orders, to 2 decimal places
    pub completion_rate: f64,
    /// Mean minutes between an order being placed and accepted
    pub response_time: f64,
}

pub fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityUpdate {
    pub is_available: bool,
}
