use std::fmt::Display;

use boost_engine::{db_types::OrderPriority, pricing::QuoteRequest};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }
}

/// The body of a price quote request. Supplying both ranks prices the order as a rank-to-rank boost.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteParams {
    pub current_rank_id: Option<i64>,
    pub target_rank_id: Option<i64>,
    #[serde(default)]
    pub priority: OrderPriority,
}

impl From<QuoteParams> for QuoteRequest {
    fn from(params: QuoteParams) -> Self {
        let rank_boost = params.current_rank_id.is_some() && params.target_rank_id.is_some();
        QuoteRequest { rank_boost, priority: params.priority }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LimitParams {
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoosterSearchParams {
    #[serde(default)]
    pub q: String,
    pub game_id: Option<i64>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RankDifferenceParams {
    pub from: i64,
    pub to: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub verified: bool,
}
