use std::{fmt::Display, str::FromStr};

pub use bm_common::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(String);

//--------------------------------------        UserId         ---------------------------------------------------------
/// The subject identifier assigned to a user by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct UserId(pub String);

impl FromStr for UserId {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ConversionError("User id cannot be empty".to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------         Role          ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Player,
    Booster,
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Player => write!(f, "player"),
            Role::Booster => write!(f, "booster"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "player" => Ok(Self::Player),
            "booster" => Ok(Self::Booster),
            "admin" => Ok(Self::Admin),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

/// The authenticated user on whose behalf an API call is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub is_admin: bool,
}

impl Actor {
    pub fn user(user_id: UserId) -> Self {
        Self { user_id, is_admin: false }
    }

    pub fn admin(user_id: UserId) -> Self {
        Self { user_id, is_admin: true }
    }
}

//--------------------------------------     UserProfile       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub country: Option<String>,
    pub timezone: String,
    pub role: Role,
    pub is_verified: bool,
    pub total_orders: i64,
    pub total_spent: Money,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile fields a user may change about themselves. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserProfile {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub country: Option<String>,
    pub timezone: Option<String>,
}

impl UpdateUserProfile {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() &&
            self.full_name.is_none() &&
            self.avatar_url.is_none() &&
            self.country.is_none() &&
            self.timezone.is_none()
    }
}

//--------------------------------------         Game          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Game {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub banner_url: Option<String>,
    pub platforms: Json<Vec<String>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGame {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub banner_url: Option<String>,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl NewGame {
    pub fn new<S: Into<String>>(name: S, slug: S) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            description: None,
            icon_url: None,
            banner_url: None,
            platforms: Vec::new(),
            is_active: true,
        }
    }

    pub fn with_platforms<S: Into<String>>(mut self, platforms: impl IntoIterator<Item = S>) -> Self {
        self.platforms = platforms.into_iter().map(Into::into).collect();
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

//--------------------------------------       GameRank        ---------------------------------------------------------
/// A rank within a game's ladder. Ranks are ordered by `tier`, then by `min_mmr`.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct GameRank {
    pub id: i64,
    pub game_id: i64,
    pub name: String,
    pub tier: i64,
    pub division: Option<String>,
    pub division_name: Option<String>,
    pub min_mmr: Option<i64>,
    pub max_mmr: Option<i64>,
    pub icon_url: Option<String>,
    pub color_hex: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGameRank {
    pub game_id: i64,
    pub name: String,
    pub tier: i64,
    pub division: Option<String>,
    pub division_name: Option<String>,
    pub min_mmr: Option<i64>,
    pub max_mmr: Option<i64>,
    pub icon_url: Option<String>,
    pub color_hex: Option<String>,
}

impl NewGameRank {
    pub fn new<S: Into<String>>(game_id: i64, name: S, tier: i64) -> Self {
        Self {
            game_id,
            name: name.into(),
            tier,
            division: None,
            division_name: None,
            min_mmr: None,
            max_mmr: None,
            icon_url: None,
            color_hex: None,
        }
    }

    pub fn with_mmr(mut self, min: i64, max: i64) -> Self {
        self.min_mmr = Some(min);
        self.max_mmr = Some(max);
        self
    }

    pub fn with_division<S: Into<String>>(mut self, division: S) -> Self {
        self.division = Some(division.into());
        self
    }
}

//--------------------------------------      ServiceType      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct ServiceType {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewServiceType {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}

impl NewServiceType {
    pub fn new<S: Into<String>>(name: S, slug: S) -> Self {
        Self { name: name.into(), slug: slug.into(), description: None, icon: None }
    }
}

//--------------------------------------        Booster        ---------------------------------------------------------
/// A user's service profile for a single game. A user has at most one profile per game.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Booster {
    pub id: i64,
    pub user_id: UserId,
    pub game_id: i64,
    pub current_rank_id: Option<i64>,
    pub peak_rank_id: Option<i64>,
    pub server_regions: Json<Vec<String>>,
    pub hourly_rate: Money,
    pub total_orders: i64,
    pub completed_orders: i64,
    pub rating: f64,
    pub is_verified: bool,
    pub is_available: bool,
    pub bio: Option<String>,
    pub experience_years: i64,
    pub languages: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewBoosterProfile {
    pub game_id: i64,
    pub current_rank_id: Option<i64>,
    pub peak_rank_id: Option<i64>,
    #[serde(default)]
    pub server_regions: Vec<String>,
    pub hourly_rate: Money,
    pub bio: Option<String>,
    #[serde(default)]
    pub experience_years: i64,
    #[serde(default)]
    pub languages: Vec<String>,
}

impl NewBoosterProfile {
    pub fn new(game_id: i64, hourly_rate: Money) -> Self {
        Self {
            game_id,
            current_rank_id: None,
            peak_rank_id: None,
            server_regions: Vec::new(),
            hourly_rate,
            bio: None,
            experience_years: 0,
            languages: Vec::new(),
        }
    }

    pub fn with_regions<S: Into<String>>(mut self, regions: impl IntoIterator<Item = S>) -> Self {
        self.server_regions = regions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_languages<S: Into<String>>(mut self, languages: impl IntoIterator<Item = S>) -> Self {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }
}

/// Partial update of a booster profile. The game a profile belongs to cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoosterUpdate {
    pub current_rank_id: Option<i64>,
    pub peak_rank_id: Option<i64>,
    pub server_regions: Option<Vec<String>>,
    pub hourly_rate: Option<Money>,
    pub bio: Option<String>,
    pub experience_years: Option<i64>,
    pub languages: Option<Vec<String>>,
}

impl BoosterUpdate {
    pub fn is_empty(&self) -> bool {
        self.current_rank_id.is_none() &&
            self.peak_rank_id.is_none() &&
            self.server_regions.is_none() &&
            self.hourly_rate.is_none() &&
            self.bio.is_none() &&
            self.experience_years.is_none() &&
            self.languages.is_none()
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatusType {
    /// The order has been placed and is waiting for a booster.
    Pending,
    /// A booster has taken the order but has not started yet.
    Accepted,
    /// The booster is working on the order.
    InProgress,
    /// The order has been delivered.
    Completed,
    /// The order was withdrawn by the requester.
    Cancelled,
    /// One of the parties raised a dispute.
    Disputed,
}

impl OrderStatusType {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether a requester may still withdraw an order in this status.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, Self::Pending | Self::Accepted)
    }

    /// Whether the generic status update may move an order from `self` to `next`.
    ///
    /// Acceptance and cancellation have dedicated flows and are never allowed here.
    pub fn can_transition_to(&self, next: OrderStatusType) -> bool {
        use OrderStatusType::*;
        matches!(
            (self, next),
            (Accepted, InProgress) |
                (Accepted, Disputed) |
                (InProgress, Completed) |
                (InProgress, Disputed) |
                (Disputed, InProgress) |
                (Disputed, Completed)
        )
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "pending"),
            OrderStatusType::Accepted => write!(f, "accepted"),
            OrderStatusType::InProgress => write!(f, "in_progress"),
            OrderStatusType::Completed => write!(f, "completed"),
            OrderStatusType::Cancelled => write!(f, "cancelled"),
            OrderStatusType::Disputed => write!(f, "disputed"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "disputed" => Ok(Self::Disputed),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------     OrderPriority     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderPriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl Display for OrderPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderPriority::Low => write!(f, "low"),
            OrderPriority::Normal => write!(f, "normal"),
            OrderPriority::High => write!(f, "high"),
            OrderPriority::Urgent => write!(f, "urgent"),
        }
    }
}

impl FromStr for OrderPriority {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            s => Err(ConversionError(format!("Invalid order priority: {s}"))),
        }
    }
}

//--------------------------------------        Order          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: UserId,
    pub booster_id: Option<i64>,
    pub game_id: i64,
    pub service_type_id: i64,
    pub current_rank_id: Option<i64>,
    pub target_rank_id: Option<i64>,
    pub server_region: String,
    pub additional_info: Option<String>,
    pub base_price: Money,
    pub platform_fee: Money,
    pub total_price: Money,
    pub status: OrderStatusType,
    pub priority: OrderPriority,
    pub estimated_days: Option<i64>,
    pub actual_days: Option<i64>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// True if `user` placed the order.
    pub fn is_requested_by(&self, user: &UserId) -> bool {
        &self.user_id == user
    }
}

//--------------------------------------        NewOrder       ---------------------------------------------------------
/// An order request as submitted by a customer. Prices are always computed server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewOrder {
    pub game_id: i64,
    pub service_type_id: i64,
    pub current_rank_id: Option<i64>,
    pub target_rank_id: Option<i64>,
    pub server_region: String,
    pub additional_info: Option<String>,
    #[serde(default)]
    pub priority: OrderPriority,
}

impl NewOrder {
    pub fn new<S: Into<String>>(game_id: i64, service_type_id: i64, server_region: S) -> Self {
        Self {
            game_id,
            service_type_id,
            current_rank_id: None,
            target_rank_id: None,
            server_region: server_region.into(),
            additional_info: None,
            priority: OrderPriority::Normal,
        }
    }

    pub fn with_ranks(mut self, current_rank_id: i64, target_rank_id: i64) -> Self {
        self.current_rank_id = Some(current_rank_id);
        self.target_rank_id = Some(target_rank_id);
        self
    }

    pub fn with_priority(mut self, priority: OrderPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_info<S: Into<String>>(mut self, info: S) -> Self {
        self.additional_info = Some(info.into());
        self
    }

    /// An order is priced as a rank-to-rank boost only when both ends of the climb are given.
    pub fn is_rank_boost(&self) -> bool {
        self.current_rank_id.is_some() && self.target_rank_id.is_some()
    }
}

//--------------------------------------     OrderProgress     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderProgress {
    pub id: i64,
    pub order_id: i64,
    pub status: String,
    pub message: Option<String>,
    pub screenshot_url: Option<String>,
    pub progress_percentage: i64,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProgressEntry {
    pub order_id: i64,
    pub status: String,
    pub message: Option<String>,
    pub screenshot_url: Option<String>,
    pub progress_percentage: i64,
    pub created_by: Option<UserId>,
}

impl NewProgressEntry {
    pub fn new(order_id: i64, status: OrderStatusType, created_by: UserId) -> Self {
        let progress_percentage = if status == OrderStatusType::Completed { 100 } else { 0 };
        Self {
            order_id,
            status: status.to_string(),
            message: None,
            screenshot_url: None,
            progress_percentage,
            created_by: Some(created_by),
        }
    }

    pub fn with_message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }

    pub fn with_percentage(mut self, percentage: i64) -> Self {
        self.progress_percentage = percentage.clamp(0, 100);
        self
    }

    pub fn with_screenshot(mut self, url: Option<String>) -> Self {
        self.screenshot_url = url;
        self
    }
}

//--------------------------------------        Payment        ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Completed => write!(f, "completed"),
            PaymentStatus::Failed => write!(f, "failed"),
            PaymentStatus::Refunded => write!(f, "refunded"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub order_id: i64,
    pub user_id: UserId,
    pub amount: Money,
    pub currency: String,
    pub status: PaymentStatus,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    pub refund_amount: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------        Review         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub order_id: i64,
    pub user_id: UserId,
    pub booster_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewReview {
    pub rating: i64,
    pub comment: Option<String>,
    #[serde(default = "default_true")]
    pub is_public: bool,
}

impl NewReview {
    pub fn new(rating: i64) -> Self {
        Self { rating, comment: None, is_public: true }
    }

    pub fn with_comment<S: Into<String>>(mut self, comment: S) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

//--------------------------------------     OrderDetails      ---------------------------------------------------------
/// An order together with everything hanging off it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub progress: Vec<OrderProgress>,
    pub payments: Vec<Payment>,
    pub reviews: Vec<Review>,
}
