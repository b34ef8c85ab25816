use std::fmt::Display;

use bm_common::{helpers::comma_separated, Money};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db_types::{OrderPriority, OrderStatusType, UserId};

pub const DEFAULT_ORDER_PAGE_SIZE: u32 = 10;

/// Optional narrowing of an order listing. Every field that is present is ANDed into the query; absent fields and
/// empty lists are ignored.
///
/// In a query string, list fields are comma separated, e.g. `?status=pending,accepted&priority=urgent`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQueryFilter {
    #[serde(default, deserialize_with = "comma_separated")]
    pub status: Option<Vec<OrderStatusType>>,
    pub game_id: Option<i64>,
    /// Inclusive lower bound on `created_at`
    pub date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`
    pub date_to: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "comma_separated")]
    pub priority: Option<Vec<OrderPriority>>,
}

impl OrderQueryFilter {
    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.status.get_or_insert_with(Vec::new).push(status);
        self
    }

    pub fn with_priority(mut self, priority: OrderPriority) -> Self {
        self.priority.get_or_insert_with(Vec::new).push(priority);
        self
    }

    pub fn with_game_id(mut self, game_id: i64) -> Self {
        self.game_id = Some(game_id);
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.date_from = Some(since);
        self
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.date_to = Some(until);
        self
    }

    pub fn statuses(&self) -> &[OrderStatusType] {
        self.status.as_deref().unwrap_or_default()
    }

    pub fn priorities(&self) -> &[OrderPriority] {
        self.priority.as_deref().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses().is_empty() &&
            self.priorities().is_empty() &&
            self.game_id.is_none() &&
            self.date_from.is_none() &&
            self.date_to.is_none()
    }
}

impl Display for OrderQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "No filters.");
        }
        if !self.statuses().is_empty() {
            let statuses = self.statuses().iter().map(|s| s.to_string()).collect::<Vec<String>>().join(",");
            write!(f, "status in [{statuses}]. ")?;
        }
        if let Some(game_id) = self.game_id {
            write!(f, "game_id: {game_id}. ")?;
        }
        if let Some(since) = &self.date_from {
            write!(f, "since {since}. ")?;
        }
        if let Some(until) = &self.date_to {
            write!(f, "until {until}. ")?;
        }
        if !self.priorities().is_empty() {
            let p = self.priorities().iter().map(|s| s.to_string()).collect::<Vec<String>>().join(",");
            write!(f, "priority in [{p}]. ")?;
        }
        Ok(())
    }
}

/// Whose orders a listing covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderScope {
    All,
    /// Orders placed by this user
    Requester(UserId),
    /// Orders assigned to any of this user's booster profiles
    BoosterUser(UserId),
}

/// A status change requested through the generic status update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusUpdate {
    pub status: OrderStatusType,
    pub message: Option<String>,
    pub progress_percentage: Option<i64>,
    pub screenshot_url: Option<String>,
}

impl StatusUpdate {
    pub fn new(status: OrderStatusType) -> Self {
        Self { status, message: None, progress_percentage: None, screenshot_url: None }
    }

    pub fn with_message<S: Into<String>>(mut self, message: S) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_progress(mut self, percentage: i64) -> Self {
        self.progress_percentage = Some(percentage);
        self
    }

    /// A timeline entry is only recorded when the caller had something to say about the change.
    pub fn wants_progress_entry(&self) -> bool {
        self.message.is_some() || self.progress_percentage.is_some() || self.screenshot_url.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

/// Marketplace-wide order totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderStats {
    pub total_orders: i64,
    pub pending_orders: i64,
    pub accepted_orders: i64,
    pub in_progress_orders: i64,
    pub completed_orders: i64,
    pub cancelled_orders: i64,
    pub disputed_orders: i64,
    /// Sum of `total_price` over completed orders
    pub total_revenue: Money,
}

/// Order totals for a single customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PlayerDashboardStats {
    pub total_orders: i64,
    pub pending_orders: i64,
    pub active_orders: i64,
    pub completed_orders: i64,
    pub cancelled_orders: i64,
    /// Sum of `total_price` over completed orders
    pub total_spent: Money,
}
