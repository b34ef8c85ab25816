use thiserror::Error;

use crate::{
    db_types::{NewOrder, NewProgressEntry, NewReview, Order, OrderDetails, OrderStatusType, Review, UserId},
    market_api::{
        order_objects::{OrderQueryFilter, OrderScope, OrderStats, PlayerDashboardStats},
        pagination::{PageWindow, PaginationError},
    },
    pricing::PriceCalculation,
    traits::{BoosterError, CatalogError},
};

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(i64),
    #[error("Order {0} is no longer pending")]
    OrderNotPending(i64),
    #[error("An order cannot move from {from} to {to}")]
    InvalidTransition { from: OrderStatusType, to: OrderStatusType },
    #[error("Order {id} cannot be cancelled while it is {status}")]
    CannotCancel { id: i64, status: OrderStatusType },
    #[error("Order {0} was modified by someone else. Refresh and try again")]
    ConcurrentModification(i64),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("You do not have a booster profile for game {0}")]
    NoBoosterProfile(i64),
    #[error("Booster profile {0} has not been verified yet")]
    BoosterNotVerified(i64),
    #[error("You cannot accept your own order")]
    SelfAcceptance,
    #[error("Invalid order: {0}")]
    InvalidOrder(String),
    #[error("Order {0} has already been reviewed")]
    AlreadyReviewed(i64),
    #[error("Invalid review: {0}")]
    InvalidReview(String),
    #[error("{0}")]
    InvalidPagination(#[from] PaginationError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Booster(#[from] BoosterError),
}

impl From<sqlx::Error> for OrderFlowError {
    fn from(e: sqlx::Error) -> Self {
        OrderFlowError::DatabaseError(e.to_string())
    }
}

/// The `OrderManagement` trait defines the storage side of the order lifecycle.
///
/// Every state-changing method is a *conditional* write: it only applies when the order is still in the state the
/// caller observed. A `None` result means the condition no longer held (or the order does not exist), and no change
/// was made. Business rules (who may do what) are applied by [`crate::OrderFlowApi`] before these methods are called.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Stores a new pending order for `user_id` at the given price.
    async fn insert_order(
        &self,
        user_id: &UserId,
        order: NewOrder,
        price: PriceCalculation,
    ) -> Result<Order, OrderFlowError>;

    async fn fetch_order(&self, id: i64) -> Result<Option<Order>, OrderFlowError>;

    /// The order along with its progress timeline, payments and reviews.
    async fn fetch_order_details(&self, id: i64) -> Result<Option<OrderDetails>, OrderFlowError>;

    /// All orders in scope matching the filter, newest first.
    async fn fetch_orders(&self, scope: &OrderScope, filter: &OrderQueryFilter) -> Result<Vec<Order>, OrderFlowError>;

    async fn fetch_orders_page(
        &self,
        scope: &OrderScope,
        filter: &OrderQueryFilter,
        window: PageWindow,
    ) -> Result<(Vec<Order>, i64), OrderFlowError>;

    /// Assigns the booster to the order if, and only if, the order is still pending. The booster's order counter is
    /// incremented in the same transaction.
    async fn assign_booster(&self, order_id: i64, booster_id: i64) -> Result<Option<Order>, OrderFlowError>;

    /// Moves the order from `from` to `to`, stamping lifecycle timestamps and appending the optional progress entry in
    /// the same transaction.
    async fn transition_order(
        &self,
        order_id: i64,
        from: OrderStatusType,
        to: OrderStatusType,
        progress: Option<NewProgressEntry>,
    ) -> Result<Option<Order>, OrderFlowError>;

    /// Cancels the order if it was placed by `user_id` and is still pending or accepted.
    async fn cancel_order(
        &self,
        order_id: i64,
        user_id: &UserId,
        progress: Option<NewProgressEntry>,
    ) -> Result<Option<Order>, OrderFlowError>;

    /// Records a review of a completed order and refreshes the booster's average rating.
    async fn insert_review(&self, order: &Order, review: NewReview) -> Result<Review, OrderFlowError>;

    async fn fetch_order_stats(&self) -> Result<OrderStats, OrderFlowError>;
}
