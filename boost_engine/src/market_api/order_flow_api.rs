use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{
        Actor,
        NewOrder,
        NewProgressEntry,
        NewReview,
        Order,
        OrderDetails,
        OrderStatusType,
        Review,
        UserId,
    },
    events::{
        EventProducers,
        OrderAcceptedEvent,
        OrderCancelledEvent,
        OrderCreatedEvent,
        OrderStatusChangedEvent,
    },
    market_api::{
        catalog_api::{active_game, rank_in_game},
        order_objects::{OrderQueryFilter, OrderScope, OrderStats, StatusUpdate, DEFAULT_ORDER_PAGE_SIZE},
        pagination::{Paginated, Pagination},
    },
    pricing::{PriceCalculation, PricingPolicy, QuoteRequest},
    traits::{CatalogError, MarketplaceDatabase, OrderFlowError},
};

/// `OrderFlowApi` is the primary API for the order lifecycle: pricing and placing orders, matching them with boosters,
/// and tracking them through to completion.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
    pricing: PricingPolicy,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi ({:?})", self.pricing)
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers, pricing: PricingPolicy::default() }
    }

    pub fn with_pricing(mut self, pricing: PricingPolicy) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }

    pub fn pricing(&self) -> &PricingPolicy {
        &self.pricing
    }

    /// Prices an order without placing it.
    pub fn quote(&self, request: QuoteRequest) -> PriceCalculation {
        self.pricing.quote(request)
    }
}

impl<B> OrderFlowApi<B>
where B: MarketplaceDatabase
{
    /// Places a new order on behalf of `user_id`. The price is always computed here, never taken from the client.
    ///
    /// The game must be active, the service type must exist, and any ranks given must belong to the game.
    pub async fn create_order(&self, user_id: &UserId, order: NewOrder) -> Result<Order, OrderFlowError> {
        if order.server_region.trim().is_empty() {
            return Err(OrderFlowError::InvalidOrder("a server region is required".into()));
        }
        let game = active_game(&self.db, order.game_id).await?;
        let service = self
            .db
            .fetch_service_type_by_id(order.service_type_id)
            .await?
            .filter(|s| s.is_active)
            .ok_or(CatalogError::ServiceTypeNotFound(order.service_type_id))?;
        for rank_id in [order.current_rank_id, order.target_rank_id].into_iter().flatten() {
            rank_in_game(&self.db, rank_id, game.id).await?;
        }
        let price = self.pricing.quote_order(&order);
        let order = self.db.insert_order(user_id, order, price).await?;
        info!("🔄️📦️ {user_id} ordered '{}' for {} (order #{}, {})", service.name, game.name, order.id, order.total_price);
        self.call_order_created_hook(&order).await;
        Ok(order)
    }

    /// The orders placed by `user_id`, newest first.
    pub async fn my_orders(&self, user_id: &UserId, filter: &OrderQueryFilter) -> Result<Vec<Order>, OrderFlowError> {
        self.db.fetch_orders(&OrderScope::Requester(user_id.clone()), filter).await
    }

    /// The orders assigned to any of the user's booster profiles, newest first. Users without a booster profile
    /// simply get an empty list.
    pub async fn booster_orders(
        &self,
        user_id: &UserId,
        filter: &OrderQueryFilter,
    ) -> Result<Vec<Order>, OrderFlowError> {
        if self.db.fetch_boosters_for_user(user_id).await?.is_empty() {
            trace!("🔄️📦️ {user_id} has no booster profiles, so no booster orders");
            return Ok(Vec::new());
        }
        self.db.fetch_orders(&OrderScope::BoosterUser(user_id.clone()), filter).await
    }

    /// Every order in the marketplace, one page at a time.
    pub async fn orders_page(
        &self,
        filter: &OrderQueryFilter,
        pagination: Pagination,
    ) -> Result<Paginated<Order>, OrderFlowError> {
        let window = pagination.resolve(DEFAULT_ORDER_PAGE_SIZE)?;
        let (orders, total) = self.db.fetch_orders_page(&OrderScope::All, filter, window).await?;
        Ok(window.with_total(orders, total))
    }

    pub async fn order_stats(&self) -> Result<OrderStats, OrderFlowError> {
        self.db.fetch_order_stats().await
    }

    /// The order with its timeline, payments and reviews, if the actor is allowed to see it.
    pub async fn order_details(&self, actor: &Actor, order_id: i64) -> Result<Option<OrderDetails>, OrderFlowError> {
        let details = match self.db.fetch_order_details(order_id).await? {
            Some(d) => d,
            None => return Ok(None),
        };
        if !actor.is_admin && !self.is_participant(&actor.user_id, &details.order).await? {
            return Err(OrderFlowError::Forbidden(format!("{} is not a party to order #{order_id}", actor.user_id)));
        }
        Ok(Some(details))
    }

    /// Assigns the order to the user's booster profile for the order's game.
    ///
    /// The order must still be pending, the user must hold a *verified* booster profile for the game, and a user
    /// cannot accept their own order. If two boosters race for the same order, exactly one wins; the other receives
    /// [`OrderFlowError::OrderNotPending`].
    pub async fn accept_order(&self, user_id: &UserId, order_id: i64) -> Result<Order, OrderFlowError> {
        let order = self.db.fetch_order(order_id).await?.ok_or(OrderFlowError::OrderNotFound(order_id))?;
        if order.status != OrderStatusType::Pending {
            return Err(OrderFlowError::OrderNotPending(order_id));
        }
        if order.is_requested_by(user_id) {
            return Err(OrderFlowError::SelfAcceptance);
        }
        let booster = self
            .db
            .fetch_booster_for_user_and_game(user_id, order.game_id)
            .await?
            .ok_or(OrderFlowError::NoBoosterProfile(order.game_id))?;
        if !booster.is_verified {
            return Err(OrderFlowError::BoosterNotVerified(booster.id));
        }
        let accepted = match self.db.assign_booster(order_id, booster.id).await? {
            Some(o) => o,
            None => {
                debug!("🔄️🤝️ Order #{order_id} was taken before booster #{} could accept it", booster.id);
                return Err(OrderFlowError::OrderNotPending(order_id));
            },
        };
        info!("🔄️🤝️ Order #{order_id} accepted by booster #{} ({user_id})", booster.id);
        for emitter in &self.producers.order_accepted_producer {
            emitter.publish_event(OrderAcceptedEvent::new(accepted.clone(), booster.id)).await;
        }
        Ok(accepted)
    }

    /// Moves an order along its lifecycle.
    ///
    /// Only the requester and the assigned booster may change an order's status; administrators may additionally
    /// resolve disputed orders. Acceptance and cancellation have their own methods.
    pub async fn update_status(
        &self,
        actor: &Actor,
        order_id: i64,
        update: StatusUpdate,
    ) -> Result<Order, OrderFlowError> {
        let order = self.db.fetch_order(order_id).await?.ok_or(OrderFlowError::OrderNotFound(order_id))?;
        let from = order.status;
        let to = update.status;
        let participant = self.is_participant(&actor.user_id, &order).await?;
        let resolving_dispute = actor.is_admin && from == OrderStatusType::Disputed;
        if !participant && !resolving_dispute {
            warn!("🔄️🔀️ {} tried to move order #{order_id} from {from} to {to}", actor.user_id);
            return Err(OrderFlowError::Forbidden(format!("{} is not a party to order #{order_id}", actor.user_id)));
        }
        if !from.can_transition_to(to) {
            return Err(OrderFlowError::InvalidTransition { from, to });
        }
        let entry = update.wants_progress_entry().then(|| {
            let mut entry = NewProgressEntry::new(order_id, to, actor.user_id.clone())
                .with_message(update.message.clone())
                .with_screenshot(update.screenshot_url.clone());
            if let Some(pct) = update.progress_percentage {
                entry = entry.with_percentage(pct);
            }
            entry
        });
        let updated = self
            .db
            .transition_order(order_id, from, to, entry)
            .await?
            .ok_or(OrderFlowError::ConcurrentModification(order_id))?;
        info!("🔄️🔀️ Order #{order_id} moved from {from} to {to} by {}", actor.user_id);
        for emitter in &self.producers.order_status_changed_producer {
            emitter.publish_event(OrderStatusChangedEvent::new(from, updated.clone())).await;
        }
        Ok(updated)
    }

    /// Withdraws an order. Only the requester may cancel, and only while the order is pending or accepted.
    pub async fn cancel_order(
        &self,
        user_id: &UserId,
        order_id: i64,
        reason: Option<String>,
    ) -> Result<Order, OrderFlowError> {
        let order = self.db.fetch_order(order_id).await?.ok_or(OrderFlowError::OrderNotFound(order_id))?;
        if !order.is_requested_by(user_id) {
            return Err(OrderFlowError::Forbidden(format!("only the requester may cancel order #{order_id}")));
        }
        if !order.status.is_cancellable() {
            return Err(OrderFlowError::CannotCancel { id: order_id, status: order.status });
        }
        let entry = reason.as_ref().map(|r| {
            NewProgressEntry::new(order_id, OrderStatusType::Cancelled, user_id.clone()).with_message(Some(r.clone()))
        });
        let cancelled = match self.db.cancel_order(order_id, user_id, entry).await? {
            Some(o) => o,
            None => {
                // The order changed under us. Report the state it is in now.
                let current = self.db.fetch_order(order_id).await?.ok_or(OrderFlowError::OrderNotFound(order_id))?;
                return Err(OrderFlowError::CannotCancel { id: order_id, status: current.status });
            },
        };
        info!("🔄️❌️ Order #{order_id} cancelled by {user_id}");
        for emitter in &self.producers.order_cancelled_producer {
            emitter.publish_event(OrderCancelledEvent::new(cancelled.clone(), reason.clone())).await;
        }
        Ok(cancelled)
    }

    /// Leaves a review of a completed order. Only the requester may review, and only once.
    pub async fn review_order(
        &self,
        user_id: &UserId,
        order_id: i64,
        review: NewReview,
    ) -> Result<Review, OrderFlowError> {
        if !(1..=5).contains(&review.rating) {
            return Err(OrderFlowError::InvalidReview(format!("rating must be between 1 and 5, not {}", review.rating)));
        }
        let order = self.db.fetch_order(order_id).await?.ok_or(OrderFlowError::OrderNotFound(order_id))?;
        if !order.is_requested_by(user_id) {
            return Err(OrderFlowError::Forbidden(format!("only the requester may review order #{order_id}")));
        }
        if order.status != OrderStatusType::Completed {
            return Err(OrderFlowError::InvalidReview(format!("order #{order_id} is {}, not completed", order.status)));
        }
        let review = self.db.insert_review(&order, review).await?;
        debug!("🔄️⭐️ Order #{order_id} reviewed by {user_id}");
        Ok(review)
    }

    /// True if the user placed the order or owns the booster profile it is assigned to.
    async fn is_participant(&self, user_id: &UserId, order: &Order) -> Result<bool, OrderFlowError> {
        if order.is_requested_by(user_id) {
            return Ok(true);
        }
        let booster = match order.booster_id {
            Some(id) => self.db.fetch_booster_by_id(id).await?,
            None => None,
        };
        Ok(booster.map(|b| &b.user_id == user_id).unwrap_or(false))
    }

    async fn call_order_created_hook(&self, order: &Order) {
        for emitter in &self.producers.order_created_producer {
            debug!("🔄️📦️ Notifying order created hook subscribers");
            emitter.publish_event(OrderCreatedEvent::new(order.clone())).await;
        }
    }
}
