use boost_engine::{
    db_types::{Actor, Money, NewOrder, Order, OrderPriority, OrderStatusType, UserId},
    market_api::order_objects::StatusUpdate,
    OrderManagement,
};
use cucumber::{then, when};

use crate::cucumber::MarketWorld;

fn actor(user: &str) -> Actor {
    Actor::user(UserId::from(user))
}

/// Keeps the latest copy of the order on success, and the error message otherwise.
fn record<E: ToString>(world: &mut MarketWorld, label: String, result: Result<Order, E>) {
    match result {
        Ok(order) => {
            world.orders.insert(label, order);
            world.last_error = None;
        },
        Err(e) => world.last_error = Some(e.to_string()),
    }
}

#[when(expr = "{word} orders a {word} rank boost labelled {word}")]
async fn order_rank_boost(world: &mut MarketWorld, user: String, priority: String, label: String) {
    let priority = priority.parse::<OrderPriority>().expect("Not a valid priority");
    let sys = world.system();
    let catalog = &sys.catalog;
    let order = NewOrder::new(catalog.game.id, catalog.rank_boost.id, "EUW")
        .with_ranks(catalog.ranks[0].id, catalog.ranks[2].id)
        .with_priority(priority);
    let order = sys.orders.create_order(&UserId::from(user), order).await.expect("Error creating order");
    world.orders.insert(label, order);
}

#[when(expr = "{word} accepts order {word}")]
async fn accept_order(world: &mut MarketWorld, user: String, label: String) {
    let id = world.order(&label).id;
    let result = world.system().orders.accept_order(&UserId::from(user), id).await;
    record(world, label, result);
}

#[when(expr = "{word} moves order {word} to {word}")]
async fn move_order(world: &mut MarketWorld, user: String, label: String, status: String) {
    let id = world.order(&label).id;
    let status = status.parse::<OrderStatusType>().expect("Not a valid status");
    let result = world.system().orders.update_status(&actor(&user), id, StatusUpdate::new(status)).await;
    record(world, label, result);
}

#[when(expr = "{word} cancels order {word}")]
async fn cancel_order(world: &mut MarketWorld, user: String, label: String) {
    let id = world.order(&label).id;
    let result = world.system().orders.cancel_order(&UserId::from(user), id, None).await;
    record(world, label, result);
}

#[then(expr = "order {word} costs {int} cents")]
async fn order_costs(world: &mut MarketWorld, label: String, cents: i64) {
    assert_eq!(world.order(&label).total_price, Money::from(cents));
}

#[then(expr = "order {word} is {word}")]
async fn order_status(world: &mut MarketWorld, label: String, status: String) {
    let id = world.order(&label).id;
    let stored = world.system().orders.db().fetch_order(id).await.expect("Error fetching order");
    let stored = stored.expect("Order has disappeared");
    assert_eq!(stored.status.to_string(), status);
}

#[then(expr = "order {word} is assigned to {word}")]
async fn order_assignee(world: &mut MarketWorld, label: String, user: String) {
    let sys = world.system();
    let booster = sys
        .boosters
        .profile(&UserId::from(user), sys.catalog.game.id)
        .await
        .expect("Error fetching booster")
        .expect("User is not a booster");
    assert_eq!(world.order(&label).booster_id, Some(booster.id));
}

#[then(expr = "the last action failed with {string}")]
async fn last_action_failed(world: &mut MarketWorld, message: String) {
    let err = world.last_error.as_deref().expect("The last action succeeded");
    assert!(err.contains(&message), "Expected '{message}' in '{err}'");
}

#[then("the last action succeeded")]
async fn last_action_succeeded(world: &mut MarketWorld) {
    assert!(world.last_error.is_none(), "Unexpected error: {:?}", world.last_error);
}
