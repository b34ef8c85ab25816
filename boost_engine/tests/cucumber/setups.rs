use cucumber::given;

use crate::{
    cucumber::{world::MarketSystem, MarketWorld},
    support::seed::verified_booster,
};

#[given("a fresh marketplace")]
async fn fresh_marketplace(world: &mut MarketWorld) {
    world.system = Some(MarketSystem::new().await);
}

#[given(expr = "{word} is a verified booster")]
async fn verified(world: &mut MarketWorld, user: String) {
    let sys = world.system();
    verified_booster(sys.orders.db(), &user, sys.catalog.game.id).await;
}
