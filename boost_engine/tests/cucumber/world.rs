use std::collections::HashMap;

use boost_engine::{
    db_types::Order,
    events::EventProducers,
    BoosterApi,
    OrderFlowApi,
    SqliteDatabase,
};
use cucumber::World;
use log::*;

use crate::support::{
    prepare_env::{prepare_test_env, random_db_path},
    seed::{seed_catalog, SeededCatalog},
};

#[derive(Default, Debug, World)]
pub struct MarketWorld {
    pub system: Option<MarketSystem>,
    /// Orders created during the scenario, by the label the scenario gave them
    pub orders: HashMap<String, Order>,
    pub last_error: Option<String>,
}

#[derive(Debug)]
pub struct MarketSystem {
    pub db_path: String,
    pub catalog: SeededCatalog,
    pub orders: OrderFlowApi<SqliteDatabase>,
    pub boosters: BoosterApi<SqliteDatabase>,
}

impl MarketWorld {
    pub fn system(&self) -> &MarketSystem {
        self.system.as_ref().expect("Marketplace not initialised")
    }

    pub fn order(&self, label: &str) -> &Order {
        self.orders.get(label).unwrap_or_else(|| panic!("No order labelled {label}"))
    }
}

impl MarketSystem {
    pub async fn new() -> Self {
        let url = random_db_path();
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
        debug!("🚀️ Created database: {url}");
        let catalog = seed_catalog(&db).await;
        let orders = OrderFlowApi::new(db.clone(), EventProducers::default());
        let boosters = BoosterApi::new(db);
        Self { db_path: url, catalog, orders, boosters }
    }
}
