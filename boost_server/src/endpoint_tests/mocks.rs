use boost_engine::{
    db_types::{
        Booster,
        BoosterUpdate,
        Game,
        GameRank,
        NewBoosterProfile,
        NewGame,
        NewGameRank,
        NewOrder,
        NewProgressEntry,
        NewReview,
        NewServiceType,
        Order,
        OrderDetails,
        OrderStatusType,
        Review,
        ServiceType,
        UpdateUserProfile,
        UserId,
        UserProfile,
    },
    market_api::{
        booster_objects::{BoosterDashboardStats, BoosterQueryFilter},
        catalog_objects::{GameQueryFilter, PopularGame},
        order_objects::{OrderQueryFilter, OrderScope, OrderStats, PlayerDashboardStats},
        pagination::PageWindow,
    },
    pricing::PriceCalculation,
    traits::{
        AccountError,
        AccountManagement,
        BoosterError,
        BoosterManagement,
        CatalogError,
        CatalogManagement,
        MarketplaceDatabase,
        OrderFlowError,
        OrderManagement,
    },
};
use mockall::mock;

mock! {
    pub CatalogManager {}
    impl CatalogManagement for CatalogManager {
        async fn fetch_games(&self, filter: &GameQueryFilter) -> Result<Vec<Game>, CatalogError>;
        async fn fetch_games_page(&self, filter: &GameQueryFilter, window: PageWindow) -> Result<(Vec<Game>, i64), CatalogError>;
        async fn fetch_game_by_id(&self, id: i64) -> Result<Option<Game>, CatalogError>;
        async fn fetch_game_by_slug(&self, slug: &str) -> Result<Option<Game>, CatalogError>;
        async fn fetch_ranks_for_game(&self, game_id: i64) -> Result<Vec<GameRank>, CatalogError>;
        async fn fetch_rank_by_id(&self, id: i64) -> Result<Option<GameRank>, CatalogError>;
        async fn fetch_popular_games(&self, limit: u32) -> Result<Vec<PopularGame>, CatalogError>;
        async fn fetch_platforms(&self) -> Result<Vec<String>, CatalogError>;
        async fn fetch_service_types(&self) -> Result<Vec<ServiceType>, CatalogError>;
        async fn fetch_service_type_by_id(&self, id: i64) -> Result<Option<ServiceType>, CatalogError>;
        async fn insert_game(&self, game: NewGame) -> Result<Game, CatalogError>;
        async fn insert_rank(&self, rank: NewGameRank) -> Result<GameRank, CatalogError>;
        async fn insert_service_type(&self, service: NewServiceType) -> Result<ServiceType, CatalogError>;
    }
}

mock! {
    pub AccountManager {}
    impl AccountManagement for AccountManager {
        async fn fetch_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, AccountError>;
        async fn fetch_or_create_profile(&self, user_id: &UserId) -> Result<UserProfile, AccountError>;
        async fn update_profile(&self, user_id: &UserId, update: UpdateUserProfile) -> Result<UserProfile, AccountError>;
        async fn fetch_player_dashboard(&self, user_id: &UserId) -> Result<PlayerDashboardStats, AccountError>;
    }
}

// The order and booster APIs need a backend that does everything
mock! {
    pub MarketDb {}
    impl Clone for MarketDb {
        fn clone(&self) -> Self;
    }
    impl CatalogManagement for MarketDb {
        async fn fetch_games(&self, filter: &GameQueryFilter) -> Result<Vec<Game>, CatalogError>;
        async fn fetch_games_page(&self, filter: &GameQueryFilter, window: PageWindow) -> Result<(Vec<Game>, i64), CatalogError>;
        async fn fetch_game_by_id(&self, id: i64) -> Result<Option<Game>, CatalogError>;
        async fn fetch_game_by_slug(&self, slug: &str) -> Result<Option<Game>, CatalogError>;
        async fn fetch_ranks_for_game(&self, game_id: i64) -> Result<Vec<GameRank>, CatalogError>;
        async fn fetch_rank_by_id(&self, id: i64) -> Result<Option<GameRank>, CatalogError>;
        async fn fetch_popular_games(&self, limit: u32) -> Result<Vec<PopularGame>, CatalogError>;
        async fn fetch_platforms(&self) -> Result<Vec<String>, CatalogError>;
        async fn fetch_service_types(&self) -> Result<Vec<ServiceType>, CatalogError>;
        async fn fetch_service_type_by_id(&self, id: i64) -> Result<Option<ServiceType>, CatalogError>;
        async fn insert_game(&self, game: NewGame) -> Result<Game, CatalogError>;
        async fn insert_rank(&self, rank: NewGameRank) -> Result<GameRank, CatalogError>;
        async fn insert_service_type(&self, service: NewServiceType) -> Result<ServiceType, CatalogError>;
    }
    impl BoosterManagement for MarketDb {
        async fn insert_booster(&self, user_id: &UserId, profile: NewBoosterProfile) -> Result<Booster, BoosterError>;
        async fn fetch_booster_by_id(&self, id: i64) -> Result<Option<Booster>, BoosterError>;
        async fn fetch_booster_for_user_and_game(&self, user_id: &UserId, game_id: i64) -> Result<Option<Booster>, BoosterError>;
        async fn fetch_boosters_for_user(&self, user_id: &UserId) -> Result<Vec<Booster>, BoosterError>;
        async fn search_boosters(&self, filter: &BoosterQueryFilter, limit: Option<u32>) -> Result<Vec<Booster>, BoosterError>;
        async fn fetch_boosters_page(&self, filter: &BoosterQueryFilter, window: PageWindow) -> Result<(Vec<Booster>, i64), BoosterError>;
        async fn update_booster(&self, id: i64, update: BoosterUpdate) -> Result<Option<Booster>, BoosterError>;
        async fn set_booster_availability(&self, id: i64, available: bool) -> Result<Option<Booster>, BoosterError>;
        async fn set_booster_verified(&self, id: i64, verified: bool) -> Result<Option<Booster>, BoosterError>;
        async fn delete_booster(&self, id: i64) -> Result<bool, BoosterError>;
        async fn fetch_booster_dashboard(&self, user_id: &UserId) -> Result<BoosterDashboardStats, BoosterError>;
    }
    impl OrderManagement for MarketDb {
        async fn insert_order(&self, user_id: &UserId, order: NewOrder, price: PriceCalculation) -> Result<Order, OrderFlowError>;
        async fn fetch_order(&self, id: i64) -> Result<Option<Order>, OrderFlowError>;
        async fn fetch_order_details(&self, id: i64) -> Result<Option<OrderDetails>, OrderFlowError>;
        async fn fetch_orders(&self, scope: &OrderScope, filter: &OrderQueryFilter) -> Result<Vec<Order>, OrderFlowError>;
        async fn fetch_orders_page(&self, scope: &OrderScope, filter: &OrderQueryFilter, window: PageWindow) -> Result<(Vec<Order>, i64), OrderFlowError>;
        async fn assign_booster(&self, order_id: i64, booster_id: i64) -> Result<Option<Order>, OrderFlowError>;
        async fn transition_order(&self, order_id: i64, from: OrderStatusType, to: OrderStatusType, progress: Option<NewProgressEntry>) -> Result<Option<Order>, OrderFlowError>;
        async fn cancel_order(&self, order_id: i64, user_id: &UserId, progress: Option<NewProgressEntry>) -> Result<Option<Order>, OrderFlowError>;
        async fn insert_review(&self, order: &Order, review: NewReview) -> Result<Review, OrderFlowError>;
        async fn fetch_order_stats(&self) -> Result<OrderStats, OrderFlowError>;
    }
    impl AccountManagement for MarketDb {
        async fn fetch_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, AccountError>;
        async fn fetch_or_create_profile(&self, user_id: &UserId) -> Result<UserProfile, AccountError>;
        async fn update_profile(&self, user_id: &UserId, update: UpdateUserProfile) -> Result<UserProfile, AccountError>;
        async fn fetch_player_dashboard(&self, user_id: &UserId) -> Result<PlayerDashboardStats, AccountError>;
    }
    impl MarketplaceDatabase for MarketDb {
        fn url(&self) -> &str;
        async fn close(&mut self) -> Result<(), sqlx::Error>;
    }
}
