use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use boost_engine::{
    events::{
        EventHandlers,
        EventHooks,
        EventProducers,
        OrderAcceptedEvent,
        OrderCancelledEvent,
        OrderCreatedEvent,
        OrderStatusChangedEvent,
    },
    AccountApi,
    BoosterApi,
    CatalogApi,
    OrderFlowApi,
    SqliteDatabase,
};
use log::*;

use crate::{
    auth::TokenVerifier,
    config::ServerConfig,
    errors::ServerError,
    routes::{
        health,
        AcceptOrderRoute,
        AllOrdersRoute,
        AvailableBoostersRoute,
        BoosterByIdRoute,
        BoosterDashboardRoute,
        BoosterOrdersRoute,
        BoosterProfileRoute,
        BoostersPageRoute,
        CancelOrderRoute,
        CreateBoosterProfileRoute,
        CreateOrderRoute,
        DeleteBoosterProfileRoute,
        GameByIdRoute,
        GameBySlugRoute,
        GameWithRanksRoute,
        GamesByPlatformRoute,
        GamesPageRoute,
        GamesRoute,
        MyBoosterProfilesRoute,
        MyDashboardRoute,
        MyOrdersRoute,
        MyProfileRoute,
        OrderByIdRoute,
        OrderStatsRoute,
        PlatformsRoute,
        PopularGamesRoute,
        QuoteRoute,
        RankByIdRoute,
        RankDifferenceRoute,
        RankHierarchyRoute,
        ReviewOrderRoute,
        SearchBoostersRoute,
        SearchGamesRoute,
        ServiceTypesRoute,
        TopBoostersRoute,
        UpdateBoosterAvailabilityRoute,
        UpdateBoosterProfileRoute,
        UpdateMyProfileRoute,
        UpdateOrderStatusRoute,
        VerifyBoosterRoute,
    },
};

const EVENT_BUFFER_SIZE: usize = 25;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = if config.database_url.is_empty() {
        SqliteDatabase::new(config.max_connections).await
    } else {
        SqliteDatabase::new_with_url(&config.database_url, config.max_connections).await
    }
    .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(format!("Could not migrate the database. {e}")))?;
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, logging_hooks());
    let producers = handlers.producers();
    handlers.start_handlers();
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Order events are written to the log. Further subscribers (notifications, payouts) would hook in here.
fn logging_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks
        .on_order_created(|ev: OrderCreatedEvent| {
            Box::pin(async move {
                info!("🪝️ Order #{} placed by {} for {}", ev.order.id, ev.order.user_id, ev.order.total_price);
            })
        })
        .on_order_accepted(|ev: OrderAcceptedEvent| {
            Box::pin(async move {
                info!("🪝️ Order #{} accepted by booster #{}", ev.order.id, ev.booster_id);
            })
        })
        .on_order_status_changed(|ev: OrderStatusChangedEvent| {
            Box::pin(async move {
                info!("🪝️ Order #{} moved from {} to {}", ev.order.id, ev.old_status, ev.new_status());
            })
        })
        .on_order_cancelled(|ev: OrderCancelledEvent| {
            Box::pin(async move {
                let reason = ev.reason.as_deref().unwrap_or("no reason given");
                info!("🪝️ Order #{} was cancelled ({reason})", ev.order.id);
            })
        });
    hooks
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), producers.clone()).with_pricing(config.pricing.clone());
        let catalog_api = CatalogApi::new(db.clone());
        let booster_api = BoosterApi::new(db.clone());
        let accounts_api = AccountApi::new(db.clone());
        let verifier = TokenVerifier::new(&config.auth);
        let api_scope = web::scope("/api")
            // Catalog
            .service(GamesRoute::<SqliteDatabase>::new())
            .service(GamesPageRoute::<SqliteDatabase>::new())
            .service(PopularGamesRoute::<SqliteDatabase>::new())
            .service(SearchGamesRoute::<SqliteDatabase>::new())
            .service(PlatformsRoute::<SqliteDatabase>::new())
            .service(GamesByPlatformRoute::<SqliteDatabase>::new())
            .service(GameByIdRoute::<SqliteDatabase>::new())
            .service(GameBySlugRoute::<SqliteDatabase>::new())
            .service(GameWithRanksRoute::<SqliteDatabase>::new())
            .service(RankHierarchyRoute::<SqliteDatabase>::new())
            .service(RankDifferenceRoute::<SqliteDatabase>::new())
            .service(RankByIdRoute::<SqliteDatabase>::new())
            .service(ServiceTypesRoute::<SqliteDatabase>::new())
            // Orders
            .service(QuoteRoute::<SqliteDatabase>::new())
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(BoosterOrdersRoute::<SqliteDatabase>::new())
            .service(AllOrdersRoute::<SqliteDatabase>::new())
            .service(OrderStatsRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(AcceptOrderRoute::<SqliteDatabase>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
            .service(CancelOrderRoute::<SqliteDatabase>::new())
            .service(ReviewOrderRoute::<SqliteDatabase>::new())
            // Boosters
            .service(CreateBoosterProfileRoute::<SqliteDatabase>::new())
            .service(MyBoosterProfilesRoute::<SqliteDatabase>::new())
            .service(BoosterDashboardRoute::<SqliteDatabase>::new())
            .service(AvailableBoostersRoute::<SqliteDatabase>::new())
            .service(BoostersPageRoute::<SqliteDatabase>::new())
            .service(TopBoostersRoute::<SqliteDatabase>::new())
            .service(SearchBoostersRoute::<SqliteDatabase>::new())
            .service(BoosterByIdRoute::<SqliteDatabase>::new())
            .service(BoosterProfileRoute::<SqliteDatabase>::new())
            .service(UpdateBoosterProfileRoute::<SqliteDatabase>::new())
            .service(UpdateBoosterAvailabilityRoute::<SqliteDatabase>::new())
            .service(DeleteBoosterProfileRoute::<SqliteDatabase>::new())
            .service(VerifyBoosterRoute::<SqliteDatabase>::new())
            // Account
            .service(MyProfileRoute::<SqliteDatabase>::new())
            .service(UpdateMyProfileRoute::<SqliteDatabase>::new())
            .service(MyDashboardRoute::<SqliteDatabase>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("bm::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(booster_api))
            .app_data(web::Data::new(accounts_api))
            .app_data(web::Data::new(verifier))
            .service(health)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
