use actix_web::{http::StatusCode, web, web::ServiceConfig};
use boost_engine::{
    db_types::{Money, OrderDetails, OrderStatusType, Role, ServiceType},
    events::EventProducers,
    pricing::PriceCalculation,
    OrderFlowApi,
};
use chrono::{Days, Utc};
use serde_json::json;

use super::{
    helpers::{
        admin_token,
        booster,
        game,
        get_request,
        issue_token,
        issue_token_with_secret,
        order,
        player_token,
        post_request,
        send_request,
        timestamp,
    },
    mocks::MockMarketDb,
};
use crate::routes::{
    AcceptOrderRoute,
    AllOrdersRoute,
    CancelOrderRoute,
    CreateOrderRoute,
    OrderByIdRoute,
    QuoteRoute,
};

fn service_type(id: i64) -> ServiceType {
    ServiceType {
        id,
        name: "Placement matches".into(),
        slug: "placements".into(),
        description: None,
        icon: None,
        is_active: true,
        created_at: timestamp(),
    }
}

fn register(cfg: &mut ServiceConfig, db: MockMarketDb) {
    cfg.service(
        web::scope("/api")
            .service(QuoteRoute::<MockMarketDb>::new())
            .service(CreateOrderRoute::<MockMarketDb>::new())
            .service(AllOrdersRoute::<MockMarketDb>::new())
            .service(OrderByIdRoute::<MockMarketDb>::new())
            .service(AcceptOrderRoute::<MockMarketDb>::new())
            .service(CancelOrderRoute::<MockMarketDb>::new()),
    )
    .app_data(web::Data::new(OrderFlowApi::new(db, EventProducers::default())));
}

fn configure(cfg: &mut ServiceConfig) {
    let mut db = MockMarketDb::new();
    db.expect_fetch_game_by_id().returning(|id| Ok(Some(game(id))));
    db.expect_fetch_service_type_by_id().returning(|id| Ok(Some(service_type(id))));
    db.expect_insert_order()
        .withf(|user, order, price| {
            user.as_str() == "alice" && order.game_id == 1 && price.total_price == Money::from(2875)
        })
        .returning(|user, _, price: PriceCalculation| {
            let mut o = order(1, user.as_str(), OrderStatusType::Pending);
            o.total_price = price.total_price;
            Ok(o)
        });
    db.expect_fetch_orders_page().returning(|_, _, _| Ok((vec![], 0)));
    db.expect_fetch_order().returning(|id| match id {
        1 => Ok(Some(order(1, "alice", OrderStatusType::Pending))),
        2 => Ok(Some(order(2, "alice", OrderStatusType::InProgress))),
        _ => Ok(None),
    });
    db.expect_fetch_order_details().returning(|id| {
        let mut o = order(id, "alice", OrderStatusType::Accepted);
        o.booster_id = Some(7);
        Ok(Some(OrderDetails { order: o, progress: vec![], payments: vec![], reviews: vec![] }))
    });
    db.expect_fetch_booster_by_id().returning(|id| Ok(Some(booster(id, "bob", 1))));
    db.expect_cancel_order()
        .withf(|id, user, progress| *id == 1 && user.as_str() == "alice" && progress.is_none())
        .returning(|id, user, _| Ok(Some(order(id, user.as_str(), OrderStatusType::Cancelled))));
    register(cfg, db);
}

#[actix_web::test]
async fn quotes_are_public() -> anyhow::Result<()> {
    let _ = env_logger::try_init().ok();
    let body = json!({"current_rank_id": 10, "target_rank_id": 12, "priority": "urgent"});
    let (status, body) = post_request("", "/api/orders/quote", &body, configure).await;
    assert_eq!(status, StatusCode::OK);
    let quote: PriceCalculation = serde_json::from_str(&body)?;
    assert_eq!(quote.base_price, Money::from(7500));
    assert_eq!(quote.platform_fee, Money::from(1125));
    assert_eq!(quote.total_price, Money::from(8625));
    Ok(())
}

#[actix_web::test]
async fn create_order_needs_a_token() {
    let _ = env_logger::try_init().ok();
    let body = json!({"game_id": 1, "service_type_id": 1, "server_region": "EUW"});
    let (status, body) = post_request("", "/api/orders", &body, configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("No access token was provided."), "{body}");
}

#[actix_web::test]
async fn create_order_is_priced_by_the_server() -> anyhow::Result<()> {
    let _ = env_logger::try_init().ok();
    let token = player_token("alice");
    let body = json!({"game_id": 1, "service_type_id": 1, "server_region": "EUW"});
    let (status, body) = post_request(&token, "/api/orders", &body, configure).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let order: serde_json::Value = serde_json::from_str(&body)?;
    assert_eq!(order["total_price"], 2875);
    assert_eq!(order["status"], "pending");
    Ok(())
}

#[actix_web::test]
async fn client_prices_are_rejected() {
    let _ = env_logger::try_init().ok();
    let token = player_token("alice");
    let body = json!({"game_id": 1, "service_type_id": 1, "server_region": "EUW", "total_price": 1});
    let (status, _) = post_request(&token, "/api/orders", &body, configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn expired_token() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("alice", &[Role::Player], Utc::now() - Days::new(1));
    let (status, _) = get_request(&token, "/api/orders/id/1", configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn token_signed_with_another_secret() {
    let _ = env_logger::try_init().ok();
    let token = issue_token_with_secret("not-the-server-secret", "alice", &[Role::Admin], Utc::now() + Days::new(1));
    let (status, _) = get_request(&token, "/api/orders/all", configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn all_orders_is_for_admins() -> anyhow::Result<()> {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&player_token("alice"), "/api/orders/all", configure).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("The admin role is required"), "{body}");

    let (status, body) = get_request(&admin_token("root"), "/api/orders/all?page=1&limit=5", configure).await;
    assert_eq!(status, StatusCode::OK);
    let page: serde_json::Value = serde_json::from_str(&body)?;
    assert_eq!(page["data"], json!([]));
    assert_eq!(page["pagination"]["total"], 0);
    Ok(())
}

#[actix_web::test]
async fn accepting_a_busy_order() {
    let _ = env_logger::try_init().ok();
    let token = player_token("bob");
    let (status, body) = post_request(&token, "/api/orders/id/2/accept", &json!({}), configure).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("Order 2 is no longer pending"), "{body}");
}

#[actix_web::test]
async fn order_details_for_participants_only() {
    let _ = env_logger::try_init().ok();
    let (status, _) = get_request(&player_token("alice"), "/api/orders/id/5", configure).await;
    assert_eq!(status, StatusCode::OK);
    // bob is the assigned booster
    let (status, _) = get_request(&player_token("bob"), "/api/orders/id/5", configure).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = get_request(&player_token("mallory"), "/api/orders/id/5", configure).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("mallory is not a party to order #5"), "{body}");
    let (status, _) = get_request(&admin_token("root"), "/api/orders/id/5", configure).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn cancel_without_a_reason() -> anyhow::Result<()> {
    let _ = env_logger::try_init().ok();
    let req = actix_web::test::TestRequest::post()
        .uri("/api/orders/id/1/cancel")
        .insert_header(("Authorization", format!("Bearer {}", player_token("alice"))));
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let order: serde_json::Value = serde_json::from_str(&body)?;
    assert_eq!(order["status"], "cancelled");
    Ok(())
}

#[actix_web::test]
async fn only_the_requester_may_cancel() {
    let _ = env_logger::try_init().ok();
    let (status, _) = post_request(&player_token("bob"), "/api/orders/id/1/cancel", &json!({}), configure).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
