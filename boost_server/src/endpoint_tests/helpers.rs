use actix_web::{
    body::to_bytes,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use boost_engine::db_types::{Booster, Game, Money, Order, OrderPriority, OrderStatusType, Role, UserId, UserProfile};
use chrono::{DateTime, Days, TimeZone, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use log::debug;
use serde::Serialize;
use sqlx::types::Json;

use crate::{
    auth::{JwtClaims, TokenVerifier},
    config::AuthConfig,
};

// The shared secret for tokens in these tests. DO NOT re-use it anywhere.
pub const TEST_SECRET: &str = "8b1c0a3f5e7d4b2a9c6e1f0d3a5b7c9e";

pub fn issue_token_with_secret(secret: &str, sub: &str, roles: &[Role], expiry: DateTime<Utc>) -> String {
    let claims = JwtClaims { sub: sub.into(), exp: expiry.timestamp(), roles: roles.iter().map(Role::to_string).collect() };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).expect("Failed to sign token")
}

pub fn issue_token(sub: &str, roles: &[Role], expiry: DateTime<Utc>) -> String {
    issue_token_with_secret(TEST_SECRET, sub, roles, expiry)
}

pub fn player_token(sub: &str) -> String {
    issue_token(sub, &[Role::Player], Utc::now() + Days::new(1))
}

pub fn admin_token(sub: &str) -> String {
    issue_token(sub, &[Role::Player, Role::Admin], Utc::now() + Days::new(1))
}

/// Sends the request to an app set up by `configure`, and returns the status and body. Errors raised by middleware
/// are rendered the same way the server would render them.
pub async fn send_request(req: TestRequest, configure: fn(&mut ServiceConfig)) -> (StatusCode, String) {
    let verifier = TokenVerifier::new(&AuthConfig::new(TEST_SECRET));
    let app = App::new().app_data(web::Data::new(verifier)).configure(configure);
    let service = test::init_service(app).await;
    let req: actix_http::Request = req.to_request();
    debug!("Making request");
    match test::try_call_service(&service, req).await {
        Ok(res) => {
            let status = res.status();
            let body = test::read_body(res).await;
            (status, String::from_utf8_lossy(&body).into_owned())
        },
        Err(e) => {
            let res = e.error_response();
            let status = res.status();
            let body = to_bytes(res.into_body()).await.map(|b| String::from_utf8_lossy(&b).into_owned());
            (status, body.unwrap_or_default())
        },
    }
}

fn with_token(req: TestRequest, token: &str) -> TestRequest {
    if token.is_empty() {
        req
    } else {
        req.insert_header(("Authorization", format!("Bearer {token}")))
    }
}

pub async fn get_request(token: &str, path: &str, configure: fn(&mut ServiceConfig)) -> (StatusCode, String) {
    send_request(with_token(TestRequest::get().uri(path), token), configure).await
}

pub async fn post_request<T: Serialize>(
    token: &str,
    path: &str,
    body: &T,
    configure: fn(&mut ServiceConfig),
) -> (StatusCode, String) {
    send_request(with_token(TestRequest::post().uri(path).set_json(body), token), configure).await
}

pub async fn patch_request<T: Serialize>(
    token: &str,
    path: &str,
    body: &T,
    configure: fn(&mut ServiceConfig),
) -> (StatusCode, String) {
    send_request(with_token(TestRequest::patch().uri(path).set_json(body), token), configure).await
}

//------------------------------------------------   Fixtures  ---------------------------------------------------------
pub fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn game(id: i64) -> Game {
    Game {
        id,
        name: "League of Legends".into(),
        slug: "league-of-legends".into(),
        description: None,
        icon_url: None,
        banner_url: None,
        platforms: Json(vec!["PC".to_string()]),
        is_active: true,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

pub fn order(id: i64, user: &str, status: OrderStatusType) -> Order {
    Order {
        id,
        user_id: UserId::from(user),
        booster_id: None,
        game_id: 1,
        service_type_id: 1,
        current_rank_id: None,
        target_rank_id: None,
        server_region: "EUW".into(),
        additional_info: None,
        base_price: Money::from(2500),
        platform_fee: Money::from(375),
        total_price: Money::from(2875),
        status,
        priority: OrderPriority::Normal,
        estimated_days: None,
        actual_days: None,
        accepted_at: None,
        started_at: None,
        completed_at: None,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

pub fn booster(id: i64, user: &str, game_id: i64) -> Booster {
    Booster {
        id,
        user_id: UserId::from(user),
        game_id,
        current_rank_id: None,
        peak_rank_id: None,
        server_regions: Json(vec!["EUW".to_string()]),
        hourly_rate: Money::from_dollars(20),
        total_orders: 0,
        completed_orders: 0,
        rating: 0.0,
        is_verified: false,
        is_available: true,
        bio: None,
        experience_years: 3,
        languages: Json(vec!["en".to_string()]),
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

pub fn profile(user: &str) -> UserProfile {
    UserProfile {
        id: UserId::from(user),
        username: None,
        full_name: None,
        avatar_url: None,
        country: None,
        timezone: "UTC".into(),
        role: Role::Player,
        is_verified: false,
        total_orders: 0,
        total_spent: Money::default(),
        rating: 0.0,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}
