use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use boost_engine::{
    db_types::{UpdateUserProfile, UserProfile},
    market_api::order_objects::PlayerDashboardStats,
    AccountApi,
};
use serde_json::json;

use super::{
    helpers::{get_request, player_token, profile, send_request},
    mocks::MockAccountManager,
};
use crate::{
    auth::ACCESS_TOKEN_HEADER,
    routes::{MyDashboardRoute, MyProfileRoute, UpdateMyProfileRoute},
};

fn configure(cfg: &mut ServiceConfig) {
    let mut accounts = MockAccountManager::new();
    accounts.expect_fetch_or_create_profile().returning(|user_id| Ok(profile(user_id.as_str())));
    accounts
        .expect_update_profile()
        .withf(|_, update: &UpdateUserProfile| update.username.as_deref() == Some("alice_the_great"))
        .returning(|user_id, update| {
            let mut p = profile(user_id.as_str());
            p.username = update.username;
            Ok(p)
        });
    accounts.expect_fetch_player_dashboard().returning(|_| Ok(PlayerDashboardStats::default()));
    cfg.service(
        web::scope("/api")
            .service(MyProfileRoute::<MockAccountManager>::new())
            .service(UpdateMyProfileRoute::<MockAccountManager>::new())
            .service(MyDashboardRoute::<MockAccountManager>::new()),
    )
    .app_data(web::Data::new(AccountApi::new(accounts)));
}

fn put_profile(token: &str, body: serde_json::Value) -> TestRequest {
    TestRequest::put()
        .uri("/api/profile")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(body)
}

#[actix_web::test]
async fn profile_needs_a_token() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/api/profile", configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Authentication Error. No access token was provided."}"#);
}

#[actix_web::test]
async fn fetch_my_profile() -> anyhow::Result<()> {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&player_token("alice"), "/api/profile", configure).await;
    assert_eq!(status, StatusCode::OK);
    let profile: UserProfile = serde_json::from_str(&body)?;
    assert_eq!(profile.id.as_str(), "alice");
    Ok(())
}

#[actix_web::test]
async fn access_token_header() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/api/dashboard").insert_header((ACCESS_TOKEN_HEADER, player_token("alice")));
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body.contains(r#""total_orders":0"#), "{body}");
}

#[actix_web::test]
async fn usernames_are_trimmed() -> anyhow::Result<()> {
    let _ = env_logger::try_init().ok();
    let req = put_profile(&player_token("alice"), json!({"username": "  alice_the_great "}));
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let profile: UserProfile = serde_json::from_str(&body)?;
    assert_eq!(profile.username.as_deref(), Some("alice_the_great"));
    Ok(())
}

#[actix_web::test]
async fn long_usernames_are_rejected() {
    let _ = env_logger::try_init().ok();
    let req = put_profile(&player_token("alice"), json!({"username": "a".repeat(40)}));
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("usernames must be between 1 and 32 characters"), "{body}");
}
