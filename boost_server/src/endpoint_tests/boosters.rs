use actix_web::{http::StatusCode, web, web::ServiceConfig};
use boost_engine::{
    db_types::{Booster, UserId},
    traits::BoosterError,
    BoosterApi,
};
use serde_json::json;

use super::{
    helpers::{admin_token, booster, game, get_request, patch_request, player_token, post_request},
    mocks::MockMarketDb,
};
use crate::routes::{
    AvailableBoostersRoute,
    BoosterProfileRoute,
    CreateBoosterProfileRoute,
    UpdateBoosterProfileRoute,
    VerifyBoosterRoute,
};

fn configure(cfg: &mut ServiceConfig) {
    let mut db = MockMarketDb::new();
    db.expect_fetch_game_by_id().returning(|id| Ok(Some(game(id))));
    db.expect_insert_booster().returning(|user_id, profile| {
        if user_id.as_str() == "bob" {
            Err(BoosterError::ProfileAlreadyExists { user_id: user_id.clone(), game_id: profile.game_id })
        } else {
            Ok(booster(2, user_id.as_str(), profile.game_id))
        }
    });
    db.expect_fetch_booster_by_id().returning(|id| Ok((id == 1).then(|| booster(1, "bob", 1))));
    db.expect_fetch_booster_for_user_and_game()
        .returning(|user_id, game_id| Ok((user_id.as_str() == "bob").then(|| booster(1, "bob", game_id))));
    db.expect_update_booster().returning(|id, update| {
        let mut b = booster(id, "bob", 1);
        b.bio = update.bio;
        Ok(Some(b))
    });
    db.expect_set_booster_verified().returning(|id, verified| {
        let mut b = booster(id, "bob", 1);
        b.is_verified = verified;
        Ok(Some(b))
    });
    db.expect_search_boosters()
        .withf(|filter, limit| {
            filter.is_verified == Some(true) &&
                filter.is_available == Some(true) &&
                filter.server_regions == Some(vec!["EUW".to_string(), "NA".to_string()]) &&
                limit.is_none()
        })
        .returning(|_, _| {
            let mut b = booster(1, "bob", 1);
            b.is_verified = true;
            Ok(vec![b])
        });
    cfg.service(
        web::scope("/api")
            .service(CreateBoosterProfileRoute::<MockMarketDb>::new())
            .service(AvailableBoostersRoute::<MockMarketDb>::new())
            .service(BoosterProfileRoute::<MockMarketDb>::new())
            .service(UpdateBoosterProfileRoute::<MockMarketDb>::new())
            .service(VerifyBoosterRoute::<MockMarketDb>::new()),
    )
    .app_data(web::Data::new(BoosterApi::new(db)));
}

#[actix_web::test]
async fn create_profile() -> anyhow::Result<()> {
    let _ = env_logger::try_init().ok();
    let body = json!({"game_id": 1, "hourly_rate": 2000, "server_regions": ["EUW"], "languages": ["en"]});
    let (status, body) = post_request(&player_token("carol"), "/api/boosters", &body, configure).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let booster: Booster = serde_json::from_str(&body)?;
    assert_eq!(booster.user_id, UserId::from("carol"));
    assert!(!booster.is_verified);
    Ok(())
}

#[actix_web::test]
async fn duplicate_profile() {
    let _ = env_logger::try_init().ok();
    let body = json!({"game_id": 1, "hourly_rate": 2000});
    let (status, body) = post_request(&player_token("bob"), "/api/boosters", &body, configure).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("already has a booster profile for game 1"), "{body}");
}

#[actix_web::test]
async fn negative_rates_are_rejected() {
    let _ = env_logger::try_init().ok();
    let body = json!({"game_id": 1, "hourly_rate": -5});
    let (status, _) = post_request(&player_token("carol"), "/api/boosters", &body, configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn verification_is_for_admins() -> anyhow::Result<()> {
    let _ = env_logger::try_init().ok();
    let body = json!({"verified": true});
    let (status, _) = post_request(&player_token("bob"), "/api/boosters/id/1/verify", &body, configure).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = post_request(&admin_token("root"), "/api/boosters/id/1/verify", &body, configure).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let booster: Booster = serde_json::from_str(&body)?;
    assert!(booster.is_verified);
    Ok(())
}

#[actix_web::test]
async fn owners_edit_their_profiles() -> anyhow::Result<()> {
    let _ = env_logger::try_init().ok();
    let body = json!({"bio": "Diamond for 4 seasons"});
    let (status, body) = patch_request(&player_token("bob"), "/api/boosters/id/1", &body, configure).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let booster: Booster = serde_json::from_str(&body)?;
    assert_eq!(booster.bio.as_deref(), Some("Diamond for 4 seasons"));
    Ok(())
}

#[actix_web::test]
async fn cannot_edit_someone_elses_profile() {
    let _ = env_logger::try_init().ok();
    let body = json!({"bio": "Mine now"});
    let (status, body) = patch_request(&player_token("mallory"), "/api/boosters/id/1", &body, configure).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("does not belong to the current user"), "{body}");
}

#[actix_web::test]
async fn empty_updates_are_rejected() {
    let _ = env_logger::try_init().ok();
    let (status, body) = patch_request(&player_token("bob"), "/api/boosters/id/1", &json!({}), configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Nothing to update"), "{body}");
}

#[actix_web::test]
async fn available_boosters_are_verified() -> anyhow::Result<()> {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/api/boosters/available?server_regions=EUW,NA", configure).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let boosters: Vec<Booster> = serde_json::from_str(&body)?;
    assert_eq!(boosters.len(), 1);
    assert!(boosters[0].is_verified);
    Ok(())
}

#[actix_web::test]
async fn profile_by_user_and_game() {
    let _ = env_logger::try_init().ok();
    let (status, _) = get_request("", "/api/boosters/profile/bob/1", configure).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = get_request("", "/api/boosters/profile/carol/1", configure).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("carol has no booster profile for game 1"), "{body}");
}
