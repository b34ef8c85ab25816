use actix_web::{http::StatusCode, test, web, web::ServiceConfig, App};
use boost_engine::{
    db_types::{Game, GameRank},
    market_api::catalog_objects::RankDifference,
    CatalogApi,
};

use super::{
    helpers::{game, get_request, timestamp},
    mocks::MockCatalogManager,
};
use crate::routes::{
    health,
    GameByIdRoute,
    GamesPageRoute,
    GamesRoute,
    PlatformsRoute,
    RankDifferenceRoute,
    SearchGamesRoute,
};

fn rank(id: i64, name: &str, tier: i64) -> GameRank {
    GameRank {
        id,
        game_id: 1,
        name: name.into(),
        tier,
        division: None,
        division_name: None,
        min_mmr: None,
        max_mmr: None,
        icon_url: None,
        color_hex: None,
        is_active: true,
        created_at: timestamp(),
    }
}

fn configure(cfg: &mut ServiceConfig) {
    let mut catalog = MockCatalogManager::new();
    catalog
        .expect_fetch_games()
        .withf(|filter| filter.platform_list() == ["PC".to_string()] || filter.search_term() == Some("league"))
        .returning(|_| Ok(vec![game(1)]));
    catalog.expect_fetch_game_by_id().returning(|id| Ok((id == 1).then(|| game(1))));
    catalog
        .expect_fetch_ranks_for_game()
        .returning(|_| Ok(vec![rank(10, "Iron", 1), rank(11, "Bronze", 2), rank(12, "Silver", 3)]));
    catalog.expect_fetch_platforms().returning(|| Ok(vec!["PC".to_string(), "PlayStation".to_string()]));
    cfg.service(
        web::scope("/api")
            .service(GamesRoute::<MockCatalogManager>::new())
            .service(GamesPageRoute::<MockCatalogManager>::new())
            .service(SearchGamesRoute::<MockCatalogManager>::new())
            .service(PlatformsRoute::<MockCatalogManager>::new())
            .service(GameByIdRoute::<MockCatalogManager>::new())
            .service(RankDifferenceRoute::<MockCatalogManager>::new()),
    )
    .app_data(web::Data::new(CatalogApi::new(catalog)));
}

#[actix_web::test]
async fn health_check() {
    let app = test::init_service(App::new().service(health)).await;
    let req = test::TestRequest::get().uri("/health").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn games_by_platform_filter() -> anyhow::Result<()> {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/api/games?platforms=PC", configure).await;
    assert_eq!(status, StatusCode::OK);
    let games: Vec<Game> = serde_json::from_str(&body)?;
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].slug, "league-of-legends");
    Ok(())
}

#[actix_web::test]
async fn search_games() -> anyhow::Result<()> {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/api/games/search?q=league", configure).await;
    assert_eq!(status, StatusCode::OK);
    let games: Vec<Game> = serde_json::from_str(&body)?;
    assert_eq!(games.len(), 1);
    // A blank search never reaches the database
    let (status, body) = get_request("", "/api/games/search?q=%20", configure).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
    Ok(())
}

#[actix_web::test]
async fn platforms() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/api/games/platforms", configure).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"["PC","PlayStation"]"#);
}

#[actix_web::test]
async fn unknown_game() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/api/games/id/99", configure).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. Game 99"}"#);
}

#[actix_web::test]
async fn rank_difference() -> anyhow::Result<()> {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/api/games/id/1/rank_difference?from=12&to=10", configure).await;
    assert_eq!(status, StatusCode::OK);
    let diff: RankDifference = serde_json::from_str(&body)?;
    assert_eq!(diff, RankDifference { from_rank_id: 12, to_rank_id: 10, steps: -2, tier_difference: -2 });
    Ok(())
}

#[actix_web::test]
async fn invalid_page() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/api/games/page?page=0", configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Page numbers start at 1"), "{body}");
}
