use boost_engine::{
    db_types::NewGameRank,
    market_api::{catalog_objects::GameQueryFilter, pagination::Pagination},
    CatalogApi,
    CatalogError,
    CatalogManagement,
};
use support::{
    prepare_env::{destroy_database, fresh_database},
    seed::seed_catalog,
};

mod support;

#[tokio::test]
async fn rank_ladder_is_ordered_lowest_first() {
    let db = fresh_database().await;
    let catalog = seed_catalog(&db).await;
    let api = CatalogApi::new(db.clone());
    let ladder = api.rank_hierarchy(catalog.game.id).await.expect("Error fetching ranks");
    let names = ladder.iter().map(|r| r.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["Iron", "Bronze", "Silver", "Gold", "Platinum"]);
    let err = api.rank_hierarchy(9999).await.unwrap_err();
    assert!(matches!(err, CatalogError::GameNotFound(9999)));
    destroy_database(db).await;
}

#[tokio::test]
async fn rank_difference() {
    let db = fresh_database().await;
    let catalog = seed_catalog(&db).await;
    let api = CatalogApi::new(db.clone());
    let game_id = catalog.game.id;
    let (iron, gold) = (catalog.ranks[0].id, catalog.ranks[3].id);

    let up = api.rank_difference(game_id, iron, gold).await.expect("Error computing difference");
    assert_eq!(up.steps, 3);
    assert_eq!(up.tier_difference, 3);
    let down = api.rank_difference(game_id, gold, iron).await.expect("Error computing difference");
    assert_eq!(down.steps, -3);
    let same = api.rank_difference(game_id, gold, gold).await.expect("Error computing difference");
    assert_eq!(same.steps, 0);

    let foreign = db
        .insert_rank(NewGameRank::new(catalog.retired_game.id, "Legend", 1))
        .await
        .expect("Error inserting rank");
    let err = api.rank_difference(game_id, iron, foreign.id).await.unwrap_err();
    assert!(matches!(err, CatalogError::RankGameMismatch { rank_id, .. } if rank_id == foreign.id));
    let err = api.rank_difference(game_id, 4242, iron).await.unwrap_err();
    assert!(matches!(err, CatalogError::RankNotFound(4242)));
    destroy_database(db).await;
}

#[tokio::test]
async fn inactive_games_are_hidden() {
    let db = fresh_database().await;
    let catalog = seed_catalog(&db).await;
    let api = CatalogApi::new(db.clone());

    let games = api.games(&GameQueryFilter::default()).await.expect("Error fetching games");
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].slug, "league-of-legends");
    assert!(api.game_by_slug("paragon").await.expect("Error fetching game").is_none());
    // Direct lookups by id still see it
    assert!(api.game_by_id(catalog.retired_game.id).await.expect("Error fetching game").is_some());

    let platforms = api.available_platforms().await.expect("Error fetching platforms");
    assert_eq!(platforms, vec!["PC".to_string()]);
    assert!(api.games_by_platform("PlayStation").await.expect("Error fetching games").is_empty());
    destroy_database(db).await;
}

#[tokio::test]
async fn search_games() {
    let db = fresh_database().await;
    seed_catalog(&db).await;
    let api = CatalogApi::new(db.clone());

    let found = api.search_games("LEGENDS", None).await.expect("Error searching");
    assert_eq!(found.len(), 1);
    assert!(api.search_games("   ", None).await.expect("Error searching").is_empty());
    assert!(api.search_games("parag", None).await.expect("Error searching").is_empty());
    // Wildcards are matched literally
    assert!(api.search_games("%", None).await.expect("Error searching").is_empty());
    destroy_database(db).await;
}

#[tokio::test]
async fn game_with_ranks_and_pages() {
    let db = fresh_database().await;
    seed_catalog(&db).await;
    let api = CatalogApi::new(db.clone());

    let game = api.game_with_ranks("league-of-legends").await.expect("Error fetching game").expect("Game not found");
    assert_eq!(game.ranks.len(), 5);
    assert!(api.game_with_ranks("no-such-game").await.expect("Error fetching game").is_none());

    let page = api.games_page(&GameQueryFilter::default(), Pagination::new(1, 10)).await.expect("Error paging");
    assert_eq!(page.pagination.total, 1);
    assert_eq!(page.pagination.total_pages, 1);
    let err = api.games_page(&GameQueryFilter::default(), Pagination::new(0, 10)).await.unwrap_err();
    assert!(matches!(err, CatalogError::InvalidPagination(_)));

    let services = api.service_types().await.expect("Error fetching service types");
    let names = services.iter().map(|s| s.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["Coaching", "Rank Boost"]);
    destroy_database(db).await;
}
