//! A small, fixed catalog for tests: one game with a five-rank ladder, two service types, and a second inactive game.
use boost_engine::{
    db_types::{Booster, Game, GameRank, Money, NewBoosterProfile, NewGame, NewGameRank, NewServiceType, ServiceType, UserId},
    traits::{BoosterManagement, CatalogManagement},
};

#[derive(Debug, Clone)]
pub struct SeededCatalog {
    pub game: Game,
    pub retired_game: Game,
    /// Lowest first.
    pub ranks: Vec<GameRank>,
    pub rank_boost: ServiceType,
    pub coaching: ServiceType,
}

pub async fn seed_catalog<B: CatalogManagement>(db: &B) -> SeededCatalog {
    let game = db
        .insert_game(NewGame::new("League of Legends", "league-of-legends").with_platforms(["PC"]))
        .await
        .expect("Error inserting game");
    let retired_game = db
        .insert_game(NewGame::new("Paragon", "paragon").with_platforms(["PC", "PlayStation"]).inactive())
        .await
        .expect("Error inserting game");
    let mut ranks = Vec::new();
    for (tier, name) in ["Iron", "Bronze", "Silver", "Gold", "Platinum"].into_iter().enumerate() {
        let tier = tier as i64 + 1;
        let rank = NewGameRank::new(game.id, name, tier).with_mmr(tier * 400, tier * 400 + 399);
        ranks.push(db.insert_rank(rank).await.expect("Error inserting rank"));
    }
    let rank_boost =
        db.insert_service_type(NewServiceType::new("Rank Boost", "rank-boost")).await.expect("Error inserting service");
    let coaching =
        db.insert_service_type(NewServiceType::new("Coaching", "coaching")).await.expect("Error inserting service");
    SeededCatalog { game, retired_game, ranks, rank_boost, coaching }
}

/// Registers `user` as a verified booster for `game_id`.
pub async fn verified_booster<B: BoosterManagement>(db: &B, user: &str, game_id: i64) -> Booster {
    let profile = NewBoosterProfile::new(game_id, Money::from_dollars(20)).with_regions(["EUW"]).with_languages(["en"]);
    let booster = db.insert_booster(&UserId::from(user), profile).await.expect("Error inserting booster");
    db.set_booster_verified(booster.id, true).await.expect("Error verifying booster").expect("Booster vanished")
}
