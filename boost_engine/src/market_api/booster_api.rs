use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Actor, Booster, BoosterUpdate, Money, NewBoosterProfile, UserId},
    market_api::{
        booster_objects::{BoosterDashboardStats, BoosterQueryFilter, DEFAULT_BOOSTER_PAGE_SIZE, DEFAULT_TOP_BOOSTERS},
        catalog_api::{active_game, rank_in_game, DEFAULT_SEARCH_LIMIT},
        pagination::{Paginated, Pagination, MAX_PAGE_SIZE},
    },
    traits::{BoosterError, BoosterManagement, CatalogManagement},
};

/// `BoosterApi` manages booster profiles: registration, self-service edits, discovery and verification.
pub struct BoosterApi<B> {
    db: B,
}

impl<B> Debug for BoosterApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BoosterApi")
    }
}

impl<B> BoosterApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

fn check_profile_values(
    hourly_rate: Option<Money>,
    experience_years: Option<i64>,
) -> Result<(), BoosterError> {
    if hourly_rate.map(|r| r.value() < 0).unwrap_or(false) {
        return Err(BoosterError::InvalidProfile("hourly rate cannot be negative".into()));
    }
    if experience_years.map(|y| y < 0).unwrap_or(false) {
        return Err(BoosterError::InvalidProfile("experience cannot be negative".into()));
    }
    Ok(())
}

impl<B> BoosterApi<B>
where B: BoosterManagement + CatalogManagement
{
    /// Registers `user_id` as a booster for the profile's game. New profiles are unverified and available.
    pub async fn create_profile(&self, user_id: &UserId, profile: NewBoosterProfile) -> Result<Booster, BoosterError> {
        check_profile_values(Some(profile.hourly_rate), Some(profile.experience_years))?;
        let game = active_game(&self.db, profile.game_id).await?;
        self.check_ranks(game.id, profile.current_rank_id, profile.peak_rank_id).await?;
        let booster = self.db.insert_booster(user_id, profile).await?;
        info!("🧑‍🚀️ {user_id} registered as booster #{} for {}", booster.id, game.name);
        Ok(booster)
    }

    pub async fn profile(&self, user_id: &UserId, game_id: i64) -> Result<Option<Booster>, BoosterError> {
        self.db.fetch_booster_for_user_and_game(user_id, game_id).await
    }

    pub async fn my_profiles(&self, user_id: &UserId) -> Result<Vec<Booster>, BoosterError> {
        self.db.fetch_boosters_for_user(user_id).await
    }

    pub async fn booster_by_id(&self, id: i64) -> Result<Option<Booster>, BoosterError> {
        self.db.fetch_booster_by_id(id).await
    }

    /// Verified, available boosters matching the filter, best rated first.
    pub async fn available_boosters(&self, filter: BoosterQueryFilter) -> Result<Vec<Booster>, BoosterError> {
        let filter = filter.verified(true).available(true);
        self.db.search_boosters(&filter, None).await
    }

    /// Verified boosters matching the filter, one page at a time. Availability is only filtered on when requested.
    pub async fn boosters_page(
        &self,
        filter: BoosterQueryFilter,
        pagination: Pagination,
    ) -> Result<Paginated<Booster>, BoosterError> {
        let window = pagination.resolve(DEFAULT_BOOSTER_PAGE_SIZE)?;
        let filter = filter.verified(true);
        let (boosters, total) = self.db.fetch_boosters_page(&filter, window).await?;
        Ok(window.with_total(boosters, total))
    }

    pub async fn top_boosters(&self, game_id: i64, limit: Option<u32>) -> Result<Vec<Booster>, BoosterError> {
        let limit = limit.unwrap_or(DEFAULT_TOP_BOOSTERS).clamp(1, MAX_PAGE_SIZE);
        let filter = BoosterQueryFilter::default().for_game(game_id).verified(true).available(true);
        self.db.search_boosters(&filter, Some(limit)).await
    }

    /// Verified, available boosters whose username contains `term`. A blank term matches nothing.
    pub async fn search_boosters(
        &self,
        term: &str,
        game_id: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<Booster>, BoosterError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT).clamp(1, MAX_PAGE_SIZE);
        let mut filter = BoosterQueryFilter::default().verified(true).available(true);
        filter.game_id = game_id;
        filter.username = Some(term.to_string());
        self.db.search_boosters(&filter, Some(limit)).await
    }

    /// Applies a partial update to one of the caller's own profiles.
    pub async fn update_profile(
        &self,
        actor: &Actor,
        booster_id: i64,
        update: BoosterUpdate,
    ) -> Result<Booster, BoosterError> {
        if update.is_empty() {
            return Err(BoosterError::EmptyUpdate);
        }
        check_profile_values(update.hourly_rate, update.experience_years)?;
        let booster = self.owned_booster(actor, booster_id).await?;
        self.check_ranks(booster.game_id, update.current_rank_id, update.peak_rank_id).await?;
        let updated = self.db.update_booster(booster_id, update).await?;
        updated.ok_or(BoosterError::BoosterNotFound(booster_id))
    }

    pub async fn update_availability(
        &self,
        actor: &Actor,
        booster_id: i64,
        available: bool,
    ) -> Result<Booster, BoosterError> {
        self.owned_booster(actor, booster_id).await?;
        let updated = self.db.set_booster_availability(booster_id, available).await?;
        debug!("🧑‍🚀️ Booster #{booster_id} is now {}", if available { "available" } else { "unavailable" });
        updated.ok_or(BoosterError::BoosterNotFound(booster_id))
    }

    /// Deletes one of the caller's own profiles. Profiles with order history cannot be deleted.
    pub async fn delete_profile(&self, actor: &Actor, booster_id: i64) -> Result<(), BoosterError> {
        self.owned_booster(actor, booster_id).await?;
        if !self.db.delete_booster(booster_id).await? {
            return Err(BoosterError::BoosterNotFound(booster_id));
        }
        info!("🧑‍🚀️ Booster #{booster_id} deleted by {}", actor.user_id);
        Ok(())
    }

    /// Marks a booster as (un)verified. Only administrators may do this.
    pub async fn verify_booster(&self, actor: &Actor, booster_id: i64, verified: bool) -> Result<Booster, BoosterError> {
        if !actor.is_admin {
            warn!("🧑‍🚀️ {} tried to change the verification of booster #{booster_id}", actor.user_id);
            return Err(BoosterError::AdminOnly("verify boosters".into()));
        }
        let updated = self.db.set_booster_verified(booster_id, verified).await?;
        let booster = updated.ok_or(BoosterError::BoosterNotFound(booster_id))?;
        info!("🧑‍🚀️ Booster #{booster_id} verification set to {verified} by {}", actor.user_id);
        Ok(booster)
    }

    pub async fn dashboard(&self, user_id: &UserId) -> Result<BoosterDashboardStats, BoosterError> {
        self.db.fetch_booster_dashboard(user_id).await
    }

    async fn owned_booster(&self, actor: &Actor, booster_id: i64) -> Result<Booster, BoosterError> {
        let booster = self.db.fetch_booster_by_id(booster_id).await?.ok_or(BoosterError::BoosterNotFound(booster_id))?;
        if booster.user_id != actor.user_id {
            return Err(BoosterError::NotOwner(booster_id));
        }
        Ok(booster)
    }

    async fn check_ranks(&self, game_id: i64, current: Option<i64>, peak: Option<i64>) -> Result<(), BoosterError> {
        for rank_id in [current, peak].into_iter().flatten() {
            rank_in_game(&self.db, rank_id, game_id).await?;
        }
        Ok(())
    }
}
