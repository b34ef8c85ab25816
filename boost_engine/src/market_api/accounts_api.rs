//! User profiles and the player's dashboard.

use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{UpdateUserProfile, UserId, UserProfile},
    market_api::order_objects::PlayerDashboardStats,
    traits::{AccountError, AccountManagement},
};

const MAX_USERNAME_LENGTH: usize = 32;

/// The `AccountApi` gives users access to their own marketplace profile.
pub struct AccountApi<B> {
    db: B,
}

impl<B> Debug for AccountApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountApi")
    }
}

impl<B> AccountApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> AccountApi<B>
where B: AccountManagement
{
    /// The caller's profile. A fresh player profile is created the first time a user is seen.
    pub async fn my_profile(&self, user_id: &UserId) -> Result<UserProfile, AccountError> {
        self.db.fetch_or_create_profile(user_id).await
    }

    pub async fn profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, AccountError> {
        self.db.fetch_profile(user_id).await
    }

    pub async fn update_profile(
        &self,
        user_id: &UserId,
        mut update: UpdateUserProfile,
    ) -> Result<UserProfile, AccountError> {
        if let Some(name) = update.username.take() {
            let name = name.trim().to_string();
            if name.is_empty() || name.len() > MAX_USERNAME_LENGTH {
                return Err(AccountError::InvalidProfile(format!(
                    "usernames must be between 1 and {MAX_USERNAME_LENGTH} characters"
                )));
            }
            update.username = Some(name);
        }
        if update.timezone.as_deref().map(|tz| tz.trim().is_empty()).unwrap_or(false) {
            return Err(AccountError::InvalidProfile("timezone cannot be blank".into()));
        }
        let profile = self.db.update_profile(user_id, update).await?;
        debug!("👤️ Profile for {user_id} updated");
        Ok(profile)
    }

    pub async fn dashboard(&self, user_id: &UserId) -> Result<PlayerDashboardStats, AccountError> {
        self.db.fetch_player_dashboard(user_id).await
    }
}
