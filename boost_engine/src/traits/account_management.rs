use thiserror::Error;

use crate::{
    db_types::{UpdateUserProfile, UserId, UserProfile},
    market_api::order_objects::PlayerDashboardStats,
};

#[derive(Debug, Clone, Error)]
pub enum AccountError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),
    #[error("The username '{0}' is already taken")]
    UsernameTaken(String),
}

impl From<sqlx::Error> for AccountError {
    fn from(e: sqlx::Error) -> Self {
        AccountError::DatabaseError(e.to_string())
    }
}

/// The `AccountManagement` trait keeps the marketplace's view of users, who are otherwise managed by the external
/// identity provider. A profile is created the first time a user is seen.
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    async fn fetch_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, AccountError>;

    /// Returns the user's profile, creating a default one if none exists yet.
    async fn fetch_or_create_profile(&self, user_id: &UserId) -> Result<UserProfile, AccountError>;

    /// Applies the fields present in `update`, creating the profile first if needed.
    async fn update_profile(&self, user_id: &UserId, update: UpdateUserProfile) -> Result<UserProfile, AccountError>;

    async fn fetch_player_dashboard(&self, user_id: &UserId) -> Result<PlayerDashboardStats, AccountError>;
}
