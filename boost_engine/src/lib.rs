//! Boost Market Engine
//!
//! The engine holds the core logic of the Boost Market, a marketplace where players order rank boosts and other
//! services for competitive games, and verified boosters fulfil them.
//!
//! The library is divided into three main sections:
//! 1. Storage ([`traits`] and the Sqlite backend). You should never need to touch the database directly; use the public
//!    APIs instead. The data types stored in the database live in [`db_types`] and are public.
//! 2. The public API ([`market_api`]): catalog browsing, booster profiles, the order lifecycle and user accounts.
//! 3. Events ([`events`]). Order lifecycle changes are published to any hooks you register, so that notifications and
//!    other side effects stay out of the request path.
pub mod db_types;
pub mod events;
pub mod market_api;
pub mod pricing;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod traits;

pub use market_api::{
    accounts_api::AccountApi,
    booster_api::BoosterApi,
    catalog_api::CatalogApi,
    order_flow_api::OrderFlowApi,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{
    AccountError,
    AccountManagement,
    BoosterError,
    BoosterManagement,
    CatalogError,
    CatalogManagement,
    MarketplaceDatabase,
    OrderFlowError,
    OrderManagement,
};
