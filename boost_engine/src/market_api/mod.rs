//! # Boost Market engine public API
//!
//! The `market_api` module exposes the programmatic API of the marketplace. Each API covers one area and is generic
//! over the storage backend traits it needs, so callers only pay for what they use.
//!
//! * [`catalog_api`] browses games, rank ladders and service types, and computes rank distances.
//! * [`booster_api`] registers, edits, verifies and discovers booster profiles.
//! * [`order_flow_api`] prices orders and drives them through their lifecycle, publishing events as it goes.
//! * [`accounts_api`] manages user profiles and the player dashboard.
//!
//! The `*_objects` modules hold the request and response types for each API, and [`pagination`] the shared paging
//! types.
//!
//! # API usage
//!
//! ```rust,ignore
//! use boost_engine::{CatalogApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/boost_market.db", 5).await?;
//! let api = CatalogApi::new(db);
//! let games = api.search_games("league", None).await?;
//! ```

pub mod accounts_api;
pub mod booster_api;
pub mod booster_objects;
pub mod catalog_api;
pub mod catalog_objects;
pub mod order_flow_api;
pub mod order_objects;
pub mod pagination;
