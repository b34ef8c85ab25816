//! # Storage backend contracts
//!
//! This module defines the behaviour a database backend must expose in order to drive the marketplace engine.
//!
//! * [`MarketplaceDatabase`] ties the traits below together and is what the public APIs are generic over.
//! * [`CatalogManagement`] reads (and seeds) games, rank ladders and service types.
//! * [`BoosterManagement`] manages per-game booster profiles.
//! * [`OrderManagement`] stores orders and applies the conditional writes of the order lifecycle.
//! * [`AccountManagement`] mirrors users of the identity provider as marketplace profiles.
mod account_management;
mod booster_management;
mod catalog_management;
mod marketplace_database;
mod order_management;

pub use account_management::{AccountError, AccountManagement};
pub use booster_management::{BoosterError, BoosterManagement};
pub use catalog_management::{CatalogError, CatalogManagement};
pub use marketplace_database::MarketplaceDatabase;
pub use order_management::{OrderFlowError, OrderManagement};
