use crate::traits::{AccountManagement, BoosterManagement, CatalogManagement, OrderManagement};

/// This trait defines the highest level of behaviour for backends supporting the marketplace engine. A backend is a
/// cheaply cloneable handle onto the store that implements every management trait.
#[allow(async_fn_in_trait)]
pub trait MarketplaceDatabase:
    Clone + CatalogManagement + BoosterManagement + OrderManagement + AccountManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Closes every connection to the store.
    async fn close(&mut self) -> Result<(), sqlx::Error>;
}
