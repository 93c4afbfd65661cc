#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

use repcoach_domain as domain;

pub mod memory;
pub mod seed;
#[allow(clippy::module_name_repetitions)]
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::{SqliteError, SqliteStore};

/// Access to the training catalog as a whole.
#[allow(async_fn_in_trait)]
pub trait CatalogStore {
    /// Replaces the training catalog held by a store.
    async fn import_catalog(&self, catalog: &domain::Catalog) -> Result<(), domain::UpdateError>;
    async fn export_catalog(&self) -> Result<domain::Catalog, domain::ReadError>;
}
