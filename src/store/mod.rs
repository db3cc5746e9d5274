//! Adapters for the persistent category store.
//!
//! A [`CategoryStore`] performs row-level CRUD and nothing else; ordering rules
//! and snapshot bookkeeping live in [`crate::repository`].

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::category::{Category, NewCategory, OrderChange};
use crate::domain::translation::Translation;
use crate::domain::types::{CategoryId, EstablishmentId};

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryCategoryStore;
pub use sqlite::SqliteCategoryStore;

/// Failures reported by a store adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or rejected the request.
    #[error("store unavailable: {0}")]
    Transport(String),
    /// The targeted row does not exist in the store.
    #[error("category {0} not found in store")]
    NotFound(CategoryId),
    /// A row could not be converted to or from its domain representation.
    #[error("invalid category data: {0}")]
    InvalidData(String),
}

/// Convenient alias for results returned from store adapters.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of a multi-row `order_index` write.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("order update failed after {applied} row(s): {source}")]
pub struct BatchWriteError {
    /// Number of leading changes from the batch that the store applied.
    pub applied: usize,
    #[source]
    pub source: StoreError,
}

/// Row-level access to the categories of an establishment.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// List all categories of an establishment ordered by `order_index` ascending.
    async fn list_categories(&self, establishment_id: EstablishmentId)
    -> StoreResult<Vec<Category>>;

    /// Insert a category and return it with its assigned identifier.
    async fn insert_category(&self, category: &NewCategory) -> StoreResult<Category>;

    /// Replace the name and activation flag of a category.
    async fn update_category(
        &self,
        id: CategoryId,
        name: &Translation,
        is_active: bool,
    ) -> StoreResult<()>;

    /// Persist a single `order_index`.
    async fn update_order_index(&self, change: OrderChange) -> StoreResult<()>;

    /// Persist several `order_index` values.
    ///
    /// The default applies the changes one by one and stops at the first
    /// failure. Adapters with transactions should override this so that a
    /// failure leaves nothing applied.
    async fn update_order_indices(&self, changes: &[OrderChange]) -> Result<(), BatchWriteError> {
        for (applied, change) in changes.iter().enumerate() {
            if let Err(source) = self.update_order_index(*change).await {
                return Err(BatchWriteError { applied, source });
            }
        }
        Ok(())
    }

    /// Delete a category.
    async fn delete_category(&self, id: CategoryId) -> StoreResult<()>;
}
