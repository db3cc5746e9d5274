use serde::{Deserialize, Serialize};

use crate::domain::translation::Translation;
use crate::domain::types::{CategoryId, EstablishmentId, OrderIndex};

/// Menu category as confirmed by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: Translation,
    pub is_active: bool,
    pub order_index: OrderIndex,
}

/// Data required to insert a new [`Category`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub establishment_id: EstablishmentId,
    pub name: Translation,
    pub is_active: bool,
    pub order_index: OrderIndex,
}

impl NewCategory {
    /// Attaches the store-assigned identifier.
    pub fn into_category(self, id: CategoryId) -> Category {
        Category {
            id,
            name: self.name,
            is_active: self.is_active,
            order_index: self.order_index,
        }
    }
}

/// A single `order_index` reassignment to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderChange {
    pub id: CategoryId,
    pub order_index: OrderIndex,
}
