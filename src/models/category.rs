use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::category::{Category as DomainCategory, NewCategory as DomainNewCategory};
use crate::domain::translation::Translation;
use crate::domain::types::{OrderIndex, TypeConstraintError};

/// Diesel model representing the `categories` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::categories)]
pub struct Category {
    pub id: i32,
    pub establishment_id: i32,
    /// JSON object mapping language code to text.
    pub name: String,
    pub is_active: bool,
    pub order_index: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable form of [`Category`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::categories)]
pub struct NewCategory {
    pub establishment_id: i32,
    pub name: String,
    pub is_active: bool,
    pub order_index: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Encodes a translation for the `name` column.
pub fn encode_name(name: &Translation) -> Result<String, TypeConstraintError> {
    serde_json::to_string(name)
        .map_err(|e| TypeConstraintError::InvalidValue(format!("category name: {e}")))
}

fn decode_name(raw: &str) -> Result<Translation, TypeConstraintError> {
    serde_json::from_str(raw)
        .map_err(|e| TypeConstraintError::InvalidValue(format!("category name: {e}")))
}

impl TryFrom<Category> for DomainCategory {
    type Error = TypeConstraintError;

    fn try_from(category: Category) -> Result<Self, Self::Error> {
        Ok(Self {
            id: category.id.try_into()?,
            name: decode_name(&category.name)?,
            is_active: category.is_active,
            order_index: OrderIndex::new(category.order_index)?,
        })
    }
}

impl TryFrom<&DomainNewCategory> for NewCategory {
    type Error = TypeConstraintError;

    fn try_from(category: &DomainNewCategory) -> Result<Self, Self::Error> {
        let now = chrono::Utc::now().naive_utc();
        Ok(Self {
            establishment_id: category.establishment_id.get(),
            name: encode_name(&category.name)?,
            is_active: category.is_active,
            order_index: category.order_index.get(),
            created_at: now,
            updated_at: now,
        })
    }
}
