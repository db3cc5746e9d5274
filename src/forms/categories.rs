use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::types::{CategoryId, LanguageCode, TypeConstraintError};
use crate::editor::EditorSession;

/// Longest category name accepted per language.
pub const MAX_NAME_LENGTH: usize = 128;
// `validator` length bounds are `u64`.
const MAX_NAME_LENGTH_U64: u64 = MAX_NAME_LENGTH as u64;

#[derive(Debug, Error)]
pub enum CategoryFormError {
    #[error("Category form validation failed: {0}")]
    Validation(String),
    #[error("Category form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for CategoryFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for CategoryFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

/// Editor form with the Turkish and English names of a category.
#[derive(Deserialize, Validate)]
pub struct CategoryForm {
    #[validate(length(max = MAX_NAME_LENGTH_U64))]
    #[serde(default)]
    pub name_tr: String,
    #[validate(length(max = MAX_NAME_LENGTH_U64))]
    #[serde(default)]
    pub name_en: String,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryFormPayload {
    /// Trimmed text per language; empty text clears the language.
    pub names: Vec<(LanguageCode, String)>,
    pub is_active: Option<bool>,
}

impl CategoryFormPayload {
    /// Copies the submitted fields into an editor draft.
    pub fn apply_to(self, session: &mut EditorSession) {
        for (language, text) in self.names {
            session.set_field(language, text);
        }
        if let Some(is_active) = self.is_active {
            session.set_active(is_active);
        }
    }
}

impl TryFrom<CategoryForm> for CategoryFormPayload {
    type Error = CategoryFormError;

    fn try_from(value: CategoryForm) -> Result<Self, Self::Error> {
        value.validate()?;

        let names = vec![
            (LanguageCode::new("tr")?, value.name_tr.trim().to_string()),
            (LanguageCode::new("en")?, value.name_en.trim().to_string()),
        ];
        if names.iter().all(|(_, text)| text.is_empty()) {
            return Err(TypeConstraintError::EmptyString("category name").into());
        }

        Ok(Self {
            names,
            is_active: value.is_active,
        })
    }
}

/// Drop target of a drag-and-drop move.
#[derive(Deserialize, Validate)]
pub struct MoveCategoryForm {
    #[validate(range(min = 1))]
    pub category_id: i32,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveCategoryFormPayload {
    pub category_id: CategoryId,
    pub position: usize,
}

impl TryFrom<MoveCategoryForm> for MoveCategoryFormPayload {
    type Error = CategoryFormError;

    fn try_from(value: MoveCategoryForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            category_id: CategoryId::new(value.category_id)?,
            position: value.position,
        })
    }
}

#[derive(Deserialize, Validate)]
pub struct DeleteCategoryForm {
    #[validate(range(min = 1))]
    pub category_id: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteCategoryFormPayload {
    pub category_id: CategoryId,
}

impl TryFrom<DeleteCategoryForm> for DeleteCategoryFormPayload {
    type Error = CategoryFormError;

    fn try_from(value: DeleteCategoryForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            category_id: CategoryId::new(value.category_id)?,
        })
    }
}
