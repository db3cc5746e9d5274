use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::category::Category;
use crate::domain::types::{LanguageCode, TypeConstraintError};

/// Which languages a category list shows and what to show when one is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayLanguages {
    pub primary: LanguageCode,
    pub secondary: Option<LanguageCode>,
    /// Shown when the primary language has no text.
    pub untitled: String,
    /// Shown when the secondary language has no text.
    pub untranslated: String,
}

pub const DEFAULT_UNTITLED: &str = "İsimsiz";
pub const DEFAULT_UNTRANSLATED: &str = "No English";

impl DisplayLanguages {
    pub fn new(primary: LanguageCode, secondary: Option<LanguageCode>) -> Self {
        Self {
            primary,
            secondary,
            untitled: DEFAULT_UNTITLED.to_string(),
            untranslated: DEFAULT_UNTRANSLATED.to_string(),
        }
    }

    /// Builds the display setup from a preference list, primary first.
    pub fn from_codes<S: AsRef<str>>(codes: &[S]) -> Result<Self, TypeConstraintError> {
        let mut codes = codes.iter().map(|code| LanguageCode::new(code.as_ref()));
        let primary = codes
            .next()
            .ok_or(TypeConstraintError::EmptyString("languages"))??;
        let secondary = codes.next().transpose()?;
        Ok(Self::new(primary, secondary))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryDto {
    pub id: i32,
    pub title: String,
    pub subtitle: Option<String>,
    pub names: BTreeMap<String, String>,
    pub is_active: bool,
    pub order_index: i32,
}

impl CategoryDto {
    pub fn new(category: &Category, languages: &DisplayLanguages) -> Self {
        let name = &category.name;
        Self {
            id: category.id.get(),
            title: name
                .display(&languages.primary, &languages.untitled)
                .to_string(),
            subtitle: languages
                .secondary
                .as_ref()
                .map(|lang| name.display(lang, &languages.untranslated).to_string()),
            names: name.clone().into(),
            is_active: category.is_active,
            order_index: category.order_index.get(),
        }
    }
}
