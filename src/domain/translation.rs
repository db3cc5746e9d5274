//! Multilingual display names.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::types::{LanguageCode, TypeConstraintError};

/// Immutable mapping from language code to display text.
///
/// Empty strings are never stored: setting a language to `""` removes it, so a
/// missing key and an empty value are indistinguishable. Derived equality
/// therefore compares only non-empty entries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, String>",
    into = "BTreeMap<String, String>"
)]
pub struct Translation {
    entries: BTreeMap<LanguageCode, Arc<str>>,
}

impl Translation {
    /// An empty translation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the text stored for `language`, or `""` when absent.
    pub fn get(&self, language: &LanguageCode) -> &str {
        self.entries.get(language).map(AsRef::as_ref).unwrap_or("")
    }

    /// Returns a copy with `language` set to `text`.
    ///
    /// Unmodified entries share their text with `self`.
    pub fn with<S: AsRef<str>>(&self, language: LanguageCode, text: S) -> Self {
        let mut entries = self.entries.clone();
        let text = text.as_ref();
        if text.is_empty() {
            entries.remove(&language);
        } else {
            entries.insert(language, Arc::from(text));
        }
        Self { entries }
    }

    /// Text for `language`, or `placeholder` when no text is stored.
    pub fn display<'a>(&'a self, language: &LanguageCode, placeholder: &'a str) -> &'a str {
        match self.get(language) {
            "" => placeholder,
            text => text,
        }
    }

    /// `true` when no language carries text.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Languages that carry text, in code order.
    pub fn languages(&self) -> impl Iterator<Item = &LanguageCode> {
        self.entries.keys()
    }

    /// Non-empty entries in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&LanguageCode, &str)> {
        self.entries.iter().map(|(lang, text)| (lang, text.as_ref()))
    }
}

impl TryFrom<BTreeMap<String, String>> for Translation {
    type Error = TypeConstraintError;

    fn try_from(value: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let mut seen = BTreeSet::new();
        let mut entries = BTreeMap::new();
        for (raw, text) in value {
            let language = LanguageCode::new(raw.as_str())?;
            if !seen.insert(language.clone()) {
                return Err(TypeConstraintError::InvalidLanguageCode(format!(
                    "{raw} duplicates {}",
                    language.as_str()
                )));
            }
            if !text.is_empty() {
                entries.insert(language, Arc::from(text));
            }
        }
        Ok(Self { entries })
    }
}

impl From<Translation> for BTreeMap<String, String> {
    fn from(value: Translation) -> Self {
        value
            .entries
            .into_iter()
            .map(|(lang, text)| (lang.into(), text.to_string()))
            .collect()
    }
}
