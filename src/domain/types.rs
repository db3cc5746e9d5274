//! Strongly-typed value objects used by domain entities.
//!
//! Domain structs should carry these wrappers instead of raw primitives so that
//! identifiers, ordering positions and language codes are enforced at the
//! boundary.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Errors produced when attempting to construct constrained domain types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// An identifier was zero or negative.
    #[error("{0} must be greater than zero")]
    NonPositiveId(&'static str),
    /// A numeric value required to be non-negative was negative.
    #[error("{0} must be zero or greater")]
    NegativeNumber(&'static str),
    /// A string was empty or whitespace-only after trimming.
    #[error("{0} cannot be empty")]
    EmptyString(&'static str),
    /// A language code did not look like `xx` or `xx-yy`.
    #[error("invalid language code: {0}")]
    InvalidLanguageCode(String),
    /// Catch-all for custom validation failures.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(
            Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
        )]
        #[serde(try_from = "i32", into = "i32")]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId($field))
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<i32> for $name {
            fn eq(&self, other: &i32) -> bool {
                self.0 == *other
            }
        }

        impl PartialEq<$name> for i32 {
            fn eq(&self, other: &$name) -> bool {
                *self == other.0
            }
        }
    };
}

id_newtype!(
    EstablishmentId,
    "Unique identifier for the establishment owning a menu.",
    "establishment_id"
);
id_newtype!(
    CategoryId,
    "Unique identifier for a category, assigned by the store.",
    "category_id"
);

/// Display position of a category within its establishment.
///
/// Positions are zero-based; a well-formed menu holds exactly the values
/// `0..n` for `n` categories.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "i32", into = "i32")]
pub struct OrderIndex(i32);

impl OrderIndex {
    /// The first position in a menu.
    pub const ZERO: Self = Self(0);

    /// Constructs a value that must be zero or greater.
    pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
        if value >= 0 {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::NegativeNumber("order_index"))
        }
    }

    /// Builds an index from a position in an ordered sequence.
    pub fn from_position(position: usize) -> Result<Self, TypeConstraintError> {
        i32::try_from(position)
            .map_err(|_| TypeConstraintError::InvalidValue(format!("order_index: {position}")))
            .and_then(Self::new)
    }

    /// Returns the raw `i32` value.
    pub const fn get(self) -> i32 {
        self.0
    }

    /// The position immediately after this one.
    pub fn next(self) -> Result<Self, TypeConstraintError> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or_else(|| TypeConstraintError::InvalidValue("order_index overflow".to_string()))
    }
}

impl Display for OrderIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i32> for OrderIndex {
    type Error = TypeConstraintError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OrderIndex> for i32 {
    fn from(value: OrderIndex) -> Self {
        value.0
    }
}

impl PartialEq<i32> for OrderIndex {
    fn eq(&self, other: &i32) -> bool {
        self.0 == *other
    }
}

/// Lowercased language tag such as `tr`, `en` or `pt-br`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Validates and normalizes a language tag.
    ///
    /// Accepts a 2-8 letter primary subtag optionally followed by `-` or `_`
    /// and a 2-8 alphanumeric region subtag.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_lowercase().replace('_', "-");
        if normalized.is_empty() {
            return Err(TypeConstraintError::EmptyString("language code"));
        }

        let mut parts = normalized.split('-');
        let primary = parts.next().unwrap_or_default();
        let region = parts.next();
        let valid_primary =
            (2..=8).contains(&primary.len()) && primary.chars().all(|c| c.is_ascii_lowercase());
        let valid_region = region.is_none_or(|r| {
            (2..=8).contains(&r.len()) && r.chars().all(|c| c.is_ascii_alphanumeric())
        });
        if !valid_primary || !valid_region || parts.next().is_some() {
            return Err(TypeConstraintError::InvalidLanguageCode(raw));
        }

        Ok(Self(normalized))
    }

    /// Borrow the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for LanguageCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for LanguageCode {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LanguageCode> for String {
    fn from(value: LanguageCode) -> Self {
        value.0
    }
}

impl PartialEq<&str> for LanguageCode {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}
