//! Create-or-edit workflow for a single category.
//!
//! An [`EditorSession`] holds a draft name and a lookup key for the category
//! being edited. It never owns category data: committing hands the draft to
//! the [`CategoryRepository`], which stays the source of truth.

use crate::domain::category::Category;
use crate::domain::translation::Translation;
use crate::domain::types::{CategoryId, LanguageCode};
use crate::repository::{CategoryRepository, RepositoryResult};
use crate::store::CategoryStore;

/// Activation flag given to categories created through the editor.
pub const DEFAULT_ACTIVE: bool = true;

/// What a session will write on commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorTarget {
    New,
    Existing { id: CategoryId, is_active: bool },
}

/// Draft state for one editor workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSession {
    target: EditorTarget,
    draft: Translation,
    active_override: Option<bool>,
}

impl EditorSession {
    /// Opens the editor for `existing`, or for a new category when `None`.
    pub fn open(existing: Option<&Category>) -> Self {
        match existing {
            Some(category) => Self {
                target: EditorTarget::Existing {
                    id: category.id,
                    is_active: category.is_active,
                },
                draft: category.name.clone(),
                active_override: None,
            },
            None => Self {
                target: EditorTarget::New,
                draft: Translation::new(),
                active_override: None,
            },
        }
    }

    pub fn target(&self) -> EditorTarget {
        self.target
    }

    pub fn is_new(&self) -> bool {
        self.target == EditorTarget::New
    }

    pub fn draft(&self) -> &Translation {
        &self.draft
    }

    /// Sets one language of the draft name.
    pub fn set_field<S: AsRef<str>>(&mut self, language: LanguageCode, text: S) -> &Translation {
        self.draft = self.draft.with(language, text);
        &self.draft
    }

    /// Overrides the activation flag written on commit.
    pub fn set_active(&mut self, is_active: bool) {
        self.active_override = Some(is_active);
    }

    /// Activation flag the commit will write.
    pub fn is_active(&self) -> bool {
        match (self.active_override, self.target) {
            (Some(is_active), _) => is_active,
            (None, EditorTarget::New) => DEFAULT_ACTIVE,
            (None, EditorTarget::Existing { is_active, .. }) => is_active,
        }
    }

    /// Writes the draft through the repository, consuming the session.
    ///
    /// On error the session is gone as well; the caller re-opens it from
    /// the repository's snapshot if it wants to retry.
    pub async fn commit<S>(self, repository: &CategoryRepository<S>) -> RepositoryResult<Category>
    where
        S: CategoryStore,
    {
        let is_active = self.is_active();
        match self.target {
            EditorTarget::New => repository.create(self.draft, is_active).await,
            EditorTarget::Existing { id, .. } => repository.update(id, self.draft, is_active).await,
        }
    }

    /// Discards the draft.
    pub fn cancel(self) {}
}
