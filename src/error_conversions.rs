//! Error conversion glue between layers.
//!
//! The domain layer must not depend on store or service error types, so the
//! `From` impls that bridge them are collected here.

use diesel::r2d2::PoolError;

use crate::domain::types::TypeConstraintError;
use crate::forms::categories::CategoryFormError;
use crate::repository::RepositoryError;
use crate::services::ServiceError;
use crate::store::StoreError;

impl From<TypeConstraintError> for StoreError {
    fn from(val: TypeConstraintError) -> Self {
        StoreError::InvalidData(val.to_string())
    }
}

impl From<diesel::result::Error> for StoreError {
    fn from(val: diesel::result::Error) -> Self {
        StoreError::Transport(val.to_string())
    }
}

impl From<PoolError> for StoreError {
    fn from(val: PoolError) -> Self {
        StoreError::Transport(val.to_string())
    }
}

impl From<TypeConstraintError> for RepositoryError {
    fn from(val: TypeConstraintError) -> Self {
        RepositoryError::Sync(val.into())
    }
}

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<CategoryFormError> for ServiceError {
    fn from(val: CategoryFormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}
