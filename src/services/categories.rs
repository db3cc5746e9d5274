use crate::domain::types::CategoryId;
use crate::dto::categories::{CategoryDto, DisplayLanguages};
use crate::editor::EditorSession;
use crate::forms::categories::{
    CategoryForm, CategoryFormPayload, DeleteCategoryForm, DeleteCategoryFormPayload,
    MoveCategoryForm, MoveCategoryFormPayload,
};
use crate::repository::{CategoryRepository, CategorySnapshot, RepositoryError};
use crate::store::{CategoryStore, StoreError};

use super::{ServiceError, ServiceResult};

fn service_error(action: &str, err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::NotFound(id) => {
            log::warn!("Failed to {action}: category {id} not found");
            ServiceError::NotFound
        }
        RepositoryError::PartialReorder { .. }
        | RepositoryError::StaleSnapshot
        | RepositoryError::StaleRead(_) => {
            log::warn!("Failed to {action}: {err}");
            ServiceError::Conflict
        }
        RepositoryError::Sync(StoreError::Transport(ref e)) => {
            log::error!("Failed to {action}: {e}");
            ServiceError::Unavailable
        }
        RepositoryError::Sync(e) => {
            log::error!("Failed to {action}: {e}");
            ServiceError::Internal
        }
    }
}

fn to_dtos(snapshot: &CategorySnapshot, languages: &DisplayLanguages) -> Vec<CategoryDto> {
    snapshot
        .iter()
        .map(|category| CategoryDto::new(category, languages))
        .collect()
}

/// Categories of the current snapshot, in display order.
pub fn show_categories<S>(
    repo: &CategoryRepository<S>,
    languages: &DisplayLanguages,
) -> Vec<CategoryDto>
where
    S: CategoryStore,
{
    to_dtos(&repo.snapshot(), languages)
}

/// Reloads the catalog from the store and returns it.
pub async fn refresh_categories<S>(
    repo: &CategoryRepository<S>,
    languages: &DisplayLanguages,
) -> ServiceResult<Vec<CategoryDto>>
where
    S: CategoryStore,
{
    match repo.load().await {
        Ok(snapshot) => Ok(to_dtos(&snapshot, languages)),
        Err(e) => Err(service_error("load categories", e)),
    }
}

/// Starts an editor for a new category or for one in the current snapshot.
pub fn open_editor<S>(
    repo: &CategoryRepository<S>,
    category_id: Option<CategoryId>,
) -> ServiceResult<EditorSession>
where
    S: CategoryStore,
{
    let Some(id) = category_id else {
        return Ok(EditorSession::open(None));
    };

    let snapshot = repo.snapshot();
    match snapshot.get(id) {
        Some(category) => Ok(EditorSession::open(Some(category))),
        None => Err(ServiceError::NotFound),
    }
}

/// Applies a submitted form to the editor and commits it.
pub async fn save_category<S>(
    mut session: EditorSession,
    form: CategoryForm,
    repo: &CategoryRepository<S>,
    languages: &DisplayLanguages,
) -> ServiceResult<CategoryDto>
where
    S: CategoryStore,
{
    let payload = CategoryFormPayload::try_from(form)?;
    payload.apply_to(&mut session);

    match session.commit(repo).await {
        Ok(category) => Ok(CategoryDto::new(&category, languages)),
        Err(e) => Err(service_error("save category", e)),
    }
}

/// Shows or hides a category.
pub async fn set_category_active<S>(
    category_id: CategoryId,
    is_active: bool,
    repo: &CategoryRepository<S>,
) -> ServiceResult<()>
where
    S: CategoryStore,
{
    match repo.set_active(category_id, is_active).await {
        Ok(_) => Ok(()),
        Err(e) => Err(service_error("toggle category", e)),
    }
}

/// Moves a category to the dropped position; returns the position it landed at.
pub async fn move_category<S>(
    form: MoveCategoryForm,
    repo: &CategoryRepository<S>,
) -> ServiceResult<usize>
where
    S: CategoryStore,
{
    let payload = MoveCategoryFormPayload::try_from(form)?;

    match repo.reorder(payload.category_id, payload.position).await {
        Ok(position) => Ok(position),
        Err(e) => Err(service_error("move category", e)),
    }
}

pub async fn delete_category<S>(
    form: DeleteCategoryForm,
    repo: &CategoryRepository<S>,
) -> ServiceResult<()>
where
    S: CategoryStore,
{
    let payload = DeleteCategoryFormPayload::try_from(form)?;

    match repo.remove(payload.category_id).await {
        Ok(()) => Ok(()),
        Err(e) => Err(service_error("delete category", e)),
    }
}
