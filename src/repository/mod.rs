//! In-memory ordered category catalog kept in step with a [`CategoryStore`].
//!
//! The repository is the only owner of category data. Consumers read
//! immutable [`CategorySnapshot`]s; every mutation round-trips through the
//! store and only a confirmed write replaces the snapshot.
//!
//! Mutations are serialized through a FIFO async mutex. Loads do not queue
//! behind writes; instead a generation counter, odd while a write is in
//! flight, lets a load detect that a write overlapped it and re-issue the
//! read rather than overwrite the write's effect.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::category::{Category, NewCategory, OrderChange};
use crate::domain::translation::Translation;
use crate::domain::types::{CategoryId, EstablishmentId};
use crate::store::{BatchWriteError, CategoryStore, StoreError};

pub mod ordering;

/// Number of reads `load` issues before giving up on a busy catalog.
pub const MAX_LOAD_ATTEMPTS: usize = 3;

/// Errors surfaced by [`CategoryRepository`] operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// A single-row write or a read failed; the snapshot is unchanged.
    #[error("failed to synchronize with store: {0}")]
    Sync(StoreError),
    /// The category is not part of the current snapshot or the store.
    #[error("category {0} not found")]
    NotFound(CategoryId),
    /// A multi-row renumber stopped part-way; the catalog must be reloaded.
    #[error("order update stopped after {applied} row(s); reload required")]
    PartialReorder {
        applied: usize,
        last_applied: Option<OrderChange>,
        #[source]
        source: StoreError,
    },
    /// An earlier partial reorder left the snapshot behind the store.
    #[error("category snapshot is out of sync with the store; reload required")]
    StaleSnapshot,
    /// Writes kept landing while `load` was reading.
    #[error("catalog changed during each of {0} load attempt(s)")]
    StaleRead(usize),
}

impl From<StoreError> for RepositoryError {
    fn from(val: StoreError) -> Self {
        match val {
            StoreError::NotFound(id) => RepositoryError::NotFound(id),
            other => RepositoryError::Sync(other),
        }
    }
}

/// Convenient alias for results returned from repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Immutable view of the catalog at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategorySnapshot {
    version: u64,
    items: Vec<Category>,
}

impl CategorySnapshot {
    /// Monotonic counter bumped on every applied load or write.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Categories ordered by `order_index` ascending.
    pub fn items(&self) -> &[Category] {
        &self.items
    }

    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.items.iter().find(|c| c.id == id)
    }

    /// Zero-based display position of a category.
    pub fn position_of(&self, id: CategoryId) -> Option<usize> {
        self.items.iter().position(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Category> {
        self.items.iter()
    }
}

struct State {
    snapshot: Arc<CategorySnapshot>,
    /// Even when idle, odd while a write is in flight.
    generation: u64,
    desynchronized: bool,
}

/// Ordered category catalog for one establishment.
pub struct CategoryRepository<S> {
    store: S,
    establishment_id: EstablishmentId,
    state: RwLock<State>,
    writer: Mutex<()>,
}

/// Marks a write as in flight until it is dropped.
struct WriteTicket<'a> {
    state: &'a RwLock<State>,
    base: Arc<CategorySnapshot>,
}

impl WriteTicket<'_> {
    fn base(&self) -> &CategorySnapshot {
        &self.base
    }

    fn commit(self, items: Vec<Category>) -> Arc<CategorySnapshot> {
        let mut state = write_state(self.state);
        let next = Arc::new(CategorySnapshot {
            version: state.snapshot.version + 1,
            items,
        });
        state.snapshot = next.clone();
        next
    }

    fn desynchronize(self) {
        write_state(self.state).desynchronized = true;
    }
}

impl Drop for WriteTicket<'_> {
    fn drop(&mut self) {
        write_state(self.state).generation += 1;
    }
}

// The guarded data is replaced wholesale, never left half-written, so a
// poisoned lock still holds a consistent value.
fn read_state(state: &RwLock<State>) -> RwLockReadGuard<'_, State> {
    state.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_state(state: &RwLock<State>) -> RwLockWriteGuard<'_, State> {
    state.write().unwrap_or_else(PoisonError::into_inner)
}

impl<S> CategoryRepository<S>
where
    S: CategoryStore,
{
    /// Create an empty repository. Call [`Self::load`] to populate it.
    pub fn new(store: S, establishment_id: EstablishmentId) -> Self {
        Self {
            store,
            establishment_id,
            state: RwLock::new(State {
                snapshot: Arc::new(CategorySnapshot::default()),
                generation: 0,
                desynchronized: false,
            }),
            writer: Mutex::new(()),
        }
    }

    pub fn establishment_id(&self) -> EstablishmentId {
        self.establishment_id
    }

    /// The underlying store adapter.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current read-only snapshot.
    pub fn snapshot(&self) -> Arc<CategorySnapshot> {
        read_state(&self.state).snapshot.clone()
    }

    /// `true` after a partial reorder until the next successful load.
    pub fn needs_reload(&self) -> bool {
        read_state(&self.state).desynchronized
    }

    /// Replaces the snapshot with the store's current rows.
    ///
    /// A read that overlapped a write is discarded and re-issued once the
    /// write has settled. On failure the previous snapshot is kept.
    pub async fn load(&self) -> RepositoryResult<Arc<CategorySnapshot>> {
        for attempt in 1..=MAX_LOAD_ATTEMPTS {
            let started_at = read_state(&self.state).generation;

            let items = self
                .store
                .list_categories(self.establishment_id)
                .await
                .map_err(|e| {
                    log::error!("Failed to load categories: {e}");
                    RepositoryError::Sync(e)
                })?;

            {
                let mut state = write_state(&self.state);
                if state.generation == started_at && started_at % 2 == 0 {
                    let next = Arc::new(CategorySnapshot {
                        version: state.snapshot.version + 1,
                        items,
                    });
                    state.snapshot = next.clone();
                    state.desynchronized = false;
                    log::debug!(
                        "Loaded {} categories for establishment {} (version {})",
                        next.len(),
                        self.establishment_id,
                        next.version
                    );
                    return Ok(next);
                }
            }

            log::debug!("Discarding stale category read (attempt {attempt})");
            // Queue behind in-flight writes so the next read starts from a settled store.
            drop(self.writer.lock().await);
        }

        log::warn!(
            "Giving up loading categories for establishment {} after {MAX_LOAD_ATTEMPTS} attempts",
            self.establishment_id
        );
        Err(RepositoryError::StaleRead(MAX_LOAD_ATTEMPTS))
    }

    fn begin_write(&self) -> RepositoryResult<WriteTicket<'_>> {
        let mut state = write_state(&self.state);
        if state.desynchronized {
            return Err(RepositoryError::StaleSnapshot);
        }
        state.generation += 1;
        Ok(WriteTicket {
            state: &self.state,
            base: state.snapshot.clone(),
        })
    }

    /// Appends a new category after the current last one.
    pub async fn create(&self, name: Translation, is_active: bool) -> RepositoryResult<Category> {
        let _writer = self.writer.lock().await;
        let ticket = self.begin_write()?;

        let new_category = NewCategory {
            establishment_id: self.establishment_id,
            name,
            is_active,
            order_index: ordering::next_order_index(ticket.base().items())?,
        };

        let created = self
            .store
            .insert_category(&new_category)
            .await
            .map_err(|e| {
                log::error!("Failed to create category: {e}");
                RepositoryError::Sync(e)
            })?;

        let mut items = ticket.base().items().to_vec();
        items.push(created.clone());
        ticket.commit(items);

        log::debug!("Created category {} at {}", created.id, created.order_index);
        Ok(created)
    }

    /// Replaces the name and activation flag of a category, keeping its position.
    pub async fn update(
        &self,
        id: CategoryId,
        name: Translation,
        is_active: bool,
    ) -> RepositoryResult<Category> {
        let _writer = self.writer.lock().await;
        let ticket = self.begin_write()?;
        self.write_entry(ticket, id, Some(name), is_active).await
    }

    /// Toggles visibility of a category, keeping its stored name.
    pub async fn set_active(&self, id: CategoryId, is_active: bool) -> RepositoryResult<Category> {
        let _writer = self.writer.lock().await;
        let ticket = self.begin_write()?;
        self.write_entry(ticket, id, None, is_active).await
    }

    async fn write_entry(
        &self,
        ticket: WriteTicket<'_>,
        id: CategoryId,
        name: Option<Translation>,
        is_active: bool,
    ) -> RepositoryResult<Category> {
        let position = ticket
            .base()
            .position_of(id)
            .ok_or(RepositoryError::NotFound(id))?;

        let mut updated = ticket.base().items()[position].clone();
        if let Some(name) = name {
            updated.name = name;
        }
        updated.is_active = is_active;

        self.store
            .update_category(id, &updated.name, is_active)
            .await
            .inspect_err(|e| log::error!("Failed to update category {id}: {e}"))?;

        let mut items = ticket.base().items().to_vec();
        items[position] = updated.clone();
        ticket.commit(items);

        Ok(updated)
    }

    /// Deletes a category and closes the gap it leaves in the ordering.
    pub async fn remove(&self, id: CategoryId) -> RepositoryResult<()> {
        let _writer = self.writer.lock().await;
        let ticket = self.begin_write()?;

        let position = ticket
            .base()
            .position_of(id)
            .ok_or(RepositoryError::NotFound(id))?;

        let plan = ordering::plan_removal(ticket.base().items(), position)?;

        self.store
            .delete_category(id)
            .await
            .inspect_err(|e| log::error!("Failed to delete category {id}: {e}"))?;

        if let Err(err) = self.store.update_order_indices(&plan.changes).await {
            // The row is already gone, so any renumber failure leaves a gap.
            log::error!("Failed to renumber categories after deleting {id}: {err}");
            let error = partial_reorder(err, &plan.changes);
            ticket.desynchronize();
            return Err(error);
        }

        ticket.commit(plan.items);
        log::debug!(
            "Removed category {id}, renumbered {} entries",
            plan.changes.len()
        );
        Ok(())
    }

    /// Moves a category to a zero-based display position.
    ///
    /// `new_position` is clamped to the catalog. Returns the position the
    /// category ended up at.
    pub async fn reorder(&self, id: CategoryId, new_position: usize) -> RepositoryResult<usize> {
        let _writer = self.writer.lock().await;
        let ticket = self.begin_write()?;

        let from = ticket
            .base()
            .position_of(id)
            .ok_or(RepositoryError::NotFound(id))?;
        let to = new_position.min(ticket.base().len() - 1);
        if from == to {
            return Ok(to);
        }

        let plan = ordering::plan_move(ticket.base().items(), from, to)?;
        if let Err(err) = self.store.update_order_indices(&plan.changes).await {
            log::error!("Failed to move category {id} from {from} to {to}: {err}");
            if err.applied == 0 {
                return Err(RepositoryError::Sync(err.source));
            }
            let error = partial_reorder(err, &plan.changes);
            ticket.desynchronize();
            return Err(error);
        }

        ticket.commit(plan.items);
        log::debug!("Moved category {id} from {from} to {to}");
        Ok(to)
    }
}

fn partial_reorder(err: BatchWriteError, changes: &[OrderChange]) -> RepositoryError {
    RepositoryError::PartialReorder {
        applied: err.applied,
        last_applied: err
            .applied
            .checked_sub(1)
            .and_then(|i| changes.get(i))
            .copied(),
        source: err.source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{LanguageCode, OrderIndex};
    use crate::store::InMemoryCategoryStore;
    use crate::store::memory::StoreOperation;

    fn establishment() -> EstablishmentId {
        EstablishmentId::new(1).unwrap()
    }

    fn id(value: i32) -> CategoryId {
        CategoryId::new(value).unwrap()
    }

    fn named(tr: &str) -> Translation {
        Translation::new().with(LanguageCode::new("tr").unwrap(), tr)
    }

    fn category(value: i32, order: i32, tr: &str) -> Category {
        Category {
            id: id(value),
            name: named(tr),
            is_active: true,
            order_index: OrderIndex::new(order).unwrap(),
        }
    }

    async fn loaded(categories: Vec<Category>) -> CategoryRepository<InMemoryCategoryStore> {
        let store = InMemoryCategoryStore::with_categories(establishment(), categories);
        let repo = CategoryRepository::new(store, establishment());
        repo.load().await.unwrap();
        repo
    }

    fn order(repo: &CategoryRepository<InMemoryCategoryStore>) -> Vec<(i32, i32)> {
        repo.snapshot()
            .iter()
            .map(|c| (c.id.get(), c.order_index.get()))
            .collect()
    }

    fn three() -> Vec<Category> {
        vec![
            category(1, 0, "Çorbalar"),
            category(2, 1, "Salatalar"),
            category(3, 2, "Tatlılar"),
        ]
    }

    #[tokio::test]
    async fn reorder_moves_entry_to_front() {
        let repo = loaded(vec![category(1, 0, "Çorbalar"), category(2, 1, "Salatalar")]).await;

        let position = repo.reorder(id(2), 0).await.unwrap();

        assert_eq!(position, 0);
        assert_eq!(order(&repo), vec![(2, 0), (1, 1)]);
        assert_eq!(repo.store().rows(establishment()), repo.snapshot().items());
    }

    #[tokio::test]
    async fn remove_renumbers_following_entries() {
        let repo = loaded(three()).await;

        repo.remove(id(1)).await.unwrap();

        assert_eq!(order(&repo), vec![(2, 0), (3, 1)]);
        assert_eq!(repo.store().rows(establishment()), repo.snapshot().items());
    }

    #[tokio::test]
    async fn create_appends_after_last() {
        let repo = loaded(three()).await;

        let created = repo.create(named("İçecekler"), true).await.unwrap();

        assert_eq!(created.order_index, 3);
        assert_eq!(repo.snapshot().items().last(), Some(&created));
    }

    #[tokio::test]
    async fn create_on_empty_catalog_starts_at_zero() {
        let repo = loaded(vec![]).await;
        let created = repo.create(named("Çorbalar"), false).await.unwrap();
        assert_eq!(created.order_index, OrderIndex::ZERO);
        assert!(!created.is_active);
    }

    #[tokio::test]
    async fn failed_create_leaves_no_ghost_row() {
        let repo = loaded(three()).await;
        let before = repo.snapshot();
        repo.store().fail_next(StoreOperation::Insert);

        let err = repo.create(named("İçecekler"), true).await.unwrap_err();

        assert!(matches!(err, RepositoryError::Sync(StoreError::Transport(_))));
        assert_eq!(*repo.snapshot(), *before);
    }

    #[tokio::test]
    async fn failed_update_leaves_snapshot_identical() {
        let repo = loaded(three()).await;
        let before = repo.snapshot();
        repo.store().fail_next(StoreOperation::Update);

        let err = repo.update(id(2), named("Mezeler"), false).await.unwrap_err();

        assert!(matches!(err, RepositoryError::Sync(_)));
        assert_eq!(*repo.snapshot(), *before);
    }

    #[tokio::test]
    async fn update_keeps_position() {
        let repo = loaded(three()).await;

        let updated = repo.update(id(2), named("Mezeler"), false).await.unwrap();

        assert_eq!(updated.order_index, 1);
        assert_eq!(repo.snapshot().items()[1], updated);
    }

    #[tokio::test]
    async fn set_active_keeps_name() {
        let repo = loaded(three()).await;

        let updated = repo.set_active(id(3), false).await.unwrap();

        assert!(!updated.is_active);
        assert_eq!(updated.name, named("Tatlılar"));
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let repo = loaded(three()).await;
        let missing = id(42);

        assert_eq!(
            repo.update(missing, Translation::new(), true).await.unwrap_err(),
            RepositoryError::NotFound(missing)
        );
        assert_eq!(
            repo.remove(missing).await.unwrap_err(),
            RepositoryError::NotFound(missing)
        );
        assert_eq!(
            repo.reorder(missing, 0).await.unwrap_err(),
            RepositoryError::NotFound(missing)
        );
    }

    #[tokio::test]
    async fn reorder_clamps_position() {
        let repo = loaded(three()).await;

        let position = repo.reorder(id(1), 99).await.unwrap();

        assert_eq!(position, 2);
        assert_eq!(order(&repo), vec![(2, 0), (3, 1), (1, 2)]);
    }

    #[tokio::test]
    async fn reorder_to_same_position_writes_nothing() {
        let repo = loaded(three()).await;
        let version = repo.snapshot().version();

        repo.reorder(id(2), 1).await.unwrap();

        assert_eq!(repo.store().order_writes(), 0);
        assert_eq!(repo.snapshot().version(), version);
    }

    #[tokio::test]
    async fn reorder_is_invertible() {
        let repo = loaded(three()).await;
        let before = order(&repo);

        repo.reorder(id(3), 0).await.unwrap();
        repo.reorder(id(3), 2).await.unwrap();

        assert_eq!(order(&repo), before);
    }

    #[tokio::test]
    async fn reorder_failing_before_any_write_is_a_sync_error() {
        let repo = loaded(three()).await;
        let before = repo.snapshot();
        repo.store().fail_next(StoreOperation::UpdateOrderIndex);

        let err = repo.reorder(id(3), 0).await.unwrap_err();

        assert!(matches!(err, RepositoryError::Sync(_)));
        assert_eq!(*repo.snapshot(), *before);
        assert!(!repo.needs_reload());
    }

    #[tokio::test]
    async fn partial_reorder_requires_reload() {
        let repo = loaded(three()).await;
        let before = repo.snapshot();
        repo.store().fail_order_writes_after(1);

        let err = repo.reorder(id(3), 0).await.unwrap_err();

        match err {
            RepositoryError::PartialReorder {
                applied,
                last_applied,
                ..
            } => {
                assert_eq!(applied, 1);
                assert_eq!(
                    last_applied,
                    Some(OrderChange {
                        id: id(3),
                        order_index: OrderIndex::ZERO,
                    })
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(*repo.snapshot(), *before);
        assert!(repo.needs_reload());
        assert_eq!(
            repo.create(named("İçecekler"), true).await.unwrap_err(),
            RepositoryError::StaleSnapshot
        );

        repo.load().await.unwrap();
        assert!(!repo.needs_reload());
        assert_eq!(repo.snapshot().items(), repo.store().rows(establishment()));
    }

    #[tokio::test]
    async fn failed_renumber_after_delete_is_partial() {
        let repo = loaded(three()).await;
        repo.store().fail_next(StoreOperation::UpdateOrderIndex);

        let err = repo.remove(id(1)).await.unwrap_err();

        assert!(matches!(
            err,
            RepositoryError::PartialReorder {
                applied: 0,
                last_applied: None,
                ..
            }
        ));
        assert!(repo.needs_reload());
    }

    #[tokio::test]
    async fn failed_delete_leaves_snapshot_identical() {
        let repo = loaded(three()).await;
        let before = repo.snapshot();
        repo.store().fail_next(StoreOperation::Delete);

        assert!(repo.remove(id(2)).await.is_err());
        assert_eq!(*repo.snapshot(), *before);
        assert!(!repo.needs_reload());
    }

    #[tokio::test]
    async fn failed_load_keeps_previous_snapshot() {
        let repo = loaded(three()).await;
        let before = repo.snapshot();
        repo.store().fail_next(StoreOperation::List);

        assert!(matches!(
            repo.load().await.unwrap_err(),
            RepositoryError::Sync(_)
        ));
        assert_eq!(repo.snapshot(), before);
    }

    #[tokio::test]
    async fn create_then_remove_restores_snapshot_content() {
        let repo = loaded(three()).await;
        let before = repo.snapshot();

        let created = repo.create(named("İçecekler"), true).await.unwrap();
        repo.remove(created.id).await.unwrap();

        assert_eq!(repo.snapshot().items(), before.items());
    }

    #[tokio::test]
    async fn read_overlapping_a_write_is_reissued() {
        let repo = loaded(three()).await;
        let gate = repo.store().gate_lists();

        let (loaded, created) = tokio::join!(repo.load(), async {
            let created = repo.create(named("İçecekler"), true).await;
            gate.release(MAX_LOAD_ATTEMPTS);
            created
        });

        let created = created.unwrap();
        let snapshot = loaded.unwrap();
        assert_eq!(snapshot.len(), 4);
        assert_eq!(snapshot.get(created.id), Some(&created));
        assert_eq!(repo.snapshot(), snapshot);
    }

    #[tokio::test]
    async fn load_gives_up_when_every_read_overlaps_a_write() {
        let repo = loaded(three()).await;
        let before = repo.snapshot().version();
        let gate = repo.store().gate_lists();

        let (result, ()) = tokio::join!(repo.load(), async {
            for i in 0..MAX_LOAD_ATTEMPTS {
                // Let the load record its generation and block inside the read.
                for _ in 0..4 {
                    tokio::task::yield_now().await;
                }
                repo.create(named(&format!("Yeni {i}")), true).await.unwrap();
                gate.release(1);
            }
        });

        assert_eq!(result, Err(RepositoryError::StaleRead(MAX_LOAD_ATTEMPTS)));
        // Only the writes replaced the snapshot.
        let snapshot = repo.snapshot();
        assert_eq!(snapshot.version(), before + MAX_LOAD_ATTEMPTS as u64);
        assert_eq!(snapshot.len(), 3 + MAX_LOAD_ATTEMPTS);
        assert_eq!(snapshot.items(), repo.store().rows(establishment()).as_slice());
    }

    #[tokio::test]
    async fn reorder_renumbers_tied_rows() {
        let repo = loaded(vec![
            category(1, 0, "Çorbalar"),
            category(2, 0, "Salatalar"),
            category(3, 0, "Tatlılar"),
        ])
        .await;

        repo.reorder(id(3), 0).await.unwrap();

        assert_eq!(order(&repo), vec![(3, 0), (1, 1), (2, 2)]);
        repo.load().await.unwrap();
        assert_eq!(order(&repo), vec![(3, 0), (1, 1), (2, 2)]);
    }

    #[tokio::test]
    async fn reorder_closes_gaps() {
        let repo = loaded(vec![
            category(1, 0, "Çorbalar"),
            category(2, 5, "Salatalar"),
            category(3, 9, "Tatlılar"),
        ])
        .await;

        repo.reorder(id(3), 0).await.unwrap();

        assert_eq!(order(&repo), vec![(3, 0), (1, 1), (2, 2)]);
        assert_eq!(repo.store().rows(establishment()), repo.snapshot().items());
    }

    #[tokio::test]
    async fn remove_closes_gaps() {
        let repo = loaded(vec![
            category(1, 2, "Çorbalar"),
            category(2, 5, "Salatalar"),
            category(3, 9, "Tatlılar"),
        ])
        .await;

        repo.remove(id(2)).await.unwrap();

        assert_eq!(order(&repo), vec![(1, 0), (3, 1)]);
        repo.load().await.unwrap();
        assert_eq!(order(&repo), vec![(1, 0), (3, 1)]);
    }

    #[tokio::test]
    async fn snapshot_versions_increase() {
        let repo = loaded(three()).await;
        let v0 = repo.snapshot().version();

        repo.reorder(id(1), 2).await.unwrap();
        let v1 = repo.snapshot().version();
        repo.load().await.unwrap();
        let v2 = repo.snapshot().version();

        assert!(v0 < v1 && v1 < v2);
    }
}
