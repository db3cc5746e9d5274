//! Process-local [`CategoryStore`] with failure injection.
//!
//! Useful for tests and demos: every operation can be made to fail on demand
//! and list reads can be held open to simulate slow round-trips.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::domain::category::{Category, NewCategory, OrderChange};
use crate::domain::translation::Translation;
use crate::domain::types::{CategoryId, EstablishmentId};
use crate::store::{CategoryStore, StoreError, StoreResult};

/// Store operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    List,
    Insert,
    Update,
    UpdateOrderIndex,
    Delete,
}

#[derive(Default)]
struct Failures {
    list: bool,
    insert: bool,
    update: bool,
    delete: bool,
    /// Number of order writes still allowed before the next one fails.
    order_writes_before_failure: Option<usize>,
}

#[derive(Default)]
struct State {
    rows: Vec<(EstablishmentId, Category)>,
    next_id: i32,
    failures: Failures,
    order_writes: usize,
    list_gate: Option<Arc<Semaphore>>,
}

/// In-memory category table.
#[derive(Default)]
pub struct InMemoryCategoryStore {
    state: Mutex<State>,
}

/// Holds list reads open until permits are released.
#[derive(Clone)]
pub struct ListGate {
    semaphore: Arc<Semaphore>,
}

impl ListGate {
    /// Lets `reads` pending or future list calls complete.
    pub fn release(&self, reads: usize) {
        self.semaphore.add_permits(reads);
    }
}

impl InMemoryCategoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with rows for one establishment.
    pub fn with_categories(establishment_id: EstablishmentId, categories: Vec<Category>) -> Self {
        let store = Self::new();
        {
            let mut state = store.lock();
            state.next_id = categories.iter().map(|c| c.id.get()).max().unwrap_or(0);
            state.rows = categories
                .into_iter()
                .map(|category| (establishment_id, category))
                .collect();
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock leaves plain data behind; keep serving it.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Makes the next call of `operation` fail with a transport error.
    pub fn fail_next(&self, operation: StoreOperation) {
        let mut state = self.lock();
        match operation {
            StoreOperation::List => state.failures.list = true,
            StoreOperation::Insert => state.failures.insert = true,
            StoreOperation::Update => state.failures.update = true,
            StoreOperation::Delete => state.failures.delete = true,
            StoreOperation::UpdateOrderIndex => state.failures.order_writes_before_failure = Some(0),
        }
    }

    /// Lets `successes` order writes through, then fails the next one.
    pub fn fail_order_writes_after(&self, successes: usize) {
        self.lock().failures.order_writes_before_failure = Some(successes);
    }

    /// Holds every subsequent list call after it has read the rows, until
    /// the returned gate releases it.
    pub fn gate_lists(&self) -> ListGate {
        let semaphore = Arc::new(Semaphore::new(0));
        self.lock().list_gate = Some(semaphore.clone());
        ListGate { semaphore }
    }

    /// Number of `order_index` rows written so far.
    pub fn order_writes(&self) -> usize {
        self.lock().order_writes
    }

    /// Current rows of an establishment ordered by `order_index`.
    pub fn rows(&self, establishment_id: EstablishmentId) -> Vec<Category> {
        let state = self.lock();
        let mut rows: Vec<Category> = state
            .rows
            .iter()
            .filter(|(owner, _)| *owner == establishment_id)
            .map(|(_, category)| category.clone())
            .collect();
        rows.sort_by_key(|c| (c.order_index, c.id));
        rows
    }

    fn find(state: &mut State, id: CategoryId) -> StoreResult<&mut Category> {
        state
            .rows
            .iter_mut()
            .map(|(_, category)| category)
            .find(|category| category.id == id)
            .ok_or(StoreError::NotFound(id))
    }
}

fn injected(operation: &str) -> StoreError {
    StoreError::Transport(format!("injected {operation} failure"))
}

#[async_trait]
impl CategoryStore for InMemoryCategoryStore {
    async fn list_categories(
        &self,
        establishment_id: EstablishmentId,
    ) -> StoreResult<Vec<Category>> {
        let gate = {
            let mut state = self.lock();
            if std::mem::take(&mut state.failures.list) {
                return Err(injected("list"));
            }
            state.list_gate.clone()
        };
        let rows = self.rows(establishment_id);

        if let Some(gate) = gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| StoreError::Transport(e.to_string()))?;
            permit.forget();
        }
        Ok(rows)
    }

    async fn insert_category(&self, category: &NewCategory) -> StoreResult<Category> {
        let mut state = self.lock();
        if std::mem::take(&mut state.failures.insert) {
            return Err(injected("insert"));
        }
        state.next_id += 1;
        let id = CategoryId::new(state.next_id).map_err(|e| StoreError::Transport(e.to_string()))?;
        let inserted = category.clone().into_category(id);
        state
            .rows
            .push((category.establishment_id, inserted.clone()));
        Ok(inserted)
    }

    async fn update_category(
        &self,
        id: CategoryId,
        name: &Translation,
        is_active: bool,
    ) -> StoreResult<()> {
        let mut state = self.lock();
        if std::mem::take(&mut state.failures.update) {
            return Err(injected("update"));
        }
        let category = Self::find(&mut state, id)?;
        category.name = name.clone();
        category.is_active = is_active;
        Ok(())
    }

    async fn update_order_index(&self, change: OrderChange) -> StoreResult<()> {
        let mut state = self.lock();
        match state.failures.order_writes_before_failure {
            Some(0) => {
                state.failures.order_writes_before_failure = None;
                return Err(injected("order write"));
            }
            Some(remaining) => state.failures.order_writes_before_failure = Some(remaining - 1),
            None => {}
        }
        let category = Self::find(&mut state, change.id)?;
        category.order_index = change.order_index;
        state.order_writes += 1;
        Ok(())
    }

    async fn delete_category(&self, id: CategoryId) -> StoreResult<()> {
        let mut state = self.lock();
        if std::mem::take(&mut state.failures.delete) {
            return Err(injected("delete"));
        }
        let before = state.rows.len();
        state.rows.retain(|(_, category)| category.id != id);
        if state.rows.len() == before {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}
