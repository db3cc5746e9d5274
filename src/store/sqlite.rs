//! [`CategoryStore`] backed by Diesel and SQLite.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::db::DbPool;
use crate::domain::category::{Category, NewCategory, OrderChange};
use crate::domain::translation::Translation;
use crate::domain::types::{CategoryId, EstablishmentId};
use crate::models::category::{
    Category as DbCategory, NewCategory as DbNewCategory, encode_name,
};
use crate::store::{BatchWriteError, CategoryStore, StoreError, StoreResult};

/// Store implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, so the store can be shared
/// between repositories of different establishments.
#[derive(Clone)]
pub struct SqliteCategoryStore {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl SqliteCategoryStore {
    /// Create a new store from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Runs blocking Diesel work on the blocking thread pool.
    async fn run<T, F>(&self, work: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> StoreResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            work(&mut *conn)
        })
        .await
        .map_err(|e| StoreError::Transport(format!("store task failed: {e}")))?
    }
}

fn write_order_index(conn: &mut SqliteConnection, change: OrderChange) -> StoreResult<()> {
    use crate::schema::categories;

    let affected = diesel::update(categories::table.filter(categories::id.eq(change.id.get())))
        .set((
            categories::order_index.eq(change.order_index.get()),
            categories::updated_at.eq(diesel::dsl::now),
        ))
        .execute(conn)?;

    if affected == 0 {
        return Err(StoreError::NotFound(change.id));
    }
    Ok(())
}

#[async_trait]
impl CategoryStore for SqliteCategoryStore {
    async fn list_categories(
        &self,
        establishment_id: EstablishmentId,
    ) -> StoreResult<Vec<Category>> {
        use crate::schema::categories;

        self.run(move |conn| {
            let rows = categories::table
                .filter(categories::establishment_id.eq(establishment_id.get()))
                .order((categories::order_index.asc(), categories::id.asc()))
                .select(DbCategory::as_select())
                .load::<DbCategory>(conn)?;

            let items = rows
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<Vec<Category>, _>>()?;
            Ok(items)
        })
        .await
    }

    async fn insert_category(&self, category: &NewCategory) -> StoreResult<Category> {
        use crate::schema::categories;

        let db_category = DbNewCategory::try_from(category)?;
        self.run(move |conn| {
            let inserted = diesel::insert_into(categories::table)
                .values(&db_category)
                .returning(DbCategory::as_returning())
                .get_result::<DbCategory>(conn)?;
            Ok(Category::try_from(inserted)?)
        })
        .await
    }

    async fn update_category(
        &self,
        id: CategoryId,
        name: &Translation,
        is_active: bool,
    ) -> StoreResult<()> {
        use crate::schema::categories;

        let name = encode_name(name)?;
        self.run(move |conn| {
            let affected = diesel::update(categories::table.filter(categories::id.eq(id.get())))
                .set((
                    categories::name.eq(name),
                    categories::is_active.eq(is_active),
                    categories::updated_at.eq(diesel::dsl::now),
                ))
                .execute(conn)?;

            if affected == 0 {
                return Err(StoreError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn update_order_index(&self, change: OrderChange) -> StoreResult<()> {
        self.run(move |conn| write_order_index(conn, change)).await
    }

    /// Applies the whole batch in one transaction; on failure nothing is applied.
    async fn update_order_indices(&self, changes: &[OrderChange]) -> Result<(), BatchWriteError> {
        let changes = changes.to_vec();
        self.run(move |conn| {
            conn.transaction(|conn| {
                changes
                    .iter()
                    .try_for_each(|change| write_order_index(conn, *change))
            })
        })
        .await
        .map_err(|source| BatchWriteError { applied: 0, source })
    }

    async fn delete_category(&self, id: CategoryId) -> StoreResult<()> {
        use crate::schema::categories;

        self.run(move |conn| {
            let affected =
                diesel::delete(categories::table.filter(categories::id.eq(id.get())))
                    .execute(conn)?;

            if affected == 0 {
                return Err(StoreError::NotFound(id));
            }
            Ok(())
        })
        .await
    }
}
