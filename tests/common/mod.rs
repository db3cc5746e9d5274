//! Helpers for integration tests.
#![allow(dead_code)]

use pushkind_menu::db::{DbPool, establish_connection_pool, run_pending_migrations};
use pushkind_menu::domain::translation::Translation;
use pushkind_menu::domain::types::{EstablishmentId, LanguageCode};
use tempfile::NamedTempFile;

/// Temporary database used in integration tests.
pub struct TestDb {
    _tempfile: NamedTempFile,
    pool: DbPool,
}

impl TestDb {
    pub fn new() -> Self {
        let tempfile = NamedTempFile::new().expect("Failed to create temp file");
        let pool = establish_connection_pool(tempfile.path().to_str().unwrap())
            .expect("Failed to establish SQLite connection.");
        run_pending_migrations(&pool).expect("Migrations failed");
        TestDb {
            _tempfile: tempfile,
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }
}

pub fn establishment(id: i32) -> EstablishmentId {
    EstablishmentId::new(id).expect("valid establishment id")
}

pub fn name(pairs: &[(&str, &str)]) -> Translation {
    pairs.iter().fold(Translation::new(), |name, (lang, text)| {
        name.with(LanguageCode::new(*lang).expect("valid language"), text)
    })
}
