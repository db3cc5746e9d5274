use std::process::ExitCode;

use pushkind_menu::db::{establish_connection_pool, run_pending_migrations};
use pushkind_menu::domain::types::EstablishmentId;
use pushkind_menu::dto::categories::DisplayLanguages;
use pushkind_menu::models::config::MenuConfig;
use pushkind_menu::repository::CategoryRepository;
use pushkind_menu::services::categories::refresh_categories;
use pushkind_menu::store::SqliteCategoryStore;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = match MenuConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let establishment_id = match EstablishmentId::new(config.establishment_id) {
        Ok(id) => id,
        Err(e) => {
            log::error!("Invalid establishment id in configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let languages = match DisplayLanguages::from_codes(&config.languages) {
        Ok(languages) => languages,
        Err(e) => {
            log::error!("Invalid display languages in configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let pool = match establish_connection_pool(&config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to open database: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = run_pending_migrations(&pool) {
        log::error!("{e}");
        return ExitCode::FAILURE;
    }

    let repo = CategoryRepository::new(SqliteCategoryStore::new(pool), establishment_id);
    let categories = match refresh_categories(&repo, &languages).await {
        Ok(categories) => categories,
        Err(e) => {
            log::error!("Failed to load menu: {e}");
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&categories) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Failed to render menu: {e}");
            ExitCode::FAILURE
        }
    }
}
