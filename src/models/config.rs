use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Configuration options for the menu catalog.
#[derive(Clone, Debug, Deserialize)]
pub struct MenuConfig {
    /// Path or URL of the SQLite database.
    pub database_url: String,
    /// Establishment whose menu is managed.
    pub establishment_id: i32,
    /// Display languages, primary first.
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
}

fn default_languages() -> Vec<String> {
    vec!["tr".to_string(), "en".to_string()]
}

impl MenuConfig {
    /// Reads `config/default.yaml` (optional) and `APP_*` environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config/default")
    }

    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("database_url", "app.db")?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("APP"))
            .build()?
            .try_deserialize()
    }
}
