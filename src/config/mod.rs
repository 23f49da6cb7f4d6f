/// Database connection and schema bootstrap
pub mod database;

/// Application settings from defaults, config.toml and the environment
pub mod settings;

pub use settings::AppConfig;
