// Application configuration
pub mod database;
pub mod logging;
pub mod settings;

pub use database::{init_database, run_migrations};
pub use logging::init_logging;
pub use settings::{AppSettings, SettingsError};
