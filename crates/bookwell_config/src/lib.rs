// --- File: crates/bookwell_config/src/lib.rs ---

pub mod models;

pub use config::ConfigError;
pub use models::*;

use config::{Config, Environment, File};
use once_cell::sync::OnceCell;
use tracing::debug;

static DOTENV_LOADED: OnceCell<()> = OnceCell::new();

/// Load `.env` once per process, before any config or secret lookup.
pub fn ensure_dotenv_loaded() {
    DOTENV_LOADED.get_or_init(|| {
        let _ = dotenv::dotenv();
    });
}

/// Loads the unified application configuration.
///
/// Layering, lowest precedence first: built-in defaults, `config/default`,
/// `config/{RUN_MODE}` (both optional, any format the config crate accepts),
/// then `APP_*` environment variables with `__` as the section separator
/// (e.g. `APP_SERVER__PORT=8086`, `APP_DATABASE__URL=sqlite://bookwell.db`).
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
    debug!("Loading configuration for RUN_MODE={}", run_mode);

    let config = Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8086i64)?
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    config.try_deserialize()
}
