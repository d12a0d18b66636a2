//! # Logging
//!
//! fieldguard logs through the `log` facade: `debug` for individual field
//! decisions, `info` for persisted writes and `warn` for fields that are
//! missing from a schema. Applications install whatever logger they like;
//! [`LoggingSystem`] wires up `env_logger` for binaries and tests that do
//! not bring their own.

use crate::config::GuardConfig;
use crate::error::{GuardError, GuardResult};
use log::LevelFilter;

pub struct LoggingSystem;

impl LoggingSystem {
    /// Initializes `env_logger`, honouring `RUST_LOG` and defaulting to `info`.
    pub fn init_default() -> GuardResult<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .try_init()
            .map_err(|e| GuardError::Config(format!("Logger already initialized: {e}")))
    }

    /// Initializes `env_logger` at a fixed level.
    pub fn init_with_level(level: LevelFilter) -> GuardResult<()> {
        env_logger::Builder::new()
            .filter_level(level)
            .try_init()
            .map_err(|e| GuardError::Config(format!("Logger already initialized: {e}")))
    }

    /// Uses the configured level when present, the environment otherwise.
    pub fn init_from_config(config: &GuardConfig) -> GuardResult<()> {
        match config.level_filter()? {
            Some(level) => Self::init_with_level(level),
            None => Self::init_default(),
        }
    }

    /// Test logger: captured by the test harness, safe to call repeatedly.
    pub fn init_for_tests() {
        let _ = env_logger::builder().is_test(true).try_init();
    }
}
