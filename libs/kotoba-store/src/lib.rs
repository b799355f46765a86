//! Local persistence and study orchestration for the vocabulary app.
//!
//! Provides:
//! - SQLite storage for words, flashcards and review history
//! - Library pagination, study statistics and review calendar
//! - A study service wiring the store to kotoba-core
//! - Environment configuration and tracing setup

pub mod config;
pub mod db;
pub mod service;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use config::{ConfigError, StoreConfig};
pub use db::{DbError, NewWord, SqliteRepository};
pub use service::{ServiceError, StudyService, StudySettings};

/// Install the global tracing subscriber, filtered by `RUST_LOG` (default `info`).
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Load configuration, set up logging and open the study service.
pub fn open() -> anyhow::Result<StudyService> {
    let config = StoreConfig::from_env()?;
    init_tracing();

    tracing::info!(path = %config.database_path.display(), "opening vocabulary store");
    let algorithm = kotoba_core::get_algorithm("sm2")
        .ok_or_else(|| anyhow::anyhow!("sm2 algorithm unavailable"))?;
    Ok(StudyService::from_config(&config, algorithm)?)
}
