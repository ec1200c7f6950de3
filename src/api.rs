//! HTTP API for the chat service

mod handlers;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::db::Database;
use crate::runtime::ProductionRunner;
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub runner: Arc<ProductionRunner>,
    /// Outer deadline for one chat turn
    pub turn_timeout: Duration,
}

impl AppState {
    pub fn new(db: Database, runner: ProductionRunner, turn_timeout: Duration) -> Self {
        Self {
            db,
            runner: Arc::new(runner),
            turn_timeout,
        }
    }
}
