//! Runtime for executing user turns
//!
//! Drives the pure state machine: executes each effect in order against the
//! transcript store, completion provider and tool registry, then feeds the
//! resulting events back into `transition`.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::{TurnError, TurnReply, TurnRunner};
pub use traits::*;

use crate::db::Database;
use crate::llm::LlmService;
use std::sync::Arc;

/// Type alias for the production runner with concrete implementations
pub type ProductionRunner = TurnRunner<Database, Arc<dyn LlmService>, Arc<dyn ToolExecutor>>;
