//! AshBridge application orchestrator with clean module layout.
//!
//! This module provides:
//! - `core`: AshBridge struct and component wiring
//! - `tasks`: Async task orchestration and testable "*_once" functions
//! - `tests`: Unit tests for the orchestration logic

pub mod core;
pub mod tasks;

// Re-export main types and structs
pub use self::core::AshBridge;

#[cfg(test)]
mod tests;
