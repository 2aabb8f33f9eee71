#![forbid(unsafe_code)]

//! Core domain model and business logic for the Setlog workout tracker.
//!
//! This crate provides:
//! - Domain types (exercises, routines, sessions, settings)
//! - Catalog management
//! - The workout session state machine
//! - Statistics (totals, averages, streaks)
//! - Persistence (storage port + file/memory backends)
//! - Timers and history export

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod store;
pub mod state;
pub mod session;
pub mod engine;
pub mod progress;
pub mod stats;
pub mod timer;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog};
pub use config::Config;
pub use store::{FileStore, MemoryStore, StoragePort};
pub use session::{apply, Action};
pub use engine::{Pending, StartOutcome, WorkoutEngine};
pub use progress::{exercise_progress, is_exercise_complete, workout_progress, SetCounts};
pub use stats::{compute_stats, WorkoutStats};
pub use export::export_history;
