//! Shared application state for the HTTP layer.
//!
//! The engine is a single-threaded cooperative state machine (see the
//! concurrency notes on [`crate::engine::MatchingEngine`]); the HTTP layer's
//! only job is to serialize concurrent requests around it. A `std::sync`
//! `Mutex` is enough here since no `.await` point happens while it's held —
//! every handler locks, calls straight into the engine, and unlocks before
//! returning.

use std::sync::{Arc, Mutex};

use crate::{engine::MatchingEngine, order::RandomIdGenerator};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Mutex<MatchingEngine>>,
    pub id_gen: Arc<RandomIdGenerator>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            engine: Arc::new(Mutex::new(MatchingEngine::new())),
            id_gen: Arc::new(RandomIdGenerator),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        AppState::new()
    }
}
