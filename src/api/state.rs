//! Application state for the livability engine API.

use std::sync::Arc;

use crate::config::RateTables;

/// Shared application state.
///
/// Holds the reference tables loaded at startup. Cloning is cheap; every
/// handler reads the same tables.
#[derive(Clone)]
pub struct AppState {
    tables: Arc<RateTables>,
}

impl AppState {
    /// Creates application state around loaded tables.
    pub fn new(tables: RateTables) -> Self {
        Self {
            tables: Arc::new(tables),
        }
    }

    /// Returns the reference tables.
    pub fn tables(&self) -> &RateTables {
        &self.tables
    }
}
