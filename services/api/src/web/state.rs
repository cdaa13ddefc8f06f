//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use crate::config::Config;
use crate::services::{AssignmentService, RegistrationService};

/// The shared application state, created once at startup and passed to all
/// handlers. The services carry their injected store/attachment ports; no
/// handler talks to an adapter directly.
#[derive(Clone)]
pub struct AppState {
    pub registration: RegistrationService,
    pub assignments: AssignmentService,
    pub config: Arc<Config>,
}
