//! Axum-based HTTP gateway: process liveness plus on-demand cycle triggers.
//!
//! Trigger endpoints return a structured per-target result, never a bare
//! error trace, and share the scheduler's in-flight guard so a manual
//! trigger can never overlap a scheduled cycle.

mod handlers;
mod server;

pub use server::{run_gateway, run_gateway_with_listener};

use crate::config::Config;
use crate::cycle::{CycleDriver, CycleGuard};
use std::sync::Arc;

/// Maximum request body size -- trigger endpoints carry no payload
pub const MAX_BODY_SIZE: usize = 16_384;
/// Request timeout. Generous: a trigger blocks until the whole sweep
/// finishes, and each target may spend minutes inside the rewrite engine.
pub const REQUEST_TIMEOUT_SECS: u64 = 900;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub driver: Arc<CycleDriver>,
    pub guard: CycleGuard,
}
