//! Process-wide health registry served by `GET /health`.
//!
//! Components (scheduler, gateway) mark their own status; the driver records
//! a summary of the last finished cycle. Observability only — business logic
//! never reads from here.

use crate::cycle::CycleReport;
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{OnceLock, RwLock};
use std::time::Instant;

#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub status: String,
    pub updated_at: String,
    pub last_error: Option<String>,
}

/// Summary of the most recent finished cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleSummary {
    pub finished_at: String,
    pub targets: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Ticks dropped because a previous cycle was still in flight.
    pub skipped_ticks: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub pid: u32,
    pub updated_at: String,
    pub uptime_seconds: u64,
    pub components: BTreeMap<String, ComponentHealth>,
    pub last_cycle: Option<CycleSummary>,
}

struct HealthRegistry {
    started_at: Instant,
    components: RwLock<BTreeMap<String, ComponentHealth>>,
    last_cycle: RwLock<Option<CycleSummary>>,
    skipped_ticks: RwLock<u64>,
}

static REGISTRY: OnceLock<HealthRegistry> = OnceLock::new();

fn registry() -> &'static HealthRegistry {
    REGISTRY.get_or_init(|| HealthRegistry {
        started_at: Instant::now(),
        components: RwLock::new(BTreeMap::new()),
        last_cycle: RwLock::new(None),
        skipped_ticks: RwLock::new(0),
    })
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

fn upsert_component(component: &str, status: &str, last_error: Option<String>) {
    if let Ok(mut map) = registry().components.write() {
        map.insert(
            component.to_string(),
            ComponentHealth {
                status: status.to_string(),
                updated_at: now_rfc3339(),
                last_error,
            },
        );
    }
}

pub fn mark_component_ok(component: &str) {
    upsert_component(component, "ok", None);
}

pub fn mark_component_error(component: &str, error: impl ToString) {
    upsert_component(component, "error", Some(error.to_string()));
}

/// Record the outcome counts of a finished cycle.
pub fn record_cycle(report: &CycleReport) {
    let skipped = registry().skipped_ticks.read().map_or(0, |count| *count);
    if let Ok(mut last) = registry().last_cycle.write() {
        *last = Some(CycleSummary {
            finished_at: report.finished_at.to_rfc3339(),
            targets: report.outcomes.len(),
            succeeded: report.succeeded(),
            failed: report.failed(),
            skipped_ticks: skipped,
        });
    }
}

/// Count a scheduler tick that was skipped because a cycle was in flight.
pub fn record_skipped_tick() {
    if let Ok(mut count) = registry().skipped_ticks.write() {
        *count = count.saturating_add(1);
    }
}

pub fn snapshot() -> HealthSnapshot {
    let components = registry()
        .components
        .read()
        .map_or_else(|_| BTreeMap::new(), |map| map.clone());
    let last_cycle = registry()
        .last_cycle
        .read()
        .map_or_else(|_| None, |last| Option::clone(&last));

    HealthSnapshot {
        pid: std::process::id(),
        updated_at: now_rfc3339(),
        uptime_seconds: registry().started_at.elapsed().as_secs(),
        components,
        last_cycle,
    }
}

pub fn snapshot_json() -> serde_json::Value {
    serde_json::to_value(snapshot()).unwrap_or_else(|_| {
        serde_json::json!({
            "status": "error",
            "message": "failed to serialize health snapshot"
        })
    })
}
