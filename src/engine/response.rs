use crate::cycle::{Advisory, RewriteMode, RewriteResult};
use crate::error::CycleError;

/// Shape-check a completion payload against the requested mode.
///
/// JSON parsing is attempted only when the mode expects JSON; raw-text modes
/// accept the payload directly. A payload that fails to parse is a rewrite
/// error carrying the raw text for diagnostics, never a panic.
pub fn parse_result(raw: &str, mode: RewriteMode) -> Result<RewriteResult, CycleError> {
    if !mode.expects_json() {
        return Ok(RewriteResult::Content(raw.to_string()));
    }

    serde_json::from_str::<Advisory>(raw)
        .map(RewriteResult::Advisory)
        .map_err(|e| {
            CycleError::rewrite_with_raw(format!("engine returned invalid advisory JSON: {e}"), raw)
        })
}
