use super::Target;
use crate::error::CycleError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::Display;

/// Terminal state of one target for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OutcomeStatus {
    Success,
    FailedFetch,
    FailedRewrite,
    FailedValidation,
    FailedPublish,
}

impl OutcomeStatus {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetOutcome {
    pub target: Target,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Confirmation link returned by the content source on publish.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl TargetOutcome {
    pub fn success(target: Target, link: Option<String>) -> Self {
        Self {
            target,
            status: OutcomeStatus::Success,
            detail: None,
            link,
        }
    }

    pub fn dry_run(target: Target) -> Self {
        Self {
            target,
            status: OutcomeStatus::Success,
            detail: Some("dry run, nothing published".into()),
            link: None,
        }
    }

    pub fn from_error(target: Target, error: &CycleError) -> Self {
        let status = match error {
            CycleError::Fetch { .. } => OutcomeStatus::FailedFetch,
            CycleError::Rewrite { .. } => OutcomeStatus::FailedRewrite,
            CycleError::Validation { .. } => OutcomeStatus::FailedValidation,
            CycleError::Publish { .. } => OutcomeStatus::FailedPublish,
        };
        Self {
            target,
            status,
            detail: Some(error.to_string()),
            link: None,
        }
    }
}

/// One full pass over the in-scope targets. Owns no resources and has no
/// persisted identity; the gateway serializes it straight to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<TargetOutcome>,
}

impl CycleReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status.is_success())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> Target {
        Target::new(195, "Homepage")
    }

    #[test]
    fn status_serializes_kebab_case() {
        let json = serde_json::to_string(&OutcomeStatus::FailedValidation).unwrap();
        assert_eq!(json, "\"failed-validation\"");
        assert_eq!(OutcomeStatus::FailedFetch.to_string(), "failed-fetch");
    }

    #[test]
    fn fetch_error_maps_to_failed_fetch() {
        let outcome = TargetOutcome::from_error(target(), &CycleError::fetch("boom"));
        assert_eq!(outcome.status, OutcomeStatus::FailedFetch);
        assert!(outcome.detail.as_deref().unwrap().contains("boom"));
        assert!(outcome.link.is_none());
    }

    #[test]
    fn validation_error_maps_to_failed_validation() {
        let outcome = TargetOutcome::from_error(target(), &CycleError::validation("empty"));
        assert_eq!(outcome.status, OutcomeStatus::FailedValidation);
    }

    #[test]
    fn report_counts_outcomes() {
        let now = Utc::now();
        let report = CycleReport {
            started_at: now,
            finished_at: now,
            outcomes: vec![
                TargetOutcome::success(target(), Some("https://example.com/home".into())),
                TargetOutcome::from_error(Target::new(7, "About"), &CycleError::publish("500")),
            ],
        };
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.all_succeeded());
    }

    #[test]
    fn outcome_serializes_without_null_fields() {
        let outcome = TargetOutcome::success(target(), None);
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(!json.contains("detail"));
        assert!(!json.contains("link"));
        assert!(json.contains("\"status\":\"success\""));
    }
}
