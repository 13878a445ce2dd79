use super::{CycleReport, RewriteMode, RewriteResult, Target, TargetOutcome};
use crate::engine::RewriteEngine;
use crate::error::CycleError;
use crate::prompt::PromptBuilder;
use crate::wordpress::ContentSource;
use chrono::Utc;
use std::sync::Arc;

/// Options for one cycle. Per-call timeouts are bound into the HTTP clients
/// at construction time.
#[derive(Debug, Clone, Default)]
pub struct CycleOptions {
    pub mode: RewriteMode,
    pub language: Option<String>,
    /// Run everything except the final publish.
    pub dry_run: bool,
}

/// Orchestrates fetch → rewrite → validate → publish for each target in
/// order. One target's failure never prevents subsequent targets from being
/// attempted; nothing is retried within a single cycle.
pub struct CycleDriver {
    source: Arc<dyn ContentSource>,
    engine: Arc<dyn RewriteEngine>,
    prompts: Arc<PromptBuilder>,
}

impl CycleDriver {
    pub fn new(
        source: Arc<dyn ContentSource>,
        engine: Arc<dyn RewriteEngine>,
        prompts: Arc<PromptBuilder>,
    ) -> Self {
        Self {
            source,
            engine,
            prompts,
        }
    }

    pub async fn run_cycle(&self, targets: &[Target], options: &CycleOptions) -> CycleReport {
        let started_at = Utc::now();
        let mut outcomes = Vec::with_capacity(targets.len());

        for target in targets {
            let outcome = self.run_target(target, options).await;
            match outcome.status {
                super::OutcomeStatus::Success => {
                    tracing::info!(
                        target_id = target.id,
                        name = %target.name,
                        link = outcome.link.as_deref().unwrap_or(""),
                        "target refreshed"
                    );
                }
                status => {
                    tracing::warn!(
                        target_id = target.id,
                        name = %target.name,
                        outcome = %status,
                        detail = outcome.detail.as_deref().unwrap_or(""),
                        "target skipped"
                    );
                }
            }
            outcomes.push(outcome);
        }

        let report = CycleReport {
            started_at,
            finished_at: Utc::now(),
            outcomes,
        };
        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "cycle finished"
        );
        report
    }

    async fn run_target(&self, target: &Target, options: &CycleOptions) -> TargetOutcome {
        tracing::info!(
            target_id = target.id,
            name = %target.name,
            mode = %options.mode,
            "refreshing target"
        );

        // fetching
        let snapshot = match self.source.fetch_rendered(target.id).await {
            Ok(snapshot) => snapshot,
            Err(error) => return TargetOutcome::from_error(target.clone(), &error),
        };

        // rewriting
        let request = match self
            .prompts
            .build(&snapshot, options.mode, options.language.as_deref())
        {
            Ok(request) => request,
            Err(error) => {
                let error = CycleError::rewrite(format!("failed to build rewrite request: {error}"));
                return TargetOutcome::from_error(target.clone(), &error);
            }
        };

        let result = match self.engine.complete(&request).await {
            Ok(result) => result,
            Err(error) => {
                if let CycleError::Rewrite { raw: Some(raw), .. } = &error {
                    tracing::debug!(target_id = target.id, raw = %raw, "unparseable engine payload");
                }
                return TargetOutcome::from_error(target.clone(), &error);
            }
        };

        // validating
        let payload = match validate_payload(&result) {
            Ok(payload) => payload,
            Err(error) => return TargetOutcome::from_error(target.clone(), &error),
        };

        if let RewriteResult::Advisory(advisory) = &result {
            tracing::info!(
                target_id = target.id,
                summary = advisory.summary.as_deref().unwrap_or(""),
                seo_suggestions = advisory.seo_suggestions.len(),
                ux_suggestions = advisory.ux_suggestions.len(),
                "advisory received"
            );
        }

        // publishing
        if options.dry_run {
            tracing::info!(target_id = target.id, "dry run, skipping publish");
            return TargetOutcome::dry_run(target.clone());
        }

        match self.source.update_content(target.id, payload).await {
            Ok(published) => TargetOutcome::success(target.clone(), published.link),
            Err(error) => TargetOutcome::from_error(target.clone(), &error),
        }
    }
}

/// Publishing empty content is a hard bug to prevent: the prior remote
/// content stays intact whenever the payload is missing or blank.
fn validate_payload(result: &RewriteResult) -> Result<&str, CycleError> {
    let payload = result
        .publishable()
        .ok_or_else(|| CycleError::validation("advisory payload carried no html field"))?;

    if payload.trim().is_empty() {
        return Err(CycleError::validation("rewritten payload is empty"));
    }

    Ok(payload)
}
