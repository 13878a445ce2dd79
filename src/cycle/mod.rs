//! The refresh cycle: fetch a page, rewrite it, publish the result.
//!
//! One driver parameterized by [`RewriteMode`] replaces what would otherwise
//! be a near-identical file per prompt variant. Per-target state machine:
//! `idle → fetching → rewriting → validating → publishing → done`, with any
//! state able to fail without aborting sibling targets.

mod driver;
mod guard;
mod outcome;

pub use driver::{CycleDriver, CycleOptions};
pub use guard::{CycleGuard, CycleSlot};
pub use outcome::{CycleReport, OutcomeStatus, TargetOutcome};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which kind of rewrite the engine is asked for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
    clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RewriteMode {
    /// Full-page HTML rewrite; the engine returns raw HTML.
    #[default]
    Html,
    /// CSS-only design pass; the engine returns raw CSS.
    Css,
    /// Structured advisory; the engine returns a JSON envelope with the
    /// rewritten HTML plus SEO/UX suggestions.
    AdvisoryJson,
}

impl RewriteMode {
    /// Whether the engine payload must parse as JSON. Raw-text modes accept
    /// the payload directly with no parsing.
    pub fn expects_json(self) -> bool {
        matches!(self, Self::AdvisoryJson)
    }
}

/// A single content page managed by the cycle.
///
/// Defined at configuration time, immutable during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub id: u64,
    pub name: String,
}

impl Target {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// The HTML currently stored for a target, fetched fresh each cycle.
/// Never cached, versioned, or diffed against a previous snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSnapshot(String);

impl ContentSnapshot {
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    pub fn as_html(&self) -> &str {
        &self.0
    }
}

/// Fully rendered request for the rewrite engine. Pure function of its
/// inputs — built by the prompt builder, no hidden state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRequest {
    /// System/instruction message selected by mode.
    pub instructions: String,
    /// User message carrying the page content.
    pub input: String,
    pub mode: RewriteMode,
}

/// Structured advisory envelope returned in [`RewriteMode::AdvisoryJson`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub seo_suggestions: Vec<String>,
    #[serde(default)]
    pub ux_suggestions: Vec<String>,
    #[serde(default)]
    pub content_changes: Vec<String>,
}

/// What the rewrite engine produced, already shape-checked for the mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteResult {
    /// Raw text payload (HTML or CSS modes).
    Content(String),
    /// Parsed JSON envelope (advisory mode).
    Advisory(Advisory),
}

impl RewriteResult {
    /// The payload that would be written back to the content source, when
    /// one exists.
    pub fn publishable(&self) -> Option<&str> {
        match self {
            Self::Content(text) => Some(text),
            Self::Advisory(advisory) => advisory.html.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_round_trips_through_kebab_case() {
        assert_eq!(RewriteMode::AdvisoryJson.to_string(), "advisory-json");
        assert_eq!("css".parse::<RewriteMode>().unwrap(), RewriteMode::Css);
        assert_eq!(
            "advisory-json".parse::<RewriteMode>().unwrap(),
            RewriteMode::AdvisoryJson
        );
    }

    #[test]
    fn mode_serde_matches_strum_spelling() {
        let json = serde_json::to_string(&RewriteMode::AdvisoryJson).unwrap();
        assert_eq!(json, "\"advisory-json\"");
        let parsed: RewriteMode = serde_json::from_str("\"html\"").unwrap();
        assert_eq!(parsed, RewriteMode::Html);
    }

    #[test]
    fn only_advisory_mode_expects_json() {
        assert!(!RewriteMode::Html.expects_json());
        assert!(!RewriteMode::Css.expects_json());
        assert!(RewriteMode::AdvisoryJson.expects_json());
    }

    #[test]
    fn content_result_is_publishable() {
        let result = RewriteResult::Content("<p>hi</p>".into());
        assert_eq!(result.publishable(), Some("<p>hi</p>"));
    }

    #[test]
    fn advisory_without_html_is_not_publishable() {
        let result = RewriteResult::Advisory(Advisory {
            summary: Some("looked fine".into()),
            ..Advisory::default()
        });
        assert_eq!(result.publishable(), None);
    }

    #[test]
    fn advisory_deserializes_partial_envelope() {
        let advisory: Advisory =
            serde_json::from_str(r#"{"html":"<p>new</p>","seo_suggestions":["add a title"]}"#)
                .unwrap();
        assert_eq!(advisory.html.as_deref(), Some("<p>new</p>"));
        assert_eq!(advisory.seo_suggestions, vec!["add a title"]);
        assert!(advisory.summary.is_none());
        assert!(advisory.ux_suggestions.is_empty());
    }
}
