use super::engine::TemplateEngine;
use crate::config::TemplateOverrides;
use crate::cycle::{ContentSnapshot, RewriteMode, RewriteRequest};
use tera::Context;

const HTML_INSTRUCTIONS: &str = "\
You are a website content intelligence agent.

Rewrite the page HTML you are given into a modern, professional layout.
- Improve structure, readability, and flow.
- Strengthen on-page SEO{% if language %} for {{ language }}-speaking visitors{% endif %}.
- Keep every factual claim from the original page.
- Use only clean HTML (no CSS, no JS, no markdown).

Return ONLY the rewritten HTML, with no commentary.";

const CSS_INSTRUCTIONS: &str = "\
You are a website design agent.

Produce a complete stylesheet for the page HTML you are given.
- Modern, accessible, responsive layout.
- Respect the existing class names and document structure.
{% if language %}- The site serves {{ language }}-speaking visitors; keep any generated text in that language.
{% endif %}
Return ONLY CSS, with no commentary and no markdown fences.";

const ADVISORY_INSTRUCTIONS: &str = "\
You are a website content intelligence agent.

Analyze and rewrite the page HTML you are given.\
{% if language %} Write all visible copy in {{ language }}.{% endif %}

Respond ONLY with a JSON object of this exact shape:
{\"html\": \"<full rewritten HTML>\", \"summary\": \"<short explanation of the improvements>\", \"seo_suggestions\": [\"...\"], \"ux_suggestions\": [\"...\"], \"content_changes\": [\"...\"]}";

const HTML_INPUT: &str = "Rewrite this page HTML:\n\n{{ content }}";
const CSS_INPUT: &str = "Design a stylesheet for this page HTML:\n\n{{ content }}";
const ADVISORY_INPUT: &str = "Analyze and rewrite this page HTML:\n\n{{ content }}";

fn instructions_name(mode: RewriteMode) -> String {
    format!("{mode}-instructions")
}

fn input_name(mode: RewriteMode) -> String {
    format!("{mode}-input")
}

fn default_instructions(mode: RewriteMode) -> &'static str {
    match mode {
        RewriteMode::Html => HTML_INSTRUCTIONS,
        RewriteMode::Css => CSS_INSTRUCTIONS,
        RewriteMode::AdvisoryJson => ADVISORY_INSTRUCTIONS,
    }
}

fn default_input(mode: RewriteMode) -> &'static str {
    match mode {
        RewriteMode::Html => HTML_INPUT,
        RewriteMode::Css => CSS_INPUT,
        RewriteMode::AdvisoryJson => ADVISORY_INPUT,
    }
}

const ALL_MODES: [RewriteMode; 3] = [RewriteMode::Html, RewriteMode::Css, RewriteMode::AdvisoryJson];

/// Builds rewrite requests from registered templates. Constructed once at
/// startup; a broken template override fails here, not mid-cycle.
pub struct PromptBuilder {
    engine: TemplateEngine,
}

impl PromptBuilder {
    pub fn new(overrides: &TemplateOverrides) -> anyhow::Result<Self> {
        let mut engine = TemplateEngine::new();

        for mode in ALL_MODES {
            let instructions = overrides
                .instructions_for(mode)
                .unwrap_or_else(|| default_instructions(mode));
            engine.add_template(&instructions_name(mode), instructions)?;
            engine.add_template(&input_name(mode), default_input(mode))?;
        }

        let builder = Self { engine };

        // Surface template errors (unknown variables, bad syntax that only
        // shows at render time) before the first cycle runs.
        let probe = ContentSnapshot::new("<p>probe</p>");
        for mode in ALL_MODES {
            builder.build(&probe, mode, Some("en"))?;
            builder.build(&probe, mode, None)?;
        }

        Ok(builder)
    }

    /// Pure function of its inputs: (snapshot, mode, language) → request.
    pub fn build(
        &self,
        snapshot: &ContentSnapshot,
        mode: RewriteMode,
        language: Option<&str>,
    ) -> anyhow::Result<RewriteRequest> {
        let mut ctx = Context::new();
        ctx.insert("language", &language.unwrap_or_default());
        ctx.insert("content", snapshot.as_html());

        let instructions = self.engine.render(&instructions_name(mode), &ctx)?;
        let input = self.engine.render(&input_name(mode), &ctx)?;

        Ok(RewriteRequest {
            instructions,
            input,
            mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> PromptBuilder {
        PromptBuilder::new(&TemplateOverrides::default()).unwrap()
    }

    #[test]
    fn html_request_carries_page_content() {
        let request = builder()
            .build(
                &ContentSnapshot::new("<p>old</p>"),
                RewriteMode::Html,
                None,
            )
            .unwrap();
        assert!(request.input.contains("<p>old</p>"));
        assert!(request.input.starts_with("Rewrite this page HTML:"));
        assert!(request.instructions.contains("only clean HTML"));
        assert_eq!(request.mode, RewriteMode::Html);
    }

    #[test]
    fn language_appears_only_when_set() {
        let snapshot = ContentSnapshot::new("<p>x</p>");
        let with = builder()
            .build(&snapshot, RewriteMode::Html, Some("Arabic"))
            .unwrap();
        let without = builder().build(&snapshot, RewriteMode::Html, None).unwrap();

        assert!(with.instructions.contains("Arabic-speaking visitors"));
        assert!(!without.instructions.contains("-speaking visitors"));
    }

    #[test]
    fn advisory_instructions_pin_the_envelope_shape() {
        let request = builder()
            .build(
                &ContentSnapshot::new("<p>x</p>"),
                RewriteMode::AdvisoryJson,
                None,
            )
            .unwrap();
        assert!(request.instructions.contains("JSON object"));
        assert!(request.instructions.contains("\"html\""));
        assert!(request.instructions.contains("\"seo_suggestions\""));
    }

    #[test]
    fn build_is_deterministic() {
        let snapshot = ContentSnapshot::new("<p>same</p>");
        let b = builder();
        let one = b.build(&snapshot, RewriteMode::Css, Some("en")).unwrap();
        let two = b.build(&snapshot, RewriteMode::Css, Some("en")).unwrap();
        assert_eq!(one, two);
    }

    #[test]
    fn override_replaces_html_instructions() {
        let overrides = TemplateOverrides {
            html: Some("Rewrite for {{ language }} readers.".to_string()),
            ..TemplateOverrides::default()
        };
        let builder = PromptBuilder::new(&overrides).unwrap();
        let request = builder
            .build(&ContentSnapshot::new("<p>x</p>"), RewriteMode::Html, Some("fr"))
            .unwrap();
        assert_eq!(request.instructions, "Rewrite for fr readers.");
    }

    #[test]
    fn broken_override_fails_at_construction() {
        let overrides = TemplateOverrides {
            css: Some("{% if %}".to_string()),
            ..TemplateOverrides::default()
        };
        assert!(PromptBuilder::new(&overrides).is_err());
    }

    #[test]
    fn override_with_unknown_variable_fails_at_construction() {
        let overrides = TemplateOverrides {
            advisory_json: Some("Use {{ missing_variable }} here.".to_string()),
            ..TemplateOverrides::default()
        };
        assert!(PromptBuilder::new(&overrides).is_err());
    }
}
