//! Prompt construction: a pure mapping from (snapshot, language, mode) to a
//! rewrite request. No network, no I/O. Templates are data — changing tone
//! or branding never touches the cycle driver.

mod builder;
mod engine;

pub use builder::PromptBuilder;
pub use engine::TemplateEngine;
