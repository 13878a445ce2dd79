//! Rewrite engine (the external LLM completion API).
//!
//! The engine exposes exactly one typed operation, `complete(request) ->
//! RewriteResult`; every response-shape decision lives behind that seam.

mod openai;
mod response;
mod traits;

pub use openai::OpenAiEngine;
pub use response::parse_result;
pub use traits::RewriteEngine;
