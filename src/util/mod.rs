pub mod scrub;

pub use scrub::{api_error_message, sanitize_api_error, scrub_secret_patterns};
