use std::borrow::Cow;

const MAX_API_ERROR_CHARS: usize = 200;

fn is_secret_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '+' | '/' | '=')
}

fn token_end(input: &str, from: usize) -> usize {
    let mut end = from;
    for (i, c) in input[from..].char_indices() {
        if is_secret_char(c) {
            end = from + i + c.len_utf8();
        } else {
            break;
        }
    }
    end
}

fn scrub_after_marker(scrubbed: &mut String, marker: &str) -> bool {
    let mut modified = false;
    let mut search_from = 0;
    loop {
        let Some(rel) = scrubbed[search_from..].find(marker) else {
            break;
        };

        let start = search_from + rel;
        let content_start = start + marker.len();
        let end = token_end(scrubbed, content_start);

        // Skip bare markers without a token value.
        if end == content_start {
            search_from = content_start;
            continue;
        }

        scrubbed.replace_range(start..end, "[REDACTED]");
        modified = true;
        search_from = start + "[REDACTED]".len();
    }

    modified
}

const MARKER_PATTERNS: [&str; 11] = [
    "sk-",
    "ghp_",
    "Authorization: Bearer ",
    "authorization: bearer ",
    "Authorization: Basic ",
    "authorization: basic ",
    "api_key=",
    "access_token=",
    "\"api_key\":\"",
    "\"token\":\"",
    "\"application_password\":\"",
];

fn needs_scrubbing(input: &str) -> bool {
    MARKER_PATTERNS.iter().any(|pattern| input.contains(pattern))
}

/// Scrub known secret-like token patterns from remote error strings.
///
/// Redacts API keys and credentials in common forms: prefix tokens (`sk-`),
/// auth headers (`Authorization: Basic ...`), and query/json markers
/// (`api_key=...`, `"token":"..."`).
pub fn scrub_secret_patterns(input: &str) -> Cow<'_, str> {
    if !needs_scrubbing(input) {
        return Cow::Borrowed(input);
    }

    let mut scrubbed = input.to_string();
    for marker in MARKER_PATTERNS {
        scrub_after_marker(&mut scrubbed, marker);
    }

    Cow::Owned(scrubbed)
}

/// Sanitize remote API error text by scrubbing secrets and truncating length.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_secret_patterns(input);

    if scrubbed.chars().count() <= MAX_API_ERROR_CHARS {
        return scrubbed.into_owned();
    }

    let scrubbed = scrubbed.as_ref();
    let mut end = MAX_API_ERROR_CHARS;
    while end > 0 && !scrubbed.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}...", &scrubbed[..end])
}

/// Build a sanitized error message from a failed HTTP response.
pub async fn api_error_message(service: &str, response: reqwest::Response) -> String {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());
    let sanitized = sanitize_api_error(&body);
    format!("{service} API error ({status}): {sanitized}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrubs_bearer_header() {
        let input = "request failed: Authorization: Bearer sk-abc123xyz was rejected";
        let result = scrub_secret_patterns(input);
        assert!(!result.contains("abc123xyz"));
        assert!(result.contains("[REDACTED]"));
    }

    #[test]
    fn scrubs_basic_auth_header() {
        let input = "401 with Authorization: Basic YWRtaW46cGFzcw== header";
        let result = scrub_secret_patterns(input);
        assert!(!result.contains("YWRtaW46cGFzcw=="));
        assert!(result.contains("[REDACTED]"));
    }

    #[test]
    fn scrubs_json_token_field() {
        let input = r#"{"error":"bad","token":"tok-value-123"}"#;
        let result = scrub_secret_patterns(input);
        assert!(!result.contains("tok-value-123"));
    }

    #[test]
    fn leaves_clean_input_borrowed() {
        let input = "page not found";
        let result = scrub_secret_patterns(input);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, "page not found");
    }

    #[test]
    fn bare_marker_without_token_is_untouched() {
        let input = "set api_key= in the environment";
        let result = scrub_secret_patterns(input);
        assert_eq!(result, input);
    }

    #[test]
    fn sanitize_truncates_long_bodies() {
        let long = "x".repeat(500);
        let result = sanitize_api_error(&long);
        assert!(result.len() <= MAX_API_ERROR_CHARS + 3);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn sanitize_respects_char_boundaries() {
        let long = "é".repeat(300);
        let result = sanitize_api_error(&long);
        assert!(result.ends_with("..."));
    }
}
