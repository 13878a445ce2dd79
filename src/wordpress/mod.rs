//! WordPress REST API client (the content source).
//!
//! Two calls only: `GET /wp-json/wp/v2/pages/{id}` for the rendered HTML and
//! `POST /wp-json/wp/v2/pages/{id}` to overwrite the content field, both
//! authenticated with HTTP Basic credentials (username + application
//! password). The remote database is external and authoritative; nothing is
//! cached on this side.

mod client;

pub use client::WpClient;

use crate::cycle::ContentSnapshot;
use crate::error::CycleError;
use async_trait::async_trait;
use serde::Deserialize;

/// Seam over the external CMS holding page HTML. The cycle driver talks to
/// this trait only; tests substitute an in-memory implementation.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Current rendered HTML for a page.
    async fn fetch_rendered(&self, page_id: u64) -> Result<ContentSnapshot, CycleError>;

    /// Overwrite the page's content field. Returns the updated resource for
    /// confirmation.
    async fn update_content(
        &self,
        page_id: u64,
        content: &str,
    ) -> Result<PublishedPage, CycleError>;
}

/// Confirmation slice of the updated resource returned by a publish.
#[derive(Debug, Clone, Deserialize)]
pub struct PublishedPage {
    #[serde(default)]
    pub link: Option<String>,
}
