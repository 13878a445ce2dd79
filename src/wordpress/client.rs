use super::{ContentSource, PublishedPage};
use crate::config::WordPressConfig;
use crate::cycle::ContentSnapshot;
use crate::error::CycleError;
use crate::util::api_error_message;
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub struct WpClient {
    base_url: String,
    /// Pre-computed `"Basic <credentials>"` header value (avoids encoding per request).
    cached_auth_header: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct Page {
    content: PageContent,
}

#[derive(Debug, Deserialize)]
struct PageContent {
    rendered: String,
}

#[derive(Debug, Serialize)]
struct UpdateBody<'a> {
    content: &'a str,
}

impl WpClient {
    pub fn new(config: &WordPressConfig) -> Self {
        Self::with_timeout(
            &config.base_url,
            &config.username,
            &config.app_password,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn with_timeout(
        base_url: &str,
        username: &str,
        app_password: &str,
        timeout: Duration,
    ) -> Self {
        let credentials = STANDARD.encode(format!("{username}:{app_password}"));
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            cached_auth_header: format!("Basic {credentials}"),
            client: Client::builder()
                .timeout(timeout)
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    fn page_url(&self, page_id: u64) -> String {
        format!("{}/wp-json/wp/v2/pages/{page_id}", self.base_url)
    }
}

#[async_trait]
impl ContentSource for WpClient {
    async fn fetch_rendered(&self, page_id: u64) -> Result<ContentSnapshot, CycleError> {
        let response = self
            .client
            .get(self.page_url(page_id))
            .header("Authorization", &self.cached_auth_header)
            .send()
            .await
            .map_err(|e| CycleError::fetch(format!("WordPress request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(CycleError::fetch(
                api_error_message("WordPress", response).await,
            ));
        }

        let page: Page = response
            .json()
            .await
            .map_err(|e| CycleError::fetch(format!("WordPress page body was malformed: {e}")))?;

        Ok(ContentSnapshot::new(page.content.rendered))
    }

    async fn update_content(
        &self,
        page_id: u64,
        content: &str,
    ) -> Result<PublishedPage, CycleError> {
        let response = self
            .client
            .post(self.page_url(page_id))
            .header("Authorization", &self.cached_auth_header)
            .json(&UpdateBody { content })
            .send()
            .await
            .map_err(|e| CycleError::publish(format!("WordPress request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(CycleError::publish(
                api_error_message("WordPress", response).await,
            ));
        }

        response.json().await.map_err(|e| {
            CycleError::publish(format!("WordPress update response was malformed: {e}"))
        })
    }
}
