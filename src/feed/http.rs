use std::time::Duration;

use reqwest::Client;

use crate::error::{NotifyError, Result};
use crate::feed::{FeedSource, NotificationFeed};
use crate::settings::Settings;

const FEED_PATH: &str = "/api/notifications";
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Polls the ScrumFlow REST API for the signed-in user's notifications.
#[derive(Clone)]
pub struct HttpFeedSource {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpFeedSource {
    pub fn new(base_url: impl Into<String>, auth_token: Option<String>) -> Self {
        crate::ensure_tls_provider();
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.api_base_url.clone(), settings.auth_token.clone())
    }

    fn feed_url(&self) -> String {
        format!("{}{}", self.base_url, FEED_PATH)
    }
}

impl FeedSource for HttpFeedSource {
    async fn fetch(&self) -> Result<NotificationFeed> {
        let mut request = self.client.get(self.feed_url()).timeout(FETCH_TIMEOUT);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Feed(format!(
                "ScrumFlow returned {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        let feed: NotificationFeed = serde_json::from_str(&body)
            .map_err(|e| NotifyError::Feed(format!("Malformed notification feed: {}", e)))?;

        tracing::debug!(
            "Fetched {} notifications ({} unread)",
            feed.notifications.len(),
            feed.unread()
        );
        Ok(feed)
    }
}
