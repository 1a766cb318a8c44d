//! Wiki publishing over the Confluence content REST API.

use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Deserialize;
use serde_json::json;

use crate::config::ConfluenceConfig;
use crate::error::MetricsError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A space in the wiki, addressed through the content endpoint from
/// [`ConfluenceConfig::url`]. The HTTP client is built on first use.
pub struct ConfluenceSpace {
    config: ConfluenceConfig,
    http: OnceCell<reqwest::blocking::Client>,
}

#[derive(Debug, Deserialize)]
struct ContentResults {
    results: Vec<ContentRef>,
}

#[derive(Debug, Deserialize)]
struct ContentRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PageVersion {
    title: String,
    version: VersionField,
}

#[derive(Debug, Deserialize)]
struct VersionField {
    number: u64,
}

impl ConfluenceSpace {
    pub fn new(config: ConfluenceConfig) -> Self {
        ConfluenceSpace {
            config,
            http: OnceCell::new(),
        }
    }

    pub fn from_env() -> Result<Self, MetricsError> {
        Ok(Self::new(ConfluenceConfig::from_env()?))
    }

    fn http(&self) -> Result<&reqwest::blocking::Client, MetricsError> {
        self.http.get_or_try_init(|| {
            reqwest::blocking::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .map_err(|e| {
                    MetricsError::remote_service(format!("failed to build http client: {e}"))
                })
        })
    }

    fn content_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    /// Finds the page with `title` in the configured space. More than one
    /// match means the space is ambiguous and the report cannot target it.
    pub fn page_id_by_title(&self, title: &str) -> Result<Option<String>, MetricsError> {
        let response = self
            .http()?
            .get(self.content_url())
            .basic_auth(&self.config.user, Some(&self.config.password))
            .query(&[
                ("spaceKey", self.config.space_key.as_str()),
                ("title", title),
            ])
            .send()
            .map_err(|e| MetricsError::remote_service(format!("page lookup failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetricsError::remote_service(format!(
                "page lookup returned {status}"
            )));
        }

        let parsed: ContentResults = response
            .json()
            .map_err(|e| MetricsError::remote_service(format!("invalid lookup response: {e}")))?;
        let mut results = parsed.results;
        if results.len() > 1 {
            return Err(MetricsError::remote_service(format!(
                "multiple pages found for title '{title}' in space {}",
                self.config.space_key
            )));
        }
        Ok(results.pop().map(|page| page.id))
    }

    /// Creates an empty page with `title`, optionally under a parent,
    /// returning the new page's id.
    pub fn create_page(
        &self,
        title: &str,
        parent_id: Option<&str>,
    ) -> Result<String, MetricsError> {
        let mut body = json!({
            "type": "page",
            "title": title,
            "space": {"key": self.config.space_key},
        });
        if let Some(parent) = parent_id {
            body["ancestors"] = json!([{"id": parent}]);
        }

        let response = self
            .http()?
            .post(self.content_url())
            .basic_auth(&self.config.user, Some(&self.config.password))
            .json(&body)
            .send()
            .map_err(|e| MetricsError::remote_service(format!("page create failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetricsError::remote_service(format!(
                "page create returned {status}"
            )));
        }

        let created: ContentRef = response
            .json()
            .map_err(|e| MetricsError::remote_service(format!("invalid create response: {e}")))?;
        Ok(created.id)
    }

    /// Replaces the body of `page_id` with `content` (storage format),
    /// bumping the page's stored version number.
    pub fn update_page(&self, page_id: &str, content: &str) -> Result<(), MetricsError> {
        let page_url = format!("{}/{page_id}", self.content_url());
        let response = self
            .http()?
            .get(&page_url)
            .basic_auth(&self.config.user, Some(&self.config.password))
            .query(&[("expand", "version")])
            .send()
            .map_err(|e| MetricsError::remote_service(format!("page fetch failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetricsError::remote_service(format!(
                "page fetch returned {status}"
            )));
        }

        let page: PageVersion = response
            .json()
            .map_err(|e| MetricsError::remote_service(format!("invalid page response: {e}")))?;

        let body = json!({
            "type": "page",
            "title": page.title,
            "body": {"storage": {"value": content, "representation": "storage"}},
            "version": {"number": page.version.number + 1},
        });

        let response = self
            .http()?
            .put(&page_url)
            .basic_auth(&self.config.user, Some(&self.config.password))
            .json(&body)
            .send()
            .map_err(|e| MetricsError::remote_service(format!("page update failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetricsError::remote_service(format!(
                "page update returned {status}"
            )));
        }
        Ok(())
    }

    /// Create-or-update by title. Returns the id of the page that now
    /// holds `content`.
    pub fn publish(
        &self,
        title: &str,
        parent_id: Option<&str>,
        content: &str,
    ) -> Result<String, MetricsError> {
        let page_id = match self.page_id_by_title(title)? {
            Some(id) => id,
            None => self.create_page(title, parent_id)?,
        };
        self.update_page(&page_id, content)?;
        Ok(page_id)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
