use crate::{
    errors::ResolveError,
    providers::web::{WebHit, WebSearchProvider},
};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client as ReqwestClient;
use std::fmt::Debug;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Desktop browser UA. Google serves the legacy markup this scraper reads
/// to plain clients, and blocks UA-less ones outright.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115 Safari/537.36";

pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(4);

/// Scrapes the first organic result off the Google search page.
///
/// Brittle by nature; acceptable as a pragmatic fallback behind the
/// [`WebSearchProvider`] seam. `base_url` exists so tests can point it at
/// a mock server.
#[derive(Clone, Debug)]
pub struct GoogleScrapeSearch {
    client: ReqwestClient,
    base_url: String,
    timeout: Duration,
    link_pattern: Regex,
    snippet_pattern: Regex,
    tag_pattern: Regex,
}

impl GoogleScrapeSearch {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, ResolveError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(ResolveError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            base_url,
            timeout,
            link_pattern: Regex::new(r#"(?i)/url\?q=([^&"]+)"#)?,
            snippet_pattern: Regex::new(r#"(?is)<div class="BNeawe s3v9rd AP7Wnd">(.*?)</div>"#)?,
            tag_pattern: Regex::new(r"<[^>]+>")?,
        })
    }

    /// Percent-decodes the redirect target captured from an `/url?q=` href.
    fn decode_target(&self, raw: &str) -> String {
        Url::parse(&format!("{}/url?q={raw}", self.base_url))
            .ok()
            .and_then(|u| {
                u.query_pairs()
                    .find(|(key, _)| key == "q")
                    .map(|(_, value)| value.into_owned())
            })
            .unwrap_or_else(|| raw.to_string())
    }
}

#[async_trait]
impl WebSearchProvider for GoogleScrapeSearch {
    async fn top_result(&self, query: &str) -> Result<Option<WebHit>, ResolveError> {
        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("num", "1"), ("hl", "th")])
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ResolveError::WebSearchTimeout(self.timeout)
                } else {
                    ResolveError::WebSearchRequest(e)
                }
            })?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "web search returned a non-success page");
            return Ok(None);
        }
        let html = response.text().await.unwrap_or_default();

        let Some(link_caps) = self.link_pattern.captures(&html) else {
            debug!("no organic result link found on the page");
            return Ok(None);
        };
        let link = self.decode_target(&link_caps[1]);

        let snippet = self
            .snippet_pattern
            .captures(&html)
            .map(|caps| {
                self.tag_pattern
                    .replace_all(&caps[1], "")
                    .trim()
                    .to_string()
            })
            .unwrap_or_default();

        Ok(Some(WebHit { link, snippet }))
    }
}
