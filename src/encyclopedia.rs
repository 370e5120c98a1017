//! Knowledge-base client for the MediaWiki action API
//!
//! Fetches a short summary and the first listed image of an article.
//! Every failure is reported as a [`LookupError`] so callers can decide on
//! a fallback explicitly.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::EncyclopediaConfig;

/// Why an article lookup failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("no article titled '{0}'")]
    NotFound(String),

    #[error("'{0}' is a disambiguation page")]
    Disambiguation(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

/// Summary and lead image of an article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub summary: String,
    pub image_url: Option<String>,
}

#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    async fn lookup(&self, title: &str) -> Result<Article, LookupError>;
}

/// MediaWiki (Wikipedia) API client
pub struct MediaWikiClient {
    client: Client,
    base_url: String,
    summary_sentences: u32,
}

#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub query: Option<QueryPages>,
}

#[derive(Debug, Deserialize)]
pub struct QueryPages {
    #[serde(default)]
    pub pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
pub struct Page {
    pub title: String,
    #[serde(default)]
    pub missing: bool,
    #[serde(default)]
    pub invalid: bool,
    pub extract: Option<String>,
    pub pageprops: Option<PageProps>,
    #[serde(default)]
    pub imageinfo: Vec<ImageInfo>,
}

#[derive(Debug, Deserialize)]
pub struct PageProps {
    pub disambiguation: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ImageInfo {
    pub url: Option<String>,
}

impl QueryResponse {
    /// Title and summary of the requested article.
    pub fn into_summary(self, requested: &str) -> Result<(String, String), LookupError> {
        let page = self
            .query
            .and_then(|q| q.pages.into_iter().next())
            .ok_or_else(|| LookupError::InvalidResponse("no pages in response".to_string()))?;

        if page.missing || page.invalid {
            return Err(LookupError::NotFound(requested.to_string()));
        }
        if page
            .pageprops
            .as_ref()
            .is_some_and(|p| p.disambiguation.is_some())
        {
            return Err(LookupError::Disambiguation(page.title));
        }

        let summary = page.extract.unwrap_or_default().trim().to_string();
        Ok((page.title, summary))
    }

    /// URL of the first image the page lists, if any.
    #[must_use]
    pub fn first_image_url(self) -> Option<String> {
        self.query?
            .pages
            .into_iter()
            .filter_map(|page| page.imageinfo.into_iter().next())
            .find_map(|info| info.url)
    }
}

impl MediaWikiClient {
    pub fn new(config: &EncyclopediaConfig) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                crate::ForageError::config(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            summary_sentences: config.summary_sentences,
        })
    }

    async fn query<T: DeserializeOwned>(&self, params: &str) -> Result<T, LookupError> {
        let url = format!(
            "{}?action=query&format=json&formatversion=2&redirects=1&{params}",
            self.base_url
        );

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Transport(format!("HTTP {status}")));
        }

        response
            .json()
            .await
            .map_err(|e| LookupError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl KnowledgeBase for MediaWikiClient {
    #[instrument(skip(self))]
    async fn lookup(&self, title: &str) -> Result<Article, LookupError> {
        let encoded = urlencoding::encode(title);

        let summary: QueryResponse = self
            .query(&format!(
                "prop=extracts|pageprops&ppprop=disambiguation&exintro=1&explaintext=1&exsentences={}&titles={encoded}",
                self.summary_sentences
            ))
            .await?;
        let (resolved_title, summary) = summary.into_summary(title)?;
        debug!("Summary found for {}", resolved_title);

        let images: QueryResponse = self
            .query(&format!(
                "generator=images&gimlimit=max&prop=imageinfo&iiprop=url&titles={}",
                urlencoding::encode(&resolved_title)
            ))
            .await?;

        Ok(Article {
            title: resolved_title,
            summary,
            image_url: images.first_image_url(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> QueryResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_summary_found() {
        let response = parse(
            r#"{"batchcomplete": true, "query": {"pages": [
                {"pageid": 1, "ns": 0, "title": "Taraxacum",
                 "extract": "Taraxacum is a large genus of flowering plants. They are native to Eurasia."}
            ]}}"#,
        );
        let (title, summary) = response.into_summary("Dandelion").unwrap();
        assert_eq!(title, "Taraxacum");
        assert!(summary.starts_with("Taraxacum is a large genus"));
    }

    #[test]
    fn test_missing_page() {
        let response = parse(
            r#"{"query": {"pages": [{"ns": 0, "title": "Qwxzy Plant", "missing": true}]}}"#,
        );
        assert_eq!(
            response.into_summary("Qwxzy Plant").unwrap_err(),
            LookupError::NotFound("Qwxzy Plant".to_string())
        );
    }

    #[test]
    fn test_disambiguation_page() {
        let response = parse(
            r#"{"query": {"pages": [
                {"pageid": 7, "title": "Taro (disambiguation)", "extract": "Taro may refer to:",
                 "pageprops": {"disambiguation": ""}}
            ]}}"#,
        );
        assert!(matches!(
            response.into_summary("Taro"),
            Err(LookupError::Disambiguation(_))
        ));
    }

    #[test]
    fn test_no_query_is_invalid() {
        let response = parse(r#"{"batchcomplete": true}"#);
        assert!(matches!(
            response.into_summary("x"),
            Err(LookupError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_first_image_url_skips_pages_without_info() {
        let response = parse(
            r#"{"query": {"pages": [
                {"title": "File:Missing.svg", "missing": true},
                {"title": "File:Nettle.jpg", "imageinfo": [{"url": "https://upload.wikimedia.org/nettle.jpg"}]},
                {"title": "File:Other.jpg", "imageinfo": [{"url": "https://upload.wikimedia.org/other.jpg"}]}
            ]}}"#,
        );
        assert_eq!(
            response.first_image_url().as_deref(),
            Some("https://upload.wikimedia.org/nettle.jpg")
        );
    }

    #[test]
    fn test_page_without_images() {
        let response = parse(r#"{"batchcomplete": true}"#);
        assert!(response.first_image_url().is_none());
    }
}
