// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Best-effort URL metadata enrichment.
//!
//! Fetches a page and scrapes title, meta description, and og:image with
//! plain string scanning. Everything here is advisory: a failed fetch or
//! an unparseable page yields empty metadata, never an error, and nothing
//! in the resource lifecycle depends on this module.

use crate::error::AppError;
use serde::Serialize;
use std::time::Duration;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "Mozilla/5.0 (compatible; LinkStash/0.1)";

/// Scraped page metadata; every field is optional.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UrlMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// URL metadata fetcher.
#[derive(Clone)]
pub struct EnrichmentService {
    http: reqwest::Client,
}

impl EnrichmentService {
    pub fn new() -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client: {}", e)))?;
        Ok(Self { http })
    }

    /// Fetch and scrape a page. Best-effort: failures return empty metadata.
    pub async fn fetch_metadata(&self, url: &str) -> UrlMetadata {
        let response = match self.http.get(url).send().await {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                tracing::debug!(url, status = %r.status(), "Enrichment fetch non-success");
                return UrlMetadata::default();
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "Enrichment fetch failed");
                return UrlMetadata::default();
            }
        };

        match response.text().await {
            Ok(html) => scrape_metadata(&html),
            Err(e) => {
                tracing::debug!(url, error = %e, "Enrichment body read failed");
                UrlMetadata::default()
            }
        }
    }
}

/// Pull title, meta description, and og:image out of an HTML document.
pub fn scrape_metadata(html: &str) -> UrlMetadata {
    UrlMetadata {
        title: extract_title(html),
        description: extract_meta_content(html, "name", "description"),
        image: extract_meta_content(html, "property", "og:image"),
    }
}

fn extract_title(html: &str) -> Option<String> {
    // ASCII lowercasing preserves byte offsets into the original.
    let lower = html.to_ascii_lowercase();
    let open = lower.find("<title")?;
    let start = open + lower[open..].find('>')? + 1;
    let end = start + lower[start..].find("</title>")?;
    let title = html[start..end].trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// Find `<meta {key_attr}="{key_val}" ... content="...">` (attribute order
/// agnostic) and return the content value.
fn extract_meta_content(html: &str, key_attr: &str, key_val: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    let needle_double = format!("{}=\"{}\"", key_attr, key_val);
    let needle_single = format!("{}='{}'", key_attr, key_val);

    let mut search_from = 0;
    while let Some(rel) = lower[search_from..].find("<meta") {
        let tag_start = search_from + rel;
        let tag_end = tag_start + lower[tag_start..].find('>')?;
        let tag_lower = &lower[tag_start..tag_end];

        if tag_lower.contains(&needle_double) || tag_lower.contains(&needle_single) {
            let tag = &html[tag_start..tag_end];
            if let Some(content) = extract_attr(tag, tag_lower, "content") {
                return Some(content);
            }
        }
        search_from = tag_end;
    }
    None
}

fn extract_attr(tag: &str, tag_lower: &str, attr: &str) -> Option<String> {
    for quote in ['"', '\''] {
        let needle = format!("{}={}", attr, quote);
        if let Some(pos) = tag_lower.find(&needle) {
            let start = pos + needle.len();
            let end = start + tag[start..].find(quote)?;
            let value = tag[start..end].trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}
