//! NewsAPI client
//!
//! Queries the `/v2/everything` endpoint, newest articles first. Pages are fetched
//! lazily as the returned stream is polled, each page request paced by a client-side
//! rate limiter and retried with the configured [`RetryPolicy`].

use crate::error::{NewsError, Result};
use crate::source::{NewsQuery, NewsSource};
use chrono::{DateTime, Utc};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use sitrep_core::NewsArticle;
use sitrep_utils::RetryPolicy;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const NEWSAPI_BASE: &str = "https://newsapi.org/v2/";
const PROVIDER: &str = "newsapi";

/// Default page size, the reference deployment's single-page fetch
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// NewsAPI caps `pageSize` at 100
const MAX_PAGE_SIZE: usize = 100;

/// Article as returned by NewsAPI
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewsApiArticle {
    #[serde(default)]
    pub source: NewsApiSource,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct NewsApiSource {
    #[serde(default)]
    pub name: Option<String>,
}

impl NewsApiArticle {
    /// Articles without a URL cannot be identified and are dropped
    pub(crate) fn into_article(self) -> Option<NewsArticle> {
        let url = self.url.filter(|u| !u.trim().is_empty())?;
        Some(NewsArticle::new(
            self.title,
            self.description,
            self.source.name.unwrap_or_default(),
            self.published_at,
            url,
        ))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiResponse {
    status: String,
    #[serde(default)]
    total_results: usize,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// One fetched page
#[derive(Debug)]
struct Page {
    articles: Vec<NewsArticle>,
    total_results: usize,
    received: usize,
}

/// Paging cursor threaded through the lazy stream
#[derive(Debug, Clone, Copy)]
struct Cursor {
    page: usize,
    seen: usize,
    done: bool,
}

/// NewsAPI client with rate limiting, retries and per-call timeout
pub struct NewsApiClient {
    client: Client,
    api_key: String,
    endpoint: Url,
    rate_limiter: SharedRateLimiter,
    retry: RetryPolicy,
    timeout: Duration,
    page_size: usize,
}

impl NewsApiClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `api_key` - NewsAPI key
    /// * `timeout` - Per-request timeout
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let endpoint = Self::endpoint_for(NEWSAPI_BASE)?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint,
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_minute(
                NonZeroU32::new(60).unwrap_or(NonZeroU32::MIN),
            ))),
            retry: RetryPolicy::default(),
            timeout,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Requests per minute allowed by the client-side limiter
    pub fn with_rate_limit(mut self, per_minute: u32) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN));
        self.rate_limiter = Arc::new(RateLimiter::direct(quota));
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Articles per page, clamped to 1..=100
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Use a different API base (e.g. a caching proxy)
    pub fn with_api_base(mut self, api_base: &str) -> Result<Self> {
        self.endpoint = Self::endpoint_for(api_base)?;
        Ok(self)
    }

    fn endpoint_for(api_base: &str) -> Result<Url> {
        let base = if api_base.ends_with('/') {
            api_base.to_string()
        } else {
            format!("{api_base}/")
        };
        Url::parse(&base)
            .and_then(|u| u.join("everything"))
            .map_err(|e| NewsError::ConfigError(format!("invalid news API base {api_base}: {e}")))
    }

    /// Fetch one page, retrying transient failures
    #[instrument(skip(self, query), fields(query = %query.query))]
    async fn fetch_page(&self, query: &NewsQuery, page: usize) -> Result<Page> {
        self.retry
            .execute("newsapi.everything", || async move {
                tokio::time::timeout(self.timeout, self.request_page(query, page))
                    .await
                    .map_err(|_| NewsError::Timeout(self.timeout))?
            })
            .await
    }

    async fn request_page(&self, query: &NewsQuery, page: usize) -> Result<Page> {
        self.rate_limiter.until_ready().await;

        let from = query.window.from.to_string();
        let to = query.window.to.to_string();
        let page_size = self.page_size.to_string();
        let page_number = page.to_string();

        let response = self
            .client
            .get(self.endpoint.clone())
            .header("X-Api-Key", &self.api_key)
            .query(&[
                ("q", query.query.as_str()),
                ("language", query.language.as_str()),
                ("from", from.as_str()),
                ("to", to.as_str()),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
                ("page", page_number.as_str()),
            ])
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        parse_page(status, &body)
    }
}

/// Turn a raw HTTP answer into a page or a classified error
fn parse_page(status: u16, body: &str) -> Result<Page> {
    let parsed: std::result::Result<NewsApiResponse, _> = serde_json::from_str(body);

    let parsed = match parsed {
        Ok(parsed) if parsed.status == "ok" && (200..300).contains(&status) => parsed,
        Ok(parsed) => {
            return Err(classify_failure(
                status,
                parsed.code.as_deref(),
                parsed.message.unwrap_or_default(),
            ));
        }
        Err(_) if !(200..300).contains(&status) => {
            return Err(classify_failure(status, None, body.to_string()));
        }
        Err(e) => return Err(NewsError::Malformed(e.to_string())),
    };

    let received = parsed.articles.len();
    let articles = parsed
        .articles
        .into_iter()
        .filter_map(NewsApiArticle::into_article)
        .collect();

    Ok(Page {
        articles,
        total_results: parsed.total_results,
        received,
    })
}

fn classify_failure(status: u16, code: Option<&str>, message: String) -> NewsError {
    match (status, code) {
        // apiKeyExhausted arrives as a 401 but means the quota is used up
        (429, _) | (_, Some("rateLimited" | "apiKeyExhausted")) => NewsError::RateLimitExceeded {
            provider: PROVIDER.to_string(),
            message,
        },
        (401, _) | (_, Some("apiKeyInvalid" | "apiKeyMissing" | "apiKeyDisabled")) => {
            NewsError::Unauthorized(message)
        }
        (500..=599, _) | (_, Some("unexpectedError")) => NewsError::ServerError { status, message },
        (_, code) => NewsError::Rejected {
            code: code.map_or_else(|| format!("HTTP {status}"), str::to_string),
            message,
        },
    }
}

impl NewsSource for NewsApiClient {
    fn fetch<'a>(&'a self, query: &'a NewsQuery) -> BoxStream<'a, Result<NewsArticle>> {
        info!(
            "Querying NewsAPI for '{}' ({}, {})",
            query.query, query.language, query.window
        );

        let start = Cursor {
            page: 1,
            seen: 0,
            done: false,
        };

        stream::try_unfold(start, move |cursor| async move {
            if cursor.done {
                return Ok(None);
            }

            let page = self.fetch_page(query, cursor.page).await?;
            let seen = cursor.seen + page.received;
            let done = page.received < self.page_size
                || seen >= page.total_results
                || seen + self.page_size > MAX_PAGE_SIZE;
            debug!(
                "Page {} returned {} articles ({}/{} total)",
                cursor.page, page.received, seen, page.total_results
            );

            let next = Cursor {
                page: cursor.page + 1,
                seen,
                done,
            };
            Ok::<_, NewsError>(Some((stream::iter(page.articles.into_iter().map(Ok)), next)))
        })
        .try_flatten()
        .boxed()
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
