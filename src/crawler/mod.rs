//! # 金價採集模組
//!
//! 一次查詢 = 一次對上游的請求 + 一次解析：
//!
//! - [`PriceSource`]：對設定好的端點發出請求，取回原始內容 ([`RawSource`])。
//! - [`goldprice`]：依序套用解析策略，換算單位後產生 [`PriceQuote`]。
//! - [`Quoter`]：把兩者串起來，失敗一律以 [`QuoteError`] 回報，不會 panic。

use async_trait::async_trait;
use reqwest::{
    header::{self, HeaderValue},
    StatusCode,
};
use thiserror::Error;

use crate::{
    config,
    declare::{PriceQuote, SourceMode},
    logging,
    util::http::{self, RequestOptions},
};

/// goldprice.org 頁面與報價 API
pub mod goldprice;

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: StatusCode },
    #[error("failed to reach {url}: {reason}")]
    Network { url: String, reason: String },
    #[error("no extraction strategy produced a gold price")]
    Empty,
}

impl QuoteError {
    /// Whether the failure happened before any content was extracted.
    pub fn is_fetch(&self) -> bool {
        !matches!(self, QuoteError::Empty)
    }
}

/// Upstream content for exactly one extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawSource {
    Html(String),
    Json(String),
}

#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch(&self) -> Result<RawSource, QuoteError>;
}

/// The configured goldprice.org endpoint, reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    mode: SourceMode,
    url: String,
    options: RequestOptions,
}

impl HttpSource {
    pub fn new(gold: &config::Gold) -> Self {
        HttpSource {
            mode: gold.mode,
            url: gold.endpoint(),
            options: gold.request_options(),
        }
    }
}

#[async_trait]
impl PriceSource for HttpSource {
    async fn fetch(&self) -> Result<RawSource, QuoteError> {
        fetch_raw(self.mode, &self.url, self.options).await
    }
}

/// Fetches the endpoint once (plus configured retries on transport errors).
///
/// Any non-success status, timeout or network failure becomes a `QuoteError`.
pub async fn fetch_raw(
    mode: SourceMode,
    url: &str,
    options: RequestOptions,
) -> Result<RawSource, QuoteError> {
    let mut headers = header::HeaderMap::new();
    let accept = match mode {
        SourceMode::Html => "text/html,application/xhtml+xml",
        SourceMode::Json => "application/json",
    };
    headers.insert(header::ACCEPT, HeaderValue::from_static(accept));

    let res = http::get_response(url, Some(headers), options)
        .await
        .map_err(|why| classify(url, why))?;

    let status = res.status();
    if !status.is_success() {
        return Err(QuoteError::Status {
            url: url.to_string(),
            status,
        });
    }

    let body = res
        .text()
        .await
        .map_err(|why| classify(url, anyhow::Error::from(why)))?;

    Ok(match mode {
        SourceMode::Html => RawSource::Html(body),
        SourceMode::Json => RawSource::Json(body),
    })
}

fn classify(url: &str, why: anyhow::Error) -> QuoteError {
    match why.downcast_ref::<reqwest::Error>() {
        Some(e) if e.is_timeout() => QuoteError::Timeout {
            url: url.to_string(),
        },
        _ => QuoteError::Network {
            url: url.to_string(),
            reason: format!("{:#}", why),
        },
    }
}

/// fetch → extract
pub struct Quoter<S> {
    source: S,
    currency: String,
}

impl<S: PriceSource> Quoter<S> {
    pub fn new(source: S, currency: &str) -> Self {
        Quoter {
            source,
            currency: currency.to_string(),
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Builds a fresh quote. Nothing is cached between calls.
    pub async fn quote(&self) -> Result<PriceQuote, QuoteError> {
        let raw = self.source.fetch().await.inspect_err(|why| {
            logging::error_file_async(format!("Failed to fetch gold price because {}", why));
        })?;

        goldprice::extract(&raw, &self.currency).ok_or_else(|| {
            logging::warn_file_async(format!(
                "Fetched {} gold price content but no strategy matched",
                match raw {
                    RawSource::Html(_) => "HTML",
                    RawSource::Json(_) => "JSON",
                }
            ));
            QuoteError::Empty
        })
    }
}
