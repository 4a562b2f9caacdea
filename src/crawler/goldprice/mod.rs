//! # goldprice.org 金價解析
//!
//! - **頁面 (`page`)**：爬取 HTML，依固定順序嘗試三種解析策略。
//! - **報價 API (`feed`)**：解析 `dbXRates/{currency}` 回傳的 JSON。
//!
//! 兩者最後都輸出 [`PriceQuote`]；找不到價格時回傳 `None`，不視為錯誤。

use crate::{crawler::RawSource, declare::PriceQuote};

/// JSON 報價 API
pub mod feed;
/// HTML 頁面
pub mod page;

/// Dispatches raw upstream content to the matching extractor.
pub fn extract(raw: &RawSource, currency: &str) -> Option<PriceQuote> {
    match raw {
        RawSource::Html(html) => page::extract(html, currency),
        RawSource::Json(payload) => feed::extract(payload),
    }
}
