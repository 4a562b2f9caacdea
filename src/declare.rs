use std::fmt;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::util::text;

/// 1 金衡盎司 = 31.1035 公克
pub const GRAMS_PER_TROY_OUNCE: Decimal = dec!(31.1035);

/// 1 公斤 = 1000 公克
pub const GRAMS_PER_KILO: Decimal = dec!(1000);

/// 報價時間固定以 UTC+4 (Asia/Dubai) 呈現
pub const QUOTE_UTC_OFFSET_SECS: i32 = 4 * 60 * 60;

/// 報價來源
#[derive(Serialize, Deserialize, Debug, Display, EnumString, Copy, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SourceMode {
    /// 爬取 HTML 頁面
    Html,
    /// 呼叫 JSON 報價 API
    #[default]
    Json,
}

/// 漲跌方向
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    /// Non-negative change counts as upward.
    pub fn from_change(change: Decimal) -> Self {
        if change.is_sign_negative() && !change.is_zero() {
            Trend::Down
        } else {
            Trend::Up
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Trend::Up => "📈",
            Trend::Down => "📉",
        }
    }
}

/// A price in one unit denomination.
///
/// `Exact` values come from the JSON feed or from scraped text that parsed as
/// a number. `Scraped` keeps page text verbatim when it could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Amount {
    Exact(Decimal),
    Scraped(String),
}

impl Amount {
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Amount::Exact(value) => Some(*value),
            Amount::Scraped(_) => None,
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Exact(value) => f.write_str(&text::format_amount(*value)),
            Amount::Scraped(raw) => f.write_str(raw),
        }
    }
}

/// 一次查詢得到的金價快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuote {
    /// 每盎司價格
    pub per_ounce: Amount,
    /// 每公克價格
    pub per_gram: Option<Amount>,
    /// 每公斤價格
    pub per_kilo: Option<Amount>,
    /// 漲跌
    pub change: Option<Decimal>,
    /// 漲跌幅(%)
    pub change_percent: Option<Decimal>,
    /// 報價時間 (UTC+4)，HTML 模式無此資訊
    pub observed_at: Option<DateTime<FixedOffset>>,
}

impl PriceQuote {
    /// Builds a quote from an exact per-ounce price, deriving gram and kilo.
    ///
    /// Returns `None` when the derived values do not fit in a `Decimal`.
    pub fn from_ounce(per_ounce: Decimal) -> Option<Self> {
        let per_gram = ounce_to_gram(per_ounce)?;
        let per_kilo = gram_to_kilo(per_gram)?;

        Some(PriceQuote {
            per_ounce: Amount::Exact(per_ounce),
            per_gram: Some(Amount::Exact(per_gram)),
            per_kilo: Some(Amount::Exact(per_kilo)),
            change: None,
            change_percent: None,
            observed_at: None,
        })
    }

    pub fn trend(&self) -> Option<Trend> {
        self.change.map(Trend::from_change)
    }
}

pub fn ounce_to_gram(per_ounce: Decimal) -> Option<Decimal> {
    per_ounce.checked_div(GRAMS_PER_TROY_OUNCE)
}

/// 溢位時回傳 `None`
pub fn gram_to_kilo(per_gram: Decimal) -> Option<Decimal> {
    per_gram.checked_mul(GRAMS_PER_KILO)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_from_ounce_is_consistent() {
        let quote = PriceQuote::from_ounce(dec!(2650.00)).unwrap();
        let gram = quote.per_gram.as_ref().and_then(Amount::as_decimal).unwrap();
        let kilo = quote.per_kilo.as_ref().and_then(Amount::as_decimal).unwrap();

        assert_eq!(gram.round_dp(2), dec!(85.20));
        assert_eq!(kilo, gram * dec!(1000));
        assert_eq!(quote.observed_at, None);
    }

    #[test]
    fn test_from_ounce_overflow() {
        assert_eq!(PriceQuote::from_ounce(Decimal::MAX), None);
        assert_eq!(gram_to_kilo(Decimal::MAX / dec!(10)), None);
        assert_eq!(ounce_to_gram(dec!(31.1035)), Some(dec!(1)));
    }

    #[test]
    fn test_trend_from_change() {
        assert_eq!(Trend::from_change(dec!(12.5)), Trend::Up);
        assert_eq!(Trend::from_change(dec!(0)), Trend::Up);
        assert_eq!(Trend::from_change(dec!(-0.0)), Trend::Up);
        assert_eq!(Trend::from_change(dec!(-3.2)), Trend::Down);
    }

    #[test]
    fn test_amount_display() {
        assert_eq!(Amount::Exact(dec!(85199.4148)).to_string(), "85,199.41");
        assert_eq!(
            Amount::Scraped("7,845.12 AED".to_string()).to_string(),
            "7,845.12 AED"
        );
    }

    #[test]
    fn test_source_mode_from_str() {
        assert_eq!(SourceMode::from_str("HTML").unwrap(), SourceMode::Html);
        assert_eq!(SourceMode::from_str("json").unwrap(), SourceMode::Json);
        assert!(SourceMode::from_str("xml").is_err());
        assert_eq!(SourceMode::Html.to_string(), "html");
    }
}
