use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{declare::PriceQuote, logging, util::datetime};

/// `dbXRates/{currency}` 回應
#[derive(Deserialize, Debug, Clone)]
struct Feed {
    items: Option<Vec<Item>>,
}

/// 報價項目，只取金價相關欄位。
#[derive(Deserialize, Debug, Clone)]
struct Item {
    /// 每盎司金價
    #[serde(rename = "xauPrice")]
    xau_price: Option<f64>,
    /// 漲跌
    #[serde(rename = "chgXau")]
    chg_xau: Option<f64>,
    /// 漲跌幅(%)
    #[serde(rename = "pcXau")]
    pc_xau: Option<f64>,
}

/// Extracts a quote from the JSON price feed.
///
/// Only the first item counts. Payloads that are not JSON, or carry no
/// items, yield `None`. Missing numbers are read as zero.
pub fn extract(payload: &str) -> Option<PriceQuote> {
    let feed = match serde_json::from_str::<Feed>(payload) {
        Ok(feed) => feed,
        Err(why) => {
            logging::error_file_async(format!(
                "Failed to parse gold price feed because {:?}",
                why
            ));
            return None;
        }
    };

    let item = feed.items?.into_iter().next()?;
    let Some(mut quote) = ounce_quote(item.xau_price) else {
        logging::warn_file_async(format!(
            "Gold price {:?} is out of range for unit conversion",
            item.xau_price
        ));
        return None;
    };
    quote.change = Some(to_decimal(item.chg_xau));
    quote.change_percent = Some(to_decimal(item.pc_xau));
    quote.observed_at = Some(datetime::now_in_quote_zone());

    Some(quote)
}

/// 金價無值時視為 0；有值卻超出 `Decimal` 範圍則不產生報價
fn ounce_quote(xau_price: Option<f64>) -> Option<PriceQuote> {
    let per_ounce = match xau_price {
        Some(price) => Decimal::try_from(price).ok()?,
        None => Decimal::ZERO,
    };

    PriceQuote::from_ounce(per_ounce)
}

/// 無值或無法轉換 (NaN、無限大) 時視為 0
fn to_decimal(value: Option<f64>) -> Decimal {
    value
        .and_then(|v| Decimal::try_from(v).ok())
        .unwrap_or(Decimal::ZERO)
}
