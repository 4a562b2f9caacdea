use scraper::Html;

use crate::{
    declare::{Amount, PriceQuote},
    logging,
    util::{http::element, text},
};

/// 頁面上方報價列的元素 id
const OUNCE_ID: &str = "#gpxtickerLeft_price";
const GRAM_ID: &str = "#gpxtickerLeft_price_gram";
const KILO_ID: &str = "#gpxtickerLeft_price_kilo";
/// 泛用的價格標記
const PRICE_SPANS: &str = "span.price";
/// 主要報價區塊
const MAIN_DISPLAY: &str = ".gpxMainPriceValue, .price-value, [data-price]";

/// Price texts exactly as one strategy found them on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedPrices {
    /// 只有報價列可能缺少盎司價
    pub ounce: Option<String>,
    pub gram: Option<String>,
    pub kilo: Option<String>,
}

impl ScrapedPrices {
    fn ounce_only(ounce: String) -> Self {
        ScrapedPrices {
            ounce: Some(ounce),
            gram: None,
            kilo: None,
        }
    }
}

/// One self-contained way of finding the gold price on the page.
pub trait PriceStrategy: Sync {
    fn name(&self) -> &'static str;
    fn attempt(&self, document: &Html, currency: &str) -> Option<ScrapedPrices>;
}

/// 1. The ticker's well-known ids, taken without numeric validation.
///
/// Any one of the three ids resolving ends the search, so the generic
/// strategies never replace a ticker that is only partly filled in.
pub struct TickerIds;

impl PriceStrategy for TickerIds {
    fn name(&self) -> &'static str {
        "ticker-ids"
    }

    fn attempt(&self, document: &Html, _currency: &str) -> Option<ScrapedPrices> {
        let prices = ScrapedPrices {
            ounce: element::select_text(document, OUNCE_ID),
            gram: element::select_text(document, GRAM_ID),
            kilo: element::select_text(document, KILO_ID),
        };

        if prices.ounce.is_none() && prices.gram.is_none() && prices.kilo.is_none() {
            return None;
        }

        Some(prices)
    }
}

/// 2. The first `span.price` whose text carries the currency code or is a
/// plain number (digits with `,` and `.`). Both checks look at the same
/// non-blank candidate.
pub struct PriceSpans;

impl PriceStrategy for PriceSpans {
    fn name(&self) -> &'static str {
        "price-spans"
    }

    fn attempt(&self, document: &Html, currency: &str) -> Option<ScrapedPrices> {
        element::select_texts(document, PRICE_SPANS)
            .ok()?
            .into_iter()
            .find(|candidate| {
                !candidate.is_empty()
                    && ((!currency.is_empty() && candidate.contains(currency))
                        || text::is_plain_number(candidate))
            })
            .map(ScrapedPrices::ounce_only)
    }
}

/// 3. The main price container, taken verbatim.
pub struct MainDisplay;

impl PriceStrategy for MainDisplay {
    fn name(&self) -> &'static str {
        "main-display"
    }

    fn attempt(&self, document: &Html, _currency: &str) -> Option<ScrapedPrices> {
        element::select_text(document, MAIN_DISPLAY).map(ScrapedPrices::ounce_only)
    }
}

/// Strategies from most specific to most generic. The first hit wins.
pub static STRATEGIES: [&dyn PriceStrategy; 3] = [&TickerIds, &PriceSpans, &MainDisplay];

/// Runs the strategies in order and reports which one matched.
pub fn resolve(document: &Html, currency: &str) -> Option<(&'static str, ScrapedPrices)> {
    STRATEGIES.iter().find_map(|strategy| {
        strategy
            .attempt(document, currency)
            .map(|prices| (strategy.name(), prices))
    })
}

/// Extracts a quote from the goldprice.org page.
///
/// A page where no strategy matches yields `None`; markup drift is expected,
/// not exceptional. So does a ticker that shows gram or kilo but no ounce.
pub fn extract(html: &str, currency: &str) -> Option<PriceQuote> {
    let document = Html::parse_document(html);
    let (strategy, prices) = resolve(&document, currency)?;
    logging::debug_file_async(format!("Gold price found by {}: {:?}", strategy, prices));

    let Some(ounce) = prices.ounce else {
        logging::warn_file_async(format!(
            "{} found gram/kilo prices but no ounce price",
            strategy
        ));
        return None;
    };

    Some(normalize(ounce, prices.gram, prices.kilo, currency))
}

/// Turns page texts into a quote. Texts that parse as numbers become exact
/// amounts; gram and kilo missing from the page are derived from the ounce
/// unless the derivation overflows.
fn normalize(
    ounce: String,
    gram: Option<String>,
    kilo: Option<String>,
    currency: &str,
) -> PriceQuote {
    let per_ounce = to_amount(ounce, currency);
    let derived = per_ounce.as_decimal().and_then(PriceQuote::from_ounce);

    let per_gram = gram
        .map(|gram| to_amount(gram, currency))
        .or_else(|| derived.as_ref().and_then(|q| q.per_gram.clone()));
    let per_kilo = kilo
        .map(|kilo| to_amount(kilo, currency))
        .or_else(|| derived.and_then(|q| q.per_kilo));

    PriceQuote {
        per_ounce,
        per_gram,
        per_kilo,
        change: None,
        change_percent: None,
        observed_at: None,
    }
}

fn to_amount(raw: String, currency: &str) -> Amount {
    match text::parse_price(&raw, currency) {
        Some(value) => Amount::Exact(value),
        None => Amount::Scraped(raw),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    const TICKER_PAGE: &str = r#"
        <html><body>
          <div class="ticker">
            <span id="gpxtickerLeft_price">9,734.58</span>
            <span id="gpxtickerLeft_price_gram">313.00</span>
            <span id="gpxtickerLeft_price_kilo">312,972.25</span>
          </div>
          <span class="price">1.00</span>
          <div class="gpxMainPriceValue">1,111.11</div>
        </body></html>"#;

    const SPANS_PAGE: &str = r#"
        <html><body>
          <span class="price">Live</span>
          <span class="price">   </span>
          <span class="price">9,734.58 AED</span>
          <span class="price">8,888.88</span>
          <div class="price-value">1,111.11</div>
        </body></html>"#;

    const MAIN_PAGE: &str = r#"
        <html><body>
          <span class="price">Buy gold</span>
          <div data-price="1">Price: 9,734.58</div>
        </body></html>"#;

    fn strategy_for(html: &str) -> Option<&'static str> {
        resolve(&Html::parse_document(html), "AED").map(|(name, _)| name)
    }

    #[test]
    fn test_strategy_order() {
        let names: Vec<&str> = STRATEGIES.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["ticker-ids", "price-spans", "main-display"]);
    }

    #[test]
    fn test_ticker_ids_win() {
        assert_eq!(strategy_for(TICKER_PAGE), Some("ticker-ids"));

        let quote = extract(TICKER_PAGE, "AED").unwrap();
        assert_eq!(quote.per_ounce, Amount::Exact(dec!(9734.58)));
        assert_eq!(quote.per_gram, Some(Amount::Exact(dec!(313.00))));
        assert_eq!(quote.per_kilo, Some(Amount::Exact(dec!(312972.25))));
        assert_eq!(quote.change, None);
        assert_eq!(quote.observed_at, None);
    }

    #[test]
    fn test_spans_only_page_uses_price_spans() {
        assert_eq!(strategy_for(SPANS_PAGE), Some("price-spans"));

        let (_, prices) = resolve(&Html::parse_document(SPANS_PAGE), "AED").unwrap();
        assert_eq!(prices, ScrapedPrices::ounce_only("9,734.58 AED".to_string()));
    }

    #[test]
    fn test_price_spans_accept_plain_numbers() {
        let page = r#"<span class="price">Live</span><span class="price">9,734.58</span>"#;
        let (name, prices) = resolve(&Html::parse_document(page), "USD").unwrap();

        assert_eq!(name, "price-spans");
        assert_eq!(prices.ounce.as_deref(), Some("9,734.58"));
    }

    #[test]
    fn test_main_display_is_last_resort() {
        assert_eq!(strategy_for(MAIN_PAGE), Some("main-display"));

        let quote = extract(MAIN_PAGE, "AED").unwrap();
        assert_eq!(quote.per_ounce, Amount::Scraped("Price: 9,734.58".to_string()));
        assert_eq!(quote.per_gram, None);
        assert_eq!(quote.per_kilo, None);
    }

    #[test]
    fn test_blank_ticker_falls_through() {
        let page = r#"
            <span id="gpxtickerLeft_price"> </span>
            <span id="gpxtickerLeft_price_gram"></span>
            <span class="price">9,734.58</span>"#;

        assert_eq!(strategy_for(page), Some("price-spans"));
    }

    #[test]
    fn test_partial_ticker_stops_the_search() {
        let page = r#"
            <span id="gpxtickerLeft_price_gram">313.00</span>
            <span class="price">1.00</span>
            <div class="gpxMainPriceValue">1,111.11</div>"#;
        let (name, prices) = resolve(&Html::parse_document(page), "AED").unwrap();

        assert_eq!(name, "ticker-ids");
        assert_eq!(prices.ounce, None);
        assert_eq!(prices.gram.as_deref(), Some("313.00"));
        assert_eq!(extract(page, "AED"), None);
    }

    #[test]
    fn test_huge_ounce_skips_derivation() {
        let page = r#"<span id="gpxtickerLeft_price">79,228,162,514,264,337,593,543,950,335</span>"#;
        let quote = extract(page, "AED").unwrap();

        assert_eq!(quote.per_ounce, Amount::Exact(rust_decimal::Decimal::MAX));
        assert_eq!(quote.per_gram, None);
        assert_eq!(quote.per_kilo, None);
    }

    #[test]
    fn test_nothing_matches() {
        let page = r#"<html><body><p>Service temporarily unavailable</p>
            <span class="price">Buy now</span></body></html>"#;

        assert_eq!(strategy_for(page), None);
        assert_eq!(extract(page, "AED"), None);
        assert_eq!(extract("", "AED"), None);
    }

    #[test]
    fn test_gram_and_kilo_derived_from_ounce() {
        let quote = extract(SPANS_PAGE, "AED").unwrap();
        let gram = quote.per_gram.as_ref().and_then(Amount::as_decimal).unwrap();
        let kilo = quote.per_kilo.as_ref().and_then(Amount::as_decimal).unwrap();

        assert_eq!(quote.per_ounce, Amount::Exact(dec!(9734.58)));
        assert_eq!(gram.round_dp(2), dec!(312.97));
        assert_eq!(kilo, gram * dec!(1000));
    }

    #[test]
    fn test_page_gram_wins_over_derived() {
        let page = r#"
            <span id="gpxtickerLeft_price">9,734.58</span>
            <span id="gpxtickerLeft_price_gram">n/a</span>"#;
        let quote = extract(page, "AED").unwrap();

        assert_eq!(quote.per_gram, Some(Amount::Scraped("n/a".to_string())));
        assert!(quote.per_kilo.as_ref().and_then(Amount::as_decimal).is_some());
    }

    #[test]
    fn test_extract_is_repeatable() {
        assert_eq!(extract(TICKER_PAGE, "AED"), extract(TICKER_PAGE, "AED"));
    }
}
