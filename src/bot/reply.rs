use concat_string::concat_string;

use crate::{
    crawler::QuoteError,
    declare::{Amount, PriceQuote},
    util::{datetime, text},
};

pub const FETCHING: &str = "⏳ Fetching current gold prices...";

pub const FAILURE: &str =
    "❌ Sorry, I couldn't fetch the gold prices at the moment. Please try again later.";

const SOURCE_FOOTER: &str = "_Source: goldprice.org_";

pub fn welcome(currency: &str) -> String {
    format!(
        "🥇 *Welcome to Gold Price Bot!*\n\n\
         I can help you check the current gold prices in {currency}.\n\n\
         *Available Commands:*\n\
         /gold - Get current gold prices in {currency}\n\
         /help - Show this help message\n\n\
         {SOURCE_FOOTER}"
    )
}

pub fn help(currency: &str) -> String {
    format!(
        "🥇 *Gold Price Bot Help*\n\n\
         *Commands:*\n\
         /start - Start the bot\n\
         /gold - Get current gold prices in {currency}\n\
         /help - Show this help message\n\n\
         *About:*\n\
         This bot fetches live gold prices from goldprice.org and displays them in {currency}."
    )
}

/// Renders the outcome of one quote request.
///
/// Every failure, whatever its kind, renders as [`FAILURE`].
pub fn quote_message(result: &Result<PriceQuote, QuoteError>, currency: &str) -> String {
    match result {
        Ok(quote) => render_quote(quote, currency),
        Err(_) => FAILURE.to_string(),
    }
}

fn render_quote(quote: &PriceQuote, currency: &str) -> String {
    let mut msg = concat_string!("🥇 *Current Gold Prices in ", currency, "*\n\n");

    msg.push_str(&price_line("Ounce", &quote.per_ounce, currency));
    if let Some(gram) = &quote.per_gram {
        msg.push_str(&price_line("Gram", gram, currency));
    }
    if let Some(kilo) = &quote.per_kilo {
        msg.push_str(&price_line("Kilo", kilo, currency));
    }

    if let (Some(change), Some(trend)) = (quote.change, quote.trend()) {
        msg.push_str(&concat_string!(
            "\n",
            trend.emoji(),
            " *Change:* ",
            text::format_signed(change),
            " ",
            currency
        ));
        if let Some(percent) = quote.change_percent {
            msg.push_str(&concat_string!(" (", text::format_signed_percent(percent), ")"));
        }
        msg.push('\n');
    }

    match &quote.observed_at {
        Some(at) => msg.push_str(&concat_string!(
            "🕒 *Updated:* ",
            datetime::format_quote_time(at),
            "\n"
        )),
        None => msg.push_str("\n_Updated in real-time_\n"),
    }

    msg.push('\n');
    msg.push_str(SOURCE_FOOTER);
    msg
}

fn price_line(unit: &str, value: &Amount, currency: &str) -> String {
    concat_string!("📊 *Per ", unit, ":* ", amount(value, currency), "\n")
}

/// 精確數值補上幣別；頁面原文照登 (需跳脫 Markdown)
fn amount(value: &Amount, currency: &str) -> String {
    match value {
        Amount::Exact(_) => concat_string!(value.to_string(), " ", currency),
        Amount::Scraped(raw) => text::escape_markdown(raw),
    }
}
