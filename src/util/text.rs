use std::{collections::HashSet, str::FromStr};

use anyhow::{anyhow, Result};
use rust_decimal::{Decimal, RoundingStrategy};

const NUMBER_ESCAPE_CHAR: &[char] = &['%', ',', ' ', '"', '\n', '\u{a0}'];

/// Parses a decimal value from a given string.
///
/// This function accepts a string representation of a decimal number,
/// potentially containing commas as thousands separators and other escape characters,
/// and attempts to convert it into a `Decimal`. If the conversion fails, an error is returned.
///
/// # Arguments
///
/// * `s`: A string slice containing the representation of a decimal number
///   that may include commas as thousands separators and other escape characters.
/// * `escape_chars`: Optional characters to be escaped from the input string.
///
/// # Returns
///
/// * `Result<Decimal>`: The parsed `Decimal` value if successful, or an error
///   if the conversion fails.
///
/// # Example
///
/// ```text
/// let s = "1,234.56";
/// let decimal_value = parse_decimal(s, Some(vec![','])).unwrap();
/// ```
pub fn parse_decimal(s: &str, escape_chars: Option<Vec<char>>) -> Result<Decimal> {
    let cleaned = clean_escape_chars(s, escape_chars);
    Decimal::from_str(&cleaned)
        .map_err(|why| anyhow!("Failed to parse '{}' as Decimal because {:?}", cleaned, why))
}

/// Parses a price as the page shows it, e.g. `"7,845.12 AED"`.
///
/// The currency code is dropped before parsing. Returns `None` when the
/// remaining text is not a number.
pub fn parse_price(s: &str, currency: &str) -> Option<Decimal> {
    let without_currency = if currency.is_empty() {
        s.to_string()
    } else {
        s.replace(currency, "")
    };

    parse_decimal(without_currency.trim(), None).ok()
}

/// 去掉千分位與小數點後，是否為純數字
pub fn is_plain_number(s: &str) -> bool {
    let digits = s.replace([',', '.'], "");
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Formats a monetary value with thousands separators and two decimals,
/// e.g. `85199.4148` becomes `85,199.41`. Extra digits are cut, not rounded.
pub fn format_amount(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::ToZero);
    let text = format!("{:.2}", rounded.abs());
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(text.len() + integer.len() / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    format!("{sign}{grouped}.{fraction}")
}

/// Same as [`format_amount`] but always carries a sign: `+12.50`, `-3.20`.
pub fn format_signed(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::ToZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        '-'
    } else {
        '+'
    };

    format!("{}{}", sign, format_amount(rounded.abs()))
}

pub fn format_signed_percent(value: Decimal) -> String {
    format!("{}%", format_signed(value))
}

/// Escapes the characters legacy Telegram Markdown treats as markup.
pub fn escape_markdown(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Removes a set of escape characters from a given string.
///
/// # Arguments
///
/// * `s`: The original string from which escape characters will be removed.
/// * `escape_chars`: Optional characters that will be removed from the
///   string if found, on top of the default number escape characters.
pub(crate) fn clean_escape_chars(s: &str, escape_chars: Option<Vec<char>>) -> String {
    let mut combined: Vec<char> = NUMBER_ESCAPE_CHAR.to_vec();
    if let Some(ec) = escape_chars {
        combined.extend(ec);
    }

    let filters = combined.iter().collect::<HashSet<_>>();
    s.chars().filter(|c| !filters.contains(c)).collect()
}
