use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};

/// Parses a CSS selector, turning the borrowed parse error into an owned one.
pub fn parse_selector(css_selector: &str) -> Result<Selector> {
    Selector::parse(css_selector)
        .map_err(|why| anyhow!("Failed to Selector::parse({}) because: {:?}", css_selector, why))
}

/// Returns the text of an element the way the page shows it: every text node
/// trimmed, then concatenated.
pub fn element_text(element: &ElementRef) -> String {
    element.text().map(str::trim).collect::<String>()
}

/// Extracts the text of the first element matched by `css_selector`.
///
/// Returns `None` when the selector is invalid, nothing matches, or the
/// matched element only holds whitespace.
pub fn select_text(document: &Html, css_selector: &str) -> Option<String> {
    let selector = parse_selector(css_selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element_text(&element))
        .filter(|text| !text.is_empty())
}

/// Extracts the text of every element matched by `css_selector`, in document order.
pub fn select_texts(document: &Html, css_selector: &str) -> Result<Vec<String>> {
    let selector = parse_selector(css_selector)?;
    Ok(document
        .select(&selector)
        .map(|element| element_text(&element))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_text() {
        let document = Html::parse_document(
            r#"<div id="ounce"> 9,734.58
                <small> AED </small></div><div id="blank">   </div>"#,
        );

        assert_eq!(
            select_text(&document, "#ounce"),
            Some("9,734.58AED".to_string())
        );
        assert_eq!(select_text(&document, "#blank"), None);
        assert_eq!(select_text(&document, "#missing"), None);
        assert_eq!(select_text(&document, "##"), None);
    }

    #[test]
    fn test_select_texts() {
        let document = Html::parse_document(
            r#"<span class="price">Gold</span><p class="price">1</p><span class="price"> 2 </span>"#,
        );

        assert_eq!(
            select_texts(&document, "span.price").unwrap(),
            vec!["Gold".to_string(), "2".to_string()]
        );
        assert!(select_texts(&document, "span[").is_err());
    }
}
