//! Field extraction from scraped pages.
//!
//! Nothing in here fails: a selector that matches nothing yields the
//! `UNAVAILABLE` sentinel (or zero for numbers), so layout drift on one field
//! never aborts a deputy's collection.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::models::Amount;

/// Text returned when a selector matches nothing.
pub const UNAVAILABLE: &str = "unavailable";

/// A parsed HTML page.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }

    fn select_all(&self, selector: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(selector) {
            Ok(sel) => self.html.select(&sel).collect(),
            Err(e) => {
                debug!(selector, error = %e, "Invalid selector");
                Vec::new()
            }
        }
    }
}

fn node_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Trimmed text of the first match, or `UNAVAILABLE`.
pub fn extract_text(doc: &Document, selector: &str) -> String {
    match doc.select_all(selector).first() {
        Some(element) => node_text(element),
        None => {
            debug!(selector, "No match, using sentinel");
            UNAVAILABLE.to_string()
        }
    }
}

/// Attribute of the first match.
pub fn extract_attr(doc: &Document, selector: &str, attr: &str) -> Option<String> {
    extract_attr_list(doc, selector, attr).into_iter().next().flatten()
}

/// Attribute of every match, in document order.
pub fn extract_attr_list(doc: &Document, selector: &str, attr: &str) -> Vec<Option<String>> {
    doc.select_all(selector)
        .iter()
        .map(|element| element.value().attr(attr).map(str::to_string))
        .collect()
}

/// Trimmed text of every match, in document order.
pub fn extract_list(doc: &Document, selector: &str) -> Vec<String> {
    doc.select_all(selector).iter().map(node_text).collect()
}

/// Group a flat cell list into `(label, value, percent)` rows.
/// An incomplete trailing group is dropped.
pub fn triples(cells: &[String]) -> Vec<(String, String, String)> {
    cells
        .chunks_exact(3)
        .map(|c| (c[0].clone(), c[1].clone(), c[2].clone()))
        .collect()
}

fn digits(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Keep only the digits and read them as hundredths: `"R$ 1.234,56"` is
/// 1234.56. No digits at all is zero.
pub fn extract_number(text: &str) -> Amount {
    let digits = digits(text);
    if digits.is_empty() {
        return Amount::ZERO;
    }
    // Saturate rather than fail on absurdly long digit runs.
    Amount::from_cents(digits.parse().unwrap_or(i64::MAX))
}

/// Keep only the digits and read them as a whole count. No digits is zero.
pub fn extract_count(text: &str) -> u32 {
    let digits = digits(text);
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u32::MAX)
}
