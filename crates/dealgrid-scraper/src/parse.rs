//! Shared parsing helpers for marketplace listing pages.
//!
//! Price extraction is a byte scan rather than a grammar: marketplace
//! markup renders prices as display strings (`"$1,234.56"`, `"From $49"`)
//! and the only reliable signal is a currency marker followed by digits.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use scraper::{ElementRef, Selector};

/// Parses a display price into a decimal.
///
/// Strips every character except digits and the decimal point, then parses
/// the remainder. Returns `None` when nothing numeric survives — the caller
/// treats the price as absent, never as zero.
#[must_use]
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<Decimal>().ok()
}

/// Extracts every dollar amount from a blob of card text, in document order.
///
/// An amount is a `$` followed by digits, with optional thousands commas
/// and an optional decimal part.
#[must_use]
pub fn dollar_amounts(text: &str) -> Vec<Decimal> {
    let mut amounts = Vec::new();
    let bytes = text.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        if bytes[i] != b'$' {
            i += 1;
            continue;
        }
        let start = i + 1;
        let mut end = start;
        while end < bytes.len()
            && (bytes[end].is_ascii_digit() || bytes[end] == b',' || bytes[end] == b'.')
        {
            end += 1;
        }
        if end > start {
            if let Some(amount) = parse_price(&text[start..end]) {
                amounts.push(amount);
            }
        }
        i = end.max(start);
    }

    amounts
}

/// Derives a discount percentage from an original/deal price pair.
///
/// Only computed when both prices are present and `original > deal`;
/// otherwise the discount is left undefined rather than coerced to zero.
#[must_use]
pub fn derive_discount_percent(original: Option<Decimal>, deal: Decimal) -> Option<i32> {
    let original = original?;
    if original <= deal || original.is_zero() {
        return None;
    }
    let percent = (original - deal) / original * Decimal::from(100);
    percent.round().to_i32()
}

/// Parses a static CSS selector.
///
/// Only called with compile-time selector literals; a failure here is a
/// programming error, same contract as `Regex::new` on a literal pattern.
#[must_use]
pub(crate) fn static_selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

/// Returns the trimmed text of the first element under `scope` matching
/// `selector`, or `None` when no match has non-empty text.
#[must_use]
pub(crate) fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope.select(selector).find_map(|el| {
        let text: String = el.text().collect::<String>().trim().to_owned();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    })
}

/// Returns the named attribute of the first element under `scope` matching
/// `selector`.
#[must_use]
pub(crate) fn first_attr(
    scope: ElementRef<'_>,
    selector: &Selector,
    attr: &str,
) -> Option<String> {
    scope
        .select(selector)
        .find_map(|el| el.value().attr(attr).map(str::to_owned))
}

/// Walks up from `element` to the nearest ancestor matching `selector`,
/// the DOM-walk equivalent of `Element.closest`.
#[must_use]
pub(crate) fn closest_ancestor<'a>(
    element: ElementRef<'a>,
    selector: &Selector,
) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| selector.matches(ancestor))
}
