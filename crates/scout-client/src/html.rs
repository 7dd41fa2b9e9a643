//! Shared helpers for the job-board scrapers.

use scout_core::error::AppError;
use scraper::{ElementRef, Html, Selector};

pub(crate) fn selector(css: &str) -> Result<Selector, AppError> {
    Selector::parse(css).map_err(|e| AppError::ParseError(format!("bad selector '{css}': {e}")))
}

pub(crate) fn selectors(css: &[&str]) -> Result<Vec<Selector>, AppError> {
    css.iter().map(|c| selector(c)).collect()
}

/// Parse a results page, rejecting bodies that are not HTML at all.
pub(crate) fn parse_page(body: &str, board: &str) -> Result<Html, AppError> {
    let lower = body.to_ascii_lowercase();
    if !lower.contains("<html") && !lower.contains("<body") {
        return Err(AppError::ParseError(format!(
            "{board} returned a response without HTML markup"
        )));
    }
    Ok(Html::parse_document(body))
}

/// Cards matching the first selector that matches anything.
pub(crate) fn cards<'a>(document: &'a Html, candidates: &[Selector]) -> Vec<ElementRef<'a>> {
    candidates
        .iter()
        .map(|sel| document.select(sel).collect::<Vec<_>>())
        .find(|found| !found.is_empty())
        .unwrap_or_default()
}

/// First element under `card` matching any selector, in selector order.
pub(crate) fn first<'a>(card: ElementRef<'a>, candidates: &[Selector]) -> Option<ElementRef<'a>> {
    candidates.iter().find_map(|sel| card.select(sel).next())
}

/// Whitespace-collapsed text content.
pub(crate) fn text_of(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

pub(crate) fn first_text(card: ElementRef<'_>, candidates: &[Selector]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|sel| card.select(sel).next())
        .find_map(text_of)
}

pub(crate) fn attr(element: ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Resolve a site-relative link against `origin`; anything else is kept as is.
pub(crate) fn absolute_link(origin: &str, href: &str) -> String {
    if href.starts_with('/') {
        format!("{origin}{href}")
    } else {
        href.to_string()
    }
}
