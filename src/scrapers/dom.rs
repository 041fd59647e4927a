//! Weather field extraction over a static DOM.
//!
//! Mirrors [`EXTRACTION_SCRIPT`](super::EXTRACTION_SCRIPT) field for field,
//! so a snapshot built from served markup matches one built in the browser.

use scraper::{ElementRef, Html, Selector};

use super::script::selectors;
use crate::error::{Result, ScrapeError};
use crate::models::{flatten_markup, RawSnapshot, SlBox};

/// Extract the weather field set from an HTML document.
///
/// Missing elements yield `None` (or empty lists), never an error.
pub fn extract_from_html(html: &str) -> RawSnapshot {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let icon = first(root, selectors::ICON);

    RawSnapshot {
        weather_now_number: first(root, selectors::READING).map(text),
        weather_now_description: first(root, selectors::DESCRIPTION).map(inner_html),
        sun: first(root, selectors::SUN).map(inner_html),
        dw_into: first(root, selectors::DW_INTO).map(text),
        days_vertical_tabs: first(root, selectors::VERTICAL_TABS).map(inner_html),
        icon_title: icon.and_then(|el| el.value().attr("title").map(str::to_string)),
        icon_html: icon.map(|el| el.html()),
        panes: all(root, selectors::PANES)
            .into_iter()
            .map(|el| el.html())
            .collect(),
        sl_boxes: all(root, selectors::SL_ITEMS)
            .into_iter()
            .map(|item| SlBox {
                sl_item_txt: first(item, selectors::SL_ITEM_TXT).map(trimmed_inner_html),
                sl_item_all_txt: first(item, selectors::SL_ITEM_ALL_TXT).map(trimmed_inner_html),
            })
            .collect(),
    }
}

/// Whether `selector` matches anything in the document.
pub fn document_has_selector(html: &str, selector: &str) -> Result<bool> {
    let parsed = Selector::parse(selector)
        .map_err(|e| ScrapeError::Browser(format!("invalid selector {}: {:?}", selector, e)))?;
    let document = Html::parse_document(html);
    let found = document.select(&parsed).next().is_some();
    Ok(found)
}

fn first<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    scope.select(&selector).next()
}

fn all<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => scope.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

fn text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn inner_html(el: ElementRef<'_>) -> String {
    flatten_markup(&el.inner_html())
}

fn trimmed_inner_html(el: ElementRef<'_>) -> String {
    el.inner_html().trim().to_string()
}
