//! Weather page scraping: the extractor and its two DOM backends.

mod dom;
mod extractor;
mod script;

pub use dom::{document_has_selector, extract_from_html};
pub use extractor::PageExtractor;
pub use script::{selectors, EXTRACTION_SCRIPT};
