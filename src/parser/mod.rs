pub mod extract;
pub mod sections;
pub mod text;

use scraper::Html;

pub use extract::ExtractedDoc;

/// Two-pass pipeline: HTML → DOM + h2 sections → extracted records.
/// Total over any parseable input; missing data degrades to empty records.
pub fn process_document(html: &str) -> ExtractedDoc {
    let dom = Html::parse_document(html);
    let sections = sections::extract_sections(&dom);
    extract::extract_all(html, &dom, sections)
}
