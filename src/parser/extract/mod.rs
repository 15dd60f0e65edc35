pub mod components;
pub mod connector;
pub mod context;
pub mod history;
pub mod o2t;

use scraper::Html;

use super::sections::Section;
pub use connector::ConnectorInfo;
pub use context::ProdContext;
pub use history::CsvHistoryRef;
pub use o2t::{O2tBinding, O2tFamily};

/// Everything the renderer needs, derived once per document and read-only
/// afterwards.
pub struct ExtractedDoc {
    pub sections: Vec<Section>,
    pub connector: ConnectorInfo,
    pub components: Vec<String>,
    pub context_vars: Vec<String>,
    pub prod_context: ProdContext,
    pub o2t_bindings: Vec<O2tBinding>,
    pub csv_history: Vec<CsvHistoryRef>,
}

pub fn extract_all(raw_html: &str, dom: &Html, sections: Vec<Section>) -> ExtractedDoc {
    let connector = connector::extract(&sections);
    let components = components::extract(dom);
    let context_vars = context::extract_usages(dom);
    let prod_context = ProdContext::locate(dom);
    let o2t_bindings = o2t::extract(raw_html, dom);
    let csv_history = history::extract(dom, &prod_context);

    ExtractedDoc {
        sections,
        connector,
        components,
        context_vars,
        prod_context,
        o2t_bindings,
        csv_history,
    }
}

// ── Tests ──
