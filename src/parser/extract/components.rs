use std::collections::BTreeSet;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::parser::text::cell_text;

static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static TD_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

/// Distinct component types used by the flow, sorted.
///
/// Looks for the first h2 mentioning "composant", then the first table that
/// follows it in document order; the type sits in the second column, the
/// first row being the header.
pub fn extract(dom: &Html) -> Vec<String> {
    let mut types = BTreeSet::new();
    let mut after_heading = false;

    for node in dom.root_element().descendants() {
        let Some(el) = ElementRef::wrap(node) else {
            continue;
        };
        if !after_heading {
            if el.value().name() == "h2" && cell_text(el).to_lowercase().contains("composant") {
                after_heading = true;
            }
        } else if el.value().name() == "table" {
            for row in el.select(&ROW_SEL).skip(1) {
                let cells: Vec<_> = row.select(&TD_SEL).collect();
                if cells.len() >= 2 {
                    let comp_type = cell_text(cells[1]);
                    if !comp_type.is_empty() {
                        types.insert(comp_type);
                    }
                }
            }
            break;
        }
    }

    types.into_iter().collect()
}
