use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::context::ProdContext;
use crate::parser::text::cell_text;

static LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a, span").unwrap());
static TABLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td, th").unwrap());

const HISTORY_HINTS: &[&str] = &["histo", "historique", "suivi"];
const DELIMITED_COMPONENTS: &[&str] = &["tfileoutputdelimited", "tfileinputdelimited"];

/// A CSV file the flow uses to track history, worth calling out in the
/// report. Deduplicated by (name, path) in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CsvHistoryRef {
    pub name: String,
    pub path: String,
}

pub fn extract(dom: &Html, prod: &ProdContext) -> Vec<CsvHistoryRef> {
    let mut seen = HashSet::new();
    let mut refs = Vec::new();

    // Anchors (and spans carrying a file path) pointing at history CSVs
    for el in dom.select(&LINK_SEL) {
        let Some(href) = el
            .value()
            .attr("href")
            .or_else(|| el.value().attr("data-filepath"))
        else {
            continue;
        };
        let href_lower = href.to_lowercase();
        if href.is_empty() || !href_lower.ends_with(".csv") {
            continue;
        }
        let text = cell_text(el).to_lowercase();
        if !HISTORY_HINTS
            .iter()
            .any(|h| href_lower.contains(h) || text.contains(h))
        {
            continue;
        }
        let path = std::path::absolute(href)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| href.to_string());
        push_unique(&mut refs, &mut seen, basename(href), path);
    }

    // tFileInputDelimited / tFileOutputDelimited parameter tables whose
    // filename parameter hints at a history file
    for table in dom.select(&TABLE_SEL) {
        let mut nom_unique = None;
        let mut nom_fichier = None;
        for row in table.select(&ROW_SEL) {
            let cells: Vec<_> = row.select(&CELL_SEL).collect();
            if cells.len() < 2 {
                continue;
            }
            let cle = cell_text(cells[0]).to_lowercase();
            if cle.contains("nom unique") {
                nom_unique = Some(cell_text(cells[1]));
            }
            if cle.contains("nom de fichier") {
                nom_fichier = Some(cell_text(cells[1]));
            }
        }
        let (Some(unique), Some(fichier)) = (nom_unique, nom_fichier) else {
            continue;
        };
        let unique_lower = unique.to_lowercase();
        if !DELIMITED_COMPONENTS.iter().any(|c| unique_lower.contains(c)) {
            continue;
        }
        let fichier_lower = fichier.to_lowercase();
        if !fichier_lower.contains(".csv")
            || !HISTORY_HINTS.iter().any(|h| fichier_lower.contains(h))
        {
            continue;
        }
        let path = prod.substitute(&fichier);
        push_unique(&mut refs, &mut seen, basename(&path), path.clone());
    }

    refs
}

fn push_unique(
    refs: &mut Vec<CsvHistoryRef>,
    seen: &mut HashSet<CsvHistoryRef>,
    name: String,
    path: String,
) {
    let entry = CsvHistoryRef { name, path };
    if seen.insert(entry.clone()) {
        refs.push(entry);
    }
}

fn basename(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}
