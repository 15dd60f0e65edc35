use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use crate::parser::text::cell_text;

pub static CONTEXT_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"context\.([A-Za-z0-9_]+)").unwrap());

static TABLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static TH_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").unwrap());
static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static TD_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

/// Every distinct `context.<name>` reference in the document's text nodes,
/// sorted for stable output.
pub fn extract_usages(dom: &Html) -> Vec<String> {
    let mut vars = BTreeSet::new();
    for text in dom.root_element().text() {
        for caps in CONTEXT_VAR_RE.captures_iter(text) {
            vars.insert(format!("context.{}", &caps[1]));
        }
    }
    vars.into_iter().collect()
}

/// Deployed values of context variables, read from the production context
/// table: the first table following the first "ContextePROD" marker whose
/// headers carry both a Nom and a Valeur column. Exactly one table is
/// consulted and the first row per variable wins; later same-named tables
/// are never merged.
#[derive(Debug, Clone, Default)]
pub struct ProdContext {
    values: BTreeMap<String, String>,
}

impl ProdContext {
    pub fn locate(dom: &Html) -> Self {
        let tables: Vec<_> = dom.select(&TABLE_SEL).collect();
        let Some(marker_idx) = tables
            .iter()
            .position(|t| t.text().any(|s| s.contains("ContextePROD")))
        else {
            return Self::default();
        };

        let mut values = BTreeMap::new();
        for table in &tables[marker_idx + 1..] {
            let headers: Vec<String> = table
                .select(&TH_SEL)
                .map(|th| cell_text(th).to_lowercase())
                .collect();
            let (Some(idx_nom), Some(idx_valeur)) = (
                headers.iter().position(|h| h.as_str() == "nom"),
                headers.iter().position(|h| h.as_str() == "valeur"),
            ) else {
                continue;
            };

            for row in table.select(&ROW_SEL) {
                let cells: Vec<_> = row.select(&TD_SEL).collect();
                if cells.len() > idx_nom.max(idx_valeur) {
                    values
                        .entry(cell_text(cells[idx_nom]))
                        .or_insert_with(|| cell_text(cells[idx_valeur]));
                }
            }
            break;
        }

        Self { values }
    }

    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Flatten a Talend concatenation expression into a literal string:
    /// resolvable `context.<name>` tokens are replaced by their value, then
    /// `+`, quotes and whitespace (artifacts of the source expression) are
    /// stripped.
    pub fn substitute(&self, expr: &str) -> String {
        let replaced = CONTEXT_VAR_RE.replace_all(expr, |caps: &regex::Captures| {
            match self.resolve(&caps[1]) {
                Some(value) => value.to_string(),
                None => caps[0].to_string(),
            }
        });
        replaced
            .chars()
            .filter(|c| !matches!(c, '+' | '"' | '\'') && !c.is_whitespace())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROD_TABLE: &str = "\
        <table><tr><td>ContextePROD</td></tr></table>\
        <table>\
        <tr><th>Nom</th><th>Valeur</th></tr>\
        <tr><td>ROOT_DIR</td><td>/data</td></tr>\
        <tr><td>MAIL_HOST</td><td>smtp.example.com</td></tr>\
        </table>";

    #[test]
    fn usages_are_sorted_and_distinct() {
        let dom = Html::parse_document(
            "<p>context.ROOT_DIR et context.MAIL_HOST puis encore context.ROOT_DIR</p>",
        );
        assert_eq!(
            extract_usages(&dom),
            vec!["context.MAIL_HOST", "context.ROOT_DIR"]
        );
    }

    #[test]
    fn usages_cover_table_cells() {
        let dom = Html::parse_document(
            "<table><tr><td>Nom de fichier</td><td>\"context.OUT_DIR\" + \"/a.csv\"</td></tr></table>",
        );
        assert_eq!(extract_usages(&dom), vec!["context.OUT_DIR"]);
    }

    #[test]
    fn resolve_reads_the_prod_table() {
        let dom = Html::parse_document(PROD_TABLE);
        let prod = ProdContext::locate(&dom);
        assert_eq!(prod.resolve("ROOT_DIR"), Some("/data"));
        assert_eq!(prod.resolve("MAIL_HOST"), Some("smtp.example.com"));
        assert_eq!(prod.resolve("ABSENT"), None);
    }

    #[test]
    fn resolve_is_idempotent() {
        let dom = Html::parse_document(PROD_TABLE);
        let prod = ProdContext::locate(&dom);
        assert_eq!(prod.resolve("ROOT_DIR"), prod.resolve("ROOT_DIR"));
    }

    #[test]
    fn only_the_first_qualifying_table_is_consulted() {
        let dom = Html::parse_document(
            "<table><tr><td>ContextePROD</td></tr></table>\
             <table><tr><th>Nom</th><th>Valeur</th></tr><tr><td>A</td><td>1</td></tr></table>\
             <table><tr><th>Nom</th><th>Valeur</th></tr><tr><td>B</td><td>2</td></tr></table>",
        );
        let prod = ProdContext::locate(&dom);
        assert_eq!(prod.resolve("A"), Some("1"));
        assert_eq!(prod.resolve("B"), None);
    }

    #[test]
    fn missing_marker_yields_empty_lookup() {
        let dom = Html::parse_document(
            "<table><tr><th>Nom</th><th>Valeur</th></tr><tr><td>A</td><td>1</td></tr></table>",
        );
        let prod = ProdContext::locate(&dom);
        assert!(prod.is_empty());
        assert_eq!(prod.resolve("A"), None);
    }

    #[test]
    fn substitute_flattens_concatenation_expressions() {
        let dom = Html::parse_document(PROD_TABLE);
        let prod = ProdContext::locate(&dom);
        let flat = prod.substitute("\"context.ROOT_DIR\" + \"/histo/\" + \"a.csv\"");
        assert_eq!(flat, "/data/histo/a.csv");
    }

    #[test]
    fn substitute_leaves_unresolvable_tokens_in_place() {
        let dom = Html::parse_document(PROD_TABLE);
        let prod = ProdContext::locate(&dom);
        assert_eq!(prod.substitute("context.UNKNOWN + \"/x\""), "context.UNKNOWN/x");
    }
}
