use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use crate::parser::text::cell_text;

static O2T_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"tO2T(?:Input|Output)_\d+").unwrap());

static TABLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td, th").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum O2tFamily {
    Input,
    Output,
}

/// One One2Team component instance: its unique name and the parameter
/// rows of the table block describing it.
#[derive(Debug, Clone)]
pub struct O2tBinding {
    pub unique_name: String,
    pub family: O2tFamily,
    pub params: BTreeMap<String, String>,
}

impl O2tBinding {
    pub fn param(&self, label: &str) -> &str {
        self.params.get(label).map(String::as_str).unwrap_or("")
    }
}

/// Find every distinct tO2TInput_N / tO2TOutput_N name in the raw document,
/// then the parameter table tied to each (the table whose "Nom unique" row
/// carries exactly that name). Sorted by name.
pub fn extract(raw_html: &str, dom: &Html) -> Vec<O2tBinding> {
    let names: BTreeSet<&str> = O2T_NAME_RE.find_iter(raw_html).map(|m| m.as_str()).collect();

    names
        .into_iter()
        .map(|name| {
            let family = if name.starts_with("tO2TInput") {
                O2tFamily::Input
            } else {
                O2tFamily::Output
            };
            O2tBinding {
                unique_name: name.to_string(),
                family,
                params: find_param_table(dom, name).unwrap_or_default(),
            }
        })
        .collect()
}

fn find_param_table(dom: &Html, name: &str) -> Option<BTreeMap<String, String>> {
    for table in dom.select(&TABLE_SEL) {
        let matches_name = table.select(&ROW_SEL).any(|row| {
            let cells: Vec<_> = row.select(&CELL_SEL).collect();
            cells.len() >= 2
                && cell_text(cells[0]).contains("Nom unique")
                && cell_text(cells[1]) == name
        });
        if !matches_name {
            continue;
        }

        let mut params = BTreeMap::new();
        for row in table.select(&ROW_SEL) {
            let cells: Vec<_> = row.select(&CELL_SEL).collect();
            if cells.len() >= 2 {
                params.insert(cell_text(cells[0]), cell_text(cells[1]));
            }
        }
        return Some(params);
    }
    None
}
