use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use crate::parser::sections::Section;
use crate::parser::text::cell_text;

static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td, th").unwrap());
static VERSION_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^v\d").unwrap());

/// Connector metadata from the "Description" section's key/value table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectorInfo {
    pub nom: String,
    pub version: String,
    pub historique: String,
    pub creation: String,
    pub modification: String,
    pub description: String,
    pub objectif: String,
}

pub fn extract(sections: &[Section]) -> ConnectorInfo {
    let mut info = ConnectorInfo::default();
    let Some(desc) = sections
        .iter()
        .find(|s| s.title.trim().eq_ignore_ascii_case("description"))
    else {
        return info;
    };

    for fragment in &desc.content {
        let dom = Html::parse_fragment(fragment);
        for row in dom.select(&ROW_SEL) {
            let cells: Vec<_> = row.select(&CELL_SEL).collect();
            if cells.len() != 2 {
                continue;
            }
            let key = cell_text(cells[0]).to_lowercase();
            let val = cell_text(cells[1]);
            match key.as_str() {
                "nom" => info.nom = val,
                "version" => info.version = val,
                "historique" => info.historique = val,
                // the export repeats these rows per context; keep the first
                "création" if info.creation.is_empty() => info.creation = val,
                "modification" if info.modification.is_empty() => info.modification = val,
                "description" => info.description = val,
                "objectif" => info.objectif = val,
                _ => {}
            }
        }
    }

    // Older exports put the changelog in the description cell
    if info.historique.is_empty()
        && VERSION_TOKEN_RE.is_match(&info.description.trim().to_lowercase())
    {
        info.historique = info.description.clone();
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(title: &str, table: &str) -> Section {
        Section {
            title: title.to_string(),
            content: vec![table.to_string()],
        }
    }

    #[test]
    fn reads_key_value_rows() {
        let sections = vec![section(
            "Description",
            "<table>\
             <tr><td>Nom</td><td>Flux1</td></tr>\
             <tr><td>Version</td><td>1.2</td></tr>\
             <tr><td>Objectif</td><td>Synchroniser les fiches</td></tr>\
             </table>",
        )];
        let info = extract(&sections);
        assert_eq!(info.nom, "Flux1");
        assert_eq!(info.version, "1.2");
        assert_eq!(info.objectif, "Synchroniser les fiches");
    }

    #[test]
    fn first_creation_row_wins_last_description_wins() {
        let sections = vec![section(
            "Description",
            "<table>\
             <tr><td>Création</td><td>01/01/2020</td></tr>\
             <tr><td>Création</td><td>02/02/2021</td></tr>\
             <tr><td>Description</td><td>ancienne</td></tr>\
             <tr><td>Description</td><td>récente</td></tr>\
             </table>",
        )];
        let info = extract(&sections);
        assert_eq!(info.creation, "01/01/2020");
        assert_eq!(info.description, "récente");
    }

    #[test]
    fn rows_without_exactly_two_cells_are_skipped() {
        let sections = vec![section(
            "Description",
            "<table>\
             <tr><td>Nom</td><td>Flux1</td><td>extra</td></tr>\
             <tr><td>Version</td><td>1.0</td></tr>\
             </table>",
        )];
        let info = extract(&sections);
        assert_eq!(info.nom, "");
        assert_eq!(info.version, "1.0");
    }

    #[test]
    fn historique_backfilled_from_versioned_description() {
        let sections = vec![section(
            "Description",
            "<table><tr><td>Description</td><td>v1.0 01/01/2020 version initiale</td></tr></table>",
        )];
        let info = extract(&sections);
        assert_eq!(info.historique, "v1.0 01/01/2020 version initiale");
    }

    #[test]
    fn no_backfill_without_version_token() {
        let sections = vec![section(
            "Description",
            "<table><tr><td>Description</td><td>vue d'ensemble du flux</td></tr></table>",
        )];
        let info = extract(&sections);
        assert!(info.historique.is_empty());
    }

    #[test]
    fn missing_section_yields_default_record() {
        let sections = vec![section("Liste des composants", "<p>x</p>")];
        assert_eq!(extract(&sections), ConnectorInfo::default());
    }
}
