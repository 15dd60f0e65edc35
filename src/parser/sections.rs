use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::text::cell_text;

static H2_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2").unwrap());

/// Administrative and context headings of the Talend export. Matched as
/// case-insensitive substrings against section titles; none of these
/// survive into the report.
const SECTIONS_TO_IGNORE: &[&str] = &[
    "Liste des contextes",
    "Context List",
    "ContexteDefault",
    "ContextePROD",
    "Context",
    "context",
    "Contexts",
    "contexts",
    "Paramètres supplémentaires",
    "Statut & Logs",
    "Prévisualiser l'image",
    "Propriétés",
    "Valeurs",
    "Nom",
    "Langue",
    "Statut",
    "Exécution multi thread",
    "tContextLoad implicite",
    "Utiliser les statistiques (tStatCatcher)",
    "Utiliser les logs (tLogCatcher)",
    "Utiliser les volumes (tFlowMeterCatcher)",
    "Dans la console",
    "Dans des fichiers",
    "Dans la base de données",
    "Capturer les statistiques des composants",
    "Capturer les erreurs de l'exécutable",
    "Capturer les erreurs de l'utilisateur",
    "Capturer les alertes à l'utilisateur",
];

#[derive(Debug, Clone)]
pub struct Section {
    pub title: String,
    /// Raw HTML fragments between this section's h2 and the next one.
    pub content: Vec<String>,
}

pub fn is_ignored_title(title: &str) -> bool {
    let lower = title.to_lowercase();
    SECTIONS_TO_IGNORE
        .iter()
        .any(|kw| lower.contains(&kw.to_lowercase()))
}

/// Split the document into h2-delimited sections, in document order.
/// Ignored titles are dropped, elements carrying a context-flavoured CSS
/// class are filtered out, and sections left without content are omitted.
pub fn extract_sections(dom: &Html) -> Vec<Section> {
    let mut sections = Vec::new();

    for h2 in dom.select(&H2_SEL) {
        let title = cell_text(h2);
        if is_ignored_title(&title) {
            continue;
        }

        let mut content = Vec::new();
        for sibling in h2.next_siblings() {
            if let Some(el) = ElementRef::wrap(sibling) {
                if el.value().name() == "h2" {
                    break;
                }
                if el.value().classes().any(|c| c.contains("context")) {
                    continue;
                }
                content.push(el.html());
            } else if let Some(text) = sibling.value().as_text() {
                if !text.trim().is_empty() {
                    content.push(text.to_string());
                }
            }
        }

        if !content.is_empty() {
            sections.push(Section { title, content });
        }
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> Vec<Section> {
        extract_sections(&Html::parse_document(html))
    }

    #[test]
    fn splits_on_h2_in_document_order() {
        let sections = parse(
            "<h2>Description</h2><p>a</p><h2>Liste des composants</h2><table><tr><td>x</td></tr></table>",
        );
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Description");
        assert_eq!(sections[1].title, "Liste des composants");
    }

    #[test]
    fn ignored_titles_are_dropped_case_insensitively() {
        let sections = parse("<h2>LISTE DES CONTEXTES</h2><p>a</p><h2>Description</h2><p>b</p>");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Description");
    }

    #[test]
    fn context_classed_elements_are_filtered() {
        let sections =
            parse("<h2>Description</h2><div class=\"context-block\">hidden</div><p>shown</p>");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].content.len(), 1);
        assert!(sections[0].content[0].contains("shown"));
    }

    #[test]
    fn empty_sections_are_omitted() {
        let sections = parse("<h2>Description</h2><h2>Liste des composants</h2><p>a</p>");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Liste des composants");
    }

    #[test]
    fn no_headings_yields_empty_sequence() {
        assert!(parse("<p>pas de titre</p>").is_empty());
    }

    #[test]
    fn titles_are_a_subset_of_document_headings() {
        let html =
            "<h2>Description</h2><p>a</p><h2>ContextePROD</h2><p>b</p><h2>Historique</h2><p>c</p>";
        let dom = Html::parse_document(html);
        let all: Vec<String> = dom.select(&H2_SEL).map(cell_text).collect();
        for section in extract_sections(&dom) {
            assert!(all.contains(&section.title));
            assert!(!is_ignored_title(&section.title));
        }
    }
}
