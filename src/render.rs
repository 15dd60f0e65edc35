use std::sync::LazyLock;

use regex::Regex;

use crate::descriptions::ComponentDescriptions;
use crate::parser::extract::{ConnectorInfo, ExtractedDoc, O2tBinding, O2tFamily};
use crate::parser::sections::Section;
use crate::parser::text::fragment_text;

static VERSION_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"v\d+\.\d+\s+\d{2}/\d{2}/\d{4}").unwrap());
static BR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());

/// Sections rendered by a dedicated block up front, or excluded outright,
/// and therefore skipped by the generic section loop.
const RENDERED_OR_EXCLUDED: &[&str] = &[
    "description du connecteur",
    "en-tête one2team",
    "description du projet",
    "description",
    "résumé",
    "paramètres",
    "code source",
];

const SUMMARY_TITLES: &[&str] = &[
    "Description du connecteur",
    "En-tête One2Team",
    "Liste des composants",
    "Description des composants",
];

/// Pure render pass: fixed skeleton, then the surviving sections in their
/// extracted order. Output is deterministic for a given document.
pub fn render(doc: &ExtractedDoc, descriptions: &ComponentDescriptions) -> String {
    let mut out = String::new();
    out.push_str("# Talend Documentation\n\n");
    out.push_str("> Generated automatically.\n\n");
    out.push_str("---\n\n");

    write_summary(&mut out);
    write_connector_description(&mut out, &doc.connector);
    write_o2t_header(&mut out, &doc.o2t_bindings);

    for section in &doc.sections {
        write_section(&mut out, section, doc, descriptions);
    }

    out.push_str("\n---\n");
    out
}

fn write_summary(out: &mut String) {
    out.push_str("## Sommaire\n\n");
    for title in SUMMARY_TITLES {
        out.push_str(&format!("- {}\n", title));
    }
    out.push('\n');
}

fn write_connector_description(out: &mut String, info: &ConnectorInfo) {
    out.push_str("## Description du connecteur\n\n");
    out.push_str(&format!("**Nom :** {}\n\n", info.nom));
    if !info.objectif.trim().is_empty() {
        out.push_str(&format!("**Résumé :** {}\n\n", info.objectif.trim()));
    }
    out.push_str(&format!("**Version :** {}\n\n", info.version));
    out.push_str(&format!("**Création :** {}\n\n", info.creation));
    out.push_str(&format!("**Modification :** {}\n\n", info.modification));
    out.push_str("**Historique :**\n\n");
    if info.historique.trim().is_empty() {
        out.push_str("(Aucun historique trouvé)\n");
    } else {
        for line in format_historique_versions(&info.historique).lines() {
            if !line.trim().is_empty() {
                out.push_str(&format!("- {}\n", line));
            }
        }
    }
    out.push('\n');
}

/// One changelog entry per "vX.X DD/MM/YYYY" token: the export flattens the
/// history into a single cell, so breaks are re-inserted before each
/// version token except a leading one.
fn format_historique_versions(historique: &str) -> String {
    let flat = BR_RE.replace_all(historique, "\n");
    let flat = flat.replace(['\r', '\n'], "");

    let mut result = String::with_capacity(flat.len() + 8);
    let mut last = 0;
    for m in VERSION_LINE_RE.find_iter(&flat) {
        result.push_str(&flat[last..m.start()]);
        if m.start() > 0 {
            result.push('\n');
        }
        result.push_str(m.as_str());
        last = m.end();
    }
    result.push_str(&flat[last..]);
    result.trim().to_string()
}

fn write_o2t_header(out: &mut String, bindings: &[O2tBinding]) {
    if bindings.is_empty() {
        out.push_str("_Aucun composant O2T trouvé dans la documentation._\n\n---\n\n");
        return;
    }

    out.push_str("## En-tête One2Team\n\n");
    out.push_str("| Nom unique | Modèle de fiche | Requête O2T / Type List |\n");
    out.push_str("|------------|-----------------|-------------------------|\n");
    for binding in bindings {
        match binding.family {
            O2tFamily::Input => out.push_str(&format!(
                "| {} | {} | {} |\n",
                binding.unique_name,
                binding.param("modèle de fiche"),
                binding.param("Requête O2T"),
            )),
            O2tFamily::Output => out.push_str(&format!(
                "| {} | {} |  |\n",
                binding.unique_name,
                binding.param("Type List"),
            )),
        }
    }
    out.push_str("\n---\n\n");
}

fn write_section(
    out: &mut String,
    section: &Section,
    doc: &ExtractedDoc,
    descriptions: &ComponentDescriptions,
) {
    let title = section.title.trim().to_lowercase();
    if RENDERED_OR_EXCLUDED.contains(&title.as_str()) {
        return;
    }
    match title.as_str() {
        "liste des composants" => write_component_list(out, doc),
        // synthesized right after the component list, never standalone
        "context utilisé" | "context utilise" => {}
        "description des composants" => {
            write_component_descriptions(out, &doc.components, descriptions)
        }
        _ => {
            for fragment in &section.content {
                let text = fragment_text(fragment);
                if !text.trim().is_empty() {
                    out.push_str(&text);
                    out.push_str("\n\n");
                }
            }
        }
    }
}

fn write_component_list(out: &mut String, doc: &ExtractedDoc) {
    out.push_str("## Liste des composants\n\n");
    out.push_str("### Types de composants utilisés\n\n");
    out.push_str("| Type de composant |\n");
    out.push_str("|-------------------|\n");
    for comp_type in &doc.components {
        out.push_str(&format!("| {} |\n", comp_type));
    }
    out.push_str("\n---\n\n");

    write_context_usage(out, doc);
    write_csv_history(out, doc);

    out.push_str("\n---\n\n");
}

fn write_context_usage(out: &mut String, doc: &ExtractedDoc) {
    out.push_str("## Context Utilisé\n\n");
    if doc.context_vars.is_empty() {
        out.push_str("_No context parameters used._\n");
        return;
    }
    for var in &doc.context_vars {
        let lower = var.to_lowercase();
        // credentials and O2T bindings stay opaque; everything else gets
        // its deployed value when the production context defines one
        if lower.contains("o2t") || lower.contains("password") {
            out.push_str(&format!("- `{}`\n", var));
            continue;
        }
        let name = var.trim_start_matches("context.");
        match doc.prod_context.resolve(name) {
            Some(value) if !value.is_empty() => {
                out.push_str(&format!("- `{}` = `{}`\n", var, value))
            }
            _ => out.push_str(&format!("- `{}`\n", var)),
        }
    }
}

fn write_csv_history(out: &mut String, doc: &ExtractedDoc) {
    if doc.csv_history.is_empty() {
        return;
    }
    out.push_str("\n## Historique\n\n");
    for r in &doc.csv_history {
        let shown = if r.path.contains("context.") {
            doc.prod_context.substitute(&r.path)
        } else {
            r.path.clone()
        };
        out.push_str(&format!("- **{}** : `{}`\n", r.name, shown));
    }
    out.push_str("\n---\n\n");
}

fn write_component_descriptions(
    out: &mut String,
    components: &[String],
    descriptions: &ComponentDescriptions,
) {
    out.push_str("## Description des composants\n\n");
    out.push_str("### Utilité et exemples des composants\n\n");
    for comp_type in components {
        out.push_str(&format!("#### {}\n", comp_type));
        match descriptions.get(comp_type) {
            Some(desc) => {
                out.push_str(&format!("- **Utilité** : {}\n", desc.utilite));
                out.push_str(&format!("- **Exemple** : {}\n\n", desc.exemple));
            }
            None => {
                out.push_str("- _Description non renseignée dans le fichier de configuration._\n\n")
            }
        }
    }
    out.push_str("---\n\n");
}

// ── Tests ──
