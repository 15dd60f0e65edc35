use scraper::{ElementRef, Html};

/// Text of an element with each text node trimmed and concatenated.
/// Talend cells wrap values in nested spans; this flattens them the same
/// way the export viewer displays them.
pub fn cell_text(el: ElementRef) -> String {
    el.text().map(str::trim).collect()
}

/// Visible text of a raw HTML fragment: one line per non-empty text node.
/// Used for the free-text rendering of generic sections.
pub fn fragment_text(html: &str) -> String {
    let dom = Html::parse_fragment(html);
    dom.root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    #[test]
    fn cell_text_flattens_nested_spans() {
        let dom = Html::parse_fragment("<table><tr><td> <span>tMap</span>_1 </td></tr></table>");
        let sel = Selector::parse("td").unwrap();
        let td = dom.select(&sel).next().unwrap();
        assert_eq!(cell_text(td), "tMap_1");
    }

    #[test]
    fn fragment_text_joins_blocks_with_newlines() {
        let text = fragment_text("<div><p>Premier bloc</p><p>Second bloc</p></div>");
        assert_eq!(text, "Premier bloc\nSecond bloc");
    }

    #[test]
    fn fragment_text_drops_whitespace_nodes() {
        let text = fragment_text("<div>\n  <p>Seul</p>\n</div>");
        assert_eq!(text, "Seul");
    }

    #[test]
    fn fragment_text_strips_tags() {
        let text = fragment_text("<p>Un <b>flux</b> Talend</p>");
        assert!(!text.contains('<'));
        assert!(text.contains("flux"));
    }
}
