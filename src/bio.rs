use std::sync::LazyLock;

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::{Error, Result};
use crate::http::Transport;

// Tried in order; the first one present in the page bounds the paragraph search.
static CONTENT_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        "#mw-content-text .mw-parser-output",
        "#mw-content-text",
        "#bodyContent",
        "body",
    ]
    .iter()
    .map(|s| Selector::parse(s).unwrap())
    .collect()
});
static P_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());

const NOTICE_CLASSES: &[&str] = &[
    "hatnote",
    "dablink",
    "rellink",
    "ambox",
    "infobox",
    "navbox",
    "shortdescription",
    "noprint",
    "metadata",
    "sidebar",
];

const NOTICE_PHRASES: &[&str] = &[
    "redirects here",
    "for other uses",
    "this article is about",
    "may refer to",
];

/// Downloads Wikipedia articles.
pub struct BioScraper<'a, T: Transport> {
    transport: &'a T,
}

impl<'a, T: Transport> BioScraper<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        BioScraper { transport }
    }

    /// Raw HTML of `url`. Non-2xx and transport failures (timeouts included) are `Fetch` errors.
    pub fn scrape(&self, url: &str) -> Result<String> {
        let resp = self.transport.get(url, &[], None).map_err(Error::fetch)?;
        if !resp.is_success() {
            return Err(Error::Fetch(format!("{} returned HTTP {}", url, resp.status)));
        }
        debug!("Fetched {} ({} bytes)", url, resp.body.len());
        Ok(resp.body)
    }
}

/// Text of the article's lead paragraph, or `""` when the page has none.
///
/// Prefers the first qualifying paragraph that opens with a bold run (the subject's
/// name in Wikipedia's lead sentence), then falls back to the first qualifying one.
pub fn extract_first_paragraph(html: &str) -> String {
    let doc = Html::parse_document(html);
    let Some(root) = CONTENT_SELECTORS
        .iter()
        .find_map(|sel| doc.select(sel).next())
    else {
        return String::new();
    };

    let candidates: Vec<(ElementRef, String)> = root
        .select(&P_SELECTOR)
        .filter_map(|p| {
            let text = visible_text(p);
            qualifies(p, &text).then_some((p, text))
        })
        .collect();

    candidates
        .iter()
        .find(|(p, _)| opens_with_bold(*p))
        .or_else(|| candidates.first())
        .map(|(_, text)| text.trim().to_string())
        .unwrap_or_default()
}

fn qualifies(p: ElementRef, text: &str) -> bool {
    if text.trim().is_empty() || p.value().classes().any(|c| c == "mw-empty-elt") {
        return false;
    }
    if p.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| a.value().classes().any(|c| NOTICE_CLASSES.contains(&c)))
    {
        return false;
    }
    let lower = text.to_lowercase();
    if NOTICE_PHRASES.iter().any(|n| lower.contains(n)) {
        return false;
    }
    !is_italic_note(p)
}

/// True when every non-blank direct text node sits inside `<i>`/`<em>`.
fn is_italic_note(p: ElementRef) -> bool {
    let mut saw_italic = false;
    for child in p.children() {
        match child.value() {
            Node::Text(t) if !t.trim().is_empty() => return false,
            Node::Element(e) => match e.name() {
                "i" | "em" => saw_italic = true,
                "style" | "script" => {}
                _ => {
                    let has_text = ElementRef::wrap(child)
                        .map(|el| !visible_text(el).trim().is_empty())
                        .unwrap_or(false);
                    if has_text {
                        return false;
                    }
                }
            },
            _ => {}
        }
    }
    saw_italic
}

/// Text content minus whatever sits inside `<style>`/`<script>` (inline TemplateStyles).
fn visible_text(el: ElementRef) -> String {
    let mut out = String::new();
    push_visible(el, &mut out);
    out
}

fn push_visible(el: ElementRef, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) if matches!(e.name(), "style" | "script") => {}
            Node::Element(_) => {
                if let Some(inner) = ElementRef::wrap(child) {
                    push_visible(inner, out);
                }
            }
            _ => {}
        }
    }
}

fn opens_with_bold(p: ElementRef) -> bool {
    p.children()
        .find(|c| match c.value() {
            Node::Text(t) => !t.trim().is_empty(),
            Node::Comment(_) => false,
            Node::Element(e) => !matches!(e.name(), "style" | "script"),
            _ => true,
        })
        .and_then(ElementRef::wrap)
        .map(|el| el.value().name() == "b")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::fake::FakeTransport;
    use crate::sanitize::sanitize;
    use proptest::prelude::*;

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
    }

    #[test]
    fn lead_paragraph_skips_empty_and_hatnotes() {
        let text = extract_first_paragraph(&fixture("lead_bold"));
        assert!(text.starts_with("Guy Maurice Marie Louise Verhofstadt"));
        assert!(text.contains("[1]"), "sanitizing is not the extractor's job");
        assert!(!text.contains("redirects here"));
    }

    #[test]
    fn bold_lead_beats_earlier_plain_paragraph() {
        let text = extract_first_paragraph(&fixture("coordinates_first"));
        assert!(text.starts_with("Louis Michel"), "got: {text}");
    }

    #[test]
    fn italic_note_is_skipped_without_bold_lead() {
        let text = extract_first_paragraph(&fixture("italic_note"));
        assert_eq!(text, "Jean Dupont fut un homme politique français.");
    }

    #[test]
    fn inline_styles_and_scripts_are_not_text() {
        let text = extract_first_paragraph(&fixture("inline_style"));
        assert!(!text.contains("mw-parser-output"), "got: {text}");
        assert!(!text.contains('{'));
        assert_eq!(
            sanitize(&text),
            "Ann Lee (born 1940; died 2001) was a leader of the 1⁄2 party."
        );
    }

    #[test]
    fn style_only_paragraph_does_not_qualify() {
        let html = "<p><style>.x{color:red}</style></p><p>Real text.</p>";
        assert_eq!(extract_first_paragraph(html), "Real text.");
    }

    #[test]
    fn no_paragraph_yields_empty() {
        assert_eq!(extract_first_paragraph(&fixture("no_paragraph")), "");
        assert_eq!(extract_first_paragraph(""), "");
        assert_eq!(extract_first_paragraph("<p>   </p><p class=\"mw-empty-elt\">x</p>"), "");
    }

    #[test]
    fn falls_back_to_body_without_wiki_container() {
        let html = "<html><body><p>Plain <b>page</b> text.</p></body></html>";
        assert_eq!(extract_first_paragraph(html), "Plain page text.");
    }

    #[test]
    fn scrape_maps_errors_to_fetch() {
        let t = FakeTransport::new();
        t.status("http://wiki.test/404", 404)
            .timeout("http://wiki.test/slow")
            .ok("http://wiki.test/ok", "<p>x</p>");
        let s = BioScraper::new(&t);

        assert!(matches!(s.scrape("http://wiki.test/404"), Err(Error::Fetch(_))));
        assert!(matches!(s.scrape("http://wiki.test/slow"), Err(Error::Fetch(_))));
        assert_eq!(s.scrape("http://wiki.test/ok").unwrap(), "<p>x</p>");
        assert!(t.calls().iter().all(|c| c.cookie.is_none()));
    }

    const TAG_SOUP: &str = concat!(
        "(<p>|</p>|<b>|</b>|<i>|<style>|</style>|",
        "<div class=\"hatnote\">|</div>|[a-z ]{0,8}){0,30}"
    );

    proptest! {
        #[test]
        fn never_panics_on_arbitrary_input(s in "\\PC{0,200}") {
            let out = extract_first_paragraph(&s);
            prop_assert_eq!(out.trim(), out.as_str());
        }

        #[test]
        fn never_panics_on_tag_soup(s in TAG_SOUP) {
            let out = extract_first_paragraph(&s);
            prop_assert!(!out.starts_with(' ') && !out.ends_with(' '));
        }
    }
}
