use std::sync::LazyLock;

use regex::Regex;

// Only tag-shaped runs; a bare `<` or `>` in prose is kept.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[A-Za-z][A-Za-z0-9-]*(?:\s[^<>]*)?/?>").unwrap());
// [1], [a], [citation needed], [ˈmɛʁkl̩]
static BRACKET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\[\]]*\]").unwrap());
// /ˈdʒɔːrdʒ ˈbʊʃ/; -- only slash pairs that actually contain IPA symbols
static IPA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/[^/\n]*[ˈˌːəɪʊʃʒθðŋɛɔæɑʌɒɜɐɹɾʁχɲʎɥɨʉ][^/\n]*/\s*;?")
        .unwrap()
});
static AUDIO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\b[\p{L}-]+:\s*)?(?:\blisten\s*)?ⓘ\s*;?").unwrap()
});
static PRONOUNCED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*\(\s*(?:pronounced|pronunciation)\b[^()]*\)").unwrap()
});
static OPEN_PAREN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*[;,]?\s+|\(\s*[;,]\s*").unwrap());
static CLOSE_PAREN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[;,]\s*\)|\s+\)").unwrap());
static EMPTY_PAREN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\(\)").unwrap());
static SPACE_PUNCT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+([,.;:])").unwrap());
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Clean an extracted paragraph: drops citation markers, pronunciation guides and
/// stray markup, then collapses whitespace.
///
/// Input is DOM text, so entities are already decoded; a literal `&amp;` is prose
/// and stays as written.
///
/// Rules are re-applied until nothing changes, so `sanitize(sanitize(x)) == sanitize(x)`.
/// No rule lengthens its match, so the output is never longer than the input.
pub fn sanitize(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = pass(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn pass(s: &str) -> String {
    let s = TAG_RE.replace_all(s, "");
    let s = BRACKET_RE.replace_all(&s, "");
    let s = IPA_RE.replace_all(&s, "");
    let s = AUDIO_RE.replace_all(&s, "");
    let s = PRONOUNCED_RE.replace_all(&s, "");
    let s = OPEN_PAREN_RE.replace_all(&s, "(");
    let s = CLOSE_PAREN_RE.replace_all(&s, ")");
    let s = EMPTY_PAREN_RE.replace_all(&s, "");
    let s = SPACE_PUNCT_RE.replace_all(&s, "$1");
    let s = WS_RE.replace_all(&s, " ");
    s.trim().to_string()
}
