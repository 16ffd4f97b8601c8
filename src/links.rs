use crate::document_model::tags::HYPERLINK;
use crate::document_model::{Document, Range};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Matches, in precedence order: quoted Windows/Unix paths (quotes included
/// in the match), http(s) URLs, www URLs, then unquoted paths.
fn link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r#""(?:[A-Za-z]:\\|/)[^"]*"|https?://\S+|www\.\S+|[A-Za-z]:\\\S+|/\S+"#,
        )
        .expect("link pattern is valid")
    })
}

/// One detected link: the span it covers and its text as matched
/// (quotes kept for quoted paths).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub span: Range,
    pub text: String,
}

/// Scan the text for URLs and file paths. Matches must start at the text
/// start or after whitespace so words like `either/or` stay plain; trailing
/// sentence periods are excluded from unquoted matches.
pub fn find_links(text: &str) -> Vec<(usize, usize, String)> {
    let mut out = Vec::new();
    for m in link_pattern().find_iter(text) {
        if m.start() > 0 {
            let before = text[..m.start()].chars().next_back();
            if !before.is_some_and(char::is_whitespace) {
                continue;
            }
        }
        let mut matched = m.as_str();
        if !matched.starts_with('"') {
            matched = matched.trim_end_matches('.');
        }
        if matched.is_empty() {
            continue;
        }
        let start = text[..m.start()].chars().count();
        out.push((start, start + matched.chars().count(), matched.to_string()));
    }
    out
}

/// Re-run link detection over the whole document and rebuild the hyperlink
/// tag from scratch.
pub fn detect_links(doc: &mut Document) {
    doc.tags.clear(HYPERLINK);
    let text = doc.get_text();
    for (start, end, _) in find_links(&text) {
        doc.tags.add(
            HYPERLINK,
            Range::new(doc.offset_to_position(start), doc.offset_to_position(end)),
        );
    }
}

/// The text of the link under `pos`, if the position carries the hyperlink
/// tag and links are currently active.
pub fn link_at(doc: &Document, pos: crate::document_model::Position) -> Option<String> {
    if !doc.links_enabled() {
        return None;
    }
    let span = doc
        .tags
        .tag_ranges(HYPERLINK)
        .iter()
        .find(|r| r.contains(pos))
        .copied()?;
    Some(doc.text_range(span))
}

/// What activating a link should do. Plain-text files open in the editor
/// itself; everything else is handed to the system opener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    Url(String),
    EditorFile(PathBuf),
    ExternalFile(PathBuf),
}

/// Resolve link text to an action. Quotes around paths are stripped before
/// the existence check. Err carries the user-facing message.
pub fn resolve_link(text: &str) -> Result<LinkTarget, String> {
    if text.starts_with("http://") || text.starts_with("https://") {
        return Ok(LinkTarget::Url(text.to_string()));
    }
    if text.starts_with("www.") {
        return Ok(LinkTarget::Url(format!("http://{text}")));
    }

    let path_text = text.trim_matches('"');
    let path = Path::new(path_text);
    if !path.exists() {
        return Err(format!("Could not open: {path_text}"));
    }
    if path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
    {
        Ok(LinkTarget::EditorFile(path.to_path_buf()))
    } else {
        Ok(LinkTarget::ExternalFile(path.to_path_buf()))
    }
}
