use crate::document_model::tags::{
    BLUE_LINE, BOLD_LINE, GREEN_LINE, GREY_LINE, LINE_STYLE_TAGS, MAROON_LINE, NORMAL_LINE,
};
use crate::document_model::{Document, Position, Range};
use crate::settings::Settings;

/// Line categories derived from the leading (left-trimmed) prefix.
/// Mutually exclusive; recomputed in full on every formatting pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    Heading,
    Task,
    Note,
    Done,
    Memo,
    Normal,
}

impl LineClass {
    pub fn classify(line: &str) -> LineClass {
        let stripped = line.trim_start();
        if heading_level(stripped).is_some() {
            LineClass::Heading
        } else if stripped.starts_with("T ") {
            LineClass::Task
        } else if stripped.starts_with("N ") {
            LineClass::Note
        } else if stripped.starts_with("X ") || stripped.starts_with("C ") {
            LineClass::Done
        } else if stripped.starts_with("M ") {
            LineClass::Memo
        } else {
            LineClass::Normal
        }
    }

    pub fn style_tag(self) -> &'static str {
        match self {
            LineClass::Heading => BOLD_LINE,
            LineClass::Task => BLUE_LINE,
            LineClass::Note => GREEN_LINE,
            LineClass::Done => GREY_LINE,
            LineClass::Memo => MAROON_LINE,
            LineClass::Normal => NORMAL_LINE,
        }
    }
}

/// A heading is 1-3 `#` characters immediately followed by a space.
/// Returns the level, or None for anything else (`####`, `#x`, bare `#`).
fn heading_level(stripped: &str) -> Option<usize> {
    let level = stripped.chars().take_while(|&c| c == '#').count();
    if (1..=3).contains(&level) && stripped.chars().nth(level) == Some(' ') {
        Some(level)
    } else {
        None
    }
}

/// Uppercase the first character of the first non-whitespace run and
/// lowercase the remainder of that run. Leading whitespace is preserved
/// verbatim; the rest of the line is untouched.
pub fn capitalize_first_word(line: &str) -> String {
    let trimmed = line.trim_start();
    if trimmed.is_empty() {
        return line.to_string();
    }
    let indent_len = line.len() - trimmed.len();
    let indentation = &line[..indent_len];

    let (first_word, rest) = match trimmed.split_once(' ') {
        Some((word, rest)) => (word, Some(rest)),
        None => (trimmed, None),
    };
    let capitalized = capitalize_word(first_word);
    match rest {
        Some(rest) => format!("{indentation}{capitalized} {rest}"),
        None => format!("{indentation}{capitalized}"),
    }
}

fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            // Multi-char uppercase mappings ('ß' -> "SS") keep only the
            // leading char uppercased; the tail is folded back to lowercase
            // so a second pass leaves the word unchanged.
            let mut upper = first.to_uppercase();
            let mut out = String::new();
            out.extend(upper.next());
            out.extend(upper.flat_map(|c| c.to_lowercase()));
            out.extend(chars.flat_map(|c| c.to_lowercase()));
            out
        }
        None => String::new(),
    }
}

/// Capitalize every space-separated word, preserving empty tokens so that
/// consecutive spaces survive exactly.
fn capitalize_heading_words(text: &str) -> String {
    text.split(' ')
        .map(capitalize_word)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Apply heading word-capitalization when the left-trimmed line is a valid
/// heading; otherwise return the line unchanged.
pub fn format_heading_line(line: &str) -> String {
    let trimmed = line.trim_start();
    let Some(level) = heading_level(trimmed) else {
        return line.to_string();
    };
    let indent_len = line.len() - trimmed.len();
    let indentation = &line[..indent_len];
    let content = &trimmed[level + 1..];
    format!(
        "{indentation}{}{}",
        &trimmed[..level + 1],
        capitalize_heading_words(content)
    )
}

/// When the line ends in a letter or digit, return it with a full stop
/// appended. Used by the Enter handler when auto-full-stop is enabled.
pub fn append_full_stop(line: &str) -> Option<String> {
    let last = line.chars().last()?;
    if last.is_alphanumeric() {
        Some(format!("{line}."))
    } else {
        None
    }
}

pub struct LineFormatter;

impl LineFormatter {
    /// One full formatting pass: rewrite capitalization per enabled rules
    /// and re-tag every line with exactly one style. Cursor and selection
    /// are snapshotted before the pass and restored after. Idempotent.
    pub fn reformat(doc: &mut Document, settings: &Settings) {
        if !settings.line_formatting_enabled {
            Self::strip_styles(doc);
            return;
        }

        let cursor = doc.cursor();
        let selection = doc.selection();

        for tag in LINE_STYLE_TAGS {
            doc.tags.clear(tag);
        }

        for idx in 0..doc.line_count() {
            let Some(line) = doc.get_line(idx) else {
                continue;
            };
            let line = line.to_string();

            let mut formatted = line.clone();
            if settings.auto_capitalize_first_word {
                let indented = formatted.starts_with(char::is_whitespace);
                if !indented || settings.auto_capitalize_indented {
                    formatted = capitalize_first_word(&formatted);
                }
            }
            if formatted.trim_start().starts_with('#') && settings.auto_capitalize_headings {
                formatted = format_heading_line(&formatted);
            }

            if formatted != line {
                let span = Range::new(
                    Position::new(idx, 0),
                    Position::new(idx, line.chars().count()),
                );
                doc.replace_range(span, &formatted);
            }

            let class = LineClass::classify(&formatted);
            let span = Range::new(
                Position::new(idx, 0),
                Position::new(idx, formatted.chars().count()),
            );
            doc.tags.add(class.style_tag(), span);
        }

        doc.set_cursor(cursor);
        if let Some(sel) = selection {
            doc.set_selection(sel);
        }
    }

    /// Remove every line-style tag without touching line content.
    pub fn strip_styles(doc: &mut Document) {
        for tag in LINE_STYLE_TAGS {
            doc.tags.clear(tag);
        }
    }
}
