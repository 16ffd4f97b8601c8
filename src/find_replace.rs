use crate::document_model::tags::{PRESERVED_SELECTION, SEARCH_HIGHLIGHT};
use crate::document_model::{Document, Position, Range};
use crate::settings::Settings;
use log::debug;

/// Modal notification surface the engine talks to. The controller backs it
/// with status-line prompts; tests script the answers.
pub trait Prompter {
    /// Modal yes/no question; used for wrap-around confirmation.
    fn confirm(&mut self, message: &str) -> bool;
    fn info(&mut self, message: &str);
    fn warning(&mut self, message: &str);
}

fn chars_match(a: char, b: char, match_case: bool) -> bool {
    if match_case {
        a == b
    } else {
        a.to_lowercase().eq(b.to_lowercase())
    }
}

/// Literal forward search for `term` in `[from, to)`, first match wins.
/// Works on absolute character offsets so terms may span line breaks.
pub fn search_forward(
    doc: &Document,
    term: &str,
    from: Position,
    to: Position,
    match_case: bool,
) -> Option<Range> {
    if term.is_empty() {
        return None;
    }
    let chars: Vec<char> = doc.get_text().chars().collect();
    let term_chars: Vec<char> = term.chars().collect();
    let from_off = doc.position_to_offset(from);
    let to_off = doc.position_to_offset(to).min(chars.len());
    if from_off + term_chars.len() > to_off {
        return None;
    }

    for start in from_off..=to_off - term_chars.len() {
        let matches = term_chars
            .iter()
            .enumerate()
            .all(|(i, &t)| chars_match(chars[start + i], t, match_case));
        if matches {
            return Some(Range::new(
                doc.offset_to_position(start),
                doc.offset_to_position(start + term_chars.len()),
            ));
        }
    }
    None
}

fn terms_equal(a: &str, b: &str, match_case: bool) -> bool {
    if match_case {
        a == b
    } else {
        a.to_lowercase() == b.to_lowercase()
    }
}

type CleanupAction = Box<dyn FnMut(&mut Document)>;

/// One open find/replace session over the document.
///
/// The selection present at open time is snapshotted and, when "search in
/// selection" is on, bounds every search and replace until the session
/// closes. The search cursor is the document cursor: each found match moves
/// it to the match end so repeated find-next walks forward.
pub struct FindReplaceSession {
    pub find_term: String,
    pub replace_term: String,
    pub match_case: bool,
    pub in_selection: bool,
    initial_selection: Option<Range>,
    cleanup: Vec<CleanupAction>,
    refresh_hook: Option<CleanupAction>,
    closed: bool,
}

impl FindReplaceSession {
    pub fn open(doc: &mut Document, settings: &Settings) -> Self {
        let initial_selection = doc.selection();
        if let Some(sel) = initial_selection {
            doc.tags.configure(PRESERVED_SELECTION);
            doc.tags.add(PRESERVED_SELECTION, sel);
        }
        doc.set_links_enabled(false);

        // Cleanup actions run in order on every close path; registering
        // them up front replaces ad-hoc teardown in the close handlers.
        let cleanup: Vec<CleanupAction> = vec![
            Box::new(|doc: &mut Document| doc.tags.clear(SEARCH_HIGHLIGHT)),
            Box::new(|doc: &mut Document| {
                doc.tags.clear(PRESERVED_SELECTION);
                doc.tags.delete(PRESERVED_SELECTION);
            }),
            Box::new(|doc: &mut Document| doc.set_links_enabled(true)),
        ];

        Self {
            find_term: settings.default_find_text.clone(),
            replace_term: settings.default_replace_text.clone(),
            match_case: settings.match_case_default,
            in_selection: initial_selection.is_some(),
            initial_selection,
            cleanup,
            refresh_hook: None,
            closed: false,
        }
    }

    /// Hook invoked after a replace-all that changed anything, so line
    /// styling catches up with the new content.
    pub fn set_refresh_hook(&mut self, hook: CleanupAction) {
        self.refresh_hook = Some(hook);
    }

    pub fn initial_selection(&self) -> Option<Range> {
        self.initial_selection
    }

    /// Search bounds for find-next: scoped searches clamp the cursor into
    /// the snapshot; unscoped searches run from the cursor to buffer end.
    /// None means the scope was requested but no selection exists.
    fn search_bounds(&self, doc: &Document) -> Option<(Position, Position)> {
        if self.in_selection {
            let sel = self.initial_selection?;
            let mut start = doc.cursor();
            if start < sel.start || start > sel.end {
                start = sel.start;
            }
            Some((start, sel.end))
        } else {
            Some((doc.cursor(), doc.end_position()))
        }
    }

    fn highlight_match(&self, doc: &mut Document, span: Range) {
        doc.tags.add(SEARCH_HIGHLIGHT, span);
        if self.initial_selection.is_some() {
            // Best effort; a no-op when the preserved tag is already gone.
            doc.tags.raise(SEARCH_HIGHLIGHT, PRESERVED_SELECTION);
        }
        doc.request_scroll(span.start);
        doc.set_cursor(span.end);
    }

    /// Find the next occurrence forward of the cursor, offering to wrap
    /// around the scope when the end is reached. Returns true on a match.
    pub fn find_next(&mut self, doc: &mut Document, prompter: &mut dyn Prompter) -> bool {
        if self.find_term.is_empty() {
            prompter.warning("Please enter text to find.");
            return false;
        }

        doc.tags.clear(SEARCH_HIGHLIGHT);

        let Some((start, stop)) = self.search_bounds(doc) else {
            prompter.warning("No text selected.");
            return false;
        };

        if let Some(span) = search_forward(doc, &self.find_term, start, stop, self.match_case) {
            self.highlight_match(doc, span);
            return true;
        }

        // End of scope; offer to restart from its beginning.
        let (wrap_start, message) = if self.in_selection {
            (
                self.initial_selection.map(|s| s.start).unwrap_or_default(),
                "Reached the end of the selection. Continue from the beginning of the selection?",
            )
        } else {
            (
                Position::zero(),
                "Reached the end of the document. Continue from the beginning?",
            )
        };

        if !prompter.confirm(message) {
            return false;
        }
        if let Some(span) = search_forward(doc, &self.find_term, wrap_start, start, self.match_case)
        {
            self.highlight_match(doc, span);
            return true;
        }
        prompter.info(&format!("Cannot find '{}'", self.find_term));
        false
    }

    /// Replace the currently highlighted match if it still equals the find
    /// term under the case rule; otherwise behave like find-next. Does not
    /// auto-advance after a successful replacement.
    pub fn replace(&mut self, doc: &mut Document, prompter: &mut dyn Prompter) {
        let highlighted = doc.tags.tag_ranges(SEARCH_HIGHLIGHT).first().copied();
        if let Some(span) = highlighted {
            let text = doc.text_range(span);
            if terms_equal(&text, &self.find_term, self.match_case) {
                doc.tags.remove(SEARCH_HIGHLIGHT, span);
                // One replacement is one undo step.
                doc.begin_edit_group();
                let end = doc.replace_range(span, &self.replace_term.clone());
                doc.end_edit_group();
                doc.set_cursor(end);
                return;
            }
        }
        self.find_next(doc, prompter);
    }

    /// Replace every occurrence within the scope in one undo unit.
    /// Returns the number of replacements.
    pub fn replace_all(&mut self, doc: &mut Document, prompter: &mut dyn Prompter) -> usize {
        if self.find_term.is_empty() {
            prompter.warning("Please enter text to find.");
            return 0;
        }

        // Scope bounds tracked as absolute character offsets so they can be
        // recomputed after each replacement, multi-line or not.
        let stop_off: Option<i64> = if self.in_selection {
            match self.initial_selection {
                Some(sel) => Some(doc.position_to_offset(sel.end) as i64),
                None => {
                    prompter.warning("No text selected.");
                    return 0;
                }
            }
        } else {
            None
        };
        let mut stop_off = stop_off;
        let mut current = match (self.in_selection, self.initial_selection) {
            (true, Some(sel)) => sel.start,
            _ => Position::zero(),
        };

        doc.tags.clear(SEARCH_HIGHLIGHT);

        let term_len = self.find_term.chars().count() as i64;
        let replacement = self.replace_term.clone();
        let rep_len = replacement.chars().count() as i64;

        doc.begin_edit_group();
        let mut count = 0usize;
        loop {
            let stop = match stop_off {
                Some(off) => doc.offset_to_position(off.max(0) as usize),
                None => doc.end_position(),
            };
            let Some(span) = search_forward(doc, &self.find_term, current, stop, self.match_case)
            else {
                break;
            };
            let end = doc.replace_range(span, &replacement);
            current = end;
            if let Some(off) = stop_off.as_mut() {
                *off += rep_len - term_len;
            }
            count += 1;
        }
        doc.end_edit_group();

        if count > 0 {
            debug!("replace_all: {count} occurrence(s) of {:?}", self.find_term);
            prompter.info(&format!("Replaced {count} occurrence(s)."));
            if let Some(mut hook) = self.refresh_hook.take() {
                hook(doc);
                self.refresh_hook = Some(hook);
            }
        } else {
            prompter.info(&format!("Cannot find '{}'", self.find_term));
        }
        count
    }

    /// Run every registered cleanup action. Every exit path funnels here;
    /// calling it twice is harmless.
    pub fn close(&mut self, doc: &mut Document) {
        if self.closed {
            return;
        }
        for action in &mut self.cleanup {
            action(doc);
        }
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
