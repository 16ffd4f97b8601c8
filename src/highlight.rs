use crate::document_model::tags::{HIGHLIGHT, HIGHLIGHT_SELECTED};
use crate::document_model::{Document, Position, Range};

/// Toggle the yellow highlight on the selection, or on the cursor's whole
/// line when nothing is selected. A region toggles off when a highlighted
/// range already sits entirely inside it; otherwise the whole region is
/// highlighted.
pub fn toggle_highlight(doc: &mut Document) {
    let span = match doc.selection() {
        Some(sel) => sel,
        None => {
            let line = doc.cursor().line;
            Range::new(
                Position::new(line, 0),
                Position::new(line, doc.line_length(line)),
            )
        }
    };
    if span.is_empty() {
        return;
    }

    let already = doc
        .tags
        .tag_ranges(HIGHLIGHT)
        .iter()
        .any(|r| r.start >= span.start && r.end <= span.end);

    if already {
        doc.tags.remove(HIGHLIGHT, span);
    } else {
        doc.tags.add(HIGHLIGHT, span);
    }
    update_highlight_selection(doc);
}

/// Keep the overlap tag in sync with the current selection: every part of a
/// highlighted range that lies inside the selection gets the blended tag so
/// it stays visible under the selection color. Rebuilt on every selection
/// change.
pub fn update_highlight_selection(doc: &mut Document) {
    doc.tags.clear(HIGHLIGHT_SELECTED);
    let Some(sel) = doc.selection() else {
        return;
    };
    let overlaps: Vec<Range> = doc
        .tags
        .tag_ranges(HIGHLIGHT)
        .iter()
        .filter_map(|r| r.intersect(&sel))
        .collect();
    for overlap in overlaps {
        doc.tags.add(HIGHLIGHT_SELECTED, overlap);
    }
}
