use super::text_buffer::{Position, Range};
use std::collections::HashMap;

// Tag names used across the editor. Color tags are mutually exclusive per
// line; the rest may overlap and are resolved by rendering priority.
pub const NORMAL_LINE: &str = "normal_line";
pub const GREEN_LINE: &str = "green_line";
pub const BLUE_LINE: &str = "blue_line";
pub const GREY_LINE: &str = "grey_line";
pub const MAROON_LINE: &str = "maroon_line";
pub const BOLD_LINE: &str = "bold_line";
pub const HYPERLINK: &str = "hyperlink";
pub const HIGHLIGHT: &str = "highlight";
pub const HIGHLIGHT_SELECTED: &str = "highlight_selected";
pub const PRESERVED_SELECTION: &str = "preserved_selection";
pub const SEARCH_HIGHLIGHT: &str = "search_highlight";

pub const LINE_STYLE_TAGS: [&str; 6] = [
    NORMAL_LINE,
    GREEN_LINE,
    BLUE_LINE,
    GREY_LINE,
    MAROON_LINE,
    BOLD_LINE,
];

/// Named range annotations over buffer positions with an explicit
/// rendering-priority order. Later entries in the order render on top.
pub struct TagSet {
    order: Vec<String>,
    ranges: HashMap<String, Vec<Range>>,
}

impl TagSet {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            ranges: HashMap::new(),
        }
    }

    /// Register a tag at the top of the render order if it isn't known yet.
    pub fn configure(&mut self, name: &str) {
        if !self.order.iter().any(|t| t == name) {
            self.order.push(name.to_string());
        }
        self.ranges.entry(name.to_string()).or_default();
    }

    pub fn is_configured(&self, name: &str) -> bool {
        self.order.iter().any(|t| t == name)
    }

    pub fn add(&mut self, name: &str, range: Range) {
        if range.is_empty() {
            return;
        }
        self.configure(name);
        let ranges = self.ranges.get_mut(name).expect("configured above");
        ranges.push(range);
        ranges.sort_by_key(|r| r.start);
    }

    /// Remove the parts of this tag's ranges that fall inside `span`.
    pub fn remove(&mut self, name: &str, span: Range) {
        let Some(ranges) = self.ranges.get_mut(name) else {
            return;
        };
        let mut kept = Vec::with_capacity(ranges.len());
        for r in ranges.drain(..) {
            if r.end <= span.start || r.start >= span.end {
                kept.push(r);
                continue;
            }
            if r.start < span.start {
                kept.push(Range::new(r.start, span.start));
            }
            if r.end > span.end {
                kept.push(Range::new(span.end, r.end));
            }
        }
        *ranges = kept;
    }

    pub fn clear(&mut self, name: &str) {
        if let Some(ranges) = self.ranges.get_mut(name) {
            ranges.clear();
        }
    }

    /// Drop the tag entirely, ranges and render-order entry both.
    pub fn delete(&mut self, name: &str) {
        self.ranges.remove(name);
        self.order.retain(|t| t != name);
    }

    pub fn tag_ranges(&self, name: &str) -> &[Range] {
        self.ranges.get(name).map_or(&[], |r| r.as_slice())
    }

    /// Reorder `name` to render just above `above`. A raise involving an
    /// unknown tag is a no-op; callers treat it as best-effort.
    pub fn raise(&mut self, name: &str, above: &str) {
        let Some(above_idx) = self.order.iter().position(|t| t == above) else {
            return;
        };
        let Some(name_idx) = self.order.iter().position(|t| t == name) else {
            return;
        };
        let tag = self.order.remove(name_idx);
        let above_idx = if name_idx < above_idx {
            above_idx
        } else {
            above_idx + 1
        };
        self.order.insert(above_idx, tag);
    }

    /// All tags covering `pos`, lowest priority first.
    pub fn tags_at(&self, pos: Position) -> Vec<&str> {
        self.order
            .iter()
            .filter(|name| {
                self.ranges
                    .get(name.as_str())
                    .is_some_and(|rs| rs.iter().any(|r| r.contains(pos)))
            })
            .map(|s| s.as_str())
            .collect()
    }

    /// The highest-priority tag covering `pos`, if any.
    pub fn top_at(&self, pos: Position) -> Option<&str> {
        self.tags_at(pos).last().copied()
    }
}

impl Default for TagSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(sl: usize, sc: usize, el: usize, ec: usize) -> Range {
        Range::new(Position::new(sl, sc), Position::new(el, ec))
    }

    #[test]
    fn test_add_and_query() {
        let mut tags = TagSet::new();
        tags.add(BLUE_LINE, span(0, 0, 0, 5));
        assert_eq!(tags.tag_ranges(BLUE_LINE).len(), 1);
        assert_eq!(tags.tags_at(Position::new(0, 3)), vec![BLUE_LINE]);
        assert!(tags.tags_at(Position::new(0, 5)).is_empty());
    }

    #[test]
    fn test_empty_range_ignored() {
        let mut tags = TagSet::new();
        tags.add(HIGHLIGHT, span(0, 2, 0, 2));
        assert!(tags.tag_ranges(HIGHLIGHT).is_empty());
    }

    #[test]
    fn test_remove_splits_range() {
        let mut tags = TagSet::new();
        tags.add(HIGHLIGHT, span(0, 0, 0, 10));
        tags.remove(HIGHLIGHT, span(0, 3, 0, 6));
        let ranges = tags.tag_ranges(HIGHLIGHT);
        assert_eq!(ranges, &[span(0, 0, 0, 3), span(0, 6, 0, 10)]);
    }

    #[test]
    fn test_remove_whole_buffer_span() {
        let mut tags = TagSet::new();
        tags.add(SEARCH_HIGHLIGHT, span(1, 2, 1, 5));
        tags.remove(SEARCH_HIGHLIGHT, span(0, 0, 99, 0));
        assert!(tags.tag_ranges(SEARCH_HIGHLIGHT).is_empty());
    }

    #[test]
    fn test_priority_order_is_insertion_order() {
        let mut tags = TagSet::new();
        tags.add(HIGHLIGHT, span(0, 0, 0, 10));
        tags.add(SEARCH_HIGHLIGHT, span(0, 2, 0, 4));
        assert_eq!(tags.top_at(Position::new(0, 3)), Some(SEARCH_HIGHLIGHT));
        assert_eq!(tags.top_at(Position::new(0, 7)), Some(HIGHLIGHT));
    }

    #[test]
    fn test_raise_reorders() {
        let mut tags = TagSet::new();
        tags.add(SEARCH_HIGHLIGHT, span(0, 2, 0, 4));
        tags.add(PRESERVED_SELECTION, span(0, 0, 0, 10));
        // Preserved selection was added later so it renders on top; raise
        // the search highlight above it.
        assert_eq!(tags.top_at(Position::new(0, 3)), Some(PRESERVED_SELECTION));
        tags.raise(SEARCH_HIGHLIGHT, PRESERVED_SELECTION);
        assert_eq!(tags.top_at(Position::new(0, 3)), Some(SEARCH_HIGHLIGHT));
    }

    #[test]
    fn test_raise_unknown_tag_is_noop() {
        let mut tags = TagSet::new();
        tags.add(HIGHLIGHT, span(0, 0, 0, 5));
        tags.raise("missing", HIGHLIGHT);
        tags.raise(HIGHLIGHT, "missing");
        assert_eq!(tags.top_at(Position::new(0, 1)), Some(HIGHLIGHT));
    }

    #[test]
    fn test_delete_removes_definition() {
        let mut tags = TagSet::new();
        tags.add(PRESERVED_SELECTION, span(0, 0, 0, 5));
        tags.delete(PRESERVED_SELECTION);
        assert!(!tags.is_configured(PRESERVED_SELECTION));
        assert!(tags.tag_ranges(PRESERVED_SELECTION).is_empty());
    }
}
