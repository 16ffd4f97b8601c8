use crate::document_model::tags::{
    BLUE_LINE, BOLD_LINE, GREEN_LINE, GREY_LINE, HIGHLIGHT, HIGHLIGHT_SELECTED, HYPERLINK,
    MAROON_LINE, PRESERVED_SELECTION, SEARCH_HIGHLIGHT,
};
use crate::document_model::{Document, Position};
use crossterm::{
    cursor, execute,
    style::{Attribute, Color, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{Clear, ClearType, size},
};
use std::io::{self, Write, stdout};
use unicode_width::UnicodeWidthChar;

#[derive(Clone, Copy)]
pub struct RenderParams<'a> {
    pub title: &'a str,
    pub status_message: &'a str,
    /// Extra rows above the status line while a panel is open; newline
    /// separated.
    pub panel: Option<&'a str>,
    /// Put the terminal cursor here instead of at the document cursor.
    pub cursor_override: Option<(usize, usize)>,
}

/// Resolved appearance of one cell, built up from the tags covering it in
/// priority order.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
struct CellStyle {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
    underline: bool,
}

impl CellStyle {
    fn apply_tag(&mut self, tag: &str) {
        match tag {
            GREEN_LINE => self.fg = Some(Color::Green),
            BLUE_LINE => self.fg = Some(Color::Blue),
            GREY_LINE => self.fg = Some(Color::DarkGrey),
            MAROON_LINE => self.fg = Some(Color::DarkRed),
            BOLD_LINE => self.bold = true,
            HYPERLINK => {
                self.fg = Some(Color::Blue);
                self.underline = true;
            }
            HIGHLIGHT => {
                self.bg = Some(Color::Yellow);
                self.fg = Some(Color::Black);
            }
            HIGHLIGHT_SELECTED => {
                self.bg = Some(Color::DarkYellow);
                self.fg = Some(Color::Black);
            }
            PRESERVED_SELECTION => {
                self.bg = Some(Color::DarkGrey);
                self.fg = Some(Color::White);
            }
            SEARCH_HIGHLIGHT => {
                self.bg = Some(Color::Cyan);
                self.fg = Some(Color::Black);
            }
            _ => {}
        }
    }
}

pub struct View {
    scroll_offset: usize,
    horizontal_scroll: usize,
    last_terminal_size: (u16, u16),
}

impl View {
    pub fn new() -> Self {
        Self {
            scroll_offset: 0,
            horizontal_scroll: 0,
            last_terminal_size: (0, 0),
        }
    }

    fn move_cursor(&self, line: usize, column: usize) -> io::Result<()> {
        execute!(stdout(), cursor::MoveTo(column as u16, line as u16))
    }

    /// Appearance of the cell at `pos`: tag styles first, then the live
    /// selection overlay on top.
    fn style_at(&self, doc: &Document, pos: Position) -> CellStyle {
        let mut style = CellStyle::default();
        for tag in doc.tags.tags_at(pos) {
            style.apply_tag(tag);
        }
        if doc.selection().is_some_and(|sel| sel.contains(pos)) {
            style.bg = Some(Color::Grey);
            style.fg = Some(Color::Black);
        }
        style
    }

    fn emit_style(&self, style: CellStyle) -> io::Result<()> {
        let mut out = stdout();
        execute!(out, ResetColor, SetAttribute(Attribute::Reset))?;
        if let Some(fg) = style.fg {
            execute!(out, SetForegroundColor(fg))?;
        }
        if let Some(bg) = style.bg {
            execute!(out, SetBackgroundColor(bg))?;
        }
        if style.bold {
            execute!(out, SetAttribute(Attribute::Bold))?;
        }
        if style.underline {
            execute!(out, SetAttribute(Attribute::Underlined))?;
        }
        Ok(())
    }

    pub fn render(&mut self, doc: &mut Document, params: &RenderParams) -> io::Result<()> {
        let (width, height) = size()?;
        if self.last_terminal_size != (width, height) {
            self.last_terminal_size = (width, height);
            execute!(stdout(), Clear(ClearType::All))?;
        }

        // Reserve the title row, optional panel rows, and status row.
        let panel_rows = params.panel.map_or(0, |p| p.lines().count());
        let text_rows = (height as usize).saturating_sub(2 + panel_rows).max(1);
        let text_width = width as usize;

        if let Some(target) = doc.take_scroll_request() {
            self.scroll_to(target, text_rows, text_width);
        }
        self.adjust_scroll_to_cursor(doc.cursor(), text_rows, text_width);

        self.move_cursor(0, 0)?;
        execute!(stdout(), Clear(ClearType::CurrentLine))?;
        print!("{}", clip(params.title, text_width));

        for row in 0..text_rows {
            let line_idx = self.scroll_offset + row;
            self.move_cursor(row + 1, 0)?;
            execute!(stdout(), Clear(ClearType::CurrentLine))?;

            let Some(line) = doc.get_line(line_idx).map(|l| l.to_string()) else {
                continue;
            };
            let mut current = CellStyle::default();
            let mut used = 0usize;
            for (col, ch) in line.chars().enumerate().skip(self.horizontal_scroll) {
                let ch_width = ch.width().unwrap_or(1);
                if used + ch_width > text_width {
                    break;
                }
                let style = self.style_at(doc, Position::new(line_idx, col));
                if style != current {
                    self.emit_style(style)?;
                    current = style;
                }
                print!("{ch}");
                used += ch_width;
            }
            execute!(stdout(), ResetColor, SetAttribute(Attribute::Reset))?;
        }

        if let Some(panel) = params.panel {
            for (i, line) in panel.lines().enumerate() {
                self.move_cursor(1 + text_rows + i, 0)?;
                execute!(stdout(), Clear(ClearType::CurrentLine))?;
                print!("{}", clip(line, text_width));
            }
        }

        self.move_cursor(1 + text_rows + panel_rows, 0)?;
        execute!(stdout(), Clear(ClearType::CurrentLine))?;
        print!("{}", clip(params.status_message, text_width));

        let (cursor_row, cursor_col) = match params.cursor_override {
            Some(over) => over,
            None => {
                let pos = doc.cursor();
                let line = doc.get_line(pos.line).unwrap_or_default();
                let display = self.display_column(line, pos.column);
                (
                    pos.line.saturating_sub(self.scroll_offset) + 1,
                    display.saturating_sub(self.horizontal_scroll),
                )
            }
        };
        self.move_cursor(cursor_row, cursor_col)?;

        stdout().flush()
    }

    /// Bring a requested position on screen, roughly centered vertically.
    fn scroll_to(&mut self, target: Position, visible_rows: usize, width: usize) {
        if target.line < self.scroll_offset || target.line >= self.scroll_offset + visible_rows {
            self.scroll_offset = target.line.saturating_sub(visible_rows / 2);
        }
        if target.column < self.horizontal_scroll
            || target.column >= self.horizontal_scroll + width
        {
            self.horizontal_scroll = target.column.saturating_sub(width / 2);
        }
    }

    fn adjust_scroll_to_cursor(&mut self, cursor: Position, visible_rows: usize, width: usize) {
        if cursor.line < self.scroll_offset {
            self.scroll_offset = cursor.line;
        } else if cursor.line >= self.scroll_offset + visible_rows {
            self.scroll_offset = cursor.line - visible_rows + 1;
        }

        if cursor.column < self.horizontal_scroll {
            self.horizontal_scroll = cursor.column;
        } else if cursor.column >= self.horizontal_scroll + width {
            self.horizontal_scroll = cursor.column - width + 1;
        }
    }

    /// Display column of a logical character index, accounting for wide
    /// characters.
    fn display_column(&self, text: &str, logical: usize) -> usize {
        text.chars()
            .take(logical)
            .map(|c| c.width().unwrap_or(1))
            .sum()
    }
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}

fn clip(text: &str, width: usize) -> &str {
    match text.char_indices().nth(width) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_model::Range;

    #[test]
    fn test_display_column_wide_chars() {
        let view = View::new();
        assert_eq!(view.display_column("abc", 0), 0);
        assert_eq!(view.display_column("abc", 3), 3);
        assert_eq!(view.display_column("a中b", 2), 3);
    }

    #[test]
    fn test_adjust_scroll_keeps_cursor_visible() {
        let mut view = View::new();
        view.adjust_scroll_to_cursor(Position::new(30, 0), 10, 80);
        assert_eq!(view.scroll_offset, 21);
        view.adjust_scroll_to_cursor(Position::new(5, 0), 10, 80);
        assert_eq!(view.scroll_offset, 5);
    }

    #[test]
    fn test_adjust_scroll_horizontal() {
        let mut view = View::new();
        view.adjust_scroll_to_cursor(Position::new(0, 100), 10, 80);
        assert_eq!(view.horizontal_scroll, 21);
        view.adjust_scroll_to_cursor(Position::new(0, 10), 10, 80);
        assert_eq!(view.horizontal_scroll, 10);
    }

    #[test]
    fn test_style_resolution_priority() {
        let view = View::new();
        let mut doc = Document::from_string("hello");
        let span = Range::new(Position::new(0, 0), Position::new(0, 5));
        doc.tags.add(BLUE_LINE, span);
        doc.tags.add(SEARCH_HIGHLIGHT, span);

        let style = view.style_at(&doc, Position::new(0, 2));
        assert_eq!(style.bg, Some(Color::Cyan));
        assert_eq!(style.fg, Some(Color::Black));
    }

    #[test]
    fn test_selection_overlays_tags() {
        let view = View::new();
        let mut doc = Document::from_string("hello");
        let span = Range::new(Position::new(0, 0), Position::new(0, 5));
        doc.tags.add(HIGHLIGHT, span);
        doc.set_selection(span);

        let style = view.style_at(&doc, Position::new(0, 2));
        assert_eq!(style.bg, Some(Color::Grey));
    }

    #[test]
    fn test_clip_respects_char_boundaries() {
        assert_eq!(clip("héllo", 3), "hél");
        assert_eq!(clip("ab", 5), "ab");
    }
}
