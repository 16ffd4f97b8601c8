use crate::calendar::CalendarPicker;
use crate::controller::find_panel::{FindPanel, PanelOutcome};
use crate::controller::settings_panel::{SettingsOutcome, SettingsPanel};
use crate::document_model::{Document, Position, Range};
use crate::find_replace::Prompter;
use crate::format::{LineFormatter, append_full_stop};
use crate::highlight::{toggle_highlight, update_highlight_selection};
use crate::links::{self, LinkTarget};
use crate::settings::Settings;
use crate::view::{RenderParams, View};
use arboard::Clipboard;
use chrono::Local;
use crossterm::{
    cursor, event,
    event::{Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{
        Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode, size,
    },
};
use log::{debug, warn};
use std::io::stdout;
use std::path::Path;

const PAGE_STEP: usize = 20;

fn save_timestamp() -> String {
    Local::now().format("%Y-%m-%d %I:%M %p").to_string()
}

/// Prompter backed by the bottom terminal row. Confirmations block on a
/// y/n keypress; notices are collected for the status line.
struct TerminalPrompter {
    pending_message: Option<String>,
}

impl TerminalPrompter {
    fn new() -> Self {
        Self {
            pending_message: None,
        }
    }

    fn take_message(&mut self) -> Option<String> {
        self.pending_message.take()
    }
}

impl Prompter for TerminalPrompter {
    fn confirm(&mut self, message: &str) -> bool {
        let answer = (|| -> std::io::Result<bool> {
            let (_, height) = size()?;
            execute!(
                stdout(),
                cursor::MoveTo(0, height.saturating_sub(1)),
                Clear(ClearType::CurrentLine)
            )?;
            print!("{message} (y/n) ");
            use std::io::Write;
            stdout().flush()?;
            loop {
                if let Event::Key(key) = event::read()? {
                    match key.code {
                        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                            return Ok(true);
                        }
                        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                            return Ok(false);
                        }
                        _ => {}
                    }
                }
            }
        })();
        answer.unwrap_or(false)
    }

    fn info(&mut self, message: &str) {
        self.pending_message = Some(message.to_string());
    }

    fn warning(&mut self, message: &str) {
        self.pending_message = Some(format!("Warning: {message}"));
    }
}

pub struct EditorController {
    doc: Document,
    settings: Settings,
    view: View,
    find_panel: Option<FindPanel>,
    settings_panel: Option<SettingsPanel>,
    calendar: Option<CalendarPicker>,
    prompter: TerminalPrompter,
    clipboard: Option<Clipboard>,
    selection_anchor: Option<Position>,
    status_message: String,
    readonly: bool,
}

impl EditorController {
    pub fn new(doc: Document, settings: Settings) -> Self {
        let clipboard = match Clipboard::new() {
            Ok(c) => Some(c),
            Err(err) => {
                warn!("clipboard unavailable: {err}");
                None
            }
        };
        let readonly = settings.readonly_mode;
        let mut controller = Self {
            doc,
            settings,
            view: View::new(),
            find_panel: None,
            settings_panel: None,
            calendar: None,
            prompter: TerminalPrompter::new(),
            clipboard,
            selection_anchor: None,
            status_message: String::new(),
            readonly,
        };
        controller.refresh_document();
        controller.doc.reset_history();
        controller.doc.modified = false;
        controller
    }

    pub fn run(mut self) -> Result<(), Box<dyn std::error::Error>> {
        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen)?;

        let result = self.run_loop();

        disable_raw_mode()?;
        execute!(stdout(), LeaveAlternateScreen)?;

        self.settings.last_file = self.doc.filename.clone();
        if let Err(err) = self.settings.save() {
            warn!("could not save settings: {err}");
        }

        result
    }

    fn run_loop(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        loop {
            let title = self.title_line();
            let status = if self.status_message.is_empty() {
                let pos = self.doc.cursor();
                format!("Ln {}, Col {}", pos.line + 1, pos.column + 1)
            } else {
                self.status_message.clone()
            };
            let panel = if let Some(picker) = &self.calendar {
                Some(picker.panel_text())
            } else if let Some(panel) = &self.settings_panel {
                Some(panel.panel_text(&self.settings))
            } else {
                self.find_panel.as_ref().map(|panel| panel.panel_text())
            };
            let cursor_override = self.find_panel.as_ref().map(|panel| {
                let (_, height) = size().unwrap_or((80, 24));
                let panel_rows = panel.panel_text().lines().count();
                let row = (height as usize).saturating_sub(1 + panel_rows);
                (row, panel.cursor_column())
            });

            let params = RenderParams {
                title: &title,
                status_message: &status,
                panel: panel.as_deref(),
                cursor_override,
            };
            self.view.render(&mut self.doc, &params)?;

            if let Event::Key(key) = event::read()? {
                self.status_message.clear();
                let quit = if self.calendar.is_some() {
                    self.handle_calendar_key(key);
                    false
                } else if self.settings_panel.is_some() {
                    self.handle_settings_key(key);
                    false
                } else if self.find_panel.is_some() {
                    self.handle_panel_key(key);
                    false
                } else {
                    self.handle_editor_key(key)?
                };
                if let Some(message) = self.prompter.take_message() {
                    self.set_status(message);
                }
                if quit {
                    break;
                }
            }
        }
        Ok(())
    }

    fn title_line(&self) -> String {
        let name = self
            .doc
            .filename
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "Untitled".to_string());
        let modified = if self.doc.modified { " *" } else { "" };
        let readonly = if self.readonly { " [read-only]" } else { "" };
        format!("Notething - {name}{modified}{readonly}")
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    /// Gate for anything that edits the buffer.
    fn editable(&mut self) -> bool {
        if self.readonly {
            self.set_status("Read-only mode");
            return false;
        }
        true
    }

    /// Post-edit pass: reformat lines and re-scan for links.
    fn refresh_document(&mut self) {
        LineFormatter::reformat(&mut self.doc, &self.settings);
        links::detect_links(&mut self.doc);
    }

    // --- key dispatch ---

    fn handle_editor_key(&mut self, key: KeyEvent) -> Result<bool, Box<dyn std::error::Error>> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);

        if ctrl {
            match key.code {
                KeyCode::Char('q') => return Ok(self.request_quit()),
                KeyCode::Char('n') => self.new_file(),
                KeyCode::Char('o') => self.open_file_prompt()?,
                KeyCode::Char('s') => self.save_file()?,
                KeyCode::Char('z') => self.undo(),
                KeyCode::Char('y') => self.redo(),
                KeyCode::Char('f') => self.open_find_panel(false),
                KeyCode::Char('r') => self.open_find_panel(true),
                KeyCode::Char('d') => self.calendar = Some(CalendarPicker::new()),
                KeyCode::Char('p') => self.settings_panel = Some(SettingsPanel::new()),
                KeyCode::Char('h') => self.toggle_highlight_command(),
                KeyCode::Char('l') => self.activate_link(),
                KeyCode::Char('c') => self.copy_selection(),
                KeyCode::Char('x') => self.cut_selection(),
                KeyCode::Char('v') => self.paste(),
                _ => {}
            }
            return Ok(false);
        }

        match key.code {
            KeyCode::Left => self.move_cursor(0, -1, shift),
            KeyCode::Right => self.move_cursor(0, 1, shift),
            KeyCode::Up => self.move_cursor(-1, 0, shift),
            KeyCode::Down => self.move_cursor(1, 0, shift),
            KeyCode::Home => self.move_to(Position::new(self.doc.cursor().line, 0), shift),
            KeyCode::End => {
                let line = self.doc.cursor().line;
                self.move_to(Position::new(line, self.doc.line_length(line)), shift);
            }
            KeyCode::PageUp => self.move_cursor(-(PAGE_STEP as isize), 0, shift),
            KeyCode::PageDown => self.move_cursor(PAGE_STEP as isize, 0, shift),
            KeyCode::Enter => self.insert_newline(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete_forward(),
            KeyCode::Tab => self.insert_char('\t'),
            KeyCode::Char(c) => self.insert_char(c),
            _ => {}
        }
        Ok(false)
    }

    fn handle_panel_key(&mut self, key: KeyEvent) {
        let Some(mut panel) = self.find_panel.take() else {
            return;
        };
        let outcome = panel.handle_key(key, &mut self.doc, &mut self.prompter);
        match outcome {
            PanelOutcome::Open => self.find_panel = Some(panel),
            PanelOutcome::Closed => {
                self.refresh_document();
            }
        }
    }

    fn handle_settings_key(&mut self, key: KeyEvent) {
        let Some(mut panel) = self.settings_panel.take() else {
            return;
        };
        match panel.handle_key(key, &mut self.settings) {
            SettingsOutcome::Open => self.settings_panel = Some(panel),
            SettingsOutcome::Closed => {
                self.readonly = self.settings.readonly_mode;
                self.refresh_document();
            }
        }
    }

    fn handle_calendar_key(&mut self, key: KeyEvent) {
        let Some(picker) = self.calendar.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Left => picker.move_selection(-1),
            KeyCode::Right => picker.move_selection(1),
            KeyCode::Up => picker.move_selection(-7),
            KeyCode::Down => picker.move_selection(7),
            KeyCode::Enter => {
                let date = picker.formatted();
                self.calendar = None;
                if self.editable() {
                    self.doc.begin_edit_group();
                    let end = self.doc.insert_text(self.doc.cursor(), &date);
                    self.doc.set_cursor(end);
                    self.refresh_document();
                    self.doc.end_edit_group();
                }
            }
            KeyCode::Esc => self.calendar = None,
            _ => {}
        }
    }

    // --- movement and selection ---

    fn move_cursor(&mut self, lines: isize, columns: isize, extend: bool) {
        let pos = self.doc.cursor();
        let target = if columns < 0 && pos.column == 0 && pos.line > 0 {
            // Wrap to the end of the previous line.
            Position::new(pos.line - 1, self.doc.line_length(pos.line - 1))
        } else if columns > 0
            && pos.column >= self.doc.line_length(pos.line)
            && pos.line + 1 < self.doc.line_count()
        {
            Position::new(pos.line + 1, 0)
        } else {
            Position::new(
                pos.line.saturating_add_signed(lines),
                pos.column.saturating_add_signed(columns),
            )
        };
        self.move_to(target, extend);
    }

    fn move_to(&mut self, target: Position, extend: bool) {
        if extend && self.selection_anchor.is_none() {
            self.selection_anchor = Some(self.doc.cursor());
        }
        if !extend {
            self.selection_anchor = None;
        }
        self.doc.set_cursor(target);
        match self.selection_anchor {
            Some(anchor) => {
                self.doc.set_selection(Range::new(anchor, self.doc.cursor()));
            }
            None => self.doc.clear_selection(),
        }
        update_highlight_selection(&mut self.doc);
    }

    // --- editing ---

    fn insert_char(&mut self, c: char) {
        if !self.editable() {
            return;
        }
        self.doc.begin_edit_group();
        self.delete_selection_if_any();
        let end = self.doc.insert_text(self.doc.cursor(), &c.to_string());
        self.doc.set_cursor(end);
        self.refresh_document();
        self.doc.end_edit_group();
    }

    /// Enter: optionally close the left line with a full stop, then break.
    fn insert_newline(&mut self) {
        if !self.editable() {
            return;
        }
        self.doc.begin_edit_group();
        self.delete_selection_if_any();
        if self.settings.auto_full_stop {
            let pos = self.doc.cursor();
            let line = self.doc.get_line(pos.line).unwrap_or_default().to_string();
            if pos.column == line.chars().count() {
                if let Some(closed) = append_full_stop(&line) {
                    let span = Range::new(
                        Position::new(pos.line, 0),
                        Position::new(pos.line, line.chars().count()),
                    );
                    let end = self.doc.replace_range(span, &closed);
                    self.doc.set_cursor(end);
                }
            }
        }
        let end = self.doc.insert_text(self.doc.cursor(), "\n");
        self.doc.set_cursor(end);
        self.refresh_document();
        self.doc.end_edit_group();
    }

    fn backspace(&mut self) {
        if !self.editable() {
            return;
        }
        self.doc.begin_edit_group();
        if self.delete_selection_if_any() {
            self.refresh_document();
            self.doc.end_edit_group();
            return;
        }
        let pos = self.doc.cursor();
        if pos == Position::zero() {
            self.doc.end_edit_group();
            return;
        }
        let before = if pos.column > 0 {
            Position::new(pos.line, pos.column - 1)
        } else {
            Position::new(pos.line - 1, self.doc.line_length(pos.line - 1))
        };
        self.doc.delete_range(Range::new(before, pos));
        self.doc.set_cursor(before);
        self.refresh_document();
        self.doc.end_edit_group();
    }

    fn delete_forward(&mut self) {
        if !self.editable() {
            return;
        }
        self.doc.begin_edit_group();
        if self.delete_selection_if_any() {
            self.refresh_document();
            self.doc.end_edit_group();
            return;
        }
        let pos = self.doc.cursor();
        let after = if pos.column < self.doc.line_length(pos.line) {
            Position::new(pos.line, pos.column + 1)
        } else if pos.line + 1 < self.doc.line_count() {
            Position::new(pos.line + 1, 0)
        } else {
            self.doc.end_edit_group();
            return;
        };
        self.doc.delete_range(Range::new(pos, after));
        self.refresh_document();
        self.doc.end_edit_group();
    }

    fn delete_selection_if_any(&mut self) -> bool {
        let Some(sel) = self.doc.selection() else {
            return false;
        };
        self.doc.delete_range(sel);
        self.doc.set_cursor(sel.start);
        self.doc.clear_selection();
        self.selection_anchor = None;
        update_highlight_selection(&mut self.doc);
        true
    }

    fn undo(&mut self) {
        if !self.editable() {
            return;
        }
        if self.doc.undo_edit() {
            self.refresh_document();
        } else {
            self.set_status("Nothing to undo");
        }
    }

    fn redo(&mut self) {
        if !self.editable() {
            return;
        }
        if self.doc.redo_edit() {
            self.refresh_document();
        } else {
            self.set_status("Nothing to redo");
        }
    }

    // --- clipboard ---

    fn copy_selection(&mut self) {
        let Some(sel) = self.doc.selection() else {
            return;
        };
        let text = self.doc.text_range(sel);
        match self.clipboard.as_mut() {
            Some(clipboard) => {
                if let Err(err) = clipboard.set_text(text) {
                    warn!("clipboard copy failed: {err}");
                    self.set_status("Copy failed");
                }
            }
            None => self.set_status("Clipboard unavailable"),
        }
    }

    fn cut_selection(&mut self) {
        if self.doc.selection().is_none() || !self.editable() {
            return;
        }
        self.copy_selection();
        self.doc.begin_edit_group();
        self.delete_selection_if_any();
        self.refresh_document();
        self.doc.end_edit_group();
    }

    fn paste(&mut self) {
        if !self.editable() {
            return;
        }
        let text = match self.clipboard.as_mut() {
            Some(clipboard) => match clipboard.get_text() {
                Ok(text) => text,
                Err(err) => {
                    debug!("clipboard paste failed: {err}");
                    return;
                }
            },
            None => {
                self.set_status("Clipboard unavailable");
                return;
            }
        };
        self.doc.begin_edit_group();
        self.delete_selection_if_any();
        let end = self.doc.insert_text(self.doc.cursor(), &text);
        self.doc.set_cursor(end);
        self.refresh_document();
        self.doc.end_edit_group();
    }

    // --- commands ---

    fn request_quit(&mut self) -> bool {
        if self.doc.modified {
            return self
                .prompter
                .confirm("Unsaved changes. Quit without saving?");
        }
        true
    }

    fn new_file(&mut self) {
        if self.doc.modified && !self.prompter.confirm("Unsaved changes. Discard them?") {
            return;
        }
        self.doc = Document::new();
        self.selection_anchor = None;
        self.refresh_document();
    }

    fn open_file_prompt(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if self.doc.modified && !self.prompter.confirm("Unsaved changes. Discard them?") {
            return Ok(());
        }
        let Some(path) = self.prompt_input("Open file: ")? else {
            return Ok(());
        };
        self.open_path(Path::new(&path));
        Ok(())
    }

    fn open_path(&mut self, path: &Path) {
        match Document::open(path) {
            Ok(doc) => {
                self.doc = doc;
                self.selection_anchor = None;
                self.refresh_document();
                self.doc.reset_history();
                self.doc.modified = false;
                self.settings.last_file = self.doc.filename.clone();
                self.set_status(format!("Opened {}", path.display()));
            }
            Err(err) => self.set_status(format!("Could not open {}: {err}", path.display())),
        }
    }

    fn save_file(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if self.doc.filename.is_none() {
            let Some(path) = self.prompt_input("Save as: ")? else {
                return Ok(());
            };
            match self.doc.save_to(Path::new(&path)) {
                Ok(()) => self.set_status(format!("Saved {path} {}", save_timestamp())),
                Err(err) => self.set_status(format!("Save failed: {err}")),
            }
        } else {
            match self.doc.save() {
                Ok(()) => self.set_status(format!("Saved {}", save_timestamp())),
                Err(err) => self.set_status(format!("Save failed: {err}")),
            }
        }
        self.settings.last_file = self.doc.filename.clone();
        Ok(())
    }

    fn open_find_panel(&mut self, replace_focus: bool) {
        let mut panel = if replace_focus {
            FindPanel::open_replace(&mut self.doc, &self.settings)
        } else {
            FindPanel::open(&mut self.doc, &self.settings)
        };
        let settings = self.settings.clone();
        panel
            .session
            .set_refresh_hook(Box::new(move |doc: &mut Document| {
                LineFormatter::reformat(doc, &settings);
                links::detect_links(doc);
            }));
        self.find_panel = Some(panel);
    }

    fn toggle_highlight_command(&mut self) {
        if !self.settings.highlight_enabled {
            self.set_status("Highlighting is disabled in settings");
            return;
        }
        toggle_highlight(&mut self.doc);
    }

    fn activate_link(&mut self) {
        let Some(text) = links::link_at(&self.doc, self.doc.cursor()) else {
            return;
        };
        match links::resolve_link(&text) {
            Ok(LinkTarget::Url(url)) => {
                if let Err(err) = open::that(&url) {
                    warn!("could not open {url}: {err}");
                    self.set_status(format!("Could not open: {url}"));
                }
            }
            Ok(LinkTarget::EditorFile(path)) => {
                if !self.doc.modified || self.prompter.confirm("Unsaved changes. Discard them?") {
                    self.open_path(&path);
                }
            }
            Ok(LinkTarget::ExternalFile(path)) => {
                if let Err(err) = open::that(&path) {
                    warn!("could not open {}: {err}", path.display());
                    self.set_status(format!("Could not open: {}", path.display()));
                }
            }
            Err(message) => self.set_status(message),
        }
    }

    /// Single-line input on the bottom terminal row. Esc cancels.
    fn prompt_input(&mut self, label: &str) -> std::io::Result<Option<String>> {
        let mut input = String::new();
        loop {
            let (_, height) = size()?;
            execute!(
                stdout(),
                cursor::MoveTo(0, height.saturating_sub(1)),
                Clear(ClearType::CurrentLine)
            )?;
            print!("{label}{input}");
            use std::io::Write;
            stdout().flush()?;

            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Enter => {
                        if input.is_empty() {
                            return Ok(None);
                        }
                        return Ok(Some(input));
                    }
                    KeyCode::Esc => return Ok(None),
                    KeyCode::Backspace => {
                        input.pop();
                    }
                    KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                        input.push(c);
                    }
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller_with(text: &str) -> EditorController {
        let mut controller = EditorController::new(
            Document::from_string(text),
            Settings {
                auto_capitalize_first_word: false,
                ..Settings::default()
            },
        );
        // Tests never touch the system clipboard.
        controller.clipboard = None;
        controller
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn shift(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::SHIFT)
    }

    #[test]
    fn test_typed_characters_edit_the_buffer() {
        let mut controller = controller_with("");
        controller.handle_editor_key(key(KeyCode::Char('h'))).unwrap();
        controller.handle_editor_key(key(KeyCode::Char('i'))).unwrap();
        assert_eq!(controller.doc.get_text(), "hi");
        assert_eq!(controller.doc.cursor(), Position::new(0, 2));
    }

    #[test]
    fn test_each_keystroke_is_one_undo_step() {
        let mut controller = controller_with("");
        controller.handle_editor_key(key(KeyCode::Char('a'))).unwrap();
        controller.handle_editor_key(key(KeyCode::Char('b'))).unwrap();
        assert!(controller.doc.undo_edit());
        assert_eq!(controller.doc.get_text(), "a");
        assert!(controller.doc.redo_edit());
        assert_eq!(controller.doc.get_text(), "ab");
    }

    #[test]
    fn test_enter_splits_line() {
        let mut controller = controller_with("ab");
        controller.doc.set_cursor(Position::new(0, 1));
        controller.handle_editor_key(key(KeyCode::Enter)).unwrap();
        assert_eq!(controller.doc.get_text(), "a\nb");
        assert_eq!(controller.doc.cursor(), Position::new(1, 0));
    }

    #[test]
    fn test_enter_appends_full_stop_when_enabled() {
        let mut controller = controller_with("note");
        controller.settings.auto_full_stop = true;
        controller.doc.set_cursor(Position::new(0, 4));
        controller.handle_editor_key(key(KeyCode::Enter)).unwrap();
        assert_eq!(controller.doc.get_text(), "note.\n");
    }

    #[test]
    fn test_full_stop_only_at_line_end() {
        let mut controller = controller_with("note");
        controller.settings.auto_full_stop = true;
        controller.doc.set_cursor(Position::new(0, 2));
        controller.handle_editor_key(key(KeyCode::Enter)).unwrap();
        assert_eq!(controller.doc.get_text(), "no\nte");
    }

    #[test]
    fn test_backspace_joins_lines() {
        let mut controller = controller_with("a\nb");
        controller.doc.set_cursor(Position::new(1, 0));
        controller.handle_editor_key(key(KeyCode::Backspace)).unwrap();
        assert_eq!(controller.doc.get_text(), "ab");
        assert_eq!(controller.doc.cursor(), Position::new(0, 1));
    }

    #[test]
    fn test_shift_arrows_extend_selection() {
        let mut controller = controller_with("hello");
        controller.handle_editor_key(shift(KeyCode::Right)).unwrap();
        controller.handle_editor_key(shift(KeyCode::Right)).unwrap();
        assert_eq!(
            controller.doc.selection(),
            Some(Range::new(Position::new(0, 0), Position::new(0, 2)))
        );

        // Plain movement drops the selection.
        controller.handle_editor_key(key(KeyCode::Right)).unwrap();
        assert!(controller.doc.selection().is_none());
    }

    #[test]
    fn test_typing_replaces_selection() {
        let mut controller = controller_with("hello");
        controller.handle_editor_key(shift(KeyCode::End)).unwrap();
        controller.handle_editor_key(key(KeyCode::Char('x'))).unwrap();
        assert_eq!(controller.doc.get_text(), "x");
    }

    #[test]
    fn test_readonly_blocks_edits() {
        let mut controller = controller_with("abc");
        controller.readonly = true;
        controller.handle_editor_key(key(KeyCode::Char('x'))).unwrap();
        controller.handle_editor_key(key(KeyCode::Backspace)).unwrap();
        assert_eq!(controller.doc.get_text(), "abc");
        assert!(controller.status_message.contains("Read-only"));
    }

    #[test]
    fn test_cursor_wraps_at_line_edges() {
        let mut controller = controller_with("ab\ncd");
        controller.doc.set_cursor(Position::new(1, 0));
        controller.handle_editor_key(key(KeyCode::Left)).unwrap();
        assert_eq!(controller.doc.cursor(), Position::new(0, 2));
        controller.handle_editor_key(key(KeyCode::Right)).unwrap();
        assert_eq!(controller.doc.cursor(), Position::new(1, 0));
    }

    #[test]
    fn test_calendar_enter_inserts_date() {
        let mut controller = controller_with("");
        controller.calendar = Some(CalendarPicker::with_date(
            chrono::NaiveDate::from_ymd_opt(2026, 3, 5).unwrap(),
        ));
        controller.handle_calendar_key(key(KeyCode::Right));
        controller.handle_calendar_key(key(KeyCode::Enter));
        assert_eq!(controller.doc.get_text(), "06/03/2026");
        assert!(controller.calendar.is_none());
    }

    #[test]
    fn test_calendar_escape_cancels() {
        let mut controller = controller_with("");
        controller.calendar = Some(CalendarPicker::new());
        controller.handle_calendar_key(key(KeyCode::Esc));
        assert!(controller.calendar.is_none());
        assert_eq!(controller.doc.get_text(), "");
    }

    #[test]
    fn test_panel_close_triggers_reformat() {
        let mut controller = controller_with("t lower");
        controller.settings.auto_capitalize_first_word = true;
        controller.open_find_panel(false);
        controller.handle_panel_key(key(KeyCode::Esc));
        assert!(controller.find_panel.is_none());
        assert_eq!(controller.doc.get_text(), "T lower");
    }

    #[test]
    fn test_formatting_runs_after_edit() {
        let mut controller = controller_with("");
        controller.settings.auto_capitalize_first_word = true;
        for c in "t x".chars() {
            controller.handle_editor_key(key(KeyCode::Char(c))).unwrap();
        }
        assert_eq!(controller.doc.get_text(), "T x");
    }

    #[test]
    fn test_highlight_toggle_respects_setting() {
        use crate::document_model::tags::HIGHLIGHT;

        let mut controller = controller_with("abc");
        controller.settings.highlight_enabled = false;
        controller.toggle_highlight_command();
        assert!(controller.doc.tags.tag_ranges(HIGHLIGHT).is_empty());

        controller.settings.highlight_enabled = true;
        controller.toggle_highlight_command();
        assert!(!controller.doc.tags.tag_ranges(HIGHLIGHT).is_empty());
    }
}
