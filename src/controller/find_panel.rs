use crate::document_model::Document;
use crate::find_replace::{FindReplaceSession, Prompter};
use crate::settings::Settings;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Find,
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelOutcome {
    Open,
    Closed,
}

/// The find/replace input panel: two text fields plus the case and scope
/// toggles, driving one `FindReplaceSession`. Closing the panel closes the
/// session, which runs the registered cleanup.
pub struct FindPanel {
    pub session: FindReplaceSession,
    focus: Field,
}

impl FindPanel {
    pub fn open(doc: &mut Document, settings: &Settings) -> Self {
        Self {
            session: FindReplaceSession::open(doc, settings),
            focus: Field::Find,
        }
    }

    /// Like `open`, with focus on the replace field (the replace hotkey).
    pub fn open_replace(doc: &mut Document, settings: &Settings) -> Self {
        Self {
            session: FindReplaceSession::open(doc, settings),
            focus: Field::Replace,
        }
    }

    fn focused_term(&mut self) -> &mut String {
        match self.focus {
            Field::Find => &mut self.session.find_term,
            Field::Replace => &mut self.session.replace_term,
        }
    }

    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        doc: &mut Document,
        prompter: &mut dyn Prompter,
    ) -> PanelOutcome {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => {
                self.session.close(doc);
                return PanelOutcome::Closed;
            }
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Field::Find => Field::Replace,
                    Field::Replace => Field::Find,
                };
            }
            KeyCode::Enter | KeyCode::F(3) => {
                self.session.find_next(doc, prompter);
            }
            KeyCode::Char('r') if ctrl => {
                self.session.replace(doc, prompter);
            }
            KeyCode::Char('a') if ctrl => {
                self.session.replace_all(doc, prompter);
            }
            KeyCode::Char('c') if ctrl => {
                self.session.match_case = !self.session.match_case;
            }
            KeyCode::Char('e') if ctrl => {
                if self.session.initial_selection().is_some() {
                    self.session.in_selection = !self.session.in_selection;
                }
            }
            KeyCode::Char('t') if ctrl => {
                std::mem::swap(&mut self.session.find_term, &mut self.session.replace_term);
            }
            KeyCode::Backspace => {
                self.focused_term().pop();
            }
            KeyCode::Char(c) if !ctrl => {
                self.focused_term().push(c);
            }
            _ => {}
        }
        PanelOutcome::Open
    }

    fn toggle_marks(&self) -> String {
        format!(
            "[{}] Case  [{}] Selection",
            if self.session.match_case { "x" } else { " " },
            if self.session.in_selection { "x" } else { " " },
        )
    }

    /// Two panel rows: the input fields with a focus marker, then the
    /// toggles and key hints.
    pub fn panel_text(&self) -> String {
        let (find_mark, replace_mark) = match self.focus {
            Field::Find => (">", " "),
            Field::Replace => (" ", ">"),
        };
        format!(
            "{find_mark}Find: {}  {replace_mark}Replace: {}\n{}  Enter=find  ^R=replace  ^A=all  ^C=case  ^E=selection  ^T=swap  Esc=close",
            self.session.find_term,
            self.session.replace_term,
            self.toggle_marks(),
        )
    }

    /// Terminal cursor position within the panel's first row.
    pub fn cursor_column(&self) -> usize {
        let find_width = self.session.find_term.chars().count();
        match self.focus {
            Field::Find => "?Find: ".chars().count() + find_width,
            Field::Replace => {
                "?Find: ".chars().count()
                    + find_width
                    + "   Replace: ".chars().count()
                    + self.session.replace_term.chars().count()
            }
        }
    }
}
