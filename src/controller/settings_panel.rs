use crate::settings::Settings;
use crossterm::event::{KeyCode, KeyEvent};
use log::warn;

const FIELD_COUNT: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsOutcome {
    Open,
    Closed,
}

/// The settings panel: the boolean options as a navigable checklist.
/// Closing the panel persists the settings to the rc file.
pub struct SettingsPanel {
    selected: usize,
}

impl SettingsPanel {
    pub fn new() -> Self {
        Self { selected: 0 }
    }

    fn label(index: usize) -> &'static str {
        match index {
            0 => "Reopen last file on startup",
            1 => "Match case by default in find",
            2 => "Line formatting",
            3 => "Auto-capitalize headings",
            4 => "Auto-capitalize first word",
            5 => "Auto-capitalize indented lines",
            6 => "Highlighting",
            7 => "Auto full stop on Enter",
            8 => "Read-only mode",
            _ => unreachable!(),
        }
    }

    fn value(settings: &Settings, index: usize) -> bool {
        match index {
            0 => settings.reopen_last_file,
            1 => settings.match_case_default,
            2 => settings.line_formatting_enabled,
            3 => settings.auto_capitalize_headings,
            4 => settings.auto_capitalize_first_word,
            5 => settings.auto_capitalize_indented,
            6 => settings.highlight_enabled,
            7 => settings.auto_full_stop,
            8 => settings.readonly_mode,
            _ => unreachable!(),
        }
    }

    fn toggle(settings: &mut Settings, index: usize) {
        match index {
            0 => settings.reopen_last_file = !settings.reopen_last_file,
            1 => settings.match_case_default = !settings.match_case_default,
            2 => settings.line_formatting_enabled = !settings.line_formatting_enabled,
            3 => settings.auto_capitalize_headings = !settings.auto_capitalize_headings,
            4 => settings.auto_capitalize_first_word = !settings.auto_capitalize_first_word,
            5 => settings.auto_capitalize_indented = !settings.auto_capitalize_indented,
            6 => settings.highlight_enabled = !settings.highlight_enabled,
            7 => settings.auto_full_stop = !settings.auto_full_stop,
            8 => settings.readonly_mode = !settings.readonly_mode,
            _ => unreachable!(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, settings: &mut Settings) -> SettingsOutcome {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                if let Err(err) = settings.save() {
                    warn!("could not save settings: {err}");
                }
                return SettingsOutcome::Closed;
            }
            KeyCode::Up => {
                self.selected = self.selected.checked_sub(1).unwrap_or(FIELD_COUNT - 1);
            }
            KeyCode::Down => {
                self.selected = (self.selected + 1) % FIELD_COUNT;
            }
            KeyCode::Char(' ') => Self::toggle(settings, self.selected),
            _ => {}
        }
        SettingsOutcome::Open
    }

    pub fn panel_text(&self, settings: &Settings) -> String {
        let mut out = String::from("Settings  (arrows move, Space toggles, Esc saves)\n");
        for index in 0..FIELD_COUNT {
            let marker = if index == self.selected { ">" } else { " " };
            let checked = if Self::value(settings, index) { "x" } else { " " };
            out.push_str(&format!("{marker}[{checked}] {}\n", Self::label(index)));
        }
        out.pop();
        out
    }
}

impl Default for SettingsPanel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_space_toggles_selected_field() {
        let mut panel = SettingsPanel::new();
        let mut settings = Settings::default();
        assert!(!settings.reopen_last_file);

        panel.handle_key(key(KeyCode::Char(' ')), &mut settings);
        assert!(settings.reopen_last_file);

        panel.handle_key(key(KeyCode::Down), &mut settings);
        panel.handle_key(key(KeyCode::Char(' ')), &mut settings);
        assert!(settings.match_case_default);
    }

    #[test]
    fn test_navigation_wraps() {
        let mut panel = SettingsPanel::new();
        let mut settings = Settings::default();
        panel.handle_key(key(KeyCode::Up), &mut settings);
        assert_eq!(panel.selected, FIELD_COUNT - 1);
        panel.handle_key(key(KeyCode::Down), &mut settings);
        assert_eq!(panel.selected, 0);
    }

    #[test]
    fn test_panel_text_marks_state() {
        let panel = SettingsPanel::new();
        let settings = Settings::default();
        let text = panel.panel_text(&settings);
        assert!(text.contains(">[ ] Reopen last file"));
        assert!(text.contains(" [x] Line formatting"));
        assert_eq!(text.lines().count(), 1 + FIELD_COUNT);
    }
}
