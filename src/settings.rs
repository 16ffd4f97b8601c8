use log::debug;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const RC_NAME: &str = ".notethingrc";

/// The flat, process-wide option set. Loaded once at startup; dialogs mutate
/// fields directly and call `save` on confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub reopen_last_file: bool,
    pub match_case_default: bool,
    pub line_formatting_enabled: bool,
    pub auto_capitalize_headings: bool,
    pub auto_capitalize_first_word: bool,
    pub auto_capitalize_indented: bool,
    pub highlight_enabled: bool,
    pub auto_full_stop: bool,
    pub readonly_mode: bool,
    pub default_find_text: String,
    pub default_replace_text: String,
    pub last_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reopen_last_file: false,
            match_case_default: false,
            line_formatting_enabled: true,
            auto_capitalize_headings: true,
            auto_capitalize_first_word: false,
            auto_capitalize_indented: false,
            highlight_enabled: true,
            auto_full_stop: false,
            readonly_mode: false,
            default_find_text: String::new(),
            default_replace_text: String::new(),
            last_file: None,
        }
    }
}

impl Settings {
    /// Look for the rc file in the current directory first, then $HOME.
    pub fn rc_path() -> Option<PathBuf> {
        let local = Path::new(RC_NAME);
        if local.exists() {
            return Some(local.to_path_buf());
        }
        if let Ok(home) = env::var("HOME") {
            let home_rc = Path::new(&home).join(RC_NAME);
            if home_rc.exists() {
                return Some(home_rc);
            }
        }
        None
    }

    /// Where `save` writes when no rc file exists yet: $HOME if set,
    /// otherwise the current directory.
    fn default_save_path() -> PathBuf {
        match env::var("HOME") {
            Ok(home) => Path::new(&home).join(RC_NAME),
            Err(_) => PathBuf::from(RC_NAME),
        }
    }

    pub fn load() -> Self {
        let mut settings = Settings::default();
        if let Some(path) = Self::rc_path() {
            match fs::read_to_string(&path) {
                Ok(content) => {
                    settings.parse_content(&content);
                    debug!("loaded settings from {}", path.display());
                }
                Err(err) => {
                    debug!("could not read {}: {err}", path.display());
                }
            }
        }
        settings
    }

    pub fn save(&self) -> io::Result<()> {
        let path = Self::rc_path().unwrap_or_else(Self::default_save_path);
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.to_rc_string())?;
        debug!("saved settings to {}", path.display());
        Ok(())
    }

    fn parse_content(&mut self, content: &str) {
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            // Strip inline comments.
            let line = match line.find('#') {
                Some(pos) => line[..pos].trim(),
                None => line,
            };
            if let Some((key, value)) = line.split_once('=') {
                self.apply(key.trim(), value.trim());
            }
        }
    }

    fn apply(&mut self, key: &str, value: &str) {
        match key {
            "reopen_last_file" => self.reopen_last_file = parse_bool(value),
            "match_case_default" => self.match_case_default = parse_bool(value),
            "line_formatting_enabled" => self.line_formatting_enabled = parse_bool(value),
            "auto_capitalize_headings" => self.auto_capitalize_headings = parse_bool(value),
            "auto_capitalize_first_word" => self.auto_capitalize_first_word = parse_bool(value),
            "auto_capitalize_indented" => self.auto_capitalize_indented = parse_bool(value),
            "highlight_enabled" => self.highlight_enabled = parse_bool(value),
            "auto_full_stop" => self.auto_full_stop = parse_bool(value),
            "readonly_mode" => self.readonly_mode = parse_bool(value),
            "default_find_text" => self.default_find_text = value.to_string(),
            "default_replace_text" => self.default_replace_text = value.to_string(),
            "last_file" => {
                self.last_file = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            _ => {} // Unknown setting, ignore
        }
    }

    fn to_rc_string(&self) -> String {
        let mut out = String::from("# notething settings\n");
        let bools = [
            ("reopen_last_file", self.reopen_last_file),
            ("match_case_default", self.match_case_default),
            ("line_formatting_enabled", self.line_formatting_enabled),
            ("auto_capitalize_headings", self.auto_capitalize_headings),
            ("auto_capitalize_first_word", self.auto_capitalize_first_word),
            ("auto_capitalize_indented", self.auto_capitalize_indented),
            ("highlight_enabled", self.highlight_enabled),
            ("auto_full_stop", self.auto_full_stop),
            ("readonly_mode", self.readonly_mode),
        ];
        for (key, value) in bools {
            out.push_str(&format!("{key}={value}\n"));
        }
        out.push_str(&format!("default_find_text={}\n", self.default_find_text));
        out.push_str(&format!(
            "default_replace_text={}\n",
            self.default_replace_text
        ));
        out.push_str(&format!(
            "last_file={}\n",
            self.last_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        ));
        out
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "true" | "1" | "yes")
}
