/// Controller subsystem - user input handling and command execution, kept
/// separate from the document and view layers.

pub mod editor;
pub mod find_panel;
pub mod settings_panel;

pub use editor::EditorController;
