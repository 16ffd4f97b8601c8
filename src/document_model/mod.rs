pub mod document;
pub mod tags;
pub mod text_buffer;
pub mod undo;

pub use document::Document;
pub use tags::TagSet;
pub use text_buffer::{Position, Range, TextBuffer};
