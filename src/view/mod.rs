/// View subsystem - terminal rendering, independent of controller logic.

pub mod renderer;

pub use renderer::{RenderParams, View};
