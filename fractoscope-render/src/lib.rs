pub mod buffer;
pub mod engine;
pub mod error;
pub mod renderer;

pub use buffer::PixelBuffer;
pub use engine::{Engine, EngineConfig, RenderListener, RenderPhase, RenderPolicy};
pub use error::RenderError;
pub use renderer::{render_rows, render_view, ProgressReporter, RenderControl, RowStats};

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;
