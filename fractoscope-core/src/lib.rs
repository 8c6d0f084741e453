pub mod color;
pub mod complex;
pub mod error;
pub mod fractal;
pub mod julia;
pub mod mandelbrot;
pub mod view_state;
pub mod viewport;

// Re-export primary types for convenience.
pub use color::{shade, unpack_rgb, ColorScheme};
pub use complex::Complex;
pub use error::CoreError;
pub use fractal::{escape_time, Fractal, FractalVariant, ESCAPE_RADIUS_SQ};
pub use julia::Julia;
pub use mandelbrot::Mandelbrot;
pub use view_state::ViewState;
pub use viewport::Viewport;

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
