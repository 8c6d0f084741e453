use thiserror::Error;

/// Validation errors raised when a view parameter would put the kernel
/// into a meaningless state.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("invalid zoom: {0} (must be positive and finite)")]
    InvalidZoom(f64),

    #[error("invalid zoom factor: {0} (must be positive and finite)")]
    InvalidZoomFactor(f64),

    #[error("non-finite coordinate: {re} + {im}i")]
    NonFiniteCoordinate { re: f64, im: f64 },

    #[error("unknown {kind}: {value:?}")]
    UnknownName { kind: &'static str, value: String },
}
