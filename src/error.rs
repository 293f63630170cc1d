//! Error types for the invdepth-factors library.
//!
//! All errors use the `thiserror` crate for automatic trait implementations.
//! Note that the cheirality fault raised during projection
//! ([`crate::camera::CheiralityError`]) is absorbed inside the factors: it
//! produces a fallback residual, never an error to the caller. The crate
//! error surfaces only caller contract violations at the graph-facing
//! `Factor::linearize` boundary.

use thiserror::Error;

/// Main result type used throughout the invdepth-factors library.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the invdepth-factors library.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Invalid input parameters at the evaluation boundary.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
