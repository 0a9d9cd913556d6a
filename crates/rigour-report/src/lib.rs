//! Score joining and method comparison reporting.
//!
//! Takes the per-item scores extracted from the four fitted models, joins
//! them into one table keyed by item name, and computes the correlation
//! matrix between the methods' score columns. Rendering is plain text (or
//! serde for machine-readable output); plotting belongs to whatever
//! consumes the tables.

pub mod matrix;
pub mod render;
pub mod score_table;

pub use matrix::{CorrelationCell, CorrelationMatrix, correlation_matrix};
pub use score_table::{ScoreColumn, ScoreRow, ScoreTable};
