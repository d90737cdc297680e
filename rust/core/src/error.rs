// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for floor plan and layout record handling.

/// Result type alias for floorgrid operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that halt a pipeline run.
///
/// Data-quality conditions (a door on a missing rectangle, zero usable
/// walls) are not errors; they are counted in the run statistics.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The layout record is structurally unusable (e.g. it has no groups).
    #[error("invalid layout record: {0}")]
    InvalidRecord(String),

    /// A floor plan violates its own invariants.
    #[error("invalid floor plan: {0}")]
    InvalidPlan(String),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Plan, record or config text could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
