// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for sequencer operations.

use thiserror::Error;

/// Errors from sequencer operations.
///
/// Range rejections leave prior state untouched; stack errors are raised
/// before any mutation happens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SequencerError {
    /// A range mutation supplied equal or inverted bounds.
    #[error("Range is empty or degenerate")]
    DegenerateRange,

    /// A sequence instance was pushed onto itself.
    #[error("Cannot focus the instance that is already focused")]
    Recursion,

    /// The requested instance is not on the stack.
    #[error("Sequence instance is not on the focus stack")]
    InstanceNotFound,

    /// Popping would remove the root instance.
    #[error("Cannot pop the root sequence instance")]
    EmptyStack,
}

/// Result type for sequencer operations.
pub type Result<T> = std::result::Result<T, SequencerError>;
