// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for geometry kernel operations

use crate::ElementId;
use thiserror::Error;

/// Result type alias for kernel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the geometry kernel
///
/// Every variant is a deterministic function of the input; none of them is
/// retried internally. Requesting a leaf type that never appears in a tree is
/// not an error and has no variant here: it yields an empty sequence.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A required input was missing or out of range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Nothing usable was left to aggregate
    #[error("Empty input to {operation}: no usable items remain")]
    EmptyInput { operation: &'static str },

    /// A pairwise boolean union could not be resolved
    #[error("Boolean operation failed at input {index}: {message}")]
    BooleanOperationFailed { index: usize, message: String },

    /// Geometry that makes a construction undefined (e.g. a vertical wall)
    #[error("Degenerate geometry: {message}")]
    DegenerateGeometry {
        element: Option<ElementId>,
        message: String,
    },

    /// Near-zero length or parallel direction vectors
    #[error("Degenerate direction: {0}")]
    DegenerateDirection(String),

    /// Element has no location of any supported kind
    #[error("Element {0} has no classifiable location")]
    MissingLocation(ElementId),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Create an empty input error for the named operation
    pub fn empty_input(operation: &'static str) -> Self {
        Error::EmptyInput { operation }
    }

    /// Create a boolean failure error for the operand at `index`
    pub fn boolean_failed(index: usize, msg: impl Into<String>) -> Self {
        Error::BooleanOperationFailed {
            index,
            message: msg.into(),
        }
    }

    /// Create a degenerate geometry error, optionally tied to an element
    pub fn degenerate_geometry(element: Option<ElementId>, msg: impl Into<String>) -> Self {
        Error::DegenerateGeometry {
            element,
            message: msg.into(),
        }
    }

    /// Create a degenerate direction error
    pub fn degenerate_direction(msg: impl Into<String>) -> Self {
        Error::DegenerateDirection(msg.into())
    }

    /// Whether the error marks an element as unclassifiable rather than a
    /// broken call
    pub fn is_unclassifiable(&self) -> bool {
        matches!(
            self,
            Error::MissingLocation(_) | Error::DegenerateGeometry { .. }
        )
    }
}
