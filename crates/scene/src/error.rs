//! Error types for hierarchy edits.

use thiserror::Error;

use crate::TransformId;

/// Error type for operations on a [`TransformTree`](crate::TransformTree).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HierarchyError {
    /// A node was asked to become its own parent.
    #[error("transform {0:?} cannot be its own parent")]
    SelfParent(TransformId),

    /// The proposed parent is a descendant of the child.
    #[error("parenting {child:?} to its descendant {parent:?} would create a cycle")]
    Cycle {
        /// Node being re-parented.
        child: TransformId,
        /// Proposed parent.
        parent: TransformId,
    },

    /// The handle refers to a transform that was removed.
    #[error("transform {0:?} does not exist")]
    StaleHandle(TransformId),

    /// The parent's world matrix has no inverse (zero scale on an axis).
    #[error("world matrix of parent {0:?} is not invertible")]
    SingularParent(TransformId),
}

impl HierarchyError {
    /// Whether this is a rejected cycle or self-parenting attempt.
    pub fn is_invalid_hierarchy(&self) -> bool {
        matches!(self, Self::SelfParent(_) | Self::Cycle { .. })
    }
}

/// Result type alias for hierarchy operations.
pub type HierarchyResult<T> = Result<T, HierarchyError>;
