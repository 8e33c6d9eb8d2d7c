//! Errors reported by tree mutations.
//!
//! Layout itself never fails over valid handles; everything here is a
//! misuse of the tree API.

use thiserror::Error;

use crate::engine::NodeId;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    #[error("node {0} does not exist")]
    InvalidNode(NodeId),

    #[error("node {child} already has parent {parent}; remove it first")]
    ChildAlreadyHasParent { child: NodeId, parent: NodeId },

    #[error("index {index} is out of bounds for {parent} with {child_count} children")]
    ChildIndexOutOfBounds { parent: NodeId, index: usize, child_count: usize },

    #[error("inserting {child} under {parent} would create a cycle")]
    WouldCreateCycle { parent: NodeId, child: NodeId },

    #[error("node {0} has a measure function and cannot have children")]
    MeasuredNodeCannotHaveChildren(NodeId),

    #[error("only nodes with a measure function can be marked dirty, {0} has none")]
    NotMeasured(NodeId),

    #[error("node {0} must be detached from its parent and children before reset")]
    NodeStillAttached(NodeId),
}

pub type LayoutResult<T> = Result<T, LayoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err =
            LayoutError::ChildIndexOutOfBounds { parent: NodeId(1), index: 4, child_count: 2 };
        assert_eq!(err.to_string(), "index 4 is out of bounds for #1 with 2 children");
        assert_eq!(LayoutError::InvalidNode(NodeId(7)).to_string(), "node #7 does not exist");
    }
}
