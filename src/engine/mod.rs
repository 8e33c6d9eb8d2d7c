//! Engine - Node storage, caches, and the tree API.
//!
//! The engine manages the core data structures:
//! - Registry: slot allocation with a free-index pool
//! - Node: style, callbacks, computed layout and cache for one box
//! - Cache: per-node memo of earlier measurements
//! - Tree: the public mutation API and dirty propagation
//!
//! # Architecture
//!
//! Nodes are NOT linked objects. They live in one arena and refer to each
//! other by [`NodeId`]:
//!
//! ```text
//! Slot 0: root   (parent=None, children=[1, 2])
//! Slot 1: text   (parent=0,    children=[],  measure=Some)
//! Slot 2: column (parent=0,    children=[])
//! ```
//!
//! Parent links are plain ids, so there are no reference cycles and parent
//! lookup stays O(1).

mod cache;
mod node;
mod registry;
mod tree;

pub use cache::*;
pub use node::*;
pub(crate) use registry::NodeArena;
pub use tree::*;
