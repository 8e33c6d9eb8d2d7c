//! # spark-flex
//!
//! Headless flexbox layout engine for Rust.
//!
//! Build a tree of boxes, give each a [`Style`], and ask the engine where
//! everything goes. Output is plain geometry: positions and sizes in points,
//! optionally snapped to a pixel grid. Nothing here draws.
//!
//! ## Architecture
//!
//! Nodes live in one arena owned by a [`LayoutTree`] and are addressed by
//! [`NodeId`]. Leaves may carry a measure function for content such as text;
//! every other box is sized by the flexbox algorithm.
//!
//! Repeated layouts are cheap: style changes mark the node and its ancestors
//! dirty, and clean subtrees answer from a per-node cache of earlier
//! measurements.
//!
//! ```text
//! set_style / mark_dirty → dirty path to root → calculate_layout → Layout per node
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Core value types (Value, Size, style enums, Edge)
//! - [`style`] - Style record and per-edge values
//! - [`config`] - Per-tree configuration and experimental features
//! - [`engine`] - Node arena, tree API, measurement cache
//! - [`layout`] - The flexbox algorithm, rounding, computed Layout
//! - [`error`] - Errors from tree mutation

pub mod config;
pub mod engine;
pub mod error;
pub mod layout;
pub mod style;
pub mod types;

#[cfg(test)]
mod bench_layout;

// Re-export commonly used items
pub use types::*;

pub use config::{Config, ExperimentalFeatures, NodeClonedObserver};

pub use engine::{
    BaselineFunc, BaselineInput, LayoutTree, MeasureCache, MeasureFunc, MeasureInput, NodeContext,
    NodeFlags, NodeId, MAX_CACHED_MEASUREMENTS,
};

pub use error::{LayoutError, LayoutResult};

pub use layout::{round_value_to_pixel_grid, Layout};

pub use style::{Edges, Style};
