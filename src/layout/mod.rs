//! Layout Module - Flexbox computation over a [`LayoutTree`](crate::LayoutTree).
//!
//! # Architecture
//!
//! - **algorithm**: the per-node pass, flex basis, lines, flexible lengths,
//!   justification and cross-axis alignment
//! - **absolute**: out-of-flow children, laid out after their container
//! - **baseline**: baselines for `align-items: baseline`
//! - **rounding**: snapping the finished tree to the pixel grid
//! - **types**: the [`Layout`] read back by callers
//!
//! # Example
//!
//! ```
//! use spark_flex::{Direction, LayoutTree, Style, Value};
//!
//! let mut tree = LayoutTree::new();
//! let root = tree.new_node_with_style(Style {
//!     width: Value::point(100.0),
//!     height: Value::point(50.0),
//!     ..Style::default()
//! });
//! tree.calculate_layout(root, None, None, Direction::Ltr).unwrap();
//!
//! let layout = tree.layout(root).unwrap();
//! assert_eq!((layout.width(), layout.height()), (100.0, 50.0));
//! ```

mod absolute;
mod algorithm;
mod baseline;
mod rounding;
mod types;

pub use rounding::round_value_to_pixel_grid;
pub use types::Layout;
