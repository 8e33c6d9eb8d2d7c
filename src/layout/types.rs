//! Layout output types.

use crate::types::{Direction, Edge, UNDEFINED};

/// Computed geometry of one node, relative to its parent's border box.
///
/// Positions and insets are stored per physical edge (left, top, right,
/// bottom). The engine writes every field during a layout pass; readers
/// use the getters.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub(crate) position: [f32; 4],
    pub(crate) dimensions: [f32; 2],
    pub(crate) margin: [f32; 4],
    pub(crate) border: [f32; 4],
    pub(crate) padding: [f32; 4],
    pub(crate) direction: Direction,
    pub(crate) had_overflow: bool,

    // Pass bookkeeping
    pub(crate) measured_dimensions: [f32; 2],
    pub(crate) computed_flex_basis: f32,
    pub(crate) computed_flex_basis_generation: u32,
    /// Parent inner main size an explicit flex-basis was resolved against.
    pub(crate) computed_flex_basis_main_size: f32,
    pub(crate) generation: u32,
    pub(crate) last_parent_direction: Option<Direction>,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            position: [0.0; 4],
            dimensions: [UNDEFINED; 2],
            margin: [0.0; 4],
            border: [0.0; 4],
            padding: [0.0; 4],
            direction: Direction::Inherit,
            had_overflow: false,
            measured_dimensions: [UNDEFINED; 2],
            computed_flex_basis: UNDEFINED,
            computed_flex_basis_generation: 0,
            computed_flex_basis_main_size: UNDEFINED,
            generation: 0,
            last_parent_direction: None,
        }
    }
}

impl Layout {
    /// Offset of the left margin edge from the parent's left border edge.
    #[inline]
    pub fn left(&self) -> f32 {
        self.position[Edge::Left as usize]
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.position[Edge::Top as usize]
    }

    /// Offset of the right edge from the parent's right border edge. For the
    /// root, its trailing margin less any relative offset.
    #[inline]
    pub fn right(&self) -> f32 {
        self.position[Edge::Right as usize]
    }

    /// Bottom counterpart of [`Layout::right`].
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.position[Edge::Bottom as usize]
    }

    /// Border-box width. Undefined until the node has been laid out.
    #[inline]
    pub fn width(&self) -> f32 {
        self.dimensions[0]
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.dimensions[1]
    }

    /// Direction the node was laid out with (never `Inherit` after layout).
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Children's main-axis sizes exceeded the space available after flexing.
    #[inline]
    pub fn had_overflow(&self) -> bool {
        self.had_overflow
    }

    pub fn margin(&self, edge: Edge) -> f32 {
        self.edge_value(&self.margin, edge)
    }

    pub fn border(&self, edge: Edge) -> f32 {
        self.edge_value(&self.border, edge)
    }

    pub fn padding(&self, edge: Edge) -> f32 {
        self.edge_value(&self.padding, edge)
    }

    /// Start/end map through the resolved direction; shorthand edges have no
    /// single computed value and read as undefined.
    fn edge_value(&self, values: &[f32; 4], edge: Edge) -> f32 {
        match edge.to_physical(self.direction) {
            Some(physical) => values[physical as usize],
            None => {
                log::warn!("computed insets are per edge; {edge} is a shorthand");
                UNDEFINED
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unlaid() {
        let layout = Layout::default();
        assert!(layout.width().is_nan());
        assert!(layout.height().is_nan());
        assert_eq!(layout.left(), 0.0);
        assert!(!layout.had_overflow());
    }

    #[test]
    fn test_logical_edges_follow_direction() {
        let mut layout = Layout::default();
        layout.margin = [1.0, 2.0, 3.0, 4.0];
        layout.direction = Direction::Ltr;
        assert_eq!(layout.margin(Edge::Start), 1.0);
        assert_eq!(layout.margin(Edge::End), 3.0);
        layout.direction = Direction::Rtl;
        assert_eq!(layout.margin(Edge::Start), 3.0);
        assert_eq!(layout.margin(Edge::End), 1.0);
        assert_eq!(layout.margin(Edge::Bottom), 4.0);
        assert!(layout.margin(Edge::All).is_nan());
    }
}
