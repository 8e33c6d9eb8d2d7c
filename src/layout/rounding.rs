//! Pixel-grid rounding of a finished layout.
//!
//! Edges are rounded in absolute coordinates and sizes are taken as the
//! difference of rounded edges, so siblings that touch before rounding
//! still touch after it.

use crate::engine::{NodeArena, NodeId};
use crate::types::{floats_equal, Edge, NodeType};

/// Snap `value` to the grid defined by `point_scale_factor` (pixels per point).
///
/// A scale that is zero, negative or not finite leaves `value` untouched.
pub fn round_value_to_pixel_grid(
    value: f32,
    point_scale_factor: f32,
    force_ceil: bool,
    force_floor: bool,
) -> f32 {
    if !point_scale_factor.is_finite() || point_scale_factor <= 0.0 {
        return value;
    }
    let scale = point_scale_factor as f64;
    let mut scaled = value as f64 * scale;
    // floor(scaled) == scaled - fraction
    let mut fraction = scaled % 1.0;
    if fraction < 0.0 {
        fraction += 1.0;
    }
    let fraction32 = fraction as f32;
    if floats_equal(fraction32, 0.0) {
        scaled -= fraction;
    } else if floats_equal(fraction32, 1.0) || force_ceil {
        scaled = scaled - fraction + 1.0;
    } else if force_floor {
        scaled -= fraction;
    } else {
        scaled = scaled - fraction + if fraction >= 0.5 { 1.0 } else { 0.0 };
    }
    (scaled / scale) as f32
}

/// Absolute origin of a node, before and after rounding.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Origin {
    pub left: f32,
    pub top: f32,
    pub rounded_left: f32,
    pub rounded_top: f32,
}

pub(crate) fn round_to_pixel_grid(nodes: &mut NodeArena, id: NodeId, scale: f32, parent: Origin) {
    if !scale.is_finite() || scale <= 0.0 {
        return;
    }

    let node = &mut nodes[id];
    let text = node.node_type == NodeType::Text;
    let layout = &mut node.layout;

    let left = layout.position[Edge::Left as usize];
    let top = layout.position[Edge::Top as usize];
    let width = layout.dimensions[0];
    let height = layout.dimensions[1];

    let abs_left = parent.left + left;
    let abs_top = parent.top + top;
    let abs_right = abs_left + width;
    let abs_bottom = abs_top + height;

    let rounded_left = round_value_to_pixel_grid(abs_left, scale, false, text);
    let rounded_top = round_value_to_pixel_grid(abs_top, scale, false, text);

    // Text never shrinks below its measured extent.
    let fractional = |size: f32| {
        let rem = (size * scale) % 1.0;
        !floats_equal(rem, 0.0) && !floats_equal(rem, 1.0)
    };
    let frac_w = fractional(width);
    let frac_h = fractional(height);
    let rounded_right =
        round_value_to_pixel_grid(abs_right, scale, text && frac_w, text && !frac_w);
    let rounded_bottom =
        round_value_to_pixel_grid(abs_bottom, scale, text && frac_h, text && !frac_h);

    layout.position[Edge::Left as usize] = rounded_left - parent.rounded_left;
    layout.position[Edge::Top as usize] = rounded_top - parent.rounded_top;
    layout.dimensions[0] = rounded_right - rounded_left;
    layout.dimensions[1] = rounded_bottom - rounded_top;

    let origin = Origin { left: abs_left, top: abs_top, rounded_left, rounded_top };
    let [width, height] = layout.dimensions;
    for i in 0..nodes[id].children.len() {
        let child = nodes[id].children[i];
        round_to_pixel_grid(nodes, child, scale, origin);

        // Trailing offsets follow the rounded edges.
        let [child_width, child_height] = nodes[child].layout.dimensions;
        let position = &mut nodes[child].layout.position;
        position[Edge::Right as usize] = width - child_width - position[Edge::Left as usize];
        position[Edge::Bottom as usize] = height - child_height - position[Edge::Top as usize];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_nearest() {
        assert_eq!(round_value_to_pixel_grid(10.4, 1.0, false, false), 10.0);
        assert_eq!(round_value_to_pixel_grid(10.5, 1.0, false, false), 11.0);
        assert_eq!(round_value_to_pixel_grid(-10.6, 1.0, false, false), -11.0);
    }

    #[test]
    fn test_round_forced() {
        assert_eq!(round_value_to_pixel_grid(10.2, 1.0, true, false), 11.0);
        assert_eq!(round_value_to_pixel_grid(10.8, 1.0, false, true), 10.0);
        // On-grid values are never pushed by force
        assert_eq!(round_value_to_pixel_grid(10.0, 1.0, true, false), 10.0);
    }

    #[test]
    fn test_round_scaled() {
        assert_eq!(round_value_to_pixel_grid(10.3, 2.0, false, false), 10.5);
        assert_eq!(round_value_to_pixel_grid(10.2, 2.0, false, false), 10.0);
    }

    #[test]
    fn test_undefined_stays_undefined() {
        assert!(round_value_to_pixel_grid(f32::NAN, 1.0, false, false).is_nan());
    }

    #[test]
    fn test_invalid_scale_is_a_no_op() {
        assert_eq!(round_value_to_pixel_grid(10.3, 0.0, false, false), 10.3);
        assert_eq!(round_value_to_pixel_grid(10.3, -2.0, false, false), 10.3);
        assert_eq!(round_value_to_pixel_grid(10.3, f32::NAN, true, false), 10.3);
    }
}
