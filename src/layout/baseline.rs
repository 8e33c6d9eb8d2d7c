//! Baseline computation for `align-items: baseline`.

use crate::engine::{BaselineInput, NodeArena, NodeId};
use crate::style::align_item;
use crate::types::{Align, Display, Edge, PositionType};

/// Distance from the top of `id`'s border box to its baseline.
///
/// A node with a baseline function answers directly. A container uses the
/// baseline of one child on its first line: the reference baseline child if
/// any, else the first baseline-aligned child, else the first child, offset
/// by that child's top. A childless node's baseline is its bottom edge.
pub(crate) fn calculate_baseline(nodes: &NodeArena, id: NodeId) -> f32 {
    let node = &nodes[id];
    let [width, height] = node.layout.measured_dimensions;

    if let Some(baseline) = &node.baseline {
        let input = BaselineInput { node: id, context: node.context_ref(), width, height };
        let value = baseline(input);
        log::trace!("baseline of {id}: {value}");
        return value;
    }

    let first_line = node
        .children
        .iter()
        .copied()
        .take_while(|&child| nodes[child].line_index == 0)
        .filter(|&child| {
            let cs = &nodes[child].style;
            cs.position_type != PositionType::Absolute && cs.display != Display::None
        });

    let mut reference = None;
    let mut aligned = None;
    let mut first = None;
    for child in first_line {
        if nodes[child].is_reference_baseline() {
            reference = Some(child);
            break;
        }
        if aligned.is_none() && align_item(&node.style, &nodes[child].style) == Align::Baseline {
            aligned = Some(child);
        }
        first.get_or_insert(child);
    }

    match reference.or(aligned).or(first) {
        Some(child) => {
            calculate_baseline(nodes, child) + nodes[child].layout.position[Edge::Top as usize]
        }
        None => height,
    }
}

/// Whether `id` lays out its children along a shared baseline.
pub(crate) fn is_baseline_layout(nodes: &NodeArena, id: NodeId) -> bool {
    let node = &nodes[id];
    if node.style.flex_direction.is_column() {
        return false;
    }
    if node.style.align_items == Align::Baseline {
        return true;
    }
    node.children.iter().any(|&child| {
        let cs = &nodes[child].style;
        cs.position_type == PositionType::Relative
            && cs.display != Display::None
            && cs.align_self == Align::Baseline
    })
}
