//! Node - One box in the layout tree.
//!
//! A node bundles what the host authored (style, callbacks, context) with
//! what the engine computes and remembers (layout, cache, flags).

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use super::cache::MeasureCache;
use crate::layout::Layout;
use crate::style::Style;
use crate::types::{MeasureMode, NodeType, Size};

/// Opaque handle to a node in a [`LayoutTree`](super::LayoutTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Slot index inside the tree. Stable for the node's lifetime.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct NodeFlags: u8 {
        const DIRTY = 1 << 0;
        const HAS_NEW_LAYOUT = 1 << 1;
        const REFERENCE_BASELINE = 1 << 2;
    }
}

// =============================================================================
// Callbacks
// =============================================================================

/// Host data attached to a node and handed back to its callbacks.
pub type NodeContext = dyn Any + Send + Sync;

/// Arguments of a measure call.
#[derive(Clone, Copy)]
pub struct MeasureInput<'a> {
    pub node: NodeId,
    pub context: Option<&'a NodeContext>,
    pub width: f32,
    pub width_mode: MeasureMode,
    pub height: f32,
    pub height_mode: MeasureMode,
}

/// Arguments of a baseline call.
#[derive(Clone, Copy)]
pub struct BaselineInput<'a> {
    pub node: NodeId,
    pub context: Option<&'a NodeContext>,
    pub width: f32,
    pub height: f32,
}

/// Leaf measurement. Must not depend on tree state.
pub type MeasureFunc = Arc<dyn Fn(MeasureInput<'_>) -> Size + Send + Sync>;

/// Distance from the node's top to its baseline.
pub type BaselineFunc = Arc<dyn Fn(BaselineInput<'_>) -> f32 + Send + Sync>;

// =============================================================================
// Node
// =============================================================================

#[derive(Clone)]
pub struct Node {
    pub(crate) style: Style,
    pub(crate) layout: Layout,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) measure: Option<MeasureFunc>,
    pub(crate) baseline: Option<BaselineFunc>,
    pub(crate) context: Option<Arc<NodeContext>>,
    pub(crate) node_type: NodeType,
    pub(crate) flags: NodeFlags,
    /// Line this child was placed on during the parent's last pass.
    pub(crate) line_index: usize,
    pub(crate) cache: MeasureCache,
}

impl Node {
    pub(crate) fn new(style: Style) -> Self {
        Self {
            style,
            layout: Layout::default(),
            parent: None,
            children: Vec::new(),
            measure: None,
            baseline: None,
            context: None,
            node_type: NodeType::Default,
            flags: NodeFlags::empty(),
            line_index: 0,
            cache: MeasureCache::default(),
        }
    }

    #[inline]
    pub(crate) fn is_dirty(&self) -> bool {
        self.flags.contains(NodeFlags::DIRTY)
    }

    #[inline]
    pub(crate) fn set_dirty(&mut self, dirty: bool) {
        self.flags.set(NodeFlags::DIRTY, dirty);
    }

    #[inline]
    pub(crate) fn has_new_layout(&self) -> bool {
        self.flags.contains(NodeFlags::HAS_NEW_LAYOUT)
    }

    #[inline]
    pub(crate) fn set_has_new_layout(&mut self, value: bool) {
        self.flags.set(NodeFlags::HAS_NEW_LAYOUT, value);
    }

    #[inline]
    pub(crate) fn is_reference_baseline(&self) -> bool {
        self.flags.contains(NodeFlags::REFERENCE_BASELINE)
    }

    pub(crate) fn context_ref(&self) -> Option<&NodeContext> {
        self.context.as_deref()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("style", &self.style)
            .field("layout", &self.layout)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("has_measure", &self.measure.is_some())
            .field("has_baseline", &self.baseline.is_some())
            .field("node_type", &self.node_type)
            .field("flags", &self.flags)
            .finish()
    }
}
