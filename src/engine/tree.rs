//! Layout Tree - The public node API.
//!
//! Owns every node and the [`Config`] they are laid out under. All
//! mutation goes through here so dirty state stays consistent:
//! - style changes dirty the node and its ancestors (only on real change)
//! - inserting or removing children dirties the parent
//! - `mark_dirty` is for measured leaves whose content changed

use std::any::Any;
use std::sync::Arc;

use super::node::{BaselineInput, MeasureInput, Node, NodeContext, NodeFlags, NodeId};
use super::registry::NodeArena;
use crate::config::Config;
use crate::error::{LayoutError, LayoutResult};
use crate::layout::Layout;
use crate::style::Style;
use crate::types::{NodeType, Size, UNDEFINED};

/// Report a contract violation through the log facade and return it.
#[inline]
fn fail<T>(err: LayoutError) -> LayoutResult<T> {
    log::warn!("{err}");
    Err(err)
}

pub struct LayoutTree {
    pub(crate) nodes: NodeArena,
    pub(crate) config: Config,
    /// Bumped once per `calculate_layout`; marks which nodes this pass visited.
    pub(crate) generation: u32,
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LayoutTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutTree")
            .field("nodes", &self.nodes.len())
            .field("config", &self.config)
            .field("generation", &self.generation)
            .finish()
    }
}

impl LayoutTree {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self { nodes: NodeArena::new(), config, generation: 0 }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Changing the config does not dirty any node.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> LayoutResult<&Node> {
        match self.nodes.get(id) {
            Some(node) => Ok(node),
            None => fail(LayoutError::InvalidNode(id)),
        }
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> LayoutResult<&mut Node> {
        match self.nodes.get_mut(id) {
            Some(node) => Ok(node),
            None => fail(LayoutError::InvalidNode(id)),
        }
    }

    fn default_style(&self) -> Style {
        if self.config.use_web_defaults { Style::web() } else { Style::default() }
    }

    // =========================================================================
    // Node lifecycle
    // =========================================================================

    /// Create a detached node with the config's default style.
    pub fn new_node(&mut self) -> NodeId {
        let style = self.default_style();
        self.nodes.allocate(Node::new(style))
    }

    pub fn new_node_with_style(&mut self, style: Style) -> NodeId {
        self.nodes.allocate(Node::new(style))
    }

    /// Number of live nodes in this tree.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(id)
    }

    /// Free one node. Its children become detached roots.
    pub fn free(&mut self, id: NodeId) -> LayoutResult<()> {
        let parent = self.node(id)?.parent;
        if let Some(parent) = parent {
            self.nodes[parent].children.retain(|&c| c != id);
            self.mark_dirty_internal(parent);
        }
        if let Some(node) = self.nodes.release(id) {
            for child in node.children {
                if let Some(child) = self.nodes.get_mut(child) {
                    child.parent = None;
                }
            }
        }
        Ok(())
    }

    /// Free a node and its whole subtree.
    pub fn free_recursive(&mut self, id: NodeId) -> LayoutResult<()> {
        let mut stack = self.node(id)?.children.clone();
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.release(next) {
                stack.extend(node.children);
            }
        }
        self.nodes[id].children.clear();
        self.free(id)
    }

    /// Return a detached, childless node to its freshly created state.
    pub fn reset(&mut self, id: NodeId) -> LayoutResult<()> {
        let node = self.node(id)?;
        if node.parent.is_some() || !node.children.is_empty() {
            return fail(LayoutError::NodeStillAttached(id));
        }
        let style = self.default_style();
        self.nodes[id] = Node::new(style);
        Ok(())
    }

    /// Copy a node without its parent or children.
    ///
    /// A child belongs to exactly one parent, so the copy starts childless;
    /// use [`LayoutTree::clone_node_recursive`] to duplicate a subtree.
    pub fn clone_node(&mut self, id: NodeId) -> LayoutResult<NodeId> {
        let mut copy = self.node(id)?.clone();
        copy.parent = None;
        copy.children.clear();
        let clone = self.nodes.allocate(copy);
        self.config.notify_cloned(id, clone, None, 0);
        Ok(clone)
    }

    /// Duplicate a whole subtree. The copy of `id` is detached.
    pub fn clone_node_recursive(&mut self, id: NodeId) -> LayoutResult<NodeId> {
        self.node(id)?;
        Ok(self.clone_subtree(id, None, 0))
    }

    fn clone_subtree(&mut self, id: NodeId, parent: Option<NodeId>, index: usize) -> NodeId {
        let mut copy = self.nodes[id].clone();
        let children = std::mem::take(&mut copy.children);
        copy.parent = parent;
        let clone = self.nodes.allocate(copy);
        self.config.notify_cloned(id, clone, parent, index);

        let cloned_children: Vec<NodeId> = children
            .iter()
            .enumerate()
            .map(|(i, &child)| self.clone_subtree(child, Some(clone), i))
            .collect();
        self.nodes[clone].children = cloned_children;
        clone
    }

    // =========================================================================
    // Children
    // =========================================================================

    pub fn insert_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        index: usize,
    ) -> LayoutResult<()> {
        let parent_node = self.node(parent)?;
        if parent_node.measure.is_some() {
            return fail(LayoutError::MeasuredNodeCannotHaveChildren(parent));
        }
        let child_count = parent_node.children.len();
        if index > child_count {
            return fail(LayoutError::ChildIndexOutOfBounds { parent, index, child_count });
        }
        if let Some(existing) = self.node(child)?.parent {
            return fail(LayoutError::ChildAlreadyHasParent { child, parent: existing });
        }
        if self.is_ancestor_or_self(child, parent) {
            return fail(LayoutError::WouldCreateCycle { parent, child });
        }

        self.nodes[parent].children.insert(index, child);
        self.nodes[child].parent = Some(parent);
        self.mark_dirty_internal(parent);
        Ok(())
    }

    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> LayoutResult<()> {
        let index = self.node(parent)?.children.len();
        self.insert_child(parent, child, index)
    }

    /// Attach every node in `children` in order.
    pub fn add_children(&mut self, parent: NodeId, children: &[NodeId]) -> LayoutResult<()> {
        children.iter().try_for_each(|&child| self.add_child(parent, child))
    }

    /// Returns whether `child` was a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> LayoutResult<bool> {
        self.node(child)?;
        let children = &mut self.node_mut(parent)?.children;
        let Some(pos) = children.iter().position(|&c| c == child) else {
            return Ok(false);
        };
        children.remove(pos);

        let node = &mut self.nodes[child];
        node.parent = None;
        node.layout = Layout::default();
        self.mark_dirty_internal(parent);
        Ok(true)
    }

    pub fn remove_all_children(&mut self, parent: NodeId) -> LayoutResult<()> {
        let children = std::mem::take(&mut self.node_mut(parent)?.children);
        if children.is_empty() {
            return Ok(());
        }
        for child in children {
            let node = &mut self.nodes[child];
            node.parent = None;
            node.layout = Layout::default();
        }
        self.mark_dirty_internal(parent);
        Ok(())
    }

    pub fn children(&self, id: NodeId) -> LayoutResult<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    pub fn child_count(&self, id: NodeId) -> LayoutResult<usize> {
        Ok(self.node(id)?.children.len())
    }

    pub fn child_at(&self, id: NodeId, index: usize) -> LayoutResult<Option<NodeId>> {
        Ok(self.node(id)?.children.get(index).copied())
    }

    pub fn parent(&self, id: NodeId) -> LayoutResult<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == candidate {
                return true;
            }
            match self.nodes.get(node).and_then(|n| n.parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    // =========================================================================
    // Dirty state
    // =========================================================================

    /// Mark a measured leaf as needing a new measurement.
    pub fn mark_dirty(&mut self, id: NodeId) -> LayoutResult<()> {
        if self.node(id)?.measure.is_none() {
            return fail(LayoutError::NotMeasured(id));
        }
        self.mark_dirty_internal(id);
        Ok(())
    }

    pub fn is_dirty(&self, id: NodeId) -> LayoutResult<bool> {
        Ok(self.node(id)?.is_dirty())
    }

    /// Dirty `id` and its ancestors, stopping at the first one already dirty.
    pub(crate) fn mark_dirty_internal(&mut self, id: NodeId) {
        let mut next = Some(id);
        while let Some(id) = next {
            let node = &mut self.nodes[id];
            if node.is_dirty() {
                break;
            }
            node.set_dirty(true);
            node.layout.computed_flex_basis = UNDEFINED;
            node.cache.clear();
            next = node.parent;
        }
    }

    // =========================================================================
    // Style
    // =========================================================================

    pub fn style(&self, id: NodeId) -> LayoutResult<&Style> {
        Ok(&self.node(id)?.style)
    }

    pub fn set_style(&mut self, id: NodeId, style: Style) -> LayoutResult<()> {
        let node = self.node_mut(id)?;
        if node.style != style {
            node.style = style;
            self.mark_dirty_internal(id);
        }
        Ok(())
    }

    /// Edit a node's style in place.
    ///
    /// ```
    /// use spark_flex::{LayoutTree, Value};
    ///
    /// let mut tree = LayoutTree::new();
    /// let node = tree.new_node();
    /// tree.update_style(node, |s| s.width = Value::point(10.0)).unwrap();
    /// assert_eq!(tree.style(node).unwrap().width, Value::Point(10.0));
    /// ```
    pub fn update_style(&mut self, id: NodeId, f: impl FnOnce(&mut Style)) -> LayoutResult<()> {
        let mut style = self.node(id)?.style;
        f(&mut style);
        self.set_style(id, style)
    }

    pub fn copy_style(&mut self, dst: NodeId, src: NodeId) -> LayoutResult<()> {
        let style = self.node(src)?.style;
        self.set_style(dst, style)
    }

    // =========================================================================
    // Callbacks and host data
    // =========================================================================

    /// Make `id` a measured leaf. Its type becomes [`NodeType::Text`].
    pub fn set_measure_func<F>(&mut self, id: NodeId, measure: F) -> LayoutResult<()>
    where
        F: Fn(MeasureInput<'_>) -> Size + Send + Sync + 'static,
    {
        let node = self.node_mut(id)?;
        if !node.children.is_empty() {
            return fail(LayoutError::MeasuredNodeCannotHaveChildren(id));
        }
        node.measure = Some(Arc::new(measure));
        node.node_type = NodeType::Text;
        self.mark_dirty_internal(id);
        Ok(())
    }

    pub fn clear_measure_func(&mut self, id: NodeId) -> LayoutResult<()> {
        let node = self.node_mut(id)?;
        if node.measure.take().is_some() {
            node.node_type = NodeType::Default;
            self.mark_dirty_internal(id);
        }
        Ok(())
    }

    pub fn has_measure_func(&self, id: NodeId) -> LayoutResult<bool> {
        Ok(self.node(id)?.measure.is_some())
    }

    pub fn set_baseline_func<F>(&mut self, id: NodeId, baseline: F) -> LayoutResult<()>
    where
        F: Fn(BaselineInput<'_>) -> f32 + Send + Sync + 'static,
    {
        self.node_mut(id)?.baseline = Some(Arc::new(baseline));
        self.mark_dirty_internal(id);
        Ok(())
    }

    pub fn clear_baseline_func(&mut self, id: NodeId) -> LayoutResult<()> {
        if self.node_mut(id)?.baseline.take().is_some() {
            self.mark_dirty_internal(id);
        }
        Ok(())
    }

    pub fn has_baseline_func(&self, id: NodeId) -> LayoutResult<bool> {
        Ok(self.node(id)?.baseline.is_some())
    }

    /// Attach host data, handed back to the node's callbacks.
    pub fn set_context<T: Any + Send + Sync>(
        &mut self,
        id: NodeId,
        context: T,
    ) -> LayoutResult<()> {
        self.node_mut(id)?.context = Some(Arc::new(context));
        Ok(())
    }

    pub fn clear_context(&mut self, id: NodeId) -> LayoutResult<()> {
        self.node_mut(id)?.context = None;
        Ok(())
    }

    pub fn context(&self, id: NodeId) -> LayoutResult<Option<&NodeContext>> {
        Ok(self.node(id)?.context_ref())
    }

    /// Host data downcast to `T`, or `None` if absent or of another type.
    pub fn context_as<T: Any>(&self, id: NodeId) -> LayoutResult<Option<&T>> {
        Ok(self.node(id)?.context_ref().and_then(|ctx| ctx.downcast_ref::<T>()))
    }

    pub fn node_type(&self, id: NodeId) -> LayoutResult<NodeType> {
        Ok(self.node(id)?.node_type)
    }

    pub fn set_node_type(&mut self, id: NodeId, node_type: NodeType) -> LayoutResult<()> {
        self.node_mut(id)?.node_type = node_type;
        Ok(())
    }

    /// Use this child's baseline as its parent's baseline.
    pub fn set_is_reference_baseline(&mut self, id: NodeId, value: bool) -> LayoutResult<()> {
        let node = self.node_mut(id)?;
        if node.is_reference_baseline() != value {
            node.flags.set(NodeFlags::REFERENCE_BASELINE, value);
            self.mark_dirty_internal(id);
        }
        Ok(())
    }

    pub fn is_reference_baseline(&self, id: NodeId) -> LayoutResult<bool> {
        Ok(self.node(id)?.is_reference_baseline())
    }

    // =========================================================================
    // Results
    // =========================================================================

    pub fn layout(&self, id: NodeId) -> LayoutResult<&Layout> {
        Ok(&self.node(id)?.layout)
    }

    /// Set by a layout pass that wrote this node; the host clears it once consumed.
    pub fn has_new_layout(&self, id: NodeId) -> LayoutResult<bool> {
        Ok(self.node(id)?.has_new_layout())
    }

    pub fn set_has_new_layout(&mut self, id: NodeId, value: bool) -> LayoutResult<()> {
        self.node_mut(id)?.set_has_new_layout(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FlexDirection, Value};

    fn tree_with_children(n: usize) -> (LayoutTree, NodeId, Vec<NodeId>) {
        let mut tree = LayoutTree::new();
        let root = tree.new_node();
        let children: Vec<NodeId> = (0..n).map(|_| tree.new_node()).collect();
        tree.add_children(root, &children).unwrap();
        (tree, root, children)
    }

    #[test]
    fn test_insert_and_order() {
        let (mut tree, root, children) = tree_with_children(2);
        let c = tree.new_node();
        tree.insert_child(root, c, 1).unwrap();
        assert_eq!(tree.children(root).unwrap(), &[children[0], c, children[1]]);
        assert_eq!(tree.parent(c).unwrap(), Some(root));
        assert_eq!(tree.child_at(root, 2).unwrap(), Some(children[1]));
        assert_eq!(tree.child_at(root, 3).unwrap(), None);
    }

    #[test]
    fn test_insert_errors() {
        let (mut tree, root, children) = tree_with_children(1);
        let other = tree.new_node();

        assert_eq!(
            tree.insert_child(other, children[0], 0),
            Err(LayoutError::ChildAlreadyHasParent { child: children[0], parent: root })
        );
        assert_eq!(
            tree.insert_child(root, other, 5),
            Err(LayoutError::ChildIndexOutOfBounds { parent: root, index: 5, child_count: 1 })
        );
        assert_eq!(
            tree.add_child(children[0], root),
            Err(LayoutError::WouldCreateCycle { parent: children[0], child: root })
        );
        assert_eq!(
            tree.add_child(root, root),
            Err(LayoutError::WouldCreateCycle { parent: root, child: root })
        );
    }

    #[test]
    fn test_measured_node_cannot_have_children() {
        let (mut tree, root, _) = tree_with_children(1);
        assert_eq!(
            tree.set_measure_func(root, |_| Size::ZERO),
            Err(LayoutError::MeasuredNodeCannotHaveChildren(root))
        );

        let leaf = tree.new_node();
        tree.set_measure_func(leaf, |_| Size::ZERO).unwrap();
        assert_eq!(tree.node_type(leaf).unwrap(), NodeType::Text);
        let child = tree.new_node();
        assert_eq!(
            tree.add_child(leaf, child),
            Err(LayoutError::MeasuredNodeCannotHaveChildren(leaf))
        );

        tree.clear_measure_func(leaf).unwrap();
        assert_eq!(tree.node_type(leaf).unwrap(), NodeType::Default);
        tree.add_child(leaf, child).unwrap();
    }

    #[test]
    fn test_remove_child() {
        let (mut tree, root, children) = tree_with_children(2);
        assert!(tree.remove_child(root, children[0]).unwrap());
        assert!(!tree.remove_child(root, children[0]).unwrap());
        assert_eq!(tree.parent(children[0]).unwrap(), None);
        assert_eq!(tree.child_count(root).unwrap(), 1);

        tree.remove_all_children(root).unwrap();
        assert_eq!(tree.child_count(root).unwrap(), 0);
        assert_eq!(tree.parent(children[1]).unwrap(), None);
    }

    #[test]
    fn test_free_and_stale_handles() {
        let (mut tree, root, children) = tree_with_children(2);
        assert_eq!(tree.node_count(), 3);
        tree.free(children[0]).unwrap();
        assert_eq!(tree.node_count(), 2);
        assert_eq!(tree.children(root).unwrap(), &[children[1]]);
        assert_eq!(tree.style(children[0]).err(), Some(LayoutError::InvalidNode(children[0])));
        assert_eq!(tree.free(children[0]), Err(LayoutError::InvalidNode(children[0])));
    }

    #[test]
    fn test_free_recursive() {
        let (mut tree, root, children) = tree_with_children(2);
        let grandchild = tree.new_node();
        tree.add_child(children[0], grandchild).unwrap();
        let keep = tree.new_node();

        tree.free_recursive(root).unwrap();
        assert_eq!(tree.node_count(), 1);
        assert!(tree.contains(keep));
        assert!(!tree.contains(grandchild));
    }

    #[test]
    fn test_reset_requires_detached() {
        let (mut tree, root, children) = tree_with_children(1);
        assert_eq!(tree.reset(root), Err(LayoutError::NodeStillAttached(root)));
        assert_eq!(tree.reset(children[0]), Err(LayoutError::NodeStillAttached(children[0])));

        let lone = tree.new_node();
        tree.update_style(lone, |s| s.width = Value::point(5.0)).unwrap();
        tree.set_context(lone, 7u32).unwrap();
        tree.reset(lone).unwrap();
        assert_eq!(tree.style(lone).unwrap(), &Style::default());
        assert!(tree.context(lone).unwrap().is_none());
    }

    #[test]
    fn test_dirty_propagation_stops_at_dirty_ancestor() {
        let (mut tree, root, children) = tree_with_children(1);
        let leaf = tree.new_node();
        tree.add_child(children[0], leaf).unwrap();
        tree.set_measure_func(leaf, |_| Size::new(1.0, 1.0)).unwrap();
        assert!(tree.is_dirty(root).unwrap());

        for id in [root, children[0], leaf] {
            tree.nodes[id].set_dirty(false);
        }
        tree.mark_dirty(leaf).unwrap();
        assert!(tree.is_dirty(leaf).unwrap());
        assert!(tree.is_dirty(children[0]).unwrap());
        assert!(tree.is_dirty(root).unwrap());

        assert_eq!(tree.mark_dirty(root), Err(LayoutError::NotMeasured(root)));
    }

    #[test]
    fn test_style_change_dirties_only_on_change() {
        let (mut tree, root, children) = tree_with_children(1);
        for id in [root, children[0]] {
            tree.nodes[id].set_dirty(false);
        }

        tree.set_style(children[0], Style::default()).unwrap();
        assert!(!tree.is_dirty(children[0]).unwrap());

        tree.update_style(children[0], |s| s.flex_direction = FlexDirection::Row).unwrap();
        assert!(tree.is_dirty(children[0]).unwrap());
        assert!(tree.is_dirty(root).unwrap());
    }

    #[test]
    fn test_web_defaults_for_new_nodes() {
        let mut tree = LayoutTree::with_config(Config::web());
        let node = tree.new_node();
        assert_eq!(tree.style(node).unwrap(), &Style::web());
    }

    #[test]
    fn test_context_downcast() {
        let mut tree = LayoutTree::new();
        let node = tree.new_node();
        tree.set_context(node, String::from("label")).unwrap();
        assert_eq!(tree.context_as::<String>(node).unwrap().map(String::as_str), Some("label"));
        assert_eq!(tree.context_as::<u32>(node).unwrap(), None);
    }

    #[test]
    fn test_clone_observer() {
        use std::sync::Mutex;

        let seen: Arc<Mutex<Vec<(NodeId, NodeId, Option<NodeId>, usize)>>> = Arc::default();
        let (mut tree, root, children) = tree_with_children(2);
        let sink = Arc::clone(&seen);
        tree.config_mut().set_node_cloned_observer(move |original, clone, parent, index| {
            sink.lock().unwrap().push((original, clone, parent, index));
        });

        let copy = tree.clone_node_recursive(root).unwrap();
        let copied_children = tree.children(copy).unwrap().to_vec();
        assert_eq!(copied_children.len(), 2);
        assert_eq!(tree.parent(copy).unwrap(), None);
        assert_eq!(tree.parent(copied_children[1]).unwrap(), Some(copy));

        let shallow = tree.clone_node(children[0]).unwrap();
        assert_eq!(tree.parent(shallow).unwrap(), None);
        assert_eq!(tree.child_count(shallow).unwrap(), 0);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0], (root, copy, None, 0));
        assert_eq!(seen[2], (children[1], copied_children[1], Some(copy), 1));
        assert_eq!(seen[3], (children[0], shallow, None, 0));
    }
}
