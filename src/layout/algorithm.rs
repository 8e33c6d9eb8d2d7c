//! Flexbox layout algorithm.
//!
//! # Passes
//!
//! Every node is laid out through [`LayoutPass::layout_node`], which either
//! answers from the node's cache or runs the full algorithm:
//!
//! 1. **Leaves**: measured leaves call their measure function, empty
//!    containers size to padding + border, fixed-size nodes skip children
//! 2. **Flex basis**: hypothetical main size of every in-flow child
//! 3. **Lines**: children collected into lines (one line unless wrapping)
//! 4. **Flexible lengths**: free space distributed by grow/shrink, with
//!    min/max clamping and redistribution
//! 5. **Main axis**: justification and auto margins
//! 6. **Cross axis**: stretch or align each child within its line
//! 7. **Lines**: align-content and baseline alignment across lines
//! 8. **Final size**, wrap-reverse mirroring, absolute children, trailing edges
//!
//! A pass with `perform_layout == false` only produces the node's measured
//! size; children are positioned only when the parent performs layout.
//!
//! Undefined sizes are NaN throughout (see [`crate::types::UNDEFINED`]).

use crate::config::{Config, ExperimentalFeatures};
use crate::engine::{Constraints, LayoutTree, MeasureInput, NodeArena, NodeId};
use crate::error::LayoutResult;
use crate::style::{align_item, Style};
use crate::types::{
    floats_equal, Align, Dimension, Direction, Display, Edge, FlexDirection, FloatExt, Justify,
    MeasureMode, Overflow, PositionType, Size, Value, Wrap, UNDEFINED,
};

use super::baseline::{calculate_baseline, is_baseline_layout};
use super::rounding::{round_to_pixel_grid, Origin};
use super::Layout;

// =============================================================================
// ENTRY POINT
// =============================================================================

impl LayoutTree {
    /// Lay out `root` and its subtree.
    ///
    /// `None` for an available size means unbounded along that axis; the
    /// root then sizes to its content. Results are read with
    /// [`LayoutTree::layout`].
    ///
    /// ```
    /// use spark_flex::{Direction, FlexDirection, LayoutTree, Style, Value};
    ///
    /// let mut tree = LayoutTree::new();
    /// let root = tree.new_node_with_style(Style {
    ///     flex_direction: FlexDirection::Row,
    ///     width: Value::point(300.0),
    ///     ..Style::default()
    /// });
    /// let grow = Style { flex_grow: Some(1.0), flex_basis: Value::ZERO, ..Style::default() };
    /// let a = tree.new_node_with_style(grow);
    /// let b = tree.new_node_with_style(grow);
    /// tree.add_children(root, &[a, b]).unwrap();
    ///
    /// tree.calculate_layout(root, None, None, Direction::Ltr).unwrap();
    /// assert_eq!(tree.layout(a).unwrap().width(), 150.0);
    /// assert_eq!(tree.layout(b).unwrap().left(), 150.0);
    /// ```
    pub fn calculate_layout(
        &mut self,
        root: NodeId,
        available_width: Option<f32>,
        available_height: Option<f32>,
        direction: Direction,
    ) -> LayoutResult<()> {
        self.node(root)?;
        self.generation = self.generation.wrapping_add(1).max(1);

        let parent_width = available_width.unwrap_or(UNDEFINED);
        let parent_height = available_height.unwrap_or(UNDEFINED);
        log::debug!(
            "layout {root} in {parent_width}x{parent_height} ({direction}), generation {}",
            self.generation
        );

        let mut pass = LayoutPass {
            nodes: &mut self.nodes,
            config: &self.config,
            generation: self.generation,
        };
        pass.layout_root(root, parent_width, parent_height, direction);

        let layout = &self.nodes[root].layout;
        log::debug!("layout {root} done: {}x{}", layout.width(), layout.height());
        Ok(())
    }
}

/// State shared by every node visited during one `calculate_layout` call.
pub(super) struct LayoutPass<'a> {
    pub(super) nodes: &'a mut NodeArena,
    pub(super) config: &'a Config,
    pub(super) generation: u32,
}

/// Values fixed for one container while its children are laid out.
pub(super) struct Container {
    pub id: NodeId,
    pub style: Style,
    pub direction: Direction,
    pub main_axis: FlexDirection,
    pub cross_axis: FlexDirection,
    pub is_main_row: bool,
    pub wrap: bool,
    pub perform_layout: bool,
    pub parent_width: f32,
    pub main_parent_size: f32,
    pub cross_parent_size: f32,
    pub leading_pb_main: f32,
    pub trailing_pb_main: f32,
    pub leading_pb_cross: f32,
    pub pb_main: f32,
    pub pb_cross: f32,
    pub width_mode: MeasureMode,
    pub height_mode: MeasureMode,
    pub main_mode: MeasureMode,
    pub cross_mode: MeasureMode,
    pub inner_width: f32,
    pub inner_height: f32,
    pub inner_main: f32,
    pub inner_cross: f32,
    pub min_inner_main: f32,
    pub max_inner_main: f32,
    /// The container's own grow factor.
    pub grow: f32,
    pub flex_basis_overflows: bool,
}

/// In-flow children placed on one line.
struct FlexLine {
    items: Vec<NodeId>,
    /// Index one past the last child (of any kind) on this line.
    end: usize,
    size_consumed: f32,
    total_grow: f32,
    total_shrink_scaled: f32,
}

#[inline]
fn dim_index(axis: FlexDirection) -> usize {
    axis.dimension() as usize
}

#[inline]
pub(super) fn mode_for(size: f32) -> MeasureMode {
    if size.is_undefined() { MeasureMode::Undefined } else { MeasureMode::Exactly }
}

/// Available inner size clamped by the node's own min/max.
fn available_inner_dim(
    style: &Style,
    dim: Dimension,
    available: f32,
    pb: f32,
    parent_size: f32,
) -> f32 {
    if available.is_undefined() {
        return available;
    }
    let min = style.min_dimension(dim).resolve(parent_size);
    let max = style.max_dimension(dim).resolve(parent_size);
    let min_inner = if min.is_undefined() { 0.0 } else { min - pb };
    let max_inner = if max.is_undefined() { f32::MAX } else { max - pb };
    available.min(max_inner).max(min_inner)
}

impl LayoutPass<'_> {
    // =========================================================================
    // Node helpers
    // =========================================================================

    #[inline]
    pub(super) fn measured(&self, id: NodeId, axis: FlexDirection) -> f32 {
        self.nodes[id].layout.measured_dimensions[dim_index(axis)]
    }

    #[inline]
    pub(super) fn dim_with_margin(
        &self,
        id: NodeId,
        axis: FlexDirection,
        width_size: f32,
        dir: Direction,
    ) -> f32 {
        self.measured(id, axis) + self.nodes[id].style.margin_for_axis(axis, width_size, dir)
    }

    #[inline]
    fn is_layout_dim_defined(&self, id: NodeId, axis: FlexDirection) -> bool {
        let value = self.measured(id, axis);
        value.is_defined() && value >= 0.0
    }

    #[inline]
    pub(super) fn position_mut(&mut self, id: NodeId) -> &mut [f32; 4] {
        &mut self.nodes[id].layout.position
    }

    // =========================================================================
    // Root
    // =========================================================================

    fn layout_root(
        &mut self,
        root: NodeId,
        parent_width: f32,
        parent_height: f32,
        direction: Direction,
    ) {
        let style = &self.nodes[root].style;

        let (width, width_mode) = if style.is_dimension_defined(FlexDirection::Row, parent_width) {
            let width = style.resolved_dimension(Dimension::Width).resolve(parent_width)
                + style.margin_for_axis(FlexDirection::Row, parent_width, direction);
            (width, MeasureMode::Exactly)
        } else {
            let max = style.max_width.resolve(parent_width);
            if max >= 0.0 {
                (max, MeasureMode::AtMost)
            } else {
                (parent_width, mode_for(parent_width))
            }
        };

        let column_defined = style.is_dimension_defined(FlexDirection::Column, parent_height);
        let (height, height_mode) = if column_defined {
            let height = style.resolved_dimension(Dimension::Height).resolve(parent_height)
                + style.margin_for_axis(FlexDirection::Column, parent_width, direction);
            (height, MeasureMode::Exactly)
        } else {
            let max = style.max_height.resolve(parent_height);
            if max >= 0.0 {
                (max, MeasureMode::AtMost)
            } else {
                (parent_height, mode_for(parent_height))
            }
        };

        let changed = self.layout_node(
            root,
            width,
            height,
            direction,
            width_mode,
            height_mode,
            parent_width,
            parent_height,
            true,
            "initial",
        );
        if !changed {
            log::trace!("root {root} answered from cache");
        }

        // The root is placed in physical coordinates regardless of direction.
        self.set_position(
            root,
            FlexDirection::Row,
            FlexDirection::Column,
            parent_width,
            parent_height,
            parent_width,
            Direction::Ltr,
        );
        // A cache hit restores unrounded root dimensions, so round every time.
        round_to_pixel_grid(self.nodes, root, self.config.point_scale_factor, Origin::default());
    }

    /// Initial position of a node: margins plus its relative offset.
    #[allow(clippy::too_many_arguments)]
    pub(super) fn set_position(
        &mut self,
        id: NodeId,
        main_axis: FlexDirection,
        cross_axis: FlexDirection,
        main_size: f32,
        cross_size: f32,
        parent_width: f32,
        dir: Direction,
    ) {
        let style = &self.nodes[id].style;
        let rel_main = style.relative_position(main_axis, main_size, dir);
        let rel_cross = style.relative_position(cross_axis, cross_size, dir);
        let lead_main = style.leading_margin(main_axis, parent_width, dir) + rel_main;
        let trail_main = style.trailing_margin(main_axis, parent_width, dir) - rel_main;
        let lead_cross = style.leading_margin(cross_axis, parent_width, dir) + rel_cross;
        let trail_cross = style.trailing_margin(cross_axis, parent_width, dir) - rel_cross;

        let position = self.position_mut(id);
        position[main_axis.leading_edge() as usize] = lead_main;
        position[main_axis.trailing_edge() as usize] = trail_main;
        position[cross_axis.leading_edge() as usize] = lead_cross;
        position[cross_axis.trailing_edge() as usize] = trail_cross;
    }

    // =========================================================================
    // Per-node entry with caching
    // =========================================================================

    /// Lay out or measure one node. Returns whether the node was computed
    /// (as opposed to answered from its cache).
    #[allow(clippy::too_many_arguments)]
    pub(super) fn layout_node(
        &mut self,
        id: NodeId,
        available_width: f32,
        available_height: f32,
        parent_direction: Direction,
        width_mode: MeasureMode,
        height_mode: MeasureMode,
        parent_width: f32,
        parent_height: f32,
        perform_layout: bool,
        reason: &str,
    ) -> bool {
        let generation = self.generation;
        let scale = self.config.point_scale_factor;
        let request = Constraints {
            width: available_width,
            width_mode,
            height: available_height,
            height_mode,
        };

        let node = &mut self.nodes[id];
        let need_to_visit = (node.is_dirty() && node.layout.generation != generation)
            || node.layout.last_parent_direction != Some(parent_direction);
        if need_to_visit {
            node.cache.clear();
        }

        let cached = if need_to_visit {
            None
        } else if node.measure.is_some() {
            let style = &node.style;
            let margin_row =
                style.margin_for_axis(FlexDirection::Row, parent_width, parent_direction);
            let margin_column =
                style.margin_for_axis(FlexDirection::Column, parent_width, parent_direction);
            node.cache.find_measured(&request, margin_row, margin_column, scale)
        } else {
            node.cache.find_exact(&request, perform_layout)
        };

        if let Some(size) = cached {
            node.layout.measured_dimensions = [size.width, size.height];
            log::trace!("{reason} cache hit for {id}: {}x{}", size.width, size.height);
        } else {
            log::trace!(
                "{reason} pass for {id}: {available_width} ({width_mode}) x \
                 {available_height} ({height_mode})"
            );
            self.layout_impl(
                id,
                available_width,
                available_height,
                parent_direction,
                width_mode,
                height_mode,
                parent_width,
                parent_height,
                perform_layout,
            );
            let node = &mut self.nodes[id];
            node.layout.last_parent_direction = Some(parent_direction);
            let [width, height] = node.layout.measured_dimensions;
            node.cache.store(perform_layout, request, Size::new(width, height));
        }

        let node = &mut self.nodes[id];
        if perform_layout {
            node.layout.dimensions = node.layout.measured_dimensions;
            node.set_has_new_layout(true);
            node.set_dirty(false);
        }
        node.layout.generation = generation;
        cached.is_none()
    }

    #[allow(clippy::too_many_arguments)]
    fn layout_impl(
        &mut self,
        id: NodeId,
        available_width: f32,
        available_height: f32,
        parent_direction: Direction,
        width_mode: MeasureMode,
        height_mode: MeasureMode,
        parent_width: f32,
        parent_height: f32,
        perform_layout: bool,
    ) {
        let direction = self.nodes[id].style.direction.resolve(parent_direction);
        self.set_edge_insets(id, direction, parent_width);

        let node = &self.nodes[id];
        if node.measure.is_some() {
            self.measure_leaf(
                id,
                available_width,
                available_height,
                width_mode,
                height_mode,
                parent_width,
                parent_height,
            );
            return;
        }
        if node.children.is_empty() {
            self.measure_empty_container(
                id,
                available_width,
                available_height,
                width_mode,
                height_mode,
                parent_width,
                parent_height,
            );
            return;
        }
        if !perform_layout
            && self.measure_fixed_size(
                id,
                available_width,
                available_height,
                width_mode,
                height_mode,
                parent_width,
                parent_height,
            )
        {
            return;
        }

        self.nodes[id].layout.had_overflow = false;
        self.layout_flex_container(
            id,
            available_width,
            available_height,
            direction,
            width_mode,
            height_mode,
            parent_width,
            parent_height,
            perform_layout,
        );
    }

    /// Record direction and computed margin/border/padding per physical edge.
    fn set_edge_insets(&mut self, id: NodeId, direction: Direction, parent_width: f32) {
        let node = &mut self.nodes[id];
        let (style, layout) = (&node.style, &mut node.layout);
        layout.direction = direction;
        for edge in Edge::PHYSICAL {
            let i = edge as usize;
            layout.margin[i] = style.margin.resolve(edge, direction).resolve_margin(parent_width);
            layout.border[i] = style.border_at(edge, direction);
            layout.padding[i] = style.padding_at(edge, parent_width, direction);
        }
    }

    // =========================================================================
    // Leaves
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    fn measure_leaf(
        &mut self,
        id: NodeId,
        available_width: f32,
        available_height: f32,
        width_mode: MeasureMode,
        height_mode: MeasureMode,
        parent_width: f32,
        parent_height: f32,
    ) {
        let node = &self.nodes[id];
        let style = &node.style;
        let dir = node.layout.direction;
        let pb_row = style.padding_and_border_for_axis(FlexDirection::Row, parent_width, dir);
        let pb_column = style.padding_and_border_for_axis(FlexDirection::Column, parent_width, dir);
        let margin_row = style.margin_for_axis(FlexDirection::Row, parent_width, dir);
        let margin_column = style.margin_for_axis(FlexDirection::Column, parent_width, dir);

        let both_exact = width_mode == MeasureMode::Exactly && height_mode == MeasureMode::Exactly;
        let measured = if both_exact {
            // Both sizes are imposed; no need to ask the content.
            Size::new(available_width - margin_row, available_height - margin_column)
        } else {
            // Never hand a negative size to the measure function.
            let inner_width = if available_width.is_undefined() {
                available_width
            } else {
                (available_width - margin_row - pb_row).max(0.0)
            };
            let inner_height = if available_height.is_undefined() {
                available_height
            } else {
                (available_height - margin_column - pb_column).max(0.0)
            };

            let content = match &node.measure {
                Some(measure) => measure(MeasureInput {
                    node: id,
                    context: node.context_ref(),
                    width: inner_width,
                    width_mode,
                    height: inner_height,
                    height_mode,
                }),
                None => Size::ZERO,
            };
            log::trace!(
                "measured {id} at {inner_width} ({width_mode}) x {inner_height} ({height_mode}): \
                 {}x{}",
                content.width,
                content.height
            );

            let width = if width_mode == MeasureMode::Exactly {
                available_width - margin_row
            } else {
                content.width.or_zero() + pb_row
            };
            let height = if height_mode == MeasureMode::Exactly {
                available_height - margin_column
            } else {
                content.height.or_zero() + pb_column
            };
            Size::new(width, height)
        };

        let width =
            style.bound_axis(FlexDirection::Row, measured.width, parent_width, parent_width, dir);
        let height = style.bound_axis(
            FlexDirection::Column,
            measured.height,
            parent_height,
            parent_width,
            dir,
        );
        self.nodes[id].layout.measured_dimensions = [width, height];
    }

    #[allow(clippy::too_many_arguments)]
    fn measure_empty_container(
        &mut self,
        id: NodeId,
        available_width: f32,
        available_height: f32,
        width_mode: MeasureMode,
        height_mode: MeasureMode,
        parent_width: f32,
        parent_height: f32,
    ) {
        let node = &self.nodes[id];
        let style = &node.style;
        let dir = node.layout.direction;

        let width = if width_mode == MeasureMode::Exactly {
            available_width - style.margin_for_axis(FlexDirection::Row, parent_width, dir)
        } else {
            style.padding_and_border_for_axis(FlexDirection::Row, parent_width, dir)
        };
        let height = if height_mode == MeasureMode::Exactly {
            available_height - style.margin_for_axis(FlexDirection::Column, parent_width, dir)
        } else {
            style.padding_and_border_for_axis(FlexDirection::Column, parent_width, dir)
        };

        let width = style.bound_axis(FlexDirection::Row, width, parent_width, parent_width, dir);
        let height =
            style.bound_axis(FlexDirection::Column, height, parent_height, parent_width, dir);
        self.nodes[id].layout.measured_dimensions = [width, height];
    }

    /// Size a container without visiting its children when the constraints
    /// already decide it. Returns whether that was possible.
    #[allow(clippy::too_many_arguments)]
    fn measure_fixed_size(
        &mut self,
        id: NodeId,
        available_width: f32,
        available_height: f32,
        width_mode: MeasureMode,
        height_mode: MeasureMode,
        parent_width: f32,
        parent_height: f32,
    ) -> bool {
        let fixed = (width_mode == MeasureMode::AtMost && available_width <= 0.0)
            || (height_mode == MeasureMode::AtMost && available_height <= 0.0)
            || (width_mode == MeasureMode::Exactly && height_mode == MeasureMode::Exactly);
        if !fixed {
            return false;
        }

        let node = &self.nodes[id];
        let style = &node.style;
        let dir = node.layout.direction;
        let margin_row = style.margin_for_axis(FlexDirection::Row, parent_width, dir);
        let margin_column = style.margin_for_axis(FlexDirection::Column, parent_width, dir);

        let width = if available_width.is_undefined()
            || (width_mode == MeasureMode::AtMost && available_width < 0.0)
        {
            0.0
        } else {
            available_width - margin_row
        };
        let height = if available_height.is_undefined()
            || (height_mode == MeasureMode::AtMost && available_height < 0.0)
        {
            0.0
        } else {
            available_height - margin_column
        };

        let width = style.bound_axis(FlexDirection::Row, width, parent_width, parent_width, dir);
        let height =
            style.bound_axis(FlexDirection::Column, height, parent_height, parent_width, dir);
        self.nodes[id].layout.measured_dimensions = [width, height];
        true
    }

    /// A `display: none` subtree occupies nothing and counts as freshly laid out.
    fn zero_out_layout(&mut self, id: NodeId) {
        let node = &mut self.nodes[id];
        node.layout = Layout {
            dimensions: [0.0; 2],
            measured_dimensions: [0.0; 2],
            computed_flex_basis: 0.0,
            ..Layout::default()
        };
        node.set_has_new_layout(true);
        node.set_dirty(false);
        for i in 0..self.nodes[id].children.len() {
            let child = self.nodes[id].children[i];
            self.zero_out_layout(child);
        }
    }
}

// =============================================================================
// FLEX CONTAINER
// =============================================================================

impl LayoutPass<'_> {
    #[allow(clippy::too_many_arguments)]
    fn layout_flex_container(
        &mut self,
        id: NodeId,
        available_width: f32,
        available_height: f32,
        direction: Direction,
        width_mode: MeasureMode,
        height_mode: MeasureMode,
        parent_width: f32,
        parent_height: f32,
        perform_layout: bool,
    ) {
        let node = &self.nodes[id];
        let style = node.style;
        let has_parent = node.parent.is_some();
        let children = node.children.clone();
        let web = self.config.use_web_defaults;

        // STEP 1: axes, insets and modes
        let main_axis = style.flex_direction.resolve(direction);
        let cross_axis = main_axis.cross(direction);
        let is_main_row = main_axis.is_row();
        let (main_parent_size, cross_parent_size) =
            if is_main_row { (parent_width, parent_height) } else { (parent_height, parent_width) };

        let leading_pb_main = style.leading_padding_and_border(main_axis, parent_width, direction);
        let trailing_pb_main =
            style.trailing_padding_and_border(main_axis, parent_width, direction);
        let leading_pb_cross =
            style.leading_padding_and_border(cross_axis, parent_width, direction);
        let pb_main = style.padding_and_border_for_axis(main_axis, parent_width, direction);
        let pb_cross = style.padding_and_border_for_axis(cross_axis, parent_width, direction);
        let (main_mode, cross_mode) =
            if is_main_row { (width_mode, height_mode) } else { (height_mode, width_mode) };
        let (pb_row, pb_column) =
            if is_main_row { (pb_main, pb_cross) } else { (pb_cross, pb_main) };
        let margin_row = style.margin_for_axis(FlexDirection::Row, parent_width, direction);
        let margin_column = style.margin_for_axis(FlexDirection::Column, parent_width, direction);

        // STEP 2: available inner space
        let inner_width = available_inner_dim(
            &style,
            Dimension::Width,
            available_width - margin_row - pb_row,
            pb_row,
            parent_width,
        );
        let inner_height = available_inner_dim(
            &style,
            Dimension::Height,
            available_height - margin_column - pb_column,
            pb_column,
            parent_height,
        );
        let (inner_main, inner_cross) =
            if is_main_row { (inner_width, inner_height) } else { (inner_height, inner_width) };
        let main_dim = main_axis.dimension();

        let mut c = Container {
            id,
            style,
            direction,
            main_axis,
            cross_axis,
            is_main_row,
            wrap: style.flex_wrap != Wrap::NoWrap,
            perform_layout,
            parent_width,
            main_parent_size,
            cross_parent_size,
            leading_pb_main,
            trailing_pb_main,
            leading_pb_cross,
            pb_main,
            pb_cross,
            width_mode,
            height_mode,
            main_mode,
            cross_mode,
            inner_width,
            inner_height,
            inner_main,
            inner_cross,
            min_inner_main: style.min_dimension(main_dim).resolve(main_parent_size) - pb_main,
            max_inner_main: style.max_dimension(main_dim).resolve(main_parent_size) - pb_main,
            grow: style.resolve_flex_grow(has_parent),
            flex_basis_overflows: false,
        };

        // A lone flexible child in an exact container fills it without
        // being measured first.
        let single_flex_child = if main_mode == MeasureMode::Exactly {
            let mut flexible = children.iter().copied().filter(|&child| {
                let cs = &self.nodes[child].style;
                cs.display != Display::None && cs.is_flexible(true, web)
            });
            match (flexible.next(), flexible.next()) {
                (Some(child), None) => {
                    let cs = &self.nodes[child].style;
                    let flexes =
                        cs.resolve_flex_grow(true) > 0.0 && cs.resolve_flex_shrink(true, web) > 0.0;
                    flexes.then_some(child)
                }
                _ => None,
            }
        } else {
            None
        };

        // STEP 3: flex basis of every in-flow child
        let mut absolute_children = Vec::new();
        let mut total_outer_flex_basis = 0.0;
        for &child in &children {
            if self.nodes[child].style.display == Display::None {
                self.zero_out_layout(child);
                continue;
            }
            if perform_layout {
                self.set_position(
                    child,
                    main_axis,
                    cross_axis,
                    inner_main,
                    inner_cross,
                    inner_width,
                    direction,
                );
            }
            if self.nodes[child].style.position_type == PositionType::Absolute {
                absolute_children.push(child);
                continue;
            }
            if single_flex_child == Some(child) {
                let layout = &mut self.nodes[child].layout;
                layout.computed_flex_basis_generation = self.generation;
                layout.computed_flex_basis = 0.0;
                layout.computed_flex_basis_main_size = UNDEFINED;
            } else {
                self.compute_flex_basis_for_child(&c, child);
            }
            let child_node = &self.nodes[child];
            total_outer_flex_basis += child_node.layout.computed_flex_basis
                + child_node.style.margin_for_axis(main_axis, inner_width, direction);
        }

        c.flex_basis_overflows =
            c.main_mode != MeasureMode::Undefined && total_outer_flex_basis > inner_main;
        if c.wrap && c.flex_basis_overflows && c.main_mode == MeasureMode::AtMost {
            c.main_mode = MeasureMode::Exactly;
        }

        // STEPS 4-7: one line at a time
        let mut start = 0;
        let mut line_count = 0;
        let mut total_line_cross = 0.0f32;
        let mut max_line_main = 0.0f32;
        let baseline_layout = is_baseline_layout(self.nodes, id);
        while start < children.len() {
            let line = self.collect_line(&c, &children, start, line_count);
            let can_skip_flex = !perform_layout && c.cross_mode == MeasureMode::Exactly;

            // Without an exact main size, the line's content decides the space.
            let mut available_main = c.inner_main;
            let mut size_based_on_content = false;
            if c.main_mode != MeasureMode::Exactly {
                let legacy = self.config.use_legacy_stretch_behaviour;
                if c.min_inner_main.is_defined() && line.size_consumed < c.min_inner_main {
                    available_main = c.min_inner_main;
                } else if c.max_inner_main.is_defined() && line.size_consumed > c.max_inner_main {
                    available_main = c.max_inner_main;
                } else {
                    if !legacy && (line.total_grow == 0.0 || c.grow == 0.0) {
                        available_main = line.size_consumed;
                    }
                    size_based_on_content = !legacy;
                }
            }

            let mut remaining_free_space = 0.0;
            if !size_based_on_content && available_main.is_defined() {
                remaining_free_space = available_main - line.size_consumed;
            } else if line.size_consumed < 0.0 {
                remaining_free_space = -line.size_consumed;
            }

            if !can_skip_flex {
                remaining_free_space =
                    self.resolve_flexible_lengths(&c, &line, available_main, remaining_free_space);
            }
            if remaining_free_space < 0.0 {
                self.nodes[id].layout.had_overflow = true;
            }

            let line_children = &children[start..line.end];
            let (main_extent, content_cross) = self.justify_main_axis(
                &c,
                line_children,
                line.items.len(),
                remaining_free_space,
                available_main,
                can_skip_flex,
            );

            let content_cross = if baseline_layout {
                content_cross.max(self.baseline_line_cross(&c, line_children))
            } else {
                content_cross
            };

            let mut container_cross = c.inner_cross;
            if c.cross_mode != MeasureMode::Exactly {
                container_cross = style.bound_axis(
                    cross_axis,
                    content_cross + pb_cross,
                    cross_parent_size,
                    parent_width,
                    direction,
                ) - pb_cross;
            }
            let mut line_cross = content_cross;
            if !c.wrap && c.cross_mode == MeasureMode::Exactly {
                line_cross = c.inner_cross;
            }
            line_cross = style.bound_axis(
                cross_axis,
                line_cross + pb_cross,
                cross_parent_size,
                parent_width,
                direction,
            ) - pb_cross;

            if perform_layout {
                self.align_cross_axis(
                    &c,
                    line_children,
                    line_cross,
                    container_cross,
                    total_line_cross,
                );
            }

            total_line_cross += line_cross;
            max_line_main = max_line_main.max(main_extent);
            start = line.end;
            line_count += 1;
        }

        // STEP 8: align-content and baselines across lines
        if perform_layout && (line_count > 1 || baseline_layout) {
            self.align_content(&c, &children, line_count, total_line_cross);
        }

        // STEP 9: final size
        self.set_final_dimensions(
            &c,
            available_width,
            available_height,
            parent_height,
            max_line_main,
            total_line_cross,
        );

        if perform_layout {
            // STEP 10: wrap-reverse lines were placed top-down; mirror them.
            if style.flex_wrap == Wrap::WrapReverse {
                let cross_size = self.measured(id, cross_axis);
                let lead = cross_axis.leading_edge() as usize;
                for &child in &children {
                    let cs = &self.nodes[child].style;
                    if cs.display == Display::None || cs.position_type != PositionType::Relative {
                        continue;
                    }
                    let child_cross = self.measured(child, cross_axis);
                    let position = self.position_mut(child);
                    position[lead] = cross_size - position[lead] - child_cross;
                }
            }

            // STEP 11: absolute children
            for &child in &absolute_children {
                self.layout_absolute_child(&c, child);
            }

            // STEP 12: trailing edges, which also turn reversed-axis offsets
            // into physical left/top.
            for &child in &children {
                if self.nodes[child].style.display == Display::None {
                    continue;
                }
                for axis in [main_axis, cross_axis] {
                    let size = self.measured(id, axis);
                    let child_size = self.measured(child, axis);
                    let position = self.position_mut(child);
                    position[axis.trailing_edge() as usize] =
                        size - child_size - position[axis.leading_edge() as usize];
                }
            }
        }
    }

    // =========================================================================
    // Flex basis
    // =========================================================================

    fn compute_flex_basis_for_child(&mut self, c: &Container, child: NodeId) {
        let generation = self.generation;
        let web = self.config.use_web_defaults;
        let web_flex_basis =
            self.config.is_experimental_feature_enabled(ExperimentalFeatures::WEB_FLEX_BASIS);
        let dir = c.direction;
        let main_axis = c.main_axis;
        let (width, height) = (c.inner_width, c.inner_height);
        let (parent_width, parent_height) = (c.inner_width, c.inner_height);
        let main_size = if c.is_main_row { width } else { height };

        let node = &self.nodes[child];
        let cs = node.style;
        let resolved_basis = cs.resolve_flex_basis(web).resolve(c.inner_main);
        let row_defined = cs.is_dimension_defined(FlexDirection::Row, parent_width);
        let column_defined = cs.is_dimension_defined(FlexDirection::Column, parent_height);

        if resolved_basis.is_defined() && main_size.is_defined() {
            let layout = &node.layout;
            if layout.computed_flex_basis.is_undefined()
                || !floats_equal(layout.computed_flex_basis_main_size, c.inner_main)
                || (web_flex_basis && layout.computed_flex_basis_generation != generation)
            {
                let basis = resolved_basis
                    .max(cs.padding_and_border_for_axis(main_axis, parent_width, dir));
                let layout = &mut self.nodes[child].layout;
                layout.computed_flex_basis = basis;
                layout.computed_flex_basis_main_size = c.inner_main;
            }
        } else if c.is_main_row && row_defined {
            let basis = cs
                .resolved_dimension(Dimension::Width)
                .resolve(parent_width)
                .max(cs.padding_and_border_for_axis(FlexDirection::Row, parent_width, dir));
            self.nodes[child].layout.computed_flex_basis = basis;
        } else if !c.is_main_row && column_defined {
            let basis = cs
                .resolved_dimension(Dimension::Height)
                .resolve(parent_height)
                .max(cs.padding_and_border_for_axis(FlexDirection::Column, parent_width, dir));
            self.nodes[child].layout.computed_flex_basis = basis;
        } else {
            // Measure the content to find its hypothetical main size.
            let mut child_width = UNDEFINED;
            let mut child_height = UNDEFINED;
            let mut width_mode = MeasureMode::Undefined;
            let mut height_mode = MeasureMode::Undefined;
            let margin_row = cs.margin_for_axis(FlexDirection::Row, parent_width, dir);
            let margin_column = cs.margin_for_axis(FlexDirection::Column, parent_width, dir);

            if row_defined {
                child_width =
                    cs.resolved_dimension(Dimension::Width).resolve(parent_width) + margin_row;
                width_mode = MeasureMode::Exactly;
            }
            if column_defined {
                child_height = cs.resolved_dimension(Dimension::Height).resolve(parent_height)
                    + margin_column;
                height_mode = MeasureMode::Exactly;
            }

            // A scroll container does not bound its content along the scrolled axis.
            let scroll = c.style.overflow == Overflow::Scroll;
            if (!c.is_main_row || !scroll) && child_width.is_undefined() && width.is_defined() {
                child_width = width;
                width_mode = MeasureMode::AtMost;
            }
            if (c.is_main_row || !scroll) && child_height.is_undefined() && height.is_defined() {
                child_height = height;
                height_mode = MeasureMode::AtMost;
            }

            if let Some(ratio) = cs.aspect_ratio() {
                if !c.is_main_row && width_mode == MeasureMode::Exactly {
                    child_height = margin_column + (child_width - margin_row) / ratio;
                    height_mode = MeasureMode::Exactly;
                } else if c.is_main_row && height_mode == MeasureMode::Exactly {
                    child_width = margin_row + (child_height - margin_column) * ratio;
                    width_mode = MeasureMode::Exactly;
                }
            }

            // Stretched children are measured at the container's exact cross size.
            let stretches = align_item(&c.style, &cs) == Align::Stretch;
            let has_exact_width = width.is_defined() && c.width_mode == MeasureMode::Exactly;
            if !c.is_main_row
                && !row_defined
                && has_exact_width
                && stretches
                && width_mode != MeasureMode::Exactly
            {
                child_width = width;
                width_mode = MeasureMode::Exactly;
                if let Some(ratio) = cs.aspect_ratio() {
                    child_height = margin_column + (child_width - margin_row) / ratio;
                    height_mode = MeasureMode::Exactly;
                }
            }
            let has_exact_height = height.is_defined() && c.height_mode == MeasureMode::Exactly;
            if c.is_main_row
                && !column_defined
                && has_exact_height
                && stretches
                && height_mode != MeasureMode::Exactly
            {
                child_height = height;
                height_mode = MeasureMode::Exactly;
                if let Some(ratio) = cs.aspect_ratio() {
                    child_width = margin_row + (child_height - margin_column) * ratio;
                    width_mode = MeasureMode::Exactly;
                }
            }

            cs.constrain_max_size_for_mode(
                FlexDirection::Row,
                parent_width,
                parent_width,
                dir,
                &mut width_mode,
                &mut child_width,
            );
            cs.constrain_max_size_for_mode(
                FlexDirection::Column,
                parent_height,
                parent_width,
                dir,
                &mut height_mode,
                &mut child_height,
            );

            self.layout_node(
                child,
                child_width,
                child_height,
                dir,
                width_mode,
                height_mode,
                parent_width,
                parent_height,
                false,
                "measure",
            );

            let basis = self
                .measured(child, main_axis)
                .max(cs.padding_and_border_for_axis(main_axis, parent_width, dir));
            self.nodes[child].layout.computed_flex_basis = basis;
        }

        self.nodes[child].layout.computed_flex_basis_generation = generation;
    }

    // =========================================================================
    // Lines
    // =========================================================================

    /// Collect children from `start` into one line.
    fn collect_line(
        &mut self,
        c: &Container,
        children: &[NodeId],
        start: usize,
        line_index: usize,
    ) -> FlexLine {
        let web = self.config.use_web_defaults;
        let mut line = FlexLine {
            items: Vec::new(),
            end: start,
            size_consumed: 0.0,
            total_grow: 0.0,
            total_shrink_scaled: 0.0,
        };

        let mut i = start;
        while i < children.len() {
            let child = children[i];
            let node = &mut self.nodes[child];
            if node.style.display == Display::None {
                i += 1;
                continue;
            }
            node.line_index = line_index;

            if node.style.position_type == PositionType::Relative {
                let cs = &node.style;
                let basis = node.layout.computed_flex_basis;
                let margin_main = cs.margin_for_axis(c.main_axis, c.inner_width, c.direction);
                let clamped =
                    cs.bound_axis_within_min_and_max(c.main_axis, basis, c.main_parent_size);

                // A wrapping line always keeps at least one item.
                if line.size_consumed + clamped + margin_main > c.inner_main
                    && c.wrap
                    && !line.items.is_empty()
                {
                    break;
                }

                line.size_consumed += clamped + margin_main;
                if cs.is_flexible(true, web) {
                    line.total_grow += cs.resolve_flex_grow(true);
                    // Shrink is weighted by the basis.
                    line.total_shrink_scaled += -cs.resolve_flex_shrink(true, web) * basis;
                }
                line.items.push(child);
            }
            i += 1;
        }
        line.end = i;

        // Grow factors summing below one still distribute all free space.
        if line.total_grow > 0.0 && line.total_grow < 1.0 {
            line.total_grow = 1.0;
        }
        line
    }

    // =========================================================================
    // Flexible lengths
    // =========================================================================

    /// Distribute free space on one line and lay each item out at its
    /// flexed size. Returns the space left over afterwards.
    fn resolve_flexible_lengths(
        &mut self,
        c: &Container,
        line: &FlexLine,
        available_main: f32,
        remaining_free_space: f32,
    ) -> f32 {
        let web = self.config.use_web_defaults;
        let growing = remaining_free_space > 0.0;
        let shrinking = remaining_free_space < 0.0;

        let mut free_space = remaining_free_space;
        let mut total_grow = line.total_grow;
        let mut total_shrink = line.total_shrink_scaled;
        let mut frozen: Vec<Option<f32>> = vec![None; line.items.len()];

        // Freeze items whose min/max clamps, then redistribute among the rest.
        // Every round either freezes an item or ends the loop.
        for _ in 0..line.items.len() {
            let mut delta_free = 0.0;
            let mut delta_grow = 0.0;
            let mut delta_shrink = 0.0;
            let mut froze_any = false;

            for (k, &child) in line.items.iter().enumerate() {
                if frozen[k].is_some() {
                    continue;
                }
                let cs = &self.nodes[child].style;
                let basis = self.clamped_flex_basis(c, child);

                let (factor, total, scaled) = if shrinking {
                    let scaled = -cs.resolve_flex_shrink(true, web) * basis;
                    (scaled, total_shrink, scaled)
                } else if growing {
                    let grow = cs.resolve_flex_grow(true);
                    (grow, total_grow, grow)
                } else {
                    continue;
                };
                if factor == 0.0 || total == 0.0 {
                    continue;
                }

                let base = basis + free_space / total * factor;
                let bound =
                    cs.bound_axis(c.main_axis, base, available_main, c.inner_width, c.direction);
                if base != bound {
                    frozen[k] = Some(bound);
                    froze_any = true;
                    delta_free -= bound - basis;
                    if shrinking {
                        delta_shrink -= scaled;
                    } else {
                        delta_grow -= scaled;
                    }
                }
            }

            total_shrink += delta_shrink;
            total_grow += delta_grow;
            free_space += delta_free;
            if !froze_any {
                break;
            }
        }

        let mut delta_free = 0.0;
        for (k, &child) in line.items.iter().enumerate() {
            let cs = &self.nodes[child].style;
            let basis = self.clamped_flex_basis(c, child);
            let mut main_size = basis;

            if let Some(size) = frozen[k] {
                main_size = size;
            } else if shrinking {
                let scaled = -cs.resolve_flex_shrink(true, web) * basis;
                if scaled != 0.0 {
                    let size = if total_shrink == 0.0 {
                        basis + scaled
                    } else {
                        basis + free_space / total_shrink * scaled
                    };
                    main_size = cs.bound_axis(
                        c.main_axis,
                        size,
                        available_main,
                        c.inner_width,
                        c.direction,
                    );
                }
            } else if growing {
                let grow = cs.resolve_flex_grow(true);
                if grow != 0.0 && total_grow != 0.0 {
                    let size = basis + free_space / total_grow * grow;
                    main_size = cs.bound_axis(
                        c.main_axis,
                        size,
                        available_main,
                        c.inner_width,
                        c.direction,
                    );
                }
            }

            delta_free -= main_size - basis;
            self.layout_flex_item(c, child, main_size, available_main);
        }

        remaining_free_space + delta_free
    }

    #[inline]
    fn clamped_flex_basis(&self, c: &Container, child: NodeId) -> f32 {
        let node = &self.nodes[child];
        node.style.bound_axis_within_min_and_max(
            c.main_axis,
            node.layout.computed_flex_basis,
            c.main_parent_size,
        )
    }

    /// Lay out one item at its resolved main size.
    fn layout_flex_item(
        &mut self,
        c: &Container,
        child: NodeId,
        main_size: f32,
        available_main: f32,
    ) {
        let dir = c.direction;
        let cs = self.nodes[child].style;
        let margin_main = cs.margin_for_axis(c.main_axis, c.inner_width, dir);
        let margin_cross = cs.margin_for_axis(c.cross_axis, c.inner_width, dir);
        let cross_defined = cs.is_dimension_defined(c.cross_axis, c.inner_cross);
        let stretches = align_item(&c.style, &cs) == Align::Stretch
            && !cs.leading_margin_is_auto(c.cross_axis, dir)
            && !cs.trailing_margin_is_auto(c.cross_axis, dir);

        let mut child_main = main_size + margin_main;
        let mut main_mode = MeasureMode::Exactly;
        let mut child_cross;
        let mut cross_mode;

        if let Some(ratio) = cs.aspect_ratio() {
            child_cross =
                margin_cross + if c.is_main_row { main_size / ratio } else { main_size * ratio };
            cross_mode = MeasureMode::Exactly;
        } else if c.inner_cross.is_defined()
            && !cross_defined
            && c.cross_mode == MeasureMode::Exactly
            && !(c.wrap && c.flex_basis_overflows)
            && stretches
        {
            child_cross = c.inner_cross;
            cross_mode = MeasureMode::Exactly;
        } else if !cross_defined {
            child_cross = c.inner_cross;
            cross_mode = if child_cross.is_undefined() {
                MeasureMode::Undefined
            } else {
                MeasureMode::AtMost
            };
        } else {
            let dim = cs.resolved_dimension(c.cross_axis.dimension());
            child_cross = dim.resolve(c.inner_cross) + margin_cross;
            let loose_percent =
                matches!(dim, Value::Percent(_)) && c.cross_mode != MeasureMode::Exactly;
            cross_mode = if child_cross.is_undefined() || loose_percent {
                MeasureMode::Undefined
            } else {
                MeasureMode::Exactly
            };
        }

        cs.constrain_max_size_for_mode(
            c.main_axis,
            available_main,
            c.inner_width,
            dir,
            &mut main_mode,
            &mut child_main,
        );
        cs.constrain_max_size_for_mode(
            c.cross_axis,
            c.inner_cross,
            c.inner_width,
            dir,
            &mut cross_mode,
            &mut child_cross,
        );

        // Stretched items get their real layout in the cross-axis step.
        let requires_stretch_layout = !cross_defined && stretches;

        let (width, height, width_mode, height_mode) = if c.is_main_row {
            (child_main, child_cross, main_mode, cross_mode)
        } else {
            (child_cross, child_main, cross_mode, main_mode)
        };
        self.layout_node(
            child,
            width,
            height,
            dir,
            width_mode,
            height_mode,
            c.inner_width,
            c.inner_height,
            c.perform_layout && !requires_stretch_layout,
            "flex",
        );

        if self.nodes[child].layout.had_overflow {
            self.nodes[c.id].layout.had_overflow = true;
        }
    }
}

// =============================================================================
// ALIGNMENT
// =============================================================================

impl LayoutPass<'_> {
    /// Place one line's children along the main axis. Returns the line's
    /// main extent (including the container's padding and border) and the
    /// cross size of its tallest item.
    fn justify_main_axis(
        &mut self,
        c: &Container,
        line_children: &[NodeId],
        item_count: usize,
        remaining_free_space: f32,
        available_main: f32,
        can_skip_flex: bool,
    ) -> (f32, f32) {
        let dir = c.direction;
        let main_axis = c.main_axis;
        let lead = main_axis.leading_edge() as usize;
        let mut remaining = remaining_free_space;

        // An AtMost container only keeps free space up to its min size.
        if c.main_mode == MeasureMode::AtMost && remaining > 0.0 {
            let min_main = c.style.min_dimension(main_axis.dimension()).resolve(c.main_parent_size);
            remaining = if min_main.is_defined() && min_main >= 0.0 {
                (min_main - c.pb_main - (available_main - remaining)).max(0.0)
            } else {
                0.0
            };
        }

        let mut auto_margins = 0usize;
        for &child in line_children {
            let cs = &self.nodes[child].style;
            if cs.display == Display::None || cs.position_type != PositionType::Relative {
                continue;
            }
            auto_margins += usize::from(cs.leading_margin_is_auto(main_axis, dir));
            auto_margins += usize::from(cs.trailing_margin_is_auto(main_axis, dir));
        }

        let mut leading_main = 0.0;
        let mut between_main = 0.0;
        if auto_margins == 0 && item_count > 0 {
            let items = item_count as f32;
            match c.style.justify_content {
                Justify::FlexStart => {}
                Justify::Center => leading_main = remaining / 2.0,
                Justify::FlexEnd => leading_main = remaining,
                Justify::SpaceBetween => {
                    if item_count > 1 {
                        between_main = remaining.max(0.0) / (items - 1.0);
                    }
                }
                Justify::SpaceEvenly => {
                    between_main = remaining / (items + 1.0);
                    leading_main = between_main;
                }
                Justify::SpaceAround => {
                    leading_main = 0.5 * remaining / items;
                    between_main = leading_main * 2.0;
                }
            }
        }
        let auto_margin_size =
            if auto_margins > 0 { remaining.max(0.0) / auto_margins as f32 } else { 0.0 };

        let mut main_dim = c.leading_pb_main + leading_main;
        let mut cross_dim = 0.0f32;
        for &child in line_children {
            let cs = self.nodes[child].style;
            if cs.display == Display::None {
                continue;
            }
            if cs.position_type == PositionType::Absolute {
                if !c.perform_layout {
                    continue;
                }
                if cs.is_leading_position_defined(main_axis, dir) {
                    self.position_mut(child)[lead] =
                        cs.leading_position(main_axis, c.inner_main, dir)
                            + c.style.leading_border(main_axis, dir)
                            + cs.leading_margin(main_axis, c.inner_width, dir);
                } else {
                    self.position_mut(child)[lead] +=
                        c.style.leading_border(main_axis, dir) + leading_main;
                }
                continue;
            }

            if cs.leading_margin_is_auto(main_axis, dir) {
                main_dim += auto_margin_size;
            }
            if c.perform_layout {
                self.position_mut(child)[lead] += main_dim;
            }
            if cs.trailing_margin_is_auto(main_axis, dir) {
                main_dim += auto_margin_size;
            }

            if can_skip_flex {
                // Measuring with an exact cross size: only the basis matters.
                main_dim += between_main
                    + cs.margin_for_axis(main_axis, c.inner_width, dir)
                    + self.nodes[child].layout.computed_flex_basis;
                cross_dim = c.inner_cross;
            } else {
                main_dim +=
                    between_main + self.dim_with_margin(child, main_axis, c.inner_width, dir);
                let cross = self.dim_with_margin(child, c.cross_axis, c.inner_width, dir);
                cross_dim = cross_dim.max(cross);
            }
        }

        (main_dim + c.trailing_pb_main, cross_dim)
    }

    /// Stretch or align each child of one line within `container_cross`.
    fn align_cross_axis(
        &mut self,
        c: &Container,
        line_children: &[NodeId],
        line_cross: f32,
        container_cross: f32,
        total_line_cross: f32,
    ) {
        let dir = c.direction;
        let cross_axis = c.cross_axis;
        let lead = cross_axis.leading_edge() as usize;

        for &child in line_children {
            let cs = self.nodes[child].style;
            if cs.display == Display::None {
                continue;
            }

            if cs.position_type == PositionType::Absolute {
                let position = if cs.is_leading_position_defined(cross_axis, dir) {
                    cs.leading_position(cross_axis, c.inner_cross, dir)
                        + c.style.leading_border(cross_axis, dir)
                        + cs.leading_margin(cross_axis, c.inner_width, dir)
                } else {
                    UNDEFINED
                };
                // Fall back to border + margin when the offset cannot resolve.
                self.position_mut(child)[lead] = if position.is_undefined() {
                    c.style.leading_border(cross_axis, dir)
                        + cs.leading_margin(cross_axis, c.inner_width, dir)
                } else {
                    position
                };
                continue;
            }

            let mut leading_cross = c.leading_pb_cross;
            let align = align_item(&c.style, &cs);
            let leading_auto = cs.leading_margin_is_auto(cross_axis, dir);
            let trailing_auto = cs.trailing_margin_is_auto(cross_axis, dir);

            if align == Align::Stretch && !leading_auto && !trailing_auto {
                if !cs.is_dimension_defined(cross_axis, c.inner_cross) {
                    self.stretch_child(c, child, line_cross);
                }
            } else {
                let remaining =
                    container_cross - self.dim_with_margin(child, cross_axis, c.inner_width, dir);
                leading_cross += match (leading_auto, trailing_auto) {
                    (true, true) => (remaining / 2.0).max(0.0),
                    (false, true) => 0.0,
                    (true, false) => remaining.max(0.0),
                    (false, false) => match align {
                        // Baselines are placed across the whole line later.
                        Align::FlexStart | Align::Baseline => 0.0,
                        Align::Center => remaining / 2.0,
                        _ => remaining,
                    },
                };
            }

            self.position_mut(child)[lead] += total_line_cross + leading_cross;
        }
    }

    /// Ascent and descent of a child around its baseline, margins included.
    fn baseline_extent(&self, c: &Container, child: NodeId) -> (f32, f32) {
        let cs = &self.nodes[child].style;
        let ascent = calculate_baseline(self.nodes, child)
            + cs.leading_margin(FlexDirection::Column, c.inner_width, c.direction);
        let descent = self.measured(child, FlexDirection::Column)
            + cs.margin_for_axis(FlexDirection::Column, c.inner_width, c.direction)
            - ascent;
        (ascent, descent)
    }

    /// Cross size a line needs so its baseline-aligned children share one baseline.
    fn baseline_line_cross(&self, c: &Container, line_children: &[NodeId]) -> f32 {
        let mut max_ascent = 0.0f32;
        let mut max_descent = 0.0f32;
        for &child in line_children {
            let cs = &self.nodes[child].style;
            if cs.display == Display::None
                || cs.position_type != PositionType::Relative
                || align_item(&c.style, cs) != Align::Baseline
            {
                continue;
            }
            let (ascent, descent) = self.baseline_extent(c, child);
            max_ascent = max_ascent.max(ascent);
            max_descent = max_descent.max(descent);
        }
        max_ascent + max_descent
    }

    /// Lay a stretched child out again at the line's cross size.
    fn stretch_child(&mut self, c: &Container, child: NodeId, line_cross: f32) {
        let dir = c.direction;
        let cs = self.nodes[child].style;
        let mut child_main = self.measured(child, c.main_axis);
        let mut child_cross = match cs.aspect_ratio() {
            Some(ratio) => {
                cs.margin_for_axis(c.cross_axis, c.inner_width, dir)
                    + if c.is_main_row { child_main / ratio } else { child_main * ratio }
            }
            None => line_cross,
        };
        child_main += cs.margin_for_axis(c.main_axis, c.inner_width, dir);

        let mut main_mode = MeasureMode::Exactly;
        let mut cross_mode = MeasureMode::Exactly;
        cs.constrain_max_size_for_mode(
            c.main_axis,
            c.inner_main,
            c.inner_width,
            dir,
            &mut main_mode,
            &mut child_main,
        );
        cs.constrain_max_size_for_mode(
            c.cross_axis,
            c.inner_cross,
            c.inner_width,
            dir,
            &mut cross_mode,
            &mut child_cross,
        );

        let (width, height) =
            if c.is_main_row { (child_main, child_cross) } else { (child_cross, child_main) };
        self.layout_node(
            child,
            width,
            height,
            dir,
            mode_for(width),
            mode_for(height),
            c.inner_width,
            c.inner_height,
            true,
            "stretch",
        );
    }

    /// Distribute lines along the cross axis and apply per-line alignment,
    /// including baselines.
    fn align_content(
        &mut self,
        c: &Container,
        children: &[NodeId],
        line_count: usize,
        total_line_cross: f32,
    ) {
        let dir = c.direction;
        let cross_axis = c.cross_axis;
        let lead = cross_axis.leading_edge() as usize;
        let lines = line_count as f32;
        let inner_cross = if c.inner_cross.is_defined() { c.inner_cross } else { total_line_cross };
        let remaining = inner_cross - total_line_cross;
        let has_room = inner_cross > total_line_cross;

        let mut cross_dim_lead = 0.0;
        let mut current_lead = c.leading_pb_cross;
        match c.style.align_content {
            Align::FlexEnd => current_lead += remaining,
            Align::Center => current_lead += remaining / 2.0,
            Align::Stretch => {
                if has_room {
                    cross_dim_lead = remaining / lines;
                }
            }
            Align::SpaceAround => {
                if has_room {
                    current_lead += remaining / (2.0 * lines);
                    if line_count > 1 {
                        cross_dim_lead = remaining / lines;
                    }
                } else {
                    current_lead += remaining / 2.0;
                }
            }
            Align::SpaceBetween => {
                if has_room && line_count > 1 {
                    cross_dim_lead = remaining / (lines - 1.0);
                }
            }
            Align::Auto | Align::FlexStart | Align::Baseline => {}
        }

        let mut end = 0;
        for line in 0..line_count {
            let start = end;

            // Line height, and the largest ascent/descent for baselines.
            let mut line_height = 0.0f32;
            let mut max_ascent = 0.0f32;
            let mut max_descent = 0.0f32;
            let mut i = start;
            while i < children.len() {
                let child = children[i];
                let node = &self.nodes[child];
                let cs = &node.style;
                if cs.display == Display::None || cs.position_type != PositionType::Relative {
                    i += 1;
                    continue;
                }
                if node.line_index != line {
                    break;
                }
                if self.is_layout_dim_defined(child, cross_axis) {
                    let outer = self.dim_with_margin(child, cross_axis, c.inner_width, dir);
                    line_height = line_height.max(outer);
                }
                if align_item(&c.style, cs) == Align::Baseline {
                    let (ascent, descent) = self.baseline_extent(c, child);
                    max_ascent = max_ascent.max(ascent);
                    max_descent = max_descent.max(descent);
                    line_height = line_height.max(max_ascent + max_descent);
                }
                i += 1;
            }
            end = i;
            line_height += cross_dim_lead;

            for &child in &children[start..end] {
                let cs = self.nodes[child].style;
                if cs.display == Display::None || cs.position_type != PositionType::Relative {
                    continue;
                }
                match align_item(&c.style, &cs) {
                    Align::FlexStart => {
                        self.position_mut(child)[lead] =
                            current_lead + cs.leading_margin(cross_axis, c.inner_width, dir);
                    }
                    Align::FlexEnd => {
                        let size = self.measured(child, cross_axis);
                        self.position_mut(child)[lead] = current_lead + line_height
                            - cs.trailing_margin(cross_axis, c.inner_width, dir)
                            - size;
                    }
                    Align::Center => {
                        let size = self.measured(child, cross_axis);
                        self.position_mut(child)[lead] = current_lead + (line_height - size) / 2.0;
                    }
                    Align::Stretch => {
                        self.position_mut(child)[lead] =
                            current_lead + cs.leading_margin(cross_axis, c.inner_width, dir);
                        if !cs.is_dimension_defined(cross_axis, c.inner_cross) {
                            self.stretch_to_line(c, child, line_height);
                        }
                    }
                    Align::Baseline => {
                        let baseline = calculate_baseline(self.nodes, child);
                        let offset = cs.leading_position(FlexDirection::Column, c.inner_cross, dir);
                        self.position_mut(child)[Edge::Top as usize] =
                            current_lead + max_ascent - baseline + offset.or_zero();
                    }
                    Align::Auto | Align::SpaceBetween | Align::SpaceAround => {}
                }
            }

            current_lead += line_height;
        }
    }

    /// Stretch a child of a multi-line container to its line's height.
    fn stretch_to_line(&mut self, c: &Container, child: NodeId, line_height: f32) {
        let dir = c.direction;
        let margin_main = self.nodes[child].style.margin_for_axis(c.main_axis, c.inner_width, dir);
        let width = self.measured(child, FlexDirection::Row);
        let height = self.measured(child, FlexDirection::Column);
        let (new_width, new_height) = if c.is_main_row {
            (width + margin_main, line_height)
        } else {
            (line_height, height + margin_main)
        };

        let cs = &self.nodes[child].style;
        let margin_row = cs.margin_for_axis(FlexDirection::Row, c.inner_width, dir);
        let margin_column = cs.margin_for_axis(FlexDirection::Column, c.inner_width, dir);
        if floats_equal(new_width - margin_row, width)
            && floats_equal(new_height - margin_column, height)
        {
            return;
        }
        self.layout_node(
            child,
            new_width,
            new_height,
            dir,
            MeasureMode::Exactly,
            MeasureMode::Exactly,
            c.inner_width,
            c.inner_height,
            true,
            "multiline-stretch",
        );
    }

    // =========================================================================
    // Final size
    // =========================================================================

    fn set_final_dimensions(
        &mut self,
        c: &Container,
        available_width: f32,
        available_height: f32,
        parent_height: f32,
        max_line_main: f32,
        total_line_cross: f32,
    ) {
        let style = &c.style;
        let dir = c.direction;
        let parent_width = c.parent_width;
        let margin_row = style.margin_for_axis(FlexDirection::Row, parent_width, dir);
        let margin_column = style.margin_for_axis(FlexDirection::Column, parent_width, dir);
        let scroll = style.overflow == Overflow::Scroll;

        let mut measured = [
            style.bound_axis(
                FlexDirection::Row,
                available_width - margin_row,
                parent_width,
                parent_width,
                dir,
            ),
            style.bound_axis(
                FlexDirection::Column,
                available_height - margin_column,
                parent_height,
                parent_width,
                dir,
            ),
        ];

        let main = dim_index(c.main_axis);
        if c.main_mode == MeasureMode::Undefined
            || (!scroll && c.main_mode == MeasureMode::AtMost)
        {
            measured[main] =
                style.bound_axis(c.main_axis, max_line_main, c.main_parent_size, parent_width, dir);
        } else if c.main_mode == MeasureMode::AtMost {
            // Scroll containers never grow past the space offered.
            let content =
                style.bound_axis_within_min_and_max(c.main_axis, max_line_main, c.main_parent_size);
            measured[main] = (c.inner_main + c.pb_main).min(content).max(c.pb_main);
        }

        let cross = dim_index(c.cross_axis);
        let content_cross = total_line_cross + c.pb_cross;
        if c.cross_mode == MeasureMode::Undefined
            || (!scroll && c.cross_mode == MeasureMode::AtMost)
        {
            measured[cross] = style.bound_axis(
                c.cross_axis,
                content_cross,
                c.cross_parent_size,
                parent_width,
                dir,
            );
        } else if c.cross_mode == MeasureMode::AtMost {
            let content = style.bound_axis_within_min_and_max(
                c.cross_axis,
                content_cross,
                c.cross_parent_size,
            );
            measured[cross] = (c.inner_cross + c.pb_cross).min(content).max(c.pb_cross);
        }

        self.nodes[c.id].layout.measured_dimensions = measured;
    }
}
