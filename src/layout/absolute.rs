//! Absolutely positioned children.
//!
//! Absolute children are taken out of flow: they get no share of free space
//! and do not affect line sizes. They are laid out after the container has
//! its final size, against its padding box (inside the border).

use crate::engine::NodeId;
use crate::types::{Align, Dimension, FlexDirection, FloatExt, Justify, MeasureMode, UNDEFINED};

use super::algorithm::{mode_for, Container, LayoutPass};
use crate::style::align_item;

impl LayoutPass<'_> {
    /// Size and place one absolute child of the container `c`.
    pub(super) fn layout_absolute_child(&mut self, c: &Container, child: NodeId) {
        let dir = c.direction;
        let width = c.inner_width;
        let height = c.inner_height;
        let width_mode = if c.is_main_row { c.main_mode } else { c.cross_mode };
        let container_width = self.measured(c.id, FlexDirection::Row);
        let container_height = self.measured(c.id, FlexDirection::Column);

        let cs = self.nodes[child].style;
        let parent = &c.style;
        let margin_row = cs.margin_for_axis(FlexDirection::Row, width, dir);
        let margin_column = cs.margin_for_axis(FlexDirection::Column, width, dir);

        // Size from the style, or from both insets when they pin each side.
        let mut child_width = UNDEFINED;
        if cs.is_dimension_defined(FlexDirection::Row, width) {
            child_width = cs.resolved_dimension(Dimension::Width).resolve(width) + margin_row;
        } else if cs.is_leading_position_defined(FlexDirection::Row, dir)
            && cs.is_trailing_position_defined(FlexDirection::Row, dir)
        {
            let inner = container_width
                - parent.leading_border(FlexDirection::Row, dir)
                - parent.trailing_border(FlexDirection::Row, dir)
                - cs.leading_position(FlexDirection::Row, width, dir)
                - cs.trailing_position(FlexDirection::Row, width, dir);
            child_width = cs.bound_axis(FlexDirection::Row, inner, width, width, dir);
        }

        let mut child_height = UNDEFINED;
        if cs.is_dimension_defined(FlexDirection::Column, height) {
            child_height = cs.resolved_dimension(Dimension::Height).resolve(height) + margin_column;
        } else if cs.is_leading_position_defined(FlexDirection::Column, dir)
            && cs.is_trailing_position_defined(FlexDirection::Column, dir)
        {
            let inner = container_height
                - parent.leading_border(FlexDirection::Column, dir)
                - parent.trailing_border(FlexDirection::Column, dir)
                - cs.leading_position(FlexDirection::Column, height, dir)
                - cs.trailing_position(FlexDirection::Column, height, dir);
            child_height = cs.bound_axis(FlexDirection::Column, inner, height, width, dir);
        }

        // With exactly one side known, the aspect ratio gives the other.
        if child_width.is_undefined() != child_height.is_undefined() {
            if let Some(ratio) = cs.aspect_ratio() {
                if child_width.is_undefined() {
                    child_width = margin_row + (child_height - margin_column) * ratio;
                } else {
                    child_height = margin_column + (child_width - margin_row) / ratio;
                }
            }
        }

        if child_width.is_undefined() || child_height.is_undefined() {
            let mut child_width_mode = mode_for(child_width);
            let child_height_mode = mode_for(child_height);

            // In a column, let content such as text wrap at the container's width.
            if !c.is_main_row
                && child_width.is_undefined()
                && width_mode != MeasureMode::Undefined
                && width.is_defined()
                && width > 0.0
            {
                child_width = width;
                child_width_mode = MeasureMode::AtMost;
            }

            self.layout_node(
                child,
                child_width,
                child_height,
                dir,
                child_width_mode,
                child_height_mode,
                width,
                height,
                false,
                "abs-measure",
            );
            child_width = self.measured(child, FlexDirection::Row) + margin_row;
            child_height = self.measured(child, FlexDirection::Column) + margin_column;
        }

        self.layout_node(
            child,
            child_width,
            child_height,
            dir,
            MeasureMode::Exactly,
            MeasureMode::Exactly,
            width,
            height,
            true,
            "abs-layout",
        );

        // Without a leading inset, the trailing inset or the container's
        // alignment decides the offset.
        let main_size = if c.is_main_row { width } else { height };
        let main = c.main_axis;
        let lead = main.leading_edge() as usize;
        if cs.is_trailing_position_defined(main, dir)
            && !cs.is_leading_position_defined(main, dir)
        {
            let offset = self.measured(c.id, main)
                - self.measured(child, main)
                - parent.trailing_border(main, dir)
                - cs.trailing_margin(main, width, dir)
                - cs.trailing_position(main, main_size, dir);
            self.position_mut(child)[lead] = offset;
        } else if !cs.is_leading_position_defined(main, dir) {
            let free = self.measured(c.id, main) - self.measured(child, main);
            match parent.justify_content {
                Justify::Center => self.position_mut(child)[lead] = free / 2.0,
                Justify::FlexEnd => self.position_mut(child)[lead] = free,
                _ => {}
            }
        }

        let cross_size = if c.is_main_row { height } else { width };
        let cross = c.cross_axis;
        let lead = cross.leading_edge() as usize;
        if cs.is_trailing_position_defined(cross, dir)
            && !cs.is_leading_position_defined(cross, dir)
        {
            let offset = self.measured(c.id, cross)
                - self.measured(child, cross)
                - parent.trailing_border(cross, dir)
                - cs.trailing_margin(cross, width, dir)
                - cs.trailing_position(cross, cross_size, dir);
            self.position_mut(child)[lead] = offset;
        } else if !cs.is_leading_position_defined(cross, dir) {
            let free = self.measured(c.id, cross) - self.measured(child, cross);
            match align_item(parent, &cs) {
                Align::Center => self.position_mut(child)[lead] = free / 2.0,
                Align::FlexEnd => self.position_mut(child)[lead] = free,
                _ => {}
            }
        }
    }
}
