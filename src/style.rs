//! Style - The layout intent of one node.
//!
//! A `Style` is plain data: the layout engine reads it, never writes it.
//! It mirrors the property set of a CSS flex item/container plus a few
//! engine-specific knobs (`aspect_ratio`, the `flex` shorthand).
//!
//! # Property Categories
//!
//! - **Container**: direction, flex_direction, justify_content, align_items,
//!   align_content, flex_wrap
//! - **Item**: flex, flex_grow, flex_shrink, flex_basis, align_self, position_type
//! - **Dimensions**: width, height, min/max of each, aspect_ratio
//! - **Edges**: margin, padding, border, position (per-edge, with shorthands)
//! - **Other**: overflow, display

use crate::types::{
    Align, Dimension, Direction, Display, Edge, FlexDirection, FloatExt, Justify, MeasureMode,
    Overflow, PositionType, Value, Wrap,
};

// =============================================================================
// EDGES
// =============================================================================

/// Nine edge slots: four physical, two logical, two axis shorthands, and `all`.
///
/// Lookup goes from most to least specific: the physical edge, then the
/// logical edge that maps onto it under the current direction, then the
/// axis shorthand, then `all`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edges {
    values: [Value; 9],
}

impl Default for Edges {
    fn default() -> Self {
        Self::new()
    }
}

impl Edges {
    pub const fn new() -> Self {
        Self { values: [Value::Undefined; 9] }
    }

    /// The value stored in one slot, without any fallback.
    #[inline]
    pub fn get(&self, edge: Edge) -> Value {
        self.values[edge as usize]
    }

    #[inline]
    pub fn set(&mut self, edge: Edge, value: impl Into<Value>) {
        self.values[edge as usize] = value.into();
    }

    /// Builder-style [`Edges::set`].
    pub fn with(mut self, edge: Edge, value: impl Into<Value>) -> Self {
        self.set(edge, value);
        self
    }

    /// Effective value for a physical edge.
    ///
    /// Logical and shorthand edges passed here are first mapped through
    /// `direction`; the shorthands themselves resolve to their own slot
    /// falling back to `all`.
    pub fn resolve(&self, edge: Edge, direction: Direction) -> Value {
        let Some(physical) = edge.to_physical(direction) else {
            let own = self.get(edge);
            return if own.is_undefined() { self.get(Edge::All) } else { own };
        };

        let own = self.get(physical);
        if !own.is_undefined() {
            return own;
        }

        let rtl = direction == Direction::Rtl;
        let logical = match physical {
            Edge::Left => Some(if rtl { Edge::End } else { Edge::Start }),
            Edge::Right => Some(if rtl { Edge::Start } else { Edge::End }),
            _ => None,
        };
        if let Some(logical) = logical {
            let value = self.get(logical);
            if !value.is_undefined() {
                return value;
            }
        }

        let axis = match physical {
            Edge::Left | Edge::Right => self.get(Edge::Horizontal),
            _ => self.get(Edge::Vertical),
        };
        if !axis.is_undefined() {
            return axis;
        }

        self.get(Edge::All)
    }
}

// =============================================================================
// STYLE
// =============================================================================

/// Layout properties of a single node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub direction: Direction,
    pub flex_direction: FlexDirection,
    pub justify_content: Justify,
    pub align_content: Align,
    pub align_items: Align,
    pub align_self: Align,
    pub position_type: PositionType,
    pub flex_wrap: Wrap,
    pub overflow: Overflow,
    pub display: Display,

    /// Shorthand: positive acts as grow, negative as shrink (non-web defaults).
    pub flex: Option<f32>,
    pub flex_grow: Option<f32>,
    pub flex_shrink: Option<f32>,
    pub flex_basis: Value,

    pub margin: Edges,
    pub position: Edges,
    pub padding: Edges,
    /// Border widths; only point values are meaningful.
    pub border: Edges,

    pub width: Value,
    pub height: Value,
    pub min_width: Value,
    pub min_height: Value,
    pub max_width: Value,
    pub max_height: Value,

    /// Width / height.
    pub aspect_ratio: Option<f32>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            direction: Direction::Inherit,
            flex_direction: FlexDirection::Column,
            justify_content: Justify::FlexStart,
            align_content: Align::FlexStart,
            align_items: Align::Stretch,
            align_self: Align::Auto,
            position_type: PositionType::Relative,
            flex_wrap: Wrap::NoWrap,
            overflow: Overflow::Visible,
            display: Display::Flex,

            flex: None,
            flex_grow: None,
            flex_shrink: None,
            flex_basis: Value::Auto,

            margin: Edges::new(),
            position: Edges::new(),
            padding: Edges::new(),
            border: Edges::new(),

            width: Value::Auto,
            height: Value::Auto,
            min_width: Value::Undefined,
            min_height: Value::Undefined,
            max_width: Value::Undefined,
            max_height: Value::Undefined,

            aspect_ratio: None,
        }
    }
}

pub(crate) const DEFAULT_FLEX_GROW: f32 = 0.0;
pub(crate) const DEFAULT_FLEX_SHRINK: f32 = 0.0;
pub(crate) const WEB_DEFAULT_FLEX_SHRINK: f32 = 1.0;

impl Style {
    /// Defaults matching the CSS initial values (row direction, stretched lines).
    pub fn web() -> Self {
        Self {
            flex_direction: FlexDirection::Row,
            align_content: Align::Stretch,
            ..Self::default()
        }
    }

    // =========================================================================
    // Dimensions
    // =========================================================================

    pub fn dimension(&self, dim: Dimension) -> Value {
        match dim {
            Dimension::Width => self.width,
            Dimension::Height => self.height,
        }
    }

    pub fn min_dimension(&self, dim: Dimension) -> Value {
        match dim {
            Dimension::Width => self.min_width,
            Dimension::Height => self.min_height,
        }
    }

    pub fn max_dimension(&self, dim: Dimension) -> Value {
        match dim {
            Dimension::Width => self.max_width,
            Dimension::Height => self.max_height,
        }
    }

    /// The size used for layout: a min equal to the max pins the dimension.
    pub(crate) fn resolved_dimension(&self, dim: Dimension) -> Value {
        let max = self.max_dimension(dim);
        if !max.is_undefined() && max == self.min_dimension(dim) {
            max
        } else {
            self.dimension(dim)
        }
    }

    /// Whether the resolved size along `axis` is usable against `parent_size`.
    pub(crate) fn is_dimension_defined(&self, axis: FlexDirection, parent_size: f32) -> bool {
        match self.resolved_dimension(axis.dimension()) {
            Value::Point(v) => v >= 0.0,
            Value::Percent(p) => p >= 0.0 && parent_size.is_defined(),
            Value::Auto | Value::Undefined => false,
        }
    }

    /// Aspect ratio, ignoring values that cannot be divided by.
    pub(crate) fn aspect_ratio(&self) -> Option<f32> {
        self.aspect_ratio.filter(|ratio| ratio.is_finite() && *ratio > 0.0)
    }

    // =========================================================================
    // Flex factors
    // =========================================================================

    /// Grow factor; a root node never grows.
    pub(crate) fn resolve_flex_grow(&self, has_parent: bool) -> f32 {
        if !has_parent {
            return 0.0;
        }
        if let Some(grow) = self.flex_grow {
            return grow;
        }
        match self.flex {
            Some(flex) if flex > 0.0 => flex,
            _ => DEFAULT_FLEX_GROW,
        }
    }

    /// Shrink factor; a root node never shrinks.
    pub(crate) fn resolve_flex_shrink(&self, has_parent: bool, web_defaults: bool) -> f32 {
        if !has_parent {
            return 0.0;
        }
        if let Some(shrink) = self.flex_shrink {
            return shrink;
        }
        match self.flex {
            Some(flex) if !web_defaults && flex < 0.0 => -flex,
            _ if web_defaults => WEB_DEFAULT_FLEX_SHRINK,
            _ => DEFAULT_FLEX_SHRINK,
        }
    }

    pub(crate) fn resolve_flex_basis(&self, web_defaults: bool) -> Value {
        if !matches!(self.flex_basis, Value::Auto | Value::Undefined) {
            return self.flex_basis;
        }
        match self.flex {
            Some(flex) if flex > 0.0 => {
                if web_defaults { Value::Auto } else { Value::ZERO }
            }
            _ => Value::Auto,
        }
    }

    pub(crate) fn is_flexible(&self, has_parent: bool, web_defaults: bool) -> bool {
        self.position_type == PositionType::Relative
            && (self.resolve_flex_grow(has_parent) != 0.0
                || self.resolve_flex_shrink(has_parent, web_defaults) != 0.0)
    }

    // =========================================================================
    // Margins
    // =========================================================================

    #[inline]
    pub(crate) fn leading_margin(
        &self,
        axis: FlexDirection,
        width_size: f32,
        dir: Direction,
    ) -> f32 {
        let dir = self.direction.resolve(dir);
        self.margin.resolve(axis.leading_edge(), dir).resolve_margin(width_size)
    }

    #[inline]
    pub(crate) fn trailing_margin(
        &self,
        axis: FlexDirection,
        width_size: f32,
        dir: Direction,
    ) -> f32 {
        let dir = self.direction.resolve(dir);
        self.margin.resolve(axis.trailing_edge(), dir).resolve_margin(width_size)
    }

    #[inline]
    pub(crate) fn margin_for_axis(
        &self,
        axis: FlexDirection,
        width_size: f32,
        dir: Direction,
    ) -> f32 {
        self.leading_margin(axis, width_size, dir) + self.trailing_margin(axis, width_size, dir)
    }

    pub(crate) fn leading_margin_is_auto(&self, axis: FlexDirection, dir: Direction) -> bool {
        let dir = self.direction.resolve(dir);
        self.margin.resolve(axis.leading_edge(), dir).is_auto()
    }

    pub(crate) fn trailing_margin_is_auto(&self, axis: FlexDirection, dir: Direction) -> bool {
        let dir = self.direction.resolve(dir);
        self.margin.resolve(axis.trailing_edge(), dir).is_auto()
    }

    // =========================================================================
    // Padding and border
    // =========================================================================

    #[inline]
    pub(crate) fn padding_at(&self, edge: Edge, width_size: f32, dir: Direction) -> f32 {
        let dir = self.direction.resolve(dir);
        self.padding.resolve(edge, dir).resolve(width_size).or_zero().max(0.0)
    }

    #[inline]
    pub(crate) fn border_at(&self, edge: Edge, dir: Direction) -> f32 {
        let dir = self.direction.resolve(dir);
        match self.border.resolve(edge, dir) {
            Value::Point(v) => v.max(0.0),
            _ => 0.0,
        }
    }

    #[inline]
    pub(crate) fn leading_border(&self, axis: FlexDirection, dir: Direction) -> f32 {
        self.border_at(axis.leading_edge(), dir)
    }

    #[inline]
    pub(crate) fn trailing_border(&self, axis: FlexDirection, dir: Direction) -> f32 {
        self.border_at(axis.trailing_edge(), dir)
    }

    #[inline]
    pub(crate) fn leading_padding_and_border(
        &self,
        axis: FlexDirection,
        width_size: f32,
        dir: Direction,
    ) -> f32 {
        self.padding_at(axis.leading_edge(), width_size, dir) + self.leading_border(axis, dir)
    }

    #[inline]
    pub(crate) fn trailing_padding_and_border(
        &self,
        axis: FlexDirection,
        width_size: f32,
        dir: Direction,
    ) -> f32 {
        self.padding_at(axis.trailing_edge(), width_size, dir) + self.trailing_border(axis, dir)
    }

    #[inline]
    pub(crate) fn padding_and_border_for_axis(
        &self,
        axis: FlexDirection,
        width_size: f32,
        dir: Direction,
    ) -> f32 {
        self.leading_padding_and_border(axis, width_size, dir)
            + self.trailing_padding_and_border(axis, width_size, dir)
    }

    // =========================================================================
    // Position offsets
    // =========================================================================

    pub(crate) fn is_leading_position_defined(&self, axis: FlexDirection, dir: Direction) -> bool {
        let dir = self.direction.resolve(dir);
        !self.position.resolve(axis.leading_edge(), dir).is_undefined()
    }

    pub(crate) fn is_trailing_position_defined(&self, axis: FlexDirection, dir: Direction) -> bool {
        let dir = self.direction.resolve(dir);
        !self.position.resolve(axis.trailing_edge(), dir).is_undefined()
    }

    pub(crate) fn leading_position(
        &self,
        axis: FlexDirection,
        axis_size: f32,
        dir: Direction,
    ) -> f32 {
        let dir = self.direction.resolve(dir);
        self.position.resolve(axis.leading_edge(), dir).resolve(axis_size).or_zero()
    }

    pub(crate) fn trailing_position(
        &self,
        axis: FlexDirection,
        axis_size: f32,
        dir: Direction,
    ) -> f32 {
        let dir = self.direction.resolve(dir);
        self.position.resolve(axis.trailing_edge(), dir).resolve(axis_size).or_zero()
    }

    /// Offset applied to a relatively positioned node along `axis`.
    pub(crate) fn relative_position(
        &self,
        axis: FlexDirection,
        axis_size: f32,
        dir: Direction,
    ) -> f32 {
        if self.is_leading_position_defined(axis, dir) {
            self.leading_position(axis, axis_size, dir)
        } else {
            -self.trailing_position(axis, axis_size, dir)
        }
    }

    // =========================================================================
    // Clamping
    // =========================================================================

    /// Clamp `value` into [min, max] for `axis`, ignoring unset or negative bounds.
    pub(crate) fn bound_axis_within_min_and_max(
        &self,
        axis: FlexDirection,
        value: f32,
        axis_size: f32,
    ) -> f32 {
        let dim = axis.dimension();
        let min = self.min_dimension(dim).resolve(axis_size);
        let max = self.max_dimension(dim).resolve(axis_size);

        let mut bound = value;
        if max.is_defined() && max >= 0.0 && bound > max {
            bound = max;
        }
        if min.is_defined() && min >= 0.0 && bound < min {
            bound = min;
        }
        bound
    }

    /// Like [`Style::bound_axis_within_min_and_max`], but never below padding + border.
    pub(crate) fn bound_axis(
        &self,
        axis: FlexDirection,
        value: f32,
        axis_size: f32,
        width_size: f32,
        dir: Direction,
    ) -> f32 {
        self.bound_axis_within_min_and_max(axis, value, axis_size)
            .max(self.padding_and_border_for_axis(axis, width_size, dir))
    }

    /// Tighten a child's measure constraint with its own max size.
    pub(crate) fn constrain_max_size_for_mode(
        &self,
        axis: FlexDirection,
        parent_axis_size: f32,
        parent_width: f32,
        dir: Direction,
        mode: &mut MeasureMode,
        size: &mut f32,
    ) {
        let max_size = self.max_dimension(axis.dimension()).resolve(parent_axis_size)
            + self.margin_for_axis(axis, parent_width, dir);
        match mode {
            MeasureMode::Exactly | MeasureMode::AtMost => {
                if max_size.is_defined() && *size >= max_size {
                    *size = max_size;
                }
            }
            MeasureMode::Undefined => {
                if max_size.is_defined() {
                    *mode = MeasureMode::AtMost;
                    *size = max_size;
                }
            }
        }
    }
}

/// The alignment actually used for `child` inside `parent`.
///
/// Baseline alignment has no meaning in a column, where it degrades to start.
pub(crate) fn align_item(parent: &Style, child: &Style) -> Align {
    let align = if child.align_self == Align::Auto { parent.align_items } else { child.align_self };
    if align == Align::Baseline && parent.flex_direction.is_column() {
        return Align::FlexStart;
    }
    align
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UNDEFINED;

    #[test]
    fn test_edge_specificity() {
        let edges = Edges::new()
            .with(Edge::All, 1.0)
            .with(Edge::Horizontal, 2.0)
            .with(Edge::Start, 3.0)
            .with(Edge::Left, 4.0);

        // Physical beats logical beats axis beats all
        assert_eq!(edges.resolve(Edge::Left, Direction::Ltr), Value::Point(4.0));
        assert_eq!(edges.resolve(Edge::Right, Direction::Ltr), Value::Point(2.0));
        assert_eq!(edges.resolve(Edge::Right, Direction::Rtl), Value::Point(3.0));
        assert_eq!(edges.resolve(Edge::Top, Direction::Ltr), Value::Point(1.0));
    }

    #[test]
    fn test_edge_unset_is_undefined() {
        let edges = Edges::new();
        assert_eq!(edges.resolve(Edge::Bottom, Direction::Ltr), Value::Undefined);
        let edges = edges.with(Edge::Vertical, Value::percent(10.0));
        assert_eq!(edges.resolve(Edge::Bottom, Direction::Ltr), Value::Percent(10.0));
        assert_eq!(edges.resolve(Edge::Left, Direction::Ltr), Value::Undefined);
    }

    #[test]
    fn test_flex_shorthand() {
        let style = Style { flex: Some(2.0), ..Style::default() };
        assert_eq!(style.resolve_flex_grow(true), 2.0);
        assert_eq!(style.resolve_flex_shrink(true, false), 0.0);
        assert_eq!(style.resolve_flex_basis(false), Value::ZERO);
        assert_eq!(style.resolve_flex_basis(true), Value::Auto);

        let style = Style { flex: Some(-1.5), ..Style::default() };
        assert_eq!(style.resolve_flex_grow(true), 0.0);
        assert_eq!(style.resolve_flex_shrink(true, false), 1.5);
        assert_eq!(style.resolve_flex_shrink(true, true), 1.0);
    }

    #[test]
    fn test_root_never_flexes() {
        let style = Style { flex_grow: Some(1.0), flex_shrink: Some(1.0), ..Style::default() };
        assert_eq!(style.resolve_flex_grow(false), 0.0);
        assert_eq!(style.resolve_flex_shrink(false, true), 0.0);
        assert!(!style.is_flexible(false, false));
        assert!(style.is_flexible(true, false));
    }

    #[test]
    fn test_min_equals_max_pins_dimension() {
        let style = Style {
            width: Value::point(10.0),
            min_width: Value::point(40.0),
            max_width: Value::point(40.0),
            ..Style::default()
        };
        assert_eq!(style.resolved_dimension(Dimension::Width), Value::Point(40.0));
        assert_eq!(style.resolved_dimension(Dimension::Height), Value::Auto);
    }

    #[test]
    fn test_bound_axis_respects_padding_and_border() {
        let mut style = Style { max_width: Value::point(5.0), ..Style::default() };
        style.padding.set(Edge::Horizontal, 4.0);
        style.border.set(Edge::Left, 1.0);
        assert_eq!(style.bound_axis_within_min_and_max(FlexDirection::Row, 20.0, 100.0), 5.0);
        assert_eq!(style.bound_axis(FlexDirection::Row, 20.0, 100.0, 100.0, Direction::Ltr), 9.0);
    }

    #[test]
    fn test_percent_dimension_needs_parent() {
        let style = Style { width: Value::percent(50.0), ..Style::default() };
        assert!(style.is_dimension_defined(FlexDirection::Row, 200.0));
        assert!(!style.is_dimension_defined(FlexDirection::Row, UNDEFINED));
        assert!(!style.is_dimension_defined(FlexDirection::Column, 200.0));
    }

    #[test]
    fn test_align_item_baseline_in_column() {
        let parent = Style { align_items: Align::Baseline, ..Style::default() };
        assert_eq!(align_item(&parent, &Style::default()), Align::FlexStart);
        let parent = Style { flex_direction: FlexDirection::Row, ..parent };
        assert_eq!(align_item(&parent, &Style::default()), Align::Baseline);
        let child = Style { align_self: Align::Center, ..Style::default() };
        assert_eq!(align_item(&parent, &child), Align::Center);
    }

    #[test]
    fn test_constrain_max_size_for_mode() {
        let style = Style { max_width: Value::point(30.0), ..Style::default() };
        let mut mode = MeasureMode::Undefined;
        let mut size = UNDEFINED;
        style.constrain_max_size_for_mode(
            FlexDirection::Row,
            100.0,
            100.0,
            Direction::Ltr,
            &mut mode,
            &mut size,
        );
        assert_eq!(mode, MeasureMode::AtMost);
        assert_eq!(size, 30.0);

        let mut mode = MeasureMode::Exactly;
        let mut size = 20.0;
        style.constrain_max_size_for_mode(
            FlexDirection::Row,
            100.0,
            100.0,
            Direction::Ltr,
            &mut mode,
            &mut size,
        );
        assert_eq!(mode, MeasureMode::Exactly);
        assert_eq!(size, 20.0);
    }
}
