//! Core types for spark-flex.
//!
//! These are the values every other module speaks: the style enums, the
//! length [`Value`], measurement modes, and the float helpers that give
//! "undefined" its meaning.
//!
//! Undefined lengths are carried as `NaN` ([`UNDEFINED`]) inside the
//! algorithm. NaN propagates through arithmetic the same way an unknown
//! length does, and is only replaced by zero at the point a concrete
//! number is needed.

use std::fmt;

// =============================================================================
// Undefined floats
// =============================================================================

/// Sentinel for "no value" in computed lengths.
pub const UNDEFINED: f32 = f32::NAN;

const EPSILON: f32 = 0.0001;

/// Compare two computed lengths, treating two undefined values as equal.
#[inline]
pub fn floats_equal(a: f32, b: f32) -> bool {
    if a.is_nan() {
        return b.is_nan();
    }
    (a - b).abs() < EPSILON
}

/// Helpers for the NaN-as-undefined convention.
pub(crate) trait FloatExt: Copy {
    fn is_undefined(self) -> bool;

    fn is_defined(self) -> bool {
        !self.is_undefined()
    }

    /// Substitute zero for an undefined value.
    fn or_zero(self) -> f32;
}

impl FloatExt for f32 {
    #[inline]
    fn is_undefined(self) -> bool {
        self.is_nan()
    }

    #[inline]
    fn or_zero(self) -> f32 {
        if self.is_nan() { 0.0 } else { self }
    }
}

// =============================================================================
// Value - A length as authored in a style
// =============================================================================

/// A style length.
///
/// - `Undefined`: not set; resolves to nothing
/// - `Auto`: let the algorithm decide (width/height/flex-basis/margin/position only)
/// - `Point(n)`: absolute length
/// - `Percent(n)`: percentage of the parent's matching dimension (0-100)
///
/// # Examples
///
/// ```
/// use spark_flex::Value;
///
/// let width = Value::point(120.0);
/// let half = Value::percent(50.0);
/// assert_eq!(half.resolve(200.0), 100.0);
/// assert!(Value::Auto.resolve(200.0).is_nan());
/// assert_eq!(width.resolve(f32::NAN), 120.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Value {
    #[default]
    Undefined,
    Auto,
    Point(f32),
    Percent(f32),
}

impl Value {
    pub const ZERO: Self = Self::Point(0.0);

    /// A point length. `NaN` collapses to [`Value::Undefined`].
    pub fn point(value: f32) -> Self {
        if value.is_nan() { Self::Undefined } else { Self::Point(value) }
    }

    /// A percentage length. `NaN` collapses to [`Value::Undefined`].
    pub fn percent(value: f32) -> Self {
        if value.is_nan() { Self::Undefined } else { Self::Percent(value) }
    }

    pub const fn unit(&self) -> Unit {
        match self {
            Self::Undefined => Unit::Undefined,
            Self::Auto => Unit::Auto,
            Self::Point(_) => Unit::Point,
            Self::Percent(_) => Unit::Percent,
        }
    }

    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub const fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Resolve against the parent's size along the same axis.
    ///
    /// Percentages of an undefined parent size stay undefined.
    #[inline]
    pub fn resolve(&self, parent_size: f32) -> f32 {
        match *self {
            Self::Point(v) => v,
            Self::Percent(p) => p * parent_size / 100.0,
            Self::Undefined | Self::Auto => UNDEFINED,
        }
    }

    /// Resolve a margin: `auto` and anything unresolvable count as zero.
    #[inline]
    pub fn resolve_margin(&self, parent_size: f32) -> f32 {
        match self {
            Self::Auto => 0.0,
            other => other.resolve(parent_size).or_zero(),
        }
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::point(value)
    }
}

/// Unit tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Unit {
    #[default]
    Undefined = 0,
    Point = 1,
    Percent = 2,
    Auto = 3,
}

// =============================================================================
// Size
// =============================================================================

/// Width/height pair, as returned by a measure function.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Self = Self { width: 0.0, height: 0.0 };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

// =============================================================================
// Style Enums
// =============================================================================

/// Implements `From<u8>` (unknown values fall back to the default), `name()`
/// and `Display` for a fieldless `#[repr(u8)]` enum.
macro_rules! style_enum {
    ($ty:ident { $($variant:ident = $value:literal => $name:literal),+ $(,)? }) => {
        impl From<u8> for $ty {
            fn from(value: u8) -> Self {
                match value {
                    $($value => Self::$variant,)+
                    _ => Self::default(),
                }
            }
        }

        impl $ty {
            /// Lowercase hyphenated name, for diagnostics.
            pub const fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

/// Text/layout direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Direction {
    #[default]
    Inherit = 0,
    Ltr = 1,
    Rtl = 2,
}

style_enum!(Direction { Inherit = 0 => "inherit", Ltr = 1 => "ltr", Rtl = 2 => "rtl" });

impl Direction {
    /// Resolve `Inherit` against the direction in effect in the parent.
    #[inline]
    pub const fn resolve(self, parent: Direction) -> Direction {
        match self {
            Self::Inherit => match parent {
                Self::Inherit => Self::Ltr,
                other => other,
            },
            other => other,
        }
    }
}

/// Main axis of a flex container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum FlexDirection {
    #[default]
    Column = 0,
    ColumnReverse = 1,
    Row = 2,
    RowReverse = 3,
}

style_enum!(FlexDirection {
    Column = 0 => "column",
    ColumnReverse = 1 => "column-reverse",
    Row = 2 => "row",
    RowReverse = 3 => "row-reverse",
});

impl FlexDirection {
    /// Check if this is a row direction (Row or RowReverse).
    pub const fn is_row(&self) -> bool {
        matches!(self, Self::Row | Self::RowReverse)
    }

    /// Check if this is a column direction (Column or ColumnReverse).
    pub const fn is_column(&self) -> bool {
        matches!(self, Self::Column | Self::ColumnReverse)
    }

    /// Check if this is a reverse direction (ColumnReverse or RowReverse).
    pub const fn is_reverse(&self) -> bool {
        matches!(self, Self::ColumnReverse | Self::RowReverse)
    }

    /// Apply the text direction: right-to-left flips the row axis.
    pub const fn resolve(self, direction: Direction) -> Self {
        match (direction, self) {
            (Direction::Rtl, Self::Row) => Self::RowReverse,
            (Direction::Rtl, Self::RowReverse) => Self::Row,
            (_, other) => other,
        }
    }

    /// The cross axis for this (already resolved) main axis.
    pub const fn cross(self, direction: Direction) -> Self {
        if self.is_column() {
            Self::Row.resolve(direction)
        } else {
            Self::Column
        }
    }

    /// Physical edge where layout along this axis starts.
    pub const fn leading_edge(&self) -> Edge {
        match self {
            Self::Column => Edge::Top,
            Self::ColumnReverse => Edge::Bottom,
            Self::Row => Edge::Left,
            Self::RowReverse => Edge::Right,
        }
    }

    /// Physical edge where layout along this axis ends.
    pub const fn trailing_edge(&self) -> Edge {
        match self {
            Self::Column => Edge::Bottom,
            Self::ColumnReverse => Edge::Top,
            Self::Row => Edge::Right,
            Self::RowReverse => Edge::Left,
        }
    }

    pub const fn dimension(&self) -> Dimension {
        if self.is_row() { Dimension::Width } else { Dimension::Height }
    }
}

/// Justify content (main axis distribution).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Justify {
    #[default]
    FlexStart = 0,
    Center = 1,
    FlexEnd = 2,
    SpaceBetween = 3,
    SpaceAround = 4,
    SpaceEvenly = 5,
}

style_enum!(Justify {
    FlexStart = 0 => "flex-start",
    Center = 1 => "center",
    FlexEnd = 2 => "flex-end",
    SpaceBetween = 3 => "space-between",
    SpaceAround = 4 => "space-around",
    SpaceEvenly = 5 => "space-evenly",
});

/// Alignment shared by align-items, align-self and align-content.
///
/// `Auto` is only meaningful for align-self (inherit the parent's
/// align-items); the space-* variants only for align-content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Align {
    #[default]
    Auto = 0,
    FlexStart = 1,
    Center = 2,
    FlexEnd = 3,
    Stretch = 4,
    Baseline = 5,
    SpaceBetween = 6,
    SpaceAround = 7,
}

style_enum!(Align {
    Auto = 0 => "auto",
    FlexStart = 1 => "flex-start",
    Center = 2 => "center",
    FlexEnd = 3 => "flex-end",
    Stretch = 4 => "stretch",
    Baseline = 5 => "baseline",
    SpaceBetween = 6 => "space-between",
    SpaceAround = 7 => "space-around",
});

/// Position type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum PositionType {
    #[default]
    Relative = 0,
    Absolute = 1,
}

style_enum!(PositionType { Relative = 0 => "relative", Absolute = 1 => "absolute" });

/// Flex wrap behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Wrap {
    #[default]
    NoWrap = 0,
    Wrap = 1,
    WrapReverse = 2,
}

style_enum!(Wrap {
    NoWrap = 0 => "no-wrap",
    Wrap = 1 => "wrap",
    WrapReverse = 2 => "wrap-reverse",
});

/// Overflow behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Overflow {
    #[default]
    Visible = 0,
    Hidden = 1,
    Scroll = 2,
}

style_enum!(Overflow { Visible = 0 => "visible", Hidden = 1 => "hidden", Scroll = 2 => "scroll" });

/// Whether a node participates in layout at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Display {
    #[default]
    Flex = 0,
    None = 1,
}

style_enum!(Display { Flex = 0 => "flex", None = 1 => "none" });

/// Box edges, physical and logical, plus the shorthands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Edge {
    #[default]
    Left = 0,
    Top = 1,
    Right = 2,
    Bottom = 3,
    Start = 4,
    End = 5,
    Horizontal = 6,
    Vertical = 7,
    All = 8,
}

style_enum!(Edge {
    Left = 0 => "left",
    Top = 1 => "top",
    Right = 2 => "right",
    Bottom = 3 => "bottom",
    Start = 4 => "start",
    End = 5 => "end",
    Horizontal = 6 => "horizontal",
    Vertical = 7 => "vertical",
    All = 8 => "all",
});

impl Edge {
    pub const PHYSICAL: [Edge; 4] = [Edge::Left, Edge::Top, Edge::Right, Edge::Bottom];

    /// Map an edge to its physical counterpart under `direction`.
    ///
    /// Returns `None` for the shorthands, which have no single physical edge.
    pub const fn to_physical(self, direction: Direction) -> Option<Edge> {
        let rtl = matches!(direction, Direction::Rtl);
        match self {
            Self::Left | Self::Top | Self::Right | Self::Bottom => Some(self),
            Self::Start => Some(if rtl { Self::Right } else { Self::Left }),
            Self::End => Some(if rtl { Self::Left } else { Self::Right }),
            Self::Horizontal | Self::Vertical | Self::All => None,
        }
    }
}

/// Physical axis dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Dimension {
    #[default]
    Width = 0,
    Height = 1,
}

style_enum!(Dimension { Width = 0 => "width", Height = 1 => "height" });

/// Constraint semantics handed to a measure function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum MeasureMode {
    /// No constraint; the available size is meaningless.
    #[default]
    Undefined = 0,
    /// The result must be exactly the available size.
    Exactly = 1,
    /// The result may not exceed the available size.
    AtMost = 2,
}

style_enum!(MeasureMode {
    Undefined = 0 => "undefined",
    Exactly = 1 => "exactly",
    AtMost = 2 => "at-most",
});

/// Node kind. Text nodes are never rounded down to avoid clipping glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum NodeType {
    #[default]
    Default = 0,
    Text = 1,
}

style_enum!(NodeType { Default = 0 => "default", Text = 1 => "text" });
