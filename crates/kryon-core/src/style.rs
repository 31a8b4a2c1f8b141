// crates/kryon-core/src/style.rs

use crate::{
    Align, Dimension, Direction, Edge, FlexDirection, Justify, KryonError, Overflow,
    PositionType, Result, Value, Wrap,
};

/// Nine-slot edge group (margin, position, padding or border).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edges([Value; Edge::COUNT]);

impl Default for Edges {
    fn default() -> Self {
        Self([Value::UNDEFINED; Edge::COUNT])
    }
}

impl Edges {
    /// The raw slot, without any shorthand fallback.
    pub fn get(&self, edge: Edge) -> Value {
        self.0[edge.index()]
    }

    pub fn get_mut(&mut self, edge: Edge) -> &mut Value {
        &mut self.0[edge.index()]
    }

    /// Resolve a logical edge through its shorthands.
    ///
    /// Lookup order is the explicit slot, then `Vertical` (for top/bottom) or
    /// `Horizontal` (for left/right/start/end), then `All`. Start and end never
    /// fall back to `default`; they stay undefined so the physical edge wins.
    pub fn computed(&self, edge: Edge, default: Value) -> Result<Value> {
        if edge.is_shorthand() {
            return Err(KryonError::MultiEdgeShorthand(edge));
        }

        let explicit = self.get(edge);
        if explicit.is_defined() {
            return Ok(explicit);
        }

        let axis_group = match edge {
            Edge::Top | Edge::Bottom => self.get(Edge::Vertical),
            _ => self.get(Edge::Horizontal),
        };
        if axis_group.is_defined() {
            return Ok(axis_group);
        }

        let all = self.get(Edge::All);
        if all.is_defined() {
            return Ok(all);
        }

        if matches!(edge, Edge::Start | Edge::End) {
            return Ok(Value::UNDEFINED);
        }

        Ok(default)
    }
}

/// Per-node style record.
#[derive(Debug, Clone, PartialEq)]
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
    /// `flex` shorthand; NaN when unset.
    pub flex: f64,
    pub flex_grow: f64,
    pub flex_shrink: f64,
    pub flex_basis: Value,
    pub margin: Edges,
    pub position: Edges,
    pub padding: Edges,
    pub border: Edges,
    pub dimensions: [Value; 2],
    pub min_dimensions: [Value; 2],
    pub max_dimensions: [Value; 2],
    pub aspect_ratio: f64,
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
            flex: f64::NAN,
            flex_grow: f64::NAN,
            flex_shrink: f64::NAN,
            flex_basis: Value::UNDEFINED,
            margin: Edges::default(),
            position: Edges::default(),
            padding: Edges::default(),
            border: Edges::default(),
            dimensions: [Value::UNDEFINED; 2],
            min_dimensions: [Value::UNDEFINED; 2],
            max_dimensions: [Value::UNDEFINED; 2],
            aspect_ratio: f64::NAN,
        }
    }
}

impl Style {
    pub fn dimension(&self, dimension: Dimension) -> Value {
        self.dimensions[dimension.index()]
    }

    pub fn min_dimension(&self, dimension: Dimension) -> Value {
        self.min_dimensions[dimension.index()]
    }

    pub fn max_dimension(&self, dimension: Dimension) -> Value {
        self.max_dimensions[dimension.index()]
    }

    /// Effective grow factor after applying the `flex` shorthand.
    pub fn flex_grow(&self) -> f64 {
        if !self.flex_grow.is_nan() {
            return self.flex_grow;
        }
        if !self.flex.is_nan() && self.flex > 0.0 {
            return self.flex;
        }
        0.0
    }

    /// Effective shrink factor after applying the `flex` shorthand.
    pub fn flex_shrink(&self) -> f64 {
        if !self.flex_shrink.is_nan() {
            return self.flex_shrink;
        }
        if !self.flex.is_nan() && self.flex < 0.0 {
            return -self.flex;
        }
        0.0
    }

    pub fn flex_basis(&self) -> Value {
        if self.flex_basis.is_defined() {
            return self.flex_basis;
        }
        if !self.flex.is_nan() && self.flex > 0.0 {
            return Value::ZERO;
        }
        Value::UNDEFINED
    }

    pub fn margin(&self, edge: Edge) -> Result<Value> {
        self.margin.computed(edge, Value::ZERO)
    }

    pub fn padding(&self, edge: Edge) -> Result<Value> {
        self.padding.computed(edge, Value::ZERO)
    }

    /// Border widths are plain pixel magnitudes.
    pub fn border(&self, edge: Edge) -> Result<f64> {
        Ok(self.border.computed(edge, Value::ZERO)?.magnitude)
    }

    pub fn position(&self, edge: Edge) -> Result<Value> {
        self.position.computed(edge, Value::UNDEFINED)
    }
}
