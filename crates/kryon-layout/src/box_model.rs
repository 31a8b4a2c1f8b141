// crates/kryon-layout/src/box_model.rs
//! Margin, padding, border and offset resolution along flex axes.
//!
//! Every helper takes a resolved flex direction. Row axes give the logical
//! `Start`/`End` slots priority over the physical edge. Percentages resolve
//! against the parent size along the same axis: horizontal edges against its
//! width and vertical edges against its height. An indeterminate result
//! contributes nothing.

use glam::DVec2;
use kryon_core::{Dimension, Edge, Edges, FlexDirection, Style, Unit, Value};

use crate::flexbox::{axis_dimension, leading_edge, trailing_edge};

/// The component of `size` that lies along `axis`.
pub fn axis_size(size: DVec2, axis: FlexDirection) -> f64 {
    if axis.is_row() {
        size.x
    } else {
        size.y
    }
}

fn edge_value(edges: &Edges, edge: Edge, default: Value) -> Value {
    edges.computed(edge, default).unwrap_or(default)
}

fn resolve_edge(
    edges: &Edges,
    axis: FlexDirection,
    logical: Edge,
    physical: Edge,
    parent_size: DVec2,
) -> f64 {
    let base = axis_size(parent_size, axis);
    if axis.is_row() {
        let explicit = edges.get(logical);
        if explicit.is_defined() {
            return explicit.resolve_or_zero(base);
        }
    }
    edge_value(edges, physical, Value::ZERO).resolve_or_zero(base)
}

fn border_edge(edges: &Edges, axis: FlexDirection, logical: Edge, physical: Edge) -> f64 {
    if axis.is_row() {
        let explicit = edges.get(logical);
        if explicit.is_defined() && explicit.magnitude >= 0.0 {
            return explicit.magnitude;
        }
    }
    edge_value(edges, physical, Value::ZERO).magnitude.max(0.0)
}

fn position_value(style: &Style, axis: FlexDirection, logical: Edge, physical: Edge) -> Value {
    if axis.is_row() {
        let value = edge_value(&style.position, logical, Value::UNDEFINED);
        if value.is_defined() {
            return value;
        }
    }
    edge_value(&style.position, physical, Value::UNDEFINED)
}

/// Box-model queries over a node's style.
pub trait BoxModel {
    fn leading_margin(&self, axis: FlexDirection, parent_size: DVec2) -> f64;
    fn trailing_margin(&self, axis: FlexDirection, parent_size: DVec2) -> f64;
    fn leading_padding(&self, axis: FlexDirection, parent_size: DVec2) -> f64;
    fn trailing_padding(&self, axis: FlexDirection, parent_size: DVec2) -> f64;
    fn leading_border(&self, axis: FlexDirection) -> f64;
    fn trailing_border(&self, axis: FlexDirection) -> f64;
    fn is_leading_pos_defined(&self, axis: FlexDirection) -> bool;
    fn is_trailing_pos_defined(&self, axis: FlexDirection) -> bool;
    fn leading_position(&self, axis: FlexDirection, axis_size: f64) -> f64;
    fn trailing_position(&self, axis: FlexDirection, axis_size: f64) -> f64;
    fn resolved_dimension(&self, dimension: Dimension) -> Value;
    fn bound_axis_within_min_max(&self, axis: FlexDirection, value: f64, axis_size: f64) -> f64;

    fn margin_for_axis(&self, axis: FlexDirection, parent_size: DVec2) -> f64 {
        self.leading_margin(axis, parent_size) + self.trailing_margin(axis, parent_size)
    }

    fn leading_padding_and_border(&self, axis: FlexDirection, parent_size: DVec2) -> f64 {
        self.leading_padding(axis, parent_size) + self.leading_border(axis)
    }

    fn trailing_padding_and_border(&self, axis: FlexDirection, parent_size: DVec2) -> f64 {
        self.trailing_padding(axis, parent_size) + self.trailing_border(axis)
    }

    fn padding_and_border_for_axis(&self, axis: FlexDirection, parent_size: DVec2) -> f64 {
        self.leading_padding_and_border(axis, parent_size)
            + self.trailing_padding_and_border(axis, parent_size)
    }

    /// Offset applied to a relatively positioned node; a leading offset wins
    /// over a trailing one.
    fn relative_position(&self, axis: FlexDirection, axis_size: f64) -> f64 {
        if self.is_leading_pos_defined(axis) {
            self.leading_position(axis, axis_size)
        } else {
            -self.trailing_position(axis, axis_size)
        }
    }

    /// Clamp into min/max, never below padding + border.
    fn bound_axis(&self, axis: FlexDirection, value: f64, parent_size: DVec2) -> f64 {
        self.bound_axis_within_min_max(axis, value, axis_size(parent_size, axis))
            .max(self.padding_and_border_for_axis(axis, parent_size))
    }

    /// Whether the style gives a usable size along `axis`.
    fn is_style_dim_defined(&self, axis: FlexDirection, parent_size: f64) -> bool {
        let value = self.resolved_dimension(axis_dimension(axis));
        match value.unit {
            Unit::Undefined => false,
            _ if value.magnitude.is_nan() => false,
            Unit::Pixel => value.magnitude >= 0.0,
            Unit::Percent => value.magnitude >= 0.0 && !parent_size.is_nan(),
        }
    }
}

impl BoxModel for Style {
    fn leading_margin(&self, axis: FlexDirection, parent_size: DVec2) -> f64 {
        resolve_edge(&self.margin, axis, Edge::Start, leading_edge(axis), parent_size)
    }

    fn trailing_margin(&self, axis: FlexDirection, parent_size: DVec2) -> f64 {
        resolve_edge(&self.margin, axis, Edge::End, trailing_edge(axis), parent_size)
    }

    fn leading_padding(&self, axis: FlexDirection, parent_size: DVec2) -> f64 {
        resolve_edge(&self.padding, axis, Edge::Start, leading_edge(axis), parent_size).max(0.0)
    }

    fn trailing_padding(&self, axis: FlexDirection, parent_size: DVec2) -> f64 {
        resolve_edge(&self.padding, axis, Edge::End, trailing_edge(axis), parent_size).max(0.0)
    }

    fn leading_border(&self, axis: FlexDirection) -> f64 {
        border_edge(&self.border, axis, Edge::Start, leading_edge(axis))
    }

    fn trailing_border(&self, axis: FlexDirection) -> f64 {
        border_edge(&self.border, axis, Edge::End, trailing_edge(axis))
    }

    fn is_leading_pos_defined(&self, axis: FlexDirection) -> bool {
        position_value(self, axis, Edge::Start, leading_edge(axis)).is_defined()
    }

    fn is_trailing_pos_defined(&self, axis: FlexDirection) -> bool {
        position_value(self, axis, Edge::End, trailing_edge(axis)).is_defined()
    }

    fn leading_position(&self, axis: FlexDirection, axis_size: f64) -> f64 {
        position_value(self, axis, Edge::Start, leading_edge(axis)).resolve_or_zero(axis_size)
    }

    fn trailing_position(&self, axis: FlexDirection, axis_size: f64) -> f64 {
        position_value(self, axis, Edge::End, trailing_edge(axis)).resolve_or_zero(axis_size)
    }

    /// A max size equal to the min size pins the dimension.
    fn resolved_dimension(&self, dimension: Dimension) -> Value {
        let max = self.max_dimension(dimension);
        if max.is_defined() && max == self.min_dimension(dimension) {
            return max;
        }
        self.dimension(dimension)
    }

    fn bound_axis_within_min_max(&self, axis: FlexDirection, value: f64, axis_size: f64) -> f64 {
        let dimension = axis_dimension(axis);
        let min = self.min_dimension(dimension).resolve(axis_size);
        let max = self.max_dimension(dimension).resolve(axis_size);

        let mut bound = value;
        if !max.is_nan() && max >= 0.0 && bound > max {
            bound = max;
        }
        if !min.is_nan() && min >= 0.0 && bound < min {
            bound = min;
        }
        bound
    }
}
