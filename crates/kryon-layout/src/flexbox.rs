// crates/kryon-layout/src/flexbox.rs
//! Axis bookkeeping shared by every step of the algorithm.

use kryon_core::{Align, Dimension, Direction, Edge, FlexDirection, PositionType, Style};

/// Physical edge at the start of `axis`. Children accumulate their
/// main/cross offsets into this slot of `Layout::position`.
pub fn leading_edge(axis: FlexDirection) -> Edge {
    match axis {
        FlexDirection::Column => Edge::Top,
        FlexDirection::ColumnReverse => Edge::Bottom,
        FlexDirection::Row => Edge::Left,
        FlexDirection::RowReverse => Edge::Right,
    }
}

pub fn trailing_edge(axis: FlexDirection) -> Edge {
    match axis {
        FlexDirection::Column => Edge::Bottom,
        FlexDirection::ColumnReverse => Edge::Top,
        FlexDirection::Row => Edge::Right,
        FlexDirection::RowReverse => Edge::Left,
    }
}

pub fn axis_dimension(axis: FlexDirection) -> Dimension {
    if axis.is_row() {
        Dimension::Width
    } else {
        Dimension::Height
    }
}

/// Rows run right to left under RTL.
pub fn resolve_flex_direction(flex_direction: FlexDirection, direction: Direction) -> FlexDirection {
    if direction == Direction::Rtl {
        match flex_direction {
            FlexDirection::Row => return FlexDirection::RowReverse,
            FlexDirection::RowReverse => return FlexDirection::Row,
            _ => {}
        }
    }
    flex_direction
}

pub fn cross_axis(main_axis: FlexDirection, direction: Direction) -> FlexDirection {
    if main_axis.is_column() {
        resolve_flex_direction(FlexDirection::Row, direction)
    } else {
        FlexDirection::Column
    }
}

pub fn resolve_direction(style_direction: Direction, parent_direction: Direction) -> Direction {
    match style_direction {
        Direction::Inherit if parent_direction == Direction::Inherit => Direction::Ltr,
        Direction::Inherit => parent_direction,
        explicit => explicit,
    }
}

/// Cross-axis alignment of `child` inside `parent`.
pub fn align_item(parent: &Style, child: &Style) -> Align {
    let align = if child.align_self == Align::Auto {
        parent.align_items
    } else {
        child.align_self
    };
    if align == Align::Baseline && parent.flex_direction.is_column() {
        return Align::FlexStart;
    }
    align
}

pub fn is_flex(style: &Style) -> bool {
    style.position_type == PositionType::Relative
        && (style.flex_grow() != 0.0 || style.flex_shrink() != 0.0)
}
