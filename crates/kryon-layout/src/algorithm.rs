// crates/kryon-layout/src/algorithm.rs
//! The flexbox pass for a single node: flex basis, line breaking, free space
//! distribution, justification, cross-axis and multi-line alignment, absolute
//! children and reverse-axis fix-ups.

use glam::DVec2;
use kryon_core::{
    floats_equal, Align, Dimension, Direction, Edge, FlexDirection, Justify, MeasureMode,
    Overflow, PositionType, Style, Unit, Wrap,
};
use tracing::trace;

use crate::box_model::BoxModel;
use crate::constraints::{constrain_max_size_for_mode, mode_for_size, ConstraintBox};
use crate::flexbox::{
    align_item, axis_dimension, cross_axis, is_flex, leading_edge, resolve_direction,
    resolve_flex_direction, trailing_edge,
};
use crate::node::{Layout, MeasureFunc, Node, NodeId};
use crate::tree::LayoutTree;

const ROW: FlexDirection = FlexDirection::Row;
const COLUMN: FlexDirection = FlexDirection::Column;

/// Axis setup shared by the per-line steps of one container.
#[derive(Debug, Clone, Copy)]
struct FlexContext {
    direction: Direction,
    main_axis: FlexDirection,
    cross_axis: FlexDirection,
    is_main_row: bool,
    available_inner_width: f64,
    available_inner_height: f64,
    available_inner_main: f64,
    available_inner_cross: f64,
    cross_mode: MeasureMode,
    perform_layout: bool,
    stretch_disabled: bool,
}

impl FlexContext {
    fn inner_size(&self) -> DVec2 {
        DVec2::new(self.available_inner_width, self.available_inner_height)
    }
}

/// Children that share one flex line, with the totals the distribution step needs.
#[derive(Debug, Default)]
struct FlexLine {
    start: usize,
    end: usize,
    items: usize,
    size_consumed: f64,
    total_flex_grow: f64,
    total_flex_shrink_scaled: f64,
    relative_children: Vec<NodeId>,
}

impl LayoutTree {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn layout_impl(
        &mut self,
        id: NodeId,
        constraints: ConstraintBox,
        parent_direction: Direction,
        parent_width: f64,
        parent_height: f64,
        perform_layout: bool,
    ) {
        let ConstraintBox {
            width: available_width,
            width_mode,
            height: available_height,
            height_mode,
        } = constraints;

        let node = &mut self.nodes[id];
        let direction = resolve_direction(node.style.direction, parent_direction);
        node.layout.direction = direction;

        let row = resolve_flex_direction(ROW, direction);
        let column = resolve_flex_direction(COLUMN, direction);
        let parent_size = DVec2::new(parent_width, parent_height);
        let style = &node.style;
        let layout = &mut node.layout;
        layout.margin[Edge::Start.index()] = style.leading_margin(row, parent_size);
        layout.margin[Edge::End.index()] = style.trailing_margin(row, parent_size);
        layout.margin[Edge::Top.index()] = style.leading_margin(column, parent_size);
        layout.margin[Edge::Bottom.index()] = style.trailing_margin(column, parent_size);
        layout.padding[Edge::Start.index()] = style.leading_padding(row, parent_size);
        layout.padding[Edge::End.index()] = style.trailing_padding(row, parent_size);
        layout.padding[Edge::Top.index()] = style.leading_padding(column, parent_size);
        layout.padding[Edge::Bottom.index()] = style.trailing_padding(column, parent_size);

        let node = &self.nodes[id];
        if let Some(measure) = node.measure.as_ref() {
            let measured = measure_leaf(node, measure, &constraints, parent_width, parent_height);
            trace!(?id, width = measured[0], height = measured[1], "measured leaf");
            self.nodes[id].layout.measured_dimensions = measured;
            return;
        }

        if node.children.is_empty() {
            let measured = empty_container_size(&node.style, &constraints, parent_width, parent_height);
            self.nodes[id].layout.measured_dimensions = measured;
            return;
        }

        if !perform_layout {
            if let Some(measured) =
                fixed_container_size(&node.style, &constraints, parent_width, parent_height)
            {
                self.nodes[id].layout.measured_dimensions = measured;
                return;
            }
        }

        let style = &node.style;
        let main_axis = resolve_flex_direction(style.flex_direction, direction);
        let cross = cross_axis(main_axis, direction);
        let is_main_row = main_axis.is_row();
        let wraps = style.flex_wrap == Wrap::Wrap;
        let scrolls = style.overflow == Overflow::Scroll;

        let main_parent_size = if is_main_row { parent_width } else { parent_height };
        let cross_parent_size = if is_main_row { parent_height } else { parent_width };

        let leading_pb_main = style.leading_padding_and_border(main_axis, parent_size);
        let trailing_pb_main = style.trailing_padding_and_border(main_axis, parent_size);
        let leading_pb_cross = style.leading_padding_and_border(cross, parent_size);
        let pb_main = style.padding_and_border_for_axis(main_axis, parent_size);
        let pb_cross = style.padding_and_border_for_axis(cross, parent_size);
        let leading_border_main = style.leading_border(main_axis);
        let leading_border_cross = style.leading_border(cross);

        let mut main_mode = if is_main_row { width_mode } else { height_mode };
        let cross_mode = if is_main_row { height_mode } else { width_mode };

        let pb_row = if is_main_row { pb_main } else { pb_cross };
        let pb_column = if is_main_row { pb_cross } else { pb_main };
        let margin_row = style.margin_for_axis(ROW, parent_size);
        let margin_column = style.margin_for_axis(COLUMN, parent_size);

        // Available inner space, kept inside the node's own min/max.
        let min_inner_width =
            style.min_dimension(Dimension::Width).resolve(parent_width) - margin_row - pb_row;
        let max_inner_width =
            style.max_dimension(Dimension::Width).resolve(parent_width) - margin_row - pb_row;
        let min_inner_height =
            style.min_dimension(Dimension::Height).resolve(parent_height) - margin_column - pb_column;
        let max_inner_height =
            style.max_dimension(Dimension::Height).resolve(parent_height) - margin_column - pb_column;
        let min_inner_main = if is_main_row { min_inner_width } else { min_inner_height };
        let max_inner_main = if is_main_row { max_inner_width } else { max_inner_height };

        let available_inner_width =
            clamp_inner(available_width - margin_row - pb_row, min_inner_width, max_inner_width);
        let available_inner_height = clamp_inner(
            available_height - margin_column - pb_column,
            min_inner_height,
            max_inner_height,
        );
        let mut available_inner_main =
            if is_main_row { available_inner_width } else { available_inner_height };
        let available_inner_cross =
            if is_main_row { available_inner_height } else { available_inner_width };
        let inner_size = DVec2::new(available_inner_width, available_inner_height);

        let children = node.children.clone();

        // A lone child that both grows and shrinks can skip measuring: its
        // basis is zero and it takes all the space.
        let mut single_flex_child = None;
        if main_mode == MeasureMode::Exactly {
            for &child in &children {
                let child_style = &self.nodes[child].style;
                if single_flex_child.is_some() {
                    if is_flex(child_style) {
                        single_flex_child = None;
                        break;
                    }
                } else if child_style.flex_grow() > 0.0 && child_style.flex_shrink() > 0.0 {
                    single_flex_child = Some(child);
                }
            }
        }

        let mut absolute_children = Vec::new();
        let mut total_outer_flex_basis = 0.0;

        for &child in &children {
            if perform_layout {
                self.seed_child_position(
                    child,
                    main_axis,
                    cross,
                    available_inner_main,
                    available_inner_cross,
                    inner_size,
                );
            }

            if self.nodes[child].style.position_type == PositionType::Absolute {
                absolute_children.push(child);
                continue;
            }

            if single_flex_child == Some(child) {
                let generation = self.generation;
                let layout = &mut self.nodes[child].layout;
                layout.computed_flex_basis_generation = generation;
                layout.computed_flex_basis = 0.0;
            } else {
                self.compute_flex_basis_for_child(
                    id,
                    child,
                    ConstraintBox::new(
                        available_inner_width,
                        width_mode,
                        available_inner_height,
                        height_mode,
                    ),
                    direction,
                );
            }

            let child_node = &self.nodes[child];
            total_outer_flex_basis += child_node.layout.computed_flex_basis
                + child_node.style.margin_for_axis(main_axis, inner_size);
        }

        let flex_basis_overflows =
            main_mode != MeasureMode::Undefined && total_outer_flex_basis > available_inner_main;
        if wraps && flex_basis_overflows && main_mode == MeasureMode::AtMost {
            main_mode = MeasureMode::Exactly;
        }

        let mut line_count = 0;
        let mut start = 0;
        let mut total_line_cross = 0.0;
        let mut max_line_main: f64 = 0.0;

        while start < children.len() {
            let line = self.collect_line(
                &children,
                start,
                line_count,
                main_axis,
                available_inner_main,
                inner_size,
                wraps,
            );

            let can_skip_flex = !perform_layout && cross_mode == MeasureMode::Exactly;

            if main_mode != MeasureMode::Exactly {
                if !min_inner_main.is_nan() && line.size_consumed < min_inner_main {
                    available_inner_main = min_inner_main;
                } else if !max_inner_main.is_nan() && line.size_consumed > max_inner_main {
                    available_inner_main = max_inner_main;
                }
            }

            let mut remaining_free_space = if !available_inner_main.is_nan() {
                available_inner_main - line.size_consumed
            } else if line.size_consumed < 0.0 {
                -line.size_consumed
            } else {
                0.0
            };

            let context = FlexContext {
                direction,
                main_axis,
                cross_axis: cross,
                is_main_row,
                available_inner_width,
                available_inner_height,
                available_inner_main,
                available_inner_cross,
                cross_mode,
                perform_layout,
                stretch_disabled: wraps && flex_basis_overflows,
            };

            if !can_skip_flex {
                remaining_free_space +=
                    self.resolve_flexible_lengths(id, &line, &context, remaining_free_space);
            }

            trace!(
                ?id,
                line = line_count,
                items = line.items,
                consumed = line.size_consumed,
                remaining = remaining_free_space,
                "flex line"
            );

            // Under an at-most constraint only the space the min size demands is distributed.
            if main_mode == MeasureMode::AtMost && remaining_free_space > 0.0 {
                remaining_free_space = if !min_inner_main.is_nan() && min_inner_main >= 0.0 {
                    (min_inner_main - (available_inner_main - remaining_free_space)).max(0.0)
                } else {
                    0.0
                };
            }

            let justify = self.nodes[id].style.justify_content;
            let (leading_main, between_main) =
                justify_offsets(justify, remaining_free_space, line.items);

            let mut main_dim = leading_pb_main + leading_main;
            let mut cross_dim: f64 = 0.0;
            let mut max_ascent: f64 = 0.0;
            let mut max_descent: f64 = 0.0;
            let main_edge = leading_edge(main_axis).index();

            for &child in &children[line.start..line.end] {
                // Baseline items size the line by their tallest ascent plus
                // their deepest descent.
                let ascent = if is_main_row
                    && !can_skip_flex
                    && self.nodes[child].style.position_type == PositionType::Relative
                    && self.child_alignment(id, child) == Align::Baseline
                {
                    let leading_margin = self.nodes[child].style.leading_margin(COLUMN, inner_size);
                    Some(self.baseline(child) + leading_margin)
                } else {
                    None
                };

                let node = &mut self.nodes[child];
                let style = &node.style;
                let layout = &mut node.layout;

                if style.position_type == PositionType::Absolute
                    && style.is_leading_pos_defined(main_axis)
                {
                    if perform_layout {
                        layout.position[main_edge] = style
                            .leading_position(main_axis, available_inner_main)
                            + leading_border_main
                            + style.leading_margin(main_axis, inner_size);
                    }
                } else if style.position_type == PositionType::Relative {
                    if perform_layout {
                        layout.position[main_edge] += main_dim;
                    }
                    if can_skip_flex {
                        // measured sizes were never computed on this path
                        main_dim += between_main
                            + style.margin_for_axis(main_axis, inner_size)
                            + layout.computed_flex_basis;
                        cross_dim = available_inner_cross;
                    } else {
                        main_dim += between_main
                            + dim_with_margin(style, layout, main_axis, inner_size);
                        cross_dim = cross_dim
                            .max(dim_with_margin(style, layout, cross, inner_size));
                        if let Some(ascent) = ascent {
                            let descent = dim_with_margin(style, layout, COLUMN, inner_size) - ascent;
                            max_ascent = max_ascent.max(ascent);
                            max_descent = max_descent.max(descent);
                            cross_dim = cross_dim.max(max_ascent + max_descent);
                        }
                    }
                } else if perform_layout {
                    layout.position[main_edge] += leading_border_main + leading_main;
                }
            }
            main_dim += trailing_pb_main;

            let style = &self.nodes[id].style;
            let mut container_cross = available_inner_cross;
            if matches!(cross_mode, MeasureMode::Undefined | MeasureMode::AtMost) {
                container_cross =
                    style.bound_axis(cross, cross_dim + pb_cross, parent_size) - pb_cross;
                if cross_mode == MeasureMode::AtMost {
                    container_cross = container_cross.min(available_inner_cross);
                }
            }

            if !wraps && cross_mode == MeasureMode::Exactly {
                cross_dim = available_inner_cross;
            }
            cross_dim = style.bound_axis(cross, cross_dim + pb_cross, parent_size)
                - pb_cross;

            if perform_layout {
                self.align_line_cross_axis(
                    id,
                    &children[line.start..line.end],
                    &context,
                    leading_pb_cross,
                    leading_border_cross,
                    container_cross,
                    cross_dim,
                    total_line_cross,
                );
            }

            total_line_cross += cross_dim;
            max_line_main = max_line_main.max(main_dim);
            line_count += 1;
            start = line.end;
        }

        // Final size: the constrained available size, or the content extent on
        // axes that size to content.
        let style = &self.nodes[id].style;
        let mut measured = [
            style.bound_axis(ROW, available_width - margin_row, parent_size),
            style.bound_axis(COLUMN, available_height - margin_column, parent_size),
        ];

        let main_index = axis_dimension(main_axis).index();
        if main_mode == MeasureMode::Undefined || (!scrolls && main_mode == MeasureMode::AtMost) {
            measured[main_index] = style.bound_axis(main_axis, max_line_main, parent_size);
        } else if main_mode == MeasureMode::AtMost && scrolls {
            measured[main_index] = (available_inner_main + pb_main)
                .min(style.bound_axis_within_min_max(main_axis, max_line_main, main_parent_size))
                .max(pb_main);
        }

        let cross_index = axis_dimension(cross).index();
        if cross_mode == MeasureMode::Undefined || (!scrolls && cross_mode == MeasureMode::AtMost) {
            measured[cross_index] = style.bound_axis(cross, total_line_cross + pb_cross, parent_size);
        } else if cross_mode == MeasureMode::AtMost && scrolls {
            measured[cross_index] = (available_inner_cross + pb_cross)
                .min(style.bound_axis_within_min_max(
                    cross,
                    total_line_cross + pb_cross,
                    cross_parent_size,
                ))
                .max(pb_cross);
        }
        self.nodes[id].layout.measured_dimensions = measured;

        if !perform_layout {
            return;
        }

        let context = FlexContext {
            direction,
            main_axis,
            cross_axis: cross,
            is_main_row,
            available_inner_width,
            available_inner_height,
            available_inner_main,
            available_inner_cross,
            cross_mode,
            perform_layout,
            stretch_disabled: wraps && flex_basis_overflows,
        };

        // Baseline alignment runs even when the cross size is content-sized;
        // lines then spread over the final inner cross size.
        if (line_count > 1 && !available_inner_cross.is_nan()) || self.is_baseline_layout(id) {
            let cross_extent = if available_inner_cross.is_nan() {
                measured[cross_index] - pb_cross
            } else {
                available_inner_cross
            };
            self.align_content(
                id,
                &children,
                &context,
                line_count,
                leading_pb_cross,
                total_line_cross,
                cross_extent,
            );
        }

        let abs_width_mode = if is_main_row { main_mode } else { cross_mode };
        for child in absolute_children {
            self.layout_absolute_child(
                id,
                child,
                available_inner_width,
                abs_width_mode,
                available_inner_height,
                direction,
            );
        }

        // Reverse axes accumulated offsets from the far edge; convert them to
        // physical left/top.
        let needs_main_trailing = main_axis.is_reverse();
        let needs_cross_trailing = cross.is_reverse();
        if needs_main_trailing || needs_cross_trailing {
            for &child in &children {
                let layout = &mut self.nodes[child].layout;
                if needs_main_trailing {
                    set_child_trailing_position(layout, measured, main_axis);
                }
                if needs_cross_trailing {
                    set_child_trailing_position(layout, measured, cross);
                }
            }
        }
    }

    fn child_alignment(&self, parent: NodeId, child: NodeId) -> Align {
        align_item(&self.nodes[parent].style, &self.nodes[child].style)
    }

    fn compute_flex_basis_for_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        available: ConstraintBox,
        direction: Direction,
    ) {
        let generation = self.generation;
        let main_axis = resolve_flex_direction(self.nodes[parent].style.flex_direction, direction);
        let is_main_row = main_axis.is_row();
        let width = available.width;
        let height = available.height;
        let main_size = if is_main_row { width } else { height };
        let size = DVec2::new(width, height);

        let child_node = &self.nodes[child];
        let style = &child_node.style;
        let resolved_basis = style.flex_basis().resolve(main_size);

        let basis = if !resolved_basis.is_nan() && !main_size.is_nan() {
            let layout = &child_node.layout;
            if layout.computed_flex_basis.is_nan()
                || layout.computed_flex_basis_generation != generation
            {
                resolved_basis.max(style.padding_and_border_for_axis(main_axis, size))
            } else {
                layout.computed_flex_basis
            }
        } else if is_main_row && style.is_style_dim_defined(ROW, width) {
            style
                .resolved_dimension(Dimension::Width)
                .resolve(width)
                .max(style.padding_and_border_for_axis(ROW, size))
        } else if !is_main_row && style.is_style_dim_defined(COLUMN, height) {
            style
                .resolved_dimension(Dimension::Height)
                .resolve(height)
                .max(style.padding_and_border_for_axis(COLUMN, size))
        } else {
            self.measure_flex_basis(parent, child, main_axis, available, direction)
        };

        let layout = &mut self.nodes[child].layout;
        layout.computed_flex_basis = basis;
        layout.computed_flex_basis_generation = generation;
    }

    /// Basis for a child without a definite size: measure it under the
    /// container's constraints.
    fn measure_flex_basis(
        &mut self,
        parent: NodeId,
        child: NodeId,
        main_axis: FlexDirection,
        available: ConstraintBox,
        direction: Direction,
    ) -> f64 {
        let is_main_row = main_axis.is_row();
        let width = available.width;
        let height = available.height;
        let size = DVec2::new(width, height);
        let scrolls = self.nodes[parent].style.overflow == Overflow::Scroll;
        let stretches = self.child_alignment(parent, child) == Align::Stretch;

        let style = &self.nodes[child].style;
        let margin_row = style.margin_for_axis(ROW, size);
        let margin_column = style.margin_for_axis(COLUMN, size);
        let row_defined = style.is_style_dim_defined(ROW, width);
        let column_defined = style.is_style_dim_defined(COLUMN, height);

        let mut child_width = f64::NAN;
        let mut child_height = f64::NAN;
        let mut child_width_mode = MeasureMode::Undefined;
        let mut child_height_mode = MeasureMode::Undefined;

        if row_defined {
            child_width = style.resolved_dimension(Dimension::Width).resolve(width) + margin_row;
            child_width_mode = MeasureMode::Exactly;
        }
        if column_defined {
            child_height =
                style.resolved_dimension(Dimension::Height).resolve(height) + margin_column;
            child_height_mode = MeasureMode::Exactly;
        }

        // A scroll container leaves its main axis unbounded.
        if (!is_main_row || !scrolls) && child_width.is_nan() && !width.is_nan() {
            child_width = width;
            child_width_mode = MeasureMode::AtMost;
        }
        if (is_main_row || !scrolls) && child_height.is_nan() && !height.is_nan() {
            child_height = height;
            child_height_mode = MeasureMode::AtMost;
        }

        if !is_main_row
            && !width.is_nan()
            && !row_defined
            && available.width_mode == MeasureMode::Exactly
            && stretches
        {
            child_width = width;
            child_width_mode = MeasureMode::Exactly;
        }
        if is_main_row
            && !height.is_nan()
            && !column_defined
            && available.height_mode == MeasureMode::Exactly
            && stretches
        {
            child_height = height;
            child_height_mode = MeasureMode::Exactly;
        }

        let ratio = style.aspect_ratio;
        if !ratio.is_nan() {
            if !is_main_row && child_width_mode == MeasureMode::Exactly {
                return ((child_width - margin_row) / ratio)
                    .max(style.padding_and_border_for_axis(COLUMN, size));
            }
            if is_main_row && child_height_mode == MeasureMode::Exactly {
                return ((child_height - margin_column) * ratio)
                    .max(style.padding_and_border_for_axis(ROW, size));
            }
        }

        constrain_max_size_for_mode(
            style.max_dimension(Dimension::Width).resolve(width) + margin_row,
            &mut child_width_mode,
            &mut child_width,
        );
        constrain_max_size_for_mode(
            style.max_dimension(Dimension::Height).resolve(height) + margin_column,
            &mut child_height_mode,
            &mut child_height,
        );
        let pb_main = style.padding_and_border_for_axis(main_axis, size);

        self.layout_node_internal(
            child,
            ConstraintBox::new(child_width, child_width_mode, child_height, child_height_mode),
            direction,
            width,
            height,
            false,
            "measure",
        );

        self.nodes[child].layout.measured_dimensions[axis_dimension(main_axis).index()].max(pb_main)
    }

    /// Gather the children of the line starting at `start`.
    #[allow(clippy::too_many_arguments)]
    fn collect_line(
        &mut self,
        children: &[NodeId],
        start: usize,
        line_index: usize,
        main_axis: FlexDirection,
        available_inner_main: f64,
        inner_size: DVec2,
        wraps: bool,
    ) -> FlexLine {
        let mut line = FlexLine { start, end: start, ..FlexLine::default() };

        for &child in &children[start..] {
            let node = &mut self.nodes[child];
            node.line_index = line_index;

            if node.style.position_type != PositionType::Absolute {
                let style = &node.style;
                let basis = node.layout.computed_flex_basis;
                let outer_flex_basis = style
                    .bound_axis_within_min_max(main_axis, basis, available_inner_main)
                    .max(style.padding_and_border_for_axis(main_axis, inner_size))
                    + style.margin_for_axis(main_axis, inner_size);

                if wraps
                    && line.items > 0
                    && line.size_consumed + outer_flex_basis > available_inner_main
                {
                    break;
                }

                line.size_consumed += outer_flex_basis;
                line.items += 1;

                if is_flex(style) {
                    line.total_flex_grow += style.flex_grow();
                    // shrink is weighted by the item's basis
                    line.total_flex_shrink_scaled += -style.flex_shrink() * basis;
                }
                line.relative_children.push(child);
            }
            line.end += 1;
        }

        line
    }

    /// Grow or shrink the line's items into the free space and size them.
    /// Returns the change in free space.
    fn resolve_flexible_lengths(
        &mut self,
        id: NodeId,
        line: &FlexLine,
        context: &FlexContext,
        remaining_free_space: f64,
    ) -> f64 {
        let main_axis = context.main_axis;
        let cross = context.cross_axis;
        let available_main = context.available_inner_main;
        let available_cross = context.available_inner_cross;
        let inner_size = context.inner_size();

        let growing = remaining_free_space > 0.0;
        let shrinking = remaining_free_space < 0.0;
        let mut remaining = remaining_free_space;
        let mut total_grow = line.total_flex_grow;
        let mut total_shrink_scaled = line.total_flex_shrink_scaled;

        // Items whose min/max clamp triggers are frozen at the clamped size and
        // leave the distribution. Freezing changes everyone else's share, so
        // repeat until no further item hits a clamp.
        let mut frozen: Vec<Option<f64>> = vec![None; line.relative_children.len()];
        loop {
            let mut delta_free_space = 0.0;
            let mut delta_grow = 0.0;
            let mut delta_shrink_scaled = 0.0;
            let mut froze_any = false;

            for (slot, &child) in frozen.iter_mut().zip(&line.relative_children) {
                if slot.is_some() {
                    continue;
                }
                let node = &self.nodes[child];
                let style = &node.style;
                let basis = node.layout.computed_flex_basis;

                if shrinking {
                    let shrink_scaled = -style.flex_shrink() * basis;
                    if shrink_scaled != 0.0 && total_shrink_scaled != 0.0 {
                        let base = basis + remaining / total_shrink_scaled * shrink_scaled;
                        let bound = style.bound_axis(main_axis, base, inner_size);
                        if !floats_equal(base, bound) {
                            *slot = Some(bound);
                            froze_any = true;
                            delta_free_space -= bound - basis;
                            delta_shrink_scaled -= shrink_scaled;
                        }
                    }
                } else if growing {
                    let grow = style.flex_grow();
                    if grow != 0.0 && total_grow != 0.0 {
                        let base = basis + remaining / total_grow * grow;
                        let bound = style.bound_axis(main_axis, base, inner_size);
                        if !floats_equal(base, bound) {
                            *slot = Some(bound);
                            froze_any = true;
                            delta_free_space -= bound - basis;
                            delta_grow -= grow;
                        }
                    }
                }
            }

            if !froze_any {
                break;
            }
            total_shrink_scaled += delta_shrink_scaled;
            total_grow += delta_grow;
            remaining += delta_free_space;
        }

        // Size everything and lay the items out.
        let mut delta_free_space = 0.0;
        for (&child, frozen_size) in line.relative_children.iter().zip(&frozen) {
            let stretches = self.child_alignment(id, child) == Align::Stretch;
            let node = &self.nodes[child];
            let style = &node.style;
            let basis = node.layout.computed_flex_basis;
            let mut updated_main_size = basis;

            if let Some(size) = *frozen_size {
                updated_main_size = size;
            } else if shrinking {
                let shrink_scaled = -style.flex_shrink() * basis;
                if shrink_scaled != 0.0 {
                    let child_size = if total_shrink_scaled == 0.0 {
                        basis + shrink_scaled
                    } else {
                        basis + remaining / total_shrink_scaled * shrink_scaled
                    };
                    updated_main_size = style.bound_axis(main_axis, child_size, inner_size);
                }
            } else if growing {
                let grow = style.flex_grow();
                if grow != 0.0 {
                    updated_main_size =
                        style.bound_axis(main_axis, basis + remaining / total_grow * grow, inner_size);
                }
            }
            delta_free_space -= updated_main_size - basis;

            let margin_main = style.margin_for_axis(main_axis, inner_size);
            let margin_cross = style.margin_for_axis(cross, inner_size);
            let cross_defined = style.is_style_dim_defined(cross, available_cross);

            let mut child_main = updated_main_size + margin_main;
            let mut child_main_mode = MeasureMode::Exactly;

            let (mut child_cross, mut child_cross_mode) = if !available_cross.is_nan()
                && !cross_defined
                && context.cross_mode == MeasureMode::Exactly
                && !context.stretch_disabled
                && stretches
            {
                (available_cross, MeasureMode::Exactly)
            } else if !cross_defined {
                let mode = if available_cross.is_nan() {
                    MeasureMode::Undefined
                } else {
                    MeasureMode::AtMost
                };
                (available_cross, mode)
            } else {
                let dimension = style.resolved_dimension(axis_dimension(cross));
                let size = dimension.resolve(available_cross) + margin_cross;
                let loose_percentage = dimension.unit == Unit::Percent
                    && context.cross_mode != MeasureMode::Exactly;
                if size.is_nan() || loose_percentage {
                    (size, MeasureMode::Undefined)
                } else {
                    (size, MeasureMode::Exactly)
                }
            };

            let ratio = style.aspect_ratio;
            if !ratio.is_nan() {
                let main_content = child_main - margin_main;
                let mut cross_content =
                    (if context.is_main_row { main_content / ratio } else { main_content * ratio })
                        .max(style.padding_and_border_for_axis(cross, inner_size));
                if is_flex(style) {
                    // the container's cross size wins over the flexed main size
                    cross_content = cross_content.min(available_cross - margin_cross);
                    child_main = margin_main
                        + if context.is_main_row {
                            cross_content * ratio
                        } else {
                            cross_content / ratio
                        };
                }
                child_cross = cross_content + margin_cross;
                child_cross_mode = MeasureMode::Exactly;
            }

            constrain_max_size_for_mode(
                style.max_dimension(axis_dimension(main_axis)).resolve(available_main) + margin_main,
                &mut child_main_mode,
                &mut child_main,
            );
            constrain_max_size_for_mode(
                style.max_dimension(axis_dimension(cross)).resolve(available_cross) + margin_cross,
                &mut child_cross_mode,
                &mut child_cross,
            );

            let requires_stretch_layout = !cross_defined && stretches;
            let child_constraints = if context.is_main_row {
                ConstraintBox::new(child_main, child_main_mode, child_cross, child_cross_mode)
            } else {
                ConstraintBox::new(child_cross, child_cross_mode, child_main, child_main_mode)
            };

            self.layout_node_internal(
                child,
                child_constraints,
                context.direction,
                context.available_inner_width,
                context.available_inner_height,
                context.perform_layout && !requires_stretch_layout,
                "flex",
            );
        }

        delta_free_space
    }

    /// Position one line's items on the cross axis, re-laying out stretched items.
    #[allow(clippy::too_many_arguments)]
    fn align_line_cross_axis(
        &mut self,
        id: NodeId,
        line_children: &[NodeId],
        context: &FlexContext,
        leading_pb_cross: f64,
        leading_border_cross: f64,
        container_cross: f64,
        cross_dim: f64,
        total_line_cross: f64,
    ) {
        let main_axis = context.main_axis;
        let cross = context.cross_axis;
        let inner_size = context.inner_size();
        let cross_edge = leading_edge(cross).index();

        for &child in line_children {
            let align = self.child_alignment(id, child);
            let node = &self.nodes[child];
            let style = &node.style;

            if style.position_type == PositionType::Absolute {
                let mut position = leading_border_cross + style.leading_margin(cross, inner_size);
                if style.is_leading_pos_defined(cross) {
                    position += style.leading_position(cross, context.available_inner_cross);
                }
                self.nodes[child].layout.position[cross_edge] = position;
                continue;
            }

            let mut leading_cross = leading_pb_cross;
            if align == Align::Stretch {
                if !style.is_style_dim_defined(cross, context.available_inner_cross) {
                    let margin_main = style.margin_for_axis(main_axis, inner_size);
                    let margin_cross = style.margin_for_axis(cross, inner_size);
                    let main_content =
                        node.layout.measured_dimensions[axis_dimension(main_axis).index()];
                    let ratio = style.aspect_ratio;

                    let mut child_main = main_content + margin_main;
                    let mut child_cross = if ratio.is_nan() {
                        cross_dim
                    } else if context.is_main_row {
                        margin_cross + main_content / ratio
                    } else {
                        margin_cross + main_content * ratio
                    };

                    let mut main_mode = MeasureMode::Exactly;
                    let mut cross_mode = MeasureMode::Exactly;
                    constrain_max_size_for_mode(
                        style
                            .max_dimension(axis_dimension(main_axis))
                            .resolve(context.available_inner_main)
                            + margin_main,
                        &mut main_mode,
                        &mut child_main,
                    );
                    constrain_max_size_for_mode(
                        style
                            .max_dimension(axis_dimension(cross))
                            .resolve(context.available_inner_cross)
                            + margin_cross,
                        &mut cross_mode,
                        &mut child_cross,
                    );

                    let (child_width, child_height) = if context.is_main_row {
                        (child_main, child_cross)
                    } else {
                        (child_cross, child_main)
                    };
                    self.layout_node_internal(
                        child,
                        ConstraintBox::new(
                            child_width,
                            mode_for_size(child_width),
                            child_height,
                            mode_for_size(child_height),
                        ),
                        context.direction,
                        context.available_inner_width,
                        context.available_inner_height,
                        true,
                        "stretch",
                    );
                }
            } else {
                let remaining_cross =
                    container_cross - dim_with_margin(style, &node.layout, cross, inner_size);
                match align {
                    Align::Center => leading_cross += remaining_cross / 2.0,
                    Align::FlexEnd => leading_cross += remaining_cross,
                    _ => {}
                }
            }

            self.nodes[child].layout.position[cross_edge] += total_line_cross + leading_cross;
        }
    }

    /// Distribute lines over the cross axis and align items inside each line.
    #[allow(clippy::too_many_arguments)]
    fn align_content(
        &mut self,
        id: NodeId,
        children: &[NodeId],
        context: &FlexContext,
        line_count: usize,
        leading_pb_cross: f64,
        total_line_cross: f64,
        cross_extent: f64,
    ) {
        let main_axis = context.main_axis;
        let cross = context.cross_axis;
        let inner_size = context.inner_size();
        let available_cross = context.available_inner_cross;
        let cross_index = axis_dimension(cross).index();
        let cross_edge = leading_edge(cross).index();

        let remaining = cross_extent - total_line_cross;
        let has_room = cross_extent > total_line_cross;
        let lines = line_count as f64;
        let mut cross_dim_lead = 0.0;
        let mut current_lead = leading_pb_cross;

        match self.nodes[id].style.align_content {
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
        for line_index in 0..line_count {
            let start = end;
            let mut line_height: f64 = 0.0;
            let mut max_ascent: f64 = 0.0;
            let mut max_descent: f64 = 0.0;

            let mut index = start;
            while index < children.len() {
                let child = children[index];
                let node = &self.nodes[child];
                if node.style.position_type == PositionType::Relative {
                    if node.line_index != line_index {
                        break;
                    }
                    if is_layout_dim_defined(&node.layout, cross) {
                        line_height = line_height.max(
                            node.layout.measured_dimensions[cross_index]
                                + node.style.margin_for_axis(cross, inner_size),
                        );
                    }
                    if self.child_alignment(id, child) == Align::Baseline {
                        let ascent =
                            self.baseline(child) + node.style.leading_margin(COLUMN, inner_size);
                        let descent = node.layout.measured_dimensions[1]
                            + node.style.margin_for_axis(COLUMN, inner_size)
                            - ascent;
                        max_ascent = max_ascent.max(ascent);
                        max_descent = max_descent.max(descent);
                        line_height = line_height.max(max_ascent + max_descent);
                    }
                }
                index += 1;
            }
            end = index;
            line_height += cross_dim_lead;

            for &child in &children[start..end] {
                let align = self.child_alignment(id, child);
                let node = &self.nodes[child];
                if node.style.position_type != PositionType::Relative {
                    continue;
                }
                let style = &node.style;
                let measured = node.layout.measured_dimensions;

                match align {
                    Align::FlexStart => {
                        let position = current_lead + style.leading_margin(cross, inner_size);
                        self.nodes[child].layout.position[cross_edge] = position;
                    }
                    Align::FlexEnd => {
                        let position = current_lead + line_height
                            - style.trailing_margin(cross, inner_size)
                            - measured[cross_index];
                        self.nodes[child].layout.position[cross_edge] = position;
                    }
                    Align::Center => {
                        let position = current_lead + (line_height - measured[cross_index]) / 2.0;
                        self.nodes[child].layout.position[cross_edge] = position;
                    }
                    Align::Stretch => {
                        let position = current_lead + style.leading_margin(cross, inner_size);
                        let cross_defined = style.is_style_dim_defined(cross, available_cross);
                        let margin_main = style.margin_for_axis(main_axis, inner_size);
                        self.nodes[child].layout.position[cross_edge] = position;

                        // Items were measured against the container; re-lay them
                        // out at the final line height.
                        if !cross_defined {
                            let (child_width, child_height) = if context.is_main_row {
                                (measured[0] + margin_main, line_height)
                            } else {
                                (line_height, measured[1] + margin_main)
                            };
                            if !(floats_equal(child_width, measured[0])
                                && floats_equal(child_height, measured[1]))
                            {
                                self.layout_node_internal(
                                    child,
                                    ConstraintBox::with_fixed_size(child_width, child_height),
                                    context.direction,
                                    context.available_inner_width,
                                    context.available_inner_height,
                                    true,
                                    "multiline-stretch",
                                );
                            }
                        }
                    }
                    Align::Baseline => {
                        let offset = style.leading_position(COLUMN, available_cross);
                        let position = current_lead + max_ascent - self.baseline(child) + offset;
                        self.nodes[child].layout.position[Edge::Top.index()] = position;
                    }
                    Align::Auto | Align::SpaceBetween | Align::SpaceAround => {}
                }
            }

            current_lead += line_height;
        }
    }

    fn layout_absolute_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        width: f64,
        width_mode: MeasureMode,
        height: f64,
        direction: Direction,
    ) {
        let align = self.child_alignment(parent, child);
        let parent_node = &self.nodes[parent];
        let parent_style = &parent_node.style;
        let main_axis = resolve_flex_direction(parent_style.flex_direction, direction);
        let cross = cross_axis(main_axis, direction);
        let is_main_row = main_axis.is_row();
        let parent_measured = parent_node.layout.measured_dimensions;
        let justify = parent_style.justify_content;
        let border_row = parent_style.leading_border(ROW) + parent_style.trailing_border(ROW);
        let border_column =
            parent_style.leading_border(COLUMN) + parent_style.trailing_border(COLUMN);
        let trailing_border_main = parent_style.trailing_border(main_axis);
        let trailing_border_cross = parent_style.trailing_border(cross);

        let size = DVec2::new(width, height);
        let style = &self.nodes[child].style;
        let margin_row = style.margin_for_axis(ROW, size);
        let margin_column = style.margin_for_axis(COLUMN, size);

        let mut child_width = f64::NAN;
        let mut child_height = f64::NAN;

        if style.is_style_dim_defined(ROW, width) {
            child_width = style.resolved_dimension(Dimension::Width).resolve(width) + margin_row;
        } else if style.is_leading_pos_defined(ROW) && style.is_trailing_pos_defined(ROW) {
            // stretched between the left and right offsets
            child_width = parent_measured[0]
                - border_row
                - (style.leading_position(ROW, width) + style.trailing_position(ROW, width));
            child_width = style.bound_axis(ROW, child_width, size);
        }

        if style.is_style_dim_defined(COLUMN, height) {
            child_height =
                style.resolved_dimension(Dimension::Height).resolve(height) + margin_column;
        } else if style.is_leading_pos_defined(COLUMN) && style.is_trailing_pos_defined(COLUMN) {
            child_height = parent_measured[1]
                - border_column
                - (style.leading_position(COLUMN, height) + style.trailing_position(COLUMN, height));
            child_height = style.bound_axis(COLUMN, child_height, size);
        }

        // One known axis plus an aspect ratio fixes the other.
        let ratio = style.aspect_ratio;
        if child_width.is_nan() != child_height.is_nan() && !ratio.is_nan() {
            if child_width.is_nan() {
                child_width = margin_row
                    + ((child_height - margin_column) * ratio)
                        .max(style.padding_and_border_for_axis(COLUMN, size));
            } else {
                child_height = margin_column
                    + ((child_width - margin_row) / ratio)
                        .max(style.padding_and_border_for_axis(ROW, size));
            }
        }

        if child_width.is_nan() || child_height.is_nan() {
            let mut child_width_mode = mode_for_size(child_width);
            let child_height_mode = mode_for_size(child_height);

            // Let content wrap to the parent's width, as browsers do.
            if !is_main_row
                && child_width.is_nan()
                && width_mode != MeasureMode::Undefined
                && width > 0.0
            {
                child_width = width;
                child_width_mode = MeasureMode::AtMost;
            }

            self.layout_node_internal(
                child,
                ConstraintBox::new(child_width, child_width_mode, child_height, child_height_mode),
                direction,
                width,
                height,
                false,
                "abs-measure",
            );
            let node = &self.nodes[child];
            child_width = node.layout.measured_dimensions[0] + node.style.margin_for_axis(ROW, size);
            child_height =
                node.layout.measured_dimensions[1] + node.style.margin_for_axis(COLUMN, size);
        }

        self.layout_node_internal(
            child,
            ConstraintBox::with_fixed_size(child_width, child_height),
            direction,
            width,
            height,
            true,
            "abs-layout",
        );

        let (main_size, cross_size) = if is_main_row { (width, height) } else { (height, width) };
        let node = &mut self.nodes[child];
        if let Some(position) = absolute_offset(
            &node.style,
            &node.layout,
            main_axis,
            parent_measured,
            trailing_border_main,
            main_size,
            justify == Justify::Center,
            justify == Justify::FlexEnd,
        ) {
            node.layout.position[leading_edge(main_axis).index()] = position;
        }
        if let Some(position) = absolute_offset(
            &node.style,
            &node.layout,
            cross,
            parent_measured,
            trailing_border_cross,
            cross_size,
            align == Align::Center,
            align == Align::FlexEnd,
        ) {
            node.layout.position[leading_edge(cross).index()] = position;
        }
    }

    /// Distance from the node's top edge to its first baseline.
    pub(crate) fn baseline(&self, id: NodeId) -> f64 {
        let node = &self.nodes[id];
        if let Some(baseline) = node.baseline.as_ref() {
            let [width, height] = node.layout.measured_dimensions;
            return baseline(node, width, height);
        }

        let mut baseline_child = None;
        for &child in &node.children {
            let child_node = &self.nodes[child];
            if child_node.line_index > 0 {
                break;
            }
            if child_node.style.position_type == PositionType::Absolute {
                continue;
            }
            if align_item(&node.style, &child_node.style) == Align::Baseline {
                baseline_child = Some(child);
                break;
            }
            if baseline_child.is_none() {
                baseline_child = Some(child);
            }
        }

        match baseline_child {
            Some(child) => {
                self.baseline(child) + self.nodes[child].layout.position[Edge::Top.index()]
            }
            None => node.layout.measured_dimensions[1],
        }
    }

    fn is_baseline_layout(&self, id: NodeId) -> bool {
        let node = &self.nodes[id];
        if node.style.flex_direction.is_column() {
            return false;
        }
        if node.style.align_items == Align::Baseline {
            return true;
        }
        node.children.iter().any(|&child| {
            let style = &self.nodes[child].style;
            style.position_type == PositionType::Relative && style.align_self == Align::Baseline
        })
    }
}

fn clamp_inner(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return value;
    }
    // f64::min/max ignore a NaN bound
    value.min(max).max(min)
}

fn dim_with_margin(style: &Style, layout: &Layout, axis: FlexDirection, parent_size: DVec2) -> f64 {
    layout.measured_dimensions[axis_dimension(axis).index()] + style.margin_for_axis(axis, parent_size)
}

fn is_layout_dim_defined(layout: &Layout, axis: FlexDirection) -> bool {
    let value = layout.measured_dimensions[axis_dimension(axis).index()];
    !value.is_nan() && value >= 0.0
}

fn justify_offsets(justify: Justify, remaining: f64, items: usize) -> (f64, f64) {
    if items == 0 {
        return (0.0, 0.0);
    }
    match justify {
        Justify::FlexStart => (0.0, 0.0),
        Justify::Center => (remaining / 2.0, 0.0),
        Justify::FlexEnd => (remaining, 0.0),
        Justify::SpaceBetween if items > 1 => (0.0, remaining.max(0.0) / (items - 1) as f64),
        Justify::SpaceBetween => (0.0, 0.0),
        Justify::SpaceAround => {
            let between = remaining / items as f64;
            (between / 2.0, between)
        }
    }
}

fn set_child_trailing_position(layout: &mut Layout, parent_measured: [f64; 2], axis: FlexDirection) {
    let index = axis_dimension(axis).index();
    layout.position[trailing_edge(axis).index()] = parent_measured[index]
        - layout.measured_dimensions[index]
        - layout.position[leading_edge(axis).index()];
}

/// Offset for an absolute child lacking a leading inset: anchored by its
/// trailing inset, or centered/end-aligned by the parent's alignment.
#[allow(clippy::too_many_arguments)]
fn absolute_offset(
    style: &Style,
    layout: &Layout,
    axis: FlexDirection,
    parent_measured: [f64; 2],
    parent_trailing_border: f64,
    axis_size: f64,
    centered: bool,
    at_end: bool,
) -> Option<f64> {
    if style.is_leading_pos_defined(axis) {
        return None;
    }
    let index = axis_dimension(axis).index();
    let free = parent_measured[index] - layout.measured_dimensions[index];

    if style.is_trailing_pos_defined(axis) {
        Some(free - parent_trailing_border - style.trailing_position(axis, axis_size))
    } else if centered {
        Some(free / 2.0)
    } else if at_end {
        Some(free)
    } else {
        None
    }
}

/// Size a leaf through its measure function.
fn measure_leaf(
    node: &Node,
    measure: &MeasureFunc,
    constraints: &ConstraintBox,
    parent_width: f64,
    parent_height: f64,
) -> [f64; 2] {
    let style = &node.style;
    let parent_size = DVec2::new(parent_width, parent_height);
    let pb_row = style.padding_and_border_for_axis(ROW, parent_size);
    let pb_column = style.padding_and_border_for_axis(COLUMN, parent_size);
    let margin_row = style.margin_for_axis(ROW, parent_size);
    let margin_column = style.margin_for_axis(COLUMN, parent_size);

    let inner_width = constraints.width - margin_row - pb_row;
    let inner_height = constraints.height - margin_column - pb_column;

    let (width, height) = if constraints.width_mode == MeasureMode::Exactly
        && constraints.height_mode == MeasureMode::Exactly
    {
        (constraints.width - margin_row, constraints.height - margin_column)
    } else if inner_width <= 0.0 || inner_height <= 0.0 {
        (0.0, 0.0)
    } else {
        let size = measure(
            node,
            inner_width,
            constraints.width_mode,
            inner_height,
            constraints.height_mode,
        );
        let width = if constraints.width_mode == MeasureMode::Exactly {
            constraints.width - margin_row
        } else {
            size.x + pb_row
        };
        let height = if constraints.height_mode == MeasureMode::Exactly {
            constraints.height - margin_column
        } else {
            size.y + pb_column
        };
        (width, height)
    };

    [
        style.bound_axis(ROW, width, parent_size),
        style.bound_axis(COLUMN, height, parent_size),
    ]
}

fn empty_container_size(
    style: &Style,
    constraints: &ConstraintBox,
    parent_width: f64,
    parent_height: f64,
) -> [f64; 2] {
    let parent_size = DVec2::new(parent_width, parent_height);
    let width = match constraints.width_mode {
        MeasureMode::Exactly => constraints.width - style.margin_for_axis(ROW, parent_size),
        _ => style.padding_and_border_for_axis(ROW, parent_size),
    };
    let height = match constraints.height_mode {
        MeasureMode::Exactly => constraints.height - style.margin_for_axis(COLUMN, parent_size),
        _ => style.padding_and_border_for_axis(COLUMN, parent_size),
    };
    [
        style.bound_axis(ROW, width, parent_size),
        style.bound_axis(COLUMN, height, parent_size),
    ]
}

/// Measure-only shortcut when the constraints already fix the size.
fn fixed_container_size(
    style: &Style,
    constraints: &ConstraintBox,
    parent_width: f64,
    parent_height: f64,
) -> Option<[f64; 2]> {
    let ConstraintBox { width, width_mode, height, height_mode } = *constraints;
    let fixed = (width_mode == MeasureMode::AtMost && width <= 0.0)
        || (height_mode == MeasureMode::AtMost && height <= 0.0)
        || (width_mode == MeasureMode::Exactly && height_mode == MeasureMode::Exactly);
    if !fixed {
        return None;
    }

    let axis_size = |size: f64, mode: MeasureMode, margin: f64| {
        if size.is_nan() || (mode == MeasureMode::AtMost && size < 0.0) {
            0.0
        } else {
            size - margin
        }
    };
    let parent_size = DVec2::new(parent_width, parent_height);
    Some([
        style.bound_axis(
            ROW,
            axis_size(width, width_mode, style.margin_for_axis(ROW, parent_size)),
            parent_size,
        ),
        style.bound_axis(
            COLUMN,
            axis_size(height, height_mode, style.margin_for_axis(COLUMN, parent_size)),
            parent_size,
        ),
    ])
}
