// crates/kryon-layout/src/engine.rs

use glam::DVec2;
use kryon_core::{Dimension, Direction, FlexDirection, KryonError, MeasureMode, Result, Style};
use tracing::{debug, trace};

use crate::box_model::{axis_size, BoxModel};
use crate::cache::CachedMeasurement;
use crate::constraints::{mode_for_size, ConstraintBox};
use crate::flexbox::{cross_axis, leading_edge, resolve_flex_direction, trailing_edge};
use crate::node::NodeId;
use crate::tree::LayoutTree;

impl LayoutTree {
    /// Lay out the tree under `root` inside the given available space.
    ///
    /// NaN sizes leave the corresponding axis unconstrained. Results are read
    /// back through [`LayoutTree::layout`].
    pub fn compute_layout(
        &mut self,
        root: NodeId,
        available_width: f64,
        available_height: f64,
        direction: Direction,
    ) -> Result<()> {
        let style = &self.nodes.get(root).ok_or(KryonError::NodeNotFound)?.style;
        self.generation = self.generation.wrapping_add(1);

        let available = DVec2::new(available_width, available_height);
        let (width, width_mode) = root_size(style, FlexDirection::Row, Dimension::Width, available);
        let (height, height_mode) =
            root_size(style, FlexDirection::Column, Dimension::Height, available);

        debug!(
            generation = self.generation,
            width,
            %width_mode,
            height,
            %height_mode,
            %direction,
            "computing layout"
        );

        let constraints = ConstraintBox::new(width, width_mode, height, height_mode);
        let laid_out = self.layout_node_internal(
            root,
            constraints,
            direction,
            available_width,
            available_height,
            true,
            "initial",
        );

        if laid_out {
            let node = &self.nodes[root];
            let resolved = node.layout.direction;
            let main_axis = resolve_flex_direction(node.style.flex_direction, resolved);
            let cross = cross_axis(main_axis, resolved);
            let (main_size, cross_size) = if main_axis.is_row() {
                (available_width, available_height)
            } else {
                (available_height, available_width)
            };
            self.seed_child_position(root, main_axis, cross, main_size, cross_size, available);
        }

        debug!(generation = self.generation, laid_out, "layout complete");
        Ok(())
    }

    /// Size (and with `perform_layout`, arrange) a node, consulting its cache.
    ///
    /// Returns whether the node was actually visited rather than answered
    /// from the cache.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn layout_node_internal(
        &mut self,
        id: NodeId,
        constraints: ConstraintBox,
        parent_direction: Direction,
        parent_width: f64,
        parent_height: f64,
        perform_layout: bool,
        reason: &'static str,
    ) -> bool {
        let generation = self.generation;
        let node = &mut self.nodes[id];

        let needs_visit = (node.is_dirty && node.layout.generation_count != generation)
            || node.layout.last_parent_direction != Some(parent_direction);
        if needs_visit {
            node.layout.cache.clear();
        }

        let cached = if node.measure.is_some() {
            let parent_size = DVec2::new(parent_width, parent_height);
            let margin_row = node.style.margin_for_axis(FlexDirection::Row, parent_size);
            let margin_column = node.style.margin_for_axis(FlexDirection::Column, parent_size);
            node.layout.cache.find_compatible(&constraints, margin_row, margin_column)
        } else if perform_layout {
            node.layout.cache.layout_matches(&constraints)
        } else {
            node.layout.cache.find_exact(&constraints)
        };

        match cached {
            Some(hit) if !needs_visit => {
                trace!(?id, reason, width = hit.computed_width, height = hit.computed_height, "cache hit");
                node.layout.measured_dimensions = [hit.computed_width, hit.computed_height];
            }
            _ => {
                trace!(?id, reason, ?constraints, perform_layout, "cache miss");
                self.layout_impl(
                    id,
                    constraints,
                    parent_direction,
                    parent_width,
                    parent_height,
                    perform_layout,
                );

                let layout = &mut self.nodes[id].layout;
                layout.last_parent_direction = Some(parent_direction);
                if cached.is_none() {
                    let entry = CachedMeasurement {
                        constraints,
                        computed_width: layout.measured_dimensions[0],
                        computed_height: layout.measured_dimensions[1],
                    };
                    if perform_layout {
                        layout.cache.layout = Some(entry);
                    } else {
                        layout.cache.push(entry);
                    }
                }
            }
        }

        let node = &mut self.nodes[id];
        if perform_layout {
            node.layout.dimensions = node.layout.measured_dimensions;
            node.has_new_layout = true;
            node.is_dirty = false;
        }
        node.layout.generation_count = generation;

        needs_visit || cached.is_none()
    }

    /// Seed a node's position with its margins and relative offsets along the
    /// axes its parent places it on.
    pub(crate) fn seed_child_position(
        &mut self,
        id: NodeId,
        main_axis: FlexDirection,
        cross_axis: FlexDirection,
        main_size: f64,
        cross_size: f64,
        parent_size: DVec2,
    ) {
        let node = &mut self.nodes[id];
        let style = &node.style;
        let relative_main = style.relative_position(main_axis, main_size);
        let relative_cross = style.relative_position(cross_axis, cross_size);

        let position = &mut node.layout.position;
        position[leading_edge(main_axis).index()] =
            style.leading_margin(main_axis, parent_size) + relative_main;
        position[trailing_edge(main_axis).index()] =
            style.trailing_margin(main_axis, parent_size) + relative_main;
        position[leading_edge(cross_axis).index()] =
            style.leading_margin(cross_axis, parent_size) + relative_cross;
        position[trailing_edge(cross_axis).index()] =
            style.trailing_margin(cross_axis, parent_size) + relative_cross;
    }
}

/// Root constraints: the style size if definite, else its max size, else the
/// available space.
fn root_size(
    style: &Style,
    axis: FlexDirection,
    dimension: Dimension,
    available_size: DVec2,
) -> (f64, MeasureMode) {
    let available = axis_size(available_size, axis);
    if style.is_style_dim_defined(axis, available) {
        let size = style.resolved_dimension(dimension).resolve(available)
            + style.margin_for_axis(axis, available_size);
        return (size, MeasureMode::Exactly);
    }

    let max = style.max_dimension(dimension).resolve(available);
    if max >= 0.0 {
        return (max, MeasureMode::AtMost);
    }

    (available, mode_for_size(available))
}
