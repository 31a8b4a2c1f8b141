// crates/kryon-layout/src/tree.rs

use std::any::Any;

use kryon_core::{
    floats_equal, Align, Dimension, Direction, Edge, FlexDirection, Justify, KryonError, Overflow,
    PositionType, Result, Style, Unit, Value, Wrap,
};
use slotmap::SlotMap;
use tracing::trace;

use crate::node::{BaselineFunc, Layout, MeasureFunc, Node, NodeId, PrintFunc};

/// Arena owning every node. Parent links are plain keys, so removing a node
/// only has to fix up its neighbours.
#[derive(Debug, Default)]
pub struct LayoutTree {
    pub(crate) nodes: SlotMap<NodeId, Node>,
    pub(crate) generation: u32,
}

impl LayoutTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_node(&mut self) -> NodeId {
        self.nodes.insert(Node::default())
    }

    pub fn new_node_with_style(&mut self, style: Style) -> NodeId {
        self.nodes.insert(Node { style, ..Node::default() })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(KryonError::NodeNotFound)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id).ok_or(KryonError::NodeNotFound)
    }

    pub fn style(&self, id: NodeId) -> Result<&Style> {
        Ok(&self.node(id)?.style)
    }

    pub fn layout(&self, id: NodeId) -> Result<&Layout> {
        Ok(&self.node(id)?.layout)
    }

    // ---- Tree structure ----

    pub fn insert_child(&mut self, parent: NodeId, child: NodeId, index: usize) -> Result<()> {
        let child_node = self.node(child)?;
        if child_node.parent.is_some() {
            return Err(KryonError::ChildHasParent);
        }

        let mut ancestor = Some(parent);
        while let Some(current) = ancestor {
            if current == child {
                return Err(KryonError::WouldCreateCycle);
            }
            ancestor = self.node(current)?.parent;
        }

        let parent_node = self.node(parent)?;
        if parent_node.measure.is_some() {
            return Err(KryonError::MeasuredNodeChildren);
        }
        let len = parent_node.children.len();
        if index > len {
            return Err(KryonError::ChildIndexOutOfBounds { index, len });
        }

        self.node_mut(parent)?.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        self.mark_dirty_internal(parent);
        Ok(())
    }

    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let index = self.child_count(parent)?;
        self.insert_child(parent, child, index)
    }

    /// Detach `child` from `parent`. Does nothing if it is not a child.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_node = self.node_mut(parent)?;
        let Some(index) = parent_node.children.iter().position(|&id| id == child) else {
            return Ok(());
        };
        parent_node.children.remove(index);

        if let Some(child_node) = self.nodes.get_mut(child) {
            child_node.layout = Layout::default();
            child_node.parent = None;
        }
        self.mark_dirty_internal(parent);
        Ok(())
    }

    pub fn child_count(&self, id: NodeId) -> Result<usize> {
        Ok(self.node(id)?.children.len())
    }

    pub fn child(&self, id: NodeId, index: usize) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.children.get(index).copied())
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    /// Free a node. Its children are detached and become roots.
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        if let Some(parent) = self.node(id)?.parent {
            self.remove_child(parent, id)?;
        }

        let Some(node) = self.nodes.remove(id) else {
            return Err(KryonError::NodeNotFound);
        };
        for child in node.children {
            if let Some(child_node) = self.nodes.get_mut(child) {
                child_node.parent = None;
            }
        }
        Ok(())
    }

    /// Free a node and every descendant.
    pub fn remove_subtree(&mut self, id: NodeId) -> Result<()> {
        if let Some(parent) = self.node(id)?.parent {
            self.remove_child(parent, id)?;
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current) {
                stack.extend(node.children);
            }
        }
        Ok(())
    }

    // ---- Callbacks and host data ----

    /// Replacing the callback dirties the node, since cached sizes came
    /// from the old one.
    pub fn set_measure_func(&mut self, id: NodeId, measure: Option<MeasureFunc>) -> Result<()> {
        let node = self.node_mut(id)?;
        if measure.is_some() && !node.children.is_empty() {
            return Err(KryonError::MeasureFuncWithChildren);
        }
        let had_measure = node.measure.is_some();
        node.measure = measure;
        if had_measure || node.measure.is_some() {
            self.mark_dirty_internal(id);
        }
        Ok(())
    }

    pub fn set_baseline_func(&mut self, id: NodeId, baseline: Option<BaselineFunc>) -> Result<()> {
        let node = self.node_mut(id)?;
        let had_baseline = node.baseline.is_some();
        node.baseline = baseline;
        if had_baseline || node.baseline.is_some() {
            self.mark_dirty_internal(id);
        }
        Ok(())
    }

    pub fn set_print_func(&mut self, id: NodeId, print: Option<PrintFunc>) -> Result<()> {
        self.node_mut(id)?.print = print;
        Ok(())
    }

    pub fn set_context<T: Any>(&mut self, id: NodeId, context: T) -> Result<()> {
        self.node_mut(id)?.context = Some(Box::new(context));
        Ok(())
    }

    pub fn context<T: Any>(&self, id: NodeId) -> Result<Option<&T>> {
        Ok(self.node(id)?.context::<T>())
    }

    // ---- Dirtiness ----

    /// Hosts call this when a measured leaf's content changed.
    pub fn mark_dirty(&mut self, id: NodeId) -> Result<()> {
        if self.node(id)?.measure.is_none() {
            return Err(KryonError::MarkDirtyWithoutMeasure);
        }
        self.mark_dirty_internal(id);
        Ok(())
    }

    pub fn is_dirty(&self, id: NodeId) -> Result<bool> {
        Ok(self.node(id)?.is_dirty)
    }

    pub fn has_new_layout(&self, id: NodeId) -> Result<bool> {
        Ok(self.node(id)?.has_new_layout)
    }

    pub fn set_has_new_layout(&mut self, id: NodeId, has_new_layout: bool) -> Result<()> {
        self.node_mut(id)?.has_new_layout = has_new_layout;
        Ok(())
    }

    /// Dirty `id` and its ancestors, stopping at the first one already dirty.
    pub(crate) fn mark_dirty_internal(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(id) = current {
            let Some(node) = self.nodes.get_mut(id) else {
                return;
            };
            if node.is_dirty {
                return;
            }
            trace!(?id, "marking dirty");
            node.is_dirty = true;
            node.layout.computed_flex_basis = f64::NAN;
            current = node.parent;
        }
    }

    // ---- Style ----

    /// Apply `update` to the node's style and dirty it if anything changed.
    fn update_style(&mut self, id: NodeId, update: impl FnOnce(&mut Style) -> bool) -> Result<()> {
        if update(&mut self.node_mut(id)?.style) {
            self.mark_dirty_internal(id);
        }
        Ok(())
    }

    pub fn set_style(&mut self, id: NodeId, style: Style) -> Result<()> {
        self.node_mut(id)?.style = style;
        self.mark_dirty_internal(id);
        Ok(())
    }

    pub fn copy_style(&mut self, dst: NodeId, src: NodeId) -> Result<()> {
        let style = self.node(src)?.style.clone();
        self.set_style(dst, style)
    }

    pub fn set_direction(&mut self, id: NodeId, direction: Direction) -> Result<()> {
        self.update_style(id, |style| replace(&mut style.direction, direction))
    }

    pub fn set_flex_direction(&mut self, id: NodeId, flex_direction: FlexDirection) -> Result<()> {
        self.update_style(id, |style| replace(&mut style.flex_direction, flex_direction))
    }

    pub fn set_justify_content(&mut self, id: NodeId, justify: Justify) -> Result<()> {
        self.update_style(id, |style| replace(&mut style.justify_content, justify))
    }

    pub fn set_align_content(&mut self, id: NodeId, align: Align) -> Result<()> {
        self.update_style(id, |style| replace(&mut style.align_content, align))
    }

    pub fn set_align_items(&mut self, id: NodeId, align: Align) -> Result<()> {
        self.update_style(id, |style| replace(&mut style.align_items, align))
    }

    pub fn set_align_self(&mut self, id: NodeId, align: Align) -> Result<()> {
        self.update_style(id, |style| replace(&mut style.align_self, align))
    }

    pub fn set_position_type(&mut self, id: NodeId, position_type: PositionType) -> Result<()> {
        self.update_style(id, |style| replace(&mut style.position_type, position_type))
    }

    pub fn set_flex_wrap(&mut self, id: NodeId, wrap: Wrap) -> Result<()> {
        self.update_style(id, |style| replace(&mut style.flex_wrap, wrap))
    }

    pub fn set_overflow(&mut self, id: NodeId, overflow: Overflow) -> Result<()> {
        self.update_style(id, |style| replace(&mut style.overflow, overflow))
    }

    pub fn set_flex(&mut self, id: NodeId, flex: f64) -> Result<()> {
        self.update_style(id, |style| replace_float(&mut style.flex, flex))
    }

    pub fn set_flex_grow(&mut self, id: NodeId, grow: f64) -> Result<()> {
        self.update_style(id, |style| replace_float(&mut style.flex_grow, grow))
    }

    pub fn set_flex_shrink(&mut self, id: NodeId, shrink: f64) -> Result<()> {
        self.update_style(id, |style| replace_float(&mut style.flex_shrink, shrink))
    }

    pub fn set_aspect_ratio(&mut self, id: NodeId, aspect_ratio: f64) -> Result<()> {
        self.update_style(id, |style| replace_float(&mut style.aspect_ratio, aspect_ratio))
    }

    pub fn set_flex_basis(&mut self, id: NodeId, basis: f64) -> Result<()> {
        self.update_style(id, |style| style.flex_basis.assign(basis, Unit::Pixel))
    }

    pub fn set_flex_basis_percent(&mut self, id: NodeId, basis: f64) -> Result<()> {
        self.update_style(id, |style| style.flex_basis.assign(basis, Unit::Percent))
    }

    pub fn set_margin(&mut self, id: NodeId, edge: Edge, margin: f64) -> Result<()> {
        self.update_style(id, |style| style.margin.get_mut(edge).assign(margin, Unit::Pixel))
    }

    pub fn set_margin_percent(&mut self, id: NodeId, edge: Edge, margin: f64) -> Result<()> {
        self.update_style(id, |style| style.margin.get_mut(edge).assign(margin, Unit::Percent))
    }

    pub fn set_position(&mut self, id: NodeId, edge: Edge, position: f64) -> Result<()> {
        self.update_style(id, |style| style.position.get_mut(edge).assign(position, Unit::Pixel))
    }

    pub fn set_position_percent(&mut self, id: NodeId, edge: Edge, position: f64) -> Result<()> {
        self.update_style(id, |style| style.position.get_mut(edge).assign(position, Unit::Percent))
    }

    pub fn set_padding(&mut self, id: NodeId, edge: Edge, padding: f64) -> Result<()> {
        self.update_style(id, |style| style.padding.get_mut(edge).assign(padding, Unit::Pixel))
    }

    pub fn set_padding_percent(&mut self, id: NodeId, edge: Edge, padding: f64) -> Result<()> {
        self.update_style(id, |style| style.padding.get_mut(edge).assign(padding, Unit::Percent))
    }

    pub fn set_border(&mut self, id: NodeId, edge: Edge, border: f64) -> Result<()> {
        self.update_style(id, |style| style.border.get_mut(edge).assign(border, Unit::Pixel))
    }

    /// Store an already parsed value, e.g. from `"50%"`.
    pub fn set_dimension_value(&mut self, id: NodeId, dimension: Dimension, value: Value) -> Result<()> {
        self.update_style(id, |style| {
            style.dimensions[dimension.index()].assign(value.magnitude, value.unit)
        })
    }

    pub fn set_width(&mut self, id: NodeId, width: f64) -> Result<()> {
        self.update_style(id, |style| style.dimensions[0].assign(width, Unit::Pixel))
    }

    pub fn set_width_percent(&mut self, id: NodeId, width: f64) -> Result<()> {
        self.update_style(id, |style| style.dimensions[0].assign(width, Unit::Percent))
    }

    pub fn set_height(&mut self, id: NodeId, height: f64) -> Result<()> {
        self.update_style(id, |style| style.dimensions[1].assign(height, Unit::Pixel))
    }

    pub fn set_height_percent(&mut self, id: NodeId, height: f64) -> Result<()> {
        self.update_style(id, |style| style.dimensions[1].assign(height, Unit::Percent))
    }

    pub fn set_min_width(&mut self, id: NodeId, width: f64) -> Result<()> {
        self.update_style(id, |style| style.min_dimensions[0].assign(width, Unit::Pixel))
    }

    pub fn set_min_width_percent(&mut self, id: NodeId, width: f64) -> Result<()> {
        self.update_style(id, |style| style.min_dimensions[0].assign(width, Unit::Percent))
    }

    pub fn set_min_height(&mut self, id: NodeId, height: f64) -> Result<()> {
        self.update_style(id, |style| style.min_dimensions[1].assign(height, Unit::Pixel))
    }

    pub fn set_min_height_percent(&mut self, id: NodeId, height: f64) -> Result<()> {
        self.update_style(id, |style| style.min_dimensions[1].assign(height, Unit::Percent))
    }

    pub fn set_max_width(&mut self, id: NodeId, width: f64) -> Result<()> {
        self.update_style(id, |style| style.max_dimensions[0].assign(width, Unit::Pixel))
    }

    pub fn set_max_width_percent(&mut self, id: NodeId, width: f64) -> Result<()> {
        self.update_style(id, |style| style.max_dimensions[0].assign(width, Unit::Percent))
    }

    pub fn set_max_height(&mut self, id: NodeId, height: f64) -> Result<()> {
        self.update_style(id, |style| style.max_dimensions[1].assign(height, Unit::Pixel))
    }

    pub fn set_max_height_percent(&mut self, id: NodeId, height: f64) -> Result<()> {
        self.update_style(id, |style| style.max_dimensions[1].assign(height, Unit::Percent))
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

fn replace_float(slot: &mut f64, value: f64) -> bool {
    if floats_equal(*slot, value) {
        return false;
    }
    *slot = value;
    true
}
