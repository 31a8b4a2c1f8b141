// crates/kryon-layout/src/node.rs

use std::any::Any;
use std::fmt;

use glam::DVec2;
use kryon_core::{Dimension, Direction, Edge, KryonError, MeasureMode, Result, Style};
use slotmap::new_key_type;

use crate::cache::MeasurementCache;

new_key_type! {
    /// Handle to a node owned by a [`crate::LayoutTree`].
    pub struct NodeId;
}

/// Sizes a leaf: `(node, width, width_mode, height, height_mode) -> (width, height)`.
/// The available sizes exclude the leaf's margin, padding and border.
pub type MeasureFunc = Box<dyn Fn(&Node, f64, MeasureMode, f64, MeasureMode) -> DVec2>;

/// Distance from the node's top edge to its first baseline, given its measured size.
pub type BaselineFunc = Box<dyn Fn(&Node, f64, f64) -> f64>;

/// Extra text appended to a node's line in the debug dump.
pub type PrintFunc = Box<dyn Fn(&Node) -> String>;

/// Computed output of a layout pass. Only meaningful after a pass that reached the node.
#[derive(Debug, Clone)]
pub struct Layout {
    pub(crate) position: [f64; 4],
    pub(crate) dimensions: [f64; 2],
    pub(crate) margin: [f64; 6],
    pub(crate) padding: [f64; 6],
    pub(crate) direction: Direction,
    pub(crate) computed_flex_basis: f64,
    pub(crate) computed_flex_basis_generation: u32,
    pub(crate) generation_count: u32,
    pub(crate) last_parent_direction: Option<Direction>,
    pub(crate) measured_dimensions: [f64; 2],
    pub(crate) cache: MeasurementCache,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            position: [0.0; 4],
            dimensions: [f64::NAN; 2],
            margin: [0.0; 6],
            padding: [0.0; 6],
            direction: Direction::Inherit,
            computed_flex_basis: f64::NAN,
            computed_flex_basis_generation: 0,
            generation_count: 0,
            last_parent_direction: None,
            measured_dimensions: [f64::NAN; 2],
            cache: MeasurementCache::default(),
        }
    }
}

impl Layout {
    pub fn left(&self) -> f64 {
        self.position[Edge::Left.index()]
    }

    pub fn top(&self) -> f64 {
        self.position[Edge::Top.index()]
    }

    pub fn right(&self) -> f64 {
        self.position[Edge::Right.index()]
    }

    pub fn bottom(&self) -> f64 {
        self.position[Edge::Bottom.index()]
    }

    pub fn width(&self) -> f64 {
        self.dimensions[Dimension::Width.index()]
    }

    pub fn height(&self) -> f64 {
        self.dimensions[Dimension::Height.index()]
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Offset from the parent's border-box origin.
    pub fn position(&self) -> DVec2 {
        DVec2::new(self.left(), self.top())
    }

    pub fn size(&self) -> DVec2 {
        DVec2::new(self.width(), self.height())
    }

    pub fn measured_size(&self) -> DVec2 {
        DVec2::new(self.measured_dimensions[0], self.measured_dimensions[1])
    }

    pub fn computed_flex_basis(&self) -> f64 {
        self.computed_flex_basis
    }

    pub fn margin(&self, edge: Edge) -> Result<f64> {
        self.resolved_edge(&self.margin, edge)
    }

    pub fn padding(&self, edge: Edge) -> Result<f64> {
        self.resolved_edge(&self.padding, edge)
    }

    /// Left/right map onto the start/end slots according to the resolved direction.
    fn resolved_edge(&self, values: &[f64; 6], edge: Edge) -> Result<f64> {
        let rtl = self.direction == Direction::Rtl;
        let slot = match edge {
            Edge::Left if rtl => Edge::End,
            Edge::Left => Edge::Start,
            Edge::Right if rtl => Edge::Start,
            Edge::Right => Edge::End,
            Edge::Horizontal | Edge::Vertical | Edge::All => {
                return Err(KryonError::MultiEdgeShorthand(edge))
            }
            other => other,
        };
        Ok(values[slot.index()])
    }
}

pub struct Node {
    pub(crate) style: Style,
    pub(crate) layout: Layout,
    pub(crate) line_index: usize,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) measure: Option<MeasureFunc>,
    pub(crate) baseline: Option<BaselineFunc>,
    pub(crate) print: Option<PrintFunc>,
    pub(crate) context: Option<Box<dyn Any>>,
    pub(crate) is_dirty: bool,
    pub(crate) has_new_layout: bool,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            style: Style::default(),
            layout: Layout::default(),
            line_index: 0,
            parent: None,
            children: Vec::new(),
            measure: None,
            baseline: None,
            print: None,
            context: None,
            is_dirty: false,
            has_new_layout: true,
        }
    }
}

impl Node {
    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Index of the flex line this node landed on in its parent.
    pub fn line_index(&self) -> usize {
        self.line_index
    }

    pub fn has_measure_func(&self) -> bool {
        self.measure.is_some()
    }

    pub fn has_baseline_func(&self) -> bool {
        self.baseline.is_some()
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn has_new_layout(&self) -> bool {
        self.has_new_layout
    }

    /// Host data attached with [`crate::LayoutTree::set_context`].
    pub fn context<T: Any>(&self) -> Option<&T> {
        self.context.as_ref()?.downcast_ref::<T>()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("style", &self.style)
            .field("layout", &self.layout)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("has_measure_func", &self.measure.is_some())
            .field("has_baseline_func", &self.baseline.is_some())
            .field("is_dirty", &self.is_dirty)
            .field("has_new_layout", &self.has_new_layout)
            .finish()
    }
}
