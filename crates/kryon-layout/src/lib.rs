// crates/kryon-layout/src/lib.rs
//! Flexbox layout over an arena of style nodes.
//!
//! Build a tree with [`LayoutTree`], set styles through its setters, then call
//! [`LayoutTree::compute_layout`] on the root and read each node's [`Layout`].

mod algorithm;
mod engine;

pub mod box_model;
pub mod cache;
pub mod constraints;
pub mod flexbox;
pub mod node;
pub mod print;
pub mod tree;

pub use box_model::BoxModel;
pub use cache::{CachedMeasurement, MeasurementCache, MAX_CACHED_MEASUREMENTS};
pub use constraints::ConstraintBox;
pub use node::{BaselineFunc, Layout, MeasureFunc, Node, NodeId, PrintFunc};
pub use print::PrintOptions;
pub use tree::LayoutTree;

pub use kryon_core::{
    Align, Dimension, Direction, Edge, FlexDirection, Justify, KryonError, MeasureMode, Overflow,
    PositionType, Result, Style, Unit, Value, Wrap,
};
