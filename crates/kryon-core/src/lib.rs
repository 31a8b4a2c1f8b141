// crates/kryon-core/src/lib.rs
pub mod layout_units;
pub mod properties;
pub mod style;

pub use layout_units::*;
pub use properties::*;
pub use style::*;

#[derive(Debug, thiserror::Error)]
pub enum KryonError {
    #[error("Cannot resolve shorthand edge {0:?} directly")]
    MultiEdgeShorthand(Edge),

    #[error("Child already has a parent, remove it first")]
    ChildHasParent,

    #[error("Node cannot become a descendant of itself")]
    WouldCreateCycle,

    #[error("Cannot add a child to a node with a measure function")]
    MeasuredNodeChildren,

    #[error("Cannot set a measure function on a node with children")]
    MeasureFuncWithChildren,

    #[error("Only leaf nodes with a measure function can be marked dirty")]
    MarkDirtyWithoutMeasure,

    #[error("Node not found")]
    NodeNotFound,

    #[error("Child index {index} out of bounds (len {len})")]
    ChildIndexOutOfBounds { index: usize, len: usize },

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, KryonError>;
