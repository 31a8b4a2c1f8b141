// crates/kryon-layout/src/constraints.rs

use kryon_core::{floats_equal, Dimension, MeasureMode};

/// Available size and measure mode for both axes. Sizes include the node's
/// margins; NaN means the axis is unconstrained.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintBox {
    pub width: f64,
    pub width_mode: MeasureMode,
    pub height: f64,
    pub height_mode: MeasureMode,
}

impl Default for ConstraintBox {
    fn default() -> Self {
        Self {
            width: f64::NAN,
            width_mode: MeasureMode::Undefined,
            height: f64::NAN,
            height_mode: MeasureMode::Undefined,
        }
    }
}

impl ConstraintBox {
    pub fn new(width: f64, width_mode: MeasureMode, height: f64, height_mode: MeasureMode) -> Self {
        Self { width, width_mode, height, height_mode }
    }

    pub fn with_fixed_size(width: f64, height: f64) -> Self {
        Self::new(width, MeasureMode::Exactly, height, MeasureMode::Exactly)
    }

    pub fn size(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Width => self.width,
            Dimension::Height => self.height,
        }
    }

    pub fn mode(&self, dimension: Dimension) -> MeasureMode {
        match dimension {
            Dimension::Width => self.width_mode,
            Dimension::Height => self.height_mode,
        }
    }

    /// Same modes and sizes equal under epsilon, NaN matching NaN.
    pub fn same_as(&self, other: &ConstraintBox) -> bool {
        self.width_mode == other.width_mode
            && self.height_mode == other.height_mode
            && floats_equal(self.width, other.width)
            && floats_equal(self.height, other.height)
    }
}

/// `Exactly` for a known size, `Undefined` for NaN.
pub fn mode_for_size(size: f64) -> MeasureMode {
    if size.is_nan() {
        MeasureMode::Undefined
    } else {
        MeasureMode::Exactly
    }
}

/// Tighten a size/mode pair with a max size (already including margins).
pub fn constrain_max_size_for_mode(max_size: f64, mode: &mut MeasureMode, size: &mut f64) {
    match *mode {
        MeasureMode::Exactly | MeasureMode::AtMost => {
            if !max_size.is_nan() && *size >= max_size {
                *size = max_size;
            }
        }
        MeasureMode::Undefined => {
            if !max_size.is_nan() {
                *mode = MeasureMode::AtMost;
                *size = max_size;
            }
        }
    }
}
