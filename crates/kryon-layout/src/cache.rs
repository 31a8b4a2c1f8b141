// crates/kryon-layout/src/cache.rs
//! Per-node memoization of measure and layout results.

use kryon_core::{floats_equal, MeasureMode};

use crate::constraints::ConstraintBox;

pub const MAX_CACHED_MEASUREMENTS: usize = 16;

/// Constraints a node was sized under and the border-box size it produced.
#[derive(Debug, Clone, Copy, Default)]
pub struct CachedMeasurement {
    pub constraints: ConstraintBox,
    pub computed_width: f64,
    pub computed_height: f64,
}

/// Fixed ring of measure-only results plus one slot for the last full layout.
#[derive(Debug, Clone, Default)]
pub struct MeasurementCache {
    entries: [CachedMeasurement; MAX_CACHED_MEASUREMENTS],
    cursor: usize,
    len: usize,
    pub layout: Option<CachedMeasurement>,
}

impl MeasurementCache {
    pub fn clear(&mut self) {
        self.cursor = 0;
        self.len = 0;
        self.layout = None;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Valid ring entries in slot order.
    pub fn entries(&self) -> &[CachedMeasurement] {
        &self.entries[..self.len]
    }

    /// Write at the cursor, overwriting the oldest entry once the ring is full.
    pub fn push(&mut self, entry: CachedMeasurement) {
        self.entries[self.cursor] = entry;
        self.cursor = (self.cursor + 1) % MAX_CACHED_MEASUREMENTS;
        self.len = (self.len + 1).min(MAX_CACHED_MEASUREMENTS);
    }

    pub fn find_exact(&self, constraints: &ConstraintBox) -> Option<CachedMeasurement> {
        self.entries().iter().find(|entry| entry.constraints.same_as(constraints)).copied()
    }

    pub fn layout_matches(&self, constraints: &ConstraintBox) -> Option<CachedMeasurement> {
        self.layout.filter(|entry| entry.constraints.same_as(constraints))
    }

    /// Lookup for leaves with a measure function: the layout slot first, then
    /// any compatible ring entry.
    pub fn find_compatible(
        &self,
        constraints: &ConstraintBox,
        margin_row: f64,
        margin_column: f64,
    ) -> Option<CachedMeasurement> {
        if let Some(entry) = self.layout {
            if can_use_cached_measurement(constraints, margin_row, margin_column, &entry) {
                return Some(entry);
            }
        }
        self.entries()
            .iter()
            .find(|entry| can_use_cached_measurement(constraints, margin_row, margin_column, entry))
            .copied()
    }
}

fn size_is_exact_and_matches_old_measured_size(mode: MeasureMode, size: f64, last_computed: f64) -> bool {
    mode == MeasureMode::Exactly && floats_equal(size, last_computed)
}

fn old_size_is_unspecified_and_still_fits(
    mode: MeasureMode,
    size: f64,
    last_mode: MeasureMode,
    last_computed: f64,
) -> bool {
    mode == MeasureMode::AtMost
        && last_mode == MeasureMode::Undefined
        && (size >= last_computed || floats_equal(size, last_computed))
}

fn new_measure_size_is_stricter_and_still_valid(
    mode: MeasureMode,
    size: f64,
    last_mode: MeasureMode,
    last_size: f64,
    last_computed: f64,
) -> bool {
    last_mode == MeasureMode::AtMost
        && mode == MeasureMode::AtMost
        && last_size > size
        && (last_computed <= size || floats_equal(size, last_computed))
}

fn axis_is_compatible(
    mode: MeasureMode,
    size: f64,
    last_mode: MeasureMode,
    last_size: f64,
    last_computed: f64,
) -> bool {
    (last_mode == mode && floats_equal(last_size, size))
        || size_is_exact_and_matches_old_measured_size(mode, size, last_computed)
        || old_size_is_unspecified_and_still_fits(mode, size, last_mode, last_computed)
        || new_measure_size_is_stricter_and_still_valid(mode, size, last_mode, last_size, last_computed)
}

/// Whether a previous measurement of a leaf still answers `constraints`.
///
/// Sizes in `constraints` include margins while the cached computed sizes do
/// not, so margins are removed before comparing against them.
pub fn can_use_cached_measurement(
    constraints: &ConstraintBox,
    margin_row: f64,
    margin_column: f64,
    last: &CachedMeasurement,
) -> bool {
    if last.computed_width < 0.0 || last.computed_height < 0.0 {
        return false;
    }
    let previous = &last.constraints;

    let width_ok = axis_is_compatible(
        constraints.width_mode,
        constraints.width - margin_row,
        previous.width_mode,
        previous.width - margin_row,
        last.computed_width,
    );

    let height_ok = axis_is_compatible(
        constraints.height_mode,
        constraints.height - margin_column,
        previous.height_mode,
        previous.height - margin_column,
        last.computed_height,
    );

    width_ok && height_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(width: f64, width_mode: MeasureMode, computed_width: f64) -> CachedMeasurement {
        CachedMeasurement {
            constraints: ConstraintBox::new(width, width_mode, f64::NAN, MeasureMode::Undefined),
            computed_width,
            computed_height: 10.0,
        }
    }

    fn query(width: f64, width_mode: MeasureMode) -> ConstraintBox {
        ConstraintBox::new(width, width_mode, f64::NAN, MeasureMode::Undefined)
    }

    #[test]
    fn test_ring_evicts_oldest() {
        let mut cache = MeasurementCache::default();
        for i in 0..MAX_CACHED_MEASUREMENTS {
            cache.push(entry(i as f64, MeasureMode::Exactly, i as f64));
        }
        assert_eq!(cache.len(), MAX_CACHED_MEASUREMENTS);
        assert!(cache.find_exact(&query(0.0, MeasureMode::Exactly)).is_some());

        cache.push(entry(100.0, MeasureMode::Exactly, 100.0));
        assert_eq!(cache.len(), MAX_CACHED_MEASUREMENTS);
        assert!(cache.find_exact(&query(0.0, MeasureMode::Exactly)).is_none());
        assert!(cache.find_exact(&query(1.0, MeasureMode::Exactly)).is_some());
        assert!(cache.find_exact(&query(100.0, MeasureMode::Exactly)).is_some());
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut cache = MeasurementCache::default();
        cache.push(entry(5.0, MeasureMode::AtMost, 5.0));
        cache.layout = Some(entry(5.0, MeasureMode::Exactly, 5.0));
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.layout.is_none());
        assert!(cache.find_exact(&query(5.0, MeasureMode::AtMost)).is_none());
    }

    #[test]
    fn test_exact_size_matching_previous_result() {
        let last = entry(f64::NAN, MeasureMode::Undefined, 40.0);
        assert!(can_use_cached_measurement(&query(40.0, MeasureMode::Exactly), 0.0, 0.0, &last));
        assert!(!can_use_cached_measurement(&query(41.0, MeasureMode::Exactly), 0.0, 0.0, &last));
        // margins are stripped before comparing
        assert!(can_use_cached_measurement(&query(50.0, MeasureMode::Exactly), 10.0, 0.0, &last));
    }

    #[test]
    fn test_at_most_that_fits_unconstrained_result() {
        let last = entry(f64::NAN, MeasureMode::Undefined, 40.0);
        assert!(can_use_cached_measurement(&query(60.0, MeasureMode::AtMost), 0.0, 0.0, &last));
        assert!(!can_use_cached_measurement(&query(30.0, MeasureMode::AtMost), 0.0, 0.0, &last));
    }

    #[test]
    fn test_stricter_at_most_still_valid() {
        let last = entry(100.0, MeasureMode::AtMost, 40.0);
        assert!(can_use_cached_measurement(&query(50.0, MeasureMode::AtMost), 0.0, 0.0, &last));
        assert!(!can_use_cached_measurement(&query(30.0, MeasureMode::AtMost), 0.0, 0.0, &last));
        // a looser bound could produce a wider result
        assert!(!can_use_cached_measurement(&query(150.0, MeasureMode::AtMost), 0.0, 0.0, &last));
    }

    #[test]
    fn test_negative_results_never_reused() {
        let last = entry(10.0, MeasureMode::Exactly, -1.0);
        assert!(!can_use_cached_measurement(&query(10.0, MeasureMode::Exactly), 0.0, 0.0, &last));
    }
}
