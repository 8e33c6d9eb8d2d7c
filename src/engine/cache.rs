//! Measurement Cache - Per-node memo of earlier layout passes.
//!
//! Each node keeps one slot for its last full layout and a small ring of
//! measure-only results. Entries are keyed by the constraints they were
//! computed under.
//!
//! # Reuse rule
//!
//! For nodes with a measure function, an entry answers a new request when,
//! on each axis independently, one of these holds:
//!
//! 1. Same mode and same available size.
//! 2. The request is `Exactly` and its size equals the size computed before.
//! 3. The request is `AtMost`, the entry was `Undefined`, and the size
//!    computed before still fits.
//! 4. Both are `AtMost`, the request is stricter, and the size computed
//!    before still fits.
//!
//! Cases 2-4 compare against the request minus the node's margins. With a
//! nonzero point scale factor, available sizes are compared after rounding
//! to the pixel grid. Every case returns a size a fresh measurement would
//! also accept under the new request.
//!
//! Container nodes only reuse on an exact constraint match (rule 1).
//! The ring holds [`MAX_CACHED_MEASUREMENTS`] entries; when full, the oldest
//! is overwritten.

use crate::layout::round_value_to_pixel_grid;
use crate::types::{floats_equal, MeasureMode, Size};

pub const MAX_CACHED_MEASUREMENTS: usize = 16;

/// Constraints a layout pass was run under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraints {
    pub width: f32,
    pub width_mode: MeasureMode,
    pub height: f32,
    pub height_mode: MeasureMode,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedMeasurement {
    pub constraints: Constraints,
    pub computed: Size,
}

/// Bounded memo of earlier results for one node.
#[derive(Debug, Clone, Default)]
pub struct MeasureCache {
    layout: Option<CachedMeasurement>,
    entries: [Option<CachedMeasurement>; MAX_CACHED_MEASUREMENTS],
    next: usize,
}

impl MeasureCache {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Number of measure-only entries held.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.layout.is_none() && self.entries.iter().all(Option::is_none)
    }

    /// Look up a result for a node with a measure function.
    pub(crate) fn find_measured(
        &self,
        request: &Constraints,
        margin_row: f32,
        margin_column: f32,
        point_scale_factor: f32,
    ) -> Option<Size> {
        let compatible = |entry: &CachedMeasurement| {
            can_use_cached_measurement(
                request,
                entry,
                margin_row,
                margin_column,
                point_scale_factor,
            )
        };
        self.layout
            .iter()
            .chain(self.entries.iter().flatten())
            .find(|entry| compatible(entry))
            .map(|entry| entry.computed)
    }

    /// Look up a result for a container, which needs an exact constraint match.
    pub(crate) fn find_exact(&self, request: &Constraints, perform_layout: bool) -> Option<Size> {
        let matches = |entry: &&CachedMeasurement| same_constraints(&entry.constraints, request);
        if perform_layout {
            self.layout.as_ref().filter(matches).map(|entry| entry.computed)
        } else {
            self.entries.iter().flatten().find(matches).map(|entry| entry.computed)
        }
    }

    pub(crate) fn store(&mut self, perform_layout: bool, constraints: Constraints, computed: Size) {
        let entry = Some(CachedMeasurement { constraints, computed });
        if perform_layout {
            self.layout = entry;
        } else {
            if self.entries[self.next].is_some() {
                log::trace!("measure cache full, evicting slot {}", self.next);
            }
            self.entries[self.next] = entry;
            self.next = (self.next + 1) % MAX_CACHED_MEASUREMENTS;
        }
    }
}

#[inline]
fn same_constraints(a: &Constraints, b: &Constraints) -> bool {
    a.width_mode == b.width_mode
        && a.height_mode == b.height_mode
        && floats_equal(a.width, b.width)
        && floats_equal(a.height, b.height)
}

#[inline]
fn size_is_exact_and_matches_old_measured_size(
    mode: MeasureMode,
    size: f32,
    last_computed: f32,
) -> bool {
    mode == MeasureMode::Exactly && floats_equal(size, last_computed)
}

#[inline]
fn old_size_is_unspecified_and_still_fits(
    mode: MeasureMode,
    size: f32,
    last_mode: MeasureMode,
    last_computed: f32,
) -> bool {
    mode == MeasureMode::AtMost
        && last_mode == MeasureMode::Undefined
        && (size >= last_computed || floats_equal(size, last_computed))
}

#[inline]
fn new_measure_size_is_stricter_and_still_valid(
    mode: MeasureMode,
    size: f32,
    last_mode: MeasureMode,
    last_size: f32,
    last_computed: f32,
) -> bool {
    last_mode == MeasureMode::AtMost
        && mode == MeasureMode::AtMost
        && last_size > size
        && (last_computed <= size || floats_equal(size, last_computed))
}

/// Whether `entry` may stand in for a fresh measurement under `request`.
pub fn can_use_cached_measurement(
    request: &Constraints,
    entry: &CachedMeasurement,
    margin_row: f32,
    margin_column: f32,
    point_scale_factor: f32,
) -> bool {
    let last = &entry.constraints;
    let computed = entry.computed;
    if computed.width < 0.0 || computed.height < 0.0 {
        return false;
    }

    let round = |value: f32| {
        if point_scale_factor != 0.0 {
            round_value_to_pixel_grid(value, point_scale_factor, false, false)
        } else {
            value
        }
    };

    let same_width = last.width_mode == request.width_mode
        && floats_equal(round(last.width), round(request.width));
    let same_height = last.height_mode == request.height_mode
        && floats_equal(round(last.height), round(request.height));

    let width = request.width - margin_row;
    let height = request.height - margin_column;

    let width_ok = same_width
        || size_is_exact_and_matches_old_measured_size(request.width_mode, width, computed.width)
        || old_size_is_unspecified_and_still_fits(
            request.width_mode,
            width,
            last.width_mode,
            computed.width,
        )
        || new_measure_size_is_stricter_and_still_valid(
            request.width_mode,
            width,
            last.width_mode,
            last.width,
            computed.width,
        );

    let height_ok = same_height
        || size_is_exact_and_matches_old_measured_size(request.height_mode, height, computed.height)
        || old_size_is_unspecified_and_still_fits(
            request.height_mode,
            height,
            last.height_mode,
            computed.height,
        )
        || new_measure_size_is_stricter_and_still_valid(
            request.height_mode,
            height,
            last.height_mode,
            last.height,
            computed.height,
        );

    width_ok && height_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UNDEFINED;

    fn constraints(
        width: f32,
        width_mode: MeasureMode,
        height: f32,
        height_mode: MeasureMode,
    ) -> Constraints {
        Constraints { width, width_mode, height, height_mode }
    }

    fn entry(c: Constraints, width: f32, height: f32) -> CachedMeasurement {
        CachedMeasurement { constraints: c, computed: Size::new(width, height) }
    }

    #[test]
    fn test_same_constraints_reuse() {
        let c = constraints(UNDEFINED, MeasureMode::Undefined, UNDEFINED, MeasureMode::Undefined);
        assert!(can_use_cached_measurement(&c, &entry(c, 40.0, 20.0), 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_exact_request_matching_old_size() {
        let last =
            constraints(UNDEFINED, MeasureMode::Undefined, UNDEFINED, MeasureMode::Undefined);
        let request = constraints(40.0, MeasureMode::Exactly, 20.0, MeasureMode::Exactly);
        assert!(can_use_cached_measurement(&request, &entry(last, 40.0, 20.0), 0.0, 0.0, 1.0));

        let request = constraints(41.0, MeasureMode::Exactly, 20.0, MeasureMode::Exactly);
        assert!(!can_use_cached_measurement(&request, &entry(last, 40.0, 20.0), 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_at_most_after_unbounded() {
        let last =
            constraints(UNDEFINED, MeasureMode::Undefined, UNDEFINED, MeasureMode::Undefined);
        let fits = constraints(100.0, MeasureMode::AtMost, UNDEFINED, MeasureMode::Undefined);
        assert!(can_use_cached_measurement(&fits, &entry(last, 40.0, 20.0), 0.0, 0.0, 1.0));

        let too_small = constraints(30.0, MeasureMode::AtMost, UNDEFINED, MeasureMode::Undefined);
        assert!(!can_use_cached_measurement(&too_small, &entry(last, 40.0, 20.0), 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_stricter_at_most() {
        let last = constraints(100.0, MeasureMode::AtMost, UNDEFINED, MeasureMode::Undefined);
        let request = constraints(50.0, MeasureMode::AtMost, UNDEFINED, MeasureMode::Undefined);
        assert!(can_use_cached_measurement(&request, &entry(last, 40.0, 20.0), 0.0, 0.0, 1.0));
        assert!(!can_use_cached_measurement(&request, &entry(last, 60.0, 20.0), 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_margins_reduce_request() {
        let last =
            constraints(UNDEFINED, MeasureMode::Undefined, UNDEFINED, MeasureMode::Undefined);
        let request = constraints(50.0, MeasureMode::Exactly, 20.0, MeasureMode::Exactly);
        assert!(can_use_cached_measurement(&request, &entry(last, 40.0, 20.0), 10.0, 0.0, 1.0));
    }

    #[test]
    fn test_rounded_comparison() {
        let last = constraints(100.2, MeasureMode::AtMost, UNDEFINED, MeasureMode::Undefined);
        let request = constraints(99.9, MeasureMode::AtMost, UNDEFINED, MeasureMode::Undefined);
        assert!(can_use_cached_measurement(&request, &entry(last, 150.0, 20.0), 0.0, 0.0, 1.0));
        assert!(!can_use_cached_measurement(&request, &entry(last, 150.0, 20.0), 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_fifo_eviction() {
        let mut cache = MeasureCache::default();
        for i in 0..MAX_CACHED_MEASUREMENTS + 1 {
            let c = constraints(i as f32, MeasureMode::Exactly, 0.0, MeasureMode::Exactly);
            cache.store(false, c, Size::new(i as f32, 0.0));
        }
        assert_eq!(cache.len(), MAX_CACHED_MEASUREMENTS);

        let first = constraints(0.0, MeasureMode::Exactly, 0.0, MeasureMode::Exactly);
        let last = constraints(16.0, MeasureMode::Exactly, 0.0, MeasureMode::Exactly);
        assert_eq!(cache.find_exact(&first, false), None);
        assert_eq!(cache.find_exact(&last, false), Some(Size::new(16.0, 0.0)));
    }

    #[test]
    fn test_layout_slot_separate() {
        let mut cache = MeasureCache::default();
        let c = constraints(10.0, MeasureMode::Exactly, 10.0, MeasureMode::Exactly);
        cache.store(true, c, Size::new(10.0, 10.0));
        assert_eq!(cache.find_exact(&c, true), Some(Size::new(10.0, 10.0)));
        assert_eq!(cache.find_exact(&c, false), None);
        assert_eq!(cache.len(), 0);
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }
}
