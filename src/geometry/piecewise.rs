//! Piecewise linear interpolation between consecutive points.

use crate::constants::{MAX_FIT_SAMPLES, PIECEWISE_DECIMALS, PIECEWISE_EXTRA_STEPS};
use crate::model::Point3;

/// Fewest points that form at least one segment.
pub const MIN_PIECEWISE_POINTS: usize = 2;

/// Join consecutive points with evenly sampled straight segments.
///
/// Each segment gets `round(length) + 2` samples including both ends, so a
/// joint point appears once at the end of one segment and again at the start
/// of the next. Output is rounded to three decimals. Returns None for fewer
/// than two points, or when a segment is too long to sample.
pub fn link_points(points: &[Point3]) -> Option<Vec<Point3>> {
    if points.len() < MIN_PIECEWISE_POINTS {
        return None;
    }

    let mut coords = Vec::new();
    for pair in points.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        let steps = segment_samples(start.distance(end))?;
        coords.extend(linspace(start, end, steps).map(|p| p.round_decimals(PIECEWISE_DECIMALS)));
    }

    Some(coords)
}

/// Sample count for a segment of `length`, None above [`MAX_FIT_SAMPLES`].
fn segment_samples(length: f64) -> Option<usize> {
    let rounded = length.round_ties_even();
    if rounded.is_nan() || rounded > MAX_FIT_SAMPLES as f64 {
        log::warn!("Segment of length {length} is too long to sample");
        return None;
    }
    (rounded as usize).checked_add(PIECEWISE_EXTRA_STEPS)
}

/// `num` evenly spaced points from `start` to `end`, both included.
pub fn linspace(start: Point3, end: Point3, num: usize) -> impl Iterator<Item = Point3> {
    let delta = end.sub(start);
    let last = num.saturating_sub(1);
    (0..num).map(move |i| {
        if i == last && i > 0 {
            end
        } else {
            start.add(delta.scale(i as f64 / last.max(1) as f64))
        }
    })
}
