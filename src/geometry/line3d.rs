//! Principal-axis line fit through a 3D point cloud.

use nalgebra::{DMatrix, SVD};

use crate::constants::{LINE3D_STEP, MAX_SVD_ITERATIONS};
use crate::geometry::polynomial::arange;
use crate::model::{Fit, FitModel, Point3, centroid};

/// Fewest points that define a direction.
pub const MIN_LINE_POINTS: usize = 2;

const SIGN_EPSILON: f64 = 1e-12;

/// Fit a straight line through the points with an SVD.
///
/// The direction is the right singular vector belonging to the largest
/// singular value of the mean-centred points. Samples are taken every
/// [`LINE3D_STEP`] along that direction over the range the points project
/// onto, rounded to whole voxels, sorted and deduplicated.
pub fn fit_line(points: &[Point3]) -> Option<Fit> {
    if points.len() < MIN_LINE_POINTS {
        log::debug!("Need at least {MIN_LINE_POINTS} points for a 3D line");
        return None;
    }
    let mean = centroid(points)?;
    let direction = principal_direction(points, mean)?;

    let (lo, hi) = points
        .iter()
        .map(|p| p.sub(mean).dot(direction))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), t| {
            (lo.min(t), hi.max(t))
        });

    let mut coords: Vec<Point3> = arange(lo, hi, LINE3D_STEP)?
        .map(|t| {
            mean.add(direction.scale(t))
                .map(|v| v.round_ties_even() + 0.0)
        })
        .collect();
    coords.sort_by(Point3::total_cmp);
    coords.dedup();

    log::debug!(
        "3D line through {mean:?} along {direction:?}: {} samples",
        coords.len()
    );

    Some(Fit::new(
        FitModel::Line3D {
            direction,
            centroid: mean,
        },
        coords,
    ))
}

/// Unit direction of largest spread around `mean`.
///
/// The sign is fixed so the first non-negligible component is positive.
/// Coincident points have no spread and give None.
pub fn principal_direction(points: &[Point3], mean: Point3) -> Option<Point3> {
    let centred = DMatrix::from_fn(points.len(), 3, |r, c| points[r].sub(mean).to_array()[c]);

    let Some(svd) = SVD::try_new(centred, false, true, f64::EPSILON, MAX_SVD_ITERATIONS) else {
        log::warn!("3D line fit: SVD did not converge");
        return None;
    };
    let v_t = svd.v_t?;
    let best = svd.singular_values.imax();
    let spread = svd.singular_values[best];
    if spread.is_nan() || spread <= 0.0 {
        log::debug!("3D line fit: points are coincident");
        return None;
    }
    let row = v_t.row(best);

    let direction = Point3::new(row[0], row[1], row[2]);
    let norm = direction.norm();
    if norm == 0.0 || !norm.is_finite() {
        return None;
    }
    let direction = direction.scale(1.0 / norm);

    let flip = direction
        .to_array()
        .into_iter()
        .find(|v| v.abs() > SIGN_EPSILON)
        .is_some_and(|v| v < 0.0);
    Some(if flip { direction.scale(-1.0) } else { direction })
}
