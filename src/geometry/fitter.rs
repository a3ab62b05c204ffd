//! Dispatch from a fit strategy to its implementation.

use crate::geometry::line3d::{MIN_LINE_POINTS, fit_line};
use crate::geometry::piecewise::{MIN_PIECEWISE_POINTS, link_points};
use crate::geometry::polynomial::fit_coronal;
use crate::model::{Fit, FitKind, FitModel, FitParams, Point3};

/// Fit `points` with the chosen strategy.
///
/// Too few points for the strategy is not an error: the result is the empty
/// fit, whatever the strategy.
pub fn fit(kind: FitKind, points: &[Point3], params: &FitParams) -> Fit {
    let fitted = match kind {
        FitKind::None => return Fit::empty(),
        FitKind::Piecewise => {
            link_points(points).map(|coords| Fit::new(FitModel::Piecewise, coords))
        }
        FitKind::Polynomial => fit_coronal(points, params.degree, params.slice),
        FitKind::Line3D => fit_line(points),
    };

    fitted.unwrap_or_else(|| {
        log::debug!("{kind}: no fit for {} points", points.len());
        Fit::empty()
    })
}

/// Smallest number of points for which `kind` produces output.
pub fn min_points(kind: FitKind, params: &FitParams) -> usize {
    match kind {
        FitKind::None => 0,
        FitKind::Piecewise => MIN_PIECEWISE_POINTS,
        FitKind::Polynomial => params.degree.saturating_add(1),
        FitKind::Line3D => MIN_LINE_POINTS,
    }
}
