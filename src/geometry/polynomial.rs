//! Least-squares polynomial fits in the coronal plane.

use nalgebra::{DMatrix, DVector, SVD};

use crate::constants::{MAX_FIT_SAMPLES, MAX_POLY_DEGREE, MAX_SVD_ITERATIONS};
use crate::model::{Fit, FitModel, Orientation, Point3};

/// One candidate polynomial with its goodness of fit.
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialFit {
    /// Coefficients in ascending power order.
    pub coefficients: Vec<f64>,
    /// Sum of squared residuals over the input samples.
    pub residual: f64,
}

/// Least-squares polynomial of `degree` through `(xs, ys)`.
///
/// Columns of the Vandermonde matrix are normalised before the SVD and
/// singular values below `n * eps` of the largest are dropped, so a
/// rank-deficient system yields its minimum-norm solution. Returns None if the
/// inputs differ in length or the SVD does not converge.
pub fn polyfit(xs: &[f64], ys: &[f64], degree: usize) -> Option<Vec<f64>> {
    if xs.len() != ys.len() || xs.is_empty() {
        return None;
    }
    let rows = xs.len();
    let cols = degree.checked_add(1)?;

    let mut vandermonde = DMatrix::from_fn(rows, cols, |r, c| xs[r].powi(c as i32));
    let scales: Vec<f64> = (0..cols)
        .map(|c| {
            let norm = vandermonde.column(c).norm();
            if norm > 0.0 { norm } else { 1.0 }
        })
        .collect();
    for (c, scale) in scales.iter().enumerate() {
        vandermonde.column_mut(c).unscale_mut(*scale);
    }

    let rhs = DVector::from_column_slice(ys);
    let Some(svd) = SVD::try_new(vandermonde, true, true, f64::EPSILON, MAX_SVD_ITERATIONS)
    else {
        log::warn!("polyfit: SVD did not converge (degree {degree}, {rows} samples)");
        return None;
    };

    let cutoff = svd.singular_values.max() * rows.max(cols) as f64 * f64::EPSILON;
    let solution = match svd.solve(&rhs, cutoff) {
        Ok(solution) => solution,
        Err(e) => {
            log::warn!("polyfit: least-squares solve failed: {e}");
            return None;
        }
    };

    Some(
        solution
            .iter()
            .zip(&scales)
            .map(|(coef, scale)| coef / scale)
            .collect(),
    )
}

/// Evaluate a polynomial with ascending-order coefficients.
pub fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Fit `ys` as a function of `xs` and report the residual.
pub fn fit_polynomial(xs: &[f64], ys: &[f64], degree: usize) -> Option<PolynomialFit> {
    let coefficients = polyfit(xs, ys, degree)?;
    let residual = xs
        .iter()
        .zip(ys)
        .map(|(&x, &y)| (y - polyval(&coefficients, x)).powi(2))
        .sum();
    Some(PolynomialFit {
        coefficients,
        residual,
    })
}

/// Fit the line in the coronal plane with a polynomial.
///
/// Both y = f(x) and x = f(y) are fitted and the one with the lower residual
/// is kept, so vertical lines do not degenerate. The curve is sampled at unit
/// steps from the minimum of the free axis up to (not including) its maximum,
/// with the optical plane set to `slice`. Needs more points than `degree`.
pub fn fit_coronal(points: &[Point3], degree: usize, slice: f64) -> Option<Fit> {
    if points.len() <= degree {
        log::debug!(
            "Need at least {} points for a degree {degree} fit, have {}",
            degree.saturating_add(1),
            points.len()
        );
        return None;
    }

    let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.y).collect();

    let y_of_x = fit_polynomial(&xs, &ys, degree)?;
    let x_of_y = fit_polynomial(&ys, &xs, degree)?;
    log::debug!(
        "Polynomial residuals: y=f(x) {:.4}, x=f(y) {:.4}",
        y_of_x.residual,
        x_of_y.residual
    );

    let (orientation, chosen, free) = if y_of_x.residual <= x_of_y.residual {
        (Orientation::YOfX, y_of_x, &xs)
    } else {
        (Orientation::XOfY, x_of_y, &ys)
    };

    let (lo, hi) = free
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    let coords = arange(lo, hi, 1.0)?
        .map(|t| {
            let value = polyval(&chosen.coefficients, t);
            match orientation {
                Orientation::YOfX => Point3::new(slice, t, value),
                Orientation::XOfY => Point3::new(slice, value, t),
            }
        })
        .collect();

    Some(Fit::new(
        FitModel::Polynomial {
            orientation,
            coefficients: chosen.coefficients,
            degree,
            residual: chosen.residual,
        },
        coords,
    ))
}

/// Values `start, start + step, ...` strictly below `stop`.
///
/// Returns None if that would be more than [`MAX_FIT_SAMPLES`] values.
pub fn arange(start: f64, stop: f64, step: f64) -> Option<impl Iterator<Item = f64>> {
    let span = if step > 0.0 && stop > start {
        ((stop - start) / step).ceil()
    } else {
        0.0
    };
    if span.is_nan() || span > MAX_FIT_SAMPLES as f64 {
        log::warn!("Range {start}..{stop} with step {step} is too long to sample");
        return None;
    }
    let count = span as usize;
    Some((0..count).map(move |k| start + k as f64 * step))
}

/// Clamp a polynomial degree to `1..=MAX_POLY_DEGREE`.
pub fn clamp_degree(degree: usize) -> usize {
    degree.clamp(1, MAX_POLY_DEGREE)
}
