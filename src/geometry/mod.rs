//! Point-set geometry: nearest-point search and curve fitting.
//!
//! All functions here are pure: they read a slice of points and return new
//! values without touching their input.

mod fitter;
pub mod line3d;
mod nearest;
pub mod piecewise;
pub mod polynomial;

pub use fitter::{fit, min_points};
pub use nearest::{Nearest, nearest, nearest_to};
pub use polynomial::clamp_degree;
