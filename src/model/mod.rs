//! Data models for stackline.

mod fit;
mod point;

pub use fit::{Fit, FitKind, FitModel, FitParams, Orientation, UnknownFitKind};
pub use point::{Point3, PointSet, centroid, points_to_array};
