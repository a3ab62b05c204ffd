//! Fit strategies and fit results.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_POLY_DEGREE;
use crate::model::Point3;

/// Curve fitting strategy applied to the points of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitKind {
    /// No derived curve
    #[default]
    None,
    /// Straight segments between consecutive points
    Piecewise,
    /// Least-squares polynomial in the coronal plane
    Polynomial,
    /// Principal-axis line through the points in 3D
    Line3D,
}

impl FitKind {
    /// Get the display name for this fit.
    pub fn name(&self) -> &'static str {
        match self {
            FitKind::None => "No fit",
            FitKind::Piecewise => "piecewise",
            FitKind::Polynomial => "2D polynomial",
            FitKind::Line3D => "3D line",
        }
    }

    /// Get all fit strategies in menu order.
    pub fn all() -> &'static [FitKind] {
        &[
            FitKind::None,
            FitKind::Piecewise,
            FitKind::Line3D,
            FitKind::Polynomial,
        ]
    }

    /// Identifier used in config files and on the command line.
    pub fn id(&self) -> &'static str {
        match self {
            FitKind::None => "none",
            FitKind::Piecewise => "piecewise",
            FitKind::Polynomial => "polynomial",
            FitKind::Line3D => "line3d",
        }
    }
}

impl fmt::Display for FitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a fit name matches no strategy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown fit kind '{0}'")]
pub struct UnknownFitKind(pub String);

impl FromStr for FitKind {
    type Err = UnknownFitKind;

    /// Accepts both the identifier and the display name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        FitKind::all()
            .iter()
            .copied()
            .find(|kind| {
                kind.id().eq_ignore_ascii_case(wanted) || kind.name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| UnknownFitKind(s.to_string()))
    }
}

/// Which coronal axis the polynomial is a function of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// y = f(x)
    YOfX,
    /// x = f(y), used for near-vertical lines
    XOfY,
}

/// Parameters of a computed fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FitModel {
    /// Nothing fitted.
    Empty,
    /// Points joined segment by segment.
    Piecewise,
    /// Coronal polynomial.
    Polynomial {
        orientation: Orientation,
        /// Coefficients in ascending power order.
        coefficients: Vec<f64>,
        degree: usize,
        /// Sum of squared residuals of the chosen orientation.
        residual: f64,
    },
    /// 3D line through `centroid` along unit `direction`.
    Line3D { direction: Point3, centroid: Point3 },
}

/// A fit together with its materialized display coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fit {
    pub model: FitModel,
    pub coords: Vec<Point3>,
}

impl Fit {
    /// The empty fit: no model, no coordinates.
    pub fn empty() -> Self {
        Self {
            model: FitModel::Empty,
            coords: Vec::new(),
        }
    }

    pub fn new(model: FitModel, coords: Vec<Point3>) -> Self {
        Self { model, coords }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.model, FitModel::Empty) && self.coords.is_empty()
    }
}

impl Default for Fit {
    fn default() -> Self {
        Self::empty()
    }
}

/// Inputs to the fit besides the points themselves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitParams {
    /// Polynomial degree
    #[serde(default = "default_degree")]
    pub degree: usize,
    /// Optical plane written into polynomial output
    #[serde(default)]
    pub slice: f64,
}

fn default_degree() -> usize {
    DEFAULT_POLY_DEGREE
}

impl Default for FitParams {
    fn default() -> Self {
        Self {
            degree: default_degree(),
            slice: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fit_kind() {
        assert_eq!("line3d".parse::<FitKind>(), Ok(FitKind::Line3D));
        assert_eq!("3D line".parse::<FitKind>(), Ok(FitKind::Line3D));
        assert_eq!("Piecewise".parse::<FitKind>(), Ok(FitKind::Piecewise));
        assert_eq!("No fit".parse::<FitKind>(), Ok(FitKind::None));
        assert_eq!(
            "spline".parse::<FitKind>(),
            Err(UnknownFitKind("spline".to_string()))
        );
    }

    #[test]
    fn test_all_kinds_round_trip_through_id() {
        for kind in FitKind::all() {
            assert_eq!(kind.id().parse::<FitKind>(), Ok(*kind));
        }
    }

    #[test]
    fn test_empty_fit() {
        let fit = Fit::default();
        assert!(fit.is_empty());
        assert!(fit.coords.is_empty());
    }

    #[test]
    fn test_model_serialization_is_tagged() {
        let model = FitModel::Line3D {
            direction: Point3::new(0.0, 1.0, 0.0),
            centroid: Point3::new(1.0, 2.0, 3.0),
        };
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["kind"], "line3d");
        assert_eq!(json["centroid"], serde_json::json!([1.0, 2.0, 3.0]));
    }
}
