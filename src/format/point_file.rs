//! JSON point files and fit reports.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::format::error::FormatError;
use crate::model::{Fit, FitKind, FitModel, FitParams, Point3, PointSet};

/// Points of one annotation line as stored on disk.
///
/// ```json
/// { "name": "ManualLine", "points": [[12, 40, 51], [12, 44, 60]] }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PointFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub points: PointSet,
}

impl PointFile {
    pub fn new(name: Option<String>, points: PointSet) -> Self {
        Self { name, points }
    }

    pub fn from_json(json: &str) -> Result<Self, FormatError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, FormatError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, FormatError> {
        let json = std::fs::read_to_string(path)?;
        let file = Self::from_json(&json)?;
        log::debug!("Loaded {} points from {:?}", file.points.len(), path);
        Ok(file)
    }

    pub fn save(&self, path: &Path) -> Result<(), FormatError> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved {} points to {:?}", self.points.len(), path);
        Ok(())
    }
}

/// Result of fitting a point file, as written by the command-line tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitReport {
    pub kind: FitKind,
    pub params: FitParams,
    pub num_points: usize,
    pub model: FitModel,
    pub coords: Vec<Point3>,
}

impl FitReport {
    pub fn new(kind: FitKind, params: FitParams, points: &[Point3], fit: Fit) -> Self {
        Self {
            kind,
            params,
            num_points: points.len(),
            model: fit.model,
            coords: fit.coords,
        }
    }

    pub fn to_json(&self) -> Result<String, FormatError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), FormatError> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved {} fit samples to {:?}", self.coords.len(), path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point_file() {
        let json = r#"{ "name": "Probe", "points": [[1, 2, 3], [4.5, 5, 6]] }"#;
        let file = PointFile::from_json(json).unwrap();
        assert_eq!(file.name.as_deref(), Some("Probe"));
        assert_eq!(file.points.len(), 2);
        assert_eq!(file.points[1], Point3::new(4.5, 5.0, 6.0));
    }

    #[test]
    fn test_name_is_optional() {
        let file = PointFile::from_json(r#"{ "points": [] }"#).unwrap();
        assert!(file.name.is_none());
        assert!(file.points.is_empty());
    }

    #[test]
    fn test_rejects_two_component_points() {
        let result = PointFile::from_json(r#"{ "points": [[1, 2]] }"#);
        assert!(matches!(result, Err(FormatError::Json(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("line.json");
        let file = PointFile::new(
            Some("ManualLine".to_string()),
            vec![Point3::new(0.0, 1.0, 2.0)].into(),
        );
        file.save(&path).unwrap();
        assert_eq!(PointFile::load(&path).unwrap(), file);
    }

    #[test]
    fn test_report_json() {
        let points = [Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)];
        let fit = Fit::new(FitModel::Piecewise, points.to_vec());
        let report = FitReport::new(FitKind::Piecewise, FitParams::default(), &points, fit);
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["kind"], "piecewise");
        assert_eq!(value["num_points"], 2);
        assert_eq!(value["model"]["kind"], "piecewise");
        assert_eq!(value["coords"][1], serde_json::json!([0.0, 1.0, 0.0]));
    }
}
