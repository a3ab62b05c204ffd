//! Annotation store writing NumPy `.npy` files.

use std::path::{Path, PathBuf};

use ndarray::Array2;
use ndarray_npy::{read_npy, write_npy};

use crate::format::error::FormatError;
use crate::model::{Point3, PointSet, points_to_array};
use crate::surface::{AnnotationStore, LayerKind, StoreError};

/// Stores each committed artifact as `<dir>/<name>.npy`.
///
/// Arrays are `float64` with shape `(n, 3)`, one `(plane, x, y)` row per
/// point, so they load directly with `numpy.load`.
#[derive(Debug, Clone)]
pub struct NpyStore {
    dir: PathBuf,
}

impl NpyStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path an artifact called `name` is written to.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.npy"))
    }

    /// Write `points` under `name`, creating the directory if needed.
    pub fn save(&self, name: &str, points: &[Point3]) -> Result<PathBuf, FormatError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(name);
        write_npy(&path, &points_to_array(points))?;
        log::info!("Wrote {} points to {:?}", points.len(), path);
        Ok(path)
    }

    /// Read the artifact called `name` back.
    pub fn load(&self, name: &str) -> Result<PointSet, FormatError> {
        let path = self.path_for(name);
        let array: Array2<f64> = read_npy(&path)?;
        PointSet::from_array(array.view())
            .ok_or_else(|| FormatError::invalid_shape(&path, array.shape()))
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}

impl AnnotationStore for NpyStore {
    fn store(&mut self, name: &str, kind: LayerKind, data: &[Point3]) -> Result<(), StoreError> {
        if !is_valid_name(name) {
            return Err(StoreError::Rejected {
                name: name.to_string(),
                reason: "not a valid file name".to_string(),
            });
        }
        log::debug!("Storing {kind:?} artifact '{name}'");
        self.save(name, data)?;
        Ok(())
    }
}
