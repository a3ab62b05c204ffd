//! Rendering surface and annotation store seams.
//!
//! The session never draws or persists anything itself. It pushes point data
//! to a [`RenderSurface`] after every change and hands committed lines to an
//! [`AnnotationStore`]. [`MemorySurface`] implements both in memory.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{colors, sizes};
use crate::format::FormatError;
use crate::model::Point3;

/// How a layer's points are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// Individual markers
    Points,
    /// A polyline through the points in order
    Lines,
}

/// Marker shape for point layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symbol {
    #[default]
    Circle,
    Square,
}

/// Appearance of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerStyle {
    /// RGB color
    pub color: [u8; 3],
    /// Marker size for points, line width for lines
    pub size: f32,
    #[serde(default)]
    pub symbol: Symbol,
}

impl LayerStyle {
    pub fn new(color: [u8; 3], size: f32, symbol: Symbol) -> Self {
        Self {
            color,
            size,
            symbol,
        }
    }

    /// Style of the clicked points.
    pub fn points() -> Self {
        Self::new(colors::POINTS, sizes::POINT_SYMBOL, Symbol::Circle)
    }

    /// Style of the fitted line.
    pub fn fit_line() -> Self {
        Self::new(colors::FIT_LINE, sizes::FIT_LINE_WIDTH, Symbol::Circle)
    }

    /// Style of the highlighted point.
    pub fn highlight() -> Self {
        Self::new(colors::HIGHLIGHT, sizes::HIGHLIGHT_SYMBOL, Symbol::Square)
    }
}

/// Something that can draw named layers of points.
pub trait RenderSurface {
    /// Create (or restyle) a layer. Its data starts out empty.
    fn add_layer(&mut self, name: &str, kind: LayerKind, style: LayerStyle);

    /// Replace the data of a layer.
    fn set_data(&mut self, name: &str, data: &[Point3]);

    /// Drop a layer and its data.
    fn remove_layer(&mut self, name: &str);
}

/// Receives committed lines as named artifacts.
pub trait AnnotationStore {
    fn store(&mut self, name: &str, kind: LayerKind, data: &[Point3]) -> Result<(), StoreError>;
}

/// Errors reported by an [`AnnotationStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// Writing the artifact failed
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The store refused the artifact
    #[error("Artifact '{name}' rejected: {reason}")]
    Rejected {
        /// Name of the artifact
        name: String,
        /// Why it was rejected
        reason: String,
    },
}

impl<T: RenderSurface + ?Sized> RenderSurface for &mut T {
    fn add_layer(&mut self, name: &str, kind: LayerKind, style: LayerStyle) {
        (**self).add_layer(name, kind, style);
    }

    fn set_data(&mut self, name: &str, data: &[Point3]) {
        (**self).set_data(name, data);
    }

    fn remove_layer(&mut self, name: &str) {
        (**self).remove_layer(name);
    }
}

impl<T: AnnotationStore + ?Sized> AnnotationStore for &mut T {
    fn store(&mut self, name: &str, kind: LayerKind, data: &[Point3]) -> Result<(), StoreError> {
        (**self).store(name, kind, data)
    }
}

/// A layer held by [`MemorySurface`].
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub kind: LayerKind,
    pub style: LayerStyle,
    pub data: Vec<Point3>,
}

/// A committed artifact held by [`MemorySurface`].
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub name: String,
    pub kind: LayerKind,
    pub data: Vec<Point3>,
}

/// In-memory surface and store.
///
/// Keeps every layer and every stored artifact so hosts without a real
/// renderer (and tests) can inspect what the session published.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    layers: BTreeMap<String, Layer>,
    artifacts: Vec<Artifact>,
    updates: usize,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.get(name)
    }

    /// Data of a layer, None if it does not exist.
    pub fn data(&self, name: &str) -> Option<&[Point3]> {
        self.layers.get(name).map(|layer| layer.data.as_slice())
    }

    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    /// Stored artifacts in commit order.
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn artifact(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.name == name)
    }

    /// Number of `set_data` calls so far.
    pub fn update_count(&self) -> usize {
        self.updates
    }
}

impl RenderSurface for MemorySurface {
    fn add_layer(&mut self, name: &str, kind: LayerKind, style: LayerStyle) {
        self.layers.insert(
            name.to_string(),
            Layer {
                kind,
                style,
                data: Vec::new(),
            },
        );
    }

    fn set_data(&mut self, name: &str, data: &[Point3]) {
        self.updates += 1;
        match self.layers.get_mut(name) {
            Some(layer) => layer.data = data.to_vec(),
            None => log::warn!("set_data on unknown layer '{name}'"),
        }
    }

    fn remove_layer(&mut self, name: &str) {
        self.layers.remove(name);
    }
}

impl AnnotationStore for MemorySurface {
    fn store(&mut self, name: &str, kind: LayerKind, data: &[Point3]) -> Result<(), StoreError> {
        if self.artifacts.iter().any(|a| a.name == name) {
            log::debug!("Replacing stored artifact '{name}'");
            self.artifacts.retain(|a| a.name != name);
        }
        self.artifacts.push(Artifact {
            name: name.to_string(),
            kind,
            data: data.to_vec(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_styles() {
        assert_eq!(LayerStyle::points().color, [42, 96, 255]);
        assert_eq!(LayerStyle::fit_line().size, 4.0);
        assert_eq!(LayerStyle::highlight().symbol, Symbol::Square);
    }

    #[test]
    fn test_layers_lifecycle() {
        let mut surface = MemorySurface::new();
        surface.add_layer("a", LayerKind::Points, LayerStyle::points());
        assert_eq!(surface.data("a"), Some(&[][..]));

        surface.set_data("a", &[Point3::new(1.0, 2.0, 3.0)]);
        assert_eq!(surface.data("a").map(<[Point3]>::len), Some(1));
        assert_eq!(surface.update_count(), 1);

        surface.remove_layer("a");
        assert!(surface.layer("a").is_none());
    }

    #[test]
    fn test_set_data_on_missing_layer_is_ignored() {
        let mut surface = MemorySurface::new();
        surface.set_data("missing", &[Point3::default()]);
        assert!(surface.layer("missing").is_none());
    }

    #[test]
    fn test_store_replaces_same_name() {
        let mut surface = MemorySurface::new();
        surface
            .store("line_pts", LayerKind::Points, &[Point3::default()])
            .unwrap();
        surface
            .store("line_pts", LayerKind::Points, &[Point3::default(), Point3::default()])
            .unwrap();
        assert_eq!(surface.artifacts().len(), 1);
        assert_eq!(surface.artifact("line_pts").unwrap().data.len(), 2);
    }

    fn touch<S: RenderSurface + AnnotationStore>(mut target: S) {
        target.add_layer("a", LayerKind::Lines, LayerStyle::fit_line());
        target.store("x", LayerKind::Lines, &[]).unwrap();
    }

    #[test]
    fn test_mut_ref_forwards() {
        let mut surface = MemorySurface::new();
        touch(&mut surface);
        assert!(surface.layer("a").is_some());
        assert!(surface.artifact("x").is_some());
    }
}
