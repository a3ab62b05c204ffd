//! stackline - line annotation in 3D microscopy stacks
//!
//! Points are clicked on an image stack, kept in insertion order, and joined
//! into a line by one of several fits (straight segments, a 2D polynomial in
//! the current slice, or a 3D principal-axis line). Rendering and persistence
//! go through the [`surface::RenderSurface`] and [`surface::AnnotationStore`]
//! traits so the session can be driven by any viewer.

pub mod atlas;
pub mod config;
pub mod constants;
pub mod format;
pub mod geometry;
pub mod model;
pub mod session;
pub mod surface;

pub use config::{AppConfig, LinePreferences, LogLevel};
pub use model::{Fit, FitKind, FitModel, FitParams, Point3, PointSet};
pub use session::{AnnotationSession, ClickButton, EditMode, SessionError, SessionSettings};
pub use surface::{AnnotationStore, LayerKind, LayerStyle, MemorySurface, RenderSurface};
