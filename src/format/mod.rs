//! Reading and writing point data.
//!
//! The session does not define how committed lines are persisted; it talks to
//! an [`AnnotationStore`](crate::surface::AnnotationStore). This module
//! provides one such store plus the JSON files used by the command-line tool.
//!
//! ## Formats
//!
//! - **NPY**: one `(n, 3)` `float64` array per committed artifact
//! - **JSON point file**: `{ "name": ..., "points": [[plane, x, y], ...] }`
//! - **JSON fit report**: fit kind, parameters, model and sampled coordinates

mod error;
mod npy_store;
mod point_file;

pub use error::FormatError;
pub use npy_store::NpyStore;
pub use point_file::{FitReport, PointFile};
