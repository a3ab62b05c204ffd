//! Global constants for stackline

/// Default name given to a new annotation line.
pub const DEFAULT_LINE_NAME: &str = "ManualLine";

/// Suffix appended to the line name for the committed points artifact.
pub const POINTS_SUFFIX: &str = "_pts";

/// Suffix appended to the line name for the committed fit artifact.
pub const FIT_SUFFIX: &str = "_fit";

/// Layer holding the points of the line being edited.
pub const CURRENT_POINTS_LAYER: &str = "current_line";

/// Layer holding the fitted curve of the line being edited.
pub const CURRENT_FIT_LAYER: &str = "current_line_fit";

/// Layer holding the single highlighted point.
pub const HIGHLIGHT_LAYER: &str = "highlight_point";

/// Default polynomial degree for coronal fits.
pub const DEFAULT_POLY_DEGREE: usize = 2;

/// Highest polynomial degree the session accepts.
pub const MAX_POLY_DEGREE: usize = 10;

/// Distance between consecutive samples along a fitted 3D line.
pub const LINE3D_STEP: f64 = 2.0;

/// Piecewise output is rounded to this many decimals.
pub const PIECEWISE_DECIMALS: i32 = 3;

/// Extra samples added to every piecewise segment on top of its rounded length.
pub const PIECEWISE_EXTRA_STEPS: usize = 2;

/// Most samples a single segment or fitted curve may produce.
pub const MAX_FIT_SAMPLES: usize = 1_000_000;

/// Iteration cap for the SVD used by the line and polynomial fits.
pub const MAX_SVD_ITERATIONS: usize = 1000;

/// Number of components a click coordinate must have.
pub const COORD_DIMS: usize = 3;

/// Default colors for the working layers.
pub mod colors {
    /// Clicked points (blue).
    pub const POINTS: [u8; 3] = [42, 96, 255];
    /// Fitted line (cyan).
    pub const FIT_LINE: [u8; 3] = [0, 250, 250];
    /// Highlighted point (red).
    pub const HIGHLIGHT: [u8; 3] = [250, 0, 0];
}

/// Default sizes for the working layers.
pub mod sizes {
    /// Symbol size of clicked points.
    pub const POINT_SYMBOL: f32 = 8.0;
    /// Width of the fitted line.
    pub const FIT_LINE_WIDTH: f32 = 4.0;
    /// Symbol size of the highlighted point.
    pub const HIGHLIGHT_SYMBOL: f32 = 9.0;
}
