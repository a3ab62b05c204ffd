//! Interactive editing of one annotation line.
//!
//! An [`AnnotationSession`] owns the points of the line being drawn and the
//! fit derived from them. Every UI event (click, pointer move, parameter
//! change) is handled to completion: the points are updated, the fit is
//! recomputed and all working layers are pushed to the render surface.

use thiserror::Error;

use crate::config::LinePreferences;
use crate::constants::{
    CURRENT_FIT_LAYER, CURRENT_POINTS_LAYER, DEFAULT_LINE_NAME, FIT_SUFFIX, HIGHLIGHT_LAYER,
    POINTS_SUFFIX,
};
use crate::geometry::{self, Nearest, clamp_degree, nearest, nearest_to};
use crate::model::{Fit, FitKind, FitParams, Point3, PointSet};
use crate::surface::{AnnotationStore, LayerKind, LayerStyle, RenderSurface, StoreError};

/// What a primary click does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    /// Clicks add points
    #[default]
    Add,
    /// Clicks remove the highlighted point
    Remove,
}

/// Mouse button of a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickButton {
    /// Left button
    Primary,
    /// Right button
    Secondary,
}

/// Lifecycle of the line being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No points yet
    Idle,
    /// At least one point, not yet committed
    Building,
}

/// Errors surfaced to the caller of a session operation.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A coordinate did not have exactly three components
    #[error("Expected 3D coordinates, got {dims} components")]
    InvalidCoordinate {
        /// Number of components received
        dims: usize,
    },

    /// The annotation store failed to take a committed artifact
    #[error("Failed to store '{name}': {source}")]
    Store {
        /// Name of the artifact being stored
        name: String,
        /// Underlying store error
        #[source]
        source: StoreError,
    },
}

/// Initial settings of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub line_name: String,
    pub fit_kind: FitKind,
    pub params: FitParams,
    pub point_style: LayerStyle,
    pub line_style: LayerStyle,
    pub highlight_style: LayerStyle,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            line_name: DEFAULT_LINE_NAME.to_string(),
            fit_kind: FitKind::default(),
            params: FitParams::default(),
            point_style: LayerStyle::points(),
            line_style: LayerStyle::fit_line(),
            highlight_style: LayerStyle::highlight(),
        }
    }
}

impl From<&LinePreferences> for SessionSettings {
    fn from(prefs: &LinePreferences) -> Self {
        Self {
            line_name: prefs.line_name.clone(),
            fit_kind: prefs.fit_kind,
            params: FitParams {
                degree: prefs.degree,
                ..FitParams::default()
            },
            point_style: prefs.point_style,
            line_style: prefs.line_style,
            highlight_style: prefs.highlight_style,
        }
    }
}

/// Names and sizes of the artifacts written by [`AnnotationSession::commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub points_name: String,
    pub fit_name: String,
    pub num_points: usize,
    pub num_fit_coords: usize,
}

/// Editing state for one annotation line.
///
/// `S` receives the working layers after every change, `T` receives the line
/// when it is committed.
#[derive(Debug)]
pub struct AnnotationSession<S, T> {
    surface: S,
    store: T,
    points: PointSet,
    fit: Fit,
    fit_kind: FitKind,
    params: FitParams,
    mode: EditMode,
    /// Point marked for insertion or removal.
    highlight: Option<usize>,
    /// Point closest to the last known cursor position.
    hover: Option<Nearest>,
    cursor: Option<Point3>,
    line_name: String,
}

/// Validate a raw coordinate from the host.
pub fn parse_position(coords: &[f64]) -> Result<Point3, SessionError> {
    Point3::from_slice(coords).ok_or(SessionError::InvalidCoordinate { dims: coords.len() })
}

impl<S: RenderSurface, T: AnnotationStore> AnnotationSession<S, T> {
    /// Start a session and register its working layers on `surface`.
    pub fn new(mut surface: S, store: T, settings: SessionSettings) -> Self {
        surface.add_layer(CURRENT_POINTS_LAYER, LayerKind::Points, settings.point_style);
        surface.add_layer(CURRENT_FIT_LAYER, LayerKind::Lines, settings.line_style);
        surface.add_layer(HIGHLIGHT_LAYER, LayerKind::Points, settings.highlight_style);

        let mut session = Self {
            surface,
            store,
            points: PointSet::new(),
            fit: Fit::empty(),
            fit_kind: settings.fit_kind,
            params: FitParams {
                degree: clamp_degree(settings.params.degree),
                slice: settings.params.slice,
            },
            mode: EditMode::default(),
            highlight: None,
            hover: None,
            cursor: None,
            line_name: settings.line_name,
        };
        session.publish();
        session
    }

    // ------------------------------------------------------------------
    // Event handlers
    // ------------------------------------------------------------------

    /// Handle a click at `position`, the stack coordinate under the cursor.
    ///
    /// `None` means there is no image to click on and is ignored.
    pub fn click(
        &mut self,
        position: Option<&[f64]>,
        button: ClickButton,
    ) -> Result<(), SessionError> {
        let Some(raw) = position else {
            log::warn!("Load an image first");
            return Ok(());
        };
        let point = parse_position(raw)?;

        match (self.mode, button) {
            (EditMode::Add, ClickButton::Primary) => self.add_point(point),
            (EditMode::Add, ClickButton::Secondary) => self.toggle_highlight(point),
            (EditMode::Remove, _) => {
                self.remove_point(point);
            }
        }
        Ok(())
    }

    /// Track the cursor. In remove mode the highlight follows the nearest point.
    pub fn pointer_moved(&mut self, position: Option<&[f64]>) -> Result<(), SessionError> {
        self.cursor = position.map(parse_position).transpose()?;
        self.hover = nearest_to(self.points.as_slice(), self.cursor);

        if self.mode == EditMode::Remove {
            let index = self.hover.map(|n| n.index);
            if index != self.highlight {
                self.highlight = index;
                self.publish_highlight();
            }
        }
        Ok(())
    }

    /// Add a point: appended, or inserted just before the highlighted point.
    pub fn add_point(&mut self, point: Point3) {
        match self.highlight.take() {
            Some(index) => {
                log::debug!("Inserting {point:?} before point {index}");
                self.points.insert(index, point);
            }
            None => {
                log::debug!("Appending {point:?}");
                self.points.push(point);
            }
        }
        self.points_changed();
    }

    /// Remove the highlighted point, or the point nearest `click` if none is.
    pub fn remove_point(&mut self, click: Point3) -> Option<Point3> {
        let index = self
            .highlight
            .take()
            .or_else(|| nearest(self.points.as_slice(), click).map(|n| n.index))?;
        let removed = self.points.remove(index);
        log::debug!("Removed point {index}: {removed:?}");
        self.points_changed();
        removed
    }

    /// Mark the point nearest the cursor, or unmark it if already marked.
    ///
    /// Falls back to the point nearest `click` when no cursor position is known.
    pub fn toggle_highlight(&mut self, click: Point3) {
        let target = self
            .hover
            .or_else(|| nearest(self.points.as_slice(), click));
        let Some(target) = target else {
            return;
        };

        self.highlight = if self.highlight == Some(target.index) {
            None
        } else {
            Some(target.index)
        };
        self.publish_highlight();
    }

    /// Switch between adding and removing. Adding clears the highlight.
    pub fn set_mode(&mut self, mode: EditMode) {
        self.mode = mode;
        if mode == EditMode::Add && self.highlight.take().is_some() {
            self.publish_highlight();
        }
    }

    pub fn set_fit_kind(&mut self, kind: FitKind) {
        self.fit_kind = kind;
        self.refit();
    }

    /// Set the polynomial degree, clamped to `1..=MAX_POLY_DEGREE`.
    pub fn set_degree(&mut self, degree: usize) {
        self.params.degree = clamp_degree(degree);
        self.refit();
    }

    /// Set the optical plane written into polynomial fits.
    pub fn set_slice(&mut self, slice: f64) {
        self.params.slice = slice;
        self.refit();
    }

    pub fn set_line_name(&mut self, name: impl Into<String>) {
        self.line_name = name.into();
    }

    /// Hand the line to the store as `<name>_pts` and `<name>_fit`, then clear.
    ///
    /// On a store error the session is left as it was.
    pub fn commit(&mut self) -> Result<CommitSummary, SessionError> {
        let points_name = format!("{}{POINTS_SUFFIX}", self.line_name);
        let fit_name = format!("{}{FIT_SUFFIX}", self.line_name);

        self.store
            .store(&points_name, LayerKind::Points, self.points.as_slice())
            .map_err(|source| SessionError::Store {
                name: points_name.clone(),
                source,
            })?;
        self.store
            .store(&fit_name, LayerKind::Lines, &self.fit.coords)
            .map_err(|source| SessionError::Store {
                name: fit_name.clone(),
                source,
            })?;

        let summary = CommitSummary {
            points_name,
            fit_name,
            num_points: self.points.len(),
            num_fit_coords: self.fit.coords.len(),
        };
        log::info!(
            "Committed '{}' ({} points, {} fit samples)",
            self.line_name,
            summary.num_points,
            summary.num_fit_coords
        );

        self.clear();
        Ok(summary)
    }

    /// Drop all points and the fit.
    pub fn clear(&mut self) {
        self.points.clear();
        self.fit = Fit::empty();
        self.highlight = None;
        self.hover = None;
        self.publish();
    }

    /// End the session, removing its working layers.
    pub fn close(mut self) -> (S, T) {
        for layer in [CURRENT_POINTS_LAYER, CURRENT_FIT_LAYER, HIGHLIGHT_LAYER] {
            self.surface.remove_layer(layer);
        }
        (self.surface, self.store)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn points(&self) -> &PointSet {
        &self.points
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn fit(&self) -> &Fit {
        &self.fit
    }

    pub fn fit_kind(&self) -> FitKind {
        self.fit_kind
    }

    pub fn params(&self) -> FitParams {
        self.params
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn highlight(&self) -> Option<usize> {
        self.highlight
    }

    pub fn hover(&self) -> Option<Nearest> {
        self.hover
    }

    pub fn line_name(&self) -> &str {
        &self.line_name
    }

    pub fn state(&self) -> SessionState {
        if self.points.is_empty() {
            SessionState::Idle
        } else {
            SessionState::Building
        }
    }

    /// Point counter shown next to the line.
    pub fn status_text(&self) -> String {
        format!("n pts: {}", self.points.len())
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn store(&self) -> &T {
        &self.store
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn points_changed(&mut self) {
        self.hover = nearest_to(self.points.as_slice(), self.cursor);
        self.surface
            .set_data(CURRENT_POINTS_LAYER, self.points.as_slice());
        self.refit();
        self.publish_highlight();
    }

    fn refit(&mut self) {
        self.fit = geometry::fit(self.fit_kind, self.points.as_slice(), &self.params);
        self.surface.set_data(CURRENT_FIT_LAYER, &self.fit.coords);
    }

    fn publish(&mut self) {
        self.surface
            .set_data(CURRENT_POINTS_LAYER, self.points.as_slice());
        self.surface.set_data(CURRENT_FIT_LAYER, &self.fit.coords);
        self.publish_highlight();
    }

    fn publish_highlight(&mut self) {
        let marked: Vec<Point3> = self
            .highlight
            .and_then(|index| self.points.get(index))
            .into_iter()
            .collect();
        self.surface.set_data(HIGHLIGHT_LAYER, &marked);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_POLY_DEGREE;
    use crate::model::FitModel;
    use crate::surface::MemorySurface;

    type Session = AnnotationSession<MemorySurface, MemorySurface>;

    fn session_with(kind: FitKind) -> Session {
        let settings = SessionSettings {
            fit_kind: kind,
            ..SessionSettings::default()
        };
        AnnotationSession::new(MemorySurface::new(), MemorySurface::new(), settings)
    }

    fn click(session: &mut Session, coords: [f64; 3]) {
        session
            .click(Some(&coords), ClickButton::Primary)
            .unwrap();
    }

    fn layer(session: &Session, name: &str) -> Vec<Point3> {
        session.surface().data(name).unwrap().to_vec()
    }

    #[test]
    fn test_new_registers_layers() {
        let session = session_with(FitKind::None);
        let surface = session.surface();

        let points = surface.layer(CURRENT_POINTS_LAYER).unwrap();
        assert_eq!(points.kind, LayerKind::Points);
        assert_eq!(points.style, LayerStyle::points());
        assert_eq!(surface.layer(CURRENT_FIT_LAYER).unwrap().kind, LayerKind::Lines);
        assert_eq!(
            surface.layer(HIGHLIGHT_LAYER).unwrap().style,
            LayerStyle::highlight()
        );
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.status_text(), "n pts: 0");
    }

    #[test]
    fn test_click_appends_and_refits() {
        let mut session = session_with(FitKind::Piecewise);
        click(&mut session, [0.0, 0.0, 0.0]);
        assert_eq!(session.state(), SessionState::Building);
        assert!(session.fit().is_empty(), "one point is not enough");

        click(&mut session, [0.0, 3.0, 4.0]);
        assert_eq!(session.num_points(), 2);
        assert_eq!(session.fit().coords.len(), 7);
        assert_eq!(layer(&session, CURRENT_POINTS_LAYER).len(), 2);
        assert_eq!(layer(&session, CURRENT_FIT_LAYER), session.fit().coords);
        assert_eq!(session.status_text(), "n pts: 2");
    }

    #[test]
    fn test_wrong_dimensionality_is_reported() {
        let mut session = session_with(FitKind::Piecewise);
        let result = session.click(Some(&[1.0, 2.0]), ClickButton::Primary);
        assert!(matches!(
            result,
            Err(SessionError::InvalidCoordinate { dims: 2 })
        ));
        assert_eq!(session.num_points(), 0);

        let result = session.pointer_moved(Some(&[1.0, 2.0, 3.0, 4.0]));
        assert!(matches!(
            result,
            Err(SessionError::InvalidCoordinate { dims: 4 })
        ));
    }

    #[test]
    fn test_click_without_image_is_ignored() {
        let mut session = session_with(FitKind::Piecewise);
        session.click(None, ClickButton::Primary).unwrap();
        assert_eq!(session.num_points(), 0);
    }

    #[test]
    fn test_insert_before_highlight() {
        let mut session = session_with(FitKind::None);
        click(&mut session, [0.0, 0.0, 0.0]);
        click(&mut session, [0.0, 10.0, 0.0]);
        click(&mut session, [0.0, 20.0, 0.0]);

        session.pointer_moved(Some(&[0.0, 9.0, 0.0])).unwrap();
        session
            .click(Some(&[0.0, 9.0, 0.0]), ClickButton::Secondary)
            .unwrap();
        assert_eq!(session.highlight(), Some(1));
        assert_eq!(layer(&session, HIGHLIGHT_LAYER), vec![Point3::new(0.0, 10.0, 0.0)]);

        click(&mut session, [0.0, 5.0, 0.0]);
        let xs: Vec<f64> = session.points().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 5.0, 10.0, 20.0]);
        assert_eq!(session.highlight(), None);
        assert!(layer(&session, HIGHLIGHT_LAYER).is_empty());
    }

    #[test]
    fn test_secondary_click_toggles_highlight() {
        let mut session = session_with(FitKind::None);
        click(&mut session, [0.0, 0.0, 0.0]);
        click(&mut session, [0.0, 10.0, 0.0]);

        let near_second = [0.0, 9.0, 0.0];
        session.click(Some(&near_second), ClickButton::Secondary).unwrap();
        assert_eq!(session.highlight(), Some(1));
        session.click(Some(&near_second), ClickButton::Secondary).unwrap();
        assert_eq!(session.highlight(), None);
    }

    #[test]
    fn test_secondary_click_on_empty_line_does_nothing() {
        let mut session = session_with(FitKind::None);
        session
            .click(Some(&[0.0, 0.0, 0.0]), ClickButton::Secondary)
            .unwrap();
        assert_eq!(session.highlight(), None);
        assert_eq!(session.num_points(), 0);
    }

    #[test]
    fn test_remove_mode_highlight_follows_cursor() {
        let mut session = session_with(FitKind::Piecewise);
        click(&mut session, [0.0, 0.0, 0.0]);
        click(&mut session, [0.0, 10.0, 0.0]);
        click(&mut session, [0.0, 20.0, 0.0]);

        session.set_mode(EditMode::Remove);
        session.pointer_moved(Some(&[0.0, 11.0, 1.0])).unwrap();
        assert_eq!(session.highlight(), Some(1));
        assert_eq!(layer(&session, HIGHLIGHT_LAYER), vec![Point3::new(0.0, 10.0, 0.0)]);

        session
            .click(Some(&[0.0, 11.0, 1.0]), ClickButton::Primary)
            .unwrap();
        let xs: Vec<f64> = session.points().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 20.0]);
        assert_eq!(session.highlight(), None);
        // Segment of length 20 -> 22 samples
        assert_eq!(session.fit().coords.len(), 22);
    }

    #[test]
    fn test_remove_without_highlight_uses_click() {
        let mut session = session_with(FitKind::None);
        click(&mut session, [0.0, 0.0, 0.0]);
        click(&mut session, [0.0, 10.0, 0.0]);

        session.set_mode(EditMode::Remove);
        session
            .click(Some(&[0.0, 1.0, 0.0]), ClickButton::Primary)
            .unwrap();
        assert_eq!(session.points().as_slice(), &[Point3::new(0.0, 10.0, 0.0)]);

        session
            .click(Some(&[0.0, 1.0, 0.0]), ClickButton::Primary)
            .unwrap();
        assert_eq!(session.state(), SessionState::Idle);

        // Nothing left to remove
        session
            .click(Some(&[0.0, 1.0, 0.0]), ClickButton::Primary)
            .unwrap();
        assert_eq!(session.num_points(), 0);
    }

    #[test]
    fn test_switching_to_add_clears_highlight() {
        let mut session = session_with(FitKind::None);
        click(&mut session, [0.0, 0.0, 0.0]);
        session.set_mode(EditMode::Remove);
        session.pointer_moved(Some(&[0.0, 0.0, 0.0])).unwrap();
        assert_eq!(session.highlight(), Some(0));

        session.set_mode(EditMode::Add);
        assert_eq!(session.highlight(), None);
        assert!(layer(&session, HIGHLIGHT_LAYER).is_empty());
    }

    #[test]
    fn test_changing_fit_refits_same_points() {
        let mut session = session_with(FitKind::None);
        click(&mut session, [0.0, 0.0, 0.0]);
        click(&mut session, [0.0, 0.0, 10.0]);
        assert!(session.fit().is_empty());

        session.set_fit_kind(FitKind::Line3D);
        assert!(matches!(session.fit().model, FitModel::Line3D { .. }));
        assert_eq!(session.fit().coords.len(), 5);
        assert_eq!(layer(&session, CURRENT_FIT_LAYER).len(), 5);

        session.set_fit_kind(FitKind::Polynomial);
        session.set_degree(1);
        assert!(matches!(session.fit().model, FitModel::Polynomial { .. }));

        session.set_degree(5);
        assert_eq!(session.params().degree, 5);
        assert!(session.fit().is_empty(), "two points cannot fit degree 5");
        assert!(layer(&session, CURRENT_FIT_LAYER).is_empty());

        assert_eq!(session.num_points(), 2);
    }

    #[test]
    fn test_degree_is_clamped() {
        let mut session = session_with(FitKind::Polynomial);
        session.set_degree(0);
        assert_eq!(session.params().degree, 1);
        session.set_degree(100);
        assert_eq!(session.params().degree, MAX_POLY_DEGREE);
    }

    #[test]
    fn test_slice_is_used_by_polynomial() {
        let mut session = session_with(FitKind::Polynomial);
        session.set_degree(1);
        session.set_slice(12.0);
        click(&mut session, [3.0, 0.0, 0.0]);
        click(&mut session, [3.0, 4.0, 4.0]);
        assert!(!session.fit().coords.is_empty());
        assert!(session.fit().coords.iter().all(|p| p.plane == 12.0));
    }

    #[test]
    fn test_commit_stores_and_clears() {
        let mut session = session_with(FitKind::Piecewise);
        session.set_line_name("Probe1");
        click(&mut session, [0.0, 0.0, 0.0]);
        click(&mut session, [0.0, 3.0, 4.0]);

        let summary = session.commit().unwrap();
        assert_eq!(summary.points_name, "Probe1_pts");
        assert_eq!(summary.fit_name, "Probe1_fit");
        assert_eq!(summary.num_points, 2);
        assert_eq!(summary.num_fit_coords, 7);

        let store = session.store();
        assert_eq!(store.artifact("Probe1_pts").unwrap().data.len(), 2);
        let fit = store.artifact("Probe1_fit").unwrap();
        assert_eq!(fit.kind, LayerKind::Lines);
        assert_eq!(fit.data.len(), 7);

        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.fit().is_empty());
        assert!(layer(&session, CURRENT_POINTS_LAYER).is_empty());
        assert!(layer(&session, CURRENT_FIT_LAYER).is_empty());
    }

    struct FailingStore;

    impl AnnotationStore for FailingStore {
        fn store(&mut self, name: &str, _kind: LayerKind, _data: &[Point3]) -> Result<(), StoreError> {
            Err(StoreError::Rejected {
                name: name.to_string(),
                reason: "read-only".to_string(),
            })
        }
    }

    #[test]
    fn test_commit_failure_keeps_line() {
        let mut session =
            AnnotationSession::new(MemorySurface::new(), FailingStore, SessionSettings::default());
        session
            .click(Some(&[0.0, 1.0, 1.0]), ClickButton::Primary)
            .unwrap();

        let err = session.commit().unwrap_err();
        assert!(matches!(err, SessionError::Store { ref name, .. } if name == "ManualLine_pts"));
        assert_eq!(session.num_points(), 1);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut session = session_with(FitKind::Piecewise);
        click(&mut session, [0.0, 0.0, 0.0]);
        click(&mut session, [0.0, 5.0, 0.0]);
        session
            .click(Some(&[0.0, 0.0, 0.0]), ClickButton::Secondary)
            .unwrap();

        session.clear();
        assert!(session.points().is_empty());
        assert!(session.fit().coords.is_empty());
        assert_eq!(session.highlight(), None);
        assert!(layer(&session, HIGHLIGHT_LAYER).is_empty());
    }

    #[test]
    fn test_close_removes_layers() {
        let mut session = session_with(FitKind::Piecewise);
        click(&mut session, [0.0, 0.0, 0.0]);
        let (surface, _store) = session.close();
        assert_eq!(surface.layer_names().count(), 0);
    }

    #[test]
    fn test_settings_from_preferences() {
        let prefs = LinePreferences {
            line_name: "Shank".to_string(),
            fit_kind: FitKind::Line3D,
            degree: 3,
            ..LinePreferences::default()
        };
        let settings = SessionSettings::from(&prefs);
        assert_eq!(settings.line_name, "Shank");
        assert_eq!(settings.fit_kind, FitKind::Line3D);
        assert_eq!(settings.params.degree, 3);
    }
}
