//! Host collaborator
//!
//! The narrow surface a running function may call back into: modal
//! notifications, drawing surfaces and the console log. [`HeadlessHost`]
//! implements it without any UI.

use crate::plugin::PluginError;
use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::Rc;
use tracing::info;

/// Shared handle to a drawing surface
///
/// Surfaces outlive the call that acquired them and can be drawn into again.
pub type SurfaceHandle = Rc<RefCell<dyn DrawingSurface>>;

/// Independently updatable plotting surface
pub trait DrawingSurface: Debug {
    /// Title shown with the surface
    fn title(&self) -> &str;

    /// Check if surface has three axes
    fn is_3d(&self) -> bool;

    /// Draw a 2D line series
    ///
    /// # Errors
    /// Returns error if `xs` and `ys` differ in length
    fn plot(&mut self, xs: &[f64], ys: &[f64]) -> Result<(), PluginError>;

    /// Draw a 3D line series
    ///
    /// # Errors
    /// Returns error on a 2D surface or if the coordinate lengths differ
    fn plot_3d(&mut self, xs: &[f64], ys: &[f64], zs: &[f64]) -> Result<(), PluginError>;
}

/// Callbacks available to plugins and to the workspace
pub trait Host {
    /// Show an informational notification; returns once acknowledged
    fn notify(&self, title: &str, body: &str);

    /// Obtain a new drawing surface
    fn acquire_drawing_surface(&self, title: &str, is_3d: bool) -> SurfaceHandle;

    /// Append a line to the console log
    fn console(&self, line: &str);
}

/// One drawn series
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// X coordinates
    pub xs: Vec<f64>,
    /// Y coordinates
    pub ys: Vec<f64>,
    /// Z coordinates, for 3D series
    pub zs: Option<Vec<f64>>,
}

/// Surface that keeps drawn series in memory
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSurface {
    title: String,
    is_3d: bool,
    series: Vec<Series>,
}

impl RecordedSurface {
    /// Create empty surface
    #[must_use]
    pub fn new(title: impl Into<String>, is_3d: bool) -> Self {
        Self {
            title: title.into(),
            is_3d,
            series: Vec::new(),
        }
    }

    /// Series drawn so far
    #[inline]
    #[must_use]
    pub fn series(&self) -> &[Series] {
        &self.series
    }
}

impl DrawingSurface for RecordedSurface {
    fn title(&self) -> &str {
        &self.title
    }

    fn is_3d(&self) -> bool {
        self.is_3d
    }

    fn plot(&mut self, xs: &[f64], ys: &[f64]) -> Result<(), PluginError> {
        if xs.len() != ys.len() {
            return Err(PluginError::new(format!(
                "x has {} points but y has {}",
                xs.len(),
                ys.len()
            )));
        }
        self.series.push(Series {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            zs: None,
        });
        Ok(())
    }

    fn plot_3d(&mut self, xs: &[f64], ys: &[f64], zs: &[f64]) -> Result<(), PluginError> {
        if !self.is_3d {
            return Err(PluginError::new(format!("surface '{}' is 2D", self.title)));
        }
        if xs.len() != ys.len() || ys.len() != zs.len() {
            return Err(PluginError::new("coordinate lengths differ"));
        }
        self.series.push(Series {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            zs: Some(zs.to_vec()),
        });
        Ok(())
    }
}

/// Host without a UI: notifications and console lines go to `tracing`,
/// surfaces are recorded in memory
#[derive(Debug, Default)]
pub struct HeadlessHost {
    surfaces: RefCell<Vec<Rc<RefCell<RecordedSurface>>>>,
}

impl HeadlessHost {
    /// Create host
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every surface acquired so far
    #[must_use]
    pub fn surfaces(&self) -> Vec<RecordedSurface> {
        self.surfaces
            .borrow()
            .iter()
            .map(|surface| surface.borrow().clone())
            .collect()
    }
}

impl Host for HeadlessHost {
    fn notify(&self, title: &str, body: &str) {
        info!(title, body, "notification");
    }

    fn acquire_drawing_surface(&self, title: &str, is_3d: bool) -> SurfaceHandle {
        let surface = Rc::new(RefCell::new(RecordedSurface::new(title, is_3d)));
        self.surfaces.borrow_mut().push(Rc::clone(&surface));
        surface
    }

    fn console(&self, line: &str) {
        info!(target: "sgui::console", "{line}");
    }
}
