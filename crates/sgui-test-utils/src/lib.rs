//! Testing utilities for SGUI workspace
//!
//! Shared test helpers, fixtures, and a host that records what plugins
//! asked of it.

#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc)]

use sgui_core::demo::demo_registry;
use sgui_core::Workspace;
use sgui_engine::{
    Destinations, FunctionBinding, Host, ObjectBinding, ObjectNamespace, RecordedSurface, Registry, SurfaceHandle,
};
use sgui_namespace::{Node, NodePath};
use sgui_schema::{FieldMap, FieldValue};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

/// Index of `AddNumbers` in [`registry`]
pub const ADD_NUMBERS: usize = 0;
/// Index of `Plot` in [`registry`]
pub const PLOT: usize = 1;
/// Index of `Debug` in [`registry`]
pub const DEBUG: usize = 1;

/// Host that keeps every notification, console line and surface
#[derive(Debug, Default)]
pub struct RecordingHost {
    notifications: RefCell<Vec<(String, String)>>,
    console: RefCell<Vec<String>>,
    surfaces: RefCell<Vec<Rc<RefCell<RecordedSurface>>>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<(String, String)> {
        self.notifications.borrow().clone()
    }

    pub fn notification_titles(&self) -> Vec<String> {
        self.notifications.borrow().iter().map(|(title, _)| title.clone()).collect()
    }

    pub fn console(&self) -> Vec<String> {
        self.console.borrow().clone()
    }

    pub fn surfaces(&self) -> Vec<RecordedSurface> {
        self.surfaces.borrow().iter().map(|s| s.borrow().clone()).collect()
    }
}

impl Host for RecordingHost {
    fn notify(&self, title: &str, body: &str) {
        self.notifications.borrow_mut().push((title.to_string(), body.to_string()));
    }

    fn acquire_drawing_surface(&self, title: &str, is_3d: bool) -> SurfaceHandle {
        let surface = Rc::new(RefCell::new(RecordedSurface::new(title, is_3d)));
        self.surfaces.borrow_mut().push(Rc::clone(&surface));
        surface
    }

    fn console(&self, line: &str) {
        self.console.borrow_mut().push(line.to_string());
    }
}

pub fn p(s: &str) -> NodePath {
    s.parse().unwrap()
}

/// Registry with the demo plugins
pub fn registry() -> Registry {
    demo_registry().unwrap()
}

pub fn string_inputs(value: impl Into<FieldValue>) -> FieldMap {
    let mut inputs = FieldMap::new();
    inputs.insert("Value".to_string(), value.into());
    inputs
}

/// `\Inputs\X` = 5 and `\Inputs\Y` = 7
pub fn sample_objects() -> ObjectNamespace {
    let mut objects = ObjectNamespace::new();
    objects.set(&p("\\Inputs\\X"), Node::Leaf(ObjectBinding::string("5"))).unwrap();
    objects.set(&p("\\Inputs\\Y"), Node::Leaf(ObjectBinding::string("7"))).unwrap();
    objects
}

pub fn add_inputs(a: impl Into<FieldValue>, b: impl Into<FieldValue>) -> FieldMap {
    let mut inputs = FieldMap::new();
    inputs.insert("Value 1".to_string(), a.into());
    inputs.insert("Value 2".to_string(), b.into());
    inputs
}

pub fn result_to(dest: Option<&str>) -> Destinations {
    let mut outputs = Destinations::new();
    outputs.insert("Result".to_string(), dest.map(p));
    outputs
}

/// `AddNumbers` binding from two input paths to `dest`
pub fn add_binding(a: &str, b: &str, dest: Option<&str>) -> FunctionBinding {
    FunctionBinding::new(ADD_NUMBERS, add_inputs(p(a), p(b))).with_output("Result", dest.map(p))
}

/// Session over [`registry`] holding [`sample_objects`]
pub fn sample_workspace(host: &dyn Host) -> Workspace {
    let mut ws = Workspace::new(Arc::new(registry()));
    for (path, value) in [("\\Inputs\\X", "5"), ("\\Inputs\\Y", "7")] {
        ws.create_object(host, &p(path), 0, string_inputs(value)).unwrap();
    }
    ws
}
