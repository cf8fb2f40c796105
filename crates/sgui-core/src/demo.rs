//! Bundled demo plugins
//!
//! [`DebugType`] takes one input of every kind. [`AddNumbers`] and
//! [`PlotDemo`] show the two things a function can do besides returning
//! outputs: notify the user and draw.

use sgui_engine::{
    EngineError, ExecutionContext, FunctionOutputs, FunctionType, ObjectType, PluginError, Registry,
    ResolvedInputs, ResolvedValue, RuntimeObject, STRING_TYPE,
};
use sgui_schema::{BaseKind, DynamicKind, FieldMap, FieldValue, InputKind, Literal, OutputSpec, SchemaDescriptor};
use std::any::Any;

/// Object type exercising every input kind
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugType;

impl DebugType {
    /// Registered type name
    pub const NAME: &'static str = "Debug";
    /// Options of the kind selector
    pub const KIND_OPTIONS: [&'static str; 5] = ["raw", "object", "file", "dropdown", "disabled"];
    /// Options offered when the dynamic field becomes a dropdown
    pub const DYNAMIC_OPTIONS: [&'static str; 4] = ["option1", "option2", "option3", "option4"];

    fn dynamic_kind() -> DynamicKind {
        DynamicKind::new("kind_from_dropdown", |values: &FieldMap| {
            let selected = values.get("dropdownvalue")?.as_literal()?;
            let Literal::Text(selected) = selected else {
                return None;
            };
            match selected.as_str() {
                "raw" => Some(BaseKind::Raw),
                "object" => Some(BaseKind::Object),
                "file" => Some(BaseKind::File),
                "dropdown" => Some(BaseKind::dropdown(Self::DYNAMIC_OPTIONS)),
                _ => None,
            }
        })
        .depends_on("dropdownvalue")
    }
}

/// Value of a [`DebugType`] field after resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebugValue {
    /// Literal or string text
    Text(String),
    /// Type name of a referenced object
    Object(String),
}

impl DebugValue {
    fn from_resolved(value: &ResolvedValue) -> Result<Self, PluginError> {
        match value {
            ResolvedValue::Text(text) => Ok(Self::Text(text.clone())),
            ResolvedValue::Object(object) => Ok(Self::Object(object.type_name().to_string())),
            ResolvedValue::List(_) => Err(PluginError::new("unexpected list")),
        }
    }
}

/// Runtime object built by [`DebugType`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugObject {
    /// `rawvalue`
    pub raw: String,
    /// Type name of `objectvalue`
    pub object: String,
    /// `filevalue`
    pub file: String,
    /// `dropdownvalue`
    pub dropdown: String,
    /// `disabledvalue`, always empty
    pub disabled: String,
    /// `functional`, typed by `dropdownvalue`
    pub functional: DebugValue,
    /// `list` entries
    pub list: Vec<String>,
}

impl RuntimeObject for DebugObject {
    fn type_name(&self) -> &str {
        DebugType::NAME
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ObjectType for DebugType {
    fn type_name(&self) -> &str {
        Self::NAME
    }

    fn schema(&self) -> SchemaDescriptor {
        SchemaDescriptor::new()
            .input("rawvalue", BaseKind::Raw)
            .input("objectvalue", BaseKind::Object)
            .input("filevalue", BaseKind::File)
            .input("dropdownvalue", BaseKind::dropdown(Self::KIND_OPTIONS))
            .input("disabledvalue", BaseKind::Disabled)
            .input("functional", Self::dynamic_kind())
            .input("list", InputKind::list(BaseKind::Raw))
            .input_tip("rawvalue", "This is a raw value")
            .input_tip("objectvalue", "This is an object you have to select")
            .input_tip("filevalue", "This is a file you must give the directory to")
            .input_tip("dropdownvalue", "This is a choice of a few dropdowns")
            .input_tip("disabledvalue", "This input is disabled")
            .input_tip(
                "functional",
                "This is an input that changes type, depending on the values of the above inputs",
            )
            .input_tip("list", "More than one input can be added here")
    }

    fn construct(&self, inputs: &ResolvedInputs) -> Result<Box<dyn RuntimeObject>, PluginError> {
        let functional = inputs
            .get("functional")
            .ok_or_else(|| PluginError::new("missing input 'functional'"))?;
        let list = inputs
            .list("list")?
            .iter()
            .map(|item| item.as_text().map(str::to_string).ok_or_else(|| PluginError::new("list entries must be text")))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Box::new(DebugObject {
            raw: inputs.text("rawvalue")?.to_string(),
            object: inputs.object("objectvalue")?.type_name().to_string(),
            file: inputs.text("filevalue")?.to_string(),
            dropdown: inputs.text("dropdownvalue")?.to_string(),
            disabled: inputs.text("disabledvalue")?.to_string(),
            functional: DebugValue::from_resolved(functional)?,
            list,
        }))
    }
}

/// Adds two numbers into a new String object
#[derive(Debug, Clone, Copy, Default)]
pub struct AddNumbers;

impl AddNumbers {
    /// Registered type name
    pub const NAME: &'static str = "AddNumbers";
}

impl FunctionType for AddNumbers {
    fn type_name(&self) -> &str {
        Self::NAME
    }

    fn schema(&self) -> SchemaDescriptor {
        SchemaDescriptor::new()
            .input("Value 1", BaseKind::Raw)
            .input("Value 2", BaseKind::Raw)
            .output("Result", OutputSpec::object(STRING_TYPE))
            .input_tip("Value 1", "This is one value to add.")
            .input_tip("Value 2", "This is another value to add.")
            .output_tip("Result", "This is the sum of Value 1 and Value 2.")
    }

    fn execute(&self, ctx: &ExecutionContext<'_>) -> Result<FunctionOutputs, PluginError> {
        let sum = ctx.inputs().number("Value 1")? + ctx.inputs().number("Value 2")?;
        ctx.notify("This is a pop up from AddNumbers", "Numbers successfully added!");

        let mut result = FieldMap::new();
        result.insert("Value".to_string(), FieldValue::number(sum));
        Ok(FunctionOutputs::from([("Result".to_string(), result)]))
    }
}

/// Draws fixed series on two 2D surfaces and one 3D surface
#[derive(Debug, Clone, Copy, Default)]
pub struct PlotDemo;

impl PlotDemo {
    /// Registered type name
    pub const NAME: &'static str = "Plot";
}

impl FunctionType for PlotDemo {
    fn type_name(&self) -> &str {
        Self::NAME
    }

    fn schema(&self) -> SchemaDescriptor {
        SchemaDescriptor::new().help("Draws example line plots")
    }

    fn execute(&self, ctx: &ExecutionContext<'_>) -> Result<FunctionOutputs, PluginError> {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [0.0, 1.0, 1.0, 0.0];
        ctx.drawing_surface("First plot!", false).borrow_mut().plot(&xs, &ys)?;

        let ys2 = [0.0, 1.0, 1.0, 3.0];
        ctx.drawing_surface("Second plot!", false).borrow_mut().plot(&xs, &ys2)?;

        let zs = [0.0, 2.0, 5.0, 3.0];
        ctx.drawing_surface("This one is in 3D!", true)
            .borrow_mut()
            .plot_3d(&xs, &ys, &zs)?;
        Ok(FunctionOutputs::new())
    }
}

/// Registry with the demo plugins after the built-in String type
///
/// Object types: `String` (0), `Debug` (1). Function types: `AddNumbers`
/// (0), `Plot` (1).
///
/// # Errors
/// Only if a demo descriptor is invalid
pub fn demo_registry() -> Result<Registry, EngineError> {
    Registry::new()
        .with_object(DebugType)?
        .with_function(AddNumbers)?
        .with_function(PlotDemo)
}
