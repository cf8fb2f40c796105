//! Schema descriptors
//!
//! A [`SchemaDescriptor`] is the declarative contract a plugin type exposes:
//! ordered inputs with their kinds, ordered outputs, optional tips and help.
//! Input order is significant: a dynamic kind may only read fields declared
//! before it.

use crate::error::SchemaError;
use crate::kind::{BaseKind, EffectiveKind, InputKind, OutputSpec};
use crate::value::{FieldMap, FieldValue, Literal};
use indexmap::IndexMap;
use sgui_namespace::validate_name;
use std::collections::HashSet;

/// Input/output contract of a plugin type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaDescriptor {
    inputs: Vec<(String, InputKind)>,
    outputs: Vec<(String, OutputSpec)>,
    input_tips: IndexMap<String, String>,
    output_tips: IndexMap<String, String>,
    help: Option<String>,
}

impl SchemaDescriptor {
    /// Empty descriptor
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the next input
    #[must_use]
    pub fn input(mut self, name: impl Into<String>, kind: impl Into<InputKind>) -> Self {
        self.inputs.push((name.into(), kind.into()));
        self
    }

    /// Declare the next output
    #[must_use]
    pub fn output(mut self, name: impl Into<String>, spec: OutputSpec) -> Self {
        self.outputs.push((name.into(), spec));
        self
    }

    /// Attach help text to an input
    #[must_use]
    pub fn input_tip(mut self, name: impl Into<String>, tip: impl Into<String>) -> Self {
        self.input_tips.insert(name.into(), tip.into());
        self
    }

    /// Attach help text to an output
    #[must_use]
    pub fn output_tip(mut self, name: impl Into<String>, tip: impl Into<String>) -> Self {
        self.output_tips.insert(name.into(), tip.into());
        self
    }

    /// Attach help text to the type
    #[must_use]
    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = Some(text.into());
        self
    }

    /// Inputs in declaration order
    pub fn inputs(&self) -> impl Iterator<Item = (&str, &InputKind)> {
        self.inputs.iter().map(|(name, kind)| (name.as_str(), kind))
    }

    /// Outputs in declaration order
    pub fn outputs(&self) -> impl Iterator<Item = (&str, &OutputSpec)> {
        self.outputs.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    /// Declared kind of an input
    #[must_use]
    pub fn input_kind(&self, name: &str) -> Option<&InputKind> {
        self.inputs.iter().find(|(n, _)| n == name).map(|(_, kind)| kind)
    }

    /// Declared spec of an output
    #[must_use]
    pub fn output_spec(&self, name: &str) -> Option<&OutputSpec> {
        self.outputs.iter().find(|(n, _)| n == name).map(|(_, spec)| spec)
    }

    /// Tip for an input
    #[must_use]
    pub fn tip_for_input(&self, name: &str) -> Option<&str> {
        self.input_tips.get(name).map(String::as_str)
    }

    /// Tip for an output
    #[must_use]
    pub fn tip_for_output(&self, name: &str) -> Option<&str> {
        self.output_tips.get(name).map(String::as_str)
    }

    /// Help text for the type
    #[inline]
    #[must_use]
    pub fn help_text(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Number of declared inputs
    #[inline]
    #[must_use]
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Check the descriptor itself; run once when a plugin is registered
    ///
    /// # Errors
    /// - [`SchemaError::InvalidFieldName`] / [`SchemaError::DuplicateField`]
    /// - [`SchemaError::EmptyDropdown`] / [`SchemaError::DuplicateOption`]
    /// - [`SchemaError::DynamicDependency`] if a dynamic kind reads itself or
    ///   a field that is not declared earlier
    /// - [`SchemaError::InvalidOutputType`] for an unnamed output type
    /// - [`SchemaError::UnknownTip`] for a tip on an undeclared field
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut earlier: HashSet<&str> = HashSet::new();
        for (name, kind) in &self.inputs {
            check_field_name(name)?;
            match kind {
                InputKind::Base(base) | InputKind::List(base) => check_base(name, base)?,
                InputKind::Dynamic(dynamic) => {
                    check_base(name, dynamic.fallback())?;
                    if let Some(dependency) = dynamic
                        .dependencies()
                        .iter()
                        .find(|dep| !earlier.contains(dep.as_str()))
                    {
                        return Err(SchemaError::DynamicDependency {
                            field: name.clone(),
                            dependency: dependency.clone(),
                        });
                    }
                }
            }
            if !earlier.insert(name.as_str()) {
                return Err(SchemaError::DuplicateField(name.clone()));
            }
        }

        let mut outputs = HashSet::new();
        for (name, spec) in &self.outputs {
            check_field_name(name)?;
            if !outputs.insert(name.as_str()) {
                return Err(SchemaError::DuplicateField(name.clone()));
            }
            if matches!(spec, OutputSpec::Object(type_name) if type_name.is_empty()) {
                return Err(SchemaError::InvalidOutputType(name.clone()));
            }
        }

        if let Some(name) = self.input_tips.keys().find(|n| !earlier.contains(n.as_str())) {
            return Err(SchemaError::UnknownTip(name.clone()));
        }
        if let Some(name) = self.output_tips.keys().find(|n| !outputs.contains(n.as_str())) {
            return Err(SchemaError::UnknownTip(name.clone()));
        }
        Ok(())
    }

    /// Kinds of every input for the given values, evaluating dynamic kinds in
    /// declaration order
    #[must_use]
    pub fn effective_kinds(&self, values: &FieldMap) -> IndexMap<String, EffectiveKind> {
        self.inputs
            .iter()
            .map(|(name, kind)| (name.clone(), kind.effective(values)))
            .collect()
    }

    /// Check that `values` has the shape this descriptor requires
    ///
    /// References are not followed here; that needs a namespace.
    ///
    /// # Errors
    /// The first mismatch found, in declaration order; then any undeclared
    /// field as [`SchemaError::UnexpectedField`]
    pub fn check_values(&self, values: &FieldMap) -> Result<(), SchemaError> {
        for (name, kind) in self.effective_kinds(values) {
            let value = values
                .get(&name)
                .ok_or_else(|| SchemaError::MissingValue(name.clone()))?;
            match (&kind, value) {
                (EffectiveKind::List(base), FieldValue::List(items)) => {
                    for item in items {
                        check_single(&name, base, item)?;
                    }
                }
                (EffectiveKind::List(_), _) => return Err(SchemaError::ExpectedList(name)),
                (EffectiveKind::Single(base), value) => check_single(&name, base, value)?,
            }
        }

        if let Some(extra) = values.keys().find(|k| self.input_kind(k).is_none()) {
            return Err(SchemaError::UnexpectedField(extra.clone()));
        }
        Ok(())
    }

    /// Blank value for every input, lists empty
    #[must_use]
    pub fn default_values(&self) -> FieldMap {
        self.inputs
            .iter()
            .map(|(name, kind)| {
                let value = match kind {
                    InputKind::List(_) => FieldValue::List(Vec::new()),
                    _ => FieldValue::blank(),
                };
                (name.clone(), value)
            })
            .collect()
    }
}

fn check_field_name(name: &str) -> Result<(), SchemaError> {
    validate_name(name).map_err(|_| SchemaError::InvalidFieldName(name.to_string()))
}

fn check_base(field: &str, kind: &BaseKind) -> Result<(), SchemaError> {
    if let BaseKind::Dropdown(options) = kind {
        if options.is_empty() {
            return Err(SchemaError::EmptyDropdown(field.to_string()));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = options.iter().find(|o| !seen.insert(o.as_str())) {
            return Err(SchemaError::DuplicateOption {
                field: field.to_string(),
                option: dup.clone(),
            });
        }
    }
    Ok(())
}

fn check_single(field: &str, kind: &BaseKind, value: &FieldValue) -> Result<(), SchemaError> {
    let literal = match value {
        FieldValue::List(_) => return Err(SchemaError::UnexpectedList(field.to_string())),
        FieldValue::Path(_) if kind.accepts_path() => return Ok(()),
        FieldValue::Path(_) => return Err(SchemaError::UnexpectedPath(field.to_string())),
        FieldValue::Literal(literal) => literal,
    };

    match kind {
        BaseKind::Raw | BaseKind::File => Ok(()),
        BaseKind::Object => Err(SchemaError::ExpectedPath(field.to_string())),
        BaseKind::Disabled if literal.is_blank() => Ok(()),
        BaseKind::Disabled => Err(SchemaError::DisabledNotEmpty(field.to_string())),
        BaseKind::Dropdown(options) => match literal {
            Literal::Text(text) if options.contains(text) => Ok(()),
            other => Err(SchemaError::InvalidOption {
                field: field.to_string(),
                value: other.to_string(),
            }),
        },
    }
}
