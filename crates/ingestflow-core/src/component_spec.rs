//! Typed component contracts and eager binding.
//!
//! A [`SpecSchema`] declares the parameters, input channels and output
//! channels of a component kind. [`ComponentSpec::bind`] is the only way to
//! obtain a spec, so every spec in existence has already passed validation.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::artifact::ArtifactChannel;
use crate::error::{ComponentError, Result};

/// Accepted JSON shape of an execution parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterType {
    String,
    Integer,
    /// A structured message; the name is the message type for diagnostics.
    Message(String),
}

impl ParameterType {
    fn accepts(&self, value: &serde_json::Value) -> bool {
        match self {
            ParameterType::String => value.is_string(),
            ParameterType::Integer => value.is_i64() || value.is_u64(),
            ParameterType::Message(_) => value.is_object(),
        }
    }

    fn label(&self) -> String {
        match self {
            ParameterType::String => "string".to_string(),
            ParameterType::Integer => "integer".to_string(),
            ParameterType::Message(name) => format!("message {name}"),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionParameter {
    pub name: String,
    pub parameter_type: ParameterType,
    pub optional: bool,
}

impl ExecutionParameter {
    pub fn required(name: &str, parameter_type: ParameterType) -> Self {
        Self {
            name: name.to_string(),
            parameter_type,
            optional: false,
        }
    }

    pub fn optional(name: &str, parameter_type: ParameterType) -> Self {
        Self {
            optional: true,
            ..Self::required(name, parameter_type)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelParameter {
    pub name: String,
    pub artifact_type: String,
    pub optional: bool,
}

impl ChannelParameter {
    pub fn required(name: &str, artifact_type: &str) -> Self {
        Self {
            name: name.to_string(),
            artifact_type: artifact_type.to_string(),
            optional: false,
        }
    }

    pub fn optional(name: &str, artifact_type: &str) -> Self {
        Self {
            optional: true,
            ..Self::required(name, artifact_type)
        }
    }
}

/// Declared interface of a component kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecSchema {
    pub component: String,
    pub parameters: Vec<ExecutionParameter>,
    pub inputs: Vec<ChannelParameter>,
    pub outputs: Vec<ChannelParameter>,
}

impl SpecSchema {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            parameters: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn parameter(mut self, parameter: ExecutionParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn input(mut self, input: ChannelParameter) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn output(mut self, output: ChannelParameter) -> Self {
        self.outputs.push(output);
        self
    }

    fn check_channels(
        &self,
        declared: &[ChannelParameter],
        supplied: &BTreeMap<String, Vec<ArtifactChannel>>,
    ) -> Result<()> {
        for key in supplied.keys() {
            if !declared.iter().any(|p| &p.name == key) {
                return Err(ComponentError::UnknownField {
                    component: self.component.clone(),
                    field: key.clone(),
                });
            }
        }

        for param in declared {
            let channels = supplied.get(&param.name).filter(|c| !c.is_empty());
            let Some(channels) = channels else {
                if param.optional {
                    continue;
                }
                return Err(ComponentError::missing(&self.component, &param.name));
            };
            if let Some(bad) = channels
                .iter()
                .find(|c| c.artifact_type() != param.artifact_type)
            {
                return Err(ComponentError::TypeMismatch {
                    field: param.name.clone(),
                    expected: param.artifact_type.clone(),
                    actual: bad.artifact_type().to_string(),
                });
            }
        }
        Ok(())
    }

    fn check_parameters(&self, supplied: &BTreeMap<String, serde_json::Value>) -> Result<()> {
        for key in supplied.keys() {
            if !self.parameters.iter().any(|p| &p.name == key) {
                return Err(ComponentError::UnknownField {
                    component: self.component.clone(),
                    field: key.clone(),
                });
            }
        }

        for param in &self.parameters {
            match supplied.get(&param.name) {
                None | Some(serde_json::Value::Null) => {
                    if !param.optional {
                        return Err(ComponentError::missing(&self.component, &param.name));
                    }
                }
                Some(value) if !param.parameter_type.accepts(value) => {
                    return Err(ComponentError::TypeMismatch {
                        field: param.name.clone(),
                        expected: param.parameter_type.label(),
                        actual: json_kind(value).to_string(),
                    });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

/// Validated contract of a single component instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentSpec {
    component: String,
    inputs: BTreeMap<String, Vec<ArtifactChannel>>,
    outputs: BTreeMap<String, Vec<ArtifactChannel>>,
    exec_properties: BTreeMap<String, serde_json::Value>,
}

impl ComponentSpec {
    /// Bind caller values against `schema`, failing on the first violation.
    ///
    /// Optional parameters supplied as `null` are dropped so that "absent"
    /// has a single representation.
    pub fn bind(
        schema: &SpecSchema,
        inputs: BTreeMap<String, Vec<ArtifactChannel>>,
        outputs: BTreeMap<String, Vec<ArtifactChannel>>,
        mut exec_properties: BTreeMap<String, serde_json::Value>,
    ) -> Result<Self> {
        schema.check_parameters(&exec_properties)?;
        schema.check_channels(&schema.inputs, &inputs)?;
        schema.check_channels(&schema.outputs, &outputs)?;

        exec_properties.retain(|_, v| !v.is_null());

        Ok(Self {
            component: schema.component.clone(),
            inputs,
            outputs,
            exec_properties,
        })
    }

    /// Name of the component kind this spec was bound for.
    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn inputs(&self) -> &BTreeMap<String, Vec<ArtifactChannel>> {
        &self.inputs
    }

    pub fn outputs(&self) -> &BTreeMap<String, Vec<ArtifactChannel>> {
        &self.outputs
    }

    pub fn exec_properties(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.exec_properties
    }

    pub fn output(&self, name: &str) -> &[ArtifactChannel] {
        self.outputs.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn input(&self, name: &str) -> &[ArtifactChannel] {
        self.inputs.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}
