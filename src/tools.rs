//! Tool registry: static tool descriptions, argument validation, handlers.
//!
//! Tools are registered once at startup and never mutated afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use jsonschema::Validator;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::protocol::ToolResult;
use crate::schema::{self, SchemaError};

/// Executes a tool call whose arguments already passed validation.
///
/// Domain failures are reported inside the returned [`ToolResult`] with
/// `is_error` set, never as protocol errors.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, arguments: Map<String, Value>) -> ToolResult;
}

/// One named parameter of a tool.
#[derive(Debug, Clone)]
pub struct ToolParam {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

impl ToolParam {
    pub fn required(name: &'static str, description: &'static str) -> Self {
        Self { name, description, required: true }
    }

    pub fn optional(name: &'static str, description: &'static str) -> Self {
        Self { name, description, required: false }
    }

    /// Property schema; every parameter is a JSON string.
    pub fn schema(&self) -> Value {
        json!({
            "type": "string",
            "description": self.description,
        })
    }
}

/// Static description of a tool.
#[derive(Debug, Clone)]
pub struct Tool {
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<ToolParam>,
}

impl Tool {
    /// JSON Schema advertised as `inputSchema` in `tools/list`.
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| (p.name.to_string(), p.schema()))
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// Wire form of a tool inside the `tools/list` result.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Argument validation failure, always attributable to one argument.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgumentError {
    #[error("Missing required argument '{0}'")]
    Missing(String),
    #[error("Invalid argument '{name}': {reason}")]
    Invalid { name: String, reason: String },
}

impl ArgumentError {
    pub fn argument(&self) -> &str {
        match self {
            Self::Missing(name) => name,
            Self::Invalid { name, .. } => name,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("tool '{0}' is already registered")]
    Duplicate(String),
    #[error("invalid schema for parameter '{param}' of tool '{tool}': {source}")]
    Schema {
        tool: String,
        param: String,
        #[source]
        source: SchemaError,
    },
}

/// A tool together with its compiled parameter validators and handler.
pub struct RegisteredTool {
    tool: Tool,
    validators: Vec<Validator>,
    handler: Arc<dyn ToolHandler>,
}

impl RegisteredTool {
    pub fn tool(&self) -> &Tool {
        &self.tool
    }

    /// Check required parameters are present and every supplied parameter
    /// matches its schema. Parameters are checked in declaration order, so the
    /// first offending one is reported. Unknown extra arguments are ignored.
    pub fn validate(&self, arguments: &Map<String, Value>) -> Result<(), ArgumentError> {
        for (param, validator) in self.tool.params.iter().zip(&self.validators) {
            match arguments.get(param.name) {
                None if param.required => {
                    return Err(ArgumentError::Missing(param.name.to_string()));
                }
                None => {}
                Some(value) => {
                    schema::validate_value(validator, value).map_err(|e| {
                        ArgumentError::Invalid {
                            name: param.name.to_string(),
                            reason: e.to_string(),
                        }
                    })?;
                }
            }
        }
        Ok(())
    }

    pub async fn call(&self, arguments: Map<String, Value>) -> ToolResult {
        self.handler.call(arguments).await
    }
}

/// Name-keyed set of tools, listed in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        tool: Tool,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<(), RegistryError> {
        if self.index.contains_key(tool.name) {
            return Err(RegistryError::Duplicate(tool.name.to_string()));
        }

        let validators = tool
            .params
            .iter()
            .map(|p| {
                schema::compile(&p.schema()).map_err(|source| RegistryError::Schema {
                    tool: tool.name.to_string(),
                    param: p.name.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.index.insert(tool.name, self.tools.len());
        self.tools.push(RegisteredTool { tool, validators, handler });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.tool.name.to_string(),
                description: t.tool.description.to_string(),
                input_schema: t.tool.input_schema(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
