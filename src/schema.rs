use jsonschema::{validator_for, Validator};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Schema parse error: {0}")]
    SchemaParse(#[from] serde_json::Error),
    #[error("Schema compile error: {0}")]
    SchemaCompile(String),
    #[error("{0}")]
    ValidationFailed(String),
}

/// Compile a JSON Schema (draft 2020-12 unless `$schema` says otherwise).
pub fn compile(schema: &Value) -> Result<Validator, SchemaError> {
    validator_for(schema).map_err(|e| SchemaError::SchemaCompile(e.to_string()))
}

/// Validate an instance, reporting the first violation as text.
pub fn validate_value(validator: &Validator, instance: &Value) -> Result<(), SchemaError> {
    validator
        .validate(instance)
        .map_err(|e| SchemaError::ValidationFailed(e.to_string()))
}

/// Validate a JSON instance against a JSON Schema, both given as text.
pub fn validate_json(schema_str: &str, instance_str: &str) -> Result<(), SchemaError> {
    let schema_json: Value = serde_json::from_str(schema_str)?;
    let instance_json: Value = serde_json::from_str(instance_str)?;

    let validator = compile(&schema_json)?;
    validate_value(&validator, &instance_json)
}
