//! Argument validation performed before a tool runs.

use crate::error::{Result, ToolError};
use crate::schema::ParameterSchema;
use crate::spec::{ToolArgs, json_type_name};

/// How strictly arguments are checked against a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Only required-parameter presence.
    #[default]
    Presence,
    /// Presence plus the JSON type of each supplied, declared property.
    Strict,
}

/// Check `args` against `schema`.
///
/// A required key holding `null` counts as absent. Undeclared keys are
/// ignored in both modes.
pub fn validate_args(schema: &ParameterSchema, args: &ToolArgs, mode: ValidationMode) -> Result<()> {
    let missing: Vec<String> = schema
        .required
        .iter()
        .filter(|name| args.get(name.as_str()).is_none_or(|v| v.is_null()))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(ToolError::MissingParameters(missing));
    }

    if mode == ValidationMode::Strict {
        for (name, value) in args {
            let Some(prop) = schema.properties.get(name) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            if !prop.accepts(value) {
                return Err(ToolError::invalid_arguments(format!(
                    "parameter '{name}' must be of type {}, got {}",
                    prop.schema_type,
                    json_type_name(value)
                )));
            }
            if let (Some(allowed), Some(s)) = (&prop.enum_values, value.as_str())
                && !allowed.iter().any(|a| a == s)
            {
                return Err(ToolError::invalid_arguments(format!(
                    "parameter '{name}' must be one of: {}",
                    allowed.join(", ")
                )));
            }
        }
    }

    Ok(())
}
