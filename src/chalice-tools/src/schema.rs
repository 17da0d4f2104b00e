//! Declarative parameter schemas.
//!
//! A JSON-Schema subset: enough for a function-calling model to know which
//! arguments exist, their types, defaults and allowed values.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameter schema of a tool. Always an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Schema type, always "object".
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Property definitions in declaration order.
    #[serde(default)]
    pub properties: IndexMap<String, PropertySchema>,
    /// Required property names.
    #[serde(default)]
    pub required: Vec<String>,
}

impl ParameterSchema {
    /// Create an empty object schema.
    pub fn object() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: IndexMap::new(),
            required: Vec::new(),
        }
    }

    /// Add a property.
    pub fn property(mut self, name: impl Into<String>, schema: PropertySchema) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    /// Set required properties.
    pub fn required(mut self, required: Vec<impl Into<String>>) -> Self {
        self.required = required.into_iter().map(Into::into).collect();
        self
    }

    /// Serialize to a JSON value.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Default::default()))
    }
}

impl Default for ParameterSchema {
    fn default() -> Self {
        Self::object()
    }
}

/// JSON Schema for a single property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    /// Property type.
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "enum")]
    pub enum_values: Option<Vec<String>>,
    /// Minimum value (for numbers).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Maximum value (for numbers).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// Array item schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<PropertySchema>>,
}

impl PropertySchema {
    fn of_type(schema_type: &str) -> Self {
        Self {
            schema_type: schema_type.to_string(),
            description: None,
            default: None,
            enum_values: None,
            minimum: None,
            maximum: None,
            items: None,
        }
    }

    pub fn string() -> Self {
        Self::of_type("string")
    }

    pub fn integer() -> Self {
        Self::of_type("integer")
    }

    pub fn number() -> Self {
        Self::of_type("number")
    }

    pub fn boolean() -> Self {
        Self::of_type("boolean")
    }

    /// Free-form JSON object.
    pub fn object() -> Self {
        Self::of_type("object")
    }

    pub fn array(items: PropertySchema) -> Self {
        let mut schema = Self::of_type("array");
        schema.items = Some(Box::new(items));
        schema
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn enum_values(mut self, values: Vec<impl Into<String>>) -> Self {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.minimum = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.maximum = Some(max);
        self
    }

    /// Whether `value` has the JSON type this property declares.
    pub fn accepts(&self, value: &Value) -> bool {
        match self.schema_type.as_str() {
            "string" => value.is_string(),
            "integer" => value.is_i64() || value.is_u64(),
            "number" => value.is_number(),
            "boolean" => value.is_boolean(),
            "object" => value.is_object(),
            "array" => value.is_array(),
            _ => true,
        }
    }
}
