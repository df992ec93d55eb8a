// Schema generator
//
// Turns `Shape` descriptors into the JSON Schema fragments advertised as a
// tool's `inputSchema`. Pure functions, no state.

mod describe;
mod shape;
#[cfg(test)]
mod tests;

pub use describe::Describe;
pub use shape::{Constraints, DataFormat, FieldShape, ObjectShape, Shape, ShapeFn, ShapeRef};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Nesting depth past which arrays and objects collapse to `{"type":"object"}`
pub const MAX_SCHEMA_DEPTH: usize = 3;

/// A JSON Schema fragment
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<PropertySchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, PropertySchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl PropertySchema {
    /// A fragment carrying only a `type`
    pub fn typed(schema_type: &str) -> Self {
        Self {
            schema_type: schema_type.to_string(),
            ..Default::default()
        }
    }

    fn formatted(schema_type: &str, format: &str) -> Self {
        Self {
            format: Some(format.to_string()),
            ..Self::typed(schema_type)
        }
    }

    /// An object fragment with a (possibly empty) property map
    pub fn object() -> Self {
        Self {
            properties: Some(BTreeMap::new()),
            ..Self::typed("object")
        }
    }

    /// Adds a property, recording it as required when asked. Duplicate
    /// required names are ignored.
    pub fn insert_property(&mut self, name: String, schema: PropertySchema, required: bool) {
        if required {
            let list = self.required.get_or_insert_with(Vec::new);
            if !list.contains(&name) {
                list.push(name.clone());
            }
        }
        self.properties
            .get_or_insert_with(BTreeMap::new)
            .insert(name, schema);
    }
}

/// Generate the schema for a shape
pub fn generate_schema(shape: &Shape) -> PropertySchema {
    generate_at(shape, 0)
}

fn generate_at(shape: &Shape, depth: usize) -> PropertySchema {
    if depth > MAX_SCHEMA_DEPTH {
        return PropertySchema::typed("object");
    }

    match shape {
        Shape::String => PropertySchema::typed("string"),
        Shape::Integer => PropertySchema::typed("integer"),
        Shape::Number => PropertySchema::typed("number"),
        Shape::Boolean => PropertySchema::typed("boolean"),
        Shape::Date => PropertySchema::formatted("string", "date"),
        Shape::DateTime => PropertySchema::formatted("string", "date-time"),
        Shape::Time => PropertySchema::formatted("string", "time"),
        Shape::Uuid => PropertySchema::formatted("string", "uuid"),
        Shape::Uri => PropertySchema::formatted("string", "uri"),
        Shape::Enum(names) => PropertySchema {
            enum_values: Some(names.clone()),
            ..PropertySchema::typed("string")
        },
        Shape::Array(items) => PropertySchema {
            items: Some(Box::new(generate_at(&items.resolve(), depth + 1))),
            ..PropertySchema::typed("array")
        },
        Shape::Map | Shape::Any => PropertySchema::typed("object"),
        Shape::Nullable(inner) => generate_at(&inner.resolve(), depth),
        Shape::Object(object) => object_schema(object, depth),
    }
}

fn object_schema(object: &ObjectShape, depth: usize) -> PropertySchema {
    let mut schema = PropertySchema::object();
    for field in &object.fields {
        let property = field_schema(field, depth + 1);
        schema.insert_property(to_camel_case(&field.name), property, field.is_required());
    }
    schema
}

/// Schema for one field: its shape, then annotations in a fixed order
/// (description, range, length, pattern, allowed values, format, default)
pub(crate) fn field_schema(field: &FieldShape, depth: usize) -> PropertySchema {
    let mut schema = generate_at(&field.shape.resolve(), depth);
    apply_annotations(&mut schema, field);
    schema
}

fn apply_annotations(schema: &mut PropertySchema, field: &FieldShape) {
    let constraints = &field.constraints;

    if let Some(description) = &field.description {
        schema.description = Some(description.clone());
    }

    if let Some(min) = &constraints.minimum {
        schema.minimum = Some(min.clone());
    }
    if let Some(max) = &constraints.maximum {
        schema.maximum = Some(max.clone());
    }

    if let Some(min) = constraints.min_length {
        schema.min_length = Some(min);
    }
    if let Some(max) = constraints.max_length {
        schema.max_length = Some(max);
    }

    if let Some(pattern) = &constraints.pattern {
        schema.pattern = Some(pattern.clone());
    }

    let allowed = constraints
        .allowed_values
        .as_ref()
        .or(constraints.validator_allowed_values.as_ref());
    if let Some(values) = allowed {
        schema.enum_values = Some(values.iter().map(stringify_value).collect());
    }

    if let Some(format) = constraints.data_type {
        schema.format = Some(format.as_str().to_string());
    }
    if let Some(format) = constraints.semantic_format {
        schema.format = Some(format.as_str().to_string());
    }

    if let Some(default) = &field.default {
        schema.default = Some(default.clone());
    }
}

fn stringify_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Whether arguments of this shape bind the whole arguments object (payload)
/// rather than a single named value. Only default-constructible object shapes
/// qualify; anything else, including a nullable object, binds as a scalar.
pub fn is_object_type(shape: &Shape) -> bool {
    matches!(shape, Shape::Object(object) if object.constructible)
}

/// Convert an identifier to lowerCamelCase: `snake_case` segments are joined
/// and a leading run of capitals is lowered (`URLPath` becomes `urlPath`).
pub fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (index, segment) in name.split('_').filter(|s| !s.is_empty()).enumerate() {
        if index == 0 {
            out.push_str(&lower_leading_capitals(segment));
        } else {
            let mut chars = segment.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    out
}

fn lower_leading_capitals(segment: &str) -> String {
    let chars: Vec<char> = segment.chars().collect();
    let mut out = String::with_capacity(segment.len());
    let mut lowering = true;
    for (i, c) in chars.iter().enumerate() {
        if lowering && c.is_uppercase() {
            // keep the capital that starts the next word ("URLPath" -> "urlPath")
            let next_is_lower = chars.get(i + 1).map_or(false, |n| n.is_lowercase());
            if i > 0 && next_is_lower {
                lowering = false;
                out.push(*c);
            } else {
                out.extend(c.to_lowercase());
            }
        } else {
            lowering = false;
            out.push(*c);
        }
    }
    out
}
