// Argument binding
//
// Turns the raw `arguments` object of a `tools/call` into the positional
// arguments a handler declared. Binding never fails for a missing argument;
// only a value of the wrong JSON kind is rejected.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use crate::dispatch::RequestContext;
use crate::errors::ToolError;
use crate::schema::Shape;

use super::ArgumentSlot;

/// A bound value for one slot of the plan
#[derive(Debug, Clone)]
pub enum BoundArgument {
    Context(RequestContext),
    Cancellation(CancellationToken),
    /// The whole arguments object, `None` when absent or not an object
    Payload(Option<Map<String, Value>>),
    /// A single named value, `None` when absent
    Named { name: String, value: Option<Value> },
}

/// The bound arguments handed to a tool handler
#[derive(Debug, Clone)]
pub struct BoundArguments {
    context: RequestContext,
    slots: Vec<BoundArgument>,
}

impl BoundArguments {
    /// Context of the current request
    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Cancellation signal of the current request
    pub fn cancellation(&self) -> &CancellationToken {
        &self.context.cancellation
    }

    /// Positional slots, in declaration order
    pub fn slots(&self) -> &[BoundArgument] {
        &self.slots
    }

    /// Raw value bound to a named argument
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.named(name).ok().flatten()
    }

    /// Named argument deserialized into `T`; an absent value yields `T::default()`
    pub fn get<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T, ToolError> {
        Ok(self.get_opt(name)?.unwrap_or_default())
    }

    /// Named argument deserialized into `T`, `None` when absent
    pub fn get_opt<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ToolError> {
        match self.named(name)? {
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| ToolError::InvalidParameters(format!("Argument '{}': {}", name, e))),
            None => Ok(None),
        }
    }

    /// The arguments object deserialized into `T`; a missing object yields `T::default()`
    pub fn payload<T: DeserializeOwned + Default>(&self) -> Result<T, ToolError> {
        let bound = self.slots.iter().find_map(|slot| match slot {
            BoundArgument::Payload(map) => Some(map),
            _ => None,
        });

        match bound {
            Some(Some(map)) => serde_json::from_value(Value::Object(map.clone()))
                .map_err(|e| ToolError::InvalidParameters(e.to_string())),
            Some(None) => Ok(T::default()),
            None => Err(ToolError::ExecutionFailed(
                "Tool declares no payload argument".to_string(),
            )),
        }
    }

    fn named(&self, name: &str) -> Result<Option<&Value>, ToolError> {
        self.slots
            .iter()
            .find_map(|slot| match slot {
                BoundArgument::Named { name: n, value } if n == name => Some(value.as_ref()),
                _ => None,
            })
            .ok_or_else(|| ToolError::ExecutionFailed(format!("Argument '{}' is not declared", name)))
    }
}

/// Bind raw arguments to a plan, slot by slot
pub fn bind_arguments(
    plan: &[ArgumentSlot],
    context: RequestContext,
    raw: Option<&Value>,
) -> Result<BoundArguments, ToolError> {
    let raw = raw.and_then(Value::as_object);
    let mut slots = Vec::with_capacity(plan.len());

    for slot in plan {
        let bound = match slot {
            ArgumentSlot::Context => BoundArgument::Context(context.clone()),
            ArgumentSlot::Cancellation => BoundArgument::Cancellation(context.cancellation.clone()),
            ArgumentSlot::Payload(_) => BoundArgument::Payload(raw.cloned()),
            ArgumentSlot::Named(field) => {
                let shape = field.shape.resolve();
                let value = match raw.and_then(|args| args.get(&field.name)) {
                    Some(value) => bind_scalar(&field.name, &shape, value)?,
                    None => None,
                };
                let value = value
                    .or_else(|| field.default.clone())
                    .or_else(|| shape.zero_value());
                BoundArgument::Named {
                    name: field.name.clone(),
                    value,
                }
            }
        };
        slots.push(bound);
    }

    Ok(BoundArguments { context, slots })
}

// Strict checks for the primitive kinds; structured shapes are kept as raw
// JSON and deserialized when the handler asks for them.
fn bind_scalar(name: &str, shape: &Shape, value: &Value) -> Result<Option<Value>, ToolError> {
    if value.is_null() {
        return Ok(None);
    }

    let accepted = match shape {
        Shape::Nullable(inner) => return bind_scalar(name, &inner.resolve(), value),
        Shape::String => value.is_string(),
        Shape::Integer => value.is_i64() || value.is_u64(),
        Shape::Number => value.is_number(),
        Shape::Boolean => value.is_boolean(),
        _ => true,
    };

    if accepted {
        Ok(Some(value.clone()))
    } else {
        Err(ToolError::InvalidParameters(format!(
            "Argument '{}' expected {}, got {}",
            name,
            expected_kind(shape),
            json_kind(value)
        )))
    }
}

fn expected_kind(shape: &Shape) -> &'static str {
    match shape {
        Shape::String => "a string",
        Shape::Integer => "an integer",
        Shape::Number => "a number",
        Shape::Boolean => "a boolean",
        _ => "a value",
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
