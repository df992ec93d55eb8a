// Tools module for the MCP dispatcher
//
// This module implements tool registration and invocation: descriptors built
// explicitly at startup, their computed input schemas, and the handlers that
// run on `tools/call`.

mod binding;
mod registry;

pub use binding::{bind_arguments, BoundArgument, BoundArguments};
pub use registry::ToolRegistry;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::{BoxFuture, FutureExt};
use serde::Serialize;
use serde_json::Value;

use crate::config::JsonOptions;
use crate::errors::ToolError;
use crate::models::{ToolAnnotations, ToolCallResult, ToolDefinition};
use crate::schema::{self, Describe, FieldShape, PropertySchema, Shape};

/// One positional argument of a tool handler
#[derive(Debug, Clone)]
pub enum ArgumentSlot {
    /// Receives the request context
    Context,
    /// Receives the request's cancellation signal
    Cancellation,
    /// Receives the whole arguments object
    Payload(Shape),
    /// Receives the same-named member of the arguments object
    Named(FieldShape),
}

/// Value returned by a tool handler
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// A fully built result, passed through as is
    Structured(ToolCallResult),
    /// Plain text, wrapped as a single text item
    Text(String),
    /// Any other value, serialized to JSON text and wrapped as a single text item
    Value(Value),
}

impl ToolOutput {
    /// Serialize any value into a `ToolOutput::Value`
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ToolError> {
        serde_json::to_value(value)
            .map(ToolOutput::Value)
            .map_err(|e| ToolError::ExecutionFailed(format!("Failed to serialize tool output: {}", e)))
    }

    /// Wrap the output into the `tools/call` result shape
    pub fn into_call_result(self, options: &JsonOptions) -> ToolCallResult {
        match self {
            ToolOutput::Structured(result) => result,
            ToolOutput::Text(text) => ToolCallResult::text(text),
            ToolOutput::Value(value) => ToolCallResult::text(options.render(&value)),
        }
    }
}

impl From<ToolCallResult> for ToolOutput {
    fn from(result: ToolCallResult) -> Self {
        ToolOutput::Structured(result)
    }
}

impl From<String> for ToolOutput {
    fn from(text: String) -> Self {
        ToolOutput::Text(text)
    }
}

impl From<&str> for ToolOutput {
    fn from(text: &str) -> Self {
        ToolOutput::Text(text.to_string())
    }
}

impl From<Value> for ToolOutput {
    fn from(value: Value) -> Self {
        ToolOutput::Value(value)
    }
}

/// A callable tool body
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Run the tool with its bound arguments
    async fn call(&self, args: BoundArguments) -> Result<ToolOutput, ToolError>;
}

type BoxedCall = Box<dyn Fn(BoundArguments) -> BoxFuture<'static, Result<ToolOutput, ToolError>> + Send + Sync>;

/// Handler backed by a closure, see [`handler_fn`] and [`sync_handler_fn`]
pub struct FnHandler(BoxedCall);

#[async_trait]
impl ToolHandler for FnHandler {
    async fn call(&self, args: BoundArguments) -> Result<ToolOutput, ToolError> {
        (self.0)(args).await
    }
}

/// Build a handler from an async closure
pub fn handler_fn<F, Fut, O>(f: F) -> FnHandler
where
    F: Fn(BoundArguments) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, ToolError>> + Send + 'static,
    O: Into<ToolOutput>,
{
    FnHandler(Box::new(move |args| {
        let fut = f(args);
        async move { fut.await.map(Into::into) }.boxed()
    }))
}

/// Build a handler from a synchronous closure
pub fn sync_handler_fn<F, O>(f: F) -> FnHandler
where
    F: Fn(BoundArguments) -> Result<O, ToolError> + Send + Sync + 'static,
    O: Into<ToolOutput> + Send + 'static,
{
    FnHandler(Box::new(move |args| {
        let result = f(args).map(Into::into);
        async move { result }.boxed()
    }))
}

/// Registration record for one tool: name, metadata, binding plan and handler
#[derive(Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: Option<String>,
    /// Callable without an established identity
    pub allow_anonymous: bool,
    pub annotations: Option<ToolAnnotations>,
    /// Ordered argument binding plan
    pub plan: Vec<ArgumentSlot>,
    handler: Arc<dyn ToolHandler>,
}

impl ToolDescriptor {
    /// Tool named `name` served by `handler`
    pub fn new(name: impl Into<String>, handler: impl ToolHandler + 'static) -> Self {
        Self {
            name: name.into(),
            description: None,
            allow_anonymous: false,
            annotations: None,
            plan: Vec::new(),
            handler: Arc::new(handler),
        }
    }

    /// Human-readable description
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Callable without an identity when a validator is installed
    pub fn allow_anonymous(mut self) -> Self {
        self.allow_anonymous = true;
        self
    }

    /// Behavioral hints for clients
    pub fn annotations(mut self, annotations: ToolAnnotations) -> Self {
        self.annotations = Some(annotations);
        self
    }

    /// Append an argument. Default-constructible object shapes bind the whole
    /// arguments object; everything else binds by name.
    pub fn argument(mut self, field: FieldShape) -> Self {
        let shape = field.shape.resolve();
        let slot = if schema::is_object_type(&shape) {
            ArgumentSlot::Payload(shape)
        } else {
            ArgumentSlot::Named(field)
        };
        self.plan.push(slot);
        self
    }

    /// Shorthand for `argument(FieldShape::of::<T>(name))`
    pub fn arg<T: Describe + ?Sized>(self, name: impl Into<String>) -> Self {
        self.argument(FieldShape::of::<T>(name))
    }

    /// Append a payload slot for `T`, regardless of its classification
    pub fn payload<T: Describe + ?Sized>(mut self) -> Self {
        self.plan.push(ArgumentSlot::Payload(T::shape()));
        self
    }

    /// Pass the request context to the handler
    pub fn with_context(mut self) -> Self {
        self.plan.push(ArgumentSlot::Context);
        self
    }

    /// Pass the cancellation token to the handler
    pub fn with_cancellation(mut self) -> Self {
        self.plan.push(ArgumentSlot::Cancellation);
        self
    }

    /// Input schema: payload properties merged with named arguments
    pub fn input_schema(&self) -> PropertySchema {
        let mut input = PropertySchema::object();
        for slot in &self.plan {
            match slot {
                ArgumentSlot::Payload(shape) => {
                    let payload = schema::generate_schema(shape);
                    let required = payload.required.unwrap_or_default();
                    for (name, property) in payload.properties.unwrap_or_default() {
                        let is_required = required.contains(&name);
                        input.insert_property(name, property, is_required);
                    }
                }
                ArgumentSlot::Named(field) => {
                    input.insert_property(
                        field.name.clone(),
                        schema::field_schema(field, 1),
                        field.is_required(),
                    );
                }
                ArgumentSlot::Context | ArgumentSlot::Cancellation => {}
            }
        }
        input
    }

    /// Definition advertised by `tools/list`
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema(),
            annotations: self.annotations.clone().filter(|a| !a.is_empty()),
        }
    }

    pub(crate) fn handler(&self) -> &Arc<dyn ToolHandler> {
        &self.handler
    }
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("allow_anonymous", &self.allow_anonymous)
            .field("plan", &self.plan)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ObjectShape;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct Reservation;

    impl Describe for Reservation {
        fn shape() -> Shape {
            Shape::object(
                ObjectShape::new()
                    .field(FieldShape::of::<String>("guest_name").required())
                    .field(FieldShape::of::<Option<i32>>("party_size").range(1, 12))
                    .constructible(),
            )
        }
    }

    fn noop() -> FnHandler {
        sync_handler_fn(|_args| Ok::<_, ToolError>("ok"))
    }

    #[test]
    fn object_arguments_become_payload_slots() {
        let tool = ToolDescriptor::new("book", noop())
            .with_context()
            .arg::<Reservation>("request")
            .arg::<bool>("confirm");

        assert!(matches!(tool.plan[0], ArgumentSlot::Context));
        assert!(matches!(tool.plan[1], ArgumentSlot::Payload(_)));
        assert!(matches!(tool.plan[2], ArgumentSlot::Named(_)));
    }

    #[test]
    fn input_schema_merges_payload_and_named_arguments() {
        let tool = ToolDescriptor::new("book", noop())
            .payload::<Reservation>()
            .argument(FieldShape::of::<String>("note").description("Free text"))
            .with_cancellation();

        let schema = serde_json::to_value(tool.input_schema()).unwrap();
        assert_eq!(
            schema,
            json!({
                "type": "object",
                "properties": {
                    "guestName": {"type": "string"},
                    "partySize": {"type": "integer", "minimum": 1, "maximum": 12},
                    "note": {"type": "string", "description": "Free text"}
                },
                "required": ["guestName", "note"]
            })
        );
    }

    #[test]
    fn no_arguments_yield_an_empty_object_schema() {
        let tool = ToolDescriptor::new("noop", noop());
        let schema = serde_json::to_value(tool.input_schema()).unwrap();
        assert_eq!(schema, json!({"type": "object", "properties": {}}));
    }

    #[test]
    fn empty_annotations_are_not_advertised() {
        let tool = ToolDescriptor::new("noop", noop()).annotations(ToolAnnotations::default());
        assert!(tool.definition().annotations.is_none());

        let hinted = ToolDescriptor::new("noop", noop()).annotations(ToolAnnotations {
            read_only_hint: Some(true),
            ..Default::default()
        });
        assert_eq!(hinted.definition().annotations.unwrap().read_only_hint, Some(true));
    }

    #[test]
    fn output_shapes_wrap_into_text_content() {
        let options = JsonOptions::default();

        let text = ToolOutput::from("hi").into_call_result(&options);
        assert_eq!(text, ToolCallResult::text("hi"));

        let value = ToolOutput::from(json!({"total": 3, "note": null})).into_call_result(&options);
        assert_eq!(value, ToolCallResult::text(r#"{"total":3}"#));

        let structured = ToolOutput::from(ToolCallResult::error_text("nope")).into_call_result(&options);
        assert!(structured.is_error);
    }
}
