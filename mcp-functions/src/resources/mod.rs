// Resources module for the MCP dispatcher
//
// Read-only, URI-addressed resources: templates registered at startup,
// handlers that produce their contents, and list providers that enumerate
// further resources per URI scheme at request time.

mod registry;
mod template;

pub use registry::ResourceRegistry;
pub use template::UriTemplate;

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::{BoxFuture, FutureExt};
use serde_json::Value;

use crate::auth::Identity;
use crate::config::JsonOptions;
use crate::dispatch::RequestContext;
use crate::errors::ResourceError;
use crate::models::{ReadResourceResult, ResourceContents, ResourceDescriptor};

/// MIME type assumed when a resource does not declare one
pub const DEFAULT_MIME_TYPE: &str = "application/json";

/// A resource read, as seen by its handler
#[derive(Debug, Clone)]
pub struct ResourceRequest {
    /// The URI as sent by the client
    pub uri: String,
    /// Placeholder values captured from the URI
    pub parameters: HashMap<String, String>,
    pub context: RequestContext,
}

impl ResourceRequest {
    /// Value extracted for a template placeholder
    pub fn param(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// Caller identity, if any
    pub fn identity(&self) -> Option<&Identity> {
        self.context.identity.as_ref()
    }
}

/// Value returned by a resource handler
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceOutput {
    Text(String),
    /// Serialized to JSON text
    Json(Value),
    /// A fully built result, passed through as is
    Contents(ReadResourceResult),
}

impl ResourceOutput {
    /// Wrap the output into the `resources/read` result shape. `None` when
    /// there is nothing to return: empty contents or a JSON `null`.
    pub fn into_read_result(
        self,
        uri: &str,
        mime_type: &str,
        options: &JsonOptions,
    ) -> Option<ReadResourceResult> {
        let text = match self {
            ResourceOutput::Contents(result) if result.contents.is_empty() => return None,
            ResourceOutput::Contents(result) => return Some(result),
            ResourceOutput::Json(Value::Null) => return None,
            ResourceOutput::Text(text) => text,
            ResourceOutput::Json(value) => options.render(&value),
        };

        Some(ReadResourceResult {
            contents: vec![ResourceContents {
                uri: uri.to_string(),
                mime_type: mime_type.to_string(),
                text,
            }],
        })
    }
}

impl From<String> for ResourceOutput {
    fn from(text: String) -> Self {
        ResourceOutput::Text(text)
    }
}

impl From<&str> for ResourceOutput {
    fn from(text: &str) -> Self {
        ResourceOutput::Text(text.to_string())
    }
}

impl From<Value> for ResourceOutput {
    fn from(value: Value) -> Self {
        ResourceOutput::Json(value)
    }
}

impl From<ReadResourceResult> for ResourceOutput {
    fn from(result: ReadResourceResult) -> Self {
        ResourceOutput::Contents(result)
    }
}

/// Produces the contents of a resource
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    /// `Ok(None)` means the resource does not exist
    async fn read(&self, request: ResourceRequest) -> Result<Option<ResourceOutput>, ResourceError>;
}

/// Enumerates resources of one URI scheme at request time
#[async_trait]
pub trait ResourceListProvider: Send + Sync {
    async fn list(&self, context: &RequestContext) -> Result<Vec<ResourceDescriptor>, ResourceError>;
}

type BoxedRead =
    Box<dyn Fn(ResourceRequest) -> BoxFuture<'static, Result<Option<ResourceOutput>, ResourceError>> + Send + Sync>;

/// Resource handler backed by a closure, see [`resource_fn`]
pub struct FnResource(BoxedRead);

#[async_trait]
impl ResourceHandler for FnResource {
    async fn read(&self, request: ResourceRequest) -> Result<Option<ResourceOutput>, ResourceError> {
        (self.0)(request).await
    }
}

/// Build a resource handler from an async closure
pub fn resource_fn<F, Fut, O>(f: F) -> FnResource
where
    F: Fn(ResourceRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<O>, ResourceError>> + Send + 'static,
    O: Into<ResourceOutput>,
{
    FnResource(Box::new(move |request| {
        let fut = f(request);
        async move { fut.await.map(|output| output.map(Into::into)) }.boxed()
    }))
}

type BoxedList =
    Box<dyn Fn(RequestContext) -> BoxFuture<'static, Result<Vec<ResourceDescriptor>, ResourceError>> + Send + Sync>;

/// List provider backed by a closure, see [`list_provider_fn`]
pub struct FnListProvider(BoxedList);

#[async_trait]
impl ResourceListProvider for FnListProvider {
    async fn list(&self, context: &RequestContext) -> Result<Vec<ResourceDescriptor>, ResourceError> {
        (self.0)(context.clone()).await
    }
}

/// Build a list provider from an async closure
pub fn list_provider_fn<F, Fut>(f: F) -> FnListProvider
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<ResourceDescriptor>, ResourceError>> + Send + 'static,
{
    FnListProvider(Box::new(move |context| f(context).boxed()))
}

/// Registration record for one templated resource
#[derive(Clone)]
pub struct ResourceDefinition {
    pub uri_template: String,
    pub name: String,
    pub description: Option<String>,
    pub mime_type: String,
    /// Readable without an established identity
    pub allow_anonymous: bool,
    handler: Arc<dyn ResourceHandler>,
}

impl ResourceDefinition {
    /// Resource served under `uri_template`
    pub fn new(
        uri_template: impl Into<String>,
        name: impl Into<String>,
        handler: impl ResourceHandler + 'static,
    ) -> Self {
        Self {
            uri_template: uri_template.into(),
            name: name.into(),
            description: None,
            mime_type: DEFAULT_MIME_TYPE.to_string(),
            allow_anonymous: false,
            handler: Arc::new(handler),
        }
    }

    /// Human-readable description
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// MIME type reported for the contents
    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Readable without an identity when a validator is installed
    pub fn allow_anonymous(mut self) -> Self {
        self.allow_anonymous = true;
        self
    }

    /// Listing entry for this resource; the URI is the template itself
    pub fn descriptor(&self) -> ResourceDescriptor {
        ResourceDescriptor {
            uri: self.uri_template.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            mime_type: self.mime_type.clone(),
        }
    }

    pub(crate) fn handler(&self) -> &Arc<dyn ResourceHandler> {
        &self.handler
    }
}

impl fmt::Debug for ResourceDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceDefinition")
            .field("uri_template", &self.uri_template)
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("allow_anonymous", &self.allow_anonymous)
            .finish_non_exhaustive()
    }
}
