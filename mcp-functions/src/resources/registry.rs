// Resource registry module
//
// Templated resources keyed by their literal template string, plus list
// providers keyed by URI scheme. Filled once at startup and read concurrently
// afterwards.

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use log::{debug, warn};

use crate::config::JsonOptions;
use crate::dispatch::RequestContext;
use crate::errors::ResourceError;
use crate::models::{ReadResourceResult, ResourceDescriptor};

use super::{ResourceDefinition, ResourceListProvider, ResourceRequest, UriTemplate};

struct RegisteredResource {
    definition: ResourceDefinition,
    template: UriTemplate,
}

/// ResourceRegistry manages resource registration, matching and reads
#[derive(Default)]
pub struct ResourceRegistry {
    resources: BTreeMap<String, RegisteredResource>,
    providers: BTreeMap<String, Arc<dyn ResourceListProvider>>,
}

impl ResourceRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a templated resource. A registration with the same template
    /// string replaces the earlier one.
    pub fn register(&mut self, definition: ResourceDefinition) -> Result<(), ResourceError> {
        let template = UriTemplate::parse(&definition.uri_template)?;
        let key = definition.uri_template.clone();

        if self
            .resources
            .insert(key.clone(), RegisteredResource { definition, template })
            .is_some()
        {
            warn!("Resource template '{}' registered again; keeping the last one", key);
        } else {
            debug!("Registered resource template '{}'", key);
        }
        Ok(())
    }

    /// Builder form of [`ResourceRegistry::register`]
    pub fn with_resource(mut self, definition: ResourceDefinition) -> Result<Self, ResourceError> {
        self.register(definition)?;
        Ok(self)
    }

    /// Register the list provider for a URI scheme (case-insensitive, last wins)
    pub fn register_list_provider(
        &mut self,
        scheme: impl Into<String>,
        provider: impl ResourceListProvider + 'static,
    ) {
        let scheme = scheme.into().to_lowercase();
        if self.providers.insert(scheme.clone(), Arc::new(provider)).is_some() {
            warn!("List provider for scheme '{}' registered again; keeping the last one", scheme);
        } else {
            debug!("Registered list provider for scheme '{}'", scheme);
        }
    }

    /// Builder form of [`ResourceRegistry::register_list_provider`]
    pub fn with_list_provider(
        mut self,
        scheme: impl Into<String>,
        provider: impl ResourceListProvider + 'static,
    ) -> Self {
        self.register_list_provider(scheme, provider);
        self
    }

    /// Whether anything is registered that `resources/*` could serve
    pub fn has_resources(&self) -> bool {
        !self.resources.is_empty() || !self.providers.is_empty()
    }

    /// Descriptors of every registered template, without invoking handlers
    pub fn list_static(&self) -> Vec<ResourceDescriptor> {
        self.resources
            .values()
            .map(|entry| entry.definition.descriptor())
            .collect()
    }

    /// Static descriptors followed by everything the list providers return.
    /// A failing provider is logged and skipped.
    pub async fn list_all(&self, context: &RequestContext) -> Vec<ResourceDescriptor> {
        let mut listing = self.list_static();

        for (scheme, provider) in &self.providers {
            let outcome = AssertUnwindSafe(provider.list(context)).catch_unwind().await;
            match outcome {
                Ok(Ok(found)) => {
                    debug!("List provider '{}' returned {} resources", scheme, found.len());
                    listing.extend(found);
                }
                Ok(Err(e)) => warn!("List provider '{}' failed: {}", scheme, e),
                Err(_) => warn!("List provider '{}' panicked", scheme),
            }
        }

        listing
    }

    /// Whether any template matches `uri`
    pub fn matches(&self, uri: &str) -> bool {
        self.best_match(uri).is_some()
    }

    /// Whether the resource at `uri` may be read anonymously; false when no
    /// template matches
    pub fn is_anonymous(&self, uri: &str) -> bool {
        self.best_match(uri)
            .map_or(false, |entry| entry.definition.allow_anonymous)
    }

    /// Read the resource at `uri` through the most specific matching template
    pub async fn read(
        &self,
        uri: &str,
        context: RequestContext,
        options: &JsonOptions,
    ) -> Result<ReadResourceResult, ResourceError> {
        let entry = self
            .best_match(uri)
            .ok_or_else(|| ResourceError::NotFound(uri.to_string()))?;

        let request = ResourceRequest {
            uri: uri.to_string(),
            parameters: entry.template.extract(uri).unwrap_or_default(),
            context,
        };

        debug!("Reading '{}' via template '{}'", uri, entry.template.as_str());
        let output = entry.definition.handler().read(request).await?;

        output
            .and_then(|output| output.into_read_result(uri, &entry.definition.mime_type, options))
            .ok_or_else(|| ResourceError::NotFound(uri.to_string()))
    }

    fn best_match(&self, uri: &str) -> Option<&RegisteredResource> {
        self.resources
            .values()
            .filter(|entry| entry.template.matches(uri))
            .min_by(|a, b| a.template.specificity_cmp(&b.template))
    }
}
