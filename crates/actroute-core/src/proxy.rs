//! Action proxies and the invocation seam
//!
//! A proxy resolves the method for one invocation and hands the result to an
//! [`ActionInvocation`]. It never calls the action method itself.

use crate::{
    error::RouteResult,
    registry::{ActionRegistry, RegistryHandle},
    resolver::MethodResolver,
    settings::ResolverSettings,
    types::ResolutionRequest,
    ResolutionResult,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Runs a resolved action. Implementations decide how a method name maps to
/// behaviour and return the result code.
#[async_trait]
pub trait ActionInvocation: Send + Sync {
    async fn invoke(&self, action: &ResolutionResult) -> RouteResult<String>;
}

/// Per-invocation proxy over a fixed registry snapshot
pub struct ActionProxy {
    invocation: Arc<dyn ActionInvocation>,
    resolver: Arc<MethodResolver>,
    registry: Arc<ActionRegistry>,
    request: ResolutionRequest,
    prepared: Option<ResolutionResult>,
}

impl ActionProxy {
    pub fn new(
        invocation: Arc<dyn ActionInvocation>,
        resolver: Arc<MethodResolver>,
        registry: Arc<ActionRegistry>,
        request: ResolutionRequest,
    ) -> Self {
        Self { invocation, resolver, registry, request, prepared: None }
    }

    pub fn request(&self) -> &ResolutionRequest {
        &self.request
    }

    pub fn namespace(&self) -> &str {
        &self.request.namespace
    }

    pub fn action_name(&self) -> &str {
        &self.request.action_name
    }

    /// Resolve the method. Only the first successful call does any work.
    pub fn prepare(&mut self) -> RouteResult<&ResolutionResult> {
        let result = match self.prepared.take() {
            Some(result) => result,
            None => self.resolver.resolve(&self.request, &self.registry)?,
        };
        Ok(self.prepared.insert(result))
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared.is_some()
    }

    /// Resolved method; `None` before a successful [`prepare`](Self::prepare)
    pub fn method(&self) -> Option<&str> {
        self.prepared.as_ref().map(|r| r.method.as_str())
    }

    pub fn is_method_specified(&self) -> bool {
        self.prepared.as_ref().map(|r| r.method_specified).unwrap_or(false)
    }

    pub fn resolution(&self) -> Option<&ResolutionResult> {
        self.prepared.as_ref()
    }

    /// Prepare if needed, then hand the resolved action to the invocation
    pub async fn execute(&mut self) -> RouteResult<String> {
        let invocation = Arc::clone(&self.invocation);
        let resolved = self.prepare()?;
        debug!(
            namespace = %resolved.namespace,
            action = %resolved.action.name,
            method = %resolved.method,
            "invoking action"
        );
        invocation.invoke(resolved).await
    }
}

impl std::fmt::Debug for ActionProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionProxy")
            .field("request", &self.request)
            .field("prepared", &self.prepared)
            .finish()
    }
}

/// Creates proxies wired to the shared resolver and the current registry
/// snapshot
#[derive(Debug, Clone)]
pub struct ActionProxyFactory {
    resolver: Arc<MethodResolver>,
    registry: RegistryHandle,
}

impl ActionProxyFactory {
    pub fn new(settings: ResolverSettings, registry: RegistryHandle) -> RouteResult<Self> {
        Ok(Self { resolver: Arc::new(MethodResolver::new(settings)?), registry })
    }

    pub fn settings(&self) -> &ResolverSettings {
        self.resolver.settings()
    }

    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    /// A request carrying the configured strict default
    pub fn request(
        &self,
        namespace: impl Into<String>,
        action_name: impl Into<String>,
    ) -> ResolutionRequest {
        ResolutionRequest::new(namespace, action_name).strict(self.settings().strict_by_default)
    }

    pub async fn create_proxy(
        &self,
        invocation: Arc<dyn ActionInvocation>,
        namespace: &str,
        action_name: &str,
        method: Option<&str>,
        strict: bool,
        validate: bool,
    ) -> ActionProxy {
        let request = ResolutionRequest::new(namespace, action_name)
            .with_optional_method(method)
            .strict(strict)
            .validate(validate);
        self.create_proxy_for(invocation, request).await
    }

    pub async fn create_proxy_for(
        &self,
        invocation: Arc<dyn ActionInvocation>,
        request: ResolutionRequest,
    ) -> ActionProxy {
        let snapshot = self.registry.snapshot().await;
        ActionProxy::new(invocation, self.resolver.clone(), snapshot, request)
    }
}
