use crate::{
    resolve_namespace, DiagnosticSink, ModuleNamespace, ModuleRegistry, ResourceReference,
    TracingSink,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// The ways a dynamic import can fail. The loader handles every variant
/// through the same path: one diagnostic, no retry.
#[derive(Debug, Clone, Error)]
pub enum ImportError {
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("evaluation failed: {0}")]
    Evaluation(String),
    #[error("protocol unavailable: {0}")]
    ProtocolUnavailable(String),
}

/// Import capability of the surrounding scripting environment. The game's
/// virtual filesystem sits behind this seam; fetching, compiling and
/// evaluating the module all happen on the other side of it.
#[async_trait]
pub trait ModuleHost: Send + Sync {
    async fn import(&self, reference: &ResourceReference)
        -> Result<ModuleNamespace, ImportError>;
}

/// Result of a single load attempt. Produced exactly once per invocation,
/// never cached or re-queried.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(ModuleNamespace),
    Failed(ImportError),
}

struct ExposeTarget {
    name: String,
    registry: Arc<dyn ModuleRegistry>,
}

/// Loads one script module into the host environment. Failures stop here:
/// nothing propagates to the caller, and the rest of the process keeps
/// running.
#[derive(Clone)]
pub struct ResourceLoader {
    host: Arc<dyn ModuleHost>,
    sink: Arc<dyn DiagnosticSink>,
    expose: Option<Arc<ExposeTarget>>,
}

impl ResourceLoader {
    pub fn new(host: Arc<dyn ModuleHost>) -> Self {
        Self {
            host,
            sink: Arc::new(TracingSink),
            expose: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Publish the loaded module under `name` once the import settles. Export
    /// resolution prefers an export named `name`, then the default export,
    /// then the raw namespace.
    pub fn expose_as(mut self, name: impl Into<String>, registry: Arc<dyn ModuleRegistry>) -> Self {
        self.expose = Some(Arc::new(ExposeTarget {
            name: name.into(),
            registry,
        }));
        self
    }

    /// The single best-effort import attempt.
    pub async fn attempt(&self, reference: &ResourceReference) -> LoadOutcome {
        match self.host.import(reference).await {
            Ok(namespace) => LoadOutcome::Loaded(namespace),
            Err(error) => LoadOutcome::Failed(error),
        }
    }

    /// One guarded import. Always completes: a failed import emits exactly
    /// one diagnostic and ends the task normally; a successful one is silent.
    /// Even a malformed reference takes the asynchronous failure path.
    pub async fn load(&self, reference: ResourceReference) {
        match self.attempt(&reference).await {
            LoadOutcome::Loaded(namespace) => {
                if let Some(target) = &self.expose {
                    let value = resolve_namespace(&namespace, &target.name);
                    target.registry.publish(&target.name, value);
                }
            }
            LoadOutcome::Failed(error) => {
                self.sink.import_failed(&reference, &error);
            }
        }
    }

    /// Detaches the load onto the runtime. Nobody joins the task, and a panic
    /// in the host implementation dies with the task, not the process. Must
    /// be called from within a tokio runtime.
    pub fn spawn(&self, reference: ResourceReference) {
        let loader = self.clone();
        tokio::spawn(async move {
            loader.load(reference).await;
        });
    }
}
