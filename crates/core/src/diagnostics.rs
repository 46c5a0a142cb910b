use crate::{ImportError, ResourceReference};
use tracing::error;

/// Marker message attached to every failed-import diagnostic.
pub const IMPORT_FAILED: &str = "failed to import mod script";

/// External sink failed loads are reported to. The host process never sees a
/// failure any other way.
pub trait DiagnosticSink: Send + Sync {
    fn import_failed(&self, reference: &ResourceReference, error: &ImportError);
}

/// Forwards diagnostics to the tracing backbone.
#[derive(Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn import_failed(&self, reference: &ResourceReference, error: &ImportError) {
        error!(%reference, %error, "{}", IMPORT_FAILED);
    }
}
