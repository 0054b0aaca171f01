//! The capability contract every resource-kind adapter satisfies.
//!
//! Modeled as a base trait plus independent, orthogonal optional
//! capabilities probed by the engine — not a deep inheritance hierarchy.
//! Concrete AWS-backed implementations live in `reaper-aws`; this crate
//! never depends on an AWS SDK.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use crate::error::ReaperError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Global feature switches, read-only after configuration load.
#[derive(Debug, Clone, Default)]
pub struct FeatureFlags(HashMap<String, bool>);

impl FeatureFlags {
    pub fn new(flags: HashMap<String, bool>) -> Self {
        Self(flags)
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(false)
    }
}

/// A property lookup failed because the resource doesn't advertise
/// properties at all, or because the name isn't one it knows about.
/// `Unsupported` is "not filterable by this rule" (rule skipped);
/// `Other` is a broken adapter or bad config and aborts the scan.
#[derive(Debug, Clone)]
pub enum PropertyError {
    Unsupported,
    Other(String),
}

/// One resource instance discovered by a lister. Opaque to the engine
/// beyond this contract — the engine never downcasts to a concrete type.
pub trait ResourceInstance: Send + Sync + 'static {
    /// Idempotent delete request. Must not assume the resource still exists.
    fn remove(&self) -> BoxFuture<'_, Result<(), ReaperError>>;

    /// Human-readable identity, printed in item summaries. Not guaranteed
    /// globally unique, only unique enough to log and to compare equality.
    fn identity(&self) -> String;

    /// Declare this instance untouchable (e.g. an AWS-managed default
    /// resource). `Err(reason)` means "filter this out"; any other error
    /// condition must be represented as `Ok(())` by the implementor — a
    /// self-filter probe that fails for unrelated reasons must never abort
    /// the run, so implementors swallow such errors themselves.
    fn self_filter(&self) -> BoxFuture<'_, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }

    /// Named scalar attribute lookup for config filters.
    fn get_property(&self, _name: &str) -> Result<serde_json::Value, PropertyError> {
        Err(PropertyError::Unsupported)
    }

    /// Receive global feature flags before being queued. No-op by default.
    fn set_feature_flags(&mut self, _flags: &FeatureFlags) {}

    /// "Same instance" comparison used by the run loop's existence check.
    /// Default: identity string equality, sufficient since handles are
    /// only ever compared within the same kind.
    fn equals(&self, other: &dyn ResourceInstance) -> bool {
        self.identity() == other.identity()
    }
}

/// Per-kind enumeration capability — one impl per kind, not per instance.
pub trait Lister: Send + Sync {
    /// The kind name this lister enumerates, e.g. "S3Bucket".
    fn kind(&self) -> &'static str;

    /// Enumerate all instances of this kind in `region`. May return
    /// instances already mid-deletion; may fail with a recoverable error.
    fn list(&self, region: &str) -> BoxFuture<'_, Result<Vec<Box<dyn ResourceInstance>>, ReaperError>>;
}
