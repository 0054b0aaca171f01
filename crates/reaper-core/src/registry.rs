//! Process-wide kind registry contract. Populated once at program
//! initialization by `reaper-aws` and never mutated after the run begins.

use std::sync::Arc;

use crate::resource::Lister;

pub trait KindRegistry: Send + Sync {
    /// All kind names known to the program — the "universe" used by the
    /// resource-type resolver.
    fn get_lister_names(&self) -> Vec<String>;

    /// Look up the lister for a kind name, if registered. Returned as an
    /// `Arc` so the scanner can clone it into `tokio::spawn`-ed tasks
    /// without requiring `Lister::list` itself to return a `'static`
    /// future.
    fn lister_for(&self, name: &str) -> Option<Arc<dyn Lister>>;
}

/// Maps a kind name to the provider service name that backs it, so the
/// scanner can skip kinds whose service isn't offered in a given region.
/// Returns `None` for "unknown" — the scanner treats that as skip-silently.
pub trait ServiceAvailability: Send + Sync {
    fn service_for(&self, kind: &str) -> Option<&str>;

    /// Whether `kind`'s service is available in `region`. The default
    /// implementation treats every resolvable service as available
    /// everywhere; adapters with regional restrictions override this.
    fn available_in(&self, kind: &str, _region: &str) -> bool {
        self.service_for(kind).is_some()
    }
}
