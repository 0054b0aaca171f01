//! The sweep-based run loop: repeatedly attempts `remove()` on each
//! non-terminal item and reconciles state against a live existence check,
//! until every item reaches a terminal state or the loop stalls.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::ReaperError;
use crate::item::{Item, ItemState};
use crate::queue::Queue;
use crate::registry::KindRegistry;
use crate::resource::ResourceInstance;

/// Delay between sweeps, matching what a real AWS account needs to
/// propagate a delete before a follow-up list call reflects it.
const SWEEP_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    pub sweeps: usize,
    pub finished: usize,
    pub filtered: usize,
}

type ListResult = Result<Vec<Box<dyn ResourceInstance>>, String>;

/// Per-sweep cache of `(region, kind) -> list result`, ensuring each
/// lister is invoked at most once per sweep regardless of how many items
/// share that (region, kind) pair.
#[derive(Default)]
struct ListCache {
    entries: HashMap<(String, String), ListResult>,
}

impl ListCache {
    async fn get_or_list<'a>(
        &'a mut self,
        registry: &dyn KindRegistry,
        region: &str,
        kind: &str,
    ) -> &'a ListResult {
        let key = (region.to_string(), kind.to_string());
        if !self.entries.contains_key(&key) {
            let result = match registry.lister_for(kind) {
                Some(lister) => lister.list(region).await.map_err(|e| e.to_string()),
                None => Err(format!("no lister registered for kind {kind}")),
            };
            self.entries.insert(key.clone(), result);
        }
        self.entries.get(&key).expect("just inserted")
    }
}

enum Existence {
    Gone,
    /// Still present, but now self-filtered — leave the item's state and
    /// reason untouched rather than transitioning it.
    Protected,
    Present,
    ListFailed(String),
}

async fn check_existence(item: &Item, cache: &mut ListCache, registry: &dyn KindRegistry) -> Existence {
    let listing = cache.get_or_list(registry, &item.region, &item.kind).await;
    let listing = match listing {
        Ok(list) => list,
        Err(e) => return Existence::ListFailed(e.clone()),
    };

    let Some(found) = listing.iter().find(|candidate| item.equals_resource(candidate.as_ref())) else {
        return Existence::Gone;
    };

    match found.self_filter().await {
        Ok(()) => Existence::Present,
        Err(_reason) => Existence::Protected,
    }
}

/// Run one sweep over every non-terminal item in `queue`, mutating each
/// item's state in place. Stall detection (fail-stall and wait-stall) is
/// entirely the caller's concern — it depends on the queue's aggregate
/// state across sweeps, not on anything visible while iterating one item
/// at a time, and the spec requires the current sweep's bookkeeping to
/// finish before the run can abort.
async fn sweep(queue: &mut Queue, registry: &dyn KindRegistry) {
    let mut cache = ListCache::default();

    for item in queue.iter_mut() {
        match item.state {
            ItemState::Filtered | ItemState::Finished => continue,

            ItemState::New => match item.resource.remove().await {
                Ok(()) => item.set_state(ItemState::Pending, ""),
                Err(e) => item.set_state(ItemState::Failed, e.to_string()),
            },

            ItemState::Pending => match check_existence(item, &mut cache, registry).await {
                Existence::Gone => item.set_state(ItemState::Finished, ""),
                Existence::Protected => {}
                Existence::Present => item.set_state(ItemState::Waiting, ""),
                Existence::ListFailed(e) => item.set_state(ItemState::Failed, e),
            },

            ItemState::Waiting => match check_existence(item, &mut cache, registry).await {
                Existence::Gone => item.set_state(ItemState::Finished, ""),
                Existence::Protected => {}
                Existence::Present => {}
                Existence::ListFailed(e) => item.set_state(ItemState::Failed, e),
            },

            ItemState::Failed => {
                let remove_result = item.resource.remove().await;
                match check_existence(item, &mut cache, registry).await {
                    Existence::Gone => item.set_state(ItemState::Finished, ""),
                    Existence::Protected => {}
                    Existence::Present => match remove_result {
                        Ok(()) => item.set_state(ItemState::Pending, ""),
                        Err(e) => item.set_state(ItemState::Failed, e.to_string()),
                    },
                    Existence::ListFailed(e) => item.set_state(ItemState::Failed, e),
                }
            }
        }
    }
}

/// Run sweeps until every item is terminal, fail-stall triggers, or
/// wait-stall triggers.
///
/// `max_fail_retries` bounds consecutive sweeps in which only `Failed`
/// items remain and none of them progress to `Finished` — a `Failed`
/// item is retried every sweep (it may be waiting on a dependency that
/// resolves later), but once retrying stops making progress for that
/// many sweeps in a row, the run aborts rather than spin forever.
///
/// `max_wait_retries`, if positive, bounds consecutive sweeps in which
/// items remain in `Pending`/`Waiting` with nothing left in `New` —
/// nothing more to request, only provider tear-down to wait out. `0`
/// disables the check entirely, per spec §4.7#2 ("if a positive
/// max-wait-retries is configured").
pub async fn run(
    queue: &mut Queue,
    registry: &dyn KindRegistry,
    max_wait_retries: u32,
    max_fail_retries: u32,
) -> Result<RunSummary, ReaperError> {
    let mut summary = RunSummary::default();
    let mut fail_stall_counter: u32 = 0;
    let mut wait_stall_counter: u32 = 0;
    let mut last_finished = 0;

    loop {
        summary.sweeps += 1;
        sweep(queue, registry).await;

        let new = queue.count(&[ItemState::New]);
        let waiting_or_pending = queue.count(&[ItemState::Pending, ItemState::Waiting]);
        let active = new + waiting_or_pending;
        let failed = queue.count(&[ItemState::Failed]);
        let finished = queue.count(&[ItemState::Finished]);

        info!(sweep = summary.sweeps, active, failed, finished, "sweep complete");

        if active == 0 && failed == 0 {
            break;
        }

        if active == 0 && finished == last_finished {
            fail_stall_counter += 1;
            if fail_stall_counter >= max_fail_retries {
                let failures: Vec<String> = queue
                    .iter()
                    .filter(|i| i.state == ItemState::Failed)
                    .map(|i| i.print())
                    .collect();
                warn!(count = failed, "run loop stalled: all remaining items are failed");
                return Err(ReaperError::FailStall(failures.join("\n")));
            }
        } else {
            fail_stall_counter = 0;
        }
        last_finished = finished;

        if max_wait_retries > 0 && waiting_or_pending > 0 && new == 0 {
            wait_stall_counter += 1;
            if wait_stall_counter >= max_wait_retries {
                warn!(count = waiting_or_pending, "run loop stalled: max wait retries exceeded");
                return Err(ReaperError::WaitStall);
            }
        } else {
            wait_stall_counter = 0;
        }

        tokio::time::sleep(SWEEP_INTERVAL).await;
    }

    summary.finished = queue.count(&[ItemState::Finished]);
    summary.filtered = queue.count(&[ItemState::Filtered]);
    Ok(summary)
}
