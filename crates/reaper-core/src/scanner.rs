//! Concurrent enumeration across (region, kind) pairs, followed by
//! single-threaded filter application and queue population.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::AccountConfig;
use crate::error::ReaperError;
use crate::filter::{apply_config_filters, apply_self_filter, FilterOutcome};
use crate::item::Item;
use crate::queue::Queue;
use crate::registry::{KindRegistry, ServiceAvailability};
use crate::resource::FeatureFlags;

#[derive(Debug, Default, Clone, Copy)]
pub struct ScanSummary {
    pub regions_scanned: usize,
    pub kinds_scanned: usize,
    pub items_discovered: usize,
    pub list_errors: usize,
}

struct ListOutcome {
    region: String,
    kind: String,
    result: Result<Vec<Box<dyn crate::resource::ResourceInstance>>, ReaperError>,
}

/// Scan every `(region, kind)` pair, apply the two-stage filter, and
/// return the populated queue plus a summary for logging.
pub async fn scan(
    registry: &dyn KindRegistry,
    availability: &dyn ServiceAvailability,
    regions: &[String],
    kinds: &[String],
    feature_flags: &FeatureFlags,
    account_config: &AccountConfig,
) -> Result<(Queue, ScanSummary), ReaperError> {
    let mut handles = Vec::new();

    for region in regions {
        for kind in kinds {
            if !availability.available_in(kind, region) {
                continue;
            }
            let Some(lister) = registry.lister_for(kind) else {
                continue;
            };
            let region = region.clone();
            let kind = kind.clone();
            let lister: Arc<dyn crate::resource::Lister> = lister;
            handles.push(tokio::spawn(async move {
                let result = lister.list(&region).await;
                ListOutcome { region, kind, result }
            }));
        }
    }

    let mut queue = Queue::new();
    let mut summary = ScanSummary::default();

    for handle in handles {
        let outcome = handle.await.map_err(|e| ReaperError::ListFailed(e.to_string()))?;
        summary.kinds_scanned += 1;

        let resources = match outcome.result {
            Ok(resources) => resources,
            Err(e) => {
                warn!(region = %outcome.region, kind = %outcome.kind, error = %e, "list failed during scan");
                summary.list_errors += 1;
                continue;
            }
        };

        let filter_rules = account_config.filter_rules_for(&outcome.kind)?;

        for mut resource in resources {
            resource.set_feature_flags(feature_flags);

            match apply_self_filter(resource.as_ref()).await {
                FilterOutcome::Filtered(reason) => {
                    queue.push(Item::new_filtered(outcome.kind.as_str(), outcome.region.as_str(), resource, reason));
                    continue;
                }
                FilterOutcome::NotFiltered => {}
            }

            match apply_config_filters(resource.as_ref(), &filter_rules)
                .map_err(ReaperError::PropertyExtraction)?
            {
                FilterOutcome::Filtered(reason) => {
                    queue.push(Item::new_filtered(outcome.kind.as_str(), outcome.region.as_str(), resource, reason));
                    continue;
                }
                FilterOutcome::NotFiltered => {}
            }

            queue.push(Item::new(outcome.kind.as_str(), outcome.region.as_str(), resource));
        }
    }

    summary.regions_scanned = regions.len();
    summary.items_discovered = queue.count_total();

    info!(
        regions = summary.regions_scanned,
        kinds = summary.kinds_scanned,
        items = summary.items_discovered,
        list_errors = summary.list_errors,
        "scan complete"
    );

    Ok((queue, summary))
}
