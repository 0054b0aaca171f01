//! End-to-end scenario tests against fake, in-memory resources — no
//! network calls. Exercises the full resolver → scan → run pipeline.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::{validate_account, AccountConfig};
use crate::error::ReaperError;
use crate::item::ItemState;
use crate::registry::{KindRegistry, ServiceAvailability};
use crate::resource::{BoxFuture, FeatureFlags, Lister, PropertyError, ResourceInstance};
use crate::resolver::{resolve, KindSet};
use crate::runloop::run;
use crate::scanner::scan;

#[derive(Default)]
struct FakeState {
    deleted: bool,
    remove_attempts: u32,
    fail_remove_until: u32,
    /// Once `deleted`, how many more `list()` calls should still report
    /// this resource present — simulating provider-side propagation lag
    /// after a successful delete.
    lingering_lists: u32,
    lists_since_delete: u32,
}

struct FakeResource {
    id: String,
    state: Arc<Mutex<FakeState>>,
    filtered_reason: Option<String>,
    properties: HashMap<String, serde_json::Value>,
}

impl ResourceInstance for FakeResource {
    fn remove(&self) -> BoxFuture<'_, Result<(), ReaperError>> {
        let state = self.state.clone();
        Box::pin(async move {
            let mut s = state.lock().unwrap();
            s.remove_attempts += 1;
            if s.remove_attempts <= s.fail_remove_until {
                return Err(ReaperError::RemoveFailed("dependency still attached".into()));
            }
            s.deleted = true;
            Ok(())
        })
    }

    fn identity(&self) -> String {
        self.id.clone()
    }

    fn self_filter(&self) -> BoxFuture<'_, Result<(), String>> {
        let reason = self.filtered_reason.clone();
        Box::pin(async move {
            match reason {
                Some(r) => Err(r),
                None => Ok(()),
            }
        })
    }

    fn get_property(&self, name: &str) -> Result<serde_json::Value, PropertyError> {
        self.properties.get(name).cloned().ok_or(PropertyError::Unsupported)
    }
}

/// Whether a deleted resource should still show up in a `list()` call —
/// true until `deleted` and the configured lingering window elapses.
fn still_listed(state: &Mutex<FakeState>) -> bool {
    let mut s = state.lock().unwrap();
    if !s.deleted {
        return true;
    }
    if s.lists_since_delete < s.lingering_lists {
        s.lists_since_delete += 1;
        true
    } else {
        false
    }
}

/// A fixed set of fake resources for one `(kind, region)` pair, shared
/// with the test so it can assert on deletion after the run completes.
struct FakeLister {
    kind: &'static str,
    entries: Vec<(String, Arc<Mutex<FakeState>>, Option<String>, HashMap<String, serde_json::Value>)>,
}

impl Lister for FakeLister {
    fn kind(&self) -> &'static str {
        self.kind
    }

    fn list(&self, _region: &str) -> BoxFuture<'_, Result<Vec<Box<dyn ResourceInstance>>, ReaperError>> {
        Box::pin(async move {
            Ok(self
                .entries
                .iter()
                .filter(|(_, state, _, _)| still_listed(state))
                .map(|(id, state, reason, props)| {
                    Box::new(FakeResource {
                        id: id.clone(),
                        state: state.clone(),
                        filtered_reason: reason.clone(),
                        properties: props.clone(),
                    }) as Box<dyn ResourceInstance>
                })
                .collect())
        })
    }
}

struct FakeRegistry(HashMap<&'static str, Arc<dyn Lister>>);

impl KindRegistry for FakeRegistry {
    fn get_lister_names(&self) -> Vec<String> {
        self.0.keys().map(|k| k.to_string()).collect()
    }

    fn lister_for(&self, name: &str) -> Option<Arc<dyn Lister>> {
        self.0.get(name).cloned()
    }
}

impl ServiceAvailability for FakeRegistry {
    fn service_for(&self, kind: &str) -> Option<&str> {
        self.0.contains_key(kind).then_some(kind)
    }
}

fn one_resource_registry(fail_remove_until: u32) -> (FakeRegistry, Arc<Mutex<FakeState>>) {
    let state = Arc::new(Mutex::new(FakeState {
        fail_remove_until,
        ..Default::default()
    }));
    let lister = FakeLister {
        kind: "S3Bucket",
        entries: vec![("bucket-1".to_string(), state.clone(), None, HashMap::new())],
    };
    let mut listers: HashMap<&'static str, Arc<dyn Lister>> = HashMap::new();
    listers.insert("S3Bucket", Arc::new(lister));
    (FakeRegistry(listers), state)
}

/// A resource whose `remove()` succeeds immediately but which keeps
/// showing up in `list()` for `lingering_lists` sweeps afterward —
/// exercising the `Waiting` state the happy-path fixtures above never
/// reach, since their fake lister drops deleted entries on the spot.
fn lingering_resource_registry(lingering_lists: u32) -> (FakeRegistry, Arc<Mutex<FakeState>>) {
    let state = Arc::new(Mutex::new(FakeState {
        lingering_lists,
        ..Default::default()
    }));
    let lister = FakeLister {
        kind: "S3Bucket",
        entries: vec![("bucket-1".to_string(), state.clone(), None, HashMap::new())],
    };
    let mut listers: HashMap<&'static str, Arc<dyn Lister>> = HashMap::new();
    listers.insert("S3Bucket", Arc::new(lister));
    (FakeRegistry(listers), state)
}

#[tokio::test]
async fn dry_run_scan_only_never_removes() {
    let (registry, state) = one_resource_registry(0);
    let (queue, summary) = scan(
        &registry,
        &registry,
        &["us-east-1".to_string()],
        &["S3Bucket".to_string()],
        &FeatureFlags::default(),
        &AccountConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(summary.items_discovered, 1);
    assert_eq!(queue.count(&[ItemState::New]), 1);
    assert!(!state.lock().unwrap().deleted, "scan alone must never call remove()");
}

#[tokio::test(start_paused = true)]
async fn happy_path_item_reaches_finished() {
    let (registry, state) = one_resource_registry(0);
    let (mut queue, _) = scan(
        &registry,
        &registry,
        &["us-east-1".to_string()],
        &["S3Bucket".to_string()],
        &FeatureFlags::default(),
        &AccountConfig::default(),
    )
    .await
    .unwrap();

    let summary = run(&mut queue, &registry, 5, 5).await.unwrap();

    assert_eq!(summary.finished, 1);
    assert!(state.lock().unwrap().deleted);
    assert_eq!(queue.count(&[ItemState::Finished]), 1);
}

#[tokio::test(start_paused = true)]
async fn dependency_resolves_on_retry() {
    // First remove() attempt fails (simulating a still-attached dependency);
    // the second attempt, issued on the Failed retry the next sweep, succeeds.
    let (registry, state) = one_resource_registry(1);
    let (mut queue, _) = scan(
        &registry,
        &registry,
        &["us-east-1".to_string()],
        &["S3Bucket".to_string()],
        &FeatureFlags::default(),
        &AccountConfig::default(),
    )
    .await
    .unwrap();

    let summary = run(&mut queue, &registry, 5, 5).await.unwrap();

    assert_eq!(summary.finished, 1);
    assert!(state.lock().unwrap().deleted);
    assert!(state.lock().unwrap().remove_attempts >= 2);
}

#[tokio::test(start_paused = true)]
async fn fail_stall_aborts_the_run() {
    // remove() never succeeds — the run must give up rather than loop forever.
    let (registry, _state) = one_resource_registry(u32::MAX);
    let (mut queue, _) = scan(
        &registry,
        &registry,
        &["us-east-1".to_string()],
        &["S3Bucket".to_string()],
        &FeatureFlags::default(),
        &AccountConfig::default(),
    )
    .await
    .unwrap();

    let err = run(&mut queue, &registry, 5, 3).await.unwrap_err();
    assert!(matches!(err, ReaperError::FailStall(_)));
}

#[tokio::test]
async fn filter_by_config_keeps_matching_items_out_of_the_run() {
    let state = Arc::new(Mutex::new(FakeState::default()));
    let mut props = HashMap::new();
    props.insert("Name".to_string(), serde_json::json!("bucket-1"));
    let lister = FakeLister {
        kind: "S3Bucket",
        entries: vec![("bucket-1".to_string(), state.clone(), None, props)],
    };
    let mut listers: HashMap<&'static str, Arc<dyn Lister>> = HashMap::new();
    listers.insert("S3Bucket", Arc::new(lister));
    let registry = FakeRegistry(listers);

    let mut account_config = AccountConfig::default();
    account_config.filters.insert(
        "S3Bucket".to_string(),
        vec![crate::config::FilterRuleConfig {
            property: "Name".to_string(),
            op: crate::filter::MatchOp::Equals,
            value: serde_json::json!("bucket-1"),
            invert: false,
        }],
    );

    let (mut queue, _) = scan(
        &registry,
        &registry,
        &["us-east-1".to_string()],
        &["S3Bucket".to_string()],
        &FeatureFlags::default(),
        &account_config,
    )
    .await
    .unwrap();

    assert_eq!(queue.count(&[ItemState::Filtered]), 1);
    assert_eq!(queue.count(&[ItemState::New]), 0);

    // Even if a run were started, filtered items never transition further.
    let summary = run(&mut queue, &registry, 1, 1).await.unwrap();
    assert_eq!(summary.filtered, 1);
    assert_eq!(summary.finished, 0);
    assert!(!state.lock().unwrap().deleted);
}

#[tokio::test(start_paused = true)]
async fn disabled_wait_stall_tolerates_slow_propagation() {
    // The item stays listed for two sweeps after remove() succeeds,
    // exercising Pending -> Waiting -> Waiting -> Finished. With
    // max_wait_retries == 0 the check must never fire, regardless of how
    // many sweeps in a row the item is seen present.
    let (registry, state) = lingering_resource_registry(2);
    let (mut queue, _) = scan(
        &registry,
        &registry,
        &["us-east-1".to_string()],
        &["S3Bucket".to_string()],
        &FeatureFlags::default(),
        &AccountConfig::default(),
    )
    .await
    .unwrap();

    let summary = run(&mut queue, &registry, 0, 5).await.unwrap();

    assert_eq!(summary.finished, 1);
    assert!(state.lock().unwrap().deleted);
}

#[tokio::test(start_paused = true)]
async fn wait_stall_aborts_when_configured_and_exceeded() {
    // The item never drops out of list() once deleted, so it sits in
    // Waiting forever — the run must abort once the wait-stall limit is
    // reached rather than loop indefinitely.
    let (registry, _state) = lingering_resource_registry(u32::MAX);
    let (mut queue, _) = scan(
        &registry,
        &registry,
        &["us-east-1".to_string()],
        &["S3Bucket".to_string()],
        &FeatureFlags::default(),
        &AccountConfig::default(),
    )
    .await
    .unwrap();

    let err = run(&mut queue, &registry, 2, 5).await.unwrap_err();
    assert!(matches!(err, ReaperError::WaitStall));
}

#[test]
fn account_mismatch_is_rejected_before_any_scan() {
    let configured = vec!["111111111111".to_string()];
    let err = validate_account(&configured, "222222222222").unwrap_err();
    assert!(matches!(err, ReaperError::AccountMismatch { .. }));
}

#[test]
fn resolver_defaults_to_universe_when_unconfigured() {
    let universe = KindSet::from_names(["S3Bucket", "IamRole", "LambdaFunction"]);
    let excludes = KindSet::from_names(["IamRole"]);
    let result = resolve(&universe, &[KindSet::new()], &[excludes]).unwrap();
    assert_eq!(result, KindSet::from_names(["S3Bucket", "LambdaFunction"]));
}
