//! The `destroy` subcommand: load config, validate the live account,
//! resolve the effective kind set, scan, and — unless this is a dry run —
//! drive the run loop to termination.

use std::process::ExitCode;

use reaper_aws::{account, AwsRegistry};
use reaper_core::{resolve, validate_account, Config, FeatureFlags, KindSet, ReaperError};

use crate::cli::DestroyArgs;

/// Fail-stall limit is fixed, not configurable from the CLI — matching
/// the engine's own termination rule rather than exposing a knob for a
/// liveness bound that's meaningless to tune per-run.
const MAX_FAIL_RETRIES: u32 = 2;

pub async fn run(args: DestroyArgs) -> Result<ExitCode, ReaperError> {
    let config = Config::load(&args.config)?;

    let account_config = config
        .account_config(&args.account)
        .cloned()
        .ok_or_else(|| ReaperError::ConfigInvalid(format!("no account block for `{}` and no __default__", args.account)))?;

    let configured_ids = config.configured_account_ids();
    if !configured_ids.is_empty() {
        let default_session = account::default_session().await;
        let live_account_id = account::get_caller_identity(&default_session).await?;
        if let Err(e) = validate_account(&configured_ids, &live_account_id) {
            tracing::error!(error = %e, "account validation failed");
            return Ok(ExitCode::from(2));
        }
    }

    let home_region = config
        .regions
        .first()
        .ok_or_else(|| ReaperError::ConfigInvalid("regions must not be empty".into()))?
        .clone();
    let registry = AwsRegistry::new(&home_region).await;

    let universe = KindSet::from_names(registry.get_lister_names());
    let cli_targets = KindSet::from_names(args.targets.iter().cloned());
    let cli_excludes = KindSet::from_names(args.excludes.iter().cloned());

    let effective_kinds = resolve(
        &universe,
        &[cli_targets, config.resource_types.target_set(), account_config.target_set()],
        &[cli_excludes, config.resource_types.exclude_set(), account_config.exclude_set()],
    )?;
    let kinds: Vec<String> = effective_kinds.into_vec();

    let feature_flags = FeatureFlags::new(config.feature_flags.clone());

    let (mut queue, scan_summary) = reaper_core::scan(
        &registry,
        &registry,
        &config.regions,
        &kinds,
        &feature_flags,
        &account_config,
    )
    .await?;

    println!(
        "scan complete: {} total, {} nukeable, {} filtered",
        scan_summary.items_discovered,
        queue.count(&[reaper_core::ItemState::New]),
        queue.count(&[reaper_core::ItemState::Filtered]),
    );

    for item in queue.iter() {
        if args.quiet && item.state == reaper_core::ItemState::Filtered {
            continue;
        }
        println!("{}", item.print());
    }

    if !args.no_dry_run {
        println!("dry run: no resources were destroyed. Pass --no-dry-run to actually delete.");
        reaper_audit::record_terminal_items(queue.iter(), &args.account);
        return Ok(ExitCode::SUCCESS);
    }

    let result = reaper_core::run(&mut queue, &registry, args.max_wait_retries, MAX_FAIL_RETRIES).await;

    reaper_audit::record_terminal_items(queue.iter(), &args.account);

    match result {
        Ok(summary) => {
            println!(
                "run complete after {} sweeps: {} failed, {} filtered, {} finished",
                summary.sweeps,
                queue.count(&[reaper_core::ItemState::Failed]),
                summary.filtered,
                summary.finished,
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(ReaperError::FailStall(failures)) => {
            eprintln!("run stalled — every remaining item is failed:\n{failures}");
            Ok(ExitCode::from(3))
        }
        Err(ReaperError::WaitStall) => {
            eprintln!("max wait retries exceeded");
            Ok(ExitCode::from(4))
        }
        Err(e) => Err(e),
    }
}
