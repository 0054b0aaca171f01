//! AWS-backed resource adapters and the account/session boundary.
//! Depends on `reaper-core` for the capability contract and nothing else
//! in the workspace — every AWS SDK dependency lives here, not in
//! `reaper-core`.

pub mod account;
pub mod registry;
pub mod resources;

pub use registry::AwsRegistry;
