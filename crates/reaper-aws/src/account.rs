//! The AWS account/session boundary: identity validation and per-region
//! SDK config construction.

use reaper_core::ReaperError;

/// Call STS `GetCallerIdentity` against the default credential chain and
/// return the live account id, so the caller can validate it against the
/// configured account ids before any scan begins.
pub async fn get_caller_identity(config: &aws_config::SdkConfig) -> Result<String, ReaperError> {
    let sts = aws_sdk_sts::Client::new(config);
    let resp = sts
        .get_caller_identity()
        .send()
        .await
        .map_err(|e| ReaperError::Aws(format!("STS GetCallerIdentity failed: {e}")))?;

    Ok(resp.account().unwrap_or_default().to_string())
}

/// Build an `SdkConfig` for one region from the default credential chain.
pub async fn new_session(region: &str) -> aws_config::SdkConfig {
    aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(region.to_string()))
        .load()
        .await
}

/// Resolve the default AWS config once (no region pin), used only to
/// validate the account before any per-region session is built.
pub async fn default_session() -> aws_config::SdkConfig {
    aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await
}
