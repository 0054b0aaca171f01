//! YAML configuration schema and loading.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::ReaperError;
use crate::filter::{Contains, Equals, FilterRule, Glob, MatchExpr, MatchOp, NumericCompare, NumericOp, OneOf, RegexMatch};
use crate::resolver::KindSet;

/// Top-level configuration document.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub regions: Vec<String>,
    #[serde(rename = "resource-types", default)]
    pub resource_types: ResourceTypes,
    #[serde(rename = "feature-flags", default)]
    pub feature_flags: HashMap<String, bool>,
    #[serde(default)]
    pub accounts: HashMap<String, AccountConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceTypes {
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountConfig {
    #[serde(default)]
    pub presets: Vec<String>,
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
    #[serde(default)]
    pub filters: HashMap<String, Vec<FilterRuleConfig>>,
}

/// One row of a `filters.<Kind>` list in the YAML document.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterRuleConfig {
    pub property: String,
    #[serde(default = "default_op")]
    pub op: MatchOp,
    pub value: serde_json::Value,
    #[serde(default)]
    pub invert: bool,
}

fn default_op() -> MatchOp {
    MatchOp::Equals
}

impl FilterRuleConfig {
    /// Build the runtime [`FilterRule`] this config row describes.
    pub fn into_rule(self) -> Result<FilterRule, ReaperError> {
        let expr: Box<dyn MatchExpr> = match self.op {
            MatchOp::Equals => Box::new(Equals(value_to_string(&self.value))),
            MatchOp::Contains => Box::new(Contains(value_to_string(&self.value))),
            MatchOp::Glob => Box::new(
                Glob::new(&value_to_string(&self.value))
                    .map_err(|e| ReaperError::ConfigInvalid(format!("invalid glob pattern: {e}")))?,
            ),
            MatchOp::Regex => Box::new(RegexMatch(
                regex::Regex::new(&value_to_string(&self.value))
                    .map_err(|e| ReaperError::ConfigInvalid(format!("invalid regex pattern: {e}")))?,
            )),
            MatchOp::Lt => Box::new(NumericCompare(NumericOp::Lt, value_to_f64(&self.value)?)),
            MatchOp::Le => Box::new(NumericCompare(NumericOp::Le, value_to_f64(&self.value)?)),
            MatchOp::Gt => Box::new(NumericCompare(NumericOp::Gt, value_to_f64(&self.value)?)),
            MatchOp::Ge => Box::new(NumericCompare(NumericOp::Ge, value_to_f64(&self.value)?)),
            MatchOp::OneOf => {
                let items = self
                    .value
                    .as_array()
                    .ok_or_else(|| ReaperError::ConfigInvalid("one_of value must be a list".into()))?
                    .iter()
                    .map(value_to_string)
                    .collect();
                Box::new(OneOf(items))
            }
        };
        Ok(FilterRule {
            property: self.property,
            expr,
            invert: self.invert,
        })
    }
}

fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn value_to_f64(value: &serde_json::Value) -> Result<f64, ReaperError> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
        .ok_or_else(|| ReaperError::ConfigInvalid(format!("not a number: {value}")))
}

/// Validate the live account id against the account ids named explicitly
/// in config (besides `__default__`, which never restricts anything).
/// An empty `configured_ids` means "no explicit accounts configured" and
/// always passes — the run applies the `__default__` block to whatever
/// account it finds itself in.
pub fn validate_account(configured_ids: &[String], actual_account_id: &str) -> Result<(), ReaperError> {
    if configured_ids.is_empty() || configured_ids.iter().any(|id| id == actual_account_id) {
        return Ok(());
    }
    Err(ReaperError::AccountMismatch {
        expected: configured_ids.join(", "),
        actual: actual_account_id.to_string(),
    })
}

impl Config {
    /// Account ids named explicitly in this config, excluding `__default__`.
    pub fn configured_account_ids(&self) -> Vec<String> {
        self.accounts.keys().filter(|id| *id != "__default__").cloned().collect()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReaperError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ReaperError> {
        let config: Config = serde_yaml::from_str(text)?;
        if config.regions.is_empty() {
            return Err(ReaperError::ConfigInvalid("regions must not be empty".into()));
        }
        Ok(config)
    }

    /// Look up the per-account config block, falling back to `__default__`
    /// when an account-specific block isn't present.
    pub fn account_config(&self, account_id: &str) -> Option<&AccountConfig> {
        self.accounts.get(account_id).or_else(|| self.accounts.get("__default__"))
    }
}

impl ResourceTypes {
    pub fn target_set(&self) -> KindSet {
        KindSet::from_names(self.targets.iter().cloned())
    }

    pub fn exclude_set(&self) -> KindSet {
        KindSet::from_names(self.excludes.iter().cloned())
    }
}

impl AccountConfig {
    pub fn target_set(&self) -> KindSet {
        KindSet::from_names(self.targets.iter().cloned())
    }

    pub fn exclude_set(&self) -> KindSet {
        KindSet::from_names(self.excludes.iter().cloned())
    }

    /// Build runtime filter rules for one kind, consuming the config rows.
    pub fn filter_rules_for(&self, kind: &str) -> Result<Vec<FilterRule>, ReaperError> {
        self.filters
            .get(kind)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(FilterRuleConfig::into_rule)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
regions: [us-east-1, us-west-2]
resource-types:
  targets: []
  excludes: [IamRole]
feature-flags:
  disable-deletion-protection: true
accounts:
  __default__:
    targets: []
    excludes: []
    filters:
      S3Bucket:
        - property: Name
          value: keep-me
          invert: false
  "111111111111":
    presets: [production-safe]
    targets: [S3Bucket, LambdaFunction]
    excludes: []
    filters: {}
"#;

    #[test]
    fn parses_the_documented_schema() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(config.regions, vec!["us-east-1", "us-west-2"]);
        assert_eq!(config.resource_types.excludes, vec!["IamRole"]);
        assert!(config.feature_flags["disable-deletion-protection"]);
        assert_eq!(config.accounts.len(), 2);
    }

    #[test]
    fn unknown_account_falls_back_to_default() {
        let config = Config::parse(SAMPLE).unwrap();
        let fallback = config.account_config("999999999999").unwrap();
        assert!(fallback.targets.is_empty());
    }

    #[test]
    fn known_account_overrides_default() {
        let config = Config::parse(SAMPLE).unwrap();
        let account = config.account_config("111111111111").unwrap();
        assert_eq!(account.targets, vec!["S3Bucket", "LambdaFunction"]);
    }

    #[test]
    fn empty_regions_is_rejected() {
        let err = Config::parse("regions: []\n").unwrap_err();
        assert!(matches!(err, ReaperError::ConfigInvalid(_)));
    }

    #[test]
    fn matching_account_id_passes_validation() {
        let ids = vec!["111111111111".to_string()];
        assert!(validate_account(&ids, "111111111111").is_ok());
    }

    #[test]
    fn mismatched_account_id_is_rejected() {
        let ids = vec!["111111111111".to_string()];
        let err = validate_account(&ids, "222222222222").unwrap_err();
        assert!(matches!(err, ReaperError::AccountMismatch { .. }));
    }

    #[test]
    fn no_configured_accounts_never_mismatches() {
        assert!(validate_account(&[], "999999999999").is_ok());
    }

    #[test]
    fn filter_rule_builds_a_working_matcher() {
        let config = Config::parse(SAMPLE).unwrap();
        let default_account = config.account_config("__default__").unwrap();
        let rules = default_account.filter_rules_for("S3Bucket").unwrap();
        assert_eq!(rules.len(), 1);
        assert!(rules[0].evaluate(&serde_json::json!("keep-me")).unwrap());
    }
}
