//! The filter engine: adapter self-filter + config filter rules.
//!
//! Match expressions are opaque to the engine — it only calls
//! `matches(value) -> bool | error` on them. A handful of concrete
//! operators are provided here; config parsing picks one per rule.

use serde::Deserialize;

use crate::resource::{PropertyError, ResourceInstance};

pub trait MatchExpr: Send + Sync {
    fn matches(&self, value: &serde_json::Value) -> Result<bool, String>;
}

/// Exact string equality against the property's string form.
pub struct Equals(pub String);
impl MatchExpr for Equals {
    fn matches(&self, value: &serde_json::Value) -> Result<bool, String> {
        Ok(value_as_str(value) == self.0)
    }
}

/// Case-sensitive substring match.
pub struct Contains(pub String);
impl MatchExpr for Contains {
    fn matches(&self, value: &serde_json::Value) -> Result<bool, String> {
        Ok(value_as_str(value).contains(&self.0))
    }
}

/// Shell-style glob (`*`, `?`), translated to an anchored regex.
pub struct Glob(pub regex::Regex);
impl Glob {
    pub fn new(pattern: &str) -> Result<Self, String> {
        let mut re = String::from("^");
        for c in pattern.chars() {
            match c {
                '*' => re.push_str(".*"),
                '?' => re.push('.'),
                '.' | '+' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '$' | '|' | '\\' => {
                    re.push('\\');
                    re.push(c);
                }
                _ => re.push(c),
            }
        }
        re.push('$');
        regex::Regex::new(&re).map(Glob).map_err(|e| e.to_string())
    }
}
impl MatchExpr for Glob {
    fn matches(&self, value: &serde_json::Value) -> Result<bool, String> {
        Ok(self.0.is_match(&value_as_str(value)))
    }
}

/// Arbitrary regular expression.
pub struct RegexMatch(pub regex::Regex);
impl MatchExpr for RegexMatch {
    fn matches(&self, value: &serde_json::Value) -> Result<bool, String> {
        Ok(self.0.is_match(&value_as_str(value)))
    }
}

/// Numeric comparison (`<`, `<=`, `>`, `>=`, `==`).
pub enum NumericOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}
pub struct NumericCompare(pub NumericOp, pub f64);
impl MatchExpr for NumericCompare {
    fn matches(&self, value: &serde_json::Value) -> Result<bool, String> {
        let n = value
            .as_f64()
            .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
            .ok_or_else(|| format!("not a number: {value}"))?;
        Ok(match self.0 {
            NumericOp::Lt => n < self.1,
            NumericOp::Le => n <= self.1,
            NumericOp::Gt => n > self.1,
            NumericOp::Ge => n >= self.1,
            NumericOp::Eq => n == self.1,
        })
    }
}

/// Membership in a fixed set of strings.
pub struct OneOf(pub Vec<String>);
impl MatchExpr for OneOf {
    fn matches(&self, value: &serde_json::Value) -> Result<bool, String> {
        let v = value_as_str(value);
        Ok(self.0.iter().any(|candidate| candidate == &v))
    }
}

fn value_as_str(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `(property, match-expression, invert?)`. A positive match means
/// "filter out this item."
pub struct FilterRule {
    pub property: String,
    pub expr: Box<dyn MatchExpr>,
    pub invert: bool,
}

impl FilterRule {
    /// Evaluate against a pre-extracted property value, applying `invert`.
    pub fn evaluate(&self, value: &serde_json::Value) -> Result<bool, String> {
        let m = self.expr.matches(value)?;
        Ok(if self.invert { !m } else { m })
    }
}

/// Operator tag used by config parsing — kept separate from [`MatchExpr`]
/// so the YAML schema stays flat.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchOp {
    Equals,
    Contains,
    Glob,
    Regex,
    Lt,
    Le,
    Gt,
    Ge,
    OneOf,
}

pub enum FilterOutcome {
    NotFiltered,
    Filtered(String),
}

/// Step 1 of the filter engine: adapter self-filter. Any error other than
/// "filtered" is swallowed upstream by the implementor — see
/// [`crate::resource::ResourceInstance::self_filter`].
pub async fn apply_self_filter(resource: &dyn ResourceInstance) -> FilterOutcome {
    match resource.self_filter().await {
        Ok(()) => FilterOutcome::NotFiltered,
        Err(reason) => FilterOutcome::Filtered(reason),
    }
}

/// Step 2: config filter rules, evaluated in order with short-circuit on
/// the first positive match.
pub fn apply_config_filters(
    resource: &dyn ResourceInstance,
    rules: &[FilterRule],
) -> Result<FilterOutcome, String> {
    for rule in rules {
        let value = match resource.get_property(&rule.property) {
            Ok(v) => v,
            Err(PropertyError::Unsupported) => continue,
            Err(PropertyError::Other(e)) => return Err(e),
        };

        if rule.evaluate(&value)? {
            return Ok(FilterOutcome::Filtered("filtered by config".to_string()));
        }
    }
    Ok(FilterOutcome::NotFiltered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invert_toggles_match_for_all_inputs() {
        let rule = FilterRule {
            property: "Name".into(),
            expr: Box::new(Equals("keep-me".into())),
            invert: false,
        };
        let inverted = FilterRule {
            property: "Name".into(),
            expr: Box::new(Equals("keep-me".into())),
            invert: true,
        };

        for candidate in ["keep-me", "drop-me"] {
            let value = serde_json::json!(candidate);
            assert_ne!(rule.evaluate(&value).unwrap(), inverted.evaluate(&value).unwrap());
        }
    }

    #[test]
    fn double_invert_is_idempotent() {
        let plain = Equals("x".into());
        let value = serde_json::json!("x");
        let once = plain.matches(&value).unwrap();
        // inverting twice (not once) must return to the original result
        assert_eq!(!(!once), once);
    }

    #[test]
    fn glob_matches_prefix_wildcard() {
        let g = Glob::new("prod-*").unwrap();
        assert!(g.matches(&serde_json::json!("prod-bucket")).unwrap());
        assert!(!g.matches(&serde_json::json!("staging-bucket")).unwrap());
    }
}
