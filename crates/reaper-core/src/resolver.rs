//! Resource-type resolver: composes targets/excludes across configuration
//! layers (CLI, global config, per-account config) into the effective
//! kind set.

use std::collections::BTreeSet;

use crate::error::ReaperError;

/// A multiset of kind-name strings, collapsed to a set on composition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KindSet(BTreeSet<String>);

impl KindSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn union(&self, other: &Self) -> Self {
        Self(self.0.union(&other.0).cloned().collect())
    }

    pub fn intersection(&self, other: &Self) -> Self {
        Self(self.0.intersection(&other.0).cloned().collect())
    }

    pub fn difference(&self, other: &Self) -> Self {
        Self(self.0.difference(&other.0).cloned().collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0.into_iter().collect()
    }
}

impl FromIterator<String> for KindSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Compose layered targets/excludes into the effective kind set.
///
/// 1. `targets = union(target_layers)`; if every layer is empty, `targets = universe`.
/// 2. `excludes = union(exclude_layers)`.
/// 3. `result = targets ∩ universe − excludes`.
/// 4. Any name in targets or excludes absent from `universe` is an error.
pub fn resolve(
    universe: &KindSet,
    target_layers: &[KindSet],
    exclude_layers: &[KindSet],
) -> Result<KindSet, ReaperError> {
    let mut targets = KindSet::new();
    for layer in target_layers {
        targets = targets.union(layer);
    }
    let all_targets_empty = target_layers.iter().all(|l| l.is_empty());
    if all_targets_empty {
        targets = universe.clone();
    }

    let mut excludes = KindSet::new();
    for layer in exclude_layers {
        excludes = excludes.union(layer);
    }

    for name in targets.iter().chain(excludes.iter()) {
        if !universe.contains(name) {
            return Err(ReaperError::UnknownKindName(name.clone()));
        }
    }

    Ok(targets.intersection(universe).difference(&excludes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> KindSet {
        KindSet::from_names(names.iter().copied())
    }

    #[test]
    fn empty_targets_default_to_universe_minus_excludes() {
        let universe = set(&["A", "B", "C"]);
        let result = resolve(&universe, &[KindSet::new()], &[set(&["B"])]).unwrap();
        assert_eq!(result, set(&["A", "C"]));
    }

    #[test]
    fn result_is_subset_of_universe_and_disjoint_from_excludes() {
        let universe = set(&["A", "B", "C"]);
        let result = resolve(&universe, &[set(&["A", "B"])], &[set(&["B"])]).unwrap();
        for name in result.iter() {
            assert!(universe.contains(name));
        }
        assert!(result.intersection(&set(&["B"])).is_empty());
        assert_eq!(result, set(&["A"]));
    }

    #[test]
    fn unknown_name_in_targets_is_an_error() {
        let universe = set(&["A", "B"]);
        let err = resolve(&universe, &[set(&["Typo"])], &[]).unwrap_err();
        assert!(matches!(err, ReaperError::UnknownKindName(name) if name == "Typo"));
    }

    #[test]
    fn unknown_name_in_excludes_is_an_error() {
        let universe = set(&["A", "B"]);
        let err = resolve(&universe, &[], &[set(&["Typo"])]).unwrap_err();
        assert!(matches!(err, ReaperError::UnknownKindName(name) if name == "Typo"));
    }

    #[test]
    fn layers_compose_across_cli_global_and_account() {
        let universe = set(&["A", "B", "C", "D"]);
        let cli = set(&["A"]);
        let global = set(&["B"]);
        let account = KindSet::new();
        let result = resolve(&universe, &[cli, global, account], &[]).unwrap();
        assert_eq!(result, set(&["A", "B"]));
    }
}
