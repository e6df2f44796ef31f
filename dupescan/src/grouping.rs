//! Duplicate detection over resolved display names.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::{ComparisonRules, DuplicateGroups};

/// Groups ids whose names are equal under `rules`, keeping only groups that
/// span at least two sources.
///
/// Collisions inside a single source are never reported: a mod naming two of
/// its own items alike is not a cross-mod conflict.
pub fn group_duplicates(
    names: &BTreeMap<String, String>,
    rules: ComparisonRules,
) -> DuplicateGroups {
    let mut by_name: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (id, name) in names {
        by_name
            .entry(rules.normalize(name))
            .or_default()
            .insert(id.clone());
    }

    by_name.retain(|_, ids| DuplicateGroups::sources(ids).len() >= 2);
    DuplicateGroups::from_map(by_name)
}

/// Re-indexes groups by source. A group is listed under every source that
/// owns at least one of its ids.
pub fn index_by_source(groups: &DuplicateGroups) -> BTreeMap<String, DuplicateGroups> {
    let mut per_source: BTreeMap<String, BTreeMap<String, BTreeSet<String>>> = BTreeMap::new();
    for (name, ids) in groups.iter() {
        for source in DuplicateGroups::sources(ids) {
            per_source
                .entry(source.to_string())
                .or_default()
                .insert(name.to_string(), ids.clone());
        }
    }

    per_source
        .into_iter()
        .map(|(source, groups)| (source, DuplicateGroups::from_map(groups)))
        .collect()
}
