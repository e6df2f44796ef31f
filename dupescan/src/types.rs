//! Core types for dupescan.
//! The extractor produces [`Entry`] values; every later stage reads them.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Display,
    path::Path,
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Source assumed for identifiers written without a `source:` prefix.
pub const DEFAULT_SOURCE: &str = "minecraft";

/// Returns the source part of a canonical `source:path` identifier.
pub fn source_of(id: &str) -> &str {
    id.split_once(':').map_or(id, |(source, _)| source)
}

/// One identified content item discovered in a registry dump.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Entry {
    /// Canonical identifier, always `"<source>:<local_path>"`.
    pub id: String,

    /// The mod (or the built-in game) that registered the identifier.
    pub source: String,

    /// Source-relative path, may contain `/`.
    pub local_path: String,

    /// Registry document the identifier came from, relative to the scanned root.
    pub origin_file: String,
}

impl Entry {
    /// Splits a raw identifier at its first `:` and builds the canonical entry.
    ///
    /// Returns `None` for identifiers that are empty after trimming or that
    /// have nothing after the separator.
    ///
    /// An empty source prefix counts as the default source, so `:dirt` and
    /// `minecraft:dirt` are the same entry and merge when collected.
    pub fn parse(raw: &str, origin_file: impl Into<String>) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let (source, local_path) = match raw.split_once(':') {
            Some((source, path)) if source.is_empty() => (DEFAULT_SOURCE, path),
            Some((source, path)) => (source, path),
            None => (DEFAULT_SOURCE, raw),
        };
        if local_path.is_empty() {
            return None;
        }

        Some(Entry {
            id: format!("{}:{}", source, local_path),
            source: source.to_string(),
            local_path: local_path.to_string(),
            origin_file: origin_file.into(),
        })
    }

    /// The language-file key this entry is looked up under.
    pub fn localization_key(&self, kind: Kind) -> String {
        kind.localization_key(&self.source, &self.local_path)
    }
}

impl Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.id, self.origin_file)
    }
}

/// Content category of a registry dump. Decides the localization key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Block,
    Entity,
    Biome,
    Worldgen,
    #[default]
    Item,
}

impl Kind {
    /// Classifies a registry directory by the words in its path.
    ///
    /// The whole path text is inspected, parents included, in the order
    /// block, entity/mob, biome, worldgen/structure/feature; anything else is
    /// an item registry.
    pub fn infer_from_path<P: AsRef<Path>>(path: P) -> Kind {
        Self::infer_from_text(&path.as_ref().to_string_lossy())
    }

    pub fn infer_from_text(text: &str) -> Kind {
        let p = text.to_lowercase().replace('\\', "/");
        if p.contains("block") {
            Kind::Block
        } else if p.contains("entity") || p.contains("mob") {
            Kind::Entity
        } else if p.contains("biome") {
            Kind::Biome
        } else if p.contains("worldgen") || p.contains("structure") || p.contains("feature") {
            Kind::Worldgen
        } else {
            Kind::Item
        }
    }

    /// First segment of every localization key of this kind.
    pub fn key_prefix(&self) -> &'static str {
        match self {
            Kind::Block => "block",
            Kind::Entity => "entity",
            Kind::Biome => "biome",
            Kind::Worldgen => "worldgen",
            Kind::Item => "item",
        }
    }

    /// Builds `"<prefix>.<source>.<local_path>"`. The path is kept verbatim,
    /// slashes included.
    pub fn localization_key(&self, source: &str, local_path: &str) -> String {
        format!("{}.{}.{}", self.key_prefix(), source, local_path)
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key_prefix())
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "block" | "blocks" => Ok(Kind::Block),
            "entity" | "entities" | "mob" => Ok(Kind::Entity),
            "biome" | "biomes" => Ok(Kind::Biome),
            "worldgen" | "structure" | "feature" => Ok(Kind::Worldgen),
            "item" | "items" => Ok(Kind::Item),
            other => Err(Error::UnknownKind(other.to_string())),
        }
    }
}

/// How display names are folded before they are compared.
///
/// Only the grouping key is affected; resolved names keep their original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ComparisonRules {
    pub case_insensitive: bool,
    pub underscores_as_spaces: bool,
}

impl Default for ComparisonRules {
    fn default() -> Self {
        Self {
            case_insensitive: true,
            underscores_as_spaces: true,
        }
    }
}

impl ComparisonRules {
    pub fn new(case_insensitive: bool, underscores_as_spaces: bool) -> Self {
        Self {
            case_insensitive,
            underscores_as_spaces,
        }
    }

    /// Compares names exactly as written.
    pub fn exact() -> Self {
        Self::new(false, false)
    }

    /// Produces the grouping key for `name`.
    pub fn normalize(&self, name: &str) -> String {
        let text = if self.underscores_as_spaces {
            name.replace('_', " ")
        } else {
            name.to_string()
        };
        if self.case_insensitive {
            text.to_lowercase()
        } else {
            text
        }
    }
}

/// Display names of every scanned identifier, before and after the overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NameResolution {
    pub before: BTreeMap<String, String>,
    pub after: BTreeMap<String, String>,

    /// Ids whose `before` name was synthesized from the identifier.
    pub synthesized: BTreeSet<String>,
}

/// One identifier whose name differs between the two passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameChange<'a> {
    pub id: &'a str,
    pub before: Option<&'a str>,
    pub after: Option<&'a str>,
}

impl NameResolution {
    pub fn len(&self) -> usize {
        self.before.len()
    }

    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }

    pub fn is_changed(&self, id: &str) -> bool {
        self.before.get(id) != self.after.get(id)
    }

    /// Identifiers (from either map) whose names differ, sorted by id.
    pub fn changes(&self) -> Vec<NameChange<'_>> {
        let ids: BTreeSet<&String> = self.before.keys().chain(self.after.keys()).collect();
        ids.into_iter()
            .filter_map(|id| {
                let before = self.before.get(id).map(String::as_str);
                let after = self.after.get(id).map(String::as_str);
                (before != after).then_some(NameChange {
                    id: id.as_str(),
                    before,
                    after,
                })
            })
            .collect()
    }
}

/// Identifiers sharing one normalized display name, keyed by that name.
///
/// Only groups spanning two or more sources are ever stored; see
/// [`crate::grouping::group_duplicates`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DuplicateGroups {
    groups: BTreeMap<String, BTreeSet<String>>,
}

impl DuplicateGroups {
    pub(crate) fn from_map(groups: BTreeMap<String, BTreeSet<String>>) -> Self {
        Self { groups }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.groups.get(name)
    }

    /// Whether `id` collides with an identifier from another source.
    pub fn contains_id(&self, id: &str) -> bool {
        self.groups.values().any(|ids| ids.contains(id))
    }

    /// Groups in report order: case-insensitive by name, ties broken ordinally.
    /// Members iterate in ordinal id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        let mut ordered: Vec<(&str, &BTreeSet<String>)> = self
            .groups
            .iter()
            .map(|(name, ids)| (name.as_str(), ids))
            .collect();
        ordered.sort_by_cached_key(|(name, _)| (name.to_lowercase(), name.to_string()));
        ordered.into_iter()
    }

    /// Distinct sources of one group's members.
    pub fn sources(ids: &BTreeSet<String>) -> BTreeSet<&str> {
        ids.iter().map(|id| source_of(id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_without_separator_uses_default_source() {
        let entry = Entry::parse("stone", "items.json").unwrap();
        assert_eq!(entry.source, DEFAULT_SOURCE);
        assert_eq!(entry.local_path, "stone");
        assert_eq!(entry.id, "minecraft:stone");
    }

    #[test]
    fn test_empty_source_prefix_merges_with_default_source() {
        let bare = Entry::parse(":dirt", "a.json").unwrap();
        let full = Entry::parse("minecraft:dirt", "b.json").unwrap();
        assert_eq!(bare.id, full.id);
        assert_eq!(bare.source, DEFAULT_SOURCE);
    }

    #[test]
    fn test_entry_splits_at_first_separator_only() {
        let entry = Entry::parse("modA:odd:path", "x.json").unwrap();
        assert_eq!(entry.source, "modA");
        assert_eq!(entry.local_path, "odd:path");
        assert_eq!(entry.id, "modA:odd:path");
    }

    #[test]
    fn test_entry_trims_and_drops_empty() {
        assert!(Entry::parse("   ", "x.json").is_none());
        assert!(Entry::parse("modA:", "x.json").is_none());
        let entry = Entry::parse("  modA:apple \n", "x.json").unwrap();
        assert_eq!(entry.id, "modA:apple");
    }

    #[test]
    fn test_entry_with_empty_source_uses_default() {
        let entry = Entry::parse(":dirt", "x.json").unwrap();
        assert_eq!(entry.id, "minecraft:dirt");
    }

    #[test]
    fn test_localization_key_keeps_slashes() {
        let entry = Entry::parse("modA:block/stone_brick", "blocks.json").unwrap();
        assert_eq!(
            entry.localization_key(Kind::Block),
            "block.modA.block/stone_brick"
        );
    }

    #[test]
    fn test_kind_inference_priority() {
        assert_eq!(Kind::infer_from_text("dump/blocks"), Kind::Block);
        assert_eq!(Kind::infer_from_text("dump/entity_types"), Kind::Entity);
        assert_eq!(Kind::infer_from_text("dump/mobs"), Kind::Entity);
        assert_eq!(Kind::infer_from_text("dump/Biomes"), Kind::Biome);
        assert_eq!(Kind::infer_from_text("dump/worldgen/placed"), Kind::Worldgen);
        assert_eq!(Kind::infer_from_text("dump/structures"), Kind::Worldgen);
        assert_eq!(Kind::infer_from_text("dump/configured_feature"), Kind::Worldgen);
        assert_eq!(Kind::infer_from_text("dump/items"), Kind::Item);
        // block wins over entity when both appear
        assert_eq!(Kind::infer_from_text("block_entity_type"), Kind::Block);
    }

    #[test]
    fn test_kind_inference_normalizes_backslashes_and_case() {
        assert_eq!(Kind::infer_from_text(r"C:\Dumps\BLOCK"), Kind::Block);
        assert_eq!(Kind::infer_from_text(r"C:\Dumps\Stuff"), Kind::Item);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("blocks".parse::<Kind>().unwrap(), Kind::Block);
        assert_eq!("Worldgen".parse::<Kind>().unwrap(), Kind::Worldgen);
        assert!("fluid".parse::<Kind>().is_err());
    }

    #[test]
    fn test_normalize_rules() {
        let name = "Pear_Jelly";
        assert_eq!(ComparisonRules::exact().normalize(name), "Pear_Jelly");
        assert_eq!(ComparisonRules::new(true, false).normalize(name), "pear_jelly");
        assert_eq!(ComparisonRules::new(false, true).normalize(name), "Pear Jelly");
        assert_eq!(ComparisonRules::default().normalize(name), "pear jelly");
    }

    #[test]
    fn test_changes_lists_only_differences() {
        let mut resolution = NameResolution::default();
        resolution.before.insert("a:x".into(), "X".into());
        resolution.after.insert("a:x".into(), "X".into());
        resolution.before.insert("b:y".into(), "Y".into());
        resolution.after.insert("b:y".into(), "Why".into());

        let changes = resolution.changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].id, "b:y");
        assert_eq!(changes[0].before, Some("Y"));
        assert_eq!(changes[0].after, Some("Why"));
        assert!(resolution.is_changed("b:y"));
        assert!(!resolution.is_changed("a:x"));
    }

    #[test]
    fn test_groups_iterate_case_insensitively() {
        let mut map = BTreeMap::new();
        map.insert("beta".to_string(), BTreeSet::from(["a:b".to_string()]));
        map.insert("Alpha".to_string(), BTreeSet::from(["a:a".to_string()]));
        map.insert("alpha".to_string(), BTreeSet::from(["a:c".to_string()]));
        let groups = DuplicateGroups::from_map(map);
        let names: Vec<&str> = groups.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Alpha", "alpha", "beta"]);
    }
}
