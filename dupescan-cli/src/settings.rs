//! Saved scan preferences.
//!
//! A settings file is a flat JSON object (or TOML table when the file name
//! ends in `.toml`). Keys written by the older GUI tool (`registry_folder`,
//! `mods_folder`, `rp_path` and so on) are read as aliases.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use dupescan::{
    ComparisonRules, Kind, OverlayMatch, ScanConfig, find_registry_dirs, parse_source_list,
    pick_registry_dir,
};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dump_root: Option<PathBuf>,
    #[serde(alias = "registry_folder", skip_serializing_if = "Option::is_none")]
    pub registry: Option<PathBuf>,
    #[serde(alias = "mods_folder", skip_serializing_if = "Option::is_none")]
    pub sources: Option<PathBuf>,
    #[serde(alias = "rp_path", skip_serializing_if = "Option::is_none")]
    pub overlay: Option<PathBuf>,
    #[serde(alias = "output_folder", skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(alias = "enable_rp")]
    pub overlay_enabled: bool,
    pub overlay_match: OverlayMatch,
    pub case_insensitive: bool,
    pub underscores_as_spaces: bool,
    #[serde(alias = "check_missing_lang")]
    pub warn_missing: bool,
    #[serde(alias = "exclude_mods", deserialize_with = "deserialize_source_list")]
    pub excluded_sources: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<Kind>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dump_root: None,
            registry: None,
            sources: None,
            overlay: None,
            output: None,
            overlay_enabled: true,
            overlay_match: OverlayMatch::default(),
            case_insensitive: true,
            underscores_as_spaces: true,
            warn_missing: false,
            excluded_sources: BTreeSet::new(),
            kind: None,
        }
    }
}

/// Accepts `"a, b"` as well as `["a", "b"]`.
fn deserialize_source_list<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SourceList {
        Text(String),
        List(Vec<String>),
    }

    Ok(match SourceList::deserialize(deserializer)? {
        SourceList::Text(text) => parse_source_list(&text),
        SourceList::List(items) => items.iter().flat_map(|item| parse_source_list(item)).collect(),
    })
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

/// Treats an empty path, as saved by the GUI for unset fields, as unset.
fn non_empty(path: &Option<PathBuf>) -> Option<&Path> {
    path.as_deref().filter(|p| !p.as_os_str().is_empty())
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("Cannot read settings {}: {}", path.display(), e))?;
        if is_toml(path) {
            toml::from_str(&text)
                .map_err(|e| format!("Invalid settings {}: {}", path.display(), e))
        } else {
            serde_json::from_str(&text)
                .map_err(|e| format!("Invalid settings {}: {}", path.display(), e))
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        let text = if is_toml(path) {
            toml::to_string_pretty(self).map_err(|e| e.to_string())?
        } else {
            serde_json::to_string_pretty(self).map_err(|e| e.to_string())?
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Cannot create {}: {}", parent.display(), e))?;
        }
        fs::write(path, text).map_err(|e| format!("Cannot write settings {}: {}", path.display(), e))
    }

    /// The registry folder to scan: the explicit one, or the best candidate
    /// found under the dump root.
    pub fn registry_root(&self) -> Result<PathBuf, String> {
        if let Some(registry) = non_empty(&self.registry) {
            return Ok(registry.to_path_buf());
        }
        let Some(dump_root) = non_empty(&self.dump_root) else {
            return Err("No registry folder given. Use --registry or --dump-root.".to_string());
        };
        let candidates = find_registry_dirs(dump_root);
        pick_registry_dir(&candidates)
            .cloned()
            .ok_or_else(|| format!("No folders with .json files found under {}", dump_root.display()))
    }

    pub fn to_scan_config(&self) -> Result<ScanConfig, String> {
        let registry = self.registry_root()?;
        let sources = non_empty(&self.sources)
            .ok_or_else(|| "No sources folder given. Use --sources.".to_string())?;
        let output = non_empty(&self.output)
            .ok_or_else(|| "No output folder given. Use --output.".to_string())?;

        Ok(ScanConfig::new(registry, sources, output)
            .with_overlay(self.overlay.clone())
            .with_overlay_enabled(self.overlay_enabled)
            .with_overlay_match(self.overlay_match)
            .with_rules(ComparisonRules::new(
                self.case_insensitive,
                self.underscores_as_spaces,
            ))
            .with_excluded_sources(self.excluded_sources.iter().cloned())
            .with_warn_on_missing_localization(self.warn_missing)
            .with_kind(self.kind))
    }
}
