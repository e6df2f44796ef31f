//! Resource pack overrides.
//!
//! A resource pack can rename anything by shipping its own
//! `assets/<namespace>/lang/en_us.json`. All such files in the pack are merged
//! into one flat table that takes precedence over the mods' own names.

use std::{
    collections::HashMap,
    path::{Component, Path},
};

use serde::{Deserialize, Serialize};

use crate::{
    extract::sorted_walk,
    localization::{LANG_FILE_SUFFIX, LangFile, REFERENCE_LOCALE_FILE, read_lang_members},
    traits::Parser,
};

/// Value of the overlay path meaning "no overlay".
pub const DISABLED_SENTINEL: &str = "none";

/// Which language files inside a resource pack count as overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayMatch {
    /// Any `.../lang/en_us.json` with an `assets` segment somewhere in its path.
    #[default]
    Loose,
    /// Only `.../assets/<namespace>/lang/en_us.json`.
    Strict,
}

impl OverlayMatch {
    /// Tests a `/`-separated path against the heuristic.
    pub fn accepts(&self, path: &str) -> bool {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let Some(file_name) = segments.last() else {
            return false;
        };
        if !file_name.eq_ignore_ascii_case(REFERENCE_LOCALE_FILE) {
            return false;
        }
        match self {
            OverlayMatch::Loose => segments.iter().any(|s| s.eq_ignore_ascii_case("assets")),
            OverlayMatch::Strict => {
                segments.len() >= 4
                    && segments[segments.len() - 2].eq_ignore_ascii_case("lang")
                    && segments[segments.len() - 4].eq_ignore_ascii_case("assets")
            }
        }
    }

    /// Archive members are matched case-sensitively throughout: the
    /// `lang/en_us.json` suffix and the `assets` segment must be lower case.
    fn accepts_member(&self, name: &str) -> bool {
        if !name.ends_with(LANG_FILE_SUFFIX) || !self.accepts(name) {
            return false;
        }
        let segments: Vec<&str> = name.split('/').filter(|s| !s.is_empty()).collect();
        match self {
            OverlayMatch::Loose => segments.contains(&"assets"),
            OverlayMatch::Strict => segments[segments.len() - 4] == "assets",
        }
    }
}

/// Flat `key -> text` overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayTable {
    entries: HashMap<String, String>,
}

impl OverlayTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Merges one language file. Later keys win.
    pub fn merge(&mut self, lang: LangFile) {
        self.entries.extend(lang.into_entries());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for OverlayTable {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        OverlayTable {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Whether `path` names an overlay at all. Empty text and `none` (any case)
/// mean the overlay is switched off.
pub fn is_overlay_disabled(path: &Path) -> bool {
    let text = path.as_os_str().to_string_lossy();
    let text = text.trim();
    text.is_empty() || text.eq_ignore_ascii_case(DISABLED_SENTINEL)
}

/// Loads the overlay at `path`: a pack folder or a pack archive.
///
/// Never fails. An unreadable archive yields an empty table and unreadable
/// language files are skipped.
pub fn load_overlay<P: AsRef<Path>>(path: Option<P>, matching: OverlayMatch) -> OverlayTable {
    let Some(path) = path else {
        return OverlayTable::new();
    };
    let path = path.as_ref();
    if is_overlay_disabled(path) {
        return OverlayTable::new();
    }

    let table = if path.is_dir() {
        load_overlay_folder(path, matching)
    } else {
        load_overlay_archive(path, matching)
    };
    tracing::info!("loaded {} overlay entries from {}", table.len(), path.display());
    table
}

fn load_overlay_folder(root: &Path, matching: OverlayMatch) -> OverlayTable {
    let mut table = OverlayTable::new();
    for dent in sorted_walk(root) {
        let dent = match dent {
            Ok(d) => d,
            Err(e) => {
                tracing::debug!("skipping unreadable overlay path: {}", e);
                continue;
            }
        };
        if !dent.file_type().is_some_and(|t| t.is_file())
            || !matching.accepts(&slash_path(dent.path()))
        {
            continue;
        }
        match LangFile::read_from(dent.path()) {
            Ok(lang) => table.merge(lang),
            Err(e) => tracing::debug!("skipping {}: {}", dent.path().display(), e),
        }
    }
    table
}

fn load_overlay_archive(path: &Path, matching: OverlayMatch) -> OverlayTable {
    let mut table = OverlayTable::new();
    match read_lang_members(path, |name| matching.accepts_member(name)) {
        Ok(langs) => {
            for (_, lang) in langs {
                table.merge(lang);
            }
        }
        Err(e) => tracing::warn!("cannot read overlay {}: {}", path.display(), e),
    }
    table
}

/// Joins the normal components of `path` with `/`, whatever the platform.
fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
