//! Identifier extraction from registry dump folders.
//!
//! Registry dump mods export one JSON document per registry, in a handful of
//! shapes: a bare array of identifiers, an array of objects carrying the
//! identifier under some alias key, or an object wrapping such arrays. The
//! extractor accepts all of them and never fails a scan because of one bad
//! document.

use std::{
    collections::BTreeSet,
    io::Read,
    path::{Path, PathBuf},
};

use ignore::WalkBuilder;
use serde_json::{Map, Value};

use crate::{
    error::Error,
    traits::{Parser, decode_to_string},
    types::Entry,
};

/// Object keys that may hold an identifier.
pub const ID_ALIAS_KEYS: [&str; 4] = ["id", "identifier", "registry_name", "registryName"];

/// Directory-name endings preferred when picking a registry folder from a dump.
const PREFERRED_REGISTRY_DIRS: [&str; 7] = [
    "items", "item", "blocks", "block", "entities", "entity", "worldgen",
];

/// One parsed registry dump document.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryDocument(pub Value);

impl Parser for RegistryDocument {
    fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let text = decode_to_string(reader)?;
        Ok(RegistryDocument(serde_json::from_str(&text)?))
    }
}

impl RegistryDocument {
    /// Raw identifier strings in document order. Non-string values are never
    /// returned; empty strings are left for [`Entry::parse`] to drop.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_identifiers(&self.0, &mut out);
        out
    }
}

fn collect_identifiers<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::String(id) => out.push(id),
                    Value::Object(fields) => push_alias_ids(fields, out),
                    _ => {}
                }
            }
        }
        Value::Object(fields) => {
            for field in fields.values().filter(|v| v.is_array()) {
                collect_identifiers(field, out);
            }
            push_alias_ids(fields, out);
        }
        _ => {}
    }
}

fn push_alias_ids<'a>(fields: &'a Map<String, Value>, out: &mut Vec<&'a str>) {
    for key in ID_ALIAS_KEYS {
        if let Some(Value::String(id)) = fields.get(key) {
            out.push(id);
        }
    }
}

fn is_json_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Deterministic recursive walk: hidden and git-ignored files are included,
/// siblings are visited in file-name order.
pub(crate) fn sorted_walk(root: &Path) -> ignore::Walk {
    WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build()
}

/// Collects every identifier from every `.json` document below `root`.
///
/// Documents that cannot be read or parsed contribute nothing.
pub fn scan_registry<P: AsRef<Path>>(root: P) -> Vec<Entry> {
    let root = root.as_ref();
    let mut entries = Vec::new();

    for dent in sorted_walk(root) {
        let dent = match dent {
            Ok(d) => d,
            Err(e) => {
                tracing::debug!("skipping unreadable registry path: {}", e);
                continue;
            }
        };
        if !dent.file_type().is_some_and(|t| t.is_file()) || !is_json_file(dent.path()) {
            continue;
        }

        let document = match RegistryDocument::read_from(dent.path()) {
            Ok(document) => document,
            Err(e) => {
                tracing::debug!("skipping {}: {}", dent.path().display(), e);
                continue;
            }
        };

        let origin = relative_display(root, dent.path());
        let before = entries.len();
        entries.extend(
            document
                .identifiers()
                .into_iter()
                .filter_map(|raw| Entry::parse(raw, origin.as_str())),
        );
        tracing::debug!("{}: {} identifiers", origin, entries.len() - before);
    }

    entries
}

fn relative_display(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Lists every directory below `dump_root` that directly holds a `.json`
/// file, sorted and without duplicates.
pub fn find_registry_dirs<P: AsRef<Path>>(dump_root: P) -> Vec<PathBuf> {
    let mut dirs = BTreeSet::new();
    for dent in sorted_walk(dump_root.as_ref()).flatten() {
        if dent.file_type().is_some_and(|t| t.is_file())
            && is_json_file(dent.path())
            && let Some(parent) = dent.path().parent()
        {
            dirs.insert(parent.to_path_buf());
        }
    }
    dirs.into_iter().collect()
}

/// Picks the most likely registry folder among `candidates`: the first one
/// ending in `items`, then `item`, `blocks` and so on, else the first
/// candidate.
pub fn pick_registry_dir(candidates: &[PathBuf]) -> Option<&PathBuf> {
    PREFERRED_REGISTRY_DIRS
        .iter()
        .find_map(|guess| {
            candidates
                .iter()
                .find(|c| c.to_string_lossy().to_lowercase().ends_with(guess))
        })
        .or_else(|| candidates.first())
}
