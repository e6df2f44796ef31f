//! Localization tables read out of mod archives.
//!
//! Every mod jar ships its display names as `assets/<source>/lang/en_us.json`.
//! Only that reference locale is read; other languages are ignored.

use std::{
    collections::{BTreeMap, HashMap},
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use rayon::prelude::*;
use serde_json::Value;
use zip::ZipArchive;

use crate::{
    error::Error,
    traits::{Parser, decode_to_string},
};

/// File name of the only locale dupescan reads.
pub const REFERENCE_LOCALE_FILE: &str = "en_us.json";

/// Suffix every archive member must carry to be read as a language file.
pub const LANG_FILE_SUFFIX: &str = "lang/en_us.json";

/// Extensions (compared ASCII case-insensitively) recognized as mod archives.
pub const ARCHIVE_EXTENSIONS: [&str; 2] = ["jar", "zip"];

/// A flat `key -> text` language file.
///
/// Values that are not strings are dropped instead of failing the whole file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LangFile {
    entries: BTreeMap<String, String>,
}

impl Parser for LangFile {
    fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let text = decode_to_string(reader)?;
        let object: serde_json::Map<String, Value> = serde_json::from_str(&text)?;
        let entries = object
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::String(text) => Some((key, text)),
                _ => None,
            })
            .collect();
        Ok(LangFile { entries })
    }
}

impl LangFile {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn into_entries(self) -> BTreeMap<String, String> {
        self.entries
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LangFile {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        LangFile {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Per-source language tables: `source -> key -> text`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizationTable {
    sources: HashMap<String, HashMap<String, String>>,
}

impl LocalizationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks `key` up in the table of `source` only.
    pub fn get(&self, source: &str, key: &str) -> Option<&str> {
        self.sources
            .get(source)
            .and_then(|table| table.get(key))
            .map(String::as_str)
    }

    /// Merges a language file into `source`'s table. Later keys win.
    pub fn merge(&mut self, source: &str, lang: LangFile) {
        self.sources
            .entry(source.to_string())
            .or_default()
            .extend(lang.into_entries());
    }

    pub fn has_source(&self, source: &str) -> bool {
        self.sources.contains_key(source)
    }

    /// Number of sources with at least one language file.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn key_count(&self) -> usize {
        self.sources.values().map(HashMap::len).sum()
    }
}

pub fn is_archive(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ARCHIVE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Archives directly inside `folder`, sorted by path.
fn list_archives(folder: &Path) -> Vec<PathBuf> {
    let listing = match std::fs::read_dir(folder) {
        Ok(listing) => listing,
        Err(e) => {
            tracing::warn!("cannot list {}: {}", folder.display(), e);
            return Vec::new();
        }
    };

    let mut archives: Vec<PathBuf> = listing
        .filter_map(|dent| dent.ok())
        .map(|dent| dent.path())
        .filter(|path| path.is_file() && is_archive(path))
        .collect();
    archives.sort();
    archives
}

/// Returns the source of an `assets/<source>/lang/en_us.json` member.
fn source_of_member(name: &str) -> Option<&str> {
    if !name.ends_with(LANG_FILE_SUFFIX) {
        return None;
    }
    let parts: Vec<&str> = name.split('/').collect();
    if parts.len() < 4 || parts[0] != "assets" {
        return None;
    }
    Some(parts[1])
}

/// Parses every member of the archive at `path` accepted by `select`, in
/// member-name order.
///
/// Failing to open the archive is an error; a member that cannot be read or
/// parsed is skipped.
pub(crate) fn read_lang_members<F>(
    path: &Path,
    select: F,
) -> Result<Vec<(String, LangFile)>, Error>
where
    F: Fn(&str) -> bool,
{
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    let mut names: Vec<String> = archive
        .file_names()
        .filter(|name| select(name))
        .map(String::from)
        .collect();
    names.sort();

    let mut langs = Vec::with_capacity(names.len());
    for name in names {
        let parsed = archive
            .by_name(&name)
            .map_err(Error::from)
            .and_then(LangFile::from_reader);
        match parsed {
            Ok(lang) => langs.push((name, lang)),
            Err(e) => {
                tracing::debug!("skipping {}!{}: {}", path.display(), name, e);
            }
        }
    }
    Ok(langs)
}

fn read_archive_langs(path: &Path) -> Vec<(String, LangFile)> {
    match read_lang_members(path, |name| source_of_member(name).is_some()) {
        Ok(langs) => langs
            .into_iter()
            .filter_map(|(name, lang)| {
                source_of_member(&name).map(|source| (source.to_string(), lang))
            })
            .collect(),
        Err(e) => {
            tracing::warn!("skipping archive {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Builds the per-source localization table from every archive in `folder`.
///
/// Archives are read in parallel but merged in sorted path order, then member
/// order, so later files win deterministically.
pub fn load_source_localizations<P: AsRef<Path>>(folder: P) -> LocalizationTable {
    let archives = list_archives(folder.as_ref());

    let per_archive: Vec<Vec<(String, LangFile)>> = archives
        .par_iter()
        .map(|path| read_archive_langs(path))
        .collect();

    let mut table = LocalizationTable::new();
    for (source, lang) in per_archive.into_iter().flatten() {
        table.merge(&source, lang);
    }
    tracing::info!(
        "loaded {} keys for {} sources from {} archives",
        table.key_count(),
        table.source_count(),
        archives.len()
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lang_file_keeps_only_strings() {
        let lang = LangFile::from_str(r#"{"item.a.x": "X", "item.a.n": 3, "item.a.o": {}}"#).unwrap();
        assert_eq!(lang.len(), 1);
        assert_eq!(lang.get("item.a.x"), Some("X"));
    }

    #[test]
    fn test_lang_file_rejects_non_object() {
        assert!(LangFile::from_str(r#"["item.a.x"]"#).is_err());
        assert!(LangFile::from_str("{ broken").is_err());
    }

    #[test]
    fn test_lang_file_accepts_bom() {
        let lang = LangFile::from_bytes(b"\xEF\xBB\xBF{\"k\": \"v\"}").unwrap();
        assert_eq!(lang.get("k"), Some("v"));
    }

    #[test]
    fn test_source_of_member() {
        assert_eq!(source_of_member("assets/modA/lang/en_us.json"), Some("modA"));
        assert_eq!(source_of_member("assets/modA/lang/fr_fr.json"), None);
        assert_eq!(source_of_member("data/modA/lang/en_us.json"), None);
        assert_eq!(source_of_member("assets/lang/en_us.json"), None);
        assert_eq!(
            source_of_member("assets/modA/extra/lang/en_us.json"),
            Some("modA")
        );
    }

    #[test]
    fn test_table_merge_last_wins() {
        let mut table = LocalizationTable::new();
        table.merge("modA", LangFile::from_iter([("item.modA.x", "Old"), ("item.modA.y", "Y")]));
        table.merge("modA", LangFile::from_iter([("item.modA.x", "New")]));
        assert_eq!(table.get("modA", "item.modA.x"), Some("New"));
        assert_eq!(table.get("modA", "item.modA.y"), Some("Y"));
        assert_eq!(table.get("modB", "item.modA.x"), None);
        assert_eq!(table.source_count(), 1);
        assert_eq!(table.key_count(), 2);
    }

    fn write_jar(path: &Path, members: &[(&str, &str)]) {
        use std::io::Write;
        use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

        let mut zip = ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, contents) in members {
            zip.start_file(*name, options).unwrap();
            zip.write_all(contents.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_load_source_localizations_merges_archives_in_order() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mods = temp_dir.path();
        write_jar(
            &mods.join("a_first.jar"),
            &[
                ("assets/modA/lang/en_us.json", r#"{"item.modA.x": "First", "item.modA.y": "Y"}"#),
                ("assets/modA/lang/de_de.json", r#"{"item.modA.x": "Erste"}"#),
                ("assets/shared/lang/en_us.json", r#"{"item.shared.z": "Z"}"#),
            ],
        );
        write_jar(
            &mods.join("b_second.ZIP"),
            &[("assets/modA/lang/en_us.json", r#"{"item.modA.x": "Second"}"#)],
        );
        std::fs::write(mods.join("c_broken.jar"), b"not an archive").unwrap();
        std::fs::write(mods.join("notes.json"), b"{}").unwrap();

        let table = load_source_localizations(mods);

        assert_eq!(table.get("modA", "item.modA.x"), Some("Second"));
        assert_eq!(table.get("modA", "item.modA.y"), Some("Y"));
        assert_eq!(table.get("shared", "item.shared.z"), Some("Z"));
        assert!(table.has_source("shared"));
        assert_eq!(table.source_count(), 2);
    }

    #[test]
    fn test_missing_sources_folder_is_empty() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let table = load_source_localizations(temp_dir.path().join("absent"));
        assert_eq!(table.source_count(), 0);
    }

    #[test]
    fn test_is_archive() {
        assert!(is_archive(Path::new("mods/a.jar")));
        assert!(is_archive(Path::new("mods/b.ZIP")));
        assert!(!is_archive(Path::new("mods/c.json")));
        assert!(!is_archive(Path::new("mods/jar")));
    }
}
