//! Identifier to display-name resolution.
//!
//! Lookup order for the `before` pass: the source's own language table, then
//! a name synthesized from the identifier. The `after` pass puts the overlay
//! on top of that.

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    diagnostics::{Diagnostic, DiagnosticSink},
    localization::LocalizationTable,
    overlay::OverlayTable,
    types::{Entry, Kind, NameResolution},
};

lazy_static! {
    static ref FRAGMENT_SEPARATORS: Regex = Regex::new(r"[_\-.]+").unwrap();
}

/// Upper-cases the first character and lower-cases the rest.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Builds a readable name from an identifier: `modA:pear_jelly` becomes
/// `Pear Jelly`, `modA:block/stone-brick` becomes `Block Stone Brick`.
pub fn fallback_name(id: &str) -> String {
    let path = id.split_once(':').map_or(id, |(_, path)| path);
    let path = path.trim().replace('/', "_");

    let words: Vec<String> = FRAGMENT_SEPARATORS
        .split(&path)
        .filter(|fragment| !fragment.is_empty())
        .map(capitalize)
        .collect();

    if words.is_empty() {
        capitalize(&path)
    } else {
        words.join(" ")
    }
}

/// Resolves one entry at a time against fixed tables.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    pub kind: Kind,
    pub localization: &'a LocalizationTable,
    pub overlay: &'a OverlayTable,
}

/// Both names of a single entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub key: String,
    pub before: String,
    pub after: String,
    pub synthesized: bool,
}

impl<'a> Resolver<'a> {
    pub fn new(
        kind: Kind,
        localization: &'a LocalizationTable,
        overlay: &'a OverlayTable,
    ) -> Self {
        Self {
            kind,
            localization,
            overlay,
        }
    }

    pub fn resolve(&self, entry: &Entry) -> ResolvedName {
        let key = entry.localization_key(self.kind);

        let native = self
            .localization
            .get(&entry.source, &key)
            .filter(|text| !text.is_empty());
        let (before, synthesized) = match native {
            Some(text) => (text.to_string(), false),
            None => (fallback_name(&entry.id), true),
        };

        let after = self
            .overlay
            .get(&key)
            .map_or_else(|| before.clone(), str::to_string);

        ResolvedName {
            key,
            before,
            after,
            synthesized,
        }
    }
}

/// Resolves every entry's `before` and `after` display names.
///
/// With `warn_missing` set, each synthesized name is reported to `sink` as
/// [`Diagnostic::MissingLocalization`]. The flag never changes the names.
pub fn resolve_names(
    kind: Kind,
    entries: &[Entry],
    localization: &LocalizationTable,
    overlay: &OverlayTable,
    warn_missing: bool,
    sink: &mut dyn DiagnosticSink,
) -> NameResolution {
    let resolver = Resolver::new(kind, localization, overlay);
    let mut names = NameResolution::default();

    for entry in entries {
        let resolved = resolver.resolve(entry);
        if resolved.synthesized {
            if warn_missing {
                sink.report(Diagnostic::MissingLocalization {
                    id: entry.id.clone(),
                    key: resolved.key.clone(),
                });
            }
            names.synthesized.insert(entry.id.clone());
        }
        names.before.insert(entry.id.clone(), resolved.before);
        names.after.insert(entry.id.clone(), resolved.after);
    }

    names
}
