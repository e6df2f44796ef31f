//! Options for a scan run.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    overlay::{OverlayMatch, is_overlay_disabled},
    types::{ComparisonRules, Kind},
};

/// Scratch file written and removed to prove the output folder accepts writes.
const WRITE_CHECK_FILE: &str = ".dupescan-write-check";

/// Everything [`crate::operations::run_scan`] needs to know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Folder of registry dump documents to scan.
    pub registry_root: PathBuf,
    /// Folder holding the mod archives whose language files are read.
    pub sources_root: PathBuf,
    /// Resource pack folder or archive. `None`, empty and `none` disable it.
    pub overlay_path: Option<PathBuf>,
    /// When `false` the overlay path is ignored entirely.
    pub overlay_enabled: bool,
    pub overlay_match: OverlayMatch,
    /// Folder receiving the reports.
    pub output_root: PathBuf,
    pub rules: ComparisonRules,
    /// Sources dropped right after extraction.
    pub excluded_sources: BTreeSet<String>,
    pub warn_on_missing_localization: bool,
    /// Explicit kind; inferred from `registry_root` when unset.
    pub kind: Option<Kind>,
}

impl ScanConfig {
    pub fn new(
        registry_root: impl Into<PathBuf>,
        sources_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            registry_root: registry_root.into(),
            sources_root: sources_root.into(),
            overlay_path: None,
            overlay_enabled: true,
            overlay_match: OverlayMatch::default(),
            output_root: output_root.into(),
            rules: ComparisonRules::default(),
            excluded_sources: BTreeSet::new(),
            warn_on_missing_localization: false,
            kind: None,
        }
    }

    pub fn with_overlay(mut self, overlay_path: Option<PathBuf>) -> Self {
        self.overlay_path = overlay_path;
        self
    }

    pub fn with_overlay_enabled(mut self, enabled: bool) -> Self {
        self.overlay_enabled = enabled;
        self
    }

    pub fn with_overlay_match(mut self, overlay_match: OverlayMatch) -> Self {
        self.overlay_match = overlay_match;
        self
    }

    pub fn with_rules(mut self, rules: ComparisonRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_excluded_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_sources = sources.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_warn_on_missing_localization(mut self, warn: bool) -> Self {
        self.warn_on_missing_localization = warn;
        self
    }

    pub fn with_kind(mut self, kind: Option<Kind>) -> Self {
        self.kind = kind;
        self
    }

    /// The kind governing this run.
    pub fn kind(&self) -> Kind {
        self.kind
            .unwrap_or_else(|| Kind::infer_from_path(&self.registry_root))
    }

    /// The overlay to load, if one is configured and switched on.
    pub fn active_overlay(&self) -> Option<&Path> {
        if !self.overlay_enabled {
            return None;
        }
        self.overlay_path
            .as_deref()
            .filter(|path| !is_overlay_disabled(path))
    }

    /// Checks the configured paths before any work starts.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.registry_root.is_dir() {
            return Err(Error::config(format!(
                "registry folder not found: {}",
                self.registry_root.display()
            )));
        }
        if !self.sources_root.is_dir() {
            return Err(Error::config(format!(
                "sources folder not found: {}",
                self.sources_root.display()
            )));
        }
        if let Some(overlay) = self.active_overlay()
            && !overlay.exists()
        {
            return Err(Error::config(format!(
                "overlay path not found: {}",
                overlay.display()
            )));
        }
        if self.output_root.as_os_str().is_empty() {
            return Err(Error::config("output folder is not set"));
        }
        Ok(())
    }

    /// Creates the output folder and checks that files can be written there.
    /// Either failure is a configuration error.
    pub fn prepare_output(&self) -> Result<(), Error> {
        fs::create_dir_all(&self.output_root).map_err(|e| {
            Error::config(format!(
                "cannot create output folder {}: {}",
                self.output_root.display(),
                e
            ))
        })?;
        let check = self.output_root.join(WRITE_CHECK_FILE);
        fs::write(&check, b"")
            .and_then(|()| fs::remove_file(&check))
            .map_err(|e| {
                Error::config(format!(
                    "output folder is not writable {}: {}",
                    self.output_root.display(),
                    e
                ))
            })
    }
}

/// Splits a comma-separated source list, dropping blanks.
pub fn parse_source_list(text: &str) -> BTreeSet<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
