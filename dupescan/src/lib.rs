#![forbid(unsafe_code)]
//! Cross-mod display-name collision scanner.
//!
//! Reads the identifiers a registry dump exported, resolves each one to the
//! English name a player would see, and reports names shared by identifiers
//! from two or more different mods. A resource pack can be layered on top to
//! check whether its renames fix the collisions.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use dupescan::{ScanConfig, TracingSink, run_scan};
//!
//! let config = ScanConfig::new("dump/items", "mods", "reports")
//!     .with_overlay(Some("resourcepacks/fixes.zip".into()))
//!     .with_excluded_sources(["minecraft"]);
//! let summary = run_scan(&config, &mut TracingSink)?;
//! println!("{} groups before, {} after", summary.groups_before, summary.groups_after);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Pipeline
//!
//! - [`extract`]: registry JSON documents to [`Entry`] values
//! - [`localization`]: `assets/<source>/lang/en_us.json` from every mod archive
//! - [`overlay`]: the resource pack's language files merged into one table
//! - [`resolve`]: before/after display names, with a synthesized fallback
//! - [`grouping`]: cross-source collisions under the [`ComparisonRules`]
//! - [`report`]: four plain-text reports, byte-for-byte reproducible

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod extract;
pub mod grouping;
pub mod localization;
pub mod operations;
pub mod overlay;
pub mod report;
pub mod resolve;
pub mod traits;
pub mod types;

// Re-export most used types for easy consumption
pub use crate::{
    config::{ScanConfig, parse_source_list},
    diagnostics::{Diagnostic, DiagnosticSink, TracingSink},
    error::Error,
    extract::{find_registry_dirs, pick_registry_dir, scan_registry},
    grouping::{group_duplicates, index_by_source},
    localization::{LangFile, LocalizationTable, load_source_localizations},
    operations::{ScanSummary, run_scan},
    overlay::{OverlayMatch, OverlayTable, load_overlay},
    report::{ReportPaths, write_reports},
    resolve::{fallback_name, resolve_names},
    traits::Parser,
    types::{ComparisonRules, DuplicateGroups, Entry, Kind, NameResolution},
};
