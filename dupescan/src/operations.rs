//! The full scan pipeline, shared by the CLI and library users.
//!
//! [`run_scan`] chains the stages: extract, exclude, load localizations, load
//! the overlay, resolve, group twice, write reports. Progress goes to the
//! caller's [`DiagnosticSink`] as it happens.

use serde::Serialize;

use crate::{
    config::ScanConfig,
    diagnostics::{Diagnostic, DiagnosticSink},
    error::Error,
    extract::scan_registry,
    grouping::group_duplicates,
    localization::load_source_localizations,
    overlay::{OverlayTable, load_overlay},
    report::{ReportInput, ReportPaths, write_reports},
    resolve::resolve_names,
    types::{ComparisonRules, DuplicateGroups, Kind, NameResolution},
};

/// What a scan found and where it wrote the results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub kind: Kind,
    /// Identifiers extracted before exclusion.
    pub extracted: usize,
    /// Identifiers removed by the exclusion list.
    pub excluded: usize,
    /// Distinct identifiers that went through resolution.
    pub identifiers: usize,
    pub localized_sources: usize,
    pub overlay_entries: usize,
    /// Identifiers named from the fallback rather than a language file.
    pub fallback_names: usize,
    pub groups_before: usize,
    pub groups_after: usize,
    pub changed: usize,
    /// `None` when nothing was left to scan and no report was written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reports: Option<ReportPaths>,
}

impl ScanSummary {
    fn empty(kind: Kind, extracted: usize, excluded: usize) -> Self {
        Self {
            kind,
            extracted,
            excluded,
            identifiers: 0,
            localized_sources: 0,
            overlay_entries: 0,
            fallback_names: 0,
            groups_before: 0,
            groups_after: 0,
            changed: 0,
            reports: None,
        }
    }
}

/// Groups computed by one scan, before and after the overlay.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanGroups {
    pub before: DuplicateGroups,
    pub after: DuplicateGroups,
}

/// Groups both passes of `names` under the same rules.
pub fn compute_groups(names: &NameResolution, rules: ComparisonRules) -> ScanGroups {
    ScanGroups {
        before: group_duplicates(&names.before, rules),
        after: group_duplicates(&names.after, rules),
    }
}

/// Runs a whole scan as described by `config`.
///
/// Configuration problems are reported before any file is read. Unreadable
/// registry documents, archives and language files are skipped. The only
/// other failure is writing a report.
pub fn run_scan(config: &ScanConfig, sink: &mut dyn DiagnosticSink) -> Result<ScanSummary, Error> {
    config.validate()?;
    config.prepare_output()?;

    let kind = config.kind();

    sink.report(Diagnostic::progress("Scanning registry folder..."));
    let mut entries = scan_registry(&config.registry_root);
    let extracted = entries.len();

    if !config.excluded_sources.is_empty() {
        entries.retain(|e| !config.excluded_sources.contains(&e.source));
        let excluded_list: Vec<&str> = config
            .excluded_sources
            .iter()
            .map(String::as_str)
            .collect();
        sink.report(Diagnostic::progress(format!(
            "Excluded sources: {} ({} entries removed)",
            excluded_list.join(", "),
            extracted - entries.len()
        )));
    }
    let excluded = extracted - entries.len();

    if entries.is_empty() {
        sink.report(Diagnostic::progress("No identifiers found in the registry folder."));
        return Ok(ScanSummary::empty(kind, extracted, excluded));
    }

    sink.report(Diagnostic::progress(format!(
        "Found {} identifiers. Loading source localizations...",
        entries.len()
    )));
    let localization = load_source_localizations(&config.sources_root);
    sink.report(Diagnostic::progress(format!(
        "Loaded localizations for {} sources.",
        localization.source_count()
    )));

    let overlay = if !config.overlay_enabled {
        sink.report(Diagnostic::progress("Overlay disabled (ignored)."));
        OverlayTable::new()
    } else if let Some(path) = config.active_overlay() {
        sink.report(Diagnostic::progress("Overlay enabled, loading overrides..."));
        let overlay = load_overlay(Some(path), config.overlay_match);
        sink.report(Diagnostic::progress(format!(
            "Loaded {} overlay entries.",
            overlay.len()
        )));
        overlay
    } else {
        sink.report(Diagnostic::progress("Overlay enabled but no overlay selected."));
        OverlayTable::new()
    };

    sink.report(Diagnostic::progress("Computing display names..."));
    let names = resolve_names(
        kind,
        &entries,
        &localization,
        &overlay,
        config.warn_on_missing_localization,
        sink,
    );
    let groups = compute_groups(&names, config.rules);

    sink.report(Diagnostic::progress("Writing reports..."));
    let paths = write_reports(
        &config.output_root,
        &ReportInput {
            kind,
            registry_root: &config.registry_root,
            rules: config.rules,
            names: &names,
            before: &groups.before,
            after: &groups.after,
        },
    )?;
    sink.report(Diagnostic::progress("Done."));

    Ok(ScanSummary {
        kind,
        extracted,
        excluded,
        identifiers: names.len(),
        localized_sources: localization.source_count(),
        overlay_entries: overlay.len(),
        fallback_names: names.synthesized.len(),
        groups_before: groups.before.len(),
        groups_after: groups.after.len(),
        changed: names.changes().len(),
        reports: Some(paths),
    })
}
