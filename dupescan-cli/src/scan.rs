use std::path::PathBuf;

use clap::Args;
use dupescan::{Diagnostic, DiagnosticSink, Kind, OverlayMatch, ScanSummary, run_scan};
use dupescan_cli::Settings;
use indicatif::{ProgressBar, ProgressStyle};

/// Flags of the `scan` subcommand. Every flag left out keeps the value from
/// the settings file, or the default.
#[derive(Args, Debug, Clone, Default)]
pub struct ScanArgs {
    /// Settings file to start from (JSON, or TOML by extension)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the effective settings to this file before scanning
    #[arg(long, value_name = "FILE")]
    pub save_config: Option<PathBuf>,

    /// Registry folder to scan
    #[arg(short, long, value_name = "DIR")]
    pub registry: Option<PathBuf>,

    /// Dump root to pick the registry folder from when --registry is absent
    #[arg(long, value_name = "DIR")]
    pub dump_root: Option<PathBuf>,

    /// Folder holding the mod archives (.jar/.zip)
    #[arg(short, long, value_name = "DIR")]
    pub sources: Option<PathBuf>,

    /// Resource pack folder or archive applied on top ("none" disables it)
    #[arg(long, value_name = "PATH")]
    pub overlay: Option<PathBuf>,

    /// Ignore the overlay entirely
    #[arg(long)]
    pub no_overlay: bool,

    /// Only read overlay files at assets/<namespace>/lang/en_us.json
    #[arg(long)]
    pub strict_overlay: bool,

    /// Folder receiving the reports
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Compare names ignoring case
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub case_insensitive: Option<bool>,

    /// Compare names treating `_` as a space
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub underscores_as_spaces: Option<bool>,

    /// Sources to leave out, comma-separated or repeated
    #[arg(long = "exclude", value_name = "SRC", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Report identifiers without a language entry
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub warn_missing: Option<bool>,

    /// Registry kind (item, block, entity, biome, worldgen); inferred when omitted
    #[arg(long)]
    pub kind: Option<Kind>,

    /// Print the scan summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl ScanArgs {
    /// Lays the flags over `settings`.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(registry) = &self.registry {
            settings.registry = Some(registry.clone());
        }
        if let Some(dump_root) = &self.dump_root {
            settings.dump_root = Some(dump_root.clone());
            if self.registry.is_none() {
                settings.registry = None;
            }
        }
        if let Some(sources) = &self.sources {
            settings.sources = Some(sources.clone());
        }
        if let Some(overlay) = &self.overlay {
            settings.overlay = Some(overlay.clone());
        }
        if self.no_overlay {
            settings.overlay_enabled = false;
        }
        if self.strict_overlay {
            settings.overlay_match = OverlayMatch::Strict;
        }
        if let Some(output) = &self.output {
            settings.output = Some(output.clone());
        }
        if let Some(value) = self.case_insensitive {
            settings.case_insensitive = value;
        }
        if let Some(value) = self.underscores_as_spaces {
            settings.underscores_as_spaces = value;
        }
        if !self.exclude.is_empty() {
            settings.excluded_sources = self
                .exclude
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(value) = self.warn_missing {
            settings.warn_missing = value;
        }
        if self.kind.is_some() {
            settings.kind = self.kind;
        }
    }
}

/// Shows progress on a spinner and prints missing-key warnings above it.
struct SpinnerSink {
    progress_bar: ProgressBar,
}

impl DiagnosticSink for SpinnerSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::Progress(message) => {
                tracing::info!("{}", message);
                self.progress_bar.set_message(message.clone());
            }
            Diagnostic::MissingLocalization { .. } => {
                self.progress_bar.suspend(|| eprintln!("{}", diagnostic));
            }
        }
    }
}

fn print_summary(summary: &ScanSummary) {
    println!(
        "Scanned {} identifiers (kind={}, {} excluded).",
        summary.identifiers, summary.kind, summary.excluded
    );
    println!(
        "Duplicate groups: {} before overlay, {} after ({} names changed).",
        summary.groups_before, summary.groups_after, summary.changed
    );
    if let Some(reports) = &summary.reports {
        println!("Reports written:");
        println!("- {}", reports.baseline.display());
        println!("- {}", reports.after.display());
        println!("- {}", reports.by_source_dir.display());
        println!("- {}", reports.changes.display());
    }
}

/// Run the scan command: merge settings and flags, scan, print the outcome.
pub fn run_scan_command(args: ScanArgs) -> Result<(), String> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    args.apply(&mut settings);

    if let Some(path) = &args.save_config {
        settings.save(path)?;
        eprintln!("Settings saved to {}", path.display());
    }

    let config = settings.to_scan_config()?;

    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    let mut sink = SpinnerSink {
        progress_bar: progress_bar.clone(),
    };

    let summary = match run_scan(&config, &mut sink) {
        Ok(summary) => summary,
        Err(e) => {
            progress_bar.finish_and_clear();
            return Err(e.to_string());
        }
    };
    progress_bar.finish_and_clear();

    if args.json {
        let text = serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?;
        println!("{}", text);
        return Ok(());
    }

    if summary.reports.is_none() {
        println!("No identifiers found in the selected registry folder.");
        return Ok(());
    }
    print_summary(&summary);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_settings() {
        let mut settings = Settings {
            registry: Some(PathBuf::from("old/items")),
            excluded_sources: ["modA".to_string()].into_iter().collect(),
            ..Settings::default()
        };
        let args = ScanArgs {
            dump_root: Some(PathBuf::from("dump")),
            exclude: vec!["modB".to_string(), " ".to_string()],
            case_insensitive: Some(false),
            no_overlay: true,
            ..ScanArgs::default()
        };
        args.apply(&mut settings);

        assert_eq!(settings.registry, None);
        assert_eq!(settings.dump_root, Some(PathBuf::from("dump")));
        assert_eq!(settings.excluded_sources.iter().collect::<Vec<_>>(), vec!["modB"]);
        assert!(!settings.case_insensitive);
        assert!(settings.underscores_as_spaces);
        assert!(!settings.overlay_enabled);
    }

    #[test]
    fn test_unset_flags_keep_settings() {
        let mut settings = Settings {
            warn_missing: true,
            kind: Some(Kind::Entity),
            ..Settings::default()
        };
        let before = settings.clone();
        ScanArgs::default().apply(&mut settings);
        assert_eq!(settings, before);
    }
}
