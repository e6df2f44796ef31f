//! Plain-text duplicate reports.
//!
//! Rendering is pure and deterministic: the same names and groups always give
//! the same bytes. [`write_reports`] puts the four artifacts on disk and stops
//! at the first failure.

use std::{
    collections::{BTreeMap, HashSet},
    fs,
    path::{Component, Path, PathBuf},
};

use serde::Serialize;

use crate::{
    error::Error,
    grouping::index_by_source,
    types::{ComparisonRules, DuplicateGroups, Kind, NameResolution},
};

pub const BASELINE_FILE: &str = "BASELINE_duplicates.txt";
pub const AFTER_FILE: &str = "AFTER_RP_duplicates.txt";
pub const BY_SOURCE_DIR: &str = "by_mod_AFTER_RP";
pub const SOURCE_INDEX_FILE: &str = "_index.txt";
pub const CHANGES_FILE: &str = "RP_changes_diff.txt";

/// Everything the reports are rendered from.
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub kind: Kind,
    pub registry_root: &'a Path,
    pub rules: ComparisonRules,
    pub names: &'a NameResolution,
    pub before: &'a DuplicateGroups,
    pub after: &'a DuplicateGroups,
}

/// Where [`write_reports`] put each artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportPaths {
    pub baseline: PathBuf,
    pub after: PathBuf,
    pub by_source_dir: PathBuf,
    pub changes: PathBuf,
}

impl ReportPaths {
    pub fn new(output_root: &Path) -> Self {
        Self {
            baseline: output_root.join(BASELINE_FILE),
            after: output_root.join(AFTER_FILE),
            by_source_dir: output_root.join(BY_SOURCE_DIR),
            changes: output_root.join(CHANGES_FILE),
        }
    }
}

fn settings_line(rules: ComparisonRules) -> String {
    format!(
        "# Compare settings: case_insensitive={}, underscores_as_spaces={}",
        rules.case_insensitive, rules.underscores_as_spaces
    )
}

fn finish(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// One block per group, each id annotated with its after-overlay name.
fn push_annotated_groups(
    lines: &mut Vec<String>,
    groups: &DuplicateGroups,
    names: &NameResolution,
) {
    for (name, ids) in groups.iter() {
        lines.push(name.to_string());
        for id in ids {
            let now = names.after.get(id).map_or("", String::as_str);
            let mark = if names.is_changed(id) { " (changed)" } else { "" };
            lines.push(format!("  - {}  -> \"{}\"{}", id, now, mark));
        }
        lines.push(String::new());
    }
}

/// Absolute form of `path` with `.` and `..` folded away lexically.
fn normalized_absolute(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Duplicates before any overlay is applied.
pub fn render_baseline(input: &ReportInput<'_>) -> String {
    let scanned = normalized_absolute(input.registry_root);

    let mut lines = vec![
        format!(
            "# Baseline duplicates by name (before overlay) | kind={} | scanned: {}",
            input.kind,
            scanned.display()
        ),
        settings_line(input.rules),
        String::new(),
    ];
    for (name, ids) in input.before.iter() {
        lines.push(name.to_string());
        lines.extend(ids.iter().map(|id| format!("  - {}", id)));
        lines.push(String::new());
    }
    finish(lines)
}

/// Duplicates once the overlay has renamed things.
pub fn render_after(input: &ReportInput<'_>) -> String {
    let mut lines = vec![
        format!("# Duplicates by name after applying overlay | kind={}", input.kind),
        settings_line(input.rules),
        String::new(),
    ];
    push_annotated_groups(&mut lines, input.after, input.names);
    finish(lines)
}

/// Preferred file name of a source's breakdown. Anything but `[A-Za-z0-9_.-]`
/// becomes `_`.
pub fn source_file_name(source: &str) -> String {
    let stem: String = source
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}.txt", stem)
}

/// Sources in report order: case-insensitive, ties broken ordinally.
fn sorted_sources(index: &BTreeMap<String, DuplicateGroups>) -> Vec<&str> {
    let mut sources: Vec<&str> = index.keys().map(String::as_str).collect();
    sources.sort_by_cached_key(|s| (s.to_lowercase(), s.to_string()));
    sources
}

/// Assigns every source its breakdown file, in report order.
///
/// Names that clash once sanitized, compared ignoring case, get `-2`, `-3`
/// and so on appended, so no two sources ever share a file.
pub fn source_file_names(index: &BTreeMap<String, DuplicateGroups>) -> Vec<(&str, String)> {
    let mut taken = HashSet::new();
    sorted_sources(index)
        .into_iter()
        .map(|source| {
            let preferred = source_file_name(source);
            let stem = preferred.trim_end_matches(".txt").to_string();
            let mut file_name = preferred;
            let mut suffix = 2;
            while !taken.insert(file_name.to_lowercase()) {
                file_name = format!("{}-{}.txt", stem, suffix);
                suffix += 1;
            }
            (source, file_name)
        })
        .collect()
}

pub fn render_source_index(files: &[(&str, String)]) -> String {
    let mut lines = vec!["# Per-source duplicate report (after overlay)".to_string()];
    lines.extend(
        files
            .iter()
            .map(|(source, file_name)| format!("{}: {}", source, file_name)),
    );
    finish(lines)
}

pub fn render_source_report(
    source: &str,
    groups: &DuplicateGroups,
    names: &NameResolution,
) -> String {
    let mut lines = vec![
        format!("# Duplicates for source after overlay: {}", source),
        String::new(),
    ];
    push_annotated_groups(&mut lines, groups, names);
    finish(lines)
}

/// Every id whose name the overlay changed, sorted by id.
pub fn render_changes(names: &NameResolution) -> String {
    let mut lines = vec![
        "# Identifiers whose display name changed due to overlay".to_string(),
        String::new(),
    ];
    for change in names.changes() {
        lines.push(change.id.to_string());
        lines.push(format!("  BEFORE: {}", change.before.unwrap_or("<missing>")));
        lines.push(format!("  AFTER : {}", change.after.unwrap_or("<missing>")));
        lines.push(String::new());
    }
    finish(lines)
}

fn write_file(path: &Path, contents: &str) -> Result<(), Error> {
    fs::write(path, contents).map_err(|e| Error::write(path, e))?;
    tracing::debug!("wrote {}", path.display());
    Ok(())
}

fn create_dir(path: &Path) -> Result<(), Error> {
    fs::create_dir_all(path).map_err(|e| Error::write(path, e))
}

/// Writes all four reports below `output_root`, creating directories as
/// needed and overwriting older reports.
///
/// Files written before a failure are left in place.
pub fn write_reports<P: AsRef<Path>>(
    output_root: P,
    input: &ReportInput<'_>,
) -> Result<ReportPaths, Error> {
    let output_root = output_root.as_ref();
    let paths = ReportPaths::new(output_root);

    create_dir(output_root)?;
    write_file(&paths.baseline, &render_baseline(input))?;
    write_file(&paths.after, &render_after(input))?;

    let index = index_by_source(input.after);
    let files = source_file_names(&index);
    create_dir(&paths.by_source_dir)?;
    write_file(
        &paths.by_source_dir.join(SOURCE_INDEX_FILE),
        &render_source_index(&files),
    )?;
    for (source, file_name) in &files {
        write_file(
            &paths.by_source_dir.join(file_name),
            &render_source_report(source, &index[*source], input.names),
        )?;
    }

    write_file(&paths.changes, &render_changes(input.names))?;
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::group_duplicates;

    fn resolution(rows: &[(&str, &str, &str)]) -> NameResolution {
        let mut names = NameResolution::default();
        for (id, before, after) in rows {
            names.before.insert(id.to_string(), before.to_string());
            names.after.insert(id.to_string(), after.to_string());
        }
        names
    }

    #[test]
    fn test_render_after_marks_changes() {
        let names = resolution(&[
            ("modA:apple", "Apple", "Golden Apple"),
            ("modB:golden_apple", "Golden Apple", "Golden Apple"),
        ]);
        let rules = ComparisonRules::default();
        let before = group_duplicates(&names.before, rules);
        let after = group_duplicates(&names.after, rules);
        let input = ReportInput {
            kind: Kind::Item,
            registry_root: Path::new("dump/items"),
            rules,
            names: &names,
            before: &before,
            after: &after,
        };

        assert_eq!(
            render_after(&input),
            "# Duplicates by name after applying overlay | kind=item\n\
             # Compare settings: case_insensitive=true, underscores_as_spaces=true\n\
             \n\
             golden apple\n  \
             - modA:apple  -> \"Golden Apple\" (changed)\n  \
             - modB:golden_apple  -> \"Golden Apple\"\n\
             \n"
        );
    }

    #[test]
    fn test_render_baseline_lists_sorted_ids() {
        let names = resolution(&[
            ("modB:z", "Beta", "Beta"),
            ("modA:y", "beta", "beta"),
            ("modC:x", "Alpha", "Alpha"),
            ("modD:w", "ALPHA", "ALPHA"),
        ]);
        let rules = ComparisonRules::default();
        let before = group_duplicates(&names.before, rules);
        let input = ReportInput {
            kind: Kind::Block,
            registry_root: Path::new("dump/blocks"),
            rules,
            names: &names,
            before: &before,
            after: &before,
        };
        let rendered = render_baseline(&input);
        let body: Vec<&str> = rendered.lines().skip(3).collect();
        assert_eq!(
            body,
            vec!["alpha", "  - modC:x", "  - modD:w", "", "beta", "  - modA:y", "  - modB:z", ""]
        );
        assert!(rendered.starts_with(
            "# Baseline duplicates by name (before overlay) | kind=block | scanned: "
        ));
    }

    #[test]
    fn test_render_changes() {
        let names = resolution(&[
            ("modB:pear", "Pear", "Pear"),
            ("modA:apple", "Apple", "Golden Apple"),
        ]);
        assert_eq!(
            render_changes(&names),
            "# Identifiers whose display name changed due to overlay\n\
             \n\
             modA:apple\n  \
             BEFORE: Apple\n  \
             AFTER : Golden Apple\n\
             \n"
        );
    }

    #[test]
    fn test_source_index_and_file_names() {
        let names = resolution(&[("zeta:a", "Gem", "Gem"), ("Alpha:b", "Gem", "Gem")]);
        let groups = group_duplicates(&names.after, ComparisonRules::default());
        let index = index_by_source(&groups);
        assert_eq!(
            render_source_index(&source_file_names(&index)),
            "# Per-source duplicate report (after overlay)\nAlpha: Alpha.txt\nzeta: zeta.txt\n"
        );
        assert_eq!(source_file_name("we/ird mod"), "we_ird_mod.txt");
    }

    #[test]
    fn test_clashing_source_file_names_are_made_unique() {
        let names = resolution(&[
            ("mod a:x", "Gem", "Gem"),
            ("modB:y", "Gem", "Gem"),
            ("mod_a:z", "Ore", "Ore"),
            ("modC:w", "Ore", "Ore"),
        ]);
        let groups = group_duplicates(&names.after, ComparisonRules::default());
        let index = index_by_source(&groups);
        let files = source_file_names(&index);
        let chosen: Vec<(&str, &str)> = files
            .iter()
            .map(|(source, file_name)| (*source, file_name.as_str()))
            .collect();
        assert_eq!(
            chosen,
            vec![
                ("mod a", "mod_a.txt"),
                ("mod_a", "mod_a-2.txt"),
                ("modB", "modB.txt"),
                ("modC", "modC.txt"),
            ]
        );

        let temp_dir = tempfile::TempDir::new().unwrap();
        let input = ReportInput {
            kind: Kind::Item,
            registry_root: Path::new("dump/items"),
            rules: ComparisonRules::default(),
            names: &names,
            before: &groups,
            after: &groups,
        };
        let paths = write_reports(temp_dir.path(), &input).unwrap();

        let index_text = fs::read_to_string(paths.by_source_dir.join(SOURCE_INDEX_FILE)).unwrap();
        assert!(index_text.contains("mod a: mod_a.txt\n"));
        assert!(index_text.contains("mod_a: mod_a-2.txt\n"));
        let first = fs::read_to_string(paths.by_source_dir.join("mod_a.txt")).unwrap();
        assert!(first.starts_with("# Duplicates for source after overlay: mod a\n"));
        assert!(first.contains("  - mod a:x  -> \"Gem\"\n"));
        let second = fs::read_to_string(paths.by_source_dir.join("mod_a-2.txt")).unwrap();
        assert!(second.contains("  - mod_a:z  -> \"Ore\"\n"));
    }

    #[test]
    fn test_baseline_header_folds_parent_segments() {
        let names = NameResolution::default();
        let groups = DuplicateGroups::default();
        let input = ReportInput {
            kind: Kind::Item,
            registry_root: Path::new("dump/../dump/./items"),
            rules: ComparisonRules::default(),
            names: &names,
            before: &groups,
            after: &groups,
        };
        let rendered = render_baseline(&input);
        let header = rendered.lines().next().unwrap();
        let expected = std::path::absolute("dump/items").unwrap();
        assert!(
            header.ends_with(&format!("scanned: {}", expected.display())),
            "{}",
            header
        );
        assert!(!header.contains(".."));
    }
}
