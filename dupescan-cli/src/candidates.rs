use std::path::Path;

use dupescan::{Kind, find_registry_dirs, pick_registry_dir};

/// Lists the registry folders found under `dump_root` with their inferred
/// kind. The folder `scan --dump-root` would use is marked with `*`.
pub fn run_candidates_command(dump_root: &Path) -> Result<(), String> {
    if !dump_root.is_dir() {
        return Err(format!("Dump root not found: {}", dump_root.display()));
    }

    let candidates = find_registry_dirs(dump_root);
    let Some(picked) = pick_registry_dir(&candidates) else {
        println!("No folders with .json files found under {}", dump_root.display());
        return Ok(());
    };

    for candidate in &candidates {
        let marker = if candidate == picked { '*' } else { ' ' };
        println!(
            "{} {}  (kind={})",
            marker,
            candidate.display(),
            Kind::infer_from_path(candidate)
        );
    }
    Ok(())
}
