use crate::errors::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::collections::BTreeMap;
use std::path::Path;

/// Test files are never read as definition or implementation input.
const DEFAULT_EXCLUDES: &[&str] = &["*_test.go"];

fn exclude_set() -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in DEFAULT_EXCLUDES {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Discover Go definition files under `root/<dir>`, grouped by directory.
///
/// - Respects `.gitignore`
/// - Excludes test files
/// - Keys are directories relative to `root` (slash-separated), values are
///   sorted file basenames — deterministic across runs.
pub fn discover_packages(root: &Path, dir: &str) -> Result<BTreeMap<String, Vec<String>>> {
    let excludes = exclude_set()?;
    let start = root.join(dir);

    let walker = WalkBuilder::new(&start)
        .hidden(false)
        .git_ignore(true)
        .build();

    let mut packages: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!("Skipping unreadable entry: {err}");
                continue;
            }
        };

        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("go") {
            continue;
        }
        let Some(filename) = path.file_name().and_then(|f| f.to_str()) else {
            continue;
        };
        if excludes.is_match(Path::new(filename)) {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        let package_dir = relative
            .parent()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| ".".to_string());

        packages
            .entry(package_dir)
            .or_default()
            .push(filename.to_string());
    }

    for files in packages.values_mut() {
        files.sort();
    }

    Ok(packages)
}

/// List non-test Go files directly inside `dir`, sorted. `None` when the
/// directory does not exist.
pub fn list_package_files(dir: &Path) -> Result<Option<Vec<String>>> {
    let excludes = exclude_set()?;
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(crate::errors::ImplgenError::io("read directory", dir, err)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!("Skipping unreadable entry in {}: {err}", dir.display());
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("go") {
            continue;
        }
        let Some(filename) = path.file_name().and_then(|f| f.to_str()) else {
            continue;
        };
        if excludes.is_match(Path::new(filename)) {
            continue;
        }
        files.push(filename.to_string());
    }

    files.sort();
    Ok(Some(files))
}
