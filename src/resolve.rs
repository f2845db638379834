//! Import-path and module-root resolution.
//!
//! Go import paths are always slash-separated, so package paths are carried
//! as plain strings here and only turned into `Path`s at the filesystem edge.

use crate::errors::{ImplgenError, Result};
use crate::model::Import;
use std::path::{Path, PathBuf};

/// Module root of the run, resolved once from go.mod and passed to every
/// component that needs import-path computation.
#[derive(Debug, Clone)]
pub struct ModuleRoot {
    /// Module path declared in go.mod (e.g. `github.com/user/project`)
    pub module: String,
}

impl ModuleRoot {
    /// Walk upward from `start` until a go.mod is found and read its module
    /// path. Reaching the filesystem root without one is fatal.
    pub fn discover(start: &Path) -> Result<Self> {
        let mut dir = start.to_path_buf();
        loop {
            let go_mod = dir.join("go.mod");
            match std::fs::read_to_string(&go_mod) {
                Ok(content) => {
                    let module = parse_go_mod_module(&content).ok_or_else(|| {
                        ImplgenError::ParseError {
                            file: go_mod.clone(),
                            message: "no module directive found".to_string(),
                        }
                    })?;
                    return Ok(ModuleRoot { module });
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    if !dir.pop() {
                        return Err(ImplgenError::NoGoMod {
                            start: start.to_path_buf(),
                        });
                    }
                }
                Err(err) => return Err(ImplgenError::io("read", go_mod, err)),
            }
        }
    }

    /// Canonical import path for a package directory relative to the project
    /// root, plus the alias it should be referenced by.
    ///
    /// The alias is the directory basename with underscores removed; it is
    /// empty when that equals the basename (no alias needed). An import of
    /// the same path already present in `existing_imports` wins and supplies
    /// its alias verbatim.
    pub fn local_package(
        &self,
        package_path: &str,
        existing_imports: &[Import],
    ) -> (String, String) {
        let import_path = join_slash(&self.module, package_path);

        for imp in existing_imports {
            if imp.path == import_path {
                return (import_path, imp.alias.clone());
            }
        }

        let base = base_name(package_path);
        let alias = base.replace('_', "");
        if alias == base {
            (import_path, String::new())
        } else {
            (import_path, alias)
        }
    }
}

/// Parse the module path from go.mod content.
pub fn parse_go_mod_module(content: &str) -> Option<String> {
    for line in content.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("module ") {
            return Some(rest.trim().to_string());
        }
    }
    None
}

/// Map a definition package path to its implementation package path by
/// replacing the api-root prefix with the impl root. A definition package
/// outside the api root is a configuration error.
pub fn impl_package_path(api_root: &str, impl_root: &str, package_path: &str) -> Result<String> {
    let api_root = clean_slash(api_root);
    let impl_root = clean_slash(impl_root);
    let package_path = clean_slash(package_path);

    let mut result = impl_root.clone();
    let root_parts: Vec<&str> = if api_root == "." {
        Vec::new()
    } else {
        api_root.split('/').collect()
    };

    for (i, part) in package_path.split('/').enumerate() {
        if part == "." {
            continue;
        }
        if i < root_parts.len() {
            if root_parts[i] != part {
                return Err(ImplgenError::NotNested {
                    package_path,
                    api_root,
                });
            }
            continue;
        }
        result = join_slash(&result, part);
    }
    Ok(result)
}

/// Join slash-separated path segments, skipping empties and `.`.
pub fn join_slash(a: &str, b: &str) -> String {
    let a = clean_slash(a);
    let b = clean_slash(b);
    if a.is_empty() || a == "." {
        return b;
    }
    if b.is_empty() || b == "." {
        return a;
    }
    format!("{a}/{b}")
}

/// Last segment of a slash-separated path.
pub fn base_name(path: &str) -> String {
    clean_slash(path)
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

fn clean_slash(path: &str) -> String {
    let trimmed = path
        .trim_start_matches("./")
        .trim_matches('/')
        .trim_end_matches("/.");
    if trimmed.is_empty() {
        ".".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Filesystem location of a slash-separated project-relative path.
pub fn fs_path(root: &Path, package_path: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for part in clean_slash(package_path).split('/') {
        if part != "." {
            path.push(part);
        }
    }
    path
}
