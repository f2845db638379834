//! Line-preserving merge of rendered declarations into an implementation file.
//!
//! The original file is treated as an opaque line stream: everything through
//! the package declaration is copied first, a recomputed import block is
//! injected, the remaining lines pass through verbatim, and new declarations
//! are appended at the end. Existing lines are never reordered or deleted.

use crate::errors::Result;
use crate::generate::render;
use crate::model::{ContractImpl, Import, Method};
use crate::parse;
use crate::resolve::{join_slash, ModuleRoot};
use std::path::Path;

const NEW_FILE_PREAMBLE: &str = "\
// This file will be automatically regenerated based on the API. Any repository implementations
// will be copied through when generating and new methods will be added to the end.
";

/// Merge the given records into the implementation file's existing text (or
/// a fresh header when the file does not exist yet), returning the complete
/// replacement text. All records are assumed to target the same file.
pub fn merge_impl_file(
    original: Option<&str>,
    file: &Path,
    records: &mut [ContractImpl],
    module: &ModuleRoot,
) -> Result<String> {
    if records.is_empty() {
        return Ok(original.unwrap_or_default().to_string());
    }

    let existing_imports = match original {
        Some(src) => {
            let tree = parse::parse_source(src.as_bytes(), file)?;
            parse::extract_imports(src.as_bytes(), &tree)?
        }
        None => Vec::new(),
    };

    // Resolve the source-package import for each record up front; when the
    // destination file already aliases it, rendered references must follow.
    let mut api_imports = Vec::with_capacity(records.len());
    for record in records.iter_mut() {
        let (path, alias) =
            module.local_package(&record.contract.package_path, &existing_imports);
        if !alias.is_empty() {
            record.contract.package = alias.clone();
        }
        api_imports.push(Import::new(&alias, &path));
    }

    let new_methods: Vec<Vec<Method>> = records.iter().map(|r| r.new_methods()).collect();
    let required = required_imports(records, &api_imports, &new_methods, &existing_imports);

    let mut out = String::new();

    match original {
        Some(src) => {
            let mut lines = src.lines();
            for line in lines.by_ref() {
                out.push_str(line);
                out.push('\n');
                if line.starts_with("package") {
                    break;
                }
            }
            push_import_block(&mut out, &required, module);
            for line in lines {
                out.push_str(line);
                out.push('\n');
            }
        }
        None => {
            out.push_str(NEW_FILE_PREAMBLE);
            out.push_str("package ");
            out.push_str(&records[0].impl_package);
            out.push('\n');
            push_import_block(&mut out, &required, module);
        }
    }

    for record in records.iter() {
        if record.is_new {
            out.push('\n');
            out.push_str(&render::render_di_block(&record.contract));
        }
    }
    for (record, methods) in records.iter().zip(&new_methods) {
        for method in methods {
            out.push('\n');
            out.push_str(&render::render_method_stub(&record.contract, method));
        }
    }

    Ok(out)
}

/// Imports needed by the declarations about to be appended, minus whatever
/// the file already imports. Nothing new to append means nothing required,
/// which keeps an untouched regeneration byte-identical.
fn required_imports(
    records: &[ContractImpl],
    api_imports: &[Import],
    new_methods: &[Vec<Method>],
    existing: &[Import],
) -> Vec<Import> {
    let mut required: Vec<Import> = Vec::new();
    let mut add = |imp: Import| {
        if !required.iter().any(|r| r.path == imp.path) {
            required.push(imp);
        }
    };

    for ((record, api_import), methods) in records.iter().zip(api_imports).zip(new_methods) {
        let uses_pkg = |m: &Method| {
            m.params
                .iter()
                .chain(&m.returns)
                .any(|p| uses_qualifier(&p.ty, &record.contract.package))
        };

        if record.is_new {
            add(Import::new("", "go.uber.org/fx"));
            add(api_import.clone());
        } else if methods.iter().any(uses_pkg) {
            add(api_import.clone());
        }

        for method in methods {
            if render::has_ctx(&method.params) {
                add(Import::new("", "context"));
                add(Import::new("", "go.opentelemetry.io/otel"));
                if render::has_error(&method.returns) {
                    add(Import::new("", "go.opentelemetry.io/otel/codes"));
                }
            }
            if render::has_error(&method.returns) {
                add(Import::new("", "github.com/rotisserie/eris"));
            }
        }

        // Imports of the definition file that the new signatures reference.
        if !methods.is_empty() {
            for imp in &record.contract.imports {
                let used = methods.iter().any(|m| {
                    m.params
                        .iter()
                        .chain(&m.returns)
                        .any(|p| uses_qualifier(&p.ty, imp.reference_name()))
                });
                if used {
                    add(imp.clone());
                }
            }
        }
    }

    required
        .into_iter()
        .filter(|imp| !existing.iter().any(|e| e.path == imp.path))
        .collect()
}

/// True when `ty` references `name` as a package qualifier anywhere in the
/// type expression (`name.T`, `[]name.T`, `map[string]name.T`, `*name.T`),
/// but not as a suffix of a longer identifier.
fn uses_qualifier(ty: &str, name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    let needle = format!("{name}.");
    let mut from = 0;
    while let Some(pos) = ty[from..].find(&needle) {
        let at = from + pos;
        let boundary = ty[..at]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric() && c != '_' && c != '.');
        if boundary {
            return true;
        }
        from = at + needle.len();
    }
    false
}

/// Write a grouped import block: standard-library paths first, everything
/// else (external and module-local) after a blank line, each group sorted
/// by path.
pub(crate) fn push_import_block(out: &mut String, imports: &[Import], module: &ModuleRoot) {
    if imports.is_empty() {
        return;
    }
    let local_prefix = format!("{}/", module.module);
    let is_std = |imp: &&Import| {
        imp.path != module.module
            && !imp.path.starts_with(&local_prefix)
            && !imp.path.split('/').next().unwrap_or("").contains('.')
    };
    let mut std_group: Vec<&Import> = imports.iter().filter(is_std).collect();
    let mut ext_group: Vec<&Import> = imports.iter().filter(|i| !is_std(i)).collect();
    std_group.sort_by(|a, b| a.path.cmp(&b.path));
    ext_group.sort_by(|a, b| a.path.cmp(&b.path));

    out.push_str("\nimport (\n");
    for imp in &std_group {
        push_import_line(out, imp);
    }
    if !std_group.is_empty() && !ext_group.is_empty() {
        out.push('\n');
    }
    for imp in &ext_group {
        push_import_line(out, imp);
    }
    out.push_str(")\n");
}

fn push_import_line(out: &mut String, imp: &Import) {
    out.push('\t');
    if !imp.alias.is_empty() {
        out.push_str(&imp.alias);
        out.push(' ');
    }
    out.push('"');
    out.push_str(&imp.path);
    out.push_str("\"\n");
}

/// Mock-generation source path for a record's definition file.
pub fn mock_source(record: &ContractImpl) -> String {
    join_slash(&record.contract.package_path, &record.contract.filename)
}

/// Mock-generation destination path under the implementation package.
pub fn mock_destination(record: &ContractImpl) -> String {
    join_slash(
        &join_slash(&record.impl_package_path, "mocks"),
        &record.contract.filename,
    )
}
