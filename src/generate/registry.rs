//! Package-level registry file: mock directives plus aggregate fx wiring.

use crate::generate::merge::{mock_destination, mock_source, push_import_block};
use crate::model::{ContractImpl, Import, CONTRACT_SUFFIX};
use crate::resolve::{base_name, ModuleRoot};
use std::fmt::Write;

const REGISTRY_HEADER: &str = "\
// DO NOT MODIFY
// This file will be automatically regenerated based on the API.
";

/// Basename of the registry file under the implementation root.
pub const REGISTRY_FILENAME: &str = "repositories.go";

/// Render the registry file for all records of a run. Output is fully
/// deterministic for identical inputs: records are sorted by implementation
/// package, the bare-named contract first within a package, then by name.
pub fn render_registry(
    module: &ModuleRoot,
    impl_root: &str,
    records: &[ContractImpl],
) -> String {
    let mut records: Vec<&ContractImpl> = records.iter().collect();
    records.sort_by(|a, b| {
        a.impl_package.cmp(&b.impl_package).then_with(|| {
            let a_bare = a.contract.name == CONTRACT_SUFFIX;
            let b_bare = b.contract.name == CONTRACT_SUFFIX;
            b_bare.cmp(&a_bare).then(a.contract.name.cmp(&b.contract.name))
        })
    });

    let mut directives: Vec<String> = Vec::new();
    let mut seen_sources: Vec<String> = Vec::new();
    for record in &records {
        let src = mock_source(record);
        if seen_sources.contains(&src) {
            continue;
        }
        let dst = mock_destination(record);
        directives.push(format!("//go:generate mockgen -source={src} -destination={dst}"));
        seen_sources.push(src);
    }
    directives.sort();
    directives.dedup();

    let mut imports = vec![Import::new("", "go.uber.org/fx")];
    for record in &records {
        let (path, _) = module.local_package(&record.impl_package_path, &[]);
        if imports.iter().any(|i| i.path == path) {
            continue;
        }
        // The declared package name wins over the directory basename.
        let alias = if record.impl_package == base_name(&path) {
            String::new()
        } else {
            record.impl_package.clone()
        };
        imports.push(Import { alias, path });
    }

    let (registry_import, registry_alias) = module.local_package(impl_root, &[]);
    let package = if registry_alias.is_empty() {
        base_name(&registry_import)
    } else {
        registry_alias
    };

    let mut out = String::new();
    out.push_str(REGISTRY_HEADER);
    let _ = writeln!(out, "package {package}");
    if !directives.is_empty() {
        out.push('\n');
        for directive in &directives {
            out.push_str(directive);
            out.push('\n');
        }
    }
    push_import_block(&mut out, &imports, module);

    if records.is_empty() {
        out.push_str("\nvar Repositories = fx.Options()\n");
        return out;
    }
    out.push_str("\nvar Repositories = fx.Options(\n");
    for record in &records {
        let _ = writeln!(
            out,
            "\t{}.{},",
            record.impl_package,
            record.contract.qualify_decl("Options")
        );
    }
    out.push_str(")\n");
    out
}
