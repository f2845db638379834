use crate::errors::{ImplgenError, Result};
use crate::generate::merge::merge_impl_file;
use crate::generate::registry::{render_registry, REGISTRY_FILENAME};
use crate::model::ContractImpl;
use crate::parse::contract::extract_contracts_for_package;
use crate::parse::implementation::scan_impl_package;
use crate::resolve::{self, ModuleRoot};
use crate::walk;
use clap::Args;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Root directory to generate the api/impl tree from
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Directory of API definitions, relative to root
    #[arg(long, default_value = "api")]
    pub api: String,

    /// Directory of implementation files, relative to root
    #[arg(long = "impl", default_value = "internal")]
    pub impl_dir: String,
}

/// One file the pipeline decided on: its full replacement text plus what
/// changed, materialized before anything is written.
pub struct PlannedFile {
    pub path: PathBuf,
    pub content: String,
    pub exists: bool,
    pub changed: bool,
    pub new_types: usize,
    pub new_methods: usize,
}

pub fn run(args: &GenerateArgs) -> Result<()> {
    let planned = plan(args)?;

    let mut created = 0usize;
    let mut updated = 0usize;
    let mut new_types = 0usize;
    let mut new_methods = 0usize;
    for file in &planned {
        if !file.changed {
            continue;
        }
        new_types += file.new_types;
        new_methods += file.new_methods;
        if let Some(dir) = file.path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| ImplgenError::io("create directory", dir, e))?;
        }
        std::fs::write(&file.path, &file.content)
            .map_err(|e| ImplgenError::io("write", &file.path, e))?;
        if file.exists {
            updated += 1;
            tracing::debug!(
                path = %file.path.display(),
                new_types = file.new_types,
                new_methods = file.new_methods,
                "Updated implementation file"
            );
        } else {
            created += 1;
            tracing::debug!(
                path = %file.path.display(),
                new_types = file.new_types,
                new_methods = file.new_methods,
                "Created implementation file"
            );
        }
    }

    eprintln!(
        "Generated {} file(s) ({} created, {} updated): {} new type(s), {} new method(s)",
        created + updated,
        created,
        updated,
        new_types,
        new_methods
    );
    Ok(())
}

/// Run the full pipeline without touching the filesystem: extract, scan,
/// diff, and synthesize every output file. Each definition package is fully
/// materialized before the next one is processed, so a failure leaves no
/// partial output behind.
pub fn plan(args: &GenerateArgs) -> Result<Vec<PlannedFile>> {
    let root = args
        .root
        .canonicalize()
        .map_err(|e| ImplgenError::io("resolve root", &args.root, e))?;

    // The module root cannot change mid-run; resolve it once and thread it
    // through every component that computes import paths.
    let module = ModuleRoot::discover(&root)?;

    tracing::debug!(
        root = %root.display(),
        api_root = args.api,
        impl_root = args.impl_dir,
        module = module.module,
        "Crawling API directory"
    );
    let packages = walk::discover_packages(&root, &args.api)?;

    let mut planned = Vec::new();
    let mut all_records: Vec<ContractImpl> = Vec::new();

    for (package_path, files) in &packages {
        let contracts = extract_contracts_for_package(&root, package_path, files)?;
        if contracts.is_empty() {
            continue;
        }
        tracing::debug!(
            api_path = package_path,
            count = contracts.len(),
            "Parsed contracts"
        );

        let impl_path = resolve::impl_package_path(&args.api, &args.impl_dir, package_path)?;
        let records = scan_impl_package(&root, &impl_path, &contracts)?;

        let mut by_filename: BTreeMap<String, Vec<ContractImpl>> = BTreeMap::new();
        for record in records {
            by_filename
                .entry(record.impl_filename.clone())
                .or_default()
                .push(record);
        }

        for (filename, mut group) in by_filename {
            let path = resolve::fs_path(&root, &impl_path).join(&filename);
            let original = read_optional(&path)?;
            let content = merge_impl_file(original.as_deref(), &path, &mut group, &module)?;
            let new_types = group.iter().filter(|r| r.is_new).count();
            let new_methods = group.iter().map(|r| r.new_methods().len()).sum();
            planned.push(PlannedFile {
                changed: original.as_deref() != Some(content.as_str()),
                exists: original.is_some(),
                path,
                content,
                new_types,
                new_methods,
            });
            all_records.append(&mut group);
        }
    }

    // One registry for the whole run; skipped entirely when no contracts
    // exist so the tool never plants files in unrelated trees.
    if !all_records.is_empty() {
        let content = render_registry(&module, &args.impl_dir, &all_records);
        let path = resolve::fs_path(&root, &args.impl_dir).join(REGISTRY_FILENAME);
        let original = read_optional(&path)?;
        planned.push(PlannedFile {
            changed: original.as_deref() != Some(content.as_str()),
            exists: original.is_some(),
            path,
            content,
            new_types: 0,
            new_methods: 0,
        });
        tracing::debug!("Planned registry file");
    }

    Ok(planned)
}

fn read_optional(path: &PathBuf) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(ImplgenError::io("read", path, err)),
    }
}
