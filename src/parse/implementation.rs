//! Implementation scanning: what backing types and methods already exist.

use crate::errors::{ImplgenError, Result};
use crate::model::{Contract, ContractImpl};
use crate::parse;
use crate::resolve;
use crate::walk;
use std::collections::BTreeMap;
use std::path::Path;
use streaming_iterator::StreamingIterator;
use tree_sitter::QueryCursor;

const IMPL_QUERY: &str = r#"
(package_clause (package_identifier) @package)

(type_spec
  name: (type_identifier) @impl_type (#match? @impl_type "Impl$"))

(method_declaration
  receiver: (parameter_list
    (parameter_declaration
      type: (_) @receiver (#match? @receiver "Impl$")))
  name: (field_identifier) @impl_method)
"#;

/// What a single implementation file declares.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImplFile {
    pub package: String,
    /// Names of declared `…Impl` types, in declaration order
    pub impl_types: Vec<String>,
    /// Receiver name to deduplicated method names
    pub methods: BTreeMap<String, Vec<String>>,
}

/// Scan one implementation file for backing types and their methods.
pub fn scan_impl_file(source: &[u8], file: &Path) -> Result<ImplFile> {
    let tree = parse::parse_source(source, file)?;
    let query = parse::compile_query(IMPL_QUERY)?;
    let package_idx = query.capture_index_for_name("package");
    let impl_type_idx = query.capture_index_for_name("impl_type");
    let receiver_idx = query.capture_index_for_name("receiver");
    let method_idx = query.capture_index_for_name("impl_method");

    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, tree.root_node(), source);

    let mut result = ImplFile::default();
    let mut package = None;

    while let Some(m) = matches.next() {
        // Receiver and method name arrive in the same match.
        let mut receiver = String::new();
        let mut method = String::new();
        for capture in m.captures {
            let index = Some(capture.index);
            let text = capture.node.utf8_text(source).unwrap_or_default();

            if index == package_idx {
                package = Some(text.to_string());
            } else if index == impl_type_idx {
                if !result.impl_types.iter().any(|t| t == text) {
                    result.impl_types.push(text.to_string());
                }
            } else if index == receiver_idx {
                receiver = text.trim_start_matches('*').to_string();
            } else if index == method_idx {
                method = text.to_string();
            } else {
                tracing::error!(index = capture.index, src = text, "unhandled capture");
            }
        }
        if !receiver.is_empty() && !method.is_empty() {
            let methods = result.methods.entry(receiver).or_default();
            if !methods.contains(&method) {
                methods.push(method);
            }
        }
    }

    result.package = package.ok_or_else(|| ImplgenError::NoPackageDeclaration {
        file: file.to_path_buf(),
    })?;
    Ok(result)
}

/// Reconcile each contract against the implementation package on disk.
///
/// A missing directory marks every record as new, with the package name and
/// filenames falling back to the naming conventions. A backing type's methods
/// may be split across files; they accumulate onto one record.
pub fn scan_impl_package(
    root: &Path,
    impl_package_path: &str,
    contracts: &[Contract],
) -> Result<Vec<ContractImpl>> {
    if contracts.is_empty() {
        return Ok(Vec::new());
    }

    let mut impl_package = format!("{}impl", contracts[0].package);
    let dir = resolve::fs_path(root, impl_package_path);

    let mut decl_to_file: BTreeMap<String, String> = BTreeMap::new();
    let mut receiver_methods: BTreeMap<String, Vec<String>> = BTreeMap::new();

    if let Some(files) = walk::list_package_files(&dir)? {
        for filename in &files {
            let path = dir.join(filename);
            let source = std::fs::read(&path).map_err(|e| ImplgenError::io("read", &path, e))?;
            let file = scan_impl_file(&source, &path)?;
            // Files within a package are assumed to agree on the name.
            impl_package = file.package;
            for decl in file.impl_types {
                decl_to_file.insert(decl, filename.clone());
            }
            for (receiver, mut methods) in file.methods {
                receiver_methods.entry(receiver).or_default().append(&mut methods);
            }
        }
    }

    let mut records = Vec::with_capacity(contracts.len());
    for contract in contracts {
        let impl_name = contract.impl_name();
        let mut record = ContractImpl {
            contract: contract.clone(),
            impl_package: impl_package.clone(),
            impl_package_path: impl_package_path.to_string(),
            ..Default::default()
        };
        match decl_to_file.get(&impl_name) {
            Some(filename) => {
                record.impl_filename = filename.clone();
                record.impl_methods = receiver_methods.get(&impl_name).cloned().unwrap_or_default();
            }
            None => {
                record.impl_filename = contract.default_impl_filename();
                record.is_new = true;
            }
        }
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Method;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn scan(src: &str) -> ImplFile {
        scan_impl_file(src.as_bytes(), &PathBuf::from("impl.go")).unwrap()
    }

    #[test]
    fn empty_file_has_package_only() {
        let got = scan("package main");
        assert_eq!(got.package, "main");
        assert_eq!(got.impl_types, Vec::<String>::new());
        assert!(got.methods.is_empty());
    }

    #[test]
    fn collects_impl_type_declarations() {
        let got = scan(
            r#"package main

type (
  repositoryImpl    struct {}
  fooRepositoryImpl struct {}
)

type bazRepositoryImpl struct {}
"#,
        );
        assert_eq!(
            got.impl_types,
            vec!["repositoryImpl", "fooRepositoryImpl", "bazRepositoryImpl"]
        );
        assert!(got.methods.is_empty());
    }

    #[test]
    fn collects_methods_per_receiver() {
        let got = scan(
            r#"package main

type (
  fooRepositoryImpl struct {}
  bazRepositoryImpl struct {}
)

func (i fooRepositoryImpl)  A() {}
func (i *fooRepositoryImpl) B() {}
func (i bazRepositoryImpl)  C() {}
"#,
        );
        assert_eq!(
            got.methods.get("fooRepositoryImpl"),
            Some(&vec!["A".to_string(), "B".to_string()])
        );
        assert_eq!(got.methods.get("bazRepositoryImpl"), Some(&vec!["C".to_string()]));
    }

    #[test]
    fn duplicate_method_declarations_are_deduplicated() {
        let got = scan(
            r#"package main

type fooRepositoryImpl struct {}

func (i fooRepositoryImpl) A() {}
func (i *fooRepositoryImpl) A() {}
"#,
        );
        assert_eq!(
            got.methods.get("fooRepositoryImpl"),
            Some(&vec!["A".to_string()])
        );
    }

    #[test]
    fn non_impl_receivers_are_ignored() {
        let got = scan(
            r#"package main

type plain struct {}

func (p plain) A() {}
"#,
        );
        assert!(got.methods.is_empty());
        assert_eq!(got.impl_types, Vec::<String>::new());
    }

    fn contract(package: &str, name: &str, methods: &[&str]) -> Contract {
        Contract {
            name: name.into(),
            package: package.into(),
            methods: methods
                .iter()
                .map(|m| Method {
                    name: m.to_string(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn missing_directory_marks_everything_new() {
        let tmp = tempfile::tempdir().unwrap();
        let contracts = vec![contract("api", "ARepository", &[])];
        let records = scan_impl_package(tmp.path(), "internal", &contracts).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_new);
        assert_eq!(records[0].impl_package, "apiimpl");
        assert_eq!(records[0].impl_filename, "a_impl.go");
        assert_eq!(records[0].impl_methods, Vec::<String>::new());
    }

    #[test]
    fn existing_types_map_to_their_files() {
        let tmp = tempfile::tempdir().unwrap();
        let internal = tmp.path().join("internal");
        std::fs::create_dir_all(&internal).unwrap();
        std::fs::write(
            internal.join("one.go"),
            "package internal\n\ntype aRepositoryImpl struct {}\n\nfunc (a *aRepositoryImpl) A() {}\n",
        )
        .unwrap();
        std::fs::write(
            internal.join("two.go"),
            "package internal\n\ntype bRepositoryImpl struct {}\n\nfunc (b bRepositoryImpl) B() {}\n",
        )
        .unwrap();

        let contracts = vec![
            contract("api", "ARepository", &["A", "B"]),
            contract("api", "BRepository", &["B"]),
        ];
        let records = scan_impl_package(tmp.path(), "internal", &contracts).unwrap();
        assert_eq!(records.len(), 2);
        assert!(!records[0].is_new);
        assert_eq!(records[0].impl_package, "internal");
        assert_eq!(records[0].impl_filename, "one.go");
        assert_eq!(records[0].impl_methods, vec!["A".to_string()]);
        assert!(!records[1].is_new);
        assert_eq!(records[1].impl_filename, "two.go");
        assert_eq!(records[1].impl_methods, vec!["B".to_string()]);
    }

    #[test]
    fn methods_accumulate_across_files() {
        let tmp = tempfile::tempdir().unwrap();
        let internal = tmp.path().join("internal");
        std::fs::create_dir_all(&internal).unwrap();
        std::fs::write(
            internal.join("one.go"),
            "package internal\n\ntype repositoryImpl struct {}\n\nfunc (a *repositoryImpl) A() {}\n",
        )
        .unwrap();
        std::fs::write(
            internal.join("two.go"),
            "package internal\n\nfunc (b repositoryImpl) B() {}\n",
        )
        .unwrap();

        let contracts = vec![contract("api", "Repository", &["A", "B"])];
        let records = scan_impl_package(tmp.path(), "internal", &contracts).unwrap();
        assert_eq!(records.len(), 1);
        assert!(!records[0].is_new);
        assert_eq!(records[0].impl_filename, "one.go");
        assert_eq!(
            records[0].impl_methods,
            vec!["A".to_string(), "B".to_string()]
        );
    }

    #[test]
    fn unknown_type_falls_back_to_default_filename() {
        let tmp = tempfile::tempdir().unwrap();
        let internal = tmp.path().join("internal");
        std::fs::create_dir_all(&internal).unwrap();
        std::fs::write(internal.join("one.go"), "package internal\n").unwrap();

        let contracts = vec![contract("api", "FooRepository", &["A"])];
        let records = scan_impl_package(tmp.path(), "internal", &contracts).unwrap();
        assert!(records[0].is_new);
        assert_eq!(records[0].impl_package, "internal");
        assert_eq!(records[0].impl_filename, "foo_impl.go");
    }
}
