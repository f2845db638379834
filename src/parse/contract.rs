//! Contract extraction from definition files.
//!
//! Matches arrive from the query cursor as a flat, ordered stream of captures
//! (one match per interface method, each repeating the interface name), so
//! contract and method boundaries are reconstructed by change detection on
//! the identifier captures rather than by walking the tree.

use crate::errors::{ImplgenError, Result};
use crate::model::{Contract, Method, Param};
use crate::parse;
use std::path::Path;
use streaming_iterator::StreamingIterator;
use tree_sitter::QueryCursor;

const CONTRACT_QUERY: &str = r#"
(package_clause (package_identifier) @package)

(type_spec
  name: (type_identifier) @contract (#match? @contract "Repository$")
  type:
   (interface_type
     (method_elem
       name: (field_identifier) @method
       parameters: (parameter_list) @params
       result: [
        (parameter_list)
        (type_identifier)
       ]? @result)?))
"#;

/// Extract every contract declared in the given definition packages' files.
pub fn extract_contracts_for_package(
    root: &Path,
    package_path: &str,
    package_files: &[String],
) -> Result<Vec<Contract>> {
    let mut contracts = Vec::new();
    for filename in package_files {
        let full_path = crate::resolve::fs_path(root, package_path).join(filename);
        let source =
            std::fs::read(&full_path).map_err(|e| ImplgenError::io("read", &full_path, e))?;
        let mut file_contracts = extract_contracts(&source, &full_path)?;
        for contract in &mut file_contracts {
            contract.filename = filename.clone();
            contract.package_path = package_path.to_string();
        }
        contracts.append(&mut file_contracts);
    }
    Ok(contracts)
}

/// Extract contracts from a single file's source.
pub fn extract_contracts(source: &[u8], file: &Path) -> Result<Vec<Contract>> {
    let tree = parse::parse_source(source, file)?;
    let imports = parse::extract_imports(source, &tree)?;

    let query = parse::compile_query(CONTRACT_QUERY)?;
    let package_idx = query.capture_index_for_name("package");
    let contract_idx = query.capture_index_for_name("contract");
    let method_name_idx = query.capture_index_for_name("method");
    let params_idx = query.capture_index_for_name("params");
    let result_idx = query.capture_index_for_name("result");

    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, tree.root_node(), source);

    let mut contracts: Vec<Contract> = Vec::new();
    let mut package: Option<String> = None;
    // Cursors of the stream reducer: one per nesting level.
    let mut cur = 0usize;
    let mut method_cursor = 0usize;

    while let Some(m) = matches.next() {
        for capture in m.captures {
            let index = Some(capture.index);
            let text = capture.node.utf8_text(source).unwrap_or_default();

            if index == package_idx {
                package = Some(text.to_string());
            } else if index == contract_idx {
                // A repeated contract header belongs to the current contract;
                // a changed one advances the contract cursor.
                let changed = contracts.last().map_or(true, |last| last.name != text);
                if changed {
                    if !contracts.is_empty() {
                        cur += 1;
                        method_cursor = 0;
                    }
                    contracts.push(Contract {
                        name: text.to_string(),
                        ..Default::default()
                    });
                }
            } else if index == method_name_idx {
                let contract = &mut contracts[cur];
                if contract.methods.is_empty() {
                    method_cursor = 0;
                    contract.methods.push(Method {
                        name: text.to_string(),
                        ..Default::default()
                    });
                } else if contract.methods[method_cursor].name != text {
                    method_cursor += 1;
                    contract.methods.push(Method {
                        name: text.to_string(),
                        ..Default::default()
                    });
                }
            } else if index == params_idx {
                let method = &mut contracts[cur].methods[method_cursor];
                match parse_params(text) {
                    Ok(params) => method.params = params,
                    Err(TrailingUntyped) => {
                        return Err(params_error(file, &method.name, text));
                    }
                }
            } else if index == result_idx {
                let method = &mut contracts[cur].methods[method_cursor];
                match parse_params(text) {
                    Ok(returns) => method.returns = returns,
                    Err(TrailingUntyped) => {
                        return Err(params_error(file, &method.name, text));
                    }
                }
            } else {
                tracing::error!(index = capture.index, src = text, "unhandled capture");
            }
        }
    }

    let Some(package) = package else {
        return Err(ImplgenError::NoPackageDeclaration {
            file: file.to_path_buf(),
        });
    };

    for contract in &mut contracts {
        contract.package = package.clone();
        contract.imports = imports.clone();
    }
    Ok(contracts)
}

fn params_error(file: &Path, method: &str, params: &str) -> ImplgenError {
    ImplgenError::MalformedParameters {
        file: file.to_path_buf(),
        method: method.to_string(),
        params: params.to_string(),
    }
}

/// A named parameter run ended without a type to inherit from.
#[derive(Debug)]
pub(crate) struct TrailingUntyped;

/// Parse a raw parameter-list (or result) text into parameters.
///
/// If no comma-delimited segment carries internal whitespace, all segments
/// are positional types. Otherwise segments are named and the grouped-type
/// rule applies: an identifier-only segment inherits the type of the next
/// typed segment.
pub(crate) fn parse_params(src: &str) -> std::result::Result<Vec<Param>, TrailingUntyped> {
    let mut src = src.trim();
    if src.is_empty() {
        return Ok(Vec::new());
    }
    if src.starts_with('(') {
        src = src[1..src.len() - 1].trim();
    }
    if src.is_empty() {
        return Ok(Vec::new());
    }

    let parts = split_top_level(src);
    let named = parts
        .iter()
        .any(|part| part.split_whitespace().count() > 1);
    if named {
        return parse_named_params(&parts);
    }
    Ok(parts.iter().map(|part| Param::unnamed(part)).collect())
}

fn parse_named_params(parts: &[String]) -> std::result::Result<Vec<Param>, TrailingUntyped> {
    let mut params: Vec<Param> = Vec::with_capacity(parts.len());
    let mut untyped_from: Option<usize> = None;

    for (i, part) in parts.iter().enumerate() {
        match part.split_once(char::is_whitespace) {
            Some((ident, ty)) => {
                let ty = ty.trim();
                params.push(Param::new(ident.trim(), ty));
                if let Some(from) = untyped_from.take() {
                    for param in &mut params[from..i] {
                        param.ty = ty.to_string();
                    }
                }
            }
            None => {
                params.push(Param::new(part, ""));
                untyped_from.get_or_insert(i);
            }
        }
    }

    if untyped_from.is_some() {
        return Err(TrailingUntyped);
    }
    Ok(params)
}

/// Split on commas outside any bracket nesting. A trailing comma (the gofmt
/// multi-line shape) does not produce an empty segment.
fn split_top_level(src: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for c in src.chars() {
        match c {
            '(' | '[' | '{' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' | '}' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    let last = current.trim();
    if !last.is_empty() {
        parts.push(last.to_string());
    }
    parts
}
