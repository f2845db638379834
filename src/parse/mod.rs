pub mod contract;
pub mod implementation;

use crate::errors::{ImplgenError, Result};
use crate::model::Import;
use std::path::Path;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Parser, Query, QueryCursor, Tree};

/// The structural grammar all extraction queries run against.
pub fn language() -> Language {
    tree_sitter_go::LANGUAGE.into()
}

/// Parse source bytes into a syntax tree. A tree containing error nodes is
/// fatal for the file: generating against unparsable input risks corrupting
/// hand-written code downstream.
pub fn parse_source(source: &[u8], file: &Path) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&language())
        .map_err(|e| ImplgenError::Query(e.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ImplgenError::ParseError {
            file: file.to_path_buf(),
            message: "parser produced no tree".to_string(),
        })?;

    if tree.root_node().has_error() {
        return Err(ImplgenError::ParseError {
            file: file.to_path_buf(),
            message: "source contains syntax errors".to_string(),
        });
    }
    Ok(tree)
}

pub(crate) fn compile_query(source: &str) -> Result<Query> {
    Query::new(&language(), source).map_err(|e| ImplgenError::Query(e.to_string()))
}

/// Extract the import declarations of a file, alias included.
pub fn extract_imports(source: &[u8], tree: &Tree) -> Result<Vec<Import>> {
    let query = compile_query(
        r#"(import_spec name: (_)? @alias path: (interpreted_string_literal) @path)"#,
    )?;
    let alias_idx = query.capture_index_for_name("alias");
    let path_idx = query.capture_index_for_name("path");

    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, tree.root_node(), source);

    let mut imports = Vec::new();
    while let Some(m) = matches.next() {
        let mut import = Import::default();
        for capture in m.captures {
            let text = capture.node.utf8_text(source).unwrap_or_default();
            if Some(capture.index) == alias_idx {
                import.alias = text.to_string();
            } else if Some(capture.index) == path_idx {
                import.path = text.trim_matches(|c| c == '"' || c == '`').to_string();
            }
        }
        if !import.path.is_empty() {
            imports.push(import);
        }
    }
    Ok(imports)
}
