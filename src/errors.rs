use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ImplgenError {
    #[error("No package declaration in {file}")]
    #[diagnostic(code(implgen::no_package))]
    NoPackageDeclaration { file: PathBuf },

    #[error("Malformed parameter list in {file}: method {method} has a trailing untyped parameter in `{params}`")]
    #[diagnostic(code(implgen::malformed_params))]
    MalformedParameters {
        file: PathBuf,
        method: String,
        params: String,
    },

    #[error("Parse error in {file}: {message}")]
    #[diagnostic(code(implgen::parse_error))]
    ParseError { file: PathBuf, message: String },

    #[error("Invalid tree-sitter query: {0}")]
    #[diagnostic(code(implgen::query))]
    Query(String),

    #[error("Could not find a go.mod in {start} or any parent directory")]
    #[diagnostic(code(implgen::no_go_mod))]
    NoGoMod { start: PathBuf },

    #[error("Definition package {package_path} is not nested under {api_root}")]
    #[diagnostic(code(implgen::not_nested))]
    NotNested {
        package_path: String,
        api_root: String,
    },

    #[error("Failed to {operation} {file}")]
    #[diagnostic(code(implgen::io))]
    Io {
        operation: &'static str,
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(implgen::glob))]
    Glob(#[from] globset::Error),
}

impl ImplgenError {
    /// Wrap an io::Error with the operation and path that failed.
    pub fn io(operation: &'static str, file: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ImplgenError::Io {
            operation,
            file: file.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ImplgenError>;
