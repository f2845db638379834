//! Core data model shared by the extractor, diff engine, and synthesizer.

/// Suffix a type name must carry to be treated as a contract.
pub const CONTRACT_SUFFIX: &str = "Repository";

/// Suffix a type name must carry to be treated as a backing implementation.
pub const IMPL_SUFFIX: &str = "Impl";

/// A named interface extracted from a definition file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contract {
    /// Interface identifier as declared (e.g. `FooRepository`)
    pub name: String,
    /// Declared package name of the definition file
    pub package: String,
    /// Directory of the definition file, relative to the project root
    pub package_path: String,
    /// Basename of the definition file
    pub filename: String,
    /// Methods in declaration order
    pub methods: Vec<Method>,
    /// Imports of the definition file (inherited by every contract in it)
    pub imports: Vec<Import>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub params: Vec<Param>,
    pub returns: Vec<Param>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Param {
    /// Parameter identifier; empty for positional/unnamed parameters
    pub ident: String,
    /// Type as written in source, possibly package-qualified
    pub ty: String,
}

impl Param {
    pub fn new(ident: &str, ty: &str) -> Self {
        Param {
            ident: ident.to_string(),
            ty: ty.to_string(),
        }
    }

    pub fn unnamed(ty: &str) -> Self {
        Param::new("", ty)
    }
}

/// One import of a Go source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Import {
    /// Alias as written; empty means the default package name applies
    pub alias: String,
    /// Canonical import path (unquoted)
    pub path: String,
}

impl Import {
    pub fn new(alias: &str, path: &str) -> Self {
        Import {
            alias: alias.to_string(),
            path: path.to_string(),
        }
    }

    /// Name the import is referenced by in source: the alias when present,
    /// otherwise the last path segment.
    pub fn reference_name(&self) -> &str {
        if !self.alias.is_empty() {
            return &self.alias;
        }
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// A contract paired with what was discovered about its implementation.
#[derive(Debug, Clone, Default)]
pub struct ContractImpl {
    pub contract: Contract,
    /// True when no backing type was found at all
    pub is_new: bool,
    pub impl_package: String,
    pub impl_package_path: String,
    pub impl_filename: String,
    /// Method names already hand-implemented for the backing type
    pub impl_methods: Vec<String>,
}

impl Contract {
    /// Contract name with the `Repository` suffix stripped. The bare name
    /// `Repository` is kept as-is.
    pub fn short_name(&self) -> &str {
        if self.name.len() > CONTRACT_SUFFIX.len() && self.name.ends_with(CONTRACT_SUFFIX) {
            &self.name[..self.name.len() - CONTRACT_SUFFIX.len()]
        } else {
            &self.name
        }
    }

    /// Name of the backing implementation type: first letter lowercased,
    /// `Impl` appended.
    pub fn impl_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            None => String::new(),
            Some(first) => format!("{}{}{}", first.to_lowercase(), chars.as_str(), IMPL_SUFFIX),
        }
    }

    /// `package.Name`, or the bare name when the package is unknown.
    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }

    /// Prefix a generated declaration name with the contract's short name.
    /// Declarations for the bare `Repository` contract stay unqualified.
    pub fn qualify_decl(&self, decl: &str) -> String {
        let name = self.short_name();
        if name == CONTRACT_SUFFIX {
            decl.to_string()
        } else {
            format!("{name}{decl}")
        }
    }

    /// Default basename for the implementation file of this contract.
    pub fn default_impl_filename(&self) -> String {
        format!("{}_impl.go", self.short_name().to_lowercase())
    }
}
