//! Reconciles a contract's method set against an existing implementation.

use crate::model::{ContractImpl, Method, Param};

impl ContractImpl {
    /// Methods declared by the contract but absent from the implementation,
    /// in contract declaration order, with cross-package types qualified.
    pub fn new_methods(&self) -> Vec<Method> {
        missing_methods(self)
    }
}

pub fn missing_methods(record: &ContractImpl) -> Vec<Method> {
    let contract = &record.contract;
    let mut missing = Vec::new();
    for method in &contract.methods {
        if record.impl_methods.iter().any(|m| m == &method.name) {
            continue;
        }
        missing.push(Method {
            name: method.name.clone(),
            params: method
                .params
                .iter()
                .map(|p| qualify(&contract.package, p))
                .collect(),
            returns: method
                .returns
                .iter()
                .map(|p| qualify(&contract.package, p))
                .collect(),
        });
    }
    missing
}

/// Prefix exported, unqualified type identifiers with the source package.
/// Lower-case (builtin/local) and already-qualified types pass through.
fn qualify(package: &str, param: &Param) -> Param {
    let exported = param.ty.chars().next().is_some_and(|c| c.is_ascii_uppercase());
    if package.is_empty() || !exported || param.ty.contains('.') {
        return param.clone();
    }
    Param {
        ident: param.ident.clone(),
        ty: format!("{}.{}", package, param.ty),
    }
}
