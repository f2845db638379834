//! Text rendering for method stubs and dependency-registration blocks.
//!
//! Output is emitted in its gofmt shape (tab indentation, grouped same-type
//! parameters) so a pass through the external formatter is a no-op for
//! generated declarations.

use crate::model::{Contract, Method, Param};
use std::fmt::Write;

/// Type that marks a method as cancellable/traceable.
pub const CONTEXT_TYPE: &str = "context.Context";
/// Type that marks a method as fallible.
pub const ERROR_TYPE: &str = "error";

pub fn has_ctx(params: &[Param]) -> bool {
    params.iter().any(|p| p.ty == CONTEXT_TYPE)
}

pub fn has_error(params: &[Param]) -> bool {
    params.iter().any(|p| p.ty == ERROR_TYPE)
}

fn named(params: &[Param]) -> bool {
    params.iter().any(|p| !p.ident.is_empty())
}

/// Assign the identifiers the stub body relies on: context parameters become
/// `ctx`, error values become `err`, and remaining unnamed slots become `_`
/// once any identifier is in play.
fn assign_idents(params: &[Param]) -> Vec<Param> {
    let mut params = params.to_vec();
    if !has_ctx(&params) && !has_error(&params) && !named(&params) {
        return params;
    }
    for param in &mut params {
        match param.ty.as_str() {
            CONTEXT_TYPE => param.ident = "ctx".to_string(),
            ERROR_TYPE => param.ident = "err".to_string(),
            _ => {
                if param.ident.is_empty() {
                    param.ident = "_".to_string();
                }
            }
        }
    }
    params
}

/// Render a parameter list, re-compressing adjacent named parameters that
/// share a type (`a, b bool`).
pub fn params_src(params: &[Param]) -> String {
    let params = assign_idents(params);
    let n = params.len();
    let mut src = String::new();
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            src.push_str(", ");
        }
        let grouped = i + 1 < n
            && !param.ident.is_empty()
            && !params[i + 1].ident.is_empty()
            && param.ty == params[i + 1].ty;
        if grouped {
            src.push_str(&param.ident);
        } else if !param.ident.is_empty() {
            src.push_str(&param.ident);
            src.push(' ');
            src.push_str(&param.ty);
        } else {
            src.push_str(&param.ty);
        }
    }
    src
}

/// Render a result list; named results are parenthesized.
pub fn returns_src(params: &[Param]) -> String {
    let params = assign_idents(params);
    let src = params_src(&params);
    if named(&params) {
        format!("({src})")
    } else {
        src
    }
}

/// Render the stub body for one missing method. The body deliberately fails
/// at runtime; tracing and error wrapping are injected according to the
/// method's context parameter and error return.
pub fn render_method_stub(contract: &Contract, method: &Method) -> String {
    let impl_name = contract.impl_name();
    let qualified = format!("{}.{}", contract.qualified_name(), method.name);
    let span = format!("{}.{}", contract.short_name(), method.name);
    let params = params_src(&method.params);
    let returns = returns_src(&method.returns);
    let returns_pad = if returns.is_empty() {
        " ".to_string()
    } else {
        format!(" {returns} ")
    };
    let traced = has_ctx(&method.params);
    let fallible = has_error(&method.returns);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "func (r *{impl_name}) {}({params}){returns_pad}{{",
        method.name
    );
    if traced {
        let _ = writeln!(
            out,
            "\tctx, span := otel.GetTracerProvider().Tracer(\"{}\").Start(ctx, \"{span}\")",
            contract.package
        );
        if fallible {
            out.push_str("\tdefer func() {\n");
            out.push_str("\t\tif err != nil {\n");
            let _ = writeln!(out, "\t\t\terr = eris.Wrap(err, \"{qualified}\")");
            out.push_str("\t\t\tspan.SetStatus(codes.Error, \"\")\n");
            out.push_str("\t\t\tspan.RecordError(err)\n");
            out.push_str("\t\t}\n");
            out.push_str("\t\tspan.End()\n");
            out.push_str("\t}()\n");
        } else {
            out.push_str("\tdefer span.End()\n");
        }
        out.push_str("\t_ = ctx\n");
    } else if fallible {
        out.push_str("\tdefer func() {\n");
        out.push_str("\t\tif err != nil {\n");
        let _ = writeln!(out, "\t\t\terr = eris.Wrap(err, \"{qualified}\")");
        out.push_str("\t\t}\n");
        out.push_str("\t}()\n");
    }
    let _ = writeln!(out, "\tpanic(\"TODO: implement {qualified}\")");
    out.push_str("}\n");
    out
}

/// Render the dependency-registration block for a brand-new contract: the
/// dependency holder, the fx options value, the constructor, and the backing
/// implementation type.
pub fn render_di_block(contract: &Contract) -> String {
    let deps = contract.qualify_decl("Dependencies");
    let options = contract.qualify_decl("Options");
    let impl_name = contract.impl_name();
    let name = &contract.name;
    let package = &contract.package;

    let mut out = String::new();
    let _ = writeln!(out, "type {deps} struct {{");
    out.push_str("\tfx.In\n");
    out.push_str("\t// Add dependencies here\n");
    out.push_str("}\n\n");
    let _ = writeln!(out, "var {options} = fx.Options(");
    out.push_str("\tfx.Provide(\n");
    let _ = writeln!(out, "\t\tNew{name},");
    out.push_str("\t),\n");
    out.push_str(")\n\n");
    let _ = writeln!(out, "func New{name}(deps {deps}) {package}.{name} {{");
    let _ = writeln!(out, "\treturn &{impl_name}{{");
    let _ = writeln!(out, "\t\t{deps}: deps,");
    out.push_str("\t}\n");
    out.push_str("}\n\n");
    let _ = writeln!(out, "type {impl_name} struct {{");
    let _ = writeln!(out, "\t{deps}");
    out.push_str("}\n");
    out
}
