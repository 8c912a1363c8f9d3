//! # Scope Annotator
//!
//! Walks a parsed class once and decorates identifier leaves with resolved
//! scope information, backed by a fresh [`SymbolTable`].
//!
//! Declaration sites (class name, subroutine names, class vars, parameters,
//! locals) are annotated as they are defined. Identifiers inside statement
//! bodies are annotated as usages when they resolve in the symbol table;
//! class and subroutine names stay unannotated, which is how the code
//! generator later tells a function call from a method call.
//!
//! Redefining a name within its scope is a fatal error.


use crate::error::{CompileError, Span};
use crate::parser::ast::{JackAst, Mode, NodeKind, ScopeInfo};
use crate::symbols::{Kind, SymbolTable};
use crate::tokenizer::token::Keyword;

/// Annotate every resolvable identifier in the class tree.
pub fn annotate(ast: &mut JackAst) -> Result<(), CompileError> {
    let mut table = SymbolTable::new();

    let JackAst::Node {
        kind: NodeKind::Class,
        children,
    } = ast
    else {
        return Err(CompileError::malformed_ast("expected CLASS at the root"));
    };

    let class_name = match children.get_mut(1) {
        Some(JackAst::Identifier { name, scope }) => {
            *scope = Some(ScopeInfo::Class {
                mode: Mode::Declaration,
            });
            name.clone()
        }
        _ => return Err(CompileError::malformed_ast("class name identifier")),
    };

    for child in children.iter_mut() {
        if child.is_node(NodeKind::ClassVarDec) {
            annotate_class_var_dec(child, &mut table)?;
        }
    }
    for child in children.iter_mut() {
        if child.is_node(NodeKind::SubroutineDec) {
            annotate_subroutine(child, &mut table, &class_name)?;
        }
    }
    Ok(())
}

/// Type of a declaration: a primitive keyword or a class name.
fn type_name(ast: &JackAst) -> Option<String> {
    match ast {
        JackAst::Keyword(kw) => Some(kw.as_str().to_string()),
        JackAst::Identifier { name, .. } => Some(name.clone()),
        _ => None,
    }
}

/// Define and annotate the names of a `CLASS_VAR_DEC` or `VAR_DEC`.
///
/// Both shapes are `kw type ID (',' ID)* ';'`, so names start at child 2.
fn annotate_var_names(
    children: &mut [JackAst],
    typ: &str,
    kind: Kind,
    table: &mut SymbolTable,
) -> Result<(), CompileError> {
    for child in children.iter_mut().skip(2) {
        if let JackAst::Identifier { name, scope } = child {
            let index = table
                .define(name, typ, kind)
                .ok_or_else(|| CompileError::duplicate_symbol(name, Span::line(0)))?;
            *scope = Some(ScopeInfo::Var {
                kind,
                index,
                typ: typ.to_string(),
                mode: Mode::Declaration,
            });
        }
    }
    Ok(())
}

fn annotate_class_var_dec(
    dec: &mut JackAst,
    table: &mut SymbolTable,
) -> Result<(), CompileError> {
    let JackAst::Node { children, .. } = dec else {
        return Err(CompileError::malformed_ast("class var declaration"));
    };
    let kind = match children.first().and_then(JackAst::as_keyword) {
        Some(Keyword::Static) => Kind::Static,
        Some(Keyword::Field) => Kind::Field,
        _ => return Err(CompileError::malformed_ast("class var kind keyword")),
    };
    let typ = children
        .get(1)
        .and_then(type_name)
        .ok_or_else(|| CompileError::malformed_ast("class var type"))?;
    annotate_var_names(children, &typ, kind, table)
}

fn annotate_subroutine(
    dec: &mut JackAst,
    table: &mut SymbolTable,
    class_name: &str,
) -> Result<(), CompileError> {
    let JackAst::Node { children, .. } = dec else {
        return Err(CompileError::malformed_ast("subroutine declaration"));
    };

    table.start_subroutine();

    // The receiver occupies argument 0 of a method, so declared parameters
    // start at argument 1.
    if children.first().and_then(JackAst::as_keyword) == Some(Keyword::Method) {
        table.define("this", class_name, Kind::Arg);
    }

    match children.get_mut(2) {
        Some(JackAst::Identifier { scope, .. }) => {
            *scope = Some(ScopeInfo::Subroutine {
                mode: Mode::Declaration,
            });
        }
        _ => return Err(CompileError::malformed_ast("subroutine name identifier")),
    }

    for child in children.iter_mut() {
        if child.is_node(NodeKind::ParameterList) {
            annotate_parameter_list(child, table)?;
        }
    }
    for child in children.iter_mut() {
        if child.is_node(NodeKind::SubroutineBody) {
            annotate_body(child, table)?;
        }
    }
    Ok(())
}

/// `PARAMETER_LIST` children are `type ID (',' type ID)*`.
fn annotate_parameter_list(
    params: &mut JackAst,
    table: &mut SymbolTable,
) -> Result<(), CompileError> {
    let JackAst::Node { children, .. } = params else {
        return Err(CompileError::malformed_ast("parameter list"));
    };

    let mut iter = children.iter_mut();
    while let Some(child) = iter.next() {
        if child.as_symbol() == Some(',') {
            continue;
        }
        let typ =
            type_name(child).ok_or_else(|| CompileError::malformed_ast("parameter type"))?;
        match iter.next() {
            Some(JackAst::Identifier { name, scope }) => {
                let index = table
                    .define(name, &typ, Kind::Arg)
                    .ok_or_else(|| CompileError::duplicate_symbol(name, Span::line(0)))?;
                *scope = Some(ScopeInfo::Var {
                    kind: Kind::Arg,
                    index,
                    typ,
                    mode: Mode::Declaration,
                });
            }
            _ => return Err(CompileError::malformed_ast("parameter name")),
        }
    }
    Ok(())
}

fn annotate_body(body: &mut JackAst, table: &mut SymbolTable) -> Result<(), CompileError> {
    let JackAst::Node { children, .. } = body else {
        return Err(CompileError::malformed_ast("subroutine body"));
    };

    for child in children.iter_mut() {
        if let JackAst::Node {
            kind: NodeKind::VarDec,
            children: dec_children,
        } = child
        {
            let typ = dec_children
                .get(1)
                .and_then(type_name)
                .ok_or_else(|| CompileError::malformed_ast("local var type"))?;
            annotate_var_names(dec_children, &typ, Kind::Var, table)?;
        }
    }
    for child in children.iter_mut() {
        if child.is_node(NodeKind::Statements) {
            annotate_usages(child, table);
        }
    }
    Ok(())
}

/// Mark every identifier below `ast` that resolves in the symbol table as a
/// usage. Unresolved names are left untouched.
fn annotate_usages(ast: &mut JackAst, table: &SymbolTable) {
    match ast {
        JackAst::Identifier { name, scope } => {
            if let Some(entry) = table.get(name) {
                *scope = Some(ScopeInfo::Var {
                    kind: entry.kind,
                    index: entry.index,
                    typ: entry.typ.clone(),
                    mode: Mode::Usage,
                });
            }
        }
        JackAst::Node { children, .. } => {
            for child in children.iter_mut() {
                annotate_usages(child, table);
            }
        }
        _ => {}
    }
}
