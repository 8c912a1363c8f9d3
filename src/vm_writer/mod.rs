//! # VM Writer
//!
//! Tree-walking code generator: turns an annotated class tree into a stack-VM
//! instruction listing.
//!
//! ## Conventions
//!
//! - Kinds map to segments: `static` → `static`, `field` → `this`,
//!   `arg` → `argument`, `var` → `local`.
//! - Constructors allocate `nFields` words via `Memory.alloc` and anchor
//!   `pointer 0`; methods anchor `pointer 0` from `argument 0`.
//! - `if`/`while` labels come from per-subroutine counters, so every
//!   statement gets a unique label index within its subroutine.
//! - A bare call `foo(...)` is a method call on the current object; a
//!   qualified call `x.foo(...)` is a method call when `x` resolved during
//!   scope annotation and a function call otherwise.
//!
//! Structural violations (shapes the parser and annotator cannot produce)
//! surface as `MalformedAst` errors rather than panics.


use crate::error::CompileError;
use crate::parser::ast::{JackAst, NodeKind, ScopeInfo};
use crate::symbols::Kind;
use crate::tokenizer::token::Keyword;

/// Generate the VM instruction listing for an annotated class tree.
#[must_use = "the VM listing is the whole output of compilation"]
pub fn write_vm(class: &JackAst) -> Result<Vec<String>, CompileError> {
    let children = class
        .children_of(NodeKind::Class)
        .ok_or_else(|| CompileError::malformed_ast("expected CLASS at the root"))?;
    let class_name = children
        .get(1)
        .and_then(JackAst::as_identifier)
        .ok_or_else(|| CompileError::malformed_ast("class name identifier"))?;

    let n_fields: u16 = children
        .iter()
        .filter_map(|c| c.children_of(NodeKind::ClassVarDec))
        .filter(|dec| dec.first().and_then(JackAst::as_keyword) == Some(Keyword::Field))
        .map(declared_names)
        .sum();

    let mut writer = VmWriter {
        class_name,
        n_fields,
        code: Vec::new(),
        if_index: 0,
        while_index: 0,
    };
    for child in children {
        if child.is_node(NodeKind::SubroutineDec) {
            writer.gen_subroutine(child)?;
        }
    }
    Ok(writer.code)
}

/// Number of identifiers declared by a `CLASS_VAR_DEC`/`VAR_DEC` child list
/// (names start after the kind keyword and the type).
fn declared_names(dec_children: &[JackAst]) -> u16 {
    dec_children
        .iter()
        .skip(2)
        .filter(|c| c.as_identifier().is_some())
        .count() as u16
}

fn segment(kind: Kind) -> &'static str {
    match kind {
        Kind::Static => "static",
        Kind::Field => "this",
        Kind::Arg => "argument",
        Kind::Var => "local",
    }
}

struct VmWriter<'a> {
    class_name: &'a str,
    n_fields: u16,
    code: Vec<String>,
    if_index: u16,
    while_index: u16,
}

impl VmWriter<'_> {
    fn emit(&mut self, line: impl Into<String>) {
        self.code.push(line.into());
    }

    fn gen_subroutine(&mut self, dec: &JackAst) -> Result<(), CompileError> {
        let children = dec
            .children_of(NodeKind::SubroutineDec)
            .ok_or_else(|| CompileError::malformed_ast("subroutine declaration"))?;
        let flavor = children
            .first()
            .and_then(JackAst::as_keyword)
            .ok_or_else(|| CompileError::malformed_ast("subroutine flavor keyword"))?;
        let name = children
            .get(2)
            .and_then(JackAst::as_identifier)
            .ok_or_else(|| CompileError::malformed_ast("subroutine name identifier"))?;
        let body = children
            .iter()
            .find_map(|c| c.children_of(NodeKind::SubroutineBody))
            .ok_or_else(|| CompileError::malformed_ast("subroutine body"))?;

        let n_locals: u16 = body
            .iter()
            .filter_map(|c| c.children_of(NodeKind::VarDec))
            .map(declared_names)
            .sum();

        self.if_index = 0;
        self.while_index = 0;
        self.emit(format!("function {}.{} {}", self.class_name, name, n_locals));

        match flavor {
            Keyword::Constructor => {
                self.emit(format!("push constant {}", self.n_fields));
                self.emit("call Memory.alloc 1");
                self.emit("pop pointer 0");
            }
            Keyword::Method => {
                self.emit("push argument 0");
                self.emit("pop pointer 0");
            }
            Keyword::Function => {}
            _ => return Err(CompileError::malformed_ast("subroutine flavor keyword")),
        }

        let statements = body
            .iter()
            .find(|c| c.is_node(NodeKind::Statements))
            .ok_or_else(|| CompileError::malformed_ast("subroutine statements"))?;
        self.gen_statements(statements)
    }

    fn gen_statements(&mut self, statements: &JackAst) -> Result<(), CompileError> {
        let children = statements
            .children_of(NodeKind::Statements)
            .ok_or_else(|| CompileError::malformed_ast("statement list"))?;
        for child in children {
            match child {
                JackAst::Node { kind, children } => match kind {
                    NodeKind::LetStatement => self.gen_let(children)?,
                    NodeKind::IfStatement => self.gen_if(children)?,
                    NodeKind::WhileStatement => self.gen_while(children)?,
                    NodeKind::DoStatement => self.gen_do(children)?,
                    NodeKind::ReturnStatement => self.gen_return(children)?,
                    _ => return Err(CompileError::malformed_ast("statement node")),
                },
                _ => return Err(CompileError::malformed_ast("statement node")),
            }
        }
        Ok(())
    }

    /// `let x = e;` or `let x[i] = e;`
    fn gen_let(&mut self, children: &[JackAst]) -> Result<(), CompileError> {
        let target = children
            .get(1)
            .ok_or_else(|| CompileError::malformed_ast("let target"))?;
        let exprs: Vec<&JackAst> = children
            .iter()
            .filter(|c| c.is_node(NodeKind::Expression))
            .collect();

        let subscripted = children.get(2).and_then(JackAst::as_symbol) == Some('[');
        if subscripted {
            let [index_expr, value_expr] = exprs[..] else {
                return Err(CompileError::malformed_ast("subscripted let expressions"));
            };
            // The value is computed first so `pointer 1` is only set right
            // before the store and cannot be clobbered by the value
            // expression (which may itself use `that`).
            self.gen_expression(value_expr)?;
            self.push_variable(target)?;
            self.gen_expression(index_expr)?;
            self.emit("add");
            self.emit("pop pointer 1");
            self.emit("pop that 0");
        } else {
            let [value_expr] = exprs[..] else {
                return Err(CompileError::malformed_ast("let expression"));
            };
            self.gen_expression(value_expr)?;
            let (kind, index) = variable_binding(target)?;
            self.emit(format!("pop {} {}", segment(kind), index));
        }
        Ok(())
    }

    /// `if (cond) { ... } else { ... }`
    fn gen_if(&mut self, children: &[JackAst]) -> Result<(), CompileError> {
        let k = self.if_index;
        self.if_index += 1;

        let cond = children
            .iter()
            .find(|c| c.is_node(NodeKind::Expression))
            .ok_or_else(|| CompileError::malformed_ast("if condition"))?;
        let mut branches = children.iter().filter(|c| c.is_node(NodeKind::Statements));
        let then_branch = branches
            .next()
            .ok_or_else(|| CompileError::malformed_ast("if branch"))?;
        let else_branch = branches.next();

        self.gen_expression(cond)?;
        self.emit("not");
        self.emit(format!("if-goto L_IF_{k}_ELSE"));
        self.gen_statements(then_branch)?;
        self.emit(format!("goto L_IF_{k}_ENDIF"));
        self.emit(format!("label L_IF_{k}_ELSE"));
        if let Some(else_branch) = else_branch {
            self.gen_statements(else_branch)?;
        }
        self.emit(format!("label L_IF_{k}_ENDIF"));
        Ok(())
    }

    /// `while (cond) { ... }`
    fn gen_while(&mut self, children: &[JackAst]) -> Result<(), CompileError> {
        let k = self.while_index;
        self.while_index += 1;

        let cond = children
            .iter()
            .find(|c| c.is_node(NodeKind::Expression))
            .ok_or_else(|| CompileError::malformed_ast("while condition"))?;
        let body = children
            .iter()
            .find(|c| c.is_node(NodeKind::Statements))
            .ok_or_else(|| CompileError::malformed_ast("while body"))?;

        self.emit(format!("label L_WHILE_{k}_START"));
        self.gen_expression(cond)?;
        self.emit("not");
        self.emit(format!("if-goto L_WHILE_{k}_END"));
        self.gen_statements(body)?;
        self.emit(format!("goto L_WHILE_{k}_START"));
        self.emit(format!("label L_WHILE_{k}_END"));
        Ok(())
    }

    /// `do call(...);` with the return value discarded.
    fn gen_do(&mut self, children: &[JackAst]) -> Result<(), CompileError> {
        // Strip the `do` keyword and the trailing semicolon
        let call = children
            .get(1..children.len().saturating_sub(1))
            .filter(|c| !c.is_empty())
            .ok_or_else(|| CompileError::malformed_ast("do statement call"))?;
        self.gen_call(call)?;
        self.emit("pop temp 0");
        Ok(())
    }

    fn gen_return(&mut self, children: &[JackAst]) -> Result<(), CompileError> {
        match children.iter().find(|c| c.is_node(NodeKind::Expression)) {
            Some(expr) => self.gen_expression(expr)?,
            None => self.emit("push constant 0"),
        }
        self.emit("return");
        Ok(())
    }

    /// Push all terms left to right, then apply the operators in reverse.
    fn gen_expression(&mut self, expr: &JackAst) -> Result<(), CompileError> {
        let children = expr
            .children_of(NodeKind::Expression)
            .ok_or_else(|| CompileError::malformed_ast("expression node"))?;
        let ops: Vec<char> = children.iter().filter_map(JackAst::as_symbol).collect();
        for child in children {
            if child.is_node(NodeKind::Term) {
                self.gen_term(child)?;
            }
        }
        for op in ops.into_iter().rev() {
            self.gen_op(op)?;
        }
        Ok(())
    }

    fn gen_op(&mut self, op: char) -> Result<(), CompileError> {
        let line = match op {
            '+' => "add",
            '-' => "sub",
            '=' => "eq",
            '<' => "lt",
            '>' => "gt",
            '&' => "and",
            '|' => "or",
            '*' => "call Math.multiply 2",
            '/' => "call Math.divide 2",
            _ => return Err(CompileError::malformed_ast("expression operator")),
        };
        self.emit(line);
        Ok(())
    }

    fn gen_term(&mut self, term: &JackAst) -> Result<(), CompileError> {
        let children = term
            .children_of(NodeKind::Term)
            .ok_or_else(|| CompileError::malformed_ast("term node"))?;
        let first = children
            .first()
            .ok_or_else(|| CompileError::malformed_ast("empty term"))?;

        match first {
            JackAst::IntConst(value) => {
                self.emit(format!("push constant {value}"));
            }
            JackAst::StrConst(value) => {
                self.emit(format!("push constant {}", value.len()));
                self.emit("call String.new 1");
                for byte in value.bytes() {
                    self.emit(format!("push constant {byte}"));
                    self.emit("call String.appendChar 2");
                }
            }
            JackAst::Keyword(Keyword::True) => {
                self.emit("push constant 1");
                self.emit("neg");
            }
            JackAst::Keyword(Keyword::False) | JackAst::Keyword(Keyword::Null) => {
                self.emit("push constant 0");
            }
            JackAst::Keyword(Keyword::This) => {
                self.emit("push pointer 0");
            }
            JackAst::Keyword(_) => return Err(CompileError::malformed_ast("term keyword")),
            JackAst::Symbol('(') => {
                let expr = children
                    .get(1)
                    .ok_or_else(|| CompileError::malformed_ast("parenthesized term"))?;
                self.gen_expression(expr)?;
            }
            JackAst::Symbol(op @ ('-' | '~')) => {
                let inner = children
                    .get(1)
                    .ok_or_else(|| CompileError::malformed_ast("unary term"))?;
                self.gen_term(inner)?;
                self.emit(if *op == '-' { "neg" } else { "not" });
            }
            JackAst::Symbol(_) => return Err(CompileError::malformed_ast("term symbol")),
            JackAst::Identifier { .. } => match children.get(1).and_then(JackAst::as_symbol) {
                Some('[') => {
                    let index_expr = children
                        .get(2)
                        .ok_or_else(|| CompileError::malformed_ast("array subscript"))?;
                    self.push_variable(first)?;
                    self.gen_expression(index_expr)?;
                    self.emit("add");
                    self.emit("pop pointer 1");
                    self.emit("push that 0");
                }
                Some('(') | Some('.') => self.gen_call(children)?,
                _ => self.push_variable(first)?,
            },
            JackAst::Node { .. } => return Err(CompileError::malformed_ast("term shape")),
        }
        Ok(())
    }

    /// Emit a subroutine call from its spliced token fragment:
    /// `ID '(' EXPRESSION_LIST ')'` or `ID '.' ID '(' EXPRESSION_LIST ')'`.
    fn gen_call(&mut self, fragment: &[JackAst]) -> Result<(), CompileError> {
        let ids: Vec<&JackAst> = fragment
            .iter()
            .filter(|c| c.as_identifier().is_some())
            .collect();
        let expr_list = fragment
            .iter()
            .find_map(|c| c.children_of(NodeKind::ExpressionList))
            .ok_or_else(|| CompileError::malformed_ast("call argument list"))?;
        let args: Vec<&JackAst> = expr_list
            .iter()
            .filter(|c| c.is_node(NodeKind::Expression))
            .collect();

        match ids[..] {
            // Bare name: a method call on the current object
            [callee] => {
                let name = callee.as_identifier().unwrap_or_default();
                self.emit("push pointer 0");
                for arg in &args {
                    self.gen_expression(arg)?;
                }
                self.emit(format!(
                    "call {}.{} {}",
                    self.class_name,
                    name,
                    args.len() + 1
                ));
            }
            [qualifier, callee] => {
                let name = callee.as_identifier().unwrap_or_default();
                match qualifier.scope_info() {
                    // The qualifier is a variable: method call on that object,
                    // dispatched on its declared type
                    Some(ScopeInfo::Var { kind, index, typ, .. }) => {
                        self.emit(format!("push {} {}", segment(*kind), index));
                        for arg in &args {
                            self.gen_expression(arg)?;
                        }
                        self.emit(format!("call {}.{} {}", typ, name, args.len() + 1));
                    }
                    // Unresolved qualifier: a class name, plain function call
                    _ => {
                        let class = qualifier.as_identifier().unwrap_or_default();
                        for arg in &args {
                            self.gen_expression(arg)?;
                        }
                        self.emit(format!("call {}.{} {}", class, name, args.len()));
                    }
                }
            }
            _ => return Err(CompileError::malformed_ast("call identifiers")),
        }
        Ok(())
    }

    fn push_variable(&mut self, id: &JackAst) -> Result<(), CompileError> {
        let (kind, index) = variable_binding(id)?;
        self.emit(format!("push {} {}", segment(kind), index));
        Ok(())
    }
}

/// Storage binding of an identifier leaf; errors if the annotator did not
/// resolve it to a variable.
fn variable_binding(id: &JackAst) -> Result<(Kind, u16), CompileError> {
    match id.scope_info() {
        Some(ScopeInfo::Var { kind, index, .. }) => Ok((*kind, *index)),
        _ => Err(CompileError::malformed_ast(&format!(
            "identifier '{}' has no storage binding",
            id.as_identifier().unwrap_or("?")
        ))),
    }
}
