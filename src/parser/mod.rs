//! # Jack Parser
//!
//! A predictive recursive-descent parser for the Jack grammar, one function
//! per grammar rule, built from the combinators in [`combinators`].
//!
//! Each rule consumes a token slice and returns the parsed fragment plus the
//! remaining tokens; `None` means the rule did not match at this position.
//! Rules that correspond to grammar non-terminals wrap their fragment in a
//! single [`ast::NodeKind`] node. `subroutineCall` is the one deliberately
//! unwrapped production: its tokens are spliced directly into the enclosing
//! `TERM` or `DO_STATEMENT`, which is where the code generator looks for
//! them.

#[macro_use]
mod combinators;
pub mod ast;


use crate::error::{CompileError, ErrorKind, Span};
use crate::tokenizer::token::{Keyword, Token, TokenKind};
use ast::{JackAst, NodeKind};
use combinators::{many, zero_or_one, Parsed};

/// The nine binary operators of Jack expressions.
const OPS: [char; 9] = ['+', '-', '*', '/', '&', '|', '<', '>', '='];

/// Parse a whole class file.
///
/// Fails if the token stream does not start with a well-formed class or if
/// tokens remain after the closing brace.
pub fn parse(tokens: &[Token]) -> Result<JackAst, CompileError> {
    let Some((nodes, rest)) = parse_class(tokens) else {
        let span = tokens.first().map_or_else(|| Span::line(1), |t| t.span);
        return Err(CompileError::new(
            ErrorKind::MalformedClass,
            "No class declaration matched the input",
            span,
        ));
    };
    if let Some(extra) = rest.first() {
        return Err(CompileError::new(
            ErrorKind::TrailingTokens,
            format!("{} unparsed tokens after class body", rest.len()),
            extra.span,
        ));
    }
    nodes.into_iter().next().ok_or_else(|| {
        CompileError::new(ErrorKind::MalformedClass, "Empty parse result", Span::line(1))
    })
}

// === Leaf parsers ===

fn kw(tokens: &[Token], keyword: Keyword) -> Parsed<'_> {
    match tokens.first() {
        Some(t) if t.is_keyword(keyword) => Some((vec![JackAst::Keyword(keyword)], &tokens[1..])),
        _ => None,
    }
}

fn sym(tokens: &[Token], symbol: char) -> Parsed<'_> {
    match tokens.first() {
        Some(t) if t.is_symbol(symbol) => Some((vec![JackAst::Symbol(symbol)], &tokens[1..])),
        _ => None,
    }
}

fn identifier(tokens: &[Token]) -> Parsed<'_> {
    match tokens.first() {
        Some(Token {
            kind: TokenKind::Identifier(name),
            ..
        }) => Some((vec![JackAst::identifier(name.clone())], &tokens[1..])),
        _ => None,
    }
}

fn int_const(tokens: &[Token]) -> Parsed<'_> {
    match tokens.first() {
        Some(Token {
            kind: TokenKind::IntConst(value),
            ..
        }) => Some((vec![JackAst::IntConst(*value)], &tokens[1..])),
        _ => None,
    }
}

fn string_const(tokens: &[Token]) -> Parsed<'_> {
    match tokens.first() {
        Some(Token {
            kind: TokenKind::StringConst(value),
            ..
        }) => Some((vec![JackAst::StrConst(value.clone())], &tokens[1..])),
        _ => None,
    }
}

// === Grammar rules ===

/// `class ::= 'class' ID '{' classVarDec* subroutineDec* '}'`
pub fn parse_class(tokens: &[Token]) -> Parsed<'_> {
    let (children, rest) = sequence!(
        tokens,
        |t| kw(t, Keyword::Class),
        identifier,
        |t| sym(t, '{'),
        |t| many(parse_class_var_dec, t),
        |t| many(parse_subroutine_dec, t),
        |t| sym(t, '}'),
    )?;
    Some((vec![JackAst::node(NodeKind::Class, children)], rest))
}

/// `classVarDec ::= ('static'|'field') type ID (',' ID)* ';'`
fn parse_class_var_dec(tokens: &[Token]) -> Parsed<'_> {
    let (children, rest) = sequence!(
        tokens,
        |t| choice!(t, |t| kw(t, Keyword::Static), |t| kw(t, Keyword::Field)),
        parse_type,
        identifier,
        |t| many(|t| sequence!(t, |t| sym(t, ','), identifier), t),
        |t| sym(t, ';'),
    )?;
    Some((vec![JackAst::node(NodeKind::ClassVarDec, children)], rest))
}

/// `type ::= 'int' | 'char' | 'boolean' | ID`
fn parse_type(tokens: &[Token]) -> Parsed<'_> {
    choice!(
        tokens,
        |t| kw(t, Keyword::Int),
        |t| kw(t, Keyword::Char),
        |t| kw(t, Keyword::Boolean),
        identifier,
    )
}

/// `subroutineDec ::= ('constructor'|'function'|'method') ('void'|type) ID
///                    '(' parameterList ')' subroutineBody`
fn parse_subroutine_dec(tokens: &[Token]) -> Parsed<'_> {
    let (children, rest) = sequence!(
        tokens,
        |t| choice!(
            t,
            |t| kw(t, Keyword::Constructor),
            |t| kw(t, Keyword::Function),
            |t| kw(t, Keyword::Method),
        ),
        |t| choice!(t, |t| kw(t, Keyword::Void), parse_type),
        identifier,
        |t| sym(t, '('),
        parse_parameter_list,
        |t| sym(t, ')'),
        parse_subroutine_body,
    )?;
    Some((vec![JackAst::node(NodeKind::SubroutineDec, children)], rest))
}

/// `parameterList ::= ((type ID) (',' type ID)*)?`; may be empty.
fn parse_parameter_list(tokens: &[Token]) -> Parsed<'_> {
    let (children, rest) = zero_or_one(
        |t| {
            sequence!(
                t,
                parse_type,
                identifier,
                |t| many(|t| sequence!(t, |t| sym(t, ','), parse_type, identifier), t),
            )
        },
        tokens,
    )?;
    Some((vec![JackAst::node(NodeKind::ParameterList, children)], rest))
}

/// `subroutineBody ::= '{' varDec* statements '}'`
fn parse_subroutine_body(tokens: &[Token]) -> Parsed<'_> {
    let (children, rest) = sequence!(
        tokens,
        |t| sym(t, '{'),
        |t| many(parse_var_dec, t),
        parse_statements,
        |t| sym(t, '}'),
    )?;
    Some((vec![JackAst::node(NodeKind::SubroutineBody, children)], rest))
}

/// `varDec ::= 'var' type ID (',' ID)* ';'`
fn parse_var_dec(tokens: &[Token]) -> Parsed<'_> {
    let (children, rest) = sequence!(
        tokens,
        |t| kw(t, Keyword::Var),
        parse_type,
        identifier,
        |t| many(|t| sequence!(t, |t| sym(t, ','), identifier), t),
        |t| sym(t, ';'),
    )?;
    Some((vec![JackAst::node(NodeKind::VarDec, children)], rest))
}

/// `statement*`, wrapped in a `STATEMENTS` node.
fn parse_statements(tokens: &[Token]) -> Parsed<'_> {
    let (children, rest) = many(parse_statement, tokens)?;
    Some((vec![JackAst::node(NodeKind::Statements, children)], rest))
}

fn parse_statement(tokens: &[Token]) -> Parsed<'_> {
    choice!(
        tokens,
        parse_let_statement,
        parse_if_statement,
        parse_while_statement,
        parse_do_statement,
        parse_return_statement,
    )
}

/// `letSt ::= 'let' ID ('[' expression ']')? '=' expression ';'`
fn parse_let_statement(tokens: &[Token]) -> Parsed<'_> {
    let (children, rest) = sequence!(
        tokens,
        |t| kw(t, Keyword::Let),
        identifier,
        |t| zero_or_one(
            |t| sequence!(t, |t| sym(t, '['), parse_expression, |t| sym(t, ']')),
            t,
        ),
        |t| sym(t, '='),
        parse_expression,
        |t| sym(t, ';'),
    )?;
    Some((vec![JackAst::node(NodeKind::LetStatement, children)], rest))
}

/// `ifSt ::= 'if' '(' expression ')' '{' statements '}'
///           ('else' '{' statements '}')?`
fn parse_if_statement(tokens: &[Token]) -> Parsed<'_> {
    let (children, rest) = sequence!(
        tokens,
        |t| kw(t, Keyword::If),
        |t| sym(t, '('),
        parse_expression,
        |t| sym(t, ')'),
        |t| sym(t, '{'),
        parse_statements,
        |t| sym(t, '}'),
        |t| zero_or_one(
            |t| {
                sequence!(
                    t,
                    |t| kw(t, Keyword::Else),
                    |t| sym(t, '{'),
                    parse_statements,
                    |t| sym(t, '}'),
                )
            },
            t,
        ),
    )?;
    Some((vec![JackAst::node(NodeKind::IfStatement, children)], rest))
}

/// `whileSt ::= 'while' '(' expression ')' '{' statements '}'`
fn parse_while_statement(tokens: &[Token]) -> Parsed<'_> {
    let (children, rest) = sequence!(
        tokens,
        |t| kw(t, Keyword::While),
        |t| sym(t, '('),
        parse_expression,
        |t| sym(t, ')'),
        |t| sym(t, '{'),
        parse_statements,
        |t| sym(t, '}'),
    )?;
    Some((vec![JackAst::node(NodeKind::WhileStatement, children)], rest))
}

/// `doSt ::= 'do' subroutineCall ';'`
fn parse_do_statement(tokens: &[Token]) -> Parsed<'_> {
    let (children, rest) = sequence!(
        tokens,
        |t| kw(t, Keyword::Do),
        parse_subroutine_call,
        |t| sym(t, ';'),
    )?;
    Some((vec![JackAst::node(NodeKind::DoStatement, children)], rest))
}

/// `returnSt ::= 'return' expression? ';'`
fn parse_return_statement(tokens: &[Token]) -> Parsed<'_> {
    let (children, rest) = sequence!(
        tokens,
        |t| kw(t, Keyword::Return),
        |t| zero_or_one(parse_expression, t),
        |t| sym(t, ';'),
    )?;
    Some((vec![JackAst::node(NodeKind::ReturnStatement, children)], rest))
}

/// `expression ::= term (op term)*`
fn parse_expression(tokens: &[Token]) -> Parsed<'_> {
    let (children, rest) = sequence!(
        tokens,
        parse_term,
        |t| many(|t| sequence!(t, parse_op, parse_term), t),
    )?;
    Some((vec![JackAst::node(NodeKind::Expression, children)], rest))
}

fn parse_op(tokens: &[Token]) -> Parsed<'_> {
    match tokens.first() {
        Some(Token {
            kind: TokenKind::Symbol(sym),
            ..
        }) if OPS.contains(sym) => Some((vec![JackAst::Symbol(*sym)], &tokens[1..])),
        _ => None,
    }
}

fn parse_unary_op(tokens: &[Token]) -> Parsed<'_> {
    choice!(tokens, |t| sym(t, '-'), |t| sym(t, '~'))
}

/// `term ::= INT | STR | keywordConst | subroutineCall | ID '[' expression ']'
///         | ID | '(' expression ')' | unaryOp term`
///
/// The call and array alternatives must run before the bare identifier so
/// that `foo(` and `foo[` are not claimed as a lone `foo`.
fn parse_term(tokens: &[Token]) -> Parsed<'_> {
    let (children, rest) = choice!(
        tokens,
        int_const,
        string_const,
        parse_keyword_constant,
        parse_subroutine_call,
        |t| sequence!(
            t,
            identifier,
            |t| sym(t, '['),
            parse_expression,
            |t| sym(t, ']'),
        ),
        identifier,
        |t| sequence!(t, |t| sym(t, '('), parse_expression, |t| sym(t, ')')),
        |t| sequence!(t, parse_unary_op, parse_term),
    )?;
    Some((vec![JackAst::node(NodeKind::Term, children)], rest))
}

fn parse_keyword_constant(tokens: &[Token]) -> Parsed<'_> {
    choice!(
        tokens,
        |t| kw(t, Keyword::True),
        |t| kw(t, Keyword::False),
        |t| kw(t, Keyword::Null),
        |t| kw(t, Keyword::This),
    )
}

/// `subroutineCall ::= (ID '.' ID | ID) '(' expressionList ')'`
///
/// Yields a fragment, not a node: the tokens are spliced into the enclosing
/// `TERM` or `DO_STATEMENT`. The qualified form is tried first so the dot is
/// consumed before the bare form can claim the leading identifier.
fn parse_subroutine_call(tokens: &[Token]) -> Parsed<'_> {
    choice!(
        tokens,
        |t| sequence!(
            t,
            identifier,
            |t| sym(t, '.'),
            identifier,
            |t| sym(t, '('),
            parse_expression_list,
            |t| sym(t, ')'),
        ),
        |t| sequence!(
            t,
            identifier,
            |t| sym(t, '('),
            parse_expression_list,
            |t| sym(t, ')'),
        ),
    )
}

/// `expressionList ::= (expression (',' expression)*)?`; may be empty.
fn parse_expression_list(tokens: &[Token]) -> Parsed<'_> {
    let (children, rest) = zero_or_one(
        |t| {
            sequence!(
                t,
                parse_expression,
                |t| many(|t| sequence!(t, |t| sym(t, ','), parse_expression), t),
            )
        },
        tokens,
    )?;
    Some((vec![JackAst::node(NodeKind::ExpressionList, children)], rest))
}
