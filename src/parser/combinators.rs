//! # Parser Combinators
//!
//! The building blocks of the recursive-descent parser: declarative macros
//! for fixed-shape rules plus small generic functions for repetition.
//!
//! Every parser has the shape `Fn(&[Token]) -> Parsed`, where a successful
//! parse yields a *fragment* (zero or more sibling AST nodes) together
//! with the unconsumed tail of the token slice. Fragments compose without
//! special cases: a leaf parser yields one node, `many` yields however many
//! its inner parser produced, and a grammar rule wraps its collected
//! fragment into a single inner node.
//!
//! `choice!` commits to the first matching alternative; the Jack grammar is
//! prefix-disambiguable under the orderings used in `parser::*`, so no
//! further backtracking is needed.

use crate::parser::ast::JackAst;
use crate::tokenizer::token::Token;

/// Result of a parser: matched fragment plus remaining tokens, or `None`.
pub type Parsed<'t> = Option<(Vec<JackAst>, &'t [Token])>;

/// Run each parser in order, concatenating their fragments. Fails if any
/// step fails.
macro_rules! sequence {
    ($tokens:expr, $($parser:expr),+ $(,)?) => {{
        let run = || {
            let mut children: Vec<$crate::parser::ast::JackAst> = Vec::new();
            let mut rest = $tokens;
            $(
                let (mut items, r) = ($parser)(rest)?;
                children.append(&mut items);
                rest = r;
            )+
            Some((children, rest))
        };
        run()
    }};
}

/// Try each parser in declared order, returning the first match.
macro_rules! choice {
    ($tokens:expr, $($parser:expr),+ $(,)?) => {{
        let run = || {
            $(
                if let Some(result) = ($parser)($tokens) {
                    return Some(result);
                }
            )+
            None
        };
        run()
    }};
}

/// Zero-or-more repetitions of `parser`. Never fails; an immediate mismatch
/// yields an empty fragment.
///
/// The inner parser must consume at least one token on success.
pub fn many<'t, P>(parser: P, tokens: &'t [Token]) -> Parsed<'t>
where
    P: Fn(&'t [Token]) -> Parsed<'t>,
{
    let mut children = Vec::new();
    let mut rest = tokens;
    while let Some((mut items, r)) = parser(rest) {
        children.append(&mut items);
        rest = r;
    }
    Some((children, rest))
}

/// Optional occurrence of `parser`; a mismatch yields an empty fragment.
pub fn zero_or_one<'t, P>(parser: P, tokens: &'t [Token]) -> Parsed<'t>
where
    P: Fn(&'t [Token]) -> Parsed<'t>,
{
    parser(tokens).or(Some((Vec::new(), tokens)))
}
