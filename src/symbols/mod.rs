//! # Jack Symbol Table
//!
//! Two-scope mapping from identifier names to `(type, kind, index)`.
//!
//! Class scope holds `static` and `field` symbols, subroutine scope holds
//! `arg` and `var` symbols. Lookups consult the subroutine scope first, so a
//! local may shadow a field. Indices count per kind; `start_subroutine`
//! clears the subroutine scope and its counters while class counters persist.

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::fmt;

/// Storage kind of a Jack symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Static,
    Field,
    Arg,
    Var,
}

impl Kind {
    fn is_class_scope(&self) -> bool {
        matches!(self, Kind::Static | Kind::Field)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kind::Static => "static",
            Kind::Field => "field",
            Kind::Arg => "arg",
            Kind::Var => "var",
        };
        f.write_str(s)
    }
}

/// A resolved symbol table entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolEntry {
    pub typ: String,
    pub kind: Kind,
    pub index: u16,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    class_scope: HashMap<String, SymbolEntry>,
    subroutine_scope: HashMap<String, SymbolEntry>,
    counters: HashMap<Kind, u16>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the subroutine scope for a new subroutine declaration.
    pub fn start_subroutine(&mut self) {
        self.subroutine_scope.clear();
        self.counters.insert(Kind::Arg, 0);
        self.counters.insert(Kind::Var, 0);
    }

    /// Define a new symbol and return its index within its kind.
    ///
    /// Returns `None` if the name is already defined in the scope the kind
    /// belongs to; the caller turns that into a scope error.
    pub fn define(&mut self, name: &str, typ: &str, kind: Kind) -> Option<u16> {
        let scope = if kind.is_class_scope() {
            &mut self.class_scope
        } else {
            &mut self.subroutine_scope
        };
        if scope.contains_key(name) {
            return None;
        }
        let counter = self.counters.entry(kind).or_insert(0);
        let index = *counter;
        *counter += 1;
        scope.insert(
            name.to_string(),
            SymbolEntry {
                typ: typ.to_string(),
                kind,
                index,
            },
        );
        Some(index)
    }

    /// Number of symbols of the given kind defined so far.
    pub fn var_count(&self, kind: Kind) -> u16 {
        self.counters.get(&kind).copied().unwrap_or(0)
    }

    /// Look a name up, subroutine scope first.
    pub fn get(&self, name: &str) -> Option<&SymbolEntry> {
        self.subroutine_scope
            .get(name)
            .or_else(|| self.class_scope.get(name))
    }

    pub fn kind_of(&self, name: &str) -> Option<Kind> {
        self.get(name).map(|e| e.kind)
    }

    pub fn type_of(&self, name: &str) -> Option<&str> {
        self.get(name).map(|e| e.typ.as_str())
    }

    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.get(name).map(|e| e.index)
    }
}
