#[cfg(test)]
mod tests {
    use crate::symbols::{Kind, SymbolTable};

    #[test]
    fn define_and_lookup() {
        let mut table = SymbolTable::new();
        assert_eq!(table.define("x", "int", Kind::Field), Some(0));
        assert_eq!(table.define("y", "int", Kind::Field), Some(1));
        assert_eq!(table.define("s", "String", Kind::Static), Some(0));

        let entry = table.get("y").unwrap();
        assert_eq!(entry.typ, "int");
        assert_eq!(entry.kind, Kind::Field);
        assert_eq!(entry.index, 1);
        assert_eq!(table.kind_of("s"), Some(Kind::Static));
        assert_eq!(table.index_of("s"), Some(0));
        assert_eq!(table.type_of("s"), Some("String"));
    }

    #[test]
    fn unknown_name_is_none() {
        let table = SymbolTable::new();
        assert!(table.get("nothing").is_none());
        assert_eq!(table.kind_of("nothing"), None);
    }

    #[test]
    fn counters_are_per_kind() {
        let mut table = SymbolTable::new();
        table.define("f0", "int", Kind::Field);
        table.define("a0", "int", Kind::Arg);
        table.define("a1", "int", Kind::Arg);
        table.define("v0", "int", Kind::Var);
        assert_eq!(table.var_count(Kind::Field), 1);
        assert_eq!(table.var_count(Kind::Arg), 2);
        assert_eq!(table.var_count(Kind::Var), 1);
        assert_eq!(table.var_count(Kind::Static), 0);
    }

    #[test]
    fn subroutine_scope_shadows_class_scope() {
        let mut table = SymbolTable::new();
        table.define("x", "int", Kind::Field);
        table.define("x", "Point", Kind::Var);
        assert_eq!(table.kind_of("x"), Some(Kind::Var));
        assert_eq!(table.type_of("x"), Some("Point"));
    }

    #[test]
    fn start_subroutine_clears_locals_only() {
        let mut table = SymbolTable::new();
        table.define("f", "int", Kind::Field);
        table.define("a", "int", Kind::Arg);
        table.define("v", "int", Kind::Var);

        table.start_subroutine();
        assert!(table.get("a").is_none());
        assert!(table.get("v").is_none());
        assert_eq!(table.kind_of("f"), Some(Kind::Field));
        assert_eq!(table.var_count(Kind::Arg), 0);
        assert_eq!(table.var_count(Kind::Var), 0);
        assert_eq!(table.var_count(Kind::Field), 1);

        // Fresh counters start from zero again
        assert_eq!(table.define("b", "int", Kind::Arg), Some(0));
    }

    #[test]
    fn redefinition_in_same_scope_is_rejected() {
        let mut table = SymbolTable::new();
        assert_eq!(table.define("x", "int", Kind::Var), Some(0));
        assert_eq!(table.define("x", "int", Kind::Var), None);
        // Arg and var share the subroutine scope
        assert_eq!(table.define("x", "int", Kind::Arg), None);
        // A field named x is still allowed (different scope)
        assert_eq!(table.define("x", "int", Kind::Field), Some(0));
    }
}
