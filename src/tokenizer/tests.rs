#[cfg(test)]
mod tokenizer_tests {
    use crate::error::ErrorKind;
    use crate::tokenizer::token::{Keyword, TokenKind};
    use crate::tokenizer::{tokenize, Tokenizer};

    fn lex_ok(input: &str) -> Vec<TokenKind> {
        let result = tokenize(input);
        assert!(
            result.errors.is_empty(),
            "Unexpected errors: {:?}",
            result.errors
        );
        result.tokens.into_iter().map(|t| t.kind).collect()
    }

    fn lex_errors(input: &str) -> Vec<ErrorKind> {
        let result = tokenize(input);
        result.errors.into_iter().map(|e| e.kind).collect()
    }

    #[test]
    fn empty_input() {
        assert_eq!(lex_ok(""), vec![]);
    }

    #[test]
    fn whitespace_only() {
        assert_eq!(lex_ok("  \n\t \r\n"), vec![]);
    }

    #[test]
    fn keywords() {
        assert_eq!(
            lex_ok("class var int return"),
            vec![
                TokenKind::Keyword(Keyword::Class),
                TokenKind::Keyword(Keyword::Var),
                TokenKind::Keyword(Keyword::Int),
                TokenKind::Keyword(Keyword::Return),
            ]
        );
    }

    #[test]
    fn keyword_prefix_is_identifier() {
        // 'double' must not lex as 'do' + 'uble'
        assert_eq!(
            lex_ok("double classic"),
            vec![
                TokenKind::Identifier("double".into()),
                TokenKind::Identifier("classic".into()),
            ]
        );
    }

    #[test]
    fn identifier_with_underscore_and_digits() {
        assert_eq!(
            lex_ok("_foo bar_2"),
            vec![
                TokenKind::Identifier("_foo".into()),
                TokenKind::Identifier("bar_2".into()),
            ]
        );
    }

    #[test]
    fn symbols_without_spaces() {
        assert_eq!(
            lex_ok("x[i]=y;"),
            vec![
                TokenKind::Identifier("x".into()),
                TokenKind::Symbol('['),
                TokenKind::Identifier("i".into()),
                TokenKind::Symbol(']'),
                TokenKind::Symbol('='),
                TokenKind::Identifier("y".into()),
                TokenKind::Symbol(';'),
            ]
        );
    }

    #[test]
    fn integer_bounds() {
        assert_eq!(
            lex_ok("0 32767"),
            vec![TokenKind::IntConst(0), TokenKind::IntConst(32767)]
        );
        assert_eq!(lex_errors("32768"), vec![ErrorKind::IntegerOutOfRange]);
        assert_eq!(
            lex_errors("99999999999999999999"),
            vec![ErrorKind::IntegerOutOfRange]
        );
    }

    #[test]
    fn string_constant() {
        assert_eq!(
            lex_ok("\"hello world\""),
            vec![TokenKind::StringConst("hello world".into())]
        );
        assert_eq!(lex_ok("\"\""), vec![TokenKind::StringConst(String::new())]);
    }

    #[test]
    fn unterminated_string() {
        assert_eq!(lex_errors("\"abc"), vec![ErrorKind::UnterminatedString]);
        assert_eq!(lex_errors("\"abc\nx"), vec![ErrorKind::UnterminatedString]);
    }

    #[test]
    fn line_comment() {
        assert_eq!(
            lex_ok("let // trailing words ;;;\nx"),
            vec![
                TokenKind::Keyword(Keyword::Let),
                TokenKind::Identifier("x".into()),
            ]
        );
    }

    #[test]
    fn block_comment() {
        assert_eq!(
            lex_ok("a /* b c */ d"),
            vec![
                TokenKind::Identifier("a".into()),
                TokenKind::Identifier("d".into()),
            ]
        );
    }

    #[test]
    fn multiline_doc_comment() {
        assert_eq!(
            lex_ok("/** doc\n * over\n * lines */ class"),
            vec![TokenKind::Keyword(Keyword::Class)]
        );
    }

    #[test]
    fn unterminated_block_comment() {
        assert_eq!(lex_errors("/* open"), vec![ErrorKind::UnterminatedComment]);
    }

    #[test]
    fn division_is_not_a_comment() {
        assert_eq!(
            lex_ok("a / b"),
            vec![
                TokenKind::Identifier("a".into()),
                TokenKind::Symbol('/'),
                TokenKind::Identifier("b".into()),
            ]
        );
    }

    #[test]
    fn unexpected_character() {
        assert_eq!(lex_errors("let # x"), vec![ErrorKind::UnexpectedCharacter]);
    }

    #[test]
    fn error_recovery_keeps_lexing() {
        let result = tokenize("let # x");
        assert_eq!(result.tokens.len(), 2); // let, x
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn spans_track_lines() {
        let result = tokenize("class\n  Main");
        assert_eq!(result.tokens[0].span.line, 1);
        assert_eq!(result.tokens[1].span.line, 2);
        assert_eq!(result.tokens[1].span.col, 3);
    }

    #[test]
    fn cursor_accessors() {
        let result = tokenize("class Main 5 \"s\" ;");
        let mut tkz = Tokenizer::new(result.tokens);
        assert!(tkz.current().is_none());

        tkz.advance();
        assert_eq!(tkz.keyword(), Some(Keyword::Class));
        assert_eq!(tkz.identifier(), None);

        tkz.advance();
        assert_eq!(tkz.identifier(), Some("Main"));

        tkz.advance();
        assert_eq!(tkz.int_val(), Some(5));

        tkz.advance();
        assert_eq!(tkz.string_val(), Some("s"));

        tkz.advance();
        assert_eq!(tkz.symbol(), Some(';'));
        assert!(!tkz.has_more_tokens());
    }
}
