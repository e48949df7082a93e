use yolang::config::{Config, Dialect, Entry};
use yolang::parser::engine::SyntaxError;
use yolang::parser::parse::{Error, Parser};
use yolang::parser::visitor::Printer;

fn render(dialect: Dialect, source: &str) -> String {
    let parser = Parser::new(&Config::new(dialect, Entry::Expression)).expect("Parser creation failed");
    let expr = parser.parse_expression(source).expect("Parsing failed");
    Printer::expr(&expr)
}

fn arrays(source: &str) -> String {
    render(Dialect::Arrays, source)
}

#[test]
fn test_multiplication_binds_tighter() {
    assert_eq!(arrays("2 + 3 * 4"), "+(2, *(3, 4))");
    assert_eq!(arrays("(2 + 3) * 4"), "*(+(2, 3), 4)");
}

#[test]
fn test_unary_minus_binds_tightest() {
    assert_eq!(arrays("-2 * 3"), "*(-(2), 3)");
    assert_eq!(arrays("- -x"), "-(-(x))");
    assert_eq!(arrays("!x && -y % 2"), "&&(!(x), %(-(y), 2))");
}

#[test]
fn test_left_associativity() {
    assert_eq!(arrays("1 - 2 - 3"), "-(-(1, 2), 3)");
    assert_eq!(arrays("8 / 4 / 2"), "/(/(8, 4), 2)");
}

#[test]
fn test_precedence_ladder() {
    assert_eq!(
        arrays("a || b && c == d < e + f * g"),
        "||(a, &&(b, ==(c, <(d, +(e, *(f, g))))))"
    );
    assert_eq!(arrays("a != b >= c"), "!=(a, >=(b, c))");
}

#[test]
fn test_atoms() {
    assert_eq!(arrays("f(a, b[1][i + 1]) + g()"), "+(f(a, b[1][+(i, 1)]), g())");
    assert_eq!(arrays(r#"[1, 2.5, "s", [true, false]]"#), r#"[1, 2.5, "s", [true, false]]"#);
    assert_eq!(render(Dialect::Basic, "f(1) * +2"), "*(f(1), +(2))");
}

#[test]
fn test_incomplete_expression() {
    let parser = Parser::new(&Config::new(Dialect::Arrays, Entry::Expression)).unwrap();
    let err = parser.parse_expression("2 + ;").unwrap_err();
    assert!(err.is_user_error());
    match err {
        Error::Syntax(SyntaxError::Unexpected {
            line,
            column,
            found,
            suggestion,
        }) => {
            assert_eq!((line, column), (1, 5));
            assert_eq!(found, ";");
            assert_eq!(suggestion.as_deref(), Some("False"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_basic_dialect_rejects_indexing() {
    let parser = Parser::new(&Config::new(Dialect::Basic, Entry::Expression)).unwrap();
    let err = parser.parse_expression("a[1]").unwrap_err();
    assert_eq!(
        err.to_string(),
        "unexpected token '[' at line 1, column 2, maybe you meant 'EndOfFile'?"
    );
}
