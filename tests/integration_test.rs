// Integration tests for the Yolang front end

use expect_test::expect;
use yolang::config::{Config, Dialect, Entry};
use yolang::grammar::reader::read_grammar;
use yolang::grammar::GrammarError;
use yolang::parser::ast::{Expr, Literal, Stmt};
use yolang::parser::parse::{Error, Parser};
use yolang::parser::visitor::Printer;

fn statement(source: &str) -> Stmt {
    let parser = Parser::new(&Config::new(Dialect::Arrays, Entry::Statement)).expect("Parser creation failed");
    parser.parse_statement(source).expect("Parsing failed")
}

fn assign(name: &str, value: i64) -> Stmt {
    Stmt::Assign {
        name: name.to_string(),
        value: Expr::Literal(Literal::Int(value)),
    }
}

#[test]
fn test_nested_blocks() {
    let stmt = statement("{ { a=1; } { b=2; c=3; } }");
    assert_eq!(
        stmt,
        Stmt::Composite(vec![
            Stmt::Composite(vec![assign("a", 1)]),
            Stmt::Composite(vec![assign("b", 2), assign("c", 3)]),
        ])
    );
}

#[test]
fn test_if_with_else() {
    let Stmt::If {
        condition,
        then_branch,
        else_branch,
    } = statement("if (x) y=1; else y=2;")
    else {
        panic!("expected an if statement");
    };
    assert_eq!(condition, Expr::Identifier("x".to_string()));
    assert_eq!(*then_branch, assign("y", 1));
    assert_eq!(else_branch.as_deref(), Some(&assign("y", 2)));
}

#[test]
fn test_if_without_else() {
    let Stmt::If { else_branch, .. } = statement("if (x) y=1;") else {
        panic!("expected an if statement");
    };
    assert_eq!(else_branch, None);
}

#[test]
fn test_else_binds_to_nearest_if() {
    let stmt = statement("if (a) if (b) x=1; else x=2;");
    assert_eq!(Printer::stmt(&stmt), "if (a) if (b) x = 1; else x = 2;");
    let Stmt::If {
        then_branch,
        else_branch: None,
        ..
    } = stmt
    else {
        panic!("outer if must not take the else");
    };
    assert!(matches!(*then_branch, Stmt::If { else_branch: Some(_), .. }));
}

#[test]
fn test_statement_forms() {
    let cases = [
        ("var x: Int;", "var x: Int;"),
        ("var m: Float[][] = [[1.5]];", "var m: Float[][] = [[1.5]];"),
        ("m[0][1] = 2;", "m[0][1] = 2;"),
        ("return;", "return;"),
        ("return a == b;", "return ==(a, b);"),
        ("while (i < n) i = i + 1;", "while (<(i, n)) i = +(i, 1);"),
        ("scan(x, y);", "scan(x, y);"),
        ("print();", "print();"),
        ("go(1, \"two\");", "go(1, \"two\");"),
        ("{ }", "{ }"),
    ];
    for (source, rendered) in cases {
        assert_eq!(Printer::stmt(&statement(source)), rendered, "source: {source}");
    }
}

#[test]
fn test_full_program() {
    let source = r#"
        // recursive fibonacci
        func fib(n: Int) -> Int: {
            if (n < 2) return n;
            return fib(n - 1) + fib(n - 2);
        }

        func main(): {
            var xs: Int[] = [1, 2, 3];
            var i: Int = 0;
            while (i < 3) {
                xs[i] = xs[i] * 2;
                i = i + 1;
            }
            print("done", fib(10));
        }
    "#;

    let parser = Parser::new(&Config::default()).expect("Parser creation failed");
    let program = parser.parse_program(source).expect("Parsing failed");
    assert_eq!(program.functions.len(), 2);
    assert_eq!(program.functions[0].params.len(), 1);
    assert!(program.functions[1].return_type.is_none());

    expect![[r#"
        func fib(n: Int) -> Int: { if (<(n, 2)) return n; return +(fib(-(n, 1)), fib(-(n, 2))); }
        func main(): { var xs: Int[] = [1, 2, 3]; var i: Int = 0; while (<(i, 3)) { xs[i] = *(xs[i], 2); i = +(i, 1); } print("done", fib(10)); }
    "#]]
    .assert_eq(&Printer::program(&program));
}

#[test]
fn test_empty_program() {
    let parser = Parser::new(&Config::default()).unwrap();
    let program = parser.parse_program("  // nothing here\n").unwrap();
    assert!(program.functions.is_empty());
}

#[test]
fn test_missing_semicolon_reports_position() {
    let parser = Parser::new(&Config::default()).unwrap();
    let err = parser
        .parse_program("func main(): {\n    x = 1\n}\n")
        .unwrap_err();
    assert!(err.is_user_error());
    assert_eq!(
        err.to_string(),
        "unexpected token '}' at line 3, column 1, maybe you meant 'Semicolon'?"
    );
}

#[test]
fn test_ambiguous_grammar_never_parses() {
    let grammar = read_grammar(
        "
        <Start> -> <Value> EndOfFile
        <Value> -> Identifier {push_identifier}
        <Value> -> Identifier LeftParenthesis RightParenthesis
        ",
    )
    .unwrap();
    let err = Parser::from_grammar(grammar, Entry::Expression).err().unwrap();
    assert_eq!(
        err,
        Error::Grammar(GrammarError::Ambiguous {
            nonterminal: "Value".to_string(),
            terminal: "Identifier".to_string(),
        })
    );
    assert!(!err.is_user_error());
}

#[test]
fn test_rebuilding_is_deterministic() {
    let config = Config::new(Dialect::Arrays, Entry::Statement);
    let first = Parser::new(&config).unwrap();
    let second = Parser::new(&config).unwrap();
    assert_eq!(first.table(), second.table());

    let source = "{ var a: Int[] = [1]; if (a[0] > 0 || !f(a)) print(a[0]); else return; }";
    assert_eq!(first.parse_statement(source), second.parse_statement(source));
}

#[test]
fn test_parser_is_reusable() {
    let parser = Parser::new(&Config::new(Dialect::Basic, Entry::Statement)).unwrap();
    assert!(parser.parse_statement("x = ;").is_err());
    assert_eq!(parser.parse_statement("x = 1;").unwrap(), assign("x", 1));
}
