//! Table-driven parsing loop
//!
//! Walks a compiled [`Table`] with one lookahead token and an explicit stack of
//! return addresses. Calls into a nonterminal push the address after the call
//! step; steps without a branch target pop it. Action steps invoke their
//! handler and never consume input.
//!
//! The walk is deterministic: a fixed token stream always produces the same
//! sequence of handler invocations.

use thiserror::Error;

use crate::grammar::table::Table;
use crate::parser::actions::{ActionContext, ActionRegistry};
use crate::parser::builder::Defect;
use crate::parser::lexer::{LexError, Token, TokenSource};

/// User-facing parse errors. Parsing stops at the first one.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyntaxError {
    #[error(
        "unexpected {} at line {line}, column {column}{}",
        describe(.found),
        hint(.suggestion)
    )]
    Unexpected {
        line: usize,
        column: usize,
        /// Source text of the offending token, empty at end of file
        found: String,
        suggestion: Option<String>,
    },
    #[error(transparent)]
    Lex(#[from] LexError),
}

fn describe(found: &str) -> String {
    if found.is_empty() {
        "end of file".to_string()
    } else {
        format!("token '{found}'")
    }
}

fn hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(", maybe you meant '{s}'?"),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RunError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Internal(#[from] Defect),
}

impl From<LexError> for RunError {
    fn from(err: LexError) -> Self {
        RunError::Syntax(err.into())
    }
}

/// Drive `table` over `tokens`, firing handlers from `registry` on `state`.
///
/// Returns once the accept step is reached; the end-of-input token is matched
/// but never consumed.
pub fn run<S>(
    table: &Table,
    registry: &ActionRegistry<S>,
    state: &mut S,
    tokens: &mut dyn TokenSource,
) -> Result<(), RunError> {
    let mut stack: Vec<usize> = Vec::new();
    let mut index = 0;
    let mut lookahead = tokens.next_token()?;
    let mut previous: Option<Token> = None;

    loop {
        let step = table.step(index).ok_or(Defect::StepOutOfRange { index })?;

        if step.accept {
            if !stack.is_empty() {
                return Err(Defect::UnbalancedAccept { depth: stack.len() }.into());
            }
            log::trace!("{index}: accept");
            return Ok(());
        }

        if step.action {
            let handler = registry.get(&step.name).ok_or_else(|| Defect::Unwired {
                action: step.name.clone(),
            })?;
            log::trace!("{index}: action {}", step.name);
            let ctx = ActionContext {
                action: &step.name,
                lookahead: &lookahead,
                previous: previous.as_ref(),
            };
            handler(state, &ctx)?;
        } else if !step.accepts(lookahead.text()) {
            if step.failure {
                log::debug!("{index}: {} rejects {}", step.name, lookahead.text());
                return Err(SyntaxError::Unexpected {
                    line: lookahead.location.line,
                    column: lookahead.location.column,
                    found: lookahead.lexeme.clone(),
                    suggestion: step.suggestion().map(str::to_string),
                }
                .into());
            }
            // try the next alternative
            index += 1;
            continue;
        } else {
            if step.push {
                log::trace!("{index}: call <{}>", step.name);
                stack.push(index + 1);
            }
            if step.consume {
                log::trace!("{index}: consume {}", lookahead.text());
                let next = tokens.next_token()?;
                previous = Some(std::mem::replace(&mut lookahead, next));
            }
        }

        index = match step.next {
            Some(next) => next,
            None => {
                let back = stack.pop().ok_or(Defect::ReturnWithoutCaller { step: index })?;
                log::trace!("{index}: return to {back}");
                back
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::reader::read_grammar;
    use crate::parser::lexer::Lexer;

    const CALC: &str = "
        <Program>    -> <Expr> EndOfFile
        <Expr>       -> <Term> <ExprTail>
        <ExprTail>   -> Plus <Term> {add} <ExprTail>
        <ExprTail>   -> #Eps#
        <Term>       -> <Factor> <TermTail>
        <TermTail>   -> Mul <Factor> {mul} <TermTail>
        <TermTail>   -> #Eps#
        <Factor>     -> LeftParenthesis <Expr> RightParenthesis
        <Factor>     -> IntegerConstant {num}
        <Factor>     -> Minus <Factor> {neg}
    ";

    /// Records each action, with the lexeme it follows.
    fn record(log: &mut Vec<String>, ctx: &ActionContext<'_>) -> Result<(), Defect> {
        match ctx.previous {
            Some(token) if ctx.action == "num" => log.push(token.lexeme.clone()),
            _ => log.push(ctx.action.to_string()),
        }
        Ok(())
    }

    fn recorder(table: &Table) -> ActionRegistry<Vec<String>> {
        let mut registry = ActionRegistry::new();
        for name in table.actions() {
            registry.register(name, record);
        }
        registry
    }

    fn trace(table: &Table, source: &str) -> Result<Vec<String>, RunError> {
        let mut events = Vec::new();
        run(table, &recorder(table), &mut events, &mut Lexer::new(source))?;
        Ok(events)
    }

    #[test]
    fn test_postfix_action_order() {
        let table = Table::build(&read_grammar(CALC).unwrap()).unwrap();
        assert_eq!(
            trace(&table, "2 + 3 * 4").unwrap(),
            ["2", "3", "4", "mul", "add"]
        );
        assert_eq!(
            trace(&table, "(2 + 3) * -4").unwrap(),
            ["2", "3", "add", "4", "neg", "mul"]
        );
    }

    /// Records each action with the token still waiting to be read.
    fn peek(log: &mut Vec<String>, ctx: &ActionContext<'_>) -> Result<(), Defect> {
        log.push(format!("{}@{}", ctx.action, ctx.lookahead.text()));
        Ok(())
    }

    #[test]
    fn test_actions_see_unconsumed_lookahead() {
        let table = Table::build(&read_grammar(CALC).unwrap()).unwrap();
        let mut registry = ActionRegistry::new();
        for name in table.actions() {
            registry.register(name, peek);
        }
        let mut events = Vec::new();
        run(&table, &registry, &mut events, &mut Lexer::new("-1 * 2")).unwrap();
        assert_eq!(
            events,
            ["num@Mul", "neg@Mul", "num@EndOfFile", "mul@EndOfFile"]
        );
    }

    #[test]
    fn test_same_grammar_same_actions() {
        let grammar = read_grammar(CALC).unwrap();
        let first = Table::build(&grammar).unwrap();
        let second = Table::build(&grammar).unwrap();
        let source = "1 * (2 + 3) + -(4 * 5) * 6";
        assert_eq!(trace(&first, source).unwrap(), trace(&second, source).unwrap());
    }

    #[test]
    fn test_unexpected_token() {
        let table = Table::build(&read_grammar(CALC).unwrap()).unwrap();
        let err = trace(&table, "2 +\n  * 3").unwrap_err();
        assert_eq!(
            err,
            RunError::Syntax(SyntaxError::Unexpected {
                line: 2,
                column: 3,
                found: "*".to_string(),
                suggestion: Some("IntegerConstant".to_string()),
            })
        );
        assert_eq!(
            err.to_string(),
            "unexpected token '*' at line 2, column 3, maybe you meant 'IntegerConstant'?"
        );
    }

    #[test]
    fn test_trailing_input_is_rejected() {
        let table = Table::build(&read_grammar(CALC).unwrap()).unwrap();
        let err = trace(&table, "2 3").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unexpected token '3' at line 1, column 3, maybe you meant 'EndOfFile'?"
        );
    }

    #[test]
    fn test_early_end_of_file() {
        let table = Table::build(&read_grammar(CALC).unwrap()).unwrap();
        let err = trace(&table, "(2").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unexpected end of file at line 1, column 3, maybe you meant 'RightParenthesis'?"
        );
    }

    #[test]
    fn test_lex_error_is_a_syntax_error() {
        let table = Table::build(&read_grammar(CALC).unwrap()).unwrap();
        assert!(matches!(
            trace(&table, "2 + $"),
            Err(RunError::Syntax(SyntaxError::Lex(_)))
        ));
    }

    #[test]
    fn test_missing_handler_is_a_defect() {
        let table = Table::build(&read_grammar(CALC).unwrap()).unwrap();
        let registry = ActionRegistry::<Vec<String>>::new();
        let err = run(&table, &registry, &mut Vec::new(), &mut Lexer::new("1")).unwrap_err();
        assert_eq!(
            err,
            RunError::Internal(Defect::Unwired {
                action: "num".to_string()
            })
        );
    }
}
