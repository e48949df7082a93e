//! Reader for the production authoring syntax
//!
//! ```text
//! <Factor> -> Minus <Factor> {unary_minus}
//! <Tail>   -> #Eps#
//! ```
//!
//! `<Name>` is a nonterminal reference, `{name}` an action marker, `#Eps#` the
//! epsilon marker and any other bare word a terminal (a lexer token kind name).

use thiserror::Error;

use super::{Grammar, GrammarError, Production, Symbol, EPSILON};

const ARROW: &str = "->";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReadError {
    #[error("line {line}: expected `<Name> -> symbols`")]
    MissingArrow { line: usize },
    #[error("line {line}: malformed left-hand side '{text}'")]
    BadLhs { line: usize, text: String },
    #[error("line {line}: malformed symbol '{text}'")]
    BadSymbol { line: usize, text: String },
    #[error("line {line}: {source}")]
    Grammar {
        line: usize,
        #[source]
        source: GrammarError,
    },
}

/// Parse one `<Lhs> -> ...` line. `line` is used for error messages only.
pub fn parse_production(text: &str, line: usize) -> Result<Production, ReadError> {
    let (lhs, rhs) = text
        .split_once(ARROW)
        .ok_or(ReadError::MissingArrow { line })?;

    let lhs = lhs.trim();
    let name = delimited(lhs, '<', '>').ok_or_else(|| ReadError::BadLhs {
        line,
        text: lhs.to_string(),
    })?;

    let symbols = rhs
        .split_whitespace()
        .map(|word| parse_symbol(word, line))
        .collect::<Result<Vec<_>, _>>()?;

    Production::new(name, symbols).map_err(|source| ReadError::Grammar { line, source })
}

/// Read a whole grammar, one production per line. Blank lines and `//`
/// comments are skipped.
pub fn read_grammar(text: &str) -> Result<Grammar, ReadError> {
    let mut grammar = Grammar::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }
        let production = parse_production(trimmed, line)?;
        grammar
            .add_production(production)
            .map_err(|source| ReadError::Grammar { line, source })?;
    }
    Ok(grammar)
}

fn parse_symbol(word: &str, line: usize) -> Result<Symbol, ReadError> {
    let bad = || ReadError::BadSymbol {
        line,
        text: word.to_string(),
    };

    if word == EPSILON {
        return Ok(Symbol::Epsilon);
    }
    match word.chars().next() {
        Some('<') => delimited(word, '<', '>').map(Symbol::nonterminal).ok_or_else(bad),
        Some('{') => delimited(word, '{', '}').map(Symbol::action).ok_or_else(bad),
        _ if word.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') => {
            Ok(Symbol::terminal(word))
        }
        _ => Err(bad()),
    }
}

/// Inner name of `open name close`, if non-empty and identifier-like.
fn delimited(word: &str, open: char, close: char) -> Option<&str> {
    let inner = word.strip_prefix(open)?.strip_suffix(close)?;
    let valid = !inner.is_empty() && inner.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then_some(inner)
}
