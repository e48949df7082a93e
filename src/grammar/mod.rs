//! Context-free grammar model and its compilation into a parse table
//!
//! - [`reader`]: the `<Lhs> -> sym {action} <Nt>` authoring syntax
//! - [`first`]: nullable and FIRST sets by fixed-point iteration
//! - [`table`]: the flat automaton walked by [`crate::parser::engine`]
//!
//! A [`Grammar`] is an ordered list of [`Production`]s. The left-hand side of the
//! first production is the start symbol, and its last symbol (always a terminal)
//! is the end-of-input marker for the whole grammar.

pub mod first;
pub mod reader;
pub mod table;

use std::fmt;

use thiserror::Error;

/// Spelling of the epsilon marker in the authoring syntax and in dumps.
pub const EPSILON: &str = "#Eps#";

/// Errors raised while building a grammar or compiling it into a table.
///
/// These are input-independent: a grammar that fails here never reaches the
/// parsing engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GrammarError {
    #[error("grammar has no productions")]
    Empty,
    #[error("production index {index} is out of range ({count} productions)")]
    OutOfRange { index: usize, count: usize },
    #[error("production for <{lhs}> has no symbols")]
    EmptyProduction { lhs: String },
    #[error("epsilon must be the only symbol of a production (in <{lhs}>)")]
    MisplacedEpsilon { lhs: String },
    #[error("the first production must end with a terminal, found {found}")]
    MissingEndTerminal { found: String },
    #[error("terminal '{terminal}' cannot be produced by the lexer")]
    UnknownTerminal { terminal: String },
    #[error("nonterminal <{name}> is referenced but never defined")]
    UndefinedNonterminal { name: String },
    #[error("alternatives of <{nonterminal}> both start with '{terminal}'")]
    Ambiguous { nonterminal: String, terminal: String },
    #[error("more than one alternative of <{nonterminal}> can derive the empty string")]
    AmbiguousEmpty { nonterminal: String },
    #[error("<{nonterminal}> is left-recursive")]
    LeftRecursive { nonterminal: String },
    #[error("start symbol <{name}> must have exactly one production")]
    StartAlternatives { name: String },
    #[error("start symbol <{name}> must not appear on a right-hand side")]
    StartReferenced { name: String },
}

/// One grammar symbol on the right-hand side of a production.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// Token text matched literally against the lexer's canonical kind names
    Terminal(String),
    /// Reference to another rule
    Nonterminal(String),
    /// Semantic action fired when reached; consumes nothing
    Action(String),
    Epsilon,
}

impl Symbol {
    pub fn terminal(text: impl Into<String>) -> Self {
        Symbol::Terminal(text.into())
    }

    pub fn nonterminal(name: impl Into<String>) -> Self {
        Symbol::Nonterminal(name.into())
    }

    pub fn action(name: impl Into<String>) -> Self {
        Symbol::Action(name.into())
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    /// Text of the symbol without its decoration.
    pub fn text(&self) -> &str {
        match self {
            Symbol::Terminal(s) | Symbol::Nonterminal(s) | Symbol::Action(s) => s,
            Symbol::Epsilon => EPSILON,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Terminal(s) => write!(f, "{s}"),
            Symbol::Nonterminal(s) => write!(f, "<{s}>"),
            Symbol::Action(s) => write!(f, "{{{s}}}"),
            Symbol::Epsilon => write!(f, "{EPSILON}"),
        }
    }
}

/// A left-hand nonterminal and the ordered symbols it expands to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    lhs: String,
    symbols: Vec<Symbol>,
}

impl Production {
    pub fn new(lhs: impl Into<String>, symbols: Vec<Symbol>) -> Result<Self, GrammarError> {
        let lhs = lhs.into();
        if symbols.is_empty() {
            return Err(GrammarError::EmptyProduction { lhs });
        }
        if symbols.len() > 1 && symbols.contains(&Symbol::Epsilon) {
            return Err(GrammarError::MisplacedEpsilon { lhs });
        }
        Ok(Production { lhs, symbols })
    }

    pub fn lhs(&self) -> &str {
        &self.lhs
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn last_symbol(&self) -> &Symbol {
        // `new` rejects empty productions
        &self.symbols[self.symbols.len() - 1]
    }

    /// True for the `#Eps#` alternative.
    pub fn is_epsilon(&self) -> bool {
        self.symbols == [Symbol::Epsilon]
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> ->", self.lhs)?;
        for symbol in &self.symbols {
            write!(f, " {symbol}")?;
        }
        Ok(())
    }
}

/// Ordered collection of productions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grammar {
    productions: Vec<Production>,
}

impl Grammar {
    pub fn new() -> Self {
        Grammar::default()
    }

    /// Append a production. The first one must end with a terminal, which
    /// becomes the end-of-input marker.
    pub fn add_production(&mut self, production: Production) -> Result<(), GrammarError> {
        if self.productions.is_empty() && !production.last_symbol().is_terminal() {
            return Err(GrammarError::MissingEndTerminal {
                found: production.last_symbol().to_string(),
            });
        }
        self.productions.push(production);
        Ok(())
    }

    pub fn production(&self, index: usize) -> Result<&Production, GrammarError> {
        self.productions.get(index).ok_or(GrammarError::OutOfRange {
            index,
            count: self.productions.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.productions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.productions.is_empty()
    }

    pub fn productions(&self) -> impl Iterator<Item = &Production> {
        self.productions.iter()
    }

    pub fn start_symbol(&self) -> Result<&str, GrammarError> {
        self.productions
            .first()
            .map(Production::lhs)
            .ok_or(GrammarError::Empty)
    }

    pub fn end_symbol(&self) -> Result<&str, GrammarError> {
        self.productions
            .first()
            .map(|p| p.last_symbol().text())
            .ok_or(GrammarError::Empty)
    }

    /// Check every terminal against what the lexer can produce.
    pub fn verify_terminals(&self, known: impl Fn(&str) -> bool) -> Result<(), GrammarError> {
        let unknown = self
            .productions
            .iter()
            .flat_map(|p| p.symbols.iter())
            .find(|s| matches!(s, Symbol::Terminal(t) if !known(t.as_str())));
        match unknown {
            Some(symbol) => Err(GrammarError::UnknownTerminal {
                terminal: symbol.text().to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for production in &self.productions {
            writeln!(f, "{production}")?;
        }
        Ok(())
    }
}
