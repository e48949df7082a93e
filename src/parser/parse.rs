//! Parser facade
//!
//! A [`Parser`] owns a grammar, the table compiled from it and the handler
//! registry, all checked once in [`Parser::new`]. Each parse then gets a fresh
//! lexer and [`AstBuilder`], so one parser can be reused for any number of
//! inputs.

use thiserror::Error;

use crate::config::{Config, Entry};
use crate::grammar::reader::ReadError;
use crate::grammar::table::Table;
use crate::grammar::{Grammar, GrammarError};
use crate::language;
use crate::parser::actions::{ActionRegistry, WiringError};
use crate::parser::ast::{Expr, Program, Stmt};
use crate::parser::builder::{self, AstBuilder, Defect};
use crate::parser::engine::{self, RunError, SyntaxError};
use crate::parser::lexer::{Lexer, TokenKind};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid grammar: {0}")]
    Read(#[from] ReadError),
    #[error("invalid grammar: {0}")]
    Grammar(#[from] GrammarError),
    #[error(transparent)]
    Wiring(#[from] WiringError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error("internal error: {0}")]
    Internal(#[from] Defect),
    #[error("parser is configured for the {configured} entry point, not {requested}")]
    WrongEntry { requested: Entry, configured: Entry },
}

impl Error {
    /// Errors caused by the parsed input rather than by the parser itself.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Error::Syntax(_))
    }
}

impl From<RunError> for Error {
    fn from(err: RunError) -> Self {
        match err {
            RunError::Syntax(err) => Error::Syntax(err),
            RunError::Internal(defect) => Error::Internal(defect),
        }
    }
}

/// Result of one parse, shaped by the entry point.
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    Program(Program),
    Statement(Stmt),
    Expression(Expr),
}

pub struct Parser {
    grammar: Grammar,
    table: Table,
    registry: ActionRegistry<AstBuilder>,
    entry: Entry,
}

impl Parser {
    /// Build the Yolang parser for `config`.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let grammar = language::grammar(config)?;
        Self::from_grammar(grammar, config.entry)
    }

    /// Build a parser from any grammar using the standard actions. `entry`
    /// decides how the builder is drained after accept.
    pub fn from_grammar(grammar: Grammar, entry: Entry) -> Result<Self, Error> {
        grammar.verify_terminals(|t| TokenKind::from_name(t).is_some())?;
        let table = Table::build(&grammar)?;
        let registry = builder::registry();
        registry.check(&table)?;
        log::debug!(
            "parser ready: <{}> ... {} ({} entry), {} steps, {} actions",
            table.start_symbol(),
            table.end_symbol(),
            entry,
            table.len(),
            table.actions().len()
        );
        Ok(Parser {
            grammar,
            table,
            registry,
            entry,
        })
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn entry(&self) -> Entry {
        self.entry
    }

    /// Parse `source` from the configured entry point.
    pub fn parse(&self, source: &str) -> Result<Ast, Error> {
        let builder = self.run(source)?;
        Ok(match self.entry {
            Entry::Program => Ast::Program(builder.finish_program()?),
            Entry::Statement => Ast::Statement(builder.finish_statement()?),
            Entry::Expression => Ast::Expression(builder.finish_expression()?),
        })
    }

    pub fn parse_program(&self, source: &str) -> Result<Program, Error> {
        self.require(Entry::Program)?;
        Ok(self.run(source)?.finish_program()?)
    }

    pub fn parse_statement(&self, source: &str) -> Result<Stmt, Error> {
        self.require(Entry::Statement)?;
        Ok(self.run(source)?.finish_statement()?)
    }

    pub fn parse_expression(&self, source: &str) -> Result<Expr, Error> {
        self.require(Entry::Expression)?;
        Ok(self.run(source)?.finish_expression()?)
    }

    fn require(&self, requested: Entry) -> Result<(), Error> {
        if self.entry == requested {
            Ok(())
        } else {
            Err(Error::WrongEntry {
                requested,
                configured: self.entry,
            })
        }
    }

    fn run(&self, source: &str) -> Result<AstBuilder, Error> {
        let mut builder = AstBuilder::new();
        let mut lexer = Lexer::new(source);
        engine::run(&self.table, &self.registry, &mut builder, &mut lexer)?;
        Ok(builder)
    }
}
