//! Action registry: the link between action markers in a table and the code
//! that runs when the engine reaches them.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::grammar::table::Table;
use crate::parser::builder::Defect;
use crate::parser::lexer::Token;

/// What a handler gets to see when its action fires.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    pub action: &'a str,
    /// Next unconsumed token
    pub lookahead: &'a Token,
    /// Most recently consumed token, if any
    pub previous: Option<&'a Token>,
}

pub type Handler<S> = fn(&mut S, &ActionContext<'_>) -> Result<(), Defect>;

/// Table actions without a handler; found before any input is parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WiringError {
    #[error("action '{name}' has no handler")]
    MissingHandler { name: String },
}

/// Handlers by action name, over some builder state `S`.
pub struct ActionRegistry<S> {
    handlers: FxHashMap<String, Handler<S>>,
}

impl<S> Default for ActionRegistry<S> {
    fn default() -> Self {
        ActionRegistry {
            handlers: FxHashMap::default(),
        }
    }
}

impl<S> ActionRegistry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the handler for `name`.
    pub fn register(&mut self, name: &str, handler: Handler<S>) -> &mut Self {
        self.handlers.insert(name.to_string(), handler);
        self
    }

    pub fn get(&self, name: &str) -> Option<Handler<S>> {
        self.handlers.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn names(&self) -> BTreeSet<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    /// Every action the table can fire must have a handler. Extra handlers
    /// are fine: one registry serves several grammar configurations.
    pub fn check(&self, table: &Table) -> Result<(), WiringError> {
        match table.actions().into_iter().find(|name| !self.contains(name)) {
            Some(name) => Err(WiringError::MissingHandler {
                name: name.to_string(),
            }),
            None => Ok(()),
        }
    }
}
