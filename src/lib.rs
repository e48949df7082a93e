//! # Introduction
//!
//! Yolang is a small procedural language. This crate is its front end: a
//! grammar with embedded semantic actions is compiled into a flat LL(1)
//! automaton, and a table-driven engine walks that automaton over the token
//! stream, firing the actions that assemble the syntax tree.
//!
//! ## Pipeline
//!
//! ```text
//! Grammar text → Grammar → Table (once)
//! Source → Lexer → Engine + Table → actions → AstBuilder → AST
//! ```
//!
//! 1. [`grammar`]: productions, FIRST sets and the table compiler.
//! 2. [`parser`]: lexer, parsing engine, action registry, AST builder and
//!    the [`parser::parse::Parser`] facade.
//! 3. [`language`]: the Yolang productions for each [`config::Dialect`] and
//!    [`config::Entry`].
//!
//! ## Example
//!
//! ```
//! use yolang::config::{Config, Dialect, Entry};
//! use yolang::parser::parse::Parser;
//! use yolang::parser::visitor::Printer;
//!
//! let parser = Parser::new(&Config::new(Dialect::Basic, Entry::Expression)).unwrap();
//! let expr = parser.parse_expression("2 + 3 * 4").unwrap();
//! assert_eq!(Printer::expr(&expr), "+(2, *(3, 4))");
//! ```

pub mod config;
pub mod grammar;
pub mod language;
pub mod parser;
