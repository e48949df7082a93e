//! Yolang source code parser
//!
//! This module turns source text into an Abstract Syntax Tree (AST) by walking
//! a table compiled from a grammar:
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`engine`]: The table-driven loop (tokens → action events)
//! - [`actions`]: Action names → handlers
//! - [`builder`]: Handlers that assemble the AST from action events
//! - [`ast`]: AST node definitions
//! - [`visitor`]: Double-dispatch traversal and the term printer
//! - [`parse`]: The [`parse::Parser`] facade tying the pieces together
//!
//! # Errors
//!
//! Only [`engine::SyntaxError`] is caused by the input. Grammar errors and
//! missing handlers are found before any input is read, and a
//! [`builder::Defect`] means the grammar and the handlers disagree.

pub mod actions;
pub mod ast;
pub mod builder;
pub mod engine;
pub mod lexer;
pub mod parse;
pub mod visitor;
