//! C source code parser
//!
//! This module turns C source text into a [`Program`](crate::syntax::Program)
//! node graph:
//! - [`lexer`]: Tokenization (source text → tokens and comments)
//! - [`parse`]: Parser state, scopes, helpers and the entry point
//! - `declarations`, `statements`, `expressions`: the grammar, split across
//!   `impl Parser` blocks
//!
//! # Supported C
//!
//! - Types: every basic arithmetic type, pointers, arrays, function types
//!   (including variadic and function pointers), structs, unions, enums,
//!   bit-fields, typedefs, `const`/`volatile`
//! - Declarations: storage classes, multiple declarators, initializers with
//!   designators, function definitions
//! - Statements: all C89 statements plus `for` declarations, labels
//! - Expressions: all operators, casts, compound literals, `sizeof`,
//!   `offsetof`, `va_arg`
//! - Preprocessor lines are skipped; input is expected to be preprocessed
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with precedence climbing for binary operators.
//! No external parser generator dependencies.

mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;

pub use lexer::{LexError, Lexer};
pub use parse::{ParseError, Parser};
