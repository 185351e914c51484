//! # Introduction
//!
//! `csyn` is the front-end data model of a C-source transpiler. It parses C
//! translation units into a graph of syntax nodes and walks that graph in a
//! fixed, deterministic order, visiting each node exactly once even where
//! types and declarations are shared between several parents.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Parser → Program → walk → dump / resolution / emission
//! ```
//!
//! 1. [`parser`]: tokenises the source and builds the node graph through a
//!    [`syntax::ProgramBuilder`].
//! 2. [`syntax`]: the node model. A [`syntax::Program`] owns every node in
//!    per-kind arenas; nodes refer to each other by typed index.
//! 3. [`walk`]: the traversal engine: enter/exit callbacks, optional depth,
//!    identity-deduplicated.
//! 4. [`dump`]: the depth-indented preorder dump used as a golden format.
//! 5. [`emit`]: per-declaration output routing with replacement and deletion
//!    directives, loaded from TOML.
//!
//! ## Example
//!
//! ```
//! let program = csyn::read("x.c", "int x;").unwrap();
//! assert_eq!(csyn::dump::dump(&program), "program\n  decl: x\n    type: Int\n");
//! ```

pub mod dump;
pub mod emit;
pub mod parser;
pub mod syntax;
pub mod walk;

pub use parser::ParseError;
pub use syntax::{Node, Program, Syntax};

/// Parse the C source text of `file` into a program.
///
/// A failed parse never yields a partial program.
pub fn read(file: &str, source: &str) -> Result<Program, ParseError> {
    parser::Parser::new(file, source)?.parse_program()
}
