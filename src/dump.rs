//! Depth-indented preorder dump
//!
//! One line per node, indented two spaces per depth, in traversal order:
//!
//! ```text
//! program
//!   decl: main
//!     type: Func
//!       type: Int
//!     stmt: Block
//!       stmt: Return
//!         expr: Number, 0
//! ```
//!
//! Declarations show their name, types their kind and tag (or typedef
//! name), expressions their operator and, for names, numbers and member
//! accesses, their text. Shared nodes appear once, under the first parent
//! that reaches them. The format is stable and used for golden tests.

use crate::syntax::{Node, Program, Syntax};
use crate::walk::walk_with_depth;

/// Dump the whole program.
pub fn dump(program: &Program) -> String {
    dump_from(program, Syntax::Program)
}

/// Dump the syntax reachable from `root`, which is printed at depth 0.
pub fn dump_from(program: &Program, root: Syntax) -> String {
    let mut out = String::new();
    walk_with_depth(
        program,
        root,
        |syntax, depth| {
            out.push_str(&"  ".repeat(depth));
            out.push_str(&describe(program, syntax));
            out.push('\n');
        },
        |_, _| {},
    );
    out
}

/// The dump line for one node, without indentation.
pub fn describe(program: &Program, syntax: Syntax) -> String {
    match program.node(syntax) {
        Node::Program(_) => "program".to_string(),
        Node::Decl(decl) if decl.name.is_empty() => "decl".to_string(),
        Node::Decl(decl) => format!("decl: {}", decl.name),
        Node::Type(ty) => match ty.tag.as_deref().or(ty.name.as_deref()) {
            Some(tag) => format!("type: {} {}", ty.kind, tag),
            None => format!("type: {}", ty.kind),
        },
        Node::Expr(expr) => match expr.text() {
            Some(text) => format!("expr: {}, {}", expr.op(), text),
            None => format!("expr: {}", expr.op()),
        },
        Node::Stmt(stmt) => format!("stmt: {}", stmt.op()),
        Node::Init(_) => "init".to_string(),
        Node::Label(label) => match label.name() {
            Some(name) => format!("label: {}, {}", label.kind, name),
            None => format!("label: {}", label.kind),
        },
    }
}
