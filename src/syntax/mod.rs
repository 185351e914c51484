//! C syntax node model
//!
//! A parsed translation unit is a [`Program`]: the ordered top-level
//! declarations plus one arena per node kind. Nodes refer to each other by
//! typed index ([`DeclId`], [`TypeId`], [`ExprId`], [`StmtId`], [`InitId`],
//! [`LabelId`]), so identity is index identity: two nodes with equal
//! contents are still distinct, and a type shared by two declarations is one
//! node.
//!
//! - [`expr`]: expressions, initializers and designators
//! - [`stmt`]: statements and labels
//! - [`types`]: types and declarations
//! - [`location`]: spans and comments
//! - [`program`]: the arena-owning [`Program`] and its [`ProgramBuilder`]
//!
//! # Lifecycle
//!
//! Nodes are pushed through a [`ProgramBuilder`] while parsing and are
//! immutable once [`ProgramBuilder::finish`] returns. The only later writes
//! are the derived bindings (expression type and declaration, initializer
//! type, designator field, declaration output group), each settable once.

pub mod expr;
pub mod location;
pub mod program;
pub mod stmt;
pub mod types;

pub use expr::*;
pub use location::*;
pub use program::*;
pub use stmt::*;
pub use types::*;

macro_rules! node_ids {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(u32);

            impl $name {
                pub(crate) fn new(index: usize) -> Self {
                    Self(u32::try_from(index).expect("syntax arena exceeds u32::MAX nodes"))
                }

                pub fn index(self) -> usize {
                    self.0 as usize
                }
            }
        )*
    };
}

node_ids! {
    /// Index of a [`Decl`] in its program.
    DeclId,
    /// Index of a [`Type`] in its program.
    TypeId,
    /// Index of an [`Expr`] in its program.
    ExprId,
    /// Index of a [`Stmt`] in its program.
    StmtId,
    /// Index of an [`Init`] in its program.
    InitId,
    /// Index of a [`Label`] in its program.
    LabelId,
}

/// Identity of any node that takes part in traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Syntax {
    Program,
    Decl(DeclId),
    Type(TypeId),
    Expr(ExprId),
    Stmt(StmtId),
    Init(InitId),
    Label(LabelId),
}

impl From<DeclId> for Syntax {
    fn from(id: DeclId) -> Self {
        Syntax::Decl(id)
    }
}

impl From<TypeId> for Syntax {
    fn from(id: TypeId) -> Self {
        Syntax::Type(id)
    }
}

impl From<ExprId> for Syntax {
    fn from(id: ExprId) -> Self {
        Syntax::Expr(id)
    }
}

impl From<StmtId> for Syntax {
    fn from(id: StmtId) -> Self {
        Syntax::Stmt(id)
    }
}

impl From<InitId> for Syntax {
    fn from(id: InitId) -> Self {
        Syntax::Init(id)
    }
}

impl From<LabelId> for Syntax {
    fn from(id: LabelId) -> Self {
        Syntax::Label(id)
    }
}

/// A [`Syntax`] resolved against its program.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Program(&'a Program),
    Decl(&'a Decl),
    Type(&'a Type),
    Expr(&'a Expr),
    Stmt(&'a Stmt),
    Init(&'a Init),
    Label(&'a Label),
}
