//! Statement and label nodes

use std::fmt;

use super::location::Span;
use super::{DeclId, ExprId, LabelId, StmtId};

/// Statement operator tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StmtOp {
    StmtDecl,
    StmtExpr,
    Empty,
    Block,
    Break,
    Continue,
    Do,
    For,
    If,
    Goto,
    Return,
    Switch,
    While,
}

impl StmtOp {
    pub fn name(self) -> &'static str {
        match self {
            StmtOp::StmtDecl => "StmtDecl",
            StmtOp::StmtExpr => "StmtExpr",
            StmtOp::Empty => "Empty",
            StmtOp::Block => "Block",
            StmtOp::Break => "Break",
            StmtOp::Continue => "Continue",
            StmtOp::Do => "Do",
            StmtOp::For => "For",
            StmtOp::If => "If",
            StmtOp::Goto => "Goto",
            StmtOp::Return => "Return",
            StmtOp::Switch => "Switch",
            StmtOp::While => "While",
        }
    }
}

impl fmt::Display for StmtOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Empty,
    Block(Vec<StmtId>),
    Expr(ExprId),
    /// Block-scoped declaration. `int a, b;` becomes one statement per
    /// declarator.
    Decl(DeclId),
    If {
        cond: ExprId,
        then: StmtId,
        otherwise: Option<StmtId>,
    },
    While {
        cond: ExprId,
        body: StmtId,
    },
    Do {
        body: StmtId,
        cond: ExprId,
    },
    For {
        pre: Option<ExprId>,
        cond: Option<ExprId>,
        post: Option<ExprId>,
        /// `for (int i = 0; ...)` declares instead of evaluating `pre`.
        decl: Option<DeclId>,
        body: StmtId,
    },
    Switch {
        cond: ExprId,
        body: StmtId,
    },
    Return(Option<ExprId>),
    Break,
    Continue,
    Goto(String),
}

/// A parsed C statement together with the labels that precede it.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub labels: Vec<LabelId>,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        if let StmtKind::For { pre, decl, .. } = &kind {
            debug_assert!(
                pre.is_none() || decl.is_none(),
                "for statement with both an init expression and a declaration"
            );
        }
        Self {
            kind,
            labels: Vec::new(),
            span,
        }
    }

    pub fn with_labels(mut self, labels: Vec<LabelId>) -> Self {
        self.labels = labels;
        self
    }

    pub fn op(&self) -> StmtOp {
        match &self.kind {
            StmtKind::Empty => StmtOp::Empty,
            StmtKind::Block(_) => StmtOp::Block,
            StmtKind::Expr(_) => StmtOp::StmtExpr,
            StmtKind::Decl(_) => StmtOp::StmtDecl,
            StmtKind::If { .. } => StmtOp::If,
            StmtKind::While { .. } => StmtOp::While,
            StmtKind::Do { .. } => StmtOp::Do,
            StmtKind::For { .. } => StmtOp::For,
            StmtKind::Switch { .. } => StmtOp::Switch,
            StmtKind::Return(_) => StmtOp::Return,
            StmtKind::Break => StmtOp::Break,
            StmtKind::Continue => StmtOp::Continue,
            StmtKind::Goto(_) => StmtOp::Goto,
        }
    }

    /// `for` init expression.
    pub fn pre(&self) -> Option<ExprId> {
        match &self.kind {
            StmtKind::For { pre, .. } => *pre,
            _ => None,
        }
    }

    /// Condition, expression-statement or return value.
    pub fn expr(&self) -> Option<ExprId> {
        match &self.kind {
            StmtKind::Expr(expr) => Some(*expr),
            StmtKind::If { cond, .. }
            | StmtKind::While { cond, .. }
            | StmtKind::Do { cond, .. }
            | StmtKind::Switch { cond, .. } => Some(*cond),
            StmtKind::For { cond, .. } => *cond,
            StmtKind::Return(value) => *value,
            _ => None,
        }
    }

    /// `for` increment expression.
    pub fn post(&self) -> Option<ExprId> {
        match &self.kind {
            StmtKind::For { post, .. } => *post,
            _ => None,
        }
    }

    pub fn decl(&self) -> Option<DeclId> {
        match &self.kind {
            StmtKind::Decl(decl) => Some(*decl),
            StmtKind::For { decl, .. } => *decl,
            _ => None,
        }
    }

    pub fn body(&self) -> Option<StmtId> {
        match &self.kind {
            StmtKind::If { then, .. } => Some(*then),
            StmtKind::While { body, .. }
            | StmtKind::Do { body, .. }
            | StmtKind::For { body, .. }
            | StmtKind::Switch { body, .. } => Some(*body),
            _ => None,
        }
    }

    pub fn otherwise(&self) -> Option<StmtId> {
        match &self.kind {
            StmtKind::If { otherwise, .. } => *otherwise,
            _ => None,
        }
    }

    pub fn block(&self) -> &[StmtId] {
        match &self.kind {
            StmtKind::Block(stmts) => stmts,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LabelKind {
    Named(String),
    Case(ExprId),
    Default,
}

/// A branch target attached to a statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub kind: LabelKind,
    pub span: Span,
}

impl Label {
    pub fn new(kind: LabelKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn expr(&self) -> Option<ExprId> {
        match &self.kind {
            LabelKind::Case(value) => Some(*value),
            _ => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            LabelKind::Named(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelKind::Named(_) => f.write_str("LabelName"),
            LabelKind::Case(_) => f.write_str("Case"),
            LabelKind::Default => f.write_str("Default"),
        }
    }
}
