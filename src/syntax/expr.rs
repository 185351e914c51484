//! Expression, initializer and designator nodes
//!
//! Every C operator form maps to one [`ExprOp`] discriminant. Operators that
//! share a field layout share an [`ExprKind`] variant, so a node can only
//! carry the operands its operator uses:
//!
//! | Variant                | Operators                                   | Operands              |
//! |------------------------|---------------------------------------------|-----------------------|
//! | [`ExprKind::Binary`]   | arithmetic, relational, logical, bitwise, assignment, `[]` | left, right |
//! | [`ExprKind::Unary`]    | `& * - + ! ~ ++ --`, parentheses, `sizeof expr` | operand           |
//! | [`ExprKind::Member`]   | `.` and `->`                                | object, field name    |
//! | [`ExprKind::Name`]     | identifiers                                 | text                  |
//! | [`ExprKind::Number`]   | numeric and character constants             | text                  |
//! | [`ExprKind::String`]   | string literals                             | literal pieces        |
//! | [`ExprKind::Call`]     | calls                                       | callee, arguments     |
//! | [`ExprKind::Cast`]     | `(T)x`                                      | operand, type         |
//! | [`ExprKind::CastInit`] | `(T){...}`                                  | type, initializer     |
//! | [`ExprKind::SizeofType`] | `sizeof(T)`                               | type                  |
//! | [`ExprKind::Offsetof`] | `offsetof(T, a.b)`                          | member path, type     |
//! | [`ExprKind::VaArg`]    | `va_arg(ap, T)`                             | va_list, type         |
//! | [`ExprKind::Comma`]    | `x, y, z`                                   | operand list          |
//! | [`ExprKind::Cond`]     | `x ? y : z`                                 | operand list          |

use std::fmt;
use std::sync::OnceLock;

use super::location::Span;
use super::{DeclId, ExprId, InitId, StmtId, TypeId};

/// Expression operator tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprOp {
    Add,        // Left + Right
    AddEq,      // Left += Right
    Addr,       // &Left
    And,        // Left & Right
    AndAnd,     // Left && Right
    AndEq,      // Left &= Right
    Arrow,      // Left->Text
    Call,       // Left(List)
    Cast,       // (Type)Left
    CastInit,   // (Type){Init}
    Comma,      // x, y, z; List = {x, y, z}
    Cond,       // x ? y : z; List = {x, y, z}
    Div,        // Left / Right
    DivEq,      // Left /= Right
    Dot,        // Left.Text
    Eq,         // Left = Right
    EqEq,       // Left == Right
    Gt,         // Left > Right
    GtEq,       // Left >= Right
    Index,      // Left[Right]
    Indir,      // *Left
    Lsh,        // Left << Right
    LshEq,      // Left <<= Right
    Lt,         // Left < Right
    LtEq,       // Left <= Right
    Minus,      // -Left
    Mod,        // Left % Right
    ModEq,      // Left %= Right
    Mul,        // Left * Right
    MulEq,      // Left *= Right
    Name,       // Text
    Not,        // !Left
    NotEq,      // Left != Right
    Number,     // Text (numeric or character constant)
    Offsetof,   // offsetof(Type, Left)
    Or,         // Left | Right
    OrEq,       // Left |= Right
    OrOr,       // Left || Right
    Paren,      // (Left)
    Plus,       // +Left
    PostDec,    // Left--
    PostInc,    // Left++
    PreDec,     // --Left
    PreInc,     // ++Left
    Rsh,        // Left >> Right
    RshEq,      // Left >>= Right
    SizeofExpr, // sizeof(Left)
    SizeofType, // sizeof(Type)
    String,     // Texts (adjacent string literals)
    Sub,        // Left - Right
    SubEq,      // Left -= Right
    Twid,       // ~Left
    VaArg,      // va_arg(Left, Type)
    Xor,        // Left ^ Right
    XorEq,      // Left ^= Right
}

impl ExprOp {
    pub fn name(self) -> &'static str {
        match self {
            ExprOp::Add => "Add",
            ExprOp::AddEq => "AddEq",
            ExprOp::Addr => "Addr",
            ExprOp::And => "And",
            ExprOp::AndAnd => "AndAnd",
            ExprOp::AndEq => "AndEq",
            ExprOp::Arrow => "Arrow",
            ExprOp::Call => "Call",
            ExprOp::Cast => "Cast",
            ExprOp::CastInit => "CastInit",
            ExprOp::Comma => "Comma",
            ExprOp::Cond => "Cond",
            ExprOp::Div => "Div",
            ExprOp::DivEq => "DivEq",
            ExprOp::Dot => "Dot",
            ExprOp::Eq => "Eq",
            ExprOp::EqEq => "EqEq",
            ExprOp::Gt => "Gt",
            ExprOp::GtEq => "GtEq",
            ExprOp::Index => "Index",
            ExprOp::Indir => "Indir",
            ExprOp::Lsh => "Lsh",
            ExprOp::LshEq => "LshEq",
            ExprOp::Lt => "Lt",
            ExprOp::LtEq => "LtEq",
            ExprOp::Minus => "Minus",
            ExprOp::Mod => "Mod",
            ExprOp::ModEq => "ModEq",
            ExprOp::Mul => "Mul",
            ExprOp::MulEq => "MulEq",
            ExprOp::Name => "Name",
            ExprOp::Not => "Not",
            ExprOp::NotEq => "NotEq",
            ExprOp::Number => "Number",
            ExprOp::Offsetof => "Offsetof",
            ExprOp::Or => "Or",
            ExprOp::OrEq => "OrEq",
            ExprOp::OrOr => "OrOr",
            ExprOp::Paren => "Paren",
            ExprOp::Plus => "Plus",
            ExprOp::PostDec => "PostDec",
            ExprOp::PostInc => "PostInc",
            ExprOp::PreDec => "PreDec",
            ExprOp::PreInc => "PreInc",
            ExprOp::Rsh => "Rsh",
            ExprOp::RshEq => "RshEq",
            ExprOp::SizeofExpr => "SizeofExpr",
            ExprOp::SizeofType => "SizeofType",
            ExprOp::String => "String",
            ExprOp::Sub => "Sub",
            ExprOp::SubEq => "SubEq",
            ExprOp::Twid => "Twid",
            ExprOp::VaArg => "VaArg",
            ExprOp::Xor => "Xor",
            ExprOp::XorEq => "XorEq",
        }
    }
}

impl fmt::Display for ExprOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Operators taking a left and a right operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Comparison
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    // Logical
    AndAnd,
    OrOr,
    // Bitwise
    And,
    Or,
    Xor,
    Lsh,
    Rsh,
    // Assignment
    Eq,
    AddEq,
    SubEq,
    MulEq,
    DivEq,
    ModEq,
    AndEq,
    OrEq,
    XorEq,
    LshEq,
    RshEq,
    // Subscript
    Index,
}

impl BinaryOp {
    /// True for `=` and every compound assignment.
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::AddEq
                | BinaryOp::SubEq
                | BinaryOp::MulEq
                | BinaryOp::DivEq
                | BinaryOp::ModEq
                | BinaryOp::AndEq
                | BinaryOp::OrEq
                | BinaryOp::XorEq
                | BinaryOp::LshEq
                | BinaryOp::RshEq
        )
    }
}

impl From<BinaryOp> for ExprOp {
    fn from(op: BinaryOp) -> Self {
        match op {
            BinaryOp::Add => ExprOp::Add,
            BinaryOp::Sub => ExprOp::Sub,
            BinaryOp::Mul => ExprOp::Mul,
            BinaryOp::Div => ExprOp::Div,
            BinaryOp::Mod => ExprOp::Mod,
            BinaryOp::EqEq => ExprOp::EqEq,
            BinaryOp::NotEq => ExprOp::NotEq,
            BinaryOp::Lt => ExprOp::Lt,
            BinaryOp::LtEq => ExprOp::LtEq,
            BinaryOp::Gt => ExprOp::Gt,
            BinaryOp::GtEq => ExprOp::GtEq,
            BinaryOp::AndAnd => ExprOp::AndAnd,
            BinaryOp::OrOr => ExprOp::OrOr,
            BinaryOp::And => ExprOp::And,
            BinaryOp::Or => ExprOp::Or,
            BinaryOp::Xor => ExprOp::Xor,
            BinaryOp::Lsh => ExprOp::Lsh,
            BinaryOp::Rsh => ExprOp::Rsh,
            BinaryOp::Eq => ExprOp::Eq,
            BinaryOp::AddEq => ExprOp::AddEq,
            BinaryOp::SubEq => ExprOp::SubEq,
            BinaryOp::MulEq => ExprOp::MulEq,
            BinaryOp::DivEq => ExprOp::DivEq,
            BinaryOp::ModEq => ExprOp::ModEq,
            BinaryOp::AndEq => ExprOp::AndEq,
            BinaryOp::OrEq => ExprOp::OrEq,
            BinaryOp::XorEq => ExprOp::XorEq,
            BinaryOp::LshEq => ExprOp::LshEq,
            BinaryOp::RshEq => ExprOp::RshEq,
            BinaryOp::Index => ExprOp::Index,
        }
    }
}

/// Operators taking a single operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Addr,       // &x
    Indir,      // *x
    Minus,      // -x
    Plus,       // +x
    Not,        // !x
    Twid,       // ~x
    PreInc,     // ++x
    PreDec,     // --x
    PostInc,    // x++
    PostDec,    // x--
    Paren,      // (x)
    SizeofExpr, // sizeof x
}

impl From<UnaryOp> for ExprOp {
    fn from(op: UnaryOp) -> Self {
        match op {
            UnaryOp::Addr => ExprOp::Addr,
            UnaryOp::Indir => ExprOp::Indir,
            UnaryOp::Minus => ExprOp::Minus,
            UnaryOp::Plus => ExprOp::Plus,
            UnaryOp::Not => ExprOp::Not,
            UnaryOp::Twid => ExprOp::Twid,
            UnaryOp::PreInc => ExprOp::PreInc,
            UnaryOp::PreDec => ExprOp::PreDec,
            UnaryOp::PostInc => ExprOp::PostInc,
            UnaryOp::PostDec => ExprOp::PostDec,
            UnaryOp::Paren => ExprOp::Paren,
            UnaryOp::SizeofExpr => ExprOp::SizeofExpr,
        }
    }
}

/// `.` or `->`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberOp {
    Dot,
    Arrow,
}

impl From<MemberOp> for ExprOp {
    fn from(op: MemberOp) -> Self {
        match op {
            MemberOp::Dot => ExprOp::Dot,
            MemberOp::Arrow => ExprOp::Arrow,
        }
    }
}

/// Operator-specific payload of an [`Expr`].
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Member {
        op: MemberOp,
        object: ExprId,
        field: String,
    },
    Name(String),
    Number(String),
    /// Adjacent string literals, each kept with its quotes.
    String(Vec<String>),
    Call {
        callee: ExprId,
        args: Vec<ExprId>,
    },
    Cast {
        ty: TypeId,
        operand: ExprId,
    },
    CastInit {
        ty: TypeId,
        init: InitId,
    },
    SizeofType {
        ty: TypeId,
    },
    Offsetof {
        ty: TypeId,
        member: ExprId,
    },
    VaArg {
        ap: ExprId,
        ty: TypeId,
    },
    Comma(Vec<ExprId>),
    /// Always three operands: condition, then, else.
    Cond(Vec<ExprId>),
}

/// A parsed C expression.
#[derive(Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    /// Statements spliced in by a rewriting pass; the parser leaves this empty.
    pub block: Vec<StmtId>,

    // derived information, written once by a resolution pass
    pub(crate) x_type: OnceLock<TypeId>,
    pub(crate) x_decl: OnceLock<DeclId>,
}

impl Expr {
    fn new(kind: ExprKind, span: Span) -> Self {
        Self {
            kind,
            span,
            block: Vec::new(),
            x_type: OnceLock::new(),
            x_decl: OnceLock::new(),
        }
    }

    pub fn binary(op: BinaryOp, left: ExprId, right: ExprId, span: Span) -> Self {
        Self::new(ExprKind::Binary { op, left, right }, span)
    }

    pub fn unary(op: UnaryOp, operand: ExprId, span: Span) -> Self {
        Self::new(ExprKind::Unary { op, operand }, span)
    }

    pub fn member(op: MemberOp, object: ExprId, field: impl Into<String>, span: Span) -> Self {
        Self::new(
            ExprKind::Member {
                op,
                object,
                field: field.into(),
            },
            span,
        )
    }

    pub fn name(text: impl Into<String>, span: Span) -> Self {
        Self::new(ExprKind::Name(text.into()), span)
    }

    pub fn number(text: impl Into<String>, span: Span) -> Self {
        Self::new(ExprKind::Number(text.into()), span)
    }

    pub fn string(texts: Vec<String>, span: Span) -> Self {
        debug_assert!(!texts.is_empty(), "string literal without pieces");
        Self::new(ExprKind::String(texts), span)
    }

    pub fn call(callee: ExprId, args: Vec<ExprId>, span: Span) -> Self {
        Self::new(ExprKind::Call { callee, args }, span)
    }

    pub fn cast(ty: TypeId, operand: ExprId, span: Span) -> Self {
        Self::new(ExprKind::Cast { ty, operand }, span)
    }

    pub fn cast_init(ty: TypeId, init: InitId, span: Span) -> Self {
        Self::new(ExprKind::CastInit { ty, init }, span)
    }

    pub fn sizeof_type(ty: TypeId, span: Span) -> Self {
        Self::new(ExprKind::SizeofType { ty }, span)
    }

    pub fn offsetof(ty: TypeId, member: ExprId, span: Span) -> Self {
        Self::new(ExprKind::Offsetof { ty, member }, span)
    }

    pub fn va_arg(ap: ExprId, ty: TypeId, span: Span) -> Self {
        Self::new(ExprKind::VaArg { ap, ty }, span)
    }

    pub fn comma(list: Vec<ExprId>, span: Span) -> Self {
        debug_assert!(list.len() >= 2, "comma expression needs two operands");
        Self::new(ExprKind::Comma(list), span)
    }

    pub fn cond(cond: ExprId, then: ExprId, otherwise: ExprId, span: Span) -> Self {
        Self::new(ExprKind::Cond(vec![cond, then, otherwise]), span)
    }

    /// The operator tag of this expression.
    pub fn op(&self) -> ExprOp {
        match &self.kind {
            ExprKind::Binary { op, .. } => (*op).into(),
            ExprKind::Unary { op, .. } => (*op).into(),
            ExprKind::Member { op, .. } => (*op).into(),
            ExprKind::Name(_) => ExprOp::Name,
            ExprKind::Number(_) => ExprOp::Number,
            ExprKind::String(_) => ExprOp::String,
            ExprKind::Call { .. } => ExprOp::Call,
            ExprKind::Cast { .. } => ExprOp::Cast,
            ExprKind::CastInit { .. } => ExprOp::CastInit,
            ExprKind::SizeofType { .. } => ExprOp::SizeofType,
            ExprKind::Offsetof { .. } => ExprOp::Offsetof,
            ExprKind::VaArg { .. } => ExprOp::VaArg,
            ExprKind::Comma(_) => ExprOp::Comma,
            ExprKind::Cond(_) => ExprOp::Cond,
        }
    }

    /// Name, number or member-field text, if this operator has one.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Name(text) | ExprKind::Number(text) => Some(text),
            ExprKind::Member { field, .. } => Some(field),
            _ => None,
        }
    }

    /// The left (or only) operand.
    pub fn left(&self) -> Option<ExprId> {
        match &self.kind {
            ExprKind::Binary { left, .. } => Some(*left),
            ExprKind::Unary { operand, .. } | ExprKind::Cast { operand, .. } => Some(*operand),
            ExprKind::Member { object, .. } => Some(*object),
            ExprKind::Call { callee, .. } => Some(*callee),
            ExprKind::Offsetof { member, .. } => Some(*member),
            ExprKind::VaArg { ap, .. } => Some(*ap),
            _ => None,
        }
    }

    pub fn right(&self) -> Option<ExprId> {
        match &self.kind {
            ExprKind::Binary { right, .. } => Some(*right),
            _ => None,
        }
    }

    /// Call arguments, or the operands of a comma or conditional expression.
    pub fn list(&self) -> &[ExprId] {
        match &self.kind {
            ExprKind::Call { args, .. } => args,
            ExprKind::Comma(list) | ExprKind::Cond(list) => list,
            _ => &[],
        }
    }

    /// Type operand of casts, `sizeof(T)`, `offsetof` and `va_arg`.
    pub fn type_operand(&self) -> Option<TypeId> {
        match &self.kind {
            ExprKind::Cast { ty, .. }
            | ExprKind::CastInit { ty, .. }
            | ExprKind::SizeofType { ty }
            | ExprKind::Offsetof { ty, .. }
            | ExprKind::VaArg { ty, .. } => Some(*ty),
            _ => None,
        }
    }

    pub fn init(&self) -> Option<InitId> {
        match &self.kind {
            ExprKind::CastInit { init, .. } => Some(*init),
            _ => None,
        }
    }

    /// Resolved expression type, once a resolution pass has bound it.
    pub fn x_type(&self) -> Option<TypeId> {
        self.x_type.get().copied()
    }

    /// Resolved declaration for names and member accesses.
    pub fn x_decl(&self) -> Option<DeclId> {
        self.x_decl.get().copied()
    }
}

/// One `.field =` or `[index] =` step of a designated initializer.
#[derive(Debug)]
pub struct Prefix {
    pub span: Span,
    pub designator: Designator,
}

#[derive(Debug)]
pub enum Designator {
    Field {
        name: String,
        x_decl: OnceLock<DeclId>,
    },
    Index(ExprId),
}

impl Prefix {
    pub fn field(name: impl Into<String>, span: Span) -> Self {
        Self {
            span,
            designator: Designator::Field {
                name: name.into(),
                x_decl: OnceLock::new(),
            },
        }
    }

    pub fn index(index: ExprId, span: Span) -> Self {
        Self {
            span,
            designator: Designator::Index(index),
        }
    }

    /// The member declaration a `.field` designator resolved to.
    pub fn x_decl(&self) -> Option<DeclId> {
        match &self.designator {
            Designator::Field { x_decl, .. } => x_decl.get().copied(),
            Designator::Index(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InitKind {
    Expr(ExprId),
    Braced(Vec<InitId>),
}

/// An initializer: a scalar expression or a brace list, optionally
/// preceded by designators.
#[derive(Debug)]
pub struct Init {
    pub prefixes: Vec<Prefix>,
    pub kind: InitKind,
    pub span: Span,

    pub(crate) x_type: OnceLock<TypeId>,
}

impl Init {
    pub fn expr(prefixes: Vec<Prefix>, expr: ExprId, span: Span) -> Self {
        Self {
            prefixes,
            kind: InitKind::Expr(expr),
            span,
            x_type: OnceLock::new(),
        }
    }

    pub fn braced(prefixes: Vec<Prefix>, braced: Vec<InitId>, span: Span) -> Self {
        Self {
            prefixes,
            kind: InitKind::Braced(braced),
            span,
            x_type: OnceLock::new(),
        }
    }

    pub fn scalar(&self) -> Option<ExprId> {
        match &self.kind {
            InitKind::Expr(expr) => Some(*expr),
            InitKind::Braced(_) => None,
        }
    }

    pub fn braced_items(&self) -> &[InitId] {
        match &self.kind {
            InitKind::Braced(items) => items,
            InitKind::Expr(_) => &[],
        }
    }

    pub fn x_type(&self) -> Option<TypeId> {
        self.x_type.get().copied()
    }
}
