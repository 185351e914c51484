//! Arena-owning program root and its builder

use thiserror::Error;

use super::expr::{Designator, Expr, Init};
use super::stmt::{Label, Stmt};
use super::types::{Decl, Type};
use super::{DeclId, ExprId, InitId, LabelId, Node, StmtId, Syntax, TypeId};

/// Errors from writing a derived field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("{what} of {node:?} is already bound")]
    AlreadyBound { node: Syntax, what: &'static str },

    #[error("prefix {index} of {init:?} is not a field designator")]
    NotAFieldDesignator { init: InitId, index: usize },
}

/// A parsed translation unit.
///
/// Owns every node reachable from its declarations. The whole graph is
/// dropped together with the program.
#[derive(Debug)]
pub struct Program {
    pub file: String,
    pub decls: Vec<DeclId>,
    decl_nodes: Vec<Decl>,
    type_nodes: Vec<Type>,
    expr_nodes: Vec<Expr>,
    stmt_nodes: Vec<Stmt>,
    init_nodes: Vec<Init>,
    label_nodes: Vec<Label>,
}

/// Number of nodes of each kind in a program, used to size traversal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArenaSizes {
    pub decls: usize,
    pub types: usize,
    pub exprs: usize,
    pub stmts: usize,
    pub inits: usize,
    pub labels: usize,
}

impl Program {
    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decl_nodes[id.index()]
    }

    pub fn ty(&self, id: TypeId) -> &Type {
        &self.type_nodes[id.index()]
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.expr_nodes[id.index()]
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmt_nodes[id.index()]
    }

    pub fn init(&self, id: InitId) -> &Init {
        &self.init_nodes[id.index()]
    }

    pub fn label(&self, id: LabelId) -> &Label {
        &self.label_nodes[id.index()]
    }

    /// Resolve `syntax`, or `None` if it names a node this program does
    /// not own.
    pub fn get(&self, syntax: Syntax) -> Option<Node<'_>> {
        Some(match syntax {
            Syntax::Program => Node::Program(self),
            Syntax::Decl(id) => Node::Decl(self.decl_nodes.get(id.index())?),
            Syntax::Type(id) => Node::Type(self.type_nodes.get(id.index())?),
            Syntax::Expr(id) => Node::Expr(self.expr_nodes.get(id.index())?),
            Syntax::Stmt(id) => Node::Stmt(self.stmt_nodes.get(id.index())?),
            Syntax::Init(id) => Node::Init(self.init_nodes.get(id.index())?),
            Syntax::Label(id) => Node::Label(self.label_nodes.get(id.index())?),
        })
    }

    /// Resolve `syntax`.
    ///
    /// # Panics
    ///
    /// Panics if `syntax` belongs to a different program.
    pub fn node(&self, syntax: Syntax) -> Node<'_> {
        match self.get(syntax) {
            Some(node) => node,
            None => panic!("{syntax:?} is not part of program {:?}", self.file),
        }
    }

    pub fn sizes(&self) -> ArenaSizes {
        ArenaSizes {
            decls: self.decl_nodes.len(),
            types: self.type_nodes.len(),
            exprs: self.expr_nodes.len(),
            stmts: self.stmt_nodes.len(),
            inits: self.init_nodes.len(),
            labels: self.label_nodes.len(),
        }
    }

    /// Top-level declaration named `name`, if any.
    pub fn lookup(&self, name: &str) -> Option<DeclId> {
        self.decls
            .iter()
            .copied()
            .find(|&id| self.decl(id).name == name)
    }

    // ===== Derived bindings =====

    pub fn bind_expr_type(&self, expr: ExprId, ty: TypeId) -> Result<(), BindError> {
        self.expr(expr)
            .x_type
            .set(ty)
            .map_err(|_| BindError::AlreadyBound {
                node: Syntax::Expr(expr),
                what: "type",
            })
    }

    pub fn bind_expr_decl(&self, expr: ExprId, decl: DeclId) -> Result<(), BindError> {
        self.expr(expr)
            .x_decl
            .set(decl)
            .map_err(|_| BindError::AlreadyBound {
                node: Syntax::Expr(expr),
                what: "declaration",
            })
    }

    pub fn bind_init_type(&self, init: InitId, ty: TypeId) -> Result<(), BindError> {
        self.init(init)
            .x_type
            .set(ty)
            .map_err(|_| BindError::AlreadyBound {
                node: Syntax::Init(init),
                what: "type",
            })
    }

    /// Bind the member declaration selected by the `index`th designator of
    /// `init`.
    pub fn bind_field(&self, init: InitId, index: usize, field: DeclId) -> Result<(), BindError> {
        let prefix = self
            .init(init)
            .prefixes
            .get(index)
            .ok_or(BindError::NotAFieldDesignator { init, index })?;
        match &prefix.designator {
            Designator::Field { x_decl, .. } => {
                x_decl.set(field).map_err(|_| BindError::AlreadyBound {
                    node: Syntax::Init(init),
                    what: "designator field",
                })
            }
            Designator::Index(_) => Err(BindError::NotAFieldDesignator { init, index }),
        }
    }

    /// Assign the output group `decl` is emitted into.
    pub fn assign_group(&self, decl: DeclId, group: impl Into<String>) -> Result<(), BindError> {
        self.decl(decl)
            .group
            .set(group.into())
            .map_err(|_| BindError::AlreadyBound {
                node: Syntax::Decl(decl),
                what: "output group",
            })
    }
}

/// Mutable arena used while a program is being parsed.
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    decl_nodes: Vec<Decl>,
    type_nodes: Vec<Type>,
    expr_nodes: Vec<Expr>,
    stmt_nodes: Vec<Stmt>,
    init_nodes: Vec<Init>,
    label_nodes: Vec<Label>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decl(&mut self, decl: Decl) -> DeclId {
        self.decl_nodes.push(decl);
        DeclId::new(self.decl_nodes.len() - 1)
    }

    pub fn ty(&mut self, ty: Type) -> TypeId {
        self.type_nodes.push(ty);
        TypeId::new(self.type_nodes.len() - 1)
    }

    pub fn expr(&mut self, expr: Expr) -> ExprId {
        self.expr_nodes.push(expr);
        ExprId::new(self.expr_nodes.len() - 1)
    }

    pub fn stmt(&mut self, stmt: Stmt) -> StmtId {
        self.stmt_nodes.push(stmt);
        StmtId::new(self.stmt_nodes.len() - 1)
    }

    pub fn init(&mut self, init: Init) -> InitId {
        self.init_nodes.push(init);
        InitId::new(self.init_nodes.len() - 1)
    }

    pub fn label(&mut self, label: Label) -> LabelId {
        self.label_nodes.push(label);
        LabelId::new(self.label_nodes.len() - 1)
    }

    pub fn get_decl(&self, id: DeclId) -> &Decl {
        &self.decl_nodes[id.index()]
    }

    pub fn get_type(&self, id: TypeId) -> &Type {
        &self.type_nodes[id.index()]
    }

    pub fn get_expr(&self, id: ExprId) -> &Expr {
        &self.expr_nodes[id.index()]
    }

    pub fn decl_mut(&mut self, id: DeclId) -> &mut Decl {
        &mut self.decl_nodes[id.index()]
    }

    /// Give a forward-declared struct, union or enum its members.
    pub fn complete_type(&mut self, id: TypeId, decls: Vec<DeclId>) {
        let ty = &mut self.type_nodes[id.index()];
        debug_assert!(ty.decls.is_empty(), "type {id:?} is already complete");
        ty.decls = decls;
    }

    /// Splice rewritten statements onto an expression.
    pub fn attach_block(&mut self, expr: ExprId, stmts: Vec<StmtId>) {
        self.expr_nodes[expr.index()].block.extend(stmts);
    }

    /// Freeze the arena into a program rooted at `decls`.
    pub fn finish(self, file: impl Into<String>, decls: Vec<DeclId>) -> Program {
        Program {
            file: file.into(),
            decls,
            decl_nodes: self.decl_nodes,
            type_nodes: self.type_nodes,
            expr_nodes: self.expr_nodes,
            stmt_nodes: self.stmt_nodes,
            init_nodes: self.init_nodes,
            label_nodes: self.label_nodes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{Prefix, SourceLocation, Span, TypeKind};

    fn span() -> Span {
        Span::at(SourceLocation::new(1, 1))
    }

    #[test]
    fn test_expr_bindings_are_write_once() {
        let mut b = ProgramBuilder::new();
        let int = b.ty(Type::basic(TypeKind::Int, span()));
        let x = b.decl(Decl::new("x", int, span()));
        let name = b.expr(Expr::name("x", span()));
        let program = b.finish("t.c", vec![x]);

        assert_eq!(program.expr(name).x_type(), None);
        assert_eq!(program.expr(name).x_decl(), None);

        program.bind_expr_type(name, int).unwrap();
        program.bind_expr_decl(name, x).unwrap();
        assert_eq!(program.expr(name).x_type(), Some(int));
        assert_eq!(program.expr(name).x_decl(), Some(x));

        assert_eq!(
            program.bind_expr_type(name, int),
            Err(BindError::AlreadyBound {
                node: Syntax::Expr(name),
                what: "type",
            })
        );
        assert!(program.bind_expr_decl(name, x).is_err());
    }

    #[test]
    fn test_field_designator_binding() {
        let mut b = ProgramBuilder::new();
        let int = b.ty(Type::basic(TypeKind::Int, span()));
        let a = b.decl(Decl::new("a", int, span()));
        let one = b.expr(Expr::number("1", span()));
        let zero = b.expr(Expr::number("0", span()));
        let init = b.init(Init::expr(
            vec![Prefix::field("a", span()), Prefix::index(zero, span())],
            one,
            span(),
        ));
        let program = b.finish("t.c", vec![]);

        program.bind_field(init, 0, a).unwrap();
        assert_eq!(program.init(init).prefixes[0].x_decl(), Some(a));
        assert!(program.bind_field(init, 0, a).is_err());
        assert_eq!(
            program.bind_field(init, 1, a),
            Err(BindError::NotAFieldDesignator { init, index: 1 })
        );
        assert!(program.bind_field(init, 7, a).is_err());

        program.bind_init_type(init, int).unwrap();
        assert_eq!(program.init(init).x_type(), Some(int));
    }

    #[test]
    fn test_get_rejects_foreign_ids() {
        let program = ProgramBuilder::new().finish("t.c", vec![]);
        assert!(program.get(Syntax::Program).is_some());
        assert!(program.get(Syntax::Expr(ExprId::new(0))).is_none());
    }

    #[test]
    fn test_group_assignment() {
        let mut b = ProgramBuilder::new();
        let int = b.ty(Type::basic(TypeKind::Int, span()));
        let x = b.decl(Decl::new("x", int, span()));
        let program = b.finish("t.c", vec![x]);

        assert_eq!(program.decl(x).group(), None);
        program.assign_group(x, "runtime").unwrap();
        assert_eq!(program.decl(x).group(), Some("runtime"));
        assert!(program.assign_group(x, "other").is_err());
        assert_eq!(program.lookup("x"), Some(x));
    }
}
