//! Traversal engine
//!
//! Depth-first walk over the syntax graph of a [`Program`], visiting every
//! node reachable from a root exactly once. Types and declarations can be
//! shared between parents (and a self-referential struct reaches itself
//! through a pointer member), so each call keeps one visited bitmap per node
//! kind, sized to that kind's arena. A node is marked when it is entered; a
//! second path to it is skipped without firing any callback. Absent optional
//! children are simply not descended into. The walk keeps its pending
//! nodes on a heap-allocated stack, so deeply nested expressions do not
//! exhaust the calling thread's stack.
//!
//! # Child order
//!
//! ```text
//! Program → decls
//! Decl    → type, init, body
//! Init    → braced sub-initializers, scalar expr
//! Type    → base, member decls, width
//! Expr    → left, right, list, type operand, init, attached block
//! Stmt    → pre, expr, post, decl, body, else, block list, labels
//! Label   → case value
//! ```
//!
//! Designator prefixes of an initializer are not traversed.
//!
//! Callbacks run synchronously on the caller's thread. A [`Program`] is
//! `Sync`, so independent walks may run in parallel.

use log::trace;

use crate::syntax::{ArenaSizes, Program, Syntax};

/// Walk the syntax reachable from `root`, calling `enter` when a node is
/// first reached and `exit` after all of its children are done.
///
/// # Panics
///
/// Panics if the walk reaches a node the program does not own. That means
/// the graph and the walker disagree and nothing sensible can be visited.
pub fn walk<E, X>(program: &Program, root: Syntax, mut enter: E, mut exit: X)
where
    E: FnMut(Syntax),
    X: FnMut(Syntax),
{
    walk_with_depth(program, root, |x, _| enter(x), |x, _| exit(x));
}

/// Like [`walk`], also passing each node's depth: 0 for `root`, one more
/// for every structural descent.
///
/// # Panics
///
/// Same as [`walk`].
pub fn walk_with_depth<E, X>(program: &Program, root: Syntax, enter: E, exit: X)
where
    E: FnMut(Syntax, usize),
    X: FnMut(Syntax, usize),
{
    trace!("walk {:?} in {}", root, program.file);
    let mut walker = Walker {
        program,
        seen: Seen::new(program.sizes()),
        stack: Vec::new(),
        children: Vec::new(),
        enter,
        exit,
    };
    walker.run(root);
}

/// Call `f` for each node in a preorder traversal.
pub fn preorder<F>(program: &Program, root: Syntax, f: F)
where
    F: FnMut(Syntax),
{
    walk(program, root, f, |_| {});
}

/// Call `f` for each node in a postorder traversal.
pub fn postorder<F>(program: &Program, root: Syntax, f: F)
where
    F: FnMut(Syntax),
{
    walk(program, root, |_| {}, f);
}

/// Per-walk visited bitmaps.
struct Seen {
    program: bool,
    decls: Vec<bool>,
    types: Vec<bool>,
    exprs: Vec<bool>,
    stmts: Vec<bool>,
    inits: Vec<bool>,
    labels: Vec<bool>,
}

impl Seen {
    fn new(sizes: ArenaSizes) -> Self {
        Self {
            program: false,
            decls: vec![false; sizes.decls],
            types: vec![false; sizes.types],
            exprs: vec![false; sizes.exprs],
            stmts: vec![false; sizes.stmts],
            inits: vec![false; sizes.inits],
            labels: vec![false; sizes.labels],
        }
    }

    /// Mark `x` as visited, returning whether it was new.
    fn insert(&mut self, x: Syntax) -> bool {
        let slot = match x {
            Syntax::Program => Some(&mut self.program),
            Syntax::Decl(id) => self.decls.get_mut(id.index()),
            Syntax::Type(id) => self.types.get_mut(id.index()),
            Syntax::Expr(id) => self.exprs.get_mut(id.index()),
            Syntax::Stmt(id) => self.stmts.get_mut(id.index()),
            Syntax::Init(id) => self.inits.get_mut(id.index()),
            Syntax::Label(id) => self.labels.get_mut(id.index()),
        };
        match slot {
            Some(slot) => !std::mem::replace(slot, true),
            None => panic!("walk: unexpected syntax {x:?}"),
        }
    }
}

/// A pending step of a walk.
enum Frame {
    Enter(Syntax, usize),
    Exit(Syntax, usize),
}

struct Walker<'p, E, X> {
    program: &'p Program,
    seen: Seen,
    stack: Vec<Frame>,
    children: Vec<Syntax>,
    enter: E,
    exit: X,
}

impl<E, X> Walker<'_, E, X>
where
    E: FnMut(Syntax, usize),
    X: FnMut(Syntax, usize),
{
    fn run(&mut self, root: Syntax) {
        self.stack.push(Frame::Enter(root, 0));
        while let Some(frame) = self.stack.pop() {
            match frame {
                Frame::Enter(x, depth) => {
                    if !self.seen.insert(x) {
                        continue;
                    }
                    (self.enter)(x, depth);
                    self.stack.push(Frame::Exit(x, depth));

                    // pushed in reverse so the first child is popped first
                    children(self.program, x, &mut self.children);
                    self.stack.extend(
                        self.children
                            .drain(..)
                            .rev()
                            .map(|child| Frame::Enter(child, depth + 1)),
                    );
                }
                Frame::Exit(x, depth) => (self.exit)(x, depth),
            }
        }
    }
}

/// Append the children of `x` to `out` in walk order.
fn children(program: &Program, x: Syntax, out: &mut Vec<Syntax>) {
    fn push<T: Into<Syntax>>(out: &mut Vec<Syntax>, x: Option<T>) {
        if let Some(x) = x {
            out.push(x.into());
        }
    }

    match x {
        Syntax::Program => out.extend(program.decls.iter().map(|&d| Syntax::Decl(d))),

        Syntax::Decl(id) => {
            let decl = program.decl(id);
            out.push(decl.ty.into());
            push(out, decl.init);
            push(out, decl.body);
        }

        Syntax::Init(id) => {
            let init = program.init(id);
            out.extend(init.braced_items().iter().map(|&i| Syntax::Init(i)));
            push(out, init.scalar());
        }

        Syntax::Type(id) => {
            let ty = program.ty(id);
            push(out, ty.base);
            out.extend(ty.decls.iter().map(|&d| Syntax::Decl(d)));
            push(out, ty.width);
        }

        Syntax::Expr(id) => {
            let expr = program.expr(id);
            push(out, expr.left());
            push(out, expr.right());
            out.extend(expr.list().iter().map(|&e| Syntax::Expr(e)));
            push(out, expr.type_operand());
            push(out, expr.init());
            out.extend(expr.block.iter().map(|&s| Syntax::Stmt(s)));
        }

        Syntax::Stmt(id) => {
            let stmt = program.stmt(id);
            push(out, stmt.pre());
            push(out, stmt.expr());
            push(out, stmt.post());
            push(out, stmt.decl());
            push(out, stmt.body());
            push(out, stmt.otherwise());
            out.extend(stmt.block().iter().map(|&s| Syntax::Stmt(s)));
            out.extend(stmt.labels.iter().map(|&l| Syntax::Label(l)));
        }

        Syntax::Label(id) => push(out, program.label(id).expr()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::*;
    use rustc_hash::FxHashMap;
    use std::cell::RefCell;

    fn span() -> Span {
        Span::at(SourceLocation::new(1, 1))
    }

    /// `struct S { int a; int b; } v1, v2;` with one shared struct type.
    fn shared_struct() -> (Program, TypeId, DeclId, DeclId) {
        let mut b = ProgramBuilder::new();
        let int = b.ty(Type::basic(TypeKind::Int, span()));
        let a = b.decl(Decl::new("a", int, span()));
        let bb = b.decl(Decl::new("b", int, span()));
        let s = b.ty(Type::record(
            TypeKind::Struct,
            Some("S".into()),
            vec![a, bb],
            span(),
        ));
        let v1 = b.decl(Decl::new("v1", s, span()));
        let v2 = b.decl(Decl::new("v2", s, span()));
        (b.finish("s.c", vec![v1, v2]), s, a, bb)
    }

    /// `int f(int n) { for (i = 0; i < n; i++) L: ; return (long)n; }`
    fn function() -> Program {
        let mut b = ProgramBuilder::new();
        let int = b.ty(Type::basic(TypeKind::Int, span()));
        let long = b.ty(Type::basic(TypeKind::Long, span()));
        let n = b.decl(Decl::new("n", int, span()));
        let fty = b.ty(Type::function(int, vec![n], false, span()));

        let i = b.expr(Expr::name("i", span()));
        let zero = b.expr(Expr::number("0", span()));
        let pre = b.expr(Expr::binary(BinaryOp::Eq, i, zero, span()));
        let i2 = b.expr(Expr::name("i", span()));
        let n2 = b.expr(Expr::name("n", span()));
        let cond = b.expr(Expr::binary(BinaryOp::Lt, i2, n2, span()));
        let i3 = b.expr(Expr::name("i", span()));
        let post = b.expr(Expr::unary(UnaryOp::PostInc, i3, span()));
        let label = b.label(Label::new(LabelKind::Named("L".into()), span()));
        let empty = b.stmt(Stmt::new(StmtKind::Empty, span()).with_labels(vec![label]));
        let for_stmt = b.stmt(Stmt::new(
            StmtKind::For {
                pre: Some(pre),
                cond: Some(cond),
                post: Some(post),
                decl: None,
                body: empty,
            },
            span(),
        ));
        let n3 = b.expr(Expr::name("n", span()));
        let cast = b.expr(Expr::cast(long, n3, span()));
        let ret = b.stmt(Stmt::new(StmtKind::Return(Some(cast)), span()));
        let body = b.stmt(Stmt::new(StmtKind::Block(vec![for_stmt, ret]), span()));
        let f = b.decl(Decl::new("f", fty, span()).with_body(body));
        b.finish("f.c", vec![f])
    }

    fn enters(program: &Program, root: Syntax) -> Vec<Syntax> {
        let mut out = Vec::new();
        walk(program, root, |x| out.push(x), |_| {});
        out
    }

    #[test]
    fn test_every_node_entered_and_exited_once() {
        let program = function();
        let mut entered: FxHashMap<Syntax, usize> = FxHashMap::default();
        let mut exited: FxHashMap<Syntax, usize> = FxHashMap::default();
        walk(
            &program,
            Syntax::Program,
            |x| *entered.entry(x).or_default() += 1,
            |x| *exited.entry(x).or_default() += 1,
        );

        let sizes = program.sizes();
        // every node of this program is reachable
        let total = 1 + sizes.decls + sizes.types + sizes.exprs + sizes.stmts + sizes.labels;
        assert_eq!(entered.len(), total);
        assert!(entered.values().all(|&n| n == 1));
        assert_eq!(entered, exited);
    }

    #[test]
    fn test_child_exits_before_parent() {
        let program = function();
        let open: RefCell<Vec<Syntax>> = RefCell::new(Vec::new());
        let mut exit_order: Vec<Syntax> = Vec::new();
        let mut parent: FxHashMap<Syntax, Syntax> = FxHashMap::default();
        walk(
            &program,
            Syntax::Program,
            |x| {
                let mut open = open.borrow_mut();
                if let Some(&p) = open.last() {
                    parent.insert(x, p);
                }
                open.push(x);
            },
            |x| {
                assert_eq!(open.borrow_mut().pop(), Some(x));
                exit_order.push(x);
            },
        );

        let position = |x: Syntax| exit_order.iter().position(|&y| y == x).unwrap();
        for (&child, &p) in &parent {
            assert!(position(child) < position(p), "{child:?} exited after {p:?}");
        }
        assert_eq!(exit_order.last(), Some(&Syntax::Program));
    }

    #[test]
    fn test_shared_type_visited_once() {
        let (program, s, a, b) = shared_struct();
        let seen = enters(&program, Syntax::Program);

        assert_eq!(seen.iter().filter(|&&x| x == Syntax::Type(s)).count(), 1);
        assert_eq!(seen.iter().filter(|&&x| x == Syntax::Decl(a)).count(), 1);
        assert_eq!(seen.iter().filter(|&&x| x == Syntax::Decl(b)).count(), 1);
        // v1, S, a, int, b all come before v2; v2 has nothing new below it
        assert_eq!(seen.len(), 7);
        assert_eq!(seen[6], Syntax::Decl(program.decls[1]));
    }

    #[test]
    fn test_self_referential_struct_terminates() {
        // struct node { struct node *next; } head;
        let mut b = ProgramBuilder::new();
        let node = b.ty(Type::record(TypeKind::Struct, Some("node".into()), vec![], span()));
        let ptr = b.ty(Type::pointer(node, span()));
        let next = b.decl(Decl::new("next", ptr, span()));
        b.complete_type(node, vec![next]);
        let head = b.decl(Decl::new("head", node, span()));
        let program = b.finish("list.c", vec![head]);

        let mut trace = Vec::new();
        walk_with_depth(&program, Syntax::Program, |x, d| trace.push((x, d)), |_, _| {});
        assert_eq!(
            trace,
            vec![
                (Syntax::Program, 0),
                (Syntax::Decl(head), 1),
                (Syntax::Type(node), 2),
                (Syntax::Decl(next), 3),
                (Syntax::Type(ptr), 4),
            ]
        );
    }

    #[test]
    fn test_depth_is_parent_plus_one() {
        let program = function();
        let open: RefCell<Vec<usize>> = RefCell::new(Vec::new());
        walk_with_depth(
            &program,
            Syntax::Program,
            |x, depth| {
                let mut open = open.borrow_mut();
                match open.last() {
                    None => assert_eq!(depth, 0, "{x:?}"),
                    Some(&parent) => assert_eq!(depth, parent + 1, "{x:?}"),
                }
                open.push(depth);
            },
            |_, depth| assert_eq!(open.borrow_mut().pop(), Some(depth)),
        );
        assert!(open.borrow().is_empty());
    }

    #[test]
    fn test_preorder_and_postorder_match_walk() {
        let program = function();
        let (mut pre, mut post) = (Vec::new(), Vec::new());
        walk(&program, Syntax::Program, |x| pre.push(x), |x| post.push(x));

        let mut only_pre = Vec::new();
        preorder(&program, Syntax::Program, |x| only_pre.push(x));
        let mut only_post = Vec::new();
        postorder(&program, Syntax::Program, |x| only_post.push(x));

        assert_eq!(pre, only_pre);
        assert_eq!(post, only_post);
        assert_eq!(pre.first(), Some(&Syntax::Program));
        assert_eq!(post.last(), Some(&Syntax::Program));
    }

    #[test]
    fn test_statement_and_expression_child_order() {
        let program = function();
        let f = program.decls[0];
        let body = program.decl(f).body.unwrap();
        let block = program.stmt(body).block().to_vec();
        let for_stmt = block[0];

        let ops: Vec<String> = enters(&program, Syntax::Stmt(for_stmt))
            .into_iter()
            .map(|x| match program.node(x) {
                Node::Stmt(s) => s.op().to_string(),
                Node::Expr(e) => match e.text() {
                    Some(text) => format!("{}:{}", e.op(), text),
                    None => e.op().to_string(),
                },
                Node::Label(l) => l.kind.to_string(),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(
            ops,
            vec![
                "For", "Eq", "Name:i", "Number:0", "Lt", "Name:i", "Name:n", "PostInc",
                "Name:i", "Empty", "LabelName",
            ]
        );

        // cast: operand (left) before the type operand
        let ret = block[1];
        let seen = enters(&program, Syntax::Stmt(ret));
        assert!(matches!(seen[2], Syntax::Expr(_)));
        assert!(matches!(seen[3], Syntax::Type(_)));
    }

    #[test]
    fn test_absent_children_are_skipped() {
        let mut b = ProgramBuilder::new();
        let int = b.ty(Type::basic(TypeKind::Int, span()));
        let x = b.decl(Decl::new("x", int, span()));
        let program = b.finish("x.c", vec![x]);

        assert_eq!(
            enters(&program, Syntax::Program),
            vec![Syntax::Program, Syntax::Decl(x), Syntax::Type(int)]
        );
    }

    #[test]
    fn test_initializer_order_skips_designators() {
        // { [0] = 1, { 2 } }
        let mut b = ProgramBuilder::new();
        let zero = b.expr(Expr::number("0", span()));
        let one = b.expr(Expr::number("1", span()));
        let two = b.expr(Expr::number("2", span()));
        let first = b.init(Init::expr(vec![Prefix::index(zero, span())], one, span()));
        let inner = b.init(Init::expr(vec![], two, span()));
        let nested = b.init(Init::braced(vec![], vec![inner], span()));
        let outer = b.init(Init::braced(vec![], vec![first, nested], span()));
        let program = b.finish("i.c", vec![]);

        assert_eq!(
            enters(&program, Syntax::Init(outer)),
            vec![
                Syntax::Init(outer),
                Syntax::Init(first),
                Syntax::Expr(one),
                Syntax::Init(nested),
                Syntax::Init(inner),
                Syntax::Expr(two),
            ]
        );
    }

    #[test]
    fn test_walks_run_in_parallel() {
        let (program, ..) = shared_struct();
        let expected = enters(&program, Syntax::Program);
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| enters(&program, Syntax::Program)))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn test_deep_chain_on_small_stack() {
        // ((0 + 1) + 1) + ... nested 100_000 times
        const DEPTH: usize = 100_000;
        let mut b = ProgramBuilder::new();
        let mut top = b.expr(Expr::number("0", span()));
        for _ in 0..DEPTH {
            let one = b.expr(Expr::number("1", span()));
            top = b.expr(Expr::binary(BinaryOp::Add, top, one, span()));
        }
        let program = b.finish("deep.c", vec![]);

        let (entered, exited, max_depth) = std::thread::scope(|scope| {
            std::thread::Builder::new()
                .stack_size(256 * 1024)
                .spawn_scoped(scope, || {
                    let (mut entered, mut exited, mut max_depth) = (0, 0, 0);
                    walk_with_depth(
                        &program,
                        Syntax::Expr(top),
                        |_, depth| {
                            entered += 1;
                            max_depth = max_depth.max(depth);
                        },
                        |_, _| exited += 1,
                    );
                    (entered, exited, max_depth)
                })
                .unwrap()
                .join()
                .unwrap()
        });

        assert_eq!(entered, 2 * DEPTH + 1);
        assert_eq!(exited, entered);
        assert_eq!(max_depth, DEPTH);
    }

    #[test]
    fn test_expression_child_order() {
        // f(a, b) and (int){ 1 } with a spliced statement
        let mut b = ProgramBuilder::new();
        let f = b.expr(Expr::name("f", span()));
        let a = b.expr(Expr::name("a", span()));
        let bb = b.expr(Expr::name("b", span()));
        let call = b.expr(Expr::call(f, vec![a, bb], span()));

        let int = b.ty(Type::basic(TypeKind::Int, span()));
        let one = b.expr(Expr::number("1", span()));
        let item = b.init(Init::expr(vec![], one, span()));
        let braced = b.init(Init::braced(vec![], vec![item], span()));
        let literal = b.expr(Expr::cast_init(int, braced, span()));
        let spliced = b.stmt(Stmt::new(StmtKind::Expr(call), span()));
        b.attach_block(literal, vec![spliced]);
        let program = b.finish("e.c", vec![]);

        assert_eq!(
            enters(&program, Syntax::Expr(call)),
            vec![
                Syntax::Expr(call),
                Syntax::Expr(f),
                Syntax::Expr(a),
                Syntax::Expr(bb),
            ]
        );
        assert_eq!(
            enters(&program, Syntax::Expr(literal)),
            vec![
                Syntax::Expr(literal),
                Syntax::Type(int),
                Syntax::Init(braced),
                Syntax::Init(item),
                Syntax::Expr(one),
                Syntax::Stmt(spliced),
                Syntax::Expr(call),
                Syntax::Expr(f),
                Syntax::Expr(a),
                Syntax::Expr(bb),
            ]
        );
    }

    #[test]
    fn test_if_else_and_for_declaration_order() {
        let mut b = ProgramBuilder::new();
        let int = b.ty(Type::basic(TypeKind::Int, span()));

        // if (c) ; else ;
        let c = b.expr(Expr::name("c", span()));
        let then = b.stmt(Stmt::new(StmtKind::Empty, span()));
        let otherwise = b.stmt(Stmt::new(StmtKind::Empty, span()));
        let if_stmt = b.stmt(Stmt::new(
            StmtKind::If {
                cond: c,
                then,
                otherwise: Some(otherwise),
            },
            span(),
        ));

        // for (int i = 0; i; i++) break;
        let zero = b.expr(Expr::number("0", span()));
        let init = b.init(Init::expr(vec![], zero, span()));
        let i = b.decl(Decl::new("i", int, span()).with_init(init));
        let cond = b.expr(Expr::name("i", span()));
        let i2 = b.expr(Expr::name("i", span()));
        let post = b.expr(Expr::unary(UnaryOp::PostInc, i2, span()));
        let body = b.stmt(Stmt::new(StmtKind::Break, span()));
        let for_stmt = b.stmt(Stmt::new(
            StmtKind::For {
                pre: None,
                cond: Some(cond),
                post: Some(post),
                decl: Some(i),
                body,
            },
            span(),
        ));
        let program = b.finish("s.c", vec![]);

        assert_eq!(
            enters(&program, Syntax::Stmt(if_stmt)),
            vec![
                Syntax::Stmt(if_stmt),
                Syntax::Expr(c),
                Syntax::Stmt(then),
                Syntax::Stmt(otherwise),
            ]
        );
        assert_eq!(
            enters(&program, Syntax::Stmt(for_stmt)),
            vec![
                Syntax::Stmt(for_stmt),
                Syntax::Expr(cond),
                Syntax::Expr(post),
                Syntax::Expr(i2),
                Syntax::Decl(i),
                Syntax::Type(int),
                Syntax::Init(init),
                Syntax::Expr(zero),
                Syntax::Stmt(body),
            ]
        );
    }

    #[test]
    fn test_case_label_value_is_walked() {
        // case 3: default: break;
        let mut b = ProgramBuilder::new();
        let three = b.expr(Expr::number("3", span()));
        let case = b.label(Label::new(LabelKind::Case(three), span()));
        let default = b.label(Label::new(LabelKind::Default, span()));
        let stmt = b.stmt(Stmt::new(StmtKind::Break, span()).with_labels(vec![case, default]));
        let program = b.finish("c.c", vec![]);

        assert_eq!(
            enters(&program, Syntax::Stmt(stmt)),
            vec![
                Syntax::Stmt(stmt),
                Syntax::Label(case),
                Syntax::Expr(three),
                Syntax::Label(default),
            ]
        );
    }

    #[test]
    #[should_panic(expected = "walk: unexpected syntax")]
    fn test_foreign_node_aborts() {
        let (other, ..) = shared_struct();
        let program = ProgramBuilder::new().finish("empty.c", vec![]);
        let foreign = other.decls[0];
        walk(&program, Syntax::Decl(foreign), |_| {}, |_| {});
    }
}
