//! The IR node shape consumed by the static analyses (B–E).
//!
//! No teacher file does this directly: the teacher consumes already-lowered
//! object graphs, not a front-end expression tree. Grounded on
//! `codegraph-core`'s node-kind classification and visitor-over-a-typed-tree
//! shape (`examples/Jakedismo-codegraph-rust/src/core/types.rs`'s `NodeKind`
//! enum and `CodeNode`/`CodeEdge` pair), adapted here to a binding-based
//! expression IR rather than a source code graph.

/// The classification a visitor switches on, mirroring `NodeKind` in the
/// grounding file.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum IrKind {
    Const,
    Var,
    Lambda,
    Let,
    App,
    If,
    Set,
}

/// A minimal trait any front-end IR type must implement to be walked by
/// the analyses in this crate. [`Expr`] is the concrete IR this crate
/// ships; a front end may implement this trait for its own tree instead
/// of lowering into `Expr`.
pub trait IrNode: Sized {
    fn kind(&self) -> IrKind;
    /// Direct sub-expressions, in evaluation order.
    fn children(&self) -> Vec<&Self>;
    /// The bound name, for `Var`, `Set`, and each binding introduced by
    /// `Let`/`Lambda` (via [`Expr::bound_names`]).
    fn var_name(&self) -> Option<&str>;
}

/// The core's own minimal expression IR. A front end may lower its surface
/// syntax to this directly, or implement [`IrNode`] for its own tree.
#[derive(Clone, Debug)]
pub enum Expr {
    Const,
    Var(String),
    Lambda {
        params: Vec<String>,
        body: Box<Expr>,
    },
    Let {
        bindings: Vec<(String, Expr)>,
        body: Box<Expr>,
    },
    App {
        func: Box<Expr>,
        args: Vec<Expr>,
    },
    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    Set {
        name: String,
        value: Box<Expr>,
    },
}

impl Expr {
    /// Names this node directly binds (a `Let`'s bindings, a `Lambda`'s
    /// parameters). Empty for every other kind.
    pub fn bound_names(&self) -> Vec<&str> {
        match self {
            Expr::Let { bindings, .. } => bindings.iter().map(|(n, _)| n.as_str()).collect(),
            Expr::Lambda { params, .. } => params.iter().map(|p| p.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

impl IrNode for Expr {
    fn kind(&self) -> IrKind {
        match self {
            Expr::Const => IrKind::Const,
            Expr::Var(_) => IrKind::Var,
            Expr::Lambda { .. } => IrKind::Lambda,
            Expr::Let { .. } => IrKind::Let,
            Expr::App { .. } => IrKind::App,
            Expr::If { .. } => IrKind::If,
            Expr::Set { .. } => IrKind::Set,
        }
    }

    fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Const | Expr::Var(_) => Vec::new(),
            Expr::Lambda { body, .. } => vec![body],
            Expr::Let { bindings, body } => {
                let mut v: Vec<&Expr> = bindings.iter().map(|(_, e)| e).collect();
                v.push(body);
                v
            }
            Expr::App { func, args } => {
                let mut v = vec![func.as_ref()];
                v.extend(args.iter());
                v
            }
            Expr::If {
                cond,
                then_branch,
                else_branch,
            } => vec![cond, then_branch, else_branch],
            Expr::Set { value, .. } => vec![value],
        }
    }

    fn var_name(&self) -> Option<&str> {
        match self {
            Expr::Var(name) | Expr::Set { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }
}
