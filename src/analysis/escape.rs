//! Escape analysis: classifies every binding by how far a reference to it
//! can travel before the analysis loses track of it.
//!
//! No teacher analogue (the teacher has no static analysis pass — spaces
//! are chosen per binding at compile time via Cargo features, not
//! inferred). The lattice and `join` are original to this spec; the
//! walk itself follows `codegraph-core`'s node-kind-dispatch visitor
//! shape.

use std::collections::HashMap;

use crate::ir::{Expr, IrNode};

/// `None ⊑ Local ⊑ Closure ⊑ Global`. Ordered so that `join` (least upper
/// bound) is simply `max`.
#[derive(Copy, Clone, Eq, PartialEq, PartialOrd, Ord, Debug)]
pub enum EscapeClass {
    None,
    Local,
    Closure,
    Global,
}

impl EscapeClass {
    pub fn join(self, other: EscapeClass) -> EscapeClass {
        self.max(other)
    }
}

/// A `Let` binding's identity, distinct from its textual name: assigned
/// fresh (pre-order, one per binding occurrence) as the tree is walked,
/// so two bindings that share a name under shadowing — e.g.
/// `let x = ... in (let x = ... in x)` — never collide on the same
/// [`UsageRecord`] or clean-phase entry.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct BindingId(u32);

#[cfg(test)]
impl BindingId {
    pub(crate) fn for_test(n: u32) -> BindingId {
        BindingId(n)
    }
}

#[derive(Clone, Debug)]
pub struct UsageRecord {
    pub id: BindingId,
    pub name: String,
    pub use_count: u32,
    pub last_use_depth: u32,
    pub captured_by_lambda: bool,
    pub escape_class: EscapeClass,
}

impl UsageRecord {
    fn new(id: BindingId, name: String) -> Self {
        UsageRecord {
            id,
            name,
            use_count: 0,
            last_use_depth: 0,
            captured_by_lambda: false,
            escape_class: EscapeClass::None,
        }
    }
}

/// One `Let` node's bindings, in declaration order, each paired with its
/// [`BindingId`]. The unit the ASAP injector scopes one CLEAN phase to
/// (spec.md §4.C/§4.E): bindings are never flattened across `Let`s.
#[derive(Clone, Debug)]
pub struct LetScope {
    pub bindings: Vec<(BindingId, String)>,
}

struct Walker {
    next_id: u32,
    records: HashMap<BindingId, UsageRecord>,
    /// Free (undeclared by any `Let` in this tree) variable names, e.g. a
    /// called function's name: one stable id per distinct name, since
    /// nothing here shadows them.
    free_var_ids: HashMap<String, BindingId>,
    /// Lexical scope stack, innermost last; each frame is one `Let`'s
    /// bindings introduced so far (`let*`-style: a binding is visible to
    /// later siblings' values and the body, not to its own value).
    scopes: Vec<Vec<(String, BindingId)>>,
    let_scopes: Vec<LetScope>,
}

impl Walker {
    fn fresh_id(&mut self) -> BindingId {
        let id = BindingId(self.next_id);
        self.next_id += 1;
        id
    }

    fn record_mut(&mut self, id: BindingId, name: &str) -> &mut UsageRecord {
        self.records
            .entry(id)
            .or_insert_with(|| UsageRecord::new(id, name.to_string()))
    }

    /// Resolves `name` to the innermost enclosing binding's identity, or
    /// to a stable per-name free-variable identity if no `Let` in scope
    /// declares it.
    fn resolve(&mut self, name: &str) -> BindingId {
        for scope in self.scopes.iter().rev() {
            if let Some((_, id)) = scope.iter().rev().find(|(n, _)| n == name) {
                return *id;
            }
        }
        if let Some(id) = self.free_var_ids.get(name) {
            return *id;
        }
        let id = self.fresh_id();
        self.free_var_ids.insert(name.to_string(), id);
        id
    }

    /// `depth` is syntactic nesting depth; `in_lambda` is true once the
    /// walk has descended into a `Lambda` body; `tail` is true when this
    /// node's value is the value of its enclosing binding form (return
    /// position).
    fn walk(&mut self, expr: &Expr, depth: u32, in_lambda: bool, tail: bool) {
        if let Some(name) = expr.var_name() {
            let id = self.resolve(name);
            let rec = self.record_mut(id, name);
            rec.use_count += 1;
            rec.last_use_depth = rec.last_use_depth.max(depth);
            if in_lambda {
                rec.captured_by_lambda = true;
                rec.escape_class = rec.escape_class.join(EscapeClass::Closure);
            }
            if tail {
                rec.escape_class = rec.escape_class.join(EscapeClass::Local);
            }
        }

        match expr {
            Expr::Lambda { body, .. } => self.walk(body, depth + 1, true, true),
            Expr::Let { bindings, body } => {
                self.scopes.push(Vec::with_capacity(bindings.len()));
                let mut let_scope_bindings = Vec::with_capacity(bindings.len());
                for (name, value) in bindings {
                    self.walk(value, depth + 1, in_lambda, false);
                    // A fresh identity per occurrence, assigned after the
                    // value is walked (so the value can't resolve to its
                    // own not-yet-declared binding) but before later
                    // siblings and the body, so it is visible to them.
                    let id = self.fresh_id();
                    // Ensure every declared binding has a record even if
                    // never referenced, so later passes see it as dead.
                    self.record_mut(id, name);
                    self.scopes.last_mut().unwrap().push((name.clone(), id));
                    let_scope_bindings.push((id, name.clone()));
                }
                self.let_scopes.push(LetScope {
                    bindings: let_scope_bindings,
                });
                self.walk(body, depth + 1, in_lambda, tail);
                self.scopes.pop();
            }
            Expr::App { func, args } => {
                self.walk(func, depth + 1, in_lambda, false);
                for arg in args {
                    self.walk(arg, depth + 1, in_lambda, false);
                }
            }
            Expr::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.walk(cond, depth + 1, in_lambda, false);
                self.walk(then_branch, depth + 1, in_lambda, tail);
                self.walk(else_branch, depth + 1, in_lambda, tail);
            }
            Expr::Set { value, .. } => self.walk(value, depth + 1, in_lambda, false),
            Expr::Const | Expr::Var(_) => {}
        }
    }
}

/// Walks `expr` at the program root (so a value in tail position of the
/// whole program escapes `Global`) and returns one [`UsageRecord`] per
/// distinct binding identity, plus every `Let`'s [`LetScope`] in the
/// order its node was entered (pre-order), for the ASAP injector to plan
/// one CLEAN phase per scope.
pub fn analyze(expr: &Expr) -> (HashMap<BindingId, UsageRecord>, Vec<LetScope>) {
    let mut walker = Walker {
        next_id: 0,
        records: HashMap::new(),
        free_var_ids: HashMap::new(),
        scopes: Vec::new(),
        let_scopes: Vec::new(),
    };
    walker.walk(expr, 0, false, true);
    (walker.records, walker.let_scopes)
}
