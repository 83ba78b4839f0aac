//! Construction rules and algebraic simplification.
//!
//! The combinators in this module are the only way connective nodes are
//! built, so every `And`/`Or` node in existence already satisfies the
//! canonical-form invariants: flat, sorted, duplicate-free operand lists,
//! complementary pairs collapsed to the short-circuit constant, and trivial
//! operands absorbed per the identity laws. `simplified()` is therefore
//! idempotent by construction.

use std::cmp::Ordering;

use log::debug;

use crate::expr::Expr;
use crate::node::Node;

/// Logical negation.
///
/// Trivial operands fold to the negated constant immediately. A negation of a
/// negation merges polarity and reuses the inner operand; `Not` nodes never
/// nest.
pub fn not(e: &Expr) -> Expr {
    if let Some(v) = e.trivial() {
        return Expr::from(!v);
    }
    match e.node() {
        Node::Not { operand, active } => {
            // Merged polarity: !(!p) = p, and negating a transmit node
            // activates it.
            if *active {
                operand.clone()
            } else {
                Expr::new(Node::Not {
                    operand: operand.clone(),
                    active: true,
                })
            }
        }
        _ => Expr::new(Node::Not {
            operand: e.clone(),
            active: true,
        }),
    }
}

/// Logical conjunction of two expressions.
///
/// Structurally equal inputs short-circuit to the left side without building
/// a node. Trivial inputs apply the identity/annihilation laws
/// (`x & 1 = x`, `x & 0 = 0`); `And` inputs are absorbed rather than nested.
pub fn and(lhs: &Expr, rhs: &Expr) -> Expr {
    if lhs.is_equal(rhs) {
        return lhs.clone();
    }
    and_all([lhs.clone(), rhs.clone()])
}

/// Logical disjunction of two expressions; dual of [`and`].
pub fn or(lhs: &Expr, rhs: &Expr) -> Expr {
    if lhs.is_equal(rhs) {
        return lhs.clone();
    }
    or_all([lhs.clone(), rhs.clone()])
}

/// Conjunction of arbitrarily many expressions.
///
/// Used by [`and`] and by substitution when a conjunction is rebuilt from
/// substituted operands.
pub fn and_all<I>(items: I) -> Expr
where
    I: IntoIterator<Item = Expr>,
{
    let mut operands = Vec::new();
    for e in items {
        match e.trivial() {
            Some(false) => {
                debug!("and: annihilated by constant false");
                return Expr::from(false);
            }
            Some(true) => continue,
            None => flatten_into(&e, ListKind::And, &mut operands),
        }
    }
    build_list(operands, ListKind::And)
}

/// Disjunction of arbitrarily many expressions; dual of [`and_all`].
pub fn or_all<I>(items: I) -> Expr
where
    I: IntoIterator<Item = Expr>,
{
    let mut operands = Vec::new();
    for e in items {
        match e.trivial() {
            Some(true) => {
                debug!("or: annihilated by constant true");
                return Expr::from(true);
            }
            Some(false) => continue,
            None => flatten_into(&e, ListKind::Or, &mut operands),
        }
    }
    build_list(operands, ListKind::Or)
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum ListKind {
    And,
    Or,
}

impl ListKind {
    /// The value absorbed by the identity law (`x & 1 = x`, `x | 0 = x`).
    fn identity(self) -> bool {
        matches!(self, ListKind::And)
    }
}

/// Absorb same-kind nodes into a flat operand list. Both sides of a
/// connective are merged; nesting `And` under `And` (or `Or` under `Or`)
/// never survives construction.
fn flatten_into(e: &Expr, kind: ListKind, out: &mut Vec<Expr>) {
    match (kind, e.node()) {
        (ListKind::And, Node::And { operands, collapsed: false })
        | (ListKind::Or, Node::Or { operands, collapsed: false }) => {
            out.extend(operands.iter().cloned());
        }
        _ => out.push(e.clone()),
    }
}

fn build_list(mut operands: Vec<Expr>, kind: ListKind) -> Expr {
    if simplify_list(&mut operands, kind) == ListOutcome::Collapsed {
        return match kind {
            ListKind::And => Expr::new(Node::And {
                operands: Vec::new(),
                collapsed: true,
            }),
            ListKind::Or => Expr::new(Node::Or {
                operands: Vec::new(),
                collapsed: true,
            }),
        };
    }
    match operands.len() {
        // All operands were absorbed by the identity law.
        0 => Expr::from(kind.identity()),
        1 => operands.swap_remove(0),
        _ => match kind {
            ListKind::And => Expr::new(Node::And {
                operands,
                collapsed: false,
            }),
            ListKind::Or => Expr::new(Node::Or {
                operands,
                collapsed: false,
            }),
        },
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum ListOutcome {
    Kept,
    /// The list short-circuits to the kind's annihilator
    /// (false for `And`, true for `Or`).
    Collapsed,
}

/// Canonicalize an operand list in place:
/// simplify each operand, sort by the canonical order, drop exact duplicates
/// (`p & p = p`), collapse on a complementary pair (`p & !p = 0`,
/// `p | !p = 1`), then drop or collapse on remaining trivial operands per
/// the identity laws.
fn simplify_list(operands: &mut Vec<Expr>, kind: ListKind) -> ListOutcome {
    for op in operands.iter_mut() {
        *op = op.simplified();
    }

    operands.sort_by(|a, b| a.compare(b));
    operands.dedup_by(|a, b| a.compare(b) == Ordering::Equal);

    let mut complementary = false;
    for op in operands.iter() {
        if let Node::Not { operand, active: true } = op.node() {
            if operands.iter().any(|o| o.is_equal(operand)) {
                complementary = true;
                break;
            }
        }
    }
    if complementary {
        debug!("simplify_list: complementary pair, collapsing {:?} list", kind);
        operands.clear();
        return ListOutcome::Collapsed;
    }

    let identity = kind.identity();
    let mut collapsed = false;
    operands.retain(|op| match op.trivial() {
        Some(v) => {
            if v != identity {
                collapsed = true;
            }
            false
        }
        None => true,
    });
    if collapsed {
        operands.clear();
        return ListOutcome::Collapsed;
    }

    ListOutcome::Kept
}

impl Expr {
    /// Reduce the expression to its canonical simplified form.
    ///
    /// Trivial expressions become bare constants; a negation simplifies its
    /// operand and re-applies the double-negation fold; a connective with a
    /// single surviving operand unwraps to it; relational pairs and function
    /// bodies simplify their children. Idempotent:
    /// `e.simplified().simplified()` is always equal to `e.simplified()`.
    pub fn simplified(&self) -> Expr {
        if let Some(v) = self.trivial() {
            return Expr::from(v);
        }
        match self.node() {
            Node::Not { operand, active } => {
                let inner = operand.simplified();
                if *active {
                    not(&inner)
                } else {
                    inner
                }
            }
            Node::And { operands, .. } => {
                if operands.len() == 1 {
                    operands[0].simplified()
                } else {
                    self.clone()
                }
            }
            Node::Or { operands, .. } => {
                if operands.len() == 1 {
                    operands[0].simplified()
                } else {
                    self.clone()
                }
            }
            Node::Relational { lhs, rhs, op } => {
                let new_lhs = lhs.simplified();
                let new_rhs = rhs.simplified();
                if Expr::ptr_eq(lhs, &new_lhs) && Expr::ptr_eq(rhs, &new_rhs) {
                    self.clone()
                } else {
                    Expr::new(Node::Relational {
                        lhs: new_lhs,
                        rhs: new_rhs,
                        op: *op,
                    })
                }
            }
            Node::Function { body, vars, name } => {
                let new_body = body.simplified();
                if Expr::ptr_eq(body, &new_body) {
                    self.clone()
                } else {
                    Expr::new(Node::Function {
                        body: new_body,
                        vars: vars.clone(),
                        name: name.clone(),
                    })
                }
            }
            _ => self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::expr::SymbolTable;

    #[test]
    fn test_and_identity_laws() {
        let st = SymbolTable::new();
        let p = st.var("p");
        assert!((&p & &Expr::from(true)).is_equal(&p));
        assert!(p.is_equal(&(&p & &Expr::from(true))));
        assert!((&p & &Expr::from(false)).is_equal(&Expr::from(false)));
        assert!(Expr::from(false).is_equal(&(&p & &Expr::from(false))));
    }

    #[test]
    fn test_or_identity_laws() {
        let st = SymbolTable::new();
        let p = st.var("p");
        assert!((&p | &Expr::from(true)).is_equal(&Expr::from(true)));
        assert!((&p | &Expr::from(false)).is_equal(&p));
    }

    #[test]
    fn test_idempotent_operand_collapse() {
        let st = SymbolTable::new();
        let p = st.var("p");
        assert!((&p & &p).is_equal(&p));
        assert!((&(&p & &p) & &p).is_equal(&p));
        assert!((&p | &p).is_equal(&p));
        assert!((&(&p | &p) | &p).is_equal(&p));
    }

    #[test]
    fn test_complementation() {
        let st = SymbolTable::new();
        let p = st.var("p");
        assert!((&p & &!&p).is_equal(&Expr::from(false)));
        assert!((&p | &!&p).is_equal(&Expr::from(true)));
        // Also through a larger list.
        let q = st.var("q");
        let f = &(&p & &q) & &!&p;
        assert!(f.is_equal(&Expr::from(false)));
    }

    #[test]
    fn test_double_negation() {
        let st = SymbolTable::new();
        let p = st.var("p");
        assert!((!!&p.clone()).is_equal(&p));
        assert!((!!!&p.clone()).is_equal(&!&p));
        assert!((!Expr::from(true)).is_equal(&Expr::from(false)));
        assert!((!Expr::from(false)).is_equal(&Expr::from(true)));
    }

    #[test]
    fn test_not_never_nests() {
        let st = SymbolTable::new();
        let p = st.var("p");
        let nn = !!&p.clone();
        assert!(!matches!(nn.node(), Node::Not { .. }));
        let nnn = !!!&p.clone();
        if let Node::Not { operand, active } = nnn.node() {
            assert!(*active);
            assert!(operand.is_equal(&p));
        } else {
            panic!("expected a single Not node");
        }
    }

    #[test]
    fn test_commutativity_and_flattening() {
        let st = SymbolTable::new();
        let p = st.var("p");
        let q = st.var("q");
        let r = st.var("r");
        assert!((&p & &q).is_equal(&(&q & &p)));
        assert!((&p | &q).is_equal(&(&q | &p)));

        // Associativity via flat operand lists.
        let left = &(&p & &q) & &r;
        let right = &p & &(&q & &r);
        assert!(left.is_equal(&right));
        assert_eq!(left.num_operands(), 3);

        // Absorption applies to both sides, so a right-nested Or flattens
        // just like a left-nested one.
        let or_right = &p | &(&q | &r);
        assert_eq!(or_right.num_operands(), 3);
        assert!(or_right.is_equal(&(&(&p | &q) | &r)));
    }

    #[test]
    fn test_operands_are_sorted_and_deduplicated() {
        let st = SymbolTable::new();
        let p = st.var("p");
        let q = st.var("q");
        let a = &(&p & &q) & &p;
        assert_eq!(a.num_operands(), 2);
        if let Node::And { operands, .. } = a.node() {
            for pair in operands.windows(2) {
                assert_eq!(pair[0].compare(&pair[1]), Ordering::Less);
            }
        } else {
            panic!("expected an And node");
        }
    }

    #[test]
    fn test_equality_shortcut_returns_lhs() {
        let st = SymbolTable::new();
        let p = st.var("p");
        let q = st.var("q");
        let a = &p & &q;
        let b = &q & &p;
        let c = and(&a, &b);
        // Structurally equal operands: the left handle comes back untouched.
        assert!(Expr::ptr_eq(&a, &c));
    }

    #[test]
    fn test_simplified_idempotent() {
        let st = SymbolTable::new();
        let p = st.var("p");
        let q = st.var("q");
        let exprs = [
            Expr::from(true),
            p.clone(),
            !&p,
            &p & &q,
            &p | &!&q,
            (&p & &q) | (&!&p & &!&q),
        ];
        for e in &exprs {
            let once = e.simplified();
            let twice = once.simplified();
            assert!(twice.is_equal(&once));
        }
    }

    #[test]
    fn test_simplified_unwraps_trivial() {
        let st = SymbolTable::new();
        let p = st.var("p");
        let collapsed = &p & &!&p;
        let s = collapsed.simplified();
        assert!(matches!(s.node(), Node::Constant(false)));
    }
}
