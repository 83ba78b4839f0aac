//! The tagged-variant expression node.
//!
//! Every logical connective is one variant of [`Node`]. Nodes are immutable
//! once constructed: all transformations build fresh nodes, and handles
//! ([`Expr`][crate::expr::Expr]) share them by reference count.

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::utils::{golden_ratio_hash, rotate_left};

/// Relational operator carried by [`Node::Relational`].
///
/// Relational nodes are pure data holders: they encode substitution requests
/// (`symbol == value`) and comparisons, and are never boolean-simplified.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum RelOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl RelOp {
    pub fn symbol(self) -> &'static str {
        match self {
            RelOp::Eq => "==",
            RelOp::Ne => "!=",
            RelOp::Lt => "<",
            RelOp::Le => "<=",
            RelOp::Gt => ">",
            RelOp::Ge => ">=",
        }
    }
}

/// An expression node.
///
/// # Invariants
///
/// After construction through the combinators in [`crate::simplify`]:
///
/// - `And`/`Or` operand lists are flat (no directly-nested same-operator
///   node), sorted by the canonical order, and duplicate-free.
/// - `collapsed` marks a conjunction forced to constant false (dually, a
///   disjunction forced to constant true); the operand list is then empty.
/// - `Not` never wraps another `Not`: double negation is folded at
///   construction time by merging polarity into `active`.
#[derive(Debug, Clone)]
pub enum Node {
    /// A boolean constant.
    Constant(bool),
    /// An atomic variable. `serial` is the primary ordering key: two symbols
    /// with the same name constructed separately are distinct and unequal.
    Symbol { name: String, serial: u32 },
    /// Pattern-matching placeholder; matches any subtree, bound once per
    /// match attempt. Two wildcards are equal iff their labels are equal.
    Wildcard(u32),
    /// Logical negation. With `active = false` the node degenerates to
    /// transmit its operand unchanged.
    Not { operand: Expr, active: bool },
    /// N-ary conjunction. `collapsed` short-circuits the node to false.
    And { operands: Vec<Expr>, collapsed: bool },
    /// N-ary disjunction. `collapsed` short-circuits the node to true.
    Or { operands: Vec<Expr>, collapsed: bool },
    /// A relational pair, used as substitution keys and comparisons.
    Relational { lhs: Expr, rhs: Expr, op: RelOp },
    /// A named boolean function of at least two declared variables.
    Function { body: Expr, vars: Vec<Expr>, name: String },
}

impl Node {
    /// Stable, total order of the variant tags. Used as the tie-break between
    /// different variants that collide on the structural hash.
    pub fn kind_rank(&self) -> u8 {
        match self {
            Node::Constant(_) => 0,
            Node::Symbol { .. } => 1,
            Node::Wildcard(_) => 2,
            Node::Not { .. } => 3,
            Node::And { .. } => 4,
            Node::Or { .. } => 5,
            Node::Relational { .. } => 6,
            Node::Function { .. } => 7,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Constant(_) => "constant",
            Node::Symbol { .. } => "symbol",
            Node::Wildcard(_) => "wildcard",
            Node::Not { .. } => "not",
            Node::And { .. } => "and",
            Node::Or { .. } => "or",
            Node::Relational { .. } => "relational",
            Node::Function { .. } => "function",
        }
    }

    /// Number of child expressions. A collapsed `And`/`Or` exposes none: its
    /// operand list is cleared when the short-circuit flag is set.
    pub fn num_operands(&self) -> usize {
        match self {
            Node::Constant(_) | Node::Symbol { .. } | Node::Wildcard(_) => 0,
            Node::Not { .. } | Node::Function { .. } => 1,
            Node::And { operands, .. } | Node::Or { operands, .. } => operands.len(),
            Node::Relational { .. } => 2,
        }
    }

    pub fn operand(&self, i: usize) -> Result<&Expr> {
        let arity = self.num_operands();
        let op = match self {
            Node::Not { operand, .. } if i == 0 => Some(operand),
            Node::Function { body, .. } if i == 0 => Some(body),
            Node::And { operands, .. } | Node::Or { operands, .. } => operands.get(i),
            Node::Relational { lhs, rhs, .. } => match i {
                0 => Some(lhs),
                1 => Some(rhs),
                _ => None,
            },
            _ => None,
        };
        op.ok_or(Error::OperandIndex { index: i, arity })
    }

    /// The constant value of the node, if it reduces to one.
    pub fn trivial(&self) -> Option<bool> {
        match self {
            Node::Constant(v) => Some(*v),
            Node::Not { operand, active } => {
                operand.trivial().map(|v| if *active { !v } else { v })
            }
            Node::And { collapsed: true, .. } => Some(false),
            Node::And { operands, .. } if operands.is_empty() => Some(true),
            Node::Or { collapsed: true, .. } => Some(true),
            Node::Or { operands, .. } if operands.is_empty() => Some(false),
            Node::Function { body, .. } => body.trivial(),
            _ => None,
        }
    }

    /// Structural hash: golden-ratio mix of a per-variant seed with each
    /// child's hash, rotated between mixes. 32-bit by design; collisions are
    /// resolved by full structural comparison.
    pub fn compute_hash(&self) -> u32 {
        let seed = golden_ratio_hash(0x517c_c1b7 ^ self.kind_rank() as u32);
        match self {
            Node::Constant(v) => seed ^ *v as u32,
            Node::Symbol { serial, .. } => golden_ratio_hash(seed ^ serial),
            Node::Wildcard(label) => golden_ratio_hash(seed ^ label),
            Node::Not { operand, active } => {
                let mut h = rotate_left(seed) ^ operand.hash_value();
                if *active {
                    h = rotate_left(h) ^ 0x9e37_79b9;
                }
                h
            }
            Node::Relational { lhs, rhs, op } => {
                // Eq/Ne hash the pair unordered (larger hash mixed first), so
                // `a == b` and `b == a` hash identically; Lt/Le and Gt/Ge are
                // asymmetric per direction.
                let mut v = rotate_left(seed);
                let mut first = lhs.hash_value();
                let second = rhs.hash_value();
                match op {
                    RelOp::Eq | RelOp::Ne => {
                        if first > second {
                            v ^= first;
                            first = second;
                        } else {
                            v ^= second;
                        }
                    }
                    RelOp::Lt | RelOp::Le => {
                        v ^= second;
                    }
                    RelOp::Gt | RelOp::Ge => {
                        v ^= first;
                        first = second;
                    }
                }
                rotate_left(v) ^ first
            }
            _ => {
                let mut h = seed;
                for i in 0..self.num_operands() {
                    if let Ok(op) = self.operand(i) {
                        h = rotate_left(h) ^ op.hash_value();
                    }
                }
                h
            }
        }
    }

    /// Order two nodes of the same variant. Called only after the variant
    /// ranks compared equal.
    pub(crate) fn compare_same_type(&self, other: &Node) -> Ordering {
        match (self, other) {
            (Node::Constant(a), Node::Constant(b)) => a.cmp(b),
            (Node::Symbol { serial: a, .. }, Node::Symbol { serial: b, .. }) => a.cmp(b),
            (Node::Wildcard(a), Node::Wildcard(b)) => a.cmp(b),
            (
                Node::Not { operand: a, active: fa },
                Node::Not { operand: b, active: fb },
            ) => fa.cmp(fb).then_with(|| a.compare(b)),
            (
                Node::And { operands: a, collapsed: ca },
                Node::And { operands: b, collapsed: cb },
            )
            | (
                Node::Or { operands: a, collapsed: ca },
                Node::Or { operands: b, collapsed: cb },
            ) => ca
                .cmp(cb)
                .then_with(|| compare_operand_lists(a, b)),
            (
                Node::Relational { lhs: la, rhs: ra, op: oa },
                Node::Relational { lhs: lb, rhs: rb, op: ob },
            ) => {
                let (ka, la, ra) = normalize_relational(*oa, la, ra);
                let (kb, lb, rb) = normalize_relational(*ob, lb, rb);
                ka.cmp(&kb)
                    .then_with(|| la.compare(lb))
                    .then_with(|| ra.compare(rb))
            }
            (
                Node::Function { body: ba, vars: va, name: na },
                Node::Function { body: bb, vars: vb, name: nb },
            ) => na
                .cmp(nb)
                .then_with(|| compare_operand_lists(va, vb))
                .then_with(|| ba.compare(bb)),
            _ => unreachable!("compare_same_type called on different variants"),
        }
    }

    pub(crate) fn is_equal_same_type(&self, other: &Node) -> bool {
        self.compare_same_type(other) == Ordering::Equal
    }
}

fn compare_operand_lists(a: &[Expr], b: &[Expr]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| {
        for (x, y) in a.iter().zip(b) {
            let ord = x.compare(y);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    })
}

/// Map a relational onto its canonical direction: `Gt`/`Ge` mirror onto
/// `Lt`/`Le` with swapped operands, and the symmetric `Eq`/`Ne` order their
/// pair canonically.
fn normalize_relational<'a>(op: RelOp, lhs: &'a Expr, rhs: &'a Expr) -> (u8, &'a Expr, &'a Expr) {
    match op {
        RelOp::Eq | RelOp::Ne => {
            let class = if op == RelOp::Eq { 0 } else { 1 };
            if lhs.compare(rhs) == Ordering::Greater {
                (class, rhs, lhs)
            } else {
                (class, lhs, rhs)
            }
        }
        RelOp::Lt => (2, lhs, rhs),
        RelOp::Le => (3, lhs, rhs),
        RelOp::Gt => (2, rhs, lhs),
        RelOp::Ge => (3, rhs, lhs),
    }
}
