//! The user-facing expression handle.
//!
//! [`Expr`] is an immutable, value-semantic handle to a shared,
//! reference-counted [`Node`]. Cloning is cheap; all transformations
//! (substitution, simplification) produce new handles and leave the original
//! untouched. The structural hash is computed lazily and memoized next to the
//! node, which is sound because nodes never change after construction.

use std::cell::Cell;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{BitAnd, BitOr, Not};
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::node::{Node, RelOp};
use crate::simplify;

struct Inner {
    node: Node,
    hash: Cell<Option<u32>>,
}

/// A shared, immutable boolean expression.
#[derive(Clone)]
pub struct Expr {
    inner: Rc<Inner>,
}

impl Expr {
    pub(crate) fn new(node: Node) -> Self {
        Expr {
            inner: Rc::new(Inner {
                node,
                hash: Cell::new(None),
            }),
        }
    }

    pub fn node(&self) -> &Node {
        &self.inner.node
    }

    /// Pointer identity of the underlying node.
    ///
    /// Substitution relies on this to detect unchanged subtrees without deep
    /// comparison: an untouched subtree is returned as the very same handle.
    pub fn ptr_eq(a: &Expr, b: &Expr) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    /// The memoized structural hash.
    pub fn hash_value(&self) -> u32 {
        if let Some(h) = self.inner.hash.get() {
            return h;
        }
        let h = self.inner.node.compute_hash();
        self.inner.hash.set(Some(h));
        h
    }

    pub fn num_operands(&self) -> usize {
        self.inner.node.num_operands()
    }

    pub fn operand(&self, i: usize) -> Result<&Expr> {
        self.inner.node.operand(i)
    }

    /// The constant value of the expression, if it reduces to one.
    pub fn trivial(&self) -> Option<bool> {
        self.inner.node.trivial()
    }

    /// Whether the expression has reduced to a boolean constant.
    pub fn is_trivial(&self) -> bool {
        self.trivial().is_some()
    }

    /// The constant value of a trivial expression.
    pub fn trivial_value(&self) -> Result<bool> {
        self.trivial().ok_or(Error::NotTrivial)
    }

    /// Total canonical order: structural hash first, variant tag as the
    /// tie-break, then the variant-specific comparison. Used for sorting
    /// `And`/`Or` operand lists, deduplication, and map lookups.
    pub fn compare(&self, other: &Expr) -> Ordering {
        if Expr::ptr_eq(self, other) {
            return Ordering::Equal;
        }
        self.hash_value()
            .cmp(&other.hash_value())
            .then_with(|| self.node().kind_rank().cmp(&other.node().kind_rank()))
            .then_with(|| self.node().compare_same_type(other.node()))
    }

    /// Semantic equality. Two trivial expressions are equal iff their
    /// constant values agree, regardless of shape; otherwise equality
    /// requires the same variant and equal structure (hash collisions are
    /// resolved by full comparison).
    pub fn is_equal(&self, other: &Expr) -> bool {
        match (self.trivial(), other.trivial()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => {
                Expr::ptr_eq(self, other)
                    || (self.hash_value() == other.hash_value()
                        && self.node().kind_rank() == other.node().kind_rank()
                        && self.node().is_equal_same_type(other.node()))
            }
            _ => false,
        }
    }

    /// Collect the distinct symbols reachable from this expression, in
    /// first-seen order.
    pub fn get_vars(&self, sort: SymbolSort) -> Vec<Expr> {
        let mut vars = Vec::new();
        collect_symbols(self, &mut vars);
        if sort == SymbolSort::NameAsc {
            vars.sort_by(|a, b| {
                let na = a.symbol_name().unwrap_or_default();
                let nb = b.symbol_name().unwrap_or_default();
                na.cmp(nb)
            });
        }
        vars
    }

    pub fn symbol_name(&self) -> Option<&str> {
        match self.node() {
            Node::Symbol { name, .. } => Some(name),
            _ => None,
        }
    }
}

fn collect_symbols(e: &Expr, out: &mut Vec<Expr>) {
    if e.is_trivial() {
        return;
    }
    match e.node() {
        Node::Symbol { .. } => {
            if !out.iter().any(|v| v.is_equal(e)) {
                out.push(e.clone());
            }
        }
        node => {
            for i in 0..node.num_operands() {
                if let Ok(op) = node.operand(i) {
                    collect_symbols(op, out);
                }
            }
        }
    }
}

/// Ordering applied to the result of [`Expr::get_vars`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SymbolSort {
    /// First-seen order.
    None,
    /// Ascending by symbol name.
    NameAsc,
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expr({})", self)
    }
}

thread_local! {
    static TRUE_EXPR: Expr = Expr::new(Node::Constant(true));
    static FALSE_EXPR: Expr = Expr::new(Node::Constant(false));
}

impl From<bool> for Expr {
    /// The constant expressions are per-thread singletons; every `true` (and
    /// every `false`) aliases one shared node.
    fn from(v: bool) -> Self {
        if v {
            TRUE_EXPR.with(Clone::clone)
        } else {
            FALSE_EXPR.with(Clone::clone)
        }
    }
}

/// Creates a wildcard pattern with the given label.
///
/// A wildcard matches any subtree during pattern matching and is bound at
/// most once per match attempt; two occurrences of the same label must match
/// equal subtrees.
pub fn wildcard(label: u32) -> Expr {
    Expr::new(Node::Wildcard(label))
}

/// Mints symbols with process-unique serial numbers.
///
/// The serial counter is explicit session state (not a hidden global): create
/// one table per logical session, or per test for deterministic ordering.
/// Symbols are ordered by creation, never by name; calling [`var`][Self::var]
/// twice with the same name yields two distinct, unequal symbols.
#[derive(Debug, Default)]
pub struct SymbolTable {
    next_serial: Cell<u32>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh symbol.
    pub fn var(&self, name: &str) -> Expr {
        let serial = self.next_serial.get();
        self.next_serial.set(serial + 1);
        Expr::new(Node::Symbol {
            name: name.to_string(),
            serial,
        })
    }

    /// Create one fresh symbol per name, in order.
    pub fn vars(&self, names: &[&str]) -> Vec<Expr> {
        names.iter().map(|name| self.var(name)).collect()
    }
}

fn relational(lhs: &Expr, rhs: &Expr, op: RelOp) -> Expr {
    Expr::new(Node::Relational {
        lhs: lhs.clone(),
        rhs: rhs.clone(),
        op,
    })
}

/// Builds the equality `lhs == rhs`, the substitution-request form accepted
/// by [`Expr::subs_rel`][crate::subs].
pub fn eq(lhs: &Expr, rhs: &Expr) -> Expr {
    relational(lhs, rhs, RelOp::Eq)
}

pub fn ne(lhs: &Expr, rhs: &Expr) -> Expr {
    relational(lhs, rhs, RelOp::Ne)
}

pub fn lt(lhs: &Expr, rhs: &Expr) -> Expr {
    relational(lhs, rhs, RelOp::Lt)
}

pub fn le(lhs: &Expr, rhs: &Expr) -> Expr {
    relational(lhs, rhs, RelOp::Le)
}

pub fn gt(lhs: &Expr, rhs: &Expr) -> Expr {
    relational(lhs, rhs, RelOp::Gt)
}

pub fn ge(lhs: &Expr, rhs: &Expr) -> Expr {
    relational(lhs, rhs, RelOp::Ge)
}

impl BitAnd for Expr {
    type Output = Expr;

    fn bitand(self, rhs: Self) -> Self::Output {
        simplify::and(&self, &rhs)
    }
}

impl BitAnd for &Expr {
    type Output = Expr;

    fn bitand(self, rhs: Self) -> Self::Output {
        simplify::and(self, rhs)
    }
}

impl BitOr for Expr {
    type Output = Expr;

    fn bitor(self, rhs: Self) -> Self::Output {
        simplify::or(&self, &rhs)
    }
}

impl BitOr for &Expr {
    type Output = Expr;

    fn bitor(self, rhs: Self) -> Self::Output {
        simplify::or(self, rhs)
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Self::Output {
        simplify::not(&self)
    }
}

impl Not for &Expr {
    type Output = Expr;

    fn not(self) -> Self::Output {
        simplify::not(self)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_constant_singletons() {
        let a = Expr::from(true);
        let b = Expr::from(true);
        assert!(Expr::ptr_eq(&a, &b));
        assert!(!Expr::ptr_eq(&a, &Expr::from(false)));
        assert!(a.is_trivial());
        assert_eq!(a.trivial_value().ok(), Some(true));
    }

    #[test]
    fn test_symbols_are_distinct_per_call() {
        let st = SymbolTable::new();
        let p1 = st.var("p");
        let p2 = st.var("p");
        assert!(!p1.is_equal(&p2));
        assert_ne!(p1.compare(&p2), Ordering::Equal);
        assert!(p1.is_equal(&p1.clone()));
    }

    #[test]
    fn test_symbol_order_is_insertion_order() {
        let st = SymbolTable::new();
        // Lexically "z" > "a", but the serial decides.
        let z = st.var("z");
        let a = st.var("a");
        assert_eq!(
            z.node().compare_same_type(a.node()),
            Ordering::Less
        );
    }

    #[test]
    fn test_trivial_value_on_non_trivial() {
        let st = SymbolTable::new();
        let p = st.var("p");
        assert!(!p.is_trivial());
        assert!(matches!(p.trivial_value(), Err(Error::NotTrivial)));
    }

    #[test]
    fn test_compare_is_total_and_consistent() {
        let st = SymbolTable::new();
        let p = st.var("p");
        let q = st.var("q");
        let exprs = [
            Expr::from(false),
            Expr::from(true),
            p.clone(),
            q.clone(),
            !&p,
            &p & &q,
            &p | &q,
            eq(&p, &q),
        ];
        for a in &exprs {
            assert_eq!(a.compare(a), Ordering::Equal);
            for b in &exprs {
                assert_eq!(a.compare(b), b.compare(a).reverse());
            }
        }
    }

    #[test]
    fn test_equal_implies_equal_hash() {
        let st = SymbolTable::new();
        let p = st.var("p");
        let q = st.var("q");
        let a = &p & &q;
        let b = &q & &p;
        assert!(a.is_equal(&b));
        assert_eq!(a.hash_value(), b.hash_value());
    }

    #[test]
    fn test_get_vars_first_seen_order() {
        let st = SymbolTable::new();
        let p = st.var("p");
        let q = st.var("q");
        let r = st.var("r");
        let f = (&q & &r) | (&p & &q);
        let vars = f.get_vars(SymbolSort::None);
        assert_eq!(vars.len(), 3);
        // Every symbol shows up exactly once.
        for v in &vars {
            assert_eq!(vars.iter().filter(|o| o.is_equal(v)).count(), 1);
        }
        let by_name = f.get_vars(SymbolSort::NameAsc);
        let names: Vec<_> = by_name.iter().map(|v| v.symbol_name().unwrap().to_string()).collect();
        assert_eq!(names, ["p", "q", "r"]);
    }

    #[test]
    fn test_get_vars_of_symbol_and_trivial() {
        let st = SymbolTable::new();
        let p = st.var("p");
        assert_eq!(p.get_vars(SymbolSort::None).len(), 1);
        assert!(Expr::from(true).get_vars(SymbolSort::None).is_empty());
        // A complementary pair collapses, so no free variables remain.
        let collapsed = &p & &!&p;
        assert!(collapsed.get_vars(SymbolSort::None).is_empty());
    }
}
