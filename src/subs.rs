//! Substitution and wildcard pattern matching.
//!
//! Substitution is a single bottom-up pass: operands are rewritten first
//! (left to right), and the first operand that actually changed — detected by
//! handle identity, never by deep comparison — triggers a rebuild of the
//! parent through the construction rules. The (possibly rebuilt) node then
//! gets one chance to rewrite itself ("one-level substitution"), which
//! handles a mapping key matching the whole node.

use log::debug;

use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::node::{Node, RelOp};
use crate::simplify::{and_all, not, or_all};

/// Flags controlling [`Expr::subs`].
#[derive(Debug, Copy, Clone, Default)]
pub struct SubsOptions {
    /// Disable pattern matching: keys are looked up by structural equality
    /// only. Forced on internally when re-substituting wildcard bindings, to
    /// prevent infinite recursion.
    pub no_pattern: bool,
}

impl SubsOptions {
    pub const NO_PATTERN: SubsOptions = SubsOptions { no_pattern: true };
}

/// An insertion-ordered mapping from pattern (or key) expressions to their
/// replacements.
///
/// Exact lookups go by structural equality with a hash prefilter; pattern
/// iteration visits entries in the order they were stored, and the first
/// matching pattern wins.
#[derive(Debug, Clone, Default)]
pub struct ExprMap {
    entries: Vec<(Expr, Expr)>,
}

impl ExprMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a mapping, replacing any structurally equal key in place.
    pub fn insert(&mut self, key: Expr, value: Expr) {
        let hash = key.hash_value();
        for (k, v) in self.entries.iter_mut() {
            if k.hash_value() == hash && k.compare(&key).is_eq() {
                *v = value;
                return;
            }
        }
        self.entries.push((key, value));
    }

    /// Look up the replacement for a structurally equal key.
    pub fn get(&self, key: &Expr) -> Option<&Expr> {
        let hash = key.hash_value();
        self.entries
            .iter()
            .find(|(k, _)| k.hash_value() == hash && k.compare(key).is_eq())
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Expr, &Expr)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(Expr, Expr)> for ExprMap {
    fn from_iter<I: IntoIterator<Item = (Expr, Expr)>>(iter: I) -> Self {
        let mut map = ExprMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Expr {
    /// Substitute according to `map`.
    ///
    /// Unchanged subtrees are returned as the original handles — the
    /// identity-preserving contract callers rely on to avoid needless
    /// copies. Named boolean functions refuse substitution.
    pub fn subs(&self, map: &ExprMap, options: SubsOptions) -> Result<Expr> {
        match self.node() {
            Node::Function { .. } => Err(Error::Unsupported {
                kind: self.node().kind_name(),
                what: "substitution",
            }),
            // A short-circuited (or emptied) connective substitutes as the
            // constant it denotes.
            Node::And { operands, collapsed } if *collapsed || operands.is_empty() => {
                Expr::from(!collapsed).subs_one_level(map, options)
            }
            Node::Or { operands, collapsed } if *collapsed || operands.is_empty() => {
                Expr::from(*collapsed).subs_one_level(map, options)
            }
            _ => {
                let n = self.num_operands();
                let mut new_operands = Vec::with_capacity(n);
                let mut changed = false;
                for i in 0..n {
                    let op = self.operand(i)?;
                    let new_op = op.subs(map, options)?;
                    if !Expr::ptr_eq(op, &new_op) {
                        changed = true;
                    }
                    new_operands.push(new_op);
                }
                let base = if changed {
                    self.rebuild(new_operands)
                } else {
                    self.clone()
                };
                base.subs_one_level(map, options)
            }
        }
    }

    /// Substitute using a single equality, `subs_rel(&eq(&sym, &value))`.
    pub fn subs_rel(&self, relation: &Expr) -> Result<Expr> {
        match relation.node() {
            Node::Relational { lhs, rhs, op: RelOp::Eq } => {
                let mut map = ExprMap::new();
                map.insert(lhs.clone(), rhs.clone());
                self.subs(&map, SubsOptions::default())
            }
            _ => Err(Error::InvalidArgument(
                "substitution requires an equality expression".to_string(),
            )),
        }
    }

    /// Reassemble this node from substituted operands, re-running the
    /// construction rules so canonical-form invariants keep holding.
    fn rebuild(&self, operands: Vec<Expr>) -> Expr {
        match self.node() {
            Node::Not { active, .. } => {
                if *active {
                    not(&operands[0])
                } else {
                    operands[0].clone()
                }
            }
            Node::And { .. } => and_all(operands),
            Node::Or { .. } => or_all(operands),
            Node::Relational { op, .. } => Expr::new(Node::Relational {
                lhs: operands[0].clone(),
                rhs: operands[1].clone(),
                op: *op,
            }),
            _ => self.clone(),
        }
    }

    /// Apply the mapping to this node itself, without recursing into
    /// children (the caller has already handled them).
    fn subs_one_level(&self, map: &ExprMap, options: SubsOptions) -> Result<Expr> {
        if options.no_pattern {
            return Ok(map.get(self).cloned().unwrap_or_else(|| self.clone()));
        }
        for (pattern, value) in map.iter() {
            let mut bindings = ExprMap::new();
            if self.match_pattern(pattern, &mut bindings) {
                debug!("subs: pattern {} matched {}", pattern, self);
                // Re-substituting the bindings must not pattern-match again,
                // or a wildcard value could recurse forever.
                return value.subs(&bindings, SubsOptions::NO_PATTERN);
            }
        }
        Ok(self.clone())
    }

    /// Match this expression against `pattern`, accumulating wildcard
    /// bindings.
    ///
    /// A wildcard already bound must re-match an equal subtree; fresh
    /// wildcards bind to whatever they face. Children are matched into a
    /// scratch copy of the bindings that is committed only when every child
    /// matched, so a failed partial match leaves the caller's bindings
    /// untouched.
    pub fn match_pattern(&self, pattern: &Expr, bindings: &mut ExprMap) -> bool {
        // A wildcard subject only matches an identical wildcard pattern.
        if matches!(self.node(), Node::Wildcard(_)) {
            return self.is_equal(pattern);
        }
        if matches!(pattern.node(), Node::Wildcard(_)) {
            for (k, v) in bindings.iter() {
                if k.is_equal(pattern) {
                    return self.is_equal(v);
                }
            }
            bindings.insert(pattern.clone(), self.clone());
            return true;
        }

        if self.node().kind_rank() != pattern.node().kind_rank() {
            return false;
        }
        let n = self.num_operands();
        if n != pattern.num_operands() {
            return false;
        }
        if n == 0 {
            return self.node().is_equal_same_type(pattern.node());
        }

        let mut scratch = bindings.clone();
        for i in 0..n {
            let (op, pat) = match (self.operand(i), pattern.operand(i)) {
                (Ok(op), Ok(pat)) => (op, pat),
                _ => return false,
            };
            if !op.match_pattern(pat, &mut scratch) {
                return false;
            }
        }
        *bindings = scratch;
        true
    }

    /// Whether `pattern` matches this expression or any subexpression.
    pub fn has(&self, pattern: &Expr) -> bool {
        let mut bindings = ExprMap::new();
        if self.match_pattern(pattern, &mut bindings) {
            return true;
        }
        (0..self.num_operands())
            .any(|i| self.operand(i).map(|op| op.has(pattern)).unwrap_or(false))
    }
}
