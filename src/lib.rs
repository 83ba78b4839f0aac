//! # boolex: symbolic boolean algebra in Rust
//!
//! **`boolex`** represents logical expressions as immutable, structurally
//! shared trees and provides substitution, wildcard pattern matching,
//! canonical simplification, and exhaustive truth-table evaluation over
//! them. A companion module simulates digital-logic circuits built from
//! two-input NAND gates.
//!
//! ## Key properties
//!
//! - **Immutable, shared expressions**: an [`Expr`][crate::expr::Expr] is a
//!   cheap handle to a reference-counted node; every transformation returns
//!   a new expression and never touches the original.
//! - **Canonical form by construction**: the `&`, `|` and `!` operators fold
//!   constants, flatten nested connectives, deduplicate and sort operands,
//!   and collapse complementary pairs as expressions are built.
//! - **Identity-preserving rewriting**: substitution returns untouched
//!   subtrees as the very same handles, so unchanged parts of a formula are
//!   never reallocated.
//!
//! ## Basic usage
//!
//! ```
//! use boolex::expr::{eq, SymbolTable};
//! use boolex::expr::Expr;
//!
//! let st = SymbolTable::new();
//! let p = st.var("p");
//! let q = st.var("q");
//!
//! // Build a formula; construction already applies the boolean identities.
//! let f = &p & &!&q;
//! assert_eq!(f.to_string(), "p & !q");
//! assert!((&p & &Expr::from(true)).is_equal(&p));
//!
//! // Substitute q = false and simplify.
//! let g = f.subs_rel(&eq(&q, &Expr::from(false))).unwrap().simplified();
//! assert!(g.is_equal(&p));
//!
//! // Enumerate the truth table (first variable is the most significant bit).
//! let rows = f.truth_table().unwrap();
//! let bits: Vec<bool> = rows.iter().map(|r| r.trivial_value().unwrap()).collect();
//! assert_eq!(bits, [false, false, true, false]);
//! ```
//!
//! ## Circuit simulation
//!
//! ```
//! use boolex::circuit::Circuit;
//!
//! let mut circuit = Circuit::new();
//! let adder = circuit.half_adder();
//! let a = circuit.in_port(adder, "a").unwrap();
//! let b = circuit.in_port(adder, "b").unwrap();
//! circuit.set_input_value(a, 1);
//! circuit.set_input_value(b, 1);
//! circuit.compute(adder);
//!
//! let sum = circuit.out_port(adder, "sum").unwrap();
//! let carry = circuit.out_port(adder, "carry").unwrap();
//! assert!(!circuit.bit(sum, 0));
//! assert!(circuit.bit(carry, 0));
//! assert_eq!(circuit.count_nand_gates(adder), 6);
//! ```
//!
//! ## Core components
//!
//! - **[`expr`]**: the expression handle, symbol table, and canonical order.
//! - **[`simplify`]**: construction rules and algebraic reduction.
//! - **[`subs`]**: substitution maps and wildcard pattern matching.
//! - **[`truth`]**: truth-table generation and printing.
//! - **[`canonical`]**: the sixteen two-variable boolean functions.
//! - **[`circuit`]** / **[`gates`]**: the NAND-gate simulator.

pub mod canonical;
pub mod circuit;
pub mod error;
pub mod expr;
pub mod function;
pub mod gates;
pub mod node;
pub mod print;
pub mod simplify;
pub mod subs;
pub mod truth;
pub mod utils;
