//! The sixteen canonical two-variable boolean functions.
//!
//! Each constructor mints fresh symbols from the caller's
//! [`SymbolTable`][crate::expr::SymbolTable] and builds the function in
//! terms of `&`, `|` and `!` only. Functions whose value ignores an input
//! (projections, complementations, constants) are wrapped as named
//! functions so both variables stay declared.
//!
//! Numbering follows the truth-table bit pattern over rows 00, 01, 10, 11
//! (first variable most significant): `and` is `0001`, `xor` is `0110`,
//! `nand` is `1110`, and so on.

use crate::expr::{Expr, SymbolTable};
use crate::function::function_unchecked;

/// Boolean function `0000`, f(x, y) = 0.
pub fn constant_0(st: &SymbolTable, x: &str, y: &str) -> Expr {
    let vars = st.vars(&[x, y]);
    function_unchecked(&Expr::from(false), vars, "f")
}

/// Boolean function `0001`, f(x, y) = x & y.
pub fn and(st: &SymbolTable, x: &str, y: &str) -> Expr {
    st.var(x) & st.var(y)
}

/// Boolean function `0010`, f(x, y) = x & !y (nonimplication).
pub fn non_implication(st: &SymbolTable, x: &str, y: &str) -> Expr {
    st.var(x) & !st.var(y)
}

/// Boolean function `0011`, f(x, y) = x.
pub fn left_projection(st: &SymbolTable, x: &str, y: &str) -> Expr {
    let vars = st.vars(&[x, y]);
    let body = vars[0].clone();
    function_unchecked(&body, vars, "f")
}

/// Boolean function `0100`, f(x, y) = !x & y (converse nonimplication).
pub fn converse_non_implication(st: &SymbolTable, x: &str, y: &str) -> Expr {
    !st.var(x) & st.var(y)
}

/// Boolean function `0101`, f(x, y) = y.
pub fn right_projection(st: &SymbolTable, x: &str, y: &str) -> Expr {
    let vars = st.vars(&[x, y]);
    let body = vars[1].clone();
    function_unchecked(&body, vars, "f")
}

/// Boolean function `0110`, f(x, y) = (x & !y) | (!x & y).
pub fn xor(st: &SymbolTable, x: &str, y: &str) -> Expr {
    let ex = st.var(x);
    let ey = st.var(y);
    (&ex & &!&ey) | (&!&ex & &ey)
}

/// Boolean function `0111`, f(x, y) = x | y.
pub fn or(st: &SymbolTable, x: &str, y: &str) -> Expr {
    st.var(x) | st.var(y)
}

/// Boolean function `1000`, f(x, y) = !(x | y).
pub fn nor(st: &SymbolTable, x: &str, y: &str) -> Expr {
    !(st.var(x) | st.var(y))
}

/// Boolean function `1001`, f(x, y) = (x & y) | (!x & !y).
pub fn equivalence(st: &SymbolTable, x: &str, y: &str) -> Expr {
    let ex = st.var(x);
    let ey = st.var(y);
    (&ex & &ey) | (&!&ex & &!&ey)
}

/// Boolean function `1010`, f(x, y) = !y (right complementation).
pub fn right_complementation(st: &SymbolTable, x: &str, y: &str) -> Expr {
    let vars = st.vars(&[x, y]);
    let body = !&vars[1];
    function_unchecked(&body, vars, "f")
}

/// Boolean function `1011`, f(x, y) = x | !y (converse implication).
pub fn converse_implication(st: &SymbolTable, x: &str, y: &str) -> Expr {
    st.var(x) | !st.var(y)
}

/// Boolean function `1100`, f(x, y) = !x (left complementation).
pub fn left_complementation(st: &SymbolTable, x: &str, y: &str) -> Expr {
    let vars = st.vars(&[x, y]);
    let body = !&vars[0];
    function_unchecked(&body, vars, "f")
}

/// Boolean function `1101`, f(x, y) = !x | y (implication).
pub fn implication(st: &SymbolTable, x: &str, y: &str) -> Expr {
    !st.var(x) | st.var(y)
}

/// Boolean function `1110`, f(x, y) = !(x & y).
pub fn nand(st: &SymbolTable, x: &str, y: &str) -> Expr {
    !(st.var(x) & st.var(y))
}

/// Boolean function `1111`, f(x, y) = 1.
pub fn constant_1(st: &SymbolTable, x: &str, y: &str) -> Expr {
    let vars = st.vars(&[x, y]);
    function_unchecked(&Expr::from(true), vars, "f")
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn table(e: &Expr) -> Vec<u8> {
        e.truth_table()
            .unwrap()
            .iter()
            .map(|r| r.trivial_value().map(|b| b as u8).unwrap_or(u8::MAX))
            .collect()
    }

    #[test]
    fn test_all_sixteen_tables() {
        let st = SymbolTable::new();
        let cases: [(&str, fn(&SymbolTable, &str, &str) -> Expr, [u8; 4]); 16] = [
            ("constant_0", constant_0, [0, 0, 0, 0]),
            ("and", and, [0, 0, 0, 1]),
            ("non_implication", non_implication, [0, 0, 1, 0]),
            ("left_projection", left_projection, [0, 0, 1, 1]),
            (
                "converse_non_implication",
                converse_non_implication,
                [0, 1, 0, 0],
            ),
            ("right_projection", right_projection, [0, 1, 0, 1]),
            ("xor", xor, [0, 1, 1, 0]),
            ("or", or, [0, 1, 1, 1]),
            ("nor", nor, [1, 0, 0, 0]),
            ("equivalence", equivalence, [1, 0, 0, 1]),
            (
                "right_complementation",
                right_complementation,
                [1, 0, 1, 0],
            ),
            ("converse_implication", converse_implication, [1, 0, 1, 1]),
            ("left_complementation", left_complementation, [1, 1, 0, 0]),
            ("implication", implication, [1, 1, 0, 1]),
            ("nand", nand, [1, 1, 1, 0]),
            ("constant_1", constant_1, [1, 1, 1, 1]),
        ];
        for (name, build, expected) in cases {
            let f = build(&st, "x", "y");
            assert_eq!(table(&f), expected, "truth table mismatch for {}", name);
        }
    }

    #[test]
    fn test_projection_is_a_named_function() {
        let st = SymbolTable::new();
        let f = left_projection(&st, "x", "y");
        assert_eq!(f.function_vars().map(|v| v.len()), Some(2));
        assert!(f.to_string().starts_with("f(x, y) = "));
    }
}
