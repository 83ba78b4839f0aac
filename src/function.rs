//! Named boolean functions.
//!
//! A named function wraps a body expression together with an ordered list of
//! declared variables, e.g. `f(x, y) = x & !y`. Functions exist to present
//! canonical truth tables (see [`crate::canonical`]); they refuse
//! substitution, and simplification only rewrites the wrapped body.

use crate::error::{Error, Result};
use crate::expr::{Expr, SymbolSort};
use crate::node::Node;

/// Build a named boolean function over the given variables.
///
/// Fewer than two declared variables fall back to the body's own free
/// variables (sorted by name); if those are still fewer than two, or any
/// declared variable is not a symbol, construction fails.
pub fn function(body: &Expr, vars: &[Expr], name: &str) -> Result<Expr> {
    let mut vars = vars.to_vec();
    if vars.len() < 2 {
        vars = body.get_vars(SymbolSort::NameAsc);
        if vars.len() < 2 {
            return Err(Error::InvalidArgument(
                "a boolean function needs at least two variables".to_string(),
            ));
        }
    }
    for v in &vars {
        if !matches!(v.node(), Node::Symbol { .. }) {
            return Err(Error::InvalidArgument(format!(
                "function variable is not a symbol: {}",
                v
            )));
        }
    }
    let name = if name.is_empty() { "f" } else { name };
    Ok(function_unchecked(body, vars, name))
}

/// Internal constructor for callers that guarantee the variable list is
/// valid (two or more symbols).
pub(crate) fn function_unchecked(body: &Expr, vars: Vec<Expr>, name: &str) -> Expr {
    Expr::new(Node::Function {
        body: body.clone(),
        vars,
        name: name.to_string(),
    })
}

impl Expr {
    /// The declared variables, for function expressions.
    pub fn function_vars(&self) -> Option<&[Expr]> {
        match self.node() {
            Node::Function { vars, .. } => Some(vars),
            _ => None,
        }
    }

    /// The wrapped body, for function expressions.
    pub fn function_body(&self) -> Option<&Expr> {
        match self.node() {
            Node::Function { body, .. } => Some(body),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::expr::SymbolTable;

    #[test]
    fn test_function_requires_two_variables() {
        let st = SymbolTable::new();
        let p = st.var("p");
        assert!(matches!(
            function(&p, &[], "f"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            function(&p, &[p.clone()], "f"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_function_collects_body_variables() {
        let st = SymbolTable::new();
        let x = st.var("x");
        let y = st.var("y");
        let f = function(&(&x & &y), &[], "f").unwrap();
        let vars = f.function_vars().unwrap();
        assert_eq!(vars.len(), 2);
        assert!(vars[0].is_equal(&x));
        assert!(vars[1].is_equal(&y));
    }

    #[test]
    fn test_function_rejects_non_symbol_variables() {
        let st = SymbolTable::new();
        let x = st.var("x");
        let y = st.var("y");
        let not_a_symbol = &x & &y;
        assert!(function(&(&x & &y), &[x.clone(), not_a_symbol], "f").is_err());
    }

    #[test]
    fn test_function_display_and_default_name() {
        let st = SymbolTable::new();
        let x = st.var("x");
        let y = st.var("y");
        let f = function(&(&x & &y), &[x.clone(), y.clone()], "").unwrap();
        let s = f.to_string();
        assert!(s.starts_with("f(x, y) = "));
    }

    #[test]
    fn test_function_simplifies_body_only() {
        let st = SymbolTable::new();
        let x = st.var("x");
        let y = st.var("y");
        let body = &(&x & &y) & &x;
        let f = function(&body, &[x.clone(), y.clone()], "g").unwrap();
        let s = f.simplified();
        assert!(s.function_body().unwrap().is_equal(&(&x & &y)));
        assert_eq!(s.function_vars().unwrap().len(), 2);
    }

    #[test]
    fn test_function_truth_table_over_declared_vars() {
        let st = SymbolTable::new();
        let x = st.var("x");
        let y = st.var("y");
        let f = function(&(&x & &y), &[x.clone(), y.clone()], "f").unwrap();
        let rows = f.truth_table().unwrap();
        let values: Vec<u8> = rows
            .iter()
            .map(|r| r.trivial_value().map(|b| b as u8).unwrap_or(u8::MAX))
            .collect();
        assert_eq!(values, [0, 0, 0, 1]);
    }

    #[test]
    fn test_function_rows_may_stay_symbolic() {
        let st = SymbolTable::new();
        let x = st.var("x");
        let y = st.var("y");
        let z = st.var("z");
        // f(x, y) = (x | y) & z: rows over (x, y) keep z symbolic.
        let f = function(&(&(&x | &y) & &z), &[x.clone(), y.clone()], "f").unwrap();
        let rows = f.truth_table().unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows[0].is_equal(&crate::expr::Expr::from(false)));
        assert!(rows[3].is_equal(&z));
    }
}
