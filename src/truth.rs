//! Exhaustive truth-table generation and printing.
//!
//! Enumeration is exponential in the variable count by nature; the row
//! counter caps the variable count at the host word size, and exceeding it
//! fails rather than truncating.

use crate::error::{Error, Result};
use crate::expr::{eq, Expr, SymbolSort};
use crate::node::Node;

impl Expr {
    /// The truth table over this expression's own variables (sorted by
    /// name).
    ///
    /// Each entry is the constant the expression reduces to for one
    /// assignment; row `i` encodes the assignment with the first variable as
    /// the most significant bit. A named boolean function is tabulated over
    /// its declared variables, and its rows are allowed to stay symbolic
    /// when the body mentions variables outside the declared ones.
    pub fn truth_table(&self) -> Result<Vec<Expr>> {
        match self.node() {
            Node::Function { body, vars, .. } => rows_over(body, vars, false),
            _ => rows_over(self, &self.get_vars(SymbolSort::NameAsc), true),
        }
    }

    /// The truth table over an explicit variable ordering.
    pub fn truth_table_over(&self, vars: &[Expr]) -> Result<Vec<Expr>> {
        rows_over(self, vars, true)
    }

    /// The rendered truth table, in the layout of [`print_truth_table`][Self::print_truth_table].
    pub fn truth_table_string(&self) -> Result<String> {
        let (target, vars, label) = match self.node() {
            Node::Function { body, vars, name } => (body, vars.clone(), name.clone()),
            _ => (self, self.get_vars(SymbolSort::NameAsc), "v".to_string()),
        };
        let rows = rows_over(target, &vars, !matches!(self.node(), Node::Function { .. }))?;

        let names: Vec<String> = vars
            .iter()
            .map(|v| v.symbol_name().unwrap_or("?").to_string())
            .collect();
        let rule_len = names.iter().map(|n| n.len() + 3).sum::<usize>() + label.len() + 2;
        let rule = "-".repeat(rule_len);

        let mut out = String::new();
        out.push_str(&format!(" ** Truth table for {} = {} **\n", label, target));
        out.push_str(&rule);
        out.push('\n');
        for name in &names {
            out.push_str(&format!(" {} |", name));
        }
        out.push_str(&format!(" {} \n", label));
        out.push_str(&rule);
        out.push('\n');
        let n = vars.len();
        for (row, value) in rows.iter().enumerate() {
            for (i, name) in names.iter().enumerate() {
                let bit = (row >> (n - 1 - i)) & 1;
                out.push_str(&format!(" {:>width$} |", bit, width = name.len()));
            }
            out.push_str(&format!(" {}\n", value));
        }
        out.push_str(&rule);
        out.push('\n');
        Ok(out)
    }

    /// Print the truth table to stdout.
    pub fn print_truth_table(&self) -> Result<()> {
        print!("{}", self.truth_table_string()?);
        Ok(())
    }
}

fn rows_over(expr: &Expr, vars: &[Expr], require_trivial: bool) -> Result<Vec<Expr>> {
    let n = vars.len();
    if n >= usize::BITS as usize {
        return Err(Error::TruthTableTooLarge { vars: n });
    }
    let num_rows = 1usize << n;
    let mut rows = Vec::with_capacity(num_rows);
    for v in 0..num_rows {
        let mut row = expr.clone();
        for (i, var) in vars.iter().enumerate() {
            let bit = (v >> (n - 1 - i)) & 1 == 1;
            row = row.subs_rel(&eq(var, &Expr::from(bit)))?;
        }
        let row = row.simplified();
        match row.trivial() {
            Some(b) => rows.push(Expr::from(b)),
            None if require_trivial => {
                return Err(Error::Inconsistent(format!(
                    "truth-table row {} did not reduce to a constant: {}",
                    v, row
                )));
            }
            None => rows.push(row),
        }
    }
    Ok(rows)
}
