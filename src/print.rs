//! Rendering of expressions with minimal parenthesization.
//!
//! Precedences: atoms and negation bind tightest (70), then conjunction (50),
//! disjunction (40), and relational operators loosest (20). A subexpression
//! is parenthesized iff its precedence is less than or equal to the
//! precedence of the context it is printed in; atoms never parenthesize
//! themselves.

use std::fmt;

use crate::expr::Expr;
use crate::node::Node;

pub const PREC_ATOM: u32 = 70;
pub const PREC_AND: u32 = 50;
pub const PREC_OR: u32 = 40;
pub const PREC_RELATIONAL: u32 = 20;

impl Node {
    pub fn precedence(&self) -> u32 {
        match self {
            Node::And { .. } => PREC_AND,
            Node::Or { .. } => PREC_OR,
            Node::Relational { .. } => PREC_RELATIONAL,
            _ => PREC_ATOM,
        }
    }
}

/// Formatting configuration: the default context renders one line, the tree
/// context renders one indented node per line.
#[derive(Debug, Copy, Clone, Default)]
pub struct PrintOptions {
    pub tree: bool,
}

impl Expr {
    /// Render with explicit options. `Display` is equivalent to the default
    /// options.
    pub fn to_pretty(&self, options: PrintOptions) -> String {
        if options.tree {
            let mut out = String::new();
            write_tree(&mut out, self, 0);
            out
        } else {
            self.to_string()
        }
    }

    /// Render as an indented tree, one node per line.
    pub fn tree_string(&self) -> String {
        self.to_pretty(PrintOptions { tree: true })
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_prec(f, self, 0)
    }
}

fn write_prec(f: &mut fmt::Formatter<'_>, e: &Expr, level: u32) -> fmt::Result {
    let prec = e.node().precedence();
    match e.node() {
        Node::Constant(v) => write!(f, "{}", *v as u8),
        Node::Symbol { name, .. } => f.write_str(name),
        Node::Wildcard(label) => write!(f, "${}", label),
        Node::Not { operand, active } => {
            let parens = prec <= level;
            if parens {
                f.write_str("(")?;
            }
            if *active {
                f.write_str("!")?;
            }
            write_prec(f, operand, prec)?;
            if parens {
                f.write_str(")")?;
            }
            Ok(())
        }
        Node::And { operands, .. } | Node::Or { operands, .. } => {
            let parens = prec <= level;
            if parens {
                f.write_str("(")?;
            }
            if let Some(v) = e.trivial() {
                write!(f, "{}", v as u8)?;
            } else if operands.len() == 1 {
                write_prec(f, &operands[0], 0)?;
            } else {
                let sep = if matches!(e.node(), Node::And { .. }) {
                    " & "
                } else {
                    " | "
                };
                for (i, op) in operands.iter().enumerate() {
                    if i > 0 {
                        f.write_str(sep)?;
                    }
                    write_prec(f, op, prec)?;
                }
            }
            if parens {
                f.write_str(")")?;
            }
            Ok(())
        }
        Node::Relational { lhs, rhs, op } => {
            let parens = prec <= level;
            if parens {
                f.write_str("(")?;
            }
            write_prec(f, lhs, prec)?;
            write!(f, " {} ", op.symbol())?;
            write_prec(f, rhs, prec)?;
            if parens {
                f.write_str(")")?;
            }
            Ok(())
        }
        Node::Function { body, vars, name } => {
            write!(f, "{}(", name)?;
            for (i, v) in vars.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_prec(f, v, 0)?;
            }
            f.write_str(") = ")?;
            write_prec(f, body, 0)
        }
    }
}

fn write_tree(out: &mut String, e: &Expr, depth: usize) {
    let indent = "  ".repeat(depth);
    let line = match e.node() {
        Node::Constant(v) => format!("constant {}", *v as u8),
        Node::Symbol { name, serial } => format!("symbol {} #{}", name, serial),
        Node::Wildcard(label) => format!("wildcard ${}", label),
        Node::Not { active, .. } => {
            format!("not{}", if *active { "" } else { " (inactive)" })
        }
        Node::And { collapsed, .. } => {
            format!("and{}", if *collapsed { " (collapsed)" } else { "" })
        }
        Node::Or { collapsed, .. } => {
            format!("or{}", if *collapsed { " (collapsed)" } else { "" })
        }
        Node::Relational { op, .. } => format!("relational {}", op.symbol()),
        Node::Function { name, .. } => format!("function {}", name),
    };
    out.push_str(&indent);
    out.push_str(&line);
    out.push('\n');
    for i in 0..e.num_operands() {
        if let Ok(op) = e.operand(i) {
            write_tree(out, op, depth + 1);
        }
    }
}
