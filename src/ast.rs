//! The validated expression tree.
//!
//! Only the permitted vocabulary is representable here: a value of [`Expr`]
//! is evaluable by construction. It is built exclusively by
//! [`crate::validator`].

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Literal {
    /// Integer literal, already reduced modulo 2^32.
    Int(u32),
    Float(f64),
}

/// The single bound input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variable {
    /// `t`, the sample index.
    #[serde(rename = "t")]
    Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnaryOp {
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
        }
    }
}

/// A whitelisted elementwise function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Exp,
    Sqrt,
    Log,
    Abs,
    Min,
    Max,
}

impl Function {
    pub fn name(self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Exp => "exp",
            Function::Sqrt => "sqrt",
            Function::Log => "log",
            Function::Abs => "abs",
            Function::Min => "min",
            Function::Max => "max",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Function::Min | Function::Max => 2,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Expr {
    Literal(Literal),
    Variable(Variable),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        function: Function,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        match self {
            Expr::Literal(_) | Expr::Variable(_) => 1,
            Expr::Unary { operand, .. } => 1 + operand.node_count(),
            Expr::Binary { left, right, .. } => 1 + left.node_count() + right.node_count(),
            Expr::Call { args, .. } => 1 + args.iter().map(Expr::node_count).sum::<usize>(),
        }
    }

    /// Does the expression reference `t` anywhere?
    pub fn depends_on_time(&self) -> bool {
        match self {
            Expr::Literal(_) => false,
            Expr::Variable(_) => true,
            Expr::Unary { operand, .. } => operand.depends_on_time(),
            Expr::Binary { left, right, .. } => left.depends_on_time() || right.depends_on_time(),
            Expr::Call { args, .. } => args.iter().any(Expr::depends_on_time),
        }
    }
}

/// Fully parenthesized source form; re-validating it yields the same tree.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(Literal::Int(n)) => write!(f, "{n}"),
            Expr::Literal(Literal::Float(x)) => write!(f, "{x:?}"),
            Expr::Variable(Variable::Time) => f.write_str("t"),
            Expr::Unary { op, operand } => {
                let sign = match op {
                    UnaryOp::Plus => '+',
                    UnaryOp::Minus => '-',
                };
                write!(f, "({sign}{operand})")
            }
            Expr::Binary { op, left, right } => write!(f, "({left} {} {right})", op.symbol()),
            Expr::Call { function, args } => {
                write!(f, "{}(", function.name())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t() -> Box<Expr> {
        Box::new(Expr::Variable(Variable::Time))
    }

    fn int(n: u32) -> Box<Expr> {
        Box::new(Expr::Literal(Literal::Int(n)))
    }

    #[test]
    fn display_is_fully_parenthesized() {
        let expr = Expr::Binary {
            op: BinaryOp::BitAnd,
            left: Box::new(Expr::Binary {
                op: BinaryOp::Mul,
                left: t(),
                right: Box::new(Expr::Binary {
                    op: BinaryOp::Shr,
                    left: t(),
                    right: int(9),
                }),
            }),
            right: int(255),
        };
        assert_eq!(expr.to_string(), "((t * (t >> 9)) & 255)");
    }

    #[test]
    fn display_calls_and_floats() {
        let expr = Expr::Call {
            function: Function::Max,
            args: vec![
                Expr::Unary {
                    op: UnaryOp::Minus,
                    operand: t(),
                },
                Expr::Literal(Literal::Float(0.5)),
            ],
        };
        assert_eq!(expr.to_string(), "max((-t), 0.5)");
    }

    #[test]
    fn node_count_and_time_dependence() {
        let expr = Expr::Call {
            function: Function::Sin,
            args: vec![Expr::Binary {
                op: BinaryOp::Mul,
                left: t(),
                right: int(2),
            }],
        };
        assert_eq!(expr.node_count(), 4);
        assert!(expr.depends_on_time());
        assert!(!Expr::Literal(Literal::Int(3)).depends_on_time());
    }

    #[test]
    fn function_arity() {
        assert_eq!(Function::Sin.arity(), 1);
        assert_eq!(Function::Abs.arity(), 1);
        assert_eq!(Function::Min.arity(), 2);
        assert_eq!(Function::Max.arity(), 2);
    }

    #[test]
    fn serializes_to_tagged_json() {
        let expr = Expr::Binary {
            op: BinaryOp::Add,
            left: t(),
            right: int(1),
        };
        let json = serde_json::to_value(&expr).unwrap();
        assert_eq!(json["binary"]["op"], "add");
        assert_eq!(json["binary"]["left"]["variable"], "t");
        assert_eq!(json["binary"]["right"]["literal"]["value"], 1);
    }
}
