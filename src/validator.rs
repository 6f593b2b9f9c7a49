//! Expression validator: source text → validated [`Expr`], or the reason it
//! was refused.
//!
//! The parser accepts a broad grammar; this pass walks the resulting tree in
//! pre-order and lowers each node into the closed AST, stopping at the first
//! node outside the whitelist.

use crate::ast::{BinaryOp, Expr, Literal, UnaryOp};
use crate::error::Rejection;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::syntax::{Argument, BinaryOperator, Construct, Node, Number, UnaryOperator};
use crate::token::Span;
use crate::whitelist::{self, Binding};
use tracing::debug;

/// Parse and validate `source`. Pure and total: never evaluates anything.
pub fn validate(source: &str) -> Result<Expr, Rejection> {
    let tokens = Lexer::new(source).tokenize()?;
    let tree = Parser::new(tokens).parse_program()?;
    let expr = lower(&tree).inspect_err(|rejection| {
        debug!(%rejection, "expression rejected");
    })?;
    debug!(nodes = expr.node_count(), %expr, "expression validated");
    Ok(expr)
}

fn unsupported(construct: Construct, node: &Node) -> Rejection {
    Rejection::Unsupported {
        construct,
        span: node.span(),
    }
}

fn lower(node: &Node) -> Result<Expr, Rejection> {
    match node {
        Node::Number { value, .. } => Ok(Expr::Literal(match *value {
            Number::Int(n) => Literal::Int(n),
            Number::Float(x) => Literal::Float(x),
        })),

        Node::Name { id, span } => match whitelist::lookup(id) {
            Some(Binding::Variable(var)) => Ok(Expr::Variable(var)),
            // A function is only usable when called.
            Some(Binding::Function1(_) | Binding::Function2(_)) | None => {
                Err(Rejection::DisallowedName {
                    name: id.clone(),
                    span: *span,
                })
            }
        },

        Node::Unary { op, operand, .. } => {
            let op = match op {
                UnaryOperator::Plus => UnaryOp::Plus,
                UnaryOperator::Minus => UnaryOp::Minus,
                UnaryOperator::Invert => return Err(unsupported(Construct::BitwiseInversion, node)),
                UnaryOperator::Not => return Err(unsupported(Construct::LogicalNot, node)),
            };
            Ok(Expr::Unary {
                op,
                operand: Box::new(lower(operand)?),
            })
        }

        Node::Binary {
            op, left, right, ..
        } => {
            let op = match op {
                BinaryOperator::Add => BinaryOp::Add,
                BinaryOperator::Sub => BinaryOp::Sub,
                BinaryOperator::Mul => BinaryOp::Mul,
                BinaryOperator::Div => BinaryOp::Div,
                BinaryOperator::Mod => BinaryOp::Mod,
                BinaryOperator::Pow => BinaryOp::Pow,
                BinaryOperator::BitAnd => BinaryOp::BitAnd,
                BinaryOperator::BitOr => BinaryOp::BitOr,
                BinaryOperator::BitXor => BinaryOp::BitXor,
                BinaryOperator::Shl => BinaryOp::Shl,
                BinaryOperator::Shr => BinaryOp::Shr,
                BinaryOperator::FloorDiv => return Err(unsupported(Construct::FloorDivision, node)),
                BinaryOperator::MatMul => {
                    return Err(unsupported(Construct::MatrixMultiplication, node));
                }
            };
            Ok(Expr::Binary {
                op,
                left: Box::new(lower(left)?),
                right: Box::new(lower(right)?),
            })
        }

        Node::Call { callee, args, span } => lower_call(callee, args, *span),

        Node::Str { .. } => Err(unsupported(Construct::StringLiteral, node)),
        Node::Compare { .. } => Err(unsupported(Construct::Comparison, node)),
        Node::BoolOp { .. } => Err(unsupported(Construct::BooleanOperation, node)),
        Node::Conditional { .. } => Err(unsupported(Construct::Conditional, node)),
        Node::Lambda { .. } => Err(unsupported(Construct::Lambda, node)),
        Node::Attribute { .. } => Err(unsupported(Construct::Attribute, node)),
        Node::Subscript { .. } => Err(unsupported(Construct::Subscript, node)),
        Node::Assign { .. } => Err(unsupported(Construct::Assignment, node)),
        Node::Tuple { .. } => Err(unsupported(Construct::Tuple, node)),
        Node::List { .. } => Err(unsupported(Construct::List, node)),
        Node::Set { .. } => Err(unsupported(Construct::Set, node)),
        Node::Dict { .. } => Err(unsupported(Construct::Dict, node)),
        Node::Comprehension { .. } => Err(unsupported(Construct::Comprehension, node)),
        Node::Statement { .. } => Err(unsupported(Construct::Statement, node)),
    }
}

fn lower_call(callee: &Node, args: &[Argument], span: Span) -> Result<Expr, Rejection> {
    let function = match callee {
        Node::Name { id, .. } => whitelist::lookup(id).and_then(Binding::function),
        _ => None,
    };
    let Some(function) = function else {
        return Err(Rejection::DisallowedCall {
            name: callee.callee_name(),
            span,
        });
    };

    let args = args
        .iter()
        .map(|arg| match arg {
            Argument::Positional(value) => lower(value),
            Argument::Keyword { span, .. } => Err(Rejection::Unsupported {
                construct: Construct::KeywordArgument,
                span: *span,
            }),
            Argument::Starred { span, .. } => Err(Rejection::Unsupported {
                construct: Construct::StarredArgument,
                span: *span,
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if args.len() != function.arity() {
        return Err(Rejection::ArityMismatch {
            name: function.name().to_string(),
            expected: function.arity(),
            found: args.len(),
            span,
        });
    }
    Ok(Expr::Call { function, args })
}
