//! Surface syntax tree produced by the parser.
//!
//! The grammar recognizes more than the evaluator will ever run: comparisons,
//! lambdas, subscripts and the like all parse so that the validator can name
//! them when it refuses them. Only [`crate::ast::Expr`] reaches evaluation.

use crate::token::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(u32),
    Float(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,
    Minus,
    /// `~x`
    Invert,
    /// `not x` / `!x`
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
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
    FloorDiv,
    MatMul,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOperator {
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    NotEq,
    In,
    NotIn,
    Is,
    IsNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOperator {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    List,
    Set,
    Dict,
    Generator,
}

/// An argument in a call's parenthesized list.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Positional(Node),
    Keyword { name: String, value: Node, span: Span },
    Starred { value: Node, span: Span },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Number {
        value: Number,
        span: Span,
    },
    Name {
        id: String,
        span: Span,
    },
    Str {
        value: String,
        span: Span,
    },
    Unary {
        op: UnaryOperator,
        operand: Box<Node>,
        span: Span,
    },
    Binary {
        op: BinaryOperator,
        left: Box<Node>,
        right: Box<Node>,
        span: Span,
    },
    /// `a < b <= c`
    Compare {
        first: Box<Node>,
        rest: Vec<(CompareOperator, Node)>,
        span: Span,
    },
    BoolOp {
        op: BoolOperator,
        left: Box<Node>,
        right: Box<Node>,
        span: Span,
    },
    /// `body if test else orelse`, or `test ? body : orelse`
    Conditional {
        test: Box<Node>,
        body: Box<Node>,
        orelse: Box<Node>,
        span: Span,
    },
    Lambda {
        params: Vec<String>,
        body: Box<Node>,
        span: Span,
    },
    Call {
        callee: Box<Node>,
        args: Vec<Argument>,
        span: Span,
    },
    Attribute {
        value: Box<Node>,
        attr: String,
        span: Span,
    },
    Subscript {
        value: Box<Node>,
        index: Box<Node>,
        span: Span,
    },
    /// `target = value`, `target := value`, `target += value`
    Assign {
        target: Box<Node>,
        value: Box<Node>,
        span: Span,
    },
    Tuple {
        items: Vec<Node>,
        span: Span,
    },
    List {
        items: Vec<Node>,
        span: Span,
    },
    Set {
        items: Vec<Node>,
        span: Span,
    },
    Dict {
        entries: Vec<(Node, Node)>,
        span: Span,
    },
    /// `[x for x in xs if c]` and friends.
    Comprehension {
        kind: CollectionKind,
        element: Box<Node>,
        target: Box<Node>,
        iter: Box<Node>,
        conditions: Vec<Node>,
        span: Span,
    },
    /// Anything statement-shaped: `import os`, `t; t`. The remainder of the
    /// input is not parsed further.
    Statement {
        keyword: String,
        span: Span,
    },
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Node::Number { span, .. }
            | Node::Name { span, .. }
            | Node::Str { span, .. }
            | Node::Unary { span, .. }
            | Node::Binary { span, .. }
            | Node::Compare { span, .. }
            | Node::BoolOp { span, .. }
            | Node::Conditional { span, .. }
            | Node::Lambda { span, .. }
            | Node::Call { span, .. }
            | Node::Attribute { span, .. }
            | Node::Subscript { span, .. }
            | Node::Assign { span, .. }
            | Node::Tuple { span, .. }
            | Node::List { span, .. }
            | Node::Set { span, .. }
            | Node::Dict { span, .. }
            | Node::Comprehension { span, .. }
            | Node::Statement { span, .. } => *span,
        }
    }

    /// Dotted source form of a callee, e.g. `os.system` or `f(...)`.
    pub fn callee_name(&self) -> String {
        match self {
            Node::Name { id, .. } => id.clone(),
            Node::Attribute { value, attr, .. } => format!("{}.{attr}", value.callee_name()),
            Node::Subscript { value, .. } => format!("{}[...]", value.callee_name()),
            Node::Call { callee, .. } => format!("{}(...)", callee.callee_name()),
            _ => "<expression>".to_string(),
        }
    }
}

/// A construct that parses but is not part of the permitted vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Construct {
    Conditional,
    Comparison,
    BooleanOperation,
    LogicalNot,
    Lambda,
    Attribute,
    Subscript,
    Assignment,
    StringLiteral,
    Tuple,
    List,
    Set,
    Dict,
    Comprehension,
    FloorDivision,
    MatrixMultiplication,
    BitwiseInversion,
    KeywordArgument,
    StarredArgument,
    Statement,
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Construct::Conditional => "conditional expression",
            Construct::Comparison => "comparison",
            Construct::BooleanOperation => "boolean operation",
            Construct::LogicalNot => "logical not",
            Construct::Lambda => "lambda",
            Construct::Attribute => "attribute access",
            Construct::Subscript => "subscript",
            Construct::Assignment => "assignment",
            Construct::StringLiteral => "string literal",
            Construct::Tuple => "tuple",
            Construct::List => "list",
            Construct::Set => "set",
            Construct::Dict => "dict",
            Construct::Comprehension => "comprehension",
            Construct::FloorDivision => "floor division",
            Construct::MatrixMultiplication => "matrix multiplication",
            Construct::BitwiseInversion => "bitwise inversion",
            Construct::KeywordArgument => "keyword argument",
            Construct::StarredArgument => "starred argument",
            Construct::Statement => "statement",
        };
        f.write_str(name)
    }
}
