//! Error taxonomy: lexing and parsing failures fold into [`Rejection`],
//! runtime failures are [`EvalError`], and [`BytebeatError`] wraps both for
//! the synthesis pipeline.

use crate::syntax::Construct;
use crate::token::{Span, Token, token_to_string};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' at pos {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("unterminated string at pos {pos}")]
    UnterminatedString { pos: usize },
    #[error("invalid number '{text}' at pos {pos}")]
    InvalidNumber { text: String, pos: usize },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { ch, pos } => Span::new(*pos, pos + ch.len_utf8()),
            LexError::UnterminatedString { pos } => Span::new(*pos, pos + 1),
            LexError::InvalidNumber { text, pos } => Span::new(*pos, pos + text.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("expected {expected}, found '{}' at pos {}", token_to_string(.found), .span.start)]
    UnexpectedToken {
        expected: String,
        found: Token,
        span: Span,
    },
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEOF { expected: String, span: Span },
    #[error("expression nested deeper than {limit} levels")]
    TooDeep { limit: usize, span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. }
            | ParseError::UnexpectedEOF { span, .. }
            | ParseError::TooDeep { span, .. } => *span,
        }
    }
}

/// Why an expression was refused by the validator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("syntax error in expression: {message}")]
    Syntax { message: String, span: Span },
    #[error("use of name '{name}' is not allowed")]
    DisallowedName { name: String, span: Span },
    #[error("function '{name}' is not allowed")]
    DisallowedCall { name: String, span: Span },
    #[error("unsupported expression element: {construct}")]
    Unsupported { construct: Construct, span: Span },
    #[error("function '{name}' takes {expected} argument(s) but {found} were given")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },
}

impl Rejection {
    /// Byte range of the offending source text.
    pub fn span(&self) -> Span {
        match self {
            Rejection::Syntax { span, .. }
            | Rejection::DisallowedName { span, .. }
            | Rejection::DisallowedCall { span, .. }
            | Rejection::Unsupported { span, .. }
            | Rejection::ArityMismatch { span, .. } => *span,
        }
    }
}

impl From<LexError> for Rejection {
    fn from(e: LexError) -> Self {
        Rejection::Syntax {
            span: e.span(),
            message: e.to_string(),
        }
    }
}

impl From<ParseError> for Rejection {
    fn from(e: ParseError) -> Self {
        Rejection::Syntax {
            span: e.span(),
            message: e.to_string(),
        }
    }
}

/// Failure while evaluating a validated expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("result has {found} samples, expected {expected}")]
    ShapeMismatch { expected: usize, found: usize },
    #[error("result is not a finite number at sample {index}")]
    NonNumericResult { index: usize },
    #[error("'{operator}' by zero at sample {index}")]
    ArithmeticPolicyViolation { operator: &'static str, index: usize },
    #[error("domain of {len} samples exceeds the limit of {max}")]
    DomainTooLarge { len: usize, max: usize },
    #[error("function '{function}' called with {found} argument(s)")]
    MalformedCall { function: &'static str, found: usize },
}

impl EvalError {
    /// Rebase a chunk-relative sample index onto the whole domain.
    pub(crate) fn offset_by(self, offset: usize) -> Self {
        match self {
            EvalError::NonNumericResult { index } => EvalError::NonNumericResult {
                index: index + offset,
            },
            EvalError::ArithmeticPolicyViolation { operator, index } => {
                EvalError::ArithmeticPolicyViolation {
                    operator,
                    index: index + offset,
                }
            }
            other => other,
        }
    }
}

#[derive(Debug, Error)]
pub enum BytebeatError {
    #[error(transparent)]
    Rejected(#[from] Rejection),
    #[error("error during evaluation: {0}")]
    Evaluation(#[from] EvalError),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("WAV encoding failed: {0}")]
    Wav(#[from] hound::Error),
}
