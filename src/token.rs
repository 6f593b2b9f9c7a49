#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Int(u32),
    Float(f64),
    StringLit(String),
    Ident(String),

    // Keywords
    If,
    Else,
    Lambda,
    And,
    Or,
    Not,
    In,
    Is,
    For,
    /// Statement-only keyword (`import`, `def`, `return`, ...).
    Reserved(String),

    // Arithmetic
    Plus,      // +
    Minus,     // -
    Star,      // *
    StarStar,  // **
    Slash,     // /
    SlashSlash, // //
    Percent,   // %
    At,        // @

    // Bitwise
    Amp,   // &
    Pipe,  // |
    Caret, // ^
    Tilde, // ~
    Shl,   // <<
    Shr,   // >>

    // Comparison / logic
    Lt,       // <
    Gt,       // >
    Le,       // <=
    Ge,       // >=
    EqEq,     // ==
    NotEq,    // !=
    Bang,     // !
    AmpAmp,   // &&
    PipePipe, // ||
    Question, // ?

    // Assignment
    Eq,                // =
    ColonEq,           // :=
    AugAssign(String), // +=, <<=, ...

    // Punctuation
    Dot,       // .
    Comma,     // ,
    Colon,     // :
    Semicolon, // ;
    LParen,    // (
    RParen,    // )
    LBracket,  // [
    RBracket,  // ]
    LBrace,    // {
    RBrace,    // }

    // Structural
    EOF,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub span: Span,
}

/// Convert a token back to its approximate source representation.
pub fn token_to_string(token: &Token) -> String {
    match token {
        Token::Int(n) => n.to_string(),
        Token::Float(x) => {
            if x.fract() == 0.0 && x.is_finite() {
                format!("{x:.1}")
            } else {
                format!("{x}")
            }
        }
        Token::StringLit(s) => format!("{s:?}"),
        Token::Ident(s) => s.clone(),
        Token::If => "if".into(),
        Token::Else => "else".into(),
        Token::Lambda => "lambda".into(),
        Token::And => "and".into(),
        Token::Or => "or".into(),
        Token::Not => "not".into(),
        Token::In => "in".into(),
        Token::Is => "is".into(),
        Token::For => "for".into(),
        Token::Reserved(s) => s.clone(),
        Token::Plus => "+".into(),
        Token::Minus => "-".into(),
        Token::Star => "*".into(),
        Token::StarStar => "**".into(),
        Token::Slash => "/".into(),
        Token::SlashSlash => "//".into(),
        Token::Percent => "%".into(),
        Token::At => "@".into(),
        Token::Amp => "&".into(),
        Token::Pipe => "|".into(),
        Token::Caret => "^".into(),
        Token::Tilde => "~".into(),
        Token::Shl => "<<".into(),
        Token::Shr => ">>".into(),
        Token::Lt => "<".into(),
        Token::Gt => ">".into(),
        Token::Le => "<=".into(),
        Token::Ge => ">=".into(),
        Token::EqEq => "==".into(),
        Token::NotEq => "!=".into(),
        Token::Bang => "!".into(),
        Token::AmpAmp => "&&".into(),
        Token::PipePipe => "||".into(),
        Token::Question => "?".into(),
        Token::Eq => "=".into(),
        Token::ColonEq => ":=".into(),
        Token::AugAssign(op) => op.clone(),
        Token::Dot => ".".into(),
        Token::Comma => ",".into(),
        Token::Colon => ":".into(),
        Token::Semicolon => ";".into(),
        Token::LParen => "(".into(),
        Token::RParen => ")".into(),
        Token::LBracket => "[".into(),
        Token::RBracket => "]".into(),
        Token::LBrace => "{".into(),
        Token::RBrace => "}".into(),
        Token::EOF => "end of input".into(),
    }
}
