use crate::error::LexError;
use crate::token::{Span, Spanned, Token};

pub struct Lexer {
    chars: Vec<char>,
    /// Precomputed byte offset for each char index.
    /// `byte_offsets[i]` = byte offset of `chars[i]` in the original `&str`.
    /// `byte_offsets[chars.len()]` = total byte length (sentinel for EOF).
    byte_offsets: Vec<usize>,
    pos: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        // Build a lookup table: char index → byte offset.
        let mut byte_offsets = Vec::with_capacity(chars.len() + 1);
        let mut offset = 0;
        for ch in &chars {
            byte_offsets.push(offset);
            offset += ch.len_utf8();
        }
        byte_offsets.push(offset); // sentinel for EOF
        Lexer {
            chars,
            byte_offsets,
            pos: 0,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Spanned>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let spanned = self.next_token()?;
            let is_eof = spanned.token == Token::EOF;
            tokens.push(spanned);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    /// Skip whitespace (newlines included, the input is a single expression)
    /// and `#` line comments.
    fn skip_trivia(&mut self) {
        while self.pos < self.chars.len() {
            let ch = self.chars[self.pos];
            if ch.is_whitespace() {
                self.pos += 1;
            } else if ch == '#' {
                while self.pos < self.chars.len() && self.chars[self.pos] != '\n' {
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    /// Convert a char index to a byte offset.
    fn byte_pos_of(&self, char_idx: usize) -> usize {
        self.byte_offsets[char_idx.min(self.chars.len())]
    }

    fn spanned(&self, token: Token, start: usize) -> Spanned {
        Spanned {
            token,
            span: Span {
                start: self.byte_pos_of(start),
                end: self.byte_pos_of(self.pos),
            },
        }
    }

    /// Consume `len` chars and emit `token`.
    fn op(&mut self, token: Token, len: usize, start: usize) -> Result<Spanned, LexError> {
        self.pos += len;
        Ok(self.spanned(token, start))
    }

    fn next_token(&mut self) -> Result<Spanned, LexError> {
        self.skip_trivia();

        if self.pos >= self.chars.len() {
            let end = self.byte_pos_of(self.pos);
            return Ok(Spanned {
                token: Token::EOF,
                span: Span { start: end, end },
            });
        }

        let start = self.pos;
        let ch = self.chars[self.pos];
        let next = self.peek_at(1);
        let third = self.peek_at(2);

        match ch {
            '+' | '-' | '%' | '@' | '^' if next == Some('=') => {
                self.op(Token::AugAssign(format!("{ch}=")), 2, start)
            }
            '+' => self.op(Token::Plus, 1, start),
            '-' => self.op(Token::Minus, 1, start),
            '%' => self.op(Token::Percent, 1, start),
            '@' => self.op(Token::At, 1, start),
            '^' => self.op(Token::Caret, 1, start),
            '~' => self.op(Token::Tilde, 1, start),
            '*' if next == Some('*') && third == Some('=') => {
                self.op(Token::AugAssign("**=".into()), 3, start)
            }
            '*' if next == Some('*') => self.op(Token::StarStar, 2, start),
            '*' if next == Some('=') => self.op(Token::AugAssign("*=".into()), 2, start),
            '*' => self.op(Token::Star, 1, start),
            '/' if next == Some('/') && third == Some('=') => {
                self.op(Token::AugAssign("//=".into()), 3, start)
            }
            '/' if next == Some('/') => self.op(Token::SlashSlash, 2, start),
            '/' if next == Some('=') => self.op(Token::AugAssign("/=".into()), 2, start),
            '/' => self.op(Token::Slash, 1, start),
            '&' if next == Some('&') => self.op(Token::AmpAmp, 2, start),
            '&' if next == Some('=') => self.op(Token::AugAssign("&=".into()), 2, start),
            '&' => self.op(Token::Amp, 1, start),
            '|' if next == Some('|') => self.op(Token::PipePipe, 2, start),
            '|' if next == Some('=') => self.op(Token::AugAssign("|=".into()), 2, start),
            '|' => self.op(Token::Pipe, 1, start),
            '<' if next == Some('<') && third == Some('=') => {
                self.op(Token::AugAssign("<<=".into()), 3, start)
            }
            '<' if next == Some('<') => self.op(Token::Shl, 2, start),
            '<' if next == Some('=') => self.op(Token::Le, 2, start),
            '<' => self.op(Token::Lt, 1, start),
            '>' if next == Some('>') && third == Some('=') => {
                self.op(Token::AugAssign(">>=".into()), 3, start)
            }
            '>' if next == Some('>') => self.op(Token::Shr, 2, start),
            '>' if next == Some('=') => self.op(Token::Ge, 2, start),
            '>' => self.op(Token::Gt, 1, start),
            '=' if next == Some('=') => self.op(Token::EqEq, 2, start),
            '=' => self.op(Token::Eq, 1, start),
            '!' if next == Some('=') => self.op(Token::NotEq, 2, start),
            '!' => self.op(Token::Bang, 1, start),
            ':' if next == Some('=') => self.op(Token::ColonEq, 2, start),
            ':' => self.op(Token::Colon, 1, start),
            '?' => self.op(Token::Question, 1, start),
            ',' => self.op(Token::Comma, 1, start),
            ';' => self.op(Token::Semicolon, 1, start),
            '(' => self.op(Token::LParen, 1, start),
            ')' => self.op(Token::RParen, 1, start),
            '[' => self.op(Token::LBracket, 1, start),
            ']' => self.op(Token::RBracket, 1, start),
            '{' => self.op(Token::LBrace, 1, start),
            '}' => self.op(Token::RBrace, 1, start),
            '.' if next.is_some_and(|c| c.is_ascii_digit()) => self.lex_number(start),
            '.' => self.op(Token::Dot, 1, start),
            '"' | '\'' => self.lex_string(start),
            c if c.is_ascii_digit() => self.lex_number(start),
            c if c.is_alphabetic() || c == '_' => self.lex_ident(start),
            _ => Err(LexError::UnexpectedChar {
                ch,
                pos: self.byte_pos_of(start),
            }),
        }
    }

    fn lex_string(&mut self, start: usize) -> Result<Spanned, LexError> {
        let Some(quote) = self.advance() else {
            return Err(LexError::UnterminatedString {
                pos: self.byte_pos_of(start),
            });
        };
        let mut s = String::new();
        loop {
            match self.advance() {
                Some(c) if c == quote => break,
                Some('\\') => match self.advance() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some(c) => s.push(c),
                    None => {
                        return Err(LexError::UnterminatedString {
                            pos: self.byte_pos_of(start),
                        });
                    }
                },
                Some(c) => s.push(c),
                None => {
                    return Err(LexError::UnterminatedString {
                        pos: self.byte_pos_of(start),
                    });
                }
            }
        }
        Ok(self.spanned(Token::StringLit(s), start))
    }

    fn lex_number(&mut self, start: usize) -> Result<Spanned, LexError> {
        let radix = match (self.chars[self.pos], self.peek_at(1)) {
            ('0', Some('x' | 'X')) => Some(16),
            ('0', Some('o' | 'O')) => Some(8),
            ('0', Some('b' | 'B')) => Some(2),
            _ => None,
        };

        let token = match radix {
            Some(radix) => {
                self.pos += 2;
                self.lex_radix_digits(start, radix)?
            }
            None => self.lex_decimal(start)?,
        };

        // `12abc`, `1j`: a literal glued to an identifier is malformed.
        if self
            .peek_at(0)
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            while self
                .peek_at(0)
                .is_some_and(|c| c.is_alphanumeric() || c == '_')
            {
                self.pos += 1;
            }
            return Err(self.invalid_number(start));
        }

        Ok(self.spanned(token, start))
    }

    /// Integer literal in base 2, 8 or 16, reduced modulo 2^32.
    fn lex_radix_digits(&mut self, start: usize, radix: u32) -> Result<Token, LexError> {
        let mut value: u32 = 0;
        let mut digits = 0;
        while let Some(c) = self.peek_at(0) {
            if c == '_' {
                self.pos += 1;
                continue;
            }
            match c.to_digit(radix) {
                Some(d) => {
                    value = value.wrapping_mul(radix).wrapping_add(d);
                    digits += 1;
                    self.pos += 1;
                }
                None => break,
            }
        }
        if digits == 0 {
            return Err(self.invalid_number(start));
        }
        Ok(Token::Int(value))
    }

    fn lex_decimal(&mut self, start: usize) -> Result<Token, LexError> {
        let mut is_float = false;
        self.eat_digits();

        if self.peek_at(0) == Some('.') {
            // `1.` and `1.e5` are floats, `1.x` is not consumed here
            let after = self.peek_at(1);
            if !after.is_some_and(|c| c.is_alphabetic() || c == '_') || self.exponent_at(1) {
                is_float = true;
                self.pos += 1;
                self.eat_digits();
            }
        }

        if self.exponent_at(0) {
            let sign = usize::from(matches!(self.peek_at(1), Some('+' | '-')));
            is_float = true;
            self.pos += 1 + sign;
            self.eat_digits();
        }

        let text: String = self.chars[start..self.pos]
            .iter()
            .filter(|&&c| c != '_')
            .collect();

        if is_float {
            let value: f64 = text.parse().map_err(|_| self.invalid_number(start))?;
            return Ok(Token::Float(value));
        }

        // Leading zeros are a syntax error, as in Python: `007`
        if text.len() > 1 && text.starts_with('0') && text.chars().any(|c| c != '0') {
            return Err(self.invalid_number(start));
        }

        let value = text
            .bytes()
            .fold(0u32, |acc, b| acc.wrapping_mul(10).wrapping_add(u32::from(b - b'0')));
        Ok(Token::Int(value))
    }

    /// Does an exponent (`e5`, `E-3`) start `offset` chars ahead?
    fn exponent_at(&self, offset: usize) -> bool {
        if !matches!(self.peek_at(offset), Some('e' | 'E')) {
            return false;
        }
        let sign = usize::from(matches!(self.peek_at(offset + 1), Some('+' | '-')));
        self.peek_at(offset + 1 + sign).is_some_and(|c| c.is_ascii_digit())
    }

    fn eat_digits(&mut self) {
        while self
            .peek_at(0)
            .is_some_and(|c| c.is_ascii_digit() || c == '_')
        {
            self.pos += 1;
        }
    }

    fn invalid_number(&self, start: usize) -> LexError {
        LexError::InvalidNumber {
            text: self.chars[start..self.pos].iter().collect(),
            pos: self.byte_pos_of(start),
        }
    }

    fn lex_ident(&mut self, start: usize) -> Result<Spanned, LexError> {
        while self.pos < self.chars.len() {
            let ch = self.chars[self.pos];
            if ch.is_alphanumeric() || ch == '_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        let token = match text.as_str() {
            "if" => Token::If,
            "else" => Token::Else,
            "lambda" => Token::Lambda,
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            "in" => Token::In,
            "is" => Token::Is,
            "for" => Token::For,
            "import" | "from" | "def" | "class" | "return" | "del" | "pass" | "while"
            | "with" | "raise" | "global" | "nonlocal" | "assert" | "yield" | "try"
            | "break" | "continue" | "async" | "await" => Token::Reserved(text),
            _ => Token::Ident(text),
        };
        Ok(self.spanned(token, start))
    }
}
