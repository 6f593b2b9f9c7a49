use crate::error::ParseError;
use crate::syntax::*;
use crate::token::{Span, Spanned, Token};

/// Nesting limit for parenthesized / prefixed sub-expressions. Keeps the
/// recursive descent bounded on adversarial input like `((((((...`.
pub const MAX_DEPTH: usize = 200;

pub struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Spanned>) -> Self {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    // ── Helpers ──────────────────────────────────────────────

    fn peek(&self) -> Token {
        self.tokens[self.pos].token.clone()
    }

    fn peek_at(&self, offset: usize) -> Token {
        let idx = self.pos + offset;
        if idx < self.tokens.len() {
            self.tokens[idx].token.clone()
        } else {
            Token::EOF
        }
    }

    fn span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn advance(&mut self) -> Spanned {
        let s = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        s
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::EOF)
    }

    fn check(&self, expected: &Token) -> bool {
        std::mem::discriminant(&self.tokens[self.pos].token) == std::mem::discriminant(expected)
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        if self.is_at_end() {
            ParseError::UnexpectedEOF {
                expected: expected.into(),
                span: self.span(),
            }
        } else {
            ParseError::UnexpectedToken {
                expected: expected.into(),
                found: self.peek(),
                span: self.span(),
            }
        }
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<Spanned, ParseError> {
        if self.check(expected) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Token::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// Span from `start` to the end of the last consumed token.
    fn span_from(&self, start: usize) -> Span {
        let end = self.tokens[self.pos.saturating_sub(1)].span.end;
        Span::new(start, end.max(start))
    }

    fn descend(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::TooDeep {
                limit: MAX_DEPTH,
                span: self.span(),
            });
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // ── Program ──────────────────────────────────────────────

    /// Parse a complete input: one expression, optionally the target of an
    /// assignment, and nothing after it.
    pub fn parse_program(&mut self) -> Result<Node, ParseError> {
        let start = self.span().start;

        match self.peek() {
            Token::Reserved(keyword) => return Ok(self.parse_statement_tail(keyword, start)),
            Token::For => return Ok(self.parse_statement_tail("for".to_string(), start)),
            _ => {}
        }

        let expr = self.parse_expr()?;

        let node = match self.peek() {
            Token::Eq | Token::ColonEq | Token::AugAssign(_) => {
                self.advance();
                let value = self.parse_expr()?;
                Node::Assign {
                    target: Box::new(expr),
                    value: Box::new(value),
                    span: self.span_from(start),
                }
            }
            _ => expr,
        };

        if self.check(&Token::Semicolon) {
            return Ok(self.parse_statement_tail(";".to_string(), start));
        }
        if !self.is_at_end() {
            return Err(self.unexpected("end of input"));
        }
        Ok(node)
    }

    /// Swallow the rest of the input as an opaque statement.
    fn parse_statement_tail(&mut self, keyword: String, start: usize) -> Node {
        while !self.is_at_end() {
            self.advance();
        }
        Node::Statement {
            keyword,
            span: self.span_from(start),
        }
    }

    // ── Expressions ─────────────────────────────────────────

    pub fn parse_expr(&mut self) -> Result<Node, ParseError> {
        self.descend()?;
        let node = if self.check(&Token::Lambda) {
            self.parse_lambda()?
        } else {
            self.parse_conditional()?
        };
        self.ascend();
        Ok(node)
    }

    /// An expression that may be a `name := value` binding.
    fn parse_named_expr(&mut self) -> Result<Node, ParseError> {
        let start = self.span().start;
        let target = self.parse_expr()?;
        if !self.eat(&Token::ColonEq) {
            return Ok(target);
        }
        let value = self.parse_expr()?;
        Ok(Node::Assign {
            target: Box::new(target),
            value: Box::new(value),
            span: self.span_from(start),
        })
    }

    fn parse_lambda(&mut self) -> Result<Node, ParseError> {
        let start = self.span().start;
        self.advance(); // consume `lambda`
        let mut params = Vec::new();
        if !self.check(&Token::Colon) {
            params.push(self.expect_ident()?);
            while self.eat(&Token::Comma) {
                params.push(self.expect_ident()?);
            }
        }
        self.expect(&Token::Colon, "':' after lambda parameters")?;
        let body = self.parse_expr()?;
        Ok(Node::Lambda {
            params,
            body: Box::new(body),
            span: self.span_from(start),
        })
    }

    fn parse_conditional(&mut self) -> Result<Node, ParseError> {
        let start = self.span().start;
        let first = self.parse_or()?;

        if self.eat(&Token::If) {
            // Python form: `body if test else orelse`
            let test = self.parse_or()?;
            self.expect(&Token::Else, "'else'")?;
            let orelse = self.parse_expr()?;
            return Ok(Node::Conditional {
                test: Box::new(test),
                body: Box::new(first),
                orelse: Box::new(orelse),
                span: self.span_from(start),
            });
        }

        if self.eat(&Token::Question) {
            // C form: `test ? body : orelse`
            let body = self.parse_expr()?;
            self.expect(&Token::Colon, "':' in conditional expression")?;
            let orelse = self.parse_expr()?;
            return Ok(Node::Conditional {
                test: Box::new(first),
                body: Box::new(body),
                orelse: Box::new(orelse),
                span: self.span_from(start),
            });
        }

        Ok(first)
    }

    fn parse_or(&mut self) -> Result<Node, ParseError> {
        let start = self.span().start;
        let depth = self.depth;
        let mut left = self.parse_and()?;
        while matches!(self.peek(), Token::Or | Token::PipePipe) {
            self.descend()?;
            self.advance();
            let right = self.parse_and()?;
            left = Node::BoolOp {
                op: BoolOperator::Or,
                left: Box::new(left),
                right: Box::new(right),
                span: self.span_from(start),
            };
        }
        self.depth = depth;
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Node, ParseError> {
        let start = self.span().start;
        let depth = self.depth;
        let mut left = self.parse_not()?;
        while matches!(self.peek(), Token::And | Token::AmpAmp) {
            self.descend()?;
            self.advance();
            let right = self.parse_not()?;
            left = Node::BoolOp {
                op: BoolOperator::And,
                left: Box::new(left),
                right: Box::new(right),
                span: self.span_from(start),
            };
        }
        self.depth = depth;
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Node, ParseError> {
        if !matches!(self.peek(), Token::Not | Token::Bang) {
            return self.parse_comparison();
        }
        let start = self.span().start;
        self.descend()?;
        self.advance();
        let operand = self.parse_not()?;
        self.ascend();
        Ok(Node::Unary {
            op: UnaryOperator::Not,
            operand: Box::new(operand),
            span: self.span_from(start),
        })
    }

    fn compare_operator(&mut self) -> Option<CompareOperator> {
        let op = match (self.peek(), self.peek_at(1)) {
            (Token::Lt, _) => CompareOperator::Lt,
            (Token::Gt, _) => CompareOperator::Gt,
            (Token::Le, _) => CompareOperator::Le,
            (Token::Ge, _) => CompareOperator::Ge,
            (Token::EqEq, _) => CompareOperator::Eq,
            (Token::NotEq, _) => CompareOperator::NotEq,
            (Token::In, _) => CompareOperator::In,
            (Token::Not, Token::In) => {
                self.advance();
                CompareOperator::NotIn
            }
            (Token::Is, Token::Not) => {
                self.advance();
                CompareOperator::IsNot
            }
            (Token::Is, _) => CompareOperator::Is,
            _ => return None,
        };
        self.advance();
        Some(op)
    }

    fn parse_comparison(&mut self) -> Result<Node, ParseError> {
        let start = self.span().start;
        let first = self.parse_bitor()?;
        let mut rest = Vec::new();
        while let Some(op) = self.compare_operator() {
            rest.push((op, self.parse_bitor()?));
        }
        if rest.is_empty() {
            return Ok(first);
        }
        Ok(Node::Compare {
            first: Box::new(first),
            rest,
            span: self.span_from(start),
        })
    }

    /// Left-associative binary level: `next (op next)*`. Every fold nests
    /// the tree one level deeper and counts toward the nesting limit.
    fn parse_binary_level(
        &mut self,
        next: fn(&mut Self) -> Result<Node, ParseError>,
        operator: fn(&Token) -> Option<BinaryOperator>,
    ) -> Result<Node, ParseError> {
        let start = self.span().start;
        let depth = self.depth;
        let mut left = next(self)?;
        while let Some(op) = operator(&self.peek()) {
            self.descend()?;
            self.advance();
            let right = next(self)?;
            left = Node::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span: self.span_from(start),
            };
        }
        self.depth = depth;
        Ok(left)
    }

    fn parse_bitor(&mut self) -> Result<Node, ParseError> {
        self.parse_binary_level(Self::parse_bitxor, |t| {
            matches!(t, Token::Pipe).then_some(BinaryOperator::BitOr)
        })
    }

    fn parse_bitxor(&mut self) -> Result<Node, ParseError> {
        self.parse_binary_level(Self::parse_bitand, |t| {
            matches!(t, Token::Caret).then_some(BinaryOperator::BitXor)
        })
    }

    fn parse_bitand(&mut self) -> Result<Node, ParseError> {
        self.parse_binary_level(Self::parse_shift, |t| {
            matches!(t, Token::Amp).then_some(BinaryOperator::BitAnd)
        })
    }

    fn parse_shift(&mut self) -> Result<Node, ParseError> {
        self.parse_binary_level(Self::parse_arith, |t| match t {
            Token::Shl => Some(BinaryOperator::Shl),
            Token::Shr => Some(BinaryOperator::Shr),
            _ => None,
        })
    }

    fn parse_arith(&mut self) -> Result<Node, ParseError> {
        self.parse_binary_level(Self::parse_term, |t| match t {
            Token::Plus => Some(BinaryOperator::Add),
            Token::Minus => Some(BinaryOperator::Sub),
            _ => None,
        })
    }

    fn parse_term(&mut self) -> Result<Node, ParseError> {
        self.parse_binary_level(Self::parse_unary, |t| match t {
            Token::Star => Some(BinaryOperator::Mul),
            Token::Slash => Some(BinaryOperator::Div),
            Token::Percent => Some(BinaryOperator::Mod),
            Token::SlashSlash => Some(BinaryOperator::FloorDiv),
            Token::At => Some(BinaryOperator::MatMul),
            _ => None,
        })
    }

    fn parse_unary(&mut self) -> Result<Node, ParseError> {
        let op = match self.peek() {
            Token::Plus => UnaryOperator::Plus,
            Token::Minus => UnaryOperator::Minus,
            Token::Tilde => UnaryOperator::Invert,
            _ => return self.parse_power(),
        };
        let start = self.span().start;
        self.descend()?;
        self.advance();
        let operand = self.parse_unary()?;
        self.ascend();
        Ok(Node::Unary {
            op,
            operand: Box::new(operand),
            span: self.span_from(start),
        })
    }

    /// `base ** exponent`, right-associative; the exponent may carry a sign.
    fn parse_power(&mut self) -> Result<Node, ParseError> {
        let start = self.span().start;
        let base = self.parse_postfix()?;
        if !self.eat(&Token::StarStar) {
            return Ok(base);
        }
        self.descend()?;
        let exponent = self.parse_unary()?;
        self.ascend();
        Ok(Node::Binary {
            op: BinaryOperator::Pow,
            left: Box::new(base),
            right: Box::new(exponent),
            span: self.span_from(start),
        })
    }

    fn parse_postfix(&mut self) -> Result<Node, ParseError> {
        let start = self.span().start;
        let depth = self.depth;
        let mut node = self.parse_atom()?;
        loop {
            if matches!(self.peek(), Token::LParen | Token::Dot | Token::LBracket) {
                self.descend()?;
            }
            match self.peek() {
                Token::LParen => {
                    self.advance();
                    let args = self.parse_call_args()?;
                    self.expect(&Token::RParen, "')' to close the argument list")?;
                    node = Node::Call {
                        callee: Box::new(node),
                        args,
                        span: self.span_from(start),
                    };
                }
                Token::Dot => {
                    self.advance();
                    let attr = self.expect_ident()?;
                    node = Node::Attribute {
                        value: Box::new(node),
                        attr,
                        span: self.span_from(start),
                    };
                }
                Token::LBracket => {
                    self.advance();
                    let index = self.parse_subscript_index()?;
                    self.expect(&Token::RBracket, "']' to close the subscript")?;
                    node = Node::Subscript {
                        value: Box::new(node),
                        index: Box::new(index),
                        span: self.span_from(start),
                    };
                }
                _ => {
                    self.depth = depth;
                    return Ok(node);
                }
            }
        }
    }

    fn parse_call_args(&mut self) -> Result<Vec<Argument>, ParseError> {
        let mut args = Vec::new();
        while !self.check(&Token::RParen) {
            let start = self.span().start;
            let arg = match (self.peek(), self.peek_at(1)) {
                (Token::Star | Token::StarStar, _) => {
                    self.advance();
                    let value = self.parse_expr()?;
                    Argument::Starred {
                        value,
                        span: self.span_from(start),
                    }
                }
                (Token::Ident(name), Token::Eq) => {
                    self.advance();
                    self.advance();
                    let value = self.parse_expr()?;
                    Argument::Keyword {
                        name,
                        value,
                        span: self.span_from(start),
                    }
                }
                _ => {
                    let value = self.parse_named_expr()?;
                    if self.check(&Token::For) {
                        Argument::Positional(self.parse_comprehension(
                            CollectionKind::Generator,
                            value,
                            start,
                        )?)
                    } else {
                        Argument::Positional(value)
                    }
                }
            };
            args.push(arg);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(args)
    }

    /// `x[i]`, `x[a:b:c]`, `x[i, j]`. Slices are kept as a tuple of their
    /// present bounds; only their shape matters to the validator.
    fn parse_subscript_index(&mut self) -> Result<Node, ParseError> {
        let start = self.span().start;
        let mut items = Vec::new();
        let mut is_slice = false;
        loop {
            if !matches!(self.peek(), Token::Colon | Token::Comma | Token::RBracket) {
                items.push(self.parse_expr()?);
            }
            if self.eat(&Token::Colon) {
                is_slice = true;
                continue;
            }
            if self.eat(&Token::Comma) {
                continue;
            }
            break;
        }
        if items.len() == 1 && !is_slice {
            return Ok(items.remove(0));
        }
        Ok(Node::Tuple {
            items,
            span: self.span_from(start),
        })
    }

    /// `element for target in iter (if cond)*`, with the element already parsed.
    fn parse_comprehension(
        &mut self,
        kind: CollectionKind,
        element: Node,
        start: usize,
    ) -> Result<Node, ParseError> {
        let mut clauses = Vec::new();
        let mut conditions = Vec::new();
        while self.eat(&Token::For) {
            let target = self.parse_target_list()?;
            self.expect(&Token::In, "'in' in comprehension")?;
            let iter = self.parse_or()?;
            clauses.push((target, iter));
            while self.eat(&Token::If) {
                conditions.push(self.parse_or()?);
            }
        }
        // The loop ran at least once: callers only get here on `for`.
        let (target, iter) = clauses
            .into_iter()
            .next()
            .ok_or_else(|| self.unexpected("'for'"))?;
        Ok(Node::Comprehension {
            kind,
            element: Box::new(element),
            target: Box::new(target),
            iter: Box::new(iter),
            conditions,
            span: self.span_from(start),
        })
    }

    fn parse_target_list(&mut self) -> Result<Node, ParseError> {
        let start = self.span().start;
        let first = self.parse_bitor()?;
        if !self.check(&Token::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&Token::Comma) {
            if self.check(&Token::In) {
                break;
            }
            items.push(self.parse_bitor()?);
        }
        Ok(Node::Tuple {
            items,
            span: self.span_from(start),
        })
    }

    // ── Atoms ───────────────────────────────────────────────

    fn parse_atom(&mut self) -> Result<Node, ParseError> {
        let start = self.span().start;
        match self.peek() {
            Token::Int(n) => {
                self.advance();
                Ok(Node::Number {
                    value: Number::Int(n),
                    span: self.span_from(start),
                })
            }
            Token::Float(x) => {
                self.advance();
                Ok(Node::Number {
                    value: Number::Float(x),
                    span: self.span_from(start),
                })
            }
            Token::Ident(id) => {
                self.advance();
                Ok(Node::Name {
                    id,
                    span: self.span_from(start),
                })
            }
            Token::StringLit(mut value) => {
                self.advance();
                // Adjacent literals concatenate: `'a' 'b'`
                while let Token::StringLit(more) = self.peek() {
                    self.advance();
                    value.push_str(&more);
                }
                Ok(Node::Str {
                    value,
                    span: self.span_from(start),
                })
            }
            Token::LParen => self.parse_paren(),
            Token::LBracket => self.parse_list(),
            Token::LBrace => self.parse_brace(),
            _ => Err(self.unexpected("expression")),
        }
    }

    /// `(expr)`, `()`, `(a, b)`, `(x for x in y)`
    fn parse_paren(&mut self) -> Result<Node, ParseError> {
        let start = self.span().start;
        self.advance(); // consume (
        if self.eat(&Token::RParen) {
            return Ok(Node::Tuple {
                items: Vec::new(),
                span: self.span_from(start),
            });
        }
        let first = self.parse_named_expr()?;
        if self.check(&Token::For) {
            let node = self.parse_comprehension(CollectionKind::Generator, first, start)?;
            self.expect(&Token::RParen, "')'")?;
            return Ok(node);
        }
        if !self.check(&Token::Comma) {
            self.expect(&Token::RParen, "')'")?;
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&Token::Comma) {
            if self.check(&Token::RParen) {
                break; // trailing comma
            }
            items.push(self.parse_expr()?);
        }
        self.expect(&Token::RParen, "')'")?;
        Ok(Node::Tuple {
            items,
            span: self.span_from(start),
        })
    }

    fn parse_list(&mut self) -> Result<Node, ParseError> {
        let start = self.span().start;
        self.advance(); // consume [
        if self.eat(&Token::RBracket) {
            return Ok(Node::List {
                items: Vec::new(),
                span: self.span_from(start),
            });
        }
        let first = self.parse_expr()?;
        if self.check(&Token::For) {
            let node = self.parse_comprehension(CollectionKind::List, first, start)?;
            self.expect(&Token::RBracket, "']'")?;
            return Ok(node);
        }
        let items = self.parse_items_after(first, &Token::RBracket)?;
        self.expect(&Token::RBracket, "']'")?;
        Ok(Node::List {
            items,
            span: self.span_from(start),
        })
    }

    /// `{}`, `{k: v, ...}`, `{a, b}`, and their comprehensions.
    fn parse_brace(&mut self) -> Result<Node, ParseError> {
        let start = self.span().start;
        self.advance(); // consume {
        if self.eat(&Token::RBrace) {
            return Ok(Node::Dict {
                entries: Vec::new(),
                span: self.span_from(start),
            });
        }

        let first = self.parse_expr()?;
        if self.eat(&Token::Colon) {
            let value = self.parse_expr()?;
            if self.check(&Token::For) {
                let pair_span = first.span().to(value.span());
                let element = Node::Tuple {
                    items: vec![first, value],
                    span: pair_span,
                };
                let node = self.parse_comprehension(CollectionKind::Dict, element, start)?;
                self.expect(&Token::RBrace, "'}'")?;
                return Ok(node);
            }
            let mut entries = vec![(first, value)];
            while self.eat(&Token::Comma) {
                if self.check(&Token::RBrace) {
                    break;
                }
                let key = self.parse_expr()?;
                self.expect(&Token::Colon, "':' in dict entry")?;
                entries.push((key, self.parse_expr()?));
            }
            self.expect(&Token::RBrace, "'}'")?;
            return Ok(Node::Dict {
                entries,
                span: self.span_from(start),
            });
        }

        if self.check(&Token::For) {
            let node = self.parse_comprehension(CollectionKind::Set, first, start)?;
            self.expect(&Token::RBrace, "'}'")?;
            return Ok(node);
        }
        let items = self.parse_items_after(first, &Token::RBrace)?;
        self.expect(&Token::RBrace, "'}'")?;
        Ok(Node::Set {
            items,
            span: self.span_from(start),
        })
    }

    fn parse_items_after(&mut self, first: Node, close: &Token) -> Result<Vec<Node>, ParseError> {
        let mut items = vec![first];
        while self.eat(&Token::Comma) {
            if self.check(close) {
                break; // trailing comma
            }
            items.push(self.parse_expr()?);
        }
        Ok(items)
    }
}
