use crate::{
    ast::{BinaryOp, Expr, Function},
    error::ParseError,
    lexer::{Token, TokenKind},
    program::Assignment,
};

/// Deepest nesting of parentheses, calls and unary operators accepted.
pub(crate) const MAX_NESTING: usize = 128;

/// Deepest expression tree accepted, counting operator chains.
pub(crate) const MAX_TREE_DEPTH: usize = 512;

/// An expression with the height of its tree.
struct Node {
    expr: Expr,
    depth: usize,
}

impl Node {
    fn leaf(expr: Expr) -> Self {
        Self { expr, depth: 1 }
    }
}

/// Recursive-descent parser over a token stream.
///
/// Grammar:
///
/// ```text
/// program    := sep* assignment (sep+ assignment)* sep*
/// assignment := IDENT '=' sum
/// sum        := product (('+' | '-') product)*
/// product    := unary (('*' | '/') unary)*
/// unary      := ('+' | '-') unary | power
/// power      := primary ('^' unary)?
/// primary    := NUMBER | IDENT | IDENT '(' args ')' | '(' sum ')'
/// ```
///
/// Every recursive path passes through `unary`, which bounds the recursion
/// at [`MAX_NESTING`]. Nodes also carry their height so that long operator
/// chains cannot build a tree deeper than [`MAX_TREE_DEPTH`].
pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    nesting: usize,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            nesting: 0,
        }
    }

    pub(crate) fn program(mut self) -> Result<Vec<Assignment>, ParseError> {
        let mut assignments = Vec::new();

        loop {
            while self.eat(&TokenKind::Separator) {}
            if self.peek().is_none() {
                break;
            }

            assignments.push(self.assignment()?);

            match self.peek() {
                None | Some(TokenKind::Separator) => {}
                Some(_) => return Err(self.unexpected("end of statement")),
            }
        }

        if assignments.is_empty() {
            return Err(ParseError::Empty);
        }
        Ok(assignments)
    }

    fn assignment(&mut self) -> Result<Assignment, ParseError> {
        let output = match self.advance() {
            Some(Token {
                kind: TokenKind::Ident(name),
                ..
            }) => name,
            Some(token) => {
                return Err(ParseError::Unexpected {
                    expected: "output name",
                    found: token.kind.describe(),
                    offset: token.offset,
                });
            }
            None => {
                return Err(ParseError::UnexpectedEnd {
                    expected: "output name",
                });
            }
        };

        self.expect(&TokenKind::Equals, "`=`")?;
        let expr = self.sum()?.expr;

        Ok(Assignment { output, expr })
    }

    fn sum(&mut self) -> Result<Node, ParseError> {
        let mut lhs = self.product()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Plus) => BinaryOp::Add,
                Some(TokenKind::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.product()?;
            lhs = binary(op, lhs, rhs)?;
        }
    }

    fn product(&mut self) -> Result<Node, ParseError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Star) => BinaryOp::Mul,
                Some(TokenKind::Slash) => BinaryOp::Div,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = binary(op, lhs, rhs)?;
        }
    }

    fn unary(&mut self) -> Result<Node, ParseError> {
        if self.nesting >= MAX_NESTING {
            return Err(ParseError::TooDeep { limit: MAX_NESTING });
        }
        self.nesting += 1;
        let node = self.unary_inner();
        self.nesting -= 1;
        node
    }

    fn unary_inner(&mut self) -> Result<Node, ParseError> {
        if self.eat(&TokenKind::Minus) {
            let inner = self.unary()?;
            return wrap(inner.depth, Expr::Negate(Box::new(inner.expr)));
        }
        if self.eat(&TokenKind::Plus) {
            return self.unary();
        }
        self.power()
    }

    fn power(&mut self) -> Result<Node, ParseError> {
        let base = self.primary()?;
        if self.eat(&TokenKind::Caret) {
            let exponent = self.unary()?;
            return binary(BinaryOp::Pow, base, exponent);
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Node, ParseError> {
        let Some(token) = self.advance() else {
            return Err(ParseError::UnexpectedEnd {
                expected: "operand",
            });
        };

        match token.kind {
            TokenKind::Number(value) => Ok(Node::leaf(Expr::Number(value))),
            TokenKind::Ident(name) if self.peek() == Some(&TokenKind::LParen) => {
                self.call(name, token.offset)
            }
            TokenKind::Ident(name) => Ok(Node::leaf(Expr::Variable(name))),
            TokenKind::LParen => {
                let inner = self.sum()?;
                self.expect(&TokenKind::RParen, "`)`")?;
                Ok(inner)
            }
            other => Err(ParseError::Unexpected {
                expected: "operand",
                found: other.describe(),
                offset: token.offset,
            }),
        }
    }

    fn call(&mut self, name: String, offset: usize) -> Result<Node, ParseError> {
        let function =
            Function::from_name(&name).ok_or(ParseError::UnknownFunction { name, offset })?;

        self.expect(&TokenKind::LParen, "`(`")?;
        let mut args = Vec::new();
        let mut depth = 0;
        if !self.eat(&TokenKind::RParen) {
            loop {
                let arg = self.sum()?;
                depth = depth.max(arg.depth);
                args.push(arg.expr);
                if self.eat(&TokenKind::Comma) {
                    continue;
                }
                self.expect(&TokenKind::RParen, "`)`")?;
                break;
            }
        }

        if args.len() != function.arity() {
            return Err(ParseError::Arity {
                name: function.name(),
                expected: function.arity(),
                found: args.len(),
            });
        }

        wrap(depth, Expr::Call { function, args })
    }

    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, expected: &'static str) -> Result<(), ParseError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        match self.tokens.get(self.pos) {
            Some(token) => ParseError::Unexpected {
                expected,
                found: token.kind.describe(),
                offset: token.offset,
            },
            None => ParseError::UnexpectedEnd { expected },
        }
    }
}

fn binary(op: BinaryOp, lhs: Node, rhs: Node) -> Result<Node, ParseError> {
    wrap(
        lhs.depth.max(rhs.depth),
        Expr::Binary {
            op,
            lhs: Box::new(lhs.expr),
            rhs: Box::new(rhs.expr),
        },
    )
}

/// Places `expr` one level above children of height `child_depth`.
fn wrap(child_depth: usize, expr: Expr) -> Result<Node, ParseError> {
    let depth = child_depth + 1;
    if depth > MAX_TREE_DEPTH {
        return Err(ParseError::TooDeep {
            limit: MAX_TREE_DEPTH,
        });
    }
    Ok(Node { expr, depth })
}
