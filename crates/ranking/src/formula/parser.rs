//! Recursive-descent parser, one function per precedence level.
//!
//! ```text
//! conditional := or ( '?' conditional ':' conditional )?
//! or          := and ( '||' and )*
//! and         := equality ( '&&' equality )*
//! equality    := comparison ( ( '==' | '!=' ) comparison )*
//! comparison  := additive ( ( '<' | '<=' | '>' | '>=' ) additive )*
//! additive    := term ( ( '+' | '-' ) term )*
//! term        := unary ( ( '*' | '/' | '%' ) unary )*
//! unary       := ( '-' | '!' ) unary | power
//! power       := primary ( '^' unary )?
//! primary     := number | string | true | false | ident | ident '(' args ')' | '(' conditional ')'
//! ```

use crate::error::CompileError;
use crate::value::Value;

use super::ast::{BinaryOp, Builtin, Expr, UnaryOp};
use super::lexer::{Token, TokenKind};

/// Deepest allowed parser recursion. Each parenthesis, call argument,
/// conditional branch and unary operator adds at least one level.
pub const MAX_NESTING: usize = 128;

pub struct Parser<'r> {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    resolve: &'r dyn Fn(&str) -> Option<usize>,
}

impl<'r> Parser<'r> {
    /// `resolve` maps a feature name to its slot.
    pub fn new(tokens: Vec<Token>, resolve: &'r dyn Fn(&str) -> Option<usize>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            resolve,
        }
    }

    /// Parse a complete formula; trailing tokens are an error.
    pub fn parse(mut self) -> Result<Expr, CompileError> {
        if self.peek() == &TokenKind::End {
            return Err(CompileError::Empty);
        }
        let expr = self.conditional()?;
        self.expect(TokenKind::End, "end of formula")?;
        Ok(expr)
    }

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].kind
    }

    fn offset(&self) -> usize {
        self.tokens[self.pos.min(self.tokens.len() - 1)].offset
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<(), CompileError> {
        if self.eat(&kind) {
            Ok(())
        } else {
            Err(self.syntax_error(expected))
        }
    }

    fn syntax_error(&self, expected: &str) -> CompileError {
        CompileError::Syntax {
            offset: self.offset(),
            expected: expected.to_string(),
            found: self.peek().describe(),
        }
    }

    /// Run `rule` one nesting level deeper.
    fn nested(
        &mut self,
        rule: fn(&mut Self) -> Result<Expr, CompileError>,
    ) -> Result<Expr, CompileError> {
        if self.depth >= MAX_NESTING {
            return Err(CompileError::NestingTooDeep {
                offset: self.offset(),
                limit: MAX_NESTING,
            });
        }
        self.depth += 1;
        let expr = rule(self);
        self.depth -= 1;
        expr
    }

    fn conditional(&mut self) -> Result<Expr, CompileError> {
        self.nested(Self::conditional_level)
    }

    fn conditional_level(&mut self) -> Result<Expr, CompileError> {
        let condition = self.or()?;
        if !self.eat(&TokenKind::Question) {
            return Ok(condition);
        }
        let then = self.conditional()?;
        self.expect(TokenKind::Colon, "':'")?;
        let otherwise = self.conditional()?;
        Ok(Expr::Conditional {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    /// Left-associative chain of binary operators at one precedence level.
    fn binary_level(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, CompileError>,
        operator: fn(&TokenKind) -> Option<BinaryOp>,
    ) -> Result<Expr, CompileError> {
        let mut lhs = operand(self)?;
        while let Some(op) = operator(self.peek()) {
            self.advance();
            let rhs = operand(self)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn or(&mut self) -> Result<Expr, CompileError> {
        self.binary_level(Self::and, |t| (t == &TokenKind::OrOr).then_some(BinaryOp::Or))
    }

    fn and(&mut self) -> Result<Expr, CompileError> {
        self.binary_level(Self::equality, |t| {
            (t == &TokenKind::AndAnd).then_some(BinaryOp::And)
        })
    }

    fn equality(&mut self) -> Result<Expr, CompileError> {
        self.binary_level(Self::comparison, |t| match t {
            TokenKind::EqEq => Some(BinaryOp::Eq),
            TokenKind::NotEq => Some(BinaryOp::Ne),
            _ => None,
        })
    }

    fn comparison(&mut self) -> Result<Expr, CompileError> {
        self.binary_level(Self::additive, |t| match t {
            TokenKind::Lt => Some(BinaryOp::Lt),
            TokenKind::Le => Some(BinaryOp::Le),
            TokenKind::Gt => Some(BinaryOp::Gt),
            TokenKind::Ge => Some(BinaryOp::Ge),
            _ => None,
        })
    }

    fn additive(&mut self) -> Result<Expr, CompileError> {
        self.binary_level(Self::term, |t| match t {
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    fn term(&mut self) -> Result<Expr, CompileError> {
        self.binary_level(Self::unary, |t| match t {
            TokenKind::Star => Some(BinaryOp::Mul),
            TokenKind::Slash => Some(BinaryOp::Div),
            TokenKind::Percent => Some(BinaryOp::Rem),
            _ => None,
        })
    }

    fn unary(&mut self) -> Result<Expr, CompileError> {
        self.nested(Self::unary_level)
    }

    fn unary_level(&mut self) -> Result<Expr, CompileError> {
        let op = match self.peek() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.power(),
        };
        self.advance();
        let operand = self.unary()?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn power(&mut self) -> Result<Expr, CompileError> {
        let base = self.primary()?;
        if !self.eat(&TokenKind::Caret) {
            return Ok(base);
        }
        // Right-associative: a ^ b ^ c == a ^ (b ^ c).
        let exponent = self.unary()?;
        Ok(Expr::Binary {
            op: BinaryOp::Pow,
            lhs: Box::new(base),
            rhs: Box::new(exponent),
        })
    }

    fn primary(&mut self) -> Result<Expr, CompileError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number(n) => Ok(Expr::Literal(Value::Number(n))),
            TokenKind::Str(s) => Ok(Expr::Literal(Value::Text(s))),
            TokenKind::LParen => {
                let inner = self.conditional()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Ident(name) => {
                if self.peek() == &TokenKind::LParen {
                    self.advance();
                    return self.call(name, token.offset);
                }
                match name.as_str() {
                    "true" => Ok(Expr::Literal(Value::Boolean(true))),
                    "false" => Ok(Expr::Literal(Value::Boolean(false))),
                    _ => match (self.resolve)(&name) {
                        Some(slot) => Ok(Expr::Feature { slot, name }),
                        None => Err(CompileError::UnresolvedIdentifier {
                            name,
                            offset: token.offset,
                        }),
                    },
                }
            }
            other => Err(CompileError::Syntax {
                offset: token.offset,
                expected: "a value".to_string(),
                found: other.describe(),
            }),
        }
    }

    /// Parse call arguments after the opening parenthesis.
    fn call(&mut self, name: String, offset: usize) -> Result<Expr, CompileError> {
        let function =
            Builtin::from_name(&name).ok_or(CompileError::UnknownFunction { name, offset })?;

        let mut args = Vec::new();
        if !self.eat(&TokenKind::RParen) {
            loop {
                args.push(self.conditional()?);
                if self.eat(&TokenKind::Comma) {
                    continue;
                }
                self.expect(TokenKind::RParen, "',' or ')'")?;
                break;
            }
        }

        if !function.accepts(args.len()) {
            return Err(CompileError::Arity {
                name: function.name().to_string(),
                expected: function.arity_description(),
                found: args.len(),
            });
        }
        Ok(Expr::Call { function, args })
    }
}
