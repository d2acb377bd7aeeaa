//! Infix formula parsing.
//!
//! Generators build derivative and initial-state formulas as text and hand
//! them to an [`ExpressionParser`]. The trait keeps the grammar swappable so
//! callers can substitute a recording or restricted parser.
//!
//! Grammar accepted by [`InfixParser`], loosest binding first:
//!
//! ```text
//! or      := and ( "||" and )*
//! and     := compare ( ("&&" | "&") compare )*
//! compare := sum ( ("==" | "=" | "<" | "<=" | ">" | ">=") sum )*
//! sum     := product ( ("+" | "-") product )*
//! product := unary ( ("*" | "/") unary )*
//! unary   := "-" unary | primary
//! primary := number | identifier | "true" | "false" | "(" or ")"
//! ```
//!
//! A chained comparison `a <= b <= c` means `a <= b && b <= c`.

use crate::error::{FormulaError, FormulaResult};
use crate::expression::{Expression, Operator};

/// Turns formula text into expression trees.
pub trait ExpressionParser {
    /// Parse an arithmetic expression such as a flow right-hand side.
    fn parse_value(&self, text: &str) -> FormulaResult<Expression>;

    /// Parse a boolean condition such as a guard or initial set.
    fn parse_condition(&self, text: &str) -> FormulaResult<Expression>;
}

impl<P: ExpressionParser + ?Sized> ExpressionParser for &P {
    fn parse_value(&self, text: &str) -> FormulaResult<Expression> {
        (**self).parse_value(text)
    }

    fn parse_condition(&self, text: &str) -> FormulaResult<Expression> {
        (**self).parse_condition(text)
    }
}

/// Recursive-descent parser for the infix grammar above.
#[derive(Debug, Clone, Copy, Default)]
pub struct InfixParser;

impl InfixParser {
    pub fn new() -> Self {
        Self
    }

    fn parse(&self, text: &str) -> FormulaResult<Expression> {
        let tokens = tokenize(text)?;
        let mut cursor = Cursor {
            input: text,
            tokens,
            pos: 0,
        };
        let expr = cursor.parse_or()?;
        match cursor.peek() {
            None => Ok(expr),
            Some(tok) => Err(FormulaError::new(
                text,
                tok.offset,
                format!("unexpected trailing token '{}'", tok.kind),
            )),
        }
    }
}

impl ExpressionParser for InfixParser {
    fn parse_value(&self, text: &str) -> FormulaResult<Expression> {
        let expr = self.parse(text)?;
        if expr.is_boolean() {
            return Err(FormulaError::new(text, 0, "expected a value, found a condition"));
        }
        Ok(expr)
    }

    fn parse_condition(&self, text: &str) -> FormulaResult<Expression> {
        let expr = self.parse(text)?;
        if !expr.is_boolean() {
            return Err(FormulaError::new(text, 0, "expected a condition, found a value"));
        }
        Ok(expr)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Number(f64),
    Ident(String),
    Op(Operator),
    LParen,
    RParen,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Number(v) => write!(f, "{}", v),
            TokenKind::Ident(s) => write!(f, "{}", s),
            TokenKind::Op(op) => write!(f, "{}", op.symbol()),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    offset: usize,
}

fn tokenize(input: &str) -> FormulaResult<Vec<Token>> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let start = i;

        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || c == b'.' {
            while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                i += 1;
            }
            if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
                let mut j = i + 1;
                if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
                    j += 1;
                }
                if j < bytes.len() && bytes[j].is_ascii_digit() {
                    while j < bytes.len() && bytes[j].is_ascii_digit() {
                        j += 1;
                    }
                    i = j;
                }
            }
            let text = &input[start..i];
            let value: f64 = text
                .parse()
                .map_err(|_| FormulaError::new(input, start, format!("bad number '{}'", text)))?;
            tokens.push(Token {
                kind: TokenKind::Number(value),
                offset: start,
            });
            continue;
        }

        if c.is_ascii_alphabetic() || c == b'_' {
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Ident(input[start..i].to_string()),
                offset: start,
            });
            continue;
        }

        let next = bytes.get(i + 1).copied();
        let (kind, width) = match (c, next) {
            (b'(', _) => (TokenKind::LParen, 1),
            (b')', _) => (TokenKind::RParen, 1),
            (b'+', _) => (TokenKind::Op(Operator::Add), 1),
            (b'-', _) => (TokenKind::Op(Operator::Subtract), 1),
            (b'*', _) => (TokenKind::Op(Operator::Multiply), 1),
            (b'/', _) => (TokenKind::Op(Operator::Divide), 1),
            (b'<', Some(b'=')) => (TokenKind::Op(Operator::LessEqual), 2),
            (b'<', _) => (TokenKind::Op(Operator::Less), 1),
            (b'>', Some(b'=')) => (TokenKind::Op(Operator::GreaterEqual), 2),
            (b'>', _) => (TokenKind::Op(Operator::Greater), 1),
            (b'=', Some(b'=')) => (TokenKind::Op(Operator::Equal), 2),
            (b'=', _) => (TokenKind::Op(Operator::Equal), 1),
            (b'&', Some(b'&')) => (TokenKind::Op(Operator::And), 2),
            (b'&', _) => (TokenKind::Op(Operator::And), 1),
            (b'|', Some(b'|')) => (TokenKind::Op(Operator::Or), 2),
            _ => {
                return Err(FormulaError::new(
                    input,
                    start,
                    format!("unexpected character '{}'", c as char),
                ))
            }
        };
        tokens.push(Token {
            kind,
            offset: start,
        });
        i += width;
    }

    Ok(tokens)
}

struct Cursor<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_op(&self) -> Option<Operator> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Op(op),
                ..
            }) => Some(*op),
            _ => None,
        }
    }

    fn end_offset(&self) -> usize {
        self.input.len()
    }

    fn parse_or(&mut self) -> FormulaResult<Expression> {
        let mut left = self.parse_and()?;
        while self.peek_op() == Some(Operator::Or) {
            self.pos += 1;
            let right = self.parse_and()?;
            left = Expression::binary(Operator::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> FormulaResult<Expression> {
        let mut left = self.parse_compare()?;
        while self.peek_op() == Some(Operator::And) {
            self.pos += 1;
            let right = self.parse_compare()?;
            left = Expression::binary(Operator::And, left, right);
        }
        Ok(left)
    }

    fn parse_compare(&mut self) -> FormulaResult<Expression> {
        let first = self.parse_sum()?;
        let mut result: Option<Expression> = None;
        let mut lhs = first.clone();

        while let Some(op) = self.peek_op().filter(Operator::is_comparison) {
            self.pos += 1;
            let rhs = self.parse_sum()?;
            let link = Expression::binary(op, lhs, rhs.clone());
            result = Some(match result {
                None => link,
                Some(acc) => Expression::binary(Operator::And, acc, link),
            });
            lhs = rhs;
        }

        Ok(result.unwrap_or(first))
    }

    fn parse_sum(&mut self) -> FormulaResult<Expression> {
        let mut left = self.parse_product()?;
        while let Some(op) = self
            .peek_op()
            .filter(|op| matches!(op, Operator::Add | Operator::Subtract))
        {
            self.pos += 1;
            let right = self.parse_product()?;
            left = Expression::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_product(&mut self) -> FormulaResult<Expression> {
        let mut left = self.parse_unary()?;
        while let Some(op) = self
            .peek_op()
            .filter(|op| matches!(op, Operator::Multiply | Operator::Divide))
        {
            self.pos += 1;
            let right = self.parse_unary()?;
            left = Expression::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> FormulaResult<Expression> {
        if self.peek_op() == Some(Operator::Subtract) {
            self.pos += 1;
            // A minus directly before a number is part of the literal.
            if let Some(Token {
                kind: TokenKind::Number(v),
                ..
            }) = self.peek()
            {
                let value = -*v;
                self.pos += 1;
                return Ok(Expression::Constant(value));
            }
            let operand = self.parse_unary()?;
            return Ok(Expression::negate(operand));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> FormulaResult<Expression> {
        let Some(token) = self.tokens.get(self.pos).cloned() else {
            return Err(FormulaError::new(
                self.input,
                self.end_offset(),
                "unexpected end of formula",
            ));
        };
        self.pos += 1;

        match token.kind {
            TokenKind::Number(v) => Ok(Expression::Constant(v)),
            TokenKind::Ident(name) => Ok(match name.as_str() {
                "true" => Expression::TRUE,
                "false" => Expression::FALSE,
                _ => Expression::Variable(name),
            }),
            TokenKind::LParen => {
                let inner = self.parse_or()?;
                match self.peek() {
                    Some(Token {
                        kind: TokenKind::RParen,
                        ..
                    }) => {
                        self.pos += 1;
                        Ok(inner)
                    }
                    Some(tok) => Err(FormulaError::new(
                        self.input,
                        tok.offset,
                        format!("expected ')', found '{}'", tok.kind),
                    )),
                    None => Err(FormulaError::new(
                        self.input,
                        self.end_offset(),
                        "unclosed parenthesis",
                    )),
                }
            }
            other => Err(FormulaError::new(
                self.input,
                token.offset,
                format!("unexpected token '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Expression {
        InfixParser.parse(text).unwrap()
    }

    #[test]
    fn test_precedence() {
        let e = parse("a + b * c");
        assert_eq!(
            e,
            Expression::binary(
                Operator::Add,
                Expression::var("a"),
                Expression::binary(Operator::Multiply, Expression::var("b"), Expression::var("c")),
            )
        );
    }

    #[test]
    fn test_negative_literal_folds() {
        let e = parse("-1.2 * (xvel - -0.5)");
        assert_eq!(
            e,
            Expression::binary(
                Operator::Multiply,
                Expression::constant(-1.2),
                Expression::binary(
                    Operator::Subtract,
                    Expression::var("xvel"),
                    Expression::constant(-0.5),
                ),
            )
        );
    }

    #[test]
    fn test_parenthesized_literal_stays_negation() {
        assert_eq!(parse("-(1)"), Expression::negate(Expression::constant(1.0)));
        assert_eq!(parse("-(-1)"), Expression::negate(Expression::constant(-1.0)));
        assert_eq!(parse("--1"), Expression::negate(Expression::constant(-1.0)));

        for e in [
            Expression::negate(Expression::constant(1.0)),
            Expression::negate(Expression::constant(-1.0)),
            Expression::negate(Expression::negate(Expression::constant(2.5))),
        ] {
            assert_eq!(parse(&e.to_string()), e);
        }
    }

    #[test]
    fn test_chained_comparison() {
        let e = parse("-1 <= xvel <= 1");
        assert_eq!(
            e,
            Expression::binary(
                Operator::And,
                Expression::binary(
                    Operator::LessEqual,
                    Expression::constant(-1.0),
                    Expression::var("xvel"),
                ),
                Expression::compare("xvel", Operator::LessEqual, 1.0),
            )
        );
    }

    #[test]
    fn test_single_ampersand_is_conjunction() {
        let e = parse("x == 0.5 && y == 1.5 & -1 <= xvel <= 1");
        assert_eq!(e.conjuncts().len(), 4);
    }

    #[test]
    fn test_scientific_notation() {
        assert_eq!(parse("1.5e-3"), Expression::constant(0.0015));
        assert_eq!(parse("2E2"), Expression::constant(200.0));
    }

    #[test]
    fn test_value_vs_condition() {
        let p = InfixParser::new();
        assert!(p.parse_value("x <= 1").is_err());
        assert!(p.parse_condition("x + 1").is_err());
        assert!(p.parse_condition("true").is_ok());
    }

    #[test]
    fn test_errors_report_offset() {
        let err = InfixParser.parse_value("x + $").unwrap_err();
        assert_eq!(err.offset, 4);

        let err = InfixParser.parse_value("(x + 1").unwrap_err();
        assert!(err.message.contains("unclosed"));

        let err = InfixParser.parse_value("x y").unwrap_err();
        assert!(err.message.contains("trailing"));
    }

    #[test]
    fn test_display_round_trip() {
        for text in [
            "-0.8 * (xvel - 0.7071067811865476) + -0.2 * (yvel - 0.7071067811865475)",
            "x >= 1 && x <= 2 && y <= 3",
            "a - (b - c) / d",
        ] {
            let e = parse(text);
            assert_eq!(parse(&e.to_string()), e, "round trip of {}", text);
        }
    }
}
