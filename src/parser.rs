//! Parsing guard conditions.
//!
//! Grammar, from lowest to highest precedence:
//!
//! ```text
//! or    := and (OR and)*
//! and   := unary (AND unary)*
//! unary := NOT* atom
//! atom  := IDENT | '(' or ')'
//! IDENT := [A-Za-z0-9_]+
//! ```
//!
//! Each connective has several spellings, keywords being case-insensitive:
//!
//! | Connective | Spellings                    |
//! |------------|------------------------------|
//! | AND        | `AND`, `&&`, `&`, `ET`       |
//! | OR         | `OR`, `\|\|`, `\|`, `OU`     |
//! | NOT        | `NOT`, `NON`, `!`            |
//!
//! Blank input (empty or whitespace only) is not an error: it parses to `None`,
//! which stands for the always-true condition.
//!
//! Chains of one connective are folded pairwise into a balanced tree, which
//! renders back to the same text. Parentheses and negations may be nested at
//! most [`MAX_NESTING`] levels deep; deeper input fails with
//! [`ParseError::TooDeep`].

use log::debug;

use crate::error::{ModelError, ParseError, Span};
use crate::formula::Formula;
use crate::variables::VariableTable;

/// Maximal nesting of parentheses and negations in a condition.
pub const MAX_NESTING: usize = 64;

/// Turns condition text into a [`Formula`].
pub trait FormulaFactory {
    /// Parses `text`.
    ///
    /// Returns `Ok(None)` for blank input.
    fn parse(&self, text: &str) -> Result<Option<Formula>, ParseError>;
}

/// The default factory: AND/OR/NOT over Boolean variables interned in a [`VariableTable`].
#[derive(Debug, Clone)]
pub struct BooleanExpressionFactory {
    variables: VariableTable,
}

impl BooleanExpressionFactory {
    pub fn new(variables: VariableTable) -> Self {
        Self { variables }
    }

    pub fn variables(&self) -> &VariableTable {
        &self.variables
    }
}

impl FormulaFactory for BooleanExpressionFactory {
    fn parse(&self, text: &str) -> Result<Option<Formula>, ParseError> {
        let tokens = tokenize(text)?;
        if tokens.is_empty() {
            return Ok(None);
        }
        let mut parser = Parser {
            text,
            tokens,
            pos: 0,
            depth: 0,
            variables: &self.variables,
        };
        let formula = parser.parse_or()?;
        if let Some(token) = parser.peek() {
            return Err(match token.kind {
                TokenKind::RParen => ParseError::UnbalancedParenthesis { span: token.span },
                _ => ParseError::UnexpectedToken {
                    found: parser.slice(token.span).to_string(),
                    expected: "AND, OR or end of input",
                    span: token.span,
                },
            });
        }
        debug!("parsed '{}' as '{}'", text, formula);
        Ok(Some(formula))
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum TokenKind {
    Ident,
    And,
    Or,
    Not,
    LParen,
    RParen,
}

#[derive(Debug, Copy, Clone)]
struct Token {
    kind: TokenKind,
    span: Span,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn keyword(word: &str) -> Option<TokenKind> {
    match word.to_ascii_uppercase().as_str() {
        "AND" | "ET" => Some(TokenKind::And),
        "OR" | "OU" => Some(TokenKind::Or),
        "NOT" | "NON" => Some(TokenKind::Not),
        _ => None,
    }
}

fn tokenize(text: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        let single = |kind| Token {
            kind,
            span: Span::new(start, start + 1),
        };
        match c {
            c if c.is_whitespace() => {}
            '(' => tokens.push(single(TokenKind::LParen)),
            ')' => tokens.push(single(TokenKind::RParen)),
            '!' => tokens.push(single(TokenKind::Not)),
            '&' | '|' => {
                let kind = if c == '&' {
                    TokenKind::And
                } else {
                    TokenKind::Or
                };
                let mut end = start + 1;
                // `&&` and `||`
                if chars.peek().map(|&(_, next)| next) == Some(c) {
                    chars.next();
                    end += 1;
                }
                tokens.push(Token {
                    kind,
                    span: Span::new(start, end),
                });
            }
            c if is_ident_char(c) => {
                let mut end = start + c.len_utf8();
                while let Some(&(i, next)) = chars.peek() {
                    if !is_ident_char(next) {
                        break;
                    }
                    end = i + next.len_utf8();
                    chars.next();
                }
                let word = &text[start..end];
                tokens.push(Token {
                    kind: keyword(word).unwrap_or(TokenKind::Ident),
                    span: Span::new(start, end),
                });
            }
            found => {
                return Err(ParseError::UnexpectedCharacter {
                    found,
                    span: Span::new(start, start + found.len_utf8()),
                })
            }
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    text: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    variables: &'a VariableTable,
}

/// Joins `operands` pairwise, level by level, keeping their left-to-right order.
fn balanced(operands: Vec<Formula>, join: fn(Formula, Formula) -> Formula) -> Formula {
    let mut level = operands;
    while level.len() > 1 {
        let mut next = Vec::with_capacity((level.len() + 1) / 2);
        let mut it = level.into_iter();
        while let Some(p) = it.next() {
            next.push(match it.next() {
                Some(q) => join(p, q),
                None => p,
            });
        }
        level = next;
    }
    match level.pop() {
        Some(f) => f,
        None => unreachable!("a chain has at least one operand"),
    }
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek().map(|t| t.kind) == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn slice(&self, span: Span) -> &'a str {
        &self.text[span.range()]
    }

    fn end_span(&self) -> Span {
        Span::new(self.text.len(), self.text.len())
    }

    fn parse_or(&mut self) -> Result<Formula, ParseError> {
        let mut operands = vec![self.parse_and()?];
        while self.eat(TokenKind::Or) {
            operands.push(self.parse_and()?);
        }
        Ok(balanced(operands, Formula::or))
    }

    fn parse_and(&mut self) -> Result<Formula, ParseError> {
        let mut operands = vec![self.parse_unary()?];
        while self.eat(TokenKind::And) {
            operands.push(self.parse_unary()?);
        }
        Ok(balanced(operands, Formula::and))
    }

    fn parse_unary(&mut self) -> Result<Formula, ParseError> {
        let mut negations = 0;
        while let Some(token) = self.peek().filter(|t| t.kind == TokenKind::Not) {
            self.enter(token.span)?;
            self.pos += 1;
            negations += 1;
        }
        let mut f = self.parse_atom()?;
        self.depth -= negations;
        for _ in 0..negations {
            f = Formula::not(f);
        }
        Ok(f)
    }

    fn enter(&mut self, span: Span) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(ParseError::TooDeep {
                limit: MAX_NESTING,
                span,
            });
        }
        Ok(())
    }

    fn parse_atom(&mut self) -> Result<Formula, ParseError> {
        const EXPECTED: &str = "a variable, NOT or '('";

        let Some(token) = self.peek() else {
            return Err(ParseError::UnexpectedEnd {
                expected: EXPECTED,
                span: self.end_span(),
            });
        };
        self.pos += 1;

        match token.kind {
            TokenKind::Ident => {
                let name = self.slice(token.span);
                match self.variables.boolean(name) {
                    Ok(variable) => Ok(Formula::var(variable)),
                    Err(ModelError::DomainMismatch { .. }) => Err(ParseError::NotBoolean {
                        name: name.to_string(),
                        span: token.span,
                    }),
                    Err(e) => unreachable!("interning a Boolean variable failed: {}", e),
                }
            }
            TokenKind::LParen => {
                self.enter(token.span)?;
                let inner = self.parse_or()?;
                if self.eat(TokenKind::RParen) {
                    self.depth -= 1;
                    return Ok(inner);
                }
                match self.peek() {
                    None => Err(ParseError::UnbalancedParenthesis { span: token.span }),
                    Some(next) => Err(ParseError::UnexpectedToken {
                        found: self.slice(next.span).to_string(),
                        expected: "')'",
                        span: next.span,
                    }),
                }
            }
            TokenKind::RParen => Err(ParseError::UnbalancedParenthesis { span: token.span }),
            TokenKind::And | TokenKind::Or | TokenKind::Not => Err(ParseError::UnexpectedToken {
                found: self.slice(token.span).to_string(),
                expected: EXPECTED,
                span: token.span,
            }),
        }
    }
}
