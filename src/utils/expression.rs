// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Sandboxed arithmetic expressions embedded in record and config values.
//!
//! A string value starting with `=` is an expression rather than a literal:
//!
//! ```text
//! "=2 * 'cpu/energy' + memory_energy"
//! ```
//!
//! The grammar is deliberately tiny: numbers, `+ - * /`, unary minus,
//! parentheses and field references. Field names containing characters other
//! than `[A-Za-z0-9_]` must be quoted with `'` or `"`. Referenced fields may
//! themselves be expressions; reference cycles are rejected.
//!
//! ```
//! use impact_engine::utils::expression::evaluate;
//! use serde_json::json;
//!
//! let record = json!({"cpu/energy": 2, "memory": "='cpu/energy' / 4"});
//! let record = record.as_object().unwrap();
//!
//! assert_eq!(evaluate("=2 * 'cpu/energy' + memory", record).unwrap(), 4.5);
//! ```

use serde_json::Value;
use thiserror::Error;

use crate::model::record::{number_value, Record};

const EXPRESSION_PREFIX: char = '=';

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("unexpected character '{ch}' at position {position} in expression '{expression}'")]
    UnexpectedChar {
        ch: char,
        position: usize,
        expression: String,
    },

    #[error("unterminated quoted field name in expression '{0}'")]
    UnterminatedQuote(String),

    #[error("malformed expression '{0}'")]
    Malformed(String),

    #[error("expression references unknown field '{0}'")]
    UnknownField(String),

    #[error("expression references non-numeric field '{0}'")]
    NonNumericField(String),

    #[error("division by zero in expression '{0}'")]
    DivisionByZero(String),

    #[error("circular reference through field '{0}'")]
    Cycle(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Field(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

/// Returns the expression body if `value` is an `=`-prefixed string.
pub fn as_expression(value: &Value) -> Option<&str> {
    value
        .as_str()
        .filter(|text| text.trim_start().starts_with(EXPRESSION_PREFIX))
}

/// Evaluate `expression` (with or without the leading `=`) against `record`.
pub fn evaluate(expression: &str, record: &Record) -> Result<f64, ExpressionError> {
    let mut resolving = Vec::new();
    evaluate_with(expression, record, &mut resolving)
}

/// Numeric value of `value`: numbers pass through, expressions are evaluated.
///
/// Returns `Ok(None)` for anything else (labels, nulls, ...).
pub fn numeric_value(value: &Value, record: &Record) -> Result<Option<f64>, ExpressionError> {
    if let Some(expression) = as_expression(value) {
        return evaluate(expression, record).map(Some);
    }
    Ok(value.as_f64())
}

/// Copy of `record` with every expression field replaced by its numeric result.
pub fn evaluate_record(record: &Record) -> Result<Record, ExpressionError> {
    let mut evaluated = Record::new();
    for (field, value) in record {
        let resolved = match as_expression(value) {
            Some(expression) => {
                let mut resolving = vec![field.clone()];
                number_value(evaluate_with(expression, record, &mut resolving)?)
            }
            None => value.clone(),
        };
        evaluated.insert(field.clone(), resolved);
    }
    Ok(evaluated)
}

fn evaluate_with(
    expression: &str,
    record: &Record,
    resolving: &mut Vec<String>,
) -> Result<f64, ExpressionError> {
    let body = expression
        .trim_start()
        .strip_prefix(EXPRESSION_PREFIX)
        .unwrap_or(expression);
    let tokens = tokenize(body)?;
    let mut parser = Parser {
        source: body,
        tokens: &tokens,
        position: 0,
        record,
        resolving,
    };
    let result = parser.expression()?;
    if parser.position != tokens.len() {
        return Err(ExpressionError::Malformed(body.to_string()));
    }
    Ok(result)
}

fn tokenize(source: &str) -> Result<Vec<Token>, ExpressionError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            ' ' | '\t' => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '\'' | '"' => {
                let close = chars[i + 1..]
                    .iter()
                    .position(|c| *c == ch)
                    .ok_or_else(|| ExpressionError::UnterminatedQuote(source.to_string()))?;
                let name: String = chars[i + 1..i + 1 + close].iter().collect();
                tokens.push(Token::Field(name));
                i += close + 2;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                let number = literal
                    .parse::<f64>()
                    .map_err(|_| ExpressionError::Malformed(source.to_string()))?;
                tokens.push(Token::Number(number));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Field(chars[start..i].iter().collect()));
            }
            other => {
                return Err(ExpressionError::UnexpectedChar {
                    ch: other,
                    position: i,
                    expression: source.to_string(),
                })
            }
        }
    }

    Ok(tokens)
}

/// Recursive-descent parser that evaluates while it parses.
struct Parser<'a> {
    source: &'a str,
    tokens: &'a [Token],
    position: usize,
    record: &'a Record,
    resolving: &'a mut Vec<String>,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }

    fn malformed(&self) -> ExpressionError {
        ExpressionError::Malformed(self.source.to_string())
    }

    // expression := term (('+' | '-') term)*
    fn expression(&mut self) -> Result<f64, ExpressionError> {
        let mut value = self.term()?;
        while let Some(token) = self.peek() {
            match token {
                Token::Plus => {
                    self.position += 1;
                    value += self.term()?;
                }
                Token::Minus => {
                    self.position += 1;
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    // term := factor (('*' | '/') factor)*
    fn term(&mut self) -> Result<f64, ExpressionError> {
        let mut value = self.factor()?;
        while let Some(token) = self.peek() {
            match token {
                Token::Star => {
                    self.position += 1;
                    value *= self.factor()?;
                }
                Token::Slash => {
                    self.position += 1;
                    let divisor = self.factor()?;
                    if divisor == 0.0 {
                        return Err(ExpressionError::DivisionByZero(self.source.to_string()));
                    }
                    value /= divisor;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    // factor := ('-' | '+') factor | number | field | '(' expression ')'
    fn factor(&mut self) -> Result<f64, ExpressionError> {
        match self.next() {
            Some(Token::Minus) => Ok(-self.factor()?),
            Some(Token::Plus) => self.factor(),
            Some(Token::Number(number)) => Ok(number),
            Some(Token::Field(name)) => self.field(&name),
            Some(Token::LParen) => {
                let value = self.expression()?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err(self.malformed()),
                }
            }
            _ => Err(self.malformed()),
        }
    }

    fn field(&mut self, name: &str) -> Result<f64, ExpressionError> {
        let value = self
            .record
            .get(name)
            .ok_or_else(|| ExpressionError::UnknownField(name.to_string()))?;

        if let Some(expression) = as_expression(value) {
            if self.resolving.iter().any(|field| field == name) {
                return Err(ExpressionError::Cycle(name.to_string()));
            }
            self.resolving.push(name.to_string());
            let result = evaluate_with(expression, self.record, self.resolving);
            self.resolving.pop();
            return result;
        }

        value
            .as_f64()
            .ok_or_else(|| ExpressionError::NonNumericField(name.to_string()))
    }
}
