use std::f64::consts::{E, PI};

use crate::error::{Result, SynthesisError};

#[derive(Debug, Clone, Copy)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LeftParen,
    RightParen,
    Constant(f64),
    Function(fn(f64) -> f64),
}

fn tokenize(text: &str) -> std::result::Result<Vec<Token>, String> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            c if c.is_whitespace() => i += 1,
            '+' | '-' | '*' | '/' | '^' | '(' | ')' => {
                tokens.push(match ch {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '/' => Token::Slash,
                    '^' => Token::Caret,
                    '(' => Token::LeftParen,
                    _ => Token::RightParen,
                });
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| format!("malformed number '{}'", literal))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_alphabetic() {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push(match word.as_str() {
                    "pi" => Token::Constant(PI),
                    "e" => Token::Constant(E),
                    "sin" => Token::Function(f64::sin),
                    "cos" => Token::Function(f64::cos),
                    "tan" => Token::Function(f64::tan),
                    "sqrt" => Token::Function(f64::sqrt),
                    "log" => Token::Function(f64::ln),
                    "exp" => Token::Function(f64::exp),
                    _ => return Err(format!("unknown identifier '{}'", word)),
                });
            }
            other => return Err(format!("unexpected character '{}'", other)),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.current).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        self.current += 1;
        token
    }

    fn expect_right_paren(&mut self) -> std::result::Result<(), String> {
        match self.advance() {
            Some(Token::RightParen) => Ok(()),
            _ => Err("missing ')'".to_owned()),
        }
    }

    fn parse_expression(&mut self) -> std::result::Result<f64, String> {
        self.parse_binary_op(0)
    }

    // Precedence climbing over the left-associative operators.
    fn parse_binary_op(&mut self, precedence: u8) -> std::result::Result<f64, String> {
        let mut left = self.parse_unary()?;

        while let Some(op) = self.peek() {
            let op_prec = match precedence_of(op) {
                Some(p) if p >= precedence => p,
                _ => break,
            };
            self.current += 1;
            let right = self.parse_binary_op(op_prec + 1)?;
            left = match op {
                Token::Plus => left + right,
                Token::Minus => left - right,
                Token::Star => left * right,
                _ => left / right,
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> std::result::Result<f64, String> {
        match self.peek() {
            Some(Token::Minus) => {
                self.current += 1;
                Ok(-self.parse_unary()?)
            }
            Some(Token::Plus) => {
                self.current += 1;
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> std::result::Result<f64, String> {
        let base = self.parse_primary()?;
        if let Some(Token::Caret) = self.peek() {
            self.current += 1;
            // Right associative, and the exponent may carry its own sign.
            let exponent = self.parse_unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> std::result::Result<f64, String> {
        match self.advance() {
            Some(Token::Number(x)) | Some(Token::Constant(x)) => Ok(x),
            Some(Token::Function(f)) => match self.advance() {
                Some(Token::LeftParen) => {
                    let arg = self.parse_expression()?;
                    self.expect_right_paren()?;
                    Ok(f(arg))
                }
                _ => Err("function call requires '('".to_owned()),
            },
            Some(Token::LeftParen) => {
                let inner = self.parse_expression()?;
                self.expect_right_paren()?;
                Ok(inner)
            }
            Some(_) => Err("unexpected operator".to_owned()),
            None => Err("unexpected end of expression".to_owned()),
        }
    }
}

fn precedence_of(token: Token) -> Option<u8> {
    match token {
        Token::Plus | Token::Minus => Some(1),
        Token::Star | Token::Slash => Some(2),
        _ => None,
    }
}

/**
Evaluates `text`, failing with the raw text quoted if it is not a valid expression.

Accepts numerals, `+ - * / ^`, parentheses, the constants `pi` and `e`, and the functions
`sin cos tan sqrt log exp` (`log` is natural). `^` is right associative and binds tighter than
unary minus, so `-2^2 = -4`.
*/
pub fn evaluate(text: &str) -> Result<f64> {
    let fail = |reason: String| SynthesisError::Expression {
        expression: text.to_owned(),
        reason,
    };

    let tokens = tokenize(text).map_err(fail)?;
    if tokens.is_empty() {
        return Err(fail("empty expression".to_owned()));
    }

    let mut parser = Parser { tokens, current: 0 };
    let value = parser.parse_expression().map_err(fail)?;
    if parser.current < parser.tokens.len() {
        return Err(fail("trailing input".to_owned()));
    }

    Ok(value)
}
