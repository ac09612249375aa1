//! Unit string parser with normalization.
//!
//! Accepted syntax:
//!
//! - Exponents: `m^2`, `m**2`, `m2`, `K^-1`
//! - Multiplication: `J K`, `J*K`, `J·K`
//! - Division: `J/mol`, `J mol^-1`, `J per mol`
//! - Reciprocals: `1/K`
//! - Symbols: `°C`, `degC`, `%`
//!
//! ```text
//! expression = term ('/' term)*
//! term       = factor ('*'? factor)*
//! factor     = (symbol | '(' expression ')' | '1') exponent?
//! exponent   = ('^' | '**') integer | digits attached to the symbol
//! ```

use super::dimension::Dimension;
use super::registry::UNIT_REGISTRY;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Error type for unit parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    EmptyUnit,
    UnknownUnit(String),
    InvalidExponent(String),
    UnexpectedChar(char),
    ParseFailed(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUnit => write!(f, "empty unit string"),
            Self::UnknownUnit(u) => write!(f, "unknown unit: '{u}'"),
            Self::InvalidExponent(e) => write!(f, "invalid exponent: '{e}'"),
            Self::UnexpectedChar(c) => write!(f, "unexpected character: '{c}'"),
            Self::ParseFailed(msg) => write!(f, "parse failed: {msg}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// A unit as a product of symbols raised to integer powers.
///
/// `J/mol` is stored as `{J: 1, mol: -1}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedUnit {
    /// BTreeMap keeps the ordering deterministic.
    components: BTreeMap<String, i32>,
}

impl ParsedUnit {
    #[must_use]
    pub fn dimensionless() -> Self {
        Self {
            components: BTreeMap::new(),
        }
    }

    fn from_components(components: BTreeMap<String, i32>) -> Self {
        Self {
            components: components
                .into_iter()
                .filter(|(_, exp)| *exp != 0)
                .collect(),
        }
    }

    fn symbol(symbol: String) -> Self {
        Self::from_components(BTreeMap::from([(symbol, 1)]))
    }

    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseError::EmptyUnit);
        }
        if input == "1" || input.eq_ignore_ascii_case("dimensionless") {
            return Ok(Self::dimensionless());
        }

        let mut parser = UnitParser {
            tokens: tokenize(input)?,
            pos: 0,
        };
        let unit = parser.parse_expression()?;
        match parser.peek() {
            None => Ok(unit),
            Some(token) => Err(ParseError::ParseFailed(format!(
                "unexpected {token:?} in '{input}'"
            ))),
        }
    }

    #[must_use]
    pub fn components(&self) -> &BTreeMap<String, i32> {
        &self.components
    }

    pub fn is_dimensionless(&self) -> Result<bool, ParseError> {
        Ok(self.dimension()?.is_dimensionless())
    }

    pub fn dimension(&self) -> Result<Dimension, ParseError> {
        self.components
            .iter()
            .try_fold(Dimension::dimensionless(), |acc, (symbol, &exp)| {
                let info = UNIT_REGISTRY
                    .lookup(symbol)
                    .ok_or_else(|| ParseError::UnknownUnit(symbol.clone()))?;
                info.dimension
                    .checked_pow(exp)
                    .and_then(|d| acc.checked_mul(&d))
                    .ok_or_else(|| exponent_overflow(symbol, exp))
            })
    }

    /// Multiplier taking a value in this unit to SI base units.
    pub fn to_si_factor(&self) -> Result<f64, ParseError> {
        self.components.iter().try_fold(1.0, |acc, (symbol, &exp)| {
            let info = UNIT_REGISTRY
                .lookup(symbol)
                .ok_or_else(|| ParseError::UnknownUnit(symbol.clone()))?;
            Ok(acc * info.to_si_factor.powi(exp))
        })
    }

    /// The SI offset of a bare absolute-scale unit such as `degC`.
    ///
    /// Inside a compound unit (`degC/day`) the symbol denotes a difference and the
    /// offset is zero.
    pub fn to_si_offset(&self) -> Result<f64, ParseError> {
        let mut iter = self.components.iter();
        match (iter.next(), iter.next()) {
            (Some((symbol, 1)), None) => UNIT_REGISTRY
                .lookup(symbol)
                .map(|info| info.to_si_offset)
                .ok_or_else(|| ParseError::UnknownUnit(symbol.clone())),
            _ => Ok(0.0),
        }
    }

    pub fn multiply(&self, other: &Self) -> Result<Self, ParseError> {
        let mut components = self.components.clone();
        for (symbol, &exp) in &other.components {
            let entry = components.entry(symbol.clone()).or_insert(0);
            *entry = entry
                .checked_add(exp)
                .ok_or_else(|| exponent_overflow(symbol, exp))?;
        }
        Ok(Self::from_components(components))
    }

    pub fn divide(&self, other: &Self) -> Result<Self, ParseError> {
        self.multiply(&other.pow(-1)?)
    }

    pub fn pow(&self, exp: i32) -> Result<Self, ParseError> {
        let components = self
            .components
            .iter()
            .map(|(symbol, &v)| {
                v.checked_mul(exp)
                    .map(|e| (symbol.clone(), e))
                    .ok_or_else(|| exponent_overflow(symbol, exp))
            })
            .collect::<Result<BTreeMap<_, _>, ParseError>>()?;
        Ok(Self::from_components(components))
    }

    /// Canonical string: positive powers, then `/`, then negative powers.
    #[must_use]
    pub fn normalized(&self) -> String {
        let format_part = |parts: Vec<(&String, i32)>| -> String {
            parts
                .into_iter()
                .map(|(s, e)| {
                    if e == 1 {
                        s.to_string()
                    } else {
                        format!("{s}^{e}")
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        };

        let numerator = format_part(
            self.components
                .iter()
                .filter(|(_, e)| **e > 0)
                .map(|(s, e)| (s, *e))
                .collect(),
        );
        let denominator = format_part(
            self.components
                .iter()
                .filter(|(_, e)| **e < 0)
                .map(|(s, e)| (s, -*e))
                .collect(),
        );

        match (numerator.is_empty(), denominator.is_empty()) {
            (true, true) => "1".to_string(),
            (false, true) => numerator,
            (true, false) => format!("1 / {denominator}"),
            (false, false) => format!("{numerator} / {denominator}"),
        }
    }
}

impl fmt::Display for ParsedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.normalized())
    }
}

fn exponent_overflow(symbol: &str, exp: i32) -> ParseError {
    ParseError::ParseFailed(format!("exponent {exp} on '{symbol}' is out of range"))
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Symbol(String),
    /// Digits written directly after a symbol, as in `m2`.
    Attached(i32),
    Integer(i32),
    Slash,
    Star,
    Caret,
    LParen,
    RParen,
}

fn is_symbol_char(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '°' || c == '%'
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '*' => {
                chars.next();
                if chars.peek() == Some(&'*') {
                    chars.next();
                    tokens.push(Token::Caret);
                } else {
                    tokens.push(Token::Star);
                }
            }
            '\u{00B7}' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '^' => {
                chars.next();
                tokens.push(Token::Caret);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '-' | '0'..='9' => {
                let mut digits = String::new();
                if c == '-' {
                    digits.push(c);
                    chars.next();
                }
                while let Some(&d) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    digits.push(d);
                    chars.next();
                }
                let value = digits
                    .parse()
                    .map_err(|_| ParseError::InvalidExponent(digits.clone()))?;
                tokens.push(Token::Integer(value));
            }
            c if is_symbol_char(c) => {
                let mut word = String::new();
                while let Some(&w) = chars.peek() {
                    if !(is_symbol_char(w) || w.is_ascii_digit()) {
                        break;
                    }
                    word.push(w);
                    chars.next();
                }
                if word.eq_ignore_ascii_case("per") {
                    tokens.push(Token::Slash);
                } else {
                    tokens.extend(split_symbol(word)?);
                }
            }
            other => return Err(ParseError::UnexpectedChar(other)),
        }
    }

    Ok(tokens)
}

/// Splits trailing digits off a symbol unless the whole word is a known unit.
fn split_symbol(word: String) -> Result<Vec<Token>, ParseError> {
    let base = word.trim_end_matches(|c: char| c.is_ascii_digit());
    if base.len() == word.len() || UNIT_REGISTRY.lookup(&word).is_some() {
        return Ok(vec![Token::Symbol(word)]);
    }
    let digits = &word[base.len()..];
    let exp = digits
        .parse()
        .map_err(|_| ParseError::InvalidExponent(digits.to_string()))?;
    Ok(vec![Token::Symbol(base.to_string()), Token::Attached(exp)])
}

struct UnitParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl UnitParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn parse_expression(&mut self) -> Result<ParsedUnit, ParseError> {
        let mut result = self.parse_term()?;
        while self.peek() == Some(&Token::Slash) {
            self.pos += 1;
            let divisor = self.parse_term()?;
            result = result.divide(&divisor)?;
        }
        Ok(result)
    }

    fn parse_term(&mut self) -> Result<ParsedUnit, ParseError> {
        let mut result = self.parse_factor()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    let factor = self.parse_factor()?;
                    result = result.multiply(&factor)?;
                }
                // Implicit multiplication
                Some(Token::Symbol(_)) | Some(Token::LParen) => {
                    let factor = self.parse_factor()?;
                    result = result.multiply(&factor)?;
                }
                _ => break,
            }
        }
        Ok(result)
    }

    fn parse_factor(&mut self) -> Result<ParsedUnit, ParseError> {
        let base = match self.next() {
            Some(Token::Symbol(symbol)) => ParsedUnit::symbol(symbol),
            Some(Token::Integer(1)) => ParsedUnit::dimensionless(),
            Some(Token::LParen) => {
                let inner = self.parse_expression()?;
                if self.next() != Some(Token::RParen) {
                    return Err(ParseError::ParseFailed(
                        "missing closing parenthesis".into(),
                    ));
                }
                inner
            }
            Some(token) => {
                return Err(ParseError::ParseFailed(format!(
                    "expected unit symbol, found {token:?}"
                )))
            }
            None => return Err(ParseError::ParseFailed("expected unit symbol".into())),
        };
        let exp = self.parse_exponent()?;
        base.pow(exp)
    }

    fn parse_exponent(&mut self) -> Result<i32, ParseError> {
        match self.peek() {
            Some(Token::Attached(exp)) => {
                let exp = *exp;
                self.pos += 1;
                Ok(exp)
            }
            Some(Token::Caret) => {
                self.pos += 1;
                match self.next() {
                    Some(Token::Integer(exp)) => Ok(exp),
                    _ => Err(ParseError::ParseFailed("expected exponent after ^".into())),
                }
            }
            _ => Ok(1),
        }
    }
}
