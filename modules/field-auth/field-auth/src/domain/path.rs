//! Field-path compiler.
//!
//! Parses a dotted/bracketed expression such as `user.roles[0]` or
//! `[2].x` into an ordered list of [`PathStep`]s ahead of any request.
//!
//! ## Grammar
//!
//! ```text
//! path    := head tail*
//! head    := identifier | bracket
//! tail    := '.' identifier | bracket
//! bracket := '[' (string-literal | number-literal) ']'
//! ```
//!
//! Whitespace is allowed between tokens. Computed access, calls, operators
//! and multi-element brackets are rejected with
//! [`FieldAuthError::PathSyntax`].

use std::fmt;
use std::str::FromStr;

use field_auth_sdk::{FieldAuthError, PathStep};

use super::coerce::number_to_string;

/// Largest integer index a number literal may name (`2^53 - 1`).
const MAX_SAFE_INDEX: f64 = 9_007_199_254_740_991.0;

/// A parsed field path. Always holds at least one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPath {
    expression: String,
    steps: Vec<PathStep>,
}

impl CompiledPath {
    /// The source expression, as declared.
    #[inline]
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// The access steps, outermost first.
    #[inline]
    #[must_use]
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }
}

impl FromStr for CompiledPath {
    type Err = FieldAuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        compile_path(s)
    }
}

impl fmt::Display for CompiledPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

/// Compile a field-path expression.
///
/// # Errors
///
/// Returns [`FieldAuthError::PathSyntax`] when the expression is empty or is
/// not a plain property-access chain over identifiers and literals. The
/// reported position is the byte offset of the furthest failure.
pub fn compile_path(expression: &str) -> Result<CompiledPath, FieldAuthError> {
    let steps = field_path::path(expression).map_err(|e| FieldAuthError::PathSyntax {
        expression: expression.to_owned(),
        position: e.location.offset,
        message: format!("expected {}", e.expected),
    })?;
    Ok(CompiledPath {
        expression: expression.trim().to_owned(),
        steps,
    })
}

peg::parser! {
    grammar field_path() for str {
        pub rule path() -> Vec<PathStep>
            = ws() head:head() tail:(ws() step:tail() { step })* ws() {
                let mut steps = Vec::with_capacity(tail.len() + 1);
                steps.push(head);
                steps.extend(tail);
                steps
            }

        rule head() -> PathStep
            = bracket()
            / name:identifier() { PathStep::Key(name) }

        rule tail() -> PathStep
            = "." ws() name:identifier() { PathStep::Key(name) }
            / bracket()

        rule bracket() -> PathStep
            = "[" ws() step:(
                key:string_literal() { PathStep::Key(key) }
                / number_literal()
            ) ws() "]" { step }

        rule identifier() -> String
            = quiet!{ name:$(id_start() id_continue()*) { name.to_owned() } }
            / expected!("identifier")

        rule id_start() = [c if is_id_start(c)]

        rule id_continue() = [c if is_id_continue(c)]

        rule ws() = quiet!{ [c if c.is_whitespace()]* }

        // Decimal only: hex, octal, signs and leading zeros are rejected.
        rule number_literal() -> PathStep
            = text:$(
                ("0" / ['1'..='9'] ['0'..='9']*) ("." ['0'..='9']*)?
                / "." ['0'..='9']+
            ) exponent()? !id_continue() {?
                number_step(text)
            }
            / expected!("number literal")

        rule exponent() = ['e' | 'E'] ['+' | '-']? ['0'..='9']+

        rule string_literal() -> String
            = "'" units:(single_quoted()*) "'" {? from_units(&units) }
            / "\"" units:(double_quoted()*) "\"" {? from_units(&units) }

        rule single_quoted() -> Vec<u16>
            = escape()
            / c:[c if c != '\'' && !is_literal_break(c)] { encode(c) }

        rule double_quoted() -> Vec<u16>
            = escape()
            / c:[c if c != '"' && !is_literal_break(c)] { encode(c) }

        rule escape() -> Vec<u16>
            = "\\" units:(
                "u{" digits:$(hex_digit()+) "}" {? code_point(digits) }
                / "u" digits:$(hex_digit() hex_digit() hex_digit() hex_digit()) {?
                    code_unit(digits)
                }
                / "x" digits:$(hex_digit() hex_digit()) {? code_unit(digits) }
                / "0" !['0'..='9'] { vec![0] }
                / "\r\n" { Vec::new() }
                / ['\n' | '\r'] { Vec::new() }
                / c:[c if !c.is_ascii_digit() && c != 'x' && c != 'u'] {
                    single_escape(c)
                }
            ) { units }

        rule hex_digit() = ['0'..='9' | 'a'..='f' | 'A'..='F']
    }
}

fn number_step(text: &str) -> Result<PathStep, &'static str> {
    let value: f64 = text.parse().map_err(|_| "number literal")?;
    if !value.is_finite() {
        return Err("finite number literal");
    }
    if value.fract() == 0.0 && value <= MAX_SAFE_INDEX {
        // Non-negative by grammar, integral and below 2^53.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        return Ok(PathStep::Index(value as usize));
    }
    Ok(PathStep::Key(number_to_string(value)))
}

fn code_point(digits: &str) -> Result<Vec<u16>, &'static str> {
    u32::from_str_radix(digits, 16)
        .ok()
        .and_then(char::from_u32)
        .map(encode)
        .ok_or("unicode code point")
}

fn code_unit(digits: &str) -> Result<Vec<u16>, &'static str> {
    u16::from_str_radix(digits, 16)
        .map(|unit| vec![unit])
        .map_err(|_| "hexadecimal escape")
}

fn single_escape(c: char) -> Vec<u16> {
    match c {
        'n' => vec![0x0A],
        'r' => vec![0x0D],
        't' => vec![0x09],
        'b' => vec![0x08],
        'f' => vec![0x0C],
        'v' => vec![0x0B],
        other => encode(other),
    }
}

fn from_units(units: &[Vec<u16>]) -> Result<String, &'static str> {
    String::from_utf16(&units.concat())
        .map_err(|_| "string literal without unpaired surrogates")
}

fn encode(c: char) -> Vec<u16> {
    let mut buf = [0u16; 2];
    c.encode_utf16(&mut buf).to_vec()
}

fn is_literal_break(c: char) -> bool {
    matches!(c, '\\' | '\n' | '\r')
}

fn is_id_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_id_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
