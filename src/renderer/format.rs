//! Format-spec handling for resolved values
//!
//! The renderer never interprets a format-spec itself: it hands the raw
//! string to a [`ValueFormatter`]. [`StandardFormatter`] understands a small
//! set of numeric and text specs and falls back to `Display` for
//! everything else.

use std::fmt;

use crate::value::Value;

/// Turns a value plus a format-spec into text
pub trait ValueFormatter: fmt::Debug + Send + Sync {
    fn format(&self, value: &Value, spec: &str) -> String;
}

/// Numeric and text format-specs
///
/// | Spec | Applies to | Result |
/// |------|------------|--------|
/// | `D4` | integers | zero-padded to 4 digits |
/// | `F2` | numbers | fixed point, 2 decimals (default 2) |
/// | `N2` | numbers | fixed point with thousands separators |
/// | `X4` / `x4` | integers | upper / lower hex, zero-padded |
/// | `P1` | numbers | percent, 1 decimal (default 2) |
/// | `000`, `0.00`, `#,##0.#` | numbers | custom digit pattern |
/// | `U` / `L` | strings | upper / lower case |
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFormatter;

impl ValueFormatter for StandardFormatter {
    fn format(&self, value: &Value, spec: &str) -> String {
        let formatted = match value {
            Value::Int(i) => format_int(*i, spec),
            Value::Float(x) => format_float(*x, spec),
            Value::Str(s) => format_str(s, spec),
            Value::Object(object) => object.format_with(spec),
            _ => None,
        };
        formatted.unwrap_or_else(|| value.to_string())
    }
}

const MAX_PRECISION: usize = 99;

/// A standard spec: one ASCII letter followed by an optional precision
fn standard(spec: &str) -> Option<(char, Option<usize>)> {
    let mut chars = spec.chars();
    let letter = chars.next().filter(char::is_ascii_alphabetic)?;
    let digits = chars.as_str();
    if digits.is_empty() {
        return Some((letter, None));
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits
        .parse::<usize>()
        .ok()
        .filter(|precision| *precision <= MAX_PRECISION)
        .map(|precision| (letter, Some(precision)))
}

fn format_int(i: i64, spec: &str) -> Option<String> {
    let negative = i < 0;
    let digits = i.unsigned_abs().to_string();
    match standard(spec) {
        Some(('D' | 'd', precision)) => {
            let width = precision.unwrap_or(0);
            let sign = if negative { "-" } else { "" };
            Some(format!("{}{:0>width$}", sign, digits, width = width))
        }
        Some(('X', precision)) => Some(format!("{:0width$X}", i, width = precision.unwrap_or(0))),
        Some(('x', precision)) => Some(format!("{:0width$x}", i, width = precision.unwrap_or(0))),
        Some(('F' | 'f', precision)) => {
            Some(whole(negative, &digits, precision.unwrap_or(2), false))
        }
        Some(('N' | 'n', precision)) => {
            Some(whole(negative, &digits, precision.unwrap_or(2), true))
        }
        Some(('P' | 'p', precision)) => {
            let scaled = (i128::from(i) * 100).unsigned_abs().to_string();
            Some(format!("{}%", whole(negative, &scaled, precision.unwrap_or(2), false)))
        }
        Some(_) => None,
        None => Pattern::parse(spec).map(|pattern| pattern.apply(negative, &digits, "")),
    }
}

/// Integer digits followed by `decimals` zeros, without going through `f64`
fn whole(negative: bool, digits: &str, decimals: usize, group: bool) -> String {
    let int_part = if group {
        group_thousands(digits)
    } else {
        digits.to_string()
    };
    assemble(negative, &int_part, &"0".repeat(decimals))
}

fn format_float(x: f64, spec: &str) -> Option<String> {
    if !x.is_finite() {
        return None;
    }
    match standard(spec) {
        Some(('F' | 'f', precision)) => Some(fixed(x, precision.unwrap_or(2), false)),
        Some(('N' | 'n', precision)) => Some(fixed(x, precision.unwrap_or(2), true)),
        Some(('P' | 'p', precision)) => {
            Some(format!("{}%", fixed(x * 100.0, precision.unwrap_or(2), false)))
        }
        Some(_) => None,
        None => custom(x, spec),
    }
}

fn format_str(s: &str, spec: &str) -> Option<String> {
    match spec {
        "U" | "u" => Some(s.to_uppercase()),
        "L" | "l" => Some(s.to_lowercase()),
        _ => None,
    }
}

fn fixed(x: f64, decimals: usize, group: bool) -> String {
    let text = format!("{:.decimals$}", x.abs(), decimals = decimals);
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part.to_string(), Some(frac_part)),
        None => (text.clone(), None),
    };
    let int_part = if group {
        group_thousands(&int_part)
    } else {
        int_part
    };
    assemble(is_negative(x, &text), &int_part, frac_part.unwrap_or(""))
}

/// A custom digit pattern made of `0`, `#`, `,` and at most one `.`
struct Pattern {
    min_int: usize,
    min_frac: usize,
    max_frac: usize,
    group: bool,
}

impl Pattern {
    fn parse(pattern: &str) -> Option<Self> {
        if pattern.is_empty() || !pattern.chars().all(|c| matches!(c, '0' | '#' | ',' | '.')) {
            return None;
        }
        let (int_pattern, frac_pattern) = match pattern.split_once('.') {
            Some((_, frac)) if frac.contains('.') => return None,
            Some((int, frac)) => (int, frac),
            None => (pattern, ""),
        };

        Some(Self {
            min_int: int_pattern.chars().filter(|c| *c == '0').count(),
            min_frac: frac_pattern.chars().filter(|c| *c == '0').count(),
            max_frac: frac_pattern
                .chars()
                .filter(|c| matches!(c, '0' | '#'))
                .count(),
            group: int_pattern.contains(','),
        })
    }

    /// Lay out already-rounded digits according to the pattern
    fn apply(&self, negative: bool, int_digits: &str, frac_digits: &str) -> String {
        let mut frac = frac_digits.to_string();
        while frac.len() > self.min_frac && frac.ends_with('0') {
            frac.pop();
        }
        while frac.len() < self.min_frac {
            frac.push('0');
        }

        let int_digits = if int_digits == "0" && self.min_int == 0 {
            ""
        } else {
            int_digits
        };
        let mut int_part = format!("{:0>width$}", int_digits, width = self.min_int);
        if self.group {
            int_part = group_thousands(&int_part);
        }

        assemble(negative, &int_part, &frac)
    }
}

fn custom(x: f64, pattern: &str) -> Option<String> {
    let pattern = Pattern::parse(pattern)?;
    let text = format!("{:.decimals$}", x.abs(), decimals = pattern.max_frac);
    let (int_digits, frac_digits) = text.split_once('.').unwrap_or((text.as_str(), ""));
    Some(pattern.apply(is_negative(x, &text), int_digits, frac_digits))
}

/// Negative unless rounding produced all zeros
fn is_negative(x: f64, text: &str) -> bool {
    x < 0.0 && text.bytes().any(|b| matches!(b, b'1'..=b'9'))
}

fn assemble(negative: bool, int_part: &str, frac: &str) -> String {
    let mut out = String::with_capacity(int_part.len() + frac.len() + 2);
    if negative {
        out.push('-');
    }
    out.push_str(int_part);
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
