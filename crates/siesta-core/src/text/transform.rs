use super::Value;

/// Post-processing applied to the captured text of a leaf pattern.
#[derive(Debug, Clone, Copy)]
pub enum Transform {
    /// Whitespace split with per-token numeric coercion; a single token
    /// yields a scalar, an all-numeric row yields an array.
    Auto,
    /// The capture verbatim (trimmed), never split.
    Text,
    Integer,
    Float,
    FloatArray,
    /// Presence of a match stores `true`.
    Flag,
    Map(fn(&str) -> Option<Value>),
}

impl Transform {
    pub fn apply(self, raw: &str) -> Option<Value> {
        match self {
            Self::Auto => auto_value(raw),
            Self::Text => {
                let trimmed = raw.trim();
                (!trimmed.is_empty()).then(|| Value::Text(trimmed.to_string()))
            }
            Self::Integer => raw
                .split_whitespace()
                .next()
                .and_then(|token| token.parse::<i64>().ok())
                .map(Value::Int),
            Self::Float => raw
                .split_whitespace()
                .next()
                .and_then(parse_fortran_f64)
                .map(Value::Float),
            Self::FloatArray => parse_float_tokens(raw).map(Value::Array),
            Self::Flag => Some(Value::Bool(true)),
            Self::Map(operation) => operation(raw),
        }
    }
}

/// Parses a float, accepting Fortran `D` exponents.
pub fn parse_fortran_f64(token: &str) -> Option<f64> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    if token.contains(['D', 'd']) {
        token.replace(['D', 'd'], "E").parse().ok()
    } else {
        token.parse().ok()
    }
}

/// Parses every whitespace token as a float; `None` if any token is not one.
pub fn parse_float_tokens(raw: &str) -> Option<Vec<f64>> {
    let values = raw
        .split_whitespace()
        .map(parse_fortran_f64)
        .collect::<Option<Vec<_>>>()?;
    (!values.is_empty()).then_some(values)
}

pub fn coerce_token(token: &str) -> Value {
    if let Ok(value) = token.parse::<i64>() {
        return Value::Int(value);
    }
    match parse_fortran_f64(token) {
        Some(value) if token.starts_with(|c: char| c.is_ascii_digit() || "+-.".contains(c)) => {
            Value::Float(value)
        }
        _ => Value::Text(token.to_string()),
    }
}

fn auto_value(raw: &str) -> Option<Value> {
    let mut tokens = raw.split_whitespace().map(coerce_token).collect::<Vec<_>>();
    match tokens.len() {
        0 => None,
        1 => tokens.pop(),
        _ => {
            let numeric = tokens.iter().map(Value::as_f64).collect::<Option<Vec<_>>>();
            Some(numeric.map_or(Value::List(tokens), Value::Array))
        }
    }
}
