//! Built-in parameter types.
//!
//! | type               | accepts                                          |
//! |--------------------|--------------------------------------------------|
//! | `any`              | every value, unchanged                           |
//! | `bool`             | JSON bools, `"true"`, `"false"`, `"1"`, `"0"`    |
//! | `int`              | JSON integers, strings parsing as `i64`          |
//! | `uint`             | non-negative JSON integers, strings as `u64`     |
//! | `float`            | JSON numbers, strings parsing as a finite `f64`  |
//! | `string`           | any string                                       |
//! | `string(n)`        | strings of exactly `n` characters                |
//! | `string(min,max)`  | strings of `min..=max` characters                |
//!
//! Path and query values always arrive as strings, so every numeric type
//! also parses its string form.

use serde_json::{Number, Value};

use super::{Extractor, Validator, ValidatorRegistry};

/// Register every built-in type into `registry`.
pub fn register_builtins(registry: &mut ValidatorRegistry) {
    registry
        .register("any", AnyValidator)
        .register("bool", BoolValidator)
        .register("int", IntValidator)
        .register("uint", UintValidator)
        .register("float", FloatValidator)
        .register("string", StringValidator);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AnyValidator;

impl Validator for AnyValidator {
    fn validate(&self, params: &[String]) -> Option<Extractor> {
        if !params.is_empty() {
            return None;
        }
        Some(Box::new(|value: &Value| Some(value.clone())))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoolValidator;

impl Validator for BoolValidator {
    fn validate(&self, params: &[String]) -> Option<Extractor> {
        if !params.is_empty() {
            return None;
        }
        Some(Box::new(|value: &Value| match value {
            Value::Bool(b) => Some(Value::Bool(*b)),
            Value::String(s) => match s.as_str() {
                "true" | "1" => Some(Value::Bool(true)),
                "false" | "0" => Some(Value::Bool(false)),
                _ => None,
            },
            _ => None,
        }))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IntValidator;

impl Validator for IntValidator {
    fn validate(&self, params: &[String]) -> Option<Extractor> {
        if !params.is_empty() {
            return None;
        }
        Some(Box::new(|value: &Value| match value {
            Value::Number(n) => n.as_i64().map(Value::from),
            Value::String(s) => s.parse::<i64>().ok().map(Value::from),
            _ => None,
        }))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UintValidator;

impl Validator for UintValidator {
    fn validate(&self, params: &[String]) -> Option<Extractor> {
        if !params.is_empty() {
            return None;
        }
        Some(Box::new(|value: &Value| match value {
            Value::Number(n) => n.as_u64().map(Value::from),
            Value::String(s) => s.parse::<u64>().ok().map(Value::from),
            _ => None,
        }))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FloatValidator;

impl Validator for FloatValidator {
    fn validate(&self, params: &[String]) -> Option<Extractor> {
        if !params.is_empty() {
            return None;
        }
        Some(Box::new(|value: &Value| {
            let f = match value {
                Value::Number(n) => n.as_f64()?,
                Value::String(s) => s.parse::<f64>().ok()?,
                _ => return None,
            };
            Number::from_f64(f).map(Value::Number)
        }))
    }
}

/// Character-count constraint of a `string` type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Length {
    Any,
    Exact(usize),
    Range(usize, usize),
}

impl Length {
    fn parse(params: &[String]) -> Option<Self> {
        match params {
            [] => Some(Self::Any),
            [exact] => exact.parse::<usize>().ok().map(Self::Exact),
            [min, max] => {
                let (min, max) = (min.parse::<usize>().ok()?, max.parse::<usize>().ok()?);
                (min <= max).then_some(Self::Range(min, max))
            }
            _ => None,
        }
    }

    fn admits(self, len: usize) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(n) => len == n,
            Self::Range(min, max) => (min..=max).contains(&len),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StringValidator;

impl Validator for StringValidator {
    fn validate(&self, params: &[String]) -> Option<Extractor> {
        let length = Length::parse(params)?;
        Some(Box::new(move |value: &Value| match value {
            Value::String(s) if length.admits(s.chars().count()) => Some(Value::String(s.clone())),
            _ => None,
        }))
    }
}
