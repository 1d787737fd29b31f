//! Precompiled role templates.
//!
//! A role string such as `user[ID]` is split once, at compile time, into
//! literal parts and capture references. Only bracketed tokens naming a
//! known capture become references; every other bracket stays literal.
//! Rendering a template keeps the brackets: `user[ID]` with `ID = 42`
//! renders as `user[42]`.

use serde_json::Value;

use crate::routing::CaptureMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    Literal(String),
    /// Rename of the referenced capture.
    Capture(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleTemplate {
    raw: String,
    parts: Vec<TemplatePart>,
}

impl RoleTemplate {
    /// Split `raw` into parts; `is_capture` tells which bracket tokens are captures.
    pub fn compile(raw: &str, is_capture: impl Fn(&str) -> bool) -> Self {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut rest = raw;

        while let Some(open) = rest.find('[') {
            let after = &rest[open + 1..];
            match after.find(']') {
                Some(close) if is_capture(&after[..close]) => {
                    literal.push_str(&rest[..=open]);
                    parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
                    parts.push(TemplatePart::Capture(after[..close].to_string()));
                    rest = &after[close..];
                }
                _ => {
                    literal.push_str(&rest[..=open]);
                    rest = after;
                }
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            parts.push(TemplatePart::Literal(literal));
        }

        Self {
            raw: raw.to_string(),
            parts,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn parts(&self) -> &[TemplatePart] {
        &self.parts
    }

    /// True when the template references no capture.
    pub fn is_static(&self) -> bool {
        self.captures().next().is_none()
    }

    /// Renames of the captures referenced, in order of appearance.
    pub fn captures(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|part| match part {
            TemplatePart::Capture(name) => Some(name.as_str()),
            TemplatePart::Literal(_) => None,
        })
    }

    /// Substitute captured values. A reference with no captured value keeps its token.
    pub fn render(&self, captures: &CaptureMap) -> String {
        if self.is_static() {
            return self.raw.clone();
        }
        let mut out = String::with_capacity(self.raw.len());
        for part in &self.parts {
            match part {
                TemplatePart::Literal(text) => out.push_str(text),
                TemplatePart::Capture(name) => match captures.get(name) {
                    Some(value) => out.push_str(&render_value(value)),
                    None => out.push_str(name),
                },
            }
        }
        out
    }
}

/// String form of a typed value; strings are written without quotes.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captures(pairs: &[(&str, Value)]) -> CaptureMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_static_template() {
        let template = RoleTemplate::compile("admin", |_| true);
        assert!(template.is_static());
        assert_eq!(template.parts(), &[TemplatePart::Literal("admin".into())]);
        assert_eq!(template.render(&CaptureMap::new()), "admin");
    }

    #[test]
    fn test_capture_substitution() {
        let template = RoleTemplate::compile("user[ID]", |name| name == "ID");
        assert_eq!(
            template.parts(),
            &[
                TemplatePart::Literal("user[".into()),
                TemplatePart::Capture("ID".into()),
                TemplatePart::Literal("]".into()),
            ]
        );
        let values = captures(&[("ID", Value::from(42u64))]);
        assert_eq!(template.render(&values), "user[42]");
    }

    #[test]
    fn test_unknown_token_stays_literal() {
        let template = RoleTemplate::compile("group[Other]", |name| name == "ID");
        assert!(template.is_static());
        assert_eq!(template.render(&captures(&[("ID", Value::from(1))])), "group[Other]");
    }

    #[test]
    fn test_multiple_and_nested_tokens() {
        let template = RoleTemplate::compile("org[Org]/[x[Team]]", |name| name == "Org" || name == "Team");
        assert_eq!(template.captures().collect::<Vec<_>>(), vec!["Org", "Team"]);

        let values = captures(&[("Org", Value::from("acme")), ("Team", Value::from(7))]);
        assert_eq!(template.render(&values), "org[acme]/[x[7]]");
    }

    #[test]
    fn test_missing_value_keeps_token() {
        let template = RoleTemplate::compile("user[ID]", |name| name == "ID");
        assert_eq!(template.render(&CaptureMap::new()), "user[ID]");
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&Value::from("abc")), "abc");
        assert_eq!(render_value(&Value::from(-3)), "-3");
        assert_eq!(render_value(&Value::Bool(true)), "true");
    }
}
