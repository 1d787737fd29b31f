//! Path pattern parsing.
//!
//! A pattern is `/`-rooted and split into fragments. A fragment is either a
//! literal or a whole-fragment capture `{name}` with `name` in `[A-Za-z_-]+`.
//! Braces anywhere else are rejected.

use super::error::CompileErrorKind;

/// One segment of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Literal(String),
    /// Index into the endpoint's capture list.
    Capture(usize),
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ParsedPattern {
    pub fragments: Vec<Fragment>,
    /// Capture names with the fragment index each one occupies.
    pub captures: Vec<(String, usize)>,
}

pub(crate) fn is_capture_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c == '_' || c == '-')
}

pub(crate) fn parse_pattern(pattern: &str) -> Result<ParsedPattern, CompileErrorKind> {
    let rest = pattern
        .strip_prefix('/')
        .ok_or(CompileErrorKind::InvalidPattern("must start with `/`"))?;

    let mut parsed = ParsedPattern::default();
    if rest.is_empty() {
        return Ok(parsed);
    }
    if rest.ends_with('/') {
        return Err(CompileErrorKind::InvalidPattern("must not end with `/`"));
    }

    for (index, fragment) in rest.split('/').enumerate() {
        if fragment.is_empty() {
            return Err(CompileErrorKind::InvalidPattern("empty fragment"));
        }

        let braced = fragment
            .strip_prefix('{')
            .and_then(|f| f.strip_suffix('}'));

        match braced {
            Some(name) => {
                if !is_capture_name(name) {
                    return Err(CompileErrorKind::InvalidCaptureName(fragment.to_string()));
                }
                if parsed.captures.iter().any(|(existing, _)| existing == name) {
                    return Err(CompileErrorKind::DuplicateCapture(name.to_string()));
                }
                parsed.fragments.push(Fragment::Capture(parsed.captures.len()));
                parsed.captures.push((name.to_string(), index));
            }
            None if fragment.contains(['{', '}']) => {
                return Err(CompileErrorKind::InvalidPattern(
                    "braces must enclose a whole fragment",
                ));
            }
            None => parsed.fragments.push(Fragment::Literal(fragment.to_string())),
        }
    }

    Ok(parsed)
}
