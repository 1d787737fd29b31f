//! Parameter metadata and classification.
//!
//! # Key shapes
//! - `{name}`: URI capture, must name a capture of the pattern
//! - `GET@name` (or the `?name` shorthand): query parameter
//! - anything else: form (body) parameter
//!
//! # Rename rules
//! - URI and query keys cannot double as external identifiers, so they need
//!   an explicit `name`
//! - Form parameters default their rename to their own key
//! - Within one parameter map, no two effective names may collide, and no
//!   key may equal another parameter's rename

use std::collections::BTreeMap;

use super::error::CompileErrorKind;
use super::manifest::ManifestParam;
use crate::validator::TypeSpec;

/// Where a parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Uri,
    Query,
    Form,
}

/// A compiled parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub kind: ParamKind,
    /// Bare name: capture name, query key or form key.
    pub name: String,
    /// Raw manifest type string.
    pub type_name: String,
    pub validator: String,
    pub validator_params: Vec<String>,
    /// External name the parameter is exposed as.
    pub rename: String,
    pub optional: bool,
    pub info: String,
}

pub(crate) const QUERY_MARKER: &str = "GET@";

/// Split a manifest key into its kind and bare name.
pub(crate) fn classify_key(key: &str) -> (ParamKind, &str) {
    if let Some(name) = key.strip_prefix('{').and_then(|k| k.strip_suffix('}')) {
        return (ParamKind::Uri, name);
    }
    if let Some(name) = key
        .strip_prefix(QUERY_MARKER)
        .or_else(|| key.strip_prefix('?'))
    {
        return (ParamKind::Query, name);
    }
    (ParamKind::Form, key)
}

impl Parameter {
    /// Compile an input parameter. URI parameters are not yet tied to a capture.
    pub(crate) fn input(key: &str, raw: &ManifestParam) -> Result<Self, CompileErrorKind> {
        let (kind, name) = classify_key(key);
        if name.is_empty() {
            return Err(CompileErrorKind::EmptyParamName);
        }

        let spec = TypeSpec::parse(&raw.type_name).map_err(|reason| {
            CompileErrorKind::InvalidParamType {
                raw: raw.type_name.clone(),
                reason,
            }
        })?;

        let explicit = raw.name.as_deref().filter(|n| !n.is_empty());
        let rename = match (kind, explicit) {
            (_, Some(rename)) => rename.to_string(),
            (ParamKind::Form, None) => key.to_string(),
            (ParamKind::Uri | ParamKind::Query, None) => {
                return Err(CompileErrorKind::MissingRename);
            }
        };

        if kind == ParamKind::Uri && spec.optional {
            return Err(CompileErrorKind::OptionalCapture);
        }

        Ok(Self {
            kind,
            name: name.to_string(),
            type_name: raw.type_name.clone(),
            validator: spec.name,
            validator_params: spec.params,
            rename,
            optional: spec.optional,
            info: raw.info.clone(),
        })
    }

    /// Compile an output parameter: form kind only, never optional.
    pub(crate) fn output(key: &str, raw: &ManifestParam) -> Result<Self, CompileErrorKind> {
        if classify_key(key).0 != ParamKind::Form {
            return Err(CompileErrorKind::IllegalOutputKind);
        }
        let param = Self::input(key, raw)?;
        if param.optional {
            return Err(CompileErrorKind::OptionalOutput);
        }
        Ok(param)
    }
}

/// Find the first pair of parameters whose external names collide.
///
/// Returns the offending key and the key it conflicts with.
pub(crate) fn find_conflict(params: &BTreeMap<String, Parameter>) -> Option<(&str, &str)> {
    for (key, param) in params {
        for (other_key, other) in params {
            if key == other_key {
                continue;
            }
            if param.rename == other.rename || *key == other.rename {
                return Some((key, other_key));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(type_name: &str, name: Option<&str>) -> ManifestParam {
        ManifestParam {
            info: String::new(),
            type_name: type_name.to_string(),
            name: name.map(str::to_string),
        }
    }

    #[test]
    fn test_classify_key() {
        assert_eq!(classify_key("{id}"), (ParamKind::Uri, "id"));
        assert_eq!(classify_key("GET@page"), (ParamKind::Query, "page"));
        assert_eq!(classify_key("?page"), (ParamKind::Query, "page"));
        assert_eq!(classify_key("title"), (ParamKind::Form, "title"));
        assert_eq!(classify_key("{id"), (ParamKind::Form, "{id"));
    }

    #[test]
    fn test_form_rename_defaults_to_key() {
        let param = Parameter::input("title", &raw("?string(1,30)", None)).unwrap();
        assert_eq!(param.kind, ParamKind::Form);
        assert_eq!(param.rename, "title");
        assert!(param.optional);
        assert_eq!(param.validator, "string");
        assert_eq!(param.validator_params, vec!["1".to_string(), "30".to_string()]);
    }

    #[test]
    fn test_uri_and_query_need_rename() {
        assert_eq!(
            Parameter::input("{id}", &raw("uint", None)),
            Err(CompileErrorKind::MissingRename)
        );
        assert_eq!(
            Parameter::input("GET@page", &raw("uint", Some(""))),
            Err(CompileErrorKind::MissingRename)
        );

        let param = Parameter::input("GET@page", &raw("?uint", Some("Page"))).unwrap();
        assert_eq!(param.kind, ParamKind::Query);
        assert_eq!(param.name, "page");
        assert_eq!(param.rename, "Page");
    }

    #[test]
    fn test_optional_capture_rejected() {
        assert_eq!(
            Parameter::input("{id}", &raw("?uint", Some("ID"))),
            Err(CompileErrorKind::OptionalCapture)
        );
    }

    #[test]
    fn test_empty_names_and_bad_types() {
        assert_eq!(
            Parameter::input("{}", &raw("uint", Some("X"))),
            Err(CompileErrorKind::EmptyParamName)
        );
        assert_eq!(
            Parameter::input("GET@", &raw("uint", Some("X"))),
            Err(CompileErrorKind::EmptyParamName)
        );
        assert!(matches!(
            Parameter::input("a", &raw("string(1", None)),
            Err(CompileErrorKind::InvalidParamType { .. })
        ));
    }

    #[test]
    fn test_output_rules() {
        assert!(Parameter::output("name", &raw("string", None)).is_ok());
        assert_eq!(
            Parameter::output("{id}", &raw("uint", Some("ID"))),
            Err(CompileErrorKind::IllegalOutputKind)
        );
        assert_eq!(
            Parameter::output("GET@q", &raw("uint", Some("Q"))),
            Err(CompileErrorKind::IllegalOutputKind)
        );
        assert_eq!(
            Parameter::output("name", &raw("?string", None)),
            Err(CompileErrorKind::OptionalOutput)
        );
    }

    #[test]
    fn test_conflicts() {
        let mut params = BTreeMap::new();
        params.insert("a".to_string(), Parameter::input("a", &raw("int", None)).unwrap());
        params.insert(
            "GET@b".to_string(),
            Parameter::input("GET@b", &raw("int", Some("B"))).unwrap(),
        );
        assert_eq!(find_conflict(&params), None);

        params.insert(
            "GET@c".to_string(),
            Parameter::input("GET@c", &raw("int", Some("a"))).unwrap(),
        );
        assert!(find_conflict(&params).is_some());
    }

    #[test]
    fn test_key_collides_with_rename() {
        let mut params = BTreeMap::new();
        params.insert("x".to_string(), Parameter::input("x", &raw("int", Some("y"))).unwrap());
        params.insert("y".to_string(), Parameter::input("y", &raw("int", Some("z"))).unwrap());
        assert_eq!(find_conflict(&params), Some(("y", "x")));
    }
}
