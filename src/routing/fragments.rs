//! Request path splitting and decoding.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

/// Split a request path into fragments: leading and trailing slashes are
/// dropped, the rest is split on `/`. The root path has no fragments.
///
/// Fragments are returned raw; see [`decode_fragments`].
pub fn split_path(path: &str) -> Vec<&str> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split('/').collect()
}

/// Percent-decode split fragments. An escaped `/` stays inside its fragment.
///
/// Returns `None` if any fragment does not decode to UTF-8; such a path
/// matches no endpoint.
pub fn decode_fragments(raw: &[&str]) -> Option<Vec<String>> {
    raw.iter()
        .map(|fragment| {
            percent_decode_str(fragment)
                .decode_utf8()
                .ok()
                .map(Cow::into_owned)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_path() {
        assert!(split_path("/").is_empty());
        assert!(split_path("").is_empty());
        assert_eq!(split_path("/users"), vec!["users"]);
        assert_eq!(split_path("/users/42/"), vec!["users", "42"]);
        assert_eq!(split_path("users/42"), vec!["users", "42"]);
        assert_eq!(split_path("/a//b"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_decode_fragments() {
        assert_eq!(
            decode_fragments(&split_path("/files/Jos%C3%A9/a%20b")).unwrap(),
            vec!["files", "José", "a b"]
        );
        assert_eq!(
            decode_fragments(&split_path("/files/a%2Fb")).unwrap(),
            vec!["files", "a/b"]
        );
        assert!(decode_fragments(&split_path("/files/%FF")).is_none());
        assert!(decode_fragments(&[]).unwrap().is_empty());
    }
}
