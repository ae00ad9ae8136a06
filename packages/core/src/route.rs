//! Route derivation: `(api, operation)` ⇄ `/api/{api}/{operation}`.
//!
//! Routes are never stored. Both the server and the client recompute them
//! from the contract, so the two sides agree on every path as long as they
//! were built from the same declaration.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Prefix shared by every operation route.
pub const ROUTE_PREFIX: &str = "/api";

/// URL-unreserved characters only: a name never needs percent-encoding and
/// never reads as a router pattern.
static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.~-]+$").expect("static regex is valid"));

/// One or more `/`-led segments of unreserved characters.
static STATIC_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(/[A-Za-z0-9_.~-]*)+$").expect("static regex is valid"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("invalid identifier {0:?}: must be non-empty ASCII letters, digits, '_', '.', '~' or '-', and not '.' or '..'")]
    InvalidIdentifier(String),

    #[error("invalid path {0:?}: must be '/'-separated segments of ASCII letters, digits, '_', '.', '~' or '-'")]
    InvalidPath(String),
}

/// Check that `name` can be used verbatim as one path segment.
pub fn validate_identifier(name: &str) -> Result<(), RouteError> {
    if !IDENTIFIER.is_match(name) || name == "." || name == ".." {
        return Err(RouteError::InvalidIdentifier(name.to_string()));
    }
    Ok(())
}

/// Check that `path` is a literal route: no parameters, wildcards or
/// characters a client would percent-encode.
pub fn validate_path(path: &str) -> Result<(), RouteError> {
    if !STATIC_PATH.is_match(path) {
        return Err(RouteError::InvalidPath(path.to_string()));
    }
    Ok(())
}

/// Build the wire path for one operation. Casing is preserved.
///
/// ```rust,ignore
/// assert_eq!(build_route("Todos", "getTodos")?, "/api/Todos/getTodos");
/// ```
pub fn build_route(api_name: &str, operation_name: &str) -> Result<String, RouteError> {
    validate_identifier(api_name)?;
    validate_identifier(operation_name)?;
    Ok(format!("{ROUTE_PREFIX}/{api_name}/{operation_name}"))
}

/// Split a wire path back into `(api, operation)`.
///
/// Returns `None` for anything [`build_route`] could not have produced.
pub fn parse_route(path: &str) -> Option<(&str, &str)> {
    let rest = path.strip_prefix(ROUTE_PREFIX)?.strip_prefix('/')?;
    let (api, operation) = rest.split_once('/')?;
    if validate_identifier(api).is_err() || validate_identifier(operation).is_err() {
        return None;
    }
    Some((api, operation))
}

/// Expand a documentation path template, replacing `{apiName}`.
pub fn expand_docs_path(template: &str, api_name: &str) -> String {
    template.replace("{apiName}", api_name)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn builds_expected_paths() {
        assert_eq!(build_route("Todos", "getTodos").unwrap(), "/api/Todos/getTodos");
        assert_eq!(build_route("Todos", "addTodo").unwrap(), "/api/Todos/addTodo");
    }

    #[test]
    fn stable_for_identical_inputs() {
        assert_eq!(build_route("A", "b"), build_route("A", "b"));
    }

    #[test]
    fn injective_over_distinct_pairs() {
        let pairs = [
            ("Todos", "getTodos"),
            ("Todos", "gettodos"),
            ("todos", "getTodos"),
            ("Todo", "sgetTodos"),
            ("Todos", "addTodo"),
            ("Users", "addTodo"),
        ];
        let routes: HashSet<String> = pairs
            .iter()
            .map(|(a, o)| build_route(a, o).unwrap())
            .collect();
        assert_eq!(routes.len(), pairs.len());
    }

    #[test]
    fn rejects_path_separator() {
        assert_eq!(
            build_route("To/dos", "getTodos"),
            Err(RouteError::InvalidIdentifier("To/dos".into()))
        );
        assert!(build_route("Todos", "get/Todos").is_err());
        assert!(build_route("Todos", "").is_err());
        assert!(build_route("Todos", "get Todos").is_err());
    }

    #[test]
    fn rejects_router_syntax_and_encoded_characters() {
        for name in [":Names", "{x}", "*rest", "getT\u{f6}dos", "100%", "a?b", "a#b", ".", ".."] {
            assert_eq!(
                validate_identifier(name),
                Err(RouteError::InvalidIdentifier(name.into())),
                "{name}"
            );
        }
        for name in ["Todos", "get_todos", "v1.2", "a-b~c"] {
            assert!(validate_identifier(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn parse_rejects_percent_encoded_segments() {
        assert_eq!(parse_route("/api/Names/getT%C3%B6dos"), None);
    }

    #[test]
    fn literal_paths_only() {
        assert!(validate_path("/api/Todos/docs").is_ok());
        assert!(validate_path("/reference/Todos").is_ok());
        for path in ["", "docs", "/api/{x}/docs", "/api/:Names/docs", "/files/*rest", "/a b"] {
            assert_eq!(validate_path(path), Err(RouteError::InvalidPath(path.into())), "{path}");
        }
    }

    #[test]
    fn parse_inverts_build() {
        let path = build_route("Todos", "deleteTodo").unwrap();
        assert_eq!(parse_route(&path), Some(("Todos", "deleteTodo")));
    }

    #[test]
    fn parse_rejects_foreign_paths() {
        assert_eq!(parse_route("/v1/units"), None);
        assert_eq!(parse_route("/api/Todos"), None);
        assert_eq!(parse_route("/api/Todos/a/b"), None);
        assert_eq!(parse_route("/apiTodos/getTodos"), None);
    }

    #[test]
    fn docs_template_expands() {
        assert_eq!(expand_docs_path("/api/{apiName}/docs", "Todos"), "/api/Todos/docs");
    }
}
