//! Static route-to-role table
//!
//! Rules are checked in order and the first match wins. A pattern ending
//! in `/**` matches the prefix itself and everything below it.

use axum::http::Method;

use crate::models::Role;

/// What a request needs before it is dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    PermitAll,
    Authenticated,
    Role(Role),
}

struct Rule {
    /// `None` matches every method
    method: Option<&'static str>,
    pattern: &'static str,
    access: Access,
}

const RULES: &[Rule] = &[
    Rule { method: Some("POST"), pattern: "/animes/**", access: Access::Role(Role::Admin) },
    Rule { method: Some("PUT"), pattern: "/animes/**", access: Access::Role(Role::Admin) },
    Rule { method: Some("DELETE"), pattern: "/animes/**", access: Access::Role(Role::Admin) },
    Rule { method: Some("GET"), pattern: "/animes/**", access: Access::Role(Role::User) },
    Rule { method: None, pattern: "/health", access: Access::PermitAll },
];

fn path_matches(pattern: &str, path: &str) -> bool {
    match pattern.strip_suffix("/**") {
        Some(prefix) => {
            path == prefix
                || path
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('/'))
        }
        None => path == pattern,
    }
}

/// Access required for a request; unmatched requests need authentication.
pub fn required_access(method: &Method, path: &str) -> Access {
    RULES
        .iter()
        .find(|rule| {
            rule.method.map_or(true, |m| m == method.as_str()) && path_matches(rule.pattern, path)
        })
        .map(|rule| rule.access)
        .unwrap_or(Access::Authenticated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_need_admin() {
        for method in [Method::POST, Method::PUT, Method::DELETE] {
            assert_eq!(required_access(&method, "/animes"), Access::Role(Role::Admin));
            assert_eq!(required_access(&method, "/animes/1"), Access::Role(Role::Admin));
        }
        assert_eq!(
            required_access(&Method::POST, "/animes/batch"),
            Access::Role(Role::Admin)
        );
    }

    #[test]
    fn reads_need_user() {
        assert_eq!(required_access(&Method::GET, "/animes"), Access::Role(Role::User));
        assert_eq!(required_access(&Method::GET, "/animes/7"), Access::Role(Role::User));
    }

    #[test]
    fn health_is_public() {
        assert_eq!(required_access(&Method::GET, "/health"), Access::PermitAll);
    }

    #[test]
    fn everything_else_needs_authentication() {
        assert_eq!(required_access(&Method::GET, "/animesque"), Access::Authenticated);
        assert_eq!(required_access(&Method::PATCH, "/animes/1"), Access::Authenticated);
        assert_eq!(required_access(&Method::GET, "/"), Access::Authenticated);
    }
}
