//! `Authorization: Basic` header parsing

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::AuthError;

/// Username and password decoded from a Basic header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl BasicCredentials {
    /// Parse the value of an `Authorization` header.
    ///
    /// The scheme is matched case-insensitively; the password may contain `:`.
    pub fn parse(header: &str) -> Result<Self, AuthError> {
        let (scheme, encoded) = header
            .trim()
            .split_once(' ')
            .ok_or(AuthError::MalformedHeader)?;

        if !scheme.eq_ignore_ascii_case("basic") {
            return Err(AuthError::MalformedHeader);
        }

        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|_| AuthError::MalformedHeader)?;
        let decoded = String::from_utf8(decoded).map_err(|_| AuthError::MalformedHeader)?;

        let (username, password) = decoded.split_once(':').ok_or(AuthError::MalformedHeader)?;
        if username.is_empty() {
            return Err(AuthError::MalformedHeader);
        }

        Ok(Self {
            username: username.to_owned(),
            password: password.to_owned(),
        })
    }

    /// Header value for these credentials, used by clients and tests.
    pub fn header_value(username: &str, password: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_header() {
        let header = BasicCredentials::header_value("lucas", "12:34");
        let creds = BasicCredentials::parse(&header).unwrap();
        assert_eq!(creds.username, "lucas");
        assert_eq!(creds.password, "12:34");
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let header = BasicCredentials::header_value("lucas", "1234").replace("Basic", "basic");
        assert!(BasicCredentials::parse(&header).is_ok());
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        for header in ["Bearer abc", "Basic", "Basic !!!", "Basic bm9jb2xvbg=="] {
            assert!(
                matches!(BasicCredentials::parse(header), Err(AuthError::MalformedHeader)),
                "{header}"
            );
        }
    }
}
