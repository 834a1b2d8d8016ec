//! User accounts and roles used by Basic authentication

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Access role granted to a user.
///
/// Roles are flat: holding `Admin` does not imply `User`. Deserializing
/// goes through `FromStr`, so config files accept the same spellings as
/// the CLI and the stored authority list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Authority string as stored (`ROLE_USER`, `ROLE_ADMIN`)
    pub fn authority(&self) -> &'static str {
        match self {
            Self::User => "ROLE_USER",
            Self::Admin => "ROLE_ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("USER"),
            Self::Admin => f.write_str("ADMIN"),
        }
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    /// Accepts both `ADMIN` and `ROLE_ADMIN`, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        match upper.strip_prefix("ROLE_").unwrap_or(&upper) {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(ValidationError::InvalidVariant {
                field: "role",
                value: s.to_owned(),
            }),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Parse a comma-separated authority list (`ROLE_ADMIN,ROLE_USER`).
///
/// Empty entries are skipped; duplicates are collapsed.
pub fn parse_authorities(raw: &str) -> Result<Vec<Role>, ValidationError> {
    let mut roles = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let role: Role = part.parse()?;
        if !roles.contains(&role) {
            roles.push(role);
        }
    }
    Ok(roles)
}

/// Render roles back into the stored authority list.
pub fn format_authorities(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::authority)
        .collect::<Vec<_>>()
        .join(",")
}

/// Stored user account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Option<i32>,
    pub name: String,
    pub username: String,
    /// Encoded password, see `auth::password`
    pub password: String,
    pub roles: Vec<Role>,
}

impl User {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixed_and_bare_roles() {
        assert_eq!("ROLE_ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert!("ROLE_ROOT".parse::<Role>().is_err());
    }

    #[test]
    fn serde_uses_bare_name_out_and_from_str_in() {
        assert_eq!(serde_json::to_value(Role::Admin).unwrap(), "ADMIN");
        let roles: Vec<Role> = serde_json::from_str(r#"["role_admin", "USER"]"#).unwrap();
        assert_eq!(roles, vec![Role::Admin, Role::User]);
        assert!(serde_json::from_str::<Role>(r#""ROOT""#).is_err());
    }

    #[test]
    fn authority_list_round_trip() {
        let roles = parse_authorities("ROLE_ADMIN, ROLE_USER,,ROLE_ADMIN").unwrap();
        assert_eq!(roles, vec![Role::Admin, Role::User]);
        assert_eq!(format_authorities(&roles), "ROLE_ADMIN,ROLE_USER");
    }

    #[test]
    fn admin_does_not_imply_user() {
        let user = User {
            id: Some(1),
            name: "Admin".into(),
            username: "admin".into(),
            password: "{noop}1234".into(),
            roles: vec![Role::Admin],
        };
        assert!(user.has_role(Role::Admin));
        assert!(!user.has_role(Role::User));
    }
}
