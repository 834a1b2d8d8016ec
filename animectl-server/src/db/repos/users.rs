//! User repository - account lookup for authentication

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use super::{DbError, DbResult};
use crate::models::{format_authorities, parse_authorities, User};

/// Account storage used by the Basic authentication layer.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> DbResult<Option<User>>;

    /// Insert a new account. Fails with `DbError::Conflict` if the username is taken.
    async fn create(&self, user: User) -> DbResult<User>;
}

#[derive(Debug, Clone, FromRow)]
struct UserRow {
    id: i32,
    name: String,
    username: String,
    password: String,
    authorities: String,
}

impl TryFrom<UserRow> for User {
    type Error = DbError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let roles = parse_authorities(&row.authorities).map_err(|e| DbError::Corrupt {
            resource: "user",
            reason: e.to_string(),
        })?;

        Ok(User {
            id: Some(row.id),
            name: row.name,
            username: row.username,
            password: row.password,
            roles,
        })
    }
}

/// PostgreSQL-backed user repository
#[derive(Clone)]
pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepo {
    async fn find_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, username, password, authorities FROM app_user WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn create(&self, user: User) -> DbResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO app_user (name, username, password, authorities)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (username) DO NOTHING
            RETURNING id, name, username, password, authorities
            "#,
        )
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.password)
        .bind(format_authorities(&user.roles))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::Conflict {
            resource: "user",
            id: user.username.clone(),
        })?;

        User::try_from(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn row_with_bad_authorities_is_corrupt() {
        let row = UserRow {
            id: 1,
            name: "Lucas".into(),
            username: "lucas".into(),
            password: "{noop}1234".into(),
            authorities: "ROLE_USER,ROLE_ROOT".into(),
        };
        let err = User::try_from(row).unwrap_err();
        assert!(matches!(err, DbError::Corrupt { resource: "user", .. }));
    }

    #[test]
    fn row_maps_roles() {
        let row = UserRow {
            id: 2,
            name: "Fabricio".into(),
            username: "fabricio".into(),
            password: "{noop}1234".into(),
            authorities: "ROLE_ADMIN".into(),
        };
        let user = User::try_from(row).unwrap();
        assert_eq!(user.id, Some(2));
        assert_eq!(user.roles, vec![Role::Admin]);
    }
}
