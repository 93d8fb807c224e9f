//! Authentication principals and bearer access tokens.
//!
//! # Responsibility
//! - Provision users with a role and issue opaque access tokens.
//! - Resolve a token to the acting identity for the controllers.
//! - Remove a principal together with every token it owns.
//!
//! # Invariants
//! - Usernames are lowercase `[a-z0-9_.-]`, 3 to 40 characters.
//! - Only active users authenticate.
//! - Deleting a principal revokes its tokens before the user row goes away.
//! - A principal is linked to at most one resource record.

use crate::auth::{parse_role, Actor, Role};
use crate::model::entity::{EntityRef, EntityType, UserId};
use crate::model::validation::ValidationError;
use crate::repo::{ensure_schema_ready, now_epoch_ms, RepoError, RepoResult};
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

/// Resource kinds whose rows may own a login principal.
const PRINCIPAL_OWNERS: [EntityType; 4] = [
    EntityType::Student,
    EntityType::Professor,
    EntityType::AcademicMonitor,
    EntityType::AdministrativeMonitor,
];

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9_.-]{3,40}$").expect("valid username regex"));

/// Persisted authentication principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub id: UserId,
    pub username: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: i64,
}

/// What removing one principal deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrincipalRemoval {
    pub user_removed: bool,
    pub tokens_revoked: usize,
}

/// Principal and token persistence contract.
pub trait AuthRepository {
    fn create_user(&self, username: &str, role: Role) -> RepoResult<UserAccount>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<UserAccount>>;
    fn set_active(&self, id: UserId, is_active: bool) -> RepoResult<()>;
    /// Issues a new opaque token for an existing user.
    fn issue_token(&self, user_id: UserId) -> RepoResult<String>;
    /// Resolves a token to its actor; unknown tokens and inactive users yield `None`.
    fn authenticate(&self, token: &str) -> RepoResult<Option<Actor>>;
    /// Revokes one token (logout). Returns whether it existed.
    fn revoke_token(&self, token: &str) -> RepoResult<bool>;
    /// Deletes a principal and all of its tokens.
    fn delete_principal(&self, id: UserId) -> RepoResult<PrincipalRemoval>;
    /// Resource record currently linked to the principal, if any.
    fn linked_record(&self, id: UserId) -> RepoResult<Option<EntityRef>>;
}

pub struct SqliteAuthRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuthRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl AuthRepository for SqliteAuthRepository<'_> {
    fn create_user(&self, username: &str, role: Role) -> RepoResult<UserAccount> {
        let username = username.trim();
        if !USERNAME_RE.is_match(username) {
            return Err(RepoError::Validation(ValidationError::InvalidFormat {
                field: "username",
                expected: "3-40 characters of a-z, 0-9, '_', '.', '-'",
            }));
        }

        let account = UserAccount {
            id: Uuid::new_v4(),
            username: username.to_string(),
            role,
            is_active: true,
            created_at: now_epoch_ms(),
        };
        self.conn.execute(
            "INSERT INTO users (id, username, role, is_active, created_at)
             VALUES (?1, ?2, ?3, 1, ?4);",
            params![
                account.id.to_string(),
                account.username,
                account.role.as_str(),
                account.created_at,
            ],
        )?;

        info!(
            "event=user_create module=auth status=ok user_id={} role={}",
            account.id, account.role
        );
        Ok(account)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<UserAccount>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, username, role, is_active, created_at
                 FROM users
                 WHERE id = ?1;",
                [id.to_string()],
                |row| Ok(parse_user_row(row)),
            )
            .optional()?;
        row.transpose()
    }

    fn set_active(&self, id: UserId, is_active: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE users SET is_active = ?1 WHERE id = ?2;",
            params![i64::from(is_active), id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::UserNotFound(id));
        }
        Ok(())
    }

    fn issue_token(&self, user_id: UserId) -> RepoResult<String> {
        if self.get_user(user_id)?.is_none() {
            return Err(RepoError::UserNotFound(user_id));
        }

        let token = Uuid::new_v4().simple().to_string();
        self.conn.execute(
            "INSERT INTO access_tokens (token, user_id, created_at) VALUES (?1, ?2, ?3);",
            params![token, user_id.to_string(), now_epoch_ms()],
        )?;
        info!("event=token_issue module=auth status=ok user_id={user_id}");
        Ok(token)
    }

    fn authenticate(&self, token: &str) -> RepoResult<Option<Actor>> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(None);
        }

        let row = self
            .conn
            .query_row(
                "SELECT u.id, u.role
                 FROM access_tokens t
                 JOIN users u ON u.id = t.user_id
                 WHERE t.token = ?1 AND u.is_active = 1;",
                [token],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        let Some((user_id, role)) = row else {
            return Ok(None);
        };
        let user_id = parse_user_id(&user_id)?;
        let role = parse_role(&role)
            .map_err(|err| RepoError::InvalidData(format!("users.role: {err}")))?;
        Ok(Some(Actor::new(user_id, role)))
    }

    fn revoke_token(&self, token: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM access_tokens WHERE token = ?1;", [token.trim()])?;
        Ok(changed > 0)
    }

    fn delete_principal(&self, id: UserId) -> RepoResult<PrincipalRemoval> {
        let tokens_revoked = self
            .conn
            .execute("DELETE FROM access_tokens WHERE user_id = ?1;", [id.to_string()])?;
        let users = self
            .conn
            .execute("DELETE FROM users WHERE id = ?1;", [id.to_string()])?;

        info!(
            "event=principal_delete module=auth status=ok user_id={id} tokens_revoked={tokens_revoked} user_removed={}",
            users > 0
        );
        Ok(PrincipalRemoval {
            user_removed: users > 0,
            tokens_revoked,
        })
    }

    fn linked_record(&self, id: UserId) -> RepoResult<Option<EntityRef>> {
        for entity_type in PRINCIPAL_OWNERS {
            let owner = self
                .conn
                .query_row(
                    &format!(
                        "SELECT id FROM {} WHERE user_id = ?1 LIMIT 1;",
                        entity_type.table_name()
                    ),
                    [id.to_string()],
                    |row| row.get::<_, String>(0),
                )
                .optional()?;
            if let Some(record_id) = owner {
                let record_id = Uuid::parse_str(&record_id).map_err(|_| {
                    RepoError::InvalidData(format!(
                        "invalid uuid value `{record_id}` in {}.id",
                        entity_type.table_name()
                    ))
                })?;
                return Ok(Some(EntityRef::new(entity_type, record_id)));
            }
        }
        Ok(None)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<UserAccount> {
    let id: String = row.get(0)?;
    let role: String = row.get(2)?;
    let is_active: i64 = row.get(3)?;
    Ok(UserAccount {
        id: parse_user_id(&id)?,
        username: row.get(1)?,
        role: parse_role(&role)
            .map_err(|err| RepoError::InvalidData(format!("users.role: {err}")))?,
        is_active: is_active != 0,
        created_at: row.get(4)?,
    })
}

fn parse_user_id(value: &str) -> RepoResult<UserId> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in users.id")))
}
