use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User, UserRow, Verification};

/// Credential store used by the auth workflow.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    /// Only unverified users still hold a code.
    async fn find_by_verification_code(&self, code: &str) -> anyhow::Result<Option<User>>;
    async fn create(&self, new: NewUser) -> anyhow::Result<User>;
    /// Overwrites the verification state; returns false if the user is gone.
    async fn set_verification(&self, id: Uuid, state: &Verification) -> anyhow::Result<bool>;
    async fn update_password_hash(&self, id: Uuid, hash: &str) -> anyhow::Result<bool>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

const USER_COLUMNS: &str = "id, email, name, password_hash, is_verified, verification_token, \
                            verification_exp, role, auth_image, profile, created_at";

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn fetch_one_where(
        &self,
        clause: &str,
        bind: impl ToString,
    ) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {clause}");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(bind.to_string())
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(User::from))
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        self.fetch_one_where("email = $1", email).await
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(User::from))
    }

    async fn find_by_verification_code(&self, code: &str) -> anyhow::Result<Option<User>> {
        self.fetch_one_where("verification_token = $1 AND is_verified = FALSE", code)
            .await
    }

    async fn create(&self, new: NewUser) -> anyhow::Result<User> {
        let sql = format!(
            r#"
            INSERT INTO users (email, name, password_hash, is_verified, verification_token,
                               verification_exp, role, auth_image, profile)
            VALUES ($1, $2, $3, FALSE, $4, $5, $6, $7, $8)
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&new.email)
            .bind(&new.name)
            .bind(&new.password_hash)
            .bind(&new.pending.code)
            .bind(new.pending.expires_at)
            .bind(&new.role)
            .bind(&new.auth_image)
            .bind(Json(&new.profile))
            .fetch_one(&self.db)
            .await?;
        Ok(row.into())
    }

    async fn set_verification(&self, id: Uuid, state: &Verification) -> anyhow::Result<bool> {
        let (is_verified, code, expires_at) = match state {
            Verification::Verified => (true, None, None),
            Verification::Unverified(pending) => (
                false,
                pending.as_ref().map(|p| p.code.clone()),
                pending.as_ref().map(|p| p.expires_at),
            ),
        };
        let res = sqlx::query(
            r#"
            UPDATE users
               SET is_verified = $2, verification_token = $3, verification_exp = $4
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(is_verified)
        .bind(code)
        .bind(expires_at)
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn update_password_hash(&self, id: Uuid, hash: &str) -> anyhow::Result<bool> {
        let res = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(hash)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() == 1)
    }
}

/// Process-local store for development and tests. Emails are unique like the SQL index.
#[derive(Default)]
pub struct InMemoryUserRepo {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserRepo for InMemoryUserRepo {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_verification_code(&self, code: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.verification.pending().is_some_and(|p| p.code == code))
            .cloned())
    }

    async fn create(&self, new: NewUser) -> anyhow::Result<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == new.email) {
            anyhow::bail!("duplicate email");
        }
        let user = User {
            id: Uuid::new_v4(),
            email: new.email,
            name: new.name,
            password_hash: new.password_hash,
            verification: Verification::Unverified(Some(new.pending)),
            role: new.role,
            auth_image: new.auth_image,
            profile: new.profile,
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn set_verification(&self, id: Uuid, state: &Verification) -> anyhow::Result<bool> {
        let mut users = self.users.write().await;
        Ok(match users.get_mut(&id) {
            Some(user) => {
                user.verification = state.clone();
                true
            }
            None => false,
        })
    }

    async fn update_password_hash(&self, id: Uuid, hash: &str) -> anyhow::Result<bool> {
        let mut users = self.users.write().await;
        Ok(match users.get_mut(&id) {
            Some(user) => {
                user.password_hash = hash.to_string();
                true
            }
            None => false,
        })
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.users.write().await.remove(&id).is_some())
    }
}
