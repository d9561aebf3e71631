use serde_json::{Map, Value};
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

/// An emailed code waiting to be redeemed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCode {
    pub code: String,
    pub expires_at: OffsetDateTime,
}

impl PendingCode {
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at < now
    }
}

/// Email-ownership state of an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// `None` only for rows that lost their code some other way; login reissues one.
    Unverified(Option<PendingCode>),
    Verified,
}

impl Verification {
    pub fn is_verified(&self) -> bool {
        matches!(self, Verification::Verified)
    }

    pub fn pending(&self) -> Option<&PendingCode> {
        match self {
            Verification::Unverified(code) => code.as_ref(),
            Verification::Verified => None,
        }
    }
}

/// User record.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String, // Argon2 PHC string, never exposed
    pub verification: Verification,
    pub role: String,
    pub auth_image: Option<String>,
    pub profile: Map<String, Value>, // extra signup fields, stored as-is
    pub created_at: OffsetDateTime,
}

/// Fields needed to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub pending: PendingCode,
    pub role: String,
    pub auth_image: Option<String>,
    pub profile: Map<String, Value>,
}

/// `users` row as stored in Postgres.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub is_verified: bool,
    pub verification_token: Option<String>,
    pub verification_exp: Option<OffsetDateTime>,
    pub role: String,
    pub auth_image: Option<String>,
    pub profile: Json<Map<String, Value>>,
    pub created_at: OffsetDateTime,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        let verification = if r.is_verified {
            Verification::Verified
        } else {
            let pending = match (r.verification_token, r.verification_exp) {
                (Some(code), Some(expires_at)) => Some(PendingCode { code, expires_at }),
                _ => None,
            };
            Verification::Unverified(pending)
        };
        Self {
            id: r.id,
            email: r.email,
            name: r.name,
            password_hash: r.password_hash,
            verification,
            role: r.role,
            auth_image: r.auth_image,
            profile: r.profile.0,
            created_at: r.created_at,
        }
    }
}
