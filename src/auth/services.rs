//! Account workflow: signup, email verification, login with lazy resend, and
//! password change. Handlers only translate these outcomes to HTTP.

use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use time::{Duration, OffsetDateTime};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        codes::{generate_code, VERIFICATION_CODE_LEN},
        dto::{LoginRequest, SignupRequest, UpdatePasswordRequest},
        jwt::JwtKeys,
        password::{hash_password_async, verify_password_async},
        repo_types::{NewUser, PendingCode, User, Verification},
    },
    error::{AppError, AppResult},
    mail::{dispatch_verification, first_name, VerificationEmail},
    state::AppState,
};

pub const DEFAULT_ROLE: &str = "user";

pub const MSG_SIGNUP_OK: &str = "Sign up successful. Check your email to verify your account";
pub const MSG_VERIFIED: &str = "Your email has been verified";
pub const MSG_TOKEN_INVALID: &str = "This token is invalid or has already been verified";
pub const MSG_TOKEN_EXPIRED: &str = "Verification time has expired. Please register again.";
pub const MSG_BAD_CREDENTIALS: &str = "Email or password is incorrect";
pub const MSG_CODE_RESENT: &str = "Email not verified. A new verification code has been sent.";
pub const MSG_CODE_PENDING: &str =
    "Email not verified. Please check your email for the verification code.";
pub const MSG_LOGIN_OK: &str = "Login successful. Welcome back!";
pub const MSG_PASSWORD_UPDATED: &str = "Password updated successfully";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.trim().is_empty())
}

#[derive(Debug)]
pub struct SignupOutcome {
    pub user: User,
    pub email_sent: bool,
}

#[derive(Debug)]
pub enum LoginOutcome {
    Authenticated { access_token: String, user: User },
    /// Code was missing or stale; a fresh one was stored and mailed.
    VerificationResent { email_sent: bool },
    /// A live code is already out; nothing changed.
    VerificationPending,
}

/// Fresh code expiring `ttl_minutes` from now.
fn issue_code(ttl_minutes: i64) -> PendingCode {
    PendingCode {
        code: generate_code(VERIFICATION_CODE_LEN),
        expires_at: OffsetDateTime::now_utc() + Duration::minutes(ttl_minutes),
    }
}

async fn send_code(
    state: &AppState,
    user_email: &str,
    display_name: &str,
    pending: &PendingCode,
) -> bool {
    let email = VerificationEmail {
        to: user_email.to_string(),
        first_name: first_name(display_name).to_string(),
        code: pending.code.clone(),
        verify_url: format!(
            "{}/api/auth/verify/{}",
            state.config.app_base_url.trim_end_matches('/'),
            pending.code
        ),
        expires_in_minutes: state.config.verification.ttl_minutes,
    };
    dispatch_verification(state.mailer.as_ref(), email).await
}

#[instrument(skip(state, req))]
pub async fn signup(state: &AppState, req: SignupRequest) -> AppResult<SignupOutcome> {
    let (Some(password), Some(email), Some(name)) = (
        non_empty(req.password),
        non_empty(req.email),
        non_empty(req.name),
    ) else {
        warn!("signup missing required fields");
        return Err(AppError::BadRequest(
            "Password, email and name are required".into(),
        ));
    };

    let email = normalize_email(&email);
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::BadRequest("Invalid email".into()));
    }

    if state.users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let password_hash = hash_password_async(password).await?;
    let pending = issue_code(state.config.verification.ttl_minutes);

    let new_user = NewUser {
        email,
        name,
        password_hash,
        pending: pending.clone(),
        role: non_empty(req.role).unwrap_or_else(|| DEFAULT_ROLE.to_string()),
        auth_image: req.auth_image,
        profile: req.profile,
    };

    let user = match state.users.create(new_user).await {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err(AppError::NotFound("could not sign up".into()));
        }
    };

    let email_sent = send_code(state, &user.email, &user.name, &pending).await;
    info!(user_id = %user.id, email = %user.email, email_sent, "user signed up");
    Ok(SignupOutcome { user, email_sent })
}

#[instrument(skip(state, code))]
pub async fn verify_email(state: &AppState, code: &str) -> AppResult<()> {
    let Some(user) = state.users.find_by_verification_code(code).await? else {
        warn!("verification code not found");
        return Err(AppError::BadRequest(MSG_TOKEN_INVALID.into()));
    };

    let expired = user
        .verification
        .pending()
        .map_or(true, |p| p.is_expired_at(OffsetDateTime::now_utc()));
    if expired {
        state.users.delete(user.id).await?;
        warn!(user_id = %user.id, "verification code expired; account removed");
        return Err(AppError::Forbidden(MSG_TOKEN_EXPIRED.into()));
    }

    state
        .users
        .set_verification(user.id, &Verification::Verified)
        .await?;
    info!(user_id = %user.id, "email verified");
    Ok(())
}

#[instrument(skip(state, req))]
pub async fn login(state: &AppState, req: LoginRequest) -> AppResult<LoginOutcome> {
    let (Some(email), Some(password)) = (non_empty(req.email), non_empty(req.password)) else {
        return Err(AppError::BadRequest(
            "Email and password are required".into(),
        ));
    };
    let email = normalize_email(&email);

    let user = match state.users.find_by_email(&email).await? {
        Some(u) if !u.password_hash.is_empty() => u,
        _ => {
            warn!(email = %email, "login unknown email");
            return Err(AppError::Unauthorized(MSG_BAD_CREDENTIALS.into()));
        }
    };

    if !verify_password_async(password, user.password_hash.clone()).await? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized(MSG_BAD_CREDENTIALS.into()));
    }

    if let Verification::Unverified(pending) = &user.verification {
        let now = OffsetDateTime::now_utc();
        let stale = pending.as_ref().map_or(true, |p| p.is_expired_at(now));
        if !stale {
            info!(user_id = %user.id, "login blocked; verification pending");
            return Ok(LoginOutcome::VerificationPending);
        }

        let fresh = issue_code(state.config.verification.ttl_minutes);
        state
            .users
            .set_verification(user.id, &Verification::Unverified(Some(fresh.clone())))
            .await?;
        let email_sent = send_code(state, &user.email, &user.name, &fresh).await;
        info!(user_id = %user.id, email_sent, "verification code reissued on login");
        return Ok(LoginOutcome::VerificationResent { email_sent });
    }

    let access_token = JwtKeys::from_ref(state).sign(&user)?;
    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(LoginOutcome::Authenticated { access_token, user })
}

#[instrument(skip(state, req))]
pub async fn update_password(
    state: &AppState,
    caller: Uuid,
    id: Uuid,
    req: UpdatePasswordRequest,
) -> AppResult<()> {
    let (Some(current), Some(new)) = (
        non_empty(req.current_password),
        non_empty(req.new_password),
    ) else {
        return Err(AppError::BadRequest(
            "Current password and new password are required".into(),
        ));
    };

    if caller != id {
        warn!(%caller, target = %id, "password change for another account");
        return Err(AppError::Forbidden(
            "You can only change your own password".into(),
        ));
    }

    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if !verify_password_async(current, user.password_hash.clone()).await? {
        warn!(user_id = %user.id, "current password mismatch");
        return Err(AppError::BadRequest("Current password is incorrect".into()));
    }

    let hash = hash_password_async(new).await?;
    if !state.users.update_password_hash(user.id, &hash).await? {
        return Err(AppError::NotFound("User not found".into()));
    }
    info!(user_id = %user.id, "password updated");
    Ok(())
}
