use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            CreatedUser, LoginRequest, LoginResponse, MessageResponse, PublicUser, SignupRequest,
            SignupResponse, UpdatePasswordRequest,
        },
        jwt::AuthUser,
        services::{self, LoginOutcome, MSG_CODE_PENDING, MSG_CODE_RESENT, MSG_LOGIN_OK},
    },
    error::{AppResult, ErrorBody},
    extract::{parse_id, ApiJson},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/verify/:token", get(verify_email))
        .route("/api/auth/login", post(login))
        .route("/api/auth/update-password/:id", put(update_password))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignupRequest>,
) -> AppResult<(StatusCode, Json<SignupResponse>)> {
    let outcome = services::signup(&state, payload).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(SignupResponse {
            status: "success",
            message: services::MSG_SIGNUP_OK.into(),
            user: CreatedUser::from(&outcome.user),
        }),
    ))
}

#[instrument(skip_all)]
pub async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    services::verify_email(&state, &token).await?;
    Ok(Json(MessageResponse::success(services::MSG_VERIFIED)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> AppResult<Response> {
    let res = match services::login(&state, payload).await? {
        LoginOutcome::Authenticated { access_token, user } => Json(LoginResponse {
            status: "success",
            message: MSG_LOGIN_OK.into(),
            access_token,
            is_verified: true,
            user: PublicUser::from(&user),
        })
        .into_response(),
        LoginOutcome::VerificationResent { .. } => {
            (StatusCode::FORBIDDEN, Json(ErrorBody::new(MSG_CODE_RESENT))).into_response()
        }
        LoginOutcome::VerificationPending => {
            (StatusCode::FORBIDDEN, Json(ErrorBody::new(MSG_CODE_PENDING))).into_response()
        }
    };
    Ok(res)
}

#[instrument(skip(state, payload))]
pub async fn update_password(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdatePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_id(&id)?;
    services::update_password(&state, caller, id, payload).await?;
    Ok(Json(MessageResponse::success(services::MSG_PASSWORD_UPDATED)))
}

