//! Login, registration and profile updates.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use stockroom_core::{NewUser, ProfileUpdate, UserSummary, ValidationError};
use tracing::info;

use super::ApiJson;
use crate::error::ApiError;
use crate::AppState;

/// `POST /login` body. `identifier` is a username or an email.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default, alias = "username", alias = "email")]
    pub identifier: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// `PATCH /login/profile` body. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    #[serde(default, alias = "userId", alias = "user_id")]
    pub id: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub user: UserSummary,
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .db
        .users()
        .authenticate(&req.identifier, &req.password)
        .await?;

    info!(user_id = %user.id, "User logged in");
    Ok(Json(AuthResponse {
        message: "Login sukses",
        user,
    }))
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let user = state
        .db
        .users()
        .register(NewUser {
            username: req.username,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "Registrasi berhasil",
            user,
        }),
    ))
}

pub async fn update_profile(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ProfileRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let id = req.id.trim();
    if id.is_empty() {
        return Err(ValidationError::required("id").into());
    }

    let user = state
        .db
        .users()
        .update_profile(
            id,
            ProfileUpdate {
                username: req.username,
                email: req.email,
                password: req.password,
            },
        )
        .await?;

    Ok(Json(AuthResponse {
        message: "Profil diperbarui",
        user,
    }))
}
