//! User endpoints: registration, login, profile, ranking, badges
//!
//! Registration and login are the only open write endpoints; both answer
//! with a bearer token plus the user so clients can store a session in one
//! round trip.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use patitas_core::Role;

use crate::db::{Badge, NewUser, User, UserChanges, UserRepo};
use crate::http::error::ApiError;
use crate::models::{Email, Password, ValidationError};
use crate::state::AppState;

use super::{positive_id, required};

/// Registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
}

/// Login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Profile update request; absent fields are left unchanged
#[derive(Deserialize, Default)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub active: Option<bool>,
}

/// Password change request
#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// User response; never carries the password hash
#[derive(Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub neighborhood: String,
    pub city: String,
    pub active: bool,
    pub points: i32,
    pub role: Role,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            phone: u.phone,
            neighborhood: u.neighborhood,
            city: u.city,
            active: u.active,
            points: u.points,
            role: u.role.parse().unwrap_or_default(),
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// Login/registration response
#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Badge response
#[derive(Serialize)]
pub struct BadgeResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub threshold: i32,
}

impl From<Badge> for BadgeResponse {
    fn from(b: Badge) -> Self {
        Self {
            id: b.id,
            name: b.name,
            description: b.description,
            threshold: b.threshold,
        }
    }
}

/// POST /api/usuarios/registro
async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let first_name = required("first_name", req.first_name.as_deref())?;
    let last_name = required("last_name", req.last_name.as_deref())?;
    let phone = required("phone", req.phone.as_deref())?;
    let neighborhood = required("neighborhood", req.neighborhood.as_deref())?;
    let city = required("city", req.city.as_deref())?;
    let email = Email::new(req.email.as_deref().unwrap_or_default())?;
    let password = Password::new(req.password.as_deref().unwrap_or_default())?;

    let repo = UserRepo::new(&state.pool);

    // Friendlier error than the constraint violation; the unique index is
    // still the backstop under concurrent registration.
    if repo.find_by_email(email.as_str()).await?.is_some() {
        return Err(ApiError::Conflict {
            message: "email is already registered".into(),
        });
    }

    let password_hash = bcrypt::hash(password.as_str(), bcrypt::DEFAULT_COST)?;

    let user = repo
        .create(NewUser {
            first_name,
            last_name,
            email: email.into_string(),
            password_hash,
            phone,
            neighborhood,
            city,
        })
        .await?;

    let token = state
        .tokens
        .issue(user.id, &user.email)
        .map_err(|e| ApiError::Internal {
            message: format!("failed to issue token: {}", e),
        })?;

    tracing::info!(user_id = user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// POST /api/usuarios/login
async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = Email::new(req.email.as_deref().unwrap_or_default())
        .map_err(|_| ApiError::unauthorized("invalid credentials"))?;
    let password = req
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::unauthorized("invalid credentials"))?;

    let user = UserRepo::new(&state.pool)
        .find_by_email(email.as_str())
        .await?
        .ok_or_else(|| ApiError::unauthorized("invalid credentials"))?;

    if !bcrypt::verify(&password, &user.password_hash)? {
        return Err(ApiError::unauthorized("invalid credentials"));
    }

    if !user.active {
        return Err(ApiError::unauthorized("user is inactive"));
    }

    let token = state
        .tokens
        .issue(user.id, &user.email)
        .map_err(|e| ApiError::Internal {
            message: format!("failed to issue token: {}", e),
        })?;

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// GET /api/usuarios
async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = UserRepo::new(&state.pool).list().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /api/usuarios/ranking - users by points, highest first
async fn ranking(State(state): State<Arc<AppState>>) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = UserRepo::new(&state.pool).ranking().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /api/usuarios/{id}
async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = positive_id("user id", id)?;
    let user = UserRepo::new(&state.pool).get(id).await?;
    Ok(Json(user.into()))
}

/// PUT /api/usuarios/{id}
async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = positive_id("user id", id)?;
    let repo = UserRepo::new(&state.pool);

    let email = match req.email.as_deref() {
        Some(raw) if !raw.trim().is_empty() => {
            let email = Email::new(raw)?;
            if repo.email_taken_by_other(email.as_str(), id).await? {
                return Err(ApiError::Conflict {
                    message: "email is already registered by another user".into(),
                });
            }
            Some(email.into_string())
        }
        _ => None,
    };

    let password_hash = match req.password.as_deref() {
        Some(raw) => {
            let password = Password::new(raw)?;
            Some(bcrypt::hash(password.as_str(), bcrypt::DEFAULT_COST)?)
        }
        None => None,
    };

    let user = repo
        .update(
            id,
            UserChanges {
                first_name: req.first_name,
                last_name: req.last_name,
                email,
                password_hash,
                phone: req.phone,
                neighborhood: req.neighborhood,
                city: req.city,
                active: req.active,
            },
        )
        .await?;

    Ok(Json(user.into()))
}

/// PUT /api/usuarios/{id}/cambiar-password
async fn change_password(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = positive_id("user id", id)?;

    let current = req
        .current_password
        .filter(|p| !p.trim().is_empty())
        .ok_or(ValidationError::Missing {
            field: "current_password",
        })?;
    let new_password = Password::new(req.new_password.as_deref().unwrap_or_default()).map_err(
        |_| ValidationError::TooShort {
            field: "new_password",
            min: 6,
        },
    )?;

    let repo = UserRepo::new(&state.pool);
    let user = repo.get(id).await?;

    if !bcrypt::verify(&current, &user.password_hash)? {
        return Err(ApiError::unauthorized("current password is incorrect"));
    }

    let password_hash = bcrypt::hash(new_password.as_str(), bcrypt::DEFAULT_COST)?;
    repo.set_password(id, &password_hash).await?;

    Ok(Json(serde_json::json!({ "message": "password updated" })))
}

/// GET /api/usuarios/{id}/badges
async fn user_badges(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<BadgeResponse>>, ApiError> {
    let id = positive_id("user id", id)?;
    let repo = UserRepo::new(&state.pool);
    // 404 for unknown users rather than an empty list
    repo.get(id).await?;
    let badges = repo.badges(id).await?;
    Ok(Json(badges.into_iter().map(BadgeResponse::from).collect()))
}

/// DELETE /api/usuarios/{id}
async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let id = positive_id("user id", id)?;
    UserRepo::new(&state.pool).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// User routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/usuarios/registro", post(register))
        .route("/api/usuarios/login", post(login))
        .route("/api/usuarios", get(list_users))
        .route("/api/usuarios/ranking", get(ranking))
        .route(
            "/api/usuarios/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/api/usuarios/{id}/cambiar-password", put(change_password))
        .route("/api/usuarios/{id}/badges", get(user_badges))
}
