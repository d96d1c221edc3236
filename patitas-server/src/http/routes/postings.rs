//! Posting endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use patitas_core::PostingStatus;

use crate::db::{NewPosting, PetRepo, Posting, PostingRepo, UserRepo};
use crate::http::error::ApiError;
use crate::models::{Coordinates, ValidationError};
use crate::state::AppState;

use super::{max_len, parse_date, positive_id};

/// Maximum length for posting descriptions
const MAX_DESCRIPTION_LEN: usize = 2000;

/// Posting create/update request
#[derive(Deserialize, Default)]
pub struct PostingPayload {
    pub date: Option<String>,
    pub close_date: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub pet_id: Option<i64>,
    pub user_id: Option<i64>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// List filter
#[derive(Deserialize, Default)]
pub struct ListParams {
    pub status: Option<String>,
}

/// Posting response
#[derive(Serialize)]
pub struct PostingResponse {
    pub id: i64,
    pub date: chrono::NaiveDate,
    pub close_date: Option<chrono::NaiveDate>,
    pub description: Option<String>,
    pub status: PostingStatus,
    pub pet_id: i64,
    pub user_id: i64,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub created_at: String,
}

impl From<Posting> for PostingResponse {
    fn from(p: Posting) -> Self {
        Self {
            id: p.id,
            status: p.status(),
            date: p.date,
            close_date: p.close_date,
            description: p.description,
            pet_id: p.pet_id,
            user_id: p.user_id,
            lat: p.lat,
            lng: p.lng,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

/// Validate a payload into repo fields; both parents must exist.
async fn validate_payload(
    state: &AppState,
    payload: PostingPayload,
) -> Result<NewPosting, ApiError> {
    let date = payload
        .date
        .as_deref()
        .map(|raw| parse_date("date", raw))
        .transpose()?;
    let close_date = payload
        .close_date
        .as_deref()
        .map(|raw| parse_date("close_date", raw))
        .transpose()?;

    let description = max_len("description", payload.description, MAX_DESCRIPTION_LEN)?;

    let status = payload
        .status
        .as_deref()
        .map(|raw| raw.parse::<PostingStatus>().map_err(ValidationError::from))
        .transpose()?;

    let pet_id = positive_id(
        "pet_id",
        payload.pet_id.ok_or(ValidationError::Missing { field: "pet_id" })?,
    )?;
    if !PetRepo::new(&state.pool).exists(pet_id).await? {
        return Err(ApiError::BadReference {
            resource: "pet",
            id: pet_id,
        });
    }

    let user_id = positive_id(
        "user_id",
        payload
            .user_id
            .ok_or(ValidationError::Missing { field: "user_id" })?,
    )?;
    if !UserRepo::new(&state.pool).exists(user_id).await? {
        return Err(ApiError::BadReference {
            resource: "user",
            id: user_id,
        });
    }

    // Coordinates travel together and must be in range
    let (lat, lng) = match (payload.lat, payload.lng) {
        (None, None) => (None, None),
        (Some(lat), Some(lng)) => {
            let coords = Coordinates::new(lat, lng)?;
            (Some(coords.lat()), Some(coords.lng()))
        }
        _ => {
            return Err(ApiError::Validation(ValidationError::Missing {
                field: "lat/lng",
            }))
        }
    };

    Ok(NewPosting {
        date,
        close_date,
        description,
        status,
        pet_id,
        user_id,
        lat,
        lng,
    })
}

/// POST /api/publicaciones
async fn create_posting(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PostingPayload>,
) -> Result<(StatusCode, Json<PostingResponse>), ApiError> {
    let new = validate_payload(&state, payload).await?;
    let posting = PostingRepo::new(&state.pool).create(new).await?;
    tracing::info!(posting_id = posting.id, "posting created");
    Ok((StatusCode::CREATED, Json(posting.into())))
}

/// PUT /api/publicaciones/{id}
async fn update_posting(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<PostingPayload>,
) -> Result<Json<PostingResponse>, ApiError> {
    let id = positive_id("posting id", id)?;
    let new = validate_payload(&state, payload).await?;
    let posting = PostingRepo::new(&state.pool).update(id, new).await?;
    Ok(Json(posting.into()))
}

/// GET /api/publicaciones?status=active
async fn list_postings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<PostingResponse>>, ApiError> {
    let status = params
        .status
        .as_deref()
        .map(|raw| raw.parse::<PostingStatus>().map_err(ValidationError::from))
        .transpose()?;

    let postings = PostingRepo::new(&state.pool).list(status).await?;
    Ok(Json(postings.into_iter().map(PostingResponse::from).collect()))
}

/// GET /api/publicaciones/{id}
async fn get_posting(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<PostingResponse>, ApiError> {
    let id = positive_id("posting id", id)?;
    let posting = PostingRepo::new(&state.pool).get(id).await?;
    Ok(Json(posting.into()))
}

/// DELETE /api/publicaciones/{id}
async fn delete_posting(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let id = positive_id("posting id", id)?;
    PostingRepo::new(&state.pool).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Posting routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/publicaciones", post(create_posting).get(list_postings))
        .route(
            "/api/publicaciones/{id}",
            get(get_posting).put(update_posting).delete(delete_posting),
        )
}
