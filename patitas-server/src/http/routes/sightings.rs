//! Sighting endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::{Location, NewLocation, NewSighting, PetRepo, Sighting, SightingRepo, UserRepo};
use crate::http::auth::AuthUser;
use crate::http::error::ApiError;
use crate::models::{Coordinates, ValidationError};
use crate::state::AppState;

use super::{max_len, parse_date, positive_id};

/// Maximum length for sighting comments
const MAX_COMMENT_LEN: usize = 1000;

/// Location document inside a sighting request
#[derive(Deserialize, Default)]
pub struct LocationPayload {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub neighborhood: Option<String>,
    pub address: Option<String>,
}

/// Sighting create request
#[derive(Deserialize, Default)]
pub struct SightingPayload {
    pub date: Option<String>,
    pub comment: Option<String>,
    pub pet_id: Option<i64>,
    /// Defaults to the authenticated caller when absent
    pub reporter_id: Option<i64>,
    pub location: Option<LocationPayload>,
}

/// Location response
#[derive(Serialize)]
pub struct LocationResponse {
    pub id: i64,
    pub lat: f64,
    pub lng: f64,
    pub neighborhood: Option<String>,
    pub address: Option<String>,
}

impl From<Location> for LocationResponse {
    fn from(l: Location) -> Self {
        Self {
            id: l.id,
            lat: l.lat,
            lng: l.lng,
            neighborhood: l.neighborhood,
            address: l.address,
        }
    }
}

/// Sighting response
#[derive(Serialize)]
pub struct SightingResponse {
    pub id: i64,
    pub date: chrono::NaiveDate,
    pub comment: Option<String>,
    pub pet_id: i64,
    pub reporter_id: i64,
    pub location: Option<LocationResponse>,
    pub created_at: String,
}

impl From<Sighting> for SightingResponse {
    fn from(s: Sighting) -> Self {
        Self {
            id: s.id,
            date: s.date,
            comment: s.comment,
            pet_id: s.pet_id,
            reporter_id: s.reporter_id,
            location: s.location.map(LocationResponse::from),
            created_at: s.created_at.to_rfc3339(),
        }
    }
}

/// POST /api/avistamientos
async fn create_sighting(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Json(payload): Json<SightingPayload>,
) -> Result<(StatusCode, Json<SightingResponse>), ApiError> {
    let date = payload
        .date
        .as_deref()
        .map(|raw| parse_date("date", raw))
        .transpose()?;

    let comment = max_len("comment", payload.comment, MAX_COMMENT_LEN)?;

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

    let reporter_id = positive_id("reporter_id", payload.reporter_id.unwrap_or(caller))?;
    if !UserRepo::new(&state.pool).exists(reporter_id).await? {
        return Err(ApiError::BadReference {
            resource: "user",
            id: reporter_id,
        });
    }

    let location = match payload.location {
        Some(loc) => {
            let lat = loc.lat.ok_or(ValidationError::Missing { field: "location.lat" })?;
            let lng = loc.lng.ok_or(ValidationError::Missing { field: "location.lng" })?;
            let coords = Coordinates::new(lat, lng)?;
            Some(NewLocation {
                lat: coords.lat(),
                lng: coords.lng(),
                neighborhood: loc.neighborhood,
                address: loc.address,
            })
        }
        None => None,
    };

    let sighting = SightingRepo::new(&state.pool)
        .create(NewSighting {
            date,
            comment,
            pet_id,
            reporter_id,
            location,
        })
        .await?;

    tracing::info!(
        sighting_id = sighting.id,
        pet_id,
        reporter_id,
        "sighting reported"
    );

    Ok((StatusCode::CREATED, Json(sighting.into())))
}

/// GET /api/avistamientos
async fn list_sightings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SightingResponse>>, ApiError> {
    let sightings = SightingRepo::new(&state.pool).list().await?;
    Ok(Json(sightings.into_iter().map(SightingResponse::from).collect()))
}

/// GET /api/avistamientos/{id}
async fn get_sighting(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SightingResponse>, ApiError> {
    let id = positive_id("sighting id", id)?;
    let sighting = SightingRepo::new(&state.pool).get(id).await?;
    Ok(Json(sighting.into()))
}

/// GET /api/avistamientos/mascota/{mascotaId}
async fn list_for_pet(
    State(state): State<Arc<AppState>>,
    Path(pet_id): Path<i64>,
) -> Result<Json<Vec<SightingResponse>>, ApiError> {
    let pet_id = positive_id("pet id", pet_id)?;
    let sightings = SightingRepo::new(&state.pool).list_for_pet(pet_id).await?;
    Ok(Json(sightings.into_iter().map(SightingResponse::from).collect()))
}

/// GET /api/avistamientos/usuario/{usuarioId}
async fn list_for_reporter(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<SightingResponse>>, ApiError> {
    let user_id = positive_id("user id", user_id)?;
    let sightings = SightingRepo::new(&state.pool)
        .list_for_reporter(user_id)
        .await?;
    Ok(Json(sightings.into_iter().map(SightingResponse::from).collect()))
}

/// DELETE /api/avistamientos/{id}
async fn delete_sighting(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let id = positive_id("sighting id", id)?;
    SightingRepo::new(&state.pool).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Sighting routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/avistamientos",
            post(create_sighting).get(list_sightings),
        )
        .route("/api/avistamientos/mascota/{mascotaId}", get(list_for_pet))
        .route(
            "/api/avistamientos/usuario/{usuarioId}",
            get(list_for_reporter),
        )
        .route(
            "/api/avistamientos/{id}",
            get(get_sighting).delete(delete_sighting),
        )
}
