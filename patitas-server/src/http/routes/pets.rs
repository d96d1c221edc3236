//! Pet endpoints
//!
//! Create and update accept either a JSON body or multipart form data with a
//! `mascota` JSON part plus an optional `imagen` file, mirroring how clients
//! upload a photo together with the record.

use std::sync::Arc;

use axum::{
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{header, StatusCode},
    routing::{get, patch, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use patitas_core::PetStatus;

use crate::db::{NewPet, Pet, PetRepo, UserRepo};
use crate::http::auth::MaybeAuthUser;
use crate::http::error::ApiError;
use crate::models::ValidationError;
use crate::state::AppState;

use super::{max_len, parse_date, positive_id, required};

/// Maximum length for pet descriptions
const MAX_DESCRIPTION_LEN: usize = 1000;

/// Pet document, shared between the JSON body and the multipart `mascota` part
#[derive(Deserialize, Default)]
pub struct PetPayload {
    pub name: Option<String>,
    pub species: Option<String>,
    pub breed: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub description: Option<String>,
    pub birth_date: Option<String>,
    pub status: Option<String>,
    pub owner_id: Option<i64>,
    pub photo_url: Option<String>,
}

/// Pet response
#[derive(Serialize)]
pub struct PetResponse {
    pub id: i64,
    pub name: String,
    pub species: Option<String>,
    pub breed: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub description: Option<String>,
    pub birth_date: Option<chrono::NaiveDate>,
    pub photo_url: Option<String>,
    pub status: Option<PetStatus>,
    pub owner_id: Option<i64>,
    /// Whether the pet belongs to the authenticated caller
    pub is_mine: bool,
    pub created_at: String,
}

impl PetResponse {
    fn new(pet: Pet, viewer: Option<i64>) -> Self {
        let is_mine = matches!((viewer, pet.owner_id), (Some(v), Some(o)) if v == o);
        Self {
            id: pet.id,
            is_mine,
            status: pet.status(),
            name: pet.name,
            species: pet.species,
            breed: pet.breed,
            color: pet.color,
            size: pet.size,
            description: pet.description,
            birth_date: pet.birth_date,
            photo_url: pet.photo_url,
            owner_id: pet.owner_id,
            created_at: pet.created_at.to_rfc3339(),
        }
    }
}

/// Status change body for PATCH /{id}/estado
#[derive(Deserialize)]
pub struct StatusBody {
    pub status: Option<String>,
}

/// Uploaded image: (original filename, content type, bytes)
type UploadedImage = (String, String, Vec<u8>);

/// Validate a payload into repo fields; checks the owner exists when given.
async fn validate_payload(state: &AppState, payload: PetPayload) -> Result<NewPet, ApiError> {
    let name = required("name", payload.name.as_deref())?;
    let description = max_len("description", payload.description, MAX_DESCRIPTION_LEN)?;

    let birth_date = payload
        .birth_date
        .as_deref()
        .map(|raw| parse_date("birth_date", raw))
        .transpose()?;

    let status = payload
        .status
        .as_deref()
        .map(|raw| raw.parse::<PetStatus>().map_err(ValidationError::from))
        .transpose()?;

    let owner_id = match payload.owner_id {
        Some(id) => {
            let id = positive_id("owner_id", id)?;
            if !UserRepo::new(&state.pool).exists(id).await? {
                return Err(ApiError::BadReference {
                    resource: "user",
                    id,
                });
            }
            Some(id)
        }
        None => None,
    };

    Ok(NewPet {
        name,
        species: payload.species,
        breed: payload.breed,
        color: payload.color,
        size: payload.size,
        description,
        birth_date,
        photo_url: payload.photo_url.filter(|u| !u.trim().is_empty()),
        status,
        owner_id,
    })
}

/// Pull the pet document and optional image out of a request that may be
/// either JSON or multipart.
async fn extract_pet_body(
    state: &Arc<AppState>,
    req: Request,
) -> Result<(PetPayload, Option<UploadedImage>), ApiError> {
    let is_multipart = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("multipart/form-data"))
        .unwrap_or(false);

    if !is_multipart {
        let Json(payload) = Json::<PetPayload>::from_request(req, state)
            .await
            .map_err(|_| {
                ApiError::Validation(ValidationError::InvalidFormat {
                    field: "body",
                    reason: "invalid JSON body",
                })
            })?;
        return Ok((payload, None));
    }

    let multipart = Multipart::from_request(req, state).await.map_err(|_| {
        ApiError::Validation(ValidationError::InvalidFormat {
            field: "body",
            reason: "invalid multipart body",
        })
    })?;
    parse_multipart(multipart).await
}

async fn parse_multipart(
    mut multipart: Multipart,
) -> Result<(PetPayload, Option<UploadedImage>), ApiError> {
    let mut payload: Option<PetPayload> = None;
    let mut image: Option<UploadedImage> = None;

    while let Some(field) = multipart.next_field().await.map_err(|_| {
        ApiError::Validation(ValidationError::InvalidFormat {
            field: "body",
            reason: "invalid multipart body",
        })
    })? {
        match field.name() {
            Some("mascota") => {
                let text = field.text().await.map_err(|_| {
                    ApiError::Validation(ValidationError::InvalidFormat {
                        field: "mascota",
                        reason: "unreadable 'mascota' field",
                    })
                })?;
                payload = Some(serde_json::from_str(&text).map_err(|_| {
                    ApiError::Validation(ValidationError::InvalidFormat {
                        field: "mascota",
                        reason: "invalid JSON in 'mascota' field",
                    })
                })?);
            }
            Some("imagen") => {
                let filename = field.file_name().unwrap_or_default().to_owned();
                let content_type = field.content_type().unwrap_or_default().to_owned();
                let bytes = field.bytes().await.map_err(|_| {
                    ApiError::Validation(ValidationError::InvalidFormat {
                        field: "imagen",
                        reason: "unreadable 'imagen' field",
                    })
                })?;
                if !bytes.is_empty() {
                    image = Some((filename, content_type, bytes.to_vec()));
                }
            }
            _ => {}
        }
    }

    let payload = payload.ok_or(ValidationError::Missing { field: "mascota" })?;
    Ok((payload, image))
}

/// POST /api/mascotas - JSON or multipart with optional image
async fn create_pet(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    req: Request,
) -> Result<(StatusCode, Json<PetResponse>), ApiError> {
    let (payload, image) = extract_pet_body(&state, req).await?;
    let mut new = validate_payload(&state, payload).await?;

    if let Some((filename, content_type, bytes)) = image {
        let url = state
            .files
            .store_pet_image(&filename, &content_type, &bytes)
            .await?;
        new.photo_url = Some(url);
    }

    let pet = PetRepo::new(&state.pool).create(new).await?;
    tracing::info!(pet_id = pet.id, "pet created");

    Ok((StatusCode::CREATED, Json(PetResponse::new(pet, viewer))))
}

/// PUT /api/mascotas/{id} - JSON or multipart with optional replacement image
async fn update_pet(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(id): Path<i64>,
    req: Request,
) -> Result<Json<PetResponse>, ApiError> {
    let id = positive_id("pet id", id)?;

    let (payload, image) = extract_pet_body(&state, req).await?;
    let mut new = validate_payload(&state, payload).await?;

    if let Some((filename, content_type, bytes)) = image {
        let url = state
            .files
            .store_pet_image(&filename, &content_type, &bytes)
            .await?;
        new.photo_url = Some(url);
    }

    let pet = PetRepo::new(&state.pool).update(id, new).await?;
    Ok(Json(PetResponse::new(pet, viewer)))
}

/// PATCH /api/mascotas/{id}/estado
async fn change_status(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(id): Path<i64>,
    Json(body): Json<StatusBody>,
) -> Result<Json<PetResponse>, ApiError> {
    let id = positive_id("pet id", id)?;
    let status: PetStatus = body
        .status
        .as_deref()
        .ok_or(ValidationError::Missing { field: "status" })?
        .parse()
        .map_err(ValidationError::from)?;

    let pet = PetRepo::new(&state.pool).set_status(id, status).await?;
    Ok(Json(PetResponse::new(pet, viewer)))
}

/// GET /api/mascotas
async fn list_pets(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(viewer): MaybeAuthUser,
) -> Result<Json<Vec<PetResponse>>, ApiError> {
    let pets = PetRepo::new(&state.pool).list().await?;
    Ok(Json(
        pets.into_iter().map(|p| PetResponse::new(p, viewer)).collect(),
    ))
}

/// GET /api/mascotas/perdidas - pets still missing
async fn list_lost_pets(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(viewer): MaybeAuthUser,
) -> Result<Json<Vec<PetResponse>>, ApiError> {
    let pets = PetRepo::new(&state.pool).list_lost().await?;
    Ok(Json(
        pets.into_iter().map(|p| PetResponse::new(p, viewer)).collect(),
    ))
}

/// GET /api/mascotas/usuario/{usuarioId}
async fn list_pets_for_owner(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(owner_id): Path<i64>,
) -> Result<Json<Vec<PetResponse>>, ApiError> {
    let owner_id = positive_id("user id", owner_id)?;
    let pets = PetRepo::new(&state.pool).list_for_owner(owner_id).await?;
    Ok(Json(
        pets.into_iter().map(|p| PetResponse::new(p, viewer)).collect(),
    ))
}

/// GET /api/mascotas/{id}
async fn get_pet(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(id): Path<i64>,
) -> Result<Json<PetResponse>, ApiError> {
    let id = positive_id("pet id", id)?;
    let pet = PetRepo::new(&state.pool).get(id).await?;
    Ok(Json(PetResponse::new(pet, viewer)))
}

/// DELETE /api/mascotas/{id}
async fn delete_pet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let id = positive_id("pet id", id)?;
    PetRepo::new(&state.pool).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Pet routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/mascotas", post(create_pet).get(list_pets))
        .route("/api/mascotas/perdidas", get(list_lost_pets))
        .route("/api/mascotas/usuario/{usuarioId}", get(list_pets_for_owner))
        .route(
            "/api/mascotas/{id}",
            get(get_pet).put(update_pet).delete(delete_pet),
        )
        .route("/api/mascotas/{id}/estado", patch(change_status))
}
