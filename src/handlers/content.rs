// src/handlers/content.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::content::{
        CreateGalleryImagePayload, CreateServiceCardPayload, GalleryImage, ServiceCard,
        ServiceCardFilter,
    },
};

// GET /api/content/services?page= (público)
#[utoipa::path(
    get,
    path = "/api/content/services",
    tag = "Content",
    params(("page" = Option<String>, Query, description = "Página del sitio, p. ej. seguridad")),
    responses((status = 200, description = "Tarjetas de servicio en orden", body = Vec<ServiceCard>))
)]
pub async fn list_service_cards(
    State(app_state): State<AppState>,
    Query(filter): Query<ServiceCardFilter>,
) -> Result<Json<Vec<ServiceCard>>, AppError> {
    let cards = app_state.content_service.service_cards(filter.page.as_deref()).await?;
    Ok(Json(cards))
}

// POST /api/content/services
#[utoipa::path(
    post,
    path = "/api/content/services",
    tag = "Content",
    request_body = CreateServiceCardPayload,
    responses((status = 201, description = "Tarjeta creada", body = ServiceCard)),
    security(("api_jwt" = []))
)]
pub async fn create_service_card(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateServiceCardPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let card = app_state.content_service.create_service_card(&payload).await?;
    Ok((StatusCode::CREATED, Json(card)))
}

// DELETE /api/content/services/{id}
#[utoipa::path(
    delete,
    path = "/api/content/services/{id}",
    tag = "Content",
    params(("id" = Uuid, Path, description = "ID de la tarjeta")),
    responses(
        (status = 204, description = "Tarjeta e imagen eliminadas"),
        (status = 404, description = "No existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_service_card(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.content_service.delete_service_card(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/content/galleries/{gallery} (público)
#[utoipa::path(
    get,
    path = "/api/content/galleries/{gallery}",
    tag = "Content",
    params(("gallery" = String, Path, description = "Nombre de la galería, p. ej. capacitaciones")),
    responses((status = 200, description = "Imágenes en orden", body = Vec<GalleryImage>))
)]
pub async fn list_gallery(
    State(app_state): State<AppState>,
    Path(gallery): Path<String>,
) -> Result<Json<Vec<GalleryImage>>, AppError> {
    let images = app_state.content_service.gallery(&gallery).await?;
    Ok(Json(images))
}

// POST /api/content/galleries/{gallery}
#[utoipa::path(
    post,
    path = "/api/content/galleries/{gallery}",
    tag = "Content",
    request_body = CreateGalleryImagePayload,
    params(("gallery" = String, Path, description = "Nombre de la galería")),
    responses((status = 201, description = "Imagen agregada", body = GalleryImage)),
    security(("api_jwt" = []))
)]
pub async fn add_gallery_image(
    State(app_state): State<AppState>,
    Path(gallery): Path<String>,
    Json(payload): Json<CreateGalleryImagePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let image = app_state.content_service.add_gallery_image(&gallery, &payload).await?;
    Ok((StatusCode::CREATED, Json(image)))
}

// DELETE /api/content/galleries/{gallery}/{id}
#[utoipa::path(
    delete,
    path = "/api/content/galleries/{gallery}/{id}",
    tag = "Content",
    params(
        ("gallery" = String, Path, description = "Nombre de la galería"),
        ("id" = Uuid, Path, description = "ID de la imagen")
    ),
    responses(
        (status = 204, description = "Imagen eliminada"),
        (status = 404, description = "No existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_gallery_image(
    State(app_state): State<AppState>,
    Path((gallery, id)): Path<(String, Uuid)>,
) -> Result<StatusCode, AppError> {
    app_state.content_service.delete_gallery_image(&gallery, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
