// src/handlers/blog.rs
// Los dos blogs (seguridad y jurídico) comparten handlers; `{kind}` elige la tabla.
// `{post}` es el slug en la ruta pública y el ID en las rutas del panel.

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
    middleware::auth::AuthenticatedUser,
    models::{
        blog::{BlogKind, BlogPost, CreatePostPayload, PostFilter, UpdatePostPayload},
        cases::ArchivePayload,
    },
};

// GET /api/blog/{kind}/posts?category= (público)
#[utoipa::path(
    get,
    path = "/api/blog/{kind}/posts",
    tag = "Blog",
    params(
        ("kind" = BlogKind, Path, description = "security | legal"),
        ("category" = Option<String>, Query, description = "Filtra por categoría")
    ),
    responses((status = 200, description = "Publicaciones visibles", body = Vec<BlogPost>))
)]
pub async fn list_posts(
    State(app_state): State<AppState>,
    Path(kind): Path<BlogKind>,
    Query(filter): Query<PostFilter>,
) -> Result<Json<Vec<BlogPost>>, AppError> {
    let posts = app_state
        .blog_service
        .list_published(kind, filter.category.as_deref())
        .await?;
    Ok(Json(posts))
}

// GET /api/blog/{kind}/posts/{post} (público)
#[utoipa::path(
    get,
    path = "/api/blog/{kind}/posts/{post}",
    tag = "Blog",
    params(
        ("kind" = BlogKind, Path, description = "security | legal"),
        ("post" = String, Path, description = "Slug de la publicación")
    ),
    responses(
        (status = 200, description = "Publicación", body = BlogPost),
        (status = 404, description = "No existe o está archivada")
    )
)]
pub async fn get_post(
    State(app_state): State<AppState>,
    Path((kind, slug)): Path<(BlogKind, String)>,
) -> Result<Json<BlogPost>, AppError> {
    let post = app_state.blog_service.get_by_slug(kind, &slug).await?;
    Ok(Json(post))
}

// GET /api/blog/{kind}/admin/posts
#[utoipa::path(
    get,
    path = "/api/blog/{kind}/admin/posts",
    tag = "Blog",
    params(("kind" = BlogKind, Path, description = "security | legal")),
    responses((status = 200, description = "Todas las publicaciones, incluidas archivadas", body = Vec<BlogPost>)),
    security(("api_jwt" = []))
)]
pub async fn admin_list_posts(
    State(app_state): State<AppState>,
    Path(kind): Path<BlogKind>,
) -> Result<Json<Vec<BlogPost>>, AppError> {
    let posts = app_state.blog_service.list_all(kind).await?;
    Ok(Json(posts))
}

// POST /api/blog/{kind}/posts
#[utoipa::path(
    post,
    path = "/api/blog/{kind}/posts",
    tag = "Blog",
    request_body = CreatePostPayload,
    params(("kind" = BlogKind, Path, description = "security | legal")),
    responses(
        (status = 201, description = "Publicación creada", body = BlogPost),
        (status = 400, description = "Datos inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_post(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(kind): Path<BlogKind>,
    Json(payload): Json<CreatePostPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let post = app_state.blog_service.create(kind, &payload, user.id).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

// PUT /api/blog/{kind}/posts/{post}
#[utoipa::path(
    put,
    path = "/api/blog/{kind}/posts/{post}",
    tag = "Blog",
    request_body = UpdatePostPayload,
    params(
        ("kind" = BlogKind, Path, description = "security | legal"),
        ("post" = Uuid, Path, description = "ID de la publicación")
    ),
    responses(
        (status = 200, description = "Publicación actualizada", body = BlogPost),
        (status = 404, description = "No existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_post(
    State(app_state): State<AppState>,
    Path((kind, id)): Path<(BlogKind, Uuid)>,
    Json(payload): Json<UpdatePostPayload>,
) -> Result<Json<BlogPost>, AppError> {
    payload.validate()?;

    let post = app_state.blog_service.update(kind, id, &payload).await?;
    Ok(Json(post))
}

// POST /api/blog/{kind}/posts/{post}/archive
#[utoipa::path(
    post,
    path = "/api/blog/{kind}/posts/{post}/archive",
    tag = "Blog",
    request_body = ArchivePayload,
    params(
        ("kind" = BlogKind, Path, description = "security | legal"),
        ("post" = Uuid, Path, description = "ID de la publicación")
    ),
    responses((status = 200, description = "Publicación archivada o restaurada", body = BlogPost)),
    security(("api_jwt" = []))
)]
pub async fn archive_post(
    State(app_state): State<AppState>,
    Path((kind, id)): Path<(BlogKind, Uuid)>,
    Json(payload): Json<ArchivePayload>,
) -> Result<Json<BlogPost>, AppError> {
    let post = app_state.blog_service.set_archived(kind, id, payload.archived).await?;
    Ok(Json(post))
}

// DELETE /api/blog/{kind}/posts/{post}
#[utoipa::path(
    delete,
    path = "/api/blog/{kind}/posts/{post}",
    tag = "Blog",
    params(
        ("kind" = BlogKind, Path, description = "security | legal"),
        ("post" = Uuid, Path, description = "ID de la publicación")
    ),
    responses(
        (status = 204, description = "Publicación eliminada"),
        (status = 404, description = "No existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_post(
    State(app_state): State<AppState>,
    Path((kind, id)): Path<(BlogKind, Uuid)>,
) -> Result<StatusCode, AppError> {
    app_state.blog_service.delete(kind, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
