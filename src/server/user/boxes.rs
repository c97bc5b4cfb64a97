use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::dto::{CreateBoxRequest, UpdateBoxRequest};
use crate::server::response::{ApiError, ApiResponse};
use crate::service::BoxPatch;

pub async fn list_boxes(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(repo_id): Path<i64>,
) -> impl IntoResponse {
    let boxes = state.services.boxes.list_boxes(&auth.user, repo_id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(boxes)))
}

pub async fn create_box(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(repo_id): Path<i64>,
    Json(req): Json<CreateBoxRequest>,
) -> impl IntoResponse {
    let repo_box =
        state
            .services
            .boxes
            .create_box(&auth.user, repo_id, &req.name, &req.description)?;
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(repo_box))))
}

pub async fn get_box(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let repo_box = state.services.boxes.get_box(&auth.user, id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(repo_box)))
}

pub async fn update_box(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateBoxRequest>,
) -> impl IntoResponse {
    let patch = BoxPatch {
        name: req.name,
        description: req.description,
    };
    let repo_box = state.services.boxes.update_box(&auth.user, id, patch)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(repo_box)))
}

pub async fn delete_box(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    state.services.boxes.delete_box(&auth.user, id).await?;
    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
