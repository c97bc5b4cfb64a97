mod accounts;
mod boxes;
mod media;
mod repos;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::server::AppState;
use crate::service::MAX_MEDIA_SIZE_BYTES;

/// Request body cap on upload routes: the media limit plus multipart framing.
pub const UPLOAD_BODY_LIMIT: usize = MAX_MEDIA_SIZE_BYTES as usize + 1024 * 1024;

pub fn user_router() -> Router<Arc<AppState>> {
    let uploads = Router::new()
        .route(
            "/boxes/{id}/media",
            get(media::list_media).post(media::upload_media),
        )
        .route(
            "/media/{id}",
            get(media::get_media)
                .put(media::update_media)
                .delete(media::delete_media),
        )
        .route("/media/{id}/content", get(media::download_media))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT));

    Router::new()
        // Account routes
        .route(
            "/accounts",
            get(accounts::list_accounts).post(accounts::create_account),
        )
        .route("/accounts/current", get(accounts::current_account))
        // Repo routes
        .route("/repos", get(repos::list_repos).post(repos::create_repo))
        .route(
            "/repos/{id}",
            get(repos::get_repo)
                .patch(repos::update_repo)
                .delete(repos::delete_repo),
        )
        .route(
            "/repos/{id}/access",
            get(repos::list_access).post(repos::grant_access),
        )
        // Box routes
        .route(
            "/repos/{id}/boxes",
            get(boxes::list_boxes).post(boxes::create_box),
        )
        .route(
            "/boxes/{id}",
            get(boxes::get_box)
                .patch(boxes::update_box)
                .delete(boxes::delete_box),
        )
        .merge(uploads)
}
