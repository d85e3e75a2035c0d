use axum::{extract::DefaultBodyLimit, routing::get, routing::post, Router};
use std::sync::Arc;

use crate::features::files::handlers::{
    delete_file, get_file, list_files, update_file, upload_file,
};
use crate::features::files::services::FileService;
use crate::shared::constants::MULTIPART_OVERHEAD;

/// Create routes for the files feature.
///
/// Expects the identity middleware to run in front; handlers that need a caller
/// reject anonymous requests themselves.
pub fn routes(file_service: Arc<FileService>) -> Router {
    let body_limit = file_service.max_upload_size() + MULTIPART_OVERHEAD;

    Router::new()
        .route(
            "/api/files",
            post(upload_file)
                .layer(DefaultBodyLimit::max(body_limit))
                .get(list_files),
        )
        .route(
            "/api/files/{id}",
            get(get_file).patch(update_file).delete(delete_file),
        )
        .with_state(file_service)
}
