//! Handles GET /api/metadata - editable property descriptions for admin UIs

use axum::{extract::State, response::Json as ResponseJson};

use crate::{admin::AdminMetadata, http::context::AppState};

pub async fn get_metadata_handler(State(state): State<AppState>) -> ResponseJson<AdminMetadata> {
    ResponseJson(state.manager.get_metadata())
}
