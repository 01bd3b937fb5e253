//! Handles /api/scopes - scope listing, lifecycle, properties, claims and secrets

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::Json as ResponseJson,
};

use super::handler_clients::{ListParams, PropertyRequest};
use super::utils_outcome::{Rejection, respond, respond_created, respond_empty};
use crate::{
    admin::{CreateResult, NewScopeClaim, NewSecret, PropertyValue, QueryResult, ScopeDetail, ScopeSummary},
    http::context::AppState,
};

pub async fn list_scopes_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<ResponseJson<QueryResult<ScopeSummary>>, Rejection> {
    let outcome = state
        .manager
        .scopes()
        .query_scopes(params.filter.as_deref(), params.start(), params.count())
        .await;
    respond(outcome)
}

pub async fn create_scope_handler(
    State(state): State<AppState>,
    Json(properties): Json<Vec<PropertyValue>>,
) -> Result<(StatusCode, ResponseJson<CreateResult>), Rejection> {
    respond_created(state.manager.scopes().create_scope(&properties).await)
}

pub async fn get_scope_handler(
    State(state): State<AppState>,
    Path(subject): Path<String>,
) -> Result<ResponseJson<ScopeDetail>, Rejection> {
    respond(state.manager.scopes().get_scope(&subject).await)
}

pub async fn delete_scope_handler(
    State(state): State<AppState>,
    Path(subject): Path<String>,
) -> Result<StatusCode, Rejection> {
    respond_empty(state.manager.scopes().delete_scope(&subject).await)
}

pub async fn set_scope_property_handler(
    State(state): State<AppState>,
    Path((subject, name)): Path<(String, String)>,
    Json(request): Json<PropertyRequest>,
) -> Result<StatusCode, Rejection> {
    let outcome = state
        .manager
        .scopes()
        .set_scope_property(&subject, &name, &request.value)
        .await;
    respond_empty(outcome)
}

pub async fn add_scope_claim_handler(
    State(state): State<AppState>,
    Path(subject): Path<String>,
    Json(claim): Json<NewScopeClaim>,
) -> Result<StatusCode, Rejection> {
    respond_empty(state.manager.scopes().add_scope_claim(&subject, &claim).await)
}

pub async fn update_scope_claim_handler(
    State(state): State<AppState>,
    Path((subject, id)): Path<(String, String)>,
    Json(claim): Json<NewScopeClaim>,
) -> Result<StatusCode, Rejection> {
    let outcome = state
        .manager
        .scopes()
        .update_scope_claim(&subject, &id, &claim)
        .await;
    respond_empty(outcome)
}

pub async fn remove_scope_claim_handler(
    State(state): State<AppState>,
    Path((subject, id)): Path<(String, String)>,
) -> Result<StatusCode, Rejection> {
    respond_empty(state.manager.scopes().remove_scope_claim(&subject, &id).await)
}

pub async fn add_scope_secret_handler(
    State(state): State<AppState>,
    Path(subject): Path<String>,
    Json(secret): Json<NewSecret>,
) -> Result<StatusCode, Rejection> {
    respond_empty(state.manager.scopes().add_scope_secret(&subject, &secret).await)
}

pub async fn update_scope_secret_handler(
    State(state): State<AppState>,
    Path((subject, id)): Path<(String, String)>,
    Json(secret): Json<NewSecret>,
) -> Result<StatusCode, Rejection> {
    let outcome = state
        .manager
        .scopes()
        .update_scope_secret(&subject, &id, &secret)
        .await;
    respond_empty(outcome)
}

pub async fn remove_scope_secret_handler(
    State(state): State<AppState>,
    Path((subject, id)): Path<(String, String)>,
) -> Result<StatusCode, Rejection> {
    respond_empty(state.manager.scopes().remove_scope_secret(&subject, &id).await)
}
