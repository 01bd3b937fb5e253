//! Handles /api/clients - client listing, lifecycle, properties and child collections

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::Json as ResponseJson,
};
use serde::Deserialize;

use super::utils_outcome::{Rejection, respond, respond_created, respond_empty};
use crate::{
    admin::{
        ClientDetail, ClientSummary, CreateResult, NewClientClaim, NewSecret, PropertyValue,
        QueryResult,
    },
    errors::HttpError,
    http::context::AppState,
};

const DEFAULT_PAGE_SIZE: usize = 100;

/// Paging and filter parameters shared by the list endpoints
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub filter: Option<String>,
    pub start: Option<usize>,
    pub count: Option<usize>,
}

impl ListParams {
    pub fn start(&self) -> usize {
        self.start.unwrap_or(0)
    }

    pub fn count(&self) -> usize {
        self.count.unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

/// Body of a property update
#[derive(Debug, Deserialize)]
pub struct PropertyRequest {
    pub value: String,
}

/// Body of an add to a single-value child collection
#[derive(Debug, Deserialize)]
pub struct ChildValueRequest {
    pub value: String,
}

pub async fn list_clients_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<ResponseJson<QueryResult<ClientSummary>>, Rejection> {
    let outcome = state
        .manager
        .clients()
        .query_clients(params.filter.as_deref(), params.start(), params.count())
        .await;
    respond(outcome)
}

pub async fn create_client_handler(
    State(state): State<AppState>,
    Json(properties): Json<Vec<PropertyValue>>,
) -> Result<(StatusCode, ResponseJson<CreateResult>), Rejection> {
    respond_created(state.manager.clients().create_client(&properties).await)
}

pub async fn get_client_handler(
    State(state): State<AppState>,
    Path(subject): Path<String>,
) -> Result<ResponseJson<ClientDetail>, Rejection> {
    respond(state.manager.clients().get_client(&subject).await)
}

pub async fn delete_client_handler(
    State(state): State<AppState>,
    Path(subject): Path<String>,
) -> Result<StatusCode, Rejection> {
    respond_empty(state.manager.clients().delete_client(&subject).await)
}

pub async fn set_client_property_handler(
    State(state): State<AppState>,
    Path((subject, name)): Path<(String, String)>,
    Json(request): Json<PropertyRequest>,
) -> Result<StatusCode, Rejection> {
    let outcome = state
        .manager
        .clients()
        .set_client_property(&subject, &name, &request.value)
        .await;
    respond_empty(outcome)
}

pub async fn add_client_claim_handler(
    State(state): State<AppState>,
    Path(subject): Path<String>,
    Json(claim): Json<NewClientClaim>,
) -> Result<StatusCode, Rejection> {
    respond_empty(state.manager.clients().add_client_claim(&subject, &claim).await)
}

pub async fn add_client_secret_handler(
    State(state): State<AppState>,
    Path(subject): Path<String>,
    Json(secret): Json<NewSecret>,
) -> Result<StatusCode, Rejection> {
    respond_empty(state.manager.clients().add_client_secret(&subject, &secret).await)
}

/// Adds to one of the single-value collections named by `family`
pub async fn add_client_child_handler(
    State(state): State<AppState>,
    Path((subject, family)): Path<(String, String)>,
    Json(request): Json<ChildValueRequest>,
) -> Result<StatusCode, Rejection> {
    let clients = state.manager.clients();
    let value = request.value.as_str();
    let outcome = match family.as_str() {
        "idp-restrictions" => clients.add_client_idp_restriction(&subject, value).await,
        "post-logout-redirect-uris" => clients.add_post_logout_redirect_uri(&subject, value).await,
        "redirect-uris" => clients.add_client_redirect_uri(&subject, value).await,
        "cors-origins" => clients.add_client_cors_origin(&subject, value).await,
        "custom-grant-types" => clients.add_client_custom_grant_type(&subject, value).await,
        "scopes" => clients.add_client_scope(&subject, value).await,
        other => return Err(HttpError::UnknownCollection(other.to_string()).into()),
    };
    respond_empty(outcome)
}

pub async fn remove_client_child_handler(
    State(state): State<AppState>,
    Path((subject, family, id)): Path<(String, String, String)>,
) -> Result<StatusCode, Rejection> {
    let clients = state.manager.clients();
    let outcome = match family.as_str() {
        "claims" => clients.remove_client_claim(&subject, &id).await,
        "secrets" => clients.remove_client_secret(&subject, &id).await,
        "idp-restrictions" => clients.remove_client_idp_restriction(&subject, &id).await,
        "post-logout-redirect-uris" => {
            clients.remove_post_logout_redirect_uri(&subject, &id).await
        }
        "redirect-uris" => clients.remove_client_redirect_uri(&subject, &id).await,
        "cors-origins" => clients.remove_client_cors_origin(&subject, &id).await,
        "custom-grant-types" => clients.remove_client_custom_grant_type(&subject, &id).await,
        "scopes" => clients.remove_client_scope(&subject, &id).await,
        other => return Err(HttpError::UnknownCollection(other.to_string()).into()),
    };
    respond_empty(outcome)
}
