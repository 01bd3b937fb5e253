//! Main router configuration assembling the admin API endpoints.

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post, put},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use super::{
    context::AppState,
    handler_clients::{
        add_client_child_handler, add_client_claim_handler, add_client_secret_handler,
        create_client_handler, delete_client_handler, get_client_handler, list_clients_handler,
        remove_client_child_handler, set_client_property_handler,
    },
    handler_metadata::get_metadata_handler,
    handler_scopes::{
        add_scope_claim_handler, add_scope_secret_handler, create_scope_handler,
        delete_scope_handler, get_scope_handler, list_scopes_handler, remove_scope_claim_handler,
        remove_scope_secret_handler, set_scope_property_handler, update_scope_claim_handler,
        update_scope_secret_handler,
    },
};

/// Build the application router
pub fn build_router(ctx: AppState) -> Router {
    let client_routes = Router::new()
        .route("/", get(list_clients_handler).post(create_client_handler))
        .route(
            "/{subject}",
            get(get_client_handler).delete(delete_client_handler),
        )
        .route(
            "/{subject}/properties/{name}",
            put(set_client_property_handler),
        )
        .route("/{subject}/claims", post(add_client_claim_handler))
        .route("/{subject}/secrets", post(add_client_secret_handler))
        .route("/{subject}/{family}", post(add_client_child_handler))
        .route(
            "/{subject}/{family}/{id}",
            axum::routing::delete(remove_client_child_handler),
        );

    let scope_routes = Router::new()
        .route("/", get(list_scopes_handler).post(create_scope_handler))
        .route(
            "/{subject}",
            get(get_scope_handler).delete(delete_scope_handler),
        )
        .route(
            "/{subject}/properties/{name}",
            put(set_scope_property_handler),
        )
        .route("/{subject}/claims", post(add_scope_claim_handler))
        .route(
            "/{subject}/claims/{id}",
            put(update_scope_claim_handler).delete(remove_scope_claim_handler),
        )
        .route("/{subject}/secrets", post(add_scope_secret_handler))
        .route(
            "/{subject}/secrets/{id}",
            put(update_scope_secret_handler).delete(remove_scope_secret_handler),
        );

    let api_routes = Router::new()
        .route("/metadata", get(get_metadata_handler))
        .nest("/clients", client_routes)
        .nest("/scopes", scope_routes);

    let mut router = Router::new().nest("/api", api_routes);

    let origins = ctx
        .config
        .http_cors_origins
        .as_ref()
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = ?e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect::<Vec<_>>();

    // Configure CORS only when an admin UI origin is configured
    if !origins.is_empty() {
        let cors = CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);
        router = router.layer(cors);
    }

    router.layer(TraceLayer::new_for_http()).with_state(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::{ClientDefaults, IdentityAdminManager};
    use crate::config::{Config, CorsOrigins};
    use crate::storage::MemoryAdminStorage;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn create_test_app_state(cors_origins: &str) -> AppState {
        let config = Arc::new(Config {
            version: "test".to_string(),
            http_port: "3000".to_string().try_into().unwrap(),
            http_cors_origins: CorsOrigins::try_from(cors_origins.to_string()).unwrap(),
            storage_backend: "memory".to_string(),
            database_url: None,
            seed_standard_scopes: "false".to_string().try_into().unwrap(),
            client_default_identity_token_lifetime: "5m".to_string().try_into().unwrap(),
            client_default_access_token_lifetime: "1h".to_string().try_into().unwrap(),
            client_default_authorization_code_lifetime: "5m".to_string().try_into().unwrap(),
            client_default_absolute_refresh_token_lifetime: "5m".to_string().try_into().unwrap(),
            client_default_sliding_refresh_token_lifetime: "15d".to_string().try_into().unwrap(),
        });
        let manager = IdentityAdminManager::new(
            Arc::new(MemoryAdminStorage::new()),
            ClientDefaults::default(),
        );

        AppState {
            config,
            manager: Arc::new(manager),
        }
    }

    #[tokio::test]
    async fn test_metadata_route() {
        let router = build_router(create_test_app_state(""));
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/metadata")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_collection_is_not_found() {
        let router = build_router(create_test_app_state(""));
        let response = router
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/clients/1/widgets/2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_layer_answers_preflight() {
        let router = build_router(create_test_app_state("http://localhost:3001"));
        let response = router
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/clients")
                    .header("origin", "http://localhost:3001")
                    .header("access-control-request-method", "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("http://localhost:3001")
        );
    }
}
