//! Admin manager integration tests
//!
//! These tests drive the manager end to end against the in-memory store and
//! cover the create, read, update and delete behaviour callers rely on.

use idadmin::admin::{
    ClientDefaults, FailureKind, IdentityAdminManager, NewClientClaim, NewScopeClaim, NewSecret,
    PropertyValue,
};
use idadmin::storage::MemoryAdminStorage;
use std::sync::Arc;

fn manager() -> IdentityAdminManager {
    IdentityAdminManager::new(Arc::new(MemoryAdminStorage::new()), ClientDefaults::default())
}

fn pairs(values: &[(&str, &str)]) -> Vec<PropertyValue> {
    values
        .iter()
        .map(|(name, value)| PropertyValue::new(*name, *value))
        .collect()
}

async fn create_client(manager: &IdentityAdminManager, client_id: &str, name: &str) -> String {
    manager
        .clients()
        .create_client(&pairs(&[("ClientId", client_id), ("ClientName", name)]))
        .await
        .into_result()
        .expect("client created")
        .subject
}

async fn create_scope(manager: &IdentityAdminManager, name: &str) -> String {
    manager
        .scopes()
        .create_scope(&pairs(&[("ScopeName", name)]))
        .await
        .into_result()
        .expect("scope created")
        .subject
}

#[tokio::test]
async fn test_get_after_create_returns_supplied_identity() {
    let manager = manager();
    let subject = create_client(&manager, "app1", "App One").await;

    let detail = manager.clients().get_client(&subject).await.into_result().unwrap();
    assert_eq!(detail.subject, subject);
    assert_eq!(detail.client_id, "app1");
    assert_eq!(detail.client_name, "App One");
    assert_eq!(detail.property("ClientId"), Some("app1"));
}

#[tokio::test]
async fn test_create_with_missing_required_field_persists_nothing() {
    let manager = manager();
    let outcome = manager
        .clients()
        .create_client(&pairs(&[("ClientName", "Nameless")]))
        .await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::Validation));
    assert!(outcome.errors().iter().any(|e| e == "ClientId is required"));

    let page = manager
        .clients()
        .query_clients(None, 0, 10)
        .await
        .into_result()
        .unwrap();
    assert_eq!(page.total, 0);
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn test_create_reports_every_invalid_field() {
    let manager = manager();
    let outcome = manager
        .clients()
        .create_client(&pairs(&[
            ("ClientId", "app1"),
            ("ClientName", ""),
            ("AccessTokenLifetime", "forever"),
            ("Enabled", "yes"),
        ]))
        .await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::Validation));
    assert_eq!(outcome.errors().len(), 3);
}

#[tokio::test]
async fn test_delete_then_get_is_invalid_subject() {
    let manager = manager();
    let subject = create_client(&manager, "app1", "App One").await;

    assert!(manager.clients().delete_client(&subject).await.is_success());

    let outcome = manager.clients().get_client(&subject).await;
    assert_eq!(outcome.failure_kind(), Some(FailureKind::InvalidSubject));
    assert!(outcome.result().is_none());

    let outcome = manager.clients().delete_client(&subject).await;
    assert_eq!(outcome.failure_kind(), Some(FailureKind::InvalidSubject));
}

#[tokio::test]
async fn test_adding_same_child_twice_stores_one_entry() {
    let manager = manager();
    let clients = manager.clients();
    let subject = create_client(&manager, "app1", "App One").await;

    for _ in 0..2 {
        assert!(
            clients
                .add_client_redirect_uri(&subject, "https://app.example.com/cb")
                .await
                .is_success()
        );
        let claim = NewClientClaim {
            claim_type: "role".to_string(),
            value: "admin".to_string(),
        };
        assert!(clients.add_client_claim(&subject, &claim).await.is_success());
        assert!(clients.add_client_scope(&subject, "openid").await.is_success());
    }

    let detail = clients.get_client(&subject).await.into_result().unwrap();
    assert_eq!(detail.redirect_uris.len(), 1);
    assert_eq!(detail.claims.len(), 1);
    assert_eq!(detail.allowed_scopes.len(), 1);
}

#[tokio::test]
async fn test_removing_unknown_child_is_a_noop_success() {
    let manager = manager();
    let clients = manager.clients();
    let subject = create_client(&manager, "app1", "App One").await;
    clients
        .add_client_cors_origin(&subject, "https://app.example.com")
        .await;

    let outcome = clients.remove_client_cors_origin(&subject, "424242").await;
    assert!(outcome.is_success());

    let detail = clients.get_client(&subject).await.into_result().unwrap();
    assert_eq!(detail.allowed_cors_origins.len(), 1);
    assert_eq!(detail.allowed_cors_origins[0].origin, "https://app.example.com");
}

#[tokio::test]
async fn test_remove_child_by_id() {
    let manager = manager();
    let clients = manager.clients();
    let subject = create_client(&manager, "app1", "App One").await;
    for grant in ["delegation", "token-exchange"] {
        clients.add_client_custom_grant_type(&subject, grant).await;
    }
    let detail = clients.get_client(&subject).await.into_result().unwrap();
    let delegation = &detail.allowed_custom_grant_types[0];
    assert_eq!(delegation.grant_type, "delegation");

    assert!(
        clients
            .remove_client_custom_grant_type(&subject, &delegation.id)
            .await
            .is_success()
    );

    let detail = clients.get_client(&subject).await.into_result().unwrap();
    let grants: Vec<_> = detail
        .allowed_custom_grant_types
        .iter()
        .map(|g| g.grant_type.as_str())
        .collect();
    assert_eq!(grants, ["token-exchange"]);
}

#[tokio::test]
async fn test_child_operations_require_existing_parent() {
    let manager = manager();
    let outcome = manager
        .clients()
        .add_client_redirect_uri("99", "https://app.example.com/cb")
        .await;
    assert_eq!(outcome.failure_kind(), Some(FailureKind::InvalidSubject));

    let outcome = manager.scopes().remove_scope_claim("99", "1").await;
    assert_eq!(outcome.failure_kind(), Some(FailureKind::InvalidSubject));
}

#[tokio::test]
async fn test_set_property_round_trips_text() {
    let manager = manager();
    let clients = manager.clients();
    let subject = create_client(&manager, "app1", "App One").await;

    for (name, value) in [
        ("AccessTokenLifetime", "7200"),
        ("Flow", "Hybrid"),
        ("ClientUri", "https://app.example.com"),
        ("AccessTokenType", "Reference"),
        ("IncludeJwtId", "true"),
    ] {
        assert!(clients.set_client_property(&subject, name, value).await.is_success());
        let detail = clients.get_client(&subject).await.into_result().unwrap();
        assert_eq!(detail.property(name), Some(value), "property {}", name);
    }
}

#[tokio::test]
async fn test_boolean_false_is_stored_as_false() {
    let manager = manager();
    let clients = manager.clients();
    let subject = create_client(&manager, "app1", "App One").await;

    assert!(
        clients
            .set_client_property(&subject, "Enabled", "false")
            .await
            .is_success()
    );
    let detail = clients.get_client(&subject).await.into_result().unwrap();
    assert_eq!(detail.property("Enabled"), Some("false"));
}

#[tokio::test]
async fn test_set_property_failures() {
    let manager = manager();
    let clients = manager.clients();
    let subject = create_client(&manager, "app1", "App One").await;

    let outcome = clients.set_client_property(&subject, "Colour", "blue").await;
    assert_eq!(outcome.failure_kind(), Some(FailureKind::Validation));
    assert_eq!(outcome.errors(), ["Invalid property type Colour"]);

    let outcome = clients
        .set_client_property(&subject, "AccessTokenLifetime", "soon")
        .await;
    assert_eq!(outcome.failure_kind(), Some(FailureKind::Validation));

    let outcome = clients.set_client_property("not-a-number", "Enabled", "true").await;
    assert_eq!(outcome.failure_kind(), Some(FailureKind::InvalidSubject));

    let detail = clients.get_client(&subject).await.into_result().unwrap();
    assert_eq!(detail.property("AccessTokenLifetime"), Some("3600"));
}

#[tokio::test]
async fn test_query_with_unmatched_filter_is_empty() {
    let manager = manager();
    create_client(&manager, "app1", "App One").await;

    let page = manager
        .clients()
        .query_clients(Some("nothing-like-this"), 0, 10)
        .await
        .into_result()
        .unwrap();
    assert_eq!(page.total, 0);
    assert!(page.items.is_empty());
    assert_eq!(page.filter.as_deref(), Some("nothing-like-this"));
}

#[tokio::test]
async fn test_query_orders_filters_and_pages() {
    let manager = manager();
    for (client_id, name) in [
        ("c", "Charlie Portal"),
        ("a", "Alpha Portal"),
        ("d", "Delta"),
        ("b", "Bravo portal"),
    ] {
        create_client(&manager, client_id, name).await;
    }

    let clients = manager.clients();
    let first = clients
        .query_clients(Some("PORTAL"), 0, 2)
        .await
        .into_result()
        .unwrap();
    let second = clients
        .query_clients(Some("PORTAL"), 2, 2)
        .await
        .into_result()
        .unwrap();

    assert_eq!(first.total, 3);
    assert_eq!(second.total, 3);
    let names: Vec<_> = first
        .items
        .iter()
        .chain(second.items.iter())
        .map(|c| c.client_name.as_str())
        .collect();
    assert_eq!(names, ["Alpha Portal", "Bravo portal", "Charlie Portal"]);

    let again = clients
        .query_clients(Some("PORTAL"), 0, 2)
        .await
        .into_result()
        .unwrap();
    assert_eq!(again, first);
}

#[tokio::test]
async fn test_scope_read_scenario() {
    let manager = manager();
    let outcome = manager
        .scopes()
        .create_scope(&pairs(&[("Name", "read")]))
        .await;
    let subject = outcome.into_result().unwrap().subject;

    let detail = manager.scopes().get_scope(&subject).await.into_result().unwrap();
    assert_eq!(detail.name, "read");
    assert_eq!(detail.property("Name"), Some("read"));
    assert!(detail.scope_claims.is_empty());
    assert!(detail.scope_secrets.is_empty());
}

#[tokio::test]
async fn test_client_app1_scenario() {
    let manager = manager();
    let clients = manager.clients();
    let subject = create_client(&manager, "app1", "App One").await;

    let detail = clients.get_client(&subject).await.into_result().unwrap();
    assert_eq!(detail.property("Enabled"), Some("true"));
    let lifetime: i32 = detail
        .property("AccessTokenLifetime")
        .unwrap()
        .parse()
        .unwrap();
    assert!(lifetime > 0);

    assert!(
        clients
            .set_client_property(&subject, "RequireConsent", "false")
            .await
            .is_success()
    );
    let detail = clients.get_client(&subject).await.into_result().unwrap();
    assert_eq!(detail.property("RequireConsent"), Some("false"));
}

#[tokio::test]
async fn test_scope_claims_and_secrets() {
    let manager = manager();
    let scopes = manager.scopes();
    let subject = create_scope(&manager, "api").await;

    let claim = NewScopeClaim {
        name: "role".to_string(),
        description: Some("User role".to_string()),
        always_include_in_id_token: false,
    };
    assert!(scopes.add_scope_claim(&subject, &claim).await.is_success());
    assert!(scopes.add_scope_claim(&subject, &claim).await.is_success());
    let other_description = NewScopeClaim {
        description: None,
        ..claim.clone()
    };
    assert!(scopes.add_scope_claim(&subject, &other_description).await.is_success());

    let secret = NewSecret {
        value: "introspection-secret".to_string(),
        expiration: Some(
            chrono::DateTime::parse_from_rfc3339("2031-06-01T08:00:00-04:00").unwrap(),
        ),
        ..Default::default()
    };
    assert!(scopes.add_scope_secret(&subject, &secret).await.is_success());

    let detail = scopes.get_scope(&subject).await.into_result().unwrap();
    assert_eq!(detail.scope_claims.len(), 2);
    assert_eq!(detail.scope_secrets.len(), 1);
    let stored = &detail.scope_secrets[0];
    assert_eq!(
        stored.expiration.unwrap().to_rfc3339(),
        "2031-06-01T08:00:00-04:00"
    );

    let rotated = NewSecret {
        value: "rotated".to_string(),
        ..secret.clone()
    };
    assert!(
        scopes
            .update_scope_secret(&subject, &stored.id, &rotated)
            .await
            .is_success()
    );
    assert!(scopes.remove_scope_claim(&subject, &detail.scope_claims[0].id).await.is_success());

    let detail = scopes.get_scope(&subject).await.into_result().unwrap();
    assert_eq!(detail.scope_secrets[0].value, "rotated");
    assert_eq!(detail.scope_secrets[0].id, stored.id);
    assert_eq!(detail.scope_claims.len(), 1);
}

#[tokio::test]
async fn test_scope_set_property_and_delete() {
    let manager = manager();
    let scopes = manager.scopes();
    let subject = create_scope(&manager, "profile").await;

    assert!(scopes.set_scope_property(&subject, "Type", "identity").await.is_success());
    assert!(scopes.set_scope_property(&subject, "Emphasize", "TRUE").await.is_success());
    let detail = scopes.get_scope(&subject).await.into_result().unwrap();
    assert_eq!(detail.property("Type"), Some("Identity"));
    assert_eq!(detail.property("Emphasize"), Some("true"));

    assert!(scopes.delete_scope(&subject).await.is_success());
    let outcome = scopes.get_scope(&subject).await;
    assert_eq!(outcome.failure_kind(), Some(FailureKind::InvalidSubject));
}

#[tokio::test]
async fn test_concurrent_edits_on_different_clients() {
    let manager = Arc::new(manager());
    let mut subjects = Vec::new();
    for index in 0..4 {
        subjects.push(create_client(&manager, &format!("app{index}"), "App").await);
    }

    let edits = subjects.iter().map(|subject| {
        let manager = manager.clone();
        let subject = subject.clone();
        async move {
            manager
                .clients()
                .add_client_redirect_uri(&subject, "https://app.example.com/cb")
                .await
        }
    });
    let outcomes = futures::future::join_all(edits).await;
    assert!(outcomes.iter().all(|outcome| outcome.is_success()));

    for subject in &subjects {
        let detail = manager.clients().get_client(subject).await.into_result().unwrap();
        assert_eq!(detail.redirect_uris.len(), 1);
    }
}
