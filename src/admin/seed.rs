//! First-run seeding of the standard OpenID Connect scopes.

use super::model::{Scope, ScopeClaim};
use super::types::ScopeType;
use crate::storage::traits::ScopeStore;
use crate::storage::traits::Result;

/// openid, profile, email, offline_access and roles
pub fn standard_scopes() -> Vec<Scope> {
    vec![
        Scope {
            required: true,
            ..Scope::identity("openid", &["sub"])
        },
        Scope {
            emphasize: true,
            ..Scope::identity(
                "profile",
                &[
                    "name",
                    "family_name",
                    "given_name",
                    "middle_name",
                    "nickname",
                    "preferred_username",
                    "profile",
                    "picture",
                    "website",
                    "gender",
                    "birthdate",
                    "zoneinfo",
                    "locale",
                    "updated_at",
                ],
            )
        },
        Scope {
            emphasize: true,
            ..Scope::identity("email", &["email", "email_verified"])
        },
        Scope {
            name: "offline_access".to_string(),
            display_name: Some("Offline access".to_string()),
            scope_type: ScopeType::Resource,
            emphasize: true,
            ..Default::default()
        },
        Scope {
            claims: vec![ScopeClaim::new("role", false)],
            ..Scope::identity("roles", &[])
        },
    ]
}

/// Inserts the standard scopes when the store holds no scopes yet.
/// Returns how many scopes were written.
pub async fn seed_if_empty(store: &dyn ScopeStore) -> Result<usize> {
    if store.count_scopes().await? > 0 {
        tracing::debug!("Scope store already populated, skipping seed");
        return Ok(0);
    }

    let scopes = standard_scopes();
    for scope in &scopes {
        store.insert_scope(&scope.to_record()).await?;
    }
    tracing::info!(count = scopes.len(), "Seeded standard scopes");
    Ok(scopes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryAdminStorage;
    use crate::storage::traits::ListQuery;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let storage = MemoryAdminStorage::new();
        assert_eq!(seed_if_empty(&storage).await.unwrap(), 5);
        assert_eq!(seed_if_empty(&storage).await.unwrap(), 0);
        assert_eq!(storage.count_scopes().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_seed_skips_populated_store() {
        let storage = MemoryAdminStorage::new();
        let custom = Scope {
            name: "api".to_string(),
            ..Default::default()
        };
        storage.insert_scope(&custom.to_record()).await.unwrap();

        assert_eq!(seed_if_empty(&storage).await.unwrap(), 0);
        let page = storage.query_scopes(&ListQuery::new(None, 0, 10)).await.unwrap();
        assert_eq!(page.total, 1);
    }

    #[test]
    fn test_openid_scope_carries_subject_claim() {
        let scopes = standard_scopes();
        let openid = scopes.iter().find(|s| s.name == "openid").unwrap();
        assert_eq!(openid.scope_type, ScopeType::Identity);
        assert!(openid.required);
        assert_eq!(openid.claims[0].name, "sub");
    }
}
