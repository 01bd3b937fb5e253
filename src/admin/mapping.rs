//! Conversions between store records, domain models and admin value objects.
//!
//! Record to model flattens child rows. Model to record either builds fresh
//! rows (`to_record`) or reconciles an existing record's children by natural
//! key so surviving rows keep their ids (`apply_model`). Property edits copy
//! scalars only (`apply_scalars`). Secret expirations
//! keep their UTC offset in every direction.

use super::model::{Claim, Client, Scope, ScopeClaim, Secret};
use super::types::{
    ClientClaimRow, ClientCorsOriginRow, ClientCustomGrantTypeRow, ClientIdPRestrictionRow,
    ClientPostLogoutRedirectUriRow, ClientRecord, ClientRedirectUriRow, ClientScopeRow,
    DEFAULT_SECRET_TYPE, ScopeClaimRow, ScopeRecord, SecretRow,
};
use super::values::{
    ClientClaimValue, ClientCorsOriginValue, ClientCustomGrantTypeValue,
    ClientIdPRestrictionValue, ClientPostLogoutRedirectUriValue, ClientRedirectUriValue,
    ClientScopeValue, ClientSummary, ScopeClaimValue, ScopeSummary, SecretValue,
};
use crate::storage::traits::{ClientListing, ScopeListing};

/// Natural key of a secret row. The row type only counts when a value is present.
pub(crate) fn secret_key(secret_type: Option<&str>, value: &str) -> (String, String) {
    let secret_type = match secret_type {
        Some(secret_type) if !value.is_empty() => secret_type,
        _ => DEFAULT_SECRET_TYPE,
    };
    (secret_type.to_string(), value.to_string())
}

impl From<&SecretRow> for Secret {
    fn from(row: &SecretRow) -> Self {
        let (secret_type, value) = secret_key(row.secret_type.as_deref(), &row.value);
        Secret {
            secret_type,
            value,
            description: row.description.clone(),
            expiration: row.expiration,
        }
    }
}

impl From<&Secret> for SecretRow {
    fn from(secret: &Secret) -> Self {
        SecretRow {
            id: 0,
            secret_type: Some(secret.secret_type.clone()),
            value: secret.value.clone(),
            description: secret.description.clone(),
            expiration: secret.expiration,
        }
    }
}

impl From<&ScopeClaimRow> for ScopeClaim {
    fn from(row: &ScopeClaimRow) -> Self {
        ScopeClaim {
            name: row.name.clone(),
            description: row.description.clone(),
            always_include_in_id_token: row.always_include_in_id_token,
        }
    }
}

impl From<&ScopeClaim> for ScopeClaimRow {
    fn from(claim: &ScopeClaim) -> Self {
        ScopeClaimRow {
            id: 0,
            name: claim.name.clone(),
            description: claim.description.clone(),
            always_include_in_id_token: claim.always_include_in_id_token,
        }
    }
}

impl From<&ClientRecord> for Client {
    fn from(record: &ClientRecord) -> Self {
        Client {
            client_id: record.client_id.clone(),
            client_name: record.client_name.clone(),
            client_uri: record.client_uri.clone(),
            logo_uri: record.logo_uri.clone(),
            enabled: record.enabled,
            require_consent: record.require_consent,
            allow_remember_consent: record.allow_remember_consent,
            allow_access_tokens_via_browser: record.allow_access_tokens_via_browser,
            flow: record.flow,
            allow_client_credentials_only: record.allow_client_credentials_only,
            logout_uri: record.logout_uri.clone(),
            logout_session_required: record.logout_session_required,
            require_sign_out_prompt: record.require_sign_out_prompt,
            allow_access_to_all_scopes: record.allow_access_to_all_scopes,
            identity_token_lifetime: record.identity_token_lifetime,
            access_token_lifetime: record.access_token_lifetime,
            authorization_code_lifetime: record.authorization_code_lifetime,
            absolute_refresh_token_lifetime: record.absolute_refresh_token_lifetime,
            sliding_refresh_token_lifetime: record.sliding_refresh_token_lifetime,
            refresh_token_usage: record.refresh_token_usage,
            update_access_token_claims_on_refresh: record.update_access_token_on_refresh,
            refresh_token_expiration: record.refresh_token_expiration,
            access_token_type: record.access_token_type,
            enable_local_login: record.enable_local_login,
            include_jwt_id: record.include_jwt_id,
            always_send_client_claims: record.always_send_client_claims,
            prefix_client_claims: record.prefix_client_claims,
            allow_access_to_all_custom_grant_types: record.allow_access_to_all_grant_types,
            claims: record
                .claims
                .iter()
                .map(|row| Claim::new(&row.claim_type, &row.value))
                .collect(),
            client_secrets: record.client_secrets.iter().map(Secret::from).collect(),
            redirect_uris: record.redirect_uris.iter().map(|row| row.uri.clone()).collect(),
            post_logout_redirect_uris: record
                .post_logout_redirect_uris
                .iter()
                .map(|row| row.uri.clone())
                .collect(),
            allowed_cors_origins: record
                .allowed_cors_origins
                .iter()
                .map(|row| row.origin.clone())
                .collect(),
            allowed_custom_grant_types: record
                .allowed_custom_grant_types
                .iter()
                .map(|row| row.grant_type.clone())
                .collect(),
            allowed_scopes: record
                .allowed_scopes
                .iter()
                .map(|row| row.scope.clone())
                .collect(),
            identity_provider_restrictions: record
                .identity_provider_restrictions
                .iter()
                .map(|row| row.provider.clone())
                .collect(),
        }
    }
}

impl Client {
    /// Store shape with every child wrapped in a fresh row
    pub fn to_record(&self) -> ClientRecord {
        let mut record = ClientRecord::default();
        record.apply_model(self);
        record
    }
}

impl ClientRecord {
    /// Copies scalars from `client` and reconciles every child family by
    /// natural key. Rows whose value survives keep their id.
    pub fn apply_model(&mut self, client: &Client) {
        self.apply_scalars(client);
        self.reconcile_children(client);
    }

    /// Copies scalar properties only. Child rows are left untouched.
    pub fn apply_scalars(&mut self, client: &Client) {
        self.client_id = client.client_id.clone();
        self.client_name = client.client_name.clone();
        self.client_uri = client.client_uri.clone();
        self.logo_uri = client.logo_uri.clone();
        self.enabled = client.enabled;
        self.require_consent = client.require_consent;
        self.allow_remember_consent = client.allow_remember_consent;
        self.allow_access_tokens_via_browser = client.allow_access_tokens_via_browser;
        self.flow = client.flow;
        self.allow_client_credentials_only = client.allow_client_credentials_only;
        self.logout_uri = client.logout_uri.clone();
        self.logout_session_required = client.logout_session_required;
        self.require_sign_out_prompt = client.require_sign_out_prompt;
        self.allow_access_to_all_scopes = client.allow_access_to_all_scopes;
        self.identity_token_lifetime = client.identity_token_lifetime;
        self.access_token_lifetime = client.access_token_lifetime;
        self.authorization_code_lifetime = client.authorization_code_lifetime;
        self.absolute_refresh_token_lifetime = client.absolute_refresh_token_lifetime;
        self.sliding_refresh_token_lifetime = client.sliding_refresh_token_lifetime;
        self.refresh_token_usage = client.refresh_token_usage;
        self.update_access_token_on_refresh = client.update_access_token_claims_on_refresh;
        self.refresh_token_expiration = client.refresh_token_expiration;
        self.access_token_type = client.access_token_type;
        self.enable_local_login = client.enable_local_login;
        self.include_jwt_id = client.include_jwt_id;
        self.always_send_client_claims = client.always_send_client_claims;
        self.prefix_client_claims = client.prefix_client_claims;
        self.allow_access_to_all_grant_types = client.allow_access_to_all_custom_grant_types;
    }

    fn reconcile_children(&mut self, client: &Client) {
        reconcile(
            &mut self.claims,
            &client.claims,
            |row| (row.claim_type.clone(), row.value.clone()),
            |claim| (claim.claim_type.clone(), claim.value.clone()),
            |claim| ClientClaimRow {
                id: 0,
                claim_type: claim.claim_type.clone(),
                value: claim.value.clone(),
            },
            |_, _| {},
        );
        reconcile_secrets(&mut self.client_secrets, &client.client_secrets);
        reconcile(
            &mut self.redirect_uris,
            &client.redirect_uris,
            |row| row.uri.clone(),
            String::clone,
            |uri| ClientRedirectUriRow {
                id: 0,
                uri: uri.clone(),
            },
            |_, _| {},
        );
        reconcile(
            &mut self.post_logout_redirect_uris,
            &client.post_logout_redirect_uris,
            |row| row.uri.clone(),
            String::clone,
            |uri| ClientPostLogoutRedirectUriRow {
                id: 0,
                uri: uri.clone(),
            },
            |_, _| {},
        );
        reconcile(
            &mut self.allowed_cors_origins,
            &client.allowed_cors_origins,
            |row| row.origin.clone(),
            String::clone,
            |origin| ClientCorsOriginRow {
                id: 0,
                origin: origin.clone(),
            },
            |_, _| {},
        );
        reconcile(
            &mut self.allowed_custom_grant_types,
            &client.allowed_custom_grant_types,
            |row| row.grant_type.clone(),
            String::clone,
            |grant_type| ClientCustomGrantTypeRow {
                id: 0,
                grant_type: grant_type.clone(),
            },
            |_, _| {},
        );
        reconcile(
            &mut self.allowed_scopes,
            &client.allowed_scopes,
            |row| row.scope.clone(),
            String::clone,
            |scope| ClientScopeRow {
                id: 0,
                scope: scope.clone(),
            },
            |_, _| {},
        );
        reconcile(
            &mut self.identity_provider_restrictions,
            &client.identity_provider_restrictions,
            |row| row.provider.clone(),
            String::clone,
            |provider| ClientIdPRestrictionRow {
                id: 0,
                provider: provider.clone(),
            },
            |_, _| {},
        );
    }
}

impl From<&ScopeRecord> for Scope {
    fn from(record: &ScopeRecord) -> Self {
        Scope {
            name: record.name.clone(),
            display_name: record.display_name.clone(),
            description: record.description.clone(),
            claims_rule: record.claims_rule.clone(),
            required: record.required,
            emphasize: record.emphasize,
            scope_type: record.scope_type,
            include_all_claims_for_user: record.include_all_claims_for_user,
            show_in_discovery_document: record.show_in_discovery_document,
            enabled: record.enabled,
            allow_unrestricted_introspection: record.allow_unrestricted_introspection,
            claims: record.scope_claims.iter().map(ScopeClaim::from).collect(),
            scope_secrets: record.scope_secrets.iter().map(Secret::from).collect(),
        }
    }
}

impl Scope {
    pub fn to_record(&self) -> ScopeRecord {
        let mut record = ScopeRecord::default();
        record.apply_model(self);
        record
    }
}

impl ScopeRecord {
    pub fn apply_model(&mut self, scope: &Scope) {
        self.apply_scalars(scope);
        reconcile(
            &mut self.scope_claims,
            &scope.claims,
            |row| (row.name.clone(), row.description.clone()),
            |claim| (claim.name.clone(), claim.description.clone()),
            |claim| ScopeClaimRow::from(claim),
            |row, claim| row.always_include_in_id_token = claim.always_include_in_id_token,
        );
        reconcile_secrets(&mut self.scope_secrets, &scope.scope_secrets);
    }

    /// Copies scalar properties only. Claim and secret rows are left untouched.
    pub fn apply_scalars(&mut self, scope: &Scope) {
        self.name = scope.name.clone();
        self.display_name = scope.display_name.clone();
        self.description = scope.description.clone();
        self.claims_rule = scope.claims_rule.clone();
        self.required = scope.required;
        self.emphasize = scope.emphasize;
        self.scope_type = scope.scope_type;
        self.include_all_claims_for_user = scope.include_all_claims_for_user;
        self.show_in_discovery_document = scope.show_in_discovery_document;
        self.enabled = scope.enabled;
        self.allow_unrestricted_introspection = scope.allow_unrestricted_introspection;
    }
}

fn reconcile_secrets(rows: &mut Vec<SecretRow>, secrets: &[Secret]) {
    reconcile(
        rows,
        secrets,
        |row| secret_key(row.secret_type.as_deref(), &row.value),
        |secret| (secret.secret_type.clone(), secret.value.clone()),
        |secret| SecretRow::from(secret),
        |row, secret| {
            row.description = secret.description.clone();
            row.expiration = secret.expiration;
        },
    );
}

/// Makes `rows` hold exactly one row per distinct key in `wanted`, in
/// `wanted` order. Matching rows are refreshed in place and keep their id;
/// unmatched values become fresh rows; leftover rows are dropped.
fn reconcile<R, M, K: PartialEq>(
    rows: &mut Vec<R>,
    wanted: &[M],
    row_key: impl Fn(&R) -> K,
    model_key: impl Fn(&M) -> K,
    fresh: impl Fn(&M) -> R,
    refresh: impl Fn(&mut R, &M),
) {
    let mut existing: Vec<Option<R>> = rows.drain(..).map(Some).collect();
    let mut seen: Vec<K> = Vec::with_capacity(wanted.len());

    for model in wanted {
        let key = model_key(model);
        if seen.contains(&key) {
            continue;
        }
        let matched = existing
            .iter_mut()
            .find(|slot| matches!(slot, Some(row) if row_key(row) == key))
            .and_then(Option::take);
        let row = match matched {
            Some(mut row) => {
                refresh(&mut row, model);
                row
            }
            None => fresh(model),
        };
        rows.push(row);
        seen.push(key);
    }
}

impl From<&ClientListing> for ClientSummary {
    fn from(record: &ClientListing) -> Self {
        ClientSummary {
            subject: record.id.to_string(),
            client_id: record.client_id.clone(),
            client_name: record.client_name.clone(),
        }
    }
}

impl From<&ScopeListing> for ScopeSummary {
    fn from(record: &ScopeListing) -> Self {
        ScopeSummary {
            subject: record.id.to_string(),
            name: record.name.clone(),
            description: record.description.clone(),
        }
    }
}

impl From<&ClientClaimRow> for ClientClaimValue {
    fn from(row: &ClientClaimRow) -> Self {
        ClientClaimValue {
            id: row.id.to_string(),
            claim_type: row.claim_type.clone(),
            value: row.value.clone(),
        }
    }
}

impl From<&SecretRow> for SecretValue {
    fn from(row: &SecretRow) -> Self {
        SecretValue {
            id: row.id.to_string(),
            secret_type: row.secret_type.clone(),
            value: row.value.clone(),
            description: row.description.clone(),
            expiration: row.expiration,
        }
    }
}

impl From<&ClientIdPRestrictionRow> for ClientIdPRestrictionValue {
    fn from(row: &ClientIdPRestrictionRow) -> Self {
        ClientIdPRestrictionValue {
            id: row.id.to_string(),
            provider: row.provider.clone(),
        }
    }
}

impl From<&ClientRedirectUriRow> for ClientRedirectUriValue {
    fn from(row: &ClientRedirectUriRow) -> Self {
        ClientRedirectUriValue {
            id: row.id.to_string(),
            uri: row.uri.clone(),
        }
    }
}

impl From<&ClientPostLogoutRedirectUriRow> for ClientPostLogoutRedirectUriValue {
    fn from(row: &ClientPostLogoutRedirectUriRow) -> Self {
        ClientPostLogoutRedirectUriValue {
            id: row.id.to_string(),
            uri: row.uri.clone(),
        }
    }
}

impl From<&ClientCorsOriginRow> for ClientCorsOriginValue {
    fn from(row: &ClientCorsOriginRow) -> Self {
        ClientCorsOriginValue {
            id: row.id.to_string(),
            origin: row.origin.clone(),
        }
    }
}

impl From<&ClientCustomGrantTypeRow> for ClientCustomGrantTypeValue {
    fn from(row: &ClientCustomGrantTypeRow) -> Self {
        ClientCustomGrantTypeValue {
            id: row.id.to_string(),
            grant_type: row.grant_type.clone(),
        }
    }
}

impl From<&ClientScopeRow> for ClientScopeValue {
    fn from(row: &ClientScopeRow) -> Self {
        ClientScopeValue {
            id: row.id.to_string(),
            scope: row.scope.clone(),
        }
    }
}

impl From<&ScopeClaimRow> for ScopeClaimValue {
    fn from(row: &ScopeClaimRow) -> Self {
        ScopeClaimValue {
            id: row.id.to_string(),
            name: row.name.clone(),
            description: row.description.clone(),
            always_include_in_id_token: row.always_include_in_id_token,
        }
    }
}
