//! Admin façade over client and scope storage.
//!
//! Every public operation is a single load, transform and store unit that
//! returns an [`AdminResult`]. Identifiers are parsed before the store is
//! touched, and storage failures are logged here and carried in the outcome.

use std::sync::Arc;

use super::mapping::secret_key;
use super::metadata::{
    EditableModel, PropertyDescriptor, apply_create_properties, property_values, set_property,
};
use super::model::{Client, Scope};
use super::outcome::AdminResult;
use super::types::{
    AccessTokenType, ChildRow, ClientClaimRow, ClientCorsOriginRow, ClientCustomGrantTypeRow,
    ClientIdPRestrictionRow, ClientPostLogoutRedirectUriRow, ClientRecord, ClientRedirectUriRow,
    ClientScopeRow, DEFAULT_SECRET_TYPE, Flow, ScopeClaimRow, ScopeRecord, SecretRow,
};
use super::values::{
    AdminMetadata, ClientDetail, ClientMetadata, ClientSummary, CreateResult, NewClientClaim,
    NewScopeClaim, NewSecret, PropertyMetadata, PropertyValue, QueryResult, ScopeDetail,
    ScopeMetadata, ScopeSummary,
};
use crate::errors::AdminError;
use crate::storage::traits::{AdminStorage, ClientStore, ListQuery, ScopeStore};

/// Values applied to every newly created client before caller-supplied pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientDefaults {
    pub enabled: bool,
    pub enable_local_login: bool,
    pub require_consent: bool,
    pub flow: Flow,
    pub allow_client_credentials_only: bool,
    pub identity_token_lifetime: i32,
    pub access_token_lifetime: i32,
    pub authorization_code_lifetime: i32,
    pub absolute_refresh_token_lifetime: i32,
    pub sliding_refresh_token_lifetime: i32,
    pub access_token_type: AccessTokenType,
    pub always_send_client_claims: bool,
    pub prefix_client_claims: bool,
}

impl Default for ClientDefaults {
    fn default() -> Self {
        Self {
            enabled: true,
            enable_local_login: true,
            require_consent: true,
            flow: Flow::Implicit,
            allow_client_credentials_only: false,
            identity_token_lifetime: 300,
            access_token_lifetime: 3600,
            authorization_code_lifetime: 300,
            absolute_refresh_token_lifetime: 300,
            sliding_refresh_token_lifetime: 1_296_000,
            access_token_type: AccessTokenType::Jwt,
            always_send_client_claims: false,
            prefix_client_claims: true,
        }
    }
}

impl ClientDefaults {
    /// A blank client carrying these defaults
    pub fn new_client(&self) -> Client {
        Client {
            enabled: self.enabled,
            enable_local_login: self.enable_local_login,
            require_consent: self.require_consent,
            flow: self.flow,
            allow_client_credentials_only: self.allow_client_credentials_only,
            identity_token_lifetime: self.identity_token_lifetime,
            access_token_lifetime: self.access_token_lifetime,
            authorization_code_lifetime: self.authorization_code_lifetime,
            absolute_refresh_token_lifetime: self.absolute_refresh_token_lifetime,
            sliding_refresh_token_lifetime: self.sliding_refresh_token_lifetime,
            access_token_type: self.access_token_type,
            always_send_client_claims: self.always_send_client_claims,
            prefix_client_claims: self.prefix_client_claims,
            ..Default::default()
        }
    }
}

/// Client management operations
#[derive(Clone)]
pub struct ClientAdminService {
    store: Arc<dyn ClientStore>,
    defaults: ClientDefaults,
}

impl ClientAdminService {
    pub fn new(store: Arc<dyn ClientStore>, defaults: ClientDefaults) -> Self {
        Self { store, defaults }
    }

    async fn load(&self, subject: &str) -> Result<ClientRecord, AdminError> {
        let id = parse_subject(subject)?;
        self.store
            .get_client(id)
            .await?
            .ok_or(AdminError::InvalidSubject)
    }

    /// Loads the client, lets `change` edit it and persists only when it reports a change
    async fn modify<F>(&self, subject: &str, change: F) -> Result<(), AdminError>
    where
        F: FnOnce(&mut ClientRecord) -> bool + Send,
    {
        let mut record = self.load(subject).await?;
        if change(&mut record) {
            self.store.update_client(&record).await?;
        }
        Ok(())
    }

    pub async fn get_client(&self, subject: &str) -> AdminResult<ClientDetail> {
        let result = async {
            let record = self.load(subject).await?;
            Ok::<_, AdminError>(client_detail(&record))
        }
        .await;
        finish("get_client", subject, result)
    }

    pub async fn query_clients(
        &self,
        filter: Option<&str>,
        start: usize,
        count: usize,
    ) -> AdminResult<QueryResult<ClientSummary>> {
        let query = ListQuery::new(filter, start, count);
        let result = self.store.query_clients(&query).await.map(|page| QueryResult {
            start,
            count,
            total: page.total,
            filter: query.filter.clone(),
            items: page.items.iter().map(ClientSummary::from).collect(),
        });
        finish("query_clients", "", result.map_err(AdminError::from))
    }

    /// Creates a client from property pairs. `ClientId` and `ClientName` are required.
    pub async fn create_client(&self, properties: &[PropertyValue]) -> AdminResult<CreateResult> {
        let result = async {
            let client = apply_create_properties(self.defaults.new_client(), properties)?;
            let id = self.store.insert_client(&client.to_record()).await?;
            tracing::info!(subject = id, client_id = %client.client_id, "Created client");
            Ok::<_, AdminError>(CreateResult {
                subject: id.to_string(),
            })
        }
        .await;
        finish("create_client", "", result)
    }

    pub async fn set_client_property(
        &self,
        subject: &str,
        name: &str,
        value: &str,
    ) -> AdminResult<()> {
        let result = async {
            let mut record = self.load(subject).await?;
            let mut client = Client::from(&record);
            set_property(&mut client, name, value)?;
            record.apply_scalars(&client);
            self.store.update_client(&record).await?;
            Ok::<_, AdminError>(())
        }
        .await;
        finish("set_client_property", subject, result)
    }

    pub async fn delete_client(&self, subject: &str) -> AdminResult<()> {
        let result = async {
            let record = self.load(subject).await?;
            self.store.delete_client(record.id).await?;
            tracing::info!(subject = record.id, client_id = %record.client_id, "Deleted client");
            Ok::<_, AdminError>(())
        }
        .await;
        finish("delete_client", subject, result)
    }

    pub async fn add_client_claim(&self, subject: &str, claim: &NewClientClaim) -> AdminResult<()> {
        let result = async {
            let claim_type = required_value("Type", &claim.claim_type)?;
            let value = required_value("Value", &claim.value)?;
            self.modify(subject, |record| {
                add_unique(
                    &mut record.claims,
                    |row| row.claim_type == claim_type && row.value == value,
                    || ClientClaimRow {
                        id: 0,
                        claim_type: claim_type.clone(),
                        value: value.clone(),
                    },
                )
            })
            .await
        }
        .await;
        finish("add_client_claim", subject, result)
    }

    pub async fn remove_client_claim(&self, subject: &str, claim_id: &str) -> AdminResult<()> {
        let result = async {
            let id = parse_child_id(claim_id, "claim")?;
            self.modify(subject, |record| remove_by_id(&mut record.claims, id))
                .await
        }
        .await;
        finish("remove_client_claim", subject, result)
    }

    pub async fn add_client_secret(&self, subject: &str, secret: &NewSecret) -> AdminResult<()> {
        let result = async {
            let row = secret_row(secret)?;
            self.modify(subject, |record| add_secret(&mut record.client_secrets, row))
                .await
        }
        .await;
        finish("add_client_secret", subject, result)
    }

    pub async fn remove_client_secret(&self, subject: &str, secret_id: &str) -> AdminResult<()> {
        let result = async {
            let id = parse_child_id(secret_id, "secret")?;
            self.modify(subject, |record| remove_by_id(&mut record.client_secrets, id))
                .await
        }
        .await;
        finish("remove_client_secret", subject, result)
    }

    pub async fn add_client_idp_restriction(&self, subject: &str, provider: &str) -> AdminResult<()> {
        let result = async {
            let provider = required_value("Provider", provider)?;
            self.modify(subject, |record| {
                add_unique(
                    &mut record.identity_provider_restrictions,
                    |row| row.provider == provider,
                    || ClientIdPRestrictionRow {
                        id: 0,
                        provider: provider.clone(),
                    },
                )
            })
            .await
        }
        .await;
        finish("add_client_idp_restriction", subject, result)
    }

    pub async fn remove_client_idp_restriction(
        &self,
        subject: &str,
        restriction_id: &str,
    ) -> AdminResult<()> {
        let result = async {
            let id = parse_child_id(restriction_id, "identity provider restriction")?;
            self.modify(subject, |record| {
                remove_by_id(&mut record.identity_provider_restrictions, id)
            })
            .await
        }
        .await;
        finish("remove_client_idp_restriction", subject, result)
    }

    pub async fn add_post_logout_redirect_uri(&self, subject: &str, uri: &str) -> AdminResult<()> {
        let result = async {
            let uri = required_value("Uri", uri)?;
            self.modify(subject, |record| {
                add_unique(
                    &mut record.post_logout_redirect_uris,
                    |row| row.uri == uri,
                    || ClientPostLogoutRedirectUriRow {
                        id: 0,
                        uri: uri.clone(),
                    },
                )
            })
            .await
        }
        .await;
        finish("add_post_logout_redirect_uri", subject, result)
    }

    pub async fn remove_post_logout_redirect_uri(
        &self,
        subject: &str,
        uri_id: &str,
    ) -> AdminResult<()> {
        let result = async {
            let id = parse_child_id(uri_id, "post logout redirect uri")?;
            self.modify(subject, |record| {
                remove_by_id(&mut record.post_logout_redirect_uris, id)
            })
            .await
        }
        .await;
        finish("remove_post_logout_redirect_uri", subject, result)
    }

    pub async fn add_client_redirect_uri(&self, subject: &str, uri: &str) -> AdminResult<()> {
        let result = async {
            let uri = required_value("Uri", uri)?;
            self.modify(subject, |record| {
                add_unique(
                    &mut record.redirect_uris,
                    |row| row.uri == uri,
                    || ClientRedirectUriRow {
                        id: 0,
                        uri: uri.clone(),
                    },
                )
            })
            .await
        }
        .await;
        finish("add_client_redirect_uri", subject, result)
    }

    pub async fn remove_client_redirect_uri(&self, subject: &str, uri_id: &str) -> AdminResult<()> {
        let result = async {
            let id = parse_child_id(uri_id, "redirect uri")?;
            self.modify(subject, |record| remove_by_id(&mut record.redirect_uris, id))
                .await
        }
        .await;
        finish("remove_client_redirect_uri", subject, result)
    }

    pub async fn add_client_cors_origin(&self, subject: &str, origin: &str) -> AdminResult<()> {
        let result = async {
            let origin = required_value("Origin", origin)?;
            self.modify(subject, |record| {
                add_unique(
                    &mut record.allowed_cors_origins,
                    |row| row.origin == origin,
                    || ClientCorsOriginRow {
                        id: 0,
                        origin: origin.clone(),
                    },
                )
            })
            .await
        }
        .await;
        finish("add_client_cors_origin", subject, result)
    }

    pub async fn remove_client_cors_origin(&self, subject: &str, origin_id: &str) -> AdminResult<()> {
        let result = async {
            let id = parse_child_id(origin_id, "cors origin")?;
            self.modify(subject, |record| {
                remove_by_id(&mut record.allowed_cors_origins, id)
            })
            .await
        }
        .await;
        finish("remove_client_cors_origin", subject, result)
    }

    pub async fn add_client_custom_grant_type(
        &self,
        subject: &str,
        grant_type: &str,
    ) -> AdminResult<()> {
        let result = async {
            let grant_type = required_value("GrantType", grant_type)?;
            self.modify(subject, |record| {
                add_unique(
                    &mut record.allowed_custom_grant_types,
                    |row| row.grant_type == grant_type,
                    || ClientCustomGrantTypeRow {
                        id: 0,
                        grant_type: grant_type.clone(),
                    },
                )
            })
            .await
        }
        .await;
        finish("add_client_custom_grant_type", subject, result)
    }

    pub async fn remove_client_custom_grant_type(
        &self,
        subject: &str,
        grant_type_id: &str,
    ) -> AdminResult<()> {
        let result = async {
            let id = parse_child_id(grant_type_id, "custom grant type")?;
            self.modify(subject, |record| {
                remove_by_id(&mut record.allowed_custom_grant_types, id)
            })
            .await
        }
        .await;
        finish("remove_client_custom_grant_type", subject, result)
    }

    pub async fn add_client_scope(&self, subject: &str, scope: &str) -> AdminResult<()> {
        let result = async {
            let scope = required_value("Scope", scope)?;
            self.modify(subject, |record| {
                add_unique(
                    &mut record.allowed_scopes,
                    |row| row.scope == scope,
                    || ClientScopeRow {
                        id: 0,
                        scope: scope.clone(),
                    },
                )
            })
            .await
        }
        .await;
        finish("add_client_scope", subject, result)
    }

    pub async fn remove_client_scope(&self, subject: &str, scope_id: &str) -> AdminResult<()> {
        let result = async {
            let id = parse_child_id(scope_id, "scope")?;
            self.modify(subject, |record| remove_by_id(&mut record.allowed_scopes, id))
                .await
        }
        .await;
        finish("remove_client_scope", subject, result)
    }
}

/// Scope management operations
#[derive(Clone)]
pub struct ScopeAdminService {
    store: Arc<dyn ScopeStore>,
}

impl ScopeAdminService {
    pub fn new(store: Arc<dyn ScopeStore>) -> Self {
        Self { store }
    }

    async fn load(&self, subject: &str) -> Result<ScopeRecord, AdminError> {
        let id = parse_subject(subject)?;
        self.store
            .get_scope(id)
            .await?
            .ok_or(AdminError::InvalidSubject)
    }

    async fn modify<F>(&self, subject: &str, change: F) -> Result<(), AdminError>
    where
        F: FnOnce(&mut ScopeRecord) -> bool + Send,
    {
        let mut record = self.load(subject).await?;
        if change(&mut record) {
            self.store.update_scope(&record).await?;
        }
        Ok(())
    }

    /// Like `modify`, but `change` may refuse the edit
    async fn try_modify<F>(&self, subject: &str, change: F) -> Result<(), AdminError>
    where
        F: FnOnce(&mut ScopeRecord) -> Result<bool, AdminError> + Send,
    {
        let mut record = self.load(subject).await?;
        if change(&mut record)? {
            self.store.update_scope(&record).await?;
        }
        Ok(())
    }

    pub async fn get_scope(&self, subject: &str) -> AdminResult<ScopeDetail> {
        let result = async {
            let record = self.load(subject).await?;
            Ok::<_, AdminError>(scope_detail(&record))
        }
        .await;
        finish("get_scope", subject, result)
    }

    pub async fn query_scopes(
        &self,
        filter: Option<&str>,
        start: usize,
        count: usize,
    ) -> AdminResult<QueryResult<ScopeSummary>> {
        let query = ListQuery::new(filter, start, count);
        let result = self.store.query_scopes(&query).await.map(|page| QueryResult {
            start,
            count,
            total: page.total,
            filter: query.filter.clone(),
            items: page.items.iter().map(ScopeSummary::from).collect(),
        });
        finish("query_scopes", "", result.map_err(AdminError::from))
    }

    /// Creates a scope from property pairs. `ScopeName` (or `Name`) is required.
    pub async fn create_scope(&self, properties: &[PropertyValue]) -> AdminResult<CreateResult> {
        let result = async {
            let scope = apply_create_properties(Scope::default(), properties)?;
            let id = self.store.insert_scope(&scope.to_record()).await?;
            tracing::info!(subject = id, name = %scope.name, "Created scope");
            Ok::<_, AdminError>(CreateResult {
                subject: id.to_string(),
            })
        }
        .await;
        finish("create_scope", "", result)
    }

    pub async fn set_scope_property(
        &self,
        subject: &str,
        name: &str,
        value: &str,
    ) -> AdminResult<()> {
        let result = async {
            let mut record = self.load(subject).await?;
            let mut scope = Scope::from(&record);
            set_property(&mut scope, name, value)?;
            record.apply_scalars(&scope);
            self.store.update_scope(&record).await?;
            Ok::<_, AdminError>(())
        }
        .await;
        finish("set_scope_property", subject, result)
    }

    pub async fn delete_scope(&self, subject: &str) -> AdminResult<()> {
        let result = async {
            let record = self.load(subject).await?;
            self.store.delete_scope(record.id).await?;
            tracing::info!(subject = record.id, name = %record.name, "Deleted scope");
            Ok::<_, AdminError>(())
        }
        .await;
        finish("delete_scope", subject, result)
    }

    pub async fn add_scope_claim(&self, subject: &str, claim: &NewScopeClaim) -> AdminResult<()> {
        let result = async {
            let row = scope_claim_row(claim)?;
            let key = (row.name.clone(), row.description.clone());
            self.modify(subject, |record| {
                add_unique(
                    &mut record.scope_claims,
                    |existing| existing.name == key.0 && existing.description == key.1,
                    || row,
                )
            })
            .await
        }
        .await;
        finish("add_scope_claim", subject, result)
    }

    /// Rewrites an existing scope claim. An unknown claim id changes nothing.
    pub async fn update_scope_claim(
        &self,
        subject: &str,
        claim_id: &str,
        claim: &NewScopeClaim,
    ) -> AdminResult<()> {
        let result = async {
            let id = parse_child_id(claim_id, "claim")?;
            let row = scope_claim_row(claim)?;
            let key = (row.name.clone(), row.description.clone());
            self.try_modify(subject, |record| {
                update_by_id(
                    &mut record.scope_claims,
                    id,
                    |other| (&other.name, &other.description) == (&key.0, &key.1),
                    "Claim",
                    |existing| {
                        existing.name = row.name;
                        existing.description = row.description;
                        existing.always_include_in_id_token = row.always_include_in_id_token;
                    },
                )
            })
            .await
        }
        .await;
        finish("update_scope_claim", subject, result)
    }

    pub async fn remove_scope_claim(&self, subject: &str, claim_id: &str) -> AdminResult<()> {
        let result = async {
            let id = parse_child_id(claim_id, "claim")?;
            self.modify(subject, |record| remove_by_id(&mut record.scope_claims, id))
                .await
        }
        .await;
        finish("remove_scope_claim", subject, result)
    }

    pub async fn add_scope_secret(&self, subject: &str, secret: &NewSecret) -> AdminResult<()> {
        let result = async {
            let row = secret_row(secret)?;
            self.modify(subject, |record| add_secret(&mut record.scope_secrets, row))
                .await
        }
        .await;
        finish("add_scope_secret", subject, result)
    }

    /// Rewrites an existing scope secret. An unknown secret id changes nothing.
    pub async fn update_scope_secret(
        &self,
        subject: &str,
        secret_id: &str,
        secret: &NewSecret,
    ) -> AdminResult<()> {
        let result = async {
            let id = parse_child_id(secret_id, "secret")?;
            let row = secret_row(secret)?;
            let key = secret_key(row.secret_type.as_deref(), &row.value);
            self.try_modify(subject, |record| {
                update_by_id(
                    &mut record.scope_secrets,
                    id,
                    |other| secret_key(other.secret_type.as_deref(), &other.value) == key,
                    "Secret",
                    |existing| {
                        existing.secret_type = row.secret_type;
                        existing.value = row.value;
                        existing.description = row.description;
                        existing.expiration = row.expiration;
                    },
                )
            })
            .await
        }
        .await;
        finish("update_scope_secret", subject, result)
    }

    pub async fn remove_scope_secret(&self, subject: &str, secret_id: &str) -> AdminResult<()> {
        let result = async {
            let id = parse_child_id(secret_id, "secret")?;
            self.modify(subject, |record| remove_by_id(&mut record.scope_secrets, id))
                .await
        }
        .await;
        finish("remove_scope_secret", subject, result)
    }
}

/// Entry point for the admin API: clients, scopes and the editable-property metadata
#[derive(Clone)]
pub struct IdentityAdminManager {
    clients: ClientAdminService,
    scopes: ScopeAdminService,
}

impl IdentityAdminManager {
    pub fn new(storage: Arc<dyn AdminStorage>, defaults: ClientDefaults) -> Self {
        let client_store: Arc<dyn ClientStore> = storage.clone();
        let scope_store: Arc<dyn ScopeStore> = storage;
        Self {
            clients: ClientAdminService::new(client_store, defaults),
            scopes: ScopeAdminService::new(scope_store),
        }
    }

    pub fn clients(&self) -> &ClientAdminService {
        &self.clients
    }

    pub fn scopes(&self) -> &ScopeAdminService {
        &self.scopes
    }

    pub fn get_metadata(&self) -> AdminMetadata {
        AdminMetadata {
            client: ClientMetadata {
                supports_create: true,
                supports_delete: true,
                create_properties: describe(Client::create_properties()),
                update_properties: describe(Client::properties()),
            },
            scope: ScopeMetadata {
                supports_create: true,
                supports_delete: true,
                create_properties: describe(Scope::create_properties()),
                update_properties: describe(Scope::properties()),
            },
        }
    }
}

fn describe<T: 'static>(descriptors: &[PropertyDescriptor<T>]) -> Vec<PropertyMetadata> {
    descriptors.iter().map(PropertyDescriptor::metadata).collect()
}

fn client_detail(record: &ClientRecord) -> ClientDetail {
    ClientDetail {
        subject: record.id.to_string(),
        client_id: record.client_id.clone(),
        client_name: record.client_name.clone(),
        properties: property_values(&Client::from(record)),
        claims: record.claims.iter().map(Into::into).collect(),
        client_secrets: record.client_secrets.iter().map(Into::into).collect(),
        identity_provider_restrictions: record
            .identity_provider_restrictions
            .iter()
            .map(Into::into)
            .collect(),
        post_logout_redirect_uris: record
            .post_logout_redirect_uris
            .iter()
            .map(Into::into)
            .collect(),
        redirect_uris: record.redirect_uris.iter().map(Into::into).collect(),
        allowed_cors_origins: record.allowed_cors_origins.iter().map(Into::into).collect(),
        allowed_custom_grant_types: record
            .allowed_custom_grant_types
            .iter()
            .map(Into::into)
            .collect(),
        allowed_scopes: record.allowed_scopes.iter().map(Into::into).collect(),
    }
}

fn scope_detail(record: &ScopeRecord) -> ScopeDetail {
    ScopeDetail {
        subject: record.id.to_string(),
        name: record.name.clone(),
        description: record.description.clone(),
        properties: property_values(&Scope::from(record)),
        scope_claims: record.scope_claims.iter().map(Into::into).collect(),
        scope_secrets: record.scope_secrets.iter().map(Into::into).collect(),
    }
}

/// Converts an operation result into an outcome, logging failures
fn finish<T>(operation: &'static str, subject: &str, result: Result<T, AdminError>) -> AdminResult<T> {
    match &result {
        Ok(_) => tracing::debug!(operation, subject, "Admin operation succeeded"),
        Err(AdminError::Storage(e)) => {
            tracing::error!(error = ?e, operation, subject, "Admin operation failed to persist")
        }
        Err(e) => tracing::warn!(error = %e, operation, subject, "Admin operation rejected"),
    }
    result.into()
}

fn parse_subject(subject: &str) -> Result<i64, AdminError> {
    subject
        .trim()
        .parse::<i64>()
        .map_err(|_| AdminError::InvalidSubject)
}

fn parse_child_id(id: &str, family: &'static str) -> Result<i64, AdminError> {
    id.trim()
        .parse::<i64>()
        .map_err(|_| AdminError::InvalidChildId(family))
}

fn required_value(field: &str, value: &str) -> Result<String, AdminError> {
    if value.trim().is_empty() {
        return Err(AdminError::validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|value| !value.is_empty()).cloned()
}

fn secret_row(secret: &NewSecret) -> Result<SecretRow, AdminError> {
    let value = required_value("Value", &secret.value)?;
    let secret_type = non_empty(&secret.secret_type).unwrap_or_else(|| DEFAULT_SECRET_TYPE.to_string());
    Ok(SecretRow {
        id: 0,
        secret_type: Some(secret_type),
        value,
        description: non_empty(&secret.description),
        expiration: secret.expiration,
    })
}

fn scope_claim_row(claim: &NewScopeClaim) -> Result<ScopeClaimRow, AdminError> {
    Ok(ScopeClaimRow {
        id: 0,
        name: required_value("Name", &claim.name)?,
        description: non_empty(&claim.description),
        always_include_in_id_token: claim.always_include_in_id_token,
    })
}

/// Appends the row built by `fresh` unless a row matching `exists` is present
fn add_unique<R>(rows: &mut Vec<R>, exists: impl Fn(&R) -> bool, fresh: impl FnOnce() -> R) -> bool {
    if rows.iter().any(exists) {
        return false;
    }
    rows.push(fresh());
    true
}

fn add_secret(rows: &mut Vec<SecretRow>, row: SecretRow) -> bool {
    let key = secret_key(row.secret_type.as_deref(), &row.value);
    add_unique(
        rows,
        |existing| secret_key(existing.secret_type.as_deref(), &existing.value) == key,
        || row,
    )
}

fn remove_by_id<R: ChildRow>(rows: &mut Vec<R>, id: i64) -> bool {
    let before = rows.len();
    rows.retain(|row| row.id() != id);
    rows.len() != before
}

/// Rewrites the row with `id`. Refuses when another row already holds the
/// natural key the update would give it.
fn update_by_id<R: ChildRow>(
    rows: &mut [R],
    id: i64,
    clashes: impl Fn(&R) -> bool,
    family: &str,
    update: impl FnOnce(&mut R),
) -> Result<bool, AdminError> {
    if !rows.iter().any(|row| row.id() == id) {
        return Ok(false);
    }
    if rows.iter().any(|row| row.id() != id && clashes(row)) {
        return Err(AdminError::validation(format!("{family} already exists")));
    }
    match rows.iter_mut().find(|row| row.id() == id) {
        Some(row) => {
            update(row);
            Ok(true)
        }
        None => Ok(false),
    }
}
