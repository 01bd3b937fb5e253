//! Admin value objects returned to callers of the manager.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::metadata::PropertyKind;

/// One editable property rendered as text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyValue {
    #[serde(rename = "type")]
    pub property_type: String,
    pub value: String,
}

impl PropertyValue {
    pub fn new(property_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property_type: property_type.into(),
            value: value.into(),
        }
    }
}

/// Describes an editable property to API consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyMetadata {
    #[serde(rename = "type")]
    pub property_type: String,
    pub name: String,
    pub data_type: PropertyKind,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientMetadata {
    pub supports_create: bool,
    pub supports_delete: bool,
    pub create_properties: Vec<PropertyMetadata>,
    pub update_properties: Vec<PropertyMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeMetadata {
    pub supports_create: bool,
    pub supports_delete: bool,
    pub create_properties: Vec<PropertyMetadata>,
    pub update_properties: Vec<PropertyMetadata>,
}

/// Everything an admin UI needs to render create and edit forms
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminMetadata {
    pub client: ClientMetadata,
    pub scope: ScopeMetadata,
}

/// One page of a filtered listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryResult<T> {
    pub start: usize,
    pub count: usize,
    pub total: usize,
    pub filter: Option<String>,
    pub items: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateResult {
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientSummary {
    pub subject: String,
    pub client_id: String,
    pub client_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientClaimValue {
    pub id: String,
    #[serde(rename = "type")]
    pub claim_type: String,
    pub value: String,
}

/// Secret as shown on client and scope detail views
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretValue {
    pub id: String,
    #[serde(rename = "type")]
    pub secret_type: Option<String>,
    pub value: String,
    pub description: Option<String>,
    pub expiration: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientIdPRestrictionValue {
    pub id: String,
    pub provider: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientRedirectUriValue {
    pub id: String,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientPostLogoutRedirectUriValue {
    pub id: String,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientCorsOriginValue {
    pub id: String,
    pub origin: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientCustomGrantTypeValue {
    pub id: String,
    pub grant_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientScopeValue {
    pub id: String,
    pub scope: String,
}

/// Composite client view: identity, editable properties and every child family
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientDetail {
    pub subject: String,
    pub client_id: String,
    pub client_name: String,
    pub properties: Vec<PropertyValue>,
    pub claims: Vec<ClientClaimValue>,
    pub client_secrets: Vec<SecretValue>,
    pub identity_provider_restrictions: Vec<ClientIdPRestrictionValue>,
    pub post_logout_redirect_uris: Vec<ClientPostLogoutRedirectUriValue>,
    pub redirect_uris: Vec<ClientRedirectUriValue>,
    pub allowed_cors_origins: Vec<ClientCorsOriginValue>,
    pub allowed_custom_grant_types: Vec<ClientCustomGrantTypeValue>,
    pub allowed_scopes: Vec<ClientScopeValue>,
}

impl ClientDetail {
    /// Text value of the named property, if the client exposes it
    pub fn property(&self, name: &str) -> Option<&str> {
        find_property(&self.properties, name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeSummary {
    pub subject: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeClaimValue {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub always_include_in_id_token: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeDetail {
    pub subject: String,
    pub name: String,
    pub description: Option<String>,
    pub properties: Vec<PropertyValue>,
    pub scope_claims: Vec<ScopeClaimValue>,
    pub scope_secrets: Vec<SecretValue>,
}

impl ScopeDetail {
    pub fn property(&self, name: &str) -> Option<&str> {
        find_property(&self.properties, name)
    }
}

fn find_property<'a>(properties: &'a [PropertyValue], name: &str) -> Option<&'a str> {
    properties
        .iter()
        .find(|property| property.property_type == name)
        .map(|property| property.value.as_str())
}

/// Client claim supplied to an add operation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewClientClaim {
    #[serde(rename = "type")]
    pub claim_type: String,
    pub value: String,
}

/// Secret supplied to an add or update operation. A missing type means `SharedSecret`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewSecret {
    #[serde(rename = "type", default)]
    pub secret_type: Option<String>,
    pub value: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub expiration: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewScopeClaim {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub always_include_in_id_token: bool,
}
