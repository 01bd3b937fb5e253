//! Store-shape records for client and scope configuration rows.
//!
//! Every record carries the store-assigned `id` (0 until inserted) and owns its
//! child rows. Child rows with `id == 0` are new and receive an id when the
//! parent is persisted.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Secret type assumed when a secret row does not name one
pub const DEFAULT_SECRET_TYPE: &str = "SharedSecret";

/// OpenID Connect / OAuth2 flow a client is allowed to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flow {
    AuthorizationCode,
    #[default]
    Implicit,
    Hybrid,
    ClientCredentials,
    ResourceOwner,
    Custom,
    AuthorizationCodeWithProofKey,
    HybridWithProofKey,
}

impl Flow {
    pub const ALL: [Flow; 8] = [
        Flow::AuthorizationCode,
        Flow::Implicit,
        Flow::Hybrid,
        Flow::ClientCredentials,
        Flow::ResourceOwner,
        Flow::Custom,
        Flow::AuthorizationCodeWithProofKey,
        Flow::HybridWithProofKey,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Flow::AuthorizationCode => "AuthorizationCode",
            Flow::Implicit => "Implicit",
            Flow::Hybrid => "Hybrid",
            Flow::ClientCredentials => "ClientCredentials",
            Flow::ResourceOwner => "ResourceOwner",
            Flow::Custom => "Custom",
            Flow::AuthorizationCodeWithProofKey => "AuthorizationCodeWithProofKey",
            Flow::HybridWithProofKey => "HybridWithProofKey",
        }
    }
}

/// Format of issued access tokens
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessTokenType {
    #[default]
    Jwt,
    Reference,
}

impl AccessTokenType {
    pub const ALL: [AccessTokenType; 2] = [AccessTokenType::Jwt, AccessTokenType::Reference];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessTokenType::Jwt => "Jwt",
            AccessTokenType::Reference => "Reference",
        }
    }
}

/// Whether a refresh token handle survives its own use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenUsage {
    ReUse,
    #[default]
    OneTimeOnly,
}

impl TokenUsage {
    pub const ALL: [TokenUsage; 2] = [TokenUsage::ReUse, TokenUsage::OneTimeOnly];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenUsage::ReUse => "ReUse",
            TokenUsage::OneTimeOnly => "OneTimeOnly",
        }
    }
}

/// Refresh token expiration policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenExpiration {
    Sliding,
    #[default]
    Absolute,
}

impl TokenExpiration {
    pub const ALL: [TokenExpiration; 2] = [TokenExpiration::Sliding, TokenExpiration::Absolute];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenExpiration::Sliding => "Sliding",
            TokenExpiration::Absolute => "Absolute",
        }
    }
}

/// Identity scopes carry user claims, resource scopes guard APIs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeType {
    Identity,
    #[default]
    Resource,
}

impl ScopeType {
    pub const ALL: [ScopeType; 2] = [ScopeType::Identity, ScopeType::Resource];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeType::Identity => "Identity",
            ScopeType::Resource => "Resource",
        }
    }
}

/// Error returned when a symbolic enumeration name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{value}' is not a valid {type_name}")]
pub struct UnknownVariant {
    pub type_name: &'static str,
    pub value: String,
}

fn parse_variant<T: Copy>(
    type_name: &'static str,
    all: &[T],
    name: fn(&T) -> &'static str,
    value: &str,
) -> Result<T, UnknownVariant> {
    let value = value.trim();
    all.iter()
        .find(|variant| name(variant).eq_ignore_ascii_case(value))
        .copied()
        .ok_or_else(|| UnknownVariant {
            type_name,
            value: value.to_string(),
        })
}

impl FromStr for Flow {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant("Flow", &Flow::ALL, Flow::as_str, s)
    }
}

impl FromStr for AccessTokenType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant(
            "AccessTokenType",
            &AccessTokenType::ALL,
            AccessTokenType::as_str,
            s,
        )
    }
}

impl FromStr for TokenUsage {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant("TokenUsage", &TokenUsage::ALL, TokenUsage::as_str, s)
    }
}

impl FromStr for TokenExpiration {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant(
            "TokenExpiration",
            &TokenExpiration::ALL,
            TokenExpiration::as_str,
            s,
        )
    }
}

impl FromStr for ScopeType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant("ScopeType", &ScopeType::ALL, ScopeType::as_str, s)
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(Flow, AccessTokenType, TokenUsage, TokenExpiration, ScopeType);

/// A child row owned by exactly one client or scope
pub trait ChildRow {
    fn id(&self) -> i64;

    fn set_id(&mut self, id: i64);
}

macro_rules! child_row {
    ($($ty:ty),*) => {
        $(impl ChildRow for $ty {
            fn id(&self) -> i64 {
                self.id
            }

            fn set_id(&mut self, id: i64) {
                self.id = id;
            }
        })*
    };
}

child_row!(
    ClientClaimRow,
    SecretRow,
    ClientRedirectUriRow,
    ClientPostLogoutRedirectUriRow,
    ClientCorsOriginRow,
    ClientCustomGrantTypeRow,
    ClientScopeRow,
    ClientIdPRestrictionRow,
    ScopeClaimRow
);

/// Claim issued to the client itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientClaimRow {
    pub id: i64,
    pub claim_type: String,
    pub value: String,
}

/// Secret attached to a client or a scope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRow {
    pub id: i64,
    pub secret_type: Option<String>,
    pub value: String,
    pub description: Option<String>,
    pub expiration: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRedirectUriRow {
    pub id: i64,
    pub uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientPostLogoutRedirectUriRow {
    pub id: i64,
    pub uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientCorsOriginRow {
    pub id: i64,
    pub origin: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientCustomGrantTypeRow {
    pub id: i64,
    pub grant_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientScopeRow {
    pub id: i64,
    pub scope: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientIdPRestrictionRow {
    pub id: i64,
    pub provider: String,
}

/// Persisted client configuration row with its owned child collections
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: i64,
    pub client_id: String,
    pub client_name: String,
    pub client_uri: Option<String>,
    pub logo_uri: Option<String>,
    pub enabled: bool,
    pub require_consent: bool,
    pub allow_remember_consent: bool,
    pub allow_access_tokens_via_browser: bool,
    pub flow: Flow,
    pub allow_client_credentials_only: bool,
    pub logout_uri: Option<String>,
    pub logout_session_required: bool,
    pub require_sign_out_prompt: bool,
    pub allow_access_to_all_scopes: bool,
    pub identity_token_lifetime: i32,
    pub access_token_lifetime: i32,
    pub authorization_code_lifetime: i32,
    pub absolute_refresh_token_lifetime: i32,
    pub sliding_refresh_token_lifetime: i32,
    pub refresh_token_usage: TokenUsage,
    pub update_access_token_on_refresh: bool,
    pub refresh_token_expiration: TokenExpiration,
    pub access_token_type: AccessTokenType,
    pub enable_local_login: bool,
    pub include_jwt_id: bool,
    pub always_send_client_claims: bool,
    pub prefix_client_claims: bool,
    pub allow_access_to_all_grant_types: bool,
    pub claims: Vec<ClientClaimRow>,
    pub client_secrets: Vec<SecretRow>,
    pub redirect_uris: Vec<ClientRedirectUriRow>,
    pub post_logout_redirect_uris: Vec<ClientPostLogoutRedirectUriRow>,
    pub allowed_cors_origins: Vec<ClientCorsOriginRow>,
    pub allowed_custom_grant_types: Vec<ClientCustomGrantTypeRow>,
    pub allowed_scopes: Vec<ClientScopeRow>,
    pub identity_provider_restrictions: Vec<ClientIdPRestrictionRow>,
}

/// Claim emitted for a scope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeClaimRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub always_include_in_id_token: bool,
}

/// Persisted scope configuration row with its owned child collections
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeRecord {
    pub id: i64,
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub claims_rule: Option<String>,
    pub required: bool,
    pub emphasize: bool,
    pub scope_type: ScopeType,
    pub include_all_claims_for_user: bool,
    pub show_in_discovery_document: bool,
    pub enabled: bool,
    pub allow_unrestricted_introspection: bool,
    pub scope_claims: Vec<ScopeClaimRow>,
    pub scope_secrets: Vec<SecretRow>,
}
