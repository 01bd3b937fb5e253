//! Core domain models edited through the admin manager.
//!
//! These are the flattened shapes the identity server consumes: child rows are
//! reduced to plain values and a few flags carry their core-side names.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::types::{AccessTokenType, DEFAULT_SECRET_TYPE, Flow, ScopeType, TokenExpiration, TokenUsage};

/// A claim with a type and a value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub claim_type: String,
    pub value: String,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

/// A client or scope secret
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    pub secret_type: String,
    pub value: String,
    pub description: Option<String>,
    pub expiration: Option<DateTime<FixedOffset>>,
}

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            secret_type: DEFAULT_SECRET_TYPE.to_string(),
            value: value.into(),
            description: None,
            expiration: None,
        }
    }
}

/// A claim emitted when a scope is granted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeClaim {
    pub name: String,
    pub description: Option<String>,
    pub always_include_in_id_token: bool,
}

impl ScopeClaim {
    pub fn new(name: impl Into<String>, always_include_in_id_token: bool) -> Self {
        Self {
            name: name.into(),
            description: None,
            always_include_in_id_token,
        }
    }
}

/// OAuth2 / OpenID Connect relying party configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
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
    pub update_access_token_claims_on_refresh: bool,
    pub refresh_token_expiration: TokenExpiration,
    pub access_token_type: AccessTokenType,
    pub enable_local_login: bool,
    pub include_jwt_id: bool,
    pub always_send_client_claims: bool,
    pub prefix_client_claims: bool,
    pub allow_access_to_all_custom_grant_types: bool,
    pub claims: Vec<Claim>,
    pub client_secrets: Vec<Secret>,
    pub redirect_uris: Vec<String>,
    pub post_logout_redirect_uris: Vec<String>,
    pub allowed_cors_origins: Vec<String>,
    pub allowed_custom_grant_types: Vec<String>,
    pub allowed_scopes: Vec<String>,
    pub identity_provider_restrictions: Vec<String>,
}

impl Default for Client {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_name: String::new(),
            client_uri: None,
            logo_uri: None,
            enabled: true,
            require_consent: true,
            allow_remember_consent: true,
            allow_access_tokens_via_browser: true,
            flow: Flow::Implicit,
            allow_client_credentials_only: false,
            logout_uri: None,
            logout_session_required: true,
            require_sign_out_prompt: false,
            allow_access_to_all_scopes: false,
            identity_token_lifetime: 300,
            access_token_lifetime: 3600,
            authorization_code_lifetime: 300,
            absolute_refresh_token_lifetime: 2_592_000,
            sliding_refresh_token_lifetime: 1_296_000,
            refresh_token_usage: TokenUsage::OneTimeOnly,
            update_access_token_claims_on_refresh: false,
            refresh_token_expiration: TokenExpiration::Absolute,
            access_token_type: AccessTokenType::Jwt,
            enable_local_login: true,
            include_jwt_id: false,
            always_send_client_claims: false,
            prefix_client_claims: true,
            allow_access_to_all_custom_grant_types: false,
            claims: Vec::new(),
            client_secrets: Vec::new(),
            redirect_uris: Vec::new(),
            post_logout_redirect_uris: Vec::new(),
            allowed_cors_origins: Vec::new(),
            allowed_custom_grant_types: Vec::new(),
            allowed_scopes: Vec::new(),
            identity_provider_restrictions: Vec::new(),
        }
    }
}

/// Named permission or claims bundle a client may request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
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
    pub claims: Vec<ScopeClaim>,
    pub scope_secrets: Vec<Secret>,
}

impl Default for Scope {
    fn default() -> Self {
        Self {
            name: String::new(),
            display_name: None,
            description: None,
            claims_rule: None,
            required: false,
            emphasize: false,
            scope_type: ScopeType::Resource,
            include_all_claims_for_user: false,
            show_in_discovery_document: true,
            enabled: true,
            allow_unrestricted_introspection: false,
            claims: Vec::new(),
            scope_secrets: Vec::new(),
        }
    }
}

impl Scope {
    /// Identity scope whose claims are all listed up front
    pub fn identity(name: &str, claims: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            scope_type: ScopeType::Identity,
            claims: claims
                .iter()
                .map(|claim| ScopeClaim::new(*claim, false))
                .collect(),
            ..Default::default()
        }
    }
}
