//! Explicit property descriptor tables for the editable models.
//!
//! Each editable field is listed once with a text getter and a text setter, so
//! get/set-by-name is a table lookup and every editable field can be
//! enumerated for the admin metadata.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::model::{Client, Scope};
use super::types::UnknownVariant;
use super::values::{PropertyMetadata, PropertyValue};
use crate::errors::AdminError;

/// Semantic type tag of an editable property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    String,
    Integer,
    Boolean,
    Enumeration,
    Date,
}

type Getter<T> = fn(&T) -> String;
type Setter<T> = fn(&mut T, &str) -> Result<(), String>;

/// One editable field of `T`
pub struct PropertyDescriptor<T: 'static> {
    pub name: &'static str,
    pub kind: PropertyKind,
    pub required: bool,
    get: Getter<T>,
    set: Setter<T>,
}

impl<T> PropertyDescriptor<T> {
    const fn new(
        name: &'static str,
        kind: PropertyKind,
        required: bool,
        get: Getter<T>,
        set: Setter<T>,
    ) -> Self {
        Self {
            name,
            kind,
            required,
            get,
            set,
        }
    }

    /// Current value rendered as text
    pub fn get(&self, model: &T) -> String {
        (self.get)(model)
    }

    /// Parses `value` into the field. A failure leaves the model untouched.
    pub fn set(&self, model: &mut T, value: &str) -> Result<(), String> {
        if self.required && value.trim().is_empty() {
            return Err(format!("{} is required", self.name));
        }
        (self.set)(model, value).map_err(|err| format!("{}: {}", self.name, err))
    }

    pub fn metadata(&self) -> PropertyMetadata {
        PropertyMetadata {
            property_type: self.name.to_string(),
            name: display_name(self.name),
            data_type: self.kind,
            required: self.required,
        }
    }
}

/// A model whose fields can be read and written by property name
pub trait EditableModel: Default + Sized + 'static {
    /// Properties consumed directly when creating a new instance
    fn create_properties() -> &'static [PropertyDescriptor<Self>];

    /// Properties editable on an existing instance
    fn properties() -> &'static [PropertyDescriptor<Self>];

    fn property(name: &str) -> Option<&'static PropertyDescriptor<Self>> {
        Self::properties()
            .iter()
            .find(|descriptor| descriptor.name == name)
    }

    fn create_property(name: &str) -> Option<&'static PropertyDescriptor<Self>> {
        Self::create_properties()
            .iter()
            .find(|descriptor| descriptor.name == name)
    }
}

/// Renders every update property of `model`
pub fn property_values<T: EditableModel>(model: &T) -> Vec<PropertyValue> {
    T::properties()
        .iter()
        .map(|descriptor| PropertyValue::new(descriptor.name, descriptor.get(model)))
        .collect()
}

pub fn get_property<T: EditableModel>(model: &T, name: &str) -> Result<String, AdminError> {
    T::property(name)
        .map(|descriptor| descriptor.get(model))
        .ok_or_else(|| AdminError::UnknownProperty(name.to_string()))
}

/// Applies a single named update. Unknown names are an error value.
pub fn set_property<T: EditableModel>(
    model: &mut T,
    name: &str,
    value: &str,
) -> Result<(), AdminError> {
    let descriptor =
        T::property(name).ok_or_else(|| AdminError::UnknownProperty(name.to_string()))?;
    descriptor.set(model, value).map_err(AdminError::validation)
}

/// Applies create-time pairs to a fresh `model`, accumulating every failure.
///
/// Create properties are consumed first; any other pair goes through the
/// update table. Required create properties must end up non-empty.
pub fn apply_create_properties<T: EditableModel>(
    mut model: T,
    properties: &[PropertyValue],
) -> Result<T, AdminError> {
    let mut errors = Vec::new();

    for property in properties {
        let name = property.property_type.as_str();
        let descriptor = T::create_property(name).or_else(|| T::property(name));
        match descriptor {
            Some(descriptor) => {
                if let Err(err) = descriptor.set(&mut model, &property.value) {
                    errors.push(err);
                }
            }
            None => errors.push(AdminError::UnknownProperty(name.to_string()).to_string()),
        }
    }

    for descriptor in T::create_properties() {
        if descriptor.required && descriptor.get(&model).trim().is_empty() {
            let message = format!("{} is required", descriptor.name);
            if !errors.contains(&message) {
                errors.push(message);
            }
        }
    }

    if errors.is_empty() {
        Ok(model)
    } else {
        Err(AdminError::Validation(errors))
    }
}

/// "AccessTokenLifetime" -> "Access Token Lifetime"
fn display_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut previous_lower = false;
    for c in name.chars() {
        if c.is_uppercase() && previous_lower {
            out.push(' ');
        }
        previous_lower = c.is_lowercase() || c.is_ascii_digit();
        out.push(c);
    }
    out
}

fn parse_bool(value: &str) -> Result<bool, String> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(format!("'{}' is not a valid boolean", value))
    }
}

fn parse_int(value: &str) -> Result<i32, String> {
    value
        .trim()
        .parse::<i32>()
        .map_err(|_| format!("'{}' is not a valid integer", value.trim()))
}

fn parse_enum<E: FromStr<Err = UnknownVariant>>(value: &str) -> Result<E, String> {
    value.parse::<E>().map_err(|err| err.to_string())
}

fn required_text(value: &str) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        Err("a value is required".to_string())
    } else {
        Ok(value.to_string())
    }
}

fn optional_text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

use PropertyKind::{Boolean, Enumeration, Integer, String as Text};

static CLIENT_CREATE_PROPERTIES: [PropertyDescriptor<Client>; 2] = [
    PropertyDescriptor::new(
        "ClientName",
        Text,
        true,
        |c| c.client_name.clone(),
        |c, v| {
            c.client_name = required_text(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "ClientId",
        Text,
        true,
        |c| c.client_id.clone(),
        |c, v| {
            c.client_id = required_text(v)?;
            Ok(())
        },
    ),
];

static CLIENT_PROPERTIES: [PropertyDescriptor<Client>; 28] = [
    PropertyDescriptor::new(
        "ClientId",
        Text,
        true,
        |c| c.client_id.clone(),
        |c, v| {
            c.client_id = required_text(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "ClientName",
        Text,
        true,
        |c| c.client_name.clone(),
        |c, v| {
            c.client_name = required_text(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "ClientUri",
        Text,
        false,
        |c| text(&c.client_uri),
        |c, v| {
            c.client_uri = optional_text(v);
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "LogoUri",
        Text,
        false,
        |c| text(&c.logo_uri),
        |c, v| {
            c.logo_uri = optional_text(v);
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "Enabled",
        Boolean,
        false,
        |c| c.enabled.to_string(),
        |c, v| {
            c.enabled = parse_bool(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "RequireConsent",
        Boolean,
        false,
        |c| c.require_consent.to_string(),
        |c, v| {
            c.require_consent = parse_bool(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "AllowRememberConsent",
        Boolean,
        false,
        |c| c.allow_remember_consent.to_string(),
        |c, v| {
            c.allow_remember_consent = parse_bool(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "AllowAccessTokensViaBrowser",
        Boolean,
        false,
        |c| c.allow_access_tokens_via_browser.to_string(),
        |c, v| {
            c.allow_access_tokens_via_browser = parse_bool(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "Flow",
        Enumeration,
        false,
        |c| c.flow.to_string(),
        |c, v| {
            c.flow = parse_enum(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "AllowClientCredentialsOnly",
        Boolean,
        false,
        |c| c.allow_client_credentials_only.to_string(),
        |c, v| {
            c.allow_client_credentials_only = parse_bool(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "LogoutUri",
        Text,
        false,
        |c| text(&c.logout_uri),
        |c, v| {
            c.logout_uri = optional_text(v);
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "LogoutSessionRequired",
        Boolean,
        false,
        |c| c.logout_session_required.to_string(),
        |c, v| {
            c.logout_session_required = parse_bool(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "RequireSignOutPrompt",
        Boolean,
        false,
        |c| c.require_sign_out_prompt.to_string(),
        |c, v| {
            c.require_sign_out_prompt = parse_bool(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "AllowAccessToAllScopes",
        Boolean,
        false,
        |c| c.allow_access_to_all_scopes.to_string(),
        |c, v| {
            c.allow_access_to_all_scopes = parse_bool(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "IdentityTokenLifetime",
        Integer,
        false,
        |c| c.identity_token_lifetime.to_string(),
        |c, v| {
            c.identity_token_lifetime = parse_int(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "AccessTokenLifetime",
        Integer,
        false,
        |c| c.access_token_lifetime.to_string(),
        |c, v| {
            c.access_token_lifetime = parse_int(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "AuthorizationCodeLifetime",
        Integer,
        false,
        |c| c.authorization_code_lifetime.to_string(),
        |c, v| {
            c.authorization_code_lifetime = parse_int(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "AbsoluteRefreshTokenLifetime",
        Integer,
        false,
        |c| c.absolute_refresh_token_lifetime.to_string(),
        |c, v| {
            c.absolute_refresh_token_lifetime = parse_int(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "SlidingRefreshTokenLifetime",
        Integer,
        false,
        |c| c.sliding_refresh_token_lifetime.to_string(),
        |c, v| {
            c.sliding_refresh_token_lifetime = parse_int(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "RefreshTokenUsage",
        Enumeration,
        false,
        |c| c.refresh_token_usage.to_string(),
        |c, v| {
            c.refresh_token_usage = parse_enum(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "UpdateAccessTokenClaimsOnRefresh",
        Boolean,
        false,
        |c| c.update_access_token_claims_on_refresh.to_string(),
        |c, v| {
            c.update_access_token_claims_on_refresh = parse_bool(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "RefreshTokenExpiration",
        Enumeration,
        false,
        |c| c.refresh_token_expiration.to_string(),
        |c, v| {
            c.refresh_token_expiration = parse_enum(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "AccessTokenType",
        Enumeration,
        false,
        |c| c.access_token_type.to_string(),
        |c, v| {
            c.access_token_type = parse_enum(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "EnableLocalLogin",
        Boolean,
        false,
        |c| c.enable_local_login.to_string(),
        |c, v| {
            c.enable_local_login = parse_bool(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "IncludeJwtId",
        Boolean,
        false,
        |c| c.include_jwt_id.to_string(),
        |c, v| {
            c.include_jwt_id = parse_bool(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "AlwaysSendClientClaims",
        Boolean,
        false,
        |c| c.always_send_client_claims.to_string(),
        |c, v| {
            c.always_send_client_claims = parse_bool(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "PrefixClientClaims",
        Boolean,
        false,
        |c| c.prefix_client_claims.to_string(),
        |c, v| {
            c.prefix_client_claims = parse_bool(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "AllowAccessToAllCustomGrantTypes",
        Boolean,
        false,
        |c| c.allow_access_to_all_custom_grant_types.to_string(),
        |c, v| {
            c.allow_access_to_all_custom_grant_types = parse_bool(v)?;
            Ok(())
        },
    ),
];

static SCOPE_CREATE_PROPERTIES: [PropertyDescriptor<Scope>; 1] = [PropertyDescriptor::new(
    "ScopeName",
    Text,
    true,
    |s| s.name.clone(),
    |s, v| {
        s.name = required_text(v)?;
        Ok(())
    },
)];

static SCOPE_PROPERTIES: [PropertyDescriptor<Scope>; 11] = [
    PropertyDescriptor::new(
        "Name",
        Text,
        true,
        |s| s.name.clone(),
        |s, v| {
            s.name = required_text(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "DisplayName",
        Text,
        false,
        |s| text(&s.display_name),
        |s, v| {
            s.display_name = optional_text(v);
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "Description",
        Text,
        false,
        |s| text(&s.description),
        |s, v| {
            s.description = optional_text(v);
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "ClaimsRule",
        Text,
        false,
        |s| text(&s.claims_rule),
        |s, v| {
            s.claims_rule = optional_text(v);
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "Required",
        Boolean,
        false,
        |s| s.required.to_string(),
        |s, v| {
            s.required = parse_bool(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "Emphasize",
        Boolean,
        false,
        |s| s.emphasize.to_string(),
        |s, v| {
            s.emphasize = parse_bool(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "Type",
        Enumeration,
        false,
        |s| s.scope_type.to_string(),
        |s, v| {
            s.scope_type = parse_enum(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "IncludeAllClaimsForUser",
        Boolean,
        false,
        |s| s.include_all_claims_for_user.to_string(),
        |s, v| {
            s.include_all_claims_for_user = parse_bool(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "ShowInDiscoveryDocument",
        Boolean,
        false,
        |s| s.show_in_discovery_document.to_string(),
        |s, v| {
            s.show_in_discovery_document = parse_bool(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "Enabled",
        Boolean,
        false,
        |s| s.enabled.to_string(),
        |s, v| {
            s.enabled = parse_bool(v)?;
            Ok(())
        },
    ),
    PropertyDescriptor::new(
        "AllowUnrestrictedIntrospection",
        Boolean,
        false,
        |s| s.allow_unrestricted_introspection.to_string(),
        |s, v| {
            s.allow_unrestricted_introspection = parse_bool(v)?;
            Ok(())
        },
    ),
];

impl EditableModel for Client {
    fn create_properties() -> &'static [PropertyDescriptor<Self>] {
        &CLIENT_CREATE_PROPERTIES
    }

    fn properties() -> &'static [PropertyDescriptor<Self>] {
        &CLIENT_PROPERTIES
    }
}

impl EditableModel for Scope {
    fn create_properties() -> &'static [PropertyDescriptor<Self>] {
        &SCOPE_CREATE_PROPERTIES
    }

    fn properties() -> &'static [PropertyDescriptor<Self>] {
        &SCOPE_PROPERTIES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::types::{Flow, ScopeType};

    fn pairs(values: &[(&str, &str)]) -> Vec<PropertyValue> {
        values
            .iter()
            .map(|(name, value)| PropertyValue::new(*name, *value))
            .collect()
    }

    #[test]
    fn test_boolean_false_is_not_truthy() {
        let mut client = Client::default();
        assert!(client.require_consent);
        set_property(&mut client, "RequireConsent", "false").unwrap();
        assert!(!client.require_consent);
        assert_eq!(get_property(&client, "RequireConsent").unwrap(), "false");

        set_property(&mut client, "RequireConsent", "TRUE").unwrap();
        assert_eq!(get_property(&client, "RequireConsent").unwrap(), "true");
    }

    #[test]
    fn test_boolean_rejects_other_text() {
        let mut client = Client::default();
        let err = set_property(&mut client, "Enabled", "yes").unwrap_err();
        assert!(matches!(err, AdminError::Validation(_)));
        assert!(client.enabled);
    }

    #[test]
    fn test_integer_and_enum_round_trip() {
        let mut client = Client::default();
        set_property(&mut client, "AccessTokenLifetime", "7200").unwrap();
        set_property(&mut client, "Flow", "clientcredentials").unwrap();
        assert_eq!(client.access_token_lifetime, 7200);
        assert_eq!(client.flow, Flow::ClientCredentials);
        assert_eq!(get_property(&client, "Flow").unwrap(), "ClientCredentials");

        assert!(set_property(&mut client, "AccessTokenLifetime", "3000000000").is_err());
        assert!(set_property(&mut client, "Flow", "Magic").is_err());
    }

    #[test]
    fn test_optional_string_clears_on_empty_text() {
        let mut client = Client::default();
        set_property(&mut client, "ClientUri", "https://app.example.com").unwrap();
        assert_eq!(client.client_uri.as_deref(), Some("https://app.example.com"));
        set_property(&mut client, "ClientUri", "").unwrap();
        assert_eq!(client.client_uri, None);
        assert_eq!(get_property(&client, "ClientUri").unwrap(), "");
    }

    #[test]
    fn test_required_string_rejects_empty_text() {
        let mut client = Client::default();
        client.client_id = "app1".to_string();
        let err = set_property(&mut client, "ClientId", "  ").unwrap_err();
        assert_eq!(err.to_string(), "ClientId is required");
        assert_eq!(client.client_id, "app1");
    }

    #[test]
    fn test_unknown_property_is_an_error_value() {
        let mut scope = Scope::default();
        let err = set_property(&mut scope, "Colour", "blue").unwrap_err();
        assert_eq!(err.to_string(), "Invalid property type Colour");
    }

    #[test]
    fn test_create_client_accumulates_errors() {
        let err = apply_create_properties(Client::default(), &pairs(&[
            ("ClientName", "App One"),
            ("Enabled", "maybe"),
            ("AccessTokenLifetime", "soon"),
        ]))
        .unwrap_err();
        let AdminError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&"ClientId is required".to_string()));
    }

    #[test]
    fn test_create_client_applies_extra_pairs() {
        let client = apply_create_properties(Client::default(), &pairs(&[
            ("ClientId", "app1"),
            ("ClientName", "App One"),
            ("RequireConsent", "false"),
        ]))
        .unwrap();
        assert_eq!(client.client_id, "app1");
        assert_eq!(client.client_name, "App One");
        assert!(!client.require_consent);
    }

    #[test]
    fn test_create_scope_accepts_either_name_property() {
        let scope = apply_create_properties(Scope::default(), &pairs(&[("ScopeName", "read")])).unwrap();
        assert_eq!(scope.name, "read");

        let scope =
            apply_create_properties(Scope::default(), &pairs(&[("Name", "write"), ("Type", "Identity")]))
                .unwrap();
        assert_eq!(scope.name, "write");
        assert_eq!(scope.scope_type, ScopeType::Identity);

        assert!(apply_create_properties(Scope::default(), &[]).is_err());
    }

    #[test]
    fn test_every_property_round_trips_its_own_text() {
        let client = Client::default();
        for descriptor in Client::properties() {
            let mut copy = client.clone();
            let value = descriptor.get(&client);
            if descriptor.required && value.is_empty() {
                continue;
            }
            descriptor.set(&mut copy, &value).unwrap();
            assert_eq!(copy, client, "{}", descriptor.name);
        }
    }

    #[test]
    fn test_metadata_display_names() {
        let metadata = Client::property("AccessTokenLifetime").unwrap().metadata();
        assert_eq!(metadata.name, "Access Token Lifetime");
        assert_eq!(metadata.data_type, PropertyKind::Integer);
        assert!(!metadata.required);
        assert_eq!(display_name("IncludeJwtId"), "Include Jwt Id");
    }
}
