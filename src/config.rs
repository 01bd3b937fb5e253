//! Environment-based configuration types for the admin server runtime settings.

use anyhow::Result;

use crate::admin::ClientDefaults;
use crate::errors::ConfigError;

/// HTTP server port configuration
#[derive(Clone, Debug)]
pub struct HttpPort(u16);

/// Origins allowed to call the admin API from a browser
#[derive(Clone, Debug, Default)]
pub struct CorsOrigins(Vec<String>);

/// Whether the standard OpenID scopes are written into an empty store on startup
#[derive(Clone, Debug)]
pub struct SeedStandardScopes(bool);

/// Token lifetime in whole seconds, parsed from a duration string such as `5m` or `15d`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenLifetime(i32);

/// Main application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub version: String,
    pub http_port: HttpPort,
    pub http_cors_origins: CorsOrigins,
    pub storage_backend: String,
    pub database_url: Option<String>,
    pub seed_standard_scopes: SeedStandardScopes,
    pub client_default_identity_token_lifetime: TokenLifetime,
    pub client_default_access_token_lifetime: TokenLifetime,
    pub client_default_authorization_code_lifetime: TokenLifetime,
    pub client_default_absolute_refresh_token_lifetime: TokenLifetime,
    pub client_default_sliding_refresh_token_lifetime: TokenLifetime,
}

impl Config {
    /// Create a new configuration from environment variables
    pub fn new() -> Result<Self> {
        let http_port: HttpPort = default_env("HTTP_PORT", "8080").try_into()?;
        let http_cors_origins: CorsOrigins = optional_env("HTTP_CORS_ORIGINS").try_into()?;
        let storage_backend = default_env("STORAGE_BACKEND", "memory");
        let database_url = optional_env("DATABASE_URL");
        let seed_standard_scopes: SeedStandardScopes =
            default_env("SEED_STANDARD_SCOPES", "true").try_into()?;
        let client_default_identity_token_lifetime: TokenLifetime =
            default_env("CLIENT_DEFAULT_IDENTITY_TOKEN_LIFETIME", "5m").try_into()?;
        let client_default_access_token_lifetime: TokenLifetime =
            default_env("CLIENT_DEFAULT_ACCESS_TOKEN_LIFETIME", "1h").try_into()?;
        let client_default_authorization_code_lifetime: TokenLifetime =
            default_env("CLIENT_DEFAULT_AUTHORIZATION_CODE_LIFETIME", "5m").try_into()?;
        let client_default_absolute_refresh_token_lifetime: TokenLifetime =
            default_env("CLIENT_DEFAULT_ABSOLUTE_REFRESH_TOKEN_LIFETIME", "5m").try_into()?;
        let client_default_sliding_refresh_token_lifetime: TokenLifetime =
            default_env("CLIENT_DEFAULT_SLIDING_REFRESH_TOKEN_LIFETIME", "15d").try_into()?;

        Ok(Self {
            version: version()?,
            http_port,
            http_cors_origins,
            storage_backend,
            database_url,
            seed_standard_scopes,
            client_default_identity_token_lifetime,
            client_default_access_token_lifetime,
            client_default_authorization_code_lifetime,
            client_default_absolute_refresh_token_lifetime,
            client_default_sliding_refresh_token_lifetime,
        })
    }

    /// Defaults applied to newly created clients
    pub fn client_defaults(&self) -> ClientDefaults {
        ClientDefaults {
            identity_token_lifetime: *self.client_default_identity_token_lifetime.as_ref(),
            access_token_lifetime: *self.client_default_access_token_lifetime.as_ref(),
            authorization_code_lifetime: *self.client_default_authorization_code_lifetime.as_ref(),
            absolute_refresh_token_lifetime: *self
                .client_default_absolute_refresh_token_lifetime
                .as_ref(),
            sliding_refresh_token_lifetime: *self
                .client_default_sliding_refresh_token_lifetime
                .as_ref(),
            ..Default::default()
        }
    }
}

/// Get application version from build environment
pub fn version() -> Result<String> {
    option_env!("GIT_HASH")
        .or(option_env!("CARGO_PKG_VERSION"))
        .map(|val| val.to_string())
        .ok_or(ConfigError::VersionNotSet.into())
}

pub(crate) fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn default_env(name: &str, default_value: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default_value.to_string())
}

impl TryFrom<String> for HttpPort {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            Ok(Self(8080))
        } else {
            value
                .parse::<u16>()
                .map(Self)
                .map_err(|err| ConfigError::PortParsingFailed(err).into())
        }
    }
}

impl AsRef<u16> for HttpPort {
    fn as_ref(&self) -> &u16 {
        &self.0
    }
}

impl TryFrom<Option<String>> for CorsOrigins {
    type Error = anyhow::Error;

    fn try_from(value: Option<String>) -> Result<Self, Self::Error> {
        let value = value.unwrap_or_default();
        if value.is_empty() {
            return Ok(Self(Vec::new()));
        }

        let origins = value
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<String>>();

        Ok(Self(origins))
    }
}

impl TryFrom<String> for CorsOrigins {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(Some(value))
    }
}

impl AsRef<Vec<String>> for CorsOrigins {
    fn as_ref(&self) -> &Vec<String> {
        &self.0
    }
}

impl TryFrom<String> for SeedStandardScopes {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Self(true)),
            "false" | "0" | "no" | "off" => Ok(Self(false)),
            _ => Err(ConfigError::BoolParsingFailed(value).into()),
        }
    }
}

impl AsRef<bool> for SeedStandardScopes {
    fn as_ref(&self) -> &bool {
        &self.0
    }
}

impl TryFrom<String> for TokenLifetime {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let duration = duration_str::parse(&value)
            .map_err(|e| ConfigError::DurationParsingFailed(value.clone(), e.to_string()))?;
        let seconds = i32::try_from(duration.as_secs())
            .map_err(|_| ConfigError::DurationOutOfRange(value))?;
        Ok(Self(seconds))
    }
}

impl AsRef<i32> for TokenLifetime {
    fn as_ref(&self) -> &i32 {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_lifetime_parses_duration_strings() {
        let lifetime: TokenLifetime = "5m".to_string().try_into().unwrap();
        assert_eq!(*lifetime.as_ref(), 300);

        let lifetime: TokenLifetime = "15d".to_string().try_into().unwrap();
        assert_eq!(*lifetime.as_ref(), 1_296_000);

        assert!(TokenLifetime::try_from("soon".to_string()).is_err());
        assert!(TokenLifetime::try_from("100y".to_string()).is_err());
    }

    #[test]
    fn test_seed_standard_scopes_flag() {
        let flag: SeedStandardScopes = "off".to_string().try_into().unwrap();
        assert!(!flag.as_ref());
        let flag: SeedStandardScopes = "TRUE".to_string().try_into().unwrap();
        assert!(flag.as_ref());

        let err = SeedStandardScopes::try_from("maybe".to_string()).unwrap_err();
        assert!(err.to_string().contains("error-idadmin-config-6"));
    }

    #[test]
    fn test_cors_origins_split_on_commas() {
        let origins: CorsOrigins = Some("http://localhost:3000, ,https://admin.example.com".to_string())
            .try_into()
            .unwrap();
        assert_eq!(
            origins.as_ref(),
            &vec![
                "http://localhost:3000".to_string(),
                "https://admin.example.com".to_string()
            ]
        );
        let origins: CorsOrigins = None.try_into().unwrap();
        assert!(origins.as_ref().is_empty());
    }

    #[test]
    fn test_client_defaults_use_configured_lifetimes() {
        let config = Config {
            version: "test".to_string(),
            http_port: "3000".to_string().try_into().unwrap(),
            http_cors_origins: CorsOrigins::default(),
            storage_backend: "memory".to_string(),
            database_url: None,
            seed_standard_scopes: "true".to_string().try_into().unwrap(),
            client_default_identity_token_lifetime: "10m".to_string().try_into().unwrap(),
            client_default_access_token_lifetime: "2h".to_string().try_into().unwrap(),
            client_default_authorization_code_lifetime: "1m".to_string().try_into().unwrap(),
            client_default_absolute_refresh_token_lifetime: "1d".to_string().try_into().unwrap(),
            client_default_sliding_refresh_token_lifetime: "7d".to_string().try_into().unwrap(),
        };

        let defaults = config.client_defaults();
        assert_eq!(defaults.identity_token_lifetime, 600);
        assert_eq!(defaults.access_token_lifetime, 7200);
        assert_eq!(defaults.authorization_code_lifetime, 60);
        assert_eq!(defaults.absolute_refresh_token_lifetime, 86_400);
        assert_eq!(defaults.sliding_refresh_token_lifetime, 604_800);
        assert!(defaults.enabled);
    }
}
