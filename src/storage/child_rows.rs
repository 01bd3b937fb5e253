//! Declarative child table descriptions shared by the SQL backends.
//!
//! Every child family is a table with an `id` primary key, a foreign key to
//! its parent and a few text or flag columns. The backends generate their
//! statements from these descriptions and move values through
//! [`ColumnValue`], so one read path and one sync path serve every family.

use chrono::DateTime;

use crate::admin::types::{
    ChildRow, ClientClaimRow, ClientCorsOriginRow, ClientCustomGrantTypeRow,
    ClientIdPRestrictionRow, ClientPostLogoutRedirectUriRow, ClientRedirectUriRow,
    ClientScopeRow, ScopeClaimRow, SecretRow,
};
use crate::errors::StorageError;
use crate::storage::traits::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnKind {
    Text,
    OptionalText,
    Flag,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ColumnValue {
    Text(String),
    OptionalText(Option<String>),
    Flag(bool),
}

/// A child table: name, parent foreign key and value columns in order
pub(crate) struct ChildTable {
    pub table: &'static str,
    pub parent: &'static str,
    pub columns: &'static [(&'static str, ColumnKind)],
}

impl ChildTable {
    fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn select_sql(&self, placeholder: impl Fn(usize) -> String) -> String {
        format!(
            "SELECT id, {} FROM {} WHERE {} = {} ORDER BY id",
            self.column_list(),
            self.table,
            self.parent,
            placeholder(1)
        )
    }

    pub fn ids_sql(&self, placeholder: impl Fn(usize) -> String) -> String {
        format!(
            "SELECT id FROM {} WHERE {} = {}",
            self.table,
            self.parent,
            placeholder(1)
        )
    }

    /// Binds: parent id, then every value column
    pub fn insert_sql(&self, placeholder: impl Fn(usize) -> String) -> String {
        let values = (1..=self.columns.len() + 1)
            .map(&placeholder)
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({}, {}) VALUES ({})",
            self.table,
            self.parent,
            self.column_list(),
            values
        )
    }

    /// Binds: every value column, then row id, then parent id
    pub fn update_sql(&self, placeholder: impl Fn(usize) -> String) -> String {
        let assignments = self
            .columns
            .iter()
            .enumerate()
            .map(|(index, (name, _))| format!("{} = {}", name, placeholder(index + 1)))
            .collect::<Vec<_>>()
            .join(", ");
        let next = self.columns.len() + 1;
        format!(
            "UPDATE {} SET {} WHERE id = {} AND {} = {}",
            self.table,
            assignments,
            placeholder(next),
            self.parent,
            placeholder(next + 1)
        )
    }

    /// Binds: row id, then parent id
    pub fn delete_sql(&self, placeholder: impl Fn(usize) -> String) -> String {
        format!(
            "DELETE FROM {} WHERE id = {} AND {} = {}",
            self.table,
            placeholder(1),
            self.parent,
            placeholder(2)
        )
    }
}

const SECRET_COLUMNS: &[(&str, ColumnKind)] = &[
    ("secret_type", ColumnKind::OptionalText),
    ("value", ColumnKind::Text),
    ("description", ColumnKind::OptionalText),
    ("expiration", ColumnKind::OptionalText),
];

pub(crate) const CLIENT_CLAIMS: ChildTable = ChildTable {
    table: "client_claims",
    parent: "client_ref",
    columns: &[("claim_type", ColumnKind::Text), ("value", ColumnKind::Text)],
};

pub(crate) const CLIENT_SECRETS: ChildTable = ChildTable {
    table: "client_secrets",
    parent: "client_ref",
    columns: SECRET_COLUMNS,
};

pub(crate) const CLIENT_REDIRECT_URIS: ChildTable = ChildTable {
    table: "client_redirect_uris",
    parent: "client_ref",
    columns: &[("uri", ColumnKind::Text)],
};

pub(crate) const CLIENT_POST_LOGOUT_REDIRECT_URIS: ChildTable = ChildTable {
    table: "client_post_logout_redirect_uris",
    parent: "client_ref",
    columns: &[("uri", ColumnKind::Text)],
};

pub(crate) const CLIENT_CORS_ORIGINS: ChildTable = ChildTable {
    table: "client_cors_origins",
    parent: "client_ref",
    columns: &[("origin", ColumnKind::Text)],
};

pub(crate) const CLIENT_CUSTOM_GRANT_TYPES: ChildTable = ChildTable {
    table: "client_custom_grant_types",
    parent: "client_ref",
    columns: &[("grant_type", ColumnKind::Text)],
};

pub(crate) const CLIENT_SCOPES: ChildTable = ChildTable {
    table: "client_scopes",
    parent: "client_ref",
    columns: &[("scope", ColumnKind::Text)],
};

pub(crate) const CLIENT_IDP_RESTRICTIONS: ChildTable = ChildTable {
    table: "client_idp_restrictions",
    parent: "client_ref",
    columns: &[("provider", ColumnKind::Text)],
};

pub(crate) const SCOPE_CLAIMS: ChildTable = ChildTable {
    table: "scope_claims",
    parent: "scope_ref",
    columns: &[
        ("name", ColumnKind::Text),
        ("description", ColumnKind::OptionalText),
        ("always_include_in_id_token", ColumnKind::Flag),
    ],
};

pub(crate) const SCOPE_SECRETS: ChildTable = ChildTable {
    table: "scope_secrets",
    parent: "scope_ref",
    columns: SECRET_COLUMNS,
};

/// Scalar columns of `clients`, in bind order
pub(crate) const CLIENT_COLUMNS: &[&str] = &[
    "client_id",
    "client_name",
    "client_uri",
    "logo_uri",
    "enabled",
    "require_consent",
    "allow_remember_consent",
    "allow_access_tokens_via_browser",
    "flow",
    "allow_client_credentials_only",
    "logout_uri",
    "logout_session_required",
    "require_sign_out_prompt",
    "allow_access_to_all_scopes",
    "identity_token_lifetime",
    "access_token_lifetime",
    "authorization_code_lifetime",
    "absolute_refresh_token_lifetime",
    "sliding_refresh_token_lifetime",
    "refresh_token_usage",
    "update_access_token_on_refresh",
    "refresh_token_expiration",
    "access_token_type",
    "enable_local_login",
    "include_jwt_id",
    "always_send_client_claims",
    "prefix_client_claims",
    "allow_access_to_all_grant_types",
];

/// Scalar columns of `scopes`, in bind order
pub(crate) const SCOPE_COLUMNS: &[&str] = &[
    "name",
    "display_name",
    "description",
    "claims_rule",
    "required",
    "emphasize",
    "scope_type",
    "include_all_claims_for_user",
    "show_in_discovery_document",
    "enabled",
    "allow_unrestricted_introspection",
];

/// `SELECT id, <columns> FROM <table>` without a WHERE clause
pub(crate) fn select_parent_sql(table: &str, columns: &[&str]) -> String {
    format!("SELECT id, {} FROM {}", columns.join(", "), table)
}

/// Binds every scalar column in order
pub(crate) fn insert_parent_sql(
    table: &str,
    columns: &[&str],
    placeholder: impl Fn(usize) -> String,
) -> String {
    let values = (1..=columns.len())
        .map(placeholder)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        values
    )
}

/// Binds every scalar column in order, then the row id
pub(crate) fn update_parent_sql(
    table: &str,
    columns: &[&str],
    placeholder: impl Fn(usize) -> String,
) -> String {
    let assignments = columns
        .iter()
        .enumerate()
        .map(|(index, name)| format!("{} = {}", name, placeholder(index + 1)))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE {} SET {} WHERE id = {}",
        table,
        assignments,
        placeholder(columns.len() + 1)
    )
}

/// Maps a failed write, surfacing uniqueness violations as duplicates
pub(crate) fn write_error(error: sqlx::Error) -> StorageError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StorageError::Duplicate(db.message().to_string())
        }
        _ => StorageError::DatabaseError(error.to_string()),
    }
}

/// Parses a symbolic enumeration column
pub(crate) fn parse_column<E>(name: &str, value: &str) -> Result<E>
where
    E: std::str::FromStr<Err = crate::admin::types::UnknownVariant>,
{
    value
        .parse::<E>()
        .map_err(|e| StorageError::InvalidData(format!("Invalid {}: {}", name, e)))
}

/// Reads column values back in declaration order
pub(crate) struct ColumnValues {
    table: &'static str,
    values: std::vec::IntoIter<ColumnValue>,
}

impl ColumnValues {
    pub fn new(table: &'static str, values: Vec<ColumnValue>) -> Self {
        Self {
            table,
            values: values.into_iter(),
        }
    }

    fn mismatch(&self) -> StorageError {
        StorageError::InvalidData(format!("Unexpected column layout in {}", self.table))
    }

    pub fn text(&mut self) -> Result<String> {
        match self.values.next() {
            Some(ColumnValue::Text(value)) => Ok(value),
            _ => Err(self.mismatch()),
        }
    }

    pub fn optional_text(&mut self) -> Result<Option<String>> {
        match self.values.next() {
            Some(ColumnValue::OptionalText(value)) => Ok(value),
            _ => Err(self.mismatch()),
        }
    }

    pub fn flag(&mut self) -> Result<bool> {
        match self.values.next() {
            Some(ColumnValue::Flag(value)) => Ok(value),
            _ => Err(self.mismatch()),
        }
    }
}

/// A child row that can be moved through [`ColumnValue`]s
pub(crate) trait SqlChildRow: ChildRow + Sized {
    fn to_values(&self) -> Vec<ColumnValue>;

    fn from_values(id: i64, values: ColumnValues) -> Result<Self>;
}

impl SqlChildRow for ClientClaimRow {
    fn to_values(&self) -> Vec<ColumnValue> {
        vec![
            ColumnValue::Text(self.claim_type.clone()),
            ColumnValue::Text(self.value.clone()),
        ]
    }

    fn from_values(id: i64, mut values: ColumnValues) -> Result<Self> {
        Ok(Self {
            id,
            claim_type: values.text()?,
            value: values.text()?,
        })
    }
}

impl SqlChildRow for SecretRow {
    fn to_values(&self) -> Vec<ColumnValue> {
        vec![
            ColumnValue::OptionalText(self.secret_type.clone()),
            ColumnValue::Text(self.value.clone()),
            ColumnValue::OptionalText(self.description.clone()),
            ColumnValue::OptionalText(self.expiration.map(|expiration| expiration.to_rfc3339())),
        ]
    }

    fn from_values(id: i64, mut values: ColumnValues) -> Result<Self> {
        let secret_type = values.optional_text()?;
        let value = values.text()?;
        let description = values.optional_text()?;
        let expiration = values
            .optional_text()?
            .map(|text| {
                DateTime::parse_from_rfc3339(&text).map_err(|e| {
                    StorageError::InvalidData(format!("Invalid expiration timestamp: {}", e))
                })
            })
            .transpose()?;
        Ok(Self {
            id,
            secret_type,
            value,
            description,
            expiration,
        })
    }
}

impl SqlChildRow for ScopeClaimRow {
    fn to_values(&self) -> Vec<ColumnValue> {
        vec![
            ColumnValue::Text(self.name.clone()),
            ColumnValue::OptionalText(self.description.clone()),
            ColumnValue::Flag(self.always_include_in_id_token),
        ]
    }

    fn from_values(id: i64, mut values: ColumnValues) -> Result<Self> {
        Ok(Self {
            id,
            name: values.text()?,
            description: values.optional_text()?,
            always_include_in_id_token: values.flag()?,
        })
    }
}

macro_rules! single_text_row {
    ($ty:ty, $field:ident) => {
        impl SqlChildRow for $ty {
            fn to_values(&self) -> Vec<ColumnValue> {
                vec![ColumnValue::Text(self.$field.clone())]
            }

            fn from_values(id: i64, mut values: ColumnValues) -> Result<Self> {
                Ok(Self {
                    id,
                    $field: values.text()?,
                })
            }
        }
    };
}

single_text_row!(ClientRedirectUriRow, uri);
single_text_row!(ClientPostLogoutRedirectUriRow, uri);
single_text_row!(ClientCorsOriginRow, origin);
single_text_row!(ClientCustomGrantTypeRow, grant_type);
single_text_row!(ClientScopeRow, scope);
single_text_row!(ClientIdPRestrictionRow, provider);

#[cfg(test)]
mod tests {
    use super::*;

    fn question(_: usize) -> String {
        "?".to_string()
    }

    fn dollar(index: usize) -> String {
        format!("${}", index)
    }

    #[test]
    fn test_generated_statements() {
        assert_eq!(
            CLIENT_CLAIMS.select_sql(question),
            "SELECT id, claim_type, value FROM client_claims WHERE client_ref = ? ORDER BY id"
        );
        assert_eq!(
            SCOPE_CLAIMS.insert_sql(dollar),
            "INSERT INTO scope_claims (scope_ref, name, description, always_include_in_id_token) VALUES ($1, $2, $3, $4)"
        );
        assert_eq!(
            CLIENT_REDIRECT_URIS.update_sql(dollar),
            "UPDATE client_redirect_uris SET uri = $1 WHERE id = $2 AND client_ref = $3"
        );
        assert_eq!(
            SCOPE_SECRETS.delete_sql(question),
            "DELETE FROM scope_secrets WHERE id = ? AND scope_ref = ?"
        );
    }

    #[test]
    fn test_parent_statements() {
        assert_eq!(
            insert_parent_sql("scopes", &SCOPE_COLUMNS[..2], question),
            "INSERT INTO scopes (name, display_name) VALUES (?, ?)"
        );
        assert_eq!(
            update_parent_sql("scopes", &SCOPE_COLUMNS[..2], dollar),
            "UPDATE scopes SET name = $1, display_name = $2 WHERE id = $3"
        );
        assert_eq!(CLIENT_COLUMNS.len(), 28);
    }

    #[test]
    fn test_secret_values_keep_offset() {
        let row = SecretRow {
            id: 0,
            secret_type: Some("SharedSecret".to_string()),
            value: "s3cret".to_string(),
            description: None,
            expiration: Some(DateTime::parse_from_rfc3339("2031-06-01T08:00:00-04:00").unwrap()),
        };
        let values = row.to_values();
        assert_eq!(
            values[3],
            ColumnValue::OptionalText(Some("2031-06-01T08:00:00-04:00".to_string()))
        );
        let back = SecretRow::from_values(5, ColumnValues::new("client_secrets", values)).unwrap();
        assert_eq!(back.id, 5);
        assert_eq!(back.expiration, row.expiration);
    }

    #[test]
    fn test_layout_mismatch_is_invalid_data() {
        let values = vec![ColumnValue::Flag(true)];
        let result = ClientScopeRow::from_values(1, ColumnValues::new("client_scopes", values));
        assert!(matches!(result, Err(StorageError::InvalidData(_))));
    }
}
