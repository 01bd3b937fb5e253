//! Admin management of OAuth2 / OpenID Connect client and scope configuration.
//!
//! Three shapes describe each entity: the store record in [`types`], the core
//! model in [`model`] and the value objects in [`values`]. [`mapping`] converts
//! between them, [`metadata`] reads and writes model fields by name, and
//! [`manager`] composes everything into the operations exposed to callers.

pub mod manager;
pub mod mapping;
pub mod metadata;
pub mod model;
pub mod outcome;
pub mod seed;
pub mod types;
pub mod values;

pub use manager::{ClientAdminService, ClientDefaults, IdentityAdminManager, ScopeAdminService};
pub use metadata::{EditableModel, PropertyKind};
pub use model::{Claim, Client, Scope, ScopeClaim, Secret};
pub use outcome::{AdminResult, FailureKind};
pub use seed::{seed_if_empty, standard_scopes};
pub use values::*;
