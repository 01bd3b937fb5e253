//! Axum HTTP surface exposing the admin manager as a JSON API under `/api`.

pub mod context;
mod handler_clients;
mod handler_metadata;
mod handler_scopes;
pub mod server;
pub mod utils_outcome;

pub use context::AppState;
pub use server::build_router;
