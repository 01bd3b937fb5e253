//! Application state shared by every request handler.

use std::sync::Arc;

use crate::admin::IdentityAdminManager;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Admin façade over the configured storage backend
    pub manager: Arc<IdentityAdminManager>,
}
