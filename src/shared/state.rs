use crate::config::AppConfig;
use crate::shared::utils::DbPool;

/// Shared handler state. Cheap to clone: the pool is internally reference
/// counted.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub conn: DbPool,
}
