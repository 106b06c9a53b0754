use std::sync::Arc;

use crate::cache::cache_service::CacheService;
use crate::config::AppConfig;
use crate::inference::ModelHandle;

/// State shared by every request: the model loaded at startup, the
/// configuration it was loaded with and the result cache.
#[derive(Clone)]
pub struct AppContext {
    pub model: ModelHandle,
    pub config: Arc<AppConfig>,
    pub cache: CacheService,
}

impl AppContext {
    pub fn new(model: ModelHandle, config: AppConfig) -> Self {
        let cache = CacheService::new(config.cache.capacity);
        Self {
            model,
            config: Arc::new(config),
            cache,
        }
    }
}
