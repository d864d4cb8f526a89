use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{CodeHostService, GenerationService};

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub code_host: Arc<dyn CodeHostService>,
    pub generation: Arc<dyn GenerationService>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        code_host: Arc<dyn CodeHostService>,
        generation: Arc<dyn GenerationService>,
    ) -> Self {
        Self {
            config,
            code_host,
            generation,
        }
    }
}
