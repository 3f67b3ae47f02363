// src/state.rs
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::config::Settings;
use crate::services::registry::ModelRegistry;

/// Everything a request needs, cloned cheaply into each handler.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
    pub settings: Arc<Settings>,
    pub limiter: Arc<Semaphore>,
}

impl AppState {
    pub fn new(registry: ModelRegistry, settings: Settings) -> Self {
        let limiter = Arc::new(Semaphore::new(settings.max_in_flight));
        AppState {
            registry: Arc::new(registry),
            settings: Arc::new(settings),
            limiter,
        }
    }
}
