use std::sync::Arc;

use crate::{Config, model::ModelManager, payment::PaymentGateway};

#[derive(Clone)]
pub struct AppState {
    mm: ModelManager,
    config: Arc<Config>,
    gateway: Arc<dyn PaymentGateway>,
}

impl AppState {
    pub fn new(mm: ModelManager, config: Arc<Config>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            mm,
            config,
            gateway,
        }
    }

    pub fn pool(&self) -> &ModelManager {
        &self.mm
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn gateway(&self) -> &dyn PaymentGateway {
        self.gateway.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("mm", &self.mm)
            .finish_non_exhaustive()
    }
}
