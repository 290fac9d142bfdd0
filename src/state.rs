use std::sync::Arc;

use crate::auth::{TokenError, TokenIssuer};
use crate::config::AppConfig;
use crate::database::Storage;

/// Shared, read-only request state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenIssuer>,
    pub store: Arc<dyn Storage>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Storage>) -> Result<Self, TokenError> {
        let tokens = TokenIssuer::new(&config.security)?;

        Ok(Self {
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            store,
        })
    }
}
