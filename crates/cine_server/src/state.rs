use std::sync::Arc;

use cine_store::Store;
use cine_tmdb::Client;

use crate::{
    auth::Auth,
    config::{Config, PagerConfig},
    error::Result,
};

/// Shared per-process state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub tmdb: Client,
    pub store: Arc<Store>,
    pub auth: Arc<Auth>,
    pub pager: PagerConfig,
}

impl AppState {
    #[must_use]
    pub fn new(tmdb: Client, store: Store, auth: Auth, pager: PagerConfig) -> Self {
        Self {
            tmdb,
            store: Arc::new(store),
            auth: Arc::new(auth),
            pager,
        }
    }

    /// Build the state described by `config`, resolving secrets from the
    /// environment and opening the store.
    pub fn from_config(config: &Config) -> Result<Self> {
        let tmdb = config.tmdb.client()?;
        let store = Store::open(&config.store.path)?;
        let auth = Auth::new(
            config.auth.secret()?,
            config.auth.session_days,
            config.auth.pbkdf2_iterations,
            config.server.dev,
        );

        Ok(Self::new(tmdb, store, auth, config.pager))
    }
}
