use std::sync::Arc;

use kyoshi_config::Config;
use kyoshi_core::library::LibraryStore;
use kyoshi_core::session::SessionGate;
use kyoshi_storage::KeyValueStore;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

pub struct AppState {
    pub config: RwLock<Config>,
    pub session: RwLock<SessionGate>,
    pub library: RwLock<LibraryStore>,
    /// Token of the in-flight explain stream, if any. A new request cancels
    /// the previous one.
    pub explain_token: Mutex<Option<CancellationToken>>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            config: RwLock::new(config),
            session: RwLock::new(SessionGate::new(store.clone())),
            library: RwLock::new(LibraryStore::new(store)),
            explain_token: Mutex::new(None),
        }
    }
}
