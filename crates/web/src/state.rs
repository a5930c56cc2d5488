use std::sync::Arc;

use storage::ClubStore;
use storage::services::PairingOptions;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ClubStore>,
    pub pairing: Arc<PairingOptions>,
}

impl AppState {
    pub fn new(store: Arc<dyn ClubStore>, pairing: PairingOptions) -> Self {
        Self {
            store,
            pairing: Arc::new(pairing),
        }
    }
}
