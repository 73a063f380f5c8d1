use std::sync::Arc;

use catalog::Catalog;

use crate::store::CombinedStore;

/// Everything a session or HTTP handler needs, cheap to clone per task.
///
/// The catalog is read-only after load; the combined store carries its own
/// lock.
#[derive(Clone, Debug)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub store: Arc<CombinedStore>,
}

impl AppState {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
            store: Arc::new(CombinedStore::new()),
        }
    }
}
