use std::sync::Arc;

use storage::ProductStore;
use tokio::sync::Mutex;

use crate::controller::InventoryController;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) controller: Arc<Mutex<InventoryController>>,
    pub(crate) page_title: String,
}

impl AppState {
    pub(crate) fn new(store: Arc<dyn ProductStore>, page_title: impl Into<String>) -> Self {
        Self {
            controller: Arc::new(Mutex::new(InventoryController::new(store))),
            page_title: page_title.into(),
        }
    }
}
