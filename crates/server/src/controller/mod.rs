//! Controller layer: per-browser UI sessions and action dispatch onto the product store.

pub mod events;
pub mod session;

use std::{collections::HashMap, sync::Arc};

use anyhow::Result;
use shared::domain::{Product, ProductId};
use storage::ProductStore;
use tracing::{debug, info, warn};

use events::UiAction;
use session::{AddForm, SessionId, UiSession};

/// How a single row is drawn on the next render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowView {
    Viewing(Product),
    Editing { product_id: ProductId, draft: String },
}

/// Everything the page needs after a full reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub add_form: AddForm,
    pub rows: Vec<RowView>,
}

/// Most UI sessions kept at once; opening one more evicts the least recently seen.
pub const MAX_SESSIONS: usize = 256;

/// Sole owner of the store handle on the request path.
///
/// Callers hold it behind one lock, so each action runs to completion
/// before the next one starts.
pub struct InventoryController {
    store: Arc<dyn ProductStore>,
    sessions: HashMap<SessionId, UiSession>,
    session_limit: usize,
    tick: u64,
}

impl InventoryController {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self::with_session_limit(store, MAX_SESSIONS)
    }

    pub fn with_session_limit(store: Arc<dyn ProductStore>, session_limit: usize) -> Self {
        Self {
            store,
            sessions: HashMap::new(),
            session_limit: session_limit.max(1),
            tick: 0,
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Marks a known session as seen; unknown ids yield `None` and store nothing.
    pub fn resume_session(&mut self, requested: Option<SessionId>) -> Option<SessionId> {
        let id = requested?;
        self.tick += 1;
        let session = self.sessions.get_mut(&id)?;
        session.last_seen = self.tick;
        Some(id)
    }

    /// Resumes a known session or starts a fresh one.
    pub fn open_session(&mut self, requested: Option<SessionId>) -> SessionId {
        if let Some(id) = self.resume_session(requested) {
            return id;
        }
        if self.sessions.len() >= self.session_limit {
            self.evict_least_recent();
        }
        self.tick += 1;
        let id = SessionId::new();
        self.sessions.insert(
            id,
            UiSession {
                last_seen: self.tick,
                ..UiSession::default()
            },
        );
        debug!(session = %id, open = self.sessions.len(), "opened ui session");
        id
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .sessions
            .iter()
            .min_by_key(|(_, session)| session.last_seen)
            .map(|(id, _)| *id);
        if let Some(id) = oldest {
            self.sessions.remove(&id);
            debug!(session = %id, "evicted idle ui session");
        }
    }

    /// Applies one action for an open session. Unknown sessions are ignored.
    pub async fn dispatch(&mut self, id: SessionId, action: UiAction) -> Result<()> {
        debug!(session = %id, action = action.name(), "dispatching ui action");
        let store = Arc::clone(&self.store);
        let Some(session) = self.sessions.get_mut(&id) else {
            warn!(session = %id, "ignoring action for unknown ui session");
            return Ok(());
        };

        match action {
            UiAction::Add { name, quantity } => {
                session.add_form.name = name;
                session.add_form.quantity = quantity;
                let Some((name, quantity)) = session.add_form.validated() else {
                    warn!(session = %id, "skipping add with empty name or invalid quantity");
                    return Ok(());
                };
                let product = store.insert(name, quantity).await?;
                info!(product_id = product.id.0, quantity, "added product");
                session.add_form.reset();
            }
            UiAction::EditAddForm { name, quantity } => {
                if let Some(name) = name {
                    session.add_form.name = name;
                }
                if let Some(quantity) = quantity {
                    session.add_form.quantity = quantity;
                }
            }
            UiAction::Increment(product_id) => {
                store.increment(product_id).await?;
            }
            UiAction::Decrement(product_id) => {
                store.decrement(product_id).await?;
            }
            UiAction::Delete(product_id) => {
                if store.delete(product_id).await? {
                    info!(product_id = product_id.0, "deleted product");
                }
            }
            UiAction::StartEdit(product_id) => {
                let current_name = store
                    .list_all()
                    .await?
                    .into_iter()
                    .find(|product| product.id == product_id)
                    .map(|product| product.name);
                match current_name {
                    Some(name) => {
                        if let Some(previous) = session.edit.editing_id() {
                            debug!(
                                previous = previous.0,
                                product_id = product_id.0,
                                "discarding unsaved draft for new edit"
                            );
                        }
                        session.edit.start(product_id, &name);
                    }
                    None => debug!(product_id = product_id.0, "ignoring edit of absent product"),
                }
            }
            UiAction::EditDraft(text) => {
                if !session.edit.update_draft(text) {
                    debug!(session = %id, "ignoring draft update without edit session");
                }
            }
            UiAction::SaveEdit => {
                if let Some(target) = session.edit.target().cloned() {
                    store.rename(target.product_id, &target.draft).await?;
                    info!(product_id = target.product_id.0, "renamed product");
                    session.edit.clear();
                }
            }
            UiAction::CancelEdit => session.edit.clear(),
        }
        Ok(())
    }

    /// Re-fetches every product and rebuilds every row from scratch.
    ///
    /// Without a known session the page shows empty buffers and no edit.
    pub async fn reload(&self, id: Option<SessionId>) -> Result<PageView> {
        let products = self.store.list_all().await?;
        debug!(rows = products.len(), "reloaded product list");

        let fresh = UiSession::default();
        let session = id
            .and_then(|id| self.sessions.get(&id))
            .unwrap_or(&fresh);
        let editing = session.edit.target();
        let rows = products
            .into_iter()
            .map(|product| match editing {
                Some(target) if target.product_id == product.id => RowView::Editing {
                    product_id: product.id,
                    draft: target.draft.clone(),
                },
                _ => RowView::Viewing(product),
            })
            .collect();
        Ok(PageView {
            add_form: session.add_form.clone(),
            rows,
        })
    }
}

#[cfg(test)]
#[path = "../tests/controller_tests.rs"]
mod tests;
