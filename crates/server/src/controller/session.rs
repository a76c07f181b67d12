//! Per-browser UI state: the edit session and the add-form buffers.

use std::fmt;

use shared::domain::ProductId;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTarget {
    pub product_id: ProductId,
    pub draft: String,
}

/// Which single product, if any, is being renamed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditSession {
    target: Option<EditTarget>,
}

impl EditSession {
    /// Replaces any previous target; its unsaved draft is dropped.
    pub fn start(&mut self, product_id: ProductId, current_name: &str) {
        self.target = Some(EditTarget {
            product_id,
            draft: current_name.to_string(),
        });
    }

    pub fn update_draft(&mut self, text: String) -> bool {
        match self.target.as_mut() {
            Some(target) => {
                target.draft = text;
                true
            }
            None => false,
        }
    }

    pub fn target(&self) -> Option<&EditTarget> {
        self.target.as_ref()
    }

    pub fn editing_id(&self) -> Option<ProductId> {
        self.target.as_ref().map(|t| t.product_id)
    }

    pub fn clear(&mut self) {
        self.target = None;
    }
}

/// Input buffers of the add form, kept between renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddForm {
    pub name: String,
    pub quantity: String,
}

impl Default for AddForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            quantity: "0".to_string(),
        }
    }
}

impl AddForm {
    /// The name and quantity to insert, or `None` when the submission is to be skipped.
    pub fn validated(&self) -> Option<(&str, i64)> {
        if self.name.is_empty() {
            return None;
        }
        let quantity = self.quantity.trim().parse::<i64>().ok()?;
        (quantity >= 0).then_some((self.name.as_str(), quantity))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Default)]
pub struct UiSession {
    pub edit: EditSession,
    pub add_form: AddForm,
    /// Controller tick of the last request that touched this session.
    pub last_seen: u64,
}
