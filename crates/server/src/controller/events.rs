//! User actions submitted from the page, and their decoding from form posts.

use serde::Deserialize;
use shared::{
    domain::ProductId,
    error::{ApiError, ErrorCode},
};

/// One user action against one explicitly identified row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    Add { name: String, quantity: String },
    /// Add-form text typed so far; absent fields keep their buffered value.
    EditAddForm {
        name: Option<String>,
        quantity: Option<String>,
    },
    Increment(ProductId),
    Decrement(ProductId),
    Delete(ProductId),
    StartEdit(ProductId),
    EditDraft(String),
    SaveEdit,
    CancelEdit,
}

impl UiAction {
    pub fn name(&self) -> &'static str {
        match self {
            UiAction::Add { .. } => "add",
            UiAction::EditAddForm { .. } => "edit_add_form",
            UiAction::Increment(_) => "increment",
            UiAction::Decrement(_) => "decrement",
            UiAction::Delete(_) => "delete",
            UiAction::StartEdit(_) => "start_edit",
            UiAction::EditDraft(_) => "edit_draft",
            UiAction::SaveEdit => "save",
            UiAction::CancelEdit => "cancel",
        }
    }
}

/// Raw form body posted by every button on the page.
///
/// The whole page is one form, so every post carries the add-form fields and,
/// while a rename is open, the draft. The clicked button names itself as
/// `action=verb` or `action=verb:id`; a separate `id` field is also accepted.
#[derive(Debug, Default, Deserialize)]
pub struct ActionForm {
    pub action: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: Option<String>,
    #[serde(default)]
    pub draft: Option<String>,
}

impl ActionForm {
    /// Decodes the post into the actions it stands for, in order.
    ///
    /// Typed text lands first: the draft and the add-form buffers are updated
    /// before the clicked action runs, so no button throws away pending input.
    pub fn into_actions(self) -> Result<Vec<UiAction>, ApiError> {
        let ActionForm {
            action,
            id,
            name,
            quantity,
            draft,
        } = self;
        let (verb, inline_id) = match action.split_once(':') {
            Some((verb, id)) => (verb, Some(id)),
            None => (action.as_str(), None),
        };
        let id = inline_id.or(id.as_deref());

        let clicked = match verb {
            "add" => UiAction::Add {
                name: name.clone().unwrap_or_default(),
                quantity: quantity.clone().unwrap_or_default(),
            },
            "increment" => UiAction::Increment(parse_id(id)?),
            "decrement" => UiAction::Decrement(parse_id(id)?),
            "delete" => UiAction::Delete(parse_id(id)?),
            "start_edit" => UiAction::StartEdit(parse_id(id)?),
            "save" => UiAction::SaveEdit,
            "cancel" => UiAction::CancelEdit,
            other => {
                return Err(ApiError::new(
                    ErrorCode::Validation,
                    format!("unknown action '{other}'"),
                ))
            }
        };

        let mut actions = Vec::with_capacity(3);
        if let Some(draft) = draft {
            actions.push(UiAction::EditDraft(draft));
        }
        if !matches!(clicked, UiAction::Add { .. }) && (name.is_some() || quantity.is_some()) {
            actions.push(UiAction::EditAddForm { name, quantity });
        }
        actions.push(clicked);
        Ok(actions)
    }
}

fn parse_id(raw: Option<&str>) -> Result<ProductId, ApiError> {
    let raw = raw.ok_or_else(|| ApiError::new(ErrorCode::Validation, "missing product id"))?;
    raw.parse::<ProductId>()
        .map_err(|_| ApiError::new(ErrorCode::Validation, format!("invalid product id '{raw}'")))
}
