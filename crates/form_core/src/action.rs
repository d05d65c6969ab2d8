use shared::domain::{FieldId, OptionId};

use crate::{
    error::StateError,
    field::{Field, FieldPatch},
    state::FormState,
};

/// Every mutation an editor can request, for callers that drive the form as a
/// reducer instead of calling the [`FormState`] methods directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    AddField(Field),
    RemoveField(FieldId),
    UpdateField {
        id: FieldId,
        patch: FieldPatch,
    },
    Reorder(Vec<FieldId>),
    SetTitle(String),
    SetDescription(String),
    AddOption {
        field_id: FieldId,
        label: String,
    },
    RemoveOption {
        field_id: FieldId,
        option_id: OptionId,
    },
    UpdateOption {
        field_id: FieldId,
        option_id: OptionId,
        label: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Applied,
    FieldAdded(FieldId),
    OptionAdded(OptionId),
}

impl FormState {
    pub fn apply(&mut self, action: FormAction) -> Result<ActionOutcome, StateError> {
        match action {
            FormAction::AddField(field) => Ok(ActionOutcome::FieldAdded(self.add_field(field))),
            FormAction::RemoveField(id) => {
                self.remove_field(&id);
                Ok(ActionOutcome::Applied)
            }
            FormAction::UpdateField { id, patch } => {
                self.update_field(&id, patch)?;
                Ok(ActionOutcome::Applied)
            }
            FormAction::Reorder(order) => {
                self.reorder_fields(order)?;
                Ok(ActionOutcome::Applied)
            }
            FormAction::SetTitle(title) => {
                self.set_title(title);
                Ok(ActionOutcome::Applied)
            }
            FormAction::SetDescription(description) => {
                self.set_description(description);
                Ok(ActionOutcome::Applied)
            }
            FormAction::AddOption { field_id, label } => self
                .add_option(&field_id, label)
                .map(ActionOutcome::OptionAdded),
            FormAction::RemoveOption {
                field_id,
                option_id,
            } => {
                self.remove_option(&field_id, &option_id)?;
                Ok(ActionOutcome::Applied)
            }
            FormAction::UpdateOption {
                field_id,
                option_id,
                label,
            } => {
                self.update_option(&field_id, &option_id, label)?;
                Ok(ActionOutcome::Applied)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/action_tests.rs"]
mod tests;
