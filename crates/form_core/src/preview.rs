use std::collections::BTreeSet;

use shared::domain::{FieldId, FieldType, FormId, OptionId};

use crate::{
    error::StateError,
    field::Field,
    state::FormState,
    validate::{Response, Responses, ValidationResult},
};

/// Answers accepted by a successful [`PreviewSession::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub form_id: Option<FormId>,
    pub responses: Responses,
}

/// A fillable instance of a form. Captures answers and validates them on
/// submit; the form itself is only borrowed.
#[derive(Debug)]
pub struct PreviewSession<'a> {
    form: &'a FormState,
    responses: Responses,
    errors: ValidationResult,
}

impl<'a> PreviewSession<'a> {
    pub fn new(form: &'a FormState) -> Self {
        Self {
            form,
            responses: Responses::new(),
            errors: ValidationResult::default(),
        }
    }

    pub fn form(&self) -> &FormState {
        self.form
    }

    pub fn responses(&self) -> &Responses {
        &self.responses
    }

    /// Errors from the last submit attempt.
    pub fn errors(&self) -> &ValidationResult {
        &self.errors
    }

    pub fn set_value(
        &mut self,
        field_id: &FieldId,
        value: impl Into<String>,
    ) -> Result<(), StateError> {
        let field = self.field_of_type(field_id, &[FieldType::Text, FieldType::Number])?;
        self.responses
            .insert(field.id.clone(), Response::Value(value.into()));
        Ok(())
    }

    pub fn choose(&mut self, field_id: &FieldId, option_id: &OptionId) -> Result<(), StateError> {
        let field = self.field_of_type(field_id, &[FieldType::SingleSelect])?;
        ensure_option(field, option_id)?;
        self.responses
            .insert(field.id.clone(), Response::Value(option_id.to_string()));
        Ok(())
    }

    /// Flips one option of a multiple choice answer.
    pub fn toggle(&mut self, field_id: &FieldId, option_id: &OptionId) -> Result<(), StateError> {
        let field = self.field_of_type(field_id, &[FieldType::MultiSelect])?;
        ensure_option(field, option_id)?;

        let entry = self
            .responses
            .entry(field.id.clone())
            .or_insert_with(|| Response::Selection(BTreeSet::new()));
        if let Response::Selection(selected) = entry {
            if !selected.remove(option_id) {
                selected.insert(option_id.clone());
            }
        }
        Ok(())
    }

    pub fn clear(&mut self, field_id: &FieldId) -> Result<(), StateError> {
        if !self.form.contains(field_id) {
            return Err(StateError::UnknownField(field_id.clone()));
        }
        self.responses.remove(field_id);
        Ok(())
    }

    /// Validates the captured answers. Submission is blocked while any
    /// required field is unanswered.
    pub fn submit(&mut self) -> Result<Submission, ValidationResult> {
        self.errors = self.form.validate(&self.responses);
        if self.errors.is_valid() {
            Ok(Submission {
                form_id: self.form.id().cloned(),
                responses: self.responses.clone(),
            })
        } else {
            Err(self.errors.clone())
        }
    }

    fn field_of_type(
        &self,
        field_id: &FieldId,
        accepted: &[FieldType],
    ) -> Result<&'a Field, StateError> {
        let form: &'a FormState = self.form;
        let field = form
            .field(field_id)
            .ok_or_else(|| StateError::UnknownField(field_id.clone()))?;
        if !accepted.contains(&field.field_type()) {
            return Err(StateError::WrongResponseKind {
                field_id: field_id.clone(),
                field_type: field.field_type(),
            });
        }
        Ok(field)
    }
}

fn ensure_option(field: &Field, option_id: &OptionId) -> Result<(), StateError> {
    let known = field
        .options()
        .is_some_and(|options| options.contains_key(option_id));
    if known {
        Ok(())
    } else {
        Err(StateError::UnknownOption {
            field_id: field.id.clone(),
            option_id: option_id.clone(),
        })
    }
}

#[cfg(test)]
#[path = "tests/preview_tests.rs"]
mod tests;
