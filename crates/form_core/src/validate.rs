use std::collections::{BTreeMap, BTreeSet, HashMap};

use shared::domain::{FieldId, OptionId};

use crate::field::{Field, FieldKind};

pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const SELECT_ONE_MESSAGE: &str = "Please select an option";
pub const SELECT_AT_LEAST_ONE_MESSAGE: &str = "Please select at least one option";

/// A captured answer. Text, number and single choice answers are strings
/// (the chosen option id for a single choice); multiple choice answers are
/// sets of option ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Value(String),
    Selection(BTreeSet<OptionId>),
}

impl Response {
    fn has_value(&self) -> bool {
        matches!(self, Response::Value(value) if !value.is_empty())
    }

    fn has_selection(&self) -> bool {
        matches!(self, Response::Selection(selected) if !selected.is_empty())
    }
}

pub type Responses = HashMap<FieldId, Response>;

/// Error message per invalid field. A field without an entry passed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: BTreeMap<FieldId, String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field_id: &FieldId) -> Option<&str> {
        self.errors.get(field_id).map(String::as_str)
    }

    pub fn contains(&self, field_id: &FieldId) -> bool {
        self.errors.contains_key(field_id)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldId, &str)> {
        self.errors.iter().map(|(id, message)| (id, message.as_str()))
    }
}

/// Checks every field listed in `order` against its required flag.
///
/// Pure: the result depends only on the arguments and is rebuilt from scratch
/// on every call. Responses of the wrong shape for a field count as missing.
pub fn validate(
    fields: &HashMap<FieldId, Field>,
    order: &[FieldId],
    responses: &Responses,
) -> ValidationResult {
    let mut errors = BTreeMap::new();

    for id in order {
        let Some(field) = fields.get(id) else {
            continue;
        };
        if !field.required {
            continue;
        }

        let response = responses.get(id);
        let message = match &field.kind {
            FieldKind::Text | FieldKind::Number => {
                (!response.is_some_and(Response::has_value)).then_some(REQUIRED_MESSAGE)
            }
            FieldKind::SingleSelect(_) => {
                (!response.is_some_and(Response::has_value)).then_some(SELECT_ONE_MESSAGE)
            }
            FieldKind::MultiSelect(_) => (!response.is_some_and(Response::has_selection))
                .then_some(SELECT_AT_LEAST_ONE_MESSAGE),
        };

        if let Some(message) = message {
            errors.insert(id.clone(), message.to_string());
        }
    }

    ValidationResult { errors }
}

#[cfg(test)]
#[path = "tests/validate_tests.rs"]
mod tests;
