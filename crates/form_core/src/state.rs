use std::collections::{HashMap, HashSet};

use shared::domain::{FieldId, FormId, OptionId};
use tracing::debug;

use crate::{
    error::{OrderViolation, StateError},
    field::{Field, FieldKind, FieldPatch, Options},
    validate::{validate, Responses, ValidationResult},
};

pub const DEFAULT_TITLE: &str = "Untitled form";

/// The form being edited: metadata, the field map and the display order.
///
/// `order` always holds every key of `fields` exactly once; every mutator
/// either keeps that true or returns a [`StateError`] without touching the
/// state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    id: Option<FormId>,
    title: String,
    description: String,
    description_omitted: bool,
    fields: HashMap<FieldId, Field>,
    order: Vec<FieldId>,
    next_option_seq: u64,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

impl FormState {
    pub fn new() -> Self {
        Self {
            id: None,
            title: DEFAULT_TITLE.to_string(),
            description: String::new(),
            description_omitted: false,
            fields: HashMap::new(),
            order: Vec::new(),
            next_option_seq: 0,
        }
    }

    /// Assembles a state from parts that were already checked for consistency.
    pub(crate) fn from_parts(
        id: Option<FormId>,
        title: String,
        description: Option<String>,
        fields: HashMap<FieldId, Field>,
        order: Vec<FieldId>,
    ) -> Self {
        Self {
            id,
            title,
            description_omitted: description.is_none(),
            description: description.unwrap_or_default(),
            fields,
            order,
            next_option_seq: 0,
        }
    }

    pub fn id(&self) -> Option<&FormId> {
        self.id.as_ref()
    }

    pub fn set_id(&mut self, id: Option<FormId>) {
        self.id = id;
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            DEFAULT_TITLE
        } else {
            &self.title
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// `None` only for a form loaded without a description and not edited since.
    pub(crate) fn document_description(&self) -> Option<&str> {
        (!self.description_omitted || !self.description.is_empty())
            .then_some(self.description.as_str())
    }

    pub fn fields(&self) -> &HashMap<FieldId, Field> {
        &self.fields
    }

    pub fn order(&self) -> &[FieldId] {
        &self.order
    }

    pub fn field(&self, id: &FieldId) -> Option<&Field> {
        self.fields.get(id)
    }

    pub fn contains(&self, id: &FieldId) -> bool {
        self.fields.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Fields in display order.
    pub fn ordered_fields(&self) -> impl Iterator<Item = &Field> {
        self.order.iter().filter_map(|id| self.fields.get(id))
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.description_omitted = false;
    }

    /// Inserts `initial` under a freshly generated id and appends it to the
    /// display order. Any id already set on `initial` is replaced.
    pub fn add_field(&mut self, initial: Field) -> FieldId {
        let mut id = FieldId::random();
        while self.fields.contains_key(&id) {
            id = FieldId::random();
        }

        let mut field = initial;
        field.id = id.clone();
        debug!(field_id = %id, field_type = %field.field_type(), "field added");
        self.fields.insert(id.clone(), field);
        self.order.push(id.clone());
        id
    }

    /// Blank, optional text question.
    pub fn add_default_field(&mut self) -> FieldId {
        self.add_field(Field::text())
    }

    pub fn remove_field(&mut self, id: &FieldId) {
        if self.fields.remove(id).is_some() {
            debug!(field_id = %id, "field removed");
        }
        self.order.retain(|existing| existing != id);
    }

    pub fn update_field(&mut self, id: &FieldId, patch: FieldPatch) -> Result<(), StateError> {
        let field = self
            .fields
            .get_mut(id)
            .ok_or_else(|| StateError::UnknownField(id.clone()))?;

        let target_type = patch.field_type.unwrap_or_else(|| field.field_type());
        if patch.options.is_some() && !target_type.has_options() {
            return Err(StateError::OptionsNotSupported {
                field_id: id.clone(),
                field_type: target_type,
            });
        }

        if let Some(label) = patch.label {
            field.label = label;
            field.omitted.label = false;
        }
        if let Some(required) = patch.required {
            field.required = required;
        }
        if let Some(field_type) = patch.field_type {
            let kind = std::mem::replace(&mut field.kind, FieldKind::Text);
            field.kind = kind.into_type(field_type);
            field.omitted.options = false;
        }
        if let Some(options) = patch.options {
            if let Some(existing) = field.kind.options_mut() {
                *existing = options;
                field.omitted.options = false;
            }
        }
        debug!(field_id = %id, "field updated");
        Ok(())
    }

    /// Replaces the display order. Anything other than a permutation of the
    /// current field ids is rejected and the order is left unchanged.
    pub fn reorder_fields(&mut self, new_order: Vec<FieldId>) -> Result<(), StateError> {
        check_permutation(&new_order, &self.fields, &self.order)
            .map_err(StateError::InvalidOrder)?;
        self.order = new_order;
        debug!(fields = self.order.len(), "fields reordered");
        Ok(())
    }

    /// Moves the field at `from` to position `to`, as a drag and drop does.
    pub fn move_field(&mut self, from: usize, to: usize) -> Result<(), StateError> {
        let len = self.order.len();
        for index in [from, to] {
            if index >= len {
                return Err(StateError::IndexOutOfRange { index, len });
            }
        }

        let mut order = self.order.clone();
        let moved = order.remove(from);
        order.insert(to, moved);
        self.reorder_fields(order)
    }

    pub fn add_option(
        &mut self,
        field_id: &FieldId,
        label: impl Into<String>,
    ) -> Result<OptionId, StateError> {
        let options = choice_options_mut(&mut self.fields, field_id)?;
        let option_id = next_option_id(&mut self.next_option_seq, options);
        options.insert(option_id.clone(), label.into());
        debug!(%field_id, %option_id, "option added");
        Ok(option_id)
    }

    /// Appends an option labelled "Option N", N being its position.
    pub fn add_numbered_option(&mut self, field_id: &FieldId) -> Result<OptionId, StateError> {
        let count = choice_options_mut(&mut self.fields, field_id)?.len();
        self.add_option(field_id, format!("Option {}", count + 1))
    }

    pub fn add_other_option(&mut self, field_id: &FieldId) -> Result<OptionId, StateError> {
        self.add_option(field_id, "Other")
    }

    /// Removing an option that is not there is a no-op.
    pub fn remove_option(
        &mut self,
        field_id: &FieldId,
        option_id: &OptionId,
    ) -> Result<(), StateError> {
        let options = choice_options_mut(&mut self.fields, field_id)?;
        options.shift_remove(option_id);
        Ok(())
    }

    pub fn update_option(
        &mut self,
        field_id: &FieldId,
        option_id: &OptionId,
        label: impl Into<String>,
    ) -> Result<(), StateError> {
        let options = choice_options_mut(&mut self.fields, field_id)?;
        let existing = options
            .get_mut(option_id)
            .ok_or_else(|| StateError::UnknownOption {
                field_id: field_id.clone(),
                option_id: option_id.clone(),
            })?;
        *existing = label.into();
        Ok(())
    }

    pub fn validate(&self, responses: &Responses) -> ValidationResult {
        validate(&self.fields, &self.order, responses)
    }
}

fn choice_options_mut<'a>(
    fields: &'a mut HashMap<FieldId, Field>,
    field_id: &FieldId,
) -> Result<&'a mut Options, StateError> {
    let field = fields
        .get_mut(field_id)
        .ok_or_else(|| StateError::UnknownField(field_id.clone()))?;
    let field_type = field.field_type();
    match field.kind.options_mut() {
        Some(options) => {
            field.omitted.options = false;
            Ok(options)
        }
        None => Err(StateError::OptionsNotSupported {
            field_id: field_id.clone(),
            field_type,
        }),
    }
}

fn next_option_id(seq: &mut u64, options: &Options) -> OptionId {
    loop {
        let candidate = OptionId(seq.to_string());
        *seq += 1;
        if !options.contains_key(&candidate) {
            return candidate;
        }
    }
}

/// Checks that `candidate` names every key of `fields` exactly once.
/// `reference` only decides which missing id gets reported.
pub(crate) fn check_permutation(
    candidate: &[FieldId],
    fields: &HashMap<FieldId, Field>,
    reference: &[FieldId],
) -> Result<(), OrderViolation> {
    let mut seen = HashSet::with_capacity(candidate.len());
    for id in candidate {
        if !fields.contains_key(id) {
            return Err(OrderViolation::Unknown(id.clone()));
        }
        if !seen.insert(id) {
            return Err(OrderViolation::Duplicate(id.clone()));
        }
    }

    if seen.len() != fields.len() {
        let missing = reference
            .iter()
            .chain(fields.keys())
            .find(|id| !seen.contains(id))
            .cloned();
        if let Some(missing) = missing {
            return Err(OrderViolation::Missing(missing));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
