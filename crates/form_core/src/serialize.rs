//! Conversion between [`FormState`] and the persisted [`FormDocument`].
//!
//! The document keeps option labels only. Loading a document numbers the
//! options by position (`"0"`, `"1"`, ...), so option ids recorded before a
//! save do not survive a reload. Labels, descriptions and choice options are
//! written back exactly as they were read, absent or empty alike.

use std::collections::HashMap;

use shared::{
    domain::OptionId,
    protocol::{FormDocument, QuestionPayload},
};
use tracing::debug;

use crate::{
    error::{OrderViolation, StateError},
    field::{Field, FieldKind, Omitted, Options},
    state::{check_permutation, FormState},
};

pub fn to_document(state: &FormState) -> FormDocument {
    let question_fields = state.ordered_fields().map(question_payload).collect();

    FormDocument {
        id: state.id().cloned(),
        title: state.title().to_string(),
        description: state.document_description().map(str::to_string),
        question_fields,
        order: state.order().to_vec(),
    }
}

fn question_payload(field: &Field) -> QuestionPayload {
    let options = match &field.kind {
        FieldKind::Text | FieldKind::Number => None,
        FieldKind::SingleSelect(options) | FieldKind::MultiSelect(options) => {
            (!field.omitted.options || !options.is_empty())
                .then(|| options.values().cloned().collect())
        }
    };
    let field_label =
        (!field.omitted.label || !field.label.is_empty()).then(|| field.label.clone());

    QuestionPayload {
        id: field.id.clone(),
        field_type: field.field_type(),
        field_label,
        is_required: field.required,
        options,
    }
}

/// Rebuilds an editable state. Documents whose `order` is not a permutation of
/// their question ids are rejected.
pub fn from_document(doc: &FormDocument) -> Result<FormState, StateError> {
    let mut fields = HashMap::with_capacity(doc.question_fields.len());
    let mut declared = Vec::with_capacity(doc.question_fields.len());

    for question in &doc.question_fields {
        if fields.contains_key(&question.id) {
            return Err(StateError::InvalidDocument(OrderViolation::Duplicate(
                question.id.clone(),
            )));
        }
        declared.push(question.id.clone());
        fields.insert(question.id.clone(), field_from_payload(question));
    }

    check_permutation(&doc.order, &fields, &declared).map_err(StateError::InvalidDocument)?;
    debug!(form_id = ?doc.id, fields = fields.len(), "form document loaded");

    Ok(FormState::from_parts(
        doc.id.clone(),
        doc.title.clone(),
        doc.description.clone(),
        fields,
        doc.order.clone(),
    ))
}

fn field_from_payload(question: &QuestionPayload) -> Field {
    let mut kind = FieldKind::empty(question.field_type);
    if let (Some(options), Some(labels)) = (kind.options_mut(), &question.options) {
        *options = positional_options(labels);
    }

    Field {
        id: question.id.clone(),
        label: question.field_label.clone().unwrap_or_default(),
        required: question.is_required,
        kind,
        omitted: Omitted {
            label: question.field_label.is_none(),
            options: question.options.is_none(),
        },
    }
}

fn positional_options(labels: &[String]) -> Options {
    labels
        .iter()
        .enumerate()
        .map(|(index, label)| (OptionId(index.to_string()), label.clone()))
        .collect()
}

#[cfg(test)]
#[path = "tests/serialize_tests.rs"]
mod tests;
