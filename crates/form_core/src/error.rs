use shared::domain::{FieldId, FieldType, OptionId};
use thiserror::Error;

/// Why a proposed field order is not a permutation of the field map keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderViolation {
    #[error("field {0} appears more than once")]
    Duplicate(FieldId),
    #[error("field {0} does not exist")]
    Unknown(FieldId),
    #[error("field {0} is missing")]
    Missing(FieldId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("unknown field {0}")]
    UnknownField(FieldId),
    #[error("field {field_id} has no option {option_id}")]
    UnknownOption {
        field_id: FieldId,
        option_id: OptionId,
    },
    #[error("field {field_id} of type {field_type} does not take options")]
    OptionsNotSupported {
        field_id: FieldId,
        field_type: FieldType,
    },
    #[error("invalid field order: {0}")]
    InvalidOrder(OrderViolation),
    #[error("index {index} out of range for {len} fields")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("inconsistent form document: {0}")]
    InvalidDocument(OrderViolation),
    #[error("field {field_id} of type {field_type} cannot take this kind of response")]
    WrongResponseKind {
        field_id: FieldId,
        field_type: FieldType,
    },
}
