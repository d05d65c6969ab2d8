//! In-memory form editing engine: the ordered field store, the reducer that
//! mutates it, required-ness validation and the document serializer.

pub mod action;
pub mod error;
pub mod field;
pub mod preview;
pub mod serialize;
pub mod state;
pub mod validate;

pub use action::{ActionOutcome, FormAction};
pub use error::{OrderViolation, StateError};
pub use field::{Field, FieldKind, FieldPatch, Options, UNTITLED_QUESTION};
pub use preview::{PreviewSession, Submission};
pub use serialize::{from_document, to_document};
pub use state::{FormState, DEFAULT_TITLE};
pub use validate::{validate, Response, Responses, ValidationResult};
