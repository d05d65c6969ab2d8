use std::{fmt, future::Future, sync::Arc};

use form_core::{from_document, to_document, ActionOutcome, FormAction, FormState, StateError};
use shared::{
    domain::FormId,
    error::ApiError,
    protocol::{FormDocument, FormSummary},
};
use tracing::{info, warn};

use crate::{FormRepository, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportOperation {
    Save,
    Load,
    List,
}

impl fmt::Display for TransportOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Save => "save form",
            Self::Load => "load form",
            Self::List => "list forms",
        })
    }
}

/// A failed persistence call, shown once until taken or dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportNotice {
    pub operation: TransportOperation,
    pub message: String,
}

impl fmt::Display for TransportNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Could not {}: {}", self.operation, self.message)
    }
}

/// One editing session: owns the form being edited and talks to a
/// [`FormRepository`] for save and load. A failed call leaves the form as it
/// was and records a [`TransportNotice`].
///
/// Saving is split in two so editing can go on while a save is in flight:
/// [`start_save`](Self::start_save) snapshots the form and returns a future
/// that borrows nothing from the editor, and
/// [`finish_save`](Self::finish_save) applies its result. Saves of the same
/// session all target one form id, so the last one to land wins.
pub struct FormEditor<R> {
    repository: Arc<R>,
    state: FormState,
    draft_id: Option<FormId>,
    notice: Option<TransportNotice>,
}

impl<R: FormRepository + 'static> FormEditor<R> {
    pub fn new(repository: R) -> Self {
        Self::with_state(repository, FormState::new())
    }

    pub fn with_state(repository: R, state: FormState) -> Self {
        Self {
            repository: Arc::new(repository),
            state,
            draft_id: None,
            notice: None,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut FormState {
        &mut self.state
    }

    pub fn dispatch(&mut self, action: FormAction) -> Result<ActionOutcome, StateError> {
        self.state.apply(action)
    }

    /// Starts over with an empty, unsaved form.
    pub fn new_form(&mut self) {
        self.state = FormState::new();
        self.draft_id = None;
        self.notice = None;
    }

    /// Snapshots the current form and returns the request that stores it.
    /// A form that was never saved gets its id here, so overlapping saves
    /// overwrite one another instead of creating several forms.
    pub fn start_save(
        &mut self,
    ) -> impl Future<Output = Result<FormDocument, TransportError>> + Send + 'static {
        let mut snapshot = to_document(&self.state);
        if snapshot.id.is_none() {
            snapshot.id = Some(self.draft_id.get_or_insert_with(FormId::random).clone());
        }
        let repository = Arc::clone(&self.repository);
        async move { repository.save(&snapshot).await }
    }

    /// Applies the outcome of a save started with [`start_save`](Self::start_save).
    /// Edits made in the meantime are kept.
    pub fn finish_save(
        &mut self,
        result: Result<FormDocument, TransportError>,
    ) -> Result<FormId, TransportError> {
        let result = result.and_then(|stored| {
            stored.id.ok_or_else(|| TransportError::Api {
                status: 200,
                error: ApiError::internal("server did not assign a form id"),
            })
        });

        match result {
            Ok(form_id) => {
                info!(%form_id, fields = self.state.len(), "form saved");
                self.state.set_id(Some(form_id.clone()));
                Ok(form_id)
            }
            Err(err) => Err(self.record(TransportOperation::Save, err)),
        }
    }

    pub async fn save(&mut self) -> Result<FormId, TransportError> {
        let pending = self.start_save();
        let result = pending.await;
        self.finish_save(result)
    }

    /// Replaces the edited form with the stored one.
    pub async fn load(&mut self, form_id: &FormId) -> Result<(), TransportError> {
        let result = match self.repository.load(form_id).await {
            Ok(document) => from_document(&document)
                .map(|mut state| {
                    if state.id().is_none() {
                        state.set_id(Some(form_id.clone()));
                    }
                    state
                })
                .map_err(TransportError::from),
            Err(err) => Err(err),
        };

        match result {
            Ok(state) => {
                info!(%form_id, fields = state.len(), "form loaded");
                self.state = state;
                self.draft_id = None;
                Ok(())
            }
            Err(err) => Err(self.record(TransportOperation::Load, err)),
        }
    }

    pub async fn list(&mut self) -> Result<Vec<FormSummary>, TransportError> {
        match self.repository.list().await {
            Ok(forms) => Ok(forms),
            Err(err) => Err(self.record(TransportOperation::List, err)),
        }
    }

    pub fn notice(&self) -> Option<&TransportNotice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<TransportNotice> {
        self.notice.take()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    fn record(&mut self, operation: TransportOperation, err: TransportError) -> TransportError {
        warn!(%operation, error = %err, form_id = ?self.state.id(), "persistence call failed");
        self.notice = Some(TransportNotice {
            operation,
            message: err.user_message(),
        });
        err
    }
}

#[cfg(test)]
#[path = "tests/editor_tests.rs"]
mod tests;
