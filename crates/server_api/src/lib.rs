use shared::{
    domain::FormId,
    error::ApiError,
    protocol::{FormDocument, FormSummary},
};
use storage::Storage;
use tracing::{info, warn};

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

/// Creates the form when `document.id` is absent, otherwise replaces it.
/// Documents that would not load back into an editor are refused, as are
/// blank ids, which no `GET /forms/:form_id` could reach.
pub async fn save_form(ctx: &ApiContext, document: FormDocument) -> Result<FormDocument, ApiError> {
    if document.id.as_ref().is_some_and(|id| id.as_str().trim().is_empty()) {
        warn!("rejected form document with blank id");
        return Err(ApiError::validation("form id must not be blank"));
    }
    if let Err(err) = form_core::from_document(&document) {
        warn!(form_id = ?document.id, %err, "rejected form document");
        return Err(ApiError::validation(err.to_string()));
    }

    let creating = document.id.is_none();
    let stored = ctx.storage.save_form(&document).await.map_err(internal)?;
    info!(
        form_id = ?stored.id,
        creating,
        questions = stored.question_fields.len(),
        "form saved"
    );
    Ok(stored)
}

pub async fn get_form(ctx: &ApiContext, form_id: &FormId) -> Result<FormDocument, ApiError> {
    ctx.storage
        .get_form(form_id)
        .await
        .map_err(internal)?
        .map(|stored| stored.document)
        .ok_or_else(|| ApiError::not_found(format!("form {form_id} not found")))
}

pub async fn list_forms(ctx: &ApiContext) -> Result<Vec<FormSummary>, ApiError> {
    let forms = ctx.storage.list_forms().await.map_err(internal)?;
    Ok(forms
        .into_iter()
        .map(|form| FormSummary {
            id: form.id,
            title: form.title,
        })
        .collect())
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::internal(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{
        domain::{FieldId, FieldType},
        error::ErrorCode,
        protocol::QuestionPayload,
    };

    async fn setup() -> ApiContext {
        let storage = Storage::new("sqlite::memory:").await.expect("db");
        ApiContext { storage }
    }

    fn document(order: &[&str]) -> FormDocument {
        FormDocument {
            id: None,
            title: "Event signup".into(),
            description: Some("RSVP".into()),
            question_fields: vec![QuestionPayload {
                id: FieldId::from("name"),
                field_type: FieldType::Text,
                field_label: Some("Name".into()),
                is_required: true,
                options: None,
            }],
            order: order.iter().map(|id| FieldId::from(*id)).collect(),
        }
    }

    #[tokio::test]
    async fn saved_form_is_listed_and_fetchable() {
        let ctx = setup().await;
        let stored = save_form(&ctx, document(&["name"])).await.expect("save");
        let form_id = stored.id.clone().expect("id");

        let fetched = get_form(&ctx, &form_id).await.expect("get");
        assert_eq!(fetched, stored);

        let forms = list_forms(&ctx).await.expect("list");
        assert_eq!(
            forms,
            vec![FormSummary {
                id: form_id,
                title: "Event signup".into()
            }]
        );
    }

    #[tokio::test]
    async fn inconsistent_order_is_a_validation_error() {
        let ctx = setup().await;
        let err = save_form(&ctx, document(&["name", "ghost"]))
            .await
            .expect_err("should fail");
        assert_eq!(err.code, ErrorCode::Validation);
        assert!(list_forms(&ctx).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn blank_id_is_a_validation_error() {
        let ctx = setup().await;
        for blank in ["", "   "] {
            let mut doc = document(&["name"]);
            doc.id = Some(FormId::from(blank));
            let err = save_form(&ctx, doc).await.expect_err("should fail");
            assert_eq!(err.code, ErrorCode::Validation);
        }
        assert!(list_forms(&ctx).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn unknown_form_is_not_found() {
        let ctx = setup().await;
        let err = get_form(&ctx, &FormId::from("missing"))
            .await
            .expect_err("should fail");
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
