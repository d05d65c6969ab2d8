use super::*;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request},
    response::Response,
};
use shared::{
    domain::{FieldId, FieldType},
    protocol::{form_route, QuestionPayload},
};
use tower::ServiceExt;

const TEST_BODY_LIMIT: usize = 16 * 1024;

async fn test_app() -> Router {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let state = AppState {
        api: ApiContext { storage },
    };
    build_router(Arc::new(state), TEST_BODY_LIMIT)
}

fn document(order: &[&str]) -> FormDocument {
    FormDocument {
        id: None,
        title: "Lunch order".into(),
        description: None,
        question_fields: vec![
            QuestionPayload {
                id: FieldId::from("dish"),
                field_type: FieldType::SingleSelect,
                field_label: Some("Dish".into()),
                is_required: true,
                options: Some(vec!["Soup".into(), "Salad".into()]),
            },
            QuestionPayload {
                id: FieldId::from("notes"),
                field_type: FieldType::Text,
                field_label: None,
                is_required: false,
                options: None,
            },
        ],
        order: order.iter().map(|id| FieldId::from(*id)).collect(),
    }
}

fn post_json(body: String) -> Request<Body> {
    Request::post("/forms")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .expect("request")
}

async fn json_body<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn healthz_reports_ok() {
    let app = test_app().await;
    let response = app
        .oneshot(Request::get("/healthz").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn saved_form_can_be_fetched_and_listed() {
    let app = test_app().await;
    let body = serde_json::to_string(&document(&["dish", "notes"])).expect("encode");

    let response = app.clone().oneshot(post_json(body)).await.expect("save");
    assert_eq!(response.status(), StatusCode::OK);
    let stored: FormDocument = json_body(response).await;
    let form_id = stored.id.clone().expect("assigned id");

    let response = app
        .clone()
        .oneshot(
            Request::get(form_route(&form_id))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("get");
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: FormDocument = json_body(response).await;
    assert_eq!(fetched, stored);
    assert_eq!(fetched.question_fields[0].options.as_ref().map(Vec::len), Some(2));

    let response = app
        .oneshot(Request::get("/forms").body(Body::empty()).expect("request"))
        .await
        .expect("list");
    let forms: Vec<FormSummary> = json_body(response).await;
    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0].id, form_id);
    assert_eq!(forms[0].title, "Lunch order");
}

#[tokio::test]
async fn unknown_form_is_404_with_error_body() {
    let app = test_app().await;
    let response = app
        .oneshot(
            Request::get("/forms/does-not-exist")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("get");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let err: ApiError = json_body(response).await;
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn inconsistent_document_is_400() {
    let app = test_app().await;
    let body = serde_json::to_string(&document(&["dish"])).expect("encode");
    let response = app.oneshot(post_json(body)).await.expect("save");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ApiError = json_body(response).await;
    assert_eq!(err.code, ErrorCode::Validation);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let app = test_app().await;
    let mut doc = document(&["dish", "notes"]);
    doc.description = Some("x".repeat(TEST_BODY_LIMIT * 2));
    let body = serde_json::to_string(&doc).expect("encode");

    let response = app.oneshot(post_json(body)).await.expect("save");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[test]
fn error_codes_map_to_statuses() {
    let cases = [
        (ApiError::not_found("x"), StatusCode::NOT_FOUND),
        (ApiError::validation("x"), StatusCode::BAD_REQUEST),
        (ApiError::internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (err, expected) in cases {
        assert_eq!(into_response_error(err).0, expected);
    }
}
