use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::FormId,
    error::{ApiError, ErrorCode},
    protocol::{FormDocument, FormSummary},
};
use tracing::debug;
use url::Url;

mod editor;
pub mod error;

pub use editor::{FormEditor, TransportNotice, TransportOperation};
pub use error::TransportError;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";
pub const SERVER_URL_ENV: &str = "FORMS_SERVER_URL";

const FORMS_SEGMENT: &str = "forms";

/// Where editing sessions save and load form documents.
#[async_trait]
pub trait FormRepository: Send + Sync {
    async fn save(&self, document: &FormDocument) -> Result<FormDocument, TransportError>;
    async fn load(&self, form_id: &FormId) -> Result<FormDocument, TransportError>;
    async fn list(&self) -> Result<Vec<FormSummary>, TransportError>;
}

/// HTTP client for the forms server.
#[derive(Clone)]
pub struct FormsClient {
    http: Client,
    base_url: Url,
}

impl FormsClient {
    pub fn new(server_url: &str) -> Result<Self, TransportError> {
        let base_url = Url::parse(server_url.trim_end_matches('/'))?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }
        Ok(Self {
            http: Client::new(),
            base_url,
        })
    }

    /// Appends `segments` to the base path, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut endpoint = self.base_url.clone();
        endpoint
            .path_segments_mut()
            .map_err(|()| {
                TransportError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase)
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(endpoint)
    }
}

#[async_trait]
impl FormRepository for FormsClient {
    async fn save(&self, document: &FormDocument) -> Result<FormDocument, TransportError> {
        let url = self.endpoint(&[FORMS_SEGMENT])?;
        debug!(%url, form_id = ?document.id, "saving form");
        let response = self.http.post(url).json(document).send().await?;
        decode(response).await
    }

    async fn load(&self, form_id: &FormId) -> Result<FormDocument, TransportError> {
        let url = self.endpoint(&[FORMS_SEGMENT, form_id.as_str()])?;
        debug!(%url, "loading form");
        let response = self.http.get(url).send().await?;
        decode(response).await
    }

    async fn list(&self) -> Result<Vec<FormSummary>, TransportError> {
        let url = self.endpoint(&[FORMS_SEGMENT])?;
        let response = self.http.get(url).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await?;
    let error = serde_json::from_str::<ApiError>(&body)
        .unwrap_or_else(|_| fallback_error(status, body));
    Err(TransportError::Api {
        status: status.as_u16(),
        error,
    })
}

fn fallback_error(status: StatusCode, body: String) -> ApiError {
    let code = match status {
        StatusCode::NOT_FOUND => ErrorCode::NotFound,
        s if s.is_client_error() => ErrorCode::Validation,
        _ => ErrorCode::Internal,
    };
    let message = if body.trim().is_empty() {
        status.to_string()
    } else {
        body
    };
    ApiError::new(code, message)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
