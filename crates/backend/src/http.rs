use assess_core::model::{AttemptResult, Question, SubmissionPayload, SubmitReceipt, TestId, TestMetadata};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::{AssessmentBackend, BackendError};
use crate::config::BackendConfig;
use crate::wire::{
    AttemptResultDto, QuestionDto, SubmitAttemptRequest, SubmitAttemptResponse, TestMetadataDto,
};

/// REST implementation of [`AssessmentBackend`].
///
/// Routes, relative to the configured base url:
/// `GET tests/{id}`, `GET tests/{id}/questions`, `POST tests/{id}/submit`, `GET tests/{id}/result`.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    config: BackendConfig,
}

impl HttpBackend {
    /// # Errors
    ///
    /// Returns `BackendError::Http` if the underlying client cannot be built.
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, BackendError> {
        let url = self.config.endpoint(segments)?;
        debug!(%url, "GET");
        let response = self.authorize(self.client.get(url)).send().await?;
        decode(check_status(response)?).await
    }
}

fn check_status(response: Response) -> Result<Response, BackendError> {
    match response.status() {
        StatusCode::NOT_FOUND => Err(BackendError::NotFound),
        status if status.is_success() => Ok(response),
        status => Err(BackendError::HttpStatus(status)),
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| BackendError::InvalidPayload(e.to_string()))
}

#[async_trait]
impl AssessmentBackend for HttpBackend {
    async fn get_test(&self, test_id: TestId) -> Result<TestMetadata, BackendError> {
        let id = test_id.to_string();
        let dto: TestMetadataDto = self.get_json(&["tests", &id]).await?;
        dto.into_domain()
    }

    async fn get_attempt_questions(&self, test_id: TestId) -> Result<Vec<Question>, BackendError> {
        let id = test_id.to_string();
        let dtos: Vec<QuestionDto> = self.get_json(&["tests", &id, "questions"]).await?;
        dtos.into_iter().map(QuestionDto::into_domain).collect()
    }

    async fn submit_attempt(&self, payload: &SubmissionPayload) -> Result<SubmitReceipt, BackendError> {
        let id = payload.test_id.to_string();
        let url = self.config.endpoint(&["tests", &id, "submit"])?;
        let body = SubmitAttemptRequest::from(payload);
        debug!(%url, answers = body.answers.len(), "POST");

        let response = self
            .authorize(self.client.post(url))
            .json(&body)
            .send()
            .await?;
        let response = match response.status() {
            // A refused submission still carries a `{ success, message }` body.
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                response
            }
            _ => check_status(response)?,
        };
        let body: SubmitAttemptResponse = decode(response).await?;
        body.into_receipt()
    }

    async fn get_result(&self, test_id: TestId) -> Result<AttemptResult, BackendError> {
        let id = test_id.to_string();
        let dto: AttemptResultDto = self.get_json(&["tests", &id, "result"]).await?;
        dto.into_domain()
    }
}
