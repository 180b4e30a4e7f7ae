use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use thiserror::Error;

use crate::concept::ConceptNode;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("could not reach concept service: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("concept service returned {0}")]
    Status(StatusCode),
    #[error("malformed concept payload: {0}")]
    MalformedPayload(String),
    #[error("invalid service url: {0}")]
    InvalidUrl(String),
}

/// HTTP client for the remote concept service.
///
/// The service exposes `GET /concept/{keyword}` returning a ConceptNode tree
/// and `GET /health` for a liveness probe. Keywords are percent-encoded as a
/// single path segment; an optional language tag travels as a `lang` query
/// parameter.
#[derive(Clone)]
pub struct ConceptClient {
    client: Client,
    base_url: String,
}

impl ConceptClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn fetch_concept(
        &self,
        keyword: &str,
        language: Option<&str>,
    ) -> Result<ConceptNode, ServiceError> {
        let url = concept_url(&self.base_url, keyword, language)?;

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(ServiceError::Status(response.status()));
        }

        let body = response.text().await?;
        parse_concept(&body)
    }

    pub async fn health(&self) -> Result<(), ServiceError> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ServiceError::Status(response.status()));
        }
        Ok(())
    }
}

/// Builds the concept request URL, percent-encoding the keyword.
fn concept_url(
    base_url: &str,
    keyword: &str,
    language: Option<&str>,
) -> Result<Url, ServiceError> {
    let mut url =
        Url::parse(base_url).map_err(|e| ServiceError::InvalidUrl(e.to_string()))?;

    url.path_segments_mut()
        .map_err(|_| ServiceError::InvalidUrl("base url cannot carry path segments".to_string()))?
        .push("concept")
        .push(keyword);

    if let Some(lang) = language {
        url.query_pairs_mut().append_pair("lang", lang);
    }

    Ok(url)
}

/// Parses and validates a concept payload.
///
/// Split out of the client so the fetch boundary is testable without a
/// network: JSON errors and blank-title trees both surface as
/// `MalformedPayload`, never as a panic.
pub fn parse_concept(body: &str) -> Result<ConceptNode, ServiceError> {
    let node: ConceptNode =
        serde_json::from_str(body).map_err(|e| ServiceError::MalformedPayload(e.to_string()))?;

    node.validate().map_err(ServiceError::MalformedPayload)?;
    Ok(node)
}
