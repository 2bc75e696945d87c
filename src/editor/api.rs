use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;
use url::Url;

use crate::document::{Document, DocumentChanges, DocumentSummary};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("document {0} not found")]
    NotFound(String),
    #[error("server answered {status}: {message}")]
    Server { status: StatusCode, message: String },
    #[error("request failed")]
    Transport(#[from] reqwest::Error),
    #[error("invalid api url")]
    Url(#[from] url::ParseError),
}

/// Remote side of the editor: the four operations of the document API.
#[async_trait]
pub trait DocumentApi: Send + Sync + 'static {
    async fn list(&self) -> Result<Vec<DocumentSummary>, ClientError>;
    async fn get(&self, id: &str) -> Result<Document, ClientError>;
    async fn create(&self) -> Result<Document, ClientError>;
    async fn update(&self, id: &str, changes: DocumentChanges) -> Result<Document, ClientError>;
}

#[derive(Debug, Clone)]
pub struct HttpDocumentApi {
    http: reqwest::Client,
    documents: Url,
}

impl HttpDocumentApi {
    /// `base` is the server root, e.g. `http://127.0.0.1:3001`.
    pub fn new(base: &str) -> Result<Self, ClientError> {
        let documents = Url::parse(base)?.join("/api/documents/")?;
        Ok(Self {
            http: reqwest::Client::new(),
            documents,
        })
    }

    fn document_url(&self, id: &str) -> Result<Url, ClientError> {
        let mut url = self.documents.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    fn collection_url(&self) -> Url {
        let mut url = self.documents.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
        }
        url
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    id: Option<&str>,
) -> Result<T, ClientError> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound(id.unwrap_or_default().to_string()));
    }
    if !status.is_success() {
        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| body.get("error").and_then(|e| e.as_str()).map(String::from))
            .unwrap_or_default();
        return Err(ClientError::Server { status, message });
    }
    Ok(response.json().await?)
}

#[async_trait]
impl DocumentApi for HttpDocumentApi {
    async fn list(&self) -> Result<Vec<DocumentSummary>, ClientError> {
        let response = self.http.get(self.collection_url()).send().await?;
        decode(response, None).await
    }

    async fn get(&self, id: &str) -> Result<Document, ClientError> {
        let response = self.http.get(self.document_url(id)?).send().await?;
        decode(response, Some(id)).await
    }

    async fn create(&self) -> Result<Document, ClientError> {
        let response = self
            .http
            .post(self.collection_url())
            .json(&json!({}))
            .send()
            .await?;
        decode(response, None).await
    }

    async fn update(&self, id: &str, changes: DocumentChanges) -> Result<Document, ClientError> {
        let response = self
            .http
            .put(self.document_url(id)?)
            .json(&changes)
            .send()
            .await?;
        decode(response, Some(id)).await
    }
}
