use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("paper not found")]
    NotFound,
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Request failed. Check your connection and try again.".to_owned(),
            Self::NotFound => "Paper not found.".to_owned(),
            Self::Status(code) => format!("The server could not complete the request ({code})."),
            Self::Decode(_) => "The server sent a response that could not be read.".to_owned(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Status(500..=599))
    }
}

/// Detail record for one paper, as served by `paper-info`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct PaperDetail {
    #[serde(rename = "mag_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "doi_url")]
    pub link: Option<String>,
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RecommendedPaper {
    #[serde(rename = "mag_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub score: Option<f32>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ForYouResponse {
    pub papers: Vec<RecommendedPaper>,
    #[serde(default)]
    pub count: usize,
}

#[derive(Serialize)]
struct ClickBody<'a> {
    mag_id: &'a str,
}

/// Network boundary for paper details, recommendations and click tracking.
pub trait PaperApi: Send + Sync {
    fn paper_info(&self, id: &str) -> Result<PaperDetail, ApiError>;
    fn for_you(&self, count: usize, token: Option<&str>) -> Result<ForYouResponse, ApiError>;
    fn register_click(&self, id: &str, token: Option<&str>) -> Result<(), ApiError>;
}

pub struct HttpPaperApi {
    client: Client,
    base_url: String,
}

impl HttpPaperApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn send(request: RequestBuilder, token: Option<&str>) -> Result<Response, ApiError> {
        let request = match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request
            .send()
            .map_err(|error| ApiError::Network(error.to_string()))?;
        check_status(response.status())?;
        Ok(response)
    }

    fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response
            .json::<T>()
            .map_err(|error| ApiError::Decode(error.to_string()))
    }
}

impl PaperApi for HttpPaperApi {
    fn paper_info(&self, id: &str) -> Result<PaperDetail, ApiError> {
        let request = self
            .client
            .get(self.url("/api/papers/paper-info"))
            .query(&[("mag_id", id)]);
        Self::decode(Self::send(request, None)?)
    }

    fn for_you(&self, count: usize, token: Option<&str>) -> Result<ForYouResponse, ApiError> {
        let request = self
            .client
            .get(self.url("/api/papers/for-you"))
            .query(&[("n", count)]);
        Self::decode(Self::send(request, token)?)
    }

    fn register_click(&self, id: &str, token: Option<&str>) -> Result<(), ApiError> {
        let request = self
            .client
            .post(self.url("/api/papers/click"))
            .json(&ClickBody { mag_id: id });
        Self::send(request, token).map(drop)
    }
}

pub(crate) fn check_status(status: StatusCode) -> Result<(), ApiError> {
    if status.is_success() {
        Ok(())
    } else if status == StatusCode::NOT_FOUND {
        Err(ApiError::NotFound)
    } else {
        Err(ApiError::Status(status.as_u16()))
    }
}
