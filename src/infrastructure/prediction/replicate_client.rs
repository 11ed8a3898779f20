use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;

use crate::application::ports::{
    Prediction, PredictionClient, PredictionError, PredictionRequest, PredictionStatus,
};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Replicate-style prediction API client: create, poll by id, cancel, and
/// bare-URL artifact download. Authenticated with a bearer token.
pub struct ReplicateClient {
    client: Client,
    base_url: String,
    token: String,
}

impl ReplicateClient {
    pub fn new(base_url: &str, token: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client build never fails with valid TLS config");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    async fn parse_prediction(
        response: reqwest::Response,
    ) -> Result<Prediction, PredictionError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PredictionError::ApiRequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let payload: PredictionPayload = response
            .json()
            .await
            .map_err(|e| PredictionError::InvalidResponse(e.to_string()))?;

        Ok(payload.into())
    }
}

#[async_trait]
impl PredictionClient for ReplicateClient {
    async fn create(&self, request: &PredictionRequest) -> Result<Prediction, PredictionError> {
        let body = serde_json::json!({
            "version": request.version,
            "input": {
                "image": request.image,
                "style_weights": request.style_weights,
                "scale": request.scale,
                "prompt": request.prompt,
            },
        });

        let response = self
            .client
            .post(format!("{}/v1/predictions", self.base_url))
            .header("Authorization", self.auth_header())
            .json(&body)
            .send()
            .await
            .map_err(|e| PredictionError::ApiRequestFailed(e.to_string()))?;

        Self::parse_prediction(response).await
    }

    async fn get(&self, id: &str) -> Result<Prediction, PredictionError> {
        let response = self
            .client
            .get(format!("{}/v1/predictions/{}", self.base_url, id))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| PredictionError::ApiRequestFailed(e.to_string()))?;

        Self::parse_prediction(response).await
    }

    async fn cancel(&self, id: &str) -> Result<(), PredictionError> {
        let response = self
            .client
            .post(format!("{}/v1/predictions/{}/cancel", self.base_url, id))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| PredictionError::ApiRequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PredictionError::ApiRequestFailed(format!(
                "cancel returned HTTP {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn download(&self, url: &str) -> Result<Bytes, PredictionError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PredictionError::DownloadFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PredictionError::DownloadFailed(format!(
                "HTTP {}",
                response.status()
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| PredictionError::DownloadFailed(e.to_string()))
    }
}

/// Wire shape of a prediction. The API returns `output` as either a single
/// URL or a list of URLs depending on the model.
#[derive(Deserialize)]
struct PredictionPayload {
    id: String,
    status: PredictionStatus,
    #[serde(default)]
    output: Option<OneOrMany>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<PredictionPayload> for Prediction {
    fn from(payload: PredictionPayload) -> Self {
        let output = payload.output.map(|o| match o {
            OneOrMany::One(url) => vec![url],
            OneOrMany::Many(urls) => urls,
        });
        Prediction {
            id: payload.id,
            status: payload.status,
            output,
            error: payload.error,
        }
    }
}
