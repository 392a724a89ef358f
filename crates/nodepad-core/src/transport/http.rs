//! `reqwest`-backed transport.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;

use super::{ApiRequest, ApiResponse, HttpTransport, TransportError};
use crate::config::ApiConfig;

#[derive(Clone)]
pub struct ReqwestTransport {
    config: ApiConfig,
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: ApiConfig) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { config, client })
    }
}

/// Connection failures and timeouts mean the server never answered.
fn classify(error: reqwest::Error) -> TransportError {
    if error.is_connect() || error.is_timeout() {
        TransportError::Unreachable(error.to_string())
    } else {
        TransportError::Http(error)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.config.endpoint(request.path());
        tracing::debug!(method = %request.method(), path = request.path(), "Sending API request");

        let mut builder = self
            .client
            .request(request.method().clone(), &url)
            .headers(request.headers().clone())
            .header(ACCEPT, "application/json");
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(status = status.as_u16(), path = request.path(), "API response");
        Ok(ApiResponse::new(status, body))
    }
}
