//! Client side of the lookup boundary: `GET <endpoint>/api/weather?city=`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::{fmt::Debug, time::Duration};

use crate::{
    error::LookupError,
    model::{ErrorBody, WeatherSnapshot},
};

/// One lookup per call, no caching and no retry.
#[async_trait]
pub trait WeatherLookup: Send + Sync + Debug {
    async fn lookup(&self, city: &str) -> Result<WeatherSnapshot, LookupError>;
}

#[derive(Debug, Clone)]
pub struct HttpLookupClient {
    endpoint: String,
    http: Client,
}

impl HttpLookupClient {
    /// `timeout` bounds the whole request; exceeding it is a transport error.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn fetch(&self, city: &str) -> Result<WeatherSnapshot, LookupError> {
        let url = format!("{}/api/weather", self.endpoint);

        let res = self
            .http
            .get(url)
            .query(&[("city", city)])
            .send()
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, city, "lookup request failed");
                LookupError::transport()
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            tracing::debug!(error = %e, city, "failed to read lookup response body");
            LookupError::transport()
        })?;

        classify_response(status, &body)
    }
}

#[async_trait]
impl WeatherLookup for HttpLookupClient {
    async fn lookup(&self, city: &str) -> Result<WeatherSnapshot, LookupError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(LookupError::Validation("Please enter a city name.".to_string()));
        }
        self.fetch(city).await
    }
}

fn classify_response(status: StatusCode, body: &str) -> Result<WeatherSnapshot, LookupError> {
    if status == StatusCode::BAD_REQUEST {
        let message = serde_json::from_str::<ErrorBody>(body).ok().map(|b| b.error);
        return Err(LookupError::not_found(message));
    }

    if !status.is_success() {
        tracing::debug!(%status, "lookup endpoint returned an error");
        return Err(LookupError::upstream());
    }

    serde_json::from_str(body).map_err(|e| {
        tracing::warn!(error = %e, "lookup endpoint returned an unreadable snapshot");
        LookupError::upstream()
    })
}
