//! Typed wrappers over the `/v1` endpoints with bounded retry.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use keel_core::{
    ErrorEnvelope, MerchantResolution, RemoteConfig, ScoreRequest, ScoreResponse, VisitEventBody,
    VisitResponse, VisitStatus,
};

use crate::error::ClientError;
use crate::retry::RetryPolicy;

/// Client for the keel API.
pub struct KeelClient {
    http: Client,
    base_url: String,
    policy: RetryPolicy,
}

impl KeelClient {
    /// Create a client with the default retry policy.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_policy(base_url, RetryPolicy::default())
    }

    /// Create a client with an explicit retry policy.
    pub fn with_policy(base_url: impl Into<String>, policy: RetryPolicy) -> Self {
        let http = Client::builder()
            .connect_timeout(policy.connect_timeout)
            .timeout(policy.request_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            policy,
        }
    }

    /// `GET /v1/merchant/resolve`
    pub async fn resolve_merchant(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<MerchantResolution, ClientError> {
        self.execute("resolve", || {
            self.http
                .get(format!("{}/v1/merchant/resolve", self.base_url))
                .query(&[("lat", lat), ("lon", lon)])
        })
        .await
    }

    /// `POST /v1/score`
    pub async fn score(&self, request: &ScoreRequest) -> Result<ScoreResponse, ClientError> {
        self.execute("score", || {
            self.http
                .post(format!("{}/v1/score", self.base_url))
                .json(request)
        })
        .await
    }

    /// `POST /v1/events/visit`
    ///
    /// Safe to retry by construction: a lost response followed by a retry
    /// surfaces as a normal `duplicate`.
    pub async fn submit_visit(
        &self,
        idempotency_key: &str,
        event: &VisitEventBody,
    ) -> Result<VisitStatus, ClientError> {
        let response: VisitResponse = self
            .execute("events", || {
                self.http
                    .post(format!("{}/v1/events/visit", self.base_url))
                    .header("Idempotency-Key", idempotency_key)
                    .json(event)
            })
            .await?;
        Ok(response.status)
    }

    /// `GET /v1/config`
    pub async fn fetch_config(&self) -> Result<RemoteConfig, ClientError> {
        self.execute("config", || {
            self.http.get(format!("{}/v1/config", self.base_url))
        })
        .await
    }

    /// Run one call under the retry policy.
    ///
    /// Retries on transport failure or when the server's envelope says
    /// `retryable:true`; everything else fails on the first attempt.
    async fn execute<T, F>(&self, op: &str, make_request: F) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 1u32;

        loop {
            let failure = match make_request().send().await {
                Ok(response) if response.status().is_success() => {
                    return response
                        .json::<T>()
                        .await
                        .map_err(|e| ClientError::Decode(e.to_string()));
                }
                Ok(response) => envelope_error(response).await,
                Err(e) => ClientError::Transport(e.to_string()),
            };

            let retryable = match &failure {
                ClientError::Transport(_) => true,
                ClientError::Api { retryable, .. } => *retryable,
                ClientError::Decode(_) => false,
            };

            if !retryable || attempt >= self.policy.max_attempts {
                return Err(failure);
            }

            let backoff = self.policy.backoff_for(attempt);
            warn!(
                op,
                attempt,
                backoff_ms = backoff.as_millis() as u64,
                error = %failure,
                "call failed, retrying"
            );
            tokio::time::sleep(backoff).await;
            attempt += 1;
        }
    }
}

/// Parse a non-2xx response into a structured API error.
async fn envelope_error(response: reqwest::Response) -> ClientError {
    let status = response.status();
    match response.json::<ErrorEnvelope>().await {
        Ok(envelope) => {
            debug!(
                code = %envelope.error.code,
                retryable = envelope.error.retryable,
                "server returned error envelope"
            );
            ClientError::Api {
                status: status.as_u16(),
                code: envelope.error.code,
                message: envelope.error.message,
                retryable: envelope.error.retryable,
            }
        }
        // No parsable envelope: classify by status class alone.
        Err(_) => ClientError::Api {
            status: status.as_u16(),
            code: "UNKNOWN".to_string(),
            message: format!("HTTP {}", status),
            retryable: status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS,
        },
    }
}
