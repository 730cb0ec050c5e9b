//! The consumer-side visit pipeline.
//!
//! Gate → submit → resolve → score. Below the confidence gate nothing is
//! emitted; the same physical visit can be re-evaluated later with updated
//! dwell/prior-visit signals, and the idempotency key stays stable across
//! those re-evaluations so the server still processes the visit once.

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use keel_core::{
    confidence, CardCandidate, CardRecommendation, ScoreRequest, VisitEventBody, VisitSignal,
    VisitStatus,
};

use crate::client::KeelClient;
use crate::error::ClientError;

/// Result of processing one detected visit.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Confidence below the gate: wait for more dwell, no event emitted.
    AwaitMoreSignal { confidence: f64 },
    /// The visit was already processed under this key.
    Duplicate,
    /// Ranked recommendation for the resolved (or category-only) merchant.
    Recommendation {
        merchant: Option<String>,
        mcc: Option<String>,
        category: Option<String>,
        confidence: f64,
        top: Vec<CardRecommendation>,
        rules_version: String,
    },
}

/// Confidence-gated recommendation pipeline over a [`KeelClient`].
pub struct Recommender {
    client: KeelClient,
    gate: f64,
}

impl Recommender {
    pub fn new(client: KeelClient) -> Self {
        Self {
            client,
            gate: confidence::RECOMMEND_GATE,
        }
    }

    /// Override the gate (e.g. from `GET /v1/config`).
    pub fn with_gate(client: KeelClient, gate: f64) -> Self {
        Self { client, gate }
    }

    /// Process one detected visit against the user's wallet.
    pub async fn process_visit(
        &self,
        signal: &VisitSignal,
        cards: &[CardCandidate],
        user_id: Option<&str>,
    ) -> Result<Outcome, ClientError> {
        let confidence = confidence::score(signal);
        if confidence.score < self.gate {
            debug!(
                confidence = confidence.score,
                gate = self.gate,
                "visit below confidence gate, deferring"
            );
            return Ok(Outcome::AwaitMoreSignal {
                confidence: confidence.score,
            });
        }

        let key = idempotency_key(signal, user_id);
        let event = VisitEventBody {
            lat: signal.latitude,
            lon: signal.longitude,
            timestamp: signal.arrival_time,
            user_id: user_id.map(str::to_string),
        };

        if self.client.submit_visit(&key, &event).await? == VisitStatus::Duplicate {
            debug!(idempotency_key = %key, "visit already processed");
            return Ok(Outcome::Duplicate);
        }

        // Degraded path: no merchant at the location still yields a
        // category-less ranking over base multipliers. Other failures are
        // structured errors, so the caller can tell "service failed" apart
        // from "low confidence".
        let resolution = match self
            .client
            .resolve_merchant(signal.latitude, signal.longitude)
            .await
        {
            Ok(resolution) => Some(resolution),
            Err(ClientError::Api { ref code, .. }) if code == "NO_MERCHANTS_FOUND" => None,
            Err(e) => return Err(e),
        };

        let (merchant, mcc, category) = match resolution {
            Some(r) => (r.merchant, r.mcc, r.category),
            None => (None, None, None),
        };

        let score = self
            .client
            .score(&ScoreRequest {
                merchant: merchant.clone(),
                mcc: mcc.clone(),
                category: category.clone(),
                cards: Some(cards.iter().map(|c| c.name.clone()).collect()),
            })
            .await?;

        info!(
            merchant = merchant.as_deref().unwrap_or("-"),
            top_card = score.top.first().map(|r| r.card.as_str()).unwrap_or("-"),
            rules_version = %score.used_rules_version,
            "recommendation ready"
        );

        Ok(Outcome::Recommendation {
            merchant,
            mcc,
            category,
            confidence: confidence.score,
            top: score.top,
            rules_version: score.used_rules_version,
        })
    }
}

/// Derive a deterministic idempotency key for a visit.
///
/// Hashes the user, the coordinates rounded to ~1 m precision, and the
/// arrival time. Dwell and prior-visit updates do not change the key, so a
/// re-evaluated visit maps to the same event.
pub fn idempotency_key(signal: &VisitSignal, user_id: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user_id.unwrap_or("anonymous").as_bytes());
    hasher.update(format!("{:.5}", signal.latitude).as_bytes());
    hasher.update(format!("{:.5}", signal.longitude).as_bytes());
    hasher.update(signal.arrival_time.timestamp().to_be_bytes());

    let hash = hex::encode(hasher.finalize());
    hash[..32].to_string()
}
