//! Outbound webhook delivery for noteworthy campaign events.
//!
//! Deliveries are signed with HMAC-SHA256 over `"{timestamp}.{body}"` and
//! retried with exponential backoff. Failures never block the caller.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::events::Event;
use crate::metrics::OPS_METRICS;

/// HMAC signature generator for webhook authentication
pub struct SignatureGenerator {
    secret: String,
}

impl SignatureGenerator {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    /// Sign `"{timestamp}.{body}"` and return the hex-encoded digest.
    pub fn sign_payload(&self, timestamp: &str, body: &str) -> String {
        use hmac::{Hmac, Mac};
        use sha2::Sha256;

        type HmacSha256 = Hmac<Sha256>;

        let signed_payload = format!("{}.{}", timestamp, body);
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signed_payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

/// Wire format posted to the webhook endpoint. The event's own tag and data
/// are flattened in, so receivers see `{"id", "created_at", "event", "data"}`.
#[derive(Debug, Serialize)]
struct WebhookEnvelope<'a> {
    id: Uuid,
    created_at: DateTime<Utc>,
    #[serde(flatten)]
    event: &'a Event,
}

#[derive(Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    signature_generator: Arc<SignatureGenerator>,
    max_retries: u32,
}

impl WebhookNotifier {
    pub fn new(url: String, secret: String, timeout_secs: u64, max_retries: u32) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            url,
            signature_generator: Arc::new(SignatureGenerator::new(secret)),
            max_retries: max_retries.max(1),
        }
    }

    /// Build a notifier from config. Returns `None` when no webhook URL is
    /// configured; config validation guarantees a secret accompanies the URL.
    pub fn from_config(config: &AppConfig) -> Option<Arc<Self>> {
        let url = config.webhook_url.clone()?;
        let secret = config.webhook_secret.clone()?;
        Some(Arc::new(Self::new(
            url,
            secret,
            config.webhook_timeout_secs,
            config.webhook_max_retries,
        )))
    }

    /// Deliver one event, retrying with 1s/2s/4s backoff between attempts.
    #[instrument(skip(self, event), fields(event = event.name()))]
    pub async fn deliver(&self, event: &Event) -> Result<(), ServiceError> {
        let envelope = WebhookEnvelope {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            event,
        };
        let body = serde_json::to_string(&envelope)
            .map_err(|e| ServiceError::SerializationError(e.to_string()))?;

        let timestamp = Utc::now().to_rfc3339();
        let signature = self.signature_generator.sign_payload(&timestamp, &body);

        for attempt in 1..=self.max_retries {
            let request = self
                .client
                .post(&self.url)
                .header("Content-Type", "application/json")
                .header("X-Webhook-Timestamp", &timestamp)
                .header("X-Webhook-Signature", &signature)
                .body(body.clone());

            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    info!(event = event.name(), "Webhook delivered");
                    OPS_METRICS.record_webhook_delivery();
                    return Ok(());
                }
                Ok(response) => {
                    warn!(
                        status = %response.status(),
                        attempt,
                        max_retries = self.max_retries,
                        "Webhook delivery rejected"
                    );
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        attempt,
                        max_retries = self.max_retries,
                        "Webhook delivery error"
                    );
                }
            }

            // Exponential backoff: 1s, 2s, 4s
            if attempt < self.max_retries {
                let backoff = Duration::from_secs(2_u64.pow(attempt - 1));
                tokio::time::sleep(backoff).await;
            }
        }

        OPS_METRICS.record_webhook_failure();
        Err(ServiceError::ExternalServiceError(format!(
            "Failed to deliver webhook after {} attempts",
            self.max_retries
        )))
    }

    /// Fire-and-forget delivery used by the event loop.
    pub fn send_async(&self, event: &Event) {
        let notifier = self.clone();
        let event = event.clone();

        tokio::spawn(async move {
            if let Err(e) = notifier.deliver(&event).await {
                error!("Async webhook delivery failed: {}", e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_64_hex_chars() {
        let generator = SignatureGenerator::new("test_secret_at_least_16".to_string());
        let sig = generator.sign_payload("2026-01-01T00:00:00Z", r#"{"event":"invoice_paid"}"#);
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn signature_is_deterministic_per_secret() {
        let a = SignatureGenerator::new("secret_one_long_enough".to_string());
        let b = SignatureGenerator::new("secret_two_long_enough".to_string());
        let timestamp = "2026-01-01T00:00:00Z";
        let body = r#"{"event":"campaign_completed"}"#;

        assert_eq!(a.sign_payload(timestamp, body), a.sign_payload(timestamp, body));
        assert_ne!(a.sign_payload(timestamp, body), b.sign_payload(timestamp, body));
    }

    #[test]
    fn envelope_flattens_event_tag() {
        let event = Event::CampaignCompleted(Uuid::new_v4());
        let envelope = WebhookEnvelope {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            event: &event,
        };

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["event"], "campaign_completed");
        assert!(value["id"].is_string());
        assert!(value["created_at"].is_string());
    }

    #[test]
    fn from_config_requires_url() {
        let config = AppConfig::new("sqlite::memory:", "127.0.0.1", 8080, "development");
        assert!(WebhookNotifier::from_config(&config).is_none());
    }
}
