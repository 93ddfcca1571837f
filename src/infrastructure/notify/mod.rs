//! Outbound notifications
//!
//! Mail delivery is best effort: a lost confirmation must never fail the
//! payment flow that triggered it.

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::application::ports::Mailer;
use crate::config::MailConfig;

pub struct HttpMailer {
    http: reqwest::Client,
    endpoint: Option<String>,
    from: Option<String>,
}

impl HttpMailer {
    pub fn new(config: &MailConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            from: config.from.clone(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send_payment_confirmation(&self, to: &str) {
        let Some(endpoint) = &self.endpoint else {
            info!("Mail endpoint not configured, skipping confirmation to {}", to);
            return;
        };

        let payload = json!({
            "to": to,
            "from": self.from,
            "subject": "Payment confirmation",
            "body": "Your payment was processed successfully.",
        });

        match self.http.post(endpoint).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                info!("Payment confirmation sent to {}", to);
            }
            Ok(response) => {
                warn!(
                    "Mail endpoint returned {} for confirmation to {}",
                    response.status(),
                    to
                );
            }
            Err(e) => {
                warn!("Failed to send payment confirmation to {}: {}", to, e);
            }
        }
    }
}
