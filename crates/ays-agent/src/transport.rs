use async_trait::async_trait;
use ays_common::types::Payload;
use reqwest::StatusCode;

/// Maximum number of response body bytes kept in a delivery error.
const MAX_BODY_LENGTH: usize = 500;

/// A report the agent endpoint did not accept.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The endpoint answered with something other than 204 No Content.
    #[error("Delivery: server responded with status={status}, body={body}")]
    Rejected { status: u16, body: String },

    /// The request never got a response.
    #[error("Delivery: HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Sends a compiled payload to its destination. Implementations do not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, destination: &str, payload: &Payload) -> Result<(), DeliveryError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, destination: &str, payload: &Payload) -> Result<(), DeliveryError> {
        let resp = self.client.post(destination).json(payload).send().await?;
        let status = resp.status();
        if status == StatusCode::NO_CONTENT {
            tracing::debug!(destination, "Payload accepted");
            return Ok(());
        }

        let body = match resp.text().await {
            Ok(text) => truncate(&text, MAX_BODY_LENGTH),
            Err(e) => format!("[failed to read response body: {e}]"),
        };
        Err(DeliveryError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("aé", 2), "a...");
    }
}
