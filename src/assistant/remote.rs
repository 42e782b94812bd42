//! HTTP-backed assistant client.

use super::{Assistant, AssistantError, ChatMessage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Assistant backed by a remote text-generation endpoint.
#[derive(Debug)]
pub struct RemoteAssistant {
    url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl RemoteAssistant {
    pub fn new(url: String, api_key: Option<String>) -> Self {
        Self {
            url,
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

/// Wire format of the inference endpoint.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct ChatErrorResponse {
    error: String,
}

/// Map a non-success upstream status to the matching error variant.
fn classify_error(status: u16, message: String, retry_after_secs: Option<u64>) -> AssistantError {
    match status {
        429 => AssistantError::RateLimited { retry_after_secs },
        402 => AssistantError::QuotaExceeded(message),
        _ => AssistantError::Api { status, message },
    }
}

#[async_trait]
impl Assistant for RemoteAssistant {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, AssistantError> {
        let mut request = self
            .client
            .post(&self.url)
            .header("content-type", "application/json")
            .json(&ChatRequest { messages });

        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AssistantError::RequestFailed(e.to_string()))?;

        let status = response.status().as_u16();

        if status != 200 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());

            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ChatErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);

            return Err(classify_error(status, message, retry_after));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AssistantError::RequestFailed(e.to_string()))?;

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| AssistantError::Parse(e.to_string()))?;

        Ok(parsed.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_rate_limit() {
        let err = classify_error(429, "slow down".to_string(), Some(12));
        assert!(matches!(
            err,
            AssistantError::RateLimited {
                retry_after_secs: Some(12)
            }
        ));
    }

    #[test]
    fn test_classify_quota() {
        let err = classify_error(402, "payment required".to_string(), None);
        assert!(matches!(err, AssistantError::QuotaExceeded(_)));
    }

    #[test]
    fn test_classify_other_statuses_are_api_errors() {
        for status in [400, 500, 503] {
            let err = classify_error(status, "boom".to_string(), None);
            match err {
                AssistantError::Api { status: s, .. } => assert_eq!(s, status),
                other => panic!("expected Api error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_error_body_parsing() {
        let parsed: Result<ChatErrorResponse, _> = serde_json::from_str(r#"{"error":"nope"}"#);
        assert_eq!(parsed.unwrap().error, "nope");
    }
}
