//! Diet assistant bridge.
//!
//! Forwards a chat transcript to a remote inference endpoint and returns the
//! reply. Failure modes are carried as a typed error enum rather than being
//! sniffed out of error text, so handlers can map rate limiting and quota
//! exhaustion to distinct status codes.

mod fake;
mod remote;

pub use fake::FakeAssistant;
pub use remote::RemoteAssistant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error type for assistant calls.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Assistant returned error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Quota exhausted: {0}")]
    QuotaExceeded(String),

    #[error("Assistant not configured: {0}")]
    NotConfigured(String),
}

/// One turn of the visible transcript.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

/// Trait for assistant backends.
///
/// Implementations should be stateless and thread-safe; the full visible
/// transcript is sent on every turn.
#[async_trait]
pub trait Assistant: Send + Sync + fmt::Debug {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, AssistantError>;
}

/// Build the assistant backend from environment variables:
/// - ASSISTANT_URL: inference endpoint; when unset, the fake backend is used
/// - ASSISTANT_API_KEY: optional bearer token for the endpoint
pub fn create_assistant_from_env() -> Box<dyn Assistant> {
    match std::env::var("ASSISTANT_URL") {
        Ok(url) => {
            let api_key = std::env::var("ASSISTANT_API_KEY").ok();
            Box::new(RemoteAssistant::new(url, api_key))
        }
        Err(_) => {
            tracing::warn!("ASSISTANT_URL not set, using canned assistant responses");
            Box::new(FakeAssistant::default())
        }
    }
}
