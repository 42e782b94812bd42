//! Canned assistant for dev and tests. Never touches the network.

use super::{Assistant, AssistantError, ChatMessage, ChatRole};
use async_trait::async_trait;

#[derive(Debug, Default)]
pub struct FakeAssistant;

#[async_trait]
impl Assistant for FakeAssistant {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, AssistantError> {
        let last_user_turn = messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::User)
            .map(|m| m.content.as_str())
            .unwrap_or("");

        Ok(format!(
            "I'm a placeholder dietician. You asked: \"{}\". \
             Configure ASSISTANT_URL to get real advice.",
            last_user_turn
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_echoes_last_user_message() {
        let assistant = FakeAssistant;
        let messages = vec![
            ChatMessage {
                role: ChatRole::User,
                content: "how much protein?".to_string(),
            },
            ChatMessage {
                role: ChatRole::Assistant,
                content: "a lot".to_string(),
            },
            ChatMessage {
                role: ChatRole::User,
                content: "is rice healthy?".to_string(),
            },
        ];
        let reply = assistant.chat(&messages).await.unwrap();
        assert!(reply.contains("is rice healthy?"));
    }
}
