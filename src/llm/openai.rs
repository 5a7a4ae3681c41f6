use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::llm::provider::{ChatMessage, CompletionProvider};

pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<OpenAIError>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIError {
    message: String,
}

impl OpenAIProvider {
    pub fn new(api_key: String, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAIProvider {
    async fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String> {
        let chars: usize = messages.iter().map(|m| m.content.len()).sum();
        tracing::debug!("Sending {} prompt characters to {}", chars, model);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&ChatRequest { model, messages })
            .send()
            .await
            .map_err(|e| Error::LLMApi(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::LLMApi(format!(
                "OpenAI API error ({}): {}",
                status, body
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::LLMApi(format!("Failed to parse OpenAI response: {}", e)))?;

        if let Some(error) = result.error {
            return Err(Error::LLMApi(error.message));
        }

        let text = result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(Error::LLMApi(format!("Empty response from {}", model)));
        }

        Ok(text)
    }

    fn name(&self) -> &str {
        "OpenAI"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn messages() -> Vec<ChatMessage> {
        vec![ChatMessage::system("rules"), ChatMessage::user("diff")]
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "gpt-4o",
                "messages": [
                    {"role": "system", "content": "rules"},
                    {"role": "user", "content": "diff"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"choices": [
                    {"message": {"role": "assistant", "content": "{\"approved\": true}"}},
                    {"message": {"role": "assistant", "content": "second"}}
                ]}"#,
            )
            .create_async()
            .await;

        let provider = OpenAIProvider::new("sk-test".to_string(), &server.url()).unwrap();
        let text = provider.complete("gpt-4o", &messages()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(text, r#"{"approved": true}"#);
    }

    #[tokio::test]
    async fn test_http_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(404)
            .with_body(r#"{"error": {"message": "model not found"}}"#)
            .create_async()
            .await;

        let provider = OpenAIProvider::new("sk-test".to_string(), &server.url()).unwrap();
        let err = provider.complete("gone", &messages()).await.unwrap_err();
        assert!(matches!(err, Error::LLMApi(msg) if msg.contains("404")));
    }

    #[tokio::test]
    async fn test_empty_content_is_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": [{"message": {"content": "  "}}]}"#)
            .create_async()
            .await;

        let provider = OpenAIProvider::new("sk-test".to_string(), &server.url()).unwrap();
        let err = provider.complete("gpt-4o", &messages()).await.unwrap_err();
        assert!(matches!(err, Error::LLMApi(msg) if msg.contains("Empty response")));
    }

    #[tokio::test]
    async fn test_no_choices_is_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let provider = OpenAIProvider::new("sk-test".to_string(), &server.url()).unwrap();
        assert!(provider.complete("gpt-4o", &messages()).await.is_err());
    }

    #[tokio::test]
    async fn test_malformed_body_is_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let provider = OpenAIProvider::new("sk-test".to_string(), &server.url()).unwrap();
        let err = provider.complete("gpt-4o", &messages()).await.unwrap_err();
        assert!(matches!(err, Error::LLMApi(msg) if msg.contains("Failed to parse")));
    }
}
