//! Summarizer backed by the Anthropic Messages API.

use chat_handoff_core::{summary_prompt, SummarizationError, SummarizeOptions, Summarizer};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<RequestMessage>,
}

#[derive(Debug, Serialize)]
struct RequestMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

/// Blocking client for the Messages endpoint.
pub struct AnthropicSummarizer {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl AnthropicSummarizer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            endpoint: MESSAGES_URL.to_string(),
        }
    }

    /// Send requests to a different endpoint (proxies, tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

fn request_error(e: reqwest::Error, options: &SummarizeOptions) -> SummarizationError {
    if e.is_timeout() {
        SummarizationError::Timeout(options.timeout.as_secs())
    } else {
        SummarizationError::Transport(e.to_string())
    }
}

fn first_text(response: MessagesResponse) -> Result<String, SummarizationError> {
    response
        .content
        .into_iter()
        .find_map(|block| block.text)
        .ok_or_else(|| {
            SummarizationError::MalformedResponse("response has no text content".to_string())
        })
}

impl Summarizer for AnthropicSummarizer {
    fn summarize(
        &self,
        transcript: &str,
        options: &SummarizeOptions,
    ) -> Result<String, SummarizationError> {
        let request = MessagesRequest {
            model: &options.model_id,
            max_tokens: options.max_output_tokens,
            messages: vec![RequestMessage {
                role: "user",
                content: summary_prompt(transcript),
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(options.timeout)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .map_err(|e| request_error(e, options))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SummarizationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = response.json().map_err(|e| {
            if e.is_timeout() {
                SummarizationError::Timeout(options.timeout.as_secs())
            } else {
                SummarizationError::MalformedResponse(e.to_string())
            }
        })?;
        first_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_first_text_block() {
        let response: MessagesResponse = serde_json::from_str(
            r###"{"id": "msg_1", "content": [
                {"type": "thinking", "thinking": "..."},
                {"type": "text", "text": "## Session Overview\nDone."}
            ]}"###,
        )
        .unwrap();
        assert_eq!(first_text(response).unwrap(), "## Session Overview\nDone.");
    }

    #[test]
    fn test_missing_text_is_malformed() {
        let response: MessagesResponse = serde_json::from_str(r#"{"content": []}"#).unwrap();
        assert!(matches!(
            first_text(response),
            Err(SummarizationError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_request_shape() {
        let request = MessagesRequest {
            model: "m",
            max_tokens: 10,
            messages: vec![RequestMessage {
                role: "user",
                content: "hi".to_string(),
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "m",
                "max_tokens": 10,
                "messages": [{"role": "user", "content": "hi"}]
            })
        );
    }

    #[test]
    fn test_unreachable_endpoint_is_an_error() {
        let summarizer =
            AnthropicSummarizer::new("sk-test").with_endpoint("http://127.0.0.1:1/v1/messages");
        let options = SummarizeOptions {
            model_id: "m".to_string(),
            max_output_tokens: 10,
            timeout: Duration::from_secs(5),
        };
        assert!(matches!(
            summarizer.summarize("[Human]: hi", &options),
            Err(SummarizationError::Transport(_)) | Err(SummarizationError::Timeout(_))
        ));
    }
}
