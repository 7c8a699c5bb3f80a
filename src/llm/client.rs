use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm::{
    CandidateGenerator, GeneratorError, SYSTEM_PROMPT, WindowRequest, build_window_prompt,
    parse_chapter_response, parse_chapter_value,
};
use crate::models::ChapterCandidate;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const TOOL_NAME: &str = "submit_chapters";

/// Configuration for the Anthropic API client
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key (from ANTHROPIC_API_KEY env var)
    pub api_key: String,
    /// Model to use (e.g., "claude-sonnet-4-20250514")
    pub model: String,
    /// Temperature (0-1, lower = more deterministic)
    pub temperature: f64,
    /// Maximum tokens in response
    pub max_tokens: u32,
}

impl AnthropicConfig {
    /// Create config from environment variables
    ///
    /// `CHAPTERIZE_MODEL` overrides the default model when set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .context("ANTHROPIC_API_KEY environment variable not set")?;
        let model = std::env::var("CHAPTERIZE_MODEL")
            .unwrap_or_else(|_| "claude-sonnet-4-20250514".to_string());

        Ok(Self::new(api_key, model))
    }

    /// Create with custom settings
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            temperature: 0.1,
            max_tokens: 4096,
        }
    }
}

/// Anthropic API client
pub struct AnthropicClient {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    pub fn new(config: AnthropicConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Send a message with the chapter tool forced, returning the raw reply
    async fn send_with_tool(&self, system: &str, user: &str) -> Result<AnthropicResponse> {
        let request = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: Some(self.config.temperature),
            system: Some(system.to_string()),
            messages: vec![Message {
                role: "user".to_string(),
                content: user.to_string(),
            }],
            tools: vec![chapter_tool()],
            tool_choice: Some(ToolChoice {
                choice_type: "tool".to_string(),
                name: TOOL_NAME.to_string(),
            }),
        };

        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Anthropic API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GeneratorError::Status { status, body })
                .context("Anthropic API request failed");
        }

        response
            .json()
            .await
            .context("Failed to parse Anthropic API response")
    }
}

impl CandidateGenerator for AnthropicClient {
    async fn propose(&self, request: &WindowRequest) -> Result<Vec<ChapterCandidate>> {
        let prompt = build_window_prompt(request);
        let response = self.send_with_tool(SYSTEM_PROMPT, &prompt).await?;
        candidates_from_response(&response)
            .with_context(|| format!("Window {}: unusable reply", request.window_id))
    }
}

/// Prefer the tool input; fall back to JSON in a text block
fn candidates_from_response(response: &AnthropicResponse) -> Result<Vec<ChapterCandidate>> {
    for content in &response.content {
        if content.content_type == "tool_use" && content.name.as_deref() == Some(TOOL_NAME) {
            if let Some(input) = &content.input {
                return Ok(parse_chapter_value(input)?);
            }
        }
    }

    let text: String = response
        .content
        .iter()
        .filter(|c| c.content_type == "text")
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    if text.trim().is_empty() {
        anyhow::bail!("No tool_use or text content in response");
    }

    debug!("No tool_use block, parsing text reply ({} chars)", text.len());
    Ok(parse_chapter_response(&text)?)
}

fn chapter_tool() -> Tool {
    Tool {
        name: TOOL_NAME.to_string(),
        description: "Submit the chapters identified in this transcript window".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "chapters": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "chapter_name": {
                                "type": "string",
                                "description": "Short descriptive name (2-5 words)"
                            },
                            "start_time": {
                                "type": "number",
                                "description": "Chapter start in seconds"
                            },
                            "end_time": {
                                "type": "number",
                                "description": "Chapter end in seconds"
                            }
                        },
                        "required": ["chapter_name", "start_time", "end_time"]
                    }
                }
            },
            "required": ["chapters"]
        }),
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct Tool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice {
    #[serde(rename = "type")]
    choice_type: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    input: Option<serde_json::Value>,
}
