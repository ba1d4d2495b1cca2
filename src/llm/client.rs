use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::extract::{ExtractError, ExtractionRequest, Extractor, RawExtraction};
use crate::models::InsightCategory;

use super::{SYSTEM_PROMPT, build_extraction_prompt};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const INSIGHTS_TOOL: &str = "submit_insights";

/// Configuration for the Anthropic API client
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key (from ANTHROPIC_API_KEY env var)
    pub api_key: String,
    /// Model to use (ANTHROPIC_MODEL env var, else the default)
    pub model: String,
    /// Temperature (0-1, lower = more deterministic)
    pub temperature: f64,
    /// Maximum tokens in response
    pub max_tokens: u32,
}

impl AnthropicConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self, ExtractError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| ExtractError::Config("ANTHROPIC_API_KEY environment variable not set".to_string()))?;
        let model = std::env::var("ANTHROPIC_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self::new(api_key, model))
    }

    /// Create with custom settings
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            temperature: 0.3,
            max_tokens: 8192,
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

    /// Send a message with a forced tool call and return the tool input
    pub async fn send_with_tool(
        &self,
        system: &str,
        user: &str,
        tool: Tool,
    ) -> Result<serde_json::Value, ExtractError> {
        let tool_name = tool.name.clone();
        let request = AnthropicToolRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: Some(self.config.temperature),
            system: Some(system.to_string()),
            messages: vec![Message {
                role: "user".to_string(),
                content: user.to_string(),
            }],
            tools: vec![tool],
            tool_choice: Some(ToolChoice {
                choice_type: "tool".to_string(),
                name: tool_name.clone(),
            }),
        };

        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractError::Api { status, body });
        }

        let response: AnthropicResponse = response.json().await?;
        tool_input(response, &tool_name)
    }
}

impl Extractor for AnthropicClient {
    async fn extract(&self, request: &ExtractionRequest) -> Result<RawExtraction, ExtractError> {
        debug!(
            "Extracting insights for {} ({} chars) with {}",
            request.call_id,
            request.transcript_text.chars().count(),
            self.config.model
        );
        let prompt = build_extraction_prompt(request);
        let input = self
            .send_with_tool(SYSTEM_PROMPT, &prompt, insights_tool())
            .await?;
        Ok(RawExtraction::from_value(input)?)
    }
}

/// The `submit_insights` tool: one insight list per category
pub fn insights_tool() -> Tool {
    let item = serde_json::json!({
        "type": "object",
        "properties": {
            "content": {
                "type": "string",
                "description": "The insight content - specific and actionable"
            },
            "confidence": {"type": "string", "enum": ["low", "medium", "high"]},
            "direct_quote": {
                "type": "string",
                "description": "Verbatim quote from the transcript supporting the insight"
            },
            "timestamp_hint": {
                "type": "string",
                "description": "Approximate timestamp or context"
            }
        },
        "required": ["content", "confidence"]
    });

    let mut properties = serde_json::Map::new();
    for category in InsightCategory::ALL {
        properties.insert(
            category.key().to_string(),
            serde_json::json!({
                "type": "object",
                "description": category.description(),
                "properties": {
                    "insights": {"type": "array", "items": item.clone()}
                },
                "required": ["insights"]
            }),
        );
    }
    let required: Vec<&str> = InsightCategory::ALL.iter().map(|c| c.key()).collect();

    Tool {
        name: INSIGHTS_TOOL.to_string(),
        description: "Submit the insights extracted from the call, grouped by category".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required
        }),
    }
}

/// Pull the named tool's input out of a response
fn tool_input(response: AnthropicResponse, tool_name: &str) -> Result<serde_json::Value, ExtractError> {
    response
        .content
        .into_iter()
        .find(|c| c.content_type == "tool_use" && c.name.as_deref() == Some(tool_name))
        .and_then(|c| c.input)
        .ok_or(ExtractError::MissingOutput)
}

#[derive(Debug, Serialize)]
struct AnthropicToolRequest {
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

/// A tool definition for structured output
#[derive(Debug, Clone, Serialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
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
    name: Option<String>,
    #[serde(default)]
    input: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insights_tool_schema_covers_categories() {
        let tool = insights_tool();
        assert_eq!(tool.name, "submit_insights");

        let properties = tool.input_schema["properties"].as_object().unwrap();
        assert_eq!(properties.len(), 6);
        for category in InsightCategory::ALL {
            assert!(properties.contains_key(category.key()));
        }
        assert_eq!(tool.input_schema["required"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn test_tool_input_found() {
        let response: AnthropicResponse = serde_json::from_value(serde_json::json!({
            "content": [
                {"type": "text", "text": "Here you go"},
                {
                    "type": "tool_use",
                    "name": "submit_insights",
                    "input": {"faq_ideas": {"insights": [{"content": "Is there SSO?", "confidence": "high"}]}}
                }
            ]
        }))
        .unwrap();

        let input = tool_input(response, "submit_insights").unwrap();
        let raw = RawExtraction::from_value(input).unwrap();
        assert_eq!(raw.items(InsightCategory::FaqIdeas)[0].content, "Is there SSO?");
    }

    #[test]
    fn test_tool_input_missing() {
        let response: AnthropicResponse = serde_json::from_value(serde_json::json!({
            "content": [{"type": "text", "text": "I can't do that"}]
        }))
        .unwrap();

        assert!(matches!(
            tool_input(response, "submit_insights"),
            Err(ExtractError::MissingOutput)
        ));
    }

    #[test]
    fn test_request_serialization_forces_tool() {
        let request = AnthropicToolRequest {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 10,
            temperature: None,
            system: None,
            messages: vec![],
            tools: vec![insights_tool()],
            tool_choice: Some(ToolChoice {
                choice_type: "tool".to_string(),
                name: INSIGHTS_TOOL.to_string(),
            }),
        };
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["tool_choice"]["type"], "tool");
        assert_eq!(value["tool_choice"]["name"], "submit_insights");
        assert!(value.get("temperature").is_none());
    }
}
