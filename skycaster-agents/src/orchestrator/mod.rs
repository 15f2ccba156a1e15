use serde_json::json;
use skycaster_llm_sdk::client::LlmClient;
use skycaster_llm_sdk::models::openai::DEFAULT_MODEL_ID;
use skycaster_llm_sdk::tools::{Tool, ToolCall, ToolChoice, ToolResult};
use skycaster_llm_sdk::types::{CompletionRequest, CompletionResponse, Message};
use skycaster_weather::Coordinates;
use std::sync::Arc;

use crate::city_resolver::CityResolver;
use crate::conversation::ConversationBuilder;
use crate::error::AgentError;
use crate::weather_tool::{ToolArguments, ToolInvocationArgs, WeatherTool};
use crate::{extract_text_from_content, AgentTool};

#[cfg(test)]
mod tests;

/// Returned when the model answers directly with no usable text
pub const ANSWER_FALLBACK: &str = "Sorry, I had trouble answering.";

/// Returned when the model produced no usable text after seeing the weather
pub const FORMATTING_FALLBACK: &str = "Sorry, I had trouble formatting the weather.";

/// Decoding settings shared by both completions of a turn
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL_ID.to_string(),
            max_tokens: 300,
            temperature: 0.2,
        }
    }
}

impl OrchestratorSettings {
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }
}

/// Caller-supplied fallbacks for a single turn
#[derive(Debug, Clone, PartialEq)]
pub struct TurnDefaults {
    pub city: String,
    pub coordinates: Option<Coordinates>,
}

impl TurnDefaults {
    pub fn new(city: impl Into<String>, coordinates: Option<Coordinates>) -> Self {
        Self {
            city: city.into(),
            coordinates,
        }
    }
}

/// What the first completion asked for
enum FirstCompletion {
    Answer(String),
    ToolRequested {
        text: String,
        call: ToolCall,
        ignored: usize,
    },
}

impl FirstCompletion {
    fn from_response(response: CompletionResponse) -> Self {
        let text = extract_text_from_content(&response.content);
        let mut calls = response.tool_calls.unwrap_or_default().into_iter();

        match calls.next() {
            Some(call) => Self::ToolRequested {
                text,
                call,
                ignored: calls.count(),
            },
            None => Self::Answer(text),
        }
    }
}

/// Drives one weather question through the model.
///
/// The first completion is sent with the `get_weather` tool declared. A plain
/// answer ends the turn. A tool request is dispatched (only the first one),
/// its result is appended to the conversation and a second completion, with
/// no tools declared, produces the final text.
pub struct ToolCallOrchestrator {
    client: Arc<dyn LlmClient>,
    weather_tool: WeatherTool,
    city_resolver: Box<dyn CityResolver>,
    conversation: ConversationBuilder,
    settings: OrchestratorSettings,
    tool: Tool,
}

impl ToolCallOrchestrator {
    pub fn new(
        client: Arc<dyn LlmClient>,
        weather_tool: WeatherTool,
        city_resolver: Box<dyn CityResolver>,
        settings: OrchestratorSettings,
    ) -> Result<Self, AgentError> {
        let tool = AgentTool::GetWeather
            .to_tool_definition()
            .map_err(|e| AgentError::config(e.to_string()))?;

        Ok(Self {
            client,
            weather_tool,
            city_resolver,
            conversation: ConversationBuilder::new(),
            settings,
            tool,
        })
    }

    pub fn with_conversation(mut self, conversation: ConversationBuilder) -> Self {
        self.conversation = conversation;
        self
    }

    pub fn conversation(&self) -> &ConversationBuilder {
        &self.conversation
    }

    pub async fn run(&self, user_text: &str, defaults: &TurnDefaults) -> Result<String, AgentError> {
        let resolved_city = self.city_resolver.resolve(user_text, &defaults.city);
        let live_text = self
            .city_resolver
            .location_hint(user_text, &resolved_city, &defaults.city)
            .unwrap_or_else(|| user_text.to_string());

        tracing::debug!(city = %resolved_city, text = %live_text, "Starting weather turn");

        let mut messages = self.conversation.build(&live_text);
        let response = self
            .client
            .complete(self.request(messages.clone(), true))
            .await?;

        let (text, call) = match FirstCompletion::from_response(response) {
            FirstCompletion::Answer(text) => {
                tracing::debug!("Model answered without calling a tool");
                return Ok(non_empty_or(&text, ANSWER_FALLBACK));
            }
            FirstCompletion::ToolRequested {
                text,
                call,
                ignored,
            } => {
                if ignored > 0 {
                    tracing::debug!(ignored, "Ignoring extra tool calls");
                }
                (text, call)
            }
        };

        tracing::debug!(tool = %call.name(), id = %call.id(), "Model requested a tool");
        let result = self.dispatch(&call, &resolved_city, defaults).await?;

        messages.push(Message::assistant_with_tool_calls(text, vec![call]));
        messages.push(Message::tool_result(result));

        let followup = self.client.complete(self.request(messages, false)).await?;
        let text = extract_text_from_content(&followup.content);

        Ok(non_empty_or(&text, FORMATTING_FALLBACK))
    }

    /// Run the requested tool, or answer with an error payload for unknown names
    async fn dispatch(
        &self,
        call: &ToolCall,
        resolved_city: &str,
        defaults: &TurnDefaults,
    ) -> Result<ToolResult, AgentError> {
        let content = match AgentTool::from_name(call.name()) {
            Some(AgentTool::GetWeather) => {
                let args = ToolInvocationArgs::reconcile(
                    ToolArguments::from_call(call),
                    resolved_city,
                    defaults.coordinates,
                )?;
                let reading = self.weather_tool.invoke(&args).await?;
                serde_json::to_string(&reading)?
            }
            None => {
                tracing::warn!(tool = %call.name(), "Model requested an unknown tool");
                serde_json::to_string(&json!({
                    "error": format!("Unknown tool {}", call.name())
                }))?
            }
        };

        Ok(ToolResult::text(call.id(), content))
    }

    fn request(&self, messages: Vec<Message>, declare_tools: bool) -> CompletionRequest {
        let (tools, tool_choice) = if declare_tools {
            (Some(vec![self.tool.clone()]), Some(ToolChoice::Auto))
        } else {
            (None, None)
        };

        CompletionRequest {
            messages,
            max_tokens: self.settings.max_tokens,
            model: self.settings.model.clone(),
            system: None,
            temperature: Some(self.settings.temperature),
            top_p: None,
            stop_sequences: None,
            tools,
            tool_choice,
        }
    }
}

fn non_empty_or(text: &str, fallback: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
