pub mod city_resolver;
pub mod config;
pub mod conversation;
pub mod error;
pub mod orchestrator;
pub mod repl;
pub mod weather_agent;
pub mod weather_tool;

use async_trait::async_trait;
use skycaster_llm_sdk::error::LlmError;
use skycaster_llm_sdk::tools::Tool;
use skycaster_llm_sdk::types::ContentBlock;

use crate::error::AgentError;
use crate::weather_tool::{GetWeatherParams, GET_WEATHER};

/// Represents the types of tools available to agents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentTool {
    GetWeather,
}

impl AgentTool {
    /// Returns the tool name as declared to the model
    pub fn name(&self) -> &'static str {
        match self {
            AgentTool::GetWeather => GET_WEATHER,
        }
    }

    /// Look up a tool by the name the model used
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            GET_WEATHER => Some(AgentTool::GetWeather),
            _ => None,
        }
    }

    /// Convert AgentTool to the skycaster-llm-sdk Tool definition for the LLM
    pub fn to_tool_definition(&self) -> Result<Tool, LlmError> {
        match self {
            AgentTool::GetWeather => Tool::from_type::<GetWeatherParams>()
                .name(self.name())
                .description(
                    "Get the current weather for a city. Pass lat and lon together when known.",
                )
                .build(),
        }
    }
}

/// Trait defining the structure and behavior of an AI agent
#[async_trait]
pub trait Agent: Send + Sync {
    /// Returns the agent's clear objective
    fn objective(&self) -> &str;

    /// Returns the system prompt for the agent
    fn system_prompt(&self) -> String;

    /// Returns the list of tools available to this agent
    fn tools(&self) -> Vec<AgentTool>;

    /// Execute the agent with the given user prompt
    async fn execute(&self, user_prompt: &str) -> Result<String, AgentError>;
}

/// Extract text content from LLM response content blocks
pub fn extract_text_from_content(content: &[ContentBlock]) -> String {
    content
        .iter()
        .map(|block| match block {
            ContentBlock::Text { text } => text.as_str(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
