use async_trait::async_trait;
use skycaster_llm_sdk::client::LlmClient;
use skycaster_weather::{WeatherProvider, WeatherService};
use std::sync::Arc;

use crate::city_resolver::PatternCityResolver;
use crate::config::AppConfig;
use crate::error::AgentError;
use crate::orchestrator::{OrchestratorSettings, ToolCallOrchestrator, TurnDefaults};
use crate::weather_tool::WeatherTool;
use crate::{Agent, AgentTool};

/// Agent that answers one weather question per call.
///
/// Holds no conversation state: every call to [`Agent::execute`] starts a
/// fresh turn with the same defaults.
pub struct WeatherAgent {
    orchestrator: ToolCallOrchestrator,
    defaults: TurnDefaults,
}

impl WeatherAgent {
    pub fn new(orchestrator: ToolCallOrchestrator, defaults: TurnDefaults) -> Self {
        Self {
            orchestrator,
            defaults,
        }
    }
}

#[async_trait]
impl Agent for WeatherAgent {
    fn objective(&self) -> &str {
        "Answer weather questions with a short, natural forecast"
    }

    fn system_prompt(&self) -> String {
        self.orchestrator.conversation().system_prompt().to_string()
    }

    fn tools(&self) -> Vec<AgentTool> {
        vec![AgentTool::GetWeather]
    }

    async fn execute(&self, user_prompt: &str) -> Result<String, AgentError> {
        self.orchestrator.run(user_prompt, &self.defaults).await
    }
}

/// Build a weather agent backed by Open-Meteo (or its mock reading)
pub fn create_weather_agent(
    client: Arc<dyn LlmClient>,
    config: &AppConfig,
) -> Result<WeatherAgent, AgentError> {
    let service = WeatherService::open_meteo(config.weather_mode())?;
    create_weather_agent_with_provider(client, Arc::new(service), config)
}

/// Build a weather agent over any weather provider
pub fn create_weather_agent_with_provider(
    client: Arc<dyn LlmClient>,
    provider: Arc<dyn WeatherProvider>,
    config: &AppConfig,
) -> Result<WeatherAgent, AgentError> {
    tracing::debug!(
        provider = %provider.name(),
        model = %config.model,
        city = %config.default_city,
        "Creating weather agent"
    );

    let orchestrator = ToolCallOrchestrator::new(
        client,
        WeatherTool::new(provider),
        Box::new(PatternCityResolver::new()?),
        OrchestratorSettings::with_model(config.model.clone()),
    )?;

    Ok(WeatherAgent::new(orchestrator, config.turn_defaults()))
}
