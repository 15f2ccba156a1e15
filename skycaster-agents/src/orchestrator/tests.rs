use super::*;
use crate::city_resolver::PatternCityResolver;
use async_trait::async_trait;
use serde_json::Value;
use skycaster_llm_sdk::error::LlmError;
use skycaster_llm_sdk::types::{ContentBlock, Role, Usage};
use skycaster_weather::{WeatherError, WeatherProvider, WeatherReport};
use std::collections::VecDeque;
use std::sync::Mutex;

const DEFAULT_CITY: &str = "Minneapolis, MN";

struct ScriptedLlmClient {
    responses: Mutex<VecDeque<Result<CompletionResponse, LlmError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedLlmClient {
    fn new(responses: Vec<Result<CompletionResponse, LlmError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::internal("no scripted response left")))
    }

    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

struct RecordingProvider {
    calls: Mutex<Vec<(String, Option<Coordinates>)>>,
    fail: bool,
}

impl RecordingProvider {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    fn calls(&self) -> Vec<(String, Option<Coordinates>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherProvider for RecordingProvider {
    async fn get_weather(
        &self,
        city: &str,
        coordinates: Option<Coordinates>,
    ) -> Result<WeatherReport, WeatherError> {
        self.calls
            .lock()
            .unwrap()
            .push((city.to_string(), coordinates));
        if self.fail {
            return Err(WeatherError::parse("forecast unreadable"));
        }
        Ok(WeatherReport::mock(city))
    }

    fn name(&self) -> &str {
        "recording"
    }
}

fn text_response(text: &str) -> Result<CompletionResponse, LlmError> {
    Ok(CompletionResponse {
        content: vec![ContentBlock::Text {
            text: text.to_string(),
        }],
        role: Role::Assistant,
        usage: Usage {
            input_tokens: 10,
            output_tokens: 20,
        },
        stop_reason: Some("stop".to_string()),
        tool_calls: None,
    })
}

fn tool_response(text: &str, calls: Vec<ToolCall>) -> Result<CompletionResponse, LlmError> {
    Ok(CompletionResponse {
        content: if text.is_empty() {
            Vec::new()
        } else {
            vec![ContentBlock::Text {
                text: text.to_string(),
            }]
        },
        role: Role::Assistant,
        usage: Usage::default(),
        stop_reason: Some("tool_calls".to_string()),
        tool_calls: Some(calls),
    })
}

fn empty_response() -> Result<CompletionResponse, LlmError> {
    Ok(CompletionResponse {
        content: Vec::new(),
        role: Role::Assistant,
        usage: Usage::default(),
        stop_reason: None,
        tool_calls: None,
    })
}

fn weather_call(id: &str, arguments: &str) -> ToolCall {
    ToolCall::new(id, "get_weather", arguments)
}

fn setup(
    responses: Vec<Result<CompletionResponse, LlmError>>,
    provider: RecordingProvider,
) -> (ToolCallOrchestrator, Arc<ScriptedLlmClient>, Arc<RecordingProvider>) {
    let client = Arc::new(ScriptedLlmClient::new(responses));
    let provider = Arc::new(provider);
    let orchestrator = ToolCallOrchestrator::new(
        client.clone(),
        WeatherTool::new(provider.clone()),
        Box::new(PatternCityResolver::new().unwrap()),
        OrchestratorSettings::default(),
    )
    .unwrap();

    (orchestrator, client, provider)
}

fn defaults() -> TurnDefaults {
    TurnDefaults::new(DEFAULT_CITY, None)
}

fn tool_message_json(request: &CompletionRequest) -> Value {
    let tool_message = request
        .messages
        .iter()
        .find(|m| m.role == Role::Tool)
        .expect("tool message");
    serde_json::from_str(&tool_message.text_content()).unwrap()
}

#[tokio::test]
async fn test_direct_answer_skips_followup() {
    let (orchestrator, client, provider) =
        setup(vec![text_response("  It's sunny.  ")], RecordingProvider::new());

    let answer = orchestrator
        .run("What's the weather in Paris", &defaults())
        .await
        .unwrap();

    assert_eq!(answer, "It's sunny.");
    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    assert!(provider.calls().is_empty());

    let first = &requests[0];
    assert_eq!(first.messages.len(), 4);
    assert_eq!(first.model, "gpt-4o-mini");
    assert_eq!(first.temperature, Some(0.2));
    assert_eq!(first.tool_choice, Some(ToolChoice::Auto));
    let tools = first.tools.as_ref().unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name(), "get_weather");
}

#[tokio::test]
async fn test_empty_direct_answer_uses_fallback() {
    let (orchestrator, client, _) = setup(vec![text_response("   ")], RecordingProvider::new());

    let answer = orchestrator
        .run("What's the weather in Paris", &defaults())
        .await
        .unwrap();

    assert_eq!(answer, ANSWER_FALLBACK);
    assert_eq!(client.requests().len(), 1);
}

#[tokio::test]
async fn test_tool_call_round_trip() {
    let (orchestrator, client, provider) = setup(
        vec![
            tool_response("", vec![weather_call("call_abc", r#"{"city": "Paris"}"#)]),
            text_response("In Paris today: 60°F, cloudy, 10% chance of rain.\n"),
        ],
        RecordingProvider::new(),
    );

    let answer = orchestrator
        .run("What's the weather in Paris", &defaults())
        .await
        .unwrap();

    assert_eq!(answer, "In Paris today: 60°F, cloudy, 10% chance of rain.");
    assert_eq!(provider.calls(), vec![("Paris".to_string(), None)]);

    let requests = client.requests();
    assert_eq!(requests.len(), 2);

    let followup = &requests[1];
    assert_eq!(followup.messages.len(), 6);
    assert!(followup.tools.is_none());
    assert!(followup.tool_choice.is_none());
    assert_eq!(followup.messages[..4], requests[0].messages[..]);

    let assistant = &followup.messages[4];
    assert_eq!(assistant.role, Role::Assistant);
    assert_eq!(
        assistant.tool_calls.as_deref(),
        Some(&[weather_call("call_abc", r#"{"city": "Paris"}"#)][..])
    );

    let tool = &followup.messages[5];
    assert_eq!(tool.role, Role::Tool);
    assert_eq!(tool.tool_call_id.as_deref(), Some("call_abc"));
    assert_eq!(
        tool_message_json(followup),
        serde_json::json!({
            "city": "Paris",
            "temp_f": 60,
            "condition": "cloudy",
            "precip_prob": 10,
            "when": "today"
        })
    );
}

#[tokio::test]
async fn test_final_text_comes_from_followup_only() {
    let (orchestrator, _, _) = setup(
        vec![
            tool_response(
                "Let me check that for you.",
                vec![weather_call("call_1", r#"{"city": "Rome"}"#)],
            ),
            text_response("Rome is 60°F and cloudy."),
        ],
        RecordingProvider::new(),
    );

    let answer = orchestrator
        .run("Weather in Rome", &defaults())
        .await
        .unwrap();

    assert_eq!(answer, "Rome is 60°F and cloudy.");
}

#[tokio::test]
async fn test_empty_followup_uses_formatting_fallback() {
    let (orchestrator, client, _) = setup(
        vec![
            tool_response("", vec![weather_call("call_1", r#"{"city": "Rome"}"#)]),
            text_response(""),
        ],
        RecordingProvider::new(),
    );

    let answer = orchestrator
        .run("Weather in Rome", &defaults())
        .await
        .unwrap();

    assert_eq!(answer, FORMATTING_FALLBACK);
    assert_eq!(client.requests().len(), 2);
}

#[tokio::test]
async fn test_followup_without_content_uses_formatting_fallback() {
    let (orchestrator, client, provider) = setup(
        vec![
            tool_response("", vec![weather_call("call_1", r#"{"city": "Oslo"}"#)]),
            empty_response(),
        ],
        RecordingProvider::new(),
    );

    let answer = orchestrator
        .run("weather in Oslo", &defaults())
        .await
        .unwrap();

    assert_eq!(answer, FORMATTING_FALLBACK);
    assert_eq!(provider.calls(), vec![("Oslo".to_string(), None)]);
    assert_eq!(client.requests().len(), 2);
}

#[tokio::test]
async fn test_first_completion_without_content_uses_answer_fallback() {
    let (orchestrator, client, provider) =
        setup(vec![empty_response()], RecordingProvider::new());

    let answer = orchestrator
        .run("weather in Oslo", &defaults())
        .await
        .unwrap();

    assert_eq!(answer, ANSWER_FALLBACK);
    assert!(provider.calls().is_empty());
    assert_eq!(client.requests().len(), 1);
}

#[tokio::test]
async fn test_custom_conversation_reaches_the_model() {
    let (orchestrator, client, _) = setup(vec![text_response("Cloudy.")], RecordingProvider::new());
    let orchestrator = orchestrator.with_conversation(
        ConversationBuilder::new()
            .with_system_prompt("Answer in one word.")
            .with_example("Weather in Oslo?", "Rainy."),
    );

    orchestrator
        .run("weather in Lima", &defaults())
        .await
        .unwrap();

    assert_eq!(orchestrator.conversation().system_prompt(), "Answer in one word.");
    let first = &client.requests()[0];
    assert_eq!(first.messages[0].text_content(), "Answer in one word.");
    assert_eq!(first.messages[2].text_content(), "Rainy.");
    assert_eq!(first.messages[3].text_content(), "weather in Lima");
}

#[tokio::test]
async fn test_unknown_tool_gets_error_payload() {
    let (orchestrator, client, provider) = setup(
        vec![
            tool_response("", vec![ToolCall::new("call_x", "get_time", "{}")]),
            text_response("I can only help with the weather."),
        ],
        RecordingProvider::new(),
    );

    let answer = orchestrator
        .run("What time is it in Tokyo", &defaults())
        .await
        .unwrap();

    assert_eq!(answer, "I can only help with the weather.");
    assert!(provider.calls().is_empty());

    let requests = client.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].messages[5].tool_call_id.as_deref(), Some("call_x"));
    assert_eq!(
        tool_message_json(&requests[1]),
        serde_json::json!({"error": "Unknown tool get_time"})
    );
}

#[tokio::test]
async fn test_malformed_arguments_use_resolved_city() {
    let (orchestrator, _, provider) = setup(
        vec![
            tool_response("", vec![weather_call("call_1", "{city: Bost")]),
            text_response("Boston is cloudy."),
        ],
        RecordingProvider::new(),
    );

    let answer = orchestrator
        .run("What's the weather in Boston", &defaults())
        .await
        .unwrap();

    assert_eq!(answer, "Boston is cloudy.");
    assert_eq!(provider.calls(), vec![("Boston".to_string(), None)]);
}

#[tokio::test]
async fn test_only_first_tool_call_is_processed() {
    let (orchestrator, client, provider) = setup(
        vec![
            tool_response(
                "",
                vec![
                    weather_call("call_1", r#"{"city": "Oslo"}"#),
                    weather_call("call_2", r#"{"city": "Bergen"}"#),
                ],
            ),
            text_response("Oslo is cloudy."),
        ],
        RecordingProvider::new(),
    );

    orchestrator
        .run("Weather in Oslo", &defaults())
        .await
        .unwrap();

    assert_eq!(provider.calls(), vec![("Oslo".to_string(), None)]);

    let followup = &client.requests()[1];
    let calls = followup.messages[4].tool_calls.as_ref().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].id(), "call_1");
    assert_eq!(
        followup
            .messages
            .iter()
            .filter(|m| m.role == Role::Tool)
            .count(),
        1
    );
}

#[tokio::test]
async fn test_default_coordinates_are_merged() {
    let home = Coordinates::new(44.98, -93.27);
    let (orchestrator, _, provider) = setup(
        vec![
            tool_response("", vec![weather_call("call_1", "{}")]),
            text_response("Minneapolis is cloudy."),
        ],
        RecordingProvider::new(),
    );

    orchestrator
        .run("What's the weather today?", &TurnDefaults::new(DEFAULT_CITY, Some(home)))
        .await
        .unwrap();

    assert_eq!(
        provider.calls(),
        vec![(DEFAULT_CITY.to_string(), Some(home))]
    );
}

#[tokio::test]
async fn test_default_city_is_appended_to_user_turn() {
    let (orchestrator, client, _) = setup(vec![text_response("Cloudy.")], RecordingProvider::new());

    orchestrator
        .run("What's the weather today?", &defaults())
        .await
        .unwrap();

    let first = &client.requests()[0];
    assert_eq!(
        first.messages[3].text_content(),
        "What's the weather today in Minneapolis, MN"
    );
}

#[tokio::test]
async fn test_explicit_location_is_sent_unchanged() {
    let (orchestrator, client, _) = setup(vec![text_response("Cloudy.")], RecordingProvider::new());

    orchestrator
        .run("What's the weather in Denver?", &defaults())
        .await
        .unwrap();

    let first = &client.requests()[0];
    assert_eq!(first.messages[3].text_content(), "What's the weather in Denver?");
}

#[tokio::test]
async fn test_identical_turns_produce_identical_answers() {
    let script = || {
        vec![
            tool_response("", vec![weather_call("call_1", r#"{"city": "Lima"}"#)]),
            text_response("Lima: 60°F and cloudy."),
        ]
    };
    let (first, _, _) = setup(script(), RecordingProvider::new());
    let (second, _, _) = setup(script(), RecordingProvider::new());

    let a = first.run("Weather in Lima", &defaults()).await.unwrap();
    let b = second.run("Weather in Lima", &defaults()).await.unwrap();

    assert_eq!(a, b);
}

#[tokio::test]
async fn test_completion_failure_propagates() {
    let (orchestrator, _, provider) = setup(
        vec![Err(LlmError::authentication("Invalid API key"))],
        RecordingProvider::new(),
    );

    let result = orchestrator.run("Weather in Lima", &defaults()).await;

    assert!(matches!(
        result,
        Err(AgentError::Completion(LlmError::Authentication { .. }))
    ));
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_weather_failure_ends_turn_before_followup() {
    let (orchestrator, client, _) = setup(
        vec![
            tool_response("", vec![weather_call("call_1", r#"{"city": "Lima"}"#)]),
            text_response("never sent"),
        ],
        RecordingProvider::failing(),
    );

    let result = orchestrator.run("Weather in Lima", &defaults()).await;

    assert!(matches!(result, Err(AgentError::Weather(_))));
    assert_eq!(client.requests().len(), 1);
}
