use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::{
    client::LlmClient,
    error::LlmError,
    openai::{
        tools::OpenAIToolFormat,
        types::{
            OpenAIChatCompletionRequest, OpenAIChatCompletionResponse, OpenAIErrorResponse,
            OpenAIMessage, OpenAIRole, OpenAIToolCall,
        },
    },
    tools::{ProviderToolFormat, ToolCall},
    types::{CompletionRequest, CompletionResponse, ContentBlock, Message, Role, Usage},
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// OpenAI Chat Completions client
pub struct OpenAIClient {
    api_key: String,
    base_url: String,
    model: String,
    http_client: reqwest::Client,
}

impl OpenAIClient {
    /// Create a new OpenAI client with the given API key
    pub fn new(api_key: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(LlmError::authentication("API key cannot be empty"));
        }

        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::Network { source: e })?;

        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: crate::models::openai::DEFAULT_MODEL_ID.to_string(),
            http_client,
        })
    }

    /// Set a custom base URL for the API
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the model reported by [`LlmClient::model_name`]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Create a chat completion using the OpenAI Chat Completions API
    pub async fn create_chat_completion(
        &self,
        request: OpenAIChatCompletionRequest,
    ) -> Result<OpenAIChatCompletionResponse, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|_| LlmError::authentication("Invalid API key format"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.as_ref().map_or(0, Vec::len),
            "Sending chat completion request"
        );

        let response = self
            .http_client
            .post(&url)
            .headers(headers)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Network { source: e })?;

        let status = response.status();

        if status.is_success() {
            let openai_response: OpenAIChatCompletionResponse = response
                .json()
                .await
                .map_err(|e| LlmError::internal(format!("Failed to parse response: {}", e)))?;
            return Ok(openai_response);
        }

        // Read retry-after before the body consumes the response
        let retry_after = if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
        } else {
            None
        };

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        Err(error_from_status(status, &error_text, retry_after))
    }
}

/// Map a non-success HTTP status and body to an [`LlmError`]
fn error_from_status(
    status: reqwest::StatusCode,
    body: &str,
    retry_after: Option<u64>,
) -> LlmError {
    let message = serde_json::from_str::<OpenAIErrorResponse>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| body.to_string());

    match status {
        reqwest::StatusCode::BAD_REQUEST => LlmError::invalid_request(message),
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
            LlmError::authentication(message)
        }
        reqwest::StatusCode::PAYLOAD_TOO_LARGE => LlmError::invalid_request("Request too large"),
        reqwest::StatusCode::TOO_MANY_REQUESTS => LlmError::rate_limit(message, retry_after),
        _ => LlmError::api_error(status.as_u16(), message),
    }
}

impl OpenAIChatCompletionResponse {
    /// Text of the first choice, empty when the model returned none
    pub fn content(&self) -> &str {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .unwrap_or_default()
    }

    /// Extract tool calls from the first choice
    pub fn tool_calls(&self) -> Option<Vec<ToolCall>> {
        self.choices
            .first()?
            .message
            .tool_calls
            .as_ref()
            .map(|calls| calls.iter().map(ToolCall::from).collect())
    }
}

fn to_openai_message(message: Message) -> OpenAIMessage {
    let role = match message.role {
        Role::System => OpenAIRole::System,
        Role::User => OpenAIRole::User,
        Role::Assistant => OpenAIRole::Assistant,
        Role::Tool => OpenAIRole::Tool,
    };

    let text = message.text_content();
    let tool_calls = message
        .tool_calls
        .map(|calls| calls.iter().map(OpenAIToolCall::from).collect::<Vec<_>>());

    // Assistant turns that only call tools carry a null content
    let content = if text.is_empty() && tool_calls.is_some() {
        None
    } else {
        Some(text)
    };

    OpenAIMessage {
        role,
        content,
        tool_calls,
        tool_call_id: message.tool_call_id,
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    /// Maps the generic request onto `/v1/chat/completions`.
    ///
    /// An optional `system` string is sent as a leading system message.
    /// Declared tools are sent in OpenAI function format; the response's
    /// first choice is mapped back, including any tool calls it requests.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = request.system {
            messages.push(OpenAIMessage::system(system));
        }
        messages.extend(request.messages.into_iter().map(to_openai_message));

        let tools = request.tools.map(|tools| {
            tools
                .iter()
                .map(OpenAIToolFormat::to_provider_tool)
                .collect::<Vec<_>>()
        });
        let tool_choice = request
            .tool_choice
            .as_ref()
            .map(OpenAIToolFormat::to_provider_tool_choice);

        let openai_request = OpenAIChatCompletionRequest {
            model: request.model,
            messages,
            max_completion_tokens: Some(request.max_tokens),
            temperature: request.temperature,
            top_p: request.top_p,
            stop: request.stop_sequences,
            tools,
            tool_choice,
            parallel_tool_calls: None,
        };

        let openai_response = self.create_chat_completion(openai_request).await?;

        // No choices reads as an empty reply; callers decide what empty text means
        if openai_response.choices.is_empty() {
            tracing::warn!(id = %openai_response.id, "Chat completion returned no choices");
        }

        let text = openai_response.content().to_string();
        let usage = openai_response.usage.clone().unwrap_or_default();
        let stop_reason = openai_response
            .choices
            .first()
            .and_then(|choice| choice.finish_reason.clone());

        Ok(CompletionResponse {
            content: vec![ContentBlock::Text { text }],
            role: Role::Assistant,
            usage: Usage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            },
            stop_reason,
            tool_calls: openai_response.tool_calls().filter(|calls| !calls.is_empty()),
        })
    }

    fn provider_name(&self) -> &str {
        crate::providers::OPENAI
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
