use skycaster_llm_sdk::types::Message;

pub const SYSTEM_PROMPT: &str = r#"You are "Skycaster", a concise, friendly weather forecaster.
Speak like a smart assistant (Siri-like): short, natural, specific.
Always include: location, temperature (with unit), sky condition, and precip chance if available.
Prefer one sentence; two max. No markdown, no emojis."#;

/// Example question shown to the model before the live one
pub const ONE_SHOT_USER: &str = "What's the weather in Denver today?";

/// Example answer that sets the response style and fields
pub const ONE_SHOT_ASSISTANT: &str =
    "In Denver today: 60°F, mostly cloudy, with a 10% chance of showers.";

/// Builds the opening conversation for a single weather question.
///
/// The sequence is always system prompt, example question, example answer
/// and then the live user turn.
#[derive(Debug, Clone)]
pub struct ConversationBuilder {
    system_prompt: String,
    example_user: String,
    example_assistant: String,
}

impl Default for ConversationBuilder {
    fn default() -> Self {
        Self {
            system_prompt: SYSTEM_PROMPT.to_string(),
            example_user: ONE_SHOT_USER.to_string(),
            example_assistant: ONE_SHOT_ASSISTANT.to_string(),
        }
    }
}

impl ConversationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_example(
        mut self,
        user: impl Into<String>,
        assistant: impl Into<String>,
    ) -> Self {
        self.example_user = user.into();
        self.example_assistant = assistant.into();
        self
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn build(&self, user_text: &str) -> Vec<Message> {
        vec![
            Message::system(self.system_prompt.as_str()),
            Message::user(self.example_user.as_str()),
            Message::assistant(self.example_assistant.as_str()),
            Message::user(user_text),
        ]
    }
}
