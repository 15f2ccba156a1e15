//! Model constants for supported providers

/// OpenAI model constants
pub mod openai {
    /// GPT-4o - Flagship model
    pub const GPT_4O_ID: &str = "gpt-4o";

    /// GPT-4o Mini - Smaller, faster version of GPT-4o; good fit for short tool-using turns
    pub const GPT_4O_MINI_ID: &str = "gpt-4o-mini";

    pub const DEFAULT_MODEL_ID: &str = GPT_4O_MINI_ID;
}
