//! # Skycaster LLM SDK
//!
//! Provider-agnostic chat-completion types, tool declarations and an OpenAI
//! Chat Completions client.
//!
//! ## Example
//!
//! ```rust,no_run
//! use skycaster_llm_sdk::client::LlmClient;
//! use skycaster_llm_sdk::openai::OpenAIClient;
//! use skycaster_llm_sdk::types::{CompletionRequest, Message};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OpenAIClient::new("your-api-key")?;
//!     let response = client
//!         .complete(CompletionRequest {
//!             messages: vec![Message::user("Hello!")],
//!             max_tokens: 256,
//!             model: "gpt-4o-mini".to_string(),
//!             system: None,
//!             temperature: None,
//!             top_p: None,
//!             stop_sequences: None,
//!             tools: None,
//!             tool_choice: None,
//!         })
//!         .await?;
//!
//!     println!("Response: {:?}", response.content);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod models;
pub mod openai;
pub mod providers;
pub mod tools;
pub mod types;
