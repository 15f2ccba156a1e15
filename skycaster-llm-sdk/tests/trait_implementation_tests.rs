use skycaster_llm_sdk::client::LlmClient;
use skycaster_llm_sdk::openai::OpenAIClient;

#[test]
fn test_openai_client_implements_trait() {
    fn assert_implements_trait<T: LlmClient>() {}

    assert_implements_trait::<OpenAIClient>();
}

#[test]
fn test_trait_object_usage() {
    let _client: Box<dyn LlmClient> = Box::new(OpenAIClient::new("test-key").unwrap());
}

#[test]
fn test_provider_and_model_names() {
    let openai_client = OpenAIClient::new("test-key").unwrap();
    assert_eq!(openai_client.provider_name(), "openai");
    assert_eq!(openai_client.model_name(), "gpt-4o-mini");

    let openai_client = openai_client.with_model("gpt-4o");
    assert_eq!(openai_client.model_name(), "gpt-4o");
}
