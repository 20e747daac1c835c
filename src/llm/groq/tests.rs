use super::*;

#[test]
fn missing_api_key_is_an_error() {
    let config = ChatConfig::default();
    assert!(GroqClient::new(&config, None).is_err());
    assert!(GroqClient::new(&config, Some("  ")).is_err());
}

#[test]
fn completions_url_is_joined_to_endpoint() {
    let config = ChatConfig::default();
    let client = GroqClient::new(&config, Some("gsk_test")).expect("client should build");

    assert_eq!(
        client.completions_url.as_str(),
        "https://api.groq.com/openai/v1/chat/completions"
    );
    assert_eq!(client.model, "llama3-70b-8192");
}

#[test]
fn completions_url_keeps_last_path_segment_without_trailing_slash() {
    let config = ChatConfig {
        endpoint: "https://api.groq.com/openai/v1".to_string(),
        ..ChatConfig::default()
    };
    let client = GroqClient::new(&config, Some("gsk_test")).expect("client should build");

    assert_eq!(
        client.completions_url.as_str(),
        "https://api.groq.com/openai/v1/chat/completions"
    );
}

#[test]
fn request_serializes_roles_in_lowercase() {
    let messages = vec![
        ChatMessage::system("be brief"),
        ChatMessage::user("rent in HSR?"),
        ChatMessage::assistant("around 30k"),
    ];
    let request = CompletionRequest {
        model: "llama3-70b-8192",
        messages: &messages,
    };

    let json = serde_json::to_value(&request).expect("should serialize");
    assert_eq!(json["messages"][0]["role"], "system");
    assert_eq!(json["messages"][1]["role"], "user");
    assert_eq!(json["messages"][2]["role"], "assistant");
    assert_eq!(json["messages"][1]["content"], "rent in HSR?");
}

#[test]
fn response_parsing_takes_first_choice() {
    let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Hello"}}]}"#;
    let response: CompletionResponse = serde_json::from_str(body).expect("should parse");
    assert_eq!(
        response.choices[0].message.content.as_deref(),
        Some("Hello")
    );
}

#[test]
fn debug_output_hides_api_key() {
    let client = GroqClient::new(&ChatConfig::default(), Some("gsk_secret")).expect("client should build");
    let rendered = format!("{:?}", client);
    assert!(!rendered.contains("gsk_secret"));
    assert!(rendered.contains("llama3-70b-8192"));
}
