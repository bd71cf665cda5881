//! `OpenAiCompatibleProvider` against a mock chat-completions endpoint.

use std::time::Duration;

use llm::{ApiHost, BackendConfig, Credential, OpenAiCompatibleProvider};
use pipeline::{ChatMessage, CompletionRequest, LlmError, LlmProvider, ModelId};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COMPLETIONS: &str = "/v1/chat/completions";

fn provider(server: &MockServer, credential: Credential) -> OpenAiCompatibleProvider {
    OpenAiCompatibleProvider::new(&BackendConfig {
        host: ApiHost::OpenAi,
        base_url: format!("{}/v1", server.uri()),
        model: ModelId::new("gpt-4o").unwrap(),
        credential,
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

fn hello() -> CompletionRequest {
    CompletionRequest::new(vec![ChatMessage::user("hello")])
}

#[tokio::test]
async fn completion_is_parsed_and_credentials_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "hi there" }, "finish_reason": "stop" }],
            "usage": { "prompt_tokens": 7, "completion_tokens": 3 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let completion = provider(&server, Credential::Bearer("sk-test".into()))
        .complete(hello())
        .await
        .unwrap();

    assert_eq!(completion.content.as_deref(), Some("hi there"));
    assert_eq!(completion.usage.total().as_u64(), 10);

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = requests[0].body_json().unwrap();
    assert_eq!(body["model"], "gpt-4o");
    assert_eq!(body["messages"][0]["content"], "hello");
}

#[tokio::test]
async fn azure_keys_travel_in_the_api_key_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS))
        .and(header("api-key", "azure-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "content": "ok" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    provider(&server, Credential::ApiKeyHeader("azure-key".into()))
        .complete(hello())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn error_statuses_carry_the_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": { "message": "Bad credentials", "code": "unauthorized" }
        })))
        .mount(&server)
        .await;

    let err = provider(&server, Credential::None)
        .complete(hello())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        LlmError::Http {
            status: 401,
            message: "Bad credentials [code=unauthorized]".into(),
        }
    );
}

#[tokio::test]
async fn streamed_fragments_reach_the_callback_in_order() {
    let chunk = |text: &str| {
        serde_json::json!({ "choices": [{ "delta": { "content": text } }] }).to_string()
    };
    let body = format!(
        "data: {}\n\ndata: {}\n\ndata: [DONE]\n\n",
        chunk("Hel"),
        chunk("lo")
    );
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let mut fragments = Vec::new();
    let completion = provider(&server, Credential::None)
        .complete_streaming(hello(), &mut |d: &str| fragments.push(d.to_string()))
        .await
        .unwrap();

    assert_eq!(fragments, ["Hel", "lo"]);
    assert_eq!(completion.content.as_deref(), Some("Hello"));

    let requests = server.received_requests().await.unwrap();
    let sent: serde_json::Value = requests[0].body_json().unwrap();
    assert_eq!(sent["stream"], true);
}
