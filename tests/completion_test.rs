use irshad::completion::{ChatCompletionsClient, OllamaClient, PromptQueryClient};
use irshad::{CompletionClient, CompletionError, PromptPayload};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn payload() -> PromptPayload {
    PromptPayload {
        system: "You answer questions about Islam.".to_string(),
        user: "What breaks the fast?".to_string(),
    }
}

#[tokio::test]
async fn test_chat_completions_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(header("x-title", "IrshadAI"))
        .and(body_json(json!({
            "model": "test-model",
            "messages": [
                {"role": "system", "content": "You answer questions about Islam."},
                {"role": "user", "content": "What breaks the fast?"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "  Eating and drinking intentionally.  "}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ChatCompletionsClient::new(format!("{}/api/v1/", server.uri()), "test-key", "test-model");
    let reply = client.send(&payload()).await.unwrap();
    assert_eq!(reply, "Eating and drinking intentionally.");
}

#[tokio::test]
async fn test_chat_completions_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&server)
        .await;

    let client = ChatCompletionsClient::new(server.uri(), "k", "m");
    let err = client.send(&payload()).await.unwrap_err();
    assert_eq!(
        err,
        CompletionError::Http {
            status: 500,
            body: "upstream exploded".to_string()
        }
    );
}

#[tokio::test]
async fn test_chat_completions_without_choices_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let client = ChatCompletionsClient::new(server.uri(), "k", "m");
    let err = client.send(&payload()).await.unwrap_err();
    assert_eq!(err.kind(), "malformed_response");
}

#[tokio::test]
async fn test_chat_completions_non_json_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = ChatCompletionsClient::new(server.uri(), "k", "m");
    let err = client.send(&payload()).await.unwrap_err();
    assert!(matches!(err, CompletionError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_transport_error_when_unreachable() {
    let server = MockServer::builder().start().await;
    let uri = server.uri();
    drop(server);

    let client = ChatCompletionsClient::new(uri, "k", "m");
    let err = client.send(&payload()).await.unwrap_err();
    assert!(matches!(err, CompletionError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn test_ollama_generate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_json(json!({
            "model": "gemma3:12b",
            "prompt": "You answer questions about Islam.\n\nWhat breaks the fast?",
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "gemma3:12b",
            "created_at": "2024-01-01T00:00:00Z",
            "response": "Eating.",
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OllamaClient::new(server.uri(), "gemma3:12b");
    assert_eq!(client.send(&payload()).await.unwrap(), "Eating.");
}

#[tokio::test]
async fn test_ollama_empty_response_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": ""})))
        .mount(&server)
        .await;

    let client = OllamaClient::new(server.uri(), "gemma3:12b");
    let err = client.send(&payload()).await.unwrap_err();
    assert_eq!(err, CompletionError::MalformedResponse("empty reply".to_string()));
}

#[tokio::test]
async fn test_prompt_query_get() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(
            "/text/You%20answer%20questions%20about%20Islam.%0A%0AWhat%20breaks%20the%20fast%3F",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string("Eating and drinking."))
        .expect(1)
        .mount(&server)
        .await;

    let client = PromptQueryClient::new(&format!("{}/text", server.uri())).unwrap();
    assert_eq!(client.send(&payload()).await.unwrap(), "Eating and drinking.");
}

#[tokio::test]
async fn test_prompt_query_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let client = PromptQueryClient::new(&server.uri()).unwrap();
    let err = client.send(&payload()).await.unwrap_err();
    assert!(matches!(err, CompletionError::Http { status: 429, .. }));
}
