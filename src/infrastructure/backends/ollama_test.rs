use anyhow::Result;
use mockito::Matcher;
use serde_json::json;

use super::ChatResponse;
use super::Ollama;
use crate::domain::models::Backend;
use crate::domain::models::BackendMessage;
use crate::domain::models::BackendPrompt;
use crate::domain::models::ResponseSchema;

impl Ollama {
    fn with_url(url: String) -> Ollama {
        return Ollama {
            url,
            model: "model-1".to_string(),
            timeout: "200".to_string(),
        };
    }
}

fn prompt() -> BackendPrompt {
    return BackendPrompt {
        system: "You are a reviewer.".to_string(),
        messages: vec![BackendMessage {
            role: "user".to_string(),
            content: r#"{"type":"answer_submission","answer":"No answer","questionNumber":3}"#
                .to_string(),
        }],
        schema: ResponseSchema::Question,
        round_index: 3,
    };
}

fn chat(content: &str, done: bool) -> Result<String> {
    let body = serde_json::to_string(&ChatResponse {
        message: BackendMessage {
            role: "assistant".to_string(),
            content: content.to_string(),
        },
        done,
    })?;

    return Ok(body);
}

#[tokio::test]
async fn it_successfully_health_checks() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("GET", "/").with_status(200).create_async().await;

    let backend = Ollama::with_url(server.url());
    let res = backend.health_check().await;

    assert!(res.is_ok());
    mock.assert_async().await;
}

#[tokio::test]
async fn it_fails_health_checks() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("GET", "/").with_status(500).create_async().await;

    let backend = Ollama::with_url(server.url());
    let res = backend.health_check().await;

    assert!(res.is_err());
    mock.assert_async().await;
}

#[tokio::test]
async fn it_generates_a_structured_object() -> Result<()> {
    let content = json!({
        "evaluation_question": "Which module exports add?",
        "options": ["math.js", "index.js", "util.js", "None"],
        "feedback_on_prev_answer": "No option selected. The correct answer is C."
    });

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/chat")
        .match_body(Matcher::PartialJson(json!({
            "model": "model-1",
            "stream": false,
            "format": ResponseSchema::Question.json_schema(),
            "messages": [
                { "role": "system", "content": "You are a reviewer." },
                { "role": "user" }
            ]
        })))
        .with_status(200)
        .with_body(chat(&content.to_string(), true)?)
        .create_async()
        .await;

    let backend = Ollama::with_url(server.url());
    let res = backend.generate(&prompt()).await?;
    mock.assert_async().await;

    assert_eq!(res, content);
    return Ok(());
}

#[tokio::test]
async fn it_fails_on_error_status() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/chat")
        .with_status(404)
        .with_body(r#"{"error": "model not found"}"#)
        .create_async()
        .await;

    let backend = Ollama::with_url(server.url());
    let res = backend.generate(&prompt()).await;
    mock.assert_async().await;

    assert_eq!(
        res.unwrap_err().to_string(),
        "Failed to make chat request to Ollama, status 404"
    );
}

#[tokio::test]
async fn it_fails_on_incomplete_response() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/chat")
        .with_status(200)
        .with_body(chat(r#"{"evaluation_question": "#, false)?)
        .create_async()
        .await;

    let backend = Ollama::with_url(server.url());
    let res = backend.generate(&prompt()).await;
    mock.assert_async().await;

    assert_eq!(
        res.unwrap_err().to_string(),
        "Ollama returned an incomplete response"
    );
    return Ok(());
}

#[tokio::test]
async fn it_fails_on_non_object_content() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/chat")
        .with_status(200)
        .with_body(chat(r#"["A", "B"]"#, true)?)
        .create_async()
        .await;

    let backend = Ollama::with_url(server.url());
    let res = backend.generate(&prompt()).await;
    mock.assert_async().await;

    assert_eq!(
        res.unwrap_err().to_string(),
        r#"Model output is not a JSON object: ["A", "B"]"#
    );
    return Ok(());
}
