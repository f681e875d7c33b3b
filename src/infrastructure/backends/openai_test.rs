use anyhow::Result;
use mockito::Matcher;
use serde_json::json;

use super::CompletionChoiceResponse;
use super::CompletionMessageResponse;
use super::CompletionResponse;
use super::OpenAI;
use crate::domain::models::Backend;
use crate::domain::models::BackendMessage;
use crate::domain::models::BackendPrompt;
use crate::domain::models::ResponseSchema;

impl OpenAI {
    fn with_url(url: String) -> OpenAI {
        return OpenAI {
            url,
            token: "abc".to_string(),
            model: "model-1".to_string(),
            timeout: "200".to_string(),
        };
    }
}

fn prompt(schema: ResponseSchema) -> BackendPrompt {
    return BackendPrompt {
        system: "You are a reviewer.".to_string(),
        messages: vec![BackendMessage {
            role: "user".to_string(),
            content: r#"{"type":"file_submission","files":[]}"#.to_string(),
        }],
        schema,
        round_index: 1,
    };
}

fn completion(content: &str) -> Result<String> {
    let body = serde_json::to_string(&CompletionResponse {
        choices: vec![CompletionChoiceResponse {
            message: CompletionMessageResponse {
                content: Some(content.to_string()),
                refusal: None,
            },
        }],
    })?;

    return Ok(body);
}

#[tokio::test]
async fn it_successfully_health_checks() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("GET", "/").with_status(200).create_async().await;

    let backend = OpenAI::with_url(server.url());
    let res = backend.health_check().await;

    assert!(res.is_ok());
    mock.assert_async().await;
}

#[tokio::test]
async fn it_successfully_health_checks_418() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("GET", "/").with_status(418).create_async().await;

    let backend = OpenAI::with_url(server.url());
    let res = backend.health_check().await;

    assert!(res.is_ok());
    mock.assert_async().await;
}

#[tokio::test]
async fn it_fails_health_checks() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("GET", "/").with_status(500).create_async().await;

    let backend = OpenAI::with_url(server.url());
    let res = backend.health_check().await;

    assert!(res.is_err());
    mock.assert_async().await;
}

#[tokio::test]
async fn it_fails_health_checks_without_a_token() {
    let mut backend = OpenAI::with_url("http://localhost".to_string());
    backend.token = "".to_string();

    let res = backend.health_check().await;
    assert_eq!(res.unwrap_err().to_string(), "OpenAI token is not defined");
}

#[tokio::test]
async fn it_generates_a_structured_object() -> Result<()> {
    let content = json!({
        "evaluation_question": "What does add return?",
        "options": ["A sum", "A string", "Nothing", "An error"],
        "feedback_on_prev_answer": ""
    });

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("Authorization", "Bearer abc")
        .match_body(Matcher::PartialJson(json!({
            "model": "model-1",
            "stream": false,
            "messages": [
                { "role": "system", "content": "You are a reviewer." },
                { "role": "user", "content": r#"{"type":"file_submission","files":[]}"# }
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "evaluation_question",
                    "strict": true
                }
            }
        })))
        .with_status(200)
        .with_body(completion(&content.to_string())?)
        .create_async()
        .await;

    let backend = OpenAI::with_url(server.url());
    let res = backend.generate(&prompt(ResponseSchema::Question)).await?;
    mock.assert_async().await;

    assert_eq!(res, content);
    return Ok(());
}

#[tokio::test]
async fn it_sends_the_result_schema() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::PartialJson(json!({
            "response_format": {
                "json_schema": {
                    "name": "evaluation_result",
                    "schema": ResponseSchema::Result.json_schema()
                }
            }
        })))
        .with_status(200)
        .with_body(completion(r#"{"final_score": 72}"#)?)
        .create_async()
        .await;

    let backend = OpenAI::with_url(server.url());
    let res = backend.generate(&prompt(ResponseSchema::Result)).await?;
    mock.assert_async().await;

    assert_eq!(res, json!({ "final_score": 72 }));
    return Ok(());
}

#[tokio::test]
async fn it_strips_markdown_fences() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(completion("```json\n{\"final_score\": 72}\n```")?)
        .create_async()
        .await;

    let backend = OpenAI::with_url(server.url());
    let res = backend.generate(&prompt(ResponseSchema::Result)).await?;
    mock.assert_async().await;

    assert_eq!(res, json!({ "final_score": 72 }));
    return Ok(());
}

#[tokio::test]
async fn it_fails_on_error_status() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(429)
        .create_async()
        .await;

    let backend = OpenAI::with_url(server.url());
    let res = backend.generate(&prompt(ResponseSchema::Question)).await;
    mock.assert_async().await;

    assert_eq!(
        res.unwrap_err().to_string(),
        "Failed to make completion request to OpenAI, status 429"
    );
}

#[tokio::test]
async fn it_fails_on_refusal() -> Result<()> {
    let body = serde_json::to_string(&CompletionResponse {
        choices: vec![CompletionChoiceResponse {
            message: CompletionMessageResponse {
                content: None,
                refusal: Some("I can't help with that".to_string()),
            },
        }],
    })?;

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let backend = OpenAI::with_url(server.url());
    let res = backend.generate(&prompt(ResponseSchema::Question)).await;
    mock.assert_async().await;

    assert_eq!(
        res.unwrap_err().to_string(),
        "OpenAI refused the request: I can't help with that"
    );
    return Ok(());
}

#[tokio::test]
async fn it_fails_without_choices() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices": []}"#)
        .create_async()
        .await;

    let backend = OpenAI::with_url(server.url());
    let res = backend.generate(&prompt(ResponseSchema::Question)).await;
    mock.assert_async().await;

    assert_eq!(res.unwrap_err().to_string(), "OpenAI returned no choices");
}

#[tokio::test]
async fn it_fails_on_non_json_content() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(completion("Here is your question!")?)
        .create_async()
        .await;

    let backend = OpenAI::with_url(server.url());
    let res = backend.generate(&prompt(ResponseSchema::Question)).await;
    mock.assert_async().await;

    assert!(res.is_err());
    return Ok(());
}
