use std::sync::Arc;
use std::sync::Mutex;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use serde_json::Value;

use super::GenerationGateway;
use crate::domain::models::Backend;
use crate::domain::models::BackendName;
use crate::domain::models::BackendPrompt;
use crate::domain::models::FileEntry;
use crate::domain::models::GenerationResponse;
use crate::domain::models::Message;
use crate::domain::models::QuizError;
use crate::domain::models::QuizSettings;
use crate::domain::models::ResponseSchema;

struct FixedBackend {
    response: Option<Value>,
    prompts: Arc<Mutex<Vec<(String, ResponseSchema, usize, usize)>>>,
}

#[async_trait]
impl Backend for FixedBackend {
    fn name(&self) -> BackendName {
        return BackendName::OpenAI;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn generate(&self, prompt: &BackendPrompt) -> Result<Value> {
        self.prompts.lock().unwrap().push((
            prompt.system.to_string(),
            prompt.schema,
            prompt.round_index,
            prompt.messages.len(),
        ));

        if let Some(response) = &self.response {
            return Ok(response.clone());
        }

        bail!("connection refused");
    }
}

fn messages() -> Vec<Message> {
    return vec![Message::file_submission(vec![FileEntry::new(
        "src/index.js",
        "console.log(1)",
    )])];
}

#[tokio::test]
async fn it_generates_questions() -> Result<()> {
    let prompts = Arc::new(Mutex::new(vec![]));
    let backend = FixedBackend {
        response: Some(json!({
            "evaluation_question": "What is logged?",
            "options": ["1", "2", "3", "undefined"],
            "feedback_on_prev_answer": ""
        })),
        prompts: prompts.clone(),
    };

    let gateway = GenerationGateway::new(Box::new(backend), &QuizSettings::default());
    let res = gateway
        .generate(&messages(), ResponseSchema::Question, 1)
        .await?;

    assert!(matches!(res, GenerationResponse::Question(ref q) if q.options[3] == "undefined"));

    let prompts = prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].0.contains("exactly 10 multiple choice questions"));
    assert_eq!(prompts[0].1, ResponseSchema::Question);
    assert_eq!(prompts[0].2, 1);
    assert_eq!(prompts[0].3, 1);

    return Ok(());
}

#[tokio::test]
async fn it_wraps_transport_errors() {
    let backend = FixedBackend {
        response: None,
        prompts: Arc::new(Mutex::new(vec![])),
    };

    let gateway = GenerationGateway::new(Box::new(backend), &QuizSettings::default());
    let res = gateway
        .generate(&messages(), ResponseSchema::Question, 1)
        .await;

    assert_eq!(
        res,
        Err(QuizError::Generation {
            cause: "connection refused".to_string()
        })
    );
}

#[tokio::test]
async fn it_rejects_wrong_schema() {
    let backend = FixedBackend {
        response: Some(json!({
            "evaluation_question": "What is logged?",
            "options": ["1", "2", "3", "undefined"],
            "feedback_on_prev_answer": "Correct"
        })),
        prompts: Arc::new(Mutex::new(vec![])),
    };

    let gateway = GenerationGateway::new(Box::new(backend), &QuizSettings::default());
    let res = gateway
        .generate(&messages(), ResponseSchema::Result, 10)
        .await;

    assert!(matches!(res, Err(QuizError::Generation { .. })));
}
