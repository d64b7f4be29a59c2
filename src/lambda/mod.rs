// src/lambda/mod.rs

//! Serverless handler.
//!
//! One function serves both triggers:
//! 1. An HTTP event (webhook from Telegram) carries the update in `body`
//! 2. Any other event (the schedule) runs the listing check
//!
//! Both answer `200 OK!` as plain text; failures are returned as handler
//! errors so the runtime reports them.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use lambda_runtime::{Error as LambdaError, LambdaEvent};
use serde_json::{Value, json};
use tracing::{info, instrument};

use crate::config::S3ConfigLoader;
use crate::context::AppContext;
use crate::error::{AppError, Result};
use crate::models::Update;
use crate::storage::s3::S3Storage;

/// What an incoming event asks for.
#[derive(Debug)]
pub enum Trigger {
    Webhook(Update),
    Schedule,
}

/// Main Lambda handler function.
#[instrument(skip(event))]
pub async fn handler(event: LambdaEvent<Value>) -> std::result::Result<Value, LambdaError> {
    let trigger = classify(&event.payload)?;

    let storage = S3Storage::from_env().await?;
    let config = S3ConfigLoader::from_env(storage.clone()).load_config().await?;
    let context = AppContext::new(config, storage)?;

    match trigger {
        Trigger::Webhook(update) => {
            let outcome = context.handle_update(&update).await?;
            info!("Webhook handled: {:?}", outcome);
        }
        Trigger::Schedule => {
            let today = chrono::Local::now().date_naive();
            let summary = context.run_scheduled(today).await?;
            info!("Scheduled run finished: {:?}", summary);
        }
    }

    Ok(ok_response())
}

/// Decide which entry point an event belongs to.
pub fn classify(payload: &Value) -> Result<Trigger> {
    if payload.get("message").is_some() || payload.get("my_chat_member").is_some() {
        let update = serde_json::from_value(payload.clone()).map_err(AppError::webhook)?;
        return Ok(Trigger::Webhook(update));
    }

    match payload.get("body").and_then(Value::as_str) {
        Some(body) => {
            let body = decode_body(body, payload.get("isBase64Encoded"))?;
            let update = Update::from_json(&body).map_err(AppError::webhook)?;
            Ok(Trigger::Webhook(update))
        }
        None => Ok(Trigger::Schedule),
    }
}

fn decode_body(body: &str, base64_flag: Option<&Value>) -> Result<String> {
    if !base64_flag.and_then(Value::as_bool).unwrap_or(false) {
        return Ok(body.to_string());
    }
    let bytes = STANDARD.decode(body).map_err(AppError::webhook)?;
    String::from_utf8(bytes).map_err(AppError::webhook)
}

/// Plain-text success response.
pub fn ok_response() -> Value {
    json!({
        "statusCode": 200,
        "headers": { "Content-Type": "text/plain" },
        "isBase64Encoded": false,
        "body": "OK!"
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_event() {
        let event = json!({
            "source": "aws.events",
            "detail-type": "Scheduled Event",
            "detail": {}
        });
        assert!(matches!(classify(&event).unwrap(), Trigger::Schedule));
    }

    #[test]
    fn test_http_event() {
        let body = json!({
            "message": {"chat": {"id": -1001}, "from": {"id": 42}, "text": "/settings Мира"}
        })
        .to_string();
        let event = json!({"body": body, "isBase64Encoded": false});

        match classify(&event).unwrap() {
            Trigger::Webhook(update) => {
                assert_eq!(update.message.unwrap().text.as_deref(), Some("/settings Мира"))
            }
            Trigger::Schedule => panic!("expected webhook"),
        }
    }

    #[test]
    fn test_base64_http_event() {
        let body = r#"{"my_chat_member": {"chat": {"id": 1}, "from": {"id": 2}, "new_chat_member": {"status": "left"}}}"#;
        let event = json!({"body": STANDARD.encode(body), "isBase64Encoded": true});

        match classify(&event).unwrap() {
            Trigger::Webhook(update) => assert!(update.my_chat_member.is_some()),
            Trigger::Schedule => panic!("expected webhook"),
        }
    }

    #[test]
    fn test_direct_update_event() {
        let event = json!({"update_id": 5, "message": {"chat": {"id": 1}, "text": "hi"}});
        assert!(matches!(classify(&event).unwrap(), Trigger::Webhook(_)));
    }

    #[test]
    fn test_malformed_body_is_error() {
        let event = json!({"body": "not json"});
        assert!(matches!(classify(&event), Err(AppError::Webhook(_))));
    }

    #[test]
    fn test_ok_response() {
        let response = ok_response();
        assert_eq!(response["statusCode"], 200);
        assert_eq!(response["headers"]["Content-Type"], "text/plain");
        assert_eq!(response["body"], "OK!");
    }
}
