use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Form, Json, Router};
use serde_json::{Value, json};

use notemark_grammar::error::GrammarError;
use notemark_grammar::{GrammarCheck, GrammarConfig, GrammarService, GrammarState};

/// Stand-in for LanguageTool: flags the first word and echoes the language
/// it was asked for in the message.
async fn fake_check(Form(form): Form<HashMap<String, String>>) -> Json<Value> {
    let text = form.get("text").cloned().unwrap_or_default();
    let language = form.get("language").cloned().unwrap_or_default();
    let first_word = text.split_whitespace().next().unwrap_or("").to_string();

    Json(json!({
        "software": { "name": "LanguageTool", "version": "6.6" },
        "language": { "code": language },
        "matches": [{
            "message": format!("checked as {language}"),
            "offset": 0,
            "length": first_word.chars().count(),
            "context": { "text": text, "offset": 0, "length": first_word.chars().count() },
            "replacements": [{ "value": "A" }, { "value": "B" }, { "value": "C" }, { "value": "D" }]
        }]
    }))
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn external_config(addr: SocketAddr) -> GrammarConfig {
    GrammarConfig {
        server_url: Some(format!("http://{addr}")),
        request_timeout: Duration::from_secs(5),
        ..GrammarConfig::default()
    }
}

#[tokio::test]
async fn external_server_is_ready_and_maps_matches() {
    let addr = serve(Router::new().route("/v2/check", post(fake_check))).await;
    let service = GrammarService::start(&external_config(addr)).await;
    assert_eq!(service.state(), GrammarState::Ready);

    let issues = service.check_text("Teh cat sat.", None).await.unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].message, "checked as en-US");
    assert_eq!(issues[0].context, "Teh cat sat.");
    assert_eq!(issues[0].offset, 0);
    assert_eq!(issues[0].length, 3);
    assert_eq!(issues[0].suggestions, ["A", "B", "C", "D"]);
}

#[tokio::test]
async fn explicit_language_is_forwarded() {
    let addr = serve(Router::new().route("/v2/check", post(fake_check))).await;
    let service = GrammarService::start(&external_config(addr)).await;

    let issues = service.check_text("Hallo Welt", Some("de-DE")).await.unwrap();
    assert_eq!(issues[0].message, "checked as de-DE");
}

#[tokio::test]
async fn error_status_is_reported() {
    let router = Router::new().route(
        "/v2/check",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let addr = serve(router).await;
    let service = GrammarService::start(&external_config(addr)).await;

    let err = service.check_text("text", None).await.unwrap_err();
    match err {
        GrammarError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_json_is_a_decode_error() {
    let router = Router::new().route("/v2/check", post(|| async { "not json" }));
    let addr = serve(router).await;
    let service = GrammarService::start(&external_config(addr)).await;

    let err = service.check_text("text", None).await.unwrap_err();
    assert!(matches!(err, GrammarError::Decode(_)));
}

#[tokio::test]
async fn disabled_service_is_degraded() {
    let config = GrammarConfig {
        disabled: true,
        ..GrammarConfig::default()
    };
    let service = GrammarService::start(&config).await;

    assert_eq!(service.state(), GrammarState::Degraded);
    assert!(matches!(
        service.check_text("anything", None).await,
        Err(GrammarError::NotInitialized)
    ));
}

#[tokio::test]
async fn unlaunchable_server_degrades() {
    let config = GrammarConfig {
        java: "/nonexistent/notemark-java".to_string(),
        settle: Duration::from_millis(10),
        ..GrammarConfig::default()
    };
    let service = GrammarService::start(&config).await;

    assert_eq!(service.state(), GrammarState::Degraded);
    assert!(matches!(
        service.check_text("anything", None).await,
        Err(GrammarError::NotInitialized)
    ));
}

#[tokio::test]
async fn server_exiting_during_settle_degrades() {
    // `true` ignores its arguments and exits immediately.
    let config = GrammarConfig {
        java: "true".to_string(),
        settle: Duration::from_millis(300),
        ..GrammarConfig::default()
    };
    let service = GrammarService::start(&config).await;

    assert_eq!(service.state(), GrammarState::Degraded);
}

#[tokio::test]
async fn stop_is_idempotent() {
    let addr = serve(Router::new().route("/v2/check", post(fake_check))).await;
    let service = GrammarService::start(&external_config(addr)).await;

    service.stop().await;
    assert_eq!(service.state(), GrammarState::Stopped);
    service.stop().await;
    assert_eq!(service.state(), GrammarState::Stopped);

    assert!(matches!(
        service.check_text("anything", None).await,
        Err(GrammarError::NotInitialized)
    ));
}
