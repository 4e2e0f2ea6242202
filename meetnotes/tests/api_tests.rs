mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;
use tower::ServiceExt;

use common::{
    app, body_json, dir_is_empty, json_request, multipart_request, test_config, FakeMailer,
    FakeSummarizer, Part,
};
use meetnotes::llm::prompts::{DEFAULT_INSTRUCTION, SYSTEM_PROMPT};

#[tokio::test]
async fn test_health_reports_service_and_time() {
    let app = app(
        test_config(),
        FakeSummarizer::replying("unused"),
        FakeMailer::accepting(),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["service"], json!("meetnotes"));

    let time = body["time"].as_str().unwrap();
    assert!(time.ends_with('Z'));
    assert!(chrono::DateTime::parse_from_rfc3339(time).is_ok());
}

#[tokio::test]
async fn test_summarize_inline_json() {
    let summarizer = FakeSummarizer::replying("## Executive Summary\n- Ship v2 next week\n");
    let app = app(test_config(), summarizer.clone(), FakeMailer::accepting());

    let response = app
        .oneshot(json_request(
            "/api/summarize",
            json!({"transcript": "Alice: let's ship v2 next week. Bob: agreed."}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body,
        json!({"summary": "## Executive Summary\n- Ship v2 next week"})
    );

    assert_eq!(summarizer.call_count(), 1);
    let calls = summarizer.calls.lock().unwrap();
    assert_eq!(calls[0].0, SYSTEM_PROMPT);
    assert!(calls[0].1.contains("Alice: let's ship v2 next week."));
}

#[tokio::test]
async fn test_summarize_uses_default_instruction() {
    let summarizer = FakeSummarizer::replying("- Ship v2 next week");
    let app = app(test_config(), summarizer.clone(), FakeMailer::accepting());

    let response = app
        .oneshot(json_request(
            "/api/summarize",
            json!({"transcript": "Team decided to ship v2 next week."}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(!body["summary"].as_str().unwrap().is_empty());
    assert!(summarizer.last_content().contains(DEFAULT_INSTRUCTION));
}

#[tokio::test]
async fn test_summarize_urlencoded_form() {
    let summarizer = FakeSummarizer::replying("summary");
    let app = app(test_config(), summarizer.clone(), FakeMailer::accepting());

    let request = Request::builder()
        .method("POST")
        .uri("/api/summarize")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("transcript=standup+notes&prompt=Only+action+items"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content = summarizer.last_content();
    assert!(content.contains("standup notes"));
    assert!(content.contains("User Instruction: Only action items"));
}

#[tokio::test]
async fn test_uploaded_file_wins_over_inline_text() {
    let uploads = tempfile::tempdir().unwrap();
    let mut config = test_config();
    config.upload.dir = Some(uploads.path().to_path_buf());

    let summarizer = FakeSummarizer::replying("summary");
    let app = app(config, summarizer.clone(), FakeMailer::accepting());

    let response = app
        .oneshot(multipart_request(&[
            Part::Text {
                name: "transcript",
                value: "inline text that must be ignored",
            },
            Part::File {
                name: "file",
                file_name: "standup.txt",
                content_type: "text/plain",
                data: b"Carol: the release is blocked on QA.",
            },
            Part::Text {
                name: "prompt",
                value: "Highlight blockers",
            },
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content = summarizer.last_content();
    assert!(content.contains("Carol: the release is blocked on QA."));
    assert!(!content.contains("inline text that must be ignored"));
    assert!(content.contains("User Instruction: Highlight blockers"));
    assert!(dir_is_empty(uploads.path()));
}

#[tokio::test]
async fn test_second_file_replaces_first() {
    let uploads = tempfile::tempdir().unwrap();
    let mut config = test_config();
    config.upload.dir = Some(uploads.path().to_path_buf());

    let summarizer = FakeSummarizer::replying("summary");
    let app = app(config, summarizer.clone(), FakeMailer::accepting());

    let response = app
        .oneshot(multipart_request(&[
            Part::File {
                name: "file",
                file_name: "draft.txt",
                content_type: "text/plain",
                data: b"first draft of the notes",
            },
            Part::File {
                name: "file",
                file_name: "final.txt",
                content_type: "text/plain",
                data: b"second and final notes",
            },
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content = summarizer.last_content();
    assert!(content.contains("second and final notes"));
    assert!(!content.contains("first draft of the notes"));
    assert!(dir_is_empty(uploads.path()));
}

#[tokio::test]
async fn test_non_text_upload_rejected() {
    let uploads = tempfile::tempdir().unwrap();
    let mut config = test_config();
    config.upload.dir = Some(uploads.path().to_path_buf());

    let summarizer = FakeSummarizer::replying("summary");
    let app = app(config, summarizer.clone(), FakeMailer::accepting());

    let response = app
        .oneshot(multipart_request(&[Part::File {
            name: "file",
            file_name: "minutes.pdf",
            content_type: "application/pdf",
            data: b"%PDF-1.7",
        }]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], json!("Only .txt files allowed"));
    assert_eq!(summarizer.call_count(), 0);
    assert!(dir_is_empty(uploads.path()));
}

#[tokio::test]
async fn test_missing_transcript_rejected() {
    let summarizer = FakeSummarizer::replying("summary");
    let app = app(test_config(), summarizer.clone(), FakeMailer::accepting());

    let response = app
        .oneshot(json_request("/api/summarize", json!({"transcript": "   "})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body,
        json!({"error": "Transcript is required (file or text).", "code": 400})
    );
    assert_eq!(summarizer.call_count(), 0);
}

#[tokio::test]
async fn test_empty_body_without_content_type_requires_transcript() {
    let app = app(
        test_config(),
        FakeSummarizer::replying("summary"),
        FakeMailer::accepting(),
    );

    let request = Request::builder()
        .method("POST")
        .uri("/api/summarize")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], json!("Transcript is required (file or text)."));
}

#[tokio::test]
async fn test_oversize_upload_rejected_and_cleaned_up() {
    let uploads = tempfile::tempdir().unwrap();
    let mut config = test_config();
    config.upload.dir = Some(uploads.path().to_path_buf());

    let summarizer = FakeSummarizer::replying("summary");
    let app = app(config, summarizer.clone(), FakeMailer::accepting());

    let big = vec![b'a'; 3 * 1024 * 1024];
    let response = app
        .oneshot(multipart_request(&[Part::File {
            name: "file",
            file_name: "long.txt",
            content_type: "text/plain",
            data: &big,
        }]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(summarizer.call_count(), 0);
    assert!(dir_is_empty(uploads.path()));
}

#[tokio::test]
async fn test_oversize_json_rejected() {
    let mut config = test_config();
    config.upload.json_body_limit = 1024;

    let app = app(
        config,
        FakeSummarizer::replying("summary"),
        FakeMailer::accepting(),
    );

    let response = app
        .oneshot(json_request(
            "/api/summarize",
            json!({"transcript": "x".repeat(4096)}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_provider_failure_is_generic_500() {
    let app = app(
        test_config(),
        FakeSummarizer::failing(),
        FakeMailer::accepting(),
    );

    let response = app
        .oneshot(json_request("/api/summarize", json!({"transcript": "notes"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(
        body,
        json!({"error": "Failed to generate summary.", "code": 500})
    );
}

#[tokio::test]
async fn test_blank_completion_uses_placeholder() {
    let app = app(
        test_config(),
        FakeSummarizer::replying("  \n "),
        FakeMailer::accepting(),
    );

    let response = app
        .oneshot(json_request("/api/summarize", json!({"transcript": "notes"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["summary"], json!("No summary generated."));
}

#[tokio::test]
async fn test_send_email_returns_message_id() {
    let mailer = FakeMailer::accepting();
    let app = app(
        test_config(),
        FakeSummarizer::replying("unused"),
        mailer.clone(),
    );

    let response = app
        .oneshot(json_request(
            "/api/send-email",
            json!({"to": "team@example.com", "summary": "## Decisions\n- Ship v2"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body,
        json!({"ok": true, "messageId": "<msg-1@meetnotes.test>"})
    );

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent[0].0, "team@example.com");
    assert_eq!(sent[0].1, "Meeting Summary");
    assert_eq!(sent[0].2, "## Decisions\n- Ship v2");
}

#[tokio::test]
async fn test_send_email_to_several_recipients() {
    let mailer = FakeMailer::accepting();
    let app = app(
        test_config(),
        FakeSummarizer::replying("unused"),
        mailer.clone(),
    );

    let response = app
        .oneshot(json_request(
            "/api/send-email",
            json!({"to": "a@example.com, b@example.com", "summary": "Final notes"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(mailer.sent_count(), 1);
    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent[0].0, "a@example.com, b@example.com");
}

#[tokio::test]
async fn test_send_email_requires_fields() {
    let mailer = FakeMailer::accepting();
    let app = app(
        test_config(),
        FakeSummarizer::replying("unused"),
        mailer.clone(),
    );

    let response = app
        .oneshot(json_request(
            "/api/send-email",
            json!({"subject": "Weekly sync"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["error"],
        json!("Fields 'to' and 'summary' are required.")
    );
    assert_eq!(mailer.sent_count(), 0);
}

#[tokio::test]
async fn test_send_email_transport_failure() {
    let app = app(
        test_config(),
        FakeSummarizer::replying("unused"),
        FakeMailer::failing(),
    );

    let response = app
        .oneshot(json_request(
            "/api/send-email",
            json!({"to": "team@example.com", "subject": "Sync", "summary": "notes"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body, json!({"error": "Failed to send email.", "code": 500}));
}

#[tokio::test]
async fn test_rate_limit_rejects_31st_request() {
    let summarizer = FakeSummarizer::replying("unused");
    let app = app(
        test_config(),
        summarizer.clone(),
        FakeMailer::accepting(),
    );

    for i in 0..30 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "request {}", i + 1);
    }

    // the limiter is shared across routes
    let response = app
        .oneshot(json_request(
            "/api/summarize",
            json!({"transcript": "notes"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));
    assert_eq!(
        response.headers().get("ratelimit-remaining").unwrap(),
        "0"
    );
    let body = body_json(response).await;
    assert_eq!(
        body["error"],
        json!("Too many requests, please try again later.")
    );
    assert_eq!(summarizer.call_count(), 0);
}

#[tokio::test]
async fn test_successful_response_carries_rate_limit_headers() {
    let app = app(
        test_config(),
        FakeSummarizer::replying("unused"),
        FakeMailer::accepting(),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("ratelimit-limit").unwrap(), "30");
    assert_eq!(headers.get("ratelimit-remaining").unwrap(), "29");
    assert_eq!(headers.get("ratelimit-reset").unwrap(), "60");
}

#[tokio::test]
async fn test_cors_allow_list() {
    let mut config = test_config();
    config.server.cors_origins = vec!["https://notes.example.com".to_string()];
    let app = app(
        config,
        FakeSummarizer::replying("unused"),
        FakeMailer::accepting(),
    );

    let allowed = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header(header::ORIGIN, "https://notes.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        allowed
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "https://notes.example.com"
    );

    let denied = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header(header::ORIGIN, "https://evil.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(denied
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = app(
        test_config(),
        FakeSummarizer::replying("unused"),
        FakeMailer::accepting(),
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/summarize")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = app(
        test_config(),
        FakeSummarizer::replying("unused"),
        FakeMailer::accepting(),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["paths"]["/api/summarize"].is_object());
    assert!(body["paths"]["/api/send-email"].is_object());
}

#[tokio::test]
async fn test_root_serves_client() {
    let app = app(
        test_config(),
        FakeSummarizer::replying("unused"),
        FakeMailer::accepting(),
    );

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8_lossy(&bytes);
    assert!(html.contains("app.js"));
}
