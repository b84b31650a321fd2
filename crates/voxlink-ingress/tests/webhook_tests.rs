// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the webhook ingress, driving the router directly
//! with mock collaborators.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use voxlink_call::CallTracker;
use voxlink_core::event::keys;
use voxlink_core::{CallStatus, EventKind, EventPublisher, LlmTurn};
use voxlink_ingress::{IngressState, router};
use voxlink_relay::MessageHistory;
use voxlink_test_utils::{MockLlm, MockPublisher};

struct Harness {
    app: axum::Router,
    publisher: Arc<MockPublisher>,
    llm: Arc<MockLlm>,
    tracker: Arc<CallTracker>,
    history: Arc<MessageHistory>,
}

fn harness(llm: MockLlm) -> Harness {
    let publisher = Arc::new(MockPublisher::new());
    let llm = Arc::new(llm);
    let tracker = Arc::new(CallTracker::new(
        Arc::clone(&llm) as Arc<dyn LlmTurn + Send + Sync>,
        Arc::clone(&publisher) as Arc<dyn EventPublisher + Send + Sync>,
        Duration::from_millis(250),
    ));
    let history = Arc::new(MessageHistory::new());
    let state = IngressState {
        relay: Arc::clone(&publisher) as Arc<dyn EventPublisher + Send + Sync>,
        tracker: Arc::clone(&tracker),
        history: Arc::clone(&history),
        voice: Some("alice".to_string()),
    };
    Harness {
        app: router(state),
        publisher,
        llm,
        tracker,
        history,
    }
}

fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn speech_input_publishes_invokes_llm_and_answers_with_twiml() {
    let h = harness(MockLlm::with_replies(vec!["Nice to meet you!".into()]));

    let response = h
        .app
        .oneshot(form_request(
            "/process-input",
            "SpeechResult=hello&Digits=&CallSid=CA1",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/xml"
    );

    let xml = body_string(response).await;
    assert!(xml.contains("<Say voice=\"alice\">Nice to meet you!</Say>"));
    assert!(xml.contains("<Gather"));
    assert!(xml.contains("action=\"/process-input\""));

    // Exactly one UserInput event relayed, before the response was computed.
    let published = h.publisher.published();
    assert_eq!(published.len(), 2); // UserInput + mirrored AgentResponse
    assert_eq!(published[0].kind, EventKind::UserInput);
    assert_eq!(published[0].field(keys::SPEECH_RESULT), Some("hello"));
    assert_eq!(published[0].field(keys::CALL_SID), Some("CA1"));
    assert!(published[0].is_stamped());
    assert_eq!(published[1].kind, EventKind::AgentResponse);
    assert_eq!(published[1].field(keys::TEXT), Some("Nice to meet you!"));

    assert_eq!(h.llm.call_count(), 1);

    // Both turns recorded on the session.
    let (_, turns) = h.tracker.snapshot("CA1").await.unwrap();
    assert_eq!(turns.len(), 2);
}

#[tokio::test]
async fn json_input_is_accepted() {
    let h = harness(MockLlm::with_replies(vec!["Hello caller.".into()]));

    let request = Request::builder()
        .method("POST")
        .uri("/process-input")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            r#"{"SpeechResult": "hi there", "Digits": "", "CallSid": "CA2"}"#,
        ))
        .unwrap();

    let response = h.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let xml = body_string(response).await;
    assert!(xml.contains("Hello caller."));
    assert!(xml.contains("<Gather"));
}

#[tokio::test]
async fn unsupported_content_type_is_415_with_no_side_effects() {
    let h = harness(MockLlm::new());

    let request = Request::builder()
        .method("POST")
        .uri("/process-input")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("hello"))
        .unwrap();

    let response = h.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    assert!(h.publisher.published().is_empty());
    assert_eq!(h.llm.call_count(), 0);
}

#[tokio::test]
async fn digits_are_echoed_without_an_llm_turn() {
    let h = harness(MockLlm::new());

    let response = h
        .app
        .oneshot(form_request(
            "/process-input",
            "SpeechResult=&Digits=42&CallSid=CA1",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let xml = body_string(response).await;
    assert!(xml.contains("You pressed: 42"));
    assert!(xml.contains("<Gather"));
    assert_eq!(h.llm.call_count(), 0);
}

#[tokio::test]
async fn no_input_still_gathers() {
    let h = harness(MockLlm::new());

    let response = h
        .app
        .oneshot(form_request("/process-input", "SpeechResult=&Digits="))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let xml = body_string(response).await;
    assert!(xml.contains("No input received."));
    assert!(xml.contains("<Gather"));
}

#[tokio::test]
async fn llm_timeout_speaks_a_fallback_that_still_gathers() {
    // Tracker timeout is 250ms; the mock takes 2s.
    let h = harness(
        MockLlm::with_replies(vec!["too late".into()]).with_delay(Duration::from_secs(2)),
    );

    let response = h
        .app
        .oneshot(form_request(
            "/process-input",
            "SpeechResult=hello%3F&CallSid=CA1",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let xml = body_string(response).await;
    assert!(xml.contains("didn&apos;t catch that"));
    assert!(xml.contains("<Gather"));
}

#[tokio::test]
async fn speech_on_a_completed_call_is_a_500_that_still_gathers() {
    let h = harness(MockLlm::new());
    h.tracker.record_status("CA1", CallStatus::Completed).await;

    let response = h
        .app
        .oneshot(form_request(
            "/process-input",
            "SpeechResult=anyone&CallSid=CA1",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let xml = body_string(response).await;
    assert!(xml.contains("something went wrong"));
    assert!(xml.contains("<Gather"));
}

#[tokio::test]
async fn relay_failure_does_not_fail_the_caller() {
    let h = harness(MockLlm::with_replies(vec!["still talking".into()]));
    h.publisher.set_failing(true);

    let response = h
        .app
        .oneshot(form_request(
            "/process-input",
            "SpeechResult=hello&CallSid=CA1",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let xml = body_string(response).await;
    assert!(xml.contains("still talking"));
}

#[tokio::test]
async fn status_callback_acknowledges_publishes_and_updates_the_session() {
    let h = harness(MockLlm::new());

    let response = h
        .app
        .clone()
        .oneshot(form_request(
            "/status_callback",
            "CallSid=CA1&CallStatus=ringing&CallDuration=0",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("\"status\":\"success\""));

    let published = h.publisher.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].kind, EventKind::StatusUpdate);
    assert_eq!(published[0].field(keys::CALL_STATUS), Some("ringing"));
    assert!(published[0].is_stamped());

    let (status, _) = h.tracker.snapshot("CA1").await.unwrap();
    assert_eq!(status, CallStatus::Ringing);

    // Out-of-order follow-up regresses nothing.
    let response = h
        .app
        .oneshot(form_request(
            "/status_callback",
            "CallSid=CA1&CallStatus=initiated",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, _) = h.tracker.snapshot("CA1").await.unwrap();
    assert_eq!(status, CallStatus::Ringing);
}

#[tokio::test]
async fn status_callback_with_unknown_status_still_succeeds() {
    let h = harness(MockLlm::new());

    let response = h
        .app
        .oneshot(form_request(
            "/status_callback",
            "CallSid=CA1&CallStatus=warbling",
        ))
        .await
        .unwrap();

    // Logged and ignored: not an error to the provider.
    assert_eq!(response.status(), StatusCode::OK);
    let (status, _) = h.tracker.snapshot("CA1").await.unwrap();
    assert_eq!(status, CallStatus::Queued);
}

#[tokio::test]
async fn history_pages_the_drained_events() {
    let h = harness(MockLlm::new());
    h.history.append_batch(
        (0..7)
            .map(|n| {
                voxlink_core::CanonicalEvent::new(EventKind::Test)
                    .with_field("seq", n)
                    .stamped()
            })
            .collect(),
    );

    let response = h
        .app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/history?offset=5&limit=5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["total"], 7);
    assert_eq!(value["events"].as_array().unwrap().len(), 2);
    assert_eq!(value["events"][0]["seq"], 5);
}
