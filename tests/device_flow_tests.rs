mod auth_support;

use std::sync::Arc;
use std::time::Duration;

use device_grant::auth::RecordingPresenter;
use device_grant::error::DeviceGrantError;
use device_grant::flow::{DeviceFlow, ExpiryDeadline};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_support::{
    config, device_code_body, error_body, token_body, RecordingSleeper, DEVICE_CODE_PATH,
    TOKEN_PATH,
};

async fn mount_device_code(server: &MockServer, status: u16, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path(DEVICE_CODE_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn flow_presents_code_opens_browser_and_returns_tokens() {
    let server = MockServer::start().await;
    mount_device_code(&server, 200, device_code_body(5, 900)).await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(error_body("authorization_pending", "")),
        )
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(error_body("slow_down", "")))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(1)
        .mount(&server)
        .await;

    let presenter = Arc::new(RecordingPresenter::new());
    let sleeper = Arc::new(RecordingSleeper::new());
    let flow = DeviceFlow::new(config(&server), presenter.clone())
        .expect("flow")
        .with_sleeper(sleeper.clone());

    let token = flow.run(&CancellationToken::new()).await.expect("token");

    assert_eq!(token.access_token, "access-1");
    assert_eq!(sleeper.secs(), vec![5, 5, 10]);
    assert_eq!(
        presenter.presented(),
        vec![(
            "https://microsoft.com/devicelogin".to_string(),
            "ABCD-EFGH".to_string()
        )]
    );
    assert_eq!(
        presenter.opened(),
        vec!["https://microsoft.com/devicelogin".to_string()]
    );
}

#[tokio::test]
async fn browser_opens_the_plain_verification_uri() {
    let server = MockServer::start().await;
    let mut body = device_code_body(5, 900);
    body["verification_uri_complete"] =
        json!("https://microsoft.com/devicelogin?code=ABCD-EFGH");
    mount_device_code(&server, 200, body).await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(1)
        .mount(&server)
        .await;

    let presenter = Arc::new(RecordingPresenter::new());
    let flow = DeviceFlow::new(config(&server), presenter.clone())
        .expect("flow")
        .with_sleeper(Arc::new(RecordingSleeper::new()));

    flow.run(&CancellationToken::new()).await.expect("token");

    assert_eq!(
        presenter.opened(),
        vec!["https://microsoft.com/devicelogin".to_string()]
    );
}

#[tokio::test]
async fn browser_launch_can_be_disabled() {
    let server = MockServer::start().await;
    mount_device_code(&server, 200, device_code_body(5, 900)).await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(1)
        .mount(&server)
        .await;

    let presenter = Arc::new(RecordingPresenter::new());
    let flow = DeviceFlow::new(config(&server), presenter.clone())
        .expect("flow")
        .with_browser(false)
        .with_sleeper(Arc::new(RecordingSleeper::new()));

    flow.run(&CancellationToken::new()).await.expect("token");

    assert_eq!(presenter.presented().len(), 1);
    assert!(presenter.opened().is_empty());
}

#[tokio::test]
async fn device_code_rejection_stops_before_polling() {
    let server = MockServer::start().await;
    mount_device_code(
        &server,
        400,
        json!({"error": "invalid_request", "error_description": "bad scope"}),
    )
    .await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(0)
        .mount(&server)
        .await;

    let presenter = Arc::new(RecordingPresenter::new());
    let flow = DeviceFlow::new(config(&server), presenter.clone())
        .expect("flow")
        .with_sleeper(Arc::new(RecordingSleeper::new()));

    let err = flow.run(&CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, DeviceGrantError::Protocol { status: 400, .. }));
    assert!(presenter.presented().is_empty());
}

#[tokio::test]
async fn provider_expiry_deadline_stops_polling() {
    let server = MockServer::start().await;
    mount_device_code(&server, 200, device_code_body(1, 0)).await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(error_body("authorization_pending", "")),
        )
        .mount(&server)
        .await;

    let flow = DeviceFlow::new(
        config(&server).with_deadline(ExpiryDeadline::ProviderExpiry),
        Arc::new(RecordingPresenter::new()),
    )
    .expect("flow");

    let err = flow.run(&CancellationToken::new()).await.unwrap_err();

    assert!(matches!(
        err,
        DeviceGrantError::DeadlineExceeded { after_secs: 0 }
    ));
}

#[tokio::test]
async fn fixed_deadline_cuts_a_long_sleep_short() {
    let server = MockServer::start().await;
    mount_device_code(&server, 200, device_code_body(60, 900)).await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(error_body("authorization_pending", "")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let flow = DeviceFlow::new(
        config(&server).with_deadline(ExpiryDeadline::Fixed(Duration::from_millis(300))),
        Arc::new(RecordingPresenter::new()),
    )
    .expect("flow");

    let err = flow.run(&CancellationToken::new()).await.unwrap_err();

    assert_eq!(err.category(), device_grant::error::ErrorCategory::Timeout);
}

#[tokio::test]
async fn cancelled_before_start_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_code_body(5, 900)))
        .expect(0)
        .mount(&server)
        .await;

    let flow = DeviceFlow::new(config(&server), Arc::new(RecordingPresenter::new()))
        .expect("flow");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = flow.run(&cancel).await.unwrap_err();

    assert!(matches!(err, DeviceGrantError::Cancelled));
}

#[test]
fn flow_rejects_invalid_config() {
    let result = DeviceFlow::new(
        device_grant::config::DeviceGrantConfig::new("https://idp.example.com", ""),
        Arc::new(RecordingPresenter::new()),
    );

    assert!(matches!(result, Err(DeviceGrantError::Configuration(_))));
}
