//! End-to-end probe tests against a mock management API

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sumaprobe_api_core::{probe, ApiClient, Credentials, Error, ProbeOutcome, RetryPolicy};

const API: &str = "/rhn/manager/api";

fn client_for(server: &MockServer) -> ApiClient {
    let base = url::Url::parse(&format!("{}{}", server.uri(), API)).unwrap();
    ApiClient::new(base, reqwest::Client::new())
}

fn credentials() -> Credentials {
    Credentials {
        login: "admin".into(),
        password: "suselinux".into(),
    }
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_retries: 2,
        initial_delay_ms: 5,
        max_delay_ms: 20,
        backoff_multiplier: 2.0,
    }
}

/// Login response with the expiring duplicate the server actually sends
fn login_response() -> ResponseTemplate {
    ResponseTemplate::new(200)
        .append_header("set-cookie", "pxt-session-cookie=STALE; Max-Age=0; Path=/")
        .append_header(
            "set-cookie",
            "pxt-session-cookie=ABC123; Max-Age=3600; Path=/; HttpOnly",
        )
        .append_header("set-cookie", "JSESSIONID=XYZ789; Path=/")
        .set_body_json(json!({"success": true}))
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(format!("{API}/auth/login")))
        .and(body_json(json!({"login": "admin", "password": "suselinux"})))
        .respond_with(login_response())
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn login_extracts_the_live_session_cookie() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let client = client_for(&server);
    let (session, response) = client.login(&credentials()).await.unwrap();

    assert_eq!(session.token(), "ABC123");
    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!({"success": true}));
}

#[tokio::test]
async fn successful_probe_logs_out_once_with_the_full_cookie_set() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{API}/channel/listAllChannels")))
        .and(header("cookie", "pxt-session-cookie=ABC123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"label": "test-channel"}])))
        .expect(1)
        .mount(&server)
        .await;

    // The one and only logout must carry the original cookie set, in
    // response order; the Max-Age=0 duplicate is a deletion and not part
    // of the set.
    Mock::given(method("POST"))
        .and(path(format!("{API}/auth/logout")))
        .and(header(
            "cookie",
            "pxt-session-cookie=ABC123; JSESSIONID=XYZ789",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let report = probe::run(&client, &credentials(), &RetryPolicy::no_retry())
        .await
        .unwrap();

    assert!(report.outcome.is_success());
    assert_eq!(report.session_token, "ABC123");
    assert_eq!(report.listing_status, 200);
    assert_eq!(report.channels.len(), 1);
    assert_eq!(report.channels[0].label, "test-channel");

    let logout = report.logout.expect("teardown logout must have run");
    assert_eq!(logout.status, 200);
}

#[tokio::test]
async fn failed_listing_logs_out_once_with_only_the_session_cookie() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{API}/channel/listAllChannels")))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"success": false})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("{API}/auth/logout")))
        .and(header("cookie", "pxt-session-cookie=ABC123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let report = probe::run(&client, &credentials(), &RetryPolicy::no_retry())
        .await
        .unwrap();

    assert_eq!(report.outcome, ProbeOutcome::ListingFailed { status: 403 });
    assert_eq!(report.listing_status, 403);
    assert!(report.channels.is_empty());
    assert_eq!(report.logout.expect("failure-path logout").status, 200);
}

#[tokio::test]
async fn unready_session_is_retried_until_the_listing_succeeds() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    // First attempt races the fresh session and answers 401; the retry
    // gets the real listing, here in its enveloped form.
    Mock::given(method("GET"))
        .and(path(format!("{API}/channel/listAllChannels")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"success": false})))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{API}/channel/listAllChannels")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": [{"label": "test-channel", "arch_name": "x86_64"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("{API}/auth/logout")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let report = probe::run(&client, &credentials(), &fast_retry())
        .await
        .unwrap();

    assert!(report.outcome.is_success());
    assert_eq!(report.channels[0].arch_name.as_deref(), Some("x86_64"));
}

#[tokio::test]
async fn persistent_401_becomes_a_failure_outcome_after_retries() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{API}/channel/listAllChannels")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"success": false})))
        .expect(3)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("{API}/auth/logout")))
        .and(header("cookie", "pxt-session-cookie=ABC123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let report = probe::run(&client, &credentials(), &fast_retry())
        .await
        .unwrap();

    assert_eq!(report.outcome, ProbeOutcome::ListingFailed { status: 401 });
}

#[tokio::test]
async fn rejected_login_fails_fast() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{API}/auth/login")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"success": false})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = probe::run(&client, &credentials(), &RetryPolicy::no_retry())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::LoginFailed { status: 401 }));
}

#[tokio::test]
async fn login_without_a_live_session_cookie_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{API}/auth/login")))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("set-cookie", "pxt-session-cookie=STALE; Max-Age=0")
                .set_body_json(json!({"success": true})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.login(&credentials()).await.unwrap_err();
    assert!(matches!(err, Error::SessionMissing));
}

#[tokio::test]
async fn logout_fires_at_most_once_per_session() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("{API}/auth/logout")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let (mut session, _) = client.login(&credentials()).await.unwrap();

    let first = client
        .logout(&mut session, sumaprobe_api_core::LogoutScope::Full)
        .await
        .unwrap();
    let second = client
        .logout(&mut session, sumaprobe_api_core::LogoutScope::Full)
        .await
        .unwrap();

    assert_eq!(first.unwrap().status, 200);
    assert!(second.is_none(), "second logout must be a no-op");
}
