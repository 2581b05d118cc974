use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use bytes::Bytes;
use chrono::{Duration, NaiveDate};
use schedule_portal::{CookieSet, Portal, PortalError, Step, UpstreamBody};
use schedule_proxy::{build_router, config::Settings, session::SessionStore, AppState};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

enum LoginOutcome {
    Success,
    InvalidCredentials,
    UpstreamDown,
}

enum ScheduleOutcome {
    Body(&'static str),
    Unauthorized,
}

struct FakePortal {
    login: LoginOutcome,
    schedule: ScheduleOutcome,
    login_calls: AtomicUsize,
    schedule_calls: AtomicUsize,
    last_date: Mutex<Option<NaiveDate>>,
}

impl FakePortal {
    fn new(login: LoginOutcome, schedule: ScheduleOutcome) -> Arc<Self> {
        Arc::new(Self {
            login,
            schedule,
            login_calls: AtomicUsize::new(0),
            schedule_calls: AtomicUsize::new(0),
            last_date: Mutex::new(None),
        })
    }
}

#[async_trait]
impl Portal for FakePortal {
    async fn login(&self, _username: &str, _password: &str) -> Result<CookieSet, PortalError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        match self.login {
            LoginOutcome::Success => {
                let mut cookies = CookieSet::new();
                cookies.insert(".ASPXAUTH", "secret");
                Ok(cookies)
            }
            LoginOutcome::InvalidCredentials => Err(PortalError::InvalidCredentials),
            LoginOutcome::UpstreamDown => Err(PortalError::UnexpectedStatus {
                step: Step::FindAccount,
                status: StatusCode::BAD_GATEWAY,
            }),
        }
    }

    async fn fetch_classes(
        &self,
        cookies: &CookieSet,
        date: NaiveDate,
    ) -> Result<UpstreamBody, PortalError> {
        self.schedule_calls.fetch_add(1, Ordering::SeqCst);
        assert!(cookies.contains(".ASPXAUTH"));
        *self.last_date.lock().unwrap() = Some(date);

        match self.schedule {
            ScheduleOutcome::Body(body) => Ok(UpstreamBody {
                content_type: Some("application/json; charset=utf-8".to_string()),
                body: Bytes::from_static(body.as_bytes()),
            }),
            ScheduleOutcome::Unauthorized => Err(PortalError::Unauthorized {
                step: Step::FetchClasses,
            }),
        }
    }
}

fn app(portal: Arc<FakePortal>) -> Router {
    let sessions = Arc::new(SessionStore::new(Duration::days(180), None));
    build_router(AppState::new(sessions, portal, Settings::default()))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>, Option<String>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec(), set_cookie)
}

fn json_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

fn login_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-session-token", token)
        .body(Body::empty())
        .unwrap()
}

async fn login_token(app: &Router) -> String {
    let (status, body, _) = send(app, login_request(json!({"username": "bob", "password": "pw"}))).await;
    assert_eq!(status, StatusCode::OK);
    json_body(&body)["sessionToken"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let app = app(FakePortal::new(LoginOutcome::Success, ScheduleOutcome::Body("{}")));
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["status"], "healthy");
}

#[tokio::test]
async fn test_session_without_token_is_unauthenticated() {
    let app = app(FakePortal::new(LoginOutcome::Success, ScheduleOutcome::Body("{}")));
    let request = Request::builder().uri("/api/session").body(Body::empty()).unwrap();

    let (status, body, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(&body), json!({"authenticated": false}));
}

#[tokio::test]
async fn test_login_missing_fields_is_bad_request() {
    let portal = FakePortal::new(LoginOutcome::Success, ScheduleOutcome::Body("{}"));
    let app = app(portal.clone());

    let (status, _, _) = send(&app, login_request(json!({"username": "bob"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(&app, login_request(json!({"username": "", "password": "pw"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(portal.login_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_login_accepts_whitespace_password() {
    let portal = FakePortal::new(LoginOutcome::Success, ScheduleOutcome::Body("{}"));
    let app = app(portal.clone());

    let (status, _, _) = send(&app, login_request(json!({"username": "bob", "password": "  "}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(portal.login_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_login_success_issues_token_and_cookie() {
    let app = app(FakePortal::new(LoginOutcome::Success, ScheduleOutcome::Body("{}")));

    let (status, body, set_cookie) =
        send(&app, login_request(json!({"username": "bob", "password": "pw"}))).await;
    assert_eq!(status, StatusCode::OK);

    let body = json_body(&body);
    assert_eq!(body["success"], true);
    let token = body["sessionToken"].as_str().unwrap();
    assert!(set_cookie.unwrap().starts_with(&format!("session_token={};", token)));

    let (status, body, _) = send(&app, get_with_token("/api/session", token)).await;
    assert_eq!(status, StatusCode::OK);
    let body = json_body(&body);
    assert_eq!(body["authenticated"], true);
    assert!(body["sessionAge"].as_i64().unwrap() >= 0);
    assert!(body["timestamp"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_session_token_accepted_from_cookie() {
    let app = app(FakePortal::new(LoginOutcome::Success, ScheduleOutcome::Body("{}")));
    let token = login_token(&app).await;

    let request = Request::builder()
        .uri("/api/session")
        .header(header::COOKIE, format!("session_token={}", token))
        .body(Body::empty())
        .unwrap();

    let (status, _, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_invalid_credentials_is_unauthorized() {
    let app = app(FakePortal::new(LoginOutcome::InvalidCredentials, ScheduleOutcome::Body("{}")));

    let (status, body, _) =
        send(&app, login_request(json!({"username": "bob", "password": "bad"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(&body)["success"], false);
}

#[tokio::test]
async fn test_login_upstream_failure_is_server_error() {
    let app = app(FakePortal::new(LoginOutcome::UpstreamDown, ScheduleOutcome::Body("{}")));

    let (status, body, _) =
        send(&app, login_request(json!({"username": "bob", "password": "pw"}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json_body(&body)["message"].as_str().unwrap().contains("find-account"));
}

#[tokio::test]
async fn test_schedule_without_login_makes_no_upstream_call() {
    let portal = FakePortal::new(LoginOutcome::Success, ScheduleOutcome::Body("{}"));
    let app = app(portal.clone());

    let request = Request::builder()
        .uri("/api/schedule?date=2026-10-18")
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(&app, get_with_token("/api/schedule", "unknown-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(portal.schedule_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_schedule_relays_upstream_body() {
    let portal = FakePortal::new(
        LoginOutcome::Success,
        ScheduleOutcome::Body(r#"{"classes":[{"name":"Yoga"}]}"#),
    );
    let app = app(portal.clone());
    let token = login_token(&app).await;

    let response = app
        .clone()
        .oneshot(get_with_token("/api/schedule?date=2026-10-18", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json; charset=utf-8"
    );

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], br#"{"classes":[{"name":"Yoga"}]}"#);
    assert_eq!(
        *portal.last_date.lock().unwrap(),
        NaiveDate::from_ymd_opt(2026, 10, 18)
    );
}

#[tokio::test]
async fn test_schedule_invalid_date_is_bad_request() {
    let portal = FakePortal::new(LoginOutcome::Success, ScheduleOutcome::Body("{}"));
    let app = app(portal.clone());
    let token = login_token(&app).await;

    let (status, _, _) = send(&app, get_with_token("/api/schedule?date=tomorrow", &token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(portal.schedule_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_upstream_unauthorized_drops_session() {
    let app = app(FakePortal::new(LoginOutcome::Success, ScheduleOutcome::Unauthorized));
    let token = login_token(&app).await;

    let (status, body, _) = send(&app, get_with_token("/api/schedule", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(&body)["error"], "SessionExpired");

    let (status, body, _) = send(&app, get_with_token("/api/session", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(&body)["authenticated"], false);
}

#[tokio::test]
async fn test_logout_removes_session() {
    let app = app(FakePortal::new(LoginOutcome::Success, ScheduleOutcome::Body("{}")));
    let token = login_token(&app).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/logout")
        .header("x-session-token", &token)
        .body(Body::empty())
        .unwrap();
    let (status, _, set_cookie) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(set_cookie.unwrap().contains("Max-Age=0"));

    let (status, _, _) = send(&app, get_with_token("/api/session", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
