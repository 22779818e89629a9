use secrecy::SecretString;
use serde_json::json;
use std::sync::{Arc, Mutex};
use trustgate::{
    auth::{self, AuthClient, AuthContext, Hydrated, LoginFlow, LoginState},
    fingerprint::StaticFingerprint,
    navigate::{Navigator, Route},
    notify::TracingNotifier,
    session::{FileStore, SessionStore, ACCESS_TOKEN, USER_ID},
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct Routes(Mutex<Vec<Route>>);

impl Navigator for Routes {
    fn navigate(&self, route: &Route) {
        self.0.lock().unwrap().push(route.clone());
    }
}

#[tokio::test]
async fn new_device_login_then_hydrate_then_logout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({
            "email": "a@b.co",
            "password": "Secret123",
            "deviceId": "fp-new"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "loggedIn": false,
            "message": "OTP sent to your email"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/verify-otp-device"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access_token": "abc", "userId": "u1"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/u1"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"email": "a@b.co", "username": "alice", "isKycVerified": false},
            "newAccessToken": "rotated"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path().join("session.json")));
    let routes = Arc::new(Routes::default());
    let ctx = AuthContext::new(
        AuthClient::new(&server.uri()).unwrap(),
        store.clone(),
        routes.clone(),
        Arc::new(TracingNotifier),
        Arc::new(StaticFingerprint::new("fp-new")),
    );

    let mut flow = LoginFlow::new(ctx.clone());
    flow.submit_credentials("a@b.co", &SecretString::from("Secret123".to_string()))
        .await
        .unwrap();
    assert!(matches!(flow.state(), LoginState::OtpRequired { .. }));
    assert!(store.get(ACCESS_TOKEN).await.unwrap().is_none());

    flow.submit_otp(&SecretString::from("123456".to_string()))
        .await
        .unwrap();
    assert_eq!(
        flow.state(),
        &LoginState::Verified {
            user_id: "u1".to_string()
        }
    );

    let hydrated = auth::hydrate(&ctx).await.unwrap();
    assert!(matches!(hydrated, Hydrated::KycRequired(_)));
    assert_eq!(
        store.get(ACCESS_TOKEN).await.unwrap().as_deref(),
        Some("rotated")
    );

    auth::logout(&ctx).await.unwrap();
    assert!(store.get(ACCESS_TOKEN).await.unwrap().is_none());
    assert!(store.get(USER_ID).await.unwrap().is_none());

    assert_eq!(
        *routes.0.lock().unwrap(),
        vec![Route::Dashboard, Route::Kyc, Route::Login]
    );
}
