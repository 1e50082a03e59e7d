//! Integration tests for the REST client, services and session manager
//! against a local HTTP stub.

use std::sync::{Arc, Mutex};

use foodlink_core::{
    ApiClient, AuthService, Error, FamilyMemberRequest, FamilyService, FileTokenStore,
    LoginRequest, RegisterRequest, Relationship, RestoreValidation, SessionManager,
    SessionStatus, TokenStore, UpdateProfileRequest, UserService,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

// ============================================================================
// Stub server
// ============================================================================

/// A request as seen by the stub
#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    path: String,
    authorization: Option<String>,
    body: String,
}

type Responder = dyn Fn(&str, &str) -> (u16, String) + Send + Sync;

struct StubServer {
    base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl StubServer {
    /// Start a server answering every request with `respond(method, path)`
    async fn start<F>(respond: F) -> Self
    where
        F: Fn(&str, &str) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let respond: Arc<Responder> = Arc::new(respond);

        let recorded = requests.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let recorded = recorded.clone();
                let respond = respond.clone();
                tokio::spawn(async move {
                    handle(stream, recorded, respond).await;
                });
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    fn client(&self) -> ApiClient {
        ApiClient::new(self.base_url.clone()).unwrap()
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn last(&self) -> Recorded {
        self.requests().last().cloned().expect("no request recorded")
    }
}

async fn handle(mut stream: TcpStream, recorded: Arc<Mutex<Vec<Recorded>>>, respond: Arc<Responder>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut content_length = 0usize;
    let mut authorization = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim().to_string();
            if name == "content-length" {
                content_length = value.parse().unwrap_or(0);
            } else if name == "authorization" {
                authorization = Some(value);
            }
        }
    }

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    let (status, response_body) = respond(&method, &path);
    recorded.lock().unwrap().push(Recorded {
        method,
        path,
        authorization,
        body,
    });

    let response = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        response_body.len(),
        response_body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

fn ok(body: Value) -> (u16, String) {
    (200, body.to_string())
}

fn wrapped(data: Value) -> (u16, String) {
    ok(json!({ "data": data, "message": "ok", "success": true }))
}

fn profile_json() -> Value {
    json!({
        "email": "alice@example.com",
        "fullName": "Alice Liddell",
        "phone": "555-0100",
        "address": null,
        "avatarUrl": null
    })
}

/// Routes shared by the end-to-end session tests
fn backend_routes(method: &str, path: &str) -> (u16, String) {
    match (method, path) {
        ("POST", "/auth/login") => wrapped(json!({
            "accessToken": "tok1",
            "tokenType": "Bearer",
            "username": "alice",
            "role": "user"
        })),
        ("POST", "/auth/logout") => wrapped(Value::Null),
        ("GET", "/users/me") => wrapped(profile_json()),
        _ => (404, json!({ "message": "Not found", "success": false }).to_string()),
    }
}

// ============================================================================
// ApiClient
// ============================================================================

#[tokio::test]
async fn test_bearer_header_follows_installed_token() {
    let server = StubServer::start(|_, _| wrapped(profile_json())).await;
    let client = server.client();

    let _: Value = client.get("/users/me").await.unwrap();
    assert!(server.last().authorization.is_none());

    client.set_token(Some("abc".to_string()));
    let _: Value = client.get("/users/me").await.unwrap();
    assert_eq!(server.last().authorization.as_deref(), Some("Bearer abc"));

    client.set_token(None);
    let _: Value = client.get("/users/me").await.unwrap();
    assert!(server.last().authorization.is_none());
}

#[tokio::test]
async fn test_error_uses_server_message() {
    let server = StubServer::start(|_, _| {
        (
            400,
            json!({ "message": "Email already registered", "success": false }).to_string(),
        )
    })
    .await;

    let err = server.client().get::<Value>("/anything").await.unwrap_err();

    assert_eq!(err.to_string(), "Email already registered");
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_error_without_message_falls_back_to_status() {
    let server = StubServer::start(|_, _| (502, "<html>bad gateway</html>".to_string())).await;

    let err = server.client().get::<Value>("/anything").await.unwrap_err();

    assert!(matches!(err, Error::Api { status: 502, .. }));
    assert_eq!(err.to_string(), "HTTP 502");
}

#[tokio::test]
async fn test_unauthorized_is_auth_error() {
    let server = StubServer::start(|_, _| {
        (401, json!({ "message": "Token expired", "success": false }).to_string())
    })
    .await;

    let err = server.client().get::<Value>("/users/me").await.unwrap_err();

    assert!(matches!(err, Error::Api { status: 401, .. }));
    assert!(err.is_auth_error());
    assert_eq!(err.to_string(), "Token expired");
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // Bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(format!("http://{}", addr)).unwrap();
    let err = client.get::<Value>("/users/me").await.unwrap_err();

    assert!(matches!(err, Error::Network(_)));
    assert!(!err.is_auth_error());
}

// ============================================================================
// Services
// ============================================================================

#[tokio::test]
async fn test_login_accepts_wrapped_payload() {
    let server = StubServer::start(backend_routes).await;
    let client = server.client();

    let payload = AuthService::new(&client)
        .login(&LoginRequest {
            email: "a@b.com".to_string(),
            password: "pw123456".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(payload.access_token.as_deref(), Some("tok1"));
    assert_eq!(payload.identity().username.as_deref(), Some("alice"));

    let request = server.last();
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/auth/login");
    let body: Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body, json!({ "email": "a@b.com", "password": "pw123456" }));
}

#[tokio::test]
async fn test_login_rejected_in_successful_response() {
    let server = StubServer::start(|_, _| {
        ok(json!({ "data": null, "message": "Account is locked", "success": false }))
    })
    .await;
    let client = server.client();

    let err = AuthService::new(&client)
        .login(&LoginRequest {
            email: "a@b.com".to_string(),
            password: "pw123456".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Account is locked");
    assert!(matches!(err, Error::Api { status: 200, .. }));
}

#[tokio::test]
async fn test_register_accepts_bare_payload() {
    let server = StubServer::start(|_, _| {
        ok(json!({
            "accessToken": "tok2",
            "tokenType": "Bearer",
            "email": "bob@example.com",
            "fullName": "Bob",
            "isAdmin": false
        }))
    })
    .await;
    let client = server.client();

    let payload = AuthService::new(&client)
        .register(&RegisterRequest {
            full_name: "Bob".to_string(),
            email: "bob@example.com".to_string(),
            password: "pw123456".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(payload.full_name.as_deref(), Some("Bob"));
    let body: Value = serde_json::from_str(&server.last().body).unwrap();
    assert_eq!(body["fullName"], "Bob");
}

#[tokio::test]
async fn test_logout_sends_explicit_token() {
    let server = StubServer::start(backend_routes).await;
    let client = server.client();
    client.set_token(Some("installed".to_string()));

    AuthService::new(&client).logout("explicit").await.unwrap();

    let request = server.last();
    assert_eq!(request.path, "/auth/logout");
    assert_eq!(request.authorization.as_deref(), Some("Bearer explicit"));
}

#[tokio::test]
async fn test_update_profile_puts_changed_fields() {
    let server = StubServer::start(|_, _| wrapped(profile_json())).await;
    let client = server.client();
    client.set_token(Some("tok1".to_string()));

    let request = UpdateProfileRequest {
        full_name: "Alice Liddell".to_string(),
        phone: Some("555-0100".to_string()),
        ..Default::default()
    };
    let profile = UserService::new(&client).update_profile(&request).await.unwrap();

    assert_eq!(profile.phone.as_deref(), Some("555-0100"));
    let recorded = server.last();
    assert_eq!(recorded.method, "PUT");
    assert_eq!(recorded.path, "/users/me");
    let body: Value = serde_json::from_str(&recorded.body).unwrap();
    assert_eq!(body, json!({ "fullName": "Alice Liddell", "phone": "555-0100" }));
}

#[tokio::test]
async fn test_family_endpoints() {
    let member = json!({
        "id": "m1",
        "displayName": "Grace",
        "relationship": "child",
        "gender": "female",
        "birthDate": "2015-06-01",
        "heightCm": null,
        "weightKg": null,
        "activityLevel": "high",
        "healthNotes": null,
        "healthConditions": []
    });
    let list = json!([member.clone()]);
    let server = StubServer::start(move |method, path| match (method, path) {
        ("GET", "/family") => wrapped(list.clone()),
        ("GET", "/family/conditions") => ok(json!([{ "id": "c1", "code": "DIAB", "name": "Diabetes" }])),
        ("POST", "/family") | ("PUT", "/family/m1") => wrapped(member.clone()),
        ("DELETE", "/family/m1") => (200, String::new()),
        _ => (404, json!({ "message": "Not found" }).to_string()),
    })
    .await;
    let client = server.client();
    client.set_token(Some("tok1".to_string()));
    let family = FamilyService::new(&client);

    let members = family.list_members().await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].relationship, Relationship::Child);

    let found = family.get_member("m1").await.unwrap();
    assert_eq!(found.display_name, "Grace");
    let missing = family.get_member("nope").await.unwrap_err();
    assert_eq!(missing.status(), Some(404));

    let created = family
        .add_member(&FamilyMemberRequest::new("Grace", Relationship::Child))
        .await
        .unwrap();
    assert_eq!(created.id, "m1");

    family
        .update_member("m1", &FamilyMemberRequest::from(&created))
        .await
        .unwrap();
    family.delete_member("m1").await.unwrap();
    assert_eq!(server.last().method, "DELETE");

    let conditions = family.list_conditions().await.unwrap();
    assert_eq!(conditions[0].code, "DIAB");

    assert!(server
        .requests()
        .iter()
        .all(|r| r.authorization.as_deref() == Some("Bearer tok1")));
}

// ============================================================================
// Session end to end
// ============================================================================

#[tokio::test]
async fn test_session_login_persists_and_restores() {
    let server = StubServer::start(backend_routes).await;
    let temp_dir = TempDir::new().unwrap();
    let token_path = temp_dir.path().join("session.json");

    let manager = SessionManager::start(
        Arc::new(server.client()),
        Arc::new(FileTokenStore::new(&token_path)),
        RestoreValidation::None,
    )
    .await;
    assert_eq!(manager.state().status(), SessionStatus::Unauthenticated);

    let state = manager.login("a@b.com", "pw123456").await.unwrap();
    assert_eq!(state.token(), Some("tok1"));
    assert_eq!(manager.backend().token().as_deref(), Some("tok1"));

    // A fresh process picks the session up from disk
    let restored = SessionManager::start(
        Arc::new(server.client()),
        Arc::new(FileTokenStore::new(&token_path)),
        RestoreValidation::Profile,
    )
    .await;

    let state = restored.state();
    assert_eq!(state.status(), SessionStatus::Authenticated);
    assert_eq!(state.token(), Some("tok1"));
    assert_eq!(
        state.user().and_then(|u| u.full_name.as_deref()),
        Some("Alice Liddell")
    );
    let profile_request = server.last();
    assert_eq!(profile_request.path, "/users/me");
    assert_eq!(profile_request.authorization.as_deref(), Some("Bearer tok1"));

    let state = restored.logout().await;
    assert!(!state.is_authenticated());
    assert!(!restored.backend().has_token());
    assert_eq!(FileTokenStore::new(&token_path).get_token().await.unwrap(), None);
}

#[tokio::test]
async fn test_session_restore_with_rejected_token() {
    let server = StubServer::start(|_, _| {
        (401, json!({ "message": "Token expired", "success": false }).to_string())
    })
    .await;
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FileTokenStore::new(temp_dir.path().join("session.json")));
    store.set_token("abc").await.unwrap();

    let manager =
        SessionManager::start(Arc::new(server.client()), store.clone(), RestoreValidation::Profile)
            .await;

    assert_eq!(manager.state().status(), SessionStatus::Unauthenticated);
    assert_eq!(store.get_token().await.unwrap(), None);
    assert!(!manager.backend().has_token());
}
