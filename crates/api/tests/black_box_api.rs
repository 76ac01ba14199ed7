use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use pitline_auth::{Claims, MembershipRecord, MembershipStatus, Role};
use pitline_core::{OrgId, UserId};
use pitline_infra::{AuthConfig, InMemoryPrincipalStore};

struct TestServer {
    base_url: String,
    store: Arc<InMemoryPrincipalStore>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(jwt_secret: &str, ttl: ChronoDuration) -> Self {
        // Same router as prod, bound to an ephemeral port, seedable store.
        let store = Arc::new(InMemoryPrincipalStore::new());
        let config = AuthConfig::new(jwt_secret, ttl);
        let app = pitline_api::app::build_app_with_store(&config, store.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            store,
            handle,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn register(
    client: &reqwest::Client,
    base_url: &str,
    email: &str,
) -> (UserId, String) {
    let res = client
        .post(format!("{}/auth/register", base_url))
        .json(&json!({
            "email": email,
            "name": "Test User",
            "password": "correct-horse",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: serde_json::Value = res.json().await.unwrap();
    let user_id: UserId = body["user_id"].as_str().unwrap().parse().unwrap();
    let token = body["token"].as_str().unwrap().to_string();
    (user_id, token)
}

fn mint_jwt(jwt_secret: &str, sub: UserId, role: Role) -> String {
    let now = Utc::now();
    let claims = Claims {
        sub,
        global_role: role,
        org_ids: vec![],
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn("test-secret", ChronoDuration::minutes(10)).await;

    let res = reqwest::Client::new()
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn("test-secret", ChronoDuration::minutes(10)).await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Non-bearer scheme is treated the same as no token.
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .header("Authorization", "Basic dXNlcjpwdw==")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_then_whoami() {
    let srv = TestServer::spawn("test-secret", ChronoDuration::minutes(10)).await;
    let client = reqwest::Client::new();

    let (user_id, token) = register(&client, &srv.base_url, "mel@example.com").await;

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["id"].as_str().unwrap(), user_id.to_string());
    assert_eq!(body["email"], "mel@example.com");
    assert_eq!(body["global_role"], "viewer");
}

#[tokio::test]
async fn login_verifies_credentials() {
    let srv = TestServer::spawn("test-secret", ChronoDuration::minutes(10)).await;
    let client = reqwest::Client::new();

    register(&client, &srv.base_url, "mel@example.com").await;

    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "email": "mel@example.com", "password": "correct-horse" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["token"].as_str().unwrap().split('.').count() == 3);

    // Wrong password and unknown email are the same generic rejection.
    let wrong = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "email": "mel@example.com", "password": "wrong-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    let wrong_body: serde_json::Value = wrong.json().await.unwrap();

    let unknown = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "email": "nobody@example.com", "password": "correct-horse" }))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let unknown_body: serde_json::Value = unknown.json().await.unwrap();

    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let srv = TestServer::spawn("test-secret", ChronoDuration::minutes(10)).await;
    let client = reqwest::Client::new();

    register(&client, &srv.base_url, "mel@example.com").await;

    let res = client
        .post(format!("{}/auth/register", srv.base_url))
        .json(&json!({
            "email": "mel@example.com",
            "name": "Someone Else",
            "password": "other-password",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn token_signed_with_wrong_secret_is_rejected() {
    let srv = TestServer::spawn("test-secret", ChronoDuration::minutes(10)).await;
    let client = reqwest::Client::new();

    let (user_id, _) = register(&client, &srv.base_url, "mel@example.com").await;
    let forged = mint_jwt("other-secret", user_id, Role::Superadmin);

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(forged)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_for_unknown_subject_is_rejected() {
    let srv = TestServer::spawn("test-secret", ChronoDuration::minutes(10)).await;

    // Correctly signed, but the subject was never registered.
    let stray = mint_jwt("test-secret", UserId::new(), Role::Worker);

    let res = reqwest::Client::new()
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(stray)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn disabled_account_is_forbidden_with_valid_token() {
    let srv = TestServer::spawn("test-secret", ChronoDuration::minutes(10)).await;
    let client = reqwest::Client::new();

    let (user_id, token) = register(&client, &srv.base_url, "mel@example.com").await;
    srv.store.update(user_id, |r| r.is_active = false);

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_probe_checks_the_current_stored_role() {
    let srv = TestServer::spawn("test-secret", ChronoDuration::minutes(10)).await;
    let client = reqwest::Client::new();

    let (user_id, token) = register(&client, &srv.base_url, "mel@example.com").await;

    // Fresh registrations are viewers; not in the admin role set.
    let res = client
        .get(format!("{}/admin/ping", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Promote in the store: the same token now passes, because the gate
    // resolves the principal fresh on every request.
    srv.store.update(user_id, |r| r.global_role = Role::Manager);

    let res = client
        .get(format!("{}/admin/ping", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn org_board_uses_membership_role_within_scope() {
    let srv = TestServer::spawn("test-secret", ChronoDuration::minutes(10)).await;
    let client = reqwest::Client::new();

    let (user_id, token) = register(&client, &srv.base_url, "mel@example.com").await;

    let staffed_org = OrgId::new();
    let pending_org = OrgId::new();
    srv.store.update(user_id, |r| {
        r.memberships = vec![
            MembershipRecord {
                org_id: staffed_org,
                role: Role::Coordinator,
                status: MembershipStatus::Active,
            },
            MembershipRecord {
                org_id: pending_org,
                role: Role::Owner,
                status: MembershipStatus::Pending,
            },
        ];
    });

    // Active coordinator membership admits.
    let res = client
        .get(format!("{}/orgs/{}/board", srv.base_url, staffed_org))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["role"], "coordinator");

    // A pending membership grants nothing; the global viewer role applies.
    let res = client
        .get(format!("{}/orgs/{}/board", srv.base_url, pending_org))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Nor does an org the principal never joined.
    let res = client
        .get(format!("{}/orgs/{}/board", srv.base_url, OrgId::new()))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn token_expires_after_ttl() {
    let srv = TestServer::spawn("test-secret", ChronoDuration::seconds(1)).await;
    let client = reqwest::Client::new();

    let (_, token) = register(&client, &srv.base_url, "mel@example.com").await;

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    tokio::time::sleep(std::time::Duration::from_secs(2)).await;

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
