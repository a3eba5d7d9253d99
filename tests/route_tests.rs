use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use movie_user_api::application::mail_service::MailService;
use movie_user_api::application::user_service::UserService;
use movie_user_api::domain::favorite::Favorite;
use movie_user_api::domain::user::{Credentials, NewUser, Role, Session, User, UserUpdate};
use movie_user_api::infrastructure::security::generate_token;
use movie_user_api::presentation::handlers::AppState;
use movie_user_api::presentation::middleware::JwtAuthMiddleware;
use movie_user_api::presentation::routes::configure;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

const SECRET: &str = "route-test-secret";

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Login(Option<String>),
    GetAll,
    Create(String),
    Update(i64, Role),
    Delete(i64),
    GetFavorites(i64),
    AddFavorite(i64, i64),
    RemoveFavorite(i64, i64),
}

#[derive(Default)]
struct RecordingUserService {
    calls: Mutex<Vec<Call>>,
    fail: bool,
}

impl RecordingUserService {
    fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    fn record(&self, call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.fail {
            return Err(anyhow!("user store unavailable"));
        }
        Ok(())
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

fn user(id: i64, user_name: &str) -> User {
    let now = Utc::now();
    User {
        id,
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        user_name: user_name.to_string(),
        password: String::new(),
        mail: None,
        role: Role::User,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl UserService for RecordingUserService {
    async fn login(&self, credentials: Credentials) -> Result<Session> {
        self.record(Call::Login(credentials.mail))?;
        Ok(Session {
            token: "mock-token".to_string(),
        })
    }

    async fn get_all(&self) -> Result<Vec<User>> {
        self.record(Call::GetAll)?;
        Ok(vec![user(1, "Johny")])
    }

    async fn create(&self, payload: NewUser) -> Result<User> {
        self.record(Call::Create(payload.user_name.clone()))?;
        Ok(user(1, &payload.user_name))
    }

    async fn update(&self, payload: UserUpdate) -> Result<User> {
        self.record(Call::Update(payload.id, payload.role))?;
        Ok(user(payload.id, "Johny"))
    }

    async fn delete_user_by_id(&self, id: i64) -> Result<()> {
        self.record(Call::Delete(id))
    }

    async fn get_all_favorites(&self, id_user: i64) -> Result<Vec<Favorite>> {
        self.record(Call::GetFavorites(id_user))?;
        Ok(vec![Favorite { id_user, id_movie: 1 }])
    }

    async fn add_favorite(&self, id_user: i64, id_movie: i64) -> Result<Favorite> {
        self.record(Call::AddFavorite(id_user, id_movie))?;
        Ok(Favorite { id_user, id_movie })
    }

    async fn remove_favorite(&self, id_user: i64, id_movie: i64) -> Result<Favorite> {
        self.record(Call::RemoveFavorite(id_user, id_movie))?;
        Ok(Favorite { id_user, id_movie })
    }
}

struct ChannelMailService {
    sent: mpsc::UnboundedSender<NewUser>,
    fail: bool,
}

#[async_trait]
impl MailService for ChannelMailService {
    async fn send_mail(&self, payload: NewUser) -> Result<()> {
        self.sent
            .send(payload)
            .map_err(|_| anyhow!("test receiver dropped"))?;
        if self.fail {
            return Err(anyhow!("smtp relay refused the message"));
        }
        Ok(())
    }
}

macro_rules! setup_route_test {
    ($users:expr, $mail_fails:expr) => {{
        let users = Arc::new($users);
        let (tx, rx) = mpsc::unbounded_channel();
        let mail = ChannelMailService {
            sent: tx,
            fail: $mail_fails,
        };
        let state = web::Data::new(AppState {
            user_service: users.clone(),
            mail_service: Arc::new(mail),
        });

        let app = test::init_service(
            App::new()
                .app_data(state)
                .wrap(JwtAuthMiddleware::new(SECRET))
                .configure(configure),
        )
        .await;

        (app, users, rx)
    }};
}

fn bearer(id: i64, scope: &str) -> (&'static str, String) {
    let token = generate_token(id, scope, SECRET, 3600).unwrap();
    ("Authorization", format!("Bearer {}", token))
}

fn valid_new_user() -> serde_json::Value {
    json!({
        "firstName": "John",
        "lastName": "Doe",
        "userName": "Johny",
        "password": "Qkf5fAbSm",
        "mail": "tartampion@gmail.com"
    })
}

#[actix_web::test]
async fn test_login_forwards_credentials() {
    let (app, users, _rx) = setup_route_test!(RecordingUserService::default(), false);

    let req = test::TestRequest::post()
        .uri("/user/login")
        .set_json(json!({ "mail": "tartampion@gmail.com", "password": "Qkf5fAbSm" }))
        .to_request();
    let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(resp["token"], "mock-token");
    assert_eq!(
        users.calls(),
        vec![Call::Login(Some("tartampion@gmail.com".to_string()))]
    );
}

#[actix_web::test]
async fn test_login_rejects_short_password_before_handler() {
    let (app, users, _rx) = setup_route_test!(RecordingUserService::default(), false);

    let req = test::TestRequest::post()
        .uri("/user/login")
        .set_json(json!({ "mail": "tartampion@gmail.com", "password": "short" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(users.calls().is_empty());
}

#[actix_web::test]
async fn test_login_rejects_invalid_mail() {
    let (app, users, _rx) = setup_route_test!(RecordingUserService::default(), false);

    let req = test::TestRequest::post()
        .uri("/user/login")
        .set_json(json!({ "mail": "not-an-address", "password": "Qkf5fAbSm" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(users.calls().is_empty());
}

#[actix_web::test]
async fn test_create_user_rejects_missing_required_fields() {
    let (app, users, _rx) = setup_route_test!(RecordingUserService::default(), false);

    for field in ["firstName", "lastName", "userName", "password"] {
        let mut body = valid_new_user();
        body.as_object_mut().unwrap().remove(field);

        let req = test::TestRequest::post()
            .uri("/user")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "missing {}", field);
    }
    assert!(users.calls().is_empty());
}

#[actix_web::test]
async fn test_create_user_rejects_short_names() {
    let (app, users, _rx) = setup_route_test!(RecordingUserService::default(), false);

    for field in ["firstName", "lastName", "userName"] {
        let mut body = valid_new_user();
        body[field] = json!("Jo");

        let req = test::TestRequest::post()
            .uri("/user")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "short {}", field);
    }
    assert!(users.calls().is_empty());
}

#[actix_web::test]
async fn test_payloads_reject_undeclared_keys() {
    let (app, users, mut rx) = setup_route_test!(RecordingUserService::default(), false);

    let mut body = valid_new_user();
    body["role"] = json!("admin");
    let req = test::TestRequest::post()
        .uri("/user")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::patch()
        .uri("/user/5")
        .insert_header(bearer(1, "admin"))
        .set_json(json!({ "id": 5, "firstname": "Jane" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/user/favorite")
        .insert_header(bearer(42, "user"))
        .set_json(json!({ "idMovie": 1, "idUser": 7 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert!(users.calls().is_empty());
    assert!(rx.try_recv().is_err());
}

#[actix_web::test]
async fn test_create_user_calls_create_once_and_sends_mail_once() {
    let (app, users, mut rx) = setup_route_test!(RecordingUserService::default(), false);

    let req = test::TestRequest::post()
        .uri("/user")
        .set_json(valid_new_user())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["userName"], "Johny");

    assert_eq!(users.calls(), vec![Call::Create("Johny".to_string())]);

    let mailed = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("welcome mail was never attempted")
        .unwrap();
    assert_eq!(mailed.mail.as_deref(), Some("tartampion@gmail.com"));
    assert!(rx.try_recv().is_err());
}

#[actix_web::test]
async fn test_create_user_succeeds_when_mail_fails() {
    let (app, users, mut rx) = setup_route_test!(RecordingUserService::default(), true);

    let req = test::TestRequest::post()
        .uri("/user")
        .set_json(valid_new_user())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let attempted = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await;
    assert!(matches!(attempted, Ok(Some(_))));
    assert_eq!(users.calls().len(), 1);
}

#[actix_web::test]
async fn test_create_user_failure_propagates_and_skips_mail() {
    let (app, _users, mut rx) = setup_route_test!(RecordingUserService::failing(), false);

    let req = test::TestRequest::post()
        .uri("/user")
        .set_json(valid_new_user())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err());
}

#[actix_web::test]
async fn test_list_users_requires_user_or_admin_scope() {
    let (app, users, _rx) = setup_route_test!(RecordingUserService::default(), false);

    let req = test::TestRequest::get().uri("/users").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/users")
        .insert_header(bearer(3, ""))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(users.calls().is_empty());

    for scope in ["user", "admin"] {
        let req = test::TestRequest::get()
            .uri("/users")
            .insert_header(bearer(3, scope))
            .to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp.as_array().unwrap().len(), 1);
        assert!(resp[0].get("password").is_none());
    }
    assert_eq!(users.calls(), vec![Call::GetAll, Call::GetAll]);
}

#[actix_web::test]
async fn test_update_user_returns_confirmation_and_defaults_role() {
    let (app, users, _rx) = setup_route_test!(RecordingUserService::default(), false);

    let req = test::TestRequest::patch()
        .uri("/user/5")
        .insert_header(bearer(1, "admin"))
        .set_json(json!({ "id": 5, "firstName": "Jane" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(body, web::Bytes::from_static(b"User edited"));

    assert_eq!(users.calls(), vec![Call::Update(5, Role::User)]);
}

#[actix_web::test]
async fn test_update_user_rejects_unknown_role() {
    let (app, users, _rx) = setup_route_test!(RecordingUserService::default(), false);

    let req = test::TestRequest::patch()
        .uri("/user/5")
        .insert_header(bearer(1, "admin"))
        .set_json(json!({ "id": 5, "role": "manager" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(users.calls().is_empty());
}

#[actix_web::test]
async fn test_update_user_accepts_empty_role() {
    let (app, users, _rx) = setup_route_test!(RecordingUserService::default(), false);

    let req = test::TestRequest::patch()
        .uri("/user/5")
        .insert_header(bearer(1, "admin"))
        .set_json(json!({ "id": 5, "role": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(users.calls(), vec![Call::Update(5, Role::None)]);
}

#[actix_web::test]
async fn test_update_user_requires_admin_scope() {
    let (app, users, _rx) = setup_route_test!(RecordingUserService::default(), false);

    let req = test::TestRequest::patch()
        .uri("/user/5")
        .insert_header(bearer(5, "user"))
        .set_json(json!({ "id": 5, "role": "admin" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(users.calls().is_empty());
}

#[actix_web::test]
async fn test_update_user_rejects_mismatched_ids() {
    let (app, users, _rx) = setup_route_test!(RecordingUserService::default(), false);

    let req = test::TestRequest::patch()
        .uri("/user/5")
        .insert_header(bearer(1, "admin"))
        .set_json(json!({ "id": 6 }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(users.calls().is_empty());
}

#[actix_web::test]
async fn test_non_integer_path_id_is_a_validation_error() {
    let (app, users, _rx) = setup_route_test!(RecordingUserService::default(), false);

    let req = test::TestRequest::patch()
        .uri("/user/abc")
        .insert_header(bearer(1, "admin"))
        .set_json(json!({ "id": 5 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("Validation error"));
    assert!(body["details"]["message"].is_string());
    assert!(users.calls().is_empty());
}

#[actix_web::test]
async fn test_delete_user_returns_confirmation() {
    let (app, users, _rx) = setup_route_test!(RecordingUserService::default(), false);

    let req = test::TestRequest::delete()
        .uri("/user/5")
        .insert_header(bearer(1, "admin"))
        .set_json(json!({ "id": 5 }))
        .to_request();
    let body = test::call_and_read_body(&app, req).await;

    assert_eq!(body, web::Bytes::from_static(b"User is been deleted"));
    assert_eq!(users.calls(), vec![Call::Delete(5)]);
}

#[actix_web::test]
async fn test_delete_user_requires_id_in_body() {
    let (app, users, _rx) = setup_route_test!(RecordingUserService::default(), false);

    let req = test::TestRequest::delete()
        .uri("/user/5")
        .insert_header(bearer(1, "admin"))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(users.calls().is_empty());
}

#[actix_web::test]
async fn test_delete_user_failure_propagates() {
    let (app, _users, _rx) = setup_route_test!(RecordingUserService::failing(), false);

    let req = test::TestRequest::delete()
        .uri("/user/5")
        .insert_header(bearer(1, "admin"))
        .set_json(json!({ "id": 5 }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn test_add_favorite_uses_caller_id() {
    let (app, users, _rx) = setup_route_test!(RecordingUserService::default(), false);

    let req = test::TestRequest::post()
        .uri("/user/favorite")
        .insert_header(bearer(42, "user"))
        .set_json(json!({ "idMovie": 1 }))
        .to_request();
    let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(resp, json!({ "idUser": 42, "idMovie": 1 }));
    assert_eq!(users.calls(), vec![Call::AddFavorite(42, 1)]);
}

#[actix_web::test]
async fn test_favorite_routes_use_caller_id() {
    let (app, users, _rx) = setup_route_test!(RecordingUserService::default(), false);

    let req = test::TestRequest::get()
        .uri("/user/favorite")
        .insert_header(bearer(42, "admin"))
        .to_request();
    let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp, json!([{ "idUser": 42, "idMovie": 1 }]));

    let req = test::TestRequest::delete()
        .uri("/user/favorite")
        .insert_header(bearer(42, "user"))
        .set_json(json!({ "idMovie": 1 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert_eq!(
        users.calls(),
        vec![Call::GetFavorites(42), Call::RemoveFavorite(42, 1)]
    );
}

#[actix_web::test]
async fn test_favorite_payload_requires_integer_movie_id() {
    let (app, users, _rx) = setup_route_test!(RecordingUserService::default(), false);

    for body in [json!({}), json!({ "idMovie": "one" }), json!({ "idMovie": 1.5 })] {
        let req = test::TestRequest::post()
            .uri("/user/favorite")
            .insert_header(bearer(42, "user"))
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {}", body);
    }
    assert!(users.calls().is_empty());
}

#[actix_web::test]
async fn test_favorite_routes_require_authentication() {
    let (app, users, _rx) = setup_route_test!(RecordingUserService::default(), false);

    let req = test::TestRequest::post()
        .uri("/user/favorite")
        .set_json(json!({ "idMovie": 1 }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(users.calls().is_empty());
}

#[actix_web::test]
async fn test_health_check() {
    let (app, _users, _rx) = setup_route_test!(RecordingUserService::default(), false);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["status"], "ok");
}

#[actix_web::test]
async fn test_openapi_document_describes_user_routes() {
    let (app, _users, _rx) = setup_route_test!(RecordingUserService::default(), false);

    let req = test::TestRequest::get().uri("/swagger.json").to_request();
    let doc: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let paths = &doc["paths"];

    let operations = [
        ("/user/login", "post"),
        ("/users", "get"),
        ("/user", "post"),
        ("/user/{id}", "patch"),
        ("/user/{id}", "delete"),
        ("/user/favorite", "get"),
        ("/user/favorite", "post"),
        ("/user/favorite", "delete"),
    ];
    for (path, method) in operations {
        let operation = &paths[path][method];
        assert!(operation.is_object(), "missing {} {}", method, path);
        assert_eq!(operation["tags"][0], "api");
    }
    assert_eq!(
        paths["/user/{id}"]["patch"]["security"][0]["bearer"],
        json!([])
    );

    let req = test::TestRequest::get()
        .uri("/documentation/")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
