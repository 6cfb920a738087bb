//! Shared setup for router-level tests: an in-memory store seeded with one
//! account per role and a small location catalogue.

#![allow(dead_code)]

use activity_service::{
    build_router,
    config::{
        ActivityConfig, DatabaseConfig, Environment, JwtConfig, RateLimitConfig, SecurityConfig,
        SwaggerConfig, SwaggerMode, DEFAULT_STAFF,
    },
    models::{LocationSelection, NewAccount, Role},
    services::{AccountStore, InMemoryStore, JwtService, LocationStore},
    utils::{hash_password, Password, PasswordHashString},
    AppState,
};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use tower::ServiceExt;

pub const PASSWORD: &str = "secreto1";

pub const SUPER_ADMIN_EMAIL: &str = "root@example.com";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const USER_EMAIL: &str = "user@example.com";
pub const INACTIVE_ADMIN_EMAIL: &str = "former@example.com";

// Catalogue ids, in insertion order.
pub const CARACAS: i64 = 1;
pub const CHACAO_SHOEBOX_GG: i64 = 2;
pub const CHACAO_SHOEBOX_EE: i64 = 3;
pub const CHACAO_FOREVER_HH: i64 = 4;
pub const CHACAO_FOREVER_AA: i64 = 5;
pub const CHACAO_ILAHUI_JJ: i64 = 6;
pub const CENTRO_PLAZA_MRPRICE_CC: i64 = 7;
pub const VALENCIA_SHOEBOX_GG: i64 = 8;

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

pub fn test_config() -> ActivityConfig {
    ActivityConfig {
        common: service_core::config::Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
        },
        environment: Environment::Dev,
        service_name: "activity-service-test".to_string(),
        service_version: "test".to_string(),
        log_level: "error".to_string(),
        otlp_endpoint: None,
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout_seconds: 1,
        },
        jwt: JwtConfig {
            private_key_path: fixture_path("jwt_test_private.pem"),
            public_key_path: fixture_path("jwt_test_public.pem"),
            access_token_expiry_minutes: 60,
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        swagger: SwaggerConfig {
            enabled: SwaggerMode::Public,
        },
        rate_limit: RateLimitConfig {
            login_attempts: 3,
            login_window_seconds: 900,
            register_attempts: 3,
            register_window_seconds: 3600,
            global_ip_limit: 1000,
            global_ip_window_seconds: 60,
        },
        staff: DEFAULT_STAFF.iter().map(|s| s.to_string()).collect(),
        bootstrap: None,
    }
}

/// Argon2 is slow in debug builds; every seeded account shares one hash.
fn shared_hash() -> PasswordHashString {
    static HASH: OnceLock<PasswordHashString> = OnceLock::new();
    HASH.get_or_init(|| hash_password(&Password::new(PASSWORD)).expect("hash test password"))
        .clone()
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub jwt: JwtService,
    pub super_admin_id: i64,
    pub admin_id: i64,
    pub user_id: i64,
    pub inactive_admin_id: i64,
}

impl TestApp {
    pub async fn new() -> Self {
        let config = test_config();
        let store = Arc::new(InMemoryStore::new());
        let jwt = JwtService::new(&config.jwt).expect("load test keys");

        let super_admin_id = seed_account(&store, SUPER_ADMIN_EMAIL, Role::SuperAdmin, true).await;
        let admin_id = seed_account(&store, ADMIN_EMAIL, Role::Admin, true).await;
        let user_id = seed_account(&store, USER_EMAIL, Role::User, true).await;
        let inactive_admin_id =
            seed_account(&store, INACTIVE_ADMIN_EMAIL, Role::Admin, false).await;
        seed_catalogue(&store).await;

        let state = AppState::new(config, store.clone(), jwt.clone());
        Self {
            router: build_router(state),
            store,
            jwt,
            super_admin_id,
            admin_id,
            user_id,
            inactive_admin_id,
        }
    }

    /// Token for an account as issued at login time.
    pub fn token(&self, account_id: i64, role: Role) -> String {
        self.jwt
            .generate_access_token(account_id, role)
            .expect("sign test token")
    }

    pub fn super_admin_token(&self) -> String {
        self.token(self.super_admin_id, Role::SuperAdmin)
    }

    pub fn admin_token(&self) -> String {
        self.token(self.admin_id, Role::Admin)
    }

    pub fn user_token(&self) -> String {
        self.token(self.user_id, Role::User)
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }
}

async fn seed_account(store: &InMemoryStore, email: &str, role: Role, active: bool) -> i64 {
    store
        .insert_account(NewAccount {
            email: email.to_string(),
            name: email.split('@').next().unwrap_or(email).to_string(),
            password_hash: shared_hash(),
            role,
            active,
        })
        .await
        .expect("seed account")
        .id
}

async fn seed_catalogue(store: &InMemoryStore) {
    let rows: [(&str, Option<&str>, Option<&str>, Option<&str>); 8] = [
        ("Caracas", None, None, None),
        ("Caracas", Some("Sambil Chacao"), Some("SHOE BOX"), Some("GG CCS 2024, C.A.")),
        ("Caracas", Some("Sambil Chacao"), Some("SHOE BOX"), Some("EE CCS 2024, C.A.")),
        ("Caracas", Some("Sambil Chacao"), Some("FOREVER 21"), Some("HH CCS 2024, C.A.")),
        ("Caracas", Some("Sambil Chacao"), Some("FOREVER 21"), Some("AA CCS OUTLET 2025, C.A.")),
        ("Caracas", Some("Sambil Chacao"), Some("ILAHUI"), Some("JJ CCS 2024, C.A.")),
        ("Caracas", Some("Centro Plaza"), Some("MR PRICE"), Some("CC CCS 2022, C.A.")),
        ("Valencia", Some("Sambil Valencia"), Some("SHOE BOX"), Some("GG VAL 2024, C.A.")),
    ];

    for (zone, subzone, shop, company) in rows {
        store
            .insert_location(&LocationSelection {
                zone: Some(zone.to_string()),
                subzone: subzone.map(str::to_string),
                store: shop.map(str::to_string),
                company: company.map(str::to_string),
            })
            .await
            .expect("seed location");
    }
}
