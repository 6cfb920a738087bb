pub mod auth;
pub mod config;
pub mod db;
pub mod dtos;
pub mod handlers;
pub mod location;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method, Request},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Json, Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    create_ip_rate_limiter, ip_rate_limit_middleware, metrics_middleware, request_id_middleware,
    security_headers_middleware, IpRateLimiter, REQUEST_ID_HEADER,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::AuthGate;
use crate::config::{ActivityConfig, Environment, SwaggerMode};
use crate::services::{AccountService, ActivityService, JwtService, LocationService, Store};

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        handlers::metrics::metrics,
        handlers::auth::login,
        handlers::auth::register,
        handlers::auth::me,
        handlers::activities::list_activities,
        handlers::activities::get_activity,
        handlers::activities::create_activity,
        handlers::activities::update_activity,
        handlers::activities::delete_activity,
        handlers::activities::list_staff,
        handlers::locations::list_locations,
        handlers::locations::zones,
        handlers::locations::subzones,
        handlers::locations::stores,
        handlers::locations::companies,
        handlers::locations::options,
        handlers::locations::resolve,
        handlers::locations::create_location,
        handlers::locations::update_location,
        handlers::locations::delete_location,
        handlers::accounts::list_accounts,
        handlers::accounts::create_account,
        handlers::accounts::update_account,
        handlers::accounts::deactivate_account,
        handlers::accounts::delete_account,
        handlers::dashboard::dashboard,
    ),
    components(
        schemas(
            dtos::ErrorResponse,
            dtos::auth::LoginRequest,
            dtos::auth::LoginResponse,
            dtos::auth::RegisterRequest,
            dtos::auth::ProfileResponse,
            dtos::accounts::CreateAccountRequest,
            dtos::accounts::UpdateAccountRequest,
            dtos::activities::CreateActivityRequest,
            dtos::activities::UpdateActivityRequest,
            dtos::locations::LocationRequest,
            dtos::locations::ResolveResponse,
            models::Role,
            models::AccountView,
            models::ActivityStatus,
            models::ActivityView,
            models::LocationCombination,
            models::LocationSelection,
            location::CascadeOptions,
            services::DashboardSummary,
            services::dashboard::StatusCount,
            services::dashboard::ZoneCount,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Sign-in, self-registration and the current principal"),
        (name = "Activities", description = "Support activities"),
        (name = "Locations", description = "Zone / subzone / store / company catalogue"),
        (name = "Accounts", description = "Account administration (super_admin)"),
        (name = "Dashboard", description = "Activity statistics"),
        (name = "Observability", description = "Service health and monitoring"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: ActivityConfig,
    pub store: Arc<dyn Store>,
    pub jwt: JwtService,
    pub gate: AuthGate,
    pub accounts: AccountService,
    pub activities: ActivityService,
    pub locations: LocationService,
    pub login_rate_limiter: IpRateLimiter,
    pub register_rate_limiter: IpRateLimiter,
    pub ip_rate_limiter: IpRateLimiter,
}

impl AppState {
    pub fn new(config: ActivityConfig, store: Arc<dyn Store>, jwt: JwtService) -> Self {
        let limits = &config.rate_limit;
        let login_rate_limiter =
            create_ip_rate_limiter(limits.login_attempts, limits.login_window_seconds);
        let register_rate_limiter =
            create_ip_rate_limiter(limits.register_attempts, limits.register_window_seconds);
        let ip_rate_limiter =
            create_ip_rate_limiter(limits.global_ip_limit, limits.global_ip_window_seconds);

        Self {
            gate: AuthGate::new(jwt.clone(), store.clone()),
            accounts: AccountService::new(store.clone(), jwt.clone()),
            activities: ActivityService::new(store.clone(), config.staff.clone()),
            locations: LocationService::new(store.clone()),
            config,
            store,
            jwt,
            login_rate_limiter,
            register_rate_limiter,
            ip_rate_limiter,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    // Login sits outside the gate: it is how a token is obtained.
    let login_route = Router::new()
        .route("/api/login", post(handlers::auth::login))
        .layer(from_fn_with_state(
            state.login_rate_limiter.clone(),
            ip_rate_limit_middleware,
        ));

    let register_route = Router::new()
        .route("/api/register", post(handlers::auth::register))
        .layer(from_fn_with_state(
            state.register_rate_limiter.clone(),
            ip_rate_limit_middleware,
        ));

    let gated = Router::new()
        .route("/api/me", get(handlers::auth::me))
        .route(
            "/api/activities",
            get(handlers::activities::list_activities).post(handlers::activities::create_activity),
        )
        .route(
            "/api/activities/:id",
            get(handlers::activities::get_activity)
                .put(handlers::activities::update_activity)
                .delete(handlers::activities::delete_activity),
        )
        .route("/api/staff", get(handlers::activities::list_staff))
        .route(
            "/api/locations",
            get(handlers::locations::list_locations).post(handlers::locations::create_location),
        )
        .route("/api/locations/zones", get(handlers::locations::zones))
        .route("/api/locations/subzones", get(handlers::locations::subzones))
        .route("/api/locations/stores", get(handlers::locations::stores))
        .route("/api/locations/companies", get(handlers::locations::companies))
        .route("/api/locations/options", get(handlers::locations::options))
        .route("/api/locations/resolve", get(handlers::locations::resolve))
        .route(
            "/api/locations/:id",
            put(handlers::locations::update_location).delete(handlers::locations::delete_location),
        )
        .route(
            "/api/accounts",
            get(handlers::accounts::list_accounts).post(handlers::accounts::create_account),
        )
        .route(
            "/api/accounts/:id",
            put(handlers::accounts::update_account).delete(handlers::accounts::deactivate_account),
        )
        .route(
            "/api/accounts/:id/permanent",
            delete(handlers::accounts::delete_account),
        )
        .route("/api/dashboard", get(handlers::dashboard::dashboard))
        .merge(register_route)
        .layer(from_fn_with_state(
            state.clone(),
            middleware::gate_middleware,
        ));

    let mut app = Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(handlers::metrics::metrics));

    let swagger_enabled = match state.config.environment {
        Environment::Dev => true,
        Environment::Prod => state.config.swagger.enabled == SwaggerMode::Public,
    };

    if swagger_enabled {
        app = app.merge(SwaggerUi::new("/docs").url("/.well-known/openapi.json", ApiDoc::openapi()));
    } else {
        app = app.route(
            "/.well-known/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        );
    }

    app.merge(login_route)
        .merge(gated)
        .with_state(state.clone())
        .layer(from_fn_with_state(
            state.ip_rate_limiter.clone(),
            ip_rate_limit_middleware,
        ))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    account_id = tracing::field::Empty,
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors_layer(&state.config.security.allowed_origins))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origin = if allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::error!(origin = %o, error = %e, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

/// Service health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
        (status = 503, description = "Service is unhealthy")
    ),
    tag = "Observability"
)]
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.store.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "Storage health check failed");
        AppError::ServiceUnavailable
    })?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "environment": format!("{:?}", state.config.environment),
        "checks": {
            "database": "up"
        }
    })))
}
