use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, Uri},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::access::RoleGuard;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{identify_caller, require_role};
use crate::state::AppState;

/// The complete HTTP surface.
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let router = Router::new()
        .merge(public_routes())
        .merge(protected_routes())
        .merge(tutor_routes())
        .merge(student_routes())
        .merge(admin_routes())
        .fallback(route_not_found)
        // Runs before every route-level guard
        .layer(from_fn_with_state(state.clone(), identify_caller))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes));

    let router = match cors_layer(&config) {
        Some(cors) => router.layer(cors),
        None => router,
    };
    let router = if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::tutor_directory))
        .route("/thankyou", get(public::thank_you))
        .route("/health", get(public::health))
        .route("/login", get(public::login_form).post(public::login))
        .route("/logout", get(public::logout).post(public::logout))
        .route("/register", post(public::register))
}

fn protected_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/request/:tutor_id",
            get(protected::request_form).post(protected::request_submit),
        )
        .route(
            "/feedback/:tutor_id",
            get(protected::feedback_form).post(protected::feedback_submit),
        )
}

fn tutor_routes() -> Router<AppState> {
    Router::new()
        .route("/tutor_dashboard", get(protected::tutor_dashboard))
        .route(
            "/handle_request_action/:request_id",
            post(protected::handle_request_action),
        )
        .route_layer(from_fn_with_state(RoleGuard::tutor(), require_role))
}

fn student_routes() -> Router<AppState> {
    Router::new()
        .route("/student_dashboard", get(protected::student_dashboard))
        .route_layer(from_fn_with_state(RoleGuard::student(), require_role))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/adminaccess",
            get(elevated::tutor_admin_list).post(elevated::tutor_admin_create),
        )
        .route(
            "/adminaccess/:tutor_id",
            get(elevated::tutor_admin_show).post(elevated::tutor_admin_update),
        )
        .route_layer(from_fn_with_state(RoleGuard::admin(), require_role))
}

fn cors_layer(config: &AppConfig) -> Option<CorsLayer> {
    if !config.security.enable_cors {
        return None;
    }
    if config.security.cors_origins.is_empty() {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
    )
}

async fn route_not_found(uri: Uri) -> impl IntoResponse {
    AppError::not_found(format!("No route for {}", uri.path()))
}
