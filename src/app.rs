use std::path::Path;

use axum::{
    handler::HandlerWithoutStateExt,
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, get_service, MethodRouter},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers::{protected, public};
use crate::middleware::{error_handler, handle_panic, jwt_auth_middleware, not_found_handler};
use crate::state::AppState;

/// Build the full HTTP application.
///
/// Layer order, outermost first: CORS, request tracing, error normalizer,
/// panic catcher, then routes. Anything no route accepts, including an
/// unsupported method on a known path, ends in the 404 handler.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let public_dir = state.config.server.public_dir.clone();

    let router = Router::new()
        .route("/health", routed(get(public::health::health)))
        .merge(auth_routes(state.clone()))
        .merge(cohort_routes())
        .merge(student_routes());

    let router = match public_dir {
        Some(dir) => router
            .route(
                "/docs",
                routed(get_service(ServeFile::new(Path::new(&dir).join("docs.html")))),
            )
            .fallback_service(
                ServeDir::new(dir)
                    .call_fallback_on_method_not_allowed(true)
                    .fallback(not_found_handler.into_service()),
            ),
        None => router.fallback(not_found_handler),
    };

    router
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(from_fn(error_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn auth_routes(state: AppState) -> Router<AppState> {
    use axum::routing::post;
    use public::auth;

    Router::new()
        .route("/auth", routed(get(auth::index)))
        .route("/auth/signup", routed(post(auth::signup)))
        .route("/auth/login", routed(post(auth::login)))
        .route(
            "/auth/verify",
            routed(
                get(protected::auth::verify)
                    .route_layer(from_fn_with_state(state, jwt_auth_middleware)),
            ),
        )
}

fn cohort_routes() -> Router<AppState> {
    use public::cohorts;

    Router::new()
        .route("/api/cohorts", routed(get(cohorts::list).post(cohorts::create)))
        .route(
            "/api/cohorts/:cohortId",
            routed(
                get(cohorts::show)
                    .put(cohorts::update)
                    .delete(cohorts::delete),
            ),
        )
}

fn student_routes() -> Router<AppState> {
    use public::students;

    Router::new()
        .route("/api/students", routed(get(students::list).post(students::create)))
        .route(
            "/api/students/cohort/:cohortId",
            routed(get(students::list_by_cohort)),
        )
        .route(
            "/api/students/:studentId",
            routed(
                get(students::show)
                    .put(students::update)
                    .delete(students::delete),
            ),
        )
}

// Unsupported methods on a known path answer like an unknown route
fn routed(method_router: MethodRouter<AppState>) -> MethodRouter<AppState> {
    method_router.fallback(not_found_handler)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.is_development() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
