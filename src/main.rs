use axum::{middleware::from_fn, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use bootcamp_api::handlers::{auth, bootcamps, courses, reviews, users};
use bootcamp_api::middleware::auth::require_auth;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    let config = bootcamp_api::config::config();
    tracing_subscriber::fmt::init();
    tracing::info!("Starting bootcamp API in {:?} mode", config.environment);

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(5000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    let api = Router::new()
        .merge(bootcamp_routes())
        .merge(course_routes())
        .merge(review_routes())
        .merge(user_routes())
        .merge(auth_routes());

    let mut router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http());

    if bootcamp_api::config::config().security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router
}

fn bootcamp_routes() -> Router {
    use axum::routing::post;

    let public = Router::new()
        .route("/bootcamps", get(bootcamps::list))
        .route("/bootcamps/:id", get(bootcamps::get))
        .route("/bootcamps/radius/:zipcode/:distance", get(bootcamps::radius));

    let protected = Router::new()
        .route("/bootcamps", post(bootcamps::create))
        .route(
            "/bootcamps/:id",
            axum::routing::patch(bootcamps::update).delete(bootcamps::delete),
        )
        .route_layer(from_fn(require_auth));

    public.merge(protected)
}

fn course_routes() -> Router {
    use axum::routing::post;

    let public = Router::new()
        .route("/courses", get(courses::list))
        .route("/courses/:id", get(courses::get))
        .route("/bootcamps/:bootcampId/courses", get(courses::list_by_bootcamp));

    let protected = Router::new()
        .route("/bootcamps/:bootcampId/courses", post(courses::create))
        .route(
            "/courses/:id",
            axum::routing::patch(courses::update).delete(courses::delete),
        )
        .route_layer(from_fn(require_auth));

    public.merge(protected)
}

fn review_routes() -> Router {
    use axum::routing::post;

    let public = Router::new()
        .route("/reviews", get(reviews::list))
        .route("/reviews/:id", get(reviews::get))
        .route("/bootcamps/:bootcampId/reviews", get(reviews::list_by_bootcamp));

    let protected = Router::new()
        .route("/bootcamps/:bootcampId/reviews", post(reviews::create))
        .route(
            "/reviews/:id",
            axum::routing::patch(reviews::update).delete(reviews::delete),
        )
        .route_layer(from_fn(require_auth));

    public.merge(protected)
}

fn user_routes() -> Router {
    // Role enforcement happens in the handlers; authentication here.
    Router::new()
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/:id",
            get(users::get).patch(users::update).delete(users::delete),
        )
        .route_layer(from_fn(require_auth))
}

fn auth_routes() -> Router {
    use axum::routing::{patch, post, put};

    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", get(auth::logout))
        .route("/auth/forgotpassword", post(auth::forgot_password))
        .route("/auth/resetpassword/:token", put(auth::reset_password));

    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/updatedetails", patch(auth::update_details))
        .route("/auth/updatepassword", put(auth::update_password))
        .route_layer(from_fn(require_auth));

    public.merge(protected)
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Bootcamp Directory API",
            "version": version,
            "endpoints": {
                "bootcamps": "/api/v1/bootcamps",
                "courses": "/api/v1/courses",
                "reviews": "/api/v1/reviews",
                "users": "/api/v1/users (admin)",
                "auth": "/api/v1/auth/*",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match bootcamp_api::db::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
