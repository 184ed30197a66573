//! Axum server setup
//!
//! Server skeleton with:
//! - Upload directories and schema prepared before binding
//! - Tracing middleware and a body limit sized for image uploads
//! - Flash carry-over so redirects keep messages already queued
//! - Graceful shutdown on SIGTERM/Ctrl+C

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::flash;
use super::routes;
use super::upload::{ensure_dirs, UploadError};
use crate::config::SiteConfig;
use crate::db::{create_pool, migrations};
use crate::state::AppState;

/// URL prefix uploaded images are served under
pub const UPLOADS_PATH: &str = "/static/uploads";

/// Build the application router with all routes.
pub fn build_router(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.config().upload_root);
    let body_limit = state.config().max_upload_bytes;

    Router::new()
        .merge(routes::health::router())
        .merge(routes::home::router())
        .merge(routes::auth::router())
        .merge(routes::profile::router())
        .merge(routes::members::router())
        .merge(routes::events::router())
        .merge(routes::articles::router())
        .nest_service(UPLOADS_PATH, uploads)
        .layer(middleware::from_fn(flash::carry_over))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the site until a shutdown signal arrives.
///
/// # Example
///
/// ```ignore
/// let config = SiteConfig::load(None)?;
/// run_server(config).await?;
/// ```
pub async fn run_server(config: SiteConfig) -> Result<(), ServerError> {
    ensure_dirs(&[config.profile_upload_dir(), config.image_upload_dir()]).await?;
    tracing::info!(upload_root = %config.upload_root.display(), "Upload directories ready");

    if config.uses_default_secret() {
        tracing::warn!("Using the built-in secret key; set SECRET_KEY before exposing the site");
    }

    let pool = create_pool(&config.database_url, config.max_connections).await?;
    migrations::run(&pool).await?;
    tracing::info!("Database schema ready");

    let bind_addr = config.bind_addr;
    let state = AppState::new(pool, config);
    tracing::info!(admins = state.admins().len(), "Admin allowlist loaded");
    let app = build_router(state);

    // Bind listener
    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    // Run with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
///
/// A handler that cannot be installed never fires; the other still can.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("upload directory error: {0}")]
    Upload(#[from] UploadError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_lazy_pool;
    use crate::http::flash::{self, Flash, FLASH_COOKIE};
    use axum::body::Body;
    use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use tower::ServiceExt;

    /// Router over a pool that never connects; every request below stays
    /// clear of the database.
    fn app(upload_root: &std::path::Path) -> Router {
        let config = SiteConfig {
            upload_root: upload_root.to_path_buf(),
            ..SiteConfig::default()
        };
        let pool = create_lazy_pool("postgres://clubhouse@127.0.0.1:1/clubhouse", 1).unwrap();
        build_router(AppState::new(pool, config))
    }

    async fn send(app: Router, request: Request<Body>) -> Response {
        app.oneshot(request).await.unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers().get(LOCATION).unwrap().to_str().unwrap()
    }

    fn flashes(response: &Response) -> Vec<Flash> {
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .filter_map(|pair| pair.split_once('='))
            .find(|(name, _)| *name == FLASH_COOKIE)
            .map(|(_, value)| flash::decode(value))
            .unwrap_or_default()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn login_page_renders_for_anonymous() {
        let dir = tempfile::tempdir().unwrap();
        let response = send(app(dir.path()), get("/login")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("data-page=\"login\""));
        assert!(body.contains("\"logged_in\":false"));
    }

    #[tokio::test]
    async fn pending_flash_is_shown_once() {
        let dir = tempfile::tempdir().unwrap();
        let cookie = format!(
            "{}={}",
            FLASH_COOKIE,
            flash::encode(&[Flash::danger("Email or password is not correct")])
        );
        let request = Request::builder()
            .uri("/login")
            .header(COOKIE, cookie)
            .body(Body::empty())
            .unwrap();

        let response = send(app(dir.path()), request).await;
        let cleared = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.starts_with(&format!("{}=;", FLASH_COOKIE)) || v.contains("Max-Age=0"));
        assert!(cleared);
        let body = body_text(response).await;
        assert!(body.contains("flash-danger"));
        assert!(body.contains("Email or password is not correct"));
    }

    #[tokio::test]
    async fn profile_requires_login() {
        let dir = tempfile::tempdir().unwrap();
        let response = send(app(dir.path()), get("/profile")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
        assert_eq!(
            flashes(&response),
            vec![Flash::warning("Please login to view your profile")]
        );
    }

    #[tokio::test]
    async fn bounce_keeps_waiting_flashes() {
        let dir = tempfile::tempdir().unwrap();
        let cookie = format!(
            "{}={}",
            FLASH_COOKIE,
            flash::encode(&[Flash::success("Article added successfully!")])
        );
        let request = Request::builder()
            .uri("/profile")
            .header(COOKIE, cookie)
            .body(Body::empty())
            .unwrap();

        let response = send(app(dir.path()), request).await;
        assert_eq!(location(&response), "/login");
        assert_eq!(
            flashes(&response),
            vec![
                Flash::success("Article added successfully!"),
                Flash::warning("Please login to view your profile"),
            ]
        );
    }

    #[tokio::test]
    async fn admin_pages_require_login() {
        let dir = tempfile::tempdir().unwrap();
        for uri in ["/add_event", "/add_member", "/edit_profile"] {
            let response = send(app(dir.path()), get(uri)).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(location(&response), "/login", "{uri}");
        }

        let response = send(app(dir.path()), get("/add_article")).await;
        assert_eq!(location(&response), "/login");
        assert_eq!(flashes(&response), vec![Flash::warning("Login required.")]);
    }

    #[tokio::test]
    async fn multipart_post_requires_login() {
        let dir = tempfile::tempdir().unwrap();
        let request = Request::builder()
            .method("POST")
            .uri("/edit_profile")
            .header(CONTENT_TYPE, "multipart/form-data; boundary=XYZ")
            .body(Body::from("--XYZ--\r\n"))
            .unwrap();
        let response = send(app(dir.path()), request).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn register_rejects_mismatched_passwords() {
        let dir = tempfile::tempdir().unwrap();
        let body = "first_name=Ada&last_name=Lovelace&email=ada%40club.org\
                    &password=Secret123&confirm_password=Secret124";
        let response = send(app(dir.path()), post_form("/register", body)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/register");
        assert_eq!(flashes(&response), vec![Flash::danger("Passwords do not match!")]);
    }

    #[tokio::test]
    async fn register_rejects_invalid_email() {
        let dir = tempfile::tempdir().unwrap();
        let body = "first_name=Ada&email=not-an-email&password=Secret123&confirm_password=Secret123";
        let response = send(app(dir.path()), post_form("/register", body)).await;
        assert_eq!(location(&response), "/register");
        let flashes = flashes(&response);
        assert_eq!(flashes.len(), 1);
        assert!(flashes[0].message.starts_with("Invalid email: "));
    }

    #[tokio::test]
    async fn register_reports_weak_password() {
        let dir = tempfile::tempdir().unwrap();
        let body = "first_name=Ada&email=ada%40club.org&password=Secretabc&confirm_password=Secretabc";
        let response = send(app(dir.path()), post_form("/register", body)).await;
        assert_eq!(location(&response), "/register");
        assert_eq!(
            flashes(&response),
            vec![Flash::warning("Weak Password: Missing digit.")]
        );
    }

    #[tokio::test]
    async fn logout_without_session_still_redirects() {
        let dir = tempfile::tempdir().unwrap();
        let response = send(app(dir.path()), get("/logout")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
        assert_eq!(flashes(&response), vec![Flash::info("You have been logged out!")]);
    }

    #[tokio::test]
    async fn serves_uploaded_images() {
        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("images");
        std::fs::create_dir_all(&images).unwrap();
        std::fs::write(images.join("poster.png"), b"png bytes").unwrap();

        let response = send(app(dir.path()), get("/static/uploads/images/poster.png")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "png bytes");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let response = send(app(dir.path()), get("/nope")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
