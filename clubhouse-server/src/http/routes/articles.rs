//! Article listing, detail and publishing

use axum::extract::{Multipart, Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{routing::get, Router};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde_json::{json, Value};

use crate::auth::{SessionUser, Viewer};
use crate::db::{ArticleRepo, DbError};
use crate::http::error::{Bounce, PageError};
use crate::http::flash::{self, Flash};
use crate::http::render::render_page;
use crate::http::upload::{save_or_default, MultipartForm};
use crate::models::article::DEFAULT_ARTICLE_IMAGE;
use crate::models::NewArticle;
use crate::state::AppState;

/// Logged in and on the admin list, or bounced.
fn require_publisher(state: &AppState, viewer: &Viewer) -> Result<SessionUser, Bounce> {
    let user = viewer.require(Some(Flash::warning("Login required.")))?;
    state.admins().require(&user, "/articles")?;
    Ok(user)
}

/// GET /articles
async fn list_articles(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
) -> Result<Response, PageError> {
    let articles = state
        .transaction(|conn| Box::pin(async move { Ok(ArticleRepo::new(conn).list().await?) }))
        .await?;
    render_page(&state, &viewer, jar, "articles", json!({ "articles": articles }))
}

/// GET /article/{id}
async fn article_detail(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<Response, PageError> {
    let article = state
        .transaction(move |conn| Box::pin(async move { Ok(ArticleRepo::new(conn).get(id).await?) }))
        .await;

    match article {
        Ok(article) => render_page(
            &state,
            &viewer,
            jar,
            "article_detail",
            json!({ "article": article }),
        ),
        Err(PageError::Database(DbError::NotFound { .. })) => {
            Err(Bounce::danger("/articles", "Article not found!").into())
        }
        Err(err) => Err(err),
    }
}

/// GET /add_article
async fn add_article_page(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
) -> Result<Response, PageError> {
    require_publisher(&state, &viewer)?;
    render_page(&state, &viewer, jar, "add_article", Value::Null)
}

/// POST /add_article
async fn add_article(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<Response, PageError> {
    let user = require_publisher(&state, &viewer)?;

    let form = MultipartForm::read(multipart).await?;
    let article = NewArticle::from_form(&form)
        .map_err(|err| Bounce::warning("/add_article", err.to_string()))?;
    let image = save_or_default(
        &state.config().image_upload_dir(),
        form.file("article_image"),
        DEFAULT_ARTICLE_IMAGE,
    )
    .await?;

    let created_at = Utc::now();
    let article_id = state
        .transaction(move |conn| {
            Box::pin(async move {
                Ok(ArticleRepo::new(conn)
                    .insert(&article, &image, created_at)
                    .await?)
            })
        })
        .await?;

    tracing::info!(article_id, published_by = user.user_id, "Article published");
    Ok((
        flash::push(jar, Flash::success("Article published successfully!")),
        Redirect::to("/articles"),
    )
        .into_response())
}

/// Article routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/articles", get(list_articles))
        .route("/article/{id}", get(article_detail))
        .route("/add_article", get(add_article_page).post(add_article))
}
