//! Event listing, detail and publishing

use axum::extract::{Multipart, Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{routing::get, Router};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};

use crate::auth::Viewer;
use crate::db::{DbError, EventRepo};
use crate::http::error::{Bounce, PageError};
use crate::http::flash::{self, Flash};
use crate::http::render::render_page;
use crate::http::upload::{save_or_default, MultipartForm};
use crate::models::event::DEFAULT_EVENT_IMAGE;
use crate::models::NewEvent;
use crate::state::AppState;

/// GET /events
async fn list_events(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
) -> Result<Response, PageError> {
    let events = state
        .transaction(|conn| Box::pin(async move { Ok(EventRepo::new(conn).list().await?) }))
        .await?;
    render_page(&state, &viewer, jar, "events", json!({ "events": events }))
}

/// GET /event/{id}
async fn event_detail(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<Response, PageError> {
    let event = state
        .transaction(move |conn| Box::pin(async move { Ok(EventRepo::new(conn).get(id).await?) }))
        .await;

    match event {
        Ok(event) => render_page(&state, &viewer, jar, "event_detail", json!({ "event": event })),
        Err(PageError::Database(DbError::NotFound { .. })) => {
            Err(Bounce::danger("/events", "Event not found!").into())
        }
        Err(err) => Err(err),
    }
}

/// GET /add_event
async fn add_event_page(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
) -> Result<Response, PageError> {
    let user = viewer.require(None)?;
    state.admins().require(&user, "/")?;
    render_page(&state, &viewer, jar, "add_event", Value::Null)
}

/// POST /add_event
async fn add_event(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<Response, PageError> {
    let user = viewer.require(None)?;
    state.admins().require(&user, "/")?;

    let form = MultipartForm::read(multipart).await?;
    let event = NewEvent::from_form(&form)
        .map_err(|err| Bounce::warning("/add_event", err.to_string()))?;
    let image = save_or_default(
        &state.config().image_upload_dir(),
        form.file("event_image"),
        DEFAULT_EVENT_IMAGE,
    )
    .await?;

    let event_id = state
        .transaction(move |conn| {
            Box::pin(async move { Ok(EventRepo::new(conn).insert(&event, &image).await?) })
        })
        .await?;

    tracing::info!(event_id, published_by = user.user_id, "Event published");
    Ok((
        flash::push(jar, Flash::success("Event published successfully!")),
        Redirect::to("/events"),
    )
        .into_response())
}

/// Event routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events))
        .route("/event/{id}", get(event_detail))
        .route("/add_event", get(add_event_page).post(add_event))
}
