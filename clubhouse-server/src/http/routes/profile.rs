//! The logged-in user's own profile

use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{routing::get, Router};
use axum_extra::extract::cookie::{CookieJar, SignedCookieJar};
use serde_json::json;

use crate::auth::session::removal_cookie;
use crate::auth::{end_session, SessionUser, Viewer};
use crate::db::{User, UserRepo};
use crate::http::error::{Bounce, PageError};
use crate::http::flash::{self, Flash};
use crate::http::render::render_page;
use crate::http::upload::{save_upload, MultipartForm};
use crate::models::ProfileUpdate;
use crate::state::AppState;

async fn load_user(state: &AppState, user_id: i64) -> Result<Option<User>, PageError> {
    state
        .transaction(move |conn| {
            Box::pin(async move { Ok(UserRepo::new(conn).find_by_id(user_id).await?) })
        })
        .await
}

/// The session outlived its user row: drop both and start over.
async fn forget(state: &AppState, signed: SignedCookieJar, user: &SessionUser) -> Response {
    tracing::warn!(user_id = user.user_id, "Session refers to a missing user");
    end_session(state.pool(), user.token).await;
    (signed.remove(removal_cookie()), Redirect::to("/login")).into_response()
}

/// GET /profile
async fn profile(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
    signed: SignedCookieJar,
) -> Result<Response, PageError> {
    let user = viewer.require(Some(Flash::warning("Please login to view your profile")))?;

    match load_user(&state, user.user_id).await? {
        Some(row) => render_page(&state, &viewer, jar, "profile", json!({ "user": row })),
        None => Ok(forget(&state, signed, &user).await),
    }
}

/// GET /edit_profile
async fn edit_profile_page(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
    signed: SignedCookieJar,
) -> Result<Response, PageError> {
    let user = viewer.require(None)?;

    match load_user(&state, user.user_id).await? {
        Some(row) => render_page(&state, &viewer, jar, "edit_profile", json!({ "user": row })),
        None => Ok(forget(&state, signed, &user).await),
    }
}

/// POST /edit_profile
async fn edit_profile(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<Response, PageError> {
    let user = viewer.require(None)?;
    let form = MultipartForm::read(multipart).await?;
    let update = ProfileUpdate::from_form(&form)
        .map_err(|err| Bounce::warning("/edit_profile", err.to_string()))?;

    let image = match form.file("profile_image") {
        Some(file) => Some(save_upload(&state.config().profile_upload_dir(), file).await?),
        None => None,
    };

    let user_id = user.user_id;
    state
        .transaction(move |conn| {
            Box::pin(async move {
                let mut users = UserRepo::new(conn);
                if let Some(image) = image {
                    users.set_profile_image(user_id, &image).await?;
                }
                users.update_profile(user_id, &update).await?;
                Ok(())
            })
        })
        .await?;

    tracing::info!(user_id, "Profile updated");
    Ok((
        flash::push(jar, Flash::success("Profile updated successfully!")),
        Redirect::to("/profile"),
    )
        .into_response())
}

/// Profile routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile))
        .route("/edit_profile", get(edit_profile_page).post(edit_profile))
}
