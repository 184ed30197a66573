//! Members directory and admin member creation

use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{routing::get, Router};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};

use crate::auth::{hash_password, Viewer};
use crate::db::UserRepo;
use crate::http::error::{Bounce, PageError};
use crate::http::flash::{self, Flash};
use crate::http::render::render_page;
use crate::http::upload::{save_or_default, MultipartForm};
use crate::models::account::DEFAULT_MEMBER_IMAGE;
use crate::models::{EmailAddress, MemberDetails};
use crate::state::AppState;

const ADD_MEMBER: &str = "/add_member";

/// Non-admins are sent here
const MEMBERS: &str = "/members";

/// GET /members
async fn members(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
) -> Result<Response, PageError> {
    let members = state
        .transaction(|conn| Box::pin(async move { Ok(UserRepo::new(conn).list_members().await?) }))
        .await?;
    render_page(&state, &viewer, jar, "members", json!({ "members": members }))
}

/// GET /add_member
async fn add_member_page(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
) -> Result<Response, PageError> {
    let user = viewer.require(None)?;
    state.admins().require(&user, MEMBERS)?;
    render_page(&state, &viewer, jar, "add_member", Value::Null)
}

/// POST /add_member
///
/// New members get the configured default password and are told the
/// outcome back on the same form.
async fn add_member(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<Response, PageError> {
    let admin = viewer.require(None)?;
    state.admins().require(&admin, MEMBERS)?;

    let form = MultipartForm::read(multipart).await?;
    let details = MemberDetails::from_form(&form)
        .map_err(|err| Bounce::warning(ADD_MEMBER, err.to_string()))?;
    let email = EmailAddress::parse(&details.email)
        .map_err(|err| Bounce::danger(ADD_MEMBER, format!("Invalid email: {err}")))?;

    let image = save_or_default(
        &state.config().profile_upload_dir(),
        form.file("profile_image"),
        DEFAULT_MEMBER_IMAGE,
    )
    .await?;
    let password_hash = hash_password(state.config().default_member_password.clone()).await?;

    let first_name = details.first_name.clone();
    let mut new_user = details.into_new_user(password_hash, image);
    new_user.email = email.into_string();

    let created = state
        .transaction(move |conn| {
            Box::pin(async move { Ok(UserRepo::new(conn).insert(&new_user).await?) })
        })
        .await?;

    let message = match created {
        Some(member_id) => {
            tracing::info!(member_id, added_by = admin.user_id, "Member added");
            Flash::success(format!("Member {first_name} added successfully!"))
        }
        None => Flash::danger("Error! This email exists."),
    };

    Ok((flash::push(jar, message), Redirect::to(ADD_MEMBER)).into_response())
}

/// Member routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/members", get(members))
        .route("/add_member", get(add_member_page).post(add_member))
}
