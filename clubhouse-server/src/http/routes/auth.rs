//! Login, registration and logout

use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{routing::get, Form, Router};
use axum_extra::extract::cookie::{CookieJar, SignedCookieJar};
use serde_json::Value;

use crate::auth::session::{removal_cookie, session_token};
use crate::auth::{end_session, hash_password, start_session, verify_password, Viewer};
use crate::db::{SessionRepo, UserRepo};
use crate::http::error::{Bounce, PageError};
use crate::http::flash::{self, Flash};
use crate::http::render::render_page;
use crate::models::account::{DEFAULT_ROLE, REGISTERED_PROFILE_IMAGE};
use crate::models::{check_password_strength, EmailAddress, LoginForm, NewUser, RegisterForm};
use crate::state::AppState;

/// Where logged-in visitors are sent from the login and register pages
const HOME_FOR_USERS: &str = "/profile";

fn login_failed() -> PageError {
    Bounce::danger("/login", "Email or password is not correct").into()
}

/// GET /login
async fn login_page(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
) -> Result<Response, PageError> {
    if viewer.is_logged_in() {
        return Ok(Redirect::to(HOME_FOR_USERS).into_response());
    }
    render_page(&state, &viewer, jar, "login", Value::Null)
}

/// POST /login
async fn login(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
    signed: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    if viewer.is_logged_in() {
        return Ok(Redirect::to(HOME_FOR_USERS).into_response());
    }

    let email = form.email.trim().to_owned();
    let user = state
        .transaction(move |conn| {
            Box::pin(async move { Ok(UserRepo::new(conn).find_by_email(&email).await?) })
        })
        .await?;

    let Some(user) = user else {
        tracing::info!("Login for unknown email");
        return Err(login_failed());
    };
    if !verify_password(form.password, user.password.clone()).await? {
        tracing::info!(user_id = user.id, "Login with wrong password");
        return Err(login_failed());
    }

    let user_id = user.id;
    let ttl = state.config().session_ttl();
    let secure = state.config().secure_cookies;
    let cookie = state
        .transaction(move |conn| {
            Box::pin(async move {
                let purged = SessionRepo::new(&mut *conn).purge_expired().await?;
                if purged > 0 {
                    tracing::debug!(purged, "Purged expired sessions");
                }
                Ok(start_session(conn, user_id, ttl, secure).await?)
            })
        })
        .await?;

    tracing::info!(user_id, "User logged in");
    Ok((
        signed.add(cookie),
        flash::push(jar, Flash::success("You logged in successfully!")),
        Redirect::to(HOME_FOR_USERS),
    )
        .into_response())
}

/// GET /register
async fn register_page(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
) -> Result<Response, PageError> {
    if viewer.is_logged_in() {
        return Ok(Redirect::to(HOME_FOR_USERS).into_response());
    }
    render_page(&state, &viewer, jar, "register", Value::Null)
}

/// POST /register
///
/// Checks run in order: email shape, password confirmation, password
/// strength, then the insert itself (which reports a taken email).
async fn register(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, PageError> {
    if viewer.is_logged_in() {
        return Ok(Redirect::to(HOME_FOR_USERS).into_response());
    }

    let form = form.trimmed();
    let email = EmailAddress::parse(&form.email)
        .map_err(|err| Bounce::danger("/register", format!("Invalid email: {err}")))?;
    if form.password != form.confirm_password {
        return Err(Bounce::danger("/register", "Passwords do not match!").into());
    }
    check_password_strength(&form.password)
        .map_err(|weak| Bounce::warning("/register", format!("Weak Password: {weak}")))?;

    let new_user = NewUser {
        first_name: form.first_name,
        last_name: form.last_name,
        email: email.into_string(),
        phone_number: Some(form.phone_number).filter(|p| !p.is_empty()),
        password_hash: hash_password(form.password).await?,
        role: Some(DEFAULT_ROLE.to_owned()),
        team: None,
        profile_image: REGISTERED_PROFILE_IMAGE.to_owned(),
    };

    let created = state
        .transaction(move |conn| {
            Box::pin(async move { Ok(UserRepo::new(conn).insert(&new_user).await?) })
        })
        .await?;

    match created {
        Some(user_id) => {
            tracing::info!(user_id, "Account registered");
            Ok((
                flash::push(jar, Flash::success("Account created successfully! Please login.")),
                Redirect::to("/login"),
            )
                .into_response())
        }
        None => Err(Bounce::warning("/register", "Email already used! Please login.").into()),
    }
}

/// GET /logout
async fn logout(State(state): State<AppState>, jar: CookieJar, signed: SignedCookieJar) -> Response {
    if let Some(token) = session_token(&signed) {
        end_session(state.pool(), token).await;
        tracing::info!("User logged out");
    }

    (
        signed.remove(removal_cookie()),
        flash::push(jar, Flash::info("You have been logged out!")),
        Redirect::to("/login"),
    )
        .into_response()
}

/// Account routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/register", get(register_page).post(register))
        .route("/logout", get(logout))
}
