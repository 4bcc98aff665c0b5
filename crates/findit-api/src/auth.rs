use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
    Extension, Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::{WithRejection, cookie::CookieJar};
use rand_core::OsRng;
use tracing::{info, warn};

use findit_store::Store;
use findit_types::api::{Claims, LoginForm, RegisterForm};

use crate::error::ApiError;
use crate::middleware::{clear_session, issue_session};
use crate::uploads::PhotoStorage;
use crate::blocking;

const MAX_USERNAME_CHARS: usize = 32;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: Store,
    pub photos: PhotoStorage,
    pub session_secret: String,
}

/// POST /register: create an account and log it in.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Form(form), _): WithRejection<Form<RegisterForm>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let username = form.username.trim().to_string();
    let chars = username.chars().count();
    if chars == 0 || chars > MAX_USERNAME_CHARS {
        return Err(ApiError::BadRequest(format!(
            "username must be 1 to {MAX_USERNAME_CHARS} characters"
        )));
    }
    if form.password.is_empty() {
        return Err(ApiError::BadRequest("password must not be empty".into()));
    }

    let st = state.clone();
    let name = username.clone();
    blocking(move || {
        let hash = hash_password(&form.password)?;
        st.store.create_user(&name, &hash)?;
        Ok(())
    })
    .await?;

    let jar = issue_session(jar, &state.session_secret, &username)?;
    Ok((jar, Redirect::to("/lost")))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Form(form), _): WithRejection<Form<LoginForm>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let username = form.username.trim().to_string();

    let st = state.clone();
    let name = username.clone();
    let verified = blocking(move || {
        let Some(user) = st.store.get_user(&name)? else {
            return Ok(false);
        };
        Ok(verify_password(&form.password, &user.password))
    })
    .await?;

    if !verified {
        warn!("Failed login for {}", username);
        return Err(ApiError::InvalidCredentials);
    }

    info!("{} logged in", username);
    let jar = issue_session(jar, &state.session_secret, &username)?;
    Ok((jar, Redirect::to("/lost")))
}

/// GET /logout
pub async fn logout(Extension(claims): Extension<Claims>, jar: CookieJar) -> impl IntoResponse {
    info!("{} logged out", claims.sub);
    (clear_session(jar), Redirect::to("/"))
}

/// Hash a password with Argon2id and a fresh salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

/// Check `password` against a stored PHC string. The comparison is constant-time.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let parsed = match PasswordHash::new(stored) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Stored password is not a valid hash: {}", e);
            return false;
        }
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
