use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use findit_types::api::Claims;

use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;

pub const SESSION_COOKIE: &str = "findit_session";

const SESSION_DAYS: i64 = 30;

/// Bind `username` to the browser by setting a signed session cookie.
pub fn issue_session(jar: CookieJar, secret: &str, username: &str) -> Result<CookieJar, ApiError> {
    let claims = Claims {
        sub: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(SESSION_DAYS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("session token encoding failed: {e}")))?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    Ok(jar.add(cookie))
}

pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// Claims from a valid, unexpired session cookie, if any.
pub fn current_user(jar: &CookieJar, secret: &str) -> Option<Claims> {
    let token = jar.get(SESSION_COOKIE)?.value();
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}

/// Redirect to /login unless the request carries a session for a known user.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = current_user(&jar, &state.session_secret).ok_or(ApiError::AuthRequired)?;

    let st = state.clone();
    let name = claims.sub.clone();
    let known = blocking(move || Ok(st.store.get_user(&name)?.is_some())).await?;
    if !known {
        return Err(ApiError::AuthRequired);
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_session_resolves_to_user() {
        let jar = issue_session(CookieJar::new(), "secret", "kim").unwrap();
        let claims = current_user(&jar, "secret").unwrap();
        assert_eq!(claims.sub, "kim");
    }

    #[test]
    fn session_signed_with_other_secret_is_ignored() {
        let jar = issue_session(CookieJar::new(), "secret", "kim").unwrap();
        assert!(current_user(&jar, "another-secret").is_none());
    }

    #[test]
    fn missing_or_cleared_cookie_has_no_user() {
        assert!(current_user(&CookieJar::new(), "secret").is_none());

        let jar = issue_session(CookieJar::new(), "secret", "kim").unwrap();
        let jar = clear_session(jar);
        assert!(current_user(&jar, "secret").is_none());
    }
}
