//! Static form pages. Data views are served as JSON by the item handlers.

use axum::response::Html;

const START: &str = include_str!("../pages/start.html");
const REGISTER: &str = include_str!("../pages/register.html");
const LOGIN: &str = include_str!("../pages/login.html");
const FIND: &str = include_str!("../pages/find.html");

const ERROR_SLOT: &str = "<!-- error -->";

pub async fn start() -> Html<&'static str> {
    Html(START)
}

pub async fn register() -> Html<&'static str> {
    Html(REGISTER)
}

pub async fn login() -> Html<&'static str> {
    Html(LOGIN)
}

pub async fn find() -> Html<&'static str> {
    Html(FIND)
}

pub fn register_with_error(message: &'static str) -> Html<String> {
    Html(with_error(REGISTER, message))
}

pub fn login_with_error(message: &'static str) -> Html<String> {
    Html(with_error(LOGIN, message))
}

fn with_error(page: &str, message: &str) -> String {
    page.replacen(ERROR_SLOT, &format!(r#"<p class="error">{message}</p>"#), 1)
}
