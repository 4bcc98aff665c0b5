use serde::{Deserialize, Serialize};

use crate::models::{Decision, Item};

// -- Session --

/// Claims carried by the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the logged-in account.
    pub sub: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

// -- Reports --

#[derive(Debug, Deserialize)]
pub struct ReportActionForm {
    pub item_id: i64,
    pub reporter: String,
    pub decision: Decision,
}

// -- Views --

/// Owner dashboard.
#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardView {
    pub username: String,
    pub point: i64,
}

/// Listing pages (`/list` and `/my_items`).
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemListView {
    pub username: String,
    pub user_point: i64,
    pub items: Vec<Item>,
}
