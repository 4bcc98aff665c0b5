use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Multipart, State},
    response::Redirect,
};
use tracing::{error, warn};

use findit_types::api::{Claims, DashboardView, ItemListView};
use findit_types::models::{Item, NewItem};

use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;

/// GET /lost: the caller's dashboard.
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<DashboardView>, ApiError> {
    let point = balance(&state, &claims.sub).await?;
    Ok(Json(DashboardView {
        username: claims.sub,
        point,
    }))
}

/// GET /list: every listing, oldest first.
pub async fn list_items(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ItemListView>, ApiError> {
    let st = state.clone();
    let items = blocking(move || Ok(st.store.list_items()?)).await?;
    item_view(&state, claims, items).await
}

/// GET /my_items: listings owned by the caller.
pub async fn my_items(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ItemListView>, ApiError> {
    let st = state.clone();
    let owner = claims.sub.clone();
    let items = blocking(move || Ok(st.store.items_by_owner(&owner)?)).await?;
    item_view(&state, claims, items).await
}

/// POST /register_item: multipart form with an optional `photo` file.
///
/// A photo with a disallowed extension is dropped and the listing is still
/// created without one.
pub async fn register_item(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<Redirect, ApiError> {
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "photo" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("failed to read photo: {e}")))?;
            if !file_name.is_empty() {
                upload = Some((file_name, data.to_vec()));
            }
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::BadRequest(format!("failed to read field {name}: {e}")))?;
            fields.insert(name, value);
        }
    }

    let point = parse_point(fields.get("point").map(String::as_str))?;

    let mut photo = String::new();
    if let Some((file_name, data)) = upload {
        let created = chrono::Utc::now().timestamp();
        match state.photos.save(&file_name, &data, created).await {
            Ok(Some(stored)) => photo = stored,
            Ok(None) => {}
            Err(e) => {
                error!("Failed to save photo {:?}: {}", file_name, e);
                return Err(ApiError::Internal(format!("photo upload failed: {e}")));
            }
        }
    }

    let mut take = |key: &str| fields.remove(key).unwrap_or_default();
    let new = NewItem {
        item: take("item"),
        point,
        characteristic: take("item_characteristic"),
        start_lat: take("start_lat"),
        start_lng: take("start_lng"),
        lat: take("lat"),
        lng: take("lng"),
        start_address: take("start_address"),
        end_address: take("end_address"),
        photo,
    };

    let st = state.clone();
    let owner = claims.sub;
    blocking(move || Ok(st.store.create_item(&owner, new)?)).await?;

    Ok(Redirect::to("/list"))
}

fn parse_point(raw: Option<&str>) -> Result<i64, ApiError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    match raw.parse::<i64>() {
        Ok(point) if point >= 0 => Ok(point),
        _ => {
            warn!("Rejected listing with point value {:?}", raw);
            Err(ApiError::BadRequest("point must be a non-negative integer".into()))
        }
    }
}

async fn balance(state: &AppState, username: &str) -> Result<i64, ApiError> {
    let st = state.clone();
    let name = username.to_string();
    blocking(move || {
        st.store
            .get_user(&name)?
            .map(|user| user.point)
            .ok_or(ApiError::AuthRequired)
    })
    .await
}

async fn item_view(
    state: &AppState,
    claims: Claims,
    items: Vec<Item>,
) -> Result<Json<ItemListView>, ApiError> {
    let user_point = balance(state, &claims.sub).await?;
    Ok(Json(ItemListView {
        username: claims.sub,
        user_point,
        items,
    }))
}
