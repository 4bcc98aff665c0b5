use axum::{
    Extension, Form,
    extract::{Path, State},
    response::Redirect,
};
use axum_extra::extract::WithRejection;

use findit_types::api::{Claims, ReportActionForm};

use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;

/// POST /report/{item_id}: claim to have found an item.
pub async fn submit_report(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<Redirect, ApiError> {
    let st = state.clone();
    blocking(move || Ok(st.store.submit_report(item_id, &claims.sub)?)).await?;
    Ok(Redirect::to("/list"))
}

/// POST /my_items/action: the owner accepts or rejects a report.
pub async fn handle_report(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Form(form), _): WithRejection<Form<ReportActionForm>, ApiError>,
) -> Result<Redirect, ApiError> {
    let st = state.clone();
    blocking(move || {
        Ok(st
            .store
            .resolve_report(form.item_id, &claims.sub, &form.reporter, form.decision)?)
    })
    .await?;
    Ok(Redirect::to("/my_items"))
}
