use axum::extract::{Extension, Json, State};

use super::model::AccountOverview;
use crate::{
    AppState, error::AppError, infrastructure::brokerage::AccountSummaryRecord,
    middleware::Identity,
};

#[axum::debug_handler]
pub async fn account(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<AccountOverview>, AppError> {
    let summary = state.gateway.account_summary().await?;
    Ok(Json(AccountOverview::new(identity, &summary)))
}

#[axum::debug_handler]
pub async fn account_data(
    State(state): State<AppState>,
) -> Result<Json<Vec<AccountSummaryRecord>>, AppError> {
    let summary = state.gateway.account_summary().await?;
    tracing::debug!(rows = summary.len(), "Returning account summary");
    Ok(Json(summary))
}
