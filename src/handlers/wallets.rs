use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::Result;
use crate::models::wallet::Wallet;
use crate::state::AppState;

/// Handles listing the wallets of an account.
#[axum::debug_handler]
pub async fn list_wallets(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<Vec<Wallet>>> {
    let wallets = state.gateway.list_wallets(account_id).await?;
    tracing::debug!(%account_id, count = wallets.len(), "Fetched wallets");
    Ok(Json(wallets))
}
