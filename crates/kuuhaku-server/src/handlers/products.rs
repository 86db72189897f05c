//! Product ingestion handlers.

use axum::{extract::State, http::StatusCode, Json};

use kuuhaku_catalog::product::ProductSubmission;

use crate::error::ApiError;
use crate::extract::JsonOrForm;
use crate::ingest::{IngestOutcome, ProductPayload};
use crate::state::AppState;

/// `POST /add-item`
///
/// 201 with the new product, or 200 with the record already stored under
/// the same product URL.
pub async fn add_item(
    State(state): State<AppState>,
    JsonOrForm(submission): JsonOrForm<ProductSubmission>,
) -> Result<(StatusCode, Json<ProductPayload>), ApiError> {
    let outcome = state.ingest.ingest(submission).await?;
    let status = match outcome {
        IngestOutcome::Created(_) => StatusCode::CREATED,
        IngestOutcome::Existing(_) => StatusCode::OK,
    };
    Ok((status, Json(ProductPayload::from(outcome.item()))))
}

/// `GET /list`
pub async fn list_items(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductPayload>>, ApiError> {
    Ok(Json(state.ingest.list().await?))
}
