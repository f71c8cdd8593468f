//! Provider handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use core_kernel::ProviderId;
use domain_providers::{
    CompleteProvider, NewProviderGraph, Provider, ProviderUpdate, ProviderWriter,
};

use crate::dto::OperationResponse;
use crate::error::{validated, ApiError};
use crate::AppState;

fn writer(state: &AppState) -> ProviderWriter {
    ProviderWriter::new((state.provider_stores)())
}

/// Lists provider rows without their children
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Provider>>, ApiError> {
    Ok(Json(writer(&state).list().await?))
}

/// Lists providers with custom fields, services, and countries resolved
pub async fn list_complete(
    State(state): State<AppState>,
) -> Result<Json<Vec<CompleteProvider>>, ApiError> {
    Ok(Json(writer(&state).list_complete().await?))
}

/// Creates a provider aggregate from the nested graph
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<NewProviderGraph>,
) -> Result<Json<OperationResponse>, ApiError> {
    let graph = validated(request)?;
    let id = writer(&state).create(graph).await?;
    Ok(Json(OperationResponse::created(id)))
}

/// Updates a provider's scalars and reconciles its custom fields
pub async fn update(
    State(state): State<AppState>,
    Json(request): Json<ProviderUpdate>,
) -> Result<(StatusCode, Json<OperationResponse>), ApiError> {
    let input = validated(request)?;
    let outcome = writer(&state).update(input).await?;
    let (code, body) = OperationResponse::from_outcome(outcome);
    Ok((code, Json(body)))
}

/// Deletes a provider, its custom fields, and its service links
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<(StatusCode, Json<OperationResponse>), ApiError> {
    let outcome = writer(&state).delete(ProviderId::new(id)).await?;
    let (code, body) = OperationResponse::from_outcome(outcome);
    Ok((code, Json(body)))
}
