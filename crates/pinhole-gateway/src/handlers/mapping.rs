use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use pinhole_core::ShortenerError;
use tracing::info;

use crate::error::{AppError, Result};
use crate::model::{
    CreateMappingRequest, CreateMappingResponse, ListMappingsResponse, MappingResponse,
};
use crate::state::AppState;

pub async fn create_mapping_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateMappingRequest>,
) -> Result<(StatusCode, Json<CreateMappingResponse>)> {
    let settings = state.settings();

    if let Some(custom) = request.key.as_deref() {
        if custom.len() > settings.max_custom_key_length {
            return Err(ShortenerError::InvalidKeyFormat(format!(
                "custom key is longer than {} characters",
                settings.max_custom_key_length
            ))
            .into());
        }
    }

    let create = state
        .shortener()
        .create_mapping(&request.url, request.key.as_deref());
    let key = tokio::time::timeout(settings.create_timeout, create)
        .await
        .map_err(|_| AppError::Timeout)??;

    info!(%key, url = %request.url, "mapping created via http");

    let response = CreateMappingResponse {
        short_url: key.to_url(&settings.public_base_url),
        key: key.into(),
        url: request.url,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_mapping_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<MappingResponse>> {
    let url = state.shortener().resolve_mapping(&key).await?;
    Ok(Json(MappingResponse { key, url }))
}

pub async fn list_mappings_handler(
    State(state): State<AppState>,
) -> Result<Json<ListMappingsResponse>> {
    let listing = state.shortener().list_mappings().await?;
    Ok(Json(listing.into()))
}
