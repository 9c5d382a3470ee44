use pinhole_core::{MappingListing, MappingSummary};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct CreateMappingRequest {
    pub url: String,
    /// Optional custom short key.
    pub key: Option<String>,
}

#[derive(Serialize)]
pub struct CreateMappingResponse {
    pub key: String,
    pub short_url: String,
    pub url: String,
}

#[derive(Serialize)]
pub struct MappingResponse {
    pub key: String,
    pub url: String,
}

impl From<MappingSummary> for MappingResponse {
    fn from(value: MappingSummary) -> Self {
        Self {
            key: value.key.into(),
            url: value.url,
        }
    }
}

#[derive(Serialize)]
pub struct ListMappingsResponse {
    pub mappings: Vec<MappingResponse>,
    /// Keys whose stored record could not be decoded.
    pub corrupt: Vec<String>,
}

impl From<MappingListing> for ListMappingsResponse {
    fn from(value: MappingListing) -> Self {
        Self {
            mappings: value.mappings.into_iter().map(Into::into).collect(),
            corrupt: value.corrupt.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}
