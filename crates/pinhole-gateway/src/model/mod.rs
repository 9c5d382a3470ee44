mod health;
mod mapping;

pub use health::HealthResponse;
pub use mapping::{
    CreateMappingRequest, CreateMappingResponse, ErrorResponse, ListMappingsResponse,
    MappingResponse,
};
