use std::sync::Arc;
use std::time::Duration;

use pinhole_core::Shortener;
use typed_builder::TypedBuilder;

/// HTTP-level settings that the core does not own.
#[derive(Debug, Clone, TypedBuilder)]
pub struct GatewaySettings {
    /// Base URL that short keys are appended to in responses.
    #[builder(setter(into))]
    pub public_base_url: String,
    /// Upper bound on one create request, allocation included.
    #[builder(default = Duration::from_secs(5))]
    pub create_timeout: Duration,
    /// Longest custom key accepted.
    #[builder(default = 64)]
    pub max_custom_key_length: usize,
}

#[derive(Clone)]
pub struct AppState {
    shortener: Arc<dyn Shortener>,
    settings: Arc<GatewaySettings>,
}

impl AppState {
    pub fn new(shortener: Arc<dyn Shortener>, settings: GatewaySettings) -> Self {
        Self {
            shortener,
            settings: Arc::new(settings),
        }
    }

    pub fn shortener(&self) -> &dyn Shortener {
        self.shortener.as_ref()
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }
}
