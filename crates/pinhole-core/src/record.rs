use crate::key::ShortKey;
use jiff::Timestamp;
use url::Url;

/// A persisted mapping from a short key to a URL.
///
/// Records are immutable once created; the store hands out owned copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRecord {
    /// The short key the record is stored under.
    pub key: ShortKey,
    /// The target URL, exactly as supplied at creation time.
    pub url: String,
    /// When the mapping was created.
    pub created_at: Timestamp,
}

impl MappingRecord {
    /// Creates a record stamped with the current time.
    pub fn new(key: ShortKey, url: impl Into<String>) -> Self {
        Self {
            key,
            url: url.into(),
            created_at: Timestamp::now(),
        }
    }
}

/// A `{key, url}` pair as returned by listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingSummary {
    pub key: ShortKey,
    pub url: String,
}

impl From<MappingRecord> for MappingSummary {
    fn from(record: MappingRecord) -> Self {
        Self {
            key: record.key,
            url: record.url,
        }
    }
}

/// The full set of stored mappings.
///
/// Keys whose stored value failed to decode are reported in `corrupt`
/// rather than dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingListing {
    pub mappings: Vec<MappingSummary>,
    pub corrupt: Vec<ShortKey>,
}

/// Checks that `url` parses as an absolute URL.
pub fn parse_absolute_url(url: &str) -> Result<Url, String> {
    if url.trim().is_empty() {
        return Err("URL cannot be empty".to_string());
    }

    // `Url::parse` has no base here, so relative references fail.
    Url::parse(url).map_err(|e| format!("'{url}': {e}"))
}
