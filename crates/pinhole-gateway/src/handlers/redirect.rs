use axum::extract::{Path, State};
use axum::response::Redirect;
use pinhole_core::record::parse_absolute_url;
use pinhole_core::ShortenerError;
use tracing::debug;

use crate::error::Result;
use crate::state::AppState;

pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Redirect> {
    let url = state.shortener().resolve_mapping(&key).await?;

    // `Location` takes the serialized form: control characters stripped,
    // hosts in punycode, non-ASCII percent-encoded.
    let location = parse_absolute_url(&url)
        .map_err(|reason| ShortenerError::CorruptRecord {
            key: key.clone(),
            reason,
        })?;

    debug!(%key, location = location.as_str(), "redirecting");
    Ok(Redirect::temporary(location.as_str()))
}
