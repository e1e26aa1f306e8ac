//! Ties a browser session to its studio state.

use tower_sessions::Session;

use super::csrf::generate_token;
use crate::constants::STUDIO_KEY_LENGTH;
use crate::error::StudioError;

const STUDIO_KEY: &str = "studio_key";

/// Key of this session's [`crate::studio::Studio`], created on first use.
pub(crate) async fn studio_key(session: &Session) -> Result<String, StudioError> {
    if let Some(key) = session.get::<String>(STUDIO_KEY).await? {
        return Ok(key);
    }
    let key = generate_token(STUDIO_KEY_LENGTH);
    session.insert(STUDIO_KEY, key.clone()).await?;
    Ok(key)
}
