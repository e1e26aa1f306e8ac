use rand::distr::{Alphanumeric, SampleString};
use tower_sessions::Session;

use crate::constants::CSRF_TOKEN_LENGTH;
use crate::error::StudioError;

const CSRF_TOKEN_KEY: &str = "csrf_token";

pub(crate) fn generate_token(length: usize) -> String {
    Alphanumeric.sample_string(&mut rand::rng(), length)
}

pub(crate) async fn csrf_token(session: &Session) -> Result<String, StudioError> {
    let existing = session.get::<String>(CSRF_TOKEN_KEY).await?;
    if let Some(token) = existing {
        return Ok(token);
    }
    let token = generate_token(CSRF_TOKEN_LENGTH);
    session.insert(CSRF_TOKEN_KEY, token.clone()).await?;
    Ok(token)
}

pub(crate) async fn validate_csrf(session: &Session, token: &str) -> Result<(), StudioError> {
    let stored = session.get::<String>(CSRF_TOKEN_KEY).await?;
    match stored {
        Some(expected) if expected == token => Ok(()),
        _ => Err(StudioError::Unauthorized),
    }
}
