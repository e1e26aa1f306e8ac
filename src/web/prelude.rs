pub(crate) use crate::error::StudioError;
pub(crate) use crate::models::ImageId;
pub(crate) use crate::web::AppState;
pub(crate) use crate::web::csrf::validate_csrf;
pub(crate) use crate::web::session::studio_key;
pub(crate) use askama::Template;
pub(crate) use askama_web::WebTemplate;
pub(crate) use axum::extract::{Form, Path, State};
pub(crate) use axum::http::header::CONTENT_TYPE;
pub(crate) use axum::response::{Redirect, Response};
pub(crate) use serde::Deserialize;
pub(crate) use tower_sessions::Session;
pub(crate) use tracing::{debug, info};
