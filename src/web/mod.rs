//! Browser front end: one studio per session, rendered server side.

use std::collections::HashMap;
use std::num::NonZeroU16;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use tracing::{debug, error, info};

use crate::constants::{SESSION_INACTIVITY_MINUTES, STUDIO_SWEEP_INTERVAL_SECONDS};
use crate::error::StudioError;
use crate::generator::{GenerationRequest, ImageGenerator};
use crate::studio::Studio;

mod components;
mod csrf;
mod images;
mod prelude;
mod session;
mod views;

use images::{download_handler, raw_image_handler};
use views::{
    clear_remix_handler, close_modal_handler, generate_handler, open_image_handler,
    remix_handler, studio_handler,
};

/// A studio and when its session last touched it.
#[derive(Debug)]
struct StudioEntry {
    studio: Studio,
    last_seen: Instant,
}

impl StudioEntry {
    fn new() -> Self {
        Self {
            studio: Studio::default(),
            last_seen: Instant::now(),
        }
    }

    fn touch(&mut self) -> &mut Studio {
        self.last_seen = Instant::now();
        &mut self.studio
    }
}

/// How long a studio outlives its last request, matching the session expiry.
fn studio_idle_limit() -> Duration {
    Duration::from_secs(SESSION_INACTIVITY_MINUTES.unsigned_abs() * 60)
}

#[derive(Clone)]
pub(crate) struct AppState {
    studios: Arc<RwLock<HashMap<String, StudioEntry>>>,
    generator: Arc<dyn ImageGenerator>,
}

impl AppState {
    fn new(generator: Arc<dyn ImageGenerator>) -> Self {
        Self {
            studios: Arc::new(RwLock::new(HashMap::new())),
            generator,
        }
    }

    /// Applies one transition to the session's studio, creating it if needed.
    pub(crate) async fn with_studio<T>(
        &self,
        key: &str,
        action: impl FnOnce(&mut Studio) -> T,
    ) -> T {
        let mut studios = self.studios.write().await;
        action(
            studios
                .entry(key.to_string())
                .or_insert_with(StudioEntry::new)
                .touch(),
        )
    }

    /// Copy of the session's studio for rendering; viewing counts as activity.
    pub(crate) async fn snapshot(&self, key: &str) -> Studio {
        match self.studios.write().await.get_mut(key) {
            Some(entry) => entry.touch().clone(),
            None => Studio::default(),
        }
    }

    /// Drops studios idle for at least `max_idle`. A studio waiting on the provider is kept.
    async fn sweep_idle(&self, max_idle: Duration) -> usize {
        let mut studios = self.studios.write().await;
        let before = studios.len();
        studios.retain(|_, entry| {
            entry.studio.is_loading() || entry.last_seen.elapsed() < max_idle
        });
        before - studios.len()
    }

    /// Sweeps idle studios every `every` for as long as the process runs.
    fn spawn_sweeper(&self, every: Duration, max_idle: Duration) {
        let state = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let removed = state.sweep_idle(max_idle).await;
                if removed > 0 {
                    debug!("Dropped {removed} idle studios");
                }
            }
        });
    }

    /// Runs the provider call in the background and settles the studio afterwards, so
    /// neither a dropped request nor a panicking provider leaves it loading.
    pub(crate) fn spawn_generation(&self, key: String, request: GenerationRequest) {
        let generator = self.generator.clone();
        let studios = self.studios.clone();
        tokio::spawn(async move {
            let call = {
                let request = request.clone();
                tokio::spawn(async move { generator.generate(&request).await })
            };
            let outcome = match call.await {
                Ok(outcome) => outcome,
                Err(err) if err.is_panic() => {
                    error!("Image generator panicked");
                    Err(StudioError::unknown(""))
                }
                Err(err) => Err(StudioError::unknown(err.to_string())),
            };
            match &outcome {
                Ok(images) => info!("Generated {} images", images.len()),
                Err(err) => error!("Generation failed: {err}"),
            }
            studios
                .write()
                .await
                .entry(key)
                .or_insert_with(StudioEntry::new)
                .touch()
                .complete_generation(request, outcome);
        });
    }
}

fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(studio_handler))
        .route("/static/styles.css", axum::routing::get(styles_handler))
        .route("/generate", axum::routing::post(generate_handler))
        .route("/images/{id}/open", axum::routing::post(open_image_handler))
        .route("/images/{id}/remix", axum::routing::post(remix_handler))
        .route("/images/{id}/raw", axum::routing::get(raw_image_handler))
        .route(
            "/images/{id}/download",
            axum::routing::get(download_handler),
        )
        .route("/modal/close", axum::routing::post(close_modal_handler))
        .route("/remix/clear", axum::routing::post(clear_remix_handler))
}

fn build_app(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            SESSION_INACTIVITY_MINUTES,
        )));

    create_router()
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn styles_handler() -> impl IntoResponse {
    const STYLES: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/styles.css"));
    ([(CONTENT_TYPE, "text/css")], STYLES)
}

/// Serves the studio until the listener fails.
pub async fn setup_server(
    listen_addr: &str,
    port: NonZeroU16,
    generator: Arc<dyn ImageGenerator>,
) -> Result<(), anyhow::Error> {
    let state = AppState::new(generator);
    state.spawn_sweeper(
        Duration::from_secs(STUDIO_SWEEP_INTERVAL_SECONDS),
        studio_idle_limit(),
    );
    let app = build_app(state);

    let addr = format!("{}:{}", listen_addr, port);
    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    if let Err(err) = axum::serve(listener, app).await {
        error!("Server error: {}", err);
    }
    Ok(())
}
