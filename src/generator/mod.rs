//! Image generation: the request the studio builds and the provider seam it is sent through.

use std::future::Future;
use std::pin::Pin;

use crate::error::StudioError;
use crate::models::AspectRatio;

pub mod imagen;

pub use imagen::ImagenClient;

/// Everything a provider needs to produce one batch.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GenerationRequest {
    /// Effective prompt
    pub prompt: String,
    /// Ratio passed through verbatim
    pub aspect_ratio: AspectRatio,
    /// `data:` URL of the image being remixed
    pub reference_image: Option<String>,
}

/// Boxed future returned by [`ImageGenerator::generate`]; resolves to ordered data URLs.
pub type GenerateFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<String>, StudioError>> + Send + 'a>>;

/// Produces images from prompts via an external API.
pub trait ImageGenerator: Send + Sync {
    /// Generate one batch for the given request.
    fn generate<'a>(&'a self, request: &'a GenerationRequest) -> GenerateFuture<'a>;
}
