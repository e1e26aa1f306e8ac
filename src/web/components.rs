//! Reusable pieces of the studio page.

use super::prelude::*;
use crate::download::download_filename;
use crate::models::GeneratedImage;

/// One tile of the grid; submitting it is the card's `selected` event.
#[derive(Template)]
#[template(path = "components/image_card.html")]
pub(crate) struct ImageCard<'a> {
    id: ImageId,
    prompt: &'a str,
    ratio_class: &'static str,
    csrf_token: &'a str,
}

impl<'a> ImageCard<'a> {
    pub(crate) fn new(image: &'a GeneratedImage, csrf_token: &'a str) -> Self {
        Self {
            id: image.id,
            prompt: &image.prompt,
            ratio_class: image.aspect_ratio.css_class(),
            csrf_token,
        }
    }
}

/// Overlay around arbitrary content. The Escape handler is only emitted with an open
/// modal, and the content panel sits beside the backdrop, not inside it.
#[derive(Template)]
#[template(path = "components/modal.html")]
pub(crate) struct Modal<'a> {
    content: String,
    csrf_token: &'a str,
}

impl<'a> Modal<'a> {
    /// Renders `content` inside the overlay, or nothing when there is none to show.
    pub(crate) fn render_if_open(
        content: Option<String>,
        csrf_token: &'a str,
    ) -> Result<Option<String>, StudioError> {
        match content {
            Some(content) => Ok(Some(
                Modal {
                    content,
                    csrf_token,
                }
                .render()?,
            )),
            None => Ok(None),
        }
    }
}

/// The open image with its Download and Remix actions.
#[derive(Template)]
#[template(path = "components/image_detail.html")]
pub(crate) struct ImageDetail<'a> {
    id: ImageId,
    prompt: &'a str,
    filename: String,
    csrf_token: &'a str,
}

impl<'a> ImageDetail<'a> {
    pub(crate) fn new(image: &'a GeneratedImage, csrf_token: &'a str) -> Self {
        Self {
            id: image.id,
            prompt: &image.prompt,
            filename: download_filename(&image.prompt),
            csrf_token,
        }
    }
}
