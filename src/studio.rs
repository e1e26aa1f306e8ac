//! Session state of the wallpaper studio and the transitions user actions drive.
//!
//! Nothing in here knows about HTTP or rendering; the web layer looks up the
//! [`Studio`] for a browser session, applies one transition and renders the result.
//! A generation is split in two halves, [`Studio::begin_generation`] and
//! [`Studio::complete_generation`], so the provider call can be awaited without
//! holding the state.

use tracing::debug;

use crate::error::StudioError;
use crate::generator::GenerationRequest;
use crate::models::{AspectRatio, GeneratedImage, ImageId};

/// An image picked for remixing, and the prompt that will be used with it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RemixContext {
    /// `data:` URL of the reference image
    pub reference: String,
    /// Prompt edited while remixing
    pub prompt: String,
}

/// Primary state, derived from the flags.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase<'a> {
    /// Nothing generated yet
    Idle,
    /// A generation is in flight
    Loading,
    /// The last generation failed
    Failed(&'a str),
    /// A batch is on display
    Ready(&'a [GeneratedImage]),
}

/// Everything one browser session sees.
#[derive(Clone, Debug, Default)]
pub struct Studio {
    prompt: String,
    aspect_ratio: AspectRatio,
    images: Vec<GeneratedImage>,
    loading: bool,
    error: Option<String>,
    selected: Option<GeneratedImage>,
    remix: Option<RemixContext>,
    next_image_id: u64,
}

impl Studio {
    /// The general prompt, regardless of remixing.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// What the prompt input shows: the remix prompt while remixing.
    pub fn prompt_field(&self) -> &str {
        match &self.remix {
            Some(remix) => &remix.prompt,
            None => &self.prompt,
        }
    }

    /// Currently selected ratio.
    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    /// The current batch, in generation order.
    pub fn images(&self) -> &[GeneratedImage] {
        &self.images
    }

    /// True while a generation is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failed generation.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The image shown in the modal, if it is open.
    pub fn selected(&self) -> Option<&GeneratedImage> {
        self.selected.as_ref()
    }

    /// Active remix context.
    pub fn remix_context(&self) -> Option<&RemixContext> {
        self.remix.as_ref()
    }

    /// Primary state.
    pub fn phase(&self) -> Phase<'_> {
        if self.loading {
            Phase::Loading
        } else if let Some(message) = self.error.as_deref() {
            Phase::Failed(message)
        } else if self.images.is_empty() {
            Phase::Idle
        } else {
            Phase::Ready(&self.images)
        }
    }

    /// Whether the trigger is enabled.
    pub fn can_generate(&self) -> bool {
        !self.loading && (self.remix.is_some() || !self.prompt.trim().is_empty())
    }

    /// Text of the trigger control.
    pub fn trigger_label(&self) -> &'static str {
        if self.loading {
            "Generating..."
        } else if self.remix.is_some() {
            "Remix & Generate"
        } else {
            "Generate Wallpapers"
        }
    }

    /// Edits the prompt field; goes to the remix prompt while remixing.
    pub fn edit_prompt(&mut self, text: &str) {
        match &mut self.remix {
            Some(remix) => remix.prompt = text.to_string(),
            None => self.prompt = text.to_string(),
        }
    }

    /// Changes the selected ratio.
    pub fn select_aspect_ratio(&mut self, aspect_ratio: AspectRatio) {
        self.aspect_ratio = aspect_ratio;
    }

    /// Starts a generation. Returns `None` when the trigger is disabled.
    pub fn begin_generation(&mut self) -> Option<GenerationRequest> {
        if !self.can_generate() {
            return None;
        }
        self.error = None;
        self.loading = true;
        let request = match &self.remix {
            Some(remix) => GenerationRequest {
                prompt: remix.prompt.clone(),
                aspect_ratio: self.aspect_ratio,
                reference_image: Some(remix.reference.clone()),
            },
            None => GenerationRequest {
                prompt: self.prompt.clone(),
                aspect_ratio: self.aspect_ratio,
                reference_image: None,
            },
        };
        Some(request)
    }

    /// Applies the outcome of the call started by [`Studio::begin_generation`].
    ///
    /// Success replaces the batch, drops the remix context and copies the effective
    /// prompt into the prompt field. Failure only records the message; the batch and
    /// any remix context are left as they were.
    pub fn complete_generation(
        &mut self,
        request: GenerationRequest,
        outcome: Result<Vec<String>, StudioError>,
    ) {
        self.loading = false;
        match outcome {
            Ok(urls) => {
                let mut images = Vec::with_capacity(urls.len());
                for url in urls {
                    images.push(GeneratedImage {
                        id: self.allocate_id(),
                        url,
                        prompt: request.prompt.clone(),
                        aspect_ratio: request.aspect_ratio,
                        remixed_from: request.reference_image.clone(),
                    });
                }
                debug!("Replacing batch with {} images", images.len());
                self.images = images;
                self.remix = None;
                self.prompt = request.prompt;
            }
            Err(err) => {
                self.error = Some(err.user_message());
            }
        }
    }

    /// Finds an image in the current batch, or the one still open in the modal.
    pub fn find_image(&self, id: ImageId) -> Option<&GeneratedImage> {
        self.images
            .iter()
            .find(|image| image.id == id)
            .or_else(|| self.selected.as_ref().filter(|image| image.id == id))
    }

    /// Opens the modal on an image. Returns false for unknown ids.
    pub fn open_image(&mut self, id: ImageId) -> bool {
        match self.find_image(id).cloned() {
            Some(image) => {
                self.selected = Some(image);
                true
            }
            None => false,
        }
    }

    /// Closes the modal.
    pub fn close_modal(&mut self) {
        self.selected = None;
    }

    /// Keyboard handling while the page has focus. Escape closes the modal, but only
    /// while it is open; returns whether the key was handled.
    pub fn handle_key(&mut self, key: &str) -> bool {
        if !self.escape_listener_attached() || key != "Escape" {
            return false;
        }
        self.close_modal();
        true
    }

    /// The Escape listener exists only while the modal is open.
    pub fn escape_listener_attached(&self) -> bool {
        self.selected.is_some()
    }

    /// Uses `image` as the reference for the next generation.
    pub fn remix(&mut self, image: &GeneratedImage) {
        self.remix = Some(RemixContext {
            reference: image.url.clone(),
            prompt: image.prompt.clone(),
        });
        self.prompt = image.prompt.clone();
        self.aspect_ratio = image.aspect_ratio;
        self.close_modal();
    }

    /// Drops the remix context and empties the prompt.
    pub fn clear_remix(&mut self) {
        self.remix = None;
        self.prompt.clear();
    }

    fn allocate_id(&mut self) -> ImageId {
        self.next_image_id += 1;
        ImageId(self.next_image_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::TEST_PROMPT;

    fn urls(count: usize) -> Vec<String> {
        (0..count)
            .map(|n| format!("data:image/png;base64,AA{n}="))
            .collect()
    }

    fn studio_with_batch(prompt: &str, aspect_ratio: AspectRatio) -> Studio {
        let mut studio = Studio::default();
        studio.edit_prompt(prompt);
        studio.select_aspect_ratio(aspect_ratio);
        let request = studio.begin_generation().unwrap();
        studio.complete_generation(request, Ok(urls(4)));
        studio
    }

    #[test]
    fn starts_idle_with_phone_ratio() {
        let studio = Studio::default();
        assert_eq!(studio.phase(), Phase::Idle);
        assert_eq!(studio.aspect_ratio(), AspectRatio::PortraitPhone);
        assert!(!studio.can_generate());
        assert_eq!(studio.trigger_label(), "Generate Wallpapers");
    }

    #[test]
    fn trigger_disabled_for_blank_prompts() {
        for prompt in ["", " ", "\t\n", "   \u{3000}"] {
            let mut studio = Studio::default();
            studio.edit_prompt(prompt);
            assert!(!studio.can_generate(), "enabled for {prompt:?}");
            assert!(studio.begin_generation().is_none());
        }
        let mut studio = Studio::default();
        studio.edit_prompt(" x ");
        assert!(studio.can_generate());
    }

    #[test]
    fn trigger_disabled_while_loading_even_when_remixing() {
        let mut studio = studio_with_batch(TEST_PROMPT, AspectRatio::Square);
        let image = studio.images()[0].clone();
        studio.remix(&image);
        assert!(studio.can_generate());

        let request = studio.begin_generation().unwrap();
        assert!(studio.is_loading());
        assert_eq!(studio.phase(), Phase::Loading);
        assert!(!studio.can_generate());
        assert_eq!(studio.trigger_label(), "Generating...");
        assert!(studio.begin_generation().is_none());
        studio.complete_generation(request, Ok(urls(4)));
        assert!(!studio.is_loading());
    }

    #[test]
    fn remix_enables_trigger_with_blank_remix_prompt() {
        let mut studio = studio_with_batch(TEST_PROMPT, AspectRatio::Square);
        let image = studio.images()[1].clone();
        studio.remix(&image);
        studio.edit_prompt("");
        assert!(studio.can_generate());
        assert_eq!(studio.trigger_label(), "Remix & Generate");
    }

    #[test]
    fn successful_generation_tags_four_images_in_order() {
        let studio = studio_with_batch(TEST_PROMPT, AspectRatio::PortraitPhone);

        let images = studio.images();
        assert_eq!(images.len(), 4);
        for (index, image) in images.iter().enumerate() {
            assert_eq!(image.prompt, TEST_PROMPT);
            assert_eq!(image.aspect_ratio, AspectRatio::PortraitPhone);
            assert_eq!(image.url, format!("data:image/png;base64,AA{index}="));
            assert_eq!(image.remixed_from, None);
        }
        assert!(matches!(studio.phase(), Phase::Ready(batch) if batch.len() == 4));
        assert_eq!(studio.prompt_field(), TEST_PROMPT);
    }

    #[test]
    fn ids_are_unique_across_batches() {
        let mut studio = studio_with_batch(TEST_PROMPT, AspectRatio::Square);
        let mut seen: Vec<ImageId> = studio.images().iter().map(|image| image.id).collect();
        let request = studio.begin_generation().unwrap();
        studio.complete_generation(request, Ok(urls(4)));
        seen.extend(studio.images().iter().map(|image| image.id));
        let mut deduped = seen.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), seen.len());
    }

    #[test]
    fn request_uses_general_prompt_without_remix() {
        let mut studio = Studio::default();
        studio.edit_prompt(TEST_PROMPT);
        studio.select_aspect_ratio(AspectRatio::PortraitPhone);
        let request = studio.begin_generation().unwrap();
        assert_eq!(
            request,
            GenerationRequest {
                prompt: TEST_PROMPT.to_string(),
                aspect_ratio: AspectRatio::PortraitPhone,
                reference_image: None,
            }
        );
    }

    #[test]
    fn remix_adopts_prompt_and_ratio_for_every_ratio() {
        for ratio in AspectRatio::ALL {
            let mut studio = studio_with_batch("misty harbour at dawn", ratio);
            studio.select_aspect_ratio(AspectRatio::Square);
            let image = studio.images()[2].clone();
            assert!(studio.open_image(image.id));

            studio.remix(&image);

            assert_eq!(studio.aspect_ratio(), ratio);
            assert_eq!(studio.prompt(), "misty harbour at dawn");
            assert_eq!(studio.prompt_field(), "misty harbour at dawn");
            assert_eq!(
                studio.remix_context(),
                Some(&RemixContext {
                    reference: image.url.clone(),
                    prompt: "misty harbour at dawn".to_string(),
                })
            );
            assert!(studio.selected().is_none());
            assert!(!studio.is_loading());
        }
    }

    #[test]
    fn remix_then_clear_restores_empty_prompt() {
        let mut studio = studio_with_batch(TEST_PROMPT, AspectRatio::LandscapeTablet);
        let image = studio.images()[0].clone();
        studio.remix(&image);
        studio.clear_remix();
        assert_eq!(studio.prompt(), "");
        assert_eq!(studio.prompt_field(), "");
        assert!(studio.remix_context().is_none());
        assert!(!studio.can_generate());
    }

    #[test]
    fn edits_while_remixing_go_to_remix_prompt() {
        let mut studio = studio_with_batch(TEST_PROMPT, AspectRatio::Square);
        let image = studio.images()[0].clone();
        studio.remix(&image);
        studio.edit_prompt("same city, but snowing");

        assert_eq!(studio.prompt_field(), "same city, but snowing");
        assert_eq!(studio.prompt(), TEST_PROMPT);

        let request = studio.begin_generation().unwrap();
        assert_eq!(request.prompt, "same city, but snowing");
        assert_eq!(request.reference_image.as_deref(), Some(image.url.as_str()));
        assert_eq!(request.aspect_ratio, AspectRatio::Square);

        studio.complete_generation(request, Ok(urls(4)));
        assert!(studio.remix_context().is_none());
        assert_eq!(studio.prompt(), "same city, but snowing");
        assert!(
            studio
                .images()
                .iter()
                .all(|new| new.remixed_from.as_deref() == Some(image.url.as_str()))
        );
    }

    #[test]
    fn failure_keeps_batch_and_remix_context() {
        let mut studio = studio_with_batch(TEST_PROMPT, AspectRatio::Square);
        let before = studio.images().to_vec();
        let image = before[3].clone();
        studio.remix(&image);
        studio.edit_prompt("another take");

        let request = studio.begin_generation().unwrap();
        studio.complete_generation(
            request,
            Err(StudioError::Generation(
                "Failed to generate images: Quota exceeded".to_string(),
            )),
        );

        assert!(!studio.is_loading());
        assert_eq!(studio.images(), before.as_slice());
        assert_eq!(studio.error(), Some("Failed to generate images: Quota exceeded"));
        assert_eq!(
            studio.phase(),
            Phase::Failed("Failed to generate images: Quota exceeded")
        );
        assert_eq!(studio.remix_context().map(|remix| remix.prompt.as_str()), Some("another take"));
        assert_eq!(studio.prompt(), TEST_PROMPT);
    }

    #[test]
    fn next_attempt_clears_previous_error() {
        let mut studio = Studio::default();
        studio.edit_prompt(TEST_PROMPT);
        let request = studio.begin_generation().unwrap();
        studio.complete_generation(request, Err(StudioError::unknown("")));
        assert_eq!(studio.error(), Some("An unexpected error occurred."));

        studio.begin_generation().unwrap();
        assert_eq!(studio.error(), None);
    }

    #[test]
    fn opening_and_closing_does_not_touch_generation_state() {
        let mut studio = studio_with_batch(TEST_PROMPT, AspectRatio::Square);
        let id = studio.images()[1].id;
        assert!(studio.open_image(id));
        assert_eq!(studio.selected().map(|image| image.id), Some(id));
        assert!(matches!(studio.phase(), Phase::Ready(_)));
        studio.close_modal();
        assert!(studio.selected().is_none());
        assert!(!studio.open_image(ImageId(999)));
        assert!(studio.selected().is_none());
    }

    #[test]
    fn escape_closes_only_an_open_modal() {
        let mut studio = studio_with_batch(TEST_PROMPT, AspectRatio::Square);
        let id = studio.images()[0].id;
        studio.open_image(id);
        assert!(studio.escape_listener_attached());
        assert!(!studio.handle_key("Enter"));
        assert!(studio.selected().is_some());

        assert!(studio.handle_key("Escape"));
        assert!(studio.selected().is_none());
        assert!(!studio.escape_listener_attached());

        assert!(!studio.handle_key("Escape"));
        assert!(studio.selected().is_none());
    }

    #[test]
    fn open_image_survives_batch_replacement() {
        let mut studio = studio_with_batch(TEST_PROMPT, AspectRatio::Square);
        let old = studio.images()[0].clone();
        studio.open_image(old.id);
        let request = studio.begin_generation().unwrap();
        studio.complete_generation(request, Ok(urls(4)));

        assert_eq!(studio.selected(), Some(&old));
        assert_eq!(studio.find_image(old.id), Some(&old));
    }
}
