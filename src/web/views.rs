use super::components::{ImageCard, ImageDetail, Modal};
use super::csrf::csrf_token;
use super::prelude::*;
use crate::constants::LOADING_REFRESH_SECONDS;
use crate::models::AspectRatio;

#[derive(Clone, Debug)]
pub(crate) struct RatioOption {
    pub(crate) token: &'static str,
    pub(crate) label: &'static str,
    pub(crate) selected: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "studio.html")]
pub(crate) struct StudioTemplate {
    prompt_field: String,
    ratio_options: Vec<RatioOption>,
    loading: bool,
    refresh_seconds: u64,
    can_generate: bool,
    trigger_label: &'static str,
    remixing: bool,
    has_error: bool,
    error_message: String,
    cards: Vec<String>,
    has_modal: bool,
    modal_html: String,
    csrf_token: String,
}

#[derive(Deserialize)]
pub(crate) struct GenerateForm {
    csrf_token: String,
    // disabled inputs are not submitted
    prompt: Option<String>,
    aspect_ratio: Option<AspectRatio>,
}

#[derive(Deserialize)]
pub(crate) struct CsrfForm {
    csrf_token: String,
}

/// handles the / GET
pub(crate) async fn studio_handler(
    State(state): State<AppState>,
    session: Session,
) -> Result<StudioTemplate, StudioError> {
    let csrf_token = csrf_token(&session).await?;
    let key = studio_key(&session).await?;
    let studio = state.snapshot(&key).await;

    let ratio_options = AspectRatio::ALL
        .into_iter()
        .map(|ratio| RatioOption {
            token: ratio.token(),
            label: ratio.label(),
            selected: ratio == studio.aspect_ratio(),
        })
        .collect();

    let mut cards = Vec::with_capacity(studio.images().len());
    for image in studio.images() {
        cards.push(ImageCard::new(image, &csrf_token).render()?);
    }

    let detail = match studio.selected() {
        Some(image) => Some(ImageDetail::new(image, &csrf_token).render()?),
        None => None,
    };
    let modal = Modal::render_if_open(detail, &csrf_token)?;

    Ok(StudioTemplate {
        prompt_field: studio.prompt_field().to_string(),
        ratio_options,
        loading: studio.is_loading(),
        refresh_seconds: LOADING_REFRESH_SECONDS,
        can_generate: studio.can_generate(),
        trigger_label: studio.trigger_label(),
        remixing: studio.remix_context().is_some(),
        has_error: studio.error().is_some(),
        error_message: studio.error().unwrap_or_default().to_string(),
        cards,
        has_modal: modal.is_some(),
        modal_html: modal.unwrap_or_default(),
        csrf_token,
    })
}

/// The trigger: applies the submitted inputs, then starts a generation if allowed.
pub(crate) async fn generate_handler(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<GenerateForm>,
) -> Result<Redirect, StudioError> {
    validate_csrf(&session, &form.csrf_token).await?;
    let key = studio_key(&session).await?;

    let request = state
        .with_studio(&key, |studio| {
            if studio.is_loading() {
                return None;
            }
            if let Some(prompt) = form.prompt.as_deref() {
                studio.edit_prompt(prompt);
            }
            if let Some(aspect_ratio) = form.aspect_ratio {
                studio.select_aspect_ratio(aspect_ratio);
            }
            studio.begin_generation()
        })
        .await;

    match request {
        Some(request) => {
            info!(
                "Generating {:?} at {}{}",
                request.prompt,
                request.aspect_ratio,
                if request.reference_image.is_some() {
                    " (remix)"
                } else {
                    ""
                }
            );
            state.spawn_generation(key, request);
        }
        None => debug!("Trigger ignored, generation disabled"),
    }
    Ok(Redirect::to("/"))
}

pub(crate) async fn open_image_handler(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<u64>,
    Form(form): Form<CsrfForm>,
) -> Result<Redirect, StudioError> {
    validate_csrf(&session, &form.csrf_token).await?;
    let key = studio_key(&session).await?;
    let opened = state
        .with_studio(&key, |studio| studio.open_image(ImageId(id)))
        .await;
    if !opened {
        return Err(StudioError::NotFound(format!("image {id}")));
    }
    Ok(Redirect::to("/"))
}

pub(crate) async fn close_modal_handler(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CsrfForm>,
) -> Result<Redirect, StudioError> {
    validate_csrf(&session, &form.csrf_token).await?;
    let key = studio_key(&session).await?;
    state.with_studio(&key, |studio| studio.close_modal()).await;
    Ok(Redirect::to("/"))
}

pub(crate) async fn remix_handler(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<u64>,
    Form(form): Form<CsrfForm>,
) -> Result<Redirect, StudioError> {
    validate_csrf(&session, &form.csrf_token).await?;
    let key = studio_key(&session).await?;
    let remixed = state
        .with_studio(&key, |studio| match studio.find_image(ImageId(id)).cloned() {
            Some(image) => {
                studio.remix(&image);
                true
            }
            None => false,
        })
        .await;
    if !remixed {
        return Err(StudioError::NotFound(format!("image {id}")));
    }
    Ok(Redirect::to("/"))
}

pub(crate) async fn clear_remix_handler(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CsrfForm>,
) -> Result<Redirect, StudioError> {
    validate_csrf(&session, &form.csrf_token).await?;
    let key = studio_key(&session).await?;
    state.with_studio(&key, |studio| studio.clear_remix()).await;
    Ok(Redirect::to("/"))
}
