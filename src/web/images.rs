//! Serving generated images back to the browser.

use axum::body::Body;
use axum::http::header::{CACHE_CONTROL, CONTENT_DISPOSITION};

use super::prelude::*;
use crate::data_url::DataUrl;
use crate::download::{OfferDownload, download_filename};

/// Offers a download as an HTTP attachment; the browser saves it under the suggested name.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Attachment;

impl OfferDownload for Attachment {
    type Output = Response;

    fn offer_download(
        &self,
        payload: &DataUrl,
        suggested_name: &str,
    ) -> Result<Response, StudioError> {
        Response::builder()
            .header(CONTENT_TYPE, payload.mime_type.as_str())
            .header(
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{suggested_name}\""),
            )
            .header(CACHE_CONTROL, "no-store")
            .body(Body::from(payload.bytes.clone()))
            .map_err(StudioError::from)
    }
}

async fn lookup_payload(
    state: &AppState,
    session: &Session,
    id: ImageId,
) -> Result<(DataUrl, String), StudioError> {
    let key = studio_key(session).await?;
    let found = state
        .with_studio(&key, |studio| {
            studio
                .find_image(id)
                .map(|image| (image.url.clone(), image.prompt.clone()))
        })
        .await;
    let Some((url, prompt)) = found else {
        return Err(StudioError::NotFound(format!("image {id}")));
    };
    let payload = DataUrl::parse(&url)
        .map_err(|err| StudioError::InternalServerError(err.user_message()))?;
    Ok((payload, prompt))
}

/// Decoded bytes for `<img>` tags.
pub(crate) async fn raw_image_handler(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<u64>,
) -> Result<Response, StudioError> {
    let (payload, _) = lookup_payload(&state, &session, ImageId(id)).await?;
    Response::builder()
        .header(CONTENT_TYPE, payload.mime_type.as_str())
        .body(Body::from(payload.bytes))
        .map_err(StudioError::from)
}

/// The Download action.
pub(crate) async fn download_handler(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<u64>,
) -> Result<Response, StudioError> {
    let (payload, prompt) = lookup_payload(&state, &session, ImageId(id)).await?;
    let filename = download_filename(&prompt);
    debug!("Offering image {id} as {filename}");
    Attachment.offer_download(&payload, &filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_sets_disposition_and_type() {
        let payload = DataUrl::new("image/png", vec![9, 8, 7]);
        let response = Attachment
            .offer_download(&payload, "wallpaper-koi.png")
            .unwrap();
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "image/png");
        assert_eq!(
            response.headers().get(CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"wallpaper-koi.png\""
        );
    }
}
