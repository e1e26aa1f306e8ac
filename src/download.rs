//! Offering generated images to the user as files.
//!
//! How a download is materialised depends on the host: the web server answers with an
//! attachment, the command-line generator writes into a directory. Both sit behind
//! [`OfferDownload`].

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::constants::{DOWNLOAD_EXTENSION, DOWNLOAD_PREFIX};
use crate::data_url::DataUrl;
use crate::error::StudioError;

#[allow(clippy::expect_used)]
fn unsafe_filename_chars() -> Regex {
    Regex::new("[^a-zA-Z0-9]").expect("constant filename pattern compiles")
}

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> = LazyLock::new(unsafe_filename_chars);

/// Replaces every character outside `[A-Za-z0-9]` with `_`, then lower-cases.
pub fn sanitize_prompt(prompt: &str) -> String {
    UNSAFE_FILENAME_CHARS
        .replace_all(prompt, "_")
        .to_ascii_lowercase()
}

/// `wallpaper-<sanitized prompt>.png`
pub fn download_filename(prompt: &str) -> String {
    format!(
        "{DOWNLOAD_PREFIX}{}.{DOWNLOAD_EXTENSION}",
        sanitize_prompt(prompt)
    )
}

/// Capability supplied by the hosting environment to hand a payload to the user.
pub trait OfferDownload {
    /// What the host produces for a successful offer.
    type Output;

    /// Offers `payload` under `suggested_name`.
    fn offer_download(
        &self,
        payload: &DataUrl,
        suggested_name: &str,
    ) -> Result<Self::Output, StudioError>;
}

/// Writes offered downloads into a directory, never overwriting an existing file.
#[derive(Clone, Debug)]
pub struct SaveToDirectory {
    dir: PathBuf,
}

impl SaveToDirectory {
    /// Downloads land in `dir`, which is created on first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `name.ext`, then `name-2.ext`, `name-3.ext`, ...
    fn candidates(suggested_name: &str) -> impl Iterator<Item = String> + '_ {
        let path = Path::new(suggested_name);
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(suggested_name);
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or(DOWNLOAD_EXTENSION);
        std::iter::once(suggested_name.to_string())
            .chain((2usize..).map(move |counter| format!("{stem}-{counter}.{extension}")))
    }

    /// Creates the first free candidate; the existence check and the creation are one step.
    fn create_free_file(&self, suggested_name: &str) -> Result<(PathBuf, File), StudioError> {
        for name in Self::candidates(suggested_name) {
            let candidate = self.dir.join(name);
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
            {
                Ok(file) => return Ok((candidate, file)),
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    debug!("{} exists, trying the next name", candidate.display());
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(StudioError::unknown(format!(
            "No free file name for {suggested_name}"
        )))
    }
}

impl OfferDownload for SaveToDirectory {
    type Output = PathBuf;

    fn offer_download(
        &self,
        payload: &DataUrl,
        suggested_name: &str,
    ) -> Result<PathBuf, StudioError> {
        match std::fs::create_dir_all(&self.dir) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {}
            Err(err) => return Err(err.into()),
        }
        let (target, mut file) = self.create_free_file(suggested_name)?;
        debug!(
            "Writing {} bytes of {} to {}",
            payload.bytes.len(),
            payload.mime_type,
            target.display()
        );
        file.write_all(&payload.bytes)?;
        info!("Saved: {}", target.display());
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_matches_the_offered_pattern() {
        assert_eq!(
            download_filename("Rainy Cyberpunk City!"),
            "wallpaper-rainy_cyberpunk_city_.png"
        );
        assert_eq!(download_filename(""), "wallpaper-.png");
    }

    #[test]
    fn sanitization_only_emits_safe_characters() {
        let prompts = [
            "enchanted forest at sunset",
            "ÉTÉ à Paris, 1920s",
            "emoji 🌧️ rain / slashes \\ and ..",
            "\u{212A}elvin sign and tabs\t\n",
            "ALREADY_safe_123",
        ];
        for prompt in prompts {
            let sanitized = sanitize_prompt(prompt);
            assert!(
                sanitized
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'),
                "unexpected characters in {sanitized:?}"
            );
            assert_eq!(sanitize_prompt(&sanitized), sanitized);
        }
    }

    #[test]
    fn one_underscore_per_replaced_character() {
        assert_eq!(sanitize_prompt("a é"), "a__");
    }

    #[test]
    fn directory_sink_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let sink = SaveToDirectory::new(dir.path().join("out"));
        let payload = DataUrl::new("image/png", vec![1, 2, 3]);

        let first = sink.offer_download(&payload, "wallpaper-x.png").unwrap();
        let second = sink.offer_download(&payload, "wallpaper-x.png").unwrap();
        let third = sink.offer_download(&payload, "wallpaper-x.png").unwrap();

        assert_eq!(first.file_name().unwrap(), "wallpaper-x.png");
        assert_eq!(second.file_name().unwrap(), "wallpaper-x-2.png");
        assert_eq!(third.file_name().unwrap(), "wallpaper-x-3.png");
        assert_eq!(std::fs::read(&third).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn directory_sink_leaves_existing_files_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("wallpaper-x.png");
        std::fs::write(&existing, b"keep me").unwrap();
        let sink = SaveToDirectory::new(dir.path());

        let written = sink
            .offer_download(&DataUrl::new("image/png", vec![4, 5]), "wallpaper-x.png")
            .unwrap();

        assert_eq!(written, dir.path().join("wallpaper-x-2.png"));
        assert_eq!(std::fs::read(&existing).unwrap(), b"keep me");
        assert_eq!(std::fs::read(&written).unwrap(), vec![4, 5]);
    }

    #[test]
    fn candidates_count_up_from_two() {
        let names: Vec<String> = SaveToDirectory::candidates("wallpaper-koi.png")
            .take(3)
            .collect();
        assert_eq!(
            names,
            ["wallpaper-koi.png", "wallpaper-koi-2.png", "wallpaper-koi-3.png"]
        );
    }
}
