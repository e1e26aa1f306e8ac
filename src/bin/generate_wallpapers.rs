use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use wallstudio::cli::ProviderOptions;
use wallstudio::config::setup_logging;
use wallstudio::data_url::DataUrl;
use wallstudio::download::{OfferDownload, SaveToDirectory, download_filename};
use wallstudio::generator::GenerationRequest;
use wallstudio::models::AspectRatio;

/// Generate a batch of wallpapers from the command line.
///
/// Minimal UX:
///   generate_wallpapers "rainy cyberpunk lo-fi" --aspect-ratio 16:9
#[derive(Parser, Debug)]
#[command(name = "generate_wallpapers")]
#[command(about = "Generate a batch of wallpapers and save them to a directory")]
struct Args {
    /// What the wallpapers should look like
    prompt: String,

    /// One of 1:1, 9:16, 3:4, 4:3, 16:9
    #[arg(long, default_value = "9:16")]
    aspect_ratio: AspectRatio,

    /// Existing image to remix from (PNG, JPEG or WebP)
    #[arg(long)]
    reference: Option<PathBuf>,

    /// Output directory
    #[arg(long, default_value = "./wallpapers", env = "WALLSTUDIO_OUT_DIR")]
    out_dir: PathBuf,

    #[command(flatten)]
    provider: ProviderOptions,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}

fn load_reference(path: &Path) -> Result<String> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(DataUrl::new(mime_for(path), bytes).to_string())
}

/// The prompt goes out as typed; trimming only decides whether it is blank.
fn build_request(args: &Args) -> Result<GenerationRequest> {
    if args.prompt.trim().is_empty() && args.reference.is_none() {
        return Err(anyhow!("A prompt is required unless remixing a reference image"));
    }
    let reference_image = args.reference.as_deref().map(load_reference).transpose()?;
    Ok(GenerationRequest {
        prompt: args.prompt.clone(),
        aspect_ratio: args.aspect_ratio,
        reference_image,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.debug).map_err(|err| anyhow!("{err}"))?;

    let request = build_request(&args)?;

    let client = args.provider.build_client();
    info!(
        "Generating {:?} at {} with {}",
        request.prompt,
        request.aspect_ratio,
        client.model()
    );
    let urls = client.generate_images(&request).await?;

    let target = SaveToDirectory::new(&args.out_dir);
    let filename = download_filename(&request.prompt);
    for url in urls {
        let payload = DataUrl::parse(&url)?;
        let path = target.offer_download(&payload, &filename)?;
        println!("{}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_mime_follows_extension() {
        assert_eq!(mime_for(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(mime_for(Path::new("a.webp")), "image/webp");
        assert_eq!(mime_for(Path::new("a")), "image/png");
    }

    #[test]
    fn prompt_is_sent_as_typed() {
        let args = Args::try_parse_from([
            "generate_wallpapers",
            "  koi pond at dusk ",
            "--aspect-ratio",
            "16:9",
        ])
        .unwrap();
        let request = build_request(&args).unwrap();
        assert_eq!(request.prompt, "  koi pond at dusk ");
        assert_eq!(request.aspect_ratio, AspectRatio::LandscapeWidescreen);
        assert_eq!(request.reference_image, None);
    }

    #[test]
    fn blank_prompt_needs_a_reference() {
        let args = Args::try_parse_from(["generate_wallpapers", "   "]).unwrap();
        assert!(build_request(&args).is_err());
    }

    #[test]
    fn reference_is_wrapped_as_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.png");
        fs::write(&path, [1u8, 2, 3]).unwrap();
        let url = load_reference(&path).unwrap();
        assert_eq!(url, "data:image/png;base64,AQID");
    }
}
