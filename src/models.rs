//! View models shared by the studio, the provider client and the web layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The aspect ratios the provider accepts.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    /// `1:1`
    #[serde(rename = "1:1")]
    Square,
    /// `9:16`
    #[default]
    #[serde(rename = "9:16")]
    PortraitPhone,
    /// `3:4`
    #[serde(rename = "3:4")]
    PortraitTablet,
    /// `4:3`
    #[serde(rename = "4:3")]
    LandscapeTablet,
    /// `16:9`
    #[serde(rename = "16:9")]
    LandscapeWidescreen,
}

impl AspectRatio {
    /// Every ratio, in selector order.
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Square,
        AspectRatio::PortraitPhone,
        AspectRatio::PortraitTablet,
        AspectRatio::LandscapeTablet,
        AspectRatio::LandscapeWidescreen,
    ];

    /// The token sent to the provider verbatim.
    pub fn token(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::PortraitPhone => "9:16",
            AspectRatio::PortraitTablet => "3:4",
            AspectRatio::LandscapeTablet => "4:3",
            AspectRatio::LandscapeWidescreen => "16:9",
        }
    }

    /// Hint shown next to the token in the selector.
    pub fn label(self) -> &'static str {
        match self {
            AspectRatio::Square => "(Square)",
            AspectRatio::PortraitPhone => "(Phone Wallpaper)",
            AspectRatio::PortraitTablet => "(Portrait Tablet)",
            AspectRatio::LandscapeTablet => "(Landscape Tablet)",
            AspectRatio::LandscapeWidescreen => "(Widescreen)",
        }
    }

    /// CSS class suffix, since `:` is awkward in class names.
    pub fn css_class(self) -> &'static str {
        match self {
            AspectRatio::Square => "ratio-1-1",
            AspectRatio::PortraitPhone => "ratio-9-16",
            AspectRatio::PortraitTablet => "ratio-3-4",
            AspectRatio::LandscapeTablet => "ratio-4-3",
            AspectRatio::LandscapeWidescreen => "ratio-16-9",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Returned when a string is not one of the five ratio tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAspectRatio(pub String);

impl fmt::Display for UnknownAspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown aspect ratio {:?}, expected one of 1:1, 9:16, 3:4, 4:3, 16:9",
            self.0
        )
    }
}

impl std::error::Error for UnknownAspectRatio {}

impl FromStr for AspectRatio {
    type Err = UnknownAspectRatio;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        AspectRatio::ALL
            .into_iter()
            .find(|ratio| ratio.token() == value.trim())
            .ok_or_else(|| UnknownAspectRatio(value.to_string()))
    }
}

/// Identifies an image within one session.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ImageId(pub u64);

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One image produced by a generation call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratedImage {
    /// Unique within the session
    pub id: ImageId,
    /// Self-contained `data:` URL of the image
    pub url: String,
    /// Prompt the image was generated from
    pub prompt: String,
    /// Ratio the image was generated at
    pub aspect_ratio: AspectRatio,
    /// Payload of the reference image, when this came from a remix
    pub remixed_from: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_parse_back_to_their_ratio() {
        for ratio in AspectRatio::ALL {
            assert_eq!(ratio.token().parse::<AspectRatio>(), Ok(ratio));
        }
    }

    #[test]
    fn unknown_tokens_are_rejected() {
        assert!("2:1".parse::<AspectRatio>().is_err());
        assert!("".parse::<AspectRatio>().is_err());
        assert!("16x9".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn serde_uses_the_provider_token() {
        let json = serde_json::to_string(&AspectRatio::LandscapeWidescreen).unwrap();
        assert_eq!(json, "\"16:9\"");
        let parsed: AspectRatio = serde_json::from_str("\"3:4\"").unwrap();
        assert_eq!(parsed, AspectRatio::PortraitTablet);
    }

    #[test]
    fn default_is_phone_wallpaper() {
        assert_eq!(AspectRatio::default(), AspectRatio::PortraitPhone);
        assert_eq!(AspectRatio::default().label(), "(Phone Wallpaper)");
    }
}
