// FormatSelector - maps the user's container/quality choice onto yt-dlp selection
//
// Handles:
// - Video container: best, height-capped, or audio-only stream selection
// - m4a: native AAC stream, quality ignored
// - mp3: best audio plus an extraction directive, quality ignored
//
// Quality only matters for the video container. Audio containers pick by
// codec/container, so two requests differing only in quality resolve the same.

use std::str::FromStr;

use super::errors::DownloadError;
use super::models::{
    FormatChoice, PostProcessDirective, QualityPreference, ResolvedFormat, SelectionExpression,
};

const BEST_VIDEO: &str = "bestvideo+bestaudio/best";
const BEST_AUDIO: &str = "bestaudio/best";
const M4A_AUDIO: &str = "bestaudio[ext=m4a]/bestaudio/best";

/// Format selector (pure, total)
pub struct FormatSelector;

impl FormatSelector {
    /// Resolve a selection expression and optional post-processing step
    pub fn resolve(format: FormatChoice, quality: QualityPreference) -> ResolvedFormat {
        match format {
            FormatChoice::VideoContainer => ResolvedFormat {
                selection: SelectionExpression::new(Self::video_spec(quality)),
                post_process: None,
            },
            FormatChoice::AudioContainerM4A => ResolvedFormat {
                selection: SelectionExpression::new(M4A_AUDIO),
                post_process: None,
            },
            FormatChoice::AudioContainerMP3 => ResolvedFormat {
                selection: SelectionExpression::new(BEST_AUDIO),
                post_process: Some(PostProcessDirective::mp3()),
            },
        }
    }

    fn video_spec(quality: QualityPreference) -> String {
        match quality {
            QualityPreference::Best => BEST_VIDEO.to_string(),
            QualityPreference::AudioOnly => BEST_AUDIO.to_string(),
            QualityPreference::HeightCapped(height) => {
                format!("bestvideo[height<={}]+bestaudio/best", height)
            }
        }
    }
}

/// Shorthand for [`FormatSelector::resolve`]
pub fn resolve(format: FormatChoice, quality: QualityPreference) -> ResolvedFormat {
    FormatSelector::resolve(format, quality)
}

// UI labels look like "mp4 (video)", "m4a (audio)", "mp3 (audio)"
impl FromStr for FormatChoice {
    type Err = DownloadError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let token = label
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase();

        match token.as_str() {
            "mp4" | "video" => Ok(Self::VideoContainer),
            "m4a" => Ok(Self::AudioContainerM4A),
            "mp3" => Ok(Self::AudioContainerMP3),
            _ => Err(DownloadError::UnsupportedFormat(label.trim().to_string())),
        }
    }
}

impl QualityPreference {
    /// Parse a UI quality label ("best", "720p", "audio-only").
    ///
    /// Unrecognized labels fall back to `Best` with a warning.
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_lowercase();

        match normalized.as_str() {
            "best" => return Self::Best,
            "audio-only" | "audio" => return Self::AudioOnly,
            _ => {}
        }

        let capped = normalized
            .strip_suffix('p')
            .and_then(|h| h.parse::<u32>().ok())
            .and_then(Self::height_capped);

        capped.unwrap_or_else(|| {
            tracing::warn!(label, "Unrecognized quality label, using best");
            Self::Best
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORMATS: [FormatChoice; 3] = [
        FormatChoice::VideoContainer,
        FormatChoice::AudioContainerM4A,
        FormatChoice::AudioContainerMP3,
    ];

    fn qualities() -> Vec<QualityPreference> {
        let mut q = vec![QualityPreference::Best, QualityPreference::AudioOnly];
        for h in [1, 360, 480, 720, 1080, 2160] {
            q.push(QualityPreference::height_capped(h).unwrap());
        }
        q
    }

    #[test]
    fn test_resolution_table() {
        let cases = [
            (FormatChoice::VideoContainer, QualityPreference::Best, BEST_VIDEO),
            (FormatChoice::VideoContainer, QualityPreference::AudioOnly, BEST_AUDIO),
            (
                FormatChoice::VideoContainer,
                QualityPreference::height_capped(480).unwrap(),
                "bestvideo[height<=480]+bestaudio/best",
            ),
            (FormatChoice::AudioContainerM4A, QualityPreference::Best, M4A_AUDIO),
            (FormatChoice::AudioContainerMP3, QualityPreference::Best, BEST_AUDIO),
        ];

        for (format, quality, expected) in cases {
            assert_eq!(resolve(format, quality).selection.as_str(), expected);
        }
    }

    #[test]
    fn test_every_pair_is_non_empty_and_directive_only_for_mp3() {
        for format in FORMATS {
            for quality in qualities() {
                let resolved = resolve(format, quality);
                assert!(!resolved.selection.as_str().is_empty());
                assert_eq!(
                    resolved.post_process.is_some(),
                    format == FormatChoice::AudioContainerMP3,
                    "{:?} / {:?}",
                    format,
                    quality
                );
            }
        }
    }

    #[test]
    fn test_quality_ignored_for_audio_containers() {
        for format in [FormatChoice::AudioContainerM4A, FormatChoice::AudioContainerMP3] {
            let baseline = resolve(format, QualityPreference::Best);
            for quality in qualities() {
                assert_eq!(resolve(format, quality), baseline);
            }
        }
        assert_eq!(
            resolve(FormatChoice::AudioContainerM4A, QualityPreference::Best),
            resolve(
                FormatChoice::AudioContainerM4A,
                QualityPreference::height_capped(360).unwrap()
            )
        );
    }

    #[test]
    fn test_height_cap_is_literal() {
        let resolved = resolve(
            FormatChoice::VideoContainer,
            QualityPreference::height_capped(720).unwrap(),
        );
        assert!(resolved.selection.as_str().contains("720"));
    }

    #[test]
    fn test_mp3_directive() {
        let directive = resolve(FormatChoice::AudioContainerMP3, QualityPreference::AudioOnly)
            .post_process
            .unwrap();
        assert_eq!(directive.target_codec, "mp3");
        assert_eq!(directive.target_quality, "192");
    }

    #[test]
    fn test_format_labels() {
        assert_eq!("mp4 (video)".parse::<FormatChoice>(), Ok(FormatChoice::VideoContainer));
        assert_eq!("M4A (audio)".parse::<FormatChoice>(), Ok(FormatChoice::AudioContainerM4A));
        assert_eq!("mp3".parse::<FormatChoice>(), Ok(FormatChoice::AudioContainerMP3));
        assert!(matches!(
            "flac (audio)".parse::<FormatChoice>(),
            Err(DownloadError::UnsupportedFormat(_))
        ));
        assert!("".parse::<FormatChoice>().is_err());
    }

    #[test]
    fn test_quality_labels() {
        assert_eq!(QualityPreference::from_label("best"), QualityPreference::Best);
        assert_eq!(
            QualityPreference::from_label("audio-only"),
            QualityPreference::AudioOnly
        );
        assert_eq!(
            QualityPreference::from_label("720p"),
            QualityPreference::height_capped(720).unwrap()
        );
    }

    #[test]
    fn test_unrecognized_quality_falls_back_to_best() {
        for label in ["ultra", "0p", "p", "-5p", "720"] {
            assert_eq!(QualityPreference::from_label(label), QualityPreference::Best);
        }
        assert_eq!(
            resolve(FormatChoice::VideoContainer, QualityPreference::from_label("ultra"))
                .selection
                .as_str(),
            BEST_VIDEO
        );
    }
}
