//! The contract with the external extraction engine and its yt-dlp backend.
//!
//! The orchestrator only sees [`Engine`] and [`EngineConfig`]; everything that
//! knows about command-line flags and process handling lives in [`ytdlp`] and
//! [`binary`].

pub mod binary;
pub mod ytdlp;

use std::path::PathBuf;

use crate::error::EngineError;
use crate::models::{DownloadRequest, MediaType};
use crate::progress::ProgressEvent;

pub use binary::BinaryLocator;
pub use ytdlp::YtDlp;

pub const OUTPUT_FILENAME_TEMPLATE: &str = "%(title)s.%(ext)s";
pub const AUDIO_FORMAT: &str = "bestaudio/best";
pub const AUDIO_CODEC: &str = "mp3";
/// yt-dlp's VBR scale runs from 0 (best) to 10 (worst).
pub const AUDIO_QUALITY_BEST: &str = "0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioExtraction {
    pub codec: &'static str,
    pub quality: &'static str,
}

/// Everything the engine needs to know about one download, minus the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub format: String,
    pub output_template: String,
    pub audio: Option<AudioExtraction>,
}

impl EngineConfig {
    pub fn for_request(request: &DownloadRequest) -> Result<Self, EngineError> {
        let output_template = request
            .save_path
            .join(OUTPUT_FILENAME_TEMPLATE)
            .to_string_lossy()
            .to_string();

        match request.media_type {
            MediaType::Audio => Ok(Self {
                format: AUDIO_FORMAT.to_string(),
                output_template,
                audio: Some(AudioExtraction {
                    codec: AUDIO_CODEC,
                    quality: AUDIO_QUALITY_BEST,
                }),
            }),
            MediaType::Video => {
                let quality = request.video_quality.ok_or_else(|| {
                    EngineError::InvalidParameter("Invalid video quality choice.".to_string())
                })?;
                Ok(Self {
                    format: format!("bestvideo[height={}]+bestaudio/best", quality.height()),
                    output_template,
                    audio: None,
                })
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOutcome {
    /// Final location of the media file, when the engine reported it.
    pub output_path: Option<PathBuf>,
}

/// A blocking media download engine.
///
/// `on_progress` is called on the thread running `download`, as often as the
/// engine decides to report.
pub trait Engine: Send + Sync {
    fn download(
        &self,
        url: &str,
        config: &EngineConfig,
        on_progress: &mut dyn FnMut(&ProgressEvent),
    ) -> Result<EngineOutcome, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VideoQuality;

    fn request(media_type: MediaType, video_quality: Option<VideoQuality>) -> DownloadRequest {
        DownloadRequest {
            url: "https://example.com/x".into(),
            media_type,
            video_quality,
            save_path: PathBuf::from("/tmp/out"),
        }
    }

    #[test]
    fn audio_config_extracts_best_mp3() {
        let config = EngineConfig::for_request(&request(MediaType::Audio, None)).unwrap();
        assert_eq!(config.format, "bestaudio/best");
        assert_eq!(config.output_template, "/tmp/out/%(title)s.%(ext)s");
        assert_eq!(
            config.audio,
            Some(AudioExtraction {
                codec: "mp3",
                quality: "0"
            })
        );
    }

    #[test]
    fn video_config_pins_height_and_merges_best_audio() {
        let config =
            EngineConfig::for_request(&request(MediaType::Video, Some(VideoQuality::P720)))
                .unwrap();
        assert_eq!(config.format, "bestvideo[height=720]+bestaudio/best");
        assert_eq!(config.output_template, "/tmp/out/%(title)s.%(ext)s");
        assert!(config.audio.is_none());
    }

    #[test]
    fn video_without_quality_is_an_invalid_parameter() {
        let err = EngineConfig::for_request(&request(MediaType::Video, None)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter(ref msg) if msg == "Invalid video quality choice."));
    }
}
