use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaType {
    #[default]
    Audio,
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoQuality {
    #[default]
    P144,
    P240,
    P360,
    P480,
    P720,
    P1080,
}

impl VideoQuality {
    pub const ALL: [VideoQuality; 6] = [
        Self::P144,
        Self::P240,
        Self::P360,
        Self::P480,
        Self::P720,
        Self::P1080,
    ];

    /// Vertical resolution in pixels, as used by the engine's format selector.
    pub fn height(self) -> u32 {
        match self {
            Self::P144 => 144,
            Self::P240 => 240,
            Self::P360 => 360,
            Self::P480 => 480,
            Self::P720 => 720,
            Self::P1080 => 1080,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::P144 => "144p",
            Self::P240 => "240p",
            Self::P360 => "360p",
            Self::P480 => "480p",
            Self::P720 => "720p",
            Self::P1080 => "1080p",
        }
    }
}

impl fmt::Display for VideoQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Validated input for a single engine invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub media_type: MediaType,
    pub video_quality: Option<VideoQuality>,
    pub save_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressState {
    pub percent: u8,
}

impl ProgressState {
    pub fn fraction(&self) -> f32 {
        f32::from(self.percent) / 100.0
    }

    pub fn label(&self) -> String {
        format!("{}%", self.percent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupResult {
    pub kind: PopupKind,
    pub title: String,
    pub message: String,
}

impl PopupResult {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: PopupKind::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: PopupKind::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Messages sent from worker threads to the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Progress(u8),
    DownloadFinished {
        popup: PopupResult,
        output_path: Option<PathBuf>,
    },
    MaintenanceFinished {
        popup: PopupResult,
        engine_status: Option<String>,
    },
}

/// The form fields a download is built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadForm {
    pub url: String,
    pub media_type: MediaType,
    pub quality: Option<VideoQuality>,
    pub save_path: String,
}

/// Per-field validity derived from the form, shown next to each field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldValidity {
    pub url: bool,
    pub quality: bool,
    pub save_path: bool,
}

impl DownloadForm {
    /// Clicking the active tier clears the selection, any other tier takes it.
    pub fn toggle_quality(&mut self, quality: VideoQuality) {
        self.quality = if self.quality == Some(quality) {
            None
        } else {
            Some(quality)
        };
    }

    pub fn validity(&self) -> FieldValidity {
        FieldValidity {
            url: !self.url.trim().is_empty(),
            quality: self.media_type == MediaType::Audio || self.quality.is_some(),
            save_path: !self.save_path.trim().is_empty(),
        }
    }
}

/// View-model observed by the render functions in `ui`.
#[derive(Debug, Default)]
pub struct AppState {
    pub form: DownloadForm,
    pub progress: ProgressState,
    pub is_downloading: bool,
    pub is_maintaining: bool,
    pub popup: Option<PopupResult>,
    pub output_path: Option<PathBuf>,
    pub engine_status: String,
}

impl AppState {
    pub fn new(default_save_path: String, engine_status: String) -> Self {
        Self {
            form: DownloadForm {
                quality: Some(VideoQuality::default()),
                save_path: default_save_path,
                ..Default::default()
            },
            engine_status,
            ..Default::default()
        }
    }

    pub fn is_busy(&self) -> bool {
        self.is_downloading || self.is_maintaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_selects_audio_and_lowest_quality() {
        let state = AppState::new("/tmp".to_string(), String::new());
        assert_eq!(state.form.media_type, MediaType::Audio);
        assert_eq!(state.form.quality, Some(VideoQuality::P144));
        assert_eq!(state.progress.percent, 0);
        assert_eq!(state.progress.label(), "0%");
    }

    #[test]
    fn quality_only_matters_for_video() {
        let mut form = DownloadForm {
            url: "https://example.com/x".into(),
            save_path: "/tmp/out".into(),
            ..Default::default()
        };
        assert_eq!(form.validity(), FieldValidity { url: true, quality: true, save_path: true });

        form.media_type = MediaType::Video;
        let validity = form.validity();
        assert!(!validity.quality);
        assert!(validity.url && validity.save_path);

        form.quality = Some(VideoQuality::P720);
        assert_eq!(form.validity(), FieldValidity { url: true, quality: true, save_path: true });
    }

    #[test]
    fn quality_toggle_group_is_exclusive_and_clearable() {
        let mut form = DownloadForm::default();
        form.toggle_quality(VideoQuality::P480);
        assert_eq!(form.quality, Some(VideoQuality::P480));
        form.toggle_quality(VideoQuality::P1080);
        assert_eq!(form.quality, Some(VideoQuality::P1080));
        form.toggle_quality(VideoQuality::P1080);
        assert_eq!(form.quality, None);
    }

    #[test]
    fn whitespace_fields_are_invalid() {
        let form = DownloadForm {
            url: "   ".into(),
            save_path: "\t".into(),
            ..Default::default()
        };
        let validity = form.validity();
        assert!(!validity.url);
        assert!(!validity.save_path);
    }

    #[test]
    fn quality_heights_follow_labels() {
        for quality in VideoQuality::ALL {
            assert_eq!(format!("{}p", quality.height()), quality.to_string());
        }
    }
}
