use std::env;
use std::path::PathBuf;

use crate::engine::BinaryLocator;

/// Environment variable pointing at a specific yt-dlp executable.
pub const ENGINE_OVERRIDE_VAR: &str = "MEDIA_DL_YTDLP";
const APP_DIR_NAME: &str = "media-downloader";

/// Startup settings. Nothing here is written back to disk.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub default_save_dir: PathBuf,
    pub engine_override: Option<PathBuf>,
    pub install_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        // Set default download directory to user's downloads folder
        let default_save_dir = dirs::download_dir()
            .unwrap_or_else(|| env::current_dir().unwrap_or_default());

        let engine_override = env::var_os(ENGINE_OVERRIDE_VAR)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        let install_dir = dirs::data_local_dir().map(|dir| dir.join(APP_DIR_NAME).join("bin"));

        Self {
            default_save_dir,
            engine_override,
            install_dir,
        }
    }

    pub fn locator(&self) -> BinaryLocator {
        BinaryLocator::new(self.engine_override.clone(), self.install_dir.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_dir_is_namespaced() {
        let config = AppConfig::from_env();
        if let Some(dir) = &config.install_dir {
            assert!(dir.ends_with("media-downloader/bin"));
        }
    }

    #[test]
    fn locator_uses_install_dir() {
        let config = AppConfig {
            default_save_dir: PathBuf::from("/tmp"),
            engine_override: None,
            install_dir: Some(PathBuf::from("/opt/media")),
        };
        assert_eq!(
            config.locator().installed_path(),
            Some(PathBuf::from("/opt/media").join(crate::engine::binary::BINARY_NAME))
        );
    }
}
