//! Finding, installing and updating the yt-dlp executable.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};
use bytes::Bytes;
use log::{info, warn};

#[cfg(windows)]
pub const BINARY_NAME: &str = "yt-dlp.exe";
#[cfg(not(windows))]
pub const BINARY_NAME: &str = "yt-dlp";

const RELEASE_BASE_URL: &str = "https://github.com/yt-dlp/yt-dlp/releases/latest/download";

/// Name of the release asset for the current platform. Everything except the
/// final fallback is a standalone executable; `yt-dlp` is a zipapp that
/// needs `python3`.
pub fn release_asset() -> &'static str {
    if cfg!(windows) {
        "yt-dlp.exe"
    } else if cfg!(target_os = "macos") {
        "yt-dlp_macos"
    } else if cfg!(all(target_os = "linux", target_arch = "x86_64")) {
        "yt-dlp_linux"
    } else if cfg!(all(target_os = "linux", target_arch = "aarch64")) {
        "yt-dlp_linux_aarch64"
    } else {
        "yt-dlp"
    }
}

pub fn release_url() -> String {
    format!("{}/{}", RELEASE_BASE_URL, release_asset())
}

/// Resolves the yt-dlp executable: explicit override, then `PATH`, then the
/// app-local install directory.
#[derive(Debug, Clone, Default)]
pub struct BinaryLocator {
    override_path: Option<PathBuf>,
    install_dir: Option<PathBuf>,
}

impl BinaryLocator {
    pub fn new(override_path: Option<PathBuf>, install_dir: Option<PathBuf>) -> Self {
        Self {
            override_path,
            install_dir,
        }
    }

    pub fn installed_path(&self) -> Option<PathBuf> {
        self.install_dir.as_ref().map(|dir| dir.join(BINARY_NAME))
    }

    pub fn locate(&self) -> Option<PathBuf> {
        if let Some(path) = &self.override_path {
            if path.is_file() {
                return Some(path.clone());
            }
            warn!("Configured yt-dlp {} does not exist, searching PATH", path.display());
        }

        if let Ok(path) = which::which(BINARY_NAME) {
            return Some(path);
        }

        self.installed_path().filter(|path| path.is_file())
    }
}

/// Downloads the latest standalone yt-dlp release into the install directory.
pub fn install_latest(locator: &BinaryLocator) -> Result<PathBuf> {
    let target = locator
        .installed_path()
        .context("No local data directory available to install yt-dlp into")?;
    let url = release_url();
    info!("Installing yt-dlp from {} to {}", url, target.display());

    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;
    let body: Bytes = client
        .get(&url)
        .send()
        .and_then(|response| response.error_for_status())
        .with_context(|| format!("Failed to download {}", url))?
        .bytes()
        .context("Failed to read yt-dlp download")?;

    if body.is_empty() {
        bail!("Downloaded yt-dlp binary from {} is empty", url);
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&target, &body).with_context(|| format!("Failed to write {}", target.display()))?;
    make_executable(&target)?;

    info!("Installed yt-dlp ({} bytes)", body.len());
    Ok(target)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(path, permissions)
        .with_context(|| format!("Failed to mark {} executable", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Runs `yt-dlp -U` and returns what it printed.
pub fn self_update(binary: &Path) -> Result<String> {
    info!("Updating {}", binary.display());
    let output = Command::new(binary)
        .arg("-U")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .with_context(|| format!("Failed to run {}", binary.display()))?;

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if output.status.success() {
        if stdout.is_empty() {
            Ok("yt-dlp is up to date".to_string())
        } else {
            Ok(stdout)
        }
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        bail!(
            "{} exited with {}: {}",
            binary.display(),
            output.status,
            if stderr.is_empty() { stdout } else { stderr }
        )
    }
}

/// `yt-dlp --version`, for the status line.
pub fn version(binary: &Path) -> Result<String> {
    let output = Command::new(binary)
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("Failed to run {}", binary.display()))?;
    if !output.status.success() {
        bail!("{} --version exited with {}", binary.display(), output.status);
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
