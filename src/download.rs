//! Turns form state into engine calls on a background worker.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

use eframe::egui;
use log::{error, info, warn};

use crate::engine::{binary, BinaryLocator, Engine, EngineConfig};
use crate::error::{EngineError, StartError, ValidationError};
use crate::models::{AppEvent, DownloadForm, DownloadRequest, MediaType, PopupResult};
use crate::progress::{self, ProgressEvent, ProgressSink};

/// Builds a request from the form, checking fields in display order.
pub fn request_from_form(form: &DownloadForm) -> Result<DownloadRequest, ValidationError> {
    let url = form.url.trim();
    if url.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }
    if form.media_type == MediaType::Video && form.quality.is_none() {
        return Err(ValidationError::MissingQuality);
    }
    let save_path = form.save_path.trim();
    if save_path.is_empty() {
        return Err(ValidationError::EmptySavePath);
    }

    Ok(DownloadRequest {
        url: url.to_string(),
        media_type: form.media_type,
        video_quality: match form.media_type {
            MediaType::Video => form.quality,
            MediaType::Audio => None,
        },
        save_path: PathBuf::from(save_path),
    })
}

/// Localized strings the worker needs to build its result popup.
#[derive(Debug, Clone)]
pub struct OutcomeText {
    pub success_title: String,
    pub success_message: String,
    pub error_title: String,
    pub failure_prefix: String,
}

impl Default for OutcomeText {
    fn default() -> Self {
        Self {
            success_title: "Success".to_string(),
            success_message: "File downloaded successfully!".to_string(),
            error_title: "Error".to_string(),
            failure_prefix: "An error occurred during download:".to_string(),
        }
    }
}

/// Engine maintenance jobs that share the download worker slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Maintenance {
    Install,
    Update,
}

/// Releases the single-flight flag when the worker ends, panics included.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "engine panicked".to_string()
    }
}

/// Runs at most one engine job at a time.
pub struct Orchestrator {
    engine: Arc<dyn Engine>,
    busy: Arc<AtomicBool>,
}

impl Orchestrator {
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self {
            engine,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn try_acquire(&self) -> Option<BusyGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(Arc::clone(&self.busy)))
    }

    /// Spawns `job` on a named worker holding the busy slot, then posts the
    /// event it returns and wakes the UI.
    fn run_exclusive<F>(
        &self,
        name: &str,
        events: Sender<AppEvent>,
        ctx: Option<egui::Context>,
        job: F,
    ) -> Result<thread::JoinHandle<()>, StartError>
    where
        F: FnOnce() -> AppEvent + Send + 'static,
    {
        let guard = self.try_acquire().ok_or(StartError::Busy)?;

        thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let event = job();
                drop(guard);
                if events.send(event).is_err() {
                    warn!("UI went away before the worker finished");
                }
                if let Some(ctx) = ctx {
                    ctx.request_repaint();
                }
            })
            .map_err(StartError::Worker)
    }

    /// Validates the form and starts one download on a worker thread.
    ///
    /// Progress goes to `sink`; the terminal popup goes to `events`.
    pub fn start_download(
        &self,
        form: &DownloadForm,
        sink: Arc<dyn ProgressSink>,
        events: Sender<AppEvent>,
        ctx: Option<egui::Context>,
        text: OutcomeText,
    ) -> Result<thread::JoinHandle<()>, StartError> {
        let request = request_from_form(form)?;
        let engine = Arc::clone(&self.engine);
        info!(
            "Starting {:?} download of {} into {}",
            request.media_type,
            request.url,
            request.save_path.display()
        );

        self.run_exclusive("download-worker", events, ctx, move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                let config = EngineConfig::for_request(&request)?;
                engine.download(&request.url, &config, &mut |event: &ProgressEvent| {
                    progress::relay(event, sink.as_ref())
                })
            }));

            match result {
                Ok(Ok(outcome)) => AppEvent::DownloadFinished {
                    popup: PopupResult::success(text.success_title, text.success_message),
                    output_path: outcome.output_path,
                },
                Ok(Err(EngineError::InvalidParameter(message))) => {
                    warn!("Engine rejected parameters: {}", message);
                    AppEvent::DownloadFinished {
                        popup: PopupResult::error(text.error_title, message),
                        output_path: None,
                    }
                }
                Ok(Err(err)) => {
                    error!("Download failed: {}", err);
                    AppEvent::DownloadFinished {
                        popup: PopupResult::error(
                            text.error_title,
                            format!("{} {}", text.failure_prefix, err),
                        ),
                        output_path: None,
                    }
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    error!("Engine panicked: {}", message);
                    AppEvent::DownloadFinished {
                        popup: PopupResult::error(
                            text.error_title,
                            format!("{} {}", text.failure_prefix, message),
                        ),
                        output_path: None,
                    }
                }
            }
        })
    }

    /// Installs or updates yt-dlp in the background.
    pub fn start_maintenance(
        &self,
        task: Maintenance,
        locator: BinaryLocator,
        events: Sender<AppEvent>,
        ctx: Option<egui::Context>,
        text: OutcomeText,
    ) -> Result<thread::JoinHandle<()>, StartError> {
        self.run_exclusive("engine-maintenance", events, ctx, move || {
            let result = match task {
                Maintenance::Install => binary::install_latest(&locator)
                    .map(|path| format!("yt-dlp installed to {}", path.display())),
                Maintenance::Update => locator
                    .locate()
                    .ok_or_else(|| anyhow::Error::new(EngineError::NotFound))
                    .and_then(|path| binary::self_update(&path)),
            };

            let engine_status = locator
                .locate()
                .and_then(|path| binary::version(&path).ok())
                .map(|version| format!("yt-dlp {}", version));

            match result {
                Ok(message) => {
                    info!("{:?} finished: {}", task, message);
                    AppEvent::MaintenanceFinished {
                        popup: PopupResult::success(text.success_title, message),
                        engine_status,
                    }
                }
                Err(err) => {
                    error!("{:?} failed: {:#}", task, err);
                    AppEvent::MaintenanceFinished {
                        popup: PopupResult::error(text.error_title, format!("{:#}", err)),
                        engine_status,
                    }
                }
            }
        })
    }
}
