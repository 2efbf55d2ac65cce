use eframe::egui;
use log::{info, warn};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::download::{Maintenance, Orchestrator};
use crate::engine::{binary, BinaryLocator, YtDlp};
use crate::error::StartError;
use crate::localizations::Localizations;
use crate::models::{AppEvent, AppState, PopupResult, ProgressState};
use crate::progress::ChannelSink;
use crate::ui::{self, UiAction};

pub struct DownloaderApp {
    pub state: AppState,
    localizer: Localizations,
    orchestrator: Orchestrator,
    locator: BinaryLocator,
    event_sender: Sender<AppEvent>,
    event_receiver: Receiver<AppEvent>,
}

impl DownloaderApp {
    pub fn new(config: &AppConfig, localizer: Localizations) -> Self {
        let (tx, rx) = mpsc::channel();
        let locator = config.locator();
        let engine = Arc::new(YtDlp::new(locator.clone()));

        let engine_status = match locator.locate() {
            Some(path) => match binary::version(&path) {
                Ok(version) => format!("yt-dlp {}", version),
                Err(err) => {
                    warn!("Could not query yt-dlp version: {:#}", err);
                    path.display().to_string()
                }
            },
            None => {
                warn!("yt-dlp is not installed");
                String::new()
            }
        };

        Self {
            state: AppState::new(
                config.default_save_dir.to_string_lossy().to_string(),
                engine_status,
            ),
            localizer,
            orchestrator: Orchestrator::new(engine),
            locator,
            event_sender: tx,
            event_receiver: rx,
        }
    }

    fn show_start_error(&mut self, err: StartError) {
        info!("Not starting: {}", err);
        self.state.popup = Some(start_error_popup(&err, &self.localizer));
    }

    pub fn start_download(&mut self, ctx: &egui::Context) {
        let sink = Arc::new(ChannelSink::new(
            self.event_sender.clone(),
            Some(ctx.clone()),
        ));
        let started = self.orchestrator.start_download(
            &self.state.form,
            sink,
            self.event_sender.clone(),
            Some(ctx.clone()),
            self.localizer.outcome_text(),
        );

        match started {
            Ok(_) => {
                self.state.is_downloading = true;
                self.state.progress = ProgressState::default();
                self.state.output_path = None;
            }
            Err(err) => self.show_start_error(err),
        }
    }

    fn start_maintenance(&mut self, task: Maintenance, ctx: &egui::Context) {
        let started = self.orchestrator.start_maintenance(
            task,
            self.locator.clone(),
            self.event_sender.clone(),
            Some(ctx.clone()),
            self.localizer.outcome_text(),
        );
        match started {
            Ok(_) => self.state.is_maintaining = true,
            Err(err) => self.show_start_error(err),
        }
    }

    /// Applies worker messages to the view-model.
    pub fn process_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            apply_event(&mut self.state, event);
        }
    }

    pub fn update_ui(&mut self, ctx: &egui::Context) {
        self.process_events();
        if self.orchestrator.is_busy() {
            // Keeps the bar animating between progress reports.
            ctx.request_repaint_after(Duration::from_millis(250));
        }

        let mut action = None;
        let engine_available = !self.state.engine_status.is_empty();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(self.state.popup.is_none(), |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui::render_heading(ui, &self.localizer);
                    ui.add_space(16.0);

                    let url_response =
                        ui::render_url_input(ui, &mut self.state.form, &self.localizer);
                    if url_response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter))
                    {
                        action = Some(UiAction::StartDownload);
                    }
                    ui.add_space(10.0);

                    ui::render_media_type_selector(ui, &mut self.state.form, &self.localizer);
                    ui.add_space(10.0);

                    ui::render_quality_selector(ui, &mut self.state.form, &self.localizer);
                    ui.add_space(10.0);

                    if ui::render_save_location(ui, &mut self.state.form, &self.localizer) {
                        info!("Save location set to {}", self.state.form.save_path);
                    }
                    ui.add_space(16.0);

                    ui::render_progress(ui, &self.state, &self.localizer);
                    ui.add_space(16.0);

                    if let Some(clicked) =
                        ui::render_buttons(ui, &self.state, engine_available, &self.localizer)
                    {
                        action = Some(clicked);
                    }
                });
            });
        });

        if let Some(popup) = &self.state.popup {
            if ui::render_popup(ctx, popup, &self.localizer) {
                self.state.popup = None;
            }
        }

        match action {
            Some(UiAction::StartDownload) => self.start_download(ctx),
            Some(UiAction::UpdateEngine) => self.start_maintenance(Maintenance::Update, ctx),
            Some(UiAction::InstallEngine) => self.start_maintenance(Maintenance::Install, ctx),
            _ => {}
        }
    }
}

fn start_error_popup(err: &StartError, localizer: &Localizations) -> PopupResult {
    let mut message = localizer.text(err.message_key());
    if let StartError::Worker(cause) = err {
        message = format!("{} {}", message, cause);
    }
    PopupResult::error(localizer.text("popup-error"), message)
}

fn apply_event(state: &mut AppState, event: AppEvent) {
    match event {
        AppEvent::Progress(percent) => state.progress.percent = percent,
        AppEvent::DownloadFinished { popup, output_path } => {
            state.is_downloading = false;
            state.output_path = output_path;
            state.popup = Some(popup);
        }
        AppEvent::MaintenanceFinished {
            popup,
            engine_status,
        } => {
            state.is_maintaining = false;
            if let Some(status) = engine_status {
                state.engine_status = status;
            }
            state.popup = Some(popup);
        }
    }
}

impl eframe::App for DownloaderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_ui(ctx);
    }
}
