use eframe::egui;
use log::info;

mod app;
mod config;
mod download;
mod engine;
mod error;
mod localizations;
mod models;
mod progress;
mod theme;
mod ui;

use app::DownloaderApp;
use config::AppConfig;
use localizations::Localizations;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();
    let localizer = Localizations::from_desktop();
    info!(
        "Starting with language {} and save dir {}",
        localizer.current(),
        config.default_save_dir.display()
    );

    let title = localizer.text("app-title");
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([640.0, 720.0])
            .with_min_inner_size([480.0, 560.0])
            .with_title(title.clone()),
        ..Default::default()
    };

    let app = DownloaderApp::new(&config, localizer);

    eframe::run_native(
        &title,
        options,
        Box::new(|cc| {
            // Set light theme
            cc.egui_ctx.set_visuals(egui::Visuals::light());
            Box::new(app)
        }),
    )
}
