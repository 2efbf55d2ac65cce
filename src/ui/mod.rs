use eframe::egui::{self, Color32, RichText, Stroke};
use rfd::FileDialog;
use std::path::Path;

use crate::localizations::Localizations;
use crate::models::{AppState, DownloadForm, MediaType, PopupKind, PopupResult, VideoQuality};
use crate::theme::*;

/// What the user asked for during one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    StartDownload,
    UpdateEngine,
    InstallEngine,
}

fn field_label(ui: &mut egui::Ui, text: String) {
    ui.label(RichText::new(text).size(BODY_FONT_SIZE));
}

fn field_stroke(valid: bool) -> Stroke {
    if valid {
        Stroke::new(1.0, Color32::LIGHT_GRAY)
    } else {
        Stroke::new(1.0, TEXT_ERROR)
    }
}

fn toggle_button(ui: &mut egui::Ui, selected: bool, text: &str) -> egui::Response {
    let (fill, color) = if selected {
        (TOGGLE_ON_BG, TOGGLE_ON_TEXT)
    } else {
        (TOGGLE_OFF_BG, TOGGLE_OFF_TEXT)
    };
    ui.add(
        egui::Button::new(RichText::new(text).size(BODY_FONT_SIZE).color(color))
            .fill(fill)
            .min_size(MIN_SIZE_TOGGLE)
            .rounding(ROUNDING_BUTTON),
    )
}

pub fn render_heading(ui: &mut egui::Ui, localizer: &Localizations) {
    ui.vertical_centered(|ui| {
        ui.label(
            RichText::new(localizer.text("app-title"))
                .size(HEADING_FONT_SIZE)
                .color(BRAND_TEXT)
                .strong(),
        );
    });
}

pub fn render_url_input(
    ui: &mut egui::Ui,
    form: &mut DownloadForm,
    localizer: &Localizations,
) -> egui::Response {
    field_label(ui, localizer.text("url-label"));

    egui::Frame::group(ui.style())
        .fill(INPUT_BG)
        .stroke(field_stroke(form.validity().url))
        .rounding(ROUNDING_FRAME)
        .show(ui, |ui| {
            ui.add_sized(
                [ui.available_width(), 32.0],
                egui::TextEdit::singleline(&mut form.url)
                    .hint_text(localizer.text("url-placeholder"))
                    .frame(false)
                    .font(egui::FontId::proportional(BODY_FONT_SIZE)),
            )
        })
        .inner
}

pub fn render_media_type_selector(
    ui: &mut egui::Ui,
    form: &mut DownloadForm,
    localizer: &Localizations,
) {
    field_label(ui, localizer.text("media-type-label"));
    ui.horizontal(|ui| {
        for (media_type, key) in [
            (MediaType::Audio, "media-audio"),
            (MediaType::Video, "media-video"),
        ] {
            let selected = form.media_type == media_type;
            if toggle_button(ui, selected, &localizer.text(key)).clicked() {
                form.media_type = media_type;
            }
        }
    });
}

pub fn render_quality_selector(
    ui: &mut egui::Ui,
    form: &mut DownloadForm,
    localizer: &Localizations,
) {
    field_label(ui, localizer.text("quality-label"));
    ui.horizontal_wrapped(|ui| {
        for quality in VideoQuality::ALL {
            let selected = form.quality == Some(quality);
            if toggle_button(ui, selected, quality.label()).clicked() {
                form.toggle_quality(quality);
            }
        }
    });
    if !form.validity().quality {
        ui.label(
            RichText::new(localizer.text("error-missing-quality"))
                .small()
                .color(TEXT_ERROR),
        );
    }
}

/// Returns true when the picker changed the save path.
pub fn render_save_location(
    ui: &mut egui::Ui,
    form: &mut DownloadForm,
    localizer: &Localizations,
) -> bool {
    let mut changed = false;
    field_label(ui, localizer.text("save-location-label"));

    ui.horizontal(|ui| {
        let valid = form.validity().save_path;
        egui::Frame::none()
            .fill(INPUT_BG)
            .rounding(ROUNDING_FRAME)
            .stroke(field_stroke(valid))
            .show(ui, |ui| {
                ui.set_min_height(36.0);
                ui.add_sized(
                    [(ui.available_width() - MIN_SIZE_BUTTON.x - 8.0).max(120.0), 36.0],
                    egui::TextEdit::singleline(&mut form.save_path)
                        .hint_text(localizer.text("save-location-placeholder"))
                        .frame(false)
                        .margin(egui::vec2(8.0, 8.0)),
                );
            });

        let button = egui::Button::new(
            RichText::new(localizer.text("choose-location"))
                .size(BODY_FONT_SIZE)
                .color(BUTTON_MAIN_TEXT),
        )
        .min_size(MIN_SIZE_BUTTON)
        .fill(PRIMARY_BUTTON_BG)
        .rounding(ROUNDING_BUTTON);

        if ui.add(button).clicked() {
            let current = Path::new(form.save_path.trim());
            let start = if current.is_dir() {
                current
            } else {
                Path::new(".")
            };
            if let Some(path) = FileDialog::new().set_directory(start).pick_folder() {
                form.save_path = path.to_string_lossy().to_string();
                changed = true;
            }
        }
    });

    changed
}

pub fn render_progress(ui: &mut egui::Ui, state: &AppState, localizer: &Localizations) {
    let bar = egui::ProgressBar::new(state.progress.fraction()).animate(state.is_downloading);
    ui.add_sized([ui.available_width(), PROGRESS_BAR_HEIGHT], bar);

    ui.horizontal(|ui| {
        ui.label(RichText::new(state.progress.label()).size(BODY_FONT_SIZE));
        if state.is_downloading {
            ui.label(RichText::new(localizer.text("status-downloading")).color(SECONDARY_TEXT));
        } else if state.is_maintaining {
            ui.spinner();
            ui.label(RichText::new(localizer.text("status-maintaining")).color(SECONDARY_TEXT));
        }
    });

    if let Some(path) = &state.output_path {
        ui.label(
            RichText::new(format!("{} {}", localizer.text("saved-to"), path.display()))
                .color(TEXT_SUCCESS),
        );
    }
}

pub fn render_buttons(
    ui: &mut egui::Ui,
    state: &AppState,
    engine_available: bool,
    localizer: &Localizations,
) -> Option<UiAction> {
    let mut action = None;

    ui.vertical_centered(|ui| {
        let start = egui::Button::new(
            RichText::new(localizer.text("download-button"))
                .size(BUTTON_FONT_SIZE)
                .color(BUTTON_MAIN_TEXT),
        )
        .min_size(egui::vec2(ui.available_width(), 48.0))
        .fill(PRIMARY_BUTTON_BG)
        .rounding(ROUNDING_BUTTON)
        .stroke(Stroke::new(1.0, BORDER_COLOR));

        if ui.add_enabled(!state.is_busy(), start).clicked() {
            action = Some(UiAction::StartDownload);
        }
    });

    ui.add_space(8.0);

    ui.horizontal(|ui| {
        let (key, maintenance) = if engine_available {
            ("update-button", UiAction::UpdateEngine)
        } else {
            ("install-button", UiAction::InstallEngine)
        };
        let button = egui::Button::new(RichText::new(localizer.text(key)).size(BODY_FONT_SIZE))
            .min_size(MIN_SIZE_BUTTON)
            .fill(SECONDARY_BUTTON_BG)
            .rounding(ROUNDING_BUTTON);
        if ui.add_enabled(!state.is_busy(), button).clicked() {
            action = Some(maintenance);
        }

        let status = if engine_available {
            RichText::new(&state.engine_status).color(SECONDARY_TEXT)
        } else {
            RichText::new(localizer.text("engine-missing")).color(TEXT_ERROR)
        };
        ui.label(status.small());
    });

    action
}

/// Shows the pending popup. Returns true once the user dismissed it.
pub fn render_popup(ctx: &egui::Context, popup: &PopupResult, localizer: &Localizations) -> bool {
    let mut dismissed = false;
    let color = match popup.kind {
        PopupKind::Success => TEXT_SUCCESS,
        PopupKind::Error => TEXT_ERROR,
    };

    egui::Window::new(RichText::new(&popup.title).strong())
        .id(egui::Id::new("result-popup"))
        .collapsible(false)
        .resizable(false)
        .default_width(400.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.add_space(8.0);
            ui.label(RichText::new(&popup.message).size(BODY_FONT_SIZE).color(color));
            ui.add_space(12.0);
            ui.vertical_centered(|ui| {
                if ui.button(localizer.text("ok-button")).clicked() {
                    dismissed = true;
                }
            });
        });

    dismissed
}
