//! Progress events coming out of the engine and the sink they are reported to.

use std::sync::mpsc::Sender;

use eframe::egui;
use log::debug;

use crate::models::AppEvent;

/// Status the engine uses while bytes are still arriving.
pub const STATUS_DOWNLOADING: &str = "downloading";

/// One progress callback from the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub status: String,
    pub percent_str: Option<String>,
}

impl ProgressEvent {
    #[cfg(test)]
    pub fn downloading(percent_str: impl Into<String>) -> Self {
        Self {
            status: STATUS_DOWNLOADING.to_string(),
            percent_str: Some(percent_str.into()),
        }
    }
}

/// Destination for percentage updates during a download.
pub trait ProgressSink: Send + Sync {
    fn report(&self, percent: u8);
}

/// Parses engine percent strings such as `"42%"` or `" 42.7%"`.
///
/// Fractions are truncated. Anything that is not a finite number in
/// `0..=100` yields `None`.
pub fn parse_percent(raw: &str) -> Option<u8> {
    let trimmed = raw.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    let value: f32 = number.parse().ok()?;
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return None;
    }
    Some(value as u8)
}

/// Forwards a `downloading` event to the sink. Other statuses and malformed
/// percentages are dropped.
pub fn relay(event: &ProgressEvent, sink: &dyn ProgressSink) {
    if event.status != STATUS_DOWNLOADING {
        return;
    }
    let Some(raw) = event.percent_str.as_deref() else {
        return;
    };
    match parse_percent(raw) {
        Some(percent) => sink.report(percent),
        None => debug!("Ignoring malformed progress value {:?}", raw),
    }
}

/// Sink that posts progress to the UI thread and wakes it up.
pub struct ChannelSink {
    tx: Sender<AppEvent>,
    ctx: Option<egui::Context>,
}

impl ChannelSink {
    pub fn new(tx: Sender<AppEvent>, ctx: Option<egui::Context>) -> Self {
        Self { tx, ctx }
    }
}

impl ProgressSink for ChannelSink {
    fn report(&self, percent: u8) {
        // The receiver only goes away when the window closes.
        if self.tx.send(AppEvent::Progress(percent)).is_err() {
            return;
        }
        if let Some(ctx) = &self.ctx {
            ctx.request_repaint();
        }
    }
}
