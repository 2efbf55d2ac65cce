use eframe::egui::{self, Color32};

// Color Palette
// Primary Colors
pub const PRIMARY_BUTTON_BG: Color32 = Color32::from_rgb(0, 128, 255); // Blue for primary actions
pub const SECONDARY_BUTTON_BG: Color32 = Color32::from_rgb(204, 204, 204);

// Toggle groups
pub const TOGGLE_ON_BG: Color32 = PRIMARY_BUTTON_BG;
pub const TOGGLE_OFF_BG: Color32 = Color32::from_rgb(204, 204, 204);
pub const TOGGLE_ON_TEXT: Color32 = Color32::WHITE;
pub const TOGGLE_OFF_TEXT: Color32 = Color32::from_rgb(36, 36, 36);

// Text Colors
pub const BRAND_TEXT: Color32 = Color32::from_rgb(51, 153, 255);
pub const BUTTON_MAIN_TEXT: Color32 = Color32::WHITE;
pub const SECONDARY_TEXT: Color32 = Color32::from_rgb(138, 138, 143);
pub const TEXT_ERROR: Color32 = Color32::from_rgb(200, 30, 30);
pub const TEXT_SUCCESS: Color32 = Color32::from_rgb(20, 140, 60);

// Input color
pub const INPUT_BG: Color32 = Color32::from_rgb(242, 242, 242);

// UI Elements
pub const BORDER_COLOR: Color32 = Color32::from_rgba_premultiplied(60, 60, 67, 15); // Subtle border

// Sizing & Spacing
pub const ROUNDING_FRAME: f32 = 4.0;
pub const ROUNDING_BUTTON: f32 = 6.0;
pub const MIN_SIZE_BUTTON: egui::Vec2 = egui::Vec2::new(160.0, 40.0);
pub const MIN_SIZE_TOGGLE: egui::Vec2 = egui::Vec2::new(72.0, 32.0);
pub const PROGRESS_BAR_HEIGHT: f32 = 30.0;

pub const HEADING_FONT_SIZE: f32 = 32.0;
pub const BODY_FONT_SIZE: f32 = 16.0;
pub const BUTTON_FONT_SIZE: f32 = 18.0;
