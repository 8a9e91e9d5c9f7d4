//! Theme Module
//! Catppuccin Mocha palette used across the panels.

use ratatui::style::Color;

use crate::data::RiskLevel;

pub const TEXT: Color = Color::Rgb(205, 214, 244);
pub const SUBTEXT: Color = Color::Rgb(166, 173, 200);
pub const SURFACE: Color = Color::Rgb(49, 50, 68);
pub const ACCENT: Color = Color::Rgb(137, 180, 250);
pub const TITLE: Color = Color::Rgb(203, 166, 247);

pub const RISK_LOW: Color = Color::Rgb(166, 227, 161);
pub const RISK_MEDIUM: Color = Color::Rgb(249, 226, 175);
pub const RISK_HIGH: Color = Color::Rgb(243, 139, 168);

pub fn risk_color(level: RiskLevel) -> Color {
    match level {
        RiskLevel::Low => RISK_LOW,
        RiskLevel::Medium => RISK_MEDIUM,
        RiskLevel::High => RISK_HIGH,
    }
}
