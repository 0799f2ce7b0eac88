//! Color constants and auto-scaling helpers for the TUI.

use ratatui::style::Color;

/// Realised rate line color.
pub const RATE_COLOR: Color = Color::Cyan;
/// Stored charge line color.
pub const CHARGE_COLOR: Color = Color::Yellow;
/// Charge gauge color when high (>= 50%).
pub const CHARGE_HIGH: Color = Color::Green;
/// Charge gauge color when medium (>= 20%).
pub const CHARGE_MID: Color = Color::Yellow;
/// Charge gauge color when low (< 20%).
pub const CHARGE_LOW: Color = Color::Red;
/// Header bar foreground.
pub const HEADER_FG: Color = Color::White;
/// Header bar background.
pub const HEADER_BG: Color = Color::DarkGray;
/// Footer help text color.
pub const FOOTER_FG: Color = Color::DarkGray;
/// Error banner color.
pub const ERROR_FG: Color = Color::Red;

/// Returns a color for the stored charge as a fraction of capacity.
pub fn charge_color(fraction: f64) -> Color {
    if fraction >= 0.5 {
        CHARGE_HIGH
    } else if fraction >= 0.2 {
        CHARGE_MID
    } else {
        CHARGE_LOW
    }
}

/// Computes Y-axis bounds from chart data points with 10% padding.
pub fn auto_bounds_y(a: &[(f64, f64)], b: &[(f64, f64)]) -> [f64; 2] {
    let all = a.iter().chain(b.iter()).map(|&(_, y)| y);
    let min = all.clone().fold(f64::INFINITY, f64::min);
    let max = all.fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return [-1.0, 1.0];
    }
    let range = (max - min).max(0.1);
    let pad = range * 0.1;
    [min - pad, max + pad]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_data_gets_unit_bounds() {
        assert_eq!(auto_bounds_y(&[], &[]), [-1.0, 1.0]);
    }

    #[test]
    fn bounds_are_padded() {
        let [lo, hi] = auto_bounds_y(&[(0.0, -2.0)], &[(0.0, 2.0)]);
        assert!(lo < -2.0 && hi > 2.0);
    }

    #[test]
    fn gauge_color_bands() {
        assert_eq!(charge_color(0.9), CHARGE_HIGH);
        assert_eq!(charge_color(0.3), CHARGE_MID);
        assert_eq!(charge_color(0.1), CHARGE_LOW);
    }
}
