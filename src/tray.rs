//! Tray icon drawing, tinted by the active theme.

use crate::models::TimerMode;
use crate::theme::{Rgb, Theme};
use thiserror::Error;
use tray_icon::Icon;

#[derive(Error, Debug)]
pub enum TrayError {
    #[error("Failed to load icon: {0}")]
    IconLoad(#[from] tray_icon::BadIcon),
}

/// Standard macOS tray icon size.
const ICON_SIZE: u32 = 22;

/// Icon for the given mode, in the theme's colour for that mode.
pub fn themed_icon(theme: Theme, mode: TimerMode, dark_mode: bool) -> Result<Icon, TrayError> {
    let rgba = draw_icon(theme.color(mode, dark_mode));
    Icon::from_rgba(rgba, ICON_SIZE, ICON_SIZE).map_err(TrayError::IconLoad)
}

/// Draws an anti-aliased disc with a small stem, as RGBA bytes.
fn draw_icon(Rgb(r, g, b): Rgb) -> Vec<u8> {
    let size = ICON_SIZE;
    let mut rgba = Vec::with_capacity((size * size * 4) as usize);

    let center = size as f32 / 2.0;
    let radius = (size as f32 / 2.0) - 2.0;

    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            let distance = (dx * dx + dy * dy).sqrt();

            let alpha = if distance <= radius {
                255
            } else if distance <= radius + 1.0 {
                ((radius + 1.0 - distance) * 255.0) as u8
            } else {
                0
            };
            if alpha == 0 {
                rgba.extend_from_slice(&[0, 0, 0, 0]);
            } else {
                rgba.extend_from_slice(&[r, g, b, alpha]);
            }
        }
    }

    // Green stem at the top
    let stem_center = size / 2;
    for y in 2..5 {
        for x in (stem_center - 1)..=(stem_center + 1) {
            let idx = ((y * size + x) * 4) as usize;
            rgba[idx..idx + 4].copy_from_slice(&[76, 153, 0, 255]);
        }
    }

    rgba
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_buffer_size() {
        let rgba = draw_icon(Rgb(1, 2, 3));
        assert_eq!(rgba.len(), (ICON_SIZE * ICON_SIZE * 4) as usize);
    }

    #[test]
    fn test_icon_uses_theme_color_at_center() {
        let color = Theme::Forest.color(TimerMode::ShortBreak, false);
        let rgba = draw_icon(color);
        let idx = ((ICON_SIZE / 2 * ICON_SIZE + ICON_SIZE / 2) * 4) as usize;
        assert_eq!(&rgba[idx..idx + 4], &[color.0, color.1, color.2, 255]);
    }

    #[test]
    fn test_icon_corners_are_transparent() {
        let rgba = draw_icon(Rgb(200, 10, 10));
        assert_eq!(&rgba[0..4], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_themed_icon() {
        for theme in Theme::ALL {
            assert!(themed_icon(theme, TimerMode::Focus, true).is_ok());
        }
    }
}
