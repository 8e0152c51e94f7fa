//! Colour palettes used to tint the tray icon.

use crate::models::TimerMode;
use serde::{Deserialize, Serialize};

/// An RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Light and dark shades for one timer mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Shade {
    light: Rgb,
    dark: Rgb,
}

const fn shade(light: Rgb, dark: Rgb) -> Shade {
    Shade { light, dark }
}

// Tailwind 400 and 300 steps.
const ROSE: Shade = shade(Rgb(251, 113, 133), Rgb(253, 164, 175));
const TEAL: Shade = shade(Rgb(45, 212, 191), Rgb(94, 234, 212));
const INDIGO: Shade = shade(Rgb(129, 140, 248), Rgb(165, 180, 252));
const SKY: Shade = shade(Rgb(56, 189, 248), Rgb(125, 211, 252));
const CYAN: Shade = shade(Rgb(34, 211, 238), Rgb(103, 232, 249));
const BLUE: Shade = shade(Rgb(96, 165, 250), Rgb(147, 197, 253));
const EMERALD: Shade = shade(Rgb(52, 211, 153), Rgb(110, 231, 183));
const LIME: Shade = shade(Rgb(163, 230, 53), Rgb(190, 242, 100));
const VIOLET: Shade = shade(Rgb(167, 139, 250), Rgb(196, 181, 253));
const FUCHSIA: Shade = shade(Rgb(232, 121, 249), Rgb(240, 171, 252));
const PURPLE: Shade = shade(Rgb(192, 132, 252), Rgb(216, 180, 254));

/// The fixed palette set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Theme {
    #[default]
    Rose,
    Ocean,
    Forest,
    Lavender,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Self::Rose, Self::Ocean, Self::Forest, Self::Lavender];

    pub fn id(self) -> &'static str {
        match self {
            Self::Rose => "rose",
            Self::Ocean => "ocean",
            Self::Forest => "forest",
            Self::Lavender => "lavender",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Rose => "Rose",
            Self::Ocean => "Ocean",
            Self::Forest => "Forest",
            Self::Lavender => "Lavender",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.id() == id)
    }

    /// Colour for a timer mode, using the lighter shade in dark mode.
    pub fn color(self, mode: TimerMode, dark_mode: bool) -> Rgb {
        let shade = match (self, mode) {
            (Self::Rose, TimerMode::Focus) => ROSE,
            (Self::Rose, TimerMode::ShortBreak) => TEAL,
            (Self::Rose, TimerMode::LongBreak) => INDIGO,
            (Self::Ocean, TimerMode::Focus) => SKY,
            (Self::Ocean, TimerMode::ShortBreak) => CYAN,
            (Self::Ocean, TimerMode::LongBreak) => BLUE,
            (Self::Forest, TimerMode::Focus) => EMERALD,
            (Self::Forest, TimerMode::ShortBreak) => LIME,
            (Self::Forest, TimerMode::LongBreak) => TEAL,
            (Self::Lavender, TimerMode::Focus) => VIOLET,
            (Self::Lavender, TimerMode::ShortBreak) => FUCHSIA,
            (Self::Lavender, TimerMode::LongBreak) => PURPLE,
        };
        if dark_mode {
            shade.dark
        } else {
            shade.light
        }
    }
}

impl From<String> for Theme {
    fn from(id: String) -> Self {
        Self::from_id(&id).unwrap_or_default()
    }
}

impl From<Theme> for String {
    fn from(theme: Theme) -> Self {
        theme.id().to_string()
    }
}
