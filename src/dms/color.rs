// color.rs
//
// Copyright (C) 2018-2025  Minnesota Department of Transportation
//
//! Color schemes and color values for dynamic message signs
use log::warn;
use pix::rgb::SRgb8;
use std::fmt;

/// Classic color values (`[cb…]` / `colorClassic` scheme)
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ColorClassic {
    Black,
    Red,
    Yellow,
    Green,
    Cyan,
    Blue,
    Magenta,
    White,
    Orange,
    Amber,
}

/// Color scheme for dynamic message signs
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum ColorScheme {
    /// Monochrome with 1-bit values
    #[default]
    Monochrome1Bit = 1,
    /// Monochrome with 8-bit values
    Monochrome8Bit,
    /// Classic color
    ColorClassic,
    /// 24-bit color
    Color24Bit,
}

/// Color value from a MULTI tag
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Color {
    /// Single value for `Monochrome1Bit`, `Monochrome8Bit` or
    /// `ColorClassic`
    Legacy(u8),
    /// Red, green and blue components for `Color24Bit`
    Rgb(u8, u8, u8),
}

/// A color context combines a scheme with foreground and background colors
#[derive(Clone, Debug)]
pub struct ColorCtx {
    /// Color scheme
    color_scheme: ColorScheme,
    /// Default foreground RGB color
    fg_default: (u8, u8, u8),
    /// Current foreground RGB color
    fg_current: (u8, u8, u8),
    /// Default background RGB color
    bg_default: (u8, u8, u8),
    /// Current background RGB color
    bg_current: (u8, u8, u8),
}

impl ColorClassic {
    /// Get RGB triplet for a classic color
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            ColorClassic::Black => (0x00, 0x00, 0x00),
            ColorClassic::Red => (0xFF, 0x00, 0x00),
            ColorClassic::Yellow => (0xFF, 0xFF, 0x00),
            ColorClassic::Green => (0x00, 0xFF, 0x00),
            ColorClassic::Cyan => (0x00, 0xFF, 0xFF),
            ColorClassic::Blue => (0x00, 0x00, 0xFF),
            ColorClassic::Magenta => (0xFF, 0x00, 0xFF),
            ColorClassic::White => (0xFF, 0xFF, 0xFF),
            ColorClassic::Orange => (0xFF, 0xA5, 0x00),
            ColorClassic::Amber => (0xFF, 0xD0, 0x00),
        }
    }

    /// Maybe convert a u8 into a ColorClassic
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(ColorClassic::Black),
            1 => Some(ColorClassic::Red),
            2 => Some(ColorClassic::Yellow),
            3 => Some(ColorClassic::Green),
            4 => Some(ColorClassic::Cyan),
            5 => Some(ColorClassic::Blue),
            6 => Some(ColorClassic::Magenta),
            7 => Some(ColorClassic::White),
            8 => Some(ColorClassic::Orange),
            9 => Some(ColorClassic::Amber),
            _ => None,
        }
    }
}

impl From<ColorClassic> for u8 {
    fn from(c: ColorClassic) -> u8 {
        c as u8
    }
}

impl From<&str> for ColorScheme {
    /// Create a color scheme from a string
    fn from(s: &str) -> Self {
        match s {
            "monochrome1Bit" => ColorScheme::Monochrome1Bit,
            "monochrome8Bit" => ColorScheme::Monochrome8Bit,
            "colorClassic" => ColorScheme::ColorClassic,
            "color24Bit" => ColorScheme::Color24Bit,
            _ => {
                warn!("Unknown color scheme: {}", s);
                ColorScheme::Monochrome1Bit
            }
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Color::Legacy(v) => write!(f, "{v}"),
            Color::Rgb(r, g, b) => write!(f, "{r},{g},{b}"),
        }
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from(rgb: (u8, u8, u8)) -> Self {
        Color::Rgb(rgb.0, rgb.1, rgb.2)
    }
}

impl From<ColorClassic> for Color {
    fn from(c: ColorClassic) -> Self {
        Color::Legacy(c.into())
    }
}

impl Color {
    /// Get RGB triplet for a color (legacy values are classic colors)
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Color::Legacy(v) => ColorClassic::from_u8(v)
                .map(|c| c.rgb())
                .unwrap_or_default(),
            Color::Rgb(r, g, b) => (r, g, b),
        }
    }
}

impl ColorCtx {
    /// Create a new color context
    pub fn new(
        color_scheme: ColorScheme,
        fg_default: (u8, u8, u8),
        bg_default: (u8, u8, u8),
    ) -> Self {
        ColorCtx {
            color_scheme,
            fg_default,
            fg_current: fg_default,
            bg_default,
            bg_current: bg_default,
        }
    }

    /// Get the color scheme
    pub fn color_scheme(&self) -> ColorScheme {
        self.color_scheme
    }

    /// Set the foreground color.
    ///
    /// * `c` New color, or `None` to restore the default.
    ///
    /// Returns `false` if the color is not valid for the scheme.
    pub fn set_foreground(&mut self, c: Option<Color>) -> bool {
        match c {
            Some(c) => match self.rgb(c) {
                Some(rgb) => {
                    self.fg_current = rgb;
                    true
                }
                None => false,
            },
            None => {
                self.fg_current = self.fg_default;
                true
            }
        }
    }

    /// Get the foreground RGB color
    pub fn foreground_rgb(&self) -> (u8, u8, u8) {
        self.fg_current
    }

    /// Get the foreground pixel color
    pub fn foreground(&self) -> SRgb8 {
        let (r, g, b) = self.fg_current;
        SRgb8::new(r, g, b)
    }

    /// Set the background color.
    ///
    /// Returns `false` if the color is not valid for the scheme.
    pub fn set_background(&mut self, c: Color) -> bool {
        match self.rgb(c) {
            Some(rgb) => {
                self.bg_current = rgb;
                true
            }
            None => false,
        }
    }

    /// Get the background RGB color
    pub fn background_rgb(&self) -> (u8, u8, u8) {
        self.bg_current
    }

    /// Get the background pixel color
    pub fn background(&self) -> SRgb8 {
        let (r, g, b) = self.bg_current;
        SRgb8::new(r, g, b)
    }

    /// Get RGB for the specified color.
    ///
    /// Classic colors are accepted by every scheme except the monochrome
    /// ones; 24-bit values only by `Color24Bit`.
    pub fn rgb(&self, c: Color) -> Option<(u8, u8, u8)> {
        match (self.color_scheme, c) {
            (ColorScheme::Monochrome1Bit, Color::Legacy(v)) => {
                self.rgb_monochrome_1(v)
            }
            (ColorScheme::Monochrome8Bit, Color::Legacy(v)) => {
                Some(self.rgb_monochrome_8(v))
            }
            (ColorScheme::Monochrome1Bit, _)
            | (ColorScheme::Monochrome8Bit, _) => None,
            (_, Color::Legacy(v)) => ColorClassic::from_u8(v).map(|c| c.rgb()),
            (ColorScheme::Color24Bit, Color::Rgb(r, g, b)) => Some((r, g, b)),
            _ => None,
        }
    }

    /// Get RGB for a monochrome 1-bit color.
    fn rgb_monochrome_1(&self, v: u8) -> Option<(u8, u8, u8)> {
        match v {
            0 => Some(self.bg_default),
            1 => Some(self.fg_default),
            _ => None,
        }
    }

    /// Get RGB for a monochrome 8-bit color.
    fn rgb_monochrome_8(&self, v: u8) -> (u8, u8, u8) {
        let bg = self.bg_default;
        let fg = self.fg_default;
        let r = ColorCtx::lerp(bg.0, fg.0, v);
        let g = ColorCtx::lerp(bg.1, fg.1, v);
        let b = ColorCtx::lerp(bg.2, fg.2, v);
        (r, g, b)
    }

    /// Interpolate between two color components
    fn lerp(bg: u8, fg: u8, v: u8) -> u8 {
        let d = bg.max(fg) - bg.min(fg);
        let c = d as u32 * v as u32;
        // cheap alternative to divide by 255
        let r = (((c + 1) + (c >> 8)) >> 8) as u8;
        bg.min(fg) + r
    }
}
