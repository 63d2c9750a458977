// config.rs
//
// Copyright (C) 2018-2025  Minnesota Department of Transportation
//
//! Configuration information
use crate::dms::color::{Color, ColorClassic, ColorCtx, ColorScheme};
use crate::dms::multi::{JustificationLine, JustificationPage};
use std::time::Duration;

/// VMS configuration
///
/// Character width and height are 0 unless the sign is character-matrix
/// (both set) or line-matrix (height only).
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct VmsCfg {
    /// Character height (pixels) — `vmsCharacterHeightPixels`
    pub char_height_pixels: u8,
    /// Character width (pixels) — `vmsCharacterWidthPixels`
    pub char_width_pixels: u8,
    /// Sign height (pixels) — `vmsSignHeightPixels`
    pub sign_height_pixels: u16,
    /// Sign width (pixels) — `vmsSignWidthPixels`
    pub sign_width_pixels: u16,
}

/// MULTI configuration
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct MultiCfg {
    /// Color scheme — `dmsColorScheme`
    pub color_scheme: ColorScheme,
    /// Serves as dmsDefaultForegroundRGB and dmsDefaultForegroundColor
    pub default_foreground_rgb: Color,
    /// Serves as dmsDefaultBackgroundRGB and dmsDefaultBackgroundColor
    pub default_background_rgb: Color,
    /// Default font number — `defaultFont`
    pub default_font: u8,
    /// Default line justification — `defaultJustificationLine`
    pub default_justification_line: JustificationLine,
    /// Default page justification — `defaultJustificationPage`
    pub default_justification_page: JustificationPage,
    /// Default page on time (deciseconds) — `defaultPageOnTime`
    pub default_page_on_time: u16,
    /// Default page off time (deciseconds) — `defaultPageOffTime`
    pub default_page_off_time: u16,
}

impl VmsCfg {
    /// Create a full-matrix configuration
    pub fn full_matrix(width: u16, height: u16) -> Self {
        VmsCfg {
            char_height_pixels: 0,
            char_width_pixels: 0,
            sign_height_pixels: height,
            sign_width_pixels: width,
        }
    }

    /// Check for a character-matrix sign
    pub fn is_char_matrix(&self) -> bool {
        self.char_width_pixels > 0
    }

    /// Check for a full-matrix sign
    pub fn is_full_matrix(&self) -> bool {
        self.char_height_pixels == 0
    }
}

impl Default for VmsCfg {
    fn default() -> Self {
        VmsCfg {
            char_height_pixels: 7,
            char_width_pixels: 5,
            sign_height_pixels: 21,
            sign_width_pixels: 40,
        }
    }
}

impl MultiCfg {
    /// Get a color context with default colors
    pub fn color_ctx(&self) -> ColorCtx {
        ColorCtx::new(
            self.color_scheme,
            self.default_foreground_rgb.rgb(),
            self.default_background_rgb.rgb(),
        )
    }

    /// Get the default page on interval
    pub fn page_on_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.default_page_on_time) * 100)
    }

    /// Get the default page off interval
    pub fn page_off_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.default_page_off_time) * 100)
    }
}

impl Default for MultiCfg {
    fn default() -> Self {
        MultiCfg {
            color_scheme: ColorScheme::Monochrome1Bit,
            default_foreground_rgb: ColorClassic::Amber.into(),
            default_background_rgb: ColorClassic::Black.into(),
            default_font: 1,
            default_justification_line: JustificationLine::Center,
            default_justification_page: JustificationPage::Middle,
            default_page_on_time: 30,
            default_page_off_time: 0,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = MultiCfg::default();
        assert_eq!(cfg.page_on_interval(), Duration::from_secs(3));
        assert_eq!(cfg.page_off_interval(), Duration::ZERO);
        let ctx = cfg.color_ctx();
        assert_eq!(ctx.foreground_rgb(), (0xFF, 0xD0, 0x00));
        assert_eq!(ctx.background_rgb(), (0, 0, 0));
        let vms = VmsCfg::default();
        assert!(vms.is_char_matrix());
        assert!(!vms.is_full_matrix());
        let vms = VmsCfg::full_matrix(140, 28);
        assert!(!vms.is_char_matrix());
        assert!(vms.is_full_matrix());
    }

    #[test]
    fn json() {
        let cfg: MultiCfg = serde_json::from_str(
            r#"{"color_scheme":"Color24Bit",
            "default_foreground_rgb":{"Rgb":[255,255,255]},
            "default_justification_line":"Left",
            "default_page_on_time":25}"#,
        )
        .unwrap();
        assert_eq!(cfg.color_scheme, ColorScheme::Color24Bit);
        assert_eq!(cfg.default_foreground_rgb, Color::Rgb(255, 255, 255));
        assert_eq!(cfg.default_justification_line, JustificationLine::Left);
        assert_eq!(cfg.default_justification_page, JustificationPage::Middle);
        assert_eq!(cfg.page_on_interval(), Duration::from_millis(2500));
        let vms: VmsCfg =
            serde_json::from_str(r#"{"sign_width_pixels":96}"#).unwrap();
        assert_eq!(vms.sign_width_pixels, 96);
        assert_eq!(vms.sign_height_pixels, 21);
        let out = serde_json::to_string(&vms).unwrap();
        let back: VmsCfg = serde_json::from_str(&out).unwrap();
        assert_eq!(back, vms);
    }
}
