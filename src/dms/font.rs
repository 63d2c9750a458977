// font.rs
//
// Copyright (C) 2018-2025  Minnesota Department of Transportation
//
//! This module is for NTCIP 1203 DMS bitmap fonts.
//!
use crate::dms::multi::SyntaxError;
use crate::dms::raster::{RasterError, RasterGraphic};
use log::debug;
use pix::rgb::SRgb8;
use std::collections::HashMap;

/// A character for a bitmap font
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Character {
    /// Character number (code point)
    number: u16,
    /// Width in pixels
    width: u8,
    /// Bitmap data (by rows)
    #[serde(with = "super::base64")]
    bitmap: Vec<u8>,
}

/// A bitmap font
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Font {
    /// Font number
    number: u8,
    /// Name (max 64 characters)
    name: String,
    /// Height in pixels
    height: u8,
    /// Width in pixels (0 for proportional fonts)
    #[serde(default)]
    width: u8,
    /// Default pixel spacing between characters
    char_spacing: u8,
    /// Default pixel spacing between lines
    line_spacing: u8,
    /// Characters in font
    characters: Vec<Character>,
    /// Version ID hash
    #[serde(default)]
    version_id: u16,
}

/// Table of fonts, looked up by number
#[derive(Clone, Debug, Default)]
pub struct FontTable {
    /// Fonts in table
    fonts: HashMap<u8, Font>,
}

impl Character {
    /// Create a new character
    ///
    /// * `number` Code point.
    /// * `width` Width in pixels.
    /// * `bitmap` Packed bitmap, by rows, most significant bit first.
    pub fn new(number: u16, width: u8, bitmap: Vec<u8>) -> Self {
        Character {
            number,
            width,
            bitmap,
        }
    }

    /// Get number (code point)
    pub fn number(&self) -> u16 {
        self.number
    }

    /// Get width in pixels
    pub fn width(&self) -> u8 {
        self.width
    }

    /// Check if a pixel of the character is lit
    fn is_lit(&self, x: i32, y: i32) -> bool {
        let pos = y * i32::from(self.width) + x;
        let by = (pos / 8) as usize;
        let bi = 7 - (pos & 7);
        match self.bitmap.get(by) {
            Some(b) => (b >> bi) & 1 != 0,
            None => false,
        }
    }

    /// Render the character to a raster
    ///
    /// * `raster` Raster to render on.
    /// * `x` Left position of character (0-based).
    /// * `y` Top position of character (0-based).
    /// * `height` Font height in pixels.
    /// * `cf` Foreground color.
    pub fn render_char<R: RasterGraphic>(
        &self,
        raster: &mut R,
        x: i32,
        y: i32,
        height: i32,
        cf: SRgb8,
    ) -> Result<(), RasterError> {
        let width = i32::from(self.width);
        debug!("render_char: {} @ {},{} width: {}", self.number, x, y, width);
        for yy in 0..height {
            for xx in 0..width {
                if self.is_lit(xx, yy) {
                    raster.set_pixel(x + xx, y + yy, cf)?;
                }
            }
        }
        Ok(())
    }
}

impl Font {
    /// Create a new font with no characters
    pub fn new(number: u8, name: &str, height: u8) -> Self {
        Font {
            number,
            name: name.to_string(),
            height,
            width: 0,
            char_spacing: 1,
            line_spacing: 0,
            characters: Vec::new(),
            version_id: 0,
        }
    }

    /// Set the fixed width (0 for proportional)
    pub fn with_width(mut self, width: u8) -> Self {
        self.width = width;
        self
    }

    /// Set the default character spacing
    pub fn with_char_spacing(mut self, char_spacing: u8) -> Self {
        self.char_spacing = char_spacing;
        self
    }

    /// Set the default line spacing
    pub fn with_line_spacing(mut self, line_spacing: u8) -> Self {
        self.line_spacing = line_spacing;
        self
    }

    /// Add a character, replacing any with the same number
    pub fn with_character(mut self, ch: Character) -> Self {
        self.characters.retain(|c| c.number != ch.number);
        self.characters.push(ch);
        self
    }

    /// Get font number
    pub fn number(&self) -> u8 {
        self.number
    }

    /// Get font name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get font height
    pub fn height(&self) -> u8 {
        self.height
    }

    /// Get font width (0 for proportional fonts)
    pub fn width(&self) -> u8 {
        self.width
    }

    /// Get default pixel spacing between characters
    pub fn char_spacing(&self) -> u8 {
        self.char_spacing
    }

    /// Get default pixel spacing between lines
    pub fn line_spacing(&self) -> u8 {
        self.line_spacing
    }

    /// Get version ID hash
    pub fn version_id(&self) -> u16 {
        self.version_id
    }

    /// Get a character
    pub fn character(&self, ch: char) -> Result<&Character, SyntaxError> {
        let code_point = u32::from(ch);
        if let Ok(n) = u16::try_from(code_point) {
            if let Some(c) = self.characters.iter().find(|c| c.number == n) {
                return Ok(c);
            }
        }
        Err(SyntaxError::CharacterNotDefined(ch))
    }

    /// Calculate the width of a span of text.
    ///
    /// * `text` Span of text.
    /// * `cs` Character spacing in pixels.
    pub fn text_width(&self, text: &str, cs: i32) -> Result<i32, SyntaxError> {
        let mut width = 0;
        for ch in text.chars() {
            let c = self.character(ch)?;
            if width > 0 {
                width += cs;
            }
            width += i32::from(c.width());
        }
        Ok(width)
    }
}

impl FontTable {
    /// Create a new font table
    pub fn new() -> Self {
        FontTable::default()
    }

    /// Insert a font into the table
    pub fn insert(&mut self, font: Font) {
        self.fonts.insert(font.number(), font);
    }

    /// Lookup a font by number
    pub fn lookup(&self, fnum: u8) -> Option<&Font> {
        self.fonts.get(&fnum)
    }
}

impl FromIterator<Font> for FontTable {
    fn from_iter<I: IntoIterator<Item = Font>>(iter: I) -> Self {
        let mut fonts = FontTable::new();
        for font in iter {
            fonts.insert(font);
        }
        fonts
    }
}
