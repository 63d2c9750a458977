// raster.rs
//
// Copyright (C) 2009-2025  Minnesota Department of Transportation
//
//! Raster graphics for rendered DMS pages
//!
//! A [BitmapGraphic] has one bit per pixel (lit or unlit), displayed with a
//! single foreground color.  A [PixmapGraphic] has a full color for every
//! pixel.
//!
//! [BitmapGraphic]: struct.BitmapGraphic.html
//! [PixmapGraphic]: struct.PixmapGraphic.html
use pix::rgb::SRgb8;
use pix::{Raster, Region};

/// Errors from raster operations
#[derive(Clone, Copy, Debug, thiserror::Error, Eq, PartialEq)]
pub enum RasterError {
    /// Pixel position outside of raster bounds
    #[error("pixel out of bounds: {0},{1}")]
    OutOfBounds(i32, i32),
    /// Pixel data does not match raster dimensions
    #[error("pixel data size mismatch")]
    SizeMismatch,
    /// Raster has no pixels
    #[error("empty raster")]
    Empty,
}

/// Result type
type Result<T> = std::result::Result<T, RasterError>;

/// Raster graphic
///
/// Positions are 0-based.
pub trait RasterGraphic {
    /// Get the width in pixels
    fn width(&self) -> u32;

    /// Get the height in pixels
    fn height(&self) -> u32;

    /// Get the color of one pixel
    fn pixel(&self, x: i32, y: i32) -> Result<SRgb8>;

    /// Set the color of one pixel
    fn set_pixel(&mut self, x: i32, y: i32, clr: SRgb8) -> Result<()>;

    /// Get the color to copy from one pixel onto another raster.
    ///
    /// * `fg` Foreground color for lit pixels of a bitmap.
    ///
    /// Returns `None` for pixels which should not be copied.
    fn copy_color(&self, x: i32, y: i32, fg: SRgb8) -> Option<SRgb8>;

    /// Check that a region fits within the raster.
    ///
    /// On failure, the error holds the first pixel position found outside
    /// the raster.
    fn check_bounds(&self, x: i32, y: i32, w: u32, h: u32) -> Result<()> {
        let right = i64::from(x) + i64::from(w);
        let bottom = i64::from(y) + i64::from(h);
        if x < 0 {
            Err(RasterError::OutOfBounds(x, y))
        } else if right > i64::from(self.width()) {
            let xx = x.max(self.width() as i32);
            Err(RasterError::OutOfBounds(xx, y))
        } else if y < 0 {
            Err(RasterError::OutOfBounds(x, y))
        } else if bottom > i64::from(self.height()) {
            let yy = y.max(self.height() as i32);
            Err(RasterError::OutOfBounds(x, yy))
        } else {
            Ok(())
        }
    }

    /// Fill the whole raster with one color
    fn fill(&mut self, clr: SRgb8) {
        // bounds are known, so no pixel can fail
        let _ = self.fill_rect(0, 0, self.width(), self.height(), clr);
    }

    /// Fill a rectangle with one color
    fn fill_rect(
        &mut self,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        clr: SRgb8,
    ) -> Result<()> {
        self.check_bounds(x, y, w, h)?;
        for yy in 0..h as i32 {
            for xx in 0..w as i32 {
                self.set_pixel(x + xx, y + yy, clr)?;
            }
        }
        Ok(())
    }

    /// Copy another raster graphic onto this one.
    ///
    /// * `src` Source raster.
    /// * `x` Left position on this raster.
    /// * `y` Top position on this raster.
    /// * `fg` Foreground color for lit pixels of a bitmap.
    ///
    /// Nothing is copied unless the source fits entirely.
    fn copy(
        &mut self,
        src: &dyn RasterGraphic,
        x: i32,
        y: i32,
        fg: SRgb8,
    ) -> Result<()> {
        self.check_bounds(x, y, src.width(), src.height())?;
        for yy in 0..src.height() as i32 {
            for xx in 0..src.width() as i32 {
                if let Some(clr) = src.copy_color(xx, yy, fg) {
                    self.set_pixel(x + xx, y + yy, clr)?;
                }
            }
        }
        Ok(())
    }
}

/// Bitmap graphic (1 bit per pixel)
#[derive(Clone, Debug, PartialEq)]
pub struct BitmapGraphic {
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// Color of lit pixels
    foreground: SRgb8,
    /// Packed pixel data, by rows, most significant bit first
    pixels: Vec<u8>,
}

/// Pixmap graphic (full color per pixel)
#[derive(Clone)]
pub struct PixmapGraphic {
    /// Pixel raster
    raster: Raster<SRgb8>,
}

/// Check if a color is lit (not black)
fn is_lit_color(clr: SRgb8) -> bool {
    clr != SRgb8::new(0, 0, 0)
}

impl BitmapGraphic {
    /// Create a new bitmap with all pixels unlit
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize * height as usize + 7) / 8;
        BitmapGraphic {
            width,
            height,
            foreground: SRgb8::new(255, 255, 255),
            pixels: vec![0; len],
        }
    }

    /// Create a bitmap from packed pixel data
    pub fn from_pixels(
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> Result<Self> {
        let mut bmap = BitmapGraphic::new(width, height);
        if pixels.len() != bmap.pixels.len() {
            return Err(RasterError::SizeMismatch);
        }
        bmap.pixels = pixels;
        Ok(bmap)
    }

    /// Set the color of lit pixels
    pub fn with_foreground(mut self, foreground: SRgb8) -> Self {
        self.foreground = foreground;
        self
    }

    /// Get the color of lit pixels
    pub fn foreground(&self) -> SRgb8 {
        self.foreground
    }

    /// Get the packed pixel data
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Get the bit position of a pixel
    fn bit_pos(&self, x: i32, y: i32) -> Result<(usize, u8)> {
        self.check_bounds(x, y, 1, 1)?;
        let pos = y as usize * self.width as usize + x as usize;
        Ok((pos / 8, 7 - (pos & 7) as u8))
    }

    /// Check if a pixel is lit
    pub fn is_lit(&self, x: i32, y: i32) -> bool {
        match self.bit_pos(x, y) {
            Ok((by, bi)) => (self.pixels[by] >> bi) & 1 != 0,
            Err(_) => false,
        }
    }

    /// Count the number of lit pixels
    pub fn lit_count(&self) -> u32 {
        self.pixels.iter().map(|b| b.count_ones()).sum()
    }
}

impl RasterGraphic for BitmapGraphic {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn pixel(&self, x: i32, y: i32) -> Result<SRgb8> {
        let (by, bi) = self.bit_pos(x, y)?;
        if (self.pixels[by] >> bi) & 1 != 0 {
            Ok(self.foreground)
        } else {
            Ok(SRgb8::new(0, 0, 0))
        }
    }

    fn set_pixel(&mut self, x: i32, y: i32, clr: SRgb8) -> Result<()> {
        let (by, bi) = self.bit_pos(x, y)?;
        if is_lit_color(clr) {
            self.pixels[by] |= 1 << bi;
        } else {
            self.pixels[by] &= !(1 << bi);
        }
        Ok(())
    }

    fn copy_color(&self, x: i32, y: i32, fg: SRgb8) -> Option<SRgb8> {
        if self.is_lit(x, y) {
            Some(fg)
        } else {
            None
        }
    }
}

impl PixmapGraphic {
    /// Create a new pixmap filled with black
    pub fn new(width: u32, height: u32) -> Self {
        PixmapGraphic {
            raster: Raster::with_clear(width, height),
        }
    }

    /// Create a pixmap from BGR pixel data
    pub fn from_bgr(width: u32, height: u32, bgr: &[u8]) -> Result<Self> {
        if bgr.len() != width as usize * height as usize * 3 {
            return Err(RasterError::SizeMismatch);
        }
        let mut pixmap = PixmapGraphic::new(width, height);
        for (p, c) in pixmap.raster.pixels_mut().iter_mut().zip(bgr.chunks(3))
        {
            *p = SRgb8::new(c[2], c[1], c[0]);
        }
        Ok(pixmap)
    }

    /// Convert into the pixel raster
    pub fn into_raster(self) -> Raster<SRgb8> {
        self.raster
    }
}

impl RasterGraphic for PixmapGraphic {
    fn width(&self) -> u32 {
        self.raster.width()
    }

    fn height(&self) -> u32 {
        self.raster.height()
    }

    fn pixel(&self, x: i32, y: i32) -> Result<SRgb8> {
        self.check_bounds(x, y, 1, 1)?;
        Ok(self.raster.pixel(x, y))
    }

    fn set_pixel(&mut self, x: i32, y: i32, clr: SRgb8) -> Result<()> {
        self.check_bounds(x, y, 1, 1)?;
        *self.raster.pixel_mut(x, y) = clr;
        Ok(())
    }

    fn copy_color(&self, x: i32, y: i32, _fg: SRgb8) -> Option<SRgb8> {
        self.pixel(x, y).ok()
    }

    fn fill_rect(
        &mut self,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        clr: SRgb8,
    ) -> Result<()> {
        self.check_bounds(x, y, w, h)?;
        self.raster.copy_color(Region::new(x, y, w, h), clr);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn amber() -> SRgb8 {
        SRgb8::new(255, 208, 0)
    }

    #[test]
    fn bitmap_pixels() {
        let mut b = BitmapGraphic::new(10, 2);
        assert_eq!(b.pixels().len(), 3);
        b.set_pixel(9, 1, amber()).unwrap();
        assert!(b.is_lit(9, 1));
        assert_eq!(b.pixels(), &[0, 0, 0b0001_0000]);
        assert_eq!(b.pixel(9, 1), Ok(SRgb8::new(255, 255, 255)));
        b.set_pixel(9, 1, SRgb8::new(0, 0, 0)).unwrap();
        assert_eq!(b.lit_count(), 0);
        assert_eq!(
            b.set_pixel(10, 0, amber()),
            Err(RasterError::OutOfBounds(10, 0))
        );
        assert_eq!(
            b.set_pixel(0, -1, amber()),
            Err(RasterError::OutOfBounds(0, -1))
        );
        assert_eq!(
            b.set_pixel(3, 2, amber()),
            Err(RasterError::OutOfBounds(3, 2))
        );
        assert_eq!(
            b.fill_rect(8, 0, 4, 1, amber()),
            Err(RasterError::OutOfBounds(10, 0))
        );
        assert_eq!(
            b.fill_rect(-2, 0, 4, 1, amber()),
            Err(RasterError::OutOfBounds(-2, 0))
        );
    }

    #[test]
    fn bitmap_size() {
        assert_eq!(
            BitmapGraphic::from_pixels(4, 4, vec![0; 3]),
            Err(RasterError::SizeMismatch)
        );
        let b = BitmapGraphic::from_pixels(4, 4, vec![0xF0, 0x0F]).unwrap();
        assert!(b.is_lit(0, 0));
        assert!(!b.is_lit(0, 1));
        assert!(b.is_lit(3, 3));
        assert_eq!(b.lit_count(), 8);
    }

    #[test]
    fn fill_rect() {
        let mut p = PixmapGraphic::new(4, 3);
        p.fill_rect(1, 1, 3, 2, amber()).unwrap();
        assert_eq!(p.pixel(0, 0), Ok(SRgb8::new(0, 0, 0)));
        assert_eq!(p.pixel(3, 2), Ok(amber()));
        assert!(p.fill_rect(2, 0, 3, 1, amber()).is_err());
        let mut b = BitmapGraphic::new(4, 3);
        b.fill(amber());
        assert_eq!(b.lit_count(), 12);
    }

    #[test]
    fn copy_bitmap() {
        let src = BitmapGraphic::from_pixels(2, 2, vec![0b1001_0000]).unwrap();
        let mut p = PixmapGraphic::new(4, 4);
        p.fill(SRgb8::new(0, 0, 64));
        p.copy(&src, 2, 2, amber()).unwrap();
        assert_eq!(p.pixel(2, 2), Ok(amber()));
        assert_eq!(p.pixel(3, 2), Ok(SRgb8::new(0, 0, 64)));
        assert_eq!(p.pixel(3, 3), Ok(amber()));
        assert!(p.copy(&src, 3, 3, amber()).is_err());
        assert_eq!(p.pixel(3, 3), Ok(amber()));
    }

    #[test]
    fn copy_pixmap() {
        let src = PixmapGraphic::from_bgr(1, 2, &[1, 2, 3, 0, 0, 0]).unwrap();
        assert_eq!(src.pixel(0, 0), Ok(SRgb8::new(3, 2, 1)));
        let mut b = BitmapGraphic::new(2, 2);
        b.copy(&src, 1, 0, amber()).unwrap();
        assert!(b.is_lit(1, 0));
        assert!(!b.is_lit(1, 1));
        assert!(PixmapGraphic::from_bgr(1, 2, &[0; 5]).is_err());
    }
}
