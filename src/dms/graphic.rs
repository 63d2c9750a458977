// graphic.rs
//
// Copyright (C) 2018-2025  Minnesota Department of Transportation
//
//! Graphic image support
use crate::dms::color::{Color, ColorCtx, ColorScheme};
use crate::dms::raster::{
    BitmapGraphic, PixmapGraphic, RasterError, RasterGraphic,
};
use log::debug;
use pix::rgb::SRgb8;

/// Graphic image — `dmsGraphicEntry`
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Graphic {
    /// Graphic number — `dmsGraphicNumber`
    number: u8,
    /// Name of graphic — `dmsGraphicName`
    name: String,
    /// Height (pixels) — `dmsGraphicHeight`
    height: u8,
    /// Width (pixels) — `dmsGraphicWidth`
    width: u16,
    /// Graphic type — `dmsGraphicType`
    color_scheme: ColorScheme,
    /// Bitmap data — `dmsGraphicBitmapTable` (BGR for 24-bit color)
    #[serde(with = "super::base64")]
    bitmap: Vec<u8>,
}

/// A table of graphics, looked up by number
#[derive(Clone, Debug, Default)]
pub struct GraphicTable {
    /// Graphics in table
    graphics: Vec<Graphic>,
}

impl Graphic {
    /// Create a new graphic
    pub fn new(
        number: u8,
        name: &str,
        width: u16,
        height: u8,
        color_scheme: ColorScheme,
        bitmap: Vec<u8>,
    ) -> Self {
        Graphic {
            number,
            name: name.to_string(),
            height,
            width,
            color_scheme,
            bitmap,
        }
    }

    /// Get graphic number
    pub fn number(&self) -> u8 {
        self.number
    }

    /// Get graphic name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get width in pixels
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Get height in pixels
    pub fn height(&self) -> u8 {
        self.height
    }

    /// Get the graphic type
    pub fn color_scheme(&self) -> ColorScheme {
        self.color_scheme
    }

    // Check if bitmap length is valid
    fn is_bitmap_valid(&self) -> bool {
        let pix = usize::from(self.height) * usize::from(self.width);
        let len = match self.color_scheme {
            ColorScheme::Monochrome1Bit => (pix + 7) / 8,
            ColorScheme::Color24Bit => pix * 3,
            _ => pix,
        };
        len == self.bitmap.len()
    }

    /// Check if graphic is valid
    pub fn is_valid(&self) -> bool {
        self.number > 0
            && self.height > 0
            && self.width > 0
            && self.is_bitmap_valid()
    }

    /// Convert graphic to a raster.
    ///
    /// * `ctx` Color context for 8-bit graphic values.
    ///
    /// Monochrome 1-bit graphics become a [BitmapGraphic], which is drawn
    /// with the current foreground color.  All others become a
    /// [PixmapGraphic].
    pub fn to_raster(
        &self,
        ctx: &ColorCtx,
    ) -> Result<Box<dyn RasterGraphic>, RasterError> {
        if !self.is_valid() {
            return Err(RasterError::SizeMismatch);
        }
        let width = u32::from(self.width);
        let height = u32::from(self.height);
        match self.color_scheme {
            ColorScheme::Monochrome1Bit => Ok(Box::new(
                BitmapGraphic::from_pixels(width, height, self.bitmap.clone())?
                    .with_foreground(ctx.foreground()),
            )),
            ColorScheme::Color24Bit => Ok(Box::new(PixmapGraphic::from_bgr(
                width,
                height,
                &self.bitmap,
            )?)),
            ColorScheme::Monochrome8Bit | ColorScheme::ColorClassic => {
                let mut pixmap = PixmapGraphic::new(width, height);
                let w = i32::from(self.width);
                for (i, v) in self.bitmap.iter().enumerate() {
                    let i = i as i32;
                    pixmap.set_pixel(i % w, i / w, self.pixel_8(*v, ctx))?;
                }
                Ok(Box::new(pixmap))
            }
        }
    }

    /// Get one pixel of an 8-bit (monochrome or classic) color graphic
    fn pixel_8(&self, v: u8, ctx: &ColorCtx) -> SRgb8 {
        let ctx = ColorCtx::new(
            self.color_scheme,
            ctx.foreground_rgb(),
            ctx.background_rgb(),
        );
        match ctx.rgb(Color::Legacy(v)) {
            Some((red, green, blue)) => SRgb8::new(red, green, blue),
            None => {
                debug!("graphic {} -- Bad color {}", self.number, v);
                SRgb8::new(0, 0, 0)
            }
        }
    }
}

impl GraphicTable {
    /// Create a new graphic table
    pub fn new() -> Self {
        GraphicTable::default()
    }

    /// Insert a graphic, replacing any with the same number
    pub fn insert(&mut self, graphic: Graphic) {
        self.graphics.retain(|g| g.number != graphic.number);
        self.graphics.push(graphic);
        self.graphics.sort_by(|a, b| a.number.cmp(&b.number));
    }

    /// Lookup a graphic by number
    pub fn lookup(&self, g_num: u8) -> Option<&Graphic> {
        self.graphics.iter().find(|g| g.number == g_num)
    }
}

impl FromIterator<Graphic> for GraphicTable {
    fn from_iter<I: IntoIterator<Item = Graphic>>(iter: I) -> Self {
        let mut graphics = GraphicTable::new();
        for graphic in iter {
            graphics.insert(graphic);
        }
        graphics
    }
}
