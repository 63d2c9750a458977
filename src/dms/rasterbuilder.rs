// rasterbuilder.rs
//
// Copyright (C) 2009-2025  Minnesota Department of Transportation
//
//! Build rasters for every page of a MULTI string
use crate::dms::config::{MultiCfg, VmsCfg};
use crate::dms::font::FontTable;
use crate::dms::graphic::GraphicTable;
use crate::dms::multi::{MultiStr, SyntaxError, Tag, Token};
use crate::dms::multistring::{split_tags, MultiString};
use crate::dms::raster::{
    BitmapGraphic, PixmapGraphic, RasterError, RasterGraphic,
};
use crate::dms::render::MultiRenderer;
use log::debug;

/// Invalid message error
#[derive(Clone, Copy, Debug, thiserror::Error, Eq, PartialEq)]
pub enum InvalidMsg {
    /// MULTI syntax error
    #[error("MULTI syntax: {0}")]
    Syntax(#[from] SyntaxError),
    /// Raster fault
    #[error("raster: {0}")]
    Raster(#[from] RasterError),
}

/// Raster builder
///
/// Renders each page of a MULTI string onto a fresh raster.
#[derive(Clone, Debug)]
pub struct RasterBuilder<'a> {
    /// Sign width (pixels)
    width: u16,
    /// Sign height (pixels)
    height: u16,
    /// Character width (pixels); 0 for line- or full-matrix signs
    c_width: u8,
    /// Character height (pixels); 0 for full-matrix signs
    c_height: u8,
    /// Font table
    fonts: &'a FontTable,
    /// Graphic table
    graphics: Option<&'a GraphicTable>,
    /// MULTI configuration
    cfg: MultiCfg,
}

impl<'a> RasterBuilder<'a> {
    /// Create a new raster builder.
    ///
    /// * `vms` Sign pixel configuration.
    /// * `fonts` Font table.
    pub fn new(vms: &VmsCfg, fonts: &'a FontTable) -> Self {
        RasterBuilder {
            width: vms.sign_width_pixels,
            height: vms.sign_height_pixels,
            c_width: vms.char_width_pixels,
            c_height: vms.char_height_pixels,
            fonts,
            graphics: None,
            cfg: MultiCfg::default(),
        }
    }

    /// Set the MULTI configuration (colors, defaults)
    pub fn with_multi_cfg(mut self, cfg: MultiCfg) -> Self {
        self.cfg = cfg;
        self
    }

    /// Set the graphic table
    pub fn with_graphics(mut self, graphics: &'a GraphicTable) -> Self {
        self.graphics = Some(graphics);
        self
    }

    /// Set the default font number
    pub fn with_font_num(mut self, font_num: u8) -> Self {
        self.cfg.default_font = font_num;
        self
    }

    /// Create a bitmap graphic for each page
    pub fn create_bitmaps(
        &self,
        ms: &MultiString,
    ) -> Result<Vec<BitmapGraphic>, InvalidMsg> {
        let fg = self.cfg.color_ctx().foreground();
        self.render_pages(ms, || {
            BitmapGraphic::new(self.width.into(), self.height.into())
                .with_foreground(fg)
        })
    }

    /// Create a pixmap graphic for each page
    pub fn create_pixmaps(
        &self,
        ms: &MultiString,
    ) -> Result<Vec<PixmapGraphic>, InvalidMsg> {
        self.render_pages(ms, || {
            PixmapGraphic::new(self.width.into(), self.height.into())
        })
    }

    /// Render every page onto rasters from a factory
    fn render_pages<R, F>(
        &self,
        ms: &MultiString,
        make_raster: F,
    ) -> Result<Vec<R>, InvalidMsg>
    where
        R: RasterGraphic,
        F: Fn() -> R,
    {
        if self.width == 0 || self.height == 0 {
            return Err(RasterError::Empty.into());
        }
        let bg = self.cfg.color_ctx().background();
        let n_pages = ms.num_pages();
        let mut rasters = Vec::with_capacity(n_pages);
        for page in 0..n_pages {
            let mut raster = make_raster();
            raster.fill(bg);
            self.render_page(ms, page, &mut raster)?;
            rasters.push(raster);
        }
        debug!("rendered {n_pages} page(s): {ms}");
        Ok(rasters)
    }

    /// Render one page of a MULTI string
    fn render_page<R: RasterGraphic>(
        &self,
        ms: &MultiString,
        page: usize,
        raster: &mut R,
    ) -> Result<(), InvalidMsg> {
        let mut mr = MultiRenderer::new(raster, page, self.fonts, &self.cfg)
            .with_char_size(self.c_width, self.c_height);
        if let Some(graphics) = self.graphics {
            mr = mr.with_graphics(graphics);
        }
        ms.parse(&mut mr);
        mr.complete();
        if let Some(e) = mr.raster_error() {
            return Err(e.into());
        }
        match mr.syntax_error() {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

/// Tags which reset text state between combined messages
const RESET_TAGS: &str = "[fo][jl][jp]";

/// Get the last recognized text rectangle tag in a MULTI string.
///
/// Returns the byte offset and raw tag.
fn last_text_rectangle(ms: &str) -> Option<(usize, &str)> {
    let mut pos = 0;
    let mut found = None;
    for token in MultiStr::new(ms) {
        if let Some((Tag::Tr, _)) = token.tag() {
            found = Some((pos, token.as_str()));
        }
        pos += token.as_str().len();
    }
    found
}

/// Count the recognized text rectangle tags in a MULTI string
fn count_text_rectangles(ms: &str) -> usize {
    MultiStr::new(ms)
        .filter(|t| matches!(t.tag(), Some((Tag::Tr, _))))
        .count()
}

/// Combine two messages into a shared text rectangle form.
///
/// Every page of `second` must start with the same rectangle as the last
/// one in `first`.
fn combine_shared(first: &str, second: &str) -> Option<String> {
    if !MultiString::from(first).is_single_page() {
        return None;
    }
    let (pos, rect) = last_text_rectangle(first)?;
    let content = format!("{}{}", &first[..pos], &first[pos + rect.len()..]);
    let mut pages = Vec::new();
    for page in split_tags(second, Tag::Np) {
        let tr = match MultiStr::new(page).next() {
            Some(Token::Tag(t)) if t.eq_ignore_ascii_case(rect) => t,
            _ => return None,
        };
        if count_text_rectangles(page) != 1 {
            return None;
        }
        // the rectangle flushes `first` before state is reset
        let rest = &page[tr.len()..];
        pages.push(format!("{content}{tr}[cf]{RESET_TAGS}{rest}"));
    }
    Some(pages.join("[np]"))
}

/// Check if the last token of a MULTI string is a bare `[cf]` tag
fn ends_with_color_reset(ms: &str) -> bool {
    match MultiStr::new(ms).last() {
        Some(Token::Tag(t)) => t.eq_ignore_ascii_case("[cf]"),
        _ => false,
    }
}

/// Combine two MULTI messages into one.
///
/// * `first` First message (displayed first, or sharing the sign).
/// * `second` Second message.
///
/// If `first` is one page with a text rectangle which starts every page
/// of `second`, the messages share the sign.  Otherwise, if `first` ends
/// with a `[cf]` reset, `second` follows on new pages.  Returns `None` if
/// either message is blank or neither form applies.
pub fn combine_multi(first: &str, second: &str) -> Option<String> {
    if MultiString::from(first).is_blank()
        || MultiString::from(second).is_blank()
    {
        return None;
    }
    if let Some(ms) = combine_shared(first, second) {
        return Some(ms);
    }
    if ends_with_color_reset(first) {
        return Some(format!("{first}[np]{RESET_TAGS}{second}"));
    }
    None
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dms::color::{Color, ColorScheme};
    use crate::dms::font::{Character, Font};
    use crate::dms::multi::JustificationPage;
    use pix::rgb::SRgb8;

    /// Make a solid glyph
    fn glyph(cp: char, width: u8, height: u8) -> Character {
        let bits = usize::from(width) * usize::from(height);
        let mut bitmap = vec![0xFF; (bits + 7) / 8];
        if bits % 8 != 0 {
            if let Some(b) = bitmap.last_mut() {
                *b = 0xFF << (8 - bits % 8);
            }
        }
        Character::new(u32::from(cp) as u16, width, bitmap)
    }

    fn font_table() -> FontTable {
        let block = Font::new(1, "block", 7)
            .with_char_spacing(1)
            .with_line_spacing(2)
            .with_character(glyph('A', 5, 7))
            .with_character(glyph('B', 5, 7));
        let small = Font::new(2, "small", 5)
            .with_char_spacing(1)
            .with_character(glyph('A', 3, 5));
        vec![block, small].into_iter().collect()
    }

    #[test]
    fn char_matrix_pages() {
        let fonts = font_table();
        let rb = RasterBuilder::new(&VmsCfg::default(), &fonts);
        let pages = rb.create_bitmaps(&"A[np]AB[np]".into()).unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].width(), 40);
        assert_eq!(pages[0].height(), 21);
        assert_eq!(pages[0].lit_count(), 35);
        assert_eq!(pages[1].lit_count(), 70);
        assert_eq!(pages[2].lit_count(), 0);
        // character cells are 5 pixels wide with no spacing
        assert!(pages[1].is_lit(15, 7));
        assert!(pages[1].is_lit(20, 7));
        assert!(!pages[1].is_lit(14, 7));
    }

    #[test]
    fn full_matrix() {
        let fonts = font_table();
        let vms = VmsCfg::full_matrix(11, 7);
        let rb = RasterBuilder::new(&vms, &fonts);
        let pages = rb.create_bitmaps(&"AB".into()).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].lit_count(), 70);
        assert!(!pages[0].is_lit(5, 3));
        let pages = rb.with_font_num(2).create_bitmaps(&"A".into()).unwrap();
        assert_eq!(pages[0].lit_count(), 15);
        assert!(pages[0].is_lit(4, 1));
    }

    #[test]
    fn invalid() {
        let fonts = font_table();
        let rb = RasterBuilder::new(&VmsCfg::default(), &fonts);
        assert_eq!(
            rb.create_bitmaps(&"ABZ".into()).err(),
            Some(InvalidMsg::Syntax(SyntaxError::CharacterNotDefined('Z')))
        );
        assert_eq!(
            rb.create_bitmaps(&"AAAAAAAAA".into()).err(),
            Some(InvalidMsg::Syntax(SyntaxError::TextTooBig))
        );
        assert_eq!(
            rb.create_bitmaps(&"[fo9]A".into()).err(),
            Some(InvalidMsg::Syntax(SyntaxError::FontNotDefined(9)))
        );
        let rb = RasterBuilder::new(&VmsCfg::full_matrix(0, 7), &fonts);
        assert_eq!(
            rb.create_pixmaps(&"A".into()).err(),
            Some(InvalidMsg::Raster(RasterError::Empty))
        );
    }

    #[test]
    fn pixmaps() {
        let fonts = font_table();
        let cfg = MultiCfg {
            color_scheme: ColorScheme::Color24Bit,
            default_background_rgb: Color::Rgb(0, 0, 64),
            default_justification_page: JustificationPage::Top,
            ..MultiCfg::default()
        };
        let rb = RasterBuilder::new(&VmsCfg::full_matrix(7, 9), &fonts)
            .with_multi_cfg(cfg);
        let pages = rb.create_pixmaps(&"[cf255,0,0]A".into()).unwrap();
        let red = SRgb8::new(255, 0, 0);
        let blue = SRgb8::new(0, 0, 64);
        assert_eq!(pages[0].pixel(1, 0), Ok(red));
        assert_eq!(pages[0].pixel(5, 6), Ok(red));
        assert_eq!(pages[0].pixel(0, 0), Ok(blue));
        assert_eq!(pages[0].pixel(1, 7), Ok(blue));
    }

    #[test]
    fn combine_shared_rectangle() {
        assert_eq!(
            combine_multi("[tr1,1,50,7]AAA[cf1]", "[tr1,1,50,7]BBB"),
            Some("AAA[cf1][tr1,1,50,7][cf][fo][jl][jp]BBB".to_string())
        );
        assert_eq!(
            combine_multi(
                "[cf2]AAA[TR1,1,50,7]",
                "[tr1,1,50,7]B[np][tr1,1,50,7]C"
            ),
            Some(
                "[cf2]AAA[tr1,1,50,7][cf][fo][jl][jp]B[np]\
                 [cf2]AAA[tr1,1,50,7][cf][fo][jl][jp]C"
                    .to_string()
            )
        );
        // second page has a different rectangle
        assert_eq!(
            combine_multi("[tr1,1,50,7]A", "[tr1,1,50,7]B[np][tr1,9,50,7]C"),
            None
        );
        // two rectangles on one page
        assert_eq!(
            combine_multi("[tr1,1,50,7]A", "[tr1,1,50,7]B[tr1,9,9,9]C"),
            None
        );
    }

    #[test]
    fn combine_shared_justified() {
        let ms = combine_multi("[jp4]AAA[tr1,1,50,7]", "[tr1,1,50,7]BBB");
        assert_eq!(
            ms.as_deref(),
            Some("[jp4]AAA[tr1,1,50,7][cf][fo][jl][jp]BBB")
        );
        let fonts = font_table();
        let rb = RasterBuilder::new(&VmsCfg::full_matrix(60, 14), &fonts);
        let ms = MultiString::from(ms.unwrap_or_default());
        let pages = rb.create_bitmaps(&ms).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].lit_count(), 210);
    }

    #[test]
    fn combine_sequence() {
        assert_eq!(
            combine_multi("AAA[cf]", "BBB"),
            Some("AAA[cf][np][fo][jl][jp]BBB".to_string())
        );
        assert_eq!(
            combine_multi("A[np]B[CF]", "[tr1,1,50,7]C"),
            Some("A[np]B[CF][np][fo][jl][jp][tr1,1,50,7]C".to_string())
        );
        assert_eq!(combine_multi("AAA[cf1]", "BBB"), None);
        assert_eq!(combine_multi("AAA", "BBB"), None);
    }

    #[test]
    fn combine_blank() {
        assert_eq!(combine_multi("", "BBB"), None);
        assert_eq!(combine_multi("AAA[cf]", " [nl]"), None);
    }
}
