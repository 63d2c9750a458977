// render.rs
//
// Copyright (C) 2009-2025  Minnesota Department of Transportation
//
//! This module is for NTCIP 1203 DMS rendering.
//!
//! A [MultiRenderer] is a MULTI visitor which lays out text spans and
//! draws them onto a raster graphic, one page at a time.
//!
//! [MultiRenderer]: struct.MultiRenderer.html
use crate::dms::color::ColorCtx;
use crate::dms::config::MultiCfg;
use crate::dms::font::{Font, FontTable};
use crate::dms::graphic::GraphicTable;
use crate::dms::multi::{
    Color, JustificationLine, JustificationPage, Multi, Rectangle,
    SyntaxError,
};
use crate::dms::raster::{RasterError, RasterGraphic};
use log::debug;
use pix::rgb::SRgb8;

/// Result type
type Result<T> = std::result::Result<T, SyntaxError>;

/// Rendering state
#[derive(Clone)]
struct RenderState {
    /// Color context
    color_ctx: ColorCtx,

    /// Current page justification
    just_page: JustificationPage,

    /// Current line justification
    just_line: JustificationLine,

    /// Font number
    font_num: u8,

    /// Current specified char spacing
    char_spacing: Option<u8>,
}

/// Span of text, with the state from when it was added
struct Span<'a> {
    /// Text of span
    text: String,

    /// Font for span
    font: &'a Font,

    /// Foreground color
    foreground: SRgb8,

    /// Spacing between characters (pixels)
    c_space: i32,
}

/// Fragment of a line, with one line justification
struct Fragment<'a> {
    /// Line justification
    just_line: JustificationLine,

    /// Spans in fragment
    spans: Vec<Span<'a>>,
}

/// Text line
struct Line<'a> {
    /// Specified line spacing
    line_spacing: Option<u8>,

    /// Fragments in line
    fragments: Vec<Fragment<'a>>,
}

/// Block of lines, with one page justification
struct Block<'a> {
    /// Page justification
    just_page: JustificationPage,

    /// Lines in block
    lines: Vec<Line<'a>>,
}

/// MULTI renderer for one page of a message.
///
/// Tags on other pages are tracked for state, but nothing is drawn.
pub struct MultiRenderer<'a, R: RasterGraphic> {
    /// Raster to render on
    raster: &'a mut R,

    /// Page number to render
    page: usize,

    /// Current page number of MULTI string
    ms_page: usize,

    /// Font table
    fonts: &'a FontTable,

    /// Graphic table
    graphics: Option<&'a GraphicTable>,

    /// Character width (pixels) for character-matrix signs; 0 otherwise
    c_width: i32,

    /// Character height (pixels) for character- or line-matrix signs;
    /// 0 otherwise
    c_height: i32,

    /// Default rendering state
    default_state: RenderState,

    /// Current render state
    state: RenderState,

    /// Current text rectangle
    text_rect: Rectangle,

    /// Blocks within the current text rectangle
    blocks: Vec<Block<'a>>,

    /// Most recent syntax error
    syntax_err: Option<SyntaxError>,

    /// Most recent raster fault
    raster_err: Option<RasterError>,
}

/// Average two spacing values, rounding half up
fn spacing_avg(a: i32, b: i32) -> i32 {
    (a + b + 1) / 2
}

impl RenderState {
    /// Create a new render state
    fn new(cfg: &MultiCfg) -> Self {
        RenderState {
            color_ctx: cfg.color_ctx(),
            just_page: cfg.default_justification_page,
            just_line: cfg.default_justification_line,
            font_num: cfg.default_font,
            char_spacing: None,
        }
    }
}

impl<'a> Span<'a> {
    /// Get the spacing between this span and the previous one
    fn char_spacing(&self, prev: Option<&Span>) -> i32 {
        match prev {
            Some(p) => spacing_avg(self.c_space, p.c_space),
            None => 0,
        }
    }

    /// Get the height of the span
    fn height(&self) -> i32 {
        self.font.height().into()
    }

    /// Get the font line spacing
    fn line_spacing(&self) -> i32 {
        self.font.line_spacing().into()
    }

    /// Get the width of the span
    fn width(&self) -> Result<i32> {
        self.font.text_width(&self.text, self.c_space)
    }

    /// Render the span.
    ///
    /// * `x` Left edge (1-based).
    /// * `base` Baseline (1-based, below the span).
    fn render<R: RasterGraphic>(
        &self,
        raster: &mut R,
        x: i32,
        base: i32,
    ) -> Result<()> {
        let height = self.height();
        let y = base - height - 1;
        let mut x = x - 1;
        debug!("render span: {:?} @ {},{}", self.text, x, y);
        for ch in self.text.chars() {
            let c = self.font.character(ch)?;
            let width = i32::from(c.width());
            raster
                .check_bounds(x, y, width as u32, height as u32)
                .map_err(|_| SyntaxError::TextTooBig)?;
            c.render_char(raster, x, y, height, self.foreground)
                .map_err(|_| SyntaxError::TextTooBig)?;
            x += width + self.c_space;
        }
        Ok(())
    }
}

impl<'a> Fragment<'a> {
    /// Create a new fragment
    fn new(just_line: JustificationLine) -> Self {
        Fragment {
            just_line,
            spans: Vec::new(),
        }
    }

    /// Get the height of the fragment
    fn height(&self, c_height: i32) -> i32 {
        self.spans.iter().map(Span::height).fold(c_height, i32::max)
    }
}

impl<'a> Line<'a> {
    /// Create a new line
    fn new(line_spacing: Option<u8>) -> Self {
        Line {
            line_spacing,
            fragments: Vec::new(),
        }
    }

    /// Get the height of the line
    fn height(&self, c_height: i32) -> i32 {
        self.fragments
            .iter()
            .map(|f| f.height(c_height))
            .fold(c_height, i32::max)
    }

    /// Get the font line spacing of the last span
    fn font_spacing(&self) -> i32 {
        self.fragments
            .last()
            .and_then(|f| f.spans.last())
            .map_or(0, Span::line_spacing)
    }

    /// Add a span to the line.
    ///
    /// A span with a lower justification than the current fragment is
    /// still added, but results in a tag conflict.
    fn add_span(
        &mut self,
        span: Span<'a>,
        jl: JustificationLine,
    ) -> Result<()> {
        match self.fragments.last_mut() {
            Some(f) if jl <= f.just_line => {
                let conflict = jl < f.just_line;
                f.spans.push(span);
                if conflict {
                    return Err(SyntaxError::TagConflict);
                }
            }
            _ => {
                let mut f = Fragment::new(jl);
                f.spans.push(span);
                self.fragments.push(f);
            }
        }
        Ok(())
    }
}

impl<'a> Block<'a> {
    /// Create a new block
    fn new(just_page: JustificationPage) -> Self {
        Block {
            just_page,
            lines: Vec::new(),
        }
    }

    /// Get the current line
    fn current_line(&mut self) -> &mut Line<'a> {
        if self.lines.is_empty() {
            self.lines.push(Line::new(None));
        }
        let last = self.lines.len() - 1;
        &mut self.lines[last]
    }
}

impl<'a, R: RasterGraphic> MultiRenderer<'a, R> {
    /// Create a new MULTI renderer.
    ///
    /// * `raster` Raster to render on.
    /// * `page` Page number to render (0-based).
    /// * `fonts` Font table.
    /// * `cfg` MULTI configuration.
    pub fn new(
        raster: &'a mut R,
        page: usize,
        fonts: &'a FontTable,
        cfg: &MultiCfg,
    ) -> Self {
        let default_state = RenderState::new(cfg);
        let state = default_state.clone();
        let text_rect = Rectangle::new(1, 1, 0, 0)
            .extend_width_height(raster.width(), raster.height());
        MultiRenderer {
            raster,
            page,
            ms_page: 0,
            fonts,
            graphics: None,
            c_width: 0,
            c_height: 0,
            default_state,
            state,
            text_rect,
            blocks: Vec::new(),
            syntax_err: None,
            raster_err: None,
        }
    }

    /// Set the character size.
    ///
    /// * `cw` Character width (pixels) for character-matrix signs.  Use 0
    ///        for line-matrix or full-matrix signs.
    /// * `ch` Character height (pixels) for character- or line-matrix
    ///        signs.  Use 0 for full-matrix signs.
    pub fn with_char_size(mut self, cw: u8, ch: u8) -> Self {
        self.c_width = cw.into();
        self.c_height = ch.into();
        self
    }

    /// Set the graphic table
    pub fn with_graphics(mut self, graphics: &'a GraphicTable) -> Self {
        self.graphics = Some(graphics);
        self
    }

    /// Complete the rendering
    pub fn complete(&mut self) {
        self.render_text();
    }

    /// Get the most recent syntax error
    pub fn syntax_error(&self) -> Option<SyntaxError> {
        self.syntax_err
    }

    /// Get the most recent raster fault
    pub fn raster_error(&self) -> Option<RasterError> {
        self.raster_err
    }

    /// Check if the current page is being rendered
    fn is_page(&self) -> bool {
        self.ms_page == self.page
    }

    /// Check for character-matrix sign
    fn is_char_matrix(&self) -> bool {
        self.c_width > 0
    }

    /// Check for full-matrix sign
    fn is_full_matrix(&self) -> bool {
        self.c_height == 0
    }

    /// Set the syntax error (replacing any previous error)
    fn set_error(&mut self, err: SyntaxError) {
        debug!("syntax error: {err}");
        self.syntax_err = Some(err);
    }

    /// Reset the text rectangle to the size of the raster
    fn reset_text_rectangle(&mut self) {
        self.text_rect = Rectangle::new(1, 1, 0, 0)
            .extend_width_height(self.raster.width(), self.raster.height());
    }

    /// Fill the page with the current background color
    fn fill_background(&mut self) {
        let clr = self.state.color_ctx.background();
        let width = self.raster.width();
        let height = self.raster.height();
        if let Err(e) = self.raster.fill_rect(0, 0, width, height, clr) {
            self.raster_err = Some(e);
        }
    }

    /// Create a span with the current state
    fn make_span(&self, text: &str) -> Result<Span<'a>> {
        let fonts: &'a FontTable = self.fonts;
        let font_num = self.state.font_num;
        let font = fonts
            .lookup(font_num)
            .ok_or(SyntaxError::FontNotDefined(font_num))?;
        let c_space = if self.is_char_matrix() {
            0
        } else {
            match self.state.char_spacing {
                Some(sc) => sc.into(),
                None => font.char_spacing().into(),
            }
        };
        Ok(Span {
            text: text.to_string(),
            font,
            foreground: self.state.color_ctx.foreground(),
            c_space,
        })
    }

    /// Get the current text block
    fn current_block(&mut self) -> &mut Block<'a> {
        if self.blocks.is_empty() {
            self.blocks.push(Block::new(self.state.just_page));
        }
        let last = self.blocks.len() - 1;
        &mut self.blocks[last]
    }

    /// Render all blocks in the current text rectangle
    fn render_text(&mut self) {
        let blocks = std::mem::take(&mut self.blocks);
        if !self.is_page() {
            return;
        }
        for block in &blocks {
            if let Err(e) = self.render_block(block) {
                self.set_error(e);
                break;
            }
        }
    }

    /// Get the spacing between a line and the previous one
    fn line_spacing(&self, line: &Line, prev: Option<&Line>) -> i32 {
        if !self.is_full_matrix() {
            return 0;
        }
        match (line.line_spacing, prev) {
            (Some(ls), _) => ls.into(),
            (None, Some(p)) => {
                spacing_avg(line.font_spacing(), p.font_spacing())
            }
            (None, None) => 0,
        }
    }

    /// Get the height of a block
    fn block_height(&self, block: &Block) -> i32 {
        let mut h = 0;
        let mut prev = None;
        for line in &block.lines {
            let lh = line.height(self.c_height);
            if lh > 0 {
                h += self.line_spacing(line, prev) + lh;
                prev = Some(line);
            }
        }
        h
    }

    /// Render one block
    fn render_block(&mut self, block: &Block<'a>) -> Result<()> {
        let ch = self.c_height.max(1);
        let tr_h = i32::from(self.text_rect.height);
        let ex = (tr_h / ch - self.block_height(block) / ch) * ch;
        if ex < 0 {
            self.set_error(SyntaxError::TextTooBig);
            return Ok(());
        }
        let top = i32::from(self.text_rect.y)
            + match block.just_page {
                JustificationPage::Middle => ((ex / 2) / ch) * ch,
                JustificationPage::Bottom => ex,
                _ => 0,
            };
        debug!("render block: {:?} top: {top}", block.just_page);
        let mut y = 0;
        let mut prev = None;
        for line in &block.lines {
            y += self.line_spacing(line, prev) + line.height(self.c_height);
            for fragment in &line.fragments {
                self.render_fragment(fragment, top + y)?;
            }
            prev = Some(line);
        }
        Ok(())
    }

    /// Get the width of a span, recording undefined characters
    fn span_width(&mut self, span: &Span) -> i32 {
        match span.width() {
            Ok(w) => w,
            Err(e) => {
                self.set_error(e);
                0
            }
        }
    }

    /// Get the width of a fragment
    fn fragment_width(&mut self, fragment: &Fragment) -> i32 {
        let mut w = 0;
        let mut prev = None;
        for span in &fragment.spans {
            w += span.char_spacing(prev) + self.span_width(span);
            prev = Some(span);
        }
        w
    }

    /// Render one fragment.
    ///
    /// * `base` Baseline of the line (1-based).
    fn render_fragment(
        &mut self,
        fragment: &Fragment<'a>,
        base: i32,
    ) -> Result<()> {
        let cw = self.c_width.max(1);
        let tr_w = i32::from(self.text_rect.width);
        let ex = (tr_w / cw - self.fragment_width(fragment) / cw) * cw;
        if ex < 0 {
            self.set_error(SyntaxError::TextTooBig);
            return Ok(());
        }
        let left = i32::from(self.text_rect.x)
            + match fragment.just_line {
                JustificationLine::Center => ((ex / 2) / cw) * cw,
                JustificationLine::Right => ex,
                _ => 0,
            };
        let mut x = 0;
        let mut prev = None;
        for span in &fragment.spans {
            x += span.char_spacing(prev);
            span.render(&mut *self.raster, left + x, base)?;
            x += self.span_width(span);
            prev = Some(span);
        }
        Ok(())
    }

    /// Set the background color
    fn set_background(&mut self, clr: Color) {
        if self.state.color_ctx.set_background(clr) {
            if self.is_page() {
                self.fill_background();
            }
        } else {
            debug!("invalid background color: {clr}");
        }
    }
}

impl<'a, R: RasterGraphic> Multi for MultiRenderer<'a, R> {
    fn add_span(&mut self, text: &str) {
        if !self.is_page() {
            return;
        }
        match self.make_span(text) {
            Ok(span) => {
                let jl = self.state.just_line;
                let block = self.current_block();
                let res = block.current_line().add_span(span, jl);
                if let Err(e) = res {
                    self.set_error(e);
                }
            }
            Err(e) => self.set_error(e),
        }
    }

    fn add_line(&mut self, spacing: Option<u8>) {
        if !self.is_page() {
            return;
        }
        let c_height = self.c_height;
        let jl = self.state.just_line;
        let empty = self.make_span("");
        let block = self.current_block();
        let line = block.current_line();
        let mut res = Ok(());
        if line.height(c_height) == 0 {
            // Line height is taken from the current font
            if let Ok(span) = empty {
                res = line.add_span(span, jl);
            }
        }
        block.lines.push(Line::new(spacing));
        if let Err(e) = res {
            self.set_error(e);
        }
    }

    fn add_page(&mut self) {
        self.render_text();
        self.ms_page += 1;
        self.reset_text_rectangle();
        if self.is_page() {
            self.fill_background();
        }
    }

    fn set_justification_page(&mut self, jp: JustificationPage) {
        let jp = match jp {
            JustificationPage::Undefined => self.default_state.just_page,
            JustificationPage::Other => {
                self.set_error(SyntaxError::UnsupportedTagValue);
                return;
            }
            _ => jp,
        };
        self.state.just_page = jp;
        if !self.is_page() {
            return;
        }
        let current = self.current_block().just_page;
        if jp < current {
            self.set_error(SyntaxError::TagConflict);
        } else if jp > current {
            self.blocks.push(Block::new(jp));
        }
    }

    fn set_justification_line(&mut self, jl: JustificationLine) {
        self.state.just_line = match jl {
            JustificationLine::Undefined => self.default_state.just_line,
            JustificationLine::Other | JustificationLine::Full => {
                self.set_error(SyntaxError::UnsupportedTagValue);
                return;
            }
            _ => jl,
        };
    }

    fn set_font(&mut self, font: Option<(u8, Option<u16>)>) {
        self.state.font_num = match font {
            Some((f_num, _)) => f_num,
            None => self.default_state.font_num,
        };
    }

    fn set_char_spacing(&mut self, sc: Option<u8>) {
        self.state.char_spacing = sc;
    }

    fn set_color_background(&mut self, x: u8) {
        self.set_background(Color::Legacy(x));
    }

    fn set_color_foreground(&mut self, clr: Option<Color>) {
        if !self.state.color_ctx.set_foreground(clr) {
            debug!("invalid foreground color: {clr:?}");
        }
    }

    fn set_page_background(&mut self, clr: Color) {
        self.set_background(clr);
    }

    fn add_color_rectangle(&mut self, rect: Rectangle, clr: Color) {
        if !self.is_page() {
            return;
        }
        let clr = match self.state.color_ctx.rgb(clr) {
            Some((r, g, b)) => SRgb8::new(r, g, b),
            None => {
                debug!("invalid color rectangle color: {clr}");
                return;
            }
        };
        if !rect.fits(self.raster.width(), self.raster.height()) {
            self.set_error(SyntaxError::UnsupportedTagValue);
            return;
        }
        let x = i32::from(rect.x) - 1;
        let y = i32::from(rect.y) - 1;
        let (w, h) = (rect.width.into(), rect.height.into());
        if let Err(e) = self.raster.fill_rect(x, y, w, h, clr) {
            self.raster_err = Some(e);
        }
    }

    fn set_text_rectangle(&mut self, rect: Rectangle) {
        self.render_text();
        let width = self.raster.width();
        let height = self.raster.height();
        let rect = rect.extend_width_height(width, height);
        if self.is_page() && !rect.fits(width, height) {
            self.set_error(SyntaxError::UnsupportedTagValue);
        }
        self.text_rect = rect;
    }

    fn add_graphic(
        &mut self,
        g_num: u8,
        pos: Option<(u16, u16)>,
        _version_id: Option<u16>,
    ) {
        if !self.is_page() {
            return;
        }
        let graphic = match self.graphics.and_then(|g| g.lookup(g_num)) {
            Some(graphic) => graphic,
            None => {
                self.set_error(SyntaxError::GraphicNotDefined(g_num));
                return;
            }
        };
        let src = match graphic.to_raster(&self.state.color_ctx) {
            Ok(src) => src,
            Err(e) => {
                debug!("graphic {g_num}: {e}");
                self.set_error(SyntaxError::GraphicNotDefined(g_num));
                return;
            }
        };
        let (x, y) = pos.unwrap_or((1, 1));
        let x = i32::from(x) - 1;
        let y = i32::from(y) - 1;
        let fg = self.state.color_ctx.foreground();
        if let Err(e) = self.raster.copy(src.as_ref(), x, y, fg) {
            // There is no syntax error for graphic too big
            debug!("graphic {g_num}: {e}");
            self.set_error(SyntaxError::Other);
        }
    }
}
