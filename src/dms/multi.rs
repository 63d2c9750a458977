// multi.rs
//
// Copyright (C) 2018-2025  Minnesota Department of Transportation
//
//! **M**ark**U**p **L**anguage for **T**ransportation **I**nformation
//!
//! MULTI is used to compose DMS messages.  It consists of text spans and
//! [Tag]s enclosed in square brackets, such as `[nl]`.
//!
//! The [parse] function scans a MULTI string and calls one method of a
//! [Multi] visitor for every span or recognized tag, in document order.
//! Tags which are not recognized are dropped, as are tags with malformed
//! parameters.
//!
//! [Multi]: trait.Multi.html
//! [parse]: fn.parse.html
//! [Tag]: enum.Tag.html
pub use crate::dms::color::Color;
use crate::dms::multibuilder::{LineStripper, MultiBuilder};
use log::debug;
use std::fmt;

/// MULTI tag
///
/// Only these tags are recognized; anything else in brackets is dropped.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Tag {
    /// `[cb…]`: Color — Background (deprecated in 1203v2)
    Cb,
    /// `[cf…]`: Color — Foreground
    Cf,
    /// `[cr…]`: Color Rectangle
    Cr,
    /// `[feed…]`: Message feed
    Feed,
    /// `[fo…]`: Font
    Fo,
    /// `[g…]`: Graphic
    G,
    /// `[jl…]`: Justification — Line
    Jl,
    /// `[jp…]`: Justification — Page
    Jp,
    /// `[nl…]`: New Line
    Nl,
    /// `[np]`: New Page
    Np,
    /// `[pb…]`: Page Background
    Pb,
    /// `[pt…]`: Page Time
    Pt,
    /// `[sc…]`: Spacing Character
    Sc,
    /// `[/sc]`: Spacing Character end
    ScEnd,
    /// `[slow…]`: Slow traffic warning
    Slow,
    /// `[tr…]`: Text Rectangle
    Tr,
    /// `[tt…]`: Travel time
    Tt,
    /// `[vsa]`: Variable speed advisory
    Vsa,
}

/// Tag names, checked in order as a case-insensitive prefix
const TAG_NAMES: &[(&str, Tag)] = &[
    ("nl", Tag::Nl),
    ("np", Tag::Np),
    ("pt", Tag::Pt),
    ("jl", Tag::Jl),
    ("jp", Tag::Jp),
    ("fo", Tag::Fo),
    ("feed", Tag::Feed),
    ("pb", Tag::Pb),
    ("cf", Tag::Cf),
    ("cr", Tag::Cr),
    ("cb", Tag::Cb),
    ("tr", Tag::Tr),
    ("tt", Tag::Tt),
    ("sc", Tag::Sc),
    ("/sc", Tag::ScEnd),
    ("slow", Tag::Slow),
    ("vsa", Tag::Vsa),
    ("g", Tag::G),
];

/// Horizontal justification within a line
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum JustificationLine {
    /// Undefined (tag without a valid value)
    Undefined = 0,
    /// Other line justification; deprecated in v2
    Other,
    /// Left line justification
    Left,
    /// Center line justification
    Center,
    /// Right line justification
    Right,
    /// Full line justification
    Full,
}

/// Vertical justification within a page
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum JustificationPage {
    /// Undefined (tag without a valid value)
    Undefined = 0,
    /// Other page justification; deprecated in v2
    Other,
    /// Top page justification
    Top,
    /// Middle page justification
    Middle,
    /// Bottom page justification
    Bottom,
}

/// A rectangular area of a sign
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Rectangle {
    /// Left edge (starting from 1)
    pub x: u16,
    /// Top edge (starting from 1)
    pub y: u16,
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
}

/// Speed units for `[slow…]` tags
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SpeedUnits {
    /// Miles per hour
    #[default]
    Mph,
    /// Kilometers per hour
    Kph,
}

/// Slow traffic warning from a `[slow…]` tag
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SlowWarning {
    /// Warning speed (exclusive range 0 to 100)
    pub speed: u8,
    /// Backup distance in tenths of a mile
    pub backup: i16,
    /// Speed units
    pub units: SpeedUnits,
    /// Flag to display distance instead of speed
    pub dist: bool,
}

/// Syntax errors from rendering MULTI
#[derive(Clone, Copy, Debug, thiserror::Error, Eq, PartialEq)]
pub enum SyntaxError {
    /// An unspecified error
    #[error("other")]
    Other,
    /// Specified tag value not supported
    #[error("unsupported tag value")]
    UnsupportedTagValue,
    /// Specified text does not fit within text rectangle
    #[error("text too big")]
    TextTooBig,
    /// Specified font not defined
    #[error("font not defined: {0}")]
    FontNotDefined(u8),
    /// Specified character not defined in font
    #[error("character not defined: {0}")]
    CharacterNotDefined(char),
    /// Specified tags conflict with each other
    #[error("tag conflict")]
    TagConflict,
    /// Specified graphic number not defined
    #[error("graphic not defined: {0}")]
    GraphicNotDefined(u8),
}

/// MULTI visitor
///
/// The parser calls one method for each span or recognized tag.  Every
/// method has a no-op default, so a visitor only implements what it needs.
pub trait Multi {
    /// Add a span of text
    fn add_span(&mut self, _span: &str) {}

    /// Add a new line
    ///
    /// * `spacing` Explicit line spacing (pixels).
    fn add_line(&mut self, _spacing: Option<u8>) {}

    /// Add a new page
    fn add_page(&mut self) {}

    /// Set the page times (deciseconds)
    fn set_page_times(&mut self, _on: Option<u16>, _off: Option<u16>) {}

    /// Set the page justification
    fn set_justification_page(&mut self, _jp: JustificationPage) {}

    /// Set the line justification
    fn set_justification_line(&mut self, _jl: JustificationLine) {}

    /// Set the font
    ///
    /// * `font` Font number and optional version ID, or `None` to reset.
    fn set_font(&mut self, _font: Option<(u8, Option<u16>)>) {}

    /// Set the character spacing (`None` means use font spacing)
    fn set_char_spacing(&mut self, _sc: Option<u8>) {}

    /// Set the (deprecated) message background color (`colorClassic`)
    fn set_color_background(&mut self, _x: u8) {}

    /// Set the foreground color (`None` means reset to default)
    fn set_color_foreground(&mut self, _clr: Option<Color>) {}

    /// Set the page background color
    fn set_page_background(&mut self, _clr: Color) {}

    /// Add a color rectangle
    fn add_color_rectangle(&mut self, _rect: Rectangle, _clr: Color) {}

    /// Set the text rectangle
    fn set_text_rectangle(&mut self, _rect: Rectangle) {}

    /// Add a graphic
    ///
    /// * `g_num` Graphic number.
    /// * `pos` Optional X and Y position (1-based).
    /// * `version_id` Optional version ID.
    fn add_graphic(
        &mut self,
        _g_num: u8,
        _pos: Option<(u16, u16)>,
        _version_id: Option<u16>,
    ) {
    }

    /// Add a travel time destination
    fn add_travel_time(&mut self, _sid: &str) {}

    /// Add a variable speed advisory
    fn add_speed_advisory(&mut self) {}

    /// Add a slow traffic warning
    fn add_slow_warning(&mut self, _slow: SlowWarning) {}

    /// Add a message feed
    fn add_feed(&mut self, _fid: &str) {}
}

/// A token from a MULTI string
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Token<'p> {
    /// Literal text
    Text(&'p str),
    /// Bracketed tag, including brackets
    Tag(&'p str),
}

/// MULTI string tokenizer
#[derive(Clone, Debug)]
pub struct MultiStr<'p> {
    /// MULTI string
    ms: &'p str,

    /// Current offset
    offset: usize,
}

impl fmt::Display for JustificationLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JustificationLine::Undefined => Ok(()),
            _ => write!(f, "{}", *self as u8),
        }
    }
}

impl JustificationLine {
    /// Create a line justification from an ordinal
    pub fn from_ordinal(v: i32) -> Self {
        match v {
            1 => JustificationLine::Other,
            2 => JustificationLine::Left,
            3 => JustificationLine::Center,
            4 => JustificationLine::Right,
            5 => JustificationLine::Full,
            _ => JustificationLine::Undefined,
        }
    }
}

impl fmt::Display for JustificationPage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JustificationPage::Undefined => Ok(()),
            _ => write!(f, "{}", *self as u8),
        }
    }
}

impl JustificationPage {
    /// Create a page justification from an ordinal
    pub fn from_ordinal(v: i32) -> Self {
        match v {
            1 => JustificationPage::Other,
            2 => JustificationPage::Top,
            3 => JustificationPage::Middle,
            4 => JustificationPage::Bottom,
            _ => JustificationPage::Undefined,
        }
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

impl Rectangle {
    /// Create a new rectangle
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Rectangle {
            x,
            y,
            width,
            height,
        }
    }

    /// Extend 0 width and/or height to the edges of a raster
    pub fn extend_width_height(self, width: u32, height: u32) -> Self {
        let x = u32::from(self.x.max(1)) - 1;
        let y = u32::from(self.y.max(1)) - 1;
        let w = if self.width > 0 {
            self.width
        } else {
            clamp_u16(width.saturating_sub(x))
        };
        let h = if self.height > 0 {
            self.height
        } else {
            clamp_u16(height.saturating_sub(y))
        };
        Rectangle::new(self.x, self.y, w, h)
    }

    /// Check if the rectangle fits within a raster
    pub fn fits(self, width: u32, height: u32) -> bool {
        self.x > 0
            && self.y > 0
            && u32::from(self.x) + u32::from(self.width) <= width + 1
            && u32::from(self.y) + u32::from(self.height) <= height + 1
    }
}

/// Clamp a u32 value to u16 range
fn clamp_u16(v: u32) -> u16 {
    u16::try_from(v).unwrap_or(u16::MAX)
}

impl fmt::Display for SpeedUnits {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SpeedUnits::Mph => write!(f, "mph"),
            SpeedUnits::Kph => write!(f, "kph"),
        }
    }
}

impl fmt::Display for SlowWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[slow{},{}", self.speed, self.backup)?;
        if self.dist {
            write!(f, ",{},dist", self.units)?;
        } else if self.units != SpeedUnits::Mph {
            write!(f, ",{}", self.units)?;
        }
        write!(f, "]")
    }
}

impl Tag {
    /// Lookup a tag from its body (without brackets).
    ///
    /// Returns the tag and its parameter string.
    pub fn lookup(body: &str) -> Option<(Tag, &str)> {
        TAG_NAMES.iter().find_map(|(name, tag)| {
            match body.get(..name.len()) {
                Some(n) if n.eq_ignore_ascii_case(name) => {
                    Some((*tag, &body[name.len()..]))
                }
                _ => None,
            }
        })
    }
}

/// Check if a character may appear inside a tag
fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == ',' || c == '/' || c == '-'
}

/// Check if a character is allowed in a text span
pub fn is_text_char(c: char) -> bool {
    c == ' ' || (c.is_ascii_graphic() && !"\"[\\]{|}~".contains(c))
}

impl<'p> MultiStr<'p> {
    /// Create a new MULTI tokenizer
    pub fn new(ms: &'p str) -> Self {
        MultiStr { ms, offset: 0 }
    }

    /// Get remaining slice
    fn remaining(&self) -> &'p str {
        &self.ms[self.offset..]
    }

    /// Chop a slice from the start of the remaining string
    fn chop_start(&mut self, i: usize) -> &'p str {
        let ms = &self.ms[self.offset..self.offset + i];
        self.offset += i;
        ms
    }

    /// Find the length of a tag at the start of a slice
    fn tag_len(ms: &str) -> Option<usize> {
        let body = ms.strip_prefix('[')?;
        let end = body.find(|c| !is_tag_char(c))?;
        if body[end..].starts_with(']') {
            Some(end + 2)
        } else {
            None
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Option<Token<'p>> {
        let ms = self.remaining();
        if ms.is_empty() {
            return None;
        }
        if let Some(len) = MultiStr::tag_len(ms) {
            return Some(Token::Tag(self.chop_start(len)));
        }
        // A bracket which does not start a tag is literal text
        let mut end = ms.len();
        for (i, c) in ms.char_indices().skip(1) {
            if c == '[' && MultiStr::tag_len(&ms[i..]).is_some() {
                end = i;
                break;
            }
        }
        Some(Token::Text(self.chop_start(end)))
    }
}

impl<'p> Iterator for MultiStr<'p> {
    type Item = Token<'p>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

impl<'p> Token<'p> {
    /// Get the raw slice of the token
    pub fn as_str(&self) -> &'p str {
        match self {
            Token::Text(t) => t,
            Token::Tag(t) => t,
        }
    }

    /// Get the recognized tag and its parameters
    pub fn tag(&self) -> Option<(Tag, &'p str)> {
        match self {
            Token::Tag(t) => Tag::lookup(&t[1..t.len() - 1]),
            Token::Text(_) => None,
        }
    }
}

/// Parse an integer value
fn parse_int<T: std::str::FromStr>(v: Option<&str>) -> Option<T> {
    v.and_then(|v| v.parse::<T>().ok())
}

/// Parse a version ID (4 hexadecimal digits)
fn parse_version_id(v: Option<&str>) -> Option<u16> {
    match v {
        Some(s) if s.len() == 4 => u16::from_str_radix(s, 16).ok(),
        _ => None,
    }
}

/// Parse a color from a tag
///
/// * `v` Iterator of color parameters.
fn parse_color<'a, I>(v: I) -> Option<Color>
where
    I: Iterator<Item = &'a str>,
{
    let mut rgb = v.map(|i| i.parse::<u8>());
    match (rgb.next(), rgb.next(), rgb.next(), rgb.next()) {
        (Some(Ok(r)), Some(Ok(g)), Some(Ok(b)), None) => {
            Some(Color::Rgb(r, g, b))
        }
        (Some(Ok(n)), None, _, _) => Some(Color::Legacy(n)),
        _ => None,
    }
}

/// Parse a rectangle from tag parameters
fn parse_rectangle<'a, I>(v: &mut I) -> Option<Rectangle>
where
    I: Iterator<Item = &'a str>,
{
    let x = parse_int(v.next())?;
    let y = parse_int(v.next())?;
    let w = parse_int(v.next())?;
    let h = parse_int(v.next())?;
    Some(Rectangle::new(x, y, w, h))
}

/// Parse a New Line tag [nl]
///
/// Line spacing is an 8-bit pixel count; a value above 255 is treated as
/// unparsable, giving a plain `[nl]`.
fn parse_new_line(p: &str, cb: &mut impl Multi) {
    cb.add_line(parse_int(Some(p)));
}

/// Parse a Page Time tag [pt]
fn parse_page_time(p: &str, cb: &mut impl Multi) {
    let mut vs = p.splitn(2, ['o', 'O']);
    let on = parse_int(vs.next());
    let off = parse_int(vs.next());
    cb.set_page_times(on, off);
}

/// Parse a Justification -- Line tag [jl]
fn parse_justification_line(p: &str, cb: &mut impl Multi) {
    let jl = parse_int(Some(p))
        .map(JustificationLine::from_ordinal)
        .unwrap_or(JustificationLine::Undefined);
    cb.set_justification_line(jl);
}

/// Parse a Justification -- Page tag [jp]
fn parse_justification_page(p: &str, cb: &mut impl Multi) {
    let jp = parse_int(Some(p))
        .map(JustificationPage::from_ordinal)
        .unwrap_or(JustificationPage::Undefined);
    cb.set_justification_page(jp);
}

/// Parse a Font tag [fo]
///
/// Font numbers are 8-bit; a number above 255 drops the tag.
fn parse_font(p: &str, cb: &mut impl Multi) {
    if p.is_empty() {
        cb.set_font(None);
        return;
    }
    let mut vs = p.splitn(2, ',');
    if let Some(f_num) = parse_int(vs.next()) {
        cb.set_font(Some((f_num, parse_version_id(vs.next()))));
    }
}

/// Parse a Color -- Background tag [cb]
fn parse_color_background(p: &str, cb: &mut impl Multi) {
    if let Some(x) = parse_int(Some(p)) {
        cb.set_color_background(x);
    }
}

/// Parse a Page -- Background tag [pb]
fn parse_page_background(p: &str, cb: &mut impl Multi) {
    if let Some(clr) = parse_color(p.split(',')) {
        cb.set_page_background(clr);
    }
}

/// Parse a Color -- Foreground tag [cf]
fn parse_color_foreground(p: &str, cb: &mut impl Multi) {
    if p.is_empty() {
        cb.set_color_foreground(None);
    } else if let Some(clr) = parse_color(p.split(',')) {
        cb.set_color_foreground(Some(clr));
    }
}

/// Parse a Color Rectangle tag [cr]
fn parse_color_rectangle(p: &str, cb: &mut impl Multi) {
    let mut vs = p.split(',');
    if let Some(rect) = parse_rectangle(&mut vs) {
        if let Some(clr) = parse_color(vs) {
            cb.add_color_rectangle(rect, clr);
        }
    }
}

/// Parse a Text Rectangle tag [tr]
fn parse_text_rectangle(p: &str, cb: &mut impl Multi) {
    let mut vs = p.split(',');
    if let (Some(rect), None) = (parse_rectangle(&mut vs), vs.next()) {
        cb.set_text_rectangle(rect);
    }
}

/// Parse a Spacing -- Character tag [sc]
fn parse_spacing_character(p: &str, cb: &mut impl Multi) {
    if let Some(sc) = parse_int(Some(p)) {
        cb.set_char_spacing(Some(sc));
    }
}

/// Parse a Graphic tag [g]
fn parse_graphic(p: &str, cb: &mut impl Multi) {
    let mut vs = p.splitn(4, ',');
    if let Some(g_num) = parse_int(vs.next()) {
        let x = parse_int(vs.next());
        let y = parse_int(vs.next());
        match (x, y) {
            (Some(x), Some(y)) => {
                let vid = parse_version_id(vs.next());
                cb.add_graphic(g_num, Some((x, y)), vid);
            }
            _ => cb.add_graphic(g_num, None, None),
        }
    }
}

/// Parse a Slow traffic warning tag [slow]
fn parse_slow_warning(p: &str, cb: &mut impl Multi) {
    let mut vs = p.split(',');
    let speed: Option<i32> = parse_int(vs.next());
    let backup: Option<i32> = parse_int(vs.next());
    let units = match vs.next() {
        None => Some(SpeedUnits::Mph),
        Some(u) if u.eq_ignore_ascii_case("mph") => Some(SpeedUnits::Mph),
        Some(u) if u.eq_ignore_ascii_case("kph") => Some(SpeedUnits::Kph),
        Some(_) => None,
    };
    let dist = match vs.next() {
        None => Some(false),
        Some(d) if d.eq_ignore_ascii_case("dist") => Some(true),
        Some(_) => None,
    };
    if let (Some(spd), Some(b), Some(units), Some(dist), None) =
        (speed, backup, units, dist, vs.next())
    {
        if spd > 0 && spd < 100 && (-160..=160).contains(&b) {
            cb.add_slow_warning(SlowWarning {
                speed: spd as u8,
                backup: b as i16,
                units,
                dist,
            });
        } else {
            debug!("slow warning out of range: {spd},{b}");
        }
    }
}

/// Parse a tag body (without brackets)
fn parse_tag(body: &str, cb: &mut impl Multi) {
    let (tag, p) = match Tag::lookup(body) {
        Some(t) => t,
        None => {
            debug!("unknown tag dropped: [{body}]");
            return;
        }
    };
    match tag {
        Tag::Nl => parse_new_line(p, cb),
        Tag::Np => cb.add_page(),
        Tag::Pt => parse_page_time(p, cb),
        Tag::Jl => parse_justification_line(p, cb),
        Tag::Jp => parse_justification_page(p, cb),
        Tag::Fo => parse_font(p, cb),
        Tag::Feed => cb.add_feed(p),
        Tag::Pb => parse_page_background(p, cb),
        Tag::Cf => parse_color_foreground(p, cb),
        Tag::Cr => parse_color_rectangle(p, cb),
        Tag::Cb => parse_color_background(p, cb),
        Tag::Tr => parse_text_rectangle(p, cb),
        Tag::Tt => cb.add_travel_time(p),
        Tag::Sc => parse_spacing_character(p, cb),
        Tag::ScEnd => cb.set_char_spacing(None),
        Tag::Slow => parse_slow_warning(p, cb),
        Tag::Vsa => cb.add_speed_advisory(),
        Tag::G => parse_graphic(p, cb),
    }
}

/// Parse a MULTI string, calling a visitor for each span and tag.
///
/// * `ms` MULTI string.
/// * `cb` Visitor.
pub fn parse(ms: &str, cb: &mut impl Multi) {
    for token in MultiStr::new(ms) {
        match token {
            Token::Text(t) => cb.add_span(t),
            Token::Tag(t) => parse_tag(&t[1..t.len() - 1], cb),
        }
    }
}

/// Check if all text spans of a MULTI string contain valid characters
pub fn is_valid(ms: &str) -> bool {
    MultiStr::new(ms).all(|t| match t {
        Token::Text(t) => t.chars().all(is_text_char),
        Token::Tag(_) => true,
    })
}

/// Normalize a MULTI string
///
/// - Convert tags to lower case with canonical parameters
/// - Remove unsupported tags and tags with malformed parameters
/// - Remove invalid characters from text spans
pub fn normalize(ms: &str) -> String {
    let mut mb = MultiBuilder::new();
    parse(ms, &mut mb);
    mb.into()
}

/// Normalize one line of a MULTI string, stripping page-level tags
pub fn normalize_line(ms: &str) -> String {
    let mut ls = LineStripper::default();
    parse(ms, &mut ls);
    ls.into()
}

#[cfg(test)]
mod test {
    use super::*;

    /// Visitor which records calls as strings
    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl Multi for Recorder {
        fn add_span(&mut self, span: &str) {
            self.0.push(format!("span {span}"));
        }
        fn add_line(&mut self, spacing: Option<u8>) {
            self.0.push(format!("line {spacing:?}"));
        }
        fn add_page(&mut self) {
            self.0.push("page".into());
        }
        fn set_page_times(&mut self, on: Option<u16>, off: Option<u16>) {
            self.0.push(format!("pt {on:?} {off:?}"));
        }
        fn set_justification_line(&mut self, jl: JustificationLine) {
            self.0.push(format!("jl {jl:?}"));
        }
        fn set_font(&mut self, font: Option<(u8, Option<u16>)>) {
            self.0.push(format!("fo {font:?}"));
        }
        fn set_color_foreground(&mut self, clr: Option<Color>) {
            self.0.push(format!("cf {clr:?}"));
        }
        fn set_page_background(&mut self, clr: Color) {
            self.0.push(format!("pb {clr:?}"));
        }
        fn add_color_rectangle(&mut self, rect: Rectangle, clr: Color) {
            self.0.push(format!("cr {rect} {clr:?}"));
        }
        fn set_text_rectangle(&mut self, rect: Rectangle) {
            self.0.push(format!("tr {rect}"));
        }
        fn add_graphic(
            &mut self,
            g_num: u8,
            pos: Option<(u16, u16)>,
            version_id: Option<u16>,
        ) {
            self.0.push(format!("g {g_num} {pos:?} {version_id:?}"));
        }
        fn add_slow_warning(&mut self, slow: SlowWarning) {
            self.0.push(format!("{slow}"));
        }
    }

    fn record(ms: &str) -> Vec<String> {
        let mut rec = Recorder::default();
        parse(ms, &mut rec);
        rec.0
    }

    #[test]
    fn tokens() {
        let mut m = MultiStr::new("A[nl]B[[x y]C");
        assert_eq!(m.next(), Some(Token::Text("A")));
        assert_eq!(m.next(), Some(Token::Tag("[nl]")));
        assert_eq!(m.next(), Some(Token::Text("B[[x y]C")));
        assert_eq!(m.next(), None);
        let mut m = MultiStr::new("[[np]");
        assert_eq!(m.next(), Some(Token::Text("[")));
        assert_eq!(m.next(), Some(Token::Tag("[np]")));
        assert_eq!(m.next(), None);
        let mut m = MultiStr::new("[unterminated");
        assert_eq!(m.next(), Some(Token::Text("[unterminated")));
        assert_eq!(m.next(), None);
    }

    #[test]
    fn tag_lookup() {
        assert_eq!(Tag::lookup("NL3"), Some((Tag::Nl, "3")));
        assert_eq!(Tag::lookup("/sc"), Some((Tag::ScEnd, "")));
        assert_eq!(Tag::lookup("feedABC"), Some((Tag::Feed, "ABC")));
        assert_eq!(Tag::lookup("Slow50,20"), Some((Tag::Slow, "50,20")));
        assert_eq!(Tag::lookup("g1,2,3"), Some((Tag::G, "1,2,3")));
        assert_eq!(Tag::lookup("bogus"), None);
        assert_eq!(Tag::lookup("f1"), None);
    }

    #[test]
    fn unknown_dropped() {
        assert_eq!(record("X[bogus]Y"), vec!["span X", "span Y"]);
        assert_eq!(normalize("X[bogus]Y"), "XY");
    }

    #[test]
    fn new_line() {
        assert_eq!(record("[nl][NL5][nlx]"), vec![
            "line None",
            "line Some(5)",
            "line None"
        ]);
    }

    #[test]
    fn page_times() {
        assert_eq!(record("[pt25o10][pt][pto5][PT20O]"), vec![
            "pt Some(25) Some(10)",
            "pt None None",
            "pt None Some(5)",
            "pt Some(20) None",
        ]);
    }

    #[test]
    fn justification() {
        assert_eq!(record("[jl3][jl][jl9][jlx]"), vec![
            "jl Center",
            "jl Undefined",
            "jl Undefined",
            "jl Undefined",
        ]);
    }

    #[test]
    fn fonts() {
        assert_eq!(record("[fo2][fo3,12ab][fo4,xyz][fo][fox]"), vec![
            "fo Some((2, None))",
            "fo Some((3, Some(4779)))",
            "fo Some((4, None))",
            "fo None",
        ]);
    }

    #[test]
    fn colors() {
        assert_eq!(record("[cf][cf1][cf1,2,3][cf1,2][cfx][pb9][pb]"), vec![
            "cf None",
            "cf Some(Legacy(1))",
            "cf Some(Rgb(1, 2, 3))",
            "pb Legacy(9)",
        ]);
    }

    #[test]
    fn rectangles() {
        assert_eq!(
            record(
                "[cr1,1,10,10,5][cr1,1,10,10,1,2,3][cr1,1,10,10][tr1,2,3,4]"
            ),
            vec![
                "cr 1,1,10,10 Legacy(5)",
                "cr 1,1,10,10 Rgb(1, 2, 3)",
                "tr 1,2,3,4",
            ]
        );
        assert!(record("[tr1,2,3]").is_empty());
        assert!(record("[tr1,2,x,4]").is_empty());
    }

    #[test]
    fn graphics() {
        assert_eq!(record("[g1][g2,5,6][g3,5,6,abcd][g4,5][gx]"), vec![
            "g 1 None None",
            "g 2 Some((5, 6)) None",
            "g 3 Some((5, 6)) Some(43981)",
            "g 4 None None",
        ]);
    }

    #[test]
    fn slow_warnings() {
        assert!(record("[slow0,5]").is_empty());
        assert!(record("[slow100,5]").is_empty());
        assert!(record("[slow50,200]").is_empty());
        assert!(record("[slow50,5,fps]").is_empty());
        assert_eq!(record("[slow50,20]"), vec!["[slow50,20]"]);
        let slow = SlowWarning {
            speed: 50,
            backup: 20,
            units: SpeedUnits::Mph,
            dist: false,
        };
        assert_eq!(slow.to_string(), "[slow50,20]");
        assert_eq!(record("[slow45,-10,KPH]"), vec!["[slow45,-10,kph]"]);
        assert_eq!(record("[slow45,10,mph,dist]"), vec![
            "[slow45,10,mph,dist]"
        ]);
    }

    #[test]
    fn validity() {
        assert!(is_valid("ABC 123[nl]DEF"));
        assert!(is_valid("'!#$%&()*+,-./:;<=>?@^_`"));
        assert!(!is_valid("A\"B"));
        assert!(!is_valid("A{B}"));
        assert!(!is_valid("A~"));
        assert!(!is_valid("A[[B"));
        assert!(is_valid("[bogus]"));
    }

    #[test]
    fn normalize_text() {
        assert_eq!(normalize("[JP3]ABC"), "[jp3]ABC");
        assert_eq!(normalize("A~B|C"), "ABC");
        assert_eq!(normalize("[x y]"), "x y");
        assert_eq!(normalize("[fo1,00ff]A[CF1,2,3]"), "[fo1,00ff]A[cf1,2,3]");
        assert_eq!(normalize("[jl][pt5o]"), "[jl][pt5o]");
    }

    #[test]
    fn normalize_out_of_range() {
        assert_eq!(normalize("A[nl300]B"), "A[nl]B");
        assert_eq!(normalize("A[nl255]B"), "A[nl255]B");
        assert_eq!(normalize("[fo300]A"), "A");
        assert_eq!(normalize("[fo255]A"), "[fo255]A");
    }

    #[test]
    fn normalize_idempotent() {
        for ms in [
            "",
            "X[bogus]Y",
            "[JP3][jl4]ABC[nl3]DEF[NP][pt25o5][cf255,0,0]GHI",
            "[[np]]",
            "A\"B[g1,2,3,abcd][tt100][vsa][slow50,20][feedXYZ]",
            "[cr1,1,10,10,1,2,3][tr1,1,0,0][sc2]A[/sc][fo][cb3]",
        ] {
            let n = normalize(ms);
            assert_eq!(normalize(&n), n);
        }
    }

    #[test]
    fn normalize_lines() {
        assert_eq!(normalize_line("[jp3][jl4]ABC[nl]"), "[jl4]ABC");
        assert_eq!(
            normalize_line("[cf1][fo2][g1][tr1,1,10,10]A[sc1]B[/sc]"),
            "A[sc1]B[/sc]"
        );
    }
}
