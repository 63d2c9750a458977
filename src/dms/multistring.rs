// multistring.rs
//
// Copyright (C) 2009-2025  Minnesota Department of Transportation
//
//! MULTI string value type
use crate::dms::config::MultiCfg;
use crate::dms::multi::{
    self, Color, Multi, MultiStr, Rectangle, Tag, Token,
};
use crate::dms::multibuilder::MultiBuilder;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::Duration;

/// A MULTI string
///
/// Two MULTI strings are equal when their normalized forms match, so tag
/// case and malformed tags do not matter.
#[derive(Clone, Debug, Default)]
pub struct MultiString {
    /// Raw MULTI text
    multi: String,
}

/// Visitor collecting text and drawn content, for blank checks
#[derive(Default)]
struct BlankChecker {
    content: String,
}

impl Multi for BlankChecker {
    fn add_span(&mut self, span: &str) {
        self.content.push_str(span);
    }

    fn set_page_background(&mut self, clr: Color) {
        if let Color::Rgb(..) = clr {
            self.content.push_str("PB");
        }
    }

    fn add_color_rectangle(&mut self, _rect: Rectangle, clr: Color) {
        if let Color::Rgb(..) = clr {
            self.content.push_str("CR");
        }
    }

    fn add_graphic(
        &mut self,
        _g_num: u8,
        _pos: Option<(u16, u16)>,
        _version_id: Option<u16>,
    ) {
        self.content.push_str("GRAPHIC");
    }
}

/// Visitor counting page times; a `[pt]` value carries over to following
/// pages until replaced
struct PageTimeCounter {
    on: Option<u16>,
    off: Option<u16>,
    pages: Vec<(Option<u16>, Option<u16>)>,
}

impl PageTimeCounter {
    fn new() -> Self {
        PageTimeCounter {
            on: None,
            off: None,
            pages: vec![(None, None)],
        }
    }

    fn current(&mut self) -> &mut (Option<u16>, Option<u16>) {
        let n = self.pages.len() - 1;
        &mut self.pages[n]
    }
}

impl Multi for PageTimeCounter {
    fn add_page(&mut self) {
        self.pages.push((self.on, self.off));
    }

    fn set_page_times(&mut self, on: Option<u16>, off: Option<u16>) {
        self.on = on;
        self.off = off;
        *self.current() = (on, off);
    }
}

/// Visitor finding the font used on each page
struct FontCounter {
    font_num: u8,
    fonts: Vec<u8>,
}

impl Multi for FontCounter {
    fn set_font(&mut self, font: Option<(u8, Option<u16>)>) {
        if let Some((f_num, _)) = font {
            self.font_num = f_num;
        }
    }

    fn add_page(&mut self) {
        self.fonts.push(self.font_num);
    }

    fn add_span(&mut self, _span: &str) {
        if let Some(f) = self.fonts.last_mut() {
            *f = self.font_num;
        }
    }
}

/// Visitor joining text spans with single spaces
#[derive(Default)]
struct TextCollector {
    text: String,
}

impl Multi for TextCollector {
    fn add_span(&mut self, span: &str) {
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(span.trim());
    }
}

/// Convert deciseconds to a duration
fn deciseconds(ds: u16) -> Duration {
    Duration::from_millis(u64::from(ds) * 100)
}

/// Split a MULTI string at every recognized tag of one kind
pub(crate) fn split_tags(ms: &str, tag: Tag) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut pos = 0;
    for token in MultiStr::new(ms) {
        let len = token.as_str().len();
        if let Some((t, _)) = token.tag() {
            if t == tag {
                parts.push(&ms[start..pos]);
                start = pos + len;
            }
        }
        pos += len;
    }
    parts.push(&ms[start..]);
    parts
}

impl From<&str> for MultiString {
    fn from(ms: &str) -> Self {
        MultiString {
            multi: ms.to_string(),
        }
    }
}

impl From<String> for MultiString {
    fn from(multi: String) -> Self {
        MultiString { multi }
    }
}

impl fmt::Display for MultiString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.multi)
    }
}

impl PartialEq for MultiString {
    fn eq(&self, other: &Self) -> bool {
        self.normalize() == other.normalize()
    }
}

impl Eq for MultiString {}

impl Hash for MultiString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalize().hash(state);
    }
}

impl MultiString {
    /// Get the raw MULTI text
    pub fn as_str(&self) -> &str {
        &self.multi
    }

    /// Parse the MULTI string with a visitor
    pub fn parse(&self, cb: &mut impl Multi) {
        multi::parse(&self.multi, cb);
    }

    /// Check if all text spans contain valid characters
    pub fn is_valid(&self) -> bool {
        multi::is_valid(&self.multi)
    }

    /// Get the normalized MULTI text
    pub fn normalize(&self) -> String {
        multi::normalize(&self.multi)
    }

    /// Get the normalized text of a single line
    pub fn normalize_line(&self) -> String {
        multi::normalize_line(&self.multi)
    }

    /// Check if the message displays nothing.
    ///
    /// Text, page backgrounds, color rectangles and graphics all count as
    /// content; whitespace does not.
    pub fn is_blank(&self) -> bool {
        let mut bc = BlankChecker::default();
        self.parse(&mut bc);
        bc.content.trim().is_empty()
    }

    /// Get the number of pages
    pub fn num_pages(&self) -> usize {
        let mut pages = 1;
        for token in MultiStr::new(&self.multi) {
            if let Some((Tag::Np, _)) = token.tag() {
                pages += 1;
            }
        }
        pages
    }

    /// Check if the message has only one page
    pub fn is_single_page(&self) -> bool {
        self.num_pages() == 1
    }

    /// Get the raw text of every page
    pub fn pages(&self) -> Vec<&str> {
        split_tags(&self.multi, Tag::Np)
    }

    /// Get the raw text of one page (empty when out of range)
    pub fn page(&self, p: usize) -> &str {
        self.pages().get(p).copied().unwrap_or("")
    }

    /// Get the lines of every page.
    ///
    /// * `n_lines` Number of line slots per page.
    ///
    /// Each line is normalized with page-level tags stripped.  Lines past
    /// `n_lines` on a page are ignored, and trailing empty pages are not
    /// counted.
    pub fn lines(&self, n_lines: usize) -> Vec<String> {
        let mut pages = self.pages();
        while pages.len() > 1 && pages.last().map_or(false, |p| p.is_empty())
        {
            pages.pop();
        }
        let mut lines = Vec::with_capacity(n_lines * pages.len());
        for page in pages {
            let mut lns: Vec<String> = split_tags(page, Tag::Nl)
                .into_iter()
                .take(n_lines)
                .map(multi::normalize_line)
                .collect();
            lns.resize(n_lines, String::new());
            lines.extend(lns);
        }
        lines
    }

    /// Get the page times of every page
    fn page_times(&self) -> Vec<(Option<u16>, Option<u16>)> {
        let mut ptc = PageTimeCounter::new();
        self.parse(&mut ptc);
        ptc.pages
    }

    /// Get the page on interval of every page
    pub fn page_on_intervals(&self, dflt: Duration) -> Vec<Duration> {
        self.page_times()
            .into_iter()
            .map(|(on, _)| on.map_or(dflt, deciseconds))
            .collect()
    }

    /// Get the page off interval of every page
    pub fn page_off_intervals(&self, dflt: Duration) -> Vec<Duration> {
        self.page_times()
            .into_iter()
            .map(|(_, off)| off.map_or(dflt, deciseconds))
            .collect()
    }

    /// Get the page on interval of the first page
    pub fn page_on_interval(&self, cfg: &MultiCfg) -> Duration {
        let dflt = cfg.page_on_interval();
        self.page_on_intervals(dflt).first().copied().unwrap_or(dflt)
    }

    /// Get the page off interval of the first page
    pub fn page_off_interval(&self, cfg: &MultiCfg) -> Duration {
        let dflt = cfg.page_off_interval();
        self.page_off_intervals(dflt).first().copied().unwrap_or(dflt)
    }

    /// Get the font number used on each page.
    ///
    /// * `default` Default font number; 0 gives an empty result.
    pub fn fonts(&self, default: u8) -> Vec<u8> {
        if default < 1 {
            return Vec::new();
        }
        let mut fc = FontCounter {
            font_num: default,
            fonts: vec![default],
        };
        self.parse(&mut fc);
        fc.fonts
    }

    /// Get the message as plain text, with tags removed
    pub fn as_text(&self) -> String {
        let mut tc = TextCollector::default();
        self.parse(&mut tc);
        tc.text.trim().to_string()
    }

    /// Get the words of the message text
    pub fn words(&self) -> Vec<String> {
        self.as_text().split(' ').map(|w| w.trim().to_string()).collect()
    }

    /// Rebuild the message, mapping each page time tag
    fn map_page_time(
        &self,
        mut f: impl FnMut(&mut MultiBuilder),
    ) -> MultiBuilder {
        let mut mb = MultiBuilder::new();
        for token in MultiStr::new(&self.multi) {
            match token {
                Token::Tag(_) => match token.tag() {
                    Some((Tag::Pt, _)) => f(&mut mb),
                    _ => multi::parse(token.as_str(), &mut mb),
                },
                Token::Text(t) => mb.add_span(t),
            }
        }
        mb
    }

    /// Remove all page time tags
    pub fn strip_page_time(&self) -> MultiString {
        let mb = self.map_page_time(|_| ());
        MultiString::from(String::from(mb))
    }

    /// Replace all page time tags.
    ///
    /// A page time tag is prepended when the message has none.
    pub fn replace_page_time(
        &self,
        on: Option<u16>,
        off: Option<u16>,
    ) -> MultiString {
        let mut found = false;
        let mb = self.map_page_time(|mb| {
            found = true;
            mb.set_page_times(on, off);
        });
        if found {
            MultiString::from(String::from(mb))
        } else {
            let mut pt = MultiBuilder::new();
            pt.set_page_times(on, off);
            MultiString::from(format!("{pt}{mb}"))
        }
    }
}
