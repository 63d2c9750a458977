// multibuilder.rs
//
// Copyright (C) 2018-2025  Minnesota Department of Transportation
//
//! Builders which re-serialize MULTI from visitor calls
use crate::dms::multi::{
    is_text_char, Color, JustificationLine, JustificationPage, Multi,
    Rectangle, SlowWarning,
};
use std::fmt::{self, Write};

/// MULTI builder
///
/// Every visitor call is written as canonical MULTI.  Text spans are
/// filtered to valid characters, so the result is always valid MULTI.
#[derive(Clone, Debug, Default)]
pub struct MultiBuilder {
    /// MULTI string being built
    multi: String,
}

/// Line stripper
///
/// Builds MULTI for one isolated line of text, suppressing page-level
/// tags: line and page breaks, page times, page justification, colors,
/// graphics, fonts, rectangles and feeds.
#[derive(Clone, Debug, Default)]
pub struct LineStripper(MultiBuilder);

impl MultiBuilder {
    /// Create a new MULTI builder
    pub fn new() -> Self {
        MultiBuilder::default()
    }

    /// Get the MULTI string
    pub fn as_str(&self) -> &str {
        &self.multi
    }

    /// Append a tag, formatted with its parameters
    fn tag(&mut self, args: fmt::Arguments) {
        // writing to a String cannot fail
        let _ = self.multi.write_fmt(args);
    }
}

impl fmt::Display for MultiBuilder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.multi)
    }
}

impl From<MultiBuilder> for String {
    fn from(mb: MultiBuilder) -> String {
        mb.multi
    }
}

impl Multi for MultiBuilder {
    fn add_span(&mut self, span: &str) {
        self.multi.extend(span.chars().filter(|c| is_text_char(*c)));
    }

    fn add_line(&mut self, spacing: Option<u8>) {
        match spacing {
            Some(ls) => self.tag(format_args!("[nl{ls}]")),
            None => self.multi.push_str("[nl]"),
        }
    }

    fn add_page(&mut self) {
        self.multi.push_str("[np]");
    }

    fn set_page_times(&mut self, on: Option<u16>, off: Option<u16>) {
        self.multi.push_str("[pt");
        if let Some(on) = on {
            self.tag(format_args!("{on}"));
        }
        self.multi.push('o');
        if let Some(off) = off {
            self.tag(format_args!("{off}"));
        }
        self.multi.push(']');
    }

    fn set_justification_page(&mut self, jp: JustificationPage) {
        self.tag(format_args!("[jp{jp}]"));
    }

    fn set_justification_line(&mut self, jl: JustificationLine) {
        self.tag(format_args!("[jl{jl}]"));
    }

    fn set_font(&mut self, font: Option<(u8, Option<u16>)>) {
        match font {
            Some((num, Some(vid))) => {
                self.tag(format_args!("[fo{num},{vid:04x}]"))
            }
            Some((num, None)) => self.tag(format_args!("[fo{num}]")),
            None => self.multi.push_str("[fo]"),
        }
    }

    fn set_char_spacing(&mut self, sc: Option<u8>) {
        match sc {
            Some(sc) => self.tag(format_args!("[sc{sc}]")),
            None => self.multi.push_str("[/sc]"),
        }
    }

    fn set_color_background(&mut self, x: u8) {
        self.tag(format_args!("[cb{x}]"));
    }

    fn set_color_foreground(&mut self, clr: Option<Color>) {
        match clr {
            Some(clr) => self.tag(format_args!("[cf{clr}]")),
            None => self.multi.push_str("[cf]"),
        }
    }

    fn set_page_background(&mut self, clr: Color) {
        self.tag(format_args!("[pb{clr}]"));
    }

    fn add_color_rectangle(&mut self, rect: Rectangle, clr: Color) {
        self.tag(format_args!("[cr{rect},{clr}]"));
    }

    fn set_text_rectangle(&mut self, rect: Rectangle) {
        self.tag(format_args!("[tr{rect}]"));
    }

    fn add_graphic(
        &mut self,
        g_num: u8,
        pos: Option<(u16, u16)>,
        version_id: Option<u16>,
    ) {
        match (pos, version_id) {
            (Some((x, y)), Some(vid)) => {
                self.tag(format_args!("[g{g_num},{x},{y},{vid:04x}]"))
            }
            (Some((x, y)), None) => {
                self.tag(format_args!("[g{g_num},{x},{y}]"))
            }
            (None, _) => self.tag(format_args!("[g{g_num}]")),
        }
    }

    fn add_travel_time(&mut self, sid: &str) {
        self.tag(format_args!("[tt{sid}]"));
    }

    fn add_speed_advisory(&mut self) {
        self.multi.push_str("[vsa]");
    }

    fn add_slow_warning(&mut self, slow: SlowWarning) {
        self.tag(format_args!("{slow}"));
    }

    fn add_feed(&mut self, fid: &str) {
        self.tag(format_args!("[feed{fid}]"));
    }
}

impl From<LineStripper> for String {
    fn from(ls: LineStripper) -> String {
        ls.0.into()
    }
}

impl Multi for LineStripper {
    fn add_span(&mut self, span: &str) {
        self.0.add_span(span);
    }

    fn set_justification_line(&mut self, jl: JustificationLine) {
        self.0.set_justification_line(jl);
    }

    fn set_char_spacing(&mut self, sc: Option<u8>) {
        self.0.set_char_spacing(sc);
    }

    fn add_travel_time(&mut self, sid: &str) {
        self.0.add_travel_time(sid);
    }

    fn add_speed_advisory(&mut self) {
        self.0.add_speed_advisory();
    }

    fn add_slow_warning(&mut self, slow: SlowWarning) {
        self.0.add_slow_warning(slow);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dms::multi::SpeedUnits;

    #[test]
    fn build_tags() {
        let mut mb = MultiBuilder::new();
        mb.set_justification_page(JustificationPage::Middle);
        mb.set_font(Some((3, Some(0xBEEF))));
        mb.add_span("HELLO");
        mb.add_line(None);
        mb.set_color_foreground(Some(Color::Rgb(255, 208, 0)));
        mb.add_span("WORLD");
        mb.add_line(Some(2));
        mb.add_page();
        mb.set_page_times(Some(20), None);
        mb.set_text_rectangle(Rectangle::new(1, 1, 50, 7));
        mb.add_graphic(4, Some((2, 3)), None);
        assert_eq!(
            mb.as_str(),
            "[jp3][fo3,beef]HELLO[nl][cf255,208,0]WORLD[nl2][np]\
             [pt20o][tr1,1,50,7][g4,2,3]"
        );
    }

    #[test]
    fn filter_spans() {
        let mut mb = MultiBuilder::new();
        mb.add_span("[A]{B}~\"C\"");
        assert_eq!(String::from(mb), "ABC");
    }

    #[test]
    fn undefined_justification() {
        let mut mb = MultiBuilder::new();
        mb.set_justification_line(JustificationLine::Undefined);
        mb.set_justification_page(JustificationPage::Undefined);
        mb.set_font(None);
        mb.set_color_foreground(None);
        assert_eq!(mb.to_string(), "[jl][jp][fo][cf]");
    }

    #[test]
    fn strip_line() {
        let mut ls = LineStripper::default();
        ls.set_justification_page(JustificationPage::Top);
        ls.set_justification_line(JustificationLine::Right);
        ls.set_font(Some((2, None)));
        ls.add_span("EXIT");
        ls.add_slow_warning(SlowWarning {
            speed: 30,
            backup: 5,
            units: SpeedUnits::Kph,
            dist: false,
        });
        ls.add_line(None);
        ls.add_page();
        assert_eq!(String::from(ls), "[jl4]EXIT[slow30,5,kph]");
    }
}
