/// Example rendering of a MULTI message to an animated .gif file
use gift::{Encoder, Step};
use iris_multi::dms::color::{ColorClassic, ColorScheme};
use iris_multi::dms::config::{MultiCfg, VmsCfg};
use iris_multi::dms::multi::{JustificationLine, JustificationPage};
use iris_multi::dms::{Font, FontTable, MultiString, RasterBuilder};
use pix::{gray::Gray8, rgb::SRgb8, Palette, Raster};
use std::fs::File;
use std::io::BufWriter;

const MULTI: &str = "[cf1]LEFT[jl3][cf2]MIDDLE[jl4][cf3]RIGHT[nl]\
    [cf4][jl2]THE[cf5][jl3]CENTER[cf6][jl4]LINE[nl][jl3][cf7]THE BOTTOM \
    LINE[np][cf8][jp3][jl3]SECOND PAGE[np][cr1,1,20,8,255,128,128]\
    [cr121,1,20,8,128,255,128][cr1,21,20,8,128,128,255]\
    [cr121,21,20,8,128,128,128][pb32,0,64][pt40o10]PAGE 3";

fn font_table() -> FontTable {
    let fts: Vec<Font> =
        serde_json::from_str(include_str!("font.json")).unwrap();
    fts.into_iter().collect()
}

fn multi_cfg() -> MultiCfg {
    MultiCfg {
        color_scheme: ColorScheme::Color24Bit,
        default_foreground_rgb: ColorClassic::White.into(),
        default_justification_line: JustificationLine::Left,
        default_justification_page: JustificationPage::Top,
        default_page_on_time: 20,
        ..Default::default()
    }
}

fn make_indexed(page: Raster<SRgb8>) -> (Raster<Gray8>, Palette) {
    let mut palette = Palette::new(256);
    let mut indexed = Raster::with_clear(page.width(), page.height());
    for (dst, src) in indexed.pixels_mut().iter_mut().zip(page.pixels()) {
        if let Some(d) = palette.set_entry(*src) {
            *dst = Gray8::new(d as u8);
        } else {
            panic!("Palette full!");
        }
    }
    (indexed, palette)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let fonts = font_table();
    let cfg = multi_cfg();
    let ms = MultiString::from(MULTI);
    let pages = RasterBuilder::new(&VmsCfg::full_matrix(140, 28), &fonts)
        .with_multi_cfg(cfg.clone())
        .create_pixmaps(&ms)?;
    let delays = ms.page_on_intervals(cfg.page_on_interval());
    let mut writer = BufWriter::new(File::create("pages.gif")?);
    let mut enc = Encoder::new(&mut writer).into_step_enc().with_loop_count(0);
    for (page, delay) in pages.into_iter().zip(delays) {
        let (pg, palette) = make_indexed(page.into_raster());
        let delay_cs = (delay.as_millis() / 10) as u16;
        let step =
            Step::with_indexed(pg, palette).with_delay_time_cs(Some(delay_cs));
        enc.encode_step(&step)?;
    }
    Ok(())
}
