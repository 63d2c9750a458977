// iris_multi::dms
//
// Copyright (C) 2019-2025  Minnesota Department of Transportation
//
//! Dynamic message sign messages specified by NTCIP 1203.
mod base64;
pub mod color;
pub mod config;
mod font;
mod graphic;
pub mod multi;
mod multibuilder;
mod multistring;
mod raster;
mod rasterbuilder;
mod render;

pub use font::{Character, Font, FontTable};
pub use graphic::{Graphic, GraphicTable};
pub use multibuilder::{LineStripper, MultiBuilder};
pub use multistring::MultiString;
pub use raster::{BitmapGraphic, PixmapGraphic, RasterError, RasterGraphic};
pub use rasterbuilder::{combine_multi, InvalidMsg, RasterBuilder};
pub use render::MultiRenderer;
