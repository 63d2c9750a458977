// iris-multi
//
// Copyright (C) 2019-2025  Minnesota Department of Transportation
//
//! Rust library for parsing and rendering MULTI (NTCIP 1203) messages
//! for dynamic message signs.
//!
#![forbid(unsafe_code)]

#[macro_use]
extern crate serde_derive;

pub mod dms;
