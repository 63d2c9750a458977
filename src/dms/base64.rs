// base64.rs
//
// Copyright (C) 2019-2025  Minnesota Department of Transportation
//
//! Serde helper for bitmap fields stored as base64 strings.
//!
//! Use with `#[serde(with = "super::base64")]`.
use base64::display::Base64Display;
use serde::{de, Deserialize, Deserializer, Serializer};

/// Serialize bitmap data as a standard base64 string
pub fn serialize<S>(bitmap: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let b64 = Base64Display::with_config(bitmap, base64::STANDARD);
    serializer.collect_str(&b64)
}

/// Deserialize bitmap data from a base64 string
pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let b64 = String::deserialize(deserializer)?;
    base64::decode(b64.trim()).map_err(de::Error::custom)
}
