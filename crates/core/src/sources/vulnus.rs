//! Vulnus maps: a ZIP archive holding `meta.json` plus one JSON file per
//! difficulty. Only the first listed difficulty is played.

use std::io::{Cursor, Read};

use serde::Deserialize;
use zip::ZipArchive;

use crate::{NotepilotError, RawPoint, Result};

const META_FILE: &str = "meta.json";

#[derive(Debug, Deserialize)]
struct Meta {
    #[serde(rename = "_difficulties")]
    difficulties: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Difficulty {
    #[serde(rename = "_notes")]
    notes: Vec<Note>,
}

#[derive(Debug, Deserialize)]
struct Note {
    #[serde(rename = "_x")]
    x: f64,
    #[serde(rename = "_y")]
    y: f64,
    /// Seconds from the start of the song.
    #[serde(rename = "_time")]
    time: f64,
}

/// Reads the first difficulty of a zipped map.
pub fn load_archive(data: &[u8]) -> Result<Vec<RawPoint>> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;

    let meta: Meta = serde_json::from_slice(&read_entry(&mut archive, META_FILE)?)?;
    let first = meta
        .difficulties
        .first()
        .ok_or_else(|| NotepilotError::msg("map archive lists no difficulties"))?;

    parse_difficulty(&read_entry(&mut archive, first)?)
}

/// Converts one difficulty file into map-space points.
///
/// Vulnus places the origin at the centre with `y` pointing the other way, so
/// `x` is mirrored around 1 and `y` shifted by 1 to line up with `.sspm`
/// coordinates.
pub fn parse_difficulty(json: &[u8]) -> Result<Vec<RawPoint>> {
    let difficulty: Difficulty = serde_json::from_slice(json)?;
    Ok(difficulty
        .notes
        .into_iter()
        .map(|note| RawPoint {
            x: 1.0 - note.x,
            y: note.y + 1.0,
            timestamp_ms: (note.time * 1000.0) as i64,
        })
        .collect())
}

fn read_entry(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> Result<Vec<u8>> {
    let mut entry = archive.by_name(name)?;
    let mut contents = Vec::new();
    entry.read_to_end(&mut contents)?;
    Ok(contents)
}
