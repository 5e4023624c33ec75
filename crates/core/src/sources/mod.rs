//! Loaders that turn the supported map formats into [`RawPoint`] lists.

mod pack;
mod text;
mod vulnus;

use std::{fmt, path::Path, str::FromStr};

pub use pack::{parse_pack, PackSong};
pub use text::parse_note_list;
pub use vulnus::{load_archive, parse_difficulty};

use crate::{map, NotepilotError, RawPoint, Result};

/// Map file formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapFormat {
    /// Binary `.sspm` map.
    Sspm,
    /// Comma-separated `x|y|time` note list.
    Text,
    /// Legacy multi-song `.sspmr` pack.
    Pack,
    /// Zipped Vulnus map.
    Vulnus,
}

impl MapFormat {
    pub const ALL: [MapFormat; 4] = [
        MapFormat::Sspm,
        MapFormat::Text,
        MapFormat::Pack,
        MapFormat::Vulnus,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MapFormat::Sspm => "sspm",
            MapFormat::Text => "text",
            MapFormat::Pack => "pack",
            MapFormat::Vulnus => "vulnus",
        }
    }

    /// Guesses the format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "sspm" => Some(MapFormat::Sspm),
            "txt" => Some(MapFormat::Text),
            "sspmr" => Some(MapFormat::Pack),
            "zip" => Some(MapFormat::Vulnus),
            _ => None,
        }
    }

    /// Uses `explicit` when given, otherwise the extension of `path`.
    pub fn resolve(explicit: Option<Self>, path: &Path) -> Result<Self> {
        explicit.or_else(|| Self::from_path(path)).ok_or_else(|| {
            NotepilotError::msg(format!(
                "cannot tell the map format of {}; pass one of: {}",
                path.display(),
                Self::ALL.map(Self::name).join(", ")
            ))
        })
    }
}

impl fmt::Display for MapFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MapFormat {
    type Err = NotepilotError;

    fn from_str(name: &str) -> Result<Self> {
        let wanted = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.name() == wanted)
            .ok_or_else(|| NotepilotError::msg(format!("unknown map format `{name}`")))
    }
}

/// Loads raw notes from `path`.
///
/// `song` picks an entry from a pack by name; without it the first song in
/// name order is used. It is ignored for every other format.
pub fn load_points(path: &Path, format: MapFormat, song: Option<&str>) -> Result<Vec<RawPoint>> {
    let points = match format {
        MapFormat::Sspm => map::decode(&std::fs::read(path)?)?,
        MapFormat::Text => parse_note_list(&std::fs::read_to_string(path)?),
        MapFormat::Pack => {
            let songs = parse_pack(&std::fs::read_to_string(path)?);
            let chosen = select_song(&songs, song)?;
            tracing::info!(song = %chosen.name, "selected song from pack");
            parse_note_list(&chosen.notes)
        }
        MapFormat::Vulnus => load_archive(&std::fs::read(path)?)?,
    };

    tracing::debug!(?path, %format, notes = points.len(), "map loaded");
    Ok(points)
}

fn select_song<'a>(songs: &'a [PackSong], wanted: Option<&str>) -> Result<&'a PackSong> {
    match wanted {
        Some(name) => songs
            .iter()
            .find(|song| song.name == name)
            .ok_or_else(|| NotepilotError::msg(format!("no song named `{name}` in pack"))),
        None => songs
            .first()
            .ok_or_else(|| NotepilotError::msg("map pack contains no songs")),
    }
}
