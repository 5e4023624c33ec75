//! Decoder for version 1 `.sspm` binary maps.
//!
//! A map is a small header (magic, version, three newline-terminated strings,
//! a handful of fixed fields, an optional cover image and an audio blob)
//! followed by note records that run to the end of the file. Only the note
//! records matter for playback; everything before them is skipped
//! byte-accurately.

use crate::{error::FormatError, timeline::RawPoint};

/// Leading bytes of every map file.
pub const MAGIC: [u8; 4] = *b"SS+m";
/// The only container version this decoder understands.
pub const SUPPORTED_VERSION: u16 = 1;

/// Maps store coordinates mirrored; `MIRROR_ORIGIN - coord` restores them.
const MIRROR_ORIGIN: f64 = 2.0;
const STRING_TERMINATOR: u8 = 0x0A;

/// Header metadata read ahead of the note records.
#[derive(Debug, Clone, PartialEq)]
pub struct MapHeader {
    pub version: u16,
    pub id: String,
    pub name: String,
    pub creator: String,
    pub duration_ms: u32,
    /// Note count as declared by the file. The decoder never trusts it.
    pub declared_notes: u32,
    pub difficulty: u8,
    pub cover: CoverImage,
    pub audio_storage: u8,
    pub audio_len: u64,
}

/// Cover image block, keyed by the discriminator byte that precedes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverImage {
    /// Discriminator `0`.
    None,
    /// Discriminator `1`: fixed image record followed by raw pixel data.
    Legacy {
        width: u16,
        height: u16,
        mip: u8,
        format: u8,
        len: u64,
    },
    /// Discriminator `2`: an opaque length-prefixed blob.
    Blob { len: u64 },
}

/// Decodes a map and returns its note records, minus the leading phantom one.
pub fn decode(bytes: &[u8]) -> Result<Vec<RawPoint>, FormatError> {
    decode_with_header(bytes).map(|(_, points)| points)
}

/// Decodes a map, keeping the header metadata alongside the notes.
pub fn decode_with_header(bytes: &[u8]) -> Result<(MapHeader, Vec<RawPoint>), FormatError> {
    let mut reader = ByteReader::new(bytes);
    let header = read_header(&mut reader)?;
    let records = read_note_records(&mut reader)?;

    if records.len() as u64 != u64::from(header.declared_notes) {
        tracing::debug!(
            declared = header.declared_notes,
            read = records.len(),
            "note count in header disagrees with the records present"
        );
    }

    Ok((header, drop_phantom_record(records)))
}

/// Every map observed so far opens with a record that has no in-game
/// counterpart. It is removed unconditionally.
fn drop_phantom_record(mut records: Vec<RawPoint>) -> Vec<RawPoint> {
    if records.is_empty() {
        return records;
    }
    records.remove(0);
    records
}

fn read_header(reader: &mut ByteReader<'_>) -> Result<MapHeader, FormatError> {
    if reader.take(4, "magic")? != MAGIC {
        return Err(FormatError::BadMagic);
    }

    let version = reader.u16_le("version")?;
    if version != SUPPORTED_VERSION {
        return Err(FormatError::UnsupportedVersion(version));
    }

    let reserved = reader.u16_le("reserved field")?;
    if reserved != 0 {
        return Err(FormatError::ReservedNonzero(reserved));
    }

    let id = reader.line("map id")?;
    let name = reader.line("map name")?;
    let creator = reader.line("creator name")?;
    let duration_ms = reader.u32_le("duration")?;
    let declared_notes = reader.u32_le("note count")?;
    let difficulty = reader.u8("difficulty")?;
    let cover = read_cover(reader)?;
    let audio_storage = reader.u8("audio storage type")?;
    let audio_len = reader.u64_le("audio length")?;
    reader.skip(audio_len, "audio data")?;

    Ok(MapHeader {
        version,
        id,
        name,
        creator,
        duration_ms,
        declared_notes,
        difficulty,
        cover,
        audio_storage,
        audio_len,
    })
}

fn read_cover(reader: &mut ByteReader<'_>) -> Result<CoverImage, FormatError> {
    let cover = match reader.u8("cover discriminator")? {
        0 => CoverImage::None,
        1 => {
            let width = reader.u16_le("cover width")?;
            let height = reader.u16_le("cover height")?;
            let mip = reader.u8("cover mip flag")?;
            let format = reader.u8("cover format")?;
            let len = reader.u64_le("cover length")?;
            reader.skip(len, "cover data")?;
            CoverImage::Legacy {
                width,
                height,
                mip,
                format,
                len,
            }
        }
        2 => {
            let len = reader.u64_le("cover length")?;
            reader.skip(len, "cover data")?;
            CoverImage::Blob { len }
        }
        other => return Err(FormatError::BadCoverDiscriminator(other)),
    };
    Ok(cover)
}

fn read_note_records(reader: &mut ByteReader<'_>) -> Result<Vec<RawPoint>, FormatError> {
    let mut records = Vec::new();
    while !reader.is_empty() {
        records.push(read_note_record(reader).ok_or(FormatError::TruncatedNoteRecord)?);
    }
    Ok(records)
}

fn read_note_record(reader: &mut ByteReader<'_>) -> Option<RawPoint> {
    let timestamp_ms = u32::from_le_bytes(reader.array()?);
    let quantum = reader.array::<1>()?[0] != 0;
    let (x, y) = if quantum {
        let x = f32::from_le_bytes(reader.array()?);
        let y = f32::from_le_bytes(reader.array()?);
        (f64::from(x), f64::from(y))
    } else {
        let [x, y] = reader.array::<2>()?;
        (f64::from(x), f64::from(y))
    };

    Some(RawPoint {
        x: MIRROR_ORIGIN - x,
        y: MIRROR_ORIGIN - y,
        timestamp_ms: i64::from(timestamp_ms),
    })
}

/// Forward-only cursor over a borrowed byte slice.
struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn array<const N: usize>(&mut self) -> Option<[u8; N]> {
        let data = self.data;
        let bytes = data.get(self.pos..self.pos + N)?;
        self.pos += N;
        bytes.try_into().ok()
    }

    fn take(&mut self, len: usize, section: &'static str) -> Result<&'a [u8], FormatError> {
        if self.remaining() < len {
            return Err(FormatError::TruncatedHeader { section });
        }
        let data = self.data;
        let bytes = &data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn skip(&mut self, len: u64, section: &'static str) -> Result<(), FormatError> {
        let len = usize::try_from(len).map_err(|_| FormatError::TruncatedHeader { section })?;
        self.take(len, section).map(|_| ())
    }

    fn fixed<const N: usize>(&mut self, section: &'static str) -> Result<[u8; N], FormatError> {
        self.array().ok_or(FormatError::TruncatedHeader { section })
    }

    fn u8(&mut self, section: &'static str) -> Result<u8, FormatError> {
        Ok(self.fixed::<1>(section)?[0])
    }

    fn u16_le(&mut self, section: &'static str) -> Result<u16, FormatError> {
        self.fixed(section).map(u16::from_le_bytes)
    }

    fn u32_le(&mut self, section: &'static str) -> Result<u32, FormatError> {
        self.fixed(section).map(u32::from_le_bytes)
    }

    fn u64_le(&mut self, section: &'static str) -> Result<u64, FormatError> {
        self.fixed(section).map(u64::from_le_bytes)
    }

    /// Reads up to the next newline, consuming the terminator.
    fn line(&mut self, section: &'static str) -> Result<String, FormatError> {
        let data = self.data;
        let rest = &data[self.pos..];
        let end = rest
            .iter()
            .position(|&byte| byte == STRING_TERMINATOR)
            .ok_or(FormatError::TruncatedHeader { section })?;
        self.pos += end + 1;
        Ok(String::from_utf8_lossy(&rest[..end]).into_owned())
    }
}
