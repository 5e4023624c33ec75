use std::collections::BTreeMap;

const FIELD_SEPARATOR: &str = ":~:";
const NAME_FIELD: usize = 2;

/// One song from a map pack. `notes` is a note list in the text format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackSong {
    pub name: String,
    pub notes: String,
}

/// Parses a legacy map pack: one song per line, fields separated by `:~:`,
/// the song name in the third field and the note list in the last one.
///
/// Lines starting with `#` are comments. Songs come back sorted by name; a
/// later line with the same name replaces an earlier one.
pub fn parse_pack(contents: &str) -> Vec<PackSong> {
    let mut songs = BTreeMap::new();
    for line in contents.lines() {
        if line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.trim_end().split(FIELD_SEPARATOR).collect();
        if fields.len() <= NAME_FIELD {
            continue;
        }
        if let Some(notes) = fields.last() {
            songs.insert(fields[NAME_FIELD].to_string(), notes.to_string());
        }
    }

    songs
        .into_iter()
        .map(|(name, notes)| PackSong { name, notes })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_songs_sorted_by_name() {
        let pack = "# exported maps\n\
                    zeta:~:artist:~:Zeta Song:~:hard:~:z,1|1|0\n\
                    alpha:~:artist:~:Alpha Song:~:easy:~:a,0|0|0,1|1|100\n";

        let songs = parse_pack(pack);

        assert_eq!(
            songs,
            vec![
                PackSong {
                    name: "Alpha Song".to_string(),
                    notes: "a,0|0|0,1|1|100".to_string(),
                },
                PackSong {
                    name: "Zeta Song".to_string(),
                    notes: "z,1|1|0".to_string(),
                },
            ]
        );
    }

    #[test]
    fn skips_comments_and_short_lines() {
        let pack = "#a:~:b:~:Commented:~:x\nonly:~:two\n\n";
        assert!(parse_pack(pack).is_empty());
    }

    #[test]
    fn later_duplicates_win() {
        let pack = "a:~:b:~:Song:~:first\na:~:b:~:Song:~:second\n";
        let songs = parse_pack(pack);
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].notes, "second");
    }
}
