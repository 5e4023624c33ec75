use crate::RawPoint;

/// Parses a comma-separated note list of `x|y|time_ms` entries.
///
/// The first comma-separated field is a song header and is ignored, as is any
/// entry that is not exactly three numbers.
pub fn parse_note_list(data: &str) -> Vec<RawPoint> {
    data.split(',').skip(1).filter_map(parse_entry).collect()
}

fn parse_entry(entry: &str) -> Option<RawPoint> {
    let fields = entry
        .split('|')
        .map(|field| field.trim().parse::<f64>().ok())
        .collect::<Option<Vec<_>>>()?;
    let [x, y, timestamp] = fields[..] else {
        return None;
    };
    Some(RawPoint {
        x,
        y,
        timestamp_ms: timestamp.round() as i64,
    })
}
