use serde::{Deserialize, Serialize};

/// Notes closer than this to the first note of their group are merged.
pub const CLUSTER_WINDOW_MS: i64 = 10;

/// A single note as read from a map or note list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    pub x: f64,
    pub y: f64,
    pub timestamp_ms: i64,
}

/// A merged note on the playback timeline.
///
/// `timestamp_ms` is the time of the first raw note in the group and the
/// coordinates are the mean of every note merged into it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub x: f64,
    pub y: f64,
    pub timestamp_ms: i64,
}

/// Collapses bursts of notes into single timeline points.
///
/// Grouping is anchored on the first note of each group: a note joins the
/// open group while it is less than [`CLUSTER_WINDOW_MS`] after that first
/// note, no matter how many notes have joined since.
pub fn aggregate(points: Vec<RawPoint>) -> Vec<TimelinePoint> {
    let mut timeline = Vec::new();
    let mut cluster: Vec<RawPoint> = Vec::new();

    for point in points {
        match cluster.first() {
            Some(first) if point.timestamp_ms - first.timestamp_ms < CLUSTER_WINDOW_MS => {
                cluster.push(point);
            }
            Some(_) => {
                timeline.push(merge(&cluster));
                cluster.clear();
                cluster.push(point);
            }
            None => cluster.push(point),
        }
    }

    if !cluster.is_empty() {
        timeline.push(merge(&cluster));
    }

    timeline
}

fn merge(cluster: &[RawPoint]) -> TimelinePoint {
    let count = cluster.len() as f64;
    let x = cluster.iter().map(|point| point.x).sum::<f64>() / count;
    let y = cluster.iter().map(|point| point.y).sum::<f64>() / count;
    TimelinePoint {
        x,
        y,
        timestamp_ms: cluster[0].timestamp_ms,
    }
}
