//! Identifier backfill.
//!
//! A photo whose QR code could not be read usually belongs to the same
//! specimen as the photo taken just before it. For an image with an empty ID,
//! the predecessor's ID is copied when the two captures are less than
//! `threshold` apart; optionally the successor is tried next.
//!
//! A bulk pass decides every fill against the IDs present before the pass, so
//! in a run of empty IDs only the first one is filled from its predecessor
//! (and, with `fill_from_next`, the last one from its successor).

use std::time::Duration;

use crate::capture::record::CaptureRecord;

/// When an empty ID may be taken from a neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackfillPolicy {
    /// Neighbour must be strictly closer in time than this.
    pub threshold: Duration,
    /// Try the following record when the preceding one does not qualify.
    pub fill_from_next: bool,
}

impl Default for BackfillPolicy {
    fn default() -> Self {
        Self {
            threshold: Duration::from_secs(30),
            fill_from_next: false,
        }
    }
}

impl BackfillPolicy {
    fn close_enough(&self, a: &CaptureRecord, b: &CaptureRecord) -> bool {
        a.millis_apart(b)
            .is_some_and(|ms| u128::from(ms) < self.threshold.as_millis())
    }
}

/// Index of the neighbour `index` should copy its ID from.
fn pick_source(
    records: &[CaptureRecord],
    index: usize,
    policy: &BackfillPolicy,
    has_id: impl Fn(usize) -> bool,
) -> Option<usize> {
    let current = &records[index];

    if index > 0 && has_id(index - 1) && policy.close_enough(&records[index - 1], current) {
        return Some(index - 1);
    }
    if policy.fill_from_next
        && index + 1 < records.len()
        && has_id(index + 1)
        && policy.close_enough(current, &records[index + 1])
    {
        return Some(index + 1);
    }
    None
}

/// Fill the record at `index` from a neighbour if its ID is empty.
///
/// Returns `true` when the ID was set.
pub fn fill_one(records: &mut [CaptureRecord], index: usize, policy: &BackfillPolicy) -> bool {
    match records.get(index) {
        Some(record) if !record.has_id() => {}
        _ => return false,
    }

    let source = pick_source(records, index, policy, |i| records[i].has_id());
    match source {
        Some(source) => {
            records[index].id = records[source].id.clone();
            tracing::debug!(
                filename = %records[index].filename,
                id = %records[index].id,
                from = %records[source].filename,
                "ID filled from neighbour"
            );
            true
        }
        None => false,
    }
}

/// Fill every empty ID that has a qualifying neighbour in a single pass.
///
/// Records should already be sorted by time. Returns the number of IDs set.
pub fn fill_all(records: &mut [CaptureRecord], policy: &BackfillPolicy) -> usize {
    let had_id: Vec<bool> = records.iter().map(CaptureRecord::has_id).collect();

    let mut filled = 0;
    for index in 0..records.len() {
        if had_id[index] {
            continue;
        }
        if let Some(source) = pick_source(records, index, policy, |i| had_id[i]) {
            records[index].id = records[source].id.clone();
            filled += 1;
        }
    }

    let still_empty = records.iter().filter(|r| !r.has_id()).count();
    tracing::info!(filled, still_empty, "Backfilled IDs");
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn at(secs: i64, id: &str) -> CaptureRecord {
        let base = NaiveDateTime::parse_from_str("2021-05-03 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        CaptureRecord {
            id: id.to_string(),
            filename: format!("IMG_{secs}.jpg"),
            datetime: Some(base + chrono::Duration::seconds(secs)),
            ..Default::default()
        }
    }

    fn policy(secs: u64, fill_from_next: bool) -> BackfillPolicy {
        BackfillPolicy {
            threshold: Duration::from_secs(secs),
            fill_from_next,
        }
    }

    fn ids(records: &[CaptureRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_fills_within_threshold_only() {
        let mut records = vec![at(0, "A"), at(20, "")];
        assert_eq!(fill_all(&mut records, &policy(30, false)), 1);
        assert_eq!(ids(&records), vec!["A", "A"]);

        let mut records = vec![at(0, "A"), at(20, "")];
        assert_eq!(fill_all(&mut records, &policy(10, false)), 0);
        assert_eq!(ids(&records), vec!["A", ""]);
    }

    #[test]
    fn test_gap_equal_to_threshold_is_not_filled() {
        let mut records = vec![at(0, "A"), at(30, "")];
        assert_eq!(fill_all(&mut records, &policy(30, false)), 0);
    }

    #[test]
    fn test_existing_ids_untouched() {
        let mut records = vec![at(0, "A"), at(5, "B"), at(6, ""), at(7, "C")];
        fill_all(&mut records, &policy(30, true));
        assert_eq!(ids(&records), vec!["A", "B", "B", "C"]);
    }

    #[test]
    fn test_run_of_empties_fills_first_only() {
        let mut records = vec![at(0, "A"), at(1, ""), at(2, ""), at(3, "")];
        assert_eq!(fill_all(&mut records, &policy(30, false)), 1);
        assert_eq!(ids(&records), vec!["A", "A", "", ""]);
    }

    #[test]
    fn test_fill_from_next() {
        let mut records = vec![at(0, ""), at(10, "B")];
        assert_eq!(fill_all(&mut records, &policy(30, false)), 0);
        assert_eq!(fill_all(&mut records, &policy(30, true)), 1);
        assert_eq!(ids(&records), vec!["B", "B"]);
    }

    #[test]
    fn test_previous_preferred_over_next() {
        let mut records = vec![at(0, "A"), at(10, ""), at(11, "B")];
        fill_all(&mut records, &policy(30, true));
        assert_eq!(ids(&records), vec!["A", "A", "B"]);
    }

    #[test]
    fn test_next_used_when_previous_too_old() {
        let mut records = vec![at(0, "A"), at(100, ""), at(105, "B")];
        fill_all(&mut records, &policy(30, true));
        assert_eq!(ids(&records), vec!["A", "B", "B"]);
    }

    #[test]
    fn test_missing_timestamp_never_filled() {
        let mut untimed = at(0, "");
        untimed.datetime = None;
        let mut records = vec![untimed, at(1, "A")];
        assert_eq!(fill_all(&mut records, &policy(30, true)), 0);
    }

    #[test]
    fn test_fill_one_uses_current_ids() {
        let mut records = vec![at(0, "A"), at(1, ""), at(2, "")];
        assert!(fill_one(&mut records, 1, &policy(30, false)));
        assert!(fill_one(&mut records, 2, &policy(30, false)));
        assert_eq!(ids(&records), vec!["A", "A", "A"]);

        assert!(!fill_one(&mut records, 0, &policy(30, false)));
        assert!(!fill_one(&mut records, 99, &policy(30, false)));
    }
}
