//! Offset mapping between a parse snapshot and the live document
//!
//! The live text may have moved on since the tree was built. The difference
//! is collapsed into one edited region (common prefix and suffix kept), so
//! offsets before or after the region translate and offsets inside it do not.

use std::ops::Range;

use super::parser::compute_incremental_edit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EditedRegion {
    start: usize,
    snapshot_end: usize,
    live_end: usize,
}

/// Byte offset translation between snapshot and live text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SnapshotMapping {
    region: Option<EditedRegion>,
}

impl SnapshotMapping {
    /// Mapping for identical texts
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn between(snapshot: &str, live: &str) -> Self {
        let region = compute_incremental_edit(snapshot, live).map(|edit| EditedRegion {
            start: edit.start_byte,
            snapshot_end: edit.old_end_byte,
            live_end: edit.new_end_byte,
        });
        Self { region }
    }

    pub fn is_identity(&self) -> bool {
        self.region.is_none()
    }

    /// Snapshot byte offset to live byte offset
    pub fn to_live(&self, byte: usize) -> Option<usize> {
        match self.region {
            None => Some(byte),
            Some(r) => shift(byte, r.start, r.snapshot_end, r.live_end),
        }
    }

    /// Live byte offset to snapshot byte offset
    pub fn to_snapshot(&self, byte: usize) -> Option<usize> {
        match self.region {
            None => Some(byte),
            Some(r) => shift(byte, r.start, r.live_end, r.snapshot_end),
        }
    }

    /// Snapshot byte range to live byte range.
    ///
    /// Ranges touching the edited region do not map.
    pub fn range_to_live(&self, range: Range<usize>) -> Option<Range<usize>> {
        let Some(r) = self.region else {
            return Some(range);
        };
        if range.end <= r.start {
            Some(range)
        } else if range.start >= r.snapshot_end {
            let delta = r.live_end as isize - r.snapshot_end as isize;
            Some(
                (range.start as isize + delta) as usize..(range.end as isize + delta) as usize,
            )
        } else {
            None
        }
    }
}

fn shift(byte: usize, start: usize, from_end: usize, to_end: usize) -> Option<usize> {
    if byte < start {
        Some(byte)
    } else if byte >= from_end {
        Some(byte - from_end + to_end)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_texts_are_identity() {
        let mapping = SnapshotMapping::between("let x = 1;", "let x = 1;");
        assert!(mapping.is_identity());
        assert_eq!(mapping.to_live(7), Some(7));
        assert_eq!(mapping.range_to_live(4..5), Some(4..5));
    }

    #[test]
    fn test_insertion_shifts_following_offsets() {
        let snapshot = "let x = 1; print(x)";
        let live = "let x = 1;   print(x)";
        let mapping = SnapshotMapping::between(snapshot, live);

        assert_eq!(mapping.to_live(4), Some(4));
        assert_eq!(mapping.range_to_live(17..18), Some(19..20));
        assert_eq!(mapping.to_snapshot(19), Some(17));
    }

    #[test]
    fn test_offsets_inside_edit_do_not_map() {
        let snapshot = "let count = 1;";
        let live = "let amount = 1;";
        let mapping = SnapshotMapping::between(snapshot, live);

        assert_eq!(mapping.to_live(0), Some(0));
        assert_eq!(mapping.range_to_live(4..9), None);
        assert_eq!(mapping.range_to_live(10..11), Some(11..12));
    }
}
