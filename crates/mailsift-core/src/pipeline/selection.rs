//! Pure selection helpers used by the attachment pipeline.

use crate::types::{LabelRef, MessageRef};

/// Pick the most recently received candidate.
///
/// The candidate with the largest timestamp wins; on equal timestamps the
/// first one seen is kept. A candidate without a timestamp is only chosen
/// while nothing else has been chosen, and is replaced by any later candidate
/// that carries a timestamp.
pub fn newest_candidate(candidates: &[MessageRef]) -> Option<&MessageRef> {
    let mut chosen: Option<&MessageRef> = None;
    let mut newest: Option<i64> = None;

    for candidate in candidates {
        match candidate.internal_timestamp {
            Some(ts) if newest.map_or(true, |current| ts > current) => {
                newest = Some(ts);
                chosen = Some(candidate);
            }
            None if chosen.is_none() => chosen = Some(candidate),
            _ => {}
        }
    }

    chosen
}

/// Find a label by case-insensitive exact name.
pub fn find_label<'a>(labels: &'a [LabelRef], name: &str) -> Option<&'a LabelRef> {
    labels.iter().find(|label| label.matches_name(name))
}
