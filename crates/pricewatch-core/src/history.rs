use crate::models::ChangeRecord;

/// Global cap on the persisted change history, all regions combined.
pub const CHANGE_HISTORY_CAP: usize = 1000;

/// Append fresh change events to the existing history and evict the oldest
/// entries beyond `cap`.
///
/// Pure merge; the orchestrator loads, merges, and persists only when the
/// detector produced at least one event.
pub fn merge_history(
    mut existing: Vec<ChangeRecord>,
    fresh: Vec<ChangeRecord>,
    cap: usize,
) -> Vec<ChangeRecord> {
    existing.extend(fresh);
    let len = existing.len();
    if len > cap {
        existing.drain(..len - cap);
    }
    existing
}
