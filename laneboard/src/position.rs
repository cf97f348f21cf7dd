//! Dense lane ordering over in-memory lane vectors.
//!
//! The store applies the same shifts as SQL UPDATEs (see `ops`); this module
//! is the shared in-memory form used by the optimistic client cache, plus the
//! index-validation rules both sides agree on. After every operation here a
//! lane's positions are exactly 0..n.

use crate::error::{validation, Result};
use crate::model::Task;

/// Reject a negative target index. Anything non-negative is acceptable and
/// clamps later; negative is caller error, never a silent clamp to 0.
pub fn check_index(requested: i64) -> Result<()> {
    if requested < 0 {
        return Err(validation("position must be a non-negative number"));
    }
    Ok(())
}

/// Clamp a requested insert index to the lane's append point.
pub fn clamped_index(len: usize, requested: i64) -> usize {
    (requested as usize).min(len)
}

/// Rewrite positions to match vector order.
pub fn renumber(lane: &mut [Task]) {
    for (index, task) in lane.iter_mut().enumerate() {
        task.position = index as i64;
    }
}

/// Append to the end of a lane; no sibling moves.
pub fn append(lane: &mut Vec<Task>, mut task: Task) {
    task.position = lane.len() as i64;
    lane.push(task);
}

/// Insert at `index` (already clamped); everything at or after it shifts +1.
pub fn insert_at(lane: &mut Vec<Task>, index: usize, task: Task) {
    let index = index.min(lane.len());
    lane.insert(index, task);
    renumber(lane);
}

/// Remove a task by id, closing the gap behind it.
pub fn remove_by_id(lane: &mut Vec<Task>, id: i64) -> Option<Task> {
    let index = lane.iter().position(|t| t.id == id)?;
    let task = lane.remove(index);
    renumber(lane);
    Some(task)
}

/// Reorder within one lane; `to` beyond the end clamps to the last slot.
pub fn move_within(lane: &mut Vec<Task>, from: usize, to: usize) {
    if from >= lane.len() || from == to {
        return;
    }
    let to = to.min(lane.len() - 1);
    let task = lane.remove(from);
    lane.insert(to, task);
    renumber(lane);
}
