//! Drag-gesture interpretation: turns a (dragged task, drop target) pair into
//! a move intent, or nothing when the drop changes nothing.

use laneboard::model::{Lanes, Status};

/// What the dragged task was released over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// A lane header or empty lane area.
    Lane(Status),
    /// Another task card.
    Task(i64),
}

/// The move the store should perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveIntent {
    pub task_id: i64,
    pub status: Status,
    pub position: i64,
}

fn index_in_lane(lanes: &Lanes, status: Status, id: i64) -> Option<usize> {
    lanes.lane(status).iter().position(|t| t.id == id)
}

/// Interpret a completed drag.
///
/// Dropping on a lane moves to the top of a different lane, or keeps the
/// task's current index when it is its own lane. Dropping on a task inserts
/// before that task (end of lane if it has vanished). A cancelled drag or an
/// unknown dragged task yields no intent.
pub fn interpret_drop(
    lanes: &Lanes,
    task_id: i64,
    target: Option<DropTarget>,
) -> Option<MoveIntent> {
    let target = target?;
    let task = lanes.find_task(task_id)?;

    match target {
        DropTarget::Lane(status) => {
            let position = if task.status == status {
                index_in_lane(lanes, status, task_id).unwrap_or(lanes.lane(status).len()) as i64
            } else {
                0
            };
            Some(MoveIntent {
                task_id,
                status,
                position,
            })
        }
        DropTarget::Task(over_id) => {
            let over = lanes.find_task(over_id)?;
            let over_lane = lanes.lane(over.status);
            let position = index_in_lane(lanes, over.status, over_id)
                .unwrap_or(over_lane.len()) as i64;
            if over.status == task.status {
                let from = index_in_lane(lanes, task.status, task_id)? as i64;
                if from == position {
                    return None;
                }
            }
            Some(MoveIntent {
                task_id,
                status: over.status,
                position,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laneboard::model::Task;

    fn task(id: i64, status: Status, position: i64) -> Task {
        Task {
            id,
            title: format!("t{id}"),
            description: String::new(),
            status,
            project_id: 1,
            position,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn board() -> Lanes {
        Lanes {
            todo: vec![task(1, Status::Todo, 0), task(2, Status::Todo, 1)],
            in_progress: vec![task(3, Status::InProgress, 0)],
            done: vec![],
        }
    }

    #[test]
    fn cancelled_drag_yields_nothing() {
        assert_eq!(interpret_drop(&board(), 1, None), None);
    }

    #[test]
    fn unknown_task_yields_nothing() {
        let target = Some(DropTarget::Lane(Status::Done));
        assert_eq!(interpret_drop(&board(), 99, target), None);
    }

    #[test]
    fn drop_on_foreign_lane_moves_to_top() {
        let intent = interpret_drop(&board(), 1, Some(DropTarget::Lane(Status::Done))).unwrap();
        assert_eq!(
            intent,
            MoveIntent {
                task_id: 1,
                status: Status::Done,
                position: 0
            }
        );
    }

    #[test]
    fn drop_on_own_lane_keeps_current_index() {
        let intent = interpret_drop(&board(), 2, Some(DropTarget::Lane(Status::Todo))).unwrap();
        assert_eq!(intent.status, Status::Todo);
        assert_eq!(intent.position, 1);
    }

    #[test]
    fn drop_on_task_in_other_lane_inserts_before_it() {
        let intent = interpret_drop(&board(), 3, Some(DropTarget::Task(2))).unwrap();
        assert_eq!(
            intent,
            MoveIntent {
                task_id: 3,
                status: Status::Todo,
                position: 1
            }
        );
    }

    #[test]
    fn drop_on_sibling_reorders_within_lane() {
        let intent = interpret_drop(&board(), 1, Some(DropTarget::Task(2))).unwrap();
        assert_eq!(intent.status, Status::Todo);
        assert_eq!(intent.position, 1);
    }

    #[test]
    fn drop_on_itself_yields_nothing() {
        assert_eq!(interpret_drop(&board(), 1, Some(DropTarget::Task(1))), None);
    }

    #[test]
    fn drop_on_vanished_target_yields_nothing() {
        assert_eq!(
            interpret_drop(&board(), 1, Some(DropTarget::Task(42))),
            None
        );
    }
}
