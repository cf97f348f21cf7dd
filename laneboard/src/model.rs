use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{validation, Result};

/// The three fixed board lanes. Stored in SQLite and sent on the wire as
/// "todo", "inProgress", "done".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    Todo,
    InProgress,
    Done,
}

impl Status {
    pub const ALL: [Status; 3] = [Self::Todo, Self::InProgress, Self::Done];

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "todo" => Ok(Self::Todo),
            "inProgress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(validation(format!(
                "invalid status '{s}': must be todo, inProgress, or done"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "inProgress",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub project_id: i64,
    pub position: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// A project's tasks grouped by lane, each lane ordered ascending by position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lanes {
    pub todo: Vec<Task>,
    pub in_progress: Vec<Task>,
    pub done: Vec<Task>,
}

impl Lanes {
    pub fn lane(&self, status: Status) -> &Vec<Task> {
        match status {
            Status::Todo => &self.todo,
            Status::InProgress => &self.in_progress,
            Status::Done => &self.done,
        }
    }

    pub fn lane_mut(&mut self, status: Status) -> &mut Vec<Task> {
        match status {
            Status::Todo => &mut self.todo,
            Status::InProgress => &mut self.in_progress,
            Status::Done => &mut self.done,
        }
    }

    /// Locates a task across all three lanes.
    pub fn find_task(&self, id: i64) -> Option<&Task> {
        Status::ALL
            .iter()
            .flat_map(|s| self.lane(*s))
            .find(|t| t.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectWithTasks {
    #[serde(flatten)]
    pub project: Project,
    pub tasks: Lanes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for s in Status::ALL {
            assert_eq!(Status::parse(s.as_str()).unwrap(), s);
        }
        assert!(Status::parse("doing").is_err());
    }

    #[test]
    fn task_wire_shape() {
        let task = Task {
            id: 7,
            title: "write docs".into(),
            description: String::new(),
            status: Status::InProgress,
            project_id: 3,
            position: 0,
            created_at: "2025-01-01T00:00:00Z".into(),
            updated_at: "2025-01-01T00:00:00Z".into(),
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["_id"], 7);
        assert_eq!(json["status"], "inProgress");
        assert_eq!(json["projectId"], 3);
        assert_eq!(json["createdAt"], "2025-01-01T00:00:00Z");
    }

    #[test]
    fn lanes_serialize_with_camel_case_keys() {
        let json = serde_json::to_value(Lanes::default()).unwrap();
        assert!(json.get("inProgress").is_some());
    }
}
