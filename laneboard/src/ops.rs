use rusqlite::{Connection, OptionalExtension};

use crate::error::{not_found, Result};
use crate::model::{Lanes, Project, ProjectWithTasks, Status, Task};
use crate::position;
use crate::validate;

const PROJECT_COLUMNS: &str = "id, name, description, created_at, updated_at";
const TASK_COLUMNS: &str =
    "id, title, description, status, project_id, position, created_at, updated_at";

fn read_project_row(row: &rusqlite::Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn read_task_row(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    let status: String = row.get(3)?;
    let status = Status::parse(&status).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status,
        project_id: row.get(4)?,
        position: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn require_project(conn: &Connection, id: i64) -> Result<()> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM projects WHERE id = ?1",
        [id],
        |row| row.get(0),
    )?;
    if count == 0 {
        return Err(not_found(format!("project {id} not found")));
    }
    Ok(())
}

fn bucket_count(conn: &Connection, project_id: i64, status: Status) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM tasks WHERE project_id = ?1 AND status = ?2",
        rusqlite::params![project_id, status.as_str()],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Run `f` inside a SAVEPOINT so multi-row reindexing commits or rolls back
/// as a unit. SAVEPOINT rather than BEGIN so callers may already hold a
/// transaction.
fn with_savepoint<T>(
    conn: &Connection,
    name: &str,
    f: impl FnOnce(&Connection) -> Result<T>,
) -> Result<T> {
    conn.execute_batch(&format!("SAVEPOINT {name}"))?;
    match f(conn) {
        Ok(v) => {
            conn.execute_batch(&format!("RELEASE {name}"))?;
            Ok(v)
        }
        Err(e) => {
            let _ = conn.execute_batch(&format!("ROLLBACK TO {name}"));
            let _ = conn.execute_batch(&format!("RELEASE {name}"));
            Err(e)
        }
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

pub fn create_project(conn: &Connection, name: &str, description: &str) -> Result<Project> {
    let name = name.trim();
    let description = description.trim();
    validate::project_name(name)?;
    validate::project_description(description)?;
    conn.execute(
        "INSERT INTO projects (name, description) VALUES (?1, ?2)",
        rusqlite::params![name, description],
    )?;
    get_project(conn, conn.last_insert_rowid())
}

pub fn get_project(conn: &Connection, id: i64) -> Result<Project> {
    let query = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1");
    conn.query_row(&query, [id], read_project_row)
        .optional()?
        .ok_or_else(|| not_found(format!("project {id} not found")))
}

/// List projects newest-first, optionally filtered by a case-insensitive
/// substring match against name or description.
pub fn list_projects(conn: &Connection, search: Option<&str>) -> Result<Vec<Project>> {
    let search = search.map(str::trim).filter(|s| !s.is_empty());
    let mut projects = Vec::new();
    match search {
        Some(term) => {
            let query = format!(
                "SELECT {PROJECT_COLUMNS} FROM projects
                 WHERE instr(lower(name), lower(?1)) > 0
                    OR instr(lower(description), lower(?1)) > 0
                 ORDER BY created_at DESC, id DESC"
            );
            let mut stmt = conn.prepare(&query)?;
            let rows = stmt.query_map([term], read_project_row)?;
            for row in rows {
                projects.push(row?);
            }
        }
        None => {
            let query =
                format!("SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC, id DESC");
            let mut stmt = conn.prepare(&query)?;
            let rows = stmt.query_map([], read_project_row)?;
            for row in rows {
                projects.push(row?);
            }
        }
    }
    Ok(projects)
}

pub fn update_project(
    conn: &Connection,
    id: i64,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<Project> {
    require_project(conn, id)?;
    let name = name.map(str::trim);
    let description = description.map(str::trim);
    if let Some(n) = name {
        validate::project_name(n)?;
    }
    if let Some(d) = description {
        validate::project_description(d)?;
    }
    conn.execute(
        "UPDATE projects
         SET name = COALESCE(?1, name),
             description = COALESCE(?2, description),
             updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
         WHERE id = ?3",
        rusqlite::params![name, description, id],
    )?;
    get_project(conn, id)
}

/// Delete a project and every task it owns. The tasks go with the project
/// via the schema's ON DELETE CASCADE, so the cascade is a single atomic
/// statement.
pub fn delete_project(conn: &Connection, id: i64) -> Result<()> {
    require_project(conn, id)?;
    conn.execute("DELETE FROM projects WHERE id = ?1", [id])?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

// New tasks append to their (project, lane) bucket: position = bucket count.
const INSERT_TASK: &str = "
INSERT INTO tasks (project_id, title, description, status, position)
VALUES (?1, ?2, ?3, ?4,
    (SELECT COUNT(*) FROM tasks WHERE project_id = ?1 AND status = ?4))
";

const CLOSE_GAP: &str = "
UPDATE tasks SET position = position - 1
WHERE project_id = ?1 AND status = ?2 AND position > ?3
";

const OPEN_SLOT: &str = "
UPDATE tasks SET position = position + 1
WHERE project_id = ?1 AND status = ?2 AND position >= ?3
";

// Forward move within one bucket: (from, to] shifts down one.
const SHIFT_RANGE_DOWN: &str = "
UPDATE tasks SET position = position - 1
WHERE project_id = ?1 AND status = ?2 AND position > ?3 AND position <= ?4
";

// Backward move within one bucket: [to, from) shifts up one.
const SHIFT_RANGE_UP: &str = "
UPDATE tasks SET position = position + 1
WHERE project_id = ?1 AND status = ?2 AND position >= ?4 AND position < ?3
";

const PLACE_TASK: &str = "
UPDATE tasks
SET project_id = ?1, status = ?2, position = ?3,
    updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
WHERE id = ?4
";

pub fn create_task(
    conn: &Connection,
    project_id: i64,
    title: &str,
    description: &str,
    status: Status,
) -> Result<Task> {
    let title = title.trim();
    let description = description.trim();
    validate::task_title(title)?;
    validate::task_description(description)?;
    require_project(conn, project_id)?;
    conn.execute(
        INSERT_TASK,
        rusqlite::params![project_id, title, description, status.as_str()],
    )?;
    get_task(conn, conn.last_insert_rowid())
}

pub fn get_task(conn: &Connection, id: i64) -> Result<Task> {
    let query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1");
    conn.query_row(&query, [id], read_task_row)
        .optional()?
        .ok_or_else(|| not_found(format!("task {id} not found")))
}

/// Partial update of title, description, and status.
///
/// A status change through this path is treated as a move to the end of the
/// destination lane: the source lane's gap is closed and the task appends,
/// so lane ordering stays dense without callers going through `move_task`.
pub fn update_task(
    conn: &Connection,
    id: i64,
    title: Option<&str>,
    description: Option<&str>,
    status: Option<Status>,
) -> Result<Task> {
    let task = get_task(conn, id)?;
    let title = title.map(str::trim);
    let description = description.map(str::trim);
    if let Some(t) = title {
        validate::task_title(t)?;
    }
    if let Some(d) = description {
        validate::task_description(d)?;
    }

    match status {
        Some(new_status) if new_status != task.status => {
            with_savepoint(conn, "update_task", |conn| {
                conn.execute(
                    CLOSE_GAP,
                    rusqlite::params![task.project_id, task.status.as_str(), task.position],
                )?;
                let end = bucket_count(conn, task.project_id, new_status)?;
                conn.execute(
                    "UPDATE tasks
                     SET title = COALESCE(?1, title),
                         description = COALESCE(?2, description),
                         status = ?3, position = ?4,
                         updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
                     WHERE id = ?5",
                    rusqlite::params![title, description, new_status.as_str(), end, id],
                )?;
                get_task(conn, id)
            })
        }
        _ => {
            conn.execute(
                "UPDATE tasks
                 SET title = COALESCE(?1, title),
                     description = COALESCE(?2, description),
                     updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
                 WHERE id = ?3",
                rusqlite::params![title, description, id],
            )?;
            get_task(conn, id)
        }
    }
}

/// Move a task to (status, position), optionally into another project.
///
/// The target position clamps to the destination bucket's append point; a
/// negative position is a validation error. Source gap close, destination
/// slot open, and the task's own rewrite commit together.
pub fn move_task(
    conn: &Connection,
    id: i64,
    status: Status,
    target_position: i64,
    target_project: Option<i64>,
) -> Result<Task> {
    position::check_index(target_position)?;
    let task = get_task(conn, id)?;
    let project_id = match target_project {
        Some(p) => {
            if p != task.project_id {
                require_project(conn, p)?;
            }
            p
        }
        None => task.project_id,
    };

    with_savepoint(conn, "move_task", |conn| {
        let same_bucket = project_id == task.project_id && status == task.status;
        if same_bucket {
            // The task is already a member, so the clamp ceiling is the last
            // occupied slot rather than the append point.
            let count = bucket_count(conn, project_id, status)?;
            let to = target_position.min(count - 1);
            let from = task.position;
            if to == from {
                return Ok(task);
            }
            if to > from {
                conn.execute(
                    SHIFT_RANGE_DOWN,
                    rusqlite::params![project_id, status.as_str(), from, to],
                )?;
            } else {
                conn.execute(
                    SHIFT_RANGE_UP,
                    rusqlite::params![project_id, status.as_str(), from, to],
                )?;
            }
            conn.execute(
                PLACE_TASK,
                rusqlite::params![project_id, status.as_str(), to, id],
            )?;
        } else {
            conn.execute(
                CLOSE_GAP,
                rusqlite::params![task.project_id, task.status.as_str(), task.position],
            )?;
            let count = bucket_count(conn, project_id, status)?;
            let to = target_position.min(count);
            conn.execute(
                OPEN_SLOT,
                rusqlite::params![project_id, status.as_str(), to],
            )?;
            conn.execute(
                PLACE_TASK,
                rusqlite::params![project_id, status.as_str(), to, id],
            )?;
        }
        get_task(conn, id)
    })
}

/// Delete a task and close the gap it leaves in its bucket.
pub fn delete_task(conn: &Connection, id: i64) -> Result<()> {
    let task = get_task(conn, id)?;
    with_savepoint(conn, "delete_task", |conn| {
        conn.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
        conn.execute(
            CLOSE_GAP,
            rusqlite::params![task.project_id, task.status.as_str(), task.position],
        )?;
        Ok(())
    })
}

/// All of a project's tasks grouped by lane, each lane ordered by position.
pub fn list_by_project(conn: &Connection, project_id: i64) -> Result<Lanes> {
    require_project(conn, project_id)?;
    let query = format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = ?1 ORDER BY position ASC, id ASC"
    );
    let mut stmt = conn.prepare(&query)?;
    let rows = stmt.query_map([project_id], read_task_row)?;
    let mut lanes = Lanes::default();
    for row in rows {
        let task = row?;
        lanes.lane_mut(task.status).push(task);
    }
    Ok(lanes)
}

pub fn get_project_with_tasks(conn: &Connection, id: i64) -> Result<ProjectWithTasks> {
    let project = get_project(conn, id)?;
    let tasks = list_by_project(conn, id)?;
    Ok(ProjectWithTasks { project, tasks })
}
