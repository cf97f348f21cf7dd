use rusqlite::Connection;

use laneboard::model::{Project, ProjectWithTasks, Status, Task};
use laneboard::{db, ops, Result};

/// The backing-store boundary the board state talks through. Implemented by
/// [`DirectApi`] for a local database; tests substitute failing fakes to
/// exercise the rollback path.
pub trait BoardApi {
    fn load_projects(&self, search: Option<&str>) -> Result<Vec<Project>>;
    fn load_board(&self, project_id: i64) -> Result<ProjectWithTasks>;
    fn create_project(&self, name: &str, description: &str) -> Result<Project>;
    fn delete_project(&self, id: i64) -> Result<()>;
    fn create_task(
        &self,
        project_id: i64,
        title: &str,
        description: &str,
        status: Status,
    ) -> Result<Task>;
    fn update_task(
        &self,
        id: i64,
        title: Option<&str>,
        description: Option<&str>,
        status: Option<Status>,
    ) -> Result<Task>;
    fn move_task(
        &self,
        id: i64,
        status: Status,
        position: i64,
        project_id: Option<i64>,
    ) -> Result<Task>;
    fn delete_task(&self, id: i64) -> Result<()>;
}

/// Store access over an owned connection, for running the board against a
/// local database file.
pub struct DirectApi {
    conn: Connection,
}

impl DirectApi {
    pub fn open(path: &str) -> Result<Self> {
        let conn = db::open(path)?;
        db::init(&conn)?;
        Ok(Self { conn })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }
}

impl BoardApi for DirectApi {
    fn load_projects(&self, search: Option<&str>) -> Result<Vec<Project>> {
        ops::list_projects(&self.conn, search)
    }

    fn load_board(&self, project_id: i64) -> Result<ProjectWithTasks> {
        ops::get_project_with_tasks(&self.conn, project_id)
    }

    fn create_project(&self, name: &str, description: &str) -> Result<Project> {
        ops::create_project(&self.conn, name, description)
    }

    fn delete_project(&self, id: i64) -> Result<()> {
        ops::delete_project(&self.conn, id)
    }

    fn create_task(
        &self,
        project_id: i64,
        title: &str,
        description: &str,
        status: Status,
    ) -> Result<Task> {
        ops::create_task(&self.conn, project_id, title, description, status)
    }

    fn update_task(
        &self,
        id: i64,
        title: Option<&str>,
        description: Option<&str>,
        status: Option<Status>,
    ) -> Result<Task> {
        ops::update_task(&self.conn, id, title, description, status)
    }

    fn move_task(
        &self,
        id: i64,
        status: Status,
        position: i64,
        project_id: Option<i64>,
    ) -> Result<Task> {
        ops::move_task(&self.conn, id, status, position, project_id)
    }

    fn delete_task(&self, id: i64) -> Result<()> {
        ops::delete_task(&self.conn, id)
    }
}
