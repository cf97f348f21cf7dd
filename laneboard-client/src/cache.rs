//! Client-held board aggregate with optimistic mutation.
//!
//! Moves and deletes mutate the local lanes immediately using the same
//! ordering algorithm the store applies, then confirm against the backing
//! store: success replaces the aggregate with an authoritative reload,
//! failure restores the pre-mutation snapshot wholesale.

use laneboard::error::{validation, Result};
use laneboard::model::{Project, ProjectWithTasks, Status, Task};
use laneboard::position;

use crate::api::BoardApi;

/// Top-level client state: the project list plus at most one selected board.
///
/// A second move issued while one is in flight overwrites the snapshot, so a
/// late failure of the first rolls back past the second. Known limitation,
/// matching the single `is_moving_task` flag.
#[derive(Default)]
pub struct BoardState {
    pub projects: Vec<Project>,
    pub selected: Option<ProjectWithTasks>,
    pub search_term: String,
    pub loading: bool,
    pub is_moving_task: bool,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_search_term(&mut self, term: &str) {
        self.search_term = term.to_string();
    }

    /// Explicit init: fetch the project list, filtered by the search term.
    pub fn load_projects(&mut self, api: &impl BoardApi) -> Result<()> {
        self.loading = true;
        let search = if self.search_term.is_empty() {
            None
        } else {
            Some(self.search_term.as_str())
        };
        let result = api.load_projects(search);
        self.loading = false;
        self.projects = result?;
        Ok(())
    }

    pub fn select_project(&mut self, api: &impl BoardApi, id: i64) -> Result<()> {
        self.loading = true;
        let result = api.load_board(id);
        self.loading = false;
        self.selected = Some(result?);
        Ok(())
    }

    pub fn create_project(
        &mut self,
        api: &impl BoardApi,
        name: &str,
        description: &str,
    ) -> Result<Project> {
        let project = api.create_project(name, description)?;
        self.projects.push(project.clone());
        Ok(project)
    }

    pub fn delete_project(&mut self, api: &impl BoardApi, id: i64) -> Result<()> {
        api.delete_project(id)?;
        if self.selected.as_ref().is_some_and(|s| s.project.id == id) {
            self.selected = None;
        }
        self.load_projects(api)
    }

    pub fn create_task(
        &mut self,
        api: &impl BoardApi,
        project_id: i64,
        title: &str,
        description: &str,
        status: Status,
    ) -> Result<Task> {
        let task = api.create_task(project_id, title, description, status)?;
        if self
            .selected
            .as_ref()
            .is_some_and(|s| s.project.id == project_id)
        {
            self.select_project(api, project_id)?;
        }
        Ok(task)
    }

    pub fn update_task(
        &mut self,
        api: &impl BoardApi,
        id: i64,
        title: Option<&str>,
        description: Option<&str>,
        status: Option<Status>,
    ) -> Result<Task> {
        let task = api.update_task(id, title, description, status)?;
        if let Some(selected) = &self.selected {
            self.select_project(api, selected.project.id)?;
        }
        Ok(task)
    }

    /// Optimistic move: mutate the local lanes first, then confirm with the
    /// store. Any failure restores the exact pre-move aggregate.
    pub fn move_task(
        &mut self,
        api: &impl BoardApi,
        id: i64,
        status: Status,
        target_position: i64,
        target_project: Option<i64>,
    ) -> Result<Task> {
        position::check_index(target_position)?;
        let Some(selected) = &self.selected else {
            return Err(validation("no project selected"));
        };
        let snapshot = selected.clone();
        self.is_moving_task = true;

        if let Some(board) = &mut self.selected {
            apply_local_move(board, id, status, target_position, target_project);
        }

        let outcome = match api.move_task(id, status, target_position, target_project) {
            Ok(task) => match api.load_board(snapshot.project.id) {
                Ok(board) => {
                    self.selected = Some(board);
                    Ok(task)
                }
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };
        self.is_moving_task = false;
        if outcome.is_err() {
            self.selected = Some(snapshot);
        }
        outcome
    }

    /// Optimistic delete, same shadow-copy pattern as `move_task`.
    pub fn delete_task(&mut self, api: &impl BoardApi, id: i64) -> Result<()> {
        let snapshot = self.selected.clone();

        if let Some(board) = &mut self.selected {
            if let Some(status) = board.tasks.find_task(id).map(|t| t.status) {
                position::remove_by_id(board.tasks.lane_mut(status), id);
            }
        }

        let outcome = match api.delete_task(id) {
            Ok(()) => match &snapshot {
                Some(board) => api.load_board(board.project.id).map(|reloaded| {
                    self.selected = Some(reloaded);
                }),
                None => Ok(()),
            },
            Err(e) => Err(e),
        };
        if outcome.is_err() {
            self.selected = snapshot;
        }
        outcome
    }
}

/// The client-side projection of the store's move: remove from the old lane,
/// clamp into the new one, renumber both. A move into another project just
/// disappears from this board.
fn apply_local_move(
    board: &mut ProjectWithTasks,
    id: i64,
    status: Status,
    target_position: i64,
    target_project: Option<i64>,
) {
    let Some(old_status) = board.tasks.find_task(id).map(|t| t.status) else {
        return;
    };
    let Some(mut task) = position::remove_by_id(board.tasks.lane_mut(old_status), id) else {
        return;
    };
    if target_project.is_some_and(|p| p != board.project.id) {
        return;
    }
    task.status = status;
    let lane = board.tasks.lane_mut(status);
    let index = position::clamped_index(lane.len(), target_position);
    position::insert_at(lane, index, task);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DirectApi;
    use laneboard::error::{internal, Error};
    use laneboard::{db, ops};
    use std::cell::Cell;

    /// Delegates to a real store but can be told to fail mutations, to
    /// simulate a request that dies on the wire.
    struct FlakyApi {
        inner: DirectApi,
        fail_next: Cell<bool>,
    }

    impl FlakyApi {
        fn check(&self) -> Result<()> {
            if self.fail_next.replace(false) {
                return Err(internal("simulated network failure"));
            }
            Ok(())
        }
    }

    impl BoardApi for FlakyApi {
        fn load_projects(&self, search: Option<&str>) -> Result<Vec<Project>> {
            self.inner.load_projects(search)
        }
        fn load_board(&self, project_id: i64) -> Result<ProjectWithTasks> {
            self.inner.load_board(project_id)
        }
        fn create_project(&self, name: &str, description: &str) -> Result<Project> {
            self.inner.create_project(name, description)
        }
        fn delete_project(&self, id: i64) -> Result<()> {
            self.inner.delete_project(id)
        }
        fn create_task(
            &self,
            project_id: i64,
            title: &str,
            description: &str,
            status: Status,
        ) -> Result<Task> {
            self.inner.create_task(project_id, title, description, status)
        }
        fn update_task(
            &self,
            id: i64,
            title: Option<&str>,
            description: Option<&str>,
            status: Option<Status>,
        ) -> Result<Task> {
            self.inner.update_task(id, title, description, status)
        }
        fn move_task(
            &self,
            id: i64,
            status: Status,
            position: i64,
            project_id: Option<i64>,
        ) -> Result<Task> {
            self.check()?;
            self.inner.move_task(id, status, position, project_id)
        }
        fn delete_task(&self, id: i64) -> Result<()> {
            self.check()?;
            self.inner.delete_task(id)
        }
    }

    fn fixture() -> (FlakyApi, BoardState, i64, Vec<i64>) {
        let conn = db::open_memory().unwrap();
        let project = ops::create_project(&conn, "board", "").unwrap();
        let mut ids = Vec::new();
        for title in ["A", "B", "C"] {
            ids.push(
                ops::create_task(&conn, project.id, title, "", Status::Todo)
                    .unwrap()
                    .id,
            );
        }
        let api = FlakyApi {
            inner: DirectApi::from_connection(conn),
            fail_next: Cell::new(false),
        };
        let mut state = BoardState::new();
        state.load_projects(&api).unwrap();
        state.select_project(&api, project.id).unwrap();
        (api, state, project.id, ids)
    }

    fn todo_ids(state: &BoardState) -> Vec<i64> {
        state.selected.as_ref().unwrap().tasks.todo
            .iter()
            .map(|t| t.id)
            .collect()
    }

    #[test]
    fn successful_move_matches_server_state() {
        let (api, mut state, project_id, ids) = fixture();
        let moved = state
            .move_task(&api, ids[0], Status::Done, 0, None)
            .unwrap();
        assert_eq!(moved.status, Status::Done);
        assert!(!state.is_moving_task);

        let server = api.load_board(project_id).unwrap();
        assert_eq!(state.selected.as_ref().unwrap(), &server);
    }

    #[test]
    fn failed_move_restores_exact_snapshot() {
        // Scenario F: optimistic move, server failure, value-equal rollback
        let (api, mut state, _, ids) = fixture();
        let before = state.selected.clone().unwrap();

        api.fail_next.set(true);
        let err = state.move_task(&api, ids[0], Status::Done, 0, None);
        assert!(matches!(err, Err(Error::Internal(_))));
        assert_eq!(state.selected.as_ref().unwrap(), &before);
        assert!(!state.is_moving_task);
    }

    #[test]
    fn negative_position_rejected_before_any_mutation() {
        let (api, mut state, _, ids) = fixture();
        let before = state.selected.clone().unwrap();
        let err = state.move_task(&api, ids[0], Status::Done, -1, None);
        assert!(matches!(err, Err(Error::Validation(_))));
        assert_eq!(state.selected.as_ref().unwrap(), &before);
    }

    #[test]
    fn move_without_selection_is_an_error() {
        let (api, mut state, _, ids) = fixture();
        state.selected = None;
        assert!(state.move_task(&api, ids[0], Status::Done, 0, None).is_err());
    }

    #[test]
    fn failed_delete_rolls_back() {
        let (api, mut state, _, ids) = fixture();
        let before = state.selected.clone().unwrap();

        api.fail_next.set(true);
        assert!(state.delete_task(&api, ids[1]).is_err());
        assert_eq!(state.selected.as_ref().unwrap(), &before);
    }

    #[test]
    fn successful_delete_closes_gap() {
        let (api, mut state, _, ids) = fixture();
        state.delete_task(&api, ids[1]).unwrap();
        assert_eq!(todo_ids(&state), vec![ids[0], ids[2]]);
        let lanes = &state.selected.as_ref().unwrap().tasks;
        assert_eq!(lanes.todo[1].position, 1);
    }

    #[test]
    fn create_task_reloads_selected_board() {
        let (api, mut state, project_id, _) = fixture();
        state
            .create_task(&api, project_id, "D", "", Status::Done)
            .unwrap();
        let lanes = &state.selected.as_ref().unwrap().tasks;
        assert_eq!(lanes.done.len(), 1);
    }

    #[test]
    fn delete_project_clears_selection() {
        let (api, mut state, project_id, _) = fixture();
        state.delete_project(&api, project_id).unwrap();
        assert!(state.selected.is_none());
        assert!(state.projects.is_empty());
    }

    #[test]
    fn search_term_filters_project_list() {
        let (api, mut state, _, _) = fixture();
        api.inner.create_project("deploy pipeline", "").unwrap();
        state.set_search_term("deploy");
        state.load_projects(&api).unwrap();
        assert_eq!(state.projects.len(), 1);
        assert_eq!(state.projects[0].name, "deploy pipeline");
    }
}
