use crate::error::{validation, Result};

pub const PROJECT_NAME_MAX: usize = 100;
pub const PROJECT_DESCRIPTION_MAX: usize = 500;
pub const TASK_TITLE_MAX: usize = 200;
pub const TASK_DESCRIPTION_MAX: usize = 1000;

/// Validate a project name: 1-100 characters after trimming.
pub fn project_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(validation("project name is required"));
    }
    if name.chars().count() > PROJECT_NAME_MAX {
        return Err(validation(format!(
            "project name cannot exceed {PROJECT_NAME_MAX} characters"
        )));
    }
    Ok(())
}

pub fn project_description(description: &str) -> Result<()> {
    if description.chars().count() > PROJECT_DESCRIPTION_MAX {
        return Err(validation(format!(
            "project description cannot exceed {PROJECT_DESCRIPTION_MAX} characters"
        )));
    }
    Ok(())
}

/// Validate a task title: 1-200 characters after trimming.
pub fn task_title(title: &str) -> Result<()> {
    if title.is_empty() {
        return Err(validation("task title is required"));
    }
    if title.chars().count() > TASK_TITLE_MAX {
        return Err(validation(format!(
            "task title cannot exceed {TASK_TITLE_MAX} characters"
        )));
    }
    Ok(())
}

pub fn task_description(description: &str) -> Result<()> {
    if description.chars().count() > TASK_DESCRIPTION_MAX {
        return Err(validation(format!(
            "task description cannot exceed {TASK_DESCRIPTION_MAX} characters"
        )));
    }
    Ok(())
}
