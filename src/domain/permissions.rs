//! Role-based access rules for tasks.
//!
//! | Action | admin | manager | user |
//! |---|---|---|---|
//! | create | anyone | anyone except admins | only themself |
//! | read / update | all tasks | responsible or executor | responsible or executor |
//! | delete | all tasks | responsible or executor | responsible only |
//! | list | all tasks | responsible or executor | responsible or executor |

use serde_json::json;

use crate::domain::entities::{Task, User, UserRole};
use crate::error::AppError;

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: i64,
    pub email: String,
    pub role: UserRole,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Checks that `actor` may create a task owned by `responsible`.
pub fn check_task_creation(actor: &Principal, responsible: &User) -> Result<(), AppError> {
    match actor.role {
        UserRole::Admin => Ok(()),
        UserRole::Manager if responsible.role == UserRole::Admin => Err(AppError::forbidden(
            "Permission denied. Manager can't assign a task to an administrator",
            json!({ "responsible_person_id": responsible.id }),
        )),
        UserRole::Manager => Ok(()),
        UserRole::User if responsible.id != actor.id => Err(AppError::forbidden(
            "Permission denied. User can't assign tasks to other users, managers, and administrators",
            json!({ "responsible_person_id": responsible.id }),
        )),
        UserRole::User => Ok(()),
    }
}

/// Checks that `actor` may read or update `task`.
pub fn check_task_access(actor: &Principal, task: &Task) -> Result<(), AppError> {
    if actor.role == UserRole::Admin || task.involves(actor.id) {
        return Ok(());
    }

    Err(AppError::forbidden(
        "Permission denied. Users and managers can only access their own tasks",
        json!({ "task_id": task.id }),
    ))
}

/// Checks that `actor` may delete `task`.
pub fn check_task_delete(actor: &Principal, task: &Task) -> Result<(), AppError> {
    let allowed = match actor.role {
        UserRole::Admin => true,
        UserRole::Manager => task.involves(actor.id),
        UserRole::User => task.responsible_person_id == actor.id,
    };

    if allowed {
        return Ok(());
    }

    let message = match actor.role {
        UserRole::Manager => {
            "Managers can only delete tasks they are responsible for or involved in"
        }
        _ => "Users can only delete tasks they are responsible for",
    };
    Err(AppError::forbidden(message, json!({ "task_id": task.id })))
}

/// Restricts listings: `Some(user_id)` for non-admins, `None` for admins.
pub fn visibility_scope(actor: &Principal) -> Option<i64> {
    match actor.role {
        UserRole::Admin => None,
        UserRole::Manager | UserRole::User => Some(actor.id),
    }
}
