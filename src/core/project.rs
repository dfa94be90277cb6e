use serde::{Deserialize, Serialize};

use super::column::Column;
use super::ids::{ProjectId, UserId};
use super::task::Task;

/// Columns a new project gets when none are given.
pub const DEFAULT_COLUMNS: [&str; 3] = ["To Do", "In Progress", "Done"];

/// A user account as exposed by `/auth/me` and project membership lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl User {
    /// Full name when known, otherwise the email address.
    pub fn display_name(&self) -> String {
        let full: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.join(" ")
        }
    }
}

/// A board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub users: Vec<User>,
}

impl Project {
    pub fn new(id: ProjectId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: None,
            users: Vec::new(),
        }
    }
}

/// Body for `POST /projects`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub columns: Vec<String>,
    pub member_emails: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,
}

impl NewProject {
    /// Build a creation request.
    ///
    /// Blank column names and member emails are dropped; a project needs a
    /// name and at least one column.
    pub fn new(name: &str, columns: &[String], member_emails: &[String]) -> crate::Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(crate::Error::Validation("Project name is required".to_string()));
        }
        let columns: Vec<String> = columns
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if columns.is_empty() {
            return Err(crate::Error::Validation(
                "A project needs at least one column".to_string(),
            ));
        }
        Ok(Self {
            name: name.to_string(),
            columns,
            member_emails: member_emails
                .iter()
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty())
                .collect(),
            created_by: None,
        })
    }
}

/// Everything the board view needs for one project.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub project: Option<Project>,
    pub columns: Vec<Column>,
    pub tasks: Vec<Task>,
}
