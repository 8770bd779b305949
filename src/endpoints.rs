//! Endpoint registry: logical resource names mapped to absolute URLs.

use serde::Serialize;

use crate::task::TaskId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoints {
    pub tasks: String,
    pub users: String,
    pub bulk_delete: String,
    pub bulk_done: String,
}

impl Endpoints {
    pub fn new(origin: &str) -> Self {
        let origin = origin.trim().trim_end_matches('/');
        Self {
            tasks: format!("{origin}/api/tasks/"),
            users: format!("{origin}/api/users/"),
            bulk_delete: format!("{origin}/api/tasks/bulk_delete/"),
            bulk_done: format!("{origin}/api/tasks/bulk_done/"),
        }
    }

    /// Single-task resource used for PATCH and DELETE.
    pub fn task(&self, id: TaskId) -> String {
        format!("{}{id}/", self.tasks)
    }

    /// `(name, url)` pairs in registry order.
    pub fn entries(&self) -> [(&'static str, &str); 4] {
        [
            ("tasks", self.tasks.as_str()),
            ("users", self.users.as_str()),
            ("bulk_delete", self.bulk_delete.as_str()),
            ("bulk_done", self.bulk_done.as_str()),
        ]
    }
}
