#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Mutex;

use chrono::NaiveDate;
use todo::api::{TaskApi, TaskQuery};
use todo::task::{NewTask, Priority, Task, TaskId, TaskPage, TaskPatch};
use todo::{Error, Result};

/// A request the fake server received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(TaskQuery),
    Create(String),
    Update(TaskId, TaskPatch),
    Delete(TaskId),
    BulkDone(Vec<TaskId>),
    BulkDelete(Vec<TaskId>),
}

/// In-memory task server with the list semantics of the real API:
/// `count/next/previous` pagination, `search` over title and description,
/// `is_done`/`priority` filters, ordering by due date then id.
#[derive(Default)]
pub struct FakeServer {
    state: Mutex<ServerState>,
}

#[derive(Default)]
struct ServerState {
    tasks: Vec<Task>,
    next_id: u64,
    calls: Vec<Call>,
    fail_bulk_delete: bool,
    fail_delete: BTreeSet<TaskId>,
    rate_limit: Option<String>,
}

impl FakeServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a task directly, bypassing the call log.
    pub fn seed(&self, title: &str, due: Option<&str>, priority: Priority, is_done: bool) -> TaskId {
        let mut state = self.lock();
        state.next_id += 1;
        let id = TaskId(state.next_id);
        state.tasks.push(Task {
            id,
            title: title.to_string(),
            description: String::new(),
            due_date: due.map(date),
            priority,
            is_done,
            created_date: None,
            updated_date: None,
            deleted_date: None,
            active: true,
        });
        id
    }

    pub fn seed_many(&self, count: usize) -> Vec<TaskId> {
        (1..=count)
            .map(|n| self.seed(&format!("task {n}"), None, Priority::Normal, false))
            .collect()
    }

    pub fn fail_bulk_delete(&self) {
        self.lock().fail_bulk_delete = true;
    }

    pub fn fail_delete_of(&self, id: TaskId) {
        self.lock().fail_delete.insert(id);
    }

    /// Answer every request with a 429 carrying `detail`.
    pub fn rate_limit(&self, detail: &str) {
        self.lock().rate_limit = Some(detail.to_string());
    }

    pub fn task(&self, id: TaskId) -> Option<Task> {
        self.lock().tasks.iter().find(|task| task.id == id).cloned()
    }

    pub fn task_count(&self) -> usize {
        self.lock().tasks.len()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn write_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, Call::List(_)))
            .collect()
    }

    pub fn last_list_query(&self) -> Option<TaskQuery> {
        self.calls().into_iter().rev().find_map(|call| match call {
            Call::List(query) => Some(query),
            _ => None,
        })
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ServerState> {
        self.state.lock().expect("fake server lock")
    }

    fn record(&self, call: Call) -> Result<std::sync::MutexGuard<'_, ServerState>> {
        let mut state = self.lock();
        state.calls.push(call);
        if let Some(detail) = state.rate_limit.clone() {
            return Err(Error::RateLimited {
                detail,
                retry_after_secs: Some(5),
            });
        }
        Ok(state)
    }
}

impl TaskApi for FakeServer {
    async fn list(&self, query: &TaskQuery) -> Result<TaskPage> {
        let state = self.record(Call::List(query.clone()))?;
        let needle = query.search.as_deref().map(str::to_lowercase);
        let mut matching: Vec<Task> = state
            .tasks
            .iter()
            .filter(|task| query.is_done.map_or(true, |done| task.is_done == done))
            .filter(|task| query.priority.map_or(true, |p| task.priority == p))
            .filter(|task| match needle.as_deref() {
                Some(needle) => {
                    task.title.to_lowercase().contains(needle)
                        || task.description.to_lowercase().contains(needle)
                }
                None => true,
            })
            .cloned()
            .collect();
        matching.sort_by_key(|task| (task.due_date.is_none(), task.due_date, task.id));

        let count = matching.len() as u64;
        let size = query.page_size.max(1) as usize;
        let start = (query.page.max(1) as usize - 1) * size;
        if start > 0 && start >= matching.len() {
            return Err(Error::Api {
                status: 404,
                message: "Invalid page.".to_string(),
            });
        }
        let results: Vec<Task> = matching.into_iter().skip(start).take(size).collect();
        let next = ((start + size) < count as usize)
            .then(|| format!("http://fake/api/tasks/?page={}", query.page + 1));
        let previous = (query.page > 1)
            .then(|| format!("http://fake/api/tasks/?page={}", query.page - 1));
        Ok(TaskPage {
            results,
            count,
            next,
            previous,
        })
    }

    async fn create(&self, task: &NewTask) -> Result<Option<Task>> {
        let mut state = self.record(Call::Create(task.title.clone()))?;
        state.next_id += 1;
        let created = Task {
            id: TaskId(state.next_id),
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date,
            priority: task.priority,
            is_done: false,
            created_date: None,
            updated_date: None,
            deleted_date: None,
            active: true,
        };
        state.tasks.push(created.clone());
        Ok(Some(created))
    }

    async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<()> {
        let mut state = self.record(Call::Update(id, patch.clone()))?;
        let task = state
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(not_found)?;
        patch.apply_to(task);
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> Result<()> {
        let mut state = self.record(Call::Delete(id))?;
        if state.fail_delete.contains(&id) {
            return Err(Error::Api {
                status: 500,
                message: "delete failed".to_string(),
            });
        }
        let before = state.tasks.len();
        state.tasks.retain(|task| task.id != id);
        if state.tasks.len() == before {
            return Err(not_found());
        }
        Ok(())
    }

    async fn bulk_done(&self, ids: &[TaskId]) -> Result<()> {
        let mut state = self.record(Call::BulkDone(ids.to_vec()))?;
        for task in state.tasks.iter_mut().filter(|task| ids.contains(&task.id)) {
            task.is_done = true;
        }
        Ok(())
    }

    async fn bulk_delete(&self, ids: &[TaskId]) -> Result<()> {
        let mut state = self.record(Call::BulkDelete(ids.to_vec()))?;
        if state.fail_bulk_delete {
            return Err(Error::Api {
                status: 500,
                message: "bulk delete unavailable".to_string(),
            });
        }
        state.tasks.retain(|task| !ids.contains(&task.id));
        Ok(())
    }
}

fn not_found() -> Error {
    Error::Api {
        status: 404,
        message: "Not found.".to_string(),
    }
}

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("test date")
}
