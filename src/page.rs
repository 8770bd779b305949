//! Page controller: which page of tasks is shown, under which filters.
//!
//! Every state change that affects the list query hands back a
//! [`FetchTicket`]. Tickets carry increasing request ids and only the result
//! of the newest ticket is applied, so a slow response to an old query can
//! never overwrite the page fetched for a newer one.

use crate::api::{TaskApi, TaskQuery};
use crate::config::ListConfig;
use crate::error::{Error, Result};
use crate::task::{Priority, Task, TaskPage};

/// A server-side filter the list can be narrowed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Done(Option<bool>),
    Priority(Option<Priority>),
}

/// Query-affecting state of the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    pub page: u32,
    pub page_size: u32,
    pub search: String,
    pub is_done: Option<bool>,
    pub priority: Option<Priority>,
}

impl PageState {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size,
            search: String::new(),
            is_done: None,
            priority: None,
        }
    }

    pub fn query(&self) -> TaskQuery {
        let search = self.search.trim();
        TaskQuery {
            page: self.page,
            page_size: self.page_size,
            search: (!search.is_empty()).then(|| search.to_string()),
            is_done: self.is_done,
            priority: self.priority,
        }
    }
}

/// A list request the owner of the controller must run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub id: u64,
    pub query: TaskQuery,
}

/// What happened to a finished fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchApplied {
    Loaded,
    Failed,
    /// A newer request was issued meanwhile; the result was dropped.
    Superseded,
}

#[derive(Debug, Clone)]
pub struct PageController {
    state: PageState,
    page_sizes: Vec<u32>,
    tasks: Vec<Task>,
    total_count: u64,
    has_next: bool,
    has_previous: bool,
    error: Option<String>,
    latest_request: u64,
    in_flight: bool,
}

impl PageController {
    pub fn new(config: &ListConfig) -> Self {
        Self {
            state: PageState::new(config.page_size),
            page_sizes: config.page_sizes.clone(),
            tasks: Vec::new(),
            total_count: 0,
            has_next: false,
            has_previous: false,
            error: None,
            latest_request: 0,
            in_flight: false,
        }
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn page_sizes(&self) -> &[u32] {
        &self.page_sizes
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn has_next(&self) -> bool {
        self.has_next
    }

    pub fn has_previous(&self) -> bool {
        self.has_previous
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    pub fn total_pages(&self) -> u64 {
        let size = u64::from(self.state.page_size.max(1));
        self.total_count.div_ceil(size).max(1)
    }

    pub fn has_active_filters(&self) -> bool {
        !self.state.search.trim().is_empty()
            || self.state.is_done.is_some()
            || self.state.priority.is_some()
    }

    pub fn set_page(&mut self, page: u32) -> Result<FetchTicket> {
        if page == 0 {
            return Err(Error::InvalidArgument("page must be >= 1".to_string()));
        }
        self.state.page = page;
        Ok(self.begin_fetch())
    }

    pub fn set_page_size(&mut self, page_size: u32) -> Result<FetchTicket> {
        if !self.page_sizes.contains(&page_size) {
            let choices: Vec<String> = self.page_sizes.iter().map(|s| s.to_string()).collect();
            return Err(Error::InvalidArgument(format!(
                "page size {page_size} not one of {}",
                choices.join(", ")
            )));
        }
        self.state.page_size = page_size;
        self.state.page = 1;
        Ok(self.begin_fetch())
    }

    /// Step to the next configured page size, wrapping around.
    pub fn cycle_page_size(&mut self) -> FetchTicket {
        let current = self
            .page_sizes
            .iter()
            .position(|size| *size == self.state.page_size);
        let next = match current {
            Some(idx) => self.page_sizes[(idx + 1) % self.page_sizes.len()],
            None => self.page_sizes.first().copied().unwrap_or(self.state.page_size),
        };
        self.state.page_size = next;
        self.state.page = 1;
        self.begin_fetch()
    }

    pub fn set_search(&mut self, search: impl Into<String>) -> FetchTicket {
        self.state.search = search.into();
        self.state.page = 1;
        self.begin_fetch()
    }

    pub fn set_filter(&mut self, filter: Filter) -> FetchTicket {
        match filter {
            Filter::Done(value) => self.state.is_done = value,
            Filter::Priority(value) => self.state.priority = value,
        }
        self.state.page = 1;
        self.begin_fetch()
    }

    /// A new task was created: jump to the first page and drop the search so
    /// the new task is not hidden.
    pub fn on_task_created(&mut self) -> FetchTicket {
        self.state.page = 1;
        self.state.search.clear();
        self.begin_fetch()
    }

    pub fn advance_page(&mut self) -> Option<FetchTicket> {
        if !self.has_next {
            return None;
        }
        self.state.page += 1;
        Some(self.begin_fetch())
    }

    pub fn retreat_page(&mut self) -> Option<FetchTicket> {
        if !self.has_previous || self.state.page <= 1 {
            return None;
        }
        self.state.page -= 1;
        Some(self.begin_fetch())
    }

    /// Re-run the current query, e.g. after a mutation.
    pub fn refresh(&mut self) -> FetchTicket {
        self.begin_fetch()
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest_request += 1;
        self.in_flight = true;
        FetchTicket {
            id: self.latest_request,
            query: self.state.query(),
        }
    }

    pub fn finish_fetch(&mut self, request_id: u64, result: Result<TaskPage>) -> FetchApplied {
        if request_id != self.latest_request {
            tracing::debug!(
                request_id,
                latest = self.latest_request,
                "dropping superseded task page"
            );
            return FetchApplied::Superseded;
        }
        self.in_flight = false;
        match result {
            Ok(page) => {
                self.tasks = page.results;
                self.total_count = page.count;
                self.has_next = page.next.is_some();
                self.has_previous = page.previous.is_some();
                self.error = None;
                FetchApplied::Loaded
            }
            Err(err) => {
                tracing::warn!(%err, "failed to fetch tasks");
                self.error = Some(format!("Failed to fetch tasks: {err}"));
                FetchApplied::Failed
            }
        }
    }

    /// Run a ticket against the API and apply its result.
    pub async fn run<A: TaskApi>(&mut self, api: &A, ticket: FetchTicket) -> FetchApplied {
        let result = api.list(&ticket.query).await;
        self.finish_fetch(ticket.id, result)
    }

    /// Fetch the page for the current state.
    pub async fn fetch_page<A: TaskApi>(&mut self, api: &A) -> FetchApplied {
        let ticket = self.begin_fetch();
        self.run(api, ticket).await
    }
}
