//! todo task command implementations.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::actions::{self, ActionOutcome};
use crate::api::{HttpClient, TaskApi};
use crate::collection::{ActionKind, BulkKind, PendingAction};
use crate::config::Config;
use crate::draft::{local_today, CreateForm};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::page::{Filter, PageController};
use crate::row::TaskRow;
use crate::task::{parse_due_date, Priority, Task, TaskId, TaskPage, TaskPatch};

/// Global options every command receives.
pub struct ContextOptions {
    pub server: Option<String>,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

impl ContextOptions {
    pub(super) fn output(&self) -> OutputOptions {
        OutputOptions {
            json: self.json,
            quiet: self.quiet,
        }
    }
}

pub struct ListOptions {
    pub page: u32,
    pub page_size: Option<u32>,
    pub search: Option<String>,
    pub is_done: Option<bool>,
    pub priority: Option<Priority>,
    pub ctx: ContextOptions,
}

pub struct AddOptions {
    pub title: String,
    pub description: Option<String>,
    pub due: Option<String>,
    pub priority: Option<Priority>,
    pub ctx: ContextOptions,
}

pub struct EditOptions {
    pub id: TaskId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub due: Option<String>,
    pub priority: Option<Priority>,
    pub ctx: ContextOptions,
}

pub struct SetDoneOptions {
    pub id: TaskId,
    pub is_done: bool,
    pub ctx: ContextOptions,
}

pub struct DeleteOptions {
    pub id: TaskId,
    pub yes: bool,
    pub ctx: ContextOptions,
}

pub struct BulkOptions {
    pub kind: BulkKind,
    pub ids: Vec<TaskId>,
    pub yes: bool,
    pub ctx: ContextOptions,
}

pub struct TuiOptions {
    pub page_size: Option<u32>,
    pub ctx: ContextOptions,
}

struct Context {
    config: Config,
    client: HttpClient,
    runtime: tokio::runtime::Runtime,
}

pub(super) fn load_config(options: &ContextOptions) -> Result<Config> {
    Config::resolve(options.config.as_deref())?.with_origin(options.server.clone())
}

fn load_context(options: &ContextOptions) -> Result<Context> {
    let config = load_config(options)?;
    let client = HttpClient::new(&config.server)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    tracing::debug!(origin = %config.server.origin, "loaded context");
    Ok(Context {
        config,
        client,
        runtime,
    })
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let ctx = load_context(&options.ctx)?;
    let mut controller = PageController::new(&ctx.config.list);
    if let Some(page_size) = options.page_size {
        controller.set_page_size(page_size)?;
    }
    if let Some(search) = options.search {
        controller.set_search(search);
    }
    controller.set_filter(Filter::Done(options.is_done));
    controller.set_filter(Filter::Priority(options.priority));
    let ticket = controller.set_page(options.page)?;

    let page: TaskPage = ctx.runtime.block_on(ctx.client.list(&ticket.query))?;
    controller.finish_fetch(ticket.id, Ok(page));

    let state = controller.state();
    let output = TaskListOutput {
        page: state.page,
        page_size: state.page_size,
        total_pages: controller.total_pages(),
        count: controller.total_count(),
        has_next: controller.has_next(),
        has_previous: controller.has_previous(),
        tasks: controller.tasks().to_vec(),
    };

    let mut human = HumanOutput::new("Tasks");
    human.push_summary(
        "Page",
        format!("{}/{}", state.page, controller.total_pages()),
    );
    human.push_summary("Total", controller.total_count().to_string());
    if !state.search.trim().is_empty() {
        human.push_summary("Search", state.search.trim());
    }
    if let Some(is_done) = state.is_done {
        human.push_summary("Status", if is_done { "done" } else { "todo" });
    }
    if let Some(priority) = state.priority {
        human.push_summary("Priority", priority.as_str());
    }
    if controller.tasks().is_empty() {
        human.push_detail(empty_message(controller.has_active_filters()));
    }
    for task in controller.tasks() {
        human.push_detail(task_line(task));
    }
    if controller.has_next() {
        human.push_next_step(format!("todo list --page {}", state.page + 1));
    }

    emit_success(options.ctx.output(), "list", &output, Some(&human))
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let mut form = CreateForm::new(local_today());
    {
        let draft = form.draft_mut();
        draft.title = options.title;
        if let Some(description) = options.description {
            draft.description = description;
        }
        if let Some(due) = options.due {
            draft.due_date = due;
        }
        if let Some(priority) = options.priority {
            draft.priority = priority;
        }
    }
    let submitted = form.build_submit()?;

    let ctx = load_context(&options.ctx)?;
    let created = ctx
        .runtime
        .block_on(actions::create_task(&ctx.client, &mut form))?;

    let mut human = HumanOutput::new("Task created");
    if let Some(task) = created.as_ref() {
        human.push_summary("ID", task.id.to_string());
    }
    human.push_summary("Title", submitted.title.clone());
    human.push_summary("Priority", submitted.priority.as_str());
    human.push_summary("Due", crate::row::due_label(submitted.due_date));

    let output = TaskCreatedOutput {
        task: created,
        submitted,
    };
    emit_success(options.ctx.output(), "add", &output, Some(&human))
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let title = match options.title {
        Some(title) if title.trim().is_empty() => {
            return Err(Error::Validation(crate::draft::TITLE_REQUIRED.to_string()));
        }
        Some(title) => Some(title.trim().to_string()),
        None => None,
    };
    let due_date = options.due.as_deref().map(parse_due_date).transpose()?;
    let patch = TaskPatch {
        title,
        description: options.description,
        due_date,
        priority: options.priority,
        is_done: None,
    };

    let ctx = load_context(&options.ctx)?;
    let outcome = ctx
        .runtime
        .block_on(actions::update_task(&ctx.client, options.id, &patch))?;

    let mut human = HumanOutput::new(outcome.message.clone());
    human.push_summary("ID", options.id.to_string());
    let output = TaskUpdatedOutput {
        id: options.id,
        patch,
    };
    emit_success(options.ctx.output(), "edit", &output, Some(&human))
}

pub fn run_set_done(options: SetDoneOptions) -> Result<()> {
    let ctx = load_context(&options.ctx)?;
    let outcome = ctx.runtime.block_on(actions::set_done(
        &ctx.client,
        options.id,
        options.is_done,
    ))?;

    let human = HumanOutput::new(outcome.message.clone());
    let output = TaskDoneOutput {
        id: options.id,
        is_done: options.is_done,
        status: crate::row::status_text(options.is_done),
    };
    let command = if options.is_done { "done" } else { "undone" };
    emit_success(options.ctx.output(), command, &output, Some(&human))
}

pub fn run_delete(options: DeleteOptions) -> Result<()> {
    let pending = PendingAction::for_ids(ActionKind::RemoveOne, [options.id])
        .ok_or_else(|| Error::InvalidArgument("no task given".to_string()))?;
    run_confirmed(pending, options.yes, options.ctx, "delete")
}

pub fn run_bulk(options: BulkOptions) -> Result<()> {
    let pending = PendingAction::for_ids(ActionKind::Bulk(options.kind), options.ids)
        .ok_or_else(|| Error::InvalidArgument("no task ids given".to_string()))?;
    let command = match options.kind {
        BulkKind::MarkDone => "bulk-done",
        BulkKind::Delete => "bulk-delete",
    };
    run_confirmed(pending, options.yes, options.ctx, command)
}

fn run_confirmed(
    pending: PendingAction,
    yes: bool,
    options: ContextOptions,
    command: &str,
) -> Result<()> {
    let ctx = load_context(&options)?;
    if !yes {
        confirm(&pending.prompt())?;
    }
    let confirmed = pending.confirm();
    let outcome = ctx
        .runtime
        .block_on(actions::execute(&ctx.client, &confirmed))?;

    let mut human = HumanOutput::new(outcome.message.clone());
    if let Some(bulk) = outcome.bulk.as_ref() {
        human.push_warning("bulk endpoint failed; deleted tasks one by one");
        for failed in &bulk.failed {
            human.push_warning(format!("task {}: {}", failed.id, failed.error));
        }
    }
    human.push_next_step("todo list");
    let output = ActionOutput {
        ids: confirmed.ids().to_vec(),
        outcome,
    };
    emit_success(options.output(), command, &output, Some(&human))
}

pub fn run_tui(options: TuiOptions) -> Result<()> {
    if options.ctx.json {
        return Err(Error::InvalidArgument(
            "task viewer does not support --json".to_string(),
        ));
    }
    if options.ctx.quiet {
        return Err(Error::InvalidArgument(
            "task viewer does not support --quiet".to_string(),
        ));
    }
    let mut config = load_config(&options.ctx)?;
    if let Some(page_size) = options.page_size {
        if page_size == 0 {
            return Err(Error::InvalidArgument("page size must be > 0".to_string()));
        }
        if !config.list.page_sizes.contains(&page_size) {
            config.list.page_sizes.push(page_size);
            config.list.page_sizes.sort_unstable();
        }
        config.list.page_size = page_size;
    }
    crate::ui::task_viewer::run(config)
}

/// Ask on stderr, read the answer from stdin.
fn confirm(prompt: &str) -> Result<()> {
    let mut stderr = std::io::stderr();
    write!(stderr, "{prompt} [y/N] ")?;
    stderr.flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    if is_yes(&answer) {
        Ok(())
    } else {
        Err(Error::Aborted(prompt.to_string()))
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn empty_message(filtered: bool) -> &'static str {
    if filtered {
        "No tasks match your filter criteria."
    } else {
        "No tasks found."
    }
}

fn task_line(task: &Task) -> String {
    let summary = TaskRow::new(task.clone()).summary();
    let mark = if task.is_done { "x" } else { " " };
    format!(
        "[{mark}] {} {} [{}] {} ({})",
        task.id, summary.title, summary.priority, summary.due_label, summary.status
    )
}

#[derive(serde::Serialize)]
struct TaskListOutput {
    page: u32,
    page_size: u32,
    total_pages: u64,
    count: u64,
    has_next: bool,
    has_previous: bool,
    tasks: Vec<Task>,
}

#[derive(serde::Serialize)]
struct TaskCreatedOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    task: Option<Task>,
    submitted: crate::task::NewTask,
}

#[derive(serde::Serialize)]
struct TaskUpdatedOutput {
    id: TaskId,
    patch: TaskPatch,
}

#[derive(serde::Serialize)]
struct TaskDoneOutput {
    id: TaskId,
    is_done: bool,
    status: &'static str,
}

#[derive(serde::Serialize)]
struct ActionOutput {
    ids: Vec<TaskId>,
    #[serde(flatten)]
    outcome: ActionOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(json: serde_json::Value) -> Task {
        serde_json::from_value(json).expect("task")
    }

    #[test]
    fn yes_answers() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
    }

    #[test]
    fn empty_message_depends_on_filters() {
        assert_eq!(empty_message(true), "No tasks match your filter criteria.");
        assert_eq!(empty_message(false), "No tasks found.");
    }

    #[test]
    fn task_line_shows_summary() {
        let line = task_line(&task(serde_json::json!({
            "id": 4, "title": "Buy milk", "priority": "High",
            "due_date": "2025-01-10", "is_done": false
        })));
        assert_eq!(line, "[ ] 4 Buy milk [High] Jan 10 (Todo)");

        let line = task_line(&task(serde_json::json!({
            "id": 5, "title": "Walk", "is_done": true
        })));
        assert_eq!(line, "[x] 5 Walk [Normal] No date (Done)");
    }
}
