use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::actions::{self, ActionOutcome};
use crate::api::{HttpClient, TaskApi};
use crate::collection::{BulkKind, CollectionView, Confirmed, PendingAction};
use crate::config::{Config, ListConfig};
use crate::draft::{local_today, CreateForm, TaskEditor};
use crate::error::{Error, Result};
use crate::page::{FetchApplied, FetchTicket, PageController};
use crate::row::TaskRow;
use crate::task::{Task, TaskId, TaskPage, TaskPatch};

use super::editor::{EditorAction, EditorKind, EditorState, FilterPicker, PickerAction};
use super::view;

const NARROW_WIDTH: u16 = 90;
const EVENT_POLL_MS: u64 = 120;

/// Work for the loader thread.
pub(crate) enum Request {
    Fetch(FetchTicket),
    Create(CreateForm),
    Save(TaskEditor),
    Update(TaskId, TaskPatch),
    Execute(Confirmed),
}

pub(crate) enum UiMsg {
    Fetched(u64, Result<TaskPage>),
    Created(Result<Option<Task>>),
    Saved(TaskId, Result<ActionOutcome>),
    Action(Result<ActionOutcome>),
}

#[derive(Clone, Copy)]
pub(crate) enum StatusKind {
    Error,
    Info,
}

pub struct AppState {
    pub(crate) page: PageController,
    pub(crate) collection: CollectionView,
    pub(crate) form: CreateForm,
    pub(crate) cursor: Option<usize>,
    pub(crate) search_input: String,
    pub(crate) search_active: bool,
    pub(crate) editor: Option<EditorState>,
    pub(crate) picker: Option<FilterPicker>,
    pub(crate) confirm: Option<PendingAction>,
    pub(crate) show_help: bool,
    pub(crate) pending_create: bool,
    status_message: Option<String>,
    info_message: Option<String>,
    viewport_width: u16,
}

impl AppState {
    fn new(list: &ListConfig) -> Self {
        Self {
            page: PageController::new(list),
            collection: CollectionView::new(),
            form: CreateForm::new(local_today()),
            cursor: None,
            search_input: String::new(),
            search_active: false,
            editor: None,
            picker: None,
            confirm: None,
            show_help: false,
            pending_create: false,
            status_message: None,
            info_message: None,
            viewport_width: 0,
        }
    }

    fn update_viewport(&mut self, width: u16) {
        self.viewport_width = width;
    }

    pub(crate) fn is_narrow(&self) -> bool {
        self.viewport_width > 0 && self.viewport_width < NARROW_WIDTH
    }

    pub(crate) fn cursor_row(&self) -> Option<&TaskRow> {
        self.cursor.and_then(|idx| self.collection.rows().get(idx))
    }

    fn cursor_id(&self) -> Option<TaskId> {
        self.cursor_row().map(TaskRow::id)
    }

    pub(crate) fn is_editing_row(&self, id: TaskId) -> bool {
        matches!(
            self.editor.as_ref().map(EditorState::kind),
            Some(EditorKind::EditTask(editing)) if editing == id
        )
    }

    pub(crate) fn status_line(&self) -> Option<(String, StatusKind)> {
        if let Some(message) = self.status_message.as_ref() {
            return Some((message.clone(), StatusKind::Error));
        }
        if let Some(error) = self.page.error() {
            return Some((error.to_string(), StatusKind::Error));
        }
        if let Some(info) = self.info_message.as_ref() {
            return Some((info.clone(), StatusKind::Info));
        }
        if self.page.is_loading() {
            return Some(("loading...".to_string(), StatusKind::Info));
        }
        None
    }

    pub(crate) fn footer_hint(&self) -> String {
        if self.confirm.is_some() {
            return "y/enter confirm  esc cancel".to_string();
        }
        if self.picker.is_some() {
            return "j/k move  enter apply  esc cancel".to_string();
        }
        if let Some(editor) = self.editor.as_ref() {
            if editor.confirming() {
                return "enter/y save  e back  esc cancel".to_string();
            }
            return "type to edit  tab next  enter next/confirm  esc cancel".to_string();
        }
        if self.search_active {
            return "type search  backspace delete  enter apply  esc clear".to_string();
        }
        "j/k move  space select  enter expand  c new  x done  d delete  / search  ? help  q quit"
            .to_string()
    }

    pub(crate) fn page_summary(&self) -> String {
        let state = self.page.state();
        format!(
            "page {}/{}  total {}  size {}",
            state.page,
            self.page.total_pages(),
            self.page.total_count(),
            state.page_size
        )
    }

    /// Bulk action bar text; `None` when nothing is selected.
    pub(crate) fn bulk_bar(&self) -> Option<String> {
        let count = self.collection.selected().len();
        if count == 0 {
            return None;
        }
        Some(format!(
            "{count} selected  X mark done  D delete  A clear selection"
        ))
    }

    fn set_error(&mut self, message: String) {
        self.status_message = Some(message);
        self.info_message = None;
    }

    fn set_info(&mut self, message: String) {
        self.info_message = Some(message);
        self.status_message = None;
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.collection.len();
        if len == 0 {
            self.cursor = None;
            return;
        }
        let current = self.cursor.unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1);
        self.cursor = Some(next as usize);
    }

    fn clamp_cursor(&mut self, previous: Option<TaskId>) {
        let rows = self.collection.rows();
        if rows.is_empty() {
            self.cursor = None;
            return;
        }
        let by_id = previous.and_then(|id| rows.iter().position(|row| row.id() == id));
        self.cursor = Some(by_id.unwrap_or_else(|| self.cursor.unwrap_or(0).min(rows.len() - 1)));
    }

    fn apply_fetch(&mut self, request_id: u64, result: Result<TaskPage>) {
        let previous = self.cursor_id();
        match self.page.finish_fetch(request_id, result) {
            FetchApplied::Loaded => {
                self.status_message = None;
                self.collection.replace_tasks(self.page.tasks().to_vec());
                if let Some(EditorKind::EditTask(id)) = self.editor.as_ref().map(EditorState::kind)
                {
                    if self.collection.row(id).and_then(TaskRow::editor).is_none() {
                        self.editor = None;
                    }
                }
                self.clamp_cursor(previous);
            }
            FetchApplied::Failed | FetchApplied::Superseded => {}
        }
    }

    fn apply_outcome(&mut self, outcome: ActionOutcome, req_tx: &UnboundedSender<Request>) {
        if outcome.clear_selection {
            self.collection.clear_selection();
        }
        if outcome.changed {
            let ticket = self.page.refresh();
            send(self, req_tx, Request::Fetch(ticket));
        }
        let failed = outcome
            .bulk
            .as_ref()
            .is_some_and(|bulk| !bulk.failed.is_empty());
        if failed {
            self.set_error(outcome.message);
        } else {
            self.set_info(outcome.message);
        }
    }
}

pub fn run(config: Config) -> Result<()> {
    let client = HttpClient::new(&config.server)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let (ui_tx, ui_rx) = mpsc::channel();
    let (req_tx, req_rx) = unbounded_channel();

    spawn_loader(runtime, client, req_rx, ui_tx);

    let mut app = AppState::new(&config.list);
    let ticket = app.page.refresh();
    if req_tx.send(Request::Fetch(ticket)).is_err() {
        return Err(Error::OperationFailed(
            "failed to start task loader".to_string(),
        ));
    }
    run_terminal(&mut app, ui_rx, req_tx)
}

fn run_terminal(
    app: &mut AppState,
    ui_rx: Receiver<UiMsg>,
    req_tx: UnboundedSender<Request>,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let size = terminal.size()?;
    app.update_viewport(size.width);

    let result = run_loop(&mut terminal, app, ui_rx, req_tx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    ui_rx: Receiver<UiMsg>,
    req_tx: UnboundedSender<Request>,
) -> Result<()> {
    let mut dirty = true;
    loop {
        while let Ok(msg) = ui_rx.try_recv() {
            handle_ui_msg(app, msg, &req_tx);
            dirty = true;
        }

        if dirty {
            terminal.draw(|frame| {
                app.update_viewport(frame.size().width);
                view::render(frame, app);
            })?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(EVENT_POLL_MS))? {
            match event::read()? {
                Event::Key(key) => {
                    if handle_key(app, key, &req_tx) {
                        break;
                    }
                    dirty = true;
                }
                Event::Resize(width, _) => {
                    app.update_viewport(width);
                    dirty = true;
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn send(app: &mut AppState, req_tx: &UnboundedSender<Request>, request: Request) {
    if req_tx.send(request).is_err() {
        app.set_error("task loader stopped".to_string());
    }
}

fn handle_ui_msg(app: &mut AppState, msg: UiMsg, req_tx: &UnboundedSender<Request>) {
    match msg {
        UiMsg::Fetched(request_id, result) => app.apply_fetch(request_id, result),
        UiMsg::Created(result) => {
            app.pending_create = false;
            match result {
                Ok(_) => {
                    app.form.reset(local_today());
                    app.search_input.clear();
                    let ticket = app.page.on_task_created();
                    send(app, req_tx, Request::Fetch(ticket));
                    app.set_info("task created".to_string());
                }
                Err(err) => app.set_error(err.to_string()),
            }
        }
        UiMsg::Saved(id, result) => match result {
            Ok(outcome) => {
                if let Some(row) = app.collection.row_mut(id) {
                    row.collapse();
                }
                if app.is_editing_row(id) {
                    app.editor = None;
                }
                app.apply_outcome(outcome, req_tx);
            }
            Err(err) => match app.editor.as_mut() {
                Some(editor) if editor.kind() == EditorKind::EditTask(id) => {
                    editor.set_error(err.to_string());
                }
                _ => app.set_error(err.to_string()),
            },
        },
        UiMsg::Action(result) => match result {
            Ok(outcome) => app.apply_outcome(outcome, req_tx),
            Err(err) => app.set_error(err.to_string()),
        },
    }
}

/// Returns `true` when the viewer should exit.
fn handle_key(app: &mut AppState, key: KeyEvent, req_tx: &UnboundedSender<Request>) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if let Some(pending) = app.confirm.take() {
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('y') | KeyCode::Enter => {
                let confirmed = pending.confirm();
                send(app, req_tx, Request::Execute(confirmed));
            }
            KeyCode::Char('n') | KeyCode::Char('q') | KeyCode::Esc => {
                app.set_info("cancelled".to_string());
            }
            _ => {
                app.confirm = Some(pending);
            }
        }
        return false;
    }

    if let Some(mut picker) = app.picker.take() {
        match picker.handle_key(key) {
            PickerAction::None => app.picker = Some(picker),
            PickerAction::Cancel => {}
            PickerAction::Confirm => {
                if let Some(filter) = picker.selected_filter() {
                    let ticket = app.page.set_filter(filter);
                    send(app, req_tx, Request::Fetch(ticket));
                }
            }
        }
        return false;
    }

    if let Some(editor) = app.editor.take() {
        handle_editor_key(app, editor, key, req_tx);
        return false;
    }

    if app.search_active {
        handle_search_key(app, key, req_tx);
        return false;
    }

    if app.show_help && matches!(key.code, KeyCode::Char('q') | KeyCode::Esc | KeyCode::Char('?')) {
        app.show_help = false;
        return false;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('?') => app.show_help = !app.show_help,
        KeyCode::Char('j') | KeyCode::Down => app.move_cursor(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_cursor(-1),
        KeyCode::Char('n') | KeyCode::Right => match app.page.advance_page() {
            Some(ticket) => send(app, req_tx, Request::Fetch(ticket)),
            None => app.set_info("no next page".to_string()),
        },
        KeyCode::Char('p') | KeyCode::Left => match app.page.retreat_page() {
            Some(ticket) => send(app, req_tx, Request::Fetch(ticket)),
            None => app.set_info("no previous page".to_string()),
        },
        KeyCode::Char('z') => {
            let ticket = app.page.cycle_page_size();
            send(app, req_tx, Request::Fetch(ticket));
        }
        KeyCode::Char('r') => {
            let ticket = app.page.refresh();
            send(app, req_tx, Request::Fetch(ticket));
        }
        KeyCode::Char('/') => {
            app.search_active = true;
            app.search_input = app.page.state().search.clone();
        }
        KeyCode::Char('s') => app.picker = Some(FilterPicker::status(app.page.state().is_done)),
        KeyCode::Char('P') => {
            app.picker = Some(FilterPicker::priority(app.page.state().priority));
        }
        KeyCode::Char(' ') => {
            if let Some(id) = app.cursor_id() {
                app.collection.toggle_select(id);
            }
        }
        KeyCode::Char('a') => {
            if !app.collection.select_all() {
                app.set_info("all tasks already selected".to_string());
            }
        }
        KeyCode::Char('A') => {
            app.collection.deselect_all();
        }
        KeyCode::Enter => {
            if let Some(id) = app.cursor_id() {
                if let Some(row) = app.collection.row_mut(id) {
                    row.toggle_expanded();
                }
            }
        }
        KeyCode::Char('e') => {
            if let Some(id) = app.cursor_id() {
                if let Some(row) = app.collection.row_mut(id) {
                    if !row.is_expanded() {
                        row.toggle_expanded();
                    }
                    app.editor = Some(EditorState::edit_task(id));
                }
            }
        }
        KeyCode::Char('c') => {
            if app.pending_create {
                app.set_info("task is being created".to_string());
            } else {
                app.editor = Some(EditorState::new_task());
            }
        }
        KeyCode::Char('x') => {
            if let Some(row) = app.cursor_row() {
                let request = Request::Update(row.id(), row.toggle_done_patch());
                send(app, req_tx, request);
            }
        }
        KeyCode::Char('d') => {
            if let Some(id) = app.cursor_id() {
                app.confirm = app.collection.prepare_remove(id);
            }
        }
        KeyCode::Char('X') => prepare_bulk(app, BulkKind::MarkDone),
        KeyCode::Char('D') => prepare_bulk(app, BulkKind::Delete),
        _ => {}
    }
    false
}

fn prepare_bulk(app: &mut AppState, kind: BulkKind) {
    match app.collection.prepare_bulk(kind) {
        Some(pending) => app.confirm = Some(pending),
        None => app.set_info("no tasks selected".to_string()),
    }
}

fn handle_search_key(app: &mut AppState, key: KeyEvent, req_tx: &UnboundedSender<Request>) {
    match key.code {
        KeyCode::Enter => {
            app.search_active = false;
            let ticket = app.page.set_search(app.search_input.clone());
            send(app, req_tx, Request::Fetch(ticket));
        }
        KeyCode::Esc => {
            app.search_active = false;
            app.search_input.clear();
            if !app.page.state().search.is_empty() {
                let ticket = app.page.set_search(String::new());
                send(app, req_tx, Request::Fetch(ticket));
            }
        }
        KeyCode::Backspace => {
            app.search_input.pop();
        }
        KeyCode::Char(ch) if !ch.is_control() => app.search_input.push(ch),
        _ => {}
    }
}

fn handle_editor_key(
    app: &mut AppState,
    mut editor: EditorState,
    key: KeyEvent,
    req_tx: &UnboundedSender<Request>,
) {
    match editor.kind() {
        EditorKind::NewTask => match editor.handle_key(app.form.draft_mut(), key) {
            EditorAction::None => app.editor = Some(editor),
            EditorAction::Cancel => app.set_info("draft kept".to_string()),
            EditorAction::Submit => {
                if let Err(err) = app.form.build_submit() {
                    editor.set_error(err.to_string());
                    app.editor = Some(editor);
                    return;
                }
                app.pending_create = true;
                let form = app.form.clone();
                send(app, req_tx, Request::Create(form));
                app.set_info("creating task...".to_string());
            }
        },
        EditorKind::EditTask(id) => {
            let Some(row) = app.collection.row_mut(id) else {
                app.set_error("task is no longer on this page".to_string());
                return;
            };
            let Some(task_editor) = row.editor_mut() else {
                return;
            };
            match editor.handle_key(task_editor.draft_mut(), key) {
                EditorAction::None => app.editor = Some(editor),
                EditorAction::Cancel => row.collapse(),
                EditorAction::Submit => {
                    let draft = task_editor.clone();
                    if let Err(err) = draft.build_patch() {
                        editor.set_error(err.to_string());
                        app.editor = Some(editor);
                        return;
                    }
                    app.editor = Some(editor);
                    send(app, req_tx, Request::Save(draft));
                    app.set_info(format!("saving task {id}..."));
                }
            }
        }
    }
}

fn spawn_loader(
    runtime: tokio::runtime::Runtime,
    client: HttpClient,
    mut req_rx: UnboundedReceiver<Request>,
    ui_tx: Sender<UiMsg>,
) {
    thread::spawn(move || {
        runtime.block_on(async move {
            while let Some(req) = req_rx.recv().await {
                let client = client.clone();
                let ui_tx = ui_tx.clone();
                tokio::spawn(async move {
                    let msg = handle_request(&client, req).await;
                    let _ = ui_tx.send(msg);
                });
            }
        });
    });
}

async fn handle_request<A: TaskApi>(api: &A, req: Request) -> UiMsg {
    match req {
        Request::Fetch(ticket) => UiMsg::Fetched(ticket.id, api.list(&ticket.query).await),
        Request::Create(mut form) => UiMsg::Created(actions::create_task(api, &mut form).await),
        Request::Save(editor) => {
            UiMsg::Saved(editor.task_id(), actions::save_edit(api, &editor).await)
        }
        Request::Update(id, patch) => UiMsg::Action(actions::update_task(api, id, &patch).await),
        Request::Execute(confirmed) => UiMsg::Action(actions::execute(api, &confirmed).await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn task(id: u64) -> Task {
        serde_json::from_value(serde_json::json!({ "id": id, "title": format!("task {id}") }))
            .expect("task")
    }

    fn loaded_app(ids: &[u64]) -> AppState {
        let mut app = AppState::new(&ListConfig::default());
        let ticket = app.page.refresh();
        app.apply_fetch(
            ticket.id,
            Ok(TaskPage {
                results: ids.iter().map(|id| task(*id)).collect(),
                count: ids.len() as u64,
                next: None,
                previous: None,
            }),
        );
        app
    }

    fn channel() -> (UnboundedSender<Request>, UnboundedReceiver<Request>) {
        unbounded_channel()
    }

    #[test]
    fn narrow_layout_follows_terminal_width() {
        let mut app = loaded_app(&[1]);
        assert!(!app.is_narrow());
        app.update_viewport(NARROW_WIDTH - 1);
        assert!(app.is_narrow());
        app.update_viewport(NARROW_WIDTH);
        assert!(!app.is_narrow());
    }

    #[test]
    fn fetch_result_populates_rows_and_cursor() {
        let app = loaded_app(&[1, 2, 3]);
        assert_eq!(app.collection.len(), 3);
        assert_eq!(app.cursor, Some(0));
        assert!(!app.page.is_loading());
    }

    #[test]
    fn bulk_delete_needs_confirmation() {
        let mut app = loaded_app(&[1, 2, 3]);
        let (tx, mut rx) = channel();

        handle_key(&mut app, key(KeyCode::Char('D')), &tx);
        assert!(app.confirm.is_none());

        handle_key(&mut app, key(KeyCode::Char('a')), &tx);
        handle_key(&mut app, key(KeyCode::Char('D')), &tx);
        let prompt = app.confirm.as_ref().map(PendingAction::prompt);
        assert_eq!(prompt.as_deref(), Some("Delete 3 tasks?"));
        assert!(rx.try_recv().is_err());

        handle_key(&mut app, key(KeyCode::Char('y')), &tx);
        match rx.try_recv() {
            Ok(Request::Execute(confirmed)) => assert_eq!(confirmed.ids().len(), 3),
            _ => panic!("expected execute request"),
        }
    }

    #[test]
    fn cancelled_confirmation_sends_nothing() {
        let mut app = loaded_app(&[1]);
        let (tx, mut rx) = channel();
        handle_key(&mut app, key(KeyCode::Char('d')), &tx);
        assert!(app.confirm.is_some());
        handle_key(&mut app, key(KeyCode::Esc), &tx);
        assert!(app.confirm.is_none());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn successful_bulk_clears_selection_and_refetches() {
        let mut app = loaded_app(&[1, 2]);
        let (tx, mut rx) = channel();
        app.collection.select_all();
        handle_ui_msg(
            &mut app,
            UiMsg::Action(Ok(ActionOutcome {
                changed: true,
                clear_selection: true,
                message: "Marked 2 tasks as done".to_string(),
                bulk: None,
            })),
            &tx,
        );
        assert!(app.collection.selected().is_empty());
        assert!(matches!(rx.try_recv(), Ok(Request::Fetch(_))));
    }

    #[test]
    fn failed_action_keeps_selection() {
        let mut app = loaded_app(&[1, 2]);
        let (tx, mut rx) = channel();
        app.collection.select_all();
        handle_ui_msg(
            &mut app,
            UiMsg::Action(Err(Error::RateLimited {
                detail: "Too many requests. IP blocked for 5 seconds.".to_string(),
                retry_after_secs: Some(5),
            })),
            &tx,
        );
        assert_eq!(app.collection.selected().len(), 2);
        assert!(rx.try_recv().is_err());
        let (message, _) = app.status_line().expect("status");
        assert_eq!(message, "Too many requests. IP blocked for 5 seconds.");
    }

    #[test]
    fn empty_title_is_not_submitted() {
        let mut app = AppState::new(&ListConfig::default());
        let (tx, mut rx) = channel();
        handle_key(&mut app, key(KeyCode::Char('c')), &tx);
        for _ in 0..4 {
            handle_key(&mut app, key(KeyCode::Enter), &tx);
        }
        assert!(rx.try_recv().is_err());
        assert_eq!(
            app.editor.as_ref().and_then(EditorState::error),
            Some("task title is required")
        );
    }

    #[test]
    fn search_applies_on_enter() {
        let mut app = loaded_app(&[1]);
        let (tx, mut rx) = channel();
        handle_key(&mut app, key(KeyCode::Char('/')), &tx);
        for ch in "milk".chars() {
            handle_key(&mut app, key(KeyCode::Char(ch)), &tx);
        }
        assert!(rx.try_recv().is_err());
        handle_key(&mut app, key(KeyCode::Enter), &tx);
        match rx.try_recv() {
            Ok(Request::Fetch(ticket)) => {
                assert_eq!(ticket.query.search.as_deref(), Some("milk"));
                assert_eq!(ticket.query.page, 1);
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn created_task_resets_form_and_page() {
        let mut app = loaded_app(&[1]);
        let (tx, mut rx) = channel();
        app.form.draft_mut().title = "Buy milk".to_string();
        app.page.set_search("something");
        handle_ui_msg(&mut app, UiMsg::Created(Ok(None)), &tx);
        assert_eq!(app.form.draft().title, "");
        match rx.try_recv() {
            Ok(Request::Fetch(ticket)) => {
                assert_eq!(ticket.query.page, 1);
                assert_eq!(ticket.query.search, None);
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn toggle_done_sends_patch_for_cursor_row() {
        let mut app = loaded_app(&[4, 9]);
        let (tx, mut rx) = channel();
        handle_key(&mut app, key(KeyCode::Char('j')), &tx);
        handle_key(&mut app, key(KeyCode::Char('x')), &tx);
        match rx.try_recv() {
            Ok(Request::Update(id, patch)) => {
                assert_eq!(id, TaskId(9));
                assert_eq!(patch.is_done, Some(true));
            }
            _ => panic!("expected update"),
        }
    }

    #[test]
    fn stale_fetch_does_not_replace_rows() {
        let mut app = loaded_app(&[1]);
        let old = app.page.set_search("a");
        let new = app.page.set_search("b");
        app.apply_fetch(
            new.id,
            Ok(TaskPage {
                results: vec![task(2)],
                count: 1,
                next: None,
                previous: None,
            }),
        );
        app.apply_fetch(
            old.id,
            Ok(TaskPage {
                results: vec![task(3)],
                count: 1,
                next: None,
                previous: None,
            }),
        );
        let ids: Vec<TaskId> = app.collection.rows().iter().map(TaskRow::id).collect();
        assert_eq!(ids, vec![TaskId(2)]);
    }
}
