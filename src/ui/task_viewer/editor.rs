use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::draft::TaskDraft;
use crate::page::Filter;
use crate::task::{Priority, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKind {
    NewTask,
    EditTask(TaskId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorFieldId {
    Title,
    Description,
    DueDate,
    Priority,
}

impl EditorFieldId {
    pub const ALL: [EditorFieldId; 4] = [
        EditorFieldId::Title,
        EditorFieldId::Description,
        EditorFieldId::DueDate,
        EditorFieldId::Priority,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EditorFieldId::Title => "Title",
            EditorFieldId::Description => "Description",
            EditorFieldId::DueDate => "Due date",
            EditorFieldId::Priority => "Priority",
        }
    }

    pub fn required(self) -> bool {
        matches!(self, EditorFieldId::Title)
    }

    pub fn value(self, draft: &TaskDraft) -> String {
        match self {
            EditorFieldId::Title => draft.title.clone(),
            EditorFieldId::Description => draft.description.clone(),
            EditorFieldId::DueDate => draft.due_date.clone(),
            EditorFieldId::Priority => draft.priority.to_string(),
        }
    }

    fn text_mut(self, draft: &mut TaskDraft) -> Option<&mut String> {
        match self {
            EditorFieldId::Title => Some(&mut draft.title),
            EditorFieldId::Description => Some(&mut draft.description),
            EditorFieldId::DueDate => Some(&mut draft.due_date),
            EditorFieldId::Priority => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    None,
    Cancel,
    Submit,
}

/// Key handling over a [`TaskDraft`]. The draft itself is owned elsewhere:
/// by the creation form, or by the expanded row's editor.
#[derive(Debug, Clone)]
pub struct EditorState {
    kind: EditorKind,
    active: usize,
    confirming: bool,
    error: Option<String>,
}

impl EditorState {
    pub fn new_task() -> Self {
        Self::with_kind(EditorKind::NewTask)
    }

    pub fn edit_task(id: TaskId) -> Self {
        Self::with_kind(EditorKind::EditTask(id))
    }

    fn with_kind(kind: EditorKind) -> Self {
        Self {
            kind,
            active: 0,
            confirming: false,
            error: None,
        }
    }

    pub fn kind(&self) -> EditorKind {
        self.kind
    }

    pub fn active_field(&self) -> EditorFieldId {
        EditorFieldId::ALL[self.active.min(EditorFieldId::ALL.len() - 1)]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn confirming(&self) -> bool {
        self.confirming
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
        self.confirming = false;
    }

    pub fn handle_key(&mut self, draft: &mut TaskDraft, key: KeyEvent) -> EditorAction {
        if self.confirming {
            return self.handle_confirm_key(key);
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('u') {
            if let Some(value) = self.active_field().text_mut(draft) {
                value.clear();
            }
            self.error = None;
            return EditorAction::None;
        }

        match key.code {
            KeyCode::Esc => return EditorAction::Cancel,
            KeyCode::Tab | KeyCode::Down => self.move_active(1),
            KeyCode::BackTab | KeyCode::Up => self.move_active(-1),
            KeyCode::Enter => {
                if self.active + 1 >= EditorFieldId::ALL.len() {
                    return self.attempt_confirm(draft);
                }
                self.move_active(1);
            }
            KeyCode::Left if self.active_field() == EditorFieldId::Priority => {
                draft.priority = step_priority(draft.priority, -1);
            }
            KeyCode::Right | KeyCode::Char(' ')
                if self.active_field() == EditorFieldId::Priority =>
            {
                draft.priority = step_priority(draft.priority, 1);
            }
            KeyCode::Backspace => {
                if let Some(value) = self.active_field().text_mut(draft) {
                    value.pop();
                }
            }
            KeyCode::Char(ch) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    return EditorAction::None;
                }
                if !ch.is_control() {
                    if let Some(value) = self.active_field().text_mut(draft) {
                        value.push(ch);
                    }
                }
            }
            _ => {}
        }

        self.error = None;
        EditorAction::None
    }

    fn attempt_confirm(&mut self, draft: &TaskDraft) -> EditorAction {
        match draft.validate() {
            Ok(()) => {
                self.confirming = true;
                EditorAction::None
            }
            Err(err) => {
                self.error = Some(err.to_string());
                self.confirming = false;
                EditorAction::None
            }
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> EditorAction {
        match key.code {
            KeyCode::Esc => EditorAction::Cancel,
            KeyCode::Backspace | KeyCode::Char('e') => {
                self.confirming = false;
                self.error = None;
                EditorAction::None
            }
            KeyCode::Char('y') | KeyCode::Enter => EditorAction::Submit,
            _ => EditorAction::None,
        }
    }

    fn move_active(&mut self, delta: isize) {
        let len = EditorFieldId::ALL.len() as isize;
        let next = (self.active as isize + delta).rem_euclid(len);
        self.active = next as usize;
    }
}

fn step_priority(current: Priority, delta: isize) -> Priority {
    let len = Priority::ALL.len() as isize;
    let idx = Priority::ALL
        .iter()
        .position(|value| *value == current)
        .unwrap_or(1) as isize;
    Priority::ALL[(idx + delta).rem_euclid(len) as usize]
}

/// Single-choice picker for one list filter.
#[derive(Debug, Clone)]
pub struct FilterPicker {
    title: &'static str,
    options: Vec<(&'static str, Filter)>,
    selected: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerAction {
    None,
    Cancel,
    Confirm,
}

impl FilterPicker {
    pub fn status(current: Option<bool>) -> Self {
        let options = vec![
            ("All", Filter::Done(None)),
            ("Todo", Filter::Done(Some(false))),
            ("Done", Filter::Done(Some(true))),
        ];
        Self::new("Status Filter", options, Filter::Done(current))
    }

    pub fn priority(current: Option<Priority>) -> Self {
        let mut options = vec![("All", Filter::Priority(None))];
        options.extend(
            Priority::ALL
                .iter()
                .map(|priority| (priority.as_str(), Filter::Priority(Some(*priority)))),
        );
        Self::new("Priority Filter", options, Filter::Priority(current))
    }

    fn new(title: &'static str, options: Vec<(&'static str, Filter)>, current: Filter) -> Self {
        let selected = options
            .iter()
            .position(|(_, filter)| *filter == current)
            .unwrap_or(0);
        Self {
            title,
            options,
            selected,
        }
    }

    pub fn title(&self) -> &'static str {
        self.title
    }

    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.options.iter().map(|(label, _)| *label)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_filter(&self) -> Option<Filter> {
        self.options.get(self.selected).map(|(_, filter)| *filter)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PickerAction {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return PickerAction::Cancel,
            KeyCode::Enter => return PickerAction::Confirm,
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Char(ch) if ch.is_ascii_digit() => {
                if let Some(idx) = ch.to_digit(10) {
                    let idx = idx as usize;
                    if idx < self.options.len() {
                        self.selected = idx;
                    }
                }
            }
            _ => {}
        }
        PickerAction::None
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.options.len() as isize;
        if len == 0 {
            self.selected = 0;
            return;
        }
        let next = (self.selected as isize + delta).rem_euclid(len);
        self.selected = next as usize;
    }
}
