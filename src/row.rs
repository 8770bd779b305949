//! One task in the list: its summary line and its expand/edit toggle.

use chrono::NaiveDate;

use crate::draft::TaskEditor;
use crate::task::{Priority, Task, TaskId, TaskPatch};

/// Text shown in place of a due date when the task has none.
pub const NO_DATE: &str = "No date";

/// What a row displays when collapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSummary {
    pub title: String,
    pub status: &'static str,
    pub priority: Priority,
    pub due_label: String,
    pub strikethrough: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    task: Task,
    editor: Option<TaskEditor>,
}

impl TaskRow {
    pub fn new(task: Task) -> Self {
        Self { task, editor: None }
    }

    pub fn id(&self) -> TaskId {
        self.task.id
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn summary(&self) -> RowSummary {
        RowSummary {
            title: self.task.title.clone(),
            status: status_text(self.task.is_done),
            priority: self.task.priority,
            due_label: due_label(self.task.due_date),
            strikethrough: self.task.is_done,
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.editor.is_some()
    }

    /// Expand seeds a fresh editor from the task; collapse drops the draft.
    pub fn toggle_expanded(&mut self) {
        if self.editor.take().is_none() {
            self.editor = Some(TaskEditor::from_task(&self.task));
        }
    }

    pub fn collapse(&mut self) {
        self.editor = None;
    }

    pub fn editor(&self) -> Option<&TaskEditor> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut TaskEditor> {
        self.editor.as_mut()
    }

    /// Patch flipping this task's completion flag.
    pub fn toggle_done_patch(&self) -> TaskPatch {
        TaskPatch::done(!self.task.is_done)
    }

    pub(crate) fn take_editor(&mut self) -> Option<TaskEditor> {
        self.editor.take()
    }

    pub(crate) fn restore_editor(&mut self, editor: TaskEditor) {
        if editor.task_id() == self.task.id {
            self.editor = Some(editor);
        }
    }
}

pub fn status_text(is_done: bool) -> &'static str {
    if is_done {
        "Done"
    } else {
        "Todo"
    }
}

/// `Jan 10` style label, or [`NO_DATE`].
pub fn due_label(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => date.format("%b %-d").to_string(),
        None => NO_DATE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(is_done: bool, due: Option<&str>) -> Task {
        serde_json::from_value(serde_json::json!({
            "id": 4,
            "title": "Buy milk",
            "due_date": due,
            "priority": "High",
            "is_done": is_done,
        }))
        .expect("task")
    }

    #[test]
    fn summary_for_open_task() {
        let row = TaskRow::new(task(false, Some("2025-01-10")));
        let summary = row.summary();
        assert_eq!(summary.status, "Todo");
        assert_eq!(summary.priority, Priority::High);
        assert_eq!(summary.due_label, "Jan 10");
        assert!(!summary.strikethrough);
    }

    #[test]
    fn summary_for_done_task_without_date() {
        let row = TaskRow::new(task(true, None));
        let summary = row.summary();
        assert_eq!(summary.status, "Done");
        assert_eq!(summary.due_label, NO_DATE);
        assert!(summary.strikethrough);
    }

    #[test]
    fn single_digit_day_has_no_padding() {
        assert_eq!(due_label(NaiveDate::from_ymd_opt(2025, 3, 4)), "Mar 4");
    }

    #[test]
    fn expand_seeds_editor_and_collapse_discards_it() {
        let mut row = TaskRow::new(task(false, None));
        row.toggle_expanded();
        assert!(row.is_expanded());
        row.editor_mut().expect("editor").draft_mut().title = "changed".to_string();

        row.toggle_expanded();
        assert!(!row.is_expanded());

        row.toggle_expanded();
        assert_eq!(row.editor().expect("editor").draft().title, "Buy milk");
    }

    #[test]
    fn toggle_done_patch_flips_flag() {
        let open = TaskRow::new(task(false, None));
        assert_eq!(open.toggle_done_patch().is_done, Some(true));
        let done = TaskRow::new(task(true, None));
        assert_eq!(done.toggle_done_patch().is_done, Some(false));
    }
}
