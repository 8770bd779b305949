//! Local drafts behind the creation form and the inline task editor.
//!
//! Drafts hold raw user input. Nothing here touches the network; the
//! submit/save paths in [`crate::actions`] turn a validated draft into a
//! request body.

use chrono::{Local, NaiveDate};

use crate::error::{Error, Result};
use crate::task::{format_due_date, parse_due_date, NewTask, Priority, Task, TaskId, TaskPatch};

pub const TITLE_REQUIRED: &str = "task title is required";

/// Editable task fields as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DD`, or empty for no due date.
    pub due_date: String,
    pub priority: Priority,
}

impl TaskDraft {
    /// Check the draft without building a request body.
    pub fn validate(&self) -> Result<()> {
        self.validated_title()?;
        parse_due_date(&self.due_date)?;
        Ok(())
    }

    fn validated_title(&self) -> Result<String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(Error::Validation(TITLE_REQUIRED.to_string()));
        }
        Ok(title.to_string())
    }
}

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// The add-task form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateForm {
    draft: TaskDraft,
}

impl CreateForm {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            draft: Self::default_draft(today),
        }
    }

    fn default_draft(today: NaiveDate) -> TaskDraft {
        TaskDraft {
            title: String::new(),
            description: String::new(),
            due_date: format_due_date(Some(today)),
            priority: Priority::Normal,
        }
    }

    pub fn draft(&self) -> &TaskDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut TaskDraft {
        &mut self.draft
    }

    /// Validate the draft into a create body. An empty title is rejected
    /// here, before any request is made.
    pub fn build_submit(&self) -> Result<NewTask> {
        let title = self.draft.validated_title()?;
        let due_date = parse_due_date(&self.draft.due_date)?;
        Ok(NewTask {
            title,
            description: self.draft.description.clone(),
            due_date,
            priority: self.draft.priority,
        })
    }

    pub fn reset(&mut self, today: NaiveDate) {
        self.draft = Self::default_draft(today);
    }
}

/// Inline editor for one task, seeded from the task when opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEditor {
    task_id: TaskId,
    draft: TaskDraft,
}

impl TaskEditor {
    pub fn from_task(task: &Task) -> Self {
        Self {
            task_id: task.id,
            draft: TaskDraft {
                title: task.title.clone(),
                description: task.description.clone(),
                due_date: format_due_date(task.due_date),
                priority: task.priority,
            },
        }
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub fn draft(&self) -> &TaskDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut TaskDraft {
        &mut self.draft
    }

    /// Patch carrying exactly the four editable fields.
    pub fn build_patch(&self) -> Result<TaskPatch> {
        let title = self.draft.validated_title()?;
        let due_date = parse_due_date(&self.draft.due_date)?;
        Ok(TaskPatch {
            title: Some(title),
            description: Some(self.draft.description.clone()),
            due_date: Some(due_date),
            priority: Some(self.draft.priority),
            is_done: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn form_defaults_to_today_and_normal() {
        let form = CreateForm::new(date(2025, 1, 3));
        assert_eq!(form.draft().title, "");
        assert_eq!(form.draft().description, "");
        assert_eq!(form.draft().due_date, "2025-01-03");
        assert_eq!(form.draft().priority, Priority::Normal);
    }

    #[test]
    fn form_rejects_blank_title_without_touching_draft() {
        let mut form = CreateForm::new(date(2025, 1, 3));
        form.draft_mut().title = "   ".to_string();
        form.draft_mut().description = "keep me".to_string();
        let before = form.clone();

        let err = form.build_submit().expect_err("blank title");
        assert!(matches!(err, Error::Validation(ref msg) if msg == TITLE_REQUIRED));
        assert_eq!(form, before);
    }

    #[test]
    fn form_builds_create_body() {
        let mut form = CreateForm::new(date(2025, 1, 3));
        form.draft_mut().title = " Buy milk ".to_string();
        form.draft_mut().due_date = "2025-01-10".to_string();
        form.draft_mut().priority = Priority::High;

        let body = form.build_submit().expect("body");
        assert_eq!(body.title, "Buy milk");
        assert_eq!(body.due_date, Some(date(2025, 1, 10)));
        assert_eq!(body.priority, Priority::High);

        form.reset(date(2025, 1, 4));
        assert_eq!(form, CreateForm::new(date(2025, 1, 4)));
    }

    #[test]
    fn editor_patch_carries_editable_fields_only() {
        let task: Task = serde_json::from_value(serde_json::json!({
            "id": 9, "title": "Old", "description": null,
            "due_date": "2025-02-01", "priority": "Low", "is_done": true
        }))
        .expect("task");
        let mut editor = TaskEditor::from_task(&task);
        assert_eq!(editor.draft().due_date, "2025-02-01");

        editor.draft_mut().title = "New".to_string();
        editor.draft_mut().due_date = String::new();
        let patch = editor.build_patch().expect("patch");
        assert_eq!(
            serde_json::to_value(&patch).expect("json"),
            serde_json::json!({
                "title": "New",
                "description": "",
                "due_date": null,
                "priority": "Low"
            })
        );
    }

    #[test]
    fn editor_rejects_bad_due_date() {
        let task: Task =
            serde_json::from_value(serde_json::json!({ "id": 1, "title": "t" })).expect("task");
        let mut editor = TaskEditor::from_task(&task);
        editor.draft_mut().due_date = "tomorrow".to_string();
        assert!(matches!(editor.build_patch(), Err(Error::Validation(_))));
    }
}
