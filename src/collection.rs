//! The displayed page of tasks, the selection over it, and the confirmation
//! step every destructive or bulk action has to pass through.

use std::collections::BTreeSet;

use crate::row::TaskRow;
use crate::task::{Task, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkKind {
    MarkDone,
    Delete,
}

/// An action waiting on the user's confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Bulk(BulkKind),
    RemoveOne,
}

/// A prepared action. It has to be turned into a [`Confirmed`] before any
/// request can be made for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAction {
    kind: ActionKind,
    ids: Vec<TaskId>,
}

impl PendingAction {
    /// Action over an explicit id list, e.g. ids given on the command line.
    /// Duplicates are dropped; `None` when no id is left.
    pub fn for_ids(kind: ActionKind, ids: impl IntoIterator<Item = TaskId>) -> Option<Self> {
        let mut seen = BTreeSet::new();
        let ids: Vec<TaskId> = ids.into_iter().filter(|id| seen.insert(*id)).collect();
        if ids.is_empty() || (kind == ActionKind::RemoveOne && ids.len() != 1) {
            return None;
        }
        Some(Self { kind, ids })
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn ids(&self) -> &[TaskId] {
        &self.ids
    }

    pub fn prompt(&self) -> String {
        let count = self.ids.len();
        match self.kind {
            ActionKind::Bulk(BulkKind::MarkDone) => format!("Mark {count} tasks as done?"),
            ActionKind::Bulk(BulkKind::Delete) => format!("Delete {count} tasks?"),
            ActionKind::RemoveOne => "Delete this task?".to_string(),
        }
    }

    pub fn confirm(self) -> Confirmed {
        Confirmed {
            kind: self.kind,
            ids: self.ids,
        }
    }
}

/// An action the user agreed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmed {
    kind: ActionKind,
    ids: Vec<TaskId>,
}

impl Confirmed {
    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn ids(&self) -> &[TaskId] {
        &self.ids
    }
}

/// Rows of the current page plus the set of selected ids.
///
/// The selection is always a subset of the visible ids.
#[derive(Debug, Clone, Default)]
pub struct CollectionView {
    rows: Vec<TaskRow>,
    selected: BTreeSet<TaskId>,
}

impl CollectionView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[TaskRow] {
        &self.rows
    }

    pub fn row(&self, id: TaskId) -> Option<&TaskRow> {
        self.rows.iter().find(|row| row.id() == id)
    }

    pub fn row_mut(&mut self, id: TaskId) -> Option<&mut TaskRow> {
        self.rows.iter_mut().find(|row| row.id() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Install a freshly fetched page. Selection and open editors survive
    /// only for tasks that are still on the page.
    pub fn replace_tasks(&mut self, tasks: Vec<Task>) {
        let mut previous = std::mem::take(&mut self.rows);
        self.rows = tasks
            .into_iter()
            .map(|task| {
                let mut row = TaskRow::new(task);
                if let Some(editor) = previous
                    .iter_mut()
                    .find(|old| old.id() == row.id())
                    .and_then(TaskRow::take_editor)
                {
                    row.restore_editor(editor);
                }
                row
            })
            .collect();

        let visible: BTreeSet<TaskId> = self.visible_ids().collect();
        self.selected.retain(|id| visible.contains(id));
    }

    fn visible_ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.rows.iter().map(TaskRow::id)
    }

    pub fn selected(&self) -> &BTreeSet<TaskId> {
        &self.selected
    }

    pub fn is_selected(&self, id: TaskId) -> bool {
        self.selected.contains(&id)
    }

    pub fn toggle_select(&mut self, id: TaskId) {
        if self.row(id).is_none() {
            return;
        }
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    /// Returns whether the selection changed.
    pub fn select_all(&mut self) -> bool {
        let before = self.selected.len();
        let visible: Vec<TaskId> = self.visible_ids().collect();
        self.selected.extend(visible);
        self.selected.len() != before
    }

    /// Returns whether the selection changed.
    pub fn deselect_all(&mut self) -> bool {
        let changed = !self.selected.is_empty();
        self.selected.clear();
        changed
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn all_selected(&self) -> bool {
        !self.rows.is_empty() && self.selected.len() == self.rows.len()
    }

    /// Bulk action over the selection; `None` when nothing is selected.
    pub fn prepare_bulk(&self, kind: BulkKind) -> Option<PendingAction> {
        PendingAction::for_ids(ActionKind::Bulk(kind), self.selected.iter().copied())
    }

    pub fn prepare_remove(&self, id: TaskId) -> Option<PendingAction> {
        self.row(id)?;
        PendingAction::for_ids(ActionKind::RemoveOne, [id])
    }
}
