//! Mutations against the task API.
//!
//! Every action waits for the server before reporting back. The returned
//! [`ActionOutcome`] tells the caller whether the list must be re-fetched and
//! whether the selection has been consumed.

use futures::future::join_all;
use serde::Serialize;

use crate::api::TaskApi;
use crate::collection::{ActionKind, BulkKind, Confirmed};
use crate::draft::{local_today, CreateForm, TaskEditor};
use crate::error::{Error, Result};
use crate::task::{Task, TaskId, TaskPatch};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    /// Server state changed; the list must be re-fetched.
    pub changed: bool,
    /// The selection was used up and must be cleared.
    pub clear_selection: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bulk: Option<BulkOutcome>,
}

impl ActionOutcome {
    fn changed(message: impl Into<String>) -> Self {
        Self {
            changed: true,
            clear_selection: false,
            message: message.into(),
            bulk: None,
        }
    }
}

/// Per-id result of a bulk delete that had to fall back to single deletes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkOutcome {
    pub succeeded: Vec<TaskId>,
    pub failed: Vec<FailedDelete>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedDelete {
    pub id: TaskId,
    pub error: String,
}

/// Submit the creation form. The draft is reset only after the server
/// accepted the task.
pub async fn create_task<A: TaskApi>(api: &A, form: &mut CreateForm) -> Result<Option<Task>> {
    let body = form.build_submit()?;
    let created = api.create(&body).await?;
    form.reset(local_today());
    tracing::info!(title = %body.title, "task created");
    Ok(created)
}

pub async fn save_edit<A: TaskApi>(api: &A, editor: &TaskEditor) -> Result<ActionOutcome> {
    let patch = editor.build_patch()?;
    let id = editor.task_id();
    api.update(id, &patch).await?;
    Ok(ActionOutcome::changed(format!("Saved task {id}")))
}

pub async fn update_task<A: TaskApi>(api: &A, id: TaskId, patch: &TaskPatch) -> Result<ActionOutcome> {
    if patch.is_empty() {
        return Err(Error::InvalidArgument("nothing to update".to_string()));
    }
    api.update(id, patch).await?;
    Ok(ActionOutcome::changed(format!("Updated task {id}")))
}

pub async fn set_done<A: TaskApi>(api: &A, id: TaskId, is_done: bool) -> Result<ActionOutcome> {
    api.update(id, &TaskPatch::done(is_done)).await?;
    let state = if is_done { "done" } else { "not done" };
    Ok(ActionOutcome::changed(format!("Marked task {id} as {state}")))
}

/// Run a confirmed action.
pub async fn execute<A: TaskApi>(api: &A, confirmed: &Confirmed) -> Result<ActionOutcome> {
    match confirmed.kind() {
        ActionKind::RemoveOne => remove_one(api, confirmed).await,
        ActionKind::Bulk(BulkKind::MarkDone) => bulk_mark_done(api, confirmed).await,
        ActionKind::Bulk(BulkKind::Delete) => bulk_delete(api, confirmed).await,
    }
}

pub async fn remove_one<A: TaskApi>(api: &A, confirmed: &Confirmed) -> Result<ActionOutcome> {
    let [id] = confirmed.ids() else {
        return Err(Error::InvalidArgument(format!(
            "single delete expects one task, got {}",
            confirmed.ids().len()
        )));
    };
    api.delete(*id).await?;
    Ok(ActionOutcome::changed(format!("Deleted task {id}")))
}

/// One bulk-done request. On failure nothing is cleared.
pub async fn bulk_mark_done<A: TaskApi>(api: &A, confirmed: &Confirmed) -> Result<ActionOutcome> {
    let ids = non_empty(confirmed)?;
    api.bulk_done(ids).await?;
    Ok(ActionOutcome {
        clear_selection: true,
        ..ActionOutcome::changed(format!("Marked {} tasks as done", ids.len()))
    })
}

/// One bulk-delete request, falling back to concurrent single deletes when
/// the bulk endpoint fails. The selection is consumed once at least one task
/// is gone; if every single delete fails too, the whole action fails.
pub async fn bulk_delete<A: TaskApi>(api: &A, confirmed: &Confirmed) -> Result<ActionOutcome> {
    let ids = non_empty(confirmed)?;
    match api.bulk_delete(ids).await {
        Ok(()) => Ok(ActionOutcome {
            clear_selection: true,
            ..ActionOutcome::changed(format!("Deleted {} tasks", ids.len()))
        }),
        Err(err) => {
            tracing::warn!(%err, count = ids.len(), "bulk delete failed, deleting one by one");
            let outcome = delete_each(api, ids).await;
            if outcome.succeeded.is_empty() {
                let first = outcome
                    .failed
                    .first()
                    .map(|failed| failed.error.clone())
                    .unwrap_or_else(|| err.to_string());
                return Err(Error::OperationFailed(format!(
                    "could not delete any of {} tasks: {first}",
                    ids.len()
                )));
            }
            let message = if outcome.failed.is_empty() {
                format!("Deleted {} tasks", outcome.succeeded.len())
            } else {
                format!(
                    "Deleted {} of {} tasks; failed: {}",
                    outcome.succeeded.len(),
                    ids.len(),
                    join_ids(outcome.failed.iter().map(|f| f.id))
                )
            };
            Ok(ActionOutcome {
                changed: true,
                clear_selection: true,
                message,
                bulk: Some(outcome),
            })
        }
    }
}

async fn delete_each<A: TaskApi>(api: &A, ids: &[TaskId]) -> BulkOutcome {
    let results = join_all(ids.iter().map(|id| api.delete(*id))).await;
    let mut outcome = BulkOutcome::default();
    for (id, result) in ids.iter().copied().zip(results) {
        match result {
            Ok(()) => outcome.succeeded.push(id),
            Err(err) => {
                tracing::warn!(%id, %err, "single delete failed");
                outcome.failed.push(FailedDelete {
                    id,
                    error: err.to_string(),
                });
            }
        }
    }
    outcome
}

fn non_empty(confirmed: &Confirmed) -> Result<&[TaskId]> {
    if confirmed.ids().is_empty() {
        return Err(Error::InvalidArgument("no tasks selected".to_string()));
    }
    Ok(confirmed.ids())
}

fn join_ids(ids: impl Iterator<Item = TaskId>) -> String {
    ids.map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
}
